use std::{
    sync::{
        atomic::{AtomicI64, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use once_cell::sync::Lazy;

/// Nanoseconds from an arbitrary but fixed zero point.
///
/// Only meaningful when subtracted from another `Timestamp` taken from the
/// same clock in the same process.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    pub const fn from_nanos(nanos: i64) -> Self {
        Self(nanos)
    }

    pub const fn as_nanos(self) -> i64 {
        self.0
    }

    /// `t1 - t0` in nanoseconds. Not clamped: negative when `t0` is later.
    pub fn elapsed_nanos(t0: Timestamp, t1: Timestamp) -> f64 {
        (t1.0 as i128 - t0.0 as i128) as f64
    }
}

pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Reads `Instant`, relative to an anchor taken the first time any
/// `MonotonicClock` in the process is sampled.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

static ANCHOR: Lazy<Instant> = Lazy::new(Instant::now);

impl Clock for MonotonicClock {
    fn now(&self) -> Timestamp {
        let anchor = *ANCHOR;
        // i64 nanoseconds cover ~292 years of process uptime.
        Timestamp(anchor.elapsed().as_nanos() as i64)
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Default, Clone)]
pub struct ManualClock(Arc<AtomicI64>);

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self(Arc::new(AtomicI64::new(start.as_nanos())))
    }

    pub fn set(&self, t: Timestamp) {
        self.0.store(t.as_nanos(), Ordering::SeqCst);
    }

    /// Saturates at `i64::MAX` nanoseconds.
    pub fn advance(&self, d: Duration) {
        self.advance_nanos(i64::try_from(d.as_nanos()).unwrap_or(i64::MAX));
    }

    /// Negative `nanos` moves the clock backwards. Saturates instead of wrapping.
    pub fn advance_nanos(&self, nanos: i64) {
        // The update closure never declines, so this cannot fail.
        let _ = self
            .0
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |t| {
                Some(t.saturating_add(nanos))
            });
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.0.load(Ordering::SeqCst))
    }
}
