
use std::{
    io::{self, Write},
    sync::{Arc, Mutex, PoisonError},
};

use tracing::{info, trace, warn};

use crate::{
    caller::{CallSite, CallerName},
    clock::{Clock, MonotonicClock, Timestamp},
    timing::TimingGuard,
};

const NANOS_PER_SEC: f64 = 1e9;
const NANOS_PER_MILLI: f64 = 1e6;

/// Formats one timing line, trailing newline included.
///
/// Anything strictly above one second is printed in seconds, everything else,
/// exactly one second and negative durations included, in milliseconds.
pub fn format_elapsed(caller: Option<&str>, dt_nanos: f64) -> String {
    let mut line = String::new();
    if let Some(caller) = caller {
        line.push_str(caller);
        line.push(' ');
    }
    if dt_nanos > NANOS_PER_SEC {
        line.push_str(&format!(
            "{:.3} *seconds* elapsed.\n",
            dt_nanos / NANOS_PER_SEC
        ));
    } else {
        line.push_str(&format!("{:.3} ms elapsed.\n", dt_nanos / NANOS_PER_MILLI));
    }
    line
}

/// Where timing lines go.
#[derive(Debug, Default, Clone)]
pub enum Output {
    #[default]
    Stdout,
    Capture(Capture),
    /// As `INFO` events with target `timer`.
    Log,
}

impl Output {
    fn write_line(&self, line: &str) {
        match self {
            // One write per line so concurrent reports never interleave within a line.
            Output::Stdout => write_or_warn(io::stdout().lock(), line),
            Output::Capture(capture) => capture.push(line),
            Output::Log => info!(target: "timer", "{}", line.trim_end_matches('\n')),
        }
    }
}

/// Write errors never reach the timed code, they only become a warning.
fn write_or_warn<W: Write>(mut writer: W, line: &str) {
    if let Err(e) = writer.write_all(line.as_bytes()) {
        warn!(target: "timer", "failed to write timing line: {e}");
    }
}

/// In-memory output shared between clones.
#[derive(Debug, Default, Clone)]
pub struct Capture(Arc<Mutex<String>>);

impl Capture {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, line: &str) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_str(line);
    }

    pub fn contents(&self) -> String {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

/// Samples a clock, names the caller and writes the elapsed time.
#[derive(Debug, Default, Clone)]
pub struct Reporter<C = MonotonicClock> {
    clock: C,
    caller: CallerName,
    output: Output,
}

impl Reporter {
    pub const fn new() -> Self {
        Self {
            clock: MonotonicClock,
            caller: CallerName::Site,
            output: Output::Stdout,
        }
    }
}

impl<C: Clock> Reporter<C> {
    pub fn with_clock<D: Clock>(self, clock: D) -> Reporter<D> {
        Reporter {
            clock,
            caller: self.caller,
            output: self.output,
        }
    }

    pub fn with_caller(mut self, caller: CallerName) -> Self {
        self.caller = caller;
        self
    }

    pub fn with_output(mut self, output: Output) -> Self {
        self.output = output;
        self
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Reports the time since `t0`, labelled by whoever called this.
    #[track_caller]
    pub fn report(&self, t0: Timestamp) {
        self.report_from(t0, &CallSite::caller());
    }

    pub fn report_from(&self, t0: Timestamp, site: &CallSite) {
        let t1 = self.clock.now();
        let dt = Timestamp::elapsed_nanos(t0, t1);
        let caller = self.caller.resolve(site);
        trace!(target: "timer", caller = ?caller, elapsed_ns = dt, %site, "report");
        self.output.write_line(&format_elapsed(caller.as_deref(), dt));
    }

    /// Starts timing the current scope. The line is written when the guard drops.
    #[track_caller]
    pub fn start(&self) -> TimingGuard<'_, C> {
        self.start_at(CallSite::caller())
    }

    pub fn start_at(&self, site: CallSite) -> TimingGuard<'_, C> {
        TimingGuard::new(self, self.now(), site)
    }
}
