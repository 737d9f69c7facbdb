use crate::{
    caller::CallSite,
    clock::{Clock, Timestamp},
    report::Reporter,
};

/// Reports once when dropped: on return, early return, `?` and unwinding alike.
#[must_use = "the scope is timed until the guard is dropped"]
pub struct TimingGuard<'r, C: Clock> {
    reporter: &'r Reporter<C>,
    t0: Timestamp,
    site: CallSite,
}

impl<'r, C: Clock> TimingGuard<'r, C> {
    pub(crate) fn new(reporter: &'r Reporter<C>, t0: Timestamp, site: CallSite) -> Self {
        TimingGuard {
            reporter,
            t0,
            site,
        }
    }

    pub fn started_at(&self) -> Timestamp {
        self.t0
    }

    pub fn site(&self) -> &CallSite {
        &self.site
    }
}

impl<C: Clock> Drop for TimingGuard<'_, C> {
    fn drop(&mut self) {
        self.reporter.report_from(self.t0, &self.site);
    }
}

#[cfg(test)]
mod tests {
    use std::{panic, time::Duration};

    use super::*;
    use crate::{CallerName, Capture, ManualClock, Output};

    fn reporter(clock: &ManualClock, capture: &Capture) -> Reporter<ManualClock> {
        Reporter::new()
            .with_clock(clock.clone())
            .with_output(Output::Capture(capture.clone()))
    }

    #[test]
    fn test_report_on_drop() {
        let clock = ManualClock::default();
        let capture = Capture::new();
        let reporter = reporter(&clock, &capture);

        {
            let guard = reporter.start_at(crate::call_site!());
            assert_eq!(guard.started_at(), Timestamp::from_nanos(0));
            clock.advance(Duration::from_millis(12));
            assert!(capture.lines().is_empty());
        }

        assert_eq!(
            capture.lines(),
            ["timer::timing::tests::test_report_on_drop 12.000 ms elapsed."]
        );
    }

    fn early_return(reporter: &Reporter<ManualClock>, clock: &ManualClock, bail: bool) -> u32 {
        let _guard = reporter.start_at(crate::call_site!());
        clock.advance(Duration::from_millis(1));
        if bail {
            return 0;
        }
        clock.advance(Duration::from_millis(1));
        1
    }

    #[test]
    fn test_early_return() {
        let clock = ManualClock::default();
        let capture = Capture::new();
        let reporter = reporter(&clock, &capture);

        assert_eq!(early_return(&reporter, &clock, true), 0);
        assert_eq!(early_return(&reporter, &clock, false), 1);
        assert_eq!(
            capture.lines(),
            [
                "timer::timing::tests::early_return 1.000 ms elapsed.",
                "timer::timing::tests::early_return 2.000 ms elapsed.",
            ]
        );
    }

    fn fallible(reporter: &Reporter<ManualClock>, clock: &ManualClock) -> Result<(), String> {
        let _guard = reporter.start();
        clock.advance(Duration::from_secs(2));
        "nope".parse::<u32>().map_err(|e| e.to_string())?;
        unreachable!()
    }

    #[test]
    fn test_error_exit() {
        let clock = ManualClock::default();
        let capture = Capture::new();
        let reporter = reporter(&clock, &capture).with_caller(CallerName::fixed("fallible"));

        fallible(&reporter, &clock).unwrap_err();
        assert_eq!(capture.lines(), ["fallible 2.000 *seconds* elapsed."]);
    }

    #[test]
    fn test_panic_exit() {
        let clock = ManualClock::default();
        let capture = Capture::new();
        let reporter = reporter(&clock, &capture).with_caller(CallerName::Hidden);

        panic::catch_unwind(panic::AssertUnwindSafe(|| {
            let _guard = reporter.start();
            clock.advance(Duration::from_micros(500));
            panic!("boom");
        }))
        .unwrap_err();

        assert_eq!(capture.lines(), ["0.500 ms elapsed."]);
    }

    #[test]
    fn test_explicit_drop_reports_once() {
        let clock = ManualClock::default();
        let capture = Capture::new();
        let reporter = reporter(&clock, &capture).with_caller(CallerName::Hidden);

        let guard = reporter.start();
        clock.advance(Duration::from_millis(3));
        drop(guard);
        clock.advance(Duration::from_millis(3));

        assert_eq!(capture.lines(), ["3.000 ms elapsed."]);
    }

    #[test]
    fn test_track_caller_site() {
        let clock = ManualClock::default();
        let capture = Capture::new();
        let reporter = reporter(&clock, &capture);

        let line = line!() + 1;
        let guard = reporter.start();
        assert_eq!(guard.site().line, line);
        assert_eq!(guard.site().function, None);
        drop(guard);

        assert_eq!(
            capture.lines(),
            ["timer::timing::tests::test_track_caller_site 0.000 ms elapsed."]
        );
    }

    fn timed_without_macro(reporter: &Reporter<ManualClock>, clock: &ManualClock) {
        let _guard = reporter.start();
        clock.advance(Duration::from_millis(4));
    }

    #[test]
    fn test_guard_names_owner_from_stack() {
        let clock = ManualClock::default();
        let capture = Capture::new();
        let reporter = reporter(&clock, &capture);

        timed_without_macro(&reporter, &clock);
        let reporter = reporter.with_caller(CallerName::Location);
        let line = line!() + 1;
        drop(reporter.start());

        assert_eq!(
            capture.lines(),
            [
                "timer::timing::tests::timed_without_macro 4.000 ms elapsed.".to_owned(),
                format!("{}:{line} 0.000 ms elapsed.", file!()),
            ]
        );
    }
}
