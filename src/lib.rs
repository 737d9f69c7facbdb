//! Time a function and print how long it took when it returns.
//!
//! ```
//! fn load() {
//!     let _timing = timer::timing!();
//!     // ...
//! }
//! # load();
//! ```
//!
//! prints `my_crate::load 0.012 ms elapsed.` once `load` returns, whichever way
//! it returns. The free functions mirror the manual form:
//!
//! ```
//! let t0 = timer::now();
//! // ...
//! timer::report!(t0);
//! ```

mod caller;
mod clock;
mod report;
mod timing;
pub mod util;

pub use caller::{CallSite, CallerName};
pub use clock::{Clock, ManualClock, MonotonicClock, Timestamp};
pub use report::{format_elapsed, Capture, Output, Reporter};
pub use timing::TimingGuard;

static DEFAULT_REPORTER: Reporter = Reporter::new();

/// The reporter behind the free functions and macros: monotonic clock,
/// call site names, stdout.
pub fn default_reporter() -> &'static Reporter {
    &DEFAULT_REPORTER
}

/// Samples the monotonic clock.
pub fn now() -> Timestamp {
    DEFAULT_REPORTER.now()
}

/// Prints the time elapsed since `t0`, labelled with the calling function as
/// found on the stack, or `file:line` when symbols are unavailable.
/// `report!` names the function without walking the stack.
#[track_caller]
pub fn report(t0: Timestamp) {
    DEFAULT_REPORTER.report(t0)
}

/// Times the rest of the calling scope, labelled like `report`.
#[track_caller]
pub fn start() -> TimingGuard<'static, MonotonicClock> {
    DEFAULT_REPORTER.start()
}

/// `report(t0)` labelled with the enclosing function's path.
#[macro_export]
macro_rules! report {
    ($reporter:expr, $t0:expr) => {
        $reporter.report_from($t0, &$crate::call_site!())
    };
    ($t0:expr) => {
        $crate::default_reporter().report_from($t0, &$crate::call_site!())
    };
}

/// Guard timing the enclosing scope, labelled with the enclosing function's path.
#[macro_export]
macro_rules! timing {
    () => {
        $crate::default_reporter().start_at($crate::call_site!())
    };
    ($reporter:expr) => {
        $reporter.start_at($crate::call_site!())
    };
}

#[doc(hidden)]
pub mod __private {
    pub use crate::caller::{strip_function_path, type_name_of};
}
