use std::{borrow::Cow, fmt, panic::Location};

/// Where a timing was requested from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    pub function: Option<&'static str>,
    pub file: &'static str,
    pub line: u32,
}

impl CallSite {
    pub const fn new(function: Option<&'static str>, file: &'static str, line: u32) -> Self {
        Self {
            function,
            file,
            line,
        }
    }

    /// The location of whoever called into the current `#[track_caller]` chain.
    /// Function names are not recoverable this way, use `call_site!()` for them.
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        Self::new(None, location.file(), location.line())
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.function {
            Some(function) => write!(f, "{function} ({}:{})", self.file, self.line),
            None => write!(f, "{}:{}", self.file, self.line),
        }
    }
}

/// How the label in front of a timing line is chosen.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum CallerName {
    /// Function path captured at the call site, else the function found by
    /// walking the stack, else `file:line`.
    #[default]
    Site,
    /// Only the function found by walking the stack.
    Backtrace,
    /// Only `file:line` of the call site.
    Location,
    /// The same label for every report.
    Fixed(Cow<'static, str>),
    /// No label at all.
    Hidden,
}

impl CallerName {
    pub fn fixed<S: Into<Cow<'static, str>>>(label: S) -> Self {
        CallerName::Fixed(label.into())
    }

    pub fn resolve(&self, site: &CallSite) -> Option<Cow<'static, str>> {
        match self {
            CallerName::Site => match site.function {
                Some(function) if !function.is_empty() => Some(Cow::Borrowed(function)),
                Some(_) => None,
                None => stack_caller()
                    .or_else(|| Some(format!("{}:{}", site.file, site.line)))
                    .map(Cow::Owned),
            },
            CallerName::Backtrace => stack_caller().map(Cow::Owned),
            CallerName::Location => Some(Cow::Owned(format!("{}:{}", site.file, site.line))),
            CallerName::Fixed(label) => Some(label.clone()),
            CallerName::Hidden => None,
        }
    }
}

/// Walks the stack to the first function outside of the reporting machinery
/// of this crate. `None` when symbols are unavailable.
#[inline(never)]
fn stack_caller() -> Option<String> {
    let mut in_reporter = false;
    let mut caller = None;
    backtrace::trace(|frame| {
        // Inlined functions show up as several symbols of one frame, innermost first.
        backtrace::resolve_frame(frame, |symbol| {
            if caller.is_some() {
                return;
            }
            let Some(name) = symbol.name() else {
                return;
            };
            let name = format!("{name:#}");
            let name = strip_hash(&name);
            if is_reporting_frame(name) {
                in_reporter = true;
            } else if in_reporter {
                caller = Some(trim_closures(name).to_owned());
            }
        });
        caller.is_none()
    });
    caller
}

fn is_reporting_frame(name: &str) -> bool {
    if ["backtrace::", "core::ptr::drop_in_place", "core::mem::drop"]
        .iter()
        .any(|prefix| name.starts_with(prefix))
    {
        return true;
    }
    let name = strip_generics(name);
    let Some(path) = name.strip_prefix(concat!(env!("CARGO_CRATE_NAME"), "::")) else {
        return false;
    };
    matches!(path, "report" | "start" | "caller::stack_caller")
        || path.starts_with("caller::CallerName::")
        || path.starts_with("report::Reporter::")
        || path.starts_with("timing::TimingGuard")
}

/// `a::b::h0123456789abcdef` -> `a::b`
fn strip_hash(name: &str) -> &str {
    match name.rsplit_once("::h") {
        Some((path, hash)) if hash.len() == 16 && hash.chars().all(|c| c.is_ascii_hexdigit()) => {
            path
        }
        _ => name,
    }
}

/// `<a::B<C> as d::E>::f` -> `a::B as d::E::f`
fn strip_generics(name: &str) -> String {
    let mut path = String::with_capacity(name.len());
    let mut depth = 0usize;
    let mut prev = ' ';
    for c in name.chars() {
        match c {
            '<' if depth > 0 || prev.is_alphanumeric() || prev == '_' => depth += 1,
            '>' if depth > 0 => depth -= 1,
            '<' | '>' => {}
            _ if depth == 0 => path.push(c),
            _ => {}
        }
        prev = c;
    }
    path
}

fn trim_closures(mut path: &str) -> &str {
    while let Some(outer) = path.strip_suffix("::{{closure}}") {
        path = outer;
    }
    path
}

#[doc(hidden)]
pub fn type_name_of<T>(_: T) -> &'static str {
    std::any::type_name::<T>()
}

/// Turns the type name of a marker fn nested in some function into the path
/// of that function: `krate::module::function::__here` -> `krate::module::function`.
/// Closure and async block segments are dropped so the enclosing fn is named.
#[doc(hidden)]
pub fn strip_function_path(name: &'static str) -> &'static str {
    trim_closures(name.strip_suffix("::__here").unwrap_or(name))
}

/// Path of the enclosing function, e.g. `my_crate::db::load`.
#[macro_export]
macro_rules! function_path {
    () => {{
        fn __here() {}
        $crate::__private::strip_function_path($crate::__private::type_name_of(__here))
    }};
}

/// `CallSite` of the macro invocation, including the enclosing function.
#[macro_export]
macro_rules! call_site {
    () => {
        $crate::CallSite::new(Some($crate::function_path!()), file!(), line!())
    };
}
