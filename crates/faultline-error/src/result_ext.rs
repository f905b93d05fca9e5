use crate::log::{DiagnosticExt, LogLevel};
use crate::{Diagnostic, MultiError, RequestContext};

/// Extension trait for `Result` that logs a diagnosed error on the way
/// through, leaving control flow to the caller.
///
/// Example
/// ```rust,ignore
/// use faultline_error::{CError, HttpKind, RequestContext, ResultExt};
///
/// fn charge(ctx: &RequestContext) -> Result<(), CError> {
///     gateway_call(ctx).log_error() // logged, still Err for the caller
/// }
/// ```
pub trait ResultExt<T> {
    /// If the result is an error, log it at `level`.
    fn log_at(self, level: LogLevel) -> Self;

    fn log_warn(self) -> Self
    where
        Self: Sized,
    {
        self.log_at(LogLevel::Warn)
    }

    fn log_error(self) -> Self
    where
        Self: Sized,
    {
        self.log_at(LogLevel::Error)
    }

    /// Logs with the `fatal` label; does not terminate the process.
    fn log_fatal(self) -> Self
    where
        Self: Sized,
    {
        self.log_at(LogLevel::Fatal)
    }
}

impl<T, E: Diagnostic> ResultExt<T> for Result<T, E> {
    fn log_at(self, level: LogLevel) -> Self {
        if let Err(ref e) = self {
            e.log_at(level);
        }
        self
    }
}

impl<T> ResultExt<T> for Result<T, Box<dyn Diagnostic>> {
    fn log_at(self, level: LogLevel) -> Self {
        if let Err(ref e) = self {
            (**e).log_at(level);
        }
        self
    }
}

/// Iterator helpers over `Result` to reduce boilerplate at boundaries.
///
/// - `collect_ok`: eagerly collects `Ok` items, returning the first error.
/// - `first_error`: scans and returns the first error.
/// - `collect_all`: collects every `Ok` item, gathering every error into a
///   [`MultiError`].
pub trait IterResultExt<T, E>: Sized {
    fn collect_ok(self) -> Result<Vec<T>, E>;
    fn first_error(self) -> Option<E>;
    fn collect_all(self, ctx: &RequestContext) -> Result<Vec<T>, MultiError>
    where
        E: Into<Box<dyn Diagnostic>>;
}

impl<I, T, E> IterResultExt<T, E> for I
where
    I: IntoIterator<Item = Result<T, E>>,
{
    fn collect_ok(self) -> Result<Vec<T>, E> {
        self.into_iter().collect()
    }

    fn first_error(self) -> Option<E> {
        self.into_iter().find_map(Result::err)
    }

    #[track_caller]
    fn collect_all(self, ctx: &RequestContext) -> Result<Vec<T>, MultiError>
    where
        E: Into<Box<dyn Diagnostic>>,
    {
        let mut errors = MultiError::new(ctx);
        let mut out = Vec::new();
        for r in self {
            match r {
                Ok(v) => out.push(v),
                Err(e) => {
                    errors.append(e);
                }
            }
        }
        errors.into_result().map(|()| out)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::log::{LogEvent, LogSink};
    use crate::trace::NoTrace;
    use crate::{CError, HttpKind, ValidationError};

    #[derive(Default)]
    struct Recorder(Mutex<Vec<LogLevel>>);

    impl LogSink for Recorder {
        fn log(&self, event: LogEvent) {
            self.0.lock().unwrap().push(event.level);
        }
    }

    fn recording() -> (RequestContext, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let ctx = RequestContext::builder()
            .tracer(NoTrace)
            .sink(recorder.clone())
            .build();
        (ctx, recorder)
    }

    #[test]
    fn ok_results_log_nothing() {
        let (_ctx, recorder) = recording();
        let r: Result<u8, CError> = Ok(1);
        assert_eq!(r.log_error().unwrap(), 1);
        assert!(recorder.0.lock().unwrap().is_empty());
    }

    #[test]
    fn errors_are_logged_and_returned() {
        let (ctx, recorder) = recording();
        let r: Result<(), CError> = Err(CError::new(&ctx, HttpKind::Forbidden, "nope"));
        let r = r.log_warn();
        assert_eq!(r.unwrap_err().to_string(), "nope");

        let boxed: Result<(), Box<dyn Diagnostic>> =
            Err(ValidationError::new(&ctx, [("q", "empty")]).into());
        assert!(boxed.log_fatal().is_err());

        assert_eq!(
            *recorder.0.lock().unwrap(),
            vec![LogLevel::Warn, LogLevel::Trace, LogLevel::Fatal, LogLevel::Trace]
        );
    }

    #[test]
    fn iterator_helpers() {
        let (ctx, _) = recording();
        let items = || -> Vec<Result<u32, CError>> {
            vec![
                Ok(1),
                Err(CError::new(&ctx, HttpKind::BadRequest, "two")),
                Ok(3),
                Err(CError::new(&ctx, HttpKind::BadRequest, "four")),
            ]
        };
        assert_eq!(items().first_error().map(|e| e.to_string()).as_deref(), Some("two"));
        assert_eq!(items().collect_ok().unwrap_err().to_string(), "two");
        assert_eq!(items().collect_all(&ctx).unwrap_err().len(), 2);

        let fine: Vec<Result<u32, CError>> = vec![Ok(1), Ok(2)];
        assert_eq!(fine.collect_all(&ctx).unwrap(), vec![1, 2]);
    }
}
