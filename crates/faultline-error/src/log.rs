//! Log port.
//!
//! The crate never logs through a global logger. Every emission goes to the
//! [`LogSink`] carried by the error's [`RequestContext`], which the host
//! application chooses: [`TracingSink`] for `tracing`, [`NoopSink`] to drop
//! everything, [`CombinedSink`] to fan out, or any custom implementation.
//!
//! ```rust,ignore
//! use faultline_error::{CombinedSink, NoopSink, RequestContext, TracingSink};
//!
//! let ctx = RequestContext::builder()
//!     .sink(CombinedSink::new().push(TracingSink).push(NoopSink))
//!     .build();
//! ```

use std::collections::BTreeMap;
use std::error::Error as _;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Diagnostic, RequestContext};

/// Target of every event emitted by [`TracingSink`].
pub const TRACING_TARGET: &str = "faultline::diagnostic";

/// Conventional field keys of emitted events.
pub mod field {
    pub const ERROR_GROUP: &str = "error_group";
    pub const ERROR_KIND: &str = "error_kind";
    pub const ERROR_CODE: &str = "error_code";
    pub const PAYLOAD: &str = "payload";
    pub const OPERATIONS: &str = "operations";
    pub const STACK_TRACE: &str = "stack_trace";
    pub const TRACE_ID: &str = "trace_id";
}

/// Severity of a log event, ordered from least to most severe.
///
/// `Fatal` is only a label for the sink. Nothing in this crate exits the
/// process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl LogLevel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Fatal => "fatal",
        }
    }
}

/// One structured emission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEvent {
    pub level: LogLevel,
    pub message: Option<String>,
    pub error: Option<String>,
    pub fields: BTreeMap<&'static str, Value>,
}

impl LogEvent {
    pub fn new(level: LogLevel) -> Self {
        Self {
            level,
            message: None,
            error: None,
            fields: BTreeMap::new(),
        }
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn field(mut self, key: &'static str, value: impl Into<Value>) -> Self {
        self.fields.insert(key, value.into());
        self
    }

    /// Attach `trace_id` when the context has one.
    pub fn trace_id_from(self, ctx: &RequestContext) -> Self {
        match ctx.trace_id() {
            Some(id) => self.field(field::TRACE_ID, id),
            None => self,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

/// Receiver of structured log events.
pub trait LogSink: Send + Sync {
    fn log(&self, event: LogEvent);
}

/// Drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl LogSink for NoopSink {
    fn log(&self, _event: LogEvent) {}
}

/// Forwards events to `tracing` under [`TRACING_TARGET`].
///
/// `tracing` has no fatal level: fatal events are emitted at `ERROR` with
/// `fatal = true`. Event fields are rendered as a single JSON `fields` value.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, event: LogEvent) {
        use tracing::{Level, event};

        let fields = Value::Object(
            event
                .fields
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        );
        let error = event.error.unwrap_or_default();
        let message = event.message.unwrap_or_default();
        match event.level {
            LogLevel::Trace => {
                event!(target: TRACING_TARGET, Level::TRACE, error = %error, %fields, "{message}")
            }
            LogLevel::Debug => {
                event!(target: TRACING_TARGET, Level::DEBUG, error = %error, %fields, "{message}")
            }
            LogLevel::Info => {
                event!(target: TRACING_TARGET, Level::INFO, error = %error, %fields, "{message}")
            }
            LogLevel::Warn => {
                event!(target: TRACING_TARGET, Level::WARN, error = %error, %fields, "{message}")
            }
            LogLevel::Error => {
                event!(target: TRACING_TARGET, Level::ERROR, error = %error, %fields, "{message}")
            }
            LogLevel::Fatal => {
                event!(target: TRACING_TARGET, Level::ERROR, fatal = true, error = %error, %fields, "{message}")
            }
        }
    }
}

/// Delivers every event to each inner sink, in insertion order.
#[derive(Default)]
pub struct CombinedSink {
    sinks: Vec<Box<dyn LogSink>>,
}

impl CombinedSink {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sinks: Vec::with_capacity(capacity),
        }
    }

    pub fn push<S: LogSink + 'static>(mut self, sink: S) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn add_boxed(mut self, sink: Box<dyn LogSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl LogSink for CombinedSink {
    fn log(&self, event: LogEvent) {
        if let Some((last, rest)) = self.sinks.split_last() {
            for sink in rest {
                sink.log(event.clone());
            }
            last.log(event);
        }
    }
}

impl<S: LogSink + ?Sized> LogSink for std::sync::Arc<S> {
    fn log(&self, event: LogEvent) {
        (**self).log(event)
    }
}

/// Opt-in logging for any [`Diagnostic`].
///
/// Each call emits exactly two events into the error's context sink (falling
/// back to [`RequestContext::background`]):
///
/// 1. the operational event at the requested level, carrying the error text,
///    group, kind, HTTP code, payload and ops;
/// 2. a [`LogLevel::Trace`] event with the raw error text and the stack trace.
pub trait DiagnosticExt {
    fn log_at(&self, level: LogLevel) -> &Self;

    fn log_warn(&self) -> &Self {
        self.log_at(LogLevel::Warn)
    }

    fn log_error(&self) -> &Self {
        self.log_at(LogLevel::Error)
    }

    /// Labels the operational event `fatal`; the process keeps running.
    fn log_fatal(&self) -> &Self {
        self.log_at(LogLevel::Fatal)
    }
}

impl<D: Diagnostic + ?Sized> DiagnosticExt for D {
    fn log_at(&self, level: LogLevel) -> &Self {
        let background;
        let ctx = match self.ctx() {
            Some(ctx) => ctx,
            None => {
                background = RequestContext::background();
                &background
            }
        };
        let sink = ctx.sink();
        sink.log(operational_event(self, ctx, level));
        sink.log(trace_event(self, ctx));
        self
    }
}

pub(crate) fn operational_event<D: Diagnostic + ?Sized>(
    err: &D,
    ctx: &RequestContext,
    level: LogLevel,
) -> LogEvent {
    let kind = err.kind().unwrap_or_default();
    LogEvent::new(level)
        .error(err.to_string())
        .field(field::ERROR_GROUP, kind.group().as_str())
        .field(field::ERROR_KIND, kind.as_str())
        .field(field::ERROR_CODE, kind.http_code())
        .field(field::PAYLOAD, err.payload().cloned().unwrap_or(Value::Null))
        .field(field::OPERATIONS, err.ops().unwrap_or_default().to_vec())
        .trace_id_from(ctx)
}

pub(crate) fn trace_event<D: Diagnostic + ?Sized>(err: &D, ctx: &RequestContext) -> LogEvent {
    // Validation errors display a fixed message; their source carries the
    // "key:message" pairs.
    let raw = match err.source() {
        Some(source) if err.fields().is_some() => source.to_string(),
        _ => err.to_string(),
    };
    LogEvent::new(LogLevel::Trace)
        .error(raw)
        .field(field::STACK_TRACE, err.stack_trace().unwrap_or_default())
        .trace_id_from(ctx)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<LogEvent>>);

    impl LogSink for Recorder {
        fn log(&self, event: LogEvent) {
            self.0.lock().unwrap().push(event);
        }
    }

    #[test]
    fn levels_are_ordered() {
        assert!(LogLevel::Trace < LogLevel::Warn);
        assert!(LogLevel::Error < LogLevel::Fatal);
        assert_eq!(serde_json::to_string(&LogLevel::Fatal).unwrap(), "\"fatal\"");
    }

    #[test]
    fn event_builder_collects_fields() {
        let event = LogEvent::new(LogLevel::Info)
            .message("hello")
            .error("boom")
            .field(field::ERROR_CODE, 409u16)
            .field(field::OPERATIONS, vec!["a:1".to_string()]);
        assert_eq!(event.message.as_deref(), Some("hello"));
        assert_eq!(event.get(field::ERROR_CODE), Some(&Value::from(409)));
        assert_eq!(event.get(field::OPERATIONS), Some(&serde_json::json!(["a:1"])));
        assert_eq!(event.get("missing"), None);
    }

    #[test]
    fn combined_sink_delivers_to_every_sink_in_order() {
        let first = Arc::new(Recorder::default());
        let second = Arc::new(Recorder::default());
        let combined = CombinedSink::new()
            .push(first.clone())
            .push(NoopSink)
            .push(second.clone());
        assert_eq!(combined.len(), 3);

        combined.log(LogEvent::new(LogLevel::Warn).message("one"));
        combined.log(LogEvent::new(LogLevel::Error).message("two"));

        for recorder in [&first, &second] {
            let events = recorder.0.lock().unwrap();
            let messages: Vec<_> = events.iter().filter_map(|e| e.message.as_deref()).collect();
            assert_eq!(messages, vec!["one", "two"]);
        }
    }

    #[test]
    fn empty_combined_sink_is_a_noop() {
        let combined = CombinedSink::new();
        assert!(combined.is_empty());
        combined.log(LogEvent::new(LogLevel::Fatal));
    }

    #[test]
    fn tracing_sink_does_not_panic() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        for level in [
            LogLevel::Trace,
            LogLevel::Debug,
            LogLevel::Info,
            LogLevel::Warn,
            LogLevel::Error,
            LogLevel::Fatal,
        ] {
            TracingSink.log(
                LogEvent::new(level)
                    .message("demo emit")
                    .error("boom")
                    .field(field::ERROR_KIND, "other_error"),
            );
        }
    }
}
