use std::sync::{Arc, Mutex, PoisonError};

use faultline_error::{LogEvent, LogLevel, LogSink, NoTrace, RequestContext};
use serde_json::Value;

/// Records every event it receives, in order.
#[derive(Debug, Default)]
pub struct CapturingSink {
    events: Mutex<Vec<LogEvent>>,
}

impl CapturingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events received so far.
    pub fn events(&self) -> Vec<LogEvent> {
        self.lock().clone()
    }

    /// Drain the recorded events.
    pub fn take(&self) -> Vec<LogEvent> {
        std::mem::take(&mut *self.lock())
    }

    pub fn levels(&self) -> Vec<LogLevel> {
        self.lock().iter().map(|e| e.level).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Field `key` of the `index`-th event.
    pub fn field(&self, index: usize, key: &str) -> Option<Value> {
        self.lock().get(index)?.get(key).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<LogEvent>> {
        // A panicking test thread must not hide the events of the others.
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LogSink for CapturingSink {
    fn log(&self, event: LogEvent) {
        self.lock().push(event);
    }
}

/// A context logging into a fresh [`CapturingSink`], with ops disabled and a
/// fixed trace id of `"test-trace"`.
pub fn capturing_context() -> (RequestContext, Arc<CapturingSink>) {
    let sink = Arc::new(CapturingSink::new());
    let ctx = RequestContext::builder()
        .trace_id("test-trace")
        .tracer(NoTrace)
        .shared_sink(sink.clone())
        .build();
    (ctx, sink)
}
