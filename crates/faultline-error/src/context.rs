use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::config::DiagnosticsConfig;
use crate::log::{LogSink, TracingSink};
use crate::trace::TraceProvider;

/// Request-scoped state handed to every error constructor.
///
/// Carries the trace id of the request, the [`LogSink`] errors are logged to
/// and the [`TraceProvider`] used to capture ops. Cloning is cheap: all state
/// sits behind one `Arc`, and a context is never mutated once built.
#[derive(Clone)]
pub struct RequestContext {
    inner: Arc<Inner>,
}

struct Inner {
    trace_id: Option<String>,
    sink: Arc<dyn LogSink>,
    tracer: Arc<dyn TraceProvider>,
    values: BTreeMap<String, String>,
}

impl RequestContext {
    /// Process-wide default: [`TracingSink`], the tracer of
    /// [`DiagnosticsConfig::default`], no trace id.
    pub fn background() -> Self {
        static BACKGROUND: OnceLock<RequestContext> = OnceLock::new();
        BACKGROUND
            .get_or_init(|| Self::from_config(&DiagnosticsConfig::default()))
            .clone()
    }

    /// Background sink and tracer with a freshly generated trace id.
    pub fn new() -> Self {
        Self::builder().new_trace_id().build()
    }

    pub fn from_config(config: &DiagnosticsConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                trace_id: None,
                sink: Arc::new(TracingSink),
                tracer: config.trace_provider(),
                values: BTreeMap::new(),
            }),
        }
    }

    pub fn builder() -> RequestContextBuilder {
        RequestContextBuilder::default()
    }

    /// Builder seeded with this context's state.
    pub fn to_builder(&self) -> RequestContextBuilder {
        RequestContextBuilder {
            trace_id: self.inner.trace_id.clone(),
            sink: Some(self.inner.sink.clone()),
            tracer: Some(self.inner.tracer.clone()),
            values: self.inner.values.clone(),
        }
    }

    pub fn with_trace_id(&self, trace_id: impl Into<String>) -> Self {
        self.to_builder().trace_id(trace_id).build()
    }

    pub fn trace_id(&self) -> Option<&str> {
        self.inner.trace_id.as_deref()
    }

    pub fn sink(&self) -> &dyn LogSink {
        self.inner.sink.as_ref()
    }

    pub fn tracer(&self) -> &dyn TraceProvider {
        self.inner.tracer.as_ref()
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.inner.values.get(key).map(String::as_str)
    }

    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.inner.values
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::background()
    }
}

impl fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestContext")
            .field("trace_id", &self.inner.trace_id)
            .field("tracer", &self.inner.tracer)
            .field("values", &self.inner.values)
            .finish_non_exhaustive()
    }
}

/// Unset parts fall back to [`RequestContext::background`].
#[derive(Default)]
pub struct RequestContextBuilder {
    trace_id: Option<String>,
    sink: Option<Arc<dyn LogSink>>,
    tracer: Option<Arc<dyn TraceProvider>>,
    values: BTreeMap<String, String>,
}

impl RequestContextBuilder {
    pub fn trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    /// Use a random (v4) UUID as trace id.
    pub fn new_trace_id(mut self) -> Self {
        self.trace_id = Some(uuid::Uuid::new_v4().to_string());
        self
    }

    pub fn sink<S: LogSink + 'static>(mut self, sink: S) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    pub fn shared_sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn tracer<T: TraceProvider + 'static>(mut self, tracer: T) -> Self {
        self.tracer = Some(Arc::new(tracer));
        self
    }

    pub fn shared_tracer(mut self, tracer: Arc<dyn TraceProvider>) -> Self {
        self.tracer = Some(tracer);
        self
    }

    pub fn value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> RequestContext {
        let (sink, tracer) = match (self.sink, self.tracer) {
            (Some(sink), Some(tracer)) => (sink, tracer),
            (sink, tracer) => {
                let background = RequestContext::background();
                (
                    sink.unwrap_or_else(|| background.inner.sink.clone()),
                    tracer.unwrap_or_else(|| background.inner.tracer.clone()),
                )
            }
        };
        RequestContext {
            inner: Arc::new(Inner {
                trace_id: self.trace_id,
                sink,
                tracer,
                values: self.values,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::NoopSink;
    use crate::trace::{LocationProvider, Origin};

    #[test]
    fn background_has_no_trace_id_and_is_shared() {
        let a = RequestContext::background();
        let b = RequestContext::default();
        assert!(a.trace_id().is_none());
        assert!(Arc::ptr_eq(&a.inner, &b.inner));
    }

    #[test]
    fn new_generates_distinct_trace_ids() {
        let a = RequestContext::new();
        let b = RequestContext::new();
        let (a, b) = (a.trace_id().unwrap(), b.trace_id().unwrap());
        assert_ne!(a, b);
        assert!(uuid::Uuid::parse_str(a).is_ok());
    }

    #[test]
    fn builder_overrides_and_keeps_values() {
        let ctx = RequestContext::builder()
            .trace_id("req-1")
            .sink(NoopSink)
            .tracer(LocationProvider)
            .value("tenant", "acme")
            .build();
        assert_eq!(ctx.trace_id(), Some("req-1"));
        assert_eq!(ctx.value("tenant"), Some("acme"));
        assert_eq!(ctx.value("missing"), None);
        assert_eq!(ctx.tracer().capture(Origin::caller()).ops.len(), 1);

        let renamed = ctx.with_trace_id("req-2");
        assert_eq!(renamed.trace_id(), Some("req-2"));
        assert_eq!(renamed.value("tenant"), Some("acme"));
        assert_eq!(ctx.trace_id(), Some("req-1"));
    }

    #[test]
    fn debug_output_names_the_trace_id() {
        let ctx = RequestContext::background().with_trace_id("abc");
        assert!(format!("{ctx:?}").contains("abc"));
    }
}
