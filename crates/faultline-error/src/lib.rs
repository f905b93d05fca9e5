//! Classified errors for service handlers.
//!
//! Raw driver errors are classified once, where they are first seen, into a
//! [`CError`] carrying an [`ErrorKind`], the [`RequestContext`] and the call
//! sites that led there. From then on they travel unchanged, usually as
//! `Box<dyn Diagnostic>`, to the boundary that renders them with
//! [`build_error_response`] and logs them through the context's [`LogSink`].

mod macros;

pub mod cerror;
pub mod config;
pub mod context;
pub mod diagnostic;
pub mod http;
pub mod kind;
pub mod log;
pub mod multi;
pub mod opaque;
pub mod result_ext;
pub mod trace;
pub mod validation;

// public exports
pub use cerror::CError;
pub use config::{ConfigError, DiagnosticsConfig, TraceMode};
pub use context::{RequestContext, RequestContextBuilder};
pub use diagnostic::{BoxError, Diagnostic, FieldMap, Payload};
pub use http::{
    ResponseError, ResponseErrorWrap, build_error_response, log_http_handler_error,
    log_http_handler_error_ctx,
};
pub use kind::{
    CacheKind, DbKind, ErrorKind, HttpKind, Kind, KindGroup, MessagingKind, ObjectStorageKind,
    SearchKind, classify, classify_cache, classify_db, classify_messaging,
    classify_object_storage, classify_search,
};
pub use log::{CombinedSink, DiagnosticExt, LogEvent, LogLevel, LogSink, NoopSink, TracingSink};
pub use multi::MultiError;
pub use opaque::OpaqueError;
pub use result_ext::{IterResultExt, ResultExt};
pub use trace::{BacktraceProvider, LocationProvider, NoTrace, Origin, Trace, TraceProvider};
pub use validation::ValidationError;
