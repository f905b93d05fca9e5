//! Bridges from diagnosed errors to HTTP handlers: the JSON error body and the
//! single log line a handler writes when it gives up.

use serde::{Deserialize, Serialize};

use crate::log::{LogEvent, LogLevel, field};
use crate::{Diagnostic, ErrorKind, FieldMap, HttpKind, RequestContext};

/// Response body: `{"error": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseErrorWrap {
    pub error: ResponseError,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseError {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub group: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldMap>,
}

impl ResponseErrorWrap {
    /// Status to send with this body, derived from its `type`.
    pub fn status_code(&self) -> u16 {
        self.error
            .kind
            .parse::<ErrorKind>()
            .unwrap_or_default()
            .http_code()
    }
}

/// JSON body for `err`. Ops and stack traces are never included.
///
/// Errors without a kind are reported as `other_error`; `errors` is present
/// only when the error exposes field messages.
pub fn build_error_response(err: Option<&dyn Diagnostic>) -> Option<ResponseErrorWrap> {
    let err = err?;
    let kind = err.kind().unwrap_or(ErrorKind::Http(HttpKind::Other));
    Some(ResponseErrorWrap {
        error: ResponseError {
            message: err.to_string(),
            kind: kind.as_str().to_string(),
            group: kind.group().as_str().to_string(),
            errors: err.fields(),
        },
    })
}

/// Log `err` once, into the sink of its own context (or the background one).
pub fn log_http_handler_error(err: &dyn Diagnostic) {
    match err.ctx() {
        Some(ctx) => emit(ctx, err),
        None => emit(&RequestContext::background(), err),
    }
}

/// Log `err` once, into the sink of `ctx`.
pub fn log_http_handler_error_ctx(ctx: &RequestContext, err: &dyn Diagnostic) {
    emit(ctx, err)
}

fn emit(ctx: &RequestContext, err: &dyn Diagnostic) {
    let kind = err.kind().unwrap_or_default();
    // A missing resource is the client's problem, not an outage.
    let level = if kind.is_not_exist() {
        LogLevel::Warn
    } else {
        LogLevel::Error
    };
    ctx.sink().log(
        LogEvent::new(level)
            .message("http handler error")
            .error(err.to_string())
            .field(field::ERROR_KIND, kind.as_str())
            .field(field::ERROR_CODE, kind.http_code())
            .trace_id_from(ctx),
    );
}
