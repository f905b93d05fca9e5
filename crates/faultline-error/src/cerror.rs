use std::error::Error;
use std::fmt;

use crate::trace::Origin;
use crate::{
    BoxError, Diagnostic, ErrorKind, FieldMap, MultiError, Payload, RequestContext,
    ValidationError,
};

/// A classified failure: the raw error, its [`ErrorKind`], the request context
/// it happened in and the call sites that led to it.
///
/// Build one at the boundary where the raw error is first seen, then pass it
/// along unchanged:
///
/// ```rust,ignore
/// use faultline_error::{CError, DbKind, RequestContext, classify_db};
///
/// fn load_user(ctx: &RequestContext, id: u64) -> Result<User, CError> {
///     db.fetch(id).map_err(|e| CError::new(ctx, classify_db(&e), e))
/// }
/// ```
#[derive(Debug)]
pub struct CError {
    err: BoxError,
    kind: ErrorKind,
    ctx: RequestContext,
    ops: Vec<String>,
    stack: String,
    payload: Option<Payload>,
}

impl CError {
    /// Wrap `err`, recording the caller as origin.
    #[track_caller]
    pub fn new(ctx: &RequestContext, kind: impl Into<ErrorKind>, err: impl Into<BoxError>) -> Self {
        Self::at(Origin::caller(), ctx, kind, err)
    }

    /// Like [`CError::new`] with a freshly formatted message.
    #[track_caller]
    pub fn newf(ctx: &RequestContext, kind: impl Into<ErrorKind>, args: fmt::Arguments<'_>) -> Self {
        Self::at(Origin::caller(), ctx, kind, args.to_string())
    }

    /// Wrap `err` with an explicit origin. Used by [`crate::cerror!`].
    ///
    /// An `err` that already is a `CError` is returned as is: the first
    /// classification wins and `kind`/`ctx` are ignored. A `ValidationError`
    /// or `MultiError` is wrapped but keeps its own kind, context, ops and
    /// fields.
    pub fn at(
        origin: Origin,
        ctx: &RequestContext,
        kind: impl Into<ErrorKind>,
        err: impl Into<BoxError>,
    ) -> Self {
        let kind = kind.into();
        let err = match err.into().downcast::<CError>() {
            Ok(inner) => {
                tracing::debug!(
                    kept = %inner.kind,
                    ignored = %kind,
                    "error is already classified; keeping the original kind"
                );
                return *inner;
            }
            Err(err) => err,
        };
        let kept = classified(&err).and_then(|inner| {
            Some((
                inner.kind()?,
                inner.ctx().cloned(),
                inner.ops().unwrap_or_default().to_vec(),
                inner.stack_trace().unwrap_or_default().to_string(),
                inner.payload().cloned(),
            ))
        });
        if let Some((kept, inner_ctx, ops, stack, payload)) = kept {
            tracing::debug!(
                %kept,
                ignored = %kind,
                "error is already classified; keeping the original kind"
            );
            return Self {
                err,
                kind: kept,
                ctx: inner_ctx.unwrap_or_else(|| ctx.clone()),
                ops,
                stack,
                payload,
            };
        }
        let trace = ctx.tracer().capture(origin);
        Self {
            err,
            kind,
            ctx: ctx.clone(),
            ops: trace.ops,
            stack: trace.stack,
            payload: None,
        }
    }

    /// Attach structured data. Replaces any previous payload.
    pub fn with_payload(mut self, payload: impl Into<Payload>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    pub fn err(&self) -> &(dyn Error + Send + Sync + 'static) {
        self.err.as_ref()
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn ctx(&self) -> &RequestContext {
        &self.ctx
    }

    pub fn ops(&self) -> &[String] {
        &self.ops
    }

    pub fn stack_trace(&self) -> &str {
        &self.stack
    }

    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    pub fn into_inner(self) -> BoxError {
        self.err
    }
}

/// Classified aggregates that may travel inside a `CError`.
fn classified(err: &BoxError) -> Option<&dyn Diagnostic> {
    if let Some(validation) = err.downcast_ref::<ValidationError>() {
        return Some(validation);
    }
    err.downcast_ref::<MultiError>()
        .map(|multi| multi as &dyn Diagnostic)
}

impl fmt::Display for CError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.err, f)
    }
}

impl Error for CError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.err.source()
    }
}

impl Diagnostic for CError {
    fn kind(&self) -> Option<ErrorKind> {
        Some(self.kind)
    }

    fn ops(&self) -> Option<&[String]> {
        Some(&self.ops)
    }

    fn ctx(&self) -> Option<&RequestContext> {
        Some(&self.ctx)
    }

    fn stack_trace(&self) -> Option<&str> {
        Some(&self.stack)
    }

    fn fields(&self) -> Option<FieldMap> {
        classified(&self.err).and_then(|inner| inner.fields())
    }

    fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::trace::{DEFAULT_OPS_DEPTH, LocationProvider, NoTrace};
    use crate::{DbKind, HttpKind, cerror, cerrorf};

    fn create_invoice(ctx: &RequestContext) -> CError {
        cerror!(ctx, DbKind::Conflict, "duplicate key value violates unique constraint")
    }

    #[test]
    fn macro_form_names_the_enclosing_function() {
        let err = create_invoice(&RequestContext::background());
        assert_eq!(err.kind(), ErrorKind::Db(DbKind::Conflict));
        assert!(!err.ops().is_empty());
        assert!(err.ops().len() <= DEFAULT_OPS_DEPTH);
        assert!(err.ops()[0].contains("create_invoice"), "{:?}", err.ops());
        assert!(!err.stack_trace().is_empty());
    }

    #[inline(never)]
    fn plain_constructor_site() -> CError {
        CError::new(&RequestContext::background(), HttpKind::NotExist, "no such invoice")
    }

    #[test]
    fn plain_form_resolves_the_caller_from_the_backtrace() {
        let err = plain_constructor_site();
        assert!(err.ops().len() <= DEFAULT_OPS_DEPTH);
        assert!(err.ops()[0].contains("plain_constructor_site"), "{:?}", err.ops());
    }

    #[inline(never)]
    fn generic_constructor_site<K: Into<ErrorKind>>(kind: K) -> CError {
        CError::new(&RequestContext::background(), kind, "no such invoice")
    }

    #[test]
    fn generic_constructors_never_lead_the_ops() {
        let err = generic_constructor_site(HttpKind::NotExist);
        let ops = err.ops();
        assert!(ops[0].contains("generic_constructor_site"), "{ops:?}");
        assert!(!ops.iter().any(|op| op.contains("CError")), "{ops:?}");
    }

    #[test]
    fn accessors_expose_the_wrapped_error() {
        let ctx = RequestContext::builder().tracer(NoTrace).trace_id("t-1").build();
        let err = CError::newf(&ctx, HttpKind::BadRequest, format_args!("limit {} too high", 500));
        assert_eq!(err.to_string(), "limit 500 too high");
        assert_eq!(err.err().to_string(), "limit 500 too high");
        assert!(err.source().is_none());
        assert_eq!(err.ctx().trace_id(), Some("t-1"));
        assert!(err.ops().is_empty());
        assert!(err.payload().is_none());
    }

    #[test]
    fn rewrapping_keeps_the_first_classification() {
        let ctx = RequestContext::builder().tracer(LocationProvider).build();
        let inner = CError::new(&ctx, DbKind::NotExist, "no rows in result set");
        let first_ops = inner.ops().to_vec();
        let outer = CError::new(&ctx, HttpKind::Other, inner);
        assert_eq!(outer.kind(), ErrorKind::Db(DbKind::NotExist));
        assert_eq!(outer.ops(), first_ops.as_slice());
    }

    #[test]
    fn rewrapping_a_validation_error_keeps_its_kind_and_fields() {
        let ctx = RequestContext::builder().tracer(LocationProvider).build();
        let validation = ValidationError::new(&ctx, [("name", "required")]);
        let first_ops = validation.as_cerror().ops().to_vec();

        let outer = CError::new(&ctx, HttpKind::Other, validation);
        assert_eq!(outer.kind(), ErrorKind::Http(HttpKind::BadValidation));
        assert_eq!(outer.ops(), first_ops.as_slice());
        assert_eq!(outer.to_string(), ValidationError::MESSAGE);
        assert_eq!(outer.payload(), Some(&json!({"name": "required"})));

        let wrap = crate::build_error_response(Some(&outer)).unwrap();
        assert_eq!(wrap.status_code(), 422);
        assert_eq!(wrap.error.kind, "bad_validation");
        assert_eq!(
            wrap.error.errors,
            Some([("name".to_string(), json!({"message": "required"}))].into_iter().collect())
        );
    }

    #[test]
    fn rewrapping_a_multi_error_keeps_its_kind() {
        let ctx = RequestContext::builder().tracer(NoTrace).build();
        let mut multi = MultiError::new(&ctx).with_kind(DbKind::Conflict);
        multi.append(ValidationError::new(&ctx, [("email", "taken")]));

        let outer = CError::new(&ctx, HttpKind::Other, multi);
        assert_eq!(outer.kind(), ErrorKind::Db(DbKind::Conflict));
        let fields = Diagnostic::fields(&outer).unwrap();
        assert_eq!(fields["email"], json!({"message": "taken"}));
    }

    #[derive(Debug, thiserror::Error)]
    #[error("insert failed")]
    struct InsertFailed(#[source] std::io::Error);

    #[test]
    fn source_skips_the_displayed_error() {
        let ctx = RequestContext::builder().tracer(NoTrace).build();
        let raw = InsertFailed(std::io::Error::other("disk gone"));
        let err = CError::new(&ctx, DbKind::Io, raw);
        assert_eq!(err.to_string(), "insert failed");
        assert_eq!(err.source().map(ToString::to_string).as_deref(), Some("disk gone"));
        assert!(Diagnostic::fields(&err).is_none());
    }

    #[test]
    fn payload_last_write_wins() {
        let ctx = RequestContext::builder().tracer(NoTrace).build();
        let err = cerrorf!(&ctx, HttpKind::Conflict, "order {} locked", 7)
            .with_payload(json!({"order": 7}))
            .with_payload(json!({"order": 8}));
        assert_eq!(err.payload(), Some(&json!({"order": 8})));
        assert_eq!(Diagnostic::payload(&err), Some(&json!({"order": 8})));
    }
}
