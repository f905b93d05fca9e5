use std::error::Error;
use std::fmt;

use itertools::Itertools;
use serde_json::json;

use crate::trace::Origin;
use crate::{Diagnostic, ErrorKind, FieldMap, HttpKind, RequestContext};

/// Key prefix for errors that have a kind but no field messages.
pub const OTHER_FIELD_PREFIX: &str = "__other_";

/// Ordered collection of errors gathered from independent checks.
///
/// Appending is `&mut self`; callers sharing one across threads wrap it in a
/// lock.
#[derive(Debug)]
pub struct MultiError {
    kind: ErrorKind,
    ctx: RequestContext,
    ops: Vec<String>,
    stack: String,
    errors: Vec<Box<dyn Diagnostic>>,
}

impl MultiError {
    /// Empty aggregate of kind `bad_validation`.
    #[track_caller]
    pub fn new(ctx: &RequestContext) -> Self {
        let trace = ctx.tracer().capture(Origin::caller());
        Self {
            kind: HttpKind::BadValidation.into(),
            ctx: ctx.clone(),
            ops: trace.ops,
            stack: trace.stack,
            errors: Vec::new(),
        }
    }

    pub fn with_kind(mut self, kind: impl Into<ErrorKind>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn with_errors<I>(mut self, errors: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Box<dyn Diagnostic>>,
    {
        self.errors.extend(errors.into_iter().map(Into::into));
        self
    }

    pub fn append(&mut self, err: impl Into<Box<dyn Diagnostic>>) -> &mut Self {
        self.errors.push(err.into());
        self
    }

    pub fn errors(&self) -> &[Box<dyn Diagnostic>] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_errors(self) -> Vec<Box<dyn Diagnostic>> {
        self.errors
    }

    /// `Ok(())` when nothing was collected.
    pub fn into_result(self) -> Result<(), MultiError> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    /// Flatten the field messages of every contained error.
    ///
    /// In insertion order: errors exposing fields are merged (later keys win),
    /// other errors with a kind become `__other_<n>` entries, errors with
    /// neither are left out.
    pub fn fields(&self) -> FieldMap {
        let mut out = FieldMap::new();
        let mut others = 0usize;
        for err in &self.errors {
            if let Some(fields) = err.fields() {
                out.extend(fields);
            } else if err.kind().is_some() {
                others += 1;
                out.insert(
                    format!("{OTHER_FIELD_PREFIX}{others}"),
                    json!({ "message": err.to_string() }),
                );
            }
        }
        out
    }
}

impl fmt::Display for MultiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            f.write_str("no errors")
        } else {
            write!(f, "{}", self.errors.iter().join("; "))
        }
    }
}

impl Error for MultiError {}

impl Diagnostic for MultiError {
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
        Some(MultiError::fields(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::LocationProvider;
    use crate::{CError, DbKind, OpaqueError, ValidationError};

    fn ctx() -> RequestContext {
        RequestContext::builder().tracer(LocationProvider).build()
    }

    #[test]
    fn fields_merge_validation_and_number_the_rest() {
        let ctx = ctx();
        let multi = MultiError::new(&ctx).with_errors::<Vec<Box<dyn Diagnostic>>>(vec![
            ValidationError::new(&ctx, [("name", "required")]).into(),
            CError::new(&ctx, HttpKind::Conflict, "x").into(),
        ]);
        let expected: FieldMap = [
            ("name".to_string(), json!({"message": "required"})),
            ("__other_1".to_string(), json!({"message": "x"})),
        ]
        .into_iter()
        .collect();
        assert_eq!(multi.fields(), expected);
    }

    #[test]
    fn opaque_errors_are_kept_but_not_flattened() {
        let ctx = ctx();
        let mut multi = MultiError::new(&ctx);
        multi
            .append(OpaqueError::new("socket closed"))
            .append(CError::new(&ctx, DbKind::Io, "connection reset"))
            .append(CError::new(&ctx, DbKind::NotExist, "no rows"));
        assert_eq!(multi.len(), 3);
        let fields = multi.fields();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["__other_1"], json!({"message": "connection reset"}));
        assert_eq!(fields["__other_2"], json!({"message": "no rows"}));
    }

    #[test]
    fn nested_aggregates_flatten_recursively() {
        let ctx = ctx();
        let mut inner = MultiError::new(&ctx);
        inner.append(ValidationError::new(&ctx, [("a", "first")]));
        let mut outer = MultiError::new(&ctx);
        outer
            .append(inner)
            .append(ValidationError::new(&ctx, [("a", "second"), ("b", "other")]));
        let fields = outer.fields();
        assert_eq!(fields["a"], json!({"message": "second"}));
        assert_eq!(fields["b"], json!({"message": "other"}));
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn display_and_result() {
        let ctx = ctx();
        let empty = MultiError::new(&ctx);
        assert_eq!(empty.to_string(), "no errors");
        assert!(empty.into_result().is_ok());

        let mut multi = MultiError::new(&ctx).with_kind(DbKind::Conflict);
        multi.append(CError::new(&ctx, DbKind::Conflict, "a"));
        multi.append(OpaqueError::new("b"));
        assert_eq!(multi.to_string(), "a; b");
        assert_eq!(Diagnostic::kind(&multi), Some(ErrorKind::Db(DbKind::Conflict)));
        let err = multi.into_result().unwrap_err();
        assert_eq!(err.into_errors().len(), 2);
    }
}
