use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;

use itertools::Itertools;
use serde_json::{Map, Value, json};

use crate::trace::Origin;
use crate::{CError, Diagnostic, ErrorKind, FieldMap, HttpKind, Payload, RequestContext};

/// Input rejected field by field.
///
/// Displays as [`ValidationError::MESSAGE`]; the per-field messages are read
/// through [`Diagnostic::fields`]. The wrapped [`CError`] has kind
/// `bad_validation`, the `"key:message"` pairs as text and the messages as
/// payload.
#[derive(Debug)]
pub struct ValidationError {
    inner: CError,
    messages: BTreeMap<String, String>,
}

impl ValidationError {
    pub const MESSAGE: &'static str = "bad validation";

    #[track_caller]
    pub fn new<I, K, V>(ctx: &RequestContext, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let messages: BTreeMap<String, String> = fields
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let text = messages
            .iter()
            .map(|(k, v)| format!("{k}:{v}"))
            .join(", ");
        let payload: Map<String, Value> = messages
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        let inner = CError::at(Origin::caller(), ctx, HttpKind::BadValidation, text)
            .with_payload(Value::Object(payload));
        Self { inner, messages }
    }

    pub fn messages(&self) -> &BTreeMap<String, String> {
        &self.messages
    }

    pub fn as_cerror(&self) -> &CError {
        &self.inner
    }

    pub fn into_cerror(self) -> CError {
        self.inner
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Self::MESSAGE)
    }
}

impl Error for ValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.inner)
    }
}

impl Diagnostic for ValidationError {
    fn kind(&self) -> Option<ErrorKind> {
        Some(self.inner.kind())
    }

    fn ops(&self) -> Option<&[String]> {
        Some(self.inner.ops())
    }

    fn ctx(&self) -> Option<&RequestContext> {
        Some(self.inner.ctx())
    }

    fn stack_trace(&self) -> Option<&str> {
        Some(self.inner.stack_trace())
    }

    fn fields(&self) -> Option<FieldMap> {
        Some(
            self.messages
                .iter()
                .map(|(k, v)| (k.clone(), json!({ "message": v })))
                .collect(),
        )
    }

    fn payload(&self) -> Option<&Payload> {
        self.inner.payload()
    }
}
