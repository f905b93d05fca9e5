use std::collections::BTreeMap;
use std::error::Error;

use crate::{CError, ErrorKind, MultiError, OpaqueError, RequestContext, ValidationError};

/// Owned, thread-safe raw error.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Field name → `{"message": ..}` map exposed by validation-style errors.
pub type FieldMap = BTreeMap<String, serde_json::Value>;

/// Structured data attached to an error for logs and responses.
pub type Payload = serde_json::Value;

/// Optional capabilities of an error travelling to the HTTP/log boundary.
///
/// Every accessor defaults to `None`, so a type opts into exactly the
/// capabilities it has. Aggregation and the bridges only ever query these
/// methods; they never match on concrete types.
pub trait Diagnostic: Error + Send + Sync + 'static {
    fn kind(&self) -> Option<ErrorKind> {
        None
    }

    /// Call sites recorded at construction, most recent first.
    fn ops(&self) -> Option<&[String]> {
        None
    }

    fn ctx(&self) -> Option<&RequestContext> {
        None
    }

    fn stack_trace(&self) -> Option<&str> {
        None
    }

    /// Per-field validation messages.
    fn fields(&self) -> Option<FieldMap> {
        None
    }

    fn payload(&self) -> Option<&Payload> {
        None
    }
}

impl dyn Diagnostic {
    pub fn is<T: Diagnostic>(&self) -> bool {
        self.downcast_ref::<T>().is_some()
    }

    pub fn downcast_ref<T: Diagnostic>(&self) -> Option<&T> {
        let err: &(dyn Error + 'static) = self;
        err.downcast_ref::<T>()
    }
}

macro_rules! boxed_diagnostic {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for Box<dyn Diagnostic> {
                fn from(err: $ty) -> Self {
                    Box::new(err)
                }
            }
        )+
    };
}

boxed_diagnostic!(CError, ValidationError, MultiError, OpaqueError);
