use std::fmt;

use faultline_error::{Diagnostic, RequestContext};

/// A check run against a request.
pub trait Validator: Send + Sync {
    fn validate(&self, ctx: &RequestContext) -> Result<(), Box<dyn Diagnostic>>;
}

impl<F> Validator for F
where
    F: Fn(&RequestContext) -> Result<(), Box<dyn Diagnostic>> + Send + Sync,
{
    fn validate(&self, ctx: &RequestContext) -> Result<(), Box<dyn Diagnostic>> {
        self(ctx)
    }
}

type Check<T> = Box<dyn Fn(&RequestContext, &T) -> Result<(), Box<dyn Diagnostic>> + Send + Sync>;

/// A value bound to the check that inspects it.
pub struct Validation<T> {
    value: T,
    check: Check<T>,
}

impl<T> Validation<T>
where
    T: Send + Sync,
{
    pub fn new<F>(value: T, check: F) -> Self
    where
        F: Fn(&RequestContext, &T) -> Result<(), Box<dyn Diagnostic>> + Send + Sync + 'static,
    {
        Self {
            value,
            check: Box::new(check),
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }
}

impl<T: Send + Sync> Validator for Validation<T> {
    fn validate(&self, ctx: &RequestContext) -> Result<(), Box<dyn Diagnostic>> {
        (self.check)(ctx, &self.value)
    }
}

impl<T: fmt::Debug> fmt::Debug for Validation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validation")
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}
