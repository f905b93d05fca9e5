use std::error::Error;
use std::fmt;

use crate::{BoxError, Diagnostic};

/// An unclassified error carried alongside diagnosed ones.
///
/// Exposes no capabilities: a [`crate::MultiError`] keeps it in `errors()` but
/// leaves it out of `fields()`, and the HTTP bridge reports it as
/// `other_error`.
#[derive(Debug)]
pub struct OpaqueError(BoxError);

impl OpaqueError {
    pub fn new(err: impl Into<BoxError>) -> Self {
        Self(err.into())
    }

    pub fn get_ref(&self) -> &(dyn Error + Send + Sync + 'static) {
        self.0.as_ref()
    }

    pub fn into_inner(self) -> BoxError {
        self.0
    }
}

impl fmt::Display for OpaqueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Error for OpaqueError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.0.source()
    }
}

impl Diagnostic for OpaqueError {}
