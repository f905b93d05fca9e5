use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use faultline_error::{Diagnostic, MultiError, RequestContext};

use crate::Validator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GroupError {
    #[error("validation mode cannot change once the group has validated")]
    ModeLocked,
}

/// Ordered validators run as one.
///
/// Sequential by default: nodes run in insertion order and the first failure
/// is returned unchanged. In parallel mode every node runs on the rayon pool
/// and all failures come back together as a [`MultiError`]; the call returns
/// once the slowest node is done.
#[derive(Default)]
pub struct ValidationGroup {
    nodes: Vec<Box<dyn Validator>>,
    parallel: bool,
    validated: AtomicBool,
}

impl ValidationGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: impl Validator + 'static) -> &mut Self {
        self.nodes.push(Box::new(node));
        self
    }

    pub fn with(mut self, node: impl Validator + 'static) -> Self {
        self.push(node);
        self
    }

    /// Switch to parallel mode. Only allowed before the first `validate`.
    pub fn enable_parallel(&mut self) -> Result<&mut Self, GroupError> {
        if self.validated.load(Ordering::Acquire) {
            return Err(GroupError::ModeLocked);
        }
        self.parallel = true;
        Ok(self)
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn validate_sequential(&self, ctx: &RequestContext) -> Result<(), Box<dyn Diagnostic>> {
        for node in &self.nodes {
            node.validate(ctx)?;
        }
        Ok(())
    }

    fn validate_parallel(&self, ctx: &RequestContext) -> Result<(), Box<dyn Diagnostic>> {
        tracing::debug!(nodes = self.nodes.len(), "validating group in parallel");
        // Created on the first failure, so passing groups capture no trace.
        let errors: Mutex<Option<MultiError>> = Mutex::new(None);
        rayon::scope(|s| {
            for node in &self.nodes {
                let errors = &errors;
                s.spawn(move |_| {
                    if let Err(err) = node.validate(ctx) {
                        errors
                            .lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .get_or_insert_with(|| MultiError::new(ctx))
                            .append(err);
                    }
                });
            }
        });
        match errors.into_inner().unwrap_or_else(PoisonError::into_inner) {
            Some(errors) => {
                tracing::debug!(failed = errors.len(), "parallel group finished");
                Err(errors.into())
            }
            None => {
                tracing::debug!(failed = 0, "parallel group finished");
                Ok(())
            }
        }
    }
}

impl Validator for ValidationGroup {
    fn validate(&self, ctx: &RequestContext) -> Result<(), Box<dyn Diagnostic>> {
        self.validated.store(true, Ordering::Release);
        if self.parallel {
            self.validate_parallel(ctx)
        } else {
            self.validate_sequential(ctx)
        }
    }
}

impl fmt::Debug for ValidationGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationGroup")
            .field("nodes", &self.nodes.len())
            .field("parallel", &self.parallel)
            .field("validated", &self.validated.load(Ordering::Relaxed))
            .finish()
    }
}
