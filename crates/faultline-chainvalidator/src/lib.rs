//! Request validation built from small checks.
//!
//! A [`Validation`] binds one value to the check that inspects it. Checks are
//! collected into a [`ValidationGroup`], which runs them in order and stops at
//! the first failure, or, once [`ValidationGroup::enable_parallel`] was called,
//! runs them all at once and reports every failure as one
//! [`faultline_error::MultiError`]. Groups are validators themselves and nest.
//!
//! ```rust,ignore
//! use faultline_chainvalidator::{Validation, ValidationGroup};
//! use faultline_error::{RequestContext, ValidationError};
//!
//! let ctx = RequestContext::new();
//! let mut group = ValidationGroup::new()
//!     .with(Validation::new(name, |ctx, name: &String| {
//!         if name.is_empty() {
//!             return Err(ValidationError::new(ctx, [("name", "required")]).into());
//!         }
//!         Ok(())
//!     }))
//!     .with(Validation::new(age, check_age));
//! group.enable_parallel()?;
//! group.validate(&ctx)?;
//! ```

pub mod group;
pub mod validator;

pub use group::{GroupError, ValidationGroup};
pub use validator::{Validation, Validator};
