//! Validation rules

pub mod script;
pub mod task;

use crate::{config::LintConfig, diagnostics::ValidationResult, parsers::Resource};

/// Trait for resource validators
///
/// Implementations never fail outright: decoding or lookup problems are
/// reported as error findings so that sibling resources still get validated.
pub trait Validator {
    fn validate(&self, resource: &Resource, config: &LintConfig) -> ValidationResult;
}
