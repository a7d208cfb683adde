// Validation traits

use crate::values::ABSENT;
use crate::{RuleResult, ValidateError, Validator};
use serde::Serialize;
use serde_json::Value;

/// A named check applied to one field's value.
///
/// Builtins and extensions share this contract: the literal parameters from
/// the rule specification, the field's current value (`null` when absent),
/// and the engine context.
pub trait Rule: Send + Sync {
    /// Check a value, returning `Ok(false)` for an ordinary validation failure
    fn check(&self, params: &[String], value: &Value, ctx: &RuleContext<'_>) -> RuleResult<bool>;
}

/// Engine context passed to every rule check
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    field: &'a str,
    data: &'a Value,
}

impl<'a> RuleContext<'a> {
    /// Create a context for a field of the given record
    pub fn new(field: &'a str, data: &'a Value) -> Self {
        Self { field, data }
    }

    /// Field currently under validation
    pub fn field(&self) -> &'a str {
        self.field
    }

    /// The raw input record
    pub fn data(&self) -> &'a Value {
        self.data
    }

    /// Raw input value of another field, `null` when absent
    pub fn get(&self, field: &str) -> &'a Value {
        self.data.get(field).unwrap_or(&ABSENT)
    }
}

/// Trait for types that declare their own rule specification.
///
/// The value is serialized into a record and run through a [`Validator`].
pub trait Validate: Serialize {
    /// `field => spec` pairs, e.g. `("age", "required|between:18,99")`
    fn rules() -> Vec<(&'static str, &'static str)>;

    /// `field.rule => message` pairs
    fn messages() -> Vec<(&'static str, &'static str)> {
        Vec::new()
    }

    /// Hook for registering extensions before evaluation
    fn register(_validator: &mut Validator) {}

    /// Validate the value and return the collected failures if any
    fn validate(&self) -> Result<(), ValidateError> {
        let data = serde_json::to_value(self)?;
        let mut validator = Validator::new();
        Self::register(&mut validator);
        validator
            .set_data(data)
            .set_rules(Self::rules())?
            .set_messages(Self::messages())?;
        validator.validate()
    }
}
