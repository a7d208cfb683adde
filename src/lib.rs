// Rulebook - declarative record validation for Rust
//
// This library validates JSON-shaped records against compact per-field rule
// chains such as "required|email|min:3", with custom messages and pluggable rules.

// Re-export the validation engine
pub use rulebook_validation::*;

// Re-export JSON helpers used to build records
pub use serde_json::{Value, json};

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        ErrorReport, Rule, RuleContext, RuleError, RuleResult, Validate, ValidateError,
        ValidationBuilder, ValidationPipe, ValidationRules, Validator, ValidatorConfig, Value, json,
        rules,
    };
}
