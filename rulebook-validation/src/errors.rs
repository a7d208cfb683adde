//! Error types for rule compilation and execution

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Result type for configuration and execution of rule chains
pub type RuleResult<T> = Result<T, RuleError>;

/// Fatal configuration or programmer errors.
///
/// These abort the validation pass and are never collected into an
/// [`ErrorReport`].
#[derive(Debug, Error)]
pub enum RuleError {
    /// A rule name resolves to neither a builtin nor a registered extension
    #[error("Rule [{0}] does not exist")]
    RuleNotFound(String),

    /// A rule specification string contains an unusable token
    #[error("Malformed rule specification for field `{field}`: {reason} (in `{spec}`)")]
    MalformedRule {
        /// Field the specification belongs to
        field: String,
        /// The raw specification string
        spec: String,
        /// What is wrong with it
        reason: String,
    },

    /// A custom message key is not of the shape `field.rule`
    #[error("Malformed message key `{0}`: expected `field.rule`")]
    MalformedMessageKey(String),

    /// A builtin rule received parameters it cannot work with
    #[error("Invalid parameters for rule `{rule}`: {reason}")]
    InvalidParameters {
        /// Canonical rule name
        rule: String,
        /// What is wrong with the parameters
        reason: String,
    },

    /// Configuration could not be loaded
    #[error("Failed to load validator configuration: {0}")]
    LoadError(String),

    /// Configuration could not be parsed
    #[error("Failed to parse validator configuration: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RuleError {
    /// Create a malformed rule error
    pub fn malformed_rule(
        field: impl Into<String>,
        spec: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedRule {
            field: field.into(),
            spec: spec.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid parameters error
    pub fn invalid_params(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameters {
            rule: rule.into(),
            reason: reason.into(),
        }
    }

    /// Check if this error is an unresolved rule name
    pub fn is_rule_not_found(&self) -> bool {
        matches!(self, Self::RuleNotFound(_))
    }
}

/// Error returned by the `?`-friendly entry points ([`crate::Validator::validate`],
/// [`crate::Validate`], [`crate::ValidationPipe`]).
#[derive(Debug, Error)]
pub enum ValidateError {
    /// The record was evaluated and at least one rule failed
    #[error("Validation failed: {0}")]
    Failed(ErrorReport),

    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ValidateError {
    /// Get the collected failures if this is a validation failure
    pub fn report(&self) -> Option<&ErrorReport> {
        match self {
            Self::Failed(report) => Some(report),
            _ => None,
        }
    }
}

/// Per-field error messages collected during one validation pass.
///
/// Fields appear in the order of their first failure; messages keep the
/// order in which rules failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorReport {
    errors: IndexMap<String, Vec<String>>,
}

impl ErrorReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if there are any errors
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of fields with at least one error
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Total number of messages across all fields
    pub fn message_count(&self) -> usize {
        self.errors.values().map(Vec::len).sum()
    }

    /// Append a message for a field
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Drop every collected message
    pub fn clear(&mut self) {
        self.errors.clear();
    }

    /// Get all messages for a field
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.errors.get(field).map(Vec::as_slice)
    }

    /// Get the first message for a field
    pub fn first(&self, field: &str) -> Option<&str> {
        self.errors
            .get(field)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    /// Check if a field has any errors
    pub fn has(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// Iterate over `(field, messages)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.errors
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }

    /// Borrow the underlying map
    pub fn as_map(&self) -> &IndexMap<String, Vec<String>> {
        &self.errors
    }

    /// Consume the report into its underlying map
    pub fn into_inner(self) -> IndexMap<String, Vec<String>> {
        self.errors
    }

    /// Convert to JSON representation
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({ "errors": self.errors })
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for message in self.errors.values().flatten() {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}", message)?;
            first = false;
        }
        Ok(())
    }
}
