// Validator configuration loading

use crate::{RuleError, RuleResult, Validator};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Toml,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(FileFormat::Json),
            "toml" => Some(FileFormat::Toml),
            _ => None,
        }
    }

    /// Detect the format from a file path's extension
    pub fn from_path(path: &Path) -> RuleResult<Self> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| RuleError::LoadError("No file extension found".to_string()))?;

        Self::from_extension(ext)
            .ok_or_else(|| RuleError::LoadError(format!("Unsupported format: {}", ext)))
    }
}

/// Rule and message specifications as stored in a configuration file.
///
/// ```toml
/// [rules]
/// age = "required|between:18,99"
/// email = "email|required"
///
/// [messages]
/// "email.required" = "Please fill email"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// `field => spec`, in evaluation order
    #[serde(default)]
    pub rules: IndexMap<String, String>,

    /// `field.rule => message`
    #[serde(default)]
    pub messages: IndexMap<String, String>,
}

impl ValidatorConfig {
    /// Parse configuration in the given format
    pub fn parse(content: &str, format: FileFormat) -> RuleResult<Self> {
        match format {
            FileFormat::Json => Self::from_json(content),
            FileFormat::Toml => Self::from_toml(content),
        }
    }

    pub fn from_json(content: &str) -> RuleResult<Self> {
        serde_json::from_str(content)
            .map_err(|e| RuleError::ParseError(format!("JSON parse error: {}", e)))
    }

    pub fn from_toml(content: &str) -> RuleResult<Self> {
        toml::from_str(content)
            .map_err(|e| RuleError::ParseError(format!("TOML parse error: {}", e)))
    }

    /// Load configuration from a `.json` or `.toml` file
    pub fn from_file(path: impl AsRef<Path>) -> RuleResult<Self> {
        let path = path.as_ref();
        let format = FileFormat::from_path(path)?;
        let content = fs::read_to_string(path)?;

        let config = Self::parse(&content, format)?;
        debug!(
            path = %path.display(),
            rules = config.rules.len(),
            messages = config.messages.len(),
            "Loaded validator configuration"
        );

        Ok(config)
    }

    /// Build a validator with these rules and messages and an empty record
    pub fn build(&self) -> RuleResult<Validator> {
        let mut validator = Validator::new();
        self.apply(&mut validator)?;
        Ok(validator)
    }

    /// Replace the rules and messages of an existing validator.
    ///
    /// Registered extensions and the record are kept.
    pub fn apply(&self, validator: &mut Validator) -> RuleResult<()> {
        validator
            .set_rules(self.rules.iter().map(|(field, spec)| (field.as_str(), spec.as_str())))?
            .set_messages(self.messages.iter().map(|(key, msg)| (key.as_str(), msg.as_str())))?;
        Ok(())
    }
}
