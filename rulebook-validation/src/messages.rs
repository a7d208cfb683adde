// Custom error message table

use crate::rules::canonical_rule_name;
use crate::{RuleError, RuleResult};
use std::collections::HashMap;
use tracing::debug;

/// Default message for a failed rule
pub fn default_message(field: &str, rule: &str) -> String {
    format!("{} is not {}", field, rule)
}

/// Custom messages keyed by field, then by canonical rule name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageTable {
    messages: HashMap<String, HashMap<String, String>>,
}

impl MessageTable {
    /// Compile `"field.rule" => message` pairs.
    ///
    /// Every key must contain exactly one `.` with a non-empty field and rule.
    pub fn compile<I, K, V>(messages: I) -> RuleResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut table: HashMap<String, HashMap<String, String>> = HashMap::new();
        let mut count = 0usize;

        for (key, message) in messages {
            let key = key.as_ref();
            let mut parts = key.split('.');
            let (field, rule) = match (parts.next(), parts.next(), parts.next()) {
                (Some(field), Some(rule), None) if !field.is_empty() && !rule.trim().is_empty() => {
                    (field, rule)
                }
                _ => return Err(RuleError::MalformedMessageKey(key.to_string())),
            };

            table
                .entry(field.to_string())
                .or_default()
                .insert(canonical_rule_name(rule), message.into());
            count += 1;
        }

        debug!(messages = count, "Compiled message table");

        Ok(Self { messages: table })
    }

    /// Custom message for a field and rule, if any
    pub fn get(&self, field: &str, rule: &str) -> Option<&str> {
        self.messages
            .get(field)
            .and_then(|rules| rules.get(rule))
            .map(String::as_str)
    }

    /// Custom message if present, default template otherwise
    pub fn resolve(&self, field: &str, rule: &str) -> String {
        self.get(field, rule)
            .map(str::to_string)
            .unwrap_or_else(|| default_message(field, rule))
    }

    /// Number of custom messages
    pub fn len(&self) -> usize {
        self.messages.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_and_resolve() {
        let table = MessageTable::compile([
            ("age.required", "Please fill age"),
            ("email.email", "Please fill email"),
            ("email.inArray", "Pick a listed email"),
        ])
        .unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.get("age", "required"), Some("Please fill age"));
        assert_eq!(table.get("email", "in_array"), Some("Pick a listed email"));
        assert_eq!(table.resolve("email", "email"), "Please fill email");
        assert_eq!(table.resolve("email", "required"), "email is not required");
        assert_eq!(table.resolve("name", "required"), "name is not required");
    }

    #[test]
    fn test_malformed_keys() {
        for key in ["age", "age.required.extra", ".required", "age.", ""] {
            let error = MessageTable::compile([(key, "message")]).unwrap_err();
            assert!(
                matches!(error, RuleError::MalformedMessageKey(ref k) if k == key),
                "key {key:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_later_entry_wins() {
        let table = MessageTable::compile([("age.max", "first"), ("age.max", "second")]).unwrap();
        assert_eq!(table.get("age", "max"), Some("second"));
    }

    #[test]
    fn test_empty_table() {
        let table = MessageTable::compile(Vec::<(String, String)>::new()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.resolve("age", "max"), "age is not max");
    }
}
