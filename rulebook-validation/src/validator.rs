// Validation engine

use crate::values::{ABSENT, is_truthy};
use crate::{
    CompiledRules, ErrorReport, MessageTable, Rule, RuleContext, RuleError, RuleRegistry,
    RuleResult, ValidateError,
};
use serde_json::Value;
use tracing::{debug, error, trace};

/// Lifecycle of a [`Validator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidatorState {
    /// Constructed or reconfigured since the last evaluation
    Configured,
    /// A validation pass has run since the last configuration change
    Evaluated,
}

/// Validates a record against per-field rule chains.
///
/// Configuration methods take `&mut self`, so a shared validator cannot be
/// reconfigured or evaluated concurrently.
///
/// # Examples
///
/// ```
/// use rulebook_validation::Validator;
/// use serde_json::json;
///
/// let mut validator = Validator::make(
///     json!({"age": 20, "email": ""}),
///     [("age", "required"), ("email", "email|required")],
///     [("email.required", "Please fill email")],
/// )
/// .unwrap();
///
/// assert!(validator.fails().unwrap());
/// assert_eq!(validator.errors().get("email").unwrap(), &["Please fill email"]);
/// ```
#[derive(Debug, Clone)]
pub struct Validator {
    data: Value,
    rules: CompiledRules,
    messages: MessageTable,
    registry: RuleRegistry,
    errors: ErrorReport,
    state: ValidatorState,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Create a validator with no data, rules, or messages
    pub fn new() -> Self {
        Self {
            data: Value::Object(Default::default()),
            rules: CompiledRules::default(),
            messages: MessageTable::default(),
            registry: RuleRegistry::new(),
            errors: ErrorReport::new(),
            state: ValidatorState::Configured,
        }
    }

    /// Create a fully configured validator.
    ///
    /// Malformed rule specifications or message keys are reported here.
    pub fn make<R, RK, RV, M, MK, MV>(
        data: impl Into<Value>,
        rules: R,
        messages: M,
    ) -> RuleResult<Self>
    where
        R: IntoIterator<Item = (RK, RV)>,
        RK: Into<String>,
        RV: AsRef<str>,
        M: IntoIterator<Item = (MK, MV)>,
        MK: AsRef<str>,
        MV: Into<String>,
    {
        let mut validator = Self::new();
        validator
            .set_data(data)
            .set_rules(rules)?
            .set_messages(messages)?;
        Ok(validator)
    }

    /// Replace the record under validation
    pub fn set_data(&mut self, data: impl Into<Value>) -> &mut Self {
        self.data = data.into();
        if !self.data.is_object() {
            debug!("Record is not an object; every field will be treated as absent");
        }
        self.state = ValidatorState::Configured;
        self
    }

    /// Replace and recompile the rule specifications.
    ///
    /// On error the previous rules stay in place.
    pub fn set_rules<I, K, V>(&mut self, rules: I) -> RuleResult<&mut Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        self.rules = CompiledRules::compile(rules)?;
        self.state = ValidatorState::Configured;
        Ok(self)
    }

    /// Replace the rules with an already compiled set
    pub fn set_compiled_rules(&mut self, rules: CompiledRules) -> &mut Self {
        self.rules = rules;
        self.state = ValidatorState::Configured;
        self
    }

    /// Replace and recompile the custom messages.
    ///
    /// On error the previous messages stay in place.
    pub fn set_messages<I, K, V>(&mut self, messages: I) -> RuleResult<&mut Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        self.messages = MessageTable::compile(messages)?;
        self.state = ValidatorState::Configured;
        Ok(self)
    }

    /// The raw record
    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn rules(&self) -> &CompiledRules {
        &self.rules
    }

    pub fn messages(&self) -> &MessageTable {
        &self.messages
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn state(&self) -> ValidatorState {
        self.state
    }

    /// Register or overwrite an extension rule.
    ///
    /// Extensions are skipped for empty values, like every rule except `required`.
    pub fn add_extension<F>(&mut self, name: &str, predicate: F) -> &mut Self
    where
        F: Fn(&[String], &Value, &RuleContext<'_>) -> bool + Send + Sync + 'static,
    {
        self.registry.add_extension(name, predicate);
        self
    }

    /// Register an extension that runs even for empty values
    pub fn add_implicit_extension<F>(&mut self, name: &str, predicate: F) -> &mut Self
    where
        F: Fn(&[String], &Value, &RuleContext<'_>) -> bool + Send + Sync + 'static,
    {
        self.registry.add_implicit_extension(name, predicate);
        self
    }

    /// Register a [`Rule`] implementation as an extension
    pub fn add_rule(&mut self, name: &str, rule: impl Rule + 'static) -> &mut Self {
        self.registry.add_rule(name, rule);
        self
    }

    /// Run validation and report whether every rule passed.
    ///
    /// Unknown rules and bad rule parameters abort the pass with an error;
    /// they never appear in [`Validator::errors`].
    pub fn passes(&mut self) -> RuleResult<bool> {
        self.errors.clear();
        let outcome = self.run();
        self.state = ValidatorState::Evaluated;
        outcome?;

        debug!(
            fields = self.rules.len(),
            failed_fields = self.errors.len(),
            "Validation pass finished"
        );

        Ok(self.errors.is_empty())
    }

    /// Negation of [`Validator::passes`]
    pub fn fails(&mut self) -> RuleResult<bool> {
        self.passes().map(|passed| !passed)
    }

    /// Run validation, returning the report as an error when a rule failed
    pub fn validate(&mut self) -> Result<(), ValidateError> {
        if self.passes()? {
            Ok(())
        } else {
            Err(ValidateError::Failed(self.errors.clone()))
        }
    }

    /// Failures collected by the most recent pass
    pub fn errors(&self) -> &ErrorReport {
        &self.errors
    }

    fn run(&mut self) -> RuleResult<()> {
        for (field, chain) in self.rules.iter() {
            let value = self.data.get(field).unwrap_or(&ABSENT);
            let ctx = RuleContext::new(field, &self.data);
            let present = is_truthy(value);

            for invocation in chain {
                let name = invocation.name();
                let Some(resolved) = self.registry.resolve(name) else {
                    error!(field = %field, rule = %name, "Rule does not exist");
                    return Err(RuleError::RuleNotFound(name.to_string()));
                };

                if !resolved.always_run && !present {
                    trace!(field = %field, rule = %name, "Skipping rule for empty value");
                    continue;
                }

                let passed = resolved.rule.check(invocation.params(), value, &ctx)?;
                trace!(field = %field, rule = %name, passed, "Evaluated rule");

                if !passed {
                    self.errors.add(field, self.messages.resolve(field, name));
                }
            }
        }

        Ok(())
    }
}
