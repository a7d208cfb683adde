// Rule registry: builtin catalog plus caller-registered extensions

use crate::rules::canonical_rule_name;
use crate::validators::{BuiltinFn, CATALOG};
use crate::{Rule, RuleContext, RuleResult};
use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Rules evaluated even when the field's value is empty
const ALWAYS_RUN: &[&str] = &["required"];

static BUILTINS: Lazy<HashMap<&'static str, Builtin>> =
    Lazy::new(|| CATALOG.iter().map(|(name, f)| (*name, Builtin(*f))).collect());

/// Builtin rule backed by a plain function
#[derive(Clone, Copy)]
struct Builtin(BuiltinFn);

impl Rule for Builtin {
    fn check(&self, params: &[String], value: &Value, ctx: &RuleContext<'_>) -> RuleResult<bool> {
        (self.0)(params, value, ctx)
    }
}

/// Extension rule backed by a closure returning a plain verdict
struct ClosureRule<F>(F);

impl<F> Rule for ClosureRule<F>
where
    F: Fn(&[String], &Value, &RuleContext<'_>) -> bool + Send + Sync,
{
    fn check(&self, params: &[String], value: &Value, ctx: &RuleContext<'_>) -> RuleResult<bool> {
        Ok((self.0)(params, value, ctx))
    }
}

#[derive(Clone)]
struct Extension {
    rule: Arc<dyn Rule>,
    always_run: bool,
}

/// A rule resolved for execution
#[derive(Clone, Copy)]
pub struct ResolvedRule<'a> {
    /// The checker
    pub rule: &'a dyn Rule,
    /// Whether the rule runs regardless of the field's truthiness
    pub always_run: bool,
}

/// Check if a name belongs to the builtin catalog
pub fn is_builtin(name: &str) -> bool {
    BUILTINS.contains_key(canonical_rule_name(name).as_str())
}

/// Canonical names of every builtin rule
pub fn builtin_names() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|(name, _)| *name)
}

/// Maps canonical rule names to checkers.
///
/// Builtins are resolved first, then extensions.
#[derive(Clone, Default)]
pub struct RuleRegistry {
    extensions: HashMap<String, Extension>,
}

impl RuleRegistry {
    /// Create a registry holding only the builtins
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or overwrite a closure extension
    pub fn add_extension<F>(&mut self, name: &str, predicate: F)
    where
        F: Fn(&[String], &Value, &RuleContext<'_>) -> bool + Send + Sync + 'static,
    {
        self.insert(name, Arc::new(ClosureRule(predicate)), false);
    }

    /// Register an extension that runs even when the field is empty
    pub fn add_implicit_extension<F>(&mut self, name: &str, predicate: F)
    where
        F: Fn(&[String], &Value, &RuleContext<'_>) -> bool + Send + Sync + 'static,
    {
        self.insert(name, Arc::new(ClosureRule(predicate)), true);
    }

    /// Register or overwrite a [`Rule`] implementation
    pub fn add_rule(&mut self, name: &str, rule: impl Rule + 'static) {
        self.insert(name, Arc::new(rule), false);
    }

    fn insert(&mut self, name: &str, rule: Arc<dyn Rule>, always_run: bool) {
        let name = canonical_rule_name(name);

        if BUILTINS.contains_key(name.as_str()) {
            warn!(rule = %name, "Extension is shadowed by a builtin rule and will never run");
        } else {
            debug!(rule = %name, always_run, "Registered rule extension");
        }

        self.extensions.insert(name, Extension { rule, always_run });
    }

    /// Check if an extension is registered under a name
    pub fn has_extension(&self, name: &str) -> bool {
        self.extensions.contains_key(&canonical_rule_name(name))
    }

    /// Remove an extension, returning whether one existed
    pub fn remove_extension(&mut self, name: &str) -> bool {
        self.extensions.remove(&canonical_rule_name(name)).is_some()
    }

    /// Resolve a canonical rule name
    pub fn resolve(&self, name: &str) -> Option<ResolvedRule<'_>> {
        if let Some(builtin) = BUILTINS.get(name) {
            return Some(ResolvedRule {
                rule: builtin,
                always_run: ALWAYS_RUN.contains(&name),
            });
        }

        self.extensions.get(name).map(|extension| ResolvedRule {
            rule: extension.rule.as_ref(),
            always_run: extension.always_run,
        })
    }
}

impl fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.extensions.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("RuleRegistry")
            .field("builtins", &BUILTINS.len())
            .field("extensions", &names)
            .finish()
    }
}
