// Rule specification parsing and compiled rule chains

use crate::validators::check_params;
use crate::{RuleError, RuleResult};
use indexmap::IndexMap;
use tracing::debug;

const RULE_DELIMITER: char = '|';
const PARAMS_DELIMITER: char = ':';
const PARAM_SEPARATOR: char = ',';

/// Normalize a rule name for registry lookup.
///
/// Trims, maps `-` and spaces to `_`, splits camelCase boundaries, and
/// lowercases: `inArray` and `in-array` both become `in_array`.
pub fn canonical_rule_name(name: &str) -> String {
    let mut canonical = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;

    for c in name.trim().chars() {
        match c {
            '-' | ' ' | '_' => {
                canonical.push('_');
                prev_lower = false;
            }
            c if c.is_uppercase() => {
                if prev_lower {
                    canonical.push('_');
                }
                canonical.extend(c.to_lowercase());
                prev_lower = false;
            }
            c => {
                canonical.push(c);
                prev_lower = c.is_lowercase() || c.is_ascii_digit();
            }
        }
    }

    canonical
}

/// One parsed rule: canonical name plus literal parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleInvocation {
    name: String,
    params: Vec<String>,
}

impl RuleInvocation {
    /// Create an invocation, canonicalizing the rule name
    pub fn new(name: &str, params: Vec<String>) -> Self {
        Self {
            name: canonical_rule_name(name),
            params,
        }
    }

    /// Canonical rule name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Literal parameters in declaration order
    pub fn params(&self) -> &[String] {
        &self.params
    }
}

/// Ordered rule chain for one field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldRuleChain {
    invocations: Vec<RuleInvocation>,
}

impl FieldRuleChain {
    /// Parse a specification string such as `"required|email|min:3"`.
    ///
    /// `|`, `:` and `,` are always delimiters; there is no escaping.
    /// Builtin parameters are checked here, so `between:10` fails at
    /// configuration time with [`RuleError::InvalidParameters`].
    pub fn parse(field: &str, spec: &str) -> RuleResult<Self> {
        let mut invocations = Vec::new();

        for token in spec.split(RULE_DELIMITER) {
            let (name, params) = match token.split_once(PARAMS_DELIMITER) {
                Some((name, params)) => (
                    name,
                    params.split(PARAM_SEPARATOR).map(str::to_string).collect(),
                ),
                None => (token, Vec::new()),
            };

            if name.trim().is_empty() {
                return Err(RuleError::malformed_rule(field, spec, "empty rule name"));
            }

            let invocation = RuleInvocation::new(name, params);
            check_params(&invocation.name, &invocation.params)?;
            invocations.push(invocation);
        }

        Ok(Self { invocations })
    }

    /// Iterate over invocations in evaluation order
    pub fn iter(&self) -> std::slice::Iter<'_, RuleInvocation> {
        self.invocations.iter()
    }

    pub fn len(&self) -> usize {
        self.invocations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.invocations.is_empty()
    }

    /// Check if the chain contains a rule
    pub fn contains(&self, rule: &str) -> bool {
        let rule = canonical_rule_name(rule);
        self.invocations.iter().any(|i| i.name == rule)
    }
}

impl<'a> IntoIterator for &'a FieldRuleChain {
    type Item = &'a RuleInvocation;
    type IntoIter = std::slice::Iter<'a, RuleInvocation>;

    fn into_iter(self) -> Self::IntoIter {
        self.invocations.iter()
    }
}

/// Rule chains for every validated field, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledRules {
    chains: IndexMap<String, FieldRuleChain>,
}

impl CompiledRules {
    /// Compile `field => spec` pairs.
    ///
    /// Fails on the first malformed specification.
    pub fn compile<I, K, V>(rules: I) -> RuleResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let mut chains = IndexMap::new();

        for (field, spec) in rules {
            let field = field.into();
            let chain = FieldRuleChain::parse(&field, spec.as_ref())?;
            chains.insert(field, chain);
        }

        debug!(fields = chains.len(), "Compiled rule chains");

        Ok(Self { chains })
    }

    /// Get the chain for a field
    pub fn get(&self, field: &str) -> Option<&FieldRuleChain> {
        self.chains.get(field)
    }

    /// Iterate over `(field, chain)` pairs in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldRuleChain)> {
        self.chains.iter().map(|(field, chain)| (field.as_str(), chain))
    }

    /// Field names in declaration order
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.chains.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

/// Programmatic rule chain for one field.
///
/// Parameters are taken verbatim, so they may contain `|`, `:` or `,`.
#[derive(Debug, Clone)]
pub struct ValidationRules {
    field: String,
    invocations: Vec<RuleInvocation>,
}

impl ValidationRules {
    /// Create new validation rules for a field
    pub fn for_field(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            invocations: Vec::new(),
        }
    }

    /// Add a rule without parameters
    pub fn rule(self, name: &str) -> Self {
        self.with(name, Vec::<String>::new())
    }

    /// Add a rule with parameters
    pub fn with<P, S>(mut self, name: &str, params: P) -> Self
    where
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let params = params.into_iter().map(Into::into).collect();
        self.invocations.push(RuleInvocation::new(name, params));
        self
    }

    /// Field these rules apply to
    pub fn field(&self) -> &str {
        &self.field
    }
}

/// Builder assembling [`CompiledRules`] from [`ValidationRules`]
#[derive(Debug, Clone, Default)]
pub struct ValidationBuilder {
    rules: Vec<ValidationRules>,
}

impl ValidationBuilder {
    /// Create a new validation builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add rules for a field. A later entry for the same field replaces it.
    pub fn field(mut self, rules: ValidationRules) -> Self {
        self.rules.push(rules);
        self
    }

    /// Build the compiled rules, rejecting empty rule names and bad
    /// builtin parameters
    pub fn build(self) -> RuleResult<CompiledRules> {
        let mut chains = IndexMap::new();

        for rules in self.rules {
            for invocation in &rules.invocations {
                if invocation.name.is_empty() {
                    return Err(RuleError::malformed_rule(
                        &rules.field,
                        "<builder>",
                        "empty rule name",
                    ));
                }
                check_params(&invocation.name, &invocation.params)?;
            }
            chains.insert(
                rules.field,
                FieldRuleChain {
                    invocations: rules.invocations,
                },
            );
        }

        Ok(CompiledRules { chains })
    }
}
