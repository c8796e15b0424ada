//! Attribute schema and validation
//!
//! A schema is a named table of attribute specs. Attribute values are plain
//! `serde_json::Value`s; the spec records whether an attribute is required,
//! optional or computed (server-assigned), its default, and cross-attribute
//! constraints. Validation runs before any remote call is made.

use crate::diagnostics::Diagnostics;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Per-attribute validation function. Returns a human-readable message on
/// failure; the attribute name is prepended by the schema.
pub type Validator = fn(&Value) -> Result<(), String>;

/// A configuration value as authored, before defaults are applied.
///
/// Distinguishes "unknown at plan time" (e.g. derived from another resource
/// that has not been created yet) from an explicit null from a concrete value.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Unknown,
    Null,
    Known(Value),
}

impl RawValue {
    pub fn is_known(&self) -> bool {
        matches!(self, RawValue::Known(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, RawValue::Null)
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            RawValue::Known(v) => Some(v),
            _ => None,
        }
    }
}

/// Specification of a single attribute
#[derive(Debug, Clone)]
pub struct AttrSpec {
    required: bool,
    optional: bool,
    computed: bool,
    force_new: bool,
    sensitive: bool,
    default: Option<Value>,
    conflicts_with: Vec<&'static str>,
    required_with: Vec<&'static str>,
    validator: Option<Validator>,
}

impl AttrSpec {
    pub fn required() -> Self {
        Self {
            required: true,
            optional: false,
            computed: false,
            force_new: false,
            sensitive: false,
            default: None,
            conflicts_with: Vec::new(),
            required_with: Vec::new(),
            validator: None,
        }
    }

    pub fn optional() -> Self {
        Self {
            required: false,
            optional: true,
            ..Self::required()
        }
    }

    /// Server-assigned, read-only attribute.
    pub fn computed() -> Self {
        Self {
            required: false,
            optional: false,
            computed: true,
            ..Self::required()
        }
    }

    /// Optional attribute whose value is server-assigned when unset.
    pub fn optional_computed() -> Self {
        Self {
            computed: true,
            ..Self::optional()
        }
    }

    /// Any change to this attribute forces destroy-and-recreate. The
    /// reconciliation engine never sees such changes; the marker exists so
    /// the runtime can split the diff.
    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn conflicts_with(mut self, names: &[&'static str]) -> Self {
        self.conflicts_with.extend_from_slice(names);
        self
    }

    pub fn required_with(mut self, names: &[&'static str]) -> Self {
        self.required_with.extend_from_slice(names);
        self
    }

    pub fn validate_with(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn is_computed(&self) -> bool {
        self.computed
    }

    pub fn is_force_new(&self) -> bool {
        self.force_new
    }

    pub fn is_sensitive(&self) -> bool {
        self.sensitive
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }
}

/// Attribute table for one resource type
#[derive(Debug, Clone, Default)]
pub struct Schema {
    attrs: BTreeMap<&'static str, AttrSpec>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attr(mut self, name: &'static str, spec: AttrSpec) -> Self {
        self.attrs.insert(name, spec);
        self
    }

    pub fn get(&self, name: &str) -> Option<&AttrSpec> {
        self.attrs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&&'static str, &AttrSpec)> {
        self.attrs.iter()
    }

    /// Validate an authored configuration against the schema.
    ///
    /// Checks, in order: unknown attributes, computed-only attributes set by
    /// the user, per-attribute validators, missing required attributes,
    /// conflicting attribute pairs, and `required_with` partners.
    pub fn validate(
        &self,
        config: &BTreeMap<String, Value>,
        raw: &BTreeMap<String, RawValue>,
    ) -> Diagnostics {
        let mut diags = Diagnostics::new();
        let mut conflict_pairs: BTreeSet<(&str, &str)> = BTreeSet::new();

        for (name, value) in config {
            let Some(spec) = self.attrs.get(name.as_str()) else {
                diags.error(format!("unknown attribute {name:?}"));
                continue;
            };

            if spec.computed && !spec.optional && !spec.required {
                diags.error(format!("{name:?} is read-only and cannot be configured"));
                continue;
            }

            if value.is_null() {
                continue;
            }

            if let Some(validator) = spec.validator {
                if let Err(message) = validator(value) {
                    diags.error(format!("{name:?}: {message}"));
                }
            }

            for other in &spec.conflicts_with {
                if is_set(config, other) {
                    // Conflicts may be declared on one side only; report each
                    // pair once regardless of which side carries it.
                    let pair = if name.as_str() < *other {
                        (name.as_str(), *other)
                    } else {
                        (*other, name.as_str())
                    };
                    if conflict_pairs.insert(pair) {
                        diags.error(format!("{:?} conflicts with {:?}", pair.0, pair.1));
                    }
                }
            }

            for other in &spec.required_with {
                if !is_set(config, other) {
                    diags.error(format!("{name:?} requires {other:?} to be set"));
                }
            }
        }

        for (name, spec) in &self.attrs {
            if spec.required && !is_set(config, name) {
                // An unknown value satisfies "present" at plan time.
                let known_later = matches!(raw.get(*name), Some(RawValue::Unknown));
                if !known_later {
                    diags.error(format!("{name:?} is required"));
                }
            }
        }

        diags
    }
}

fn is_set(config: &BTreeMap<String, Value>, name: &str) -> bool {
    config.get(name).is_some_and(|v| !v.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::new()
            .attr("name", AttrSpec::required())
            .attr(
                "auth_token",
                AttrSpec::optional().sensitive().conflicts_with(&["user_group_ids"]),
            )
            .attr("user_group_ids", AttrSpec::optional().conflicts_with(&["auth_token"]))
            .attr(
                "auth_token_update_strategy",
                AttrSpec::optional().required_with(&["auth_token"]),
            )
            .attr("arn", AttrSpec::computed())
            .attr("engine", AttrSpec::optional())
            .attr(
                "source_group_id",
                AttrSpec::optional().conflicts_with(&["engine"]),
            )
            .attr(
                "replica_count",
                AttrSpec::optional().validate_with(|v| {
                    match v.as_i64() {
                        Some(0..=5) => Ok(()),
                        _ => Err("must be between 0 and 5".into()),
                    }
                }),
            )
    }

    fn validate(config: &[(&str, Value)]) -> Diagnostics {
        let config: BTreeMap<String, Value> =
            config.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
        schema().validate(&config, &BTreeMap::new())
    }

    #[test]
    fn test_missing_required() {
        let diags = validate(&[]);
        assert!(diags.has_errors());
        assert!(diags.iter().any(|d| d.summary.contains("\"name\" is required")));
    }

    #[test]
    fn test_conflicting_attributes() {
        let diags = validate(&[
            ("name", json!("a")),
            ("auth_token", json!("0123456789abcdef")),
            ("user_group_ids", json!(["ug-1"])),
        ]);
        let conflicts: Vec<_> = diags
            .iter()
            .filter(|d| d.summary.contains("conflicts with"))
            .collect();
        assert_eq!(conflicts.len(), 1);
    }

    #[test]
    fn test_one_sided_conflict_detected() {
        // "engine" sorts before "source_group_id" and does not declare the
        // conflict itself; the pair must still be rejected.
        let diags = validate(&[
            ("name", json!("a")),
            ("engine", json!("redis")),
            ("source_group_id", json!("sg-1")),
        ]);
        let conflicts: Vec<_> = diags
            .iter()
            .filter(|d| d.summary.contains("conflicts with"))
            .collect();
        assert_eq!(conflicts.len(), 1);
    }

    #[test]
    fn test_required_with_partner_missing() {
        let diags = validate(&[
            ("name", json!("a")),
            ("auth_token_update_strategy", json!("rotate")),
        ]);
        assert!(diags.iter().any(|d| d.summary.contains("requires \"auth_token\"")));
    }

    #[test]
    fn test_computed_only_rejected() {
        let diags = validate(&[("name", json!("a")), ("arn", json!("arn:..."))]);
        assert!(diags.iter().any(|d| d.summary.contains("read-only")));
    }

    #[test]
    fn test_validator_runs() {
        let diags = validate(&[("name", json!("a")), ("replica_count", json!(9))]);
        assert!(diags.iter().any(|d| d.summary.contains("between 0 and 5")));
    }

    #[test]
    fn test_valid_config_passes() {
        let diags = validate(&[("name", json!("a")), ("replica_count", json!(2))]);
        assert!(diags.is_empty());
    }

    #[test]
    fn test_unknown_value_satisfies_required() {
        let config = BTreeMap::new();
        let mut raw = BTreeMap::new();
        raw.insert("name".to_string(), RawValue::Unknown);
        let diags = schema().validate(&config, &raw);
        assert!(!diags.has_errors());
    }
}
