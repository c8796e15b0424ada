//! Per-pass resource data
//!
//! [`ResourceData`] carries everything one reconciliation pass needs: the
//! prior state, the desired configuration, the raw (pre-default) config
//! values, and the remote identifier. The diff it exposes is frozen for the
//! duration of the pass: the planner reads it once and the executor works
//! from the produced plan only.

use crate::diagnostics::Diagnostics;
use crate::resource::ReconcileTimeouts;
use crate::schema::{RawValue, Schema};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct ResourceData {
    schema: Schema,
    id: Option<String>,
    state: BTreeMap<String, Value>,
    config: BTreeMap<String, Value>,
    raw: BTreeMap<String, RawValue>,
    is_new: bool,
    timeouts: ReconcileTimeouts,
}

impl ResourceData {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            id: None,
            state: BTreeMap::new(),
            config: BTreeMap::new(),
            raw: BTreeMap::new(),
            is_new: true,
            timeouts: ReconcileTimeouts::default(),
        }
    }

    /// Adopt the identifier of an already-provisioned object (read, update,
    /// delete and import passes).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.adopt_id(id);
        self
    }

    pub fn with_timeouts(mut self, timeouts: ReconcileTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    // --- identifier lifecycle ---

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Assign the identifier during Create. The resource stays "new" for the
    /// remainder of the pass so a trailing Read does not treat listing lag as
    /// an out-of-band deletion.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    pub fn adopt_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
        self.is_new = false;
    }

    /// Remove the object from state (observed deleted out of band).
    pub fn clear_id(&mut self) {
        self.id = None;
        self.state.clear();
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn timeouts(&self) -> &ReconcileTimeouts {
        &self.timeouts
    }

    // --- configuration authoring ---

    pub fn set_config(&mut self, name: &str, value: Value) {
        self.raw.insert(name.to_string(), RawValue::Known(value.clone()));
        self.config.insert(name.to_string(), value);
    }

    /// An attribute explicitly set to null.
    pub fn set_config_null(&mut self, name: &str) {
        self.raw.insert(name.to_string(), RawValue::Null);
        self.config.insert(name.to_string(), Value::Null);
    }

    /// An attribute whose value is not known at plan time.
    pub fn set_config_unknown(&mut self, name: &str) {
        self.raw.insert(name.to_string(), RawValue::Unknown);
    }

    /// Seed prior state (what the last pass persisted).
    pub fn set_state(&mut self, name: &str, value: Value) {
        self.state.insert(name.to_string(), value);
    }

    pub fn validate(&self) -> Diagnostics {
        self.schema.validate(&self.config, &self.raw)
    }

    // --- reads ---

    /// Effective value: configuration, falling back to state, falling back to
    /// the schema default.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(v) = self.config.get(name) {
            if !v.is_null() {
                return Some(v.clone());
            }
        }
        if let Some(v) = self.state.get(name) {
            if !v.is_null() {
                return Some(v.clone());
            }
        }
        self.schema
            .get(name)
            .and_then(|spec| spec.default_value().cloned())
    }

    pub fn get_str(&self, name: &str) -> Option<String> {
        self.get(name).and_then(|v| v.as_str().map(str::to_string))
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(|v| v.as_i64())
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(|v| v.as_bool())
    }

    pub fn get_str_list(&self, name: &str) -> Vec<String> {
        str_list(self.get(name))
    }

    pub fn get_str_map(&self, name: &str) -> BTreeMap<String, String> {
        self.get(name)
            .and_then(|v| match v {
                Value::Object(map) => Some(
                    map.into_iter()
                        .filter_map(|(k, v)| v.as_str().map(|s| (k, s.to_string())))
                        .collect(),
                ),
                _ => None,
            })
            .unwrap_or_default()
    }

    /// The authored value before defaults: known, null, or unknown.
    pub fn raw_config(&self, name: &str) -> RawValue {
        self.raw.get(name).cloned().unwrap_or(RawValue::Null)
    }

    // --- diff ---

    /// True when the configuration sets this attribute to a value different
    /// from the prior state. Attributes absent from the configuration never
    /// report a change, and neither does an explicit null: unsetting means
    /// unmanaged, clearing a remote value takes a configured zero value.
    pub fn has_change(&self, name: &str) -> bool {
        let Some(new) = self.config.get(name) else {
            return false;
        };
        if new.is_null() {
            return false;
        }
        self.state.get(name) != Some(new)
    }

    pub fn has_changes(&self, names: &[&str]) -> bool {
        names.iter().any(|name| self.has_change(name))
    }

    /// Any change outside the given attributes.
    pub fn has_changes_except(&self, except: &[&str]) -> bool {
        self.config
            .keys()
            .filter(|name| !except.contains(&name.as_str()))
            .any(|name| self.has_change(name))
    }

    /// (old, new) values for an attribute. `new` falls back to the prior
    /// state when the configuration does not set the attribute.
    pub fn get_change(&self, name: &str) -> (Option<Value>, Option<Value>) {
        let old = self.state.get(name).cloned();
        let new = self
            .config
            .get(name)
            .filter(|v| !v.is_null())
            .cloned()
            .or_else(|| old.clone());
        (old, new)
    }

    // --- flatten-back ---

    /// Write a remotely-observed value into state.
    pub fn set(&mut self, name: &str, value: Value) {
        self.state.insert(name.to_string(), value);
    }

    /// Remove an attribute from state.
    pub fn clear(&mut self, name: &str) {
        self.state.remove(name);
    }

    pub fn state(&self) -> &BTreeMap<String, Value> {
        &self.state
    }
}

/// Flatten a JSON array of strings into a `Vec<String>`.
pub fn str_list(value: Option<Value>) -> Vec<String> {
    value
        .and_then(|v| match v {
            Value::Array(items) => Some(
                items
                    .into_iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect(),
            ),
            _ => None,
        })
        .unwrap_or_default()
}
