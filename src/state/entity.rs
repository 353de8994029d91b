use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Field holding the local enable flag of a turtle
pub const ENABLED: &str = "enabled";

/// TRC field names read by the typed accessors
pub const BATTERY_VOLTAGE: &str = "batteryvoltage";
pub const ROLE: &str = "role";
pub const TEAM_COLOR: &str = "teamcolor";
pub const HOME_GOAL: &str = "homegoal";

/// Partial field set for one turtle, as pushed by the server
pub type TurtlePatch = serde_json::Map<String, Value>;

/// Partial description of one or more turtles, keyed by turtle id
pub type Snapshot = BTreeMap<String, TurtlePatch>;

/// Turtle represents one tracked robot in the local table
///
/// Fields are kept schema-agnostic; `enabled` is always present.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Turtle {
    fields: BTreeMap<String, Value>,
}

impl Turtle {
    /// Fresh turtle: disabled, no other fields
    pub fn new() -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(ENABLED.to_string(), Value::Bool(false));
        Self { fields }
    }

    /// Enabled flag; any non-boolean value reads as disabled
    pub fn enabled(&self) -> bool {
        self.fields
            .get(ENABLED)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn fields(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    pub fn battery_voltage(&self) -> Option<u64> {
        self.get(BATTERY_VOLTAGE).and_then(Value::as_u64)
    }

    pub fn role(&self) -> Option<&str> {
        self.get(ROLE).and_then(Value::as_str)
    }

    pub fn team_color(&self) -> Option<&str> {
        self.get(TEAM_COLOR).and_then(Value::as_str)
    }

    pub fn home_goal(&self) -> Option<&str> {
        self.get(HOME_GOAL).and_then(Value::as_str)
    }

    /// Shallow merge: every mentioned field overwrites, the rest stay untouched
    pub(crate) fn merge_patch(&mut self, patch: &TurtlePatch) {
        for (field, value) in patch {
            self.fields.insert(field.clone(), value.clone());
        }
    }
}

impl Default for Turtle {
    fn default() -> Self {
        Self::new()
    }
}
