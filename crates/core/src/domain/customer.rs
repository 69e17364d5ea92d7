use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Identifier assigned by the destination system.
///
/// Destinations are free to use numbers or strings, so the raw JSON value is kept as received.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub Value);

impl RecordId {
    /// Path segment used to address the record: strings verbatim, anything else as JSON text.
    pub fn as_path_segment(&self) -> String {
        match &self.0 {
            Value::String(raw) => raw.clone(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_path_segment())
    }
}

impl From<u64> for RecordId {
    fn from(value: u64) -> Self {
        Self(Value::from(value))
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(Value::from(value))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdPolicy {
    /// Source-side records: any `id` on the payload is ignored.
    Optional,
    /// Destination-side records: an `id` key must be present.
    Required,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Customer {
    pub name: String,
    pub active_at: String,
    pub arr: Number,
    pub team_member_id: Vec<Number>,
    pub id: Option<RecordId>,
    pub extra: Map<String, Value>,
}

/// Body sent to the destination on create and update.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPayload<'a> {
    pub name: &'a str,
    pub active_at: &'a str,
    pub arr: &'a Number,
    pub team_member_id: &'a [Number],
}

impl Customer {
    pub fn write_payload(&self) -> CustomerPayload<'_> {
        CustomerPayload {
            name: &self.name,
            active_at: &self.active_at,
            arr: &self.arr,
            team_member_id: &self.team_member_id,
        }
    }
}
