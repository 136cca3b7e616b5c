//! Serde helpers for raw command fields.

use serde::de::Error;
use serde::{Deserialize, Deserializer};

/// Accepts either a JSON string or a JSON number and keeps it as text.
///
/// Command fields such as quantities and prices are validated by the first
/// operation of a workflow, not at deserialization time, so a malformed value
/// must survive until then.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(D::Error::custom(format!(
            "expected a string or a number, found {other}"
        ))),
    }
}
