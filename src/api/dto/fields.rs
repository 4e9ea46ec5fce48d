//! Lenient field deserializers for request bodies.
//!
//! Clients of the account API send loosely typed JSON. These helpers turn
//! `null` and absent values into empty ones so that `validator` rules, not
//! serde, decide which fields are missing.

use serde::de::{Deserializer, Error};
use serde::Deserialize;
use serde_json::Value;

/// `null` becomes an empty string; any non-string value is rejected.
pub fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// True only for the JSON literal `true`; `"true"`, `1` and friends are false.
pub fn strict_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)? == Value::Bool(true))
}

/// An array of strings, or empty for anything that is not an array.
pub fn string_list_or_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                other => Err(D::Error::custom(format!(
                    "expected a username string, found {}",
                    other
                ))),
            })
            .collect(),
        _ => Ok(Vec::new()),
    }
}
