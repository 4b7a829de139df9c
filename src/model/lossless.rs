//! Lossless scalar decoding.
//!
//! Backends disagree about whether codes and ids are strings or numbers
//! (`4` vs `"4"`). Each decoder below handles one leaf shape; they are tried
//! in order and the first hit wins.

use serde::{Deserialize, Deserializer, de};

use super::StructuredValue;

pub type Decoder = fn(&StructuredValue) -> Option<String>;

/// String, number and bool leaves
pub const SCALAR: &[Decoder] = &[from_string, from_number, from_bool];

/// [`SCALAR`] plus `null`, rendered as `"null"`
pub const SCALAR_OR_NULL: &[Decoder] = &[from_string, from_number, from_bool, from_null];

fn from_string(value: &StructuredValue) -> Option<String> {
    value.as_str().map(str::to_string)
}

fn from_number(value: &StructuredValue) -> Option<String> {
    match value {
        StructuredValue::Number(n) => Some(
            n.as_i64()
                .map(|i| i.to_string())
                .unwrap_or_else(|| n.to_string()),
        ),
        _ => None,
    }
}

fn from_bool(value: &StructuredValue) -> Option<String> {
    match value {
        StructuredValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn from_null(value: &StructuredValue) -> Option<String> {
    matches!(value, StructuredValue::Null).then(|| "null".to_string())
}

/// Run `decoders` in priority order
pub fn decode(value: &StructuredValue, decoders: &[Decoder]) -> Option<String> {
    decoders.iter().find_map(|decoder| decoder(value))
}

/// `deserialize_with` helper for lists whose items may be strings or numbers
pub fn deserialize_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<serde_json::Value>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|item| {
            let value = StructuredValue::from(item);
            decode(&value, SCALAR).ok_or_else(|| {
                de::Error::custom(format!(
                    "expected a string, number or bool, got {}",
                    value.kind()
                ))
            })
        })
        .collect()
}
