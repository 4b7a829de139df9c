use chrono::DateTime;
use thiserror::Error;

use crate::domain::{Eta, FieldType, FieldValue};
use crate::model::{Number, StructuredValue, lossless};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot represent {got} as {expected:?}")]
pub struct ConversionError {
    pub expected: FieldType,
    pub got: String,
}

fn unsigned(number: &Number) -> Option<u64> {
    match number {
        Number::Opaque(text) => text.parse().ok(),
        other => other.as_i64().and_then(|n| u64::try_from(n).ok()),
    }
}

/// Convert a matched leaf to the declared field type.
///
/// `Ok(None)` means the field is declared irrelevant and is discarded.
pub fn convert(
    kind: FieldType,
    value: &StructuredValue,
) -> Result<Option<FieldValue>, ConversionError> {
    let fail = || ConversionError {
        expected: kind,
        got: value.summary(),
    };

    let converted = match (kind, value) {
        (FieldType::Irrelevant, _) => return Ok(None),
        (FieldType::Int, StructuredValue::Number(n)) => n.as_i64().map(FieldValue::Int),
        (FieldType::Float, StructuredValue::Number(n)) => n.as_f64().map(FieldValue::Float),
        (FieldType::UnixDate, StructuredValue::Date(date)) => Some(FieldValue::Date(*date)),
        (FieldType::UnixDate, StructuredValue::Number(n)) => n
            .as_i64()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(FieldValue::Date),
        (FieldType::Speed, StructuredValue::Number(n)) => unsigned(n).map(FieldValue::Speed),
        (FieldType::Size, StructuredValue::Number(n)) => unsigned(n).map(FieldValue::Size),
        (FieldType::Seconds, StructuredValue::Number(n)) if n.is_negative() => {
            Some(FieldValue::Seconds(Eta::Infinite))
        }
        (FieldType::Seconds, StructuredValue::Number(n)) => {
            unsigned(n).map(|secs| FieldValue::Seconds(Eta::Seconds(secs)))
        }
        (FieldType::String, leaf) => {
            lossless::decode(leaf, lossless::SCALAR_OR_NULL).map(FieldValue::String)
        }
        (FieldType::Bool, StructuredValue::Bool(b)) => Some(FieldValue::Bool(*b)),
        _ => None,
    };

    converted.map(Some).ok_or_else(fail)
}
