//! Structured Response Matcher
//!
//! Recursive descent over an [`ExpectedValue`] template and a
//! [`StructuredValue`] response:
//!
//! - dictionaries and arrays must have the same shape in the response;
//!   extra response keys are ignored, a missing key is tolerated only when
//!   its template is a parameter
//! - literals must be equal to the response leaf
//! - `forEach` cycles its element templates over a response array; only
//!   complete cycles are matched
//! - field parameters are converted by their declared type; a leaf that
//!   does not convert drops that one field

mod convert;
mod fields;

pub use convert::{ConversionError, convert};
pub use fields::MatchedFields;

use thiserror::Error;
use tracing::debug;

use crate::domain::JobRaw;
use crate::model::{StructuredValue, lossless};
use crate::template::{ExpectedValue, FieldSpec, ResponseParameter};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("at {path}: expected {expected}, got {got}")]
    Mismatch {
        path: String,
        expected: String,
        got: String,
    },

    #[error("at {path}: missing key '{key}'")]
    MissingKey { path: String, key: String },
}

/// Match `response` against `template`, collecting every extracted value
pub fn match_response(
    response: &StructuredValue,
    template: &ExpectedValue,
) -> Result<MatchedFields, MatchError> {
    let mut matcher = Matcher::default();
    matcher.walk(response, template, "$")?;
    Ok(matcher.fields)
}

#[derive(Default)]
struct Matcher {
    fields: MatchedFields,
    /// Record of the current outermost `forEach` cycle
    record: Option<JobRaw>,
    depth: usize,
}

fn mismatch(path: &str, expected: &ExpectedValue, got: &StructuredValue) -> MatchError {
    MatchError::Mismatch {
        path: path.to_string(),
        expected: expected.describe(),
        got: got.summary(),
    }
}

impl Matcher {
    fn walk(
        &mut self,
        value: &StructuredValue,
        template: &ExpectedValue,
        path: &str,
    ) -> Result<(), MatchError> {
        match (template, value) {
            (ExpectedValue::Parameter(parameter), _) => self.extract(parameter, value, path),

            (ExpectedValue::String(expected), StructuredValue::String(got)) if expected == got => {
                Ok(())
            }
            (ExpectedValue::Bool(expected), StructuredValue::Bool(got)) if expected == got => Ok(()),
            (ExpectedValue::Int(expected), StructuredValue::Number(got))
                if got.as_i64() == Some(*expected) =>
            {
                Ok(())
            }

            (ExpectedValue::Dictionary(members), StructuredValue::Dictionary(map)) => {
                for (key, member) in members {
                    let child = format!("{path}.{key}");
                    match map.get(key) {
                        Some(item) => self.walk(item, member, &child)?,
                        None if matches!(member, ExpectedValue::Parameter(_)) => {
                            debug!(path = %child, "Optional key absent");
                        }
                        None => {
                            return Err(MatchError::MissingKey {
                                path: path.to_string(),
                                key: key.clone(),
                            });
                        }
                    }
                }
                Ok(())
            }

            (ExpectedValue::Array(templates), StructuredValue::Array(items))
                if items.len() >= templates.len() =>
            {
                for (i, (item, member)) in items.iter().zip(templates).enumerate() {
                    self.walk(item, member, &format!("{path}[{i}]"))?;
                }
                Ok(())
            }

            (ExpectedValue::ForEach(cycle), StructuredValue::Array(items)) => {
                self.cycle(items, cycle, path)
            }

            _ => Err(mismatch(path, template, value)),
        }
    }

    fn cycle(
        &mut self,
        items: &[StructuredValue],
        cycle: &[ExpectedValue],
        path: &str,
    ) -> Result<(), MatchError> {
        let width = cycle.len();
        if width == 0 {
            return Ok(());
        }

        let leftover = items.len() % width;
        if leftover != 0 {
            debug!(path, width, leftover, "Skipping incomplete trailing cycle");
        }

        self.depth += 1;
        let outermost = self.depth == 1;

        for (row, chunk) in items.chunks_exact(width).enumerate() {
            if outermost {
                self.record = Some(JobRaw::default());
            }
            for (offset, (item, member)) in chunk.iter().zip(cycle).enumerate() {
                let index = row * width + offset;
                self.walk(item, member, &format!("{path}[{index}]"))?;
            }
            if outermost {
                if let Some(record) = self.record.take() {
                    self.fields.records.push(record);
                }
            }
        }

        self.depth -= 1;
        Ok(())
    }

    fn extract(
        &mut self,
        parameter: &ResponseParameter,
        value: &StructuredValue,
        path: &str,
    ) -> Result<(), MatchError> {
        match parameter {
            ResponseParameter::Field(spec) => {
                match convert(spec.field_type(), value) {
                    Ok(Some(converted)) => {
                        let target = match self.record.as_mut() {
                            Some(record) => record,
                            None => &mut self.fields.root,
                        };
                        match spec {
                            FieldSpec::Preset(field) => target.insert_preset(*field, converted),
                            FieldSpec::AdHoc(field) => {
                                target.insert_ad_hoc(field.name.clone(), converted)
                            }
                        }
                    }
                    Ok(None) => {}
                    Err(error) => {
                        debug!(path, field = spec.name(), %error, "Dropping unconvertible field");
                    }
                }
                Ok(())
            }
            ResponseParameter::Token => {
                let token = lossless::decode(value, lossless::SCALAR)
                    .ok_or_else(|| mismatch(path, &ExpectedValue::Parameter(parameter.clone()), value))?;
                self.fields.token.get_or_insert(token);
                Ok(())
            }
            ResponseParameter::Destination => {
                let destination = lossless::decode(value, lossless::SCALAR)
                    .ok_or_else(|| mismatch(path, &ExpectedValue::Parameter(parameter.clone()), value))?;
                self.fields.destinations.push(destination);
                Ok(())
            }
        }
    }
}
