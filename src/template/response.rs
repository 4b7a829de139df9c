use indexmap::IndexMap;
use serde::Deserialize;

use crate::domain::{FieldType, PresetField};
use crate::model::ResponseFormat;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AdHocField {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FieldType,
}

/// Identity and type of an extracted job field
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FieldSpec {
    Preset(PresetField),
    AdHoc(AdHocField),
}

impl FieldSpec {
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldSpec::Preset(field) => field.field_type(),
            FieldSpec::AdHoc(field) => field.kind,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            FieldSpec::Preset(field) => field.as_str(),
            FieldSpec::AdHoc(field) => &field.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResponseParameter {
    Field(FieldSpec),
    Token,
    Destination,
}

/// Expected shape of a response.
///
/// Descriptor files spell the extra leaf kinds as `{"$param": ...}` and
/// `{"$forEach": [...]}`; strings, bools and integers are exact-match
/// literals, objects and arrays mirror the response.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "ExpectedNode")]
pub enum ExpectedValue {
    Parameter(ResponseParameter),
    /// Cycled over the elements of a response array; one full pass over the
    /// cycle is one record
    ForEach(Vec<ExpectedValue>),
    String(String),
    Bool(bool),
    Int(i64),
    Dictionary(IndexMap<String, ExpectedValue>),
    Array(Vec<ExpectedValue>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ExpectedNode {
    Bool(bool),
    Int(i64),
    String(String),
    Array(Vec<ExpectedValue>),
    Parameter {
        #[serde(rename = "$param")]
        param: ResponseParameter,
    },
    ForEach {
        #[serde(rename = "$forEach")]
        cycle: Vec<ExpectedValue>,
    },
    Dictionary(IndexMap<String, ExpectedValue>),
}

impl From<ExpectedNode> for ExpectedValue {
    fn from(node: ExpectedNode) -> Self {
        match node {
            ExpectedNode::Bool(b) => ExpectedValue::Bool(b),
            ExpectedNode::Int(n) => ExpectedValue::Int(n),
            ExpectedNode::String(s) => ExpectedValue::String(s),
            ExpectedNode::Array(items) => ExpectedValue::Array(items),
            ExpectedNode::Parameter { param } => ExpectedValue::Parameter(param),
            ExpectedNode::ForEach { cycle } => ExpectedValue::ForEach(cycle),
            ExpectedNode::Dictionary(members) => ExpectedValue::Dictionary(members),
        }
    }
}

impl ExpectedValue {
    pub fn preset(field: PresetField) -> Self {
        ExpectedValue::Parameter(ResponseParameter::Field(FieldSpec::Preset(field)))
    }

    pub fn ad_hoc(name: impl Into<String>, kind: FieldType) -> Self {
        ExpectedValue::Parameter(ResponseParameter::Field(FieldSpec::AdHoc(AdHocField {
            name: name.into(),
            kind,
        })))
    }

    pub fn dictionary<K: Into<String>>(
        members: impl IntoIterator<Item = (K, ExpectedValue)>,
    ) -> Self {
        ExpectedValue::Dictionary(members.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Label used in mismatch diagnostics
    pub fn describe(&self) -> String {
        match self {
            ExpectedValue::Parameter(_) => "parameter".to_string(),
            ExpectedValue::ForEach(cycle) => format!("array (forEach of width {})", cycle.len()),
            ExpectedValue::String(s) => format!("{s:?}"),
            ExpectedValue::Bool(b) => b.to_string(),
            ExpectedValue::Int(n) => n.to_string(),
            ExpectedValue::Dictionary(_) => "dictionary".to_string(),
            ExpectedValue::Array(items) => format!("array of {}", items.len()),
        }
    }
}

/// What a command's response is expected to look like
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResponseTemplate {
    #[serde(default)]
    pub format: ResponseFormat,
    pub body: ExpectedValue,
}

impl ResponseTemplate {
    pub fn json(body: ExpectedValue) -> Self {
        Self {
            format: ResponseFormat::Json,
            body,
        }
    }

    pub fn xml_rpc(body: ExpectedValue) -> Self {
        Self {
            format: ResponseFormat::XmlRpc,
            body,
        }
    }
}
