use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    #[default]
    Post,
    Put,
    Delete,
}

/// How uploaded file bytes are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FileEncoding {
    /// Raw bytes; only a multipart file part can carry them
    Raw,
    Base64,
}

/// A hole in a request template, filled from the command or the server
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RequestParameter {
    Username,
    Password,
    Token,
    Uri,
    Location,
    File(FileEncoding),
    /// Takes the next unconsumed job id
    Field(String),
    /// Takes every remaining job id
    ForEach(String),
}

impl fmt::Display for RequestParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestParameter::Username => f.write_str("username"),
            RequestParameter::Password => f.write_str("password"),
            RequestParameter::Token => f.write_str("token"),
            RequestParameter::Uri => f.write_str("uri"),
            RequestParameter::Location => f.write_str("location"),
            RequestParameter::File(FileEncoding::Raw) => f.write_str("file(raw)"),
            RequestParameter::File(FileEncoding::Base64) => f.write_str("file(base64)"),
            RequestParameter::Field(name) => write!(f, "field({name})"),
            RequestParameter::ForEach(name) => write!(f, "forEach({name})"),
        }
    }
}

/// Body tree shared by the JSON and XML-RPC targets.
///
/// In descriptor files a parameter is written `{"$param": ...}`; every other
/// JSON value stands for itself.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "PayloadNode")]
pub enum PayloadTemplate {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    Parameter(RequestParameter),
    Array(Vec<PayloadTemplate>),
    Object(IndexMap<String, PayloadTemplate>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PayloadNode {
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    // before `Parameter`: a derived struct also accepts a sequence
    Array(Vec<PayloadTemplate>),
    Parameter {
        #[serde(rename = "$param")]
        param: RequestParameter,
    },
    Object(IndexMap<String, PayloadTemplate>),
}

impl From<PayloadNode> for PayloadTemplate {
    fn from(node: PayloadNode) -> Self {
        match node {
            PayloadNode::Parameter { param } => PayloadTemplate::Parameter(param),
            PayloadNode::Null => PayloadTemplate::Null,
            PayloadNode::Bool(b) => PayloadTemplate::Bool(b),
            PayloadNode::Int(n) => PayloadTemplate::Int(n),
            PayloadNode::Double(d) => PayloadTemplate::Double(d),
            PayloadNode::String(s) => PayloadTemplate::String(s),
            PayloadNode::Array(items) => PayloadTemplate::Array(items),
            PayloadNode::Object(members) => PayloadTemplate::Object(members),
        }
    }
}

impl PayloadTemplate {
    pub fn param(parameter: RequestParameter) -> Self {
        PayloadTemplate::Parameter(parameter)
    }

    pub fn object<K: Into<String>>(members: impl IntoIterator<Item = (K, PayloadTemplate)>) -> Self {
        PayloadTemplate::Object(members.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// True when a `forEach` parameter appears anywhere below this node
    pub fn contains_for_each(&self) -> bool {
        match self {
            PayloadTemplate::Parameter(RequestParameter::ForEach(_)) => true,
            PayloadTemplate::Array(items) => items.iter().any(Self::contains_for_each),
            PayloadTemplate::Object(members) => members.values().any(Self::contains_for_each),
            _ => false,
        }
    }
}

impl From<&str> for PayloadTemplate {
    fn from(s: &str) -> Self {
        PayloadTemplate::String(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct XmlRpcCall {
    pub method: String,
    #[serde(default)]
    pub params: Vec<PayloadTemplate>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "FormValueNode")]
pub enum FormValue {
    Literal(String),
    Parameter(RequestParameter),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FormValueNode {
    Parameter {
        #[serde(rename = "$param")]
        param: RequestParameter,
    },
    Bool(bool),
    Int(i64),
    String(String),
}

impl From<FormValueNode> for FormValue {
    fn from(node: FormValueNode) -> Self {
        match node {
            FormValueNode::Parameter { param } => FormValue::Parameter(param),
            FormValueNode::Bool(b) => FormValue::Literal(b.to_string()),
            FormValueNode::Int(n) => FormValue::Literal(n.to_string()),
            FormValueNode::String(s) => FormValue::Literal(s),
        }
    }
}

fn default_separator() -> String {
    ",".to_string()
}

/// One `name=value` pair of a query string, form body or multipart body
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FormItem {
    pub name: String,
    pub value: FormValue,
    /// Joins the ids of a `forEach` value
    #[serde(default = "default_separator")]
    pub separator: String,
    /// File name of a multipart file part
    #[serde(default)]
    pub filename: Option<String>,
}

impl FormItem {
    pub fn literal(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: FormValue::Literal(value.into()),
            separator: default_separator(),
            filename: None,
        }
    }

    pub fn param(name: impl Into<String>, parameter: RequestParameter) -> Self {
        Self {
            name: name.into(),
            value: FormValue::Parameter(parameter),
            separator: default_separator(),
            filename: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RequestBody {
    Json(PayloadTemplate),
    XmlRpc(XmlRpcCall),
    Form(Vec<FormItem>),
    Multipart(Vec<FormItem>),
}

/// Declarative shape of one wire request
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RequestTemplate {
    #[serde(default)]
    pub method: HttpMethod,
    /// Appended to the server URL's path
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub query: Vec<FormItem>,
    #[serde(default)]
    pub body: Option<RequestBody>,
}

impl RequestTemplate {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn with_query(mut self, query: Vec<FormItem>) -> Self {
        self.query = query;
        self
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_from_json() {
        let json = r#"{
            "method": "torrent-start",
            "arguments": {"ids": {"$param": {"forEach": "id"}}, "limit": 3, "ratio": 1.5, "x": null}
        }"#;
        let template: PayloadTemplate = serde_json::from_str(json).unwrap();

        let PayloadTemplate::Object(members) = &template else {
            panic!("expected object");
        };
        assert_eq!(members["method"], PayloadTemplate::from("torrent-start"));

        let PayloadTemplate::Object(arguments) = &members["arguments"] else {
            panic!("expected arguments object");
        };
        assert_eq!(
            arguments["ids"],
            PayloadTemplate::Parameter(RequestParameter::ForEach("id".into()))
        );
        assert_eq!(arguments["limit"], PayloadTemplate::Int(3));
        assert_eq!(arguments["ratio"], PayloadTemplate::Double(1.5));
        assert_eq!(arguments["x"], PayloadTemplate::Null);
        assert!(template.contains_for_each());
    }

    #[test]
    fn test_parameter_spellings() {
        let cases = [
            (r#"{"$param": "username"}"#, RequestParameter::Username),
            (r#"{"$param": "token"}"#, RequestParameter::Token),
            (r#"{"$param": {"file": "base64"}}"#, RequestParameter::File(FileEncoding::Base64)),
            (r#"{"$param": {"field": "id"}}"#, RequestParameter::Field("id".into())),
        ];

        for (json, expected) in cases {
            let template: PayloadTemplate = serde_json::from_str(json).unwrap();
            assert_eq!(template, PayloadTemplate::Parameter(expected), "case {json}");
        }
    }

    #[test]
    fn test_request_template_defaults() {
        let json = r#"{
            "path": "/api/v2/torrents/delete",
            "body": {"form": [
                {"name": "hashes", "value": {"$param": {"forEach": "hash"}}, "separator": "|"},
                {"name": "deleteFiles", "value": false}
            ]}
        }"#;
        let template: RequestTemplate = serde_json::from_str(json).unwrap();

        assert_eq!(template.method, HttpMethod::Post);
        assert!(template.query.is_empty());
        let Some(RequestBody::Form(items)) = &template.body else {
            panic!("expected form body");
        };
        assert_eq!(items[0].separator, "|");
        assert_eq!(items[1].value, FormValue::Literal("false".into()));
        assert_eq!(items[1].separator, ",");
    }

    #[test]
    fn test_xmlrpc_call_template() {
        let json = r#"{"method": "GET", "path": "/RPC2", "body": {"xmlRpc": {
            "method": "d.multicall2",
            "params": ["", "main", "d.hash="]
        }}}"#;
        let template: RequestTemplate = serde_json::from_str(json).unwrap();

        assert_eq!(template.method, HttpMethod::Get);
        let Some(RequestBody::XmlRpc(call)) = &template.body else {
            panic!("expected xml-rpc body");
        };
        assert_eq!(call.method, "d.multicall2");
        assert_eq!(call.params.len(), 3);
        assert!(!PayloadTemplate::Array(call.params.clone()).contains_for_each());
    }
}
