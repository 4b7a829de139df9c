use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;
use chrono::{DateTime, NaiveDateTime, Utc};
use indexmap::IndexMap;
use quick_xml::Reader;
use quick_xml::events::Event;

use super::XmlRpcError;
use super::encode::DATETIME_FORMAT;
use super::value::XmlRpcValue;

/// Minimal element tree; XML-RPC never needs attributes
#[derive(Debug, Default)]
struct Node {
    name: String,
    text: String,
    children: Vec<Node>,
}

impl Node {
    fn new(raw_name: &[u8]) -> Self {
        let name = String::from_utf8_lossy(raw_name);
        // `ex:nil`, `ex:i8` from the Apache extensions namespace
        let local = name.rsplit(':').next().unwrap_or_default();
        Self {
            name: local.to_string(),
            ..Default::default()
        }
    }

    fn child(&self, name: &str) -> Result<&Node, XmlRpcError> {
        self.children
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| XmlRpcError::Malformed(format!("<{}> has no <{}>", self.name, name)))
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }
}

fn read_tree(xml: &str) -> Result<Node, XmlRpcError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Node> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(Node::new(start.name().as_ref())),
            Event::Empty(empty) => {
                let node = Node::new(empty.name().as_ref());
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => return Ok(node),
                }
            }
            Event::Text(text) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| XmlRpcError::Malformed("unbalanced end tag".into()))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(node),
                    None => return Ok(node),
                }
            }
            Event::Eof => {
                return Err(XmlRpcError::Malformed("document has no root element".into()));
            }
            _ => {}
        }
    }
}

/// Parse a `methodResponse` body into its single return value.
///
/// A `<fault>` response becomes [`XmlRpcError::Fault`].
pub fn parse_response(body: &[u8]) -> Result<XmlRpcValue, XmlRpcError> {
    let xml = std::str::from_utf8(body)?;
    let root = read_tree(xml)?;

    if root.name != "methodResponse" {
        return Err(XmlRpcError::Malformed(format!(
            "expected <methodResponse>, found <{}>",
            root.name
        )));
    }

    let outcome = root
        .children
        .first()
        .ok_or_else(|| XmlRpcError::Malformed("empty <methodResponse>".into()))?;

    match outcome.name.as_str() {
        "params" => {
            let value = outcome.child("param")?.child("value")?;
            parse_value(value)
        }
        "fault" => {
            let fault = parse_value(outcome.child("value")?)?;
            let code = match fault.get("faultCode") {
                Some(XmlRpcValue::Int(code)) => *code,
                _ => 0,
            };
            let message = match fault.get("faultString") {
                Some(XmlRpcValue::String(message)) => message.clone(),
                _ => String::new(),
            };
            Err(XmlRpcError::Fault { code, message })
        }
        other => Err(XmlRpcError::Malformed(format!(
            "unexpected <{other}> in <methodResponse>"
        ))),
    }
}

fn parse_value(node: &Node) -> Result<XmlRpcValue, XmlRpcError> {
    match node.children.first() {
        // untyped <value>text</value> is a string
        None => Ok(XmlRpcValue::String(node.text.clone())),
        Some(typed) => parse_typed(typed),
    }
}

fn parse_typed(node: &Node) -> Result<XmlRpcValue, XmlRpcError> {
    let text = node.text.trim();
    let invalid = || XmlRpcError::InvalidValue {
        kind: node.name.clone(),
        text: text.to_string(),
    };

    match node.name.as_str() {
        "i4" | "int" | "i8" => text.parse().map(XmlRpcValue::Int).map_err(|_| invalid()),
        "boolean" => match text {
            "1" | "true" => Ok(XmlRpcValue::Bool(true)),
            "0" | "false" => Ok(XmlRpcValue::Bool(false)),
            _ => Err(invalid()),
        },
        "string" => Ok(XmlRpcValue::String(node.text.clone())),
        "double" => text.parse().map(XmlRpcValue::Double).map_err(|_| invalid()),
        "dateTime.iso8601" => parse_datetime(text)
            .map(XmlRpcValue::DateTime)
            .ok_or_else(invalid),
        "base64" => {
            let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
            BASE64
                .decode(compact)
                .map(|bytes| XmlRpcValue::Base64(Bytes::from(bytes)))
                .map_err(|_| invalid())
        }
        "nil" => Ok(XmlRpcValue::Nil),
        "array" => {
            let data = node.child("data")?;
            let items = data
                .children_named("value")
                .map(parse_value)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(XmlRpcValue::Array(items))
        }
        "struct" => {
            let mut members = IndexMap::new();
            for member in node.children_named("member") {
                let name = member.child("name")?.text.clone();
                let value = parse_value(member.child("value")?)?;
                members.insert(name, value);
            }
            Ok(XmlRpcValue::Struct(members))
        }
        other => Err(XmlRpcError::Malformed(format!("unknown value type <{other}>"))),
    }
}

fn parse_datetime(text: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(text, DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S"))
        .map(|naive| naive.and_utc())
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|d| d.with_timezone(&Utc))
        })
}
