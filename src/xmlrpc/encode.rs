use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use quick_xml::escape::escape;

use super::value::XmlRpcValue;

pub const DATETIME_FORMAT: &str = "%Y%m%dT%H:%M:%S";

/// A `methodCall` document
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub method: String,
    pub params: Vec<XmlRpcValue>,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, params: Vec<XmlRpcValue>) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }

    pub fn to_xml(&self) -> String {
        let mut xml = String::from("<?xml version=\"1.0\"?>\n<methodCall>");
        xml.push_str("<methodName>");
        xml.push_str(&escape(self.method.as_str()));
        xml.push_str("</methodName><params>");
        for param in &self.params {
            xml.push_str("<param>");
            write_value(&mut xml, param);
            xml.push_str("</param>");
        }
        xml.push_str("</params></methodCall>\n");
        xml
    }
}

fn write_value(xml: &mut String, value: &XmlRpcValue) {
    xml.push_str("<value>");
    match value {
        XmlRpcValue::Nil => xml.push_str("<nil/>"),
        XmlRpcValue::Bool(b) => {
            xml.push_str(if *b { "<boolean>1</boolean>" } else { "<boolean>0</boolean>" })
        }
        XmlRpcValue::Int(n) => {
            if i32::try_from(*n).is_ok() {
                xml.push_str(&format!("<i4>{n}</i4>"));
            } else {
                xml.push_str(&format!("<i8>{n}</i8>"));
            }
        }
        XmlRpcValue::Double(d) => xml.push_str(&format!("<double>{d}</double>")),
        XmlRpcValue::String(s) => {
            xml.push_str("<string>");
            xml.push_str(&escape(s.as_str()));
            xml.push_str("</string>");
        }
        XmlRpcValue::DateTime(d) => xml.push_str(&format!(
            "<dateTime.iso8601>{}</dateTime.iso8601>",
            d.format(DATETIME_FORMAT)
        )),
        XmlRpcValue::Base64(bytes) => {
            xml.push_str("<base64>");
            xml.push_str(&BASE64.encode(bytes));
            xml.push_str("</base64>");
        }
        XmlRpcValue::Array(items) => {
            xml.push_str("<array><data>");
            for item in items {
                write_value(xml, item);
            }
            xml.push_str("</data></array>");
        }
        XmlRpcValue::Struct(members) => {
            xml.push_str("<struct>");
            for (name, member) in members {
                xml.push_str("<member><name>");
                xml.push_str(&escape(name.as_str()));
                xml.push_str("</name>");
                write_value(xml, member);
                xml.push_str("</member>");
            }
            xml.push_str("</struct>");
        }
    }
    xml.push_str("</value>");
}
