//! Request Template Resolver
//!
//! Turns a [`RequestTemplate`] plus a [`Command`] and a [`Server`] into a
//! literal [`WireRequest`]. Resolution is a pure function: the only state is
//! the id cursor, which lives for one call.
//!
//! Parameter sources:
//!
//! | parameter | source | when absent |
//! |---|---|---|
//! | `username` / `password` / `token` | server | empty string |
//! | `uri` / `location` / `file` | command | omitted |
//! | `field` | last unconsumed id | omitted |
//! | `forEach` | every remaining id | omitted |
//!
//! Traversal is declaration order, query items before the body.

mod cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;
use reqwest::Url;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::descriptor::Authentication;
use crate::domain::{Command, Server};
use crate::template::{
    FileEncoding, FormItem, FormValue, PayloadTemplate, RequestBody, RequestParameter,
    RequestTemplate,
};
use crate::transport::{MultipartPart, WireBody, WireRequest};
use crate::xmlrpc::{MethodCall, XmlRpcValue};
use cursor::IdCursor;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("{parameter} cannot be rendered into a {target} request")]
    IncompatibleParameter {
        parameter: String,
        target: &'static str,
    },

    #[error("invalid server URL: {0}")]
    InvalidUrl(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Json,
    XmlRpc,
    Query,
    Form,
    Multipart,
}

impl Target {
    fn as_str(self) -> &'static str {
        match self {
            Target::Json => "JSON",
            Target::XmlRpc => "XML-RPC",
            Target::Query => "query",
            Target::Form => "form",
            Target::Multipart => "multipart",
        }
    }
}

/// Value a parameter resolved to, before the target shapes it
enum Filled<'a> {
    Text(String),
    Ids(Vec<&'a str>),
    File(Bytes),
}

fn incompatible(parameter: &RequestParameter, target: Target) -> ResolveError {
    ResolveError::IncompatibleParameter {
        parameter: parameter.to_string(),
        target: target.as_str(),
    }
}

/// Resolve `template` for one invocation of `command` against `server`
pub fn resolve(
    template: &RequestTemplate,
    command: &Command,
    server: &Server,
) -> Result<WireRequest, ResolveError> {
    let mut resolver = Resolver {
        command,
        server,
        cursor: IdCursor::new(command.ids()),
        bound: None,
    };

    let mut url = endpoint(server, &template.path)?;
    let query = resolver.pairs(&template.query, Target::Query)?;
    if !query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (name, value) in &query {
            pairs.append_pair(name, value);
        }
    }

    let body = match &template.body {
        None => WireBody::Empty,
        Some(RequestBody::Json(payload)) => {
            WireBody::Json(resolver.json(payload)?.unwrap_or(Value::Null))
        }
        Some(RequestBody::XmlRpc(call)) => {
            let params = resolver.xml_list(&call.params)?;
            WireBody::Xml(MethodCall::new(call.method.clone(), params).to_xml())
        }
        Some(RequestBody::Form(items)) => WireBody::Form(resolver.pairs(items, Target::Form)?),
        Some(RequestBody::Multipart(items)) => WireBody::Multipart(resolver.parts(items)?),
    };

    debug!(
        server = %server.name,
        command = %command,
        url = %url,
        unused_ids = resolver.cursor.len(),
        "Resolved request"
    );

    Ok(WireRequest {
        method: template.method,
        url,
        headers: auth_headers(server),
        body,
        timeout: server.timeout,
    })
}

fn endpoint(server: &Server, path: &str) -> Result<Url, ResolveError> {
    let mut url = server.url.clone();
    if url.cannot_be_a_base() {
        return Err(ResolveError::InvalidUrl(url.to_string()));
    }
    if let Some(port) = server.port {
        url.set_port(Some(port))
            .map_err(|_| ResolveError::InvalidUrl(format!("{url} cannot carry a port")))?;
    }
    if !path.is_empty() {
        let joined = format!(
            "{}/{}",
            url.path().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        url.set_path(&joined);
    }
    Ok(url)
}

fn auth_headers(server: &Server) -> Vec<(String, String)> {
    let mut headers = Vec::new();
    for auth in &server.api.authentication {
        match auth {
            Authentication::Basic => {
                if let Some(credentials) = &server.credentials {
                    let pair = format!("{}:{}", credentials.username, credentials.password);
                    headers.push((
                        reqwest::header::AUTHORIZATION.to_string(),
                        format!("Basic {}", BASE64.encode(pair)),
                    ));
                }
            }
            Authentication::Token(scheme) => {
                if let Some(token) = &server.token {
                    headers.push((scheme.header.clone(), token.clone()));
                }
            }
        }
    }
    headers
}

struct Resolver<'a> {
    command: &'a Command,
    server: &'a Server,
    cursor: IdCursor<'a>,
    /// Id a repeated XML-RPC struct is being instantiated for
    bound: Option<&'a str>,
}

impl<'a> Resolver<'a> {
    fn fill(
        &mut self,
        parameter: &RequestParameter,
        target: Target,
    ) -> Result<Option<Filled<'a>>, ResolveError> {
        let text = |s: &str| Filled::Text(s.to_string());

        let filled = match parameter {
            RequestParameter::Username => Some(text(self.server.username())),
            RequestParameter::Password => Some(text(self.server.password())),
            RequestParameter::Token => Some(text(self.server.token())),
            RequestParameter::Uri => self.command.uri().map(text),
            RequestParameter::Location => self.command.location().map(text),
            RequestParameter::File(FileEncoding::Base64) => self
                .command
                .file()
                .map(|bytes| Filled::Text(BASE64.encode(bytes))),
            RequestParameter::File(FileEncoding::Raw) => {
                if target != Target::Multipart {
                    return Err(incompatible(parameter, target));
                }
                self.command.file().map(|bytes| Filled::File(bytes.clone()))
            }
            RequestParameter::Field(_) => self.cursor.next().map(text),
            RequestParameter::ForEach(_) => match self.bound {
                Some(id) => Some(text(id)),
                None => {
                    let ids = self.cursor.drain();
                    (!ids.is_empty()).then_some(Filled::Ids(ids))
                }
            },
        };
        Ok(filled)
    }

    fn json(&mut self, node: &PayloadTemplate) -> Result<Option<Value>, ResolveError> {
        let value = match node {
            PayloadTemplate::Null => Value::Null,
            PayloadTemplate::Bool(b) => Value::Bool(*b),
            PayloadTemplate::Int(n) => Value::from(*n),
            PayloadTemplate::Double(d) => Value::from(*d),
            PayloadTemplate::String(s) => Value::String(s.clone()),
            PayloadTemplate::Parameter(parameter) => match self.fill(parameter, Target::Json)? {
                None => return Ok(None),
                Some(Filled::Text(text)) => Value::String(text),
                Some(Filled::Ids(ids)) => Value::Array(ids.into_iter().map(Value::from).collect()),
                Some(Filled::File(_)) => return Err(incompatible(parameter, Target::Json)),
            },
            PayloadTemplate::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    let splice = matches!(item, PayloadTemplate::Parameter(RequestParameter::ForEach(_)));
                    match self.json(item)? {
                        Some(Value::Array(ids)) if splice => out.extend(ids),
                        Some(value) => out.push(value),
                        None => {}
                    }
                }
                Value::Array(out)
            }
            PayloadTemplate::Object(members) => {
                let mut map = serde_json::Map::new();
                for (key, member) in members {
                    if let Some(value) = self.json(member)? {
                        map.insert(key.clone(), value);
                    }
                }
                Value::Object(map)
            }
        };
        Ok(Some(value))
    }

    fn xml_value(&mut self, node: &PayloadTemplate) -> Result<Option<XmlRpcValue>, ResolveError> {
        let value = match node {
            PayloadTemplate::Null => XmlRpcValue::Nil,
            PayloadTemplate::Bool(b) => XmlRpcValue::Bool(*b),
            PayloadTemplate::Int(n) => XmlRpcValue::Int(*n),
            PayloadTemplate::Double(d) => XmlRpcValue::Double(*d),
            PayloadTemplate::String(s) => XmlRpcValue::String(s.clone()),
            PayloadTemplate::Parameter(parameter) => match self.fill(parameter, Target::XmlRpc)? {
                None => return Ok(None),
                Some(Filled::Text(text)) => XmlRpcValue::String(text),
                Some(Filled::Ids(ids)) => {
                    XmlRpcValue::Array(ids.into_iter().map(XmlRpcValue::from).collect())
                }
                Some(Filled::File(_)) => return Err(incompatible(parameter, Target::XmlRpc)),
            },
            PayloadTemplate::Array(items) => XmlRpcValue::Array(self.xml_list(items)?),
            PayloadTemplate::Object(members) => {
                let mut map = indexmap::IndexMap::new();
                for (key, member) in members {
                    if let Some(value) = self.xml_value(member)? {
                        map.insert(key.clone(), value);
                    }
                }
                XmlRpcValue::Struct(map)
            }
        };
        Ok(Some(value))
    }

    /// Elements of an XML-RPC array or parameter list.
    ///
    /// A `forEach` leaf splices one element per remaining id; a struct
    /// mentioning `forEach` is instantiated once per remaining id.
    fn xml_list(&mut self, items: &[PayloadTemplate]) -> Result<Vec<XmlRpcValue>, ResolveError> {
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            let repeats = self.bound.is_none() && item.contains_for_each();

            match item {
                PayloadTemplate::Parameter(_) if repeats => match self.xml_value(item)? {
                    Some(XmlRpcValue::Array(ids)) => out.extend(ids),
                    Some(value) => out.push(value),
                    None => {}
                },
                PayloadTemplate::Object(_) if repeats => {
                    for id in self.cursor.drain() {
                        self.bound = Some(id);
                        let value = self.xml_value(item);
                        self.bound = None;
                        if let Some(value) = value? {
                            out.push(value);
                        }
                    }
                }
                _ => {
                    if let Some(value) = self.xml_value(item)? {
                        out.push(value);
                    }
                }
            }
        }
        Ok(out)
    }

    fn form_text(&mut self, item: &FormItem, target: Target) -> Result<Option<String>, ResolveError> {
        let parameter = match &item.value {
            FormValue::Literal(text) => return Ok(Some(text.clone())),
            FormValue::Parameter(parameter) => parameter,
        };

        match self.fill(parameter, target)? {
            None => Ok(None),
            Some(Filled::Text(text)) => Ok(Some(text)),
            Some(Filled::Ids(ids)) => Ok(Some(ids.join(&item.separator))),
            Some(Filled::File(_)) => Err(incompatible(parameter, target)),
        }
    }

    fn pairs(
        &mut self,
        items: &[FormItem],
        target: Target,
    ) -> Result<Vec<(String, String)>, ResolveError> {
        let mut pairs = Vec::with_capacity(items.len());
        for item in items {
            if let Some(value) = self.form_text(item, target)? {
                pairs.push((item.name.clone(), value));
            }
        }
        Ok(pairs)
    }

    fn parts(&mut self, items: &[FormItem]) -> Result<Vec<MultipartPart>, ResolveError> {
        let mut parts = Vec::with_capacity(items.len());
        for item in items {
            match &item.value {
                FormValue::Parameter(parameter @ RequestParameter::File(FileEncoding::Raw)) => {
                    if let Some(Filled::File(bytes)) = self.fill(parameter, Target::Multipart)? {
                        parts.push(MultipartPart::File {
                            name: item.name.clone(),
                            filename: item.filename.clone().unwrap_or_else(|| item.name.clone()),
                            bytes,
                        });
                    }
                }
                _ => {
                    if let Some(value) = self.form_text(item, Target::Multipart)? {
                        parts.push(MultipartPart::Text {
                            name: item.name.clone(),
                            value,
                        });
                    }
                }
            }
        }
        Ok(parts)
    }
}
