mod common;

use common::*;
use reqwest::Url;
use std::path::PathBuf;
use std::sync::Arc;

use fetchlink::descriptor::{ApiDescriptor, DescriptorRegistry};
use fetchlink::domain::{Action, Command, CommandKind, FieldValue, PresetField, Server, Status};
use fetchlink::model::ParseError;
use fetchlink::pipeline::{self, Outcome, QueryError};
use fetchlink::transport::{WireBody, WireResponse};
use fetchlink::xmlrpc::XmlRpcError;

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn rtorrent_server() -> Server {
    let mut registry = DescriptorRegistry::with_builtins().unwrap();
    registry.load_dir(&fixtures()).unwrap();
    let url = Url::parse("https://seedbox.example.com").unwrap();
    Server::new("seedbox", url, registry.get("rtorrent").unwrap())
}

fn xml_response(inner: &str) -> WireResponse {
    let body = format!(
        r#"<?xml version="1.0"?><methodResponse><params><param><value>{inner}</value></param></params></methodResponse>"#
    );
    WireResponse::new(200, body).with_header("Content-Type", "text/xml")
}

fn row(values: &[&str]) -> String {
    let items: String = values.iter().map(|v| format!("<value>{v}</value>")).collect();
    format!("<value><array><data>{items}</data></array></value>")
}

#[test]
fn test_builtin_transmission_commands() {
    let api = transmission();

    assert!(api.available(CommandKind::Fetch));
    assert!(api.available(CommandKind::AddFile));
    assert!(!api.available(CommandKind::Pause));
    assert_eq!(api.token_schemes().count(), 1);
    assert!(api.uses_basic());
}

#[test]
fn test_load_fixture_directory() {
    let mut registry = DescriptorRegistry::new();
    let loaded = registry.load_dir(&fixtures()).unwrap();

    assert_eq!(loaded, 1);
    assert_eq!(registry.names().collect::<Vec<_>>(), ["rtorrent"]);
    assert!(registry.get("transmission").is_err());
}

#[tokio::test]
async fn test_xmlrpc_fetch_builds_jobs() {
    let rows = [
        row(&[
            "<string>H1</string>",
            "<string>ubuntu.iso</string>",
            "<i4>1</i4>",
            "<i8>2048</i8>",
            "<i4>10</i4>",
            "<i8>500</i8>",
            "<i8>1000</i8>",
            "<i8>100</i8>",
            "<i4>60</i4>",
        ]),
        row(&[
            "<string>H2</string>",
            "<string>debian.iso</string>",
            "<i4>0</i4>",
            "<i4>0</i4>",
            "<i4>0</i4>",
            "<i8>0</i8>",
            "<i8>4000</i8>",
            "<i8>0</i8>",
            "<i4>-1</i4>",
        ]),
    ]
    .concat();
    let transport = ScriptedTransport::new([xml_response(&format!("<array><data>{rows}</data></array>"))]);

    let outcome = pipeline::execute_actions(&Command::fetch_all(), &rtorrent_server(), &transport)
        .await
        .unwrap();

    let Outcome::Success(actions) = outcome else {
        panic!("expected success");
    };
    let [Action::SetJobs(jobs)] = actions.as_slice() else {
        panic!("expected a single SetJobs, got {actions:?}");
    };
    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0].id, "H1");
    assert_eq!(jobs[0].status, Status::Downloading);
    assert!((jobs[0].progress - 0.5).abs() < f64::EPSILON);
    assert_eq!(jobs[1].status, Status::Stopped);

    let request = &transport.requests()[0];
    assert_eq!(request.url.as_str(), "https://seedbox.example.com/RPC2");
    let WireBody::Xml(xml) = &request.body else {
        panic!("expected XML body");
    };
    assert!(xml.contains("<methodName>d.multicall2</methodName>"));
}

#[tokio::test]
async fn test_xmlrpc_multicall_repeats_per_id() {
    let transport = ScriptedTransport::new([xml_response("<array><data></data></array>")]);
    let command = Command::Start(ids(&["H1", "H2", "H3"]));

    let outcome = pipeline::execute_actions(&command, &rtorrent_server(), &transport)
        .await
        .unwrap();
    assert_eq!(outcome, Outcome::Success(vec![]));

    let request = &transport.requests()[0];
    let WireBody::Xml(xml) = &request.body else {
        panic!("expected XML body");
    };
    assert_eq!(xml.matches("<string>d.start</string>").count(), 3);
    let positions: Vec<_> = ["H1", "H2", "H3"]
        .iter()
        .map(|id| xml.find(&format!("<string>{id}</string>")).unwrap())
        .collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
}

#[tokio::test]
async fn test_xmlrpc_fault_is_a_parse_error() {
    let fault = r#"<?xml version="1.0"?><methodResponse><fault><value><struct>
<member><name>faultCode</name><value><int>-501</int></value></member>
<member><name>faultString</name><value><string>Unsupported target type found</string></value></member>
</struct></value></fault></methodResponse>"#;
    let transport = ScriptedTransport::new([WireResponse::new(200, fault)]);

    let result = pipeline::execute_actions(&Command::fetch_all(), &rtorrent_server(), &transport).await;

    match result {
        Err(QueryError::Parse(ParseError::XmlRpc(XmlRpcError::Fault { code, message }))) => {
            assert_eq!(code, -501);
            assert_eq!(message, "Unsupported target type found");
        }
        other => panic!("expected fault, got {other:?}"),
    }
}

#[tokio::test]
async fn test_flat_cycle_drops_incomplete_tail() {
    let json = r#"{
        "name": "flat",
        "commands": {"fetch": {
            "request": {"path": "/RPC2", "body": {"xmlRpc": {"method": "list"}}},
            "response": {"format": "xmlRpc", "body": {"$forEach": [
                {"$param": {"field": "id"}},
                {"$param": {"field": "name"}}
            ]}}
        }}
    }"#;
    let api = ApiDescriptor::from_json("flat", json).unwrap();
    let server = Server::new("flat", Url::parse("http://localhost").unwrap(), Arc::new(api));

    let items = ["H1", "one", "H2", "two", "H3"]
        .iter()
        .map(|v| format!("<value><string>{v}</string></value>"))
        .collect::<String>();
    let transport = ScriptedTransport::new([xml_response(&format!("<array><data>{items}</data></array>"))]);

    let outcome = pipeline::execute(&Command::fetch_all(), &server, &transport, |_, fields| {
        Ok(fields.records)
    })
    .await
    .unwrap();

    let Outcome::Success(records) = outcome else {
        panic!("expected success");
    };
    assert_eq!(records.len(), 2);
    assert_eq!(
        records[1].preset(PresetField::Id),
        Some(&FieldValue::String("H2".into()))
    );
    assert_eq!(
        records[1].preset(PresetField::Name),
        Some(&FieldValue::String("two".into()))
    );
}
