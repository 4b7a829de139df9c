mod common;

use common::*;
use serde_json::json;

use fetchlink::domain::{Action, Command, Eta, FetchScope, PresetField, Status};
use fetchlink::pipeline::{self, Outcome, QueryError, job_view_models};
use fetchlink::transport::WireResponse;

#[tokio::test]
async fn test_start_success() {
    let transport = ScriptedTransport::new([json_response(200, r#"{"arguments":{},"result":"success"}"#)]);
    let server = transmission_server().with_token("tok0");

    let outcome = pipeline::execute_actions(&Command::Start(ids(&["abc123"])), &server, &transport)
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Success(vec![]));

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.as_str(), "http://nas.local:9091/transmission/rpc");
    assert_eq!(requests[0].header(TOKEN_HEADER), Some("tok0"));
    assert_eq!(requests[0].header("Authorization"), Some("Basic YWRtaW46c2VjcmV0"));
    assert_eq!(
        body_json(&requests[0]),
        json!({"method": "torrent-start", "arguments": {"ids": ["abc123"]}})
    );
}

#[tokio::test]
async fn test_stale_token_yields_refresh_and_resend() {
    let transport =
        ScriptedTransport::new([WireResponse::new(409, "Conflict").with_header(TOKEN_HEADER, "tok1")]);
    let command = Command::Start(ids(&["abc123"]));

    let outcome = pipeline::execute_actions(&command, &transmission_server(), &transport)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        Outcome::Retry(vec![Action::SetToken("tok1".into()), Action::Resend(command)])
    );
    assert_eq!(transport.sent(), 1);
}

#[tokio::test]
async fn test_missing_token_header_requests_login() {
    let transport = ScriptedTransport::new([WireResponse::new(409, "")]);
    let command = Command::Stop(ids(&["abc123"]));

    let outcome = pipeline::execute_actions(&command, &transmission_server(), &transport)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        Outcome::Retry(vec![Action::Resend(Command::login(command))])
    );
}

#[tokio::test]
async fn test_nested_login_is_rejected_before_dispatch() {
    let transport = ScriptedTransport::default();
    let command = Command::login(Command::login(Command::fetch_all()));

    let result = pipeline::execute_actions(&command, &transmission_server(), &transport).await;

    assert!(matches!(result, Err(QueryError::TokenRequestFailed)));
    assert_eq!(transport.sent(), 0);
}

#[tokio::test]
async fn test_unsupported_command_is_not_dispatched() {
    let transport = ScriptedTransport::default();

    let result =
        pipeline::execute_actions(&Command::Pause(ids(&["abc123"])), &transmission_server(), &transport)
            .await;

    assert!(matches!(
        result,
        Err(QueryError::CommandUnsupported(fetchlink::domain::CommandKind::Pause))
    ));
    assert_eq!(transport.sent(), 0);
}

#[tokio::test]
async fn test_fetch_all_builds_jobs() {
    let transport = ScriptedTransport::new([json_response(200, TORRENTS)]);

    let outcome = pipeline::execute_actions(&Command::fetch_all(), &transmission_server(), &transport)
        .await
        .unwrap();

    let Outcome::Success(actions) = outcome else {
        panic!("expected success");
    };
    let [Action::SetJobs(jobs)] = actions.as_slice() else {
        panic!("expected a single SetJobs, got {actions:?}");
    };

    assert_eq!(jobs.len(), 2);
    assert_eq!(jobs[0].id, "abc123");
    assert_eq!(jobs[0].status, Status::Downloading);
    assert_eq!(jobs[0].download_speed, 2048);
    assert_eq!(jobs[0].eta, Eta::Infinite);
    assert!((jobs[0].progress - 0.25).abs() < f64::EPSILON);
    assert_eq!(jobs[1].status, Status::Seeding);
    assert_eq!(jobs[1].eta, Eta::Seconds(0));
    assert_eq!(jobs[1].extra.len(), 3);

    let body = body_json(&transport.requests()[0]);
    assert!(body["arguments"].get("ids").is_none());
}

#[tokio::test]
async fn test_fetch_some_updates_jobs() {
    let transport = ScriptedTransport::new([json_response(200, TORRENTS)]);
    let command = Command::Fetch(FetchScope::Some(ids(&["abc123", "def456"])));

    let outcome = pipeline::execute_actions(&command, &transmission_server(), &transport)
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        Outcome::Success(actions) if matches!(actions.as_slice(), [Action::UpdateJobs(jobs)] if jobs.len() == 2)
    ));
    assert_eq!(
        body_json(&transport.requests()[0])["arguments"]["ids"],
        json!(["abc123", "def456"])
    );
}

#[tokio::test]
async fn test_incomplete_job_is_reported() {
    let body = r#"{"result":"success","arguments":{"torrents":[
        {"hashString":"abc123","name":"ubuntu.iso","rateUpload":0,"rateDownload":0,
         "uploadedEver":0,"downloadedEver":0,"sizeWhenDone":0,"eta":5}
    ]}}"#;

    // strict transform
    let transport = ScriptedTransport::new([json_response(200, body)]);
    let server = transmission_server();
    let statuses = server.api.statuses.clone();
    let result = pipeline::execute(&Command::fetch_all(), &server, &transport, |_, fields| {
        job_view_models(fields, &statuses)
    })
    .await;
    assert!(matches!(result, Err(QueryError::FieldMissing(PresetField::Status))));

    // default transform keeps going and reports the record
    let transport = ScriptedTransport::new([json_response(200, body)]);
    let outcome = pipeline::execute_actions(&Command::fetch_all(), &server, &transport)
        .await
        .unwrap();
    let Outcome::Success(actions) = outcome else {
        panic!("expected success");
    };
    assert!(matches!(&actions[0], Action::CreateError(error) if error.title == "Incomplete job data"));
    assert_eq!(actions[1], Action::SetJobs(vec![]));
}

#[tokio::test]
async fn test_wrong_password_renders_html_detail() {
    let html = "<html><body><h1>401: Unauthorized</h1><p>Wrong &amp; stale credentials</p></body></html>";
    let transport = ScriptedTransport::new([WireResponse::new(401, html)]);

    let result =
        pipeline::execute_actions(&Command::Start(ids(&["a"])), &transmission_server(), &transport)
            .await;

    match result {
        Err(QueryError::AuthenticationFailure { detail }) => {
            assert_eq!(detail.as_deref(), Some("401: Unauthorized Wrong & stale credentials"));
        }
        other => panic!("expected authentication failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_forbidden_and_unexpected_status() {
    let transport = ScriptedTransport::new([WireResponse::new(403, "")]);
    let result =
        pipeline::execute_actions(&Command::Start(ids(&["a"])), &transmission_server(), &transport)
            .await;
    assert!(matches!(result, Err(QueryError::ResourceForbidden { detail: None })));

    let transport = ScriptedTransport::new([WireResponse::new(500, "boom")]);
    let result =
        pipeline::execute_actions(&Command::Start(ids(&["a"])), &transmission_server(), &transport)
            .await;
    assert!(matches!(
        result,
        Err(QueryError::UnexpectedStatus { status: 500, detail: Some(ref d) }) if d == "boom"
    ));
}

#[tokio::test]
async fn test_structural_mismatch() {
    let transport = ScriptedTransport::new([json_response(200, r#"{"result":"no such method"}"#)]);

    let result =
        pipeline::execute_actions(&Command::fetch_all(), &transmission_server(), &transport).await;

    assert!(matches!(result, Err(QueryError::StructuralMismatch(_))));
}

#[tokio::test]
async fn test_login_collects_destination_and_resends() {
    let transport = ScriptedTransport::new([json_response(
        200,
        r#"{"result":"success","arguments":{"download-dir":"/data/torrents"}}"#,
    )
    .with_header(TOKEN_HEADER, "tok9")]);
    let command = Command::login(Command::fetch_all());

    let outcome = pipeline::execute_actions(&command, &transmission_server(), &transport)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        Outcome::Success(vec![
            Action::SetToken("tok9".into()),
            Action::CreateDestination("/data/torrents".into()),
            Action::Resend(Command::fetch_all()),
        ])
    );
    assert_eq!(
        body_json(&transport.requests()[0])["method"],
        json!("session-get")
    );
}

#[tokio::test]
async fn test_transport_error_is_surfaced() {
    let transport = ScriptedTransport::default();

    let result =
        pipeline::execute_actions(&Command::fetch_all(), &transmission_server(), &transport).await;

    assert!(matches!(result, Err(QueryError::Transport(_))));
}
