use serde_json::{Value, json};
use std::process::Output;
use tokio::process::Command;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn run(server: &MockServer, token: Option<&str>, args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_oura_fetch"));
    cmd.args(args)
        .env("OURA_BASE_URL", server.uri())
        .env("OURA_LOG_LEVEL", "warn")
        .env_remove("OURA_ACCESS_TOKEN")
        .env_remove("OURA_TIMEOUT_SECS");
    if let Some(t) = token {
        cmd.env("OURA_ACCESS_TOKEN", t);
    }
    cmd.output().await.expect("spawn oura_fetch")
}

#[tokio::test]
async fn only_requested_prints_records_as_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/usercollection/heartrate"))
        .and(header("authorization", "Bearer tok"))
        .and(query_param("start_datetime", "2024-03-01T00:00:00-23:59"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{"bpm": 60}]})))
        .expect(1)
        .mount(&server)
        .await;

    let out = run(
        &server,
        Some("tok"),
        &[
            "heart_rate",
            "--start",
            "2024-03-01",
            "--end",
            "2024-03-07",
            "--only-requested",
        ],
    )
    .await;
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let printed: Value = serde_json::from_slice(&out.stdout).expect("json stdout");
    assert_eq!(printed, json!([{"bpm": 60}]));
}

#[tokio::test]
async fn failing_endpoint_exits_with_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid token"})))
        .mount(&server)
        .await;

    let out = run(
        &server,
        Some("bad"),
        &["Tags", "--start", "2024-03-01", "--end", "2024-03-07"],
    )
    .await;
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("401"), "{stderr}");
    assert!(stderr.contains("Invalid token"), "{stderr}");
}

#[tokio::test]
async fn missing_token_exits_before_any_request() {
    let server = MockServer::start().await;
    let out = run(&server, None, &["sleep"]).await;
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("OURA_ACCESS_TOKEN"));
    assert!(server.received_requests().await.unwrap().is_empty());
}
