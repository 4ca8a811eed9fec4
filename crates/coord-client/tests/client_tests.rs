//! Contract tests for `CoordClient` against a mock coord server.
//!
//! | Method | Path            | Test                  |
//! |--------|-----------------|-----------------------|
//! | GET    | `/{path}`       | `status_*`            |
//! | GET    | `/{path}?wait=` | `wait_*`              |
//! | PUT    | `/{path}`       | `update_*`, `set_*`   |
//! | DELETE | `/{path}`       | `remove_*`            |

use coord_client::{ClientConfig, ClientError, CoordClient};
use coord_core::{Condition, Status, Transition};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(mock_server: &MockServer) -> CoordClient {
    let config = ClientConfig {
        base_url: mock_server.uri().parse().unwrap(),
        timeout_secs: 5,
    };
    CoordClient::new(config).unwrap()
}

fn error_body(code: &str, message: &str) -> serde_json::Value {
    serde_json::json!({"error": {"code": code, "message": message}})
}

// ── GET /{path} ──────────────────────────────────────────────────────

#[tokio::test]
async fn status_decodes_body() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/job/a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "started"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let status = test_client(&mock_server).status("/job/a").await.unwrap();
    assert_eq!(status, Status::Started);
}

#[tokio::test]
async fn status_not_found_is_undefined() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/job/b"))
        .respond_with(ResponseTemplate::new(404).set_body_json(error_body("NOT_FOUND", "not found: /job/b")))
        .mount(&mock_server)
        .await;

    let status = test_client(&mock_server).status("/job/b").await.unwrap();
    assert_eq!(status, Status::Undefined);
}

#[tokio::test]
async fn status_server_error_is_api_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_json(error_body(
            "SERVICE_UNAVAILABLE",
            "service unavailable: status store is shut down",
        )))
        .mount(&mock_server)
        .await;

    let err = test_client(&mock_server).status("/x").await.unwrap_err();
    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 503);
            assert!(message.contains("shut down"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn status_with_prefix() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/coord/job/a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "failed"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = ClientConfig {
        base_url: format!("{}/coord/", mock_server.uri()).parse().unwrap(),
        timeout_secs: 5,
    };
    let client = CoordClient::new(config).unwrap();
    assert_eq!(client.status("/job/a").await.unwrap(), Status::Failed);
}

// ── GET /{path}?wait= ────────────────────────────────────────────────

#[tokio::test]
async fn wait_sends_predicate() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/job/a"))
        .and(query_param("wait", "finished"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "succeeded"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let status = test_client(&mock_server)
        .wait("/job/a", Condition::Finished)
        .await
        .unwrap();
    assert_eq!(status, Status::Succeeded);
}

#[tokio::test]
async fn wait_timeout_is_wait_failed() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("wait", "succeeded"))
        .respond_with(ResponseTemplate::new(408).set_body_json(error_body(
            "REQUEST_TIMEOUT",
            "request timeout: /job/c did not become succeeded",
        )))
        .mount(&mock_server)
        .await;

    let err = test_client(&mock_server)
        .wait("/job/c", Condition::Succeeded)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::WaitFailed { ref path, condition: Condition::Succeeded } if path == "/job/c"
    ));
}

// ── PUT /{path} ──────────────────────────────────────────────────────

#[tokio::test]
async fn update_sends_action() {
    let mock_server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/job/a"))
        .and(body_json(serde_json::json!({"action": "start"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    test_client(&mock_server)
        .update("/job/a", Transition::Start)
        .await
        .unwrap();
}

#[tokio::test]
async fn update_conflict_is_rejected() {
    let mock_server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(409).set_body_json(error_body(
            "CONFLICT",
            "conflict: invalid transition: cannot fail a path that is succeeded",
        )))
        .mount(&mock_server)
        .await;

    let err = test_client(&mock_server)
        .update("/job/a", Transition::Fail)
        .await
        .unwrap_err();
    match err {
        ClientError::Rejected(message) => assert!(message.contains("cannot fail")),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn set_sends_status() {
    let mock_server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/job/d"))
        .and(body_json(serde_json::json!({"status": "succeeded"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    test_client(&mock_server)
        .set("/job/d", Status::Succeeded)
        .await
        .unwrap();
}

#[tokio::test]
async fn plain_text_errors_are_kept() {
    let mock_server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Expected request with `Content-Type: application/json`"))
        .mount(&mock_server)
        .await;

    let err = test_client(&mock_server)
        .set("/x", Status::Started)
        .await
        .unwrap_err();
    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 400);
            assert!(message.contains("Content-Type"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

// ── DELETE /{path} ───────────────────────────────────────────────────

#[tokio::test]
async fn remove_sends_delete() {
    let mock_server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/job/g"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    test_client(&mock_server).remove("/job/g").await.unwrap();
}

#[tokio::test]
async fn unreachable_server_is_http_error() {
    let config = ClientConfig {
        base_url: "http://127.0.0.1:9".parse().unwrap(),
        timeout_secs: 1,
    };
    let client = CoordClient::new(config).unwrap();
    let err = client.status("/x").await.unwrap_err();
    assert!(matches!(err, ClientError::Http { .. }));
}
