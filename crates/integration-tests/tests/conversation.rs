mod harness;

use harness::config::ConfigBuilder;
use harness::mock_llm::MockLlm;
use harness::server::TestServer;

async fn start_session(server: &TestServer, text: &str) -> serde_json::Value {
    let resp = server
        .client()
        .post(server.url("/conversation/start"))
        .json(&serde_json::json!({ "text": text }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    resp.json().await.unwrap()
}

async fn send_turn(server: &TestServer, session_id: &str, text: &str) -> serde_json::Value {
    let resp = server
        .client()
        .post(server.url(&format!("/conversation/{session_id}/turn")))
        .json(&serde_json::json!({ "text": text }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    resp.json().await.unwrap()
}

#[tokio::test]
async fn coding_session_routes_general_and_stays_sticky() {
    let mock = MockLlm::start().await.unwrap();
    let config = ConfigBuilder::new().with_openai_compat(&mock.base_url()).build();
    let server = TestServer::start(config).await.unwrap();

    let started = start_session(&server, "Help me debug this Python function").await;
    assert_eq!(started["routing"]["model"], "general");
    assert!(started["routing"]["confidence"].as_f64().unwrap() >= 0.85);

    let session_id = started["session_id"].as_str().unwrap();

    let first = send_turn(&server, session_id, "Help me debug this Python function").await;
    assert_eq!(first["response_text"], "Hello from mock LLM");
    assert_eq!(first["switched"], false);

    let second = send_turn(&server, session_id, "now add error handling").await;
    assert_eq!(second["model"], "general");
    assert_eq!(second["switched"], false);

    // Both turns went to the same backend
    assert_eq!(mock.completion_count(), 2);
}

#[tokio::test]
async fn platform_command_resolves_without_backend() {
    let mock = MockLlm::start().await.unwrap();
    let config = ConfigBuilder::new().with_openai_compat(&mock.base_url()).build();
    let server = TestServer::start(config).await.unwrap();

    let started = start_session(&server, "switchboard status").await;
    assert_eq!(started["routing"]["model"], "local");
    assert!(started["routing"]["confidence"].as_f64().unwrap() >= 0.9);
    assert!(started["routing"]["estimated_cost"].as_f64().unwrap().abs() < f64::EPSILON);

    let session_id = started["session_id"].as_str().unwrap();
    let turn = send_turn(&server, session_id, "switchboard status").await;

    assert!(turn["response_text"].as_str().unwrap().contains("platform status"));
    assert!(turn["cost"].as_f64().unwrap().abs() < f64::EPSILON);
    assert!(turn.get("escalation").is_none());
    assert_eq!(mock.completion_count(), 0);
}

#[tokio::test]
async fn summary_tracks_cost_and_messages() {
    let mock = MockLlm::start().await.unwrap();
    let config = ConfigBuilder::new().with_openai_compat(&mock.base_url()).build();
    let server = TestServer::start(config).await.unwrap();

    let started = start_session(&server, "fix this code for me").await;
    let session_id = started["session_id"].as_str().unwrap();

    let first = send_turn(&server, session_id, "fix this code for me").await;
    let second = send_turn(&server, session_id, "now write the unit test").await;
    let spent = first["cost"].as_f64().unwrap() + second["cost"].as_f64().unwrap();
    assert!(spent > 0.0);

    let resp = server
        .client()
        .get(server.url(&format!("/conversation/{session_id}/summary")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let summary: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(summary["primary_model"], "general");
    assert_eq!(summary["message_count"], 4);
    assert!((summary["total_cost"].as_f64().unwrap() - spent).abs() < 1e-9);
    assert!((summary["cost_per_message"].as_f64().unwrap() - spent / 4.0).abs() < 1e-9);
}

#[tokio::test]
async fn summary_of_unknown_session_is_404() {
    let config = ConfigBuilder::new().build();
    let server = TestServer::start(config).await.unwrap();

    let resp = server
        .client()
        .get(server.url("/conversation/no-such-session/summary"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["type"], "session_not_found");
}

#[tokio::test]
async fn turn_against_unknown_session_starts_fresh() {
    let mock = MockLlm::start().await.unwrap();
    let config = ConfigBuilder::new().with_openai_compat(&mock.base_url()).build();
    let server = TestServer::start(config).await.unwrap();

    let turn = send_turn(&server, "brand-new-id", "debug my javascript code").await;
    assert_eq!(turn["model"], "general");

    let resp = server
        .client()
        .get(server.url("/conversation/brand-new-id/summary"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn status_endpoint_reports_lanes_and_sessions() {
    let mock = MockLlm::start().await.unwrap();
    let config = ConfigBuilder::new().with_openai_compat(&mock.base_url()).build();
    let server = TestServer::start(config).await.unwrap();

    let started = start_session(&server, "explain this code").await;
    send_turn(&server, started["session_id"].as_str().unwrap(), "explain this code").await;

    let resp = server.client().get(server.url("/status")).send().await.unwrap();
    assert_eq!(resp.status(), 200);

    let status: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(status["active_sessions"], 1);
    assert_eq!(status["lanes"].as_array().unwrap().len(), 7);
    assert!(status["total_cost"].as_f64().unwrap() > 0.0);
}

#[tokio::test]
async fn health_endpoint_responds() {
    let config = ConfigBuilder::new().build();
    let server = TestServer::start(config).await.unwrap();

    let resp = server.client().get(server.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
}
