//! Integration tests for the HTTP execution client.
//!
//! Each test serves a scripted backend on an ephemeral port and checks both
//! the bodies the client sends and how it interprets the replies.

#[allow(dead_code)]
mod mock_backend;

use axum::http::StatusCode;
use freecode_client::{
    ClientError, ClientOptions, ExecutionClient, HttpExecutionClient, QuestionId, RunRequest,
    SubmitRequest, TestCase,
};
use serde_json::{json, Value};

use mock_backend::{question_json, questions_body, MockBackend, Reply};

fn client(base_url: &str) -> HttpExecutionClient {
    HttpExecutionClient::new(ClientOptions::new(base_url)).expect("Failed to build client")
}

fn case(n: i64) -> TestCase {
    TestCase {
        input: json!({ "n": n }),
        expected: json!(n * 2),
    }
}

fn run_request() -> RunRequest {
    RunRequest {
        code: "def double(n):\n    return n * 2".to_string(),
        test_cases: vec![case(1), case(2)],
        function_name: "double".to_string(),
    }
}

fn submit_request() -> SubmitRequest {
    SubmitRequest {
        code: "def double(n):\n    return n + n".to_string(),
        sample_test_cases: vec![case(1), case(2)],
        hidden_test_cases: vec![case(10), case(20), case(30)],
        function_name: "double".to_string(),
    }
}

// ============================================================================
// generate-questions
// ============================================================================

#[tokio::test]
async fn test_generate_sends_topic_and_parses_questions() {
    let backend = MockBackend::new();
    backend.on_generate(Reply::ok(questions_body(3)));
    let base = backend.spawn().await;

    let questions = client(&base)
        .generate_questions("Linked List")
        .await
        .expect("generation should succeed");

    assert_eq!(questions.len(), 3);
    let first = questions.get(0).unwrap();
    assert_eq!(first.id, QuestionId(1));
    assert_eq!(first.sample_test_cases.len(), 2);
    assert_eq!(first.hidden_test_cases.len(), 3);
    assert_eq!(first.parameters[0].type_hint, "List[int]");

    assert_eq!(
        backend.received("generate-questions"),
        vec![json!({ "topic": "Linked List" })]
    );
}

#[tokio::test]
async fn test_generate_surfaces_backend_error_message() {
    let backend = MockBackend::new();
    backend.on_generate(Reply::error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "OPENAI_API_KEY not configured",
    ));
    let base = backend.spawn().await;

    let err = client(&base).generate_questions("Graphs").await.unwrap_err();
    assert_eq!(err, ClientError::generation("OPENAI_API_KEY not configured"));
}

#[tokio::test]
async fn test_generate_rejects_empty_question_list() {
    let backend = MockBackend::new();
    backend.on_generate(Reply::ok(json!({ "questions": [] })));
    let base = backend.spawn().await;

    let err = client(&base).generate_questions("Trees").await.unwrap_err();
    assert_eq!(err.to_string(), "no questions were generated");
}

#[tokio::test]
async fn test_generate_rejects_malformed_question() {
    let mut question = question_json(1, 2, 3);
    question["difficulty"] = json!("Impossible");
    let backend = MockBackend::new();
    backend.on_generate(Reply::ok(json!({ "questions": [question] })));
    let base = backend.spawn().await;

    let err = client(&base).generate_questions("Heaps").await.unwrap_err();
    assert!(matches!(err, ClientError::Generation { .. }));
    assert!(
        err.message()
            .starts_with("Failed to generate questions: malformed response"),
        "unexpected message: {err}"
    );
}

// ============================================================================
// run
// ============================================================================

#[tokio::test]
async fn test_run_sends_contract_fields() {
    let backend = MockBackend::new();
    backend.on_run(Reply::ok(json!({
        "passed": 2,
        "total": 2,
        "results": [
            { "input": { "n": 1 }, "expected": 2, "actual": 2, "passed": true },
            { "input": { "n": 2 }, "expected": 4, "actual": 4, "passed": true }
        ]
    })));
    let base = backend.spawn().await;

    let response = client(&base).run(&run_request()).await.unwrap();
    assert_eq!(response.passed, 2);
    assert_eq!(response.total, 2);
    assert_eq!(response.results[1].actual, Some(json!(4)));

    let sent = backend.received("run");
    assert_eq!(sent.len(), 1);
    let body = &sent[0];
    assert_eq!(body["function_name"], "double");
    assert_eq!(body["code"], "def double(n):\n    return n * 2");
    assert_eq!(body["test_cases"].as_array().unwrap().len(), 2);
    assert_eq!(body["test_cases"][0], json!({ "input": { "n": 1 }, "expected": 2 }));
}

#[tokio::test]
async fn test_run_non_json_failure_uses_default_message() {
    let backend = MockBackend::new();
    backend.on_run(Reply::Text(StatusCode::BAD_GATEWAY, "<html>Bad Gateway</html>"));
    let base = backend.spawn().await;

    let err = client(&base).run(&run_request()).await.unwrap_err();
    assert_eq!(err, ClientError::execution("Failed to run code"));
}

#[tokio::test]
async fn test_run_malformed_success_body_is_an_error() {
    let backend = MockBackend::new();
    backend.on_run(Reply::ok(json!({ "passed": "two", "total": 2 })));
    let base = backend.spawn().await;

    let err = client(&base).run(&run_request()).await.unwrap_err();
    assert!(matches!(err, ClientError::Execution { .. }));
    assert!(err.message().starts_with("Failed to run code: malformed response"));
}

#[tokio::test]
async fn test_run_connection_refused() {
    // Bind and release a port so nothing is listening on it.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{addr}/api"))
        .run(&run_request())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Execution { .. }));
    assert!(err.message().starts_with("Failed to run code:"), "{err}");
}

// ============================================================================
// submit
// ============================================================================

#[tokio::test]
async fn test_submit_blank_error_uses_default_message() {
    let backend = MockBackend::new();
    backend.on_submit(Reply::error(StatusCode::BAD_REQUEST, "   "));
    let base = backend.spawn().await;

    let err = client(&base).submit(&submit_request()).await.unwrap_err();
    assert_eq!(err, ClientError::execution("Failed to submit code"));
}

#[tokio::test]
async fn test_submit_accepts_bare_visible_results() {
    let backend = MockBackend::new();
    backend.on_submit(Reply::ok(json!({
        "passed": 4,
        "total": 5,
        "accepted": false,
        "visible_results": [{ "passed": true }, { "passed": true }]
    })));
    let base = backend.spawn().await;

    let response = client(&base).submit(&submit_request()).await.unwrap();
    assert!(!response.accepted);
    assert_eq!(response.visible_results.len(), 2);
    assert_eq!(response.visible_results[0].input, Value::Null);
    assert_eq!(response.visible_results[0].actual, None);

    let body = &backend.received("submit")[0];
    assert_eq!(body["sample_test_cases"].as_array().unwrap().len(), 2);
    assert_eq!(body["hidden_test_cases"].as_array().unwrap().len(), 3);
    assert!(body.get("test_cases").is_none());
}

// ============================================================================
// health
// ============================================================================

#[tokio::test]
async fn test_health_reports_generator() {
    let backend = MockBackend::new();
    let base = backend.spawn().await;

    let health = client(&base).health().await.unwrap();
    assert_eq!(health.status, "ok");
    assert!(health.llm_configured);
    assert_eq!(health.llm_provider.as_deref(), Some("openai"));
}

#[tokio::test]
async fn test_health_failure_status() {
    let backend = MockBackend::new();
    backend.on_health(Reply::error(StatusCode::INTERNAL_SERVER_ERROR, "down"));
    let base = backend.spawn().await;

    let err = client(&base).health().await.unwrap_err();
    assert!(matches!(err, ClientError::Health { .. }));
    assert!(err.to_string().contains("500"));
}
