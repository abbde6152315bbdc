//! End-to-end session workflows over HTTP.
//!
//! These drive a [`SessionController`] backed by the real HTTP client
//! against a scripted backend.

#[allow(dead_code)]
mod mock_backend;

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use freecode_client::{ClientOptions, HttpExecutionClient, QuestionId};
use freecode_report::{headline, render_summary};
use freecode_session::{
    Completion, ExecutionSummary, HiddenTally, InFlight, ReconcileError, SessionController,
    SessionError, SessionPhase,
};
use serde_json::json;

use mock_backend::{questions_body, MockBackend, Reply};

/// Spawns `backend` and returns a session with a question set loaded.
async fn loaded_session(backend: &MockBackend, count: u64) -> SessionController {
    backend.on_generate(Reply::ok(questions_body(count)));
    let base = backend.spawn().await;
    let client =
        HttpExecutionClient::new(ClientOptions::new(base)).expect("Failed to build client");
    let mut session = SessionController::new(Arc::new(client));

    let completion = session.generate("Linked List").await.unwrap();
    assert_eq!(completion, Completion::Applied);
    session
}

#[tokio::test]
async fn test_run_after_selecting_and_editing() {
    let backend = MockBackend::new();
    backend.on_run(Reply::ok(json!({
        "passed": 1,
        "total": 2,
        "results": [
            { "input": [1], "expected": 2, "actual": 2, "passed": true },
            { "input": [2], "expected": 3, "passed": false, "error": "TypeError" }
        ]
    })));
    let mut session = loaded_session(&backend, 3).await;
    assert_eq!(session.state().questions().unwrap().len(), 3);

    session.select_question(1).unwrap();
    session.edit_code("def f(): pass").unwrap();
    let completion = session.run_sample().await.unwrap();
    assert_eq!(completion, Completion::Applied);

    let summary = session.state().last_summary().unwrap();
    assert_eq!(headline(summary), "1/2 test cases passed");
    let rendered = render_summary(summary);
    assert!(rendered.contains("Test Case 2: FAIL"));
    assert!(rendered.contains("  Error: TypeError"));
    assert_eq!(session.state().phase(), SessionPhase::Ready);

    let sent = &backend.received("run")[0];
    assert_eq!(sent["code"], "def f(): pass");
    assert_eq!(sent["function_name"], "f");
    assert_eq!(sent["test_cases"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_submit_reports_hidden_tally() {
    let backend = MockBackend::new();
    backend.on_submit(Reply::ok(json!({
        "passed": 4,
        "total": 5,
        "accepted": false,
        "visible_results": [{ "passed": true }, { "passed": true }]
    })));
    let mut session = loaded_session(&backend, 1).await;

    assert_eq!(session.submit().await.unwrap(), Completion::Applied);

    let summary = session.state().last_summary().unwrap();
    let ExecutionSummary::Submit(submit) = summary else {
        panic!("expected a submit summary, got {summary:?}");
    };
    assert_eq!(submit.hidden, HiddenTally { count: 3, passed: 2 });
    assert_eq!(
        headline(summary),
        "accepted: false, 4/5 passed, +3 hidden (2 passed)"
    );

    let sent = &backend.received("submit")[0];
    assert_eq!(sent["code"], "def f(head):\n    pass");
    assert_eq!(sent["hidden_test_cases"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_submit_while_running_is_rejected() {
    let backend = MockBackend::new();
    backend.on_run(Reply::ok(json!({
        "passed": 2,
        "total": 2,
        "results": [{ "passed": true }, { "passed": true }]
    })));
    let mut session = loaded_session(&backend, 2).await;

    let pending = session.start_run().unwrap();
    let before = session.state().clone();

    let err = session.submit().await.unwrap_err();
    assert_eq!(
        err,
        SessionError::Busy {
            in_flight: InFlight::Running
        }
    );
    assert!(err.is_rejection());
    assert_eq!(session.state().phase(), before.phase());
    assert_eq!(session.state().epoch(), before.epoch());
    assert!(session.state().last_error().is_none());
    assert!(backend.received("submit").is_empty());

    let resolved = pending.resolve().await;
    assert_eq!(session.complete_execution(resolved), Completion::Applied);
    assert_eq!(session.state().phase(), SessionPhase::Ready);
}

#[tokio::test]
async fn test_back_discards_outstanding_run() {
    let backend = MockBackend::new();
    backend.on_run(Reply::ok(json!({
        "passed": 2,
        "total": 2,
        "results": [{ "passed": true }, { "passed": true }]
    })));
    let mut session = loaded_session(&backend, 2).await;

    let pending = session.start_run().unwrap();
    session.back();
    assert_eq!(session.state().phase(), SessionPhase::Idle);

    let resolved = pending.resolve().await;
    assert_eq!(session.complete_execution(resolved), Completion::Discarded);
    assert_eq!(session.state().phase(), SessionPhase::Idle);
    assert!(session.state().last_summary().is_none());
    assert!(session.state().questions().is_none());
}

#[tokio::test]
async fn test_selecting_during_run_discards_result() {
    let backend = MockBackend::new();
    backend.with_execution_delay(Duration::from_millis(200));
    backend.on_run(Reply::ok(json!({
        "passed": 2,
        "total": 2,
        "results": [{ "passed": true }, { "passed": true }]
    })));
    let mut session = loaded_session(&backend, 2).await;

    let pending = session.start_run().unwrap();
    assert_eq!(pending.ticket().question_id(), QuestionId(1));
    let handle = tokio::spawn(pending.resolve());

    session.select_question(1).unwrap();
    assert_eq!(
        session.state().phase(),
        SessionPhase::Busy(InFlight::Running)
    );

    let resolved = handle.await.unwrap();
    assert_eq!(session.complete_execution(resolved), Completion::Discarded);
    assert!(session.state().last_summary().is_none());
    assert_eq!(session.state().phase(), SessionPhase::Ready);
    assert_eq!(session.state().active_question().unwrap().id, QuestionId(2));
}

#[tokio::test]
async fn test_navigating_during_generation_keeps_new_set() {
    let backend = MockBackend::new();
    let mut session = loaded_session(&backend, 2).await;
    backend.with_generation_delay(Duration::from_millis(200));
    backend.on_generate(Reply::ok(questions_body(4)));

    let pending = session.start_generate("Graphs").unwrap();
    let handle = tokio::spawn(pending.resolve());

    session.select_question(1).unwrap();
    session.edit_code("def f(head):\n    return head").unwrap();
    assert!(session.state().is_generating());

    let resolved = handle.await.unwrap();
    assert_eq!(session.complete_generate(resolved), Completion::Applied);

    let state = session.state();
    assert!(!state.is_generating());
    assert_eq!(state.questions().unwrap().len(), 4);
    assert_eq!(state.active_index(), 0);
    assert_eq!(state.current_code(), Some("def f(head):\n    pass"));
    assert!(state.last_error().is_none());
    assert_eq!(
        backend.received("generate-questions")[1],
        json!({ "topic": "Graphs" })
    );
}

#[tokio::test]
async fn test_back_during_generation_discards_new_set() {
    let backend = MockBackend::new();
    let mut session = loaded_session(&backend, 2).await;
    backend.with_generation_delay(Duration::from_millis(200));
    backend.on_generate(Reply::ok(questions_body(4)));

    let pending = session.start_generate("Graphs").unwrap();
    let handle = tokio::spawn(pending.resolve());
    session.back();

    let resolved = handle.await.unwrap();
    assert_eq!(session.complete_generate(resolved), Completion::Discarded);
    assert_eq!(session.state().phase(), SessionPhase::Idle);
    assert!(session.state().questions().is_none());
}

#[tokio::test]
async fn test_failed_generation_keeps_previous_set() {
    let backend = MockBackend::new();
    let mut session = loaded_session(&backend, 2).await;
    session.select_question(1).unwrap();
    session.edit_code("def f(head):\n    return head").unwrap();

    backend.on_generate(Reply::error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "OPENAI_API_KEY not configured",
    ));

    let completion = session.generate("Graphs").await.unwrap();
    assert_eq!(completion, Completion::Failed);

    let state = session.state();
    assert_eq!(state.questions().unwrap().len(), 2);
    assert_eq!(state.active_index(), 1);
    assert_eq!(state.current_code(), Some("def f(head):\n    return head"));
    assert_eq!(
        state.last_error().unwrap().to_string(),
        "OPENAI_API_KEY not configured"
    );
    assert!(!state.is_generating());
}

#[tokio::test]
async fn test_inconsistent_counts_are_recorded() {
    let backend = MockBackend::new();
    // The question carries 2 sample and 3 hidden cases, so a total of 4 is
    // impossible.
    backend.on_submit(Reply::ok(json!({
        "passed": 2,
        "total": 4,
        "accepted": false,
        "visible_results": [{ "passed": true }, { "passed": true }]
    })));
    let mut session = loaded_session(&backend, 1).await;

    assert_eq!(session.submit().await.unwrap(), Completion::Failed);

    let state = session.state();
    assert!(state.last_summary().is_none());
    assert!(matches!(
        state.last_error(),
        Some(SessionError::Reconciliation(ReconcileError::TotalMismatch {
            total: 4,
            expected: 5,
            ..
        }))
    ));
    assert_eq!(state.phase(), SessionPhase::Ready);
}
