//! Scripted stand-in for the execution backend.
//!
//! Each endpoint replays a queue of replies and records the bodies it
//! received, so tests can assert on both sides of the wire.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

/// One scripted HTTP reply.
#[derive(Debug, Clone)]
pub enum Reply {
    Json(StatusCode, Value),
    Text(StatusCode, &'static str),
}

impl Reply {
    pub fn ok(body: Value) -> Self {
        Self::Json(StatusCode::OK, body)
    }

    pub fn error(status: StatusCode, message: &str) -> Self {
        Self::Json(status, json!({ "error": message }))
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self {
            Self::Json(status, body) => (status, Json(body)).into_response(),
            Self::Text(status, body) => (status, body).into_response(),
        }
    }
}

#[derive(Debug, Default)]
struct Script {
    generate: VecDeque<Reply>,
    run: VecDeque<Reply>,
    submit: VecDeque<Reply>,
    health: Option<Reply>,
    received: Vec<(&'static str, Value)>,
    delay: Duration,
    generate_delay: Duration,
}

/// Handle on a running mock backend.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    script: Arc<Mutex<Script>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_generate(&self, reply: Reply) -> &Self {
        self.script.lock().unwrap().generate.push_back(reply);
        self
    }

    pub fn on_run(&self, reply: Reply) -> &Self {
        self.script.lock().unwrap().run.push_back(reply);
        self
    }

    pub fn on_submit(&self, reply: Reply) -> &Self {
        self.script.lock().unwrap().submit.push_back(reply);
        self
    }

    pub fn on_health(&self, reply: Reply) -> &Self {
        self.script.lock().unwrap().health = Some(reply);
        self
    }

    /// Holds run and submit replies back by `delay`.
    pub fn with_execution_delay(&self, delay: Duration) -> &Self {
        self.script.lock().unwrap().delay = delay;
        self
    }

    /// Holds generate-questions replies back by `delay`.
    pub fn with_generation_delay(&self, delay: Duration) -> &Self {
        self.script.lock().unwrap().generate_delay = delay;
        self
    }

    /// Bodies received by `endpoint`, in order.
    pub fn received(&self, endpoint: &str) -> Vec<Value> {
        self.script
            .lock()
            .unwrap()
            .received
            .iter()
            .filter(|(name, _)| *name == endpoint)
            .map(|(_, body)| body.clone())
            .collect()
    }

    /// Serves the backend on an ephemeral port and returns its base URL.
    pub async fn spawn(&self) -> String {
        std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get local addr");

        let router = Router::new()
            .route("/api/generate-questions", post(generate))
            .route("/api/run", post(run))
            .route("/api/submit", post(submit))
            .route("/api/health", get(health))
            .with_state(self.clone());

        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server failed");
        });

        // Give the server a moment to start
        tokio::time::sleep(Duration::from_millis(50)).await;

        format!("http://{addr}/api")
    }

    fn next(&self, endpoint: &'static str, body: Value) -> (Reply, Duration) {
        let mut script = self.script.lock().unwrap();
        script.received.push((endpoint, body));
        let queue = match endpoint {
            "generate-questions" => &mut script.generate,
            "run" => &mut script.run,
            _ => &mut script.submit,
        };
        let reply = queue.pop_front().unwrap_or_else(|| {
            Reply::error(StatusCode::INTERNAL_SERVER_ERROR, "unscripted request")
        });
        let delay = if endpoint == "generate-questions" {
            script.generate_delay
        } else {
            script.delay
        };
        (reply, delay)
    }
}

async fn generate(State(mock): State<MockBackend>, Json(body): Json<Value>) -> Reply {
    let (reply, delay) = mock.next("generate-questions", body);
    tokio::time::sleep(delay).await;
    reply
}

async fn run(State(mock): State<MockBackend>, Json(body): Json<Value>) -> Reply {
    let (reply, delay) = mock.next("run", body);
    tokio::time::sleep(delay).await;
    reply
}

async fn submit(State(mock): State<MockBackend>, Json(body): Json<Value>) -> Reply {
    let (reply, delay) = mock.next("submit", body);
    tokio::time::sleep(delay).await;
    reply
}

async fn health(State(mock): State<MockBackend>) -> Reply {
    let scripted = mock.script.lock().unwrap().health.clone();
    scripted.unwrap_or_else(|| {
        Reply::ok(json!({ "status": "ok", "llm_configured": true, "llm_provider": "openai" }))
    })
}

// ============================================================================
// Fixtures
// ============================================================================

/// A question with `samples` sample cases and `hidden` hidden cases.
pub fn question_json(id: u64, samples: usize, hidden: usize) -> Value {
    let case = |i: usize| json!({ "input": { "head": [i, i + 1] }, "expected": [i + 1, i] });
    json!({
        "id": id,
        "title": format!("Linked List Problem {id}"),
        "difficulty": "Medium",
        "description": "Manipulate a singly linked list.",
        "examples": [{ "input": "head = [1,2]", "output": "[2,1]", "explanation": "Reversed." }],
        "constraints": ["0 <= n <= 5000"],
        "starter_code": "def f(head):\n    pass",
        "function_name": "f",
        "parameters": [{ "name": "head", "type": "List[int]" }],
        "return_type": "List[int]",
        "sample_test_cases": (0..samples).map(case).collect::<Vec<_>>(),
        "hidden_test_cases": (100..100 + hidden).map(case).collect::<Vec<_>>()
    })
}

/// A `generate-questions` success body with `count` questions of 2 sample
/// and 3 hidden cases each.
pub fn questions_body(count: u64) -> Value {
    json!({ "questions": (1..=count).map(|id| question_json(id, 2, 3)).collect::<Vec<_>>() })
}
