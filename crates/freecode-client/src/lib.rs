//! FreeCode Execution Client
//!
//! Wire schemas and a thin client for the remote execution backend.
//!
//! The backend exposes three operations: generating a question set for a
//! topic, running a solution against the sample tests, and submitting a
//! solution against the sample plus hidden tests. Every call is a single
//! request/response round trip with no retries and no caching, and every
//! failure is reported through [`ClientError`].

mod http;
pub mod types;

pub use http::{ClientOptions, HttpExecutionClient};
pub use types::{
    Difficulty, Example, ExecutionMode, ExecutionRequest, ExecutionResponse, HealthStatus,
    Parameter, Question, QuestionId, QuestionSet, QuestionSetError, RunRequest, RunResponse,
    SubmitRequest, SubmitResponse, TestCase, TestCaseResult,
};

use async_trait::async_trait;
use thiserror::Error;

/// A specialized `Result` type for execution client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors surfaced by the execution client.
///
/// The `Display` output of the operation variants is the user-facing message
/// alone, so callers can show it verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Question generation failed.
    #[error("{message}")]
    Generation {
        /// Message extracted from the backend, or a generic default.
        message: String,
    },

    /// A run or submit call failed.
    #[error("{message}")]
    Execution {
        /// Message extracted from the backend, or a generic default.
        message: String,
    },

    /// The health probe failed.
    #[error("health check failed: {message}")]
    Health {
        /// Description of the failure.
        message: String,
    },

    /// The client could not be constructed.
    #[error("invalid client configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Creates a new `Generation` error.
    #[must_use]
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation {
            message: message.into(),
        }
    }

    /// Creates a new `Execution` error.
    #[must_use]
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution {
            message: message.into(),
        }
    }

    /// Returns the message carried by this error.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Generation { message }
            | Self::Execution { message }
            | Self::Health { message }
            | Self::Configuration(message) => message,
        }
    }
}

/// The three remote operations the session depends on.
///
/// Implementations must surface exactly one outcome per call and must not
/// retry, cache, or swallow a non-success status.
#[async_trait]
pub trait ExecutionClient: Send + Sync {
    /// Generates a question set for `topic`.
    async fn generate_questions(&self, topic: &str) -> Result<QuestionSet>;

    /// Runs a solution against sample test cases.
    async fn run(&self, request: &RunRequest) -> Result<RunResponse>;

    /// Runs a solution against sample and hidden test cases.
    async fn submit(&self, request: &SubmitRequest) -> Result<SubmitResponse>;

    /// Dispatches a run or submit request.
    async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionResponse> {
        match request {
            ExecutionRequest::Run(run) => self.run(run).await.map(ExecutionResponse::Run),
            ExecutionRequest::Submit(submit) => {
                self.submit(submit).await.map(ExecutionResponse::Submit)
            }
        }
    }
}
