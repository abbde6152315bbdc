//! HTTP implementation of [`ExecutionClient`].
//!
//! This module provides [`HttpExecutionClient`], which speaks the backend's
//! JSON-over-HTTP contract through reqwest.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::types::{ErrorBody, GenerateRequest, GenerateResponse};
use crate::{
    ClientError, ExecutionClient, HealthStatus, QuestionSet, Result, RunRequest, RunResponse,
    SubmitRequest, SubmitResponse,
};

/// Default timeout for a whole request, generation included.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Default timeout for establishing a connection.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Options for constructing an [`HttpExecutionClient`].
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use freecode_client::ClientOptions;
///
/// let options = ClientOptions::new("http://localhost:5000/api")
///     .with_request_timeout(Duration::from_secs(60))
///     .with_connect_timeout(Duration::from_secs(5));
/// assert_eq!(options.request_timeout, Duration::from_secs(60));
/// ```
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Base URL under which the backend's endpoints live.
    pub base_url: String,
    /// Timeout for a whole request.
    pub request_timeout: Duration,
    /// Timeout for establishing a connection.
    pub connect_timeout: Duration,
}

impl ClientOptions {
    /// Creates options for the given base URL with default timeouts.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Sets the whole-request timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

/// The backend operations, with their endpoint and failure policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Generate,
    Run,
    Submit,
}

impl Operation {
    const fn default_message(self) -> &'static str {
        match self {
            Self::Generate => "Failed to generate questions",
            Self::Run => "Failed to run code",
            Self::Submit => "Failed to submit code",
        }
    }

    fn error(self, message: impl Into<String>) -> ClientError {
        match self {
            Self::Generate => ClientError::generation(message),
            Self::Run | Self::Submit => ClientError::execution(message),
        }
    }
}

/// Resolved endpoint URLs.
#[derive(Debug, Clone)]
struct Endpoints {
    generate: Url,
    run: Url,
    submit: Url,
    health: Url,
}

impl Endpoints {
    fn resolve(base_url: &str) -> Result<Self> {
        let mut base = Url::parse(base_url.trim()).map_err(|e| {
            ClientError::Configuration(format!("invalid base URL '{base_url}': {e}"))
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ClientError::Configuration(format!(
                "unsupported URL scheme '{}' in '{base_url}'",
                base.scheme()
            )));
        }
        // Url::join replaces the last path segment unless the path ends in '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let join = |endpoint: &str| {
            base.join(endpoint).map_err(|e| {
                ClientError::Configuration(format!("invalid endpoint '{endpoint}': {e}"))
            })
        };
        Ok(Self {
            generate: join("generate-questions")?,
            run: join("run")?,
            submit: join("submit")?,
            health: join("health")?,
        })
    }

    const fn for_operation(&self, operation: Operation) -> &Url {
        match operation {
            Operation::Generate => &self.generate,
            Operation::Run => &self.run,
            Operation::Submit => &self.submit,
        }
    }
}

/// Execution client speaking JSON over HTTP.
///
/// # Example
///
/// ```no_run
/// use freecode_client::{ClientOptions, ExecutionClient, HttpExecutionClient};
///
/// # async fn example() -> Result<(), freecode_client::ClientError> {
/// let client = HttpExecutionClient::new(ClientOptions::new("http://localhost:5000/api"))?;
/// let questions = client.generate_questions("Linked List").await?;
/// println!("Generated {} questions", questions.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpExecutionClient {
    http: reqwest::Client,
    endpoints: Endpoints,
}

impl HttpExecutionClient {
    /// Creates a client from the given options.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] if the base URL is not an
    /// absolute `http`/`https` URL or the HTTP client cannot be built.
    pub fn new(options: ClientOptions) -> Result<Self> {
        let endpoints = Endpoints::resolve(&options.base_url)?;
        let http = reqwest::Client::builder()
            .timeout(options.request_timeout)
            .connect_timeout(options.connect_timeout)
            .build()
            .map_err(|e| ClientError::Configuration(e.to_string()))?;
        debug!(base_url = %options.base_url, "Execution client configured");
        Ok(Self { http, endpoints })
    }

    /// Probes the backend's health endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Health`] if the backend is unreachable,
    /// answers with a non-success status, or sends an unparseable body.
    #[instrument(skip(self))]
    pub async fn health(&self) -> Result<HealthStatus> {
        let health_error = |message: String| ClientError::Health { message };
        let response = self
            .http
            .get(self.endpoints.health.clone())
            .send()
            .await
            .map_err(|e| health_error(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(health_error(format!("backend answered {status}")));
        }
        let health = response
            .json::<HealthStatus>()
            .await
            .map_err(|e| health_error(e.to_string()))?;
        debug!(status = %health.status, llm_configured = health.llm_configured, "Backend health");
        Ok(health)
    }

    /// Posts `body` to the operation's endpoint and decodes the success body.
    async fn post<B, T>(&self, operation: Operation, body: &B) -> Result<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let default_message = operation.default_message();
        let response = self
            .http
            .post(self.endpoints.for_operation(operation).clone())
            .json(body)
            .send()
            .await
            .map_err(|e| operation.error(format!("{default_message}: {e}")))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| operation.error(format!("{default_message}: {e}")))?;

        if !status.is_success() {
            let message =
                extract_error_message(&bytes).unwrap_or_else(|| default_message.to_string());
            warn!(status = %status, message = %message, "Backend reported failure");
            return Err(operation.error(message));
        }

        serde_json::from_slice(&bytes).map_err(|e| {
            warn!(error = %e, "Backend sent a malformed success body");
            operation.error(format!("{default_message}: malformed response: {e}"))
        })
    }
}

/// Pulls a non-blank `error` string out of a failure body.
fn extract_error_message(body: &[u8]) -> Option<String> {
    let body: ErrorBody = serde_json::from_slice(body).ok()?;
    body.error.filter(|message| !message.trim().is_empty())
}

#[async_trait]
impl ExecutionClient for HttpExecutionClient {
    #[instrument(skip(self))]
    async fn generate_questions(&self, topic: &str) -> Result<QuestionSet> {
        let response: GenerateResponse = self
            .post(Operation::Generate, &GenerateRequest { topic })
            .await?;
        let questions = QuestionSet::new(response.questions)
            .map_err(|e| Operation::Generate.error(e.to_string()))?;
        debug!(count = questions.len(), "Questions generated");
        Ok(questions)
    }

    #[instrument(
        skip(self, request),
        fields(function = %request.function_name, cases = request.test_cases.len())
    )]
    async fn run(&self, request: &RunRequest) -> Result<RunResponse> {
        let response: RunResponse = self.post(Operation::Run, request).await?;
        debug!(passed = response.passed, total = response.total, "Run completed");
        Ok(response)
    }

    #[instrument(
        skip(self, request),
        fields(
            function = %request.function_name,
            samples = request.sample_test_cases.len(),
            hidden = request.hidden_test_cases.len()
        )
    )]
    async fn submit(&self, request: &SubmitRequest) -> Result<SubmitResponse> {
        let response: SubmitResponse = self.post(Operation::Submit, request).await?;
        debug!(
            passed = response.passed,
            total = response.total,
            accepted = response.accepted,
            "Submission completed"
        );
        Ok(response)
    }
}
