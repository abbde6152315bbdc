//! Session controller: the state machine wired to an [`ExecutionClient`].
//!
//! The controller validates each action against [`SessionState`], performs
//! the remote call and feeds the outcome back through the fenced completion
//! path. Callers that must stay responsive while a request is outstanding use
//! the split form: `start_*` returns a pending request that can be resolved
//! on another task, and the resolved value is handed back to `complete_*`.

use std::sync::Arc;

use freecode_client::{
    ClientError, ExecutionClient, ExecutionMode, ExecutionRequest, ExecutionResponse, QuestionSet,
};
use tracing::instrument;

use crate::error::Result;
use crate::state::{Completion, ExecutionTicket, GenerateTicket, SessionState};

/// A generation that has been issued but not yet sent.
pub struct PendingGeneration {
    ticket: GenerateTicket,
    client: Arc<dyn ExecutionClient>,
}

impl PendingGeneration {
    /// The request's ticket.
    #[must_use]
    pub const fn ticket(&self) -> &GenerateTicket {
        &self.ticket
    }

    /// Performs the remote call.
    pub async fn resolve(self) -> ResolvedGeneration {
        let outcome = self.client.generate_questions(self.ticket.topic()).await;
        ResolvedGeneration {
            ticket: self.ticket,
            outcome,
        }
    }
}

/// A finished generation, ready to be applied.
#[derive(Debug)]
pub struct ResolvedGeneration {
    ticket: GenerateTicket,
    outcome: std::result::Result<QuestionSet, ClientError>,
}

/// A run or submit that has been issued but not yet sent.
pub struct PendingExecution {
    ticket: ExecutionTicket,
    request: ExecutionRequest,
    client: Arc<dyn ExecutionClient>,
}

impl PendingExecution {
    /// The request's ticket.
    #[must_use]
    pub const fn ticket(&self) -> &ExecutionTicket {
        &self.ticket
    }

    /// The body that will be sent.
    #[must_use]
    pub const fn request(&self) -> &ExecutionRequest {
        &self.request
    }

    /// Performs the remote call.
    pub async fn resolve(self) -> ResolvedExecution {
        let outcome = self.client.execute(&self.request).await;
        ResolvedExecution {
            ticket: self.ticket,
            outcome,
        }
    }
}

/// A finished run or submit, ready to be applied.
#[derive(Debug)]
pub struct ResolvedExecution {
    ticket: ExecutionTicket,
    outcome: std::result::Result<ExecutionResponse, ClientError>,
}

impl ResolvedExecution {
    /// The request's ticket.
    #[must_use]
    pub const fn ticket(&self) -> &ExecutionTicket {
        &self.ticket
    }
}

/// Drives one practice session against an execution backend.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use freecode_client::{ClientOptions, HttpExecutionClient};
/// use freecode_session::SessionController;
///
/// # async fn example() -> anyhow::Result<()> {
/// let client = HttpExecutionClient::new(ClientOptions::new("http://localhost:5000/api"))?;
/// let mut session = SessionController::new(Arc::new(client));
///
/// session.generate("Linked List").await?;
/// session.edit_code("def reverse_list(head):\n    return head")?;
/// session.run_sample().await?;
///
/// if let Some(summary) = session.state().last_summary() {
///     println!("{}/{} passed", summary.passed(), summary.total());
/// }
/// # Ok(())
/// # }
/// ```
pub struct SessionController {
    client: Arc<dyn ExecutionClient>,
    state: SessionState,
}

impl SessionController {
    /// Creates an idle session using `client`.
    #[must_use]
    pub fn new(client: Arc<dyn ExecutionClient>) -> Self {
        Self {
            client,
            state: SessionState::new(),
        }
    }

    /// The current state.
    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    // ------------------------------------------------------------------------
    // Generation
    // ------------------------------------------------------------------------

    /// Issues a generation for `topic` without sending it.
    ///
    /// # Errors
    ///
    /// Returns a rejection if the topic is blank or a generation is outstanding.
    pub fn start_generate(&mut self, topic: &str) -> Result<PendingGeneration> {
        let ticket = self.state.begin_generate(topic)?;
        Ok(PendingGeneration {
            ticket,
            client: Arc::clone(&self.client),
        })
    }

    /// Applies a finished generation.
    pub fn complete_generate(&mut self, resolved: ResolvedGeneration) -> Completion {
        self.state.finish_generate(&resolved.ticket, resolved.outcome)
    }

    /// Generates a question set and applies the outcome.
    ///
    /// # Errors
    ///
    /// Returns a rejection if the topic is blank or a generation is
    /// outstanding. A failed call is not an error here: it is recorded as the
    /// last error and reported as [`Completion::Failed`].
    #[instrument(skip(self))]
    pub async fn generate(&mut self, topic: &str) -> Result<Completion> {
        let pending = self.start_generate(topic)?;
        let resolved = pending.resolve().await;
        Ok(self.complete_generate(resolved))
    }

    // ------------------------------------------------------------------------
    // Navigation and editing
    // ------------------------------------------------------------------------

    /// Makes the question at `index` active.
    ///
    /// # Errors
    ///
    /// Returns a rejection when no set is loaded or the index is out of range.
    pub fn select_question(&mut self, index: usize) -> Result<()> {
        self.state.select_question(index)
    }

    /// Replaces the active question's code.
    ///
    /// # Errors
    ///
    /// Returns a rejection when no set is loaded.
    pub fn edit_code(&mut self, text: impl Into<String>) -> Result<()> {
        self.state.edit_code(text)
    }

    /// Resets the session to idle.
    pub fn back(&mut self) {
        self.state.back();
    }

    // ------------------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------------------

    /// Issues a run of the current code without sending it.
    ///
    /// # Errors
    ///
    /// Returns a rejection when no set is loaded or a request is outstanding.
    pub fn start_run(&mut self) -> Result<PendingExecution> {
        self.start_execution(ExecutionMode::Run)
    }

    /// Issues a submission of the current code without sending it.
    ///
    /// # Errors
    ///
    /// Returns a rejection when no set is loaded or a request is outstanding.
    pub fn start_submit(&mut self) -> Result<PendingExecution> {
        self.start_execution(ExecutionMode::Submit)
    }

    fn start_execution(&mut self, mode: ExecutionMode) -> Result<PendingExecution> {
        let (ticket, request) = self.state.begin_execution(mode)?;
        Ok(PendingExecution {
            ticket,
            request,
            client: Arc::clone(&self.client),
        })
    }

    /// Applies a finished run or submission.
    pub fn complete_execution(&mut self, resolved: ResolvedExecution) -> Completion {
        self.state.finish_execution(&resolved.ticket, resolved.outcome)
    }

    /// Runs the current code against the sample cases.
    ///
    /// # Errors
    ///
    /// Returns a rejection when no set is loaded or a request is outstanding.
    #[instrument(skip(self))]
    pub async fn run_sample(&mut self) -> Result<Completion> {
        let pending = self.start_run()?;
        let resolved = pending.resolve().await;
        Ok(self.complete_execution(resolved))
    }

    /// Submits the current code against the sample and hidden cases.
    ///
    /// # Errors
    ///
    /// Returns a rejection when no set is loaded or a request is outstanding.
    #[instrument(skip(self))]
    pub async fn submit(&mut self) -> Result<Completion> {
        let pending = self.start_submit()?;
        let resolved = pending.resolve().await;
        Ok(self.complete_execution(resolved))
    }
}
