//! Session state and its transitions.
//!
//! [`SessionState`] is a single value owning everything a practice session
//! shows: the question set, the active index, the per-question code, the
//! outstanding request flags and the last outcome. Every change goes through
//! one of its transition methods; nothing here performs I/O.
//!
//! Network operations are split in two halves. A `begin_*` method validates
//! the action, marks the request as outstanding and hands back a ticket
//! describing what was issued. The matching `finish_*` method takes the
//! ticket and the outcome, and applies the outcome only while the ticket
//! still matches the session. An execution must match the epoch and the
//! active question; a generation only has to still be the outstanding one,
//! so navigating while it runs does not drop it. Stale outcomes are
//! discarded without touching the summary or the error.

use std::collections::HashMap;

use freecode_client::{
    ClientError, ExecutionMode, ExecutionRequest, ExecutionResponse, Question, QuestionId,
    QuestionSet, RunRequest, SubmitRequest,
};
use tracing::{debug, info, warn};

use crate::error::{Result, SessionError};
use crate::reconcile::{reconcile, ExecutionSummary, TestCounts};

// ============================================================================
// Phases and flags
// ============================================================================

/// The execution request currently outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InFlight {
    /// A run against the sample cases.
    Running,
    /// A submission against sample and hidden cases.
    Submitting,
}

impl InFlight {
    /// The flag raised by a request of the given mode.
    #[must_use]
    pub const fn for_mode(mode: ExecutionMode) -> Self {
        match mode {
            ExecutionMode::Run => Self::Running,
            ExecutionMode::Submit => Self::Submitting,
        }
    }

    /// The mode of the outstanding request.
    #[must_use]
    pub const fn mode(self) -> ExecutionMode {
        match self {
            Self::Running => ExecutionMode::Run,
            Self::Submitting => ExecutionMode::Submit,
        }
    }
}

impl std::fmt::Display for InFlight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Submitting => write!(f, "submitting"),
        }
    }
}

/// Where the session stands.
///
/// `Idle` and `Ready` are the rest states; `Busy` always resolves back to
/// `Ready` once the outstanding request completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No question set is loaded.
    Idle,
    /// A question set is loaded and nothing is executing.
    Ready,
    /// A run or submit is outstanding.
    Busy(InFlight),
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Ready => write!(f, "ready"),
            Self::Busy(in_flight) => write!(f, "busy ({in_flight})"),
        }
    }
}

/// Identifier assigned to every issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What happened to a completed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The outcome was a success and is now shown.
    Applied,
    /// The outcome was a failure and is now the last error.
    Failed,
    /// The session moved on; the outcome was dropped.
    Discarded,
}

// ============================================================================
// Tickets
// ============================================================================

/// Issued by [`SessionState::begin_generate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateTicket {
    request_id: RequestId,
    topic: String,
}

impl GenerateTicket {
    /// The trimmed topic to send.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Identifier of the request.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }
}

/// Issued by [`SessionState::begin_execution`].
///
/// Captures the question and test counts at issue time so the response can
/// be reconciled against what was actually sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionTicket {
    request_id: RequestId,
    epoch: u64,
    question_id: QuestionId,
    mode: ExecutionMode,
    counts: TestCounts,
}

impl ExecutionTicket {
    /// Identifier of the request.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Question the request was issued for.
    #[must_use]
    pub const fn question_id(&self) -> QuestionId {
        self.question_id
    }

    /// Flow of the request.
    #[must_use]
    pub const fn mode(&self) -> ExecutionMode {
        self.mode
    }
}

// ============================================================================
// CodeStore
// ============================================================================

/// Per-question solution text.
///
/// Entries exist only for questions that were edited; every other question
/// reads back its starter code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeStore {
    entries: HashMap<QuestionId, String>,
}

impl CodeStore {
    /// The effective code for `question`.
    #[must_use]
    pub fn get<'a>(&'a self, question: &'a Question) -> &'a str {
        self.entries
            .get(&question.id)
            .map_or(question.starter_code.as_str(), String::as_str)
    }

    /// Replaces the code for the question with the given id.
    pub fn set(&mut self, id: QuestionId, text: String) {
        self.entries.insert(id, text);
    }

    /// Returns `true` if the question has been edited.
    #[must_use]
    pub fn is_edited(&self, id: QuestionId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Number of edited questions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no question has been edited.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

// ============================================================================
// SessionState
// ============================================================================

/// The whole observable state of one practice session.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    questions: Option<QuestionSet>,
    active_index: usize,
    code: CodeStore,
    last_summary: Option<ExecutionSummary>,
    last_error: Option<SessionError>,
    in_flight: Option<(InFlight, RequestId)>,
    generating: Option<RequestId>,
    epoch: u64,
    next_request_id: u64,
}

impl SessionState {
    /// Creates an idle session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase, derived from the question set and the in-flight flag.
    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        match (&self.questions, self.in_flight) {
            (None, _) => SessionPhase::Idle,
            (Some(_), None) => SessionPhase::Ready,
            (Some(_), Some((in_flight, _))) => SessionPhase::Busy(in_flight),
        }
    }

    /// The loaded question set.
    #[must_use]
    pub const fn questions(&self) -> Option<&QuestionSet> {
        self.questions.as_ref()
    }

    /// Index of the active question. Meaningful only while a set is loaded.
    #[must_use]
    pub const fn active_index(&self) -> usize {
        self.active_index
    }

    /// The active question.
    #[must_use]
    pub fn active_question(&self) -> Option<&Question> {
        self.questions.as_ref()?.get(self.active_index)
    }

    /// The per-question code.
    #[must_use]
    pub const fn code_store(&self) -> &CodeStore {
        &self.code
    }

    /// Effective code for `question`.
    #[must_use]
    pub fn code_for<'a>(&'a self, question: &'a Question) -> &'a str {
        self.code.get(question)
    }

    /// Effective code for the active question.
    #[must_use]
    pub fn current_code(&self) -> Option<&str> {
        self.active_question().map(|q| self.code.get(q))
    }

    /// The last reconciled outcome.
    #[must_use]
    pub const fn last_summary(&self) -> Option<&ExecutionSummary> {
        self.last_summary.as_ref()
    }

    /// Mode of the last reconciled outcome.
    #[must_use]
    pub fn last_summary_mode(&self) -> Option<ExecutionMode> {
        self.last_summary.as_ref().map(ExecutionSummary::mode)
    }

    /// The last recorded failure.
    #[must_use]
    pub const fn last_error(&self) -> Option<&SessionError> {
        self.last_error.as_ref()
    }

    /// The outstanding run or submit.
    #[must_use]
    pub fn in_flight(&self) -> Option<InFlight> {
        self.in_flight.map(|(in_flight, _)| in_flight)
    }

    /// Returns `true` while a question set is being generated.
    #[must_use]
    pub const fn is_generating(&self) -> bool {
        self.generating.is_some()
    }

    /// Current epoch.
    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    // ------------------------------------------------------------------------
    // Generation
    // ------------------------------------------------------------------------

    /// Starts generating a question set for `topic`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::EmptyTopic`] if the topic is blank and
    /// [`SessionError::GenerationInProgress`] if a generation is outstanding.
    pub fn begin_generate(&mut self, topic: &str) -> Result<GenerateTicket> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(SessionError::EmptyTopic);
        }
        if self.generating.is_some() {
            return Err(SessionError::GenerationInProgress);
        }

        self.last_error = None;
        let request_id = self.issue_request_id();
        self.generating = Some(request_id);
        debug!(request = %request_id, topic, "Generation started");

        Ok(GenerateTicket {
            request_id,
            topic: topic.to_string(),
        })
    }

    /// Applies the outcome of a generation.
    ///
    /// The outcome is applied only while this request is still the
    /// outstanding generation; [`back`](Self::back) withdraws it, selecting
    /// or editing does not. A success replaces the question set and resets
    /// everything derived from it. A failure is recorded and leaves the
    /// previous set in place.
    pub fn finish_generate(
        &mut self,
        ticket: &GenerateTicket,
        outcome: std::result::Result<QuestionSet, ClientError>,
    ) -> Completion {
        if self.generating != Some(ticket.request_id) {
            warn!(request = %ticket.request_id, "Discarding withdrawn generation result");
            return Completion::Discarded;
        }
        self.generating = None;

        match outcome {
            Ok(questions) => {
                info!(topic = %ticket.topic, count = questions.len(), "Question set loaded");
                self.questions = Some(questions);
                self.active_index = 0;
                self.code.clear();
                self.clear_outcome();
                self.in_flight = None;
                self.epoch += 1;
                Completion::Applied
            }
            Err(err) => {
                warn!(topic = %ticket.topic, error = %err, "Generation failed");
                self.last_error = Some(err.into());
                Completion::Failed
            }
        }
    }

    // ------------------------------------------------------------------------
    // Navigation and editing
    // ------------------------------------------------------------------------

    /// Makes the question at `index` active and clears the shown outcome.
    ///
    /// Re-selecting the active question still clears the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoActiveQuestion`] when no set is loaded and
    /// [`SessionError::QuestionOutOfRange`] for an invalid index.
    pub fn select_question(&mut self, index: usize) -> Result<()> {
        let len = self
            .questions
            .as_ref()
            .map(QuestionSet::len)
            .ok_or(SessionError::NoActiveQuestion)?;
        if index >= len {
            return Err(SessionError::QuestionOutOfRange { index, len });
        }

        self.active_index = index;
        self.clear_outcome();
        self.epoch += 1;
        debug!(index, epoch = self.epoch, "Question selected");
        Ok(())
    }

    /// Stores `text` as the code of the active question.
    ///
    /// Clears the last error but keeps the last summary.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoActiveQuestion`] when no set is loaded.
    pub fn edit_code(&mut self, text: impl Into<String>) -> Result<()> {
        let id = self
            .active_question()
            .map(|q| q.id)
            .ok_or(SessionError::NoActiveQuestion)?;
        self.code.set(id, text.into());
        self.last_error = None;
        Ok(())
    }

    /// Returns to the idle state, dropping the set, the code and every flag.
    ///
    /// Outstanding requests keep running but their outcomes are discarded.
    pub fn back(&mut self) {
        self.questions = None;
        self.active_index = 0;
        self.code.clear();
        self.clear_outcome();
        self.in_flight = None;
        self.generating = None;
        self.epoch += 1;
        info!(epoch = self.epoch, "Session reset");
    }

    // ------------------------------------------------------------------------
    // Execution
    // ------------------------------------------------------------------------

    /// Starts a run or submission of the active question's current code.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoActiveQuestion`] when no set is loaded and
    /// [`SessionError::Busy`] when a request is already outstanding.
    pub fn begin_execution(
        &mut self,
        mode: ExecutionMode,
    ) -> Result<(ExecutionTicket, ExecutionRequest)> {
        let question = self.active_question().ok_or(SessionError::NoActiveQuestion)?;
        if let Some((in_flight, _)) = self.in_flight {
            return Err(SessionError::Busy { in_flight });
        }

        let code = self.code.get(question).to_string();
        let function_name = question.function_name.clone();
        let request = match mode {
            ExecutionMode::Run => ExecutionRequest::Run(RunRequest {
                code,
                test_cases: question.sample_test_cases.clone(),
                function_name,
            }),
            ExecutionMode::Submit => ExecutionRequest::Submit(SubmitRequest {
                code,
                sample_test_cases: question.sample_test_cases.clone(),
                hidden_test_cases: question.hidden_test_cases.clone(),
                function_name,
            }),
        };
        let question_id = question.id;
        let counts = TestCounts::of(question);

        self.clear_outcome();
        let request_id = self.issue_request_id();
        self.in_flight = Some((InFlight::for_mode(mode), request_id));
        debug!(
            request = %request_id,
            question = %question_id,
            mode = %mode,
            samples = counts.sample,
            hidden = counts.hidden,
            "Execution started"
        );

        let ticket = ExecutionTicket {
            request_id,
            epoch: self.epoch,
            question_id,
            mode,
            counts,
        };
        Ok((ticket, request))
    }

    /// Applies the outcome of a run or submission.
    ///
    /// The in-flight flag is released only if it still belongs to this
    /// request. The outcome is applied only while the epoch and the active
    /// question match the ticket.
    pub fn finish_execution(
        &mut self,
        ticket: &ExecutionTicket,
        outcome: std::result::Result<ExecutionResponse, ClientError>,
    ) -> Completion {
        if matches!(self.in_flight, Some((_, id)) if id == ticket.request_id) {
            self.in_flight = None;
        }
        if !self.is_current(ticket) {
            warn!(
                request = %ticket.request_id,
                question = %ticket.question_id,
                issued_epoch = ticket.epoch,
                epoch = self.epoch,
                "Discarding stale execution result"
            );
            return Completion::Discarded;
        }

        let response = match outcome {
            Ok(response) => response,
            Err(err) => {
                warn!(request = %ticket.request_id, error = %err, "Execution failed");
                self.last_error = Some(err.into());
                return Completion::Failed;
            }
        };

        match reconcile(ticket.mode, ticket.counts, response) {
            Ok(summary) => {
                info!(
                    question = %ticket.question_id,
                    mode = %ticket.mode,
                    passed = summary.passed(),
                    total = summary.total(),
                    "Execution result applied"
                );
                self.last_summary = Some(summary);
                Completion::Applied
            }
            Err(err) => {
                warn!(
                    request = %ticket.request_id,
                    error = %err,
                    "Backend broke the result contract"
                );
                self.last_error = Some(err.into());
                Completion::Failed
            }
        }
    }

    fn is_current(&self, ticket: &ExecutionTicket) -> bool {
        ticket.epoch == self.epoch
            && self.active_question().map(|q| q.id) == Some(ticket.question_id)
    }

    fn clear_outcome(&mut self) {
        self.last_summary = None;
        self.last_error = None;
    }

    fn issue_request_id(&mut self) -> RequestId {
        self.next_request_id += 1;
        RequestId(self.next_request_id)
    }
}
