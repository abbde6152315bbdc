//! Wire schemas shared with the execution backend.
//!
//! Field names follow the backend's JSON contract exactly; renaming any of
//! them breaks compatibility with existing deployments.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// Questions
// ============================================================================

/// Identifier of a question, unique within one generated set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(pub u64);

impl std::fmt::Display for QuestionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Difficulty rating attached to a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    /// Introductory problem.
    Easy,
    /// Intermediate problem.
    Medium,
    /// Advanced problem.
    Hard,
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Easy => write!(f, "Easy"),
            Self::Medium => write!(f, "Medium"),
            Self::Hard => write!(f, "Hard"),
        }
    }
}

/// A worked example shown in the problem statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    /// Example input, as display text.
    pub input: String,
    /// Expected output, as display text.
    pub output: String,
    /// Optional explanation of the example.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// A named, typed parameter of the function the backend invokes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Type hint for the parameter.
    #[serde(rename = "type")]
    pub type_hint: String,
}

/// A single test case: arguments plus the expected return value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    /// Arguments keyed by parameter name.
    pub input: Value,
    /// Expected return value.
    pub expected: Value,
}

/// A generated coding problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Identifier, unique within the set.
    pub id: QuestionId,
    /// Short title.
    pub title: String,
    /// Difficulty rating.
    pub difficulty: Difficulty,
    /// Full problem description.
    pub description: String,
    /// Worked examples, in display order.
    pub examples: Vec<Example>,
    /// Constraints, in display order.
    pub constraints: Vec<String>,
    /// Initial solution text offered to the user.
    pub starter_code: String,
    /// Name of the function the backend invokes.
    pub function_name: String,
    /// Parameters of that function.
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    /// Return type hint of that function.
    #[serde(default)]
    pub return_type: String,
    /// Test cases whose contents are shown to the user.
    pub sample_test_cases: Vec<TestCase>,
    /// Test cases used only on submission. Never displayed.
    pub hidden_test_cases: Vec<TestCase>,
}

/// Why a list of questions cannot form a [`QuestionSet`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestionSetError {
    /// The backend returned no questions.
    #[error("no questions were generated")]
    Empty,
    /// Two questions share an identifier.
    #[error("duplicate question id {0}")]
    DuplicateId(QuestionId),
}

/// An ordered, non-empty set of questions with unique ids.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct QuestionSet {
    questions: Vec<Question>,
}

impl QuestionSet {
    /// Validates and wraps a list of questions.
    ///
    /// # Errors
    ///
    /// Returns [`QuestionSetError::Empty`] for an empty list and
    /// [`QuestionSetError::DuplicateId`] when two questions share an id.
    pub fn new(questions: Vec<Question>) -> Result<Self, QuestionSetError> {
        if questions.is_empty() {
            return Err(QuestionSetError::Empty);
        }
        let mut seen = HashSet::with_capacity(questions.len());
        for question in &questions {
            if !seen.insert(question.id) {
                return Err(QuestionSetError::DuplicateId(question.id));
            }
        }
        Ok(Self { questions })
    }

    /// Number of questions in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Returns `true` if the set holds no questions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Question at `index`, if in range.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// Iterates the questions in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Question> {
        self.questions.iter()
    }

    /// The questions as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Question] {
        &self.questions
    }
}

impl<'a> IntoIterator for &'a QuestionSet {
    type Item = &'a Question;
    type IntoIter = std::slice::Iter<'a, Question>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ============================================================================
// Execution results
// ============================================================================

/// Outcome of one test case as reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCaseResult {
    /// Arguments the case was run with.
    #[serde(default)]
    pub input: Value,
    /// Expected return value.
    #[serde(default)]
    pub expected: Value,
    /// Actual return value. `Some(Value::Null)` when the function returned
    /// null, `None` when no value was produced.
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub actual: Option<Value>,
    /// Whether the case passed.
    pub passed: bool,
    /// Error text when the case failed abnormally.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Keeps an explicit JSON `null` as `Some(Value::Null)`.
fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Which execution flow a request or response belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Sample tests only.
    Run,
    /// Sample plus hidden tests.
    Submit,
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Run => write!(f, "run"),
            Self::Submit => write!(f, "submit"),
        }
    }
}

// ============================================================================
// Requests
// ============================================================================

/// Body of `POST generate-questions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerateRequest<'a> {
    /// Topic the questions should cover.
    pub topic: &'a str,
}

/// Body of `POST run`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunRequest {
    /// Solution text.
    pub code: String,
    /// Sample test cases of the question.
    pub test_cases: Vec<TestCase>,
    /// Function the backend invokes.
    pub function_name: String,
}

/// Body of `POST submit`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmitRequest {
    /// Solution text.
    pub code: String,
    /// Sample test cases of the question.
    pub sample_test_cases: Vec<TestCase>,
    /// Hidden test cases of the question.
    pub hidden_test_cases: Vec<TestCase>,
    /// Function the backend invokes.
    pub function_name: String,
}

/// A run or submit request.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionRequest {
    /// Sample-only execution.
    Run(RunRequest),
    /// Full-suite execution.
    Submit(SubmitRequest),
}

impl ExecutionRequest {
    /// The flow this request belongs to.
    #[must_use]
    pub const fn mode(&self) -> ExecutionMode {
        match self {
            Self::Run(_) => ExecutionMode::Run,
            Self::Submit(_) => ExecutionMode::Submit,
        }
    }
}

// ============================================================================
// Responses
// ============================================================================

/// Success body of `POST generate-questions`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GenerateResponse {
    pub(crate) questions: Vec<Question>,
}

/// Success body of `POST run`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResponse {
    /// Number of passing cases.
    pub passed: usize,
    /// Number of cases run.
    pub total: usize,
    /// Per-case outcomes, all visible.
    pub results: Vec<TestCaseResult>,
}

/// Success body of `POST submit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitResponse {
    /// Number of passing cases, hidden included.
    pub passed: usize,
    /// Number of cases run, hidden included.
    pub total: usize,
    /// Whether every case passed.
    pub accepted: bool,
    /// Outcomes of the sample cases only.
    pub visible_results: Vec<TestCaseResult>,
}

/// A run or submit response.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResponse {
    /// Response to a run request.
    Run(RunResponse),
    /// Response to a submit request.
    Submit(SubmitResponse),
}

impl ExecutionResponse {
    /// The flow this response belongs to.
    #[must_use]
    pub const fn mode(&self) -> ExecutionMode {
        match self {
            Self::Run(_) => ExecutionMode::Run,
            Self::Submit(_) => ExecutionMode::Submit,
        }
    }
}

/// Failure body returned by every endpoint.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub(crate) error: Option<String>,
}

/// Body of `GET health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// `"ok"` when the backend is serving.
    pub status: String,
    /// Whether a question generator is configured.
    #[serde(default)]
    pub llm_configured: bool,
    /// Name of the configured question generator.
    #[serde(default)]
    pub llm_provider: Option<String>,
}
