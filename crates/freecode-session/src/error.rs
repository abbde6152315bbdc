//! Error types for the FreeCode session.
//!
//! [`SessionError`] covers every workflow outcome: the three failures that
//! are recorded against the session (generation, execution, reconciliation)
//! and the rejections returned when an action does not apply to the current
//! state. [`ConfigError`] covers configuration loading.

use std::path::PathBuf;

use freecode_client::ClientError;

use crate::reconcile::ReconcileError;
use crate::state::InFlight;

/// A specialized `Result` type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors produced by session operations.
///
/// `Generation`, `Execution` and `Reconciliation` are recorded as the
/// session's last error. The remaining variants are rejections: they are
/// returned to the caller and leave the state untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    // ========================================================================
    // Recorded failures
    // ========================================================================
    /// Topic generation failed.
    #[error("{message}")]
    Generation {
        /// Message from the backend or transport.
        message: String,
    },

    /// A run or submit call failed.
    #[error("{message}")]
    Execution {
        /// Message from the backend or transport.
        message: String,
    },

    /// The backend answered with counts that violate the result contract.
    #[error("inconsistent results from backend: {0}")]
    Reconciliation(#[from] ReconcileError),

    // ========================================================================
    // Rejections
    // ========================================================================
    /// The topic was empty after trimming.
    #[error("topic must not be empty")]
    EmptyTopic,

    /// The action needs an active question but no question set is loaded.
    #[error("no question is active; generate a question set first")]
    NoActiveQuestion,

    /// The requested question index does not exist.
    #[error("question {index} is out of range (the set has {len} questions)")]
    QuestionOutOfRange {
        /// The rejected index.
        index: usize,
        /// Number of questions in the set.
        len: usize,
    },

    /// A run or submit is already outstanding.
    #[error("cannot start: a request is already {in_flight}")]
    Busy {
        /// The outstanding operation.
        in_flight: InFlight,
    },

    /// A question set is already being generated.
    #[error("question generation is already in progress")]
    GenerationInProgress,
}

impl SessionError {
    /// Returns `true` for failures that are recorded as the session's last error.
    #[must_use]
    pub const fn is_recorded(&self) -> bool {
        matches!(
            self,
            Self::Generation { .. } | Self::Execution { .. } | Self::Reconciliation(_)
        )
    }

    /// Returns `true` for rejections of an action that does not apply.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        !self.is_recorded()
    }
}

impl From<ClientError> for SessionError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Generation { message } => Self::Generation { message },
            ClientError::Execution { message } => Self::Execution { message },
            other @ (ClientError::Health { .. } | ClientError::Configuration(_)) => {
                Self::Execution {
                    message: other.to_string(),
                }
            }
        }
    }
}

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read or is not valid JSON.
    #[error("Invalid config file '{path}': {message}\n\nSuggestion: Validate your freecode.json with a JSON linter")]
    Parse {
        /// Path to the configuration file.
        path: PathBuf,
        /// Description of the parse error.
        message: String,
    },

    /// Configuration values are invalid.
    #[error("Invalid configuration: {message}\n\nSuggestion: {suggestion}")]
    Validation {
        /// Description of the validation failure.
        message: String,
        /// Actionable suggestion for the user.
        suggestion: String,
    },
}

impl ConfigError {
    /// Creates a new `Parse` error with the given path and message.
    #[must_use]
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new `Validation` error with the given message and suggestion.
    #[must_use]
    pub fn validation(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }
}
