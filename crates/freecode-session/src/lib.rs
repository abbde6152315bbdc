//! FreeCode Session
//!
//! The stateful core of a coding-practice session: question selection,
//! per-question code, fenced run/submit requests and the reconciliation of
//! their results, including the hidden-test accounting of submissions.

pub mod config;
pub mod controller;
pub mod error;
pub mod reconcile;
pub mod state;

pub use config::{Config, CONFIG_FILE_NAME};
pub use controller::{
    PendingExecution, PendingGeneration, ResolvedExecution, ResolvedGeneration, SessionController,
};
pub use error::{ConfigError, Result, SessionError};
pub use reconcile::{
    reconcile, reconcile_run, reconcile_submit, ExecutionSummary, HiddenTally, ReconcileError,
    RunSummary, SubmitSummary, TestCounts,
};
pub use state::{
    CodeStore, Completion, ExecutionTicket, GenerateTicket, InFlight, RequestId, SessionPhase,
    SessionState,
};
