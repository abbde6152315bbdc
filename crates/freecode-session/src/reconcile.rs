//! Reconciliation of raw execution responses into display-ready summaries.
//!
//! The backend reports aggregate counts alongside per-case results. For a
//! submission only the sample cases come back in detail, so the pass count
//! of the hidden cases has to be inferred from the totals. Every function
//! here is pure: it either returns a summary whose counts are consistent with
//! the originating question, or a [`ReconcileError`] naming the violated rule.
//!
//! Hidden case contents never pass through this module; a [`SubmitSummary`]
//! exposes them only as a [`HiddenTally`].

use freecode_client::{
    ExecutionMode, ExecutionResponse, Question, RunResponse, SubmitResponse, TestCaseResult,
};
use serde::Serialize;
use thiserror::Error;

/// Test case counts of the question a request was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TestCounts {
    /// Number of sample test cases.
    pub sample: usize,
    /// Number of hidden test cases.
    pub hidden: usize,
}

impl TestCounts {
    /// Counts of the given question.
    #[must_use]
    pub fn of(question: &Question) -> Self {
        Self {
            sample: question.sample_test_cases.len(),
            hidden: question.hidden_test_cases.len(),
        }
    }
}

/// A backend response that broke the result contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    /// More cases passed than were run.
    #[error("{passed} passed out of only {total} test cases")]
    PassedExceedsTotal {
        /// Reported pass count.
        passed: usize,
        /// Reported total.
        total: usize,
    },

    /// The reported total does not match the cases that were sent.
    #[error("{mode} reported {total} test cases but {expected} were sent")]
    TotalMismatch {
        /// Flow of the response.
        mode: ExecutionMode,
        /// Reported total.
        total: usize,
        /// Number of cases sent.
        expected: usize,
    },

    /// A run returned a different number of results than its total.
    #[error("run returned {results} results for {total} test cases")]
    ResultCountMismatch {
        /// Number of result entries.
        results: usize,
        /// Reported total.
        total: usize,
    },

    /// A submission disclosed more results than there are sample cases.
    #[error("submission disclosed {visible} results but only {samples} sample cases exist")]
    TooManyVisibleResults {
        /// Number of visible result entries.
        visible: usize,
        /// Number of sample cases.
        samples: usize,
    },

    /// The inferred hidden pass count falls outside `0..=hidden_count`.
    #[error(
        "{passed} passed with {visible_passed} visible passes leaves an impossible hidden pass count for {hidden_count} hidden cases"
    )]
    HiddenPassedOutOfRange {
        /// Reported pass count.
        passed: usize,
        /// Passing cases among the visible results.
        visible_passed: usize,
        /// Number of cases not disclosed.
        hidden_count: usize,
    },

    /// The acceptance flag disagrees with the counts.
    #[error("accepted is {accepted} but {passed}/{total} passed")]
    AcceptedMismatch {
        /// Reported acceptance flag.
        accepted: bool,
        /// Reported pass count.
        passed: usize,
        /// Reported total.
        total: usize,
    },

    /// The response belongs to a different flow than the request.
    #[error("{requested} request answered with a {received} response")]
    ModeMismatch {
        /// Flow of the request.
        requested: ExecutionMode,
        /// Flow of the response.
        received: ExecutionMode,
    },
}

/// Aggregate outcome of the hidden cases of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HiddenTally {
    /// Number of cases not disclosed.
    pub count: usize,
    /// Number of those that passed.
    pub passed: usize,
}

/// Reconciled outcome of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    /// Number of passing cases.
    pub passed: usize,
    /// Number of cases run.
    pub total: usize,
    /// Every case, in order.
    pub results: Vec<TestCaseResult>,
}

/// Reconciled outcome of a submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmitSummary {
    /// Number of passing cases, hidden included.
    pub passed: usize,
    /// Number of cases run, hidden included.
    pub total: usize,
    /// Whether every case passed.
    pub accepted: bool,
    /// The disclosed sample cases, in order.
    pub visible_results: Vec<TestCaseResult>,
    /// Counts for the undisclosed cases.
    pub hidden: HiddenTally,
}

/// A reconciled run or submit outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ExecutionSummary {
    /// Outcome of a run.
    Run(RunSummary),
    /// Outcome of a submission.
    Submit(SubmitSummary),
}

impl ExecutionSummary {
    /// The flow that produced this summary.
    #[must_use]
    pub const fn mode(&self) -> ExecutionMode {
        match self {
            Self::Run(_) => ExecutionMode::Run,
            Self::Submit(_) => ExecutionMode::Submit,
        }
    }

    /// Number of passing cases.
    #[must_use]
    pub const fn passed(&self) -> usize {
        match self {
            Self::Run(run) => run.passed,
            Self::Submit(submit) => submit.passed,
        }
    }

    /// Number of cases run.
    #[must_use]
    pub const fn total(&self) -> usize {
        match self {
            Self::Run(run) => run.total,
            Self::Submit(submit) => submit.total,
        }
    }

    /// Returns `true` when every case passed.
    #[must_use]
    pub const fn all_passed(&self) -> bool {
        self.passed() == self.total()
    }

    /// The per-case results that may be shown.
    #[must_use]
    pub fn visible_results(&self) -> &[TestCaseResult] {
        match self {
            Self::Run(run) => &run.results,
            Self::Submit(submit) => &submit.visible_results,
        }
    }
}

/// Reconciles a response against the mode it was requested in.
pub fn reconcile(
    requested: ExecutionMode,
    counts: TestCounts,
    response: ExecutionResponse,
) -> Result<ExecutionSummary, ReconcileError> {
    match (requested, response) {
        (ExecutionMode::Run, ExecutionResponse::Run(run)) => {
            reconcile_run(counts, run).map(ExecutionSummary::Run)
        }
        (ExecutionMode::Submit, ExecutionResponse::Submit(submit)) => {
            reconcile_submit(counts, submit).map(ExecutionSummary::Submit)
        }
        (requested, response) => Err(ReconcileError::ModeMismatch {
            requested,
            received: response.mode(),
        }),
    }
}

/// Validates a run response. Results pass through unchanged.
pub fn reconcile_run(
    counts: TestCounts,
    response: RunResponse,
) -> Result<RunSummary, ReconcileError> {
    let RunResponse {
        passed,
        total,
        results,
    } = response;

    check_passed(passed, total)?;
    if total != counts.sample {
        return Err(ReconcileError::TotalMismatch {
            mode: ExecutionMode::Run,
            total,
            expected: counts.sample,
        });
    }
    if results.len() != total {
        return Err(ReconcileError::ResultCountMismatch {
            results: results.len(),
            total,
        });
    }

    Ok(RunSummary {
        passed,
        total,
        results,
    })
}

/// Validates a submit response and infers the hidden pass count.
pub fn reconcile_submit(
    counts: TestCounts,
    response: SubmitResponse,
) -> Result<SubmitSummary, ReconcileError> {
    let SubmitResponse {
        passed,
        total,
        accepted,
        visible_results,
    } = response;

    check_passed(passed, total)?;
    let expected = counts.sample + counts.hidden;
    if total != expected {
        return Err(ReconcileError::TotalMismatch {
            mode: ExecutionMode::Submit,
            total,
            expected,
        });
    }
    if visible_results.len() > counts.sample {
        return Err(ReconcileError::TooManyVisibleResults {
            visible: visible_results.len(),
            samples: counts.sample,
        });
    }

    let hidden_count = total - visible_results.len();
    let visible_passed = visible_results.iter().filter(|r| r.passed).count();
    let hidden_passed = passed
        .checked_sub(visible_passed)
        .filter(|hidden_passed| *hidden_passed <= hidden_count)
        .ok_or(ReconcileError::HiddenPassedOutOfRange {
            passed,
            visible_passed,
            hidden_count,
        })?;

    if accepted != (passed == total) {
        return Err(ReconcileError::AcceptedMismatch {
            accepted,
            passed,
            total,
        });
    }

    Ok(SubmitSummary {
        passed,
        total,
        accepted,
        visible_results,
        hidden: HiddenTally {
            count: hidden_count,
            passed: hidden_passed,
        },
    })
}

const fn check_passed(passed: usize, total: usize) -> Result<(), ReconcileError> {
    if passed > total {
        return Err(ReconcileError::PassedExceedsTotal { passed, total });
    }
    Ok(())
}
