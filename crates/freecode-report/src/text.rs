//! Plain-text rendering of results and navigation.
//!
//! These are the strings a terminal front end prints after a run or a
//! submission. Values are rendered as compact JSON.

use std::fmt::Write;

use freecode_client::{QuestionSet, TestCaseResult};
use freecode_session::{ExecutionSummary, SessionState, SubmitSummary};
use serde_json::Value;

/// One-line outcome of a run or submission.
///
/// # Example
///
/// ```rust
/// use freecode_report::headline;
/// use freecode_session::{ExecutionSummary, RunSummary};
///
/// let summary = ExecutionSummary::Run(RunSummary { passed: 1, total: 2, results: vec![] });
/// assert_eq!(headline(&summary), "1/2 test cases passed");
/// ```
#[must_use]
pub fn headline(summary: &ExecutionSummary) -> String {
    match summary {
        ExecutionSummary::Run(run) => format!("{}/{} test cases passed", run.passed, run.total),
        ExecutionSummary::Submit(submit) => submit_headline(submit),
    }
}

fn submit_headline(submit: &SubmitSummary) -> String {
    let mut line = format!(
        "accepted: {}, {}/{} passed",
        submit.accepted, submit.passed, submit.total
    );
    if submit.hidden.count > 0 {
        let _ = write!(
            line,
            ", +{} hidden ({} passed)",
            submit.hidden.count, submit.hidden.passed
        );
    }
    line
}

/// Renders one visible test case. `number` is 1-based.
#[must_use]
pub fn render_case(number: usize, result: &TestCaseResult) -> String {
    let mut output = String::new();
    let verdict = if result.passed { "PASS" } else { "FAIL" };
    let _ = writeln!(output, "Test Case {number}: {verdict}");
    let _ = writeln!(output, "  Input: {}", compact(&result.input));
    let _ = writeln!(output, "  Expected: {}", compact(&result.expected));
    if let Some(actual) = &result.actual {
        let _ = writeln!(output, "  Actual: {}", compact(actual));
    }
    if let Some(error) = &result.error {
        let _ = writeln!(output, "  Error: {error}");
    }
    output
}

/// Renders the headline followed by every visible case.
#[must_use]
pub fn render_summary(summary: &ExecutionSummary) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "{}", headline(summary));
    for (i, result) in summary.visible_results().iter().enumerate() {
        output.push_str(&render_case(i + 1, result));
    }
    output
}

/// One line listing the questions, with the active one bracketed.
#[must_use]
pub fn question_nav(questions: &QuestionSet, active: usize) -> String {
    questions
        .iter()
        .enumerate()
        .map(|(i, question)| {
            if i == active {
                format!("[{}] {}", i + 1, question.title)
            } else {
                format!("{} {}", i + 1, question.title)
            }
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Short description of where the session stands.
#[must_use]
pub fn status_line(state: &SessionState) -> String {
    let mut line = match (state.questions(), state.active_question()) {
        (Some(questions), Some(question)) => format!(
            "question {}/{}: {} ({})",
            state.active_index() + 1,
            questions.len(),
            question.title,
            state.phase()
        ),
        _ => format!("no questions loaded ({})", state.phase()),
    };
    if state.is_generating() {
        line.push_str(", generating");
    }
    line
}

fn compact(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| value.to_string())
}
