//! FreeCode Report Generation
//!
//! Presentation of session state for human and programmatic consumption.
//!
//! # Renderers
//!
//! - [`text`] - result headlines, per-case lines and question navigation
//! - [`MarkdownGenerator`] - question statements as Markdown
//! - [`json::JsonGenerator`] - JSON export of the last execution summary
//!
//! Only aggregate counts of hidden test cases ever reach these renderers.

pub mod json;
mod markdown;
pub mod text;

pub use markdown::MarkdownGenerator;
pub use text::{headline, question_nav, render_case, render_summary, status_line};

use thiserror::Error;

/// Errors that can occur while producing a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Failed to serialize to JSON.
    #[error("failed to serialize export: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Failed to write the output file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;
