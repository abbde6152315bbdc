//! JSON export of an execution summary.
//!
//! The export names the question it belongs to and carries a timestamp.
//! Submissions export only the aggregate hidden counts.
//!
//! # Example
//!
//! ```rust
//! use freecode_client::QuestionId;
//! use freecode_report::json::JsonGenerator;
//! use freecode_session::{ExecutionSummary, RunSummary};
//!
//! let summary = ExecutionSummary::Run(RunSummary { passed: 2, total: 2, results: vec![] });
//! let generator = JsonGenerator::new(QuestionId(1), "Two Sum", &summary);
//!
//! let compact = generator.generate().unwrap();
//! assert!(compact.contains(r#""mode":"run""#));
//! ```

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use freecode_client::QuestionId;
use freecode_session::ExecutionSummary;
use serde::Serialize;

use crate::{ReportError, Result};

/// The exported document.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryExport<'a> {
    /// When the export was produced.
    pub exported_at: DateTime<Utc>,
    /// Question the summary belongs to.
    pub question_id: QuestionId,
    /// Title of that question.
    pub question_title: &'a str,
    /// The reconciled outcome.
    pub summary: &'a ExecutionSummary,
}

/// Serializes a [`SummaryExport`] to JSON.
pub struct JsonGenerator<'a> {
    export: SummaryExport<'a>,
}

impl<'a> JsonGenerator<'a> {
    /// Creates a generator stamped with the current time.
    #[must_use]
    pub fn new(
        question_id: QuestionId,
        question_title: &'a str,
        summary: &'a ExecutionSummary,
    ) -> Self {
        Self {
            export: SummaryExport {
                exported_at: Utc::now(),
                question_id,
                question_title,
                summary,
            },
        }
    }

    /// Overrides the export timestamp.
    #[must_use]
    pub fn with_exported_at(mut self, exported_at: DateTime<Utc>) -> Self {
        self.export.exported_at = exported_at;
        self
    }

    /// Generates compact JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Serialization`] if JSON serialization fails.
    pub fn generate(&self) -> Result<String> {
        serde_json::to_string(&self.export).map_err(ReportError::from)
    }

    /// Generates pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Serialization`] if JSON serialization fails.
    pub fn generate_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.export).map_err(ReportError::from)
    }

    /// Writes the export to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Serialization`] if JSON serialization fails and
    /// [`ReportError::Io`] if the file cannot be written.
    pub fn write_to_file(&self, path: &Path, pretty: bool) -> Result<()> {
        let json = if pretty {
            self.generate_pretty()?
        } else {
            self.generate()?
        };

        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;

        Ok(())
    }
}
