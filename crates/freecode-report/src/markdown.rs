//! Markdown rendering of a question statement.
//!
//! The statement covers everything the user may see: title, difficulty,
//! description, worked examples and constraints. Test cases are not part of
//! the statement, so hidden cases can never leak through it.
//!
//! # Example
//!
//! ```rust
//! use freecode_client::Question;
//! use freecode_report::MarkdownGenerator;
//!
//! let question: Question = serde_json::from_value(serde_json::json!({
//!     "id": 1,
//!     "title": "Reverse Linked List",
//!     "difficulty": "Easy",
//!     "description": "Reverse a singly linked list.",
//!     "examples": [],
//!     "constraints": [],
//!     "starter_code": "def reverse_list(head):\n    pass",
//!     "function_name": "reverse_list",
//!     "sample_test_cases": [],
//!     "hidden_test_cases": []
//! })).unwrap();
//!
//! let markdown = MarkdownGenerator::new(&question).generate();
//! assert!(markdown.starts_with("## 1. Reverse Linked List"));
//! ```

use std::fmt::Write;

use freecode_client::{Example, Question};

/// Renders a [`Question`] as a Markdown statement.
pub struct MarkdownGenerator<'a> {
    question: &'a Question,
}

impl<'a> MarkdownGenerator<'a> {
    /// Creates a generator for `question`.
    #[must_use]
    pub const fn new(question: &'a Question) -> Self {
        Self { question }
    }

    /// Generates the full statement.
    #[must_use]
    pub fn generate(&self) -> String {
        let mut output = String::new();

        self.write_title(&mut output);
        self.write_description(&mut output);
        self.write_signature(&mut output);
        self.write_examples(&mut output);
        self.write_constraints(&mut output);

        output
    }

    fn write_title(&self, output: &mut String) {
        let _ = writeln!(
            output,
            "## {}. {}\n",
            self.question.id,
            escape_markdown(&self.question.title)
        );
        let _ = writeln!(output, "**Difficulty**: {}\n", self.question.difficulty);
    }

    fn write_description(&self, output: &mut String) {
        let description = self.question.description.trim();
        if !description.is_empty() {
            let _ = writeln!(output, "{description}\n");
        }
    }

    /// Function name with typed parameters, when the backend supplied them.
    fn write_signature(&self, output: &mut String) {
        if self.question.parameters.is_empty() && self.question.return_type.is_empty() {
            return;
        }
        let params = self
            .question
            .parameters
            .iter()
            .map(|p| format!("{}: {}", p.name, p.type_hint))
            .collect::<Vec<_>>()
            .join(", ");
        let mut signature = format!("{}({params})", self.question.function_name);
        if !self.question.return_type.is_empty() {
            let _ = write!(signature, " -> {}", self.question.return_type);
        }
        let _ = writeln!(output, "**Signature**: `{}`\n", signature.replace('`', "'"));
    }

    fn write_examples(&self, output: &mut String) {
        for (i, example) in self.question.examples.iter().enumerate() {
            write_example(output, i + 1, example);
        }
    }

    fn write_constraints(&self, output: &mut String) {
        if self.question.constraints.is_empty() {
            return;
        }
        let _ = writeln!(output, "### Constraints\n");
        for constraint in &self.question.constraints {
            let _ = writeln!(output, "- `{}`", constraint.replace('`', "'"));
        }
        output.push('\n');
    }
}

fn write_example(output: &mut String, number: usize, example: &Example) {
    let _ = writeln!(output, "### Example {number}\n");
    let _ = writeln!(output, "```");
    let _ = writeln!(output, "Input: {}", example.input);
    let _ = writeln!(output, "Output: {}", example.output);
    if let Some(explanation) = &example.explanation {
        let _ = writeln!(output, "Explanation: {explanation}");
    }
    let _ = writeln!(output, "```\n");
}

/// Escapes characters with special meaning in Markdown headings.
fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '*' | '_' | '`' | '#' | '[' | ']' | '\\' | '<' | '>' => {
                result.push('\\');
                result.push(ch);
            }
            '\n' => result.push(' '),
            _ => result.push(ch),
        }
    }
    result
}

// ============================================================================
// Tests
// ============================================================================
