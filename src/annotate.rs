//! Review annotations
//!
//! Turns a [`PolicyOutcome`] into one warn/fail message per check that
//! did not pass, and hands them to a [`ReviewSink`].

use colored::Colorize;

use crate::coverage::{PolicyOutcome, Verdict};

/// Host capability for posting review feedback
pub trait ReviewSink {
    fn markdown(&mut self, text: &str);
    fn warn(&mut self, message: &str);
    fn fail(&mut self, message: &str);
}

/// A single warn/fail message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub verdict: Verdict,
    pub message: String,
}

/// Messages for every non-passing check: total first, then files in report order
pub fn annotations(outcome: &PolicyOutcome) -> Vec<Annotation> {
    let mut out = Vec::new();

    if outcome.total_verdict != Verdict::Pass {
        out.push(Annotation {
            verdict: outcome.total_verdict,
            message: format!(
                "Oops! The project codebase is under {}% coverage.",
                outcome.total_threshold
            ),
        });
    }

    for result in &outcome.file_results {
        if result.verdict != Verdict::Pass {
            out.push(Annotation {
                verdict: result.verdict,
                message: format!(
                    "Uh oh! {} is under {}% coverage!",
                    result.file.name, outcome.file_threshold
                ),
            });
        }
    }

    out
}

/// Send the outcome's warnings and failures to the sink
pub fn annotate(outcome: &PolicyOutcome, sink: &mut dyn ReviewSink) {
    for annotation in annotations(outcome) {
        match annotation.verdict {
            Verdict::Fail => sink.fail(&annotation.message),
            Verdict::Warn => sink.warn(&annotation.message),
            Verdict::Pass => {}
        }
    }
}

/// Prints markdown to stdout and messages to stderr
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl ReviewSink for ConsoleSink {
    fn markdown(&mut self, text: &str) {
        println!("{}", text);
    }

    fn warn(&mut self, message: &str) {
        eprintln!("{} {}", "warning:".yellow().bold(), message);
    }

    fn fail(&mut self, message: &str) {
        eprintln!("{} {}", "failure:".red().bold(), message);
    }
}

/// Collects everything sent to it, in order
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub markdown: Vec<String>,
    pub warnings: Vec<String>,
    pub failures: Vec<String>,
}

impl ReviewSink for RecordingSink {
    fn markdown(&mut self, text: &str) {
        self.markdown.push(text.to_string());
    }

    fn warn(&mut self, message: &str) {
        self.warnings.push(message.to_string());
    }

    fn fail(&mut self, message: &str) {
        self.failures.push(message.to_string());
    }
}

impl RecordingSink {
    /// Markdown followed by a table of failures and warnings
    pub fn to_comment(&self) -> String {
        let mut body = self.markdown.join("\n\n");

        if !self.failures.is_empty() || !self.warnings.is_empty() {
            body.push_str("\n\n| | Message |\n|---|---|\n");
            for failure in &self.failures {
                body.push_str(&format!("| ❌ | {} |\n", failure));
            }
            for warning in &self.warnings {
                body.push_str(&format!("| ⚠️ | {} |\n", warning));
            }
        }

        body
    }
}
