//! Coverage threshold evaluation

use colored::Colorize;
use serde::Serialize;
use std::fmt;

use super::{format_percentage, CoverageReport, FileMatch};

pub const DEFAULT_THRESHOLD: i32 = 90;

/// Thresholds and policy for one module, resolved before evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckConfig {
    /// Required total project coverage, in percent
    pub total_threshold: i32,
    /// Required coverage of each changed file, in percent
    pub file_threshold: i32,
    /// Fail the build when under a threshold, otherwise only warn
    pub fail_under_threshold: bool,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            total_threshold: DEFAULT_THRESHOLD,
            file_threshold: DEFAULT_THRESHOLD,
            fail_under_threshold: true,
        }
    }
}

/// Outcome of one threshold check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Warn,
    Fail,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => write!(f, "pass"),
            Verdict::Warn => write!(f, "warn"),
            Verdict::Fail => write!(f, "fail"),
        }
    }
}

/// Coverage of one changed file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileCoverageResult {
    pub name: String,
    pub percentage: Option<f64>,
    pub in_report: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileVerdict {
    #[serde(flatten)]
    pub file: FileCoverageResult,
    pub verdict: Verdict,
}

/// Full decision for one module. Rendering and build gating both read this.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyOutcome {
    pub total_percentage: Option<f64>,
    pub total_verdict: Verdict,
    pub total_threshold: i32,
    pub file_threshold: i32,
    /// Matched files, sorted by name
    pub file_results: Vec<FileVerdict>,
    pub unreported_files: Vec<String>,
    pub unreported_count: usize,
    pub build_should_fail: bool,
}

impl PolicyOutcome {
    /// Verdicts in reporting order: total first, then each file
    pub fn verdicts(&self) -> impl Iterator<Item = Verdict> + '_ {
        std::iter::once(self.total_verdict).chain(self.file_results.iter().map(|f| f.verdict))
    }

    pub fn has_warnings(&self) -> bool {
        self.verdicts().any(|v| v == Verdict::Warn)
    }

    pub fn print_summary(&self, module_name: &str) {
        println!(
            "  {} {} total coverage: {}% (threshold: {}%)",
            verdict_marker(self.total_verdict),
            module_name.bold(),
            format_percentage(self.total_percentage),
            self.total_threshold
        );

        for result in &self.file_results {
            println!(
                "    {} {}: {}% (threshold: {}%)",
                verdict_marker(result.verdict),
                result.file.name,
                format_percentage(result.file.percentage),
                self.file_threshold
            );
        }

        if self.unreported_count > 0 {
            println!(
                "    {} {} file(s) not in coverage report",
                "•".dimmed(),
                self.unreported_count
            );
        }
    }
}

fn verdict_marker(verdict: Verdict) -> colored::ColoredString {
    match verdict {
        Verdict::Pass => "✓".green(),
        Verdict::Warn => "!".yellow(),
        Verdict::Fail => "✗".red(),
    }
}

/// Compare an unrounded percentage against a threshold.
///
/// Undefined coverage (no instructions) always passes.
pub fn check_threshold(
    percentage: Option<f64>,
    threshold: i32,
    fail_under_threshold: bool,
) -> Verdict {
    match percentage {
        Some(p) if p < f64::from(threshold) => {
            if fail_under_threshold {
                Verdict::Fail
            } else {
                Verdict::Warn
            }
        }
        _ => Verdict::Pass,
    }
}

/// Apply the total and per-file thresholds
pub fn evaluate(report: &CoverageReport, files: &FileMatch, config: &CheckConfig) -> PolicyOutcome {
    let total_percentage = report.total_percentage();
    let total_verdict = check_threshold(
        total_percentage,
        config.total_threshold,
        config.fail_under_threshold,
    );

    let file_results: Vec<FileVerdict> = files
        .matched
        .iter()
        .map(|matched| {
            let percentage = matched.counter.percentage();
            FileVerdict {
                file: FileCoverageResult {
                    name: matched.name.clone(),
                    percentage,
                    in_report: true,
                },
                verdict: check_threshold(
                    percentage,
                    config.file_threshold,
                    config.fail_under_threshold,
                ),
            }
        })
        .collect();

    let build_should_fail = total_verdict == Verdict::Fail
        || file_results.iter().any(|f| f.verdict == Verdict::Fail);

    PolicyOutcome {
        total_percentage,
        total_verdict,
        total_threshold: config.total_threshold,
        file_threshold: config.file_threshold,
        file_results,
        unreported_files: files.unmatched.clone(),
        unreported_count: files.unmatched.len(),
        build_should_fail,
    }
}
