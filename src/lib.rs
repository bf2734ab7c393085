//! kover-gate - coverage gate for code review
//!
//! Reads a Kover (JaCoCo XML) coverage report and:
//! - Computes total and per-file INSTRUCTION coverage
//! - Matches the report against the files changed in a review
//! - Applies pass/warn/fail thresholds
//! - Renders a markdown summary for the review

pub mod annotate;
pub mod check;
pub mod config;
pub mod coverage;
pub mod error;
pub mod git;
pub mod notifications;
pub mod report;

pub use annotate::{annotate, annotations, Annotation, ConsoleSink, RecordingSink, ReviewSink};
pub use check::{check_report, check_report_file, ModuleCheck};
pub use coverage::{
    evaluate, format_percentage, match_files, parse_kover, parse_kover_bytes, CheckConfig,
    CoverageCounter, CoverageReport, FileMatch, PolicyOutcome, Verdict,
};
pub use error::KoverError;
pub use report::render;
