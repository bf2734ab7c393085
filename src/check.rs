//! One module's coverage check, from report to rendered markdown

use std::path::Path;

use crate::coverage::{
    evaluate, match_files, parse_kover, parse_kover_bytes, CheckConfig, CoverageReport,
    PolicyOutcome,
};
use crate::error::Result;
use crate::report::render;

#[derive(Debug, Clone)]
pub struct ModuleCheck {
    pub name: String,
    pub outcome: PolicyOutcome,
    pub markdown: String,
}

/// Evaluate raw report bytes against the changed files
pub fn check_report<S: AsRef<str>>(
    module_name: &str,
    raw_report: &[u8],
    changed_files: &[S],
    config: &CheckConfig,
) -> Result<ModuleCheck> {
    let report = parse_kover_bytes(raw_report)?;
    Ok(finish(module_name, &report, changed_files, config))
}

/// Load the report at `report_path` and evaluate it
pub fn check_report_file<S: AsRef<str>>(
    module_name: &str,
    report_path: &Path,
    changed_files: &[S],
    config: &CheckConfig,
) -> Result<ModuleCheck> {
    let report = parse_kover(report_path)?;
    Ok(finish(module_name, &report, changed_files, config))
}

fn finish<S: AsRef<str>>(
    module_name: &str,
    report: &CoverageReport,
    changed_files: &[S],
    config: &CheckConfig,
) -> ModuleCheck {
    let files = match_files(report, changed_files);
    let outcome = evaluate(report, &files, config);

    tracing::debug!(
        module = module_name,
        total = ?outcome.total_percentage,
        fail = outcome.build_should_fail,
        "evaluated coverage"
    );

    ModuleCheck {
        name: module_name.to_string(),
        markdown: render(module_name, &outcome),
        outcome,
    }
}
