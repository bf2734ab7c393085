//! Markdown coverage report

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::coverage::{format_percentage, PolicyOutcome};

const FOOTER: &str = "Code coverage generated by kover-gate, \
    based on [danger-kover](https://github.com/JCarlosR/danger-kover)";

/// Render the markdown block for one module.
///
/// Verdicts are not part of the text; see [`crate::annotate`].
pub fn render(module_name: &str, outcome: &PolicyOutcome) -> String {
    let mut out = format!(
        "## 🎯 {} Code Coverage: **`{}`**\n",
        module_name,
        percent_cell(outcome.total_percentage)
    );

    if outcome.file_results.is_empty() {
        out.push_str("The new and modified files are not part of the coverage report.");
    } else {
        out.push_str("### Coverage of Modified Files:\n");
        out.push_str("File | Coverage\n");
        out.push_str(":-----|:-----:\n");
        for result in &outcome.file_results {
            out.push_str(&format!(
                "`{}` | **`{}`**\n",
                result.file.name,
                percent_cell(result.file.percentage)
            ));
        }
    }

    out.push('\n');
    out.push_str(&format!(
        "Number of files not found in coverage report: {}\n",
        outcome.unreported_count
    ));
    out.push_str(FOOTER);
    out
}

/// Render several modules, one block each
pub fn render_all<'a, I>(modules: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a PolicyOutcome)>,
{
    modules
        .into_iter()
        .map(|(name, outcome)| render(name, outcome))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Write rendered markdown to a file
pub fn write_report(markdown: &str, output_path: &Path) -> Result<()> {
    fs::write(output_path, markdown)
        .with_context(|| format!("Failed to write report: {}", output_path.display()))
}

fn percent_cell(percentage: Option<f64>) -> String {
    match percentage {
        Some(_) => format!("{}%", format_percentage(percentage)),
        None => format_percentage(None),
    }
}
