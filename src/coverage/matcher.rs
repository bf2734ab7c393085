//! Matching changed files against report entries

use std::path::Path;

use super::{CoverageCounter, CoverageReport};

/// A changed file that has an entry in the report
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedFile {
    pub name: String,
    pub counter: CoverageCounter,
}

/// Changed files split by presence in the report
#[derive(Debug, Clone, Default)]
pub struct FileMatch {
    /// Sorted by basename
    pub matched: Vec<MatchedFile>,
    /// In changed-file order
    pub unmatched: Vec<String>,
}

impl FileMatch {
    pub fn len(&self) -> usize {
        self.matched.len() + self.unmatched.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Filename component of a path; the input itself if it has none
pub fn basename(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}

/// Partition changed files into matched and unmatched.
///
/// Matching is by basename only, so `a/Foo.kt` and `b/Foo.kt` both match
/// the report's `Foo.kt` entry.
pub fn match_files<S: AsRef<str>>(report: &CoverageReport, changed_files: &[S]) -> FileMatch {
    let mut result = FileMatch::default();

    for changed in changed_files {
        let name = basename(changed.as_ref());
        match report.file_counter(&name) {
            Some(counter) => result.matched.push(MatchedFile { name, counter }),
            None => result.unmatched.push(name),
        }
    }

    result.matched.sort_by(|a, b| a.name.cmp(&b.name));

    let touched: Vec<_> = result
        .matched
        .iter()
        .map(|f| (f.name.as_str(), f.counter.percentage()))
        .collect();
    tracing::debug!(unreported = ?result.unmatched, "files not in coverage report");
    tracing::debug!(?touched, "touched files coverage");

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> CoverageReport {
        let mut report = CoverageReport::default();
        report
            .file_counters
            .insert("Foo.kt".to_string(), CoverageCounter::new(5, 5));
        report
            .file_counters
            .insert("Bar.kt".to_string(), CoverageCounter::new(0, 4));
        report
            .file_counters
            .insert("Baz.kt".to_string(), CoverageCounter::new(0, 0));
        report
    }

    #[test]
    fn test_basename() {
        assert_eq!(basename("app/src/main/kotlin/Foo.kt"), "Foo.kt");
        assert_eq!(basename("Foo.kt"), "Foo.kt");
        assert_eq!(basename(""), "");
    }

    #[test]
    fn test_match_partitions_and_sorts() {
        let changed = vec![
            "src/Foo.kt",
            "README.md",
            "src/Bar.kt",
            "build.gradle.kts",
            "src/Baz.kt",
        ];
        let result = match_files(&report(), &changed);

        let names: Vec<_> = result.matched.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Bar.kt", "Baz.kt", "Foo.kt"]);
        assert_eq!(result.unmatched, vec!["README.md", "build.gradle.kts"]);
        assert_eq!(result.len(), changed.len());
    }

    #[test]
    fn test_match_by_basename_only() {
        let changed = vec!["feature/a/Foo.kt".to_string(), "feature/b/Foo.kt".to_string()];
        let result = match_files(&report(), &changed);

        assert_eq!(result.matched.len(), 2);
        assert!(result.unmatched.is_empty());
        assert!(result
            .matched
            .iter()
            .all(|f| f.counter == CoverageCounter::new(5, 5)));
    }

    #[test]
    fn test_match_nothing_changed() {
        let changed: Vec<String> = Vec::new();
        let result = match_files(&report(), &changed);
        assert!(result.is_empty());
    }
}
