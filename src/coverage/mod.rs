//! Coverage module
//!
//! Provides:
//! - Kover (JaCoCo-style) XML parsing
//! - Changed file matching
//! - Threshold evaluation

mod kover;
mod matcher;
mod threshold;

pub use kover::*;
pub use matcher::*;
pub use threshold::*;

use serde::Serialize;
use std::collections::HashMap;

/// Missed/covered pair of an INSTRUCTION counter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CoverageCounter {
    pub missed: u64,
    pub covered: u64,
}

impl CoverageCounter {
    pub fn new(missed: u64, covered: u64) -> Self {
        Self { missed, covered }
    }

    /// Instruction count; widened so two `u64` counts never overflow
    pub fn total(&self) -> u128 {
        u128::from(self.missed) + u128::from(self.covered)
    }

    /// Covered share in percent, `None` when nothing was instrumented.
    ///
    /// The value is not rounded; see [`format_percentage`] for display.
    pub fn percentage(&self) -> Option<f64> {
        if self.total() == 0 {
            return None;
        }
        let total = self.missed as f64 + self.covered as f64;
        Some(self.covered as f64 / total * 100.0)
    }

    /// Field-wise sum, `None` if either count overflows
    pub fn checked_add(self, other: CoverageCounter) -> Option<CoverageCounter> {
        Some(CoverageCounter {
            missed: self.missed.checked_add(other.missed)?,
            covered: self.covered.checked_add(other.covered)?,
        })
    }
}

/// Project total plus per source file counters from one report
#[derive(Debug, Clone, Default)]
pub struct CoverageReport {
    pub total_counter: CoverageCounter,
    /// Keyed by source file basename, summed over every class in that file
    pub file_counters: HashMap<String, CoverageCounter>,
}

impl CoverageReport {
    pub fn file_counter(&self, basename: &str) -> Option<CoverageCounter> {
        self.file_counters.get(basename).copied()
    }

    pub fn total_percentage(&self) -> Option<f64> {
        self.total_counter.percentage()
    }
}

/// Two-decimal display form used everywhere a percentage is shown.
///
/// `None` renders as `N/A`.
pub fn format_percentage(percentage: Option<f64>) -> String {
    match percentage {
        Some(p) => format!("{:.2}", p),
        None => "N/A".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_zero_total() {
        assert_eq!(CoverageCounter::new(0, 0).percentage(), None);
    }

    #[test]
    fn test_percentage_bounds() {
        assert_eq!(CoverageCounter::new(0, 42).percentage(), Some(100.0));
        assert_eq!(CoverageCounter::new(42, 0).percentage(), Some(0.0));
    }

    #[test]
    fn test_percentage_is_unrounded() {
        let p = CoverageCounter::new(2, 1).percentage().unwrap();
        assert!((p - 33.333_333_333).abs() < 1e-6);
        assert_eq!(format_percentage(Some(p)), "33.33");
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(Some(90.0)), "90.00");
        assert_eq!(format_percentage(Some(100.0)), "100.00");
        assert_eq!(format_percentage(Some(66.666_666)), "66.67");
        assert_eq!(format_percentage(None), "N/A");
    }

    #[test]
    fn test_checked_add() {
        let counter = CoverageCounter::new(1, 2)
            .checked_add(CoverageCounter::new(3, 4))
            .unwrap();
        assert_eq!(counter, CoverageCounter::new(4, 6));
        assert_eq!(counter.total(), 10);

        assert_eq!(
            CoverageCounter::new(u64::MAX, 0).checked_add(CoverageCounter::new(1, 0)),
            None
        );
    }

    #[test]
    fn test_percentage_near_u64_max() {
        let counter = CoverageCounter::new(u64::MAX, 1);
        assert_eq!(counter.total(), u128::from(u64::MAX) + 1);

        let p = counter.percentage().unwrap();
        assert!(p >= 0.0 && p < 1e-9);
        assert_eq!(CoverageCounter::new(0, u64::MAX).percentage(), Some(100.0));
    }
}
