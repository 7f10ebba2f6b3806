// src/pipeline/anomaly.rs

//! Anomaly detection for broken-page extraction.
//!
//! Detects pages that failed to render expected content (bot wall,
//! template change, misrouted URL) before any field extraction or
//! network spend. Deliberately conservative: a false positive costs one
//! skipped page, never corrupted data.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Page classification from the site's index/detail markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageKind {
    /// Coupon listing page
    Index,
    /// Single-offer / reveal page
    Detail,
    /// Neither marker matched
    Unknown,
}

/// Classification result with raw marker hit counts.
#[derive(Debug, Clone, Copy)]
pub struct PageClass {
    pub kind: PageKind,
    pub index_hits: usize,
    pub detail_hits: usize,
}

impl PageClass {
    /// Both page markers matched at once, implying a misrouted page.
    pub fn is_misroute(&self) -> bool {
        self.index_hits > 0 && self.detail_hits > 0
    }
}

/// Anomaly guard thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyConfig {
    /// Maximum allowed drop percentage against the baseline (0-100)
    #[serde(default = "defaults::max_drop_percent")]
    pub max_drop_percent: u8,

    /// Baselines below this are ignored (new or low-volume sites)
    #[serde(default = "defaults::min_baseline")]
    pub min_baseline: usize,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            max_drop_percent: defaults::max_drop_percent(),
            min_baseline: defaults::min_baseline(),
        }
    }
}

mod defaults {
    pub fn max_drop_percent() -> u8 {
        20
    }
    pub fn min_baseline() -> usize {
        10
    }
}

/// Result of an anomaly check.
#[derive(Debug, Clone)]
pub enum AnomalyCheck {
    /// Safe to proceed with extraction
    Safe { candidate_count: usize },
    /// No baseline recorded yet; count accepted as-is
    ColdStart { candidate_count: usize },
    /// Index page produced zero candidates
    EmptyPage,
    /// Index and detail markers both matched
    Misroute {
        index_hits: usize,
        detail_hits: usize,
    },
    /// Candidate count collapsed against the recorded baseline
    Collapsed {
        candidate_count: usize,
        baseline: usize,
        drop_percent: f64,
    },
}

/// Guard comparing fresh extraction results against expectations.
#[derive(Debug, Clone, Default)]
pub struct AnomalyGuard {
    config: AnomalyConfig,
}

impl AnomalyGuard {
    /// Create a guard with default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a guard with custom thresholds.
    pub fn with_config(config: AnomalyConfig) -> Self {
        Self { config }
    }

    /// Check a page's classification and candidate count.
    ///
    /// `baseline` is the historically expected candidate count for this
    /// page, when one has been recorded.
    pub fn check(
        &self,
        class: &PageClass,
        candidate_count: usize,
        baseline: Option<usize>,
    ) -> AnomalyCheck {
        if class.is_misroute() {
            return AnomalyCheck::Misroute {
                index_hits: class.index_hits,
                detail_hits: class.detail_hits,
            };
        }

        // Zero candidates where a listing was expected means the page
        // did not render its content.
        if candidate_count == 0 && class.kind != PageKind::Detail {
            return AnomalyCheck::EmptyPage;
        }

        let baseline = match baseline {
            Some(b) if b >= self.config.min_baseline => b,
            _ => return AnomalyCheck::ColdStart { candidate_count },
        };

        if candidate_count < baseline {
            let drop = baseline - candidate_count;
            let drop_percent = (drop as f64 / baseline as f64) * 100.0;

            if drop_percent > self.config.max_drop_percent as f64 {
                return AnomalyCheck::Collapsed {
                    candidate_count,
                    baseline,
                    drop_percent,
                };
            }
        }

        AnomalyCheck::Safe { candidate_count }
    }

    /// Validate and return Ok if safe, Err if the page must be aborted.
    pub fn validate(
        &self,
        page_url: &str,
        class: &PageClass,
        candidate_count: usize,
        baseline: Option<usize>,
    ) -> Result<()> {
        match self.check(class, candidate_count, baseline) {
            AnomalyCheck::Safe { candidate_count } => {
                log::debug!("Anomaly check: SAFE ({candidate_count} candidates)");
                Ok(())
            }
            AnomalyCheck::ColdStart { candidate_count } => {
                log::debug!("Anomaly check: COLD START ({candidate_count} candidates, no baseline)");
                Ok(())
            }
            AnomalyCheck::EmptyPage => {
                log::error!("Anomaly check: EMPTY PAGE at {page_url}");
                Err(AppError::anomaly(page_url, "no candidates extracted"))
            }
            AnomalyCheck::Misroute {
                index_hits,
                detail_hits,
            } => {
                log::error!(
                    "Anomaly check: MISROUTE at {page_url} (index marker x{index_hits}, detail marker x{detail_hits})"
                );
                Err(AppError::anomaly(
                    page_url,
                    "index and detail markers both present",
                ))
            }
            AnomalyCheck::Collapsed {
                candidate_count,
                baseline,
                drop_percent,
            } => {
                log::error!(
                    "Anomaly check: COLLAPSED at {page_url} ({baseline} → {candidate_count} candidates, {drop_percent:.1}% drop > {}% threshold)",
                    self.config.max_drop_percent
                );
                Err(AppError::anomaly(
                    page_url,
                    format!("candidate count dropped {drop_percent:.1}% below baseline"),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_page() -> PageClass {
        PageClass {
            kind: PageKind::Index,
            index_hits: 1,
            detail_hits: 0,
        }
    }

    #[test]
    fn test_safe_without_baseline() {
        let guard = AnomalyGuard::new();
        assert!(matches!(
            guard.check(&index_page(), 40, None),
            AnomalyCheck::ColdStart { .. }
        ));
    }

    #[test]
    fn test_empty_index_page_is_anomalous() {
        let guard = AnomalyGuard::new();
        assert!(matches!(
            guard.check(&index_page(), 0, None),
            AnomalyCheck::EmptyPage
        ));
        assert!(guard.validate("https://x.com", &index_page(), 0, None).is_err());
    }

    #[test]
    fn test_empty_detail_page_is_fine() {
        let guard = AnomalyGuard::new();
        let class = PageClass {
            kind: PageKind::Detail,
            index_hits: 0,
            detail_hits: 1,
        };
        assert!(matches!(
            guard.check(&class, 0, None),
            AnomalyCheck::ColdStart { .. }
        ));
    }

    #[test]
    fn test_misroute_detected() {
        let guard = AnomalyGuard::new();
        let class = PageClass {
            kind: PageKind::Index,
            index_hits: 1,
            detail_hits: 2,
        };
        assert!(matches!(
            guard.check(&class, 40, None),
            AnomalyCheck::Misroute { .. }
        ));
    }

    #[test]
    fn test_small_drop_is_safe() {
        let guard = AnomalyGuard::new();
        // 15% drop against a baseline of 100
        assert!(matches!(
            guard.check(&index_page(), 85, Some(100)),
            AnomalyCheck::Safe { .. }
        ));
    }

    #[test]
    fn test_large_drop_collapses() {
        let guard = AnomalyGuard::new();
        // 30% drop against a baseline of 100
        let check = guard.check(&index_page(), 70, Some(100));
        assert!(matches!(check, AnomalyCheck::Collapsed { .. }));
        assert!(
            guard
                .validate("https://x.com", &index_page(), 70, Some(100))
                .is_err()
        );
    }

    #[test]
    fn test_tiny_baseline_ignored() {
        let guard = AnomalyGuard::new();
        // Baseline 4 is below min_baseline, so a big relative drop passes
        assert!(matches!(
            guard.check(&index_page(), 1, Some(4)),
            AnomalyCheck::ColdStart { .. }
        ));
    }

    #[test]
    fn test_growth_is_safe() {
        let guard = AnomalyGuard::new();
        assert!(matches!(
            guard.check(&index_page(), 150, Some(100)),
            AnomalyCheck::Safe { .. }
        ));
    }
}
