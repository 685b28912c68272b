//! Promotion outcomes and batch reporting

use std::fmt;

use super::errors::{PromotionError, PromotionWarning};
use super::unit::PromotionUnit;

/// What happened to one unit that did not abort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromotionOutcome {
    /// The staged item was renamed into the production title.
    Published,
    /// The production service was replaced; its predecessor survives under
    /// the archive name.
    Replaced { archive_name: String },
    /// A raw package in the production slot was published into a service.
    Converted,
    /// Nothing to do: the target is already in place.
    AlreadyPromoted,
}

impl PromotionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Published => "published",
            Self::Replaced { .. } => "replaced",
            Self::Converted => "converted",
            Self::AlreadyPromoted => "already-promoted",
        }
    }
}

impl fmt::Display for PromotionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Full record of one unit's run: outcome or error, plus any warnings.
#[derive(Debug, Clone)]
pub struct UnitReport {
    pub unit: PromotionUnit,
    pub outcome: Option<PromotionOutcome>,
    pub error: Option<PromotionError>,
    pub warnings: Vec<PromotionWarning>,
}

impl UnitReport {
    pub fn succeeded(unit: PromotionUnit, outcome: PromotionOutcome, warnings: Vec<PromotionWarning>) -> Self {
        Self {
            unit,
            outcome: Some(outcome),
            error: None,
            warnings,
        }
    }

    pub fn aborted(unit: PromotionUnit, error: PromotionError, warnings: Vec<PromotionWarning>) -> Self {
        Self {
            unit,
            outcome: None,
            error: Some(error),
            warnings,
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.error.is_some()
    }
}

/// Every unit's report, in batch order. The batch never stops early, so the
/// report count always equals the unit count.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub reports: Vec<UnitReport>,
}

impl BatchReport {
    pub fn push(&mut self, report: UnitReport) {
        self.reports.push(report);
    }

    pub fn aborted_count(&self) -> usize {
        self.reports.iter().filter(|r| r.is_aborted()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.reports.iter().map(|r| r.warnings.len()).sum()
    }

    /// True when every unit completed (possibly with warnings).
    pub fn is_clean(&self) -> bool {
        self.aborted_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{DirectoryError, ItemType};

    fn unit() -> PromotionUnit {
        PromotionUnit::new("Roads STAGED", "Roads", ItemType::TileService)
    }

    #[test]
    fn test_batch_counts() {
        let mut batch = BatchReport::default();
        batch.push(UnitReport::succeeded(
            unit(),
            PromotionOutcome::Published,
            Vec::new(),
        ));
        batch.push(UnitReport::aborted(
            unit(),
            PromotionError::directory("lookup", DirectoryError::Network("down".to_string())),
            Vec::new(),
        ));
        batch.push(UnitReport::succeeded(
            unit(),
            PromotionOutcome::Replaced {
                archive_name: "ARCHIVED_Roads_20260825_0905".to_string(),
            },
            vec![PromotionWarning::Sharing("protect failed".to_string())],
        ));

        assert_eq!(batch.reports.len(), 3);
        assert_eq!(batch.aborted_count(), 1);
        assert_eq!(batch.warning_count(), 1);
        assert!(!batch.is_clean());
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(PromotionOutcome::Published.as_str(), "published");
        assert_eq!(
            PromotionOutcome::Replaced {
                archive_name: "x".to_string()
            }
            .as_str(),
            "replaced"
        );
        assert_eq!(PromotionOutcome::AlreadyPromoted.as_str(), "already-promoted");
    }
}
