//! Promotion units and the per-run release context

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::directory::{GroupId, ItemType};

/// One staged-to-production promotion, as configured by the operator.
///
/// Constructed once per batch entry with named, validated fields; never
/// passed around as a free-form map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionUnit {
    /// Title of the staged candidate, e.g. "Vector Tiles STAGED".
    pub staged_title: String,
    /// Stable production title, e.g. "Vector Tiles".
    pub target_title: String,
    /// Service type both items are expected to carry.
    pub service_type: ItemType,
    /// Optional content folder for items this unit creates.
    #[serde(default)]
    pub folder: Option<String>,
}

impl PromotionUnit {
    pub fn new(
        staged_title: impl Into<String>,
        target_title: impl Into<String>,
        service_type: ItemType,
    ) -> Self {
        Self {
            staged_title: staged_title.into(),
            target_title: target_title.into(),
            service_type,
            folder: None,
        }
    }

    /// Basic field validation. Staged and target titles may be equal (a
    /// republish of a broken service is configured exactly that way).
    pub fn validate(&self) -> Result<(), String> {
        if self.staged_title.trim().is_empty() {
            return Err("staged_title must not be empty".to_string());
        }
        if self.target_title.trim().is_empty() {
            return Err("target_title must not be empty".to_string());
        }
        Ok(())
    }
}

/// Per-run facts shared by every unit: who is releasing, when, and to whom
/// the result is shared. The timestamp is fixed at construction so all units
/// in one batch carry the same mark.
#[derive(Debug, Clone)]
pub struct ReleaseContext {
    pub initials: String,
    pub timestamp: DateTime<Local>,
    pub release_groups: Vec<GroupId>,
}

impl ReleaseContext {
    pub fn new(initials: impl Into<String>, release_groups: Vec<GroupId>) -> Self {
        Self::at(initials, Local::now(), release_groups)
    }

    /// Context with an explicit timestamp, for deterministic tests.
    pub fn at(
        initials: impl Into<String>,
        timestamp: DateTime<Local>,
        release_groups: Vec<GroupId>,
    ) -> Self {
        Self {
            initials: initials.into(),
            timestamp,
            release_groups,
        }
    }

    /// Compact date+time, safe for filesystem names and item names.
    pub fn datestamp(&self) -> String {
        self.timestamp.format("%Y%m%d_%H%M").to_string()
    }

    /// Human-readable mark for comments: date, time, operator initials.
    pub fn textmark(&self) -> String {
        format!("{} {}", self.timestamp.format("%m/%d/%y %H:%M"), self.initials)
    }

    /// The comment appended to a freshly promoted service.
    pub fn release_comment(&self) -> String {
        format!("Released into the wild! {}", self.textmark())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn context() -> ReleaseContext {
        let timestamp = Local.with_ymd_and_hms(2026, 8, 25, 9, 5, 0).unwrap();
        ReleaseContext::at("BW", timestamp, Vec::new())
    }

    #[test]
    fn test_datestamp_has_no_spaces() {
        let stamp = context().datestamp();
        assert_eq!(stamp, "20260825_0905");
        assert!(!stamp.contains(' '));
    }

    #[test]
    fn test_textmark_carries_initials() {
        assert_eq!(context().textmark(), "08/25/26 09:05 BW");
    }

    #[test]
    fn test_release_comment_wording() {
        assert_eq!(
            context().release_comment(),
            "Released into the wild! 08/25/26 09:05 BW"
        );
    }

    #[test]
    fn test_unit_validation() {
        let unit = PromotionUnit::new("Roads STAGED", "Roads", ItemType::TileService);
        assert!(unit.validate().is_ok());

        let unit = PromotionUnit::new("", "Roads", ItemType::TileService);
        assert!(unit.validate().is_err());

        // Republishing in place is allowed.
        let unit = PromotionUnit::new("Contour 40", "Contour 40", ItemType::TileService);
        assert!(unit.validate().is_ok());
    }
}
