//! Per-unit promotion state machine
//!
//! States are explicit and enumerable; the classification from lookup
//! results to action is deterministic and is the only place the
//! publish-new / replace / convert / skip decision is made.

use crate::directory::{ArtifactId, ArtifactRecord};

use super::unit::PromotionUnit;

/// State of one promotion unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitState {
    /// No lookups performed yet.
    Pending,

    /// No staged item and no production item: nothing to promote.
    StagedMissing,

    /// No staged item, but the production item is in place. A re-run after
    /// a successful promotion lands here; it must be a no-op.
    AlreadyPromoted { target: ArtifactId },

    /// Staged item found, production slot empty: rename in place.
    FirstPublish { staged: ArtifactId },

    /// The production slot holds a raw package; a type-converting publish
    /// can turn it into a service.
    ConvertPackage { package: ArtifactId },

    /// Staged and production items found with compatible types: replace,
    /// archiving the predecessor.
    Replace {
        staged: ArtifactId,
        target: ArtifactId,
    },

    /// The production slot holds something this tooling cannot safely
    /// replace.
    Incompatible { target: ArtifactId },
}

impl UnitState {
    /// Decide the action from the two lookups.
    ///
    /// `staged` and `target` are the exactly-one lookup results for the
    /// unit's staged and production titles; ambiguous counts abort before
    /// classification and never reach here.
    pub fn classify(
        unit: &PromotionUnit,
        staged: Option<&ArtifactRecord>,
        target: Option<&ArtifactRecord>,
    ) -> Self {
        match (staged, target) {
            (None, None) => Self::StagedMissing,
            // The no-op is only safe when the occupant is the expected
            // service; anything else in the slot needs a human.
            (None, Some(target)) => {
                if target.item_type == unit.service_type {
                    Self::AlreadyPromoted {
                        target: target.id.clone(),
                    }
                } else {
                    Self::Incompatible {
                        target: target.id.clone(),
                    }
                }
            }
            (Some(staged), None) => Self::FirstPublish {
                staged: staged.id.clone(),
            },
            (Some(staged), Some(target)) => {
                if target.item_type == unit.service_type {
                    Self::Replace {
                        staged: staged.id.clone(),
                        target: target.id.clone(),
                    }
                } else if target.item_type.is_package() {
                    Self::ConvertPackage {
                        package: target.id.clone(),
                    }
                } else {
                    Self::Incompatible {
                        target: target.id.clone(),
                    }
                }
            }
        }
    }

    /// Stable state name for logs.
    pub fn state_name(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::StagedMissing => "StagedMissing",
            Self::AlreadyPromoted { .. } => "AlreadyPromoted",
            Self::FirstPublish { .. } => "FirstPublish",
            Self::ConvertPackage { .. } => "ConvertPackage",
            Self::Replace { .. } => "Replace",
            Self::Incompatible { .. } => "Incompatible",
        }
    }

    /// True when the state requires no portal mutation.
    pub fn is_noop(&self) -> bool {
        matches!(
            self,
            Self::Pending | Self::StagedMissing | Self::AlreadyPromoted { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{
        ArtifactId, ContentStatus, ItemType, Sharing,
    };

    fn unit() -> PromotionUnit {
        PromotionUnit::new("Roads STAGED", "Roads", ItemType::TileService)
    }

    fn record(id: &str, title: &str, item_type: ItemType) -> ArtifactRecord {
        ArtifactRecord {
            id: ArtifactId::new(id),
            title: title.to_string(),
            name: title.replace(' ', "_"),
            item_type,
            description: String::new(),
            snippet: String::new(),
            access_information: String::new(),
            license_info: String::new(),
            content_status: ContentStatus::None,
            protected: false,
            sharing: Sharing::default(),
            comments: Vec::new(),
            thumbnail: None,
        }
    }

    #[test]
    fn test_classify_staged_missing() {
        let state = UnitState::classify(&unit(), None, None);
        assert_eq!(state, UnitState::StagedMissing);
        assert!(state.is_noop());
    }

    #[test]
    fn test_classify_already_promoted() {
        let target = record("B", "Roads", ItemType::TileService);
        let state = UnitState::classify(&unit(), None, Some(&target));
        assert_eq!(
            state,
            UnitState::AlreadyPromoted {
                target: ArtifactId::new("B")
            }
        );
        assert!(state.is_noop());
    }

    #[test]
    fn test_classify_first_publish() {
        let staged = record("A", "Roads STAGED", ItemType::TileService);
        let state = UnitState::classify(&unit(), Some(&staged), None);
        assert_eq!(
            state,
            UnitState::FirstPublish {
                staged: ArtifactId::new("A")
            }
        );
        assert!(!state.is_noop());
    }

    #[test]
    fn test_classify_replace_on_compatible_target() {
        let staged = record("A", "Roads STAGED", ItemType::TileService);
        let target = record("B", "Roads", ItemType::TileService);
        let state = UnitState::classify(&unit(), Some(&staged), Some(&target));
        assert_eq!(
            state,
            UnitState::Replace {
                staged: ArtifactId::new("A"),
                target: ArtifactId::new("B"),
            }
        );
    }

    #[test]
    fn test_classify_package_target_converts() {
        let staged = record("A", "Contour 40", ItemType::TilePackage);
        let target = record("B", "Contour 40", ItemType::TilePackage);
        let unit = PromotionUnit::new("Contour 40", "Contour 40", ItemType::TileService);
        let state = UnitState::classify(&unit, Some(&staged), Some(&target));
        assert_eq!(
            state,
            UnitState::ConvertPackage {
                package: ArtifactId::new("B")
            }
        );
    }

    #[test]
    fn test_classify_stranded_package_without_staged_is_not_a_noop() {
        let target = record("B", "Roads", ItemType::TilePackage);
        let state = UnitState::classify(&unit(), None, Some(&target));
        assert_eq!(
            state,
            UnitState::Incompatible {
                target: ArtifactId::new("B")
            }
        );
        assert!(!state.is_noop());
    }

    #[test]
    fn test_classify_incompatible_target() {
        let staged = record("A", "Roads STAGED", ItemType::TileService);
        let target = record("B", "Roads", ItemType::MapImageLayer);
        let state = UnitState::classify(&unit(), Some(&staged), Some(&target));
        assert_eq!(
            state,
            UnitState::Incompatible {
                target: ArtifactId::new("B")
            }
        );
    }

    #[test]
    fn test_state_names() {
        assert_eq!(UnitState::Pending.state_name(), "Pending");
        assert_eq!(UnitState::StagedMissing.state_name(), "StagedMissing");
        assert_eq!(
            UnitState::FirstPublish {
                staged: ArtifactId::new("A")
            }
            .state_name(),
            "FirstPublish"
        );
        assert_eq!(
            UnitState::Replace {
                staged: ArtifactId::new("A"),
                target: ArtifactId::new("B"),
            }
            .state_name(),
            "Replace"
        );
    }
}
