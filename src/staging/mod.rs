//! Staging uploads
//!
//! Uploads a freshly built package into the portal under its staged title,
//! replacing any previous staged copy. Staged items are working copies: they
//! are shared to the organization and the working groups, never to everyone,
//! and they are not protected so the next staging run can replace them.

use thiserror::Error;

use crate::directory::{
    ArtifactRecord, ContentDirectory, DirectoryError, GroupId, ItemProperties, ItemQuery,
    ItemType, Portal, Sharing,
};
use crate::observability::Logger;

/// One upload into the staging area.
#[derive(Debug, Clone)]
pub struct StagingRequest {
    pub properties: ItemProperties,
    pub package_type: ItemType,
    pub data: Vec<u8>,
    pub folder: Option<String>,
    /// When false, an existing staged copy is kept and the upload skipped.
    pub overwrite: bool,
    pub share_groups: Vec<GroupId>,
}

/// What one staging request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    Created,
    Replaced,
    Skipped,
}

#[derive(Debug, Error)]
pub enum StagingError {
    #[error("directory failure during {step}: {source}")]
    Directory {
        step: &'static str,
        #[source]
        source: DirectoryError,
    },

    /// More than one item already carries the staged name; cleaning that up
    /// is a manual job.
    #[error("staged name \"{name}\" is ambiguous: {count} matches")]
    AmbiguousExisting { name: String, count: usize },
}

impl StagingError {
    fn directory(step: &'static str, source: DirectoryError) -> Self {
        Self::Directory { step, source }
    }
}

/// Uploads packages into the staging area.
pub struct Stager<'a> {
    portal: &'a dyn Portal,
}

impl<'a> Stager<'a> {
    pub fn new(portal: &'a dyn Portal) -> Self {
        Self { portal }
    }

    /// Upload one package, replacing any previous staged copy.
    pub fn stage(
        &self,
        request: &StagingRequest,
    ) -> Result<(StageOutcome, Option<ArtifactRecord>), StagingError> {
        let directory = ContentDirectory::new(self.portal);
        let query = ItemQuery::new()
            .name(request.properties.name.clone())
            .item_type(request.package_type);
        let existing = directory
            .find(&query)
            .map_err(|e| StagingError::directory("existing lookup", e))?;

        let mut replaced = false;
        match existing.len() {
            0 => {}
            1 => {
                if !request.overwrite {
                    Logger::info(
                        "staging.skipped",
                        &[("name", &request.properties.name)],
                    );
                    return Ok((StageOutcome::Skipped, None));
                }
                let previous = &existing[0];
                // Staged items are normally unprotected, but clear the flag
                // anyway in case someone protected one by hand.
                self.portal
                    .protect(&previous.id, false)
                    .map_err(|e| StagingError::directory("unprotect", e))?;
                self.portal
                    .delete(&previous.id)
                    .map_err(|e| StagingError::directory("delete", e))?;
                replaced = true;
            }
            count => {
                return Err(StagingError::AmbiguousExisting {
                    name: request.properties.name.clone(),
                    count,
                })
            }
        }

        let record = self
            .portal
            .add(
                request.properties.clone(),
                Some(&request.data),
                request.folder.as_deref(),
            )
            .map_err(|e| StagingError::directory("upload", e))?;

        let sharing = Sharing {
            everyone: false,
            org: true,
            groups: request.share_groups.clone(),
            allow_members_to_edit: true,
        };
        self.portal
            .share(&record.id, &sharing)
            .map_err(|e| StagingError::directory("share", e))?;

        let outcome = if replaced {
            StageOutcome::Replaced
        } else {
            StageOutcome::Created
        };
        Logger::info(
            "staging.uploaded",
            &[
                ("name", &request.properties.name),
                ("id", record.id.as_str()),
                (
                    "outcome",
                    if replaced { "replaced" } else { "created" },
                ),
            ],
        );
        Ok((outcome, Some(record)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::MemoryPortal;

    fn request(overwrite: bool) -> StagingRequest {
        StagingRequest {
            properties: ItemProperties {
                title: "Roads STAGED".to_string(),
                name: "Roads_STAGED".to_string(),
                item_type: Some(ItemType::TilePackage),
                description: "Road centerlines".to_string(),
                snippet: "Roads".to_string(),
                access_information: "City GIS".to_string(),
                license_info: "Internal use".to_string(),
                tags: vec!["roads".to_string(), "staged".to_string()],
            },
            package_type: ItemType::TilePackage,
            data: vec![0x50, 0x4b],
            folder: Some("staging".to_string()),
            overwrite,
            share_groups: Vec::new(),
        }
    }

    #[test]
    fn test_first_upload_creates_and_shares_to_org() {
        let portal = MemoryPortal::new();
        let (outcome, record) = Stager::new(&portal).stage(&request(true)).unwrap();

        assert_eq!(outcome, StageOutcome::Created);
        let record = portal.record(&record.unwrap().id).unwrap();
        assert!(record.sharing.org);
        assert!(!record.sharing.everyone, "staged copies stay internal");
    }

    #[test]
    fn test_overwrite_replaces_previous_staged_copy() {
        let portal = MemoryPortal::new();
        let old = portal.seed_item("Roads STAGED", "Roads_STAGED", ItemType::TilePackage);

        let (outcome, record) = Stager::new(&portal).stage(&request(true)).unwrap();

        assert_eq!(outcome, StageOutcome::Replaced);
        assert!(portal.record(&old).is_none(), "previous copy deleted");
        assert!(portal.record(&record.unwrap().id).is_some());
    }

    #[test]
    fn test_no_overwrite_skips_existing() {
        let portal = MemoryPortal::new();
        let old = portal.seed_item("Roads STAGED", "Roads_STAGED", ItemType::TilePackage);

        let (outcome, record) = Stager::new(&portal).stage(&request(false)).unwrap();

        assert_eq!(outcome, StageOutcome::Skipped);
        assert!(record.is_none());
        assert!(portal.record(&old).is_some(), "existing copy kept");
    }

    #[test]
    fn test_ambiguous_existing_name_is_refused() {
        let portal = MemoryPortal::new();
        portal.seed_item("Roads STAGED", "Roads_STAGED", ItemType::TilePackage);
        portal.seed_item("Roads STAGED copy", "Roads_STAGED", ItemType::TilePackage);

        let error = Stager::new(&portal).stage(&request(true)).unwrap_err();
        assert!(matches!(
            error,
            StagingError::AmbiguousExisting { count: 2, .. }
        ));
    }
}
