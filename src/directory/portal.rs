//! The portal backend boundary
//!
//! Ten content operations plus group lookup. This trait is the only surface
//! the release tooling depends on; everything behind it (the live REST
//! backend, the in-memory double) is interchangeable.

use super::error::DirectoryResult;
use super::query::ItemQuery;
use super::record::{
    ArtifactId, ArtifactRecord, GroupId, ItemProperties, ItemUpdate, PublishParams, Sharing,
};

/// A content portal backend.
///
/// All calls are synchronous; the release flow is a sequential batch with no
/// cross-unit dependency.
pub trait Portal {
    /// Exact-match search. Never fuzzy; conjunctive across query fields.
    fn search(&self, query: &ItemQuery) -> DirectoryResult<Vec<ArtifactRecord>>;

    /// Fetch one record by id. `Ok(None)` when the id is unknown.
    fn get(&self, id: &ArtifactId) -> DirectoryResult<Option<ArtifactRecord>>;

    /// Create a new item, optionally with an uploaded data payload.
    fn add(
        &self,
        properties: ItemProperties,
        data: Option<&[u8]>,
        folder: Option<&str>,
    ) -> DirectoryResult<ArtifactRecord>;

    /// Apply a sparse update, optionally replacing the thumbnail.
    fn update(
        &self,
        id: &ArtifactId,
        update: &ItemUpdate,
        thumbnail: Option<&[u8]>,
    ) -> DirectoryResult<()>;

    /// Replace `target` with `source`, archiving the previous target under
    /// `archive_name`. The source item is consumed. The target keeps its id
    /// so existing references stay valid.
    ///
    /// `replace_metadata` requests that metadata be carried over; the live
    /// backend is known to leave stale metadata anyway, so callers re-apply
    /// what they care about afterwards.
    fn replace(
        &self,
        target: &ArtifactId,
        source: &ArtifactId,
        archive_name: &str,
        replace_metadata: bool,
    ) -> DirectoryResult<()>;

    /// Type-converting publish of an uploaded package into a service.
    fn publish(&self, id: &ArtifactId, params: &PublishParams) -> DirectoryResult<ArtifactRecord>;

    /// Delete an item. Must refuse delete-protected items.
    fn delete(&self, id: &ArtifactId) -> DirectoryResult<()>;

    /// Enable or disable delete protection.
    fn protect(&self, id: &ArtifactId, enable: bool) -> DirectoryResult<()>;

    /// Set visibility. Group sharing only takes effect when
    /// `sharing.allow_members_to_edit` is true.
    fn share(&self, id: &ArtifactId, sharing: &Sharing) -> DirectoryResult<()>;

    /// Append a comment.
    fn add_comment(&self, id: &ArtifactId, text: &str) -> DirectoryResult<()>;

    /// Exact-title group lookup, for validating configured group lists.
    fn search_groups(&self, title: &str) -> DirectoryResult<Vec<GroupId>>;
}
