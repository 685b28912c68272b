//! Promotion error taxonomy
//!
//! Two tiers. `PromotionError` aborts the current unit (and only that unit;
//! the batch always continues). `PromotionWarning` records a degraded step
//! after the promotion itself already succeeded; warnings are surfaced to
//! the operator, never raised.

use thiserror::Error;

use crate::directory::{DirectoryError, ItemType};

/// Result type for per-unit promotion steps.
pub type PromotionResult<T> = Result<T, PromotionError>;

/// Unit-aborting failures.
#[derive(Debug, Clone, Error)]
pub enum PromotionError {
    /// Expected exactly one match and found zero or several. `item_type` is
    /// the filter the lookup actually used; `None` for title-only lookups.
    #[error(
        "expected exactly one \"{title}\" ({}), found {count}",
        match .item_type { Some(t) => t.as_str(), None => "any type" }
    )]
    LookupAmbiguous {
        title: String,
        item_type: Option<ItemType>,
        count: usize,
    },

    /// Nothing to promote: no staged item and no production item either.
    #[error("no staged item titled \"{title}\"")]
    StagedMissing { title: String },

    /// A directory call failed; the step name locates it for remediation.
    #[error("directory failure during {step}: {source}")]
    Directory {
        step: &'static str,
        #[source]
        source: DirectoryError,
    },

    /// The production slot is occupied by something this tooling does not
    /// know how to safely replace. Manual intervention required.
    #[error("target \"{title}\" has incompatible type {found}; manual intervention required")]
    IncompatibleTargetType { title: String, found: ItemType },

    /// The type-converting publish of a raw package failed.
    #[error("converting package \"{title}\" to a service failed: {source}")]
    ConversionFailed {
        title: String,
        #[source]
        source: DirectoryError,
    },
}

impl PromotionError {
    pub fn directory(step: &'static str, source: DirectoryError) -> Self {
        Self::Directory { step, source }
    }
}

/// Non-aborting degradations, collected per unit.
#[derive(Debug, Clone, Error)]
pub enum PromotionWarning {
    /// Carried metadata could not be re-applied after a successful replace.
    #[error("metadata re-apply failed: {0}")]
    MetadataUpdate(DirectoryError),

    /// The archive created by replace could not be found or adjusted.
    #[error("archive \"{name}\" not finalized: {detail}")]
    ArchiveLookup { name: String, detail: String },

    /// The release comment could not be appended.
    #[error("comment not appended: {0}")]
    Comment(DirectoryError),

    /// One or more sharing sub-operations failed.
    #[error("sharing incomplete: {0}")]
    Sharing(String),
}
