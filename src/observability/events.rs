//! Release lifecycle events
//!
//! Every promotion unit must emit a start event and a final outcome event;
//! a unit that changes portal state silently is a defect. Events describe
//! what happened, they never decide what happens.

/// Observable events in a release run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseEvent {
    // Batch lifecycle
    /// A batch run begins
    BatchStarted,
    /// A batch run finished; failures are per-unit
    BatchCompleted,

    // Unit lifecycle
    /// Work on one promotion unit begins
    UnitStarted,
    /// No staged item was found and there is nothing to promote
    StagedMissing,
    /// The target is already in place and the staged item is gone
    AlreadyPromoted,
    /// The unit aborted; the batch continues
    UnitAborted,

    // First publish
    /// The staged item was renamed into the production title
    FirstPublish,

    // Replacement
    /// Replace of the production service begins
    ReplaceStarted,
    /// Replace completed and the archive was requested
    ReplaceCompleted,
    /// Carried metadata could not be re-applied (promotion stands)
    MetadataReapplyFailed,
    /// The archived predecessor was marked deprecated and unprotected
    ArchiveDeprecated,
    /// The just-created archive could not be found
    ArchiveMissing,

    // Package conversion
    /// Type-converting publish of a raw package begins
    ConversionStarted,
    /// The package is now a service
    ConversionCompleted,

    // Sharing
    /// Visibility, protection, and status were all applied
    SharingApplied,
    /// One or more sharing sub-operations failed
    SharingIncomplete,
}

impl ReleaseEvent {
    /// Stable event name for log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Self::BatchStarted => "release.batch_started",
            Self::BatchCompleted => "release.batch_completed",
            Self::UnitStarted => "promotion.unit_started",
            Self::StagedMissing => "promotion.staged_missing",
            Self::AlreadyPromoted => "promotion.already_promoted",
            Self::UnitAborted => "promotion.unit_aborted",
            Self::FirstPublish => "promotion.first_publish",
            Self::ReplaceStarted => "promotion.replace_started",
            Self::ReplaceCompleted => "promotion.replace_completed",
            Self::MetadataReapplyFailed => "promotion.metadata_reapply_failed",
            Self::ArchiveDeprecated => "promotion.archive_deprecated",
            Self::ArchiveMissing => "promotion.archive_missing",
            Self::ConversionStarted => "promotion.conversion_started",
            Self::ConversionCompleted => "promotion.conversion_completed",
            Self::SharingApplied => "sharing.applied",
            Self::SharingIncomplete => "sharing.incomplete",
        }
    }
}
