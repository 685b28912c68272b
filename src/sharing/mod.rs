//! Release sharing and lifecycle policy
//!
//! Every promoted item gets the same treatment: marked authoritative,
//! protected against deletion, and shared to everyone, the organization, and
//! the configured release groups. The three sub-operations are independent;
//! one failing never prevents the others from being attempted, and the
//! report carries every failure so the operator can finish the job by hand.

use crate::directory::{ArtifactId, ContentStatus, DirectoryError, GroupId, ItemUpdate, Portal, Sharing};

/// The sharing and lifecycle settings applied to a released item.
#[derive(Debug, Clone)]
pub struct SharingPolicy {
    groups: Vec<GroupId>,
}

impl SharingPolicy {
    /// Policy for public release: world-visible, org-visible, and shared to
    /// the given groups with member editing allowed.
    pub fn release(groups: Vec<GroupId>) -> Self {
        Self { groups }
    }

    /// Apply the full policy to one item. Always attempts all three
    /// sub-operations.
    pub fn finalize(&self, portal: &dyn Portal, id: &ArtifactId) -> SharingReport {
        let mut report = SharingReport::default();

        if let Err(error) = portal.update(
            id,
            &ItemUpdate::new().content_status(ContentStatus::Authoritative),
            None,
        ) {
            report.record("authoritative", error);
        }

        if let Err(error) = portal.protect(id, true) {
            report.record("protect", error);
        }

        let sharing = Sharing {
            everyone: true,
            org: true,
            groups: self.groups.clone(),
            // Group members must be able to update the released item; the
            // backend silently drops group shares that omit this.
            allow_members_to_edit: true,
        };
        if let Err(error) = portal.share(id, &sharing) {
            report.record("share", error);
        }

        report
    }
}

/// Which sub-operations of one policy application failed.
#[derive(Debug, Default)]
pub struct SharingReport {
    failures: Vec<(&'static str, DirectoryError)>,
}

impl SharingReport {
    fn record(&mut self, step: &'static str, error: DirectoryError) {
        self.failures.push((step, error));
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures(&self) -> &[(&'static str, DirectoryError)] {
        &self.failures
    }

    /// One-line summary of every failed sub-operation.
    pub fn describe_failures(&self) -> String {
        self.failures
            .iter()
            .map(|(step, error)| format!("{step}: {error}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}
