//! Content directory
//!
//! Lookup and manipulation of published artifacts through a portal backend.
//! The `Portal` trait is the hard boundary: the promotion engine, sharing
//! policy, and staging flow all speak only this interface. Lookups are
//! exact-match and conjunctive; the backing catalog does not enforce
//! uniqueness of titles or names, so callers verify counts themselves.

mod directory;
mod error;
mod groups;
mod memory;
mod portal;
mod query;
mod record;
mod rest;

pub use directory::ContentDirectory;
pub use error::{DirectoryError, DirectoryResult};
pub use groups::resolve_groups;
pub use memory::MemoryPortal;
pub use portal::Portal;
pub use query::ItemQuery;
pub use record::{
    ArtifactId, ArtifactRecord, Comment, ContentStatus, GroupId, ItemProperties, ItemType,
    ItemUpdate, PublishParams, Sharing,
};
pub use rest::RestPortal;
