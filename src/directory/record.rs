//! Artifact records and item payloads
//!
//! An `ArtifactRecord` is one published unit of content in the directory.
//! Neither `title` nor `name` is guaranteed unique by the backing portal;
//! the promotion engine enforces its own exactly-one checks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque unique item id, assigned by the directory on creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactId(String);

impl ArtifactId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ArtifactId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Opaque group id used for sharing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(String);

impl GroupId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Item category tags understood by the release tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemType {
    TileService,
    TilePackage,
    MapImageLayer,
    FeatureLayerCollection,
}

impl ItemType {
    /// The wire tag for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TileService => "tile-service",
            Self::TilePackage => "tile-package",
            Self::MapImageLayer => "map-image-layer",
            Self::FeatureLayerCollection => "feature-layer-collection",
        }
    }

    /// Parse a wire tag.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "tile-service" => Some(Self::TileService),
            "tile-package" => Some(Self::TilePackage),
            "map-image-layer" => Some(Self::MapImageLayer),
            "feature-layer-collection" => Some(Self::FeatureLayerCollection),
            _ => None,
        }
    }

    /// A raw package is not a service; replacing a service with one (or the
    /// reverse) needs a type-converting publish rather than a plain replace.
    pub fn is_package(&self) -> bool {
        matches!(self, Self::TilePackage)
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle status flag on an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    #[default]
    None,
    Authoritative,
    Deprecated,
}

impl ContentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Authoritative => "authoritative",
            Self::Deprecated => "deprecated",
        }
    }
}

/// Visibility settings on an artifact.
///
/// `allow_members_to_edit` must be true for group sharing to take effect at
/// all; the backing system silently ignores the group list otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Sharing {
    pub everyone: bool,
    pub org: bool,
    pub groups: Vec<GroupId>,
    pub allow_members_to_edit: bool,
}

/// One short note appended to an artifact. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub text: String,
    pub created: DateTime<Utc>,
}

/// One published unit of content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    pub id: ArtifactId,
    pub title: String,
    /// Machine name. Not strictly unique in observed portal behavior.
    pub name: String,
    pub item_type: ItemType,
    pub description: String,
    pub snippet: String,
    pub access_information: String,
    pub license_info: String,
    pub content_status: ContentStatus,
    pub protected: bool,
    pub sharing: Sharing,
    pub comments: Vec<Comment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<Vec<u8>>,
}

/// Payload for creating a new item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemProperties {
    pub title: String,
    pub name: String,
    pub item_type: Option<ItemType>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub access_information: String,
    #[serde(default)]
    pub license_info: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Sparse update payload: only the fields that are `Some` are written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub snippet: Option<String>,
    pub access_information: Option<String>,
    pub license_info: Option<String>,
    pub content_status: Option<ContentStatus>,
    pub tags: Option<Vec<String>>,
}

impl ItemUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn snippet(mut self, text: impl Into<String>) -> Self {
        self.snippet = Some(text.into());
        self
    }

    pub fn access_information(mut self, text: impl Into<String>) -> Self {
        self.access_information = Some(text.into());
        self
    }

    pub fn license_info(mut self, text: impl Into<String>) -> Self {
        self.license_info = Some(text.into());
        self
    }

    pub fn content_status(mut self, status: ContentStatus) -> Self {
        self.content_status = Some(status);
        self
    }

    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    /// The metadata fields carried forward during a replacement.
    ///
    /// The portal's replace primitive is supposed to copy these but is known
    /// to leave the stale values in place, so the engine re-applies them.
    pub fn metadata_from(source: &ArtifactRecord) -> Self {
        Self::new()
            .description(source.description.clone())
            .snippet(source.snippet.clone())
            .access_information(source.access_information.clone())
            .license_info(source.license_info.clone())
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply this update onto a record in place.
    pub fn apply(&self, record: &mut ArtifactRecord) {
        if let Some(title) = &self.title {
            record.title = title.clone();
        }
        if let Some(text) = &self.description {
            record.description = text.clone();
        }
        if let Some(text) = &self.snippet {
            record.snippet = text.clone();
        }
        if let Some(text) = &self.access_information {
            record.access_information = text.clone();
        }
        if let Some(text) = &self.license_info {
            record.license_info = text.clone();
        }
        if let Some(status) = self.content_status {
            record.content_status = status;
        }
    }
}

/// Parameters for a type-converting publish of an uploaded package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishParams {
    pub file_type: String,
    pub output_type: String,
}

impl PublishParams {
    /// Publish a vector tile package as a tile service.
    pub fn vector_tiles() -> Self {
        Self {
            file_type: "vectortilepackage".to_string(),
            output_type: "Tiles".to_string(),
        }
    }
}
