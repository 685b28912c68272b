//! Map authoring sources
//!
//! Staged uploads inherit their descriptive metadata from the map document
//! the package was built from. The authoring tool lives outside this crate;
//! this boundary is a trait so staging can be exercised without one.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::directory::ItemProperties;

/// One layer in an authored map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerInfo {
    pub name: String,
    pub visible: bool,
    pub min_scale: f64,
    pub max_scale: f64,
}

/// The initial visible extent of an authored map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
    /// Well-known spatial reference id.
    pub wkid: u32,
}

/// Descriptive metadata carried from the map document to the staged item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapMetadata {
    pub title: String,
    pub summary: String,
    pub description: String,
    pub credits: String,
    pub use_limitations: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Error)]
pub enum AuthoringError {
    #[error("map document unreadable: {0}")]
    Unreadable(String),

    #[error("map document missing required metadata field {0}")]
    MissingMetadata(&'static str),
}

/// A readable authored map document.
pub trait MapAuthoring {
    fn metadata(&self) -> Result<MapMetadata, AuthoringError>;
    fn layers(&self) -> Result<Vec<LayerInfo>, AuthoringError>;
    fn default_extent(&self) -> Result<Extent, AuthoringError>;
}

/// Build the staged item's properties from its source map document.
///
/// Title and summary must be present; the rest may be blank.
pub fn staged_properties(
    source: &dyn MapAuthoring,
    staged_title: &str,
    staged_name: &str,
) -> Result<ItemProperties, AuthoringError> {
    let metadata = source.metadata()?;
    if metadata.title.is_empty() {
        return Err(AuthoringError::MissingMetadata("title"));
    }
    if metadata.summary.is_empty() {
        return Err(AuthoringError::MissingMetadata("summary"));
    }
    Ok(ItemProperties {
        title: staged_title.to_string(),
        name: staged_name.to_string(),
        item_type: None,
        description: metadata.description,
        snippet: metadata.summary,
        access_information: metadata.credits,
        license_info: metadata.use_limitations,
        tags: metadata.tags,
    })
}
