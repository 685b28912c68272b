//! Exact-match item queries
//!
//! The portal's default search (`q`) fuzzy-matches. These queries are built
//! for the exact-match `filter` channel: conjunctive across whichever of
//! title, name, and type are provided, never fuzzy.

use super::error::{DirectoryError, DirectoryResult};
use super::record::{ArtifactRecord, ItemType};

/// An exact, conjunctive query over any combination of title, name, type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemQuery {
    pub title: Option<String>,
    pub name: Option<String>,
    pub item_type: Option<ItemType>,
}

impl ItemQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn item_type(mut self, item_type: ItemType) -> Self {
        self.item_type = Some(item_type);
        self
    }

    /// Reject queries the backing search is known to mishandle.
    ///
    /// A name with a file-extension-like suffix gets its extension silently
    /// stripped by the fuzzy matcher, so such names must be qualified with an
    /// item type. An empty query would match the whole catalog.
    pub fn validate(&self) -> DirectoryResult<()> {
        if self.title.is_none() && self.name.is_none() && self.item_type.is_none() {
            return Err(DirectoryError::EmptyQuery);
        }
        if let Some(name) = &self.name {
            if name.contains('.') && self.item_type.is_none() {
                return Err(DirectoryError::ExtensionBearingName(name.clone()));
            }
        }
        Ok(())
    }

    /// Exact conjunctive match against one record.
    pub fn matches(&self, record: &ArtifactRecord) -> bool {
        if let Some(title) = &self.title {
            if &record.title != title {
                return false;
            }
        }
        if let Some(name) = &self.name {
            if &record.name != name {
                return false;
            }
        }
        if let Some(item_type) = self.item_type {
            if record.item_type != item_type {
                return false;
            }
        }
        true
    }

    /// The exact-match filter expression for the portal's search endpoint.
    pub fn filter_expression(&self) -> String {
        let mut expr = String::new();
        if let Some(name) = &self.name {
            expr.push_str(&format!("name:\"{}\"", name));
        }
        if let Some(title) = &self.title {
            if !expr.is_empty() {
                expr.push_str(" AND ");
            }
            expr.push_str(&format!("title:\"{}\"", title));
        }
        if let Some(item_type) = self.item_type {
            if !expr.is_empty() {
                expr.push_str(" AND ");
            }
            expr.push_str(&format!("type:\"{}\"", item_type.as_str()));
        }
        expr
    }
}
