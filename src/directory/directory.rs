//! Read-only lookup over the portal catalog

use super::error::DirectoryResult;
use super::portal::Portal;
use super::query::ItemQuery;
use super::record::ArtifactRecord;

/// Exact-match lookup over published artifacts. Read-only.
pub struct ContentDirectory<'a> {
    portal: &'a dyn Portal,
}

impl<'a> ContentDirectory<'a> {
    pub fn new(portal: &'a dyn Portal) -> Self {
        Self { portal }
    }

    /// All exact matches for the query. May be empty.
    pub fn find(&self, query: &ItemQuery) -> DirectoryResult<Vec<ArtifactRecord>> {
        query.validate()?;
        self.portal.search(query)
    }

    /// The single match, only if exactly one exists.
    ///
    /// Zero or multiple matches yield `Ok(None)`; an ambiguous count is a
    /// normal lookup result, not an error. Callers that need the count for
    /// logging use `find` directly.
    pub fn find_one(&self, query: &ItemQuery) -> DirectoryResult<Option<ArtifactRecord>> {
        let mut matches = self.find(query)?;
        if matches.len() == 1 {
            Ok(matches.pop())
        } else {
            Ok(None)
        }
    }
}
