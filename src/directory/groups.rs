//! Group list validation
//!
//! Configured group titles are resolved to ids up front, once per run. An
//! unknown or ambiguous group is logged and skipped; a bad entry in the list
//! must not stop the batch.

use super::error::DirectoryResult;
use super::portal::Portal;
use super::record::GroupId;
use crate::observability::Logger;

/// Resolve group titles to ids, dropping the ones that cannot be resolved.
pub fn resolve_groups(portal: &dyn Portal, titles: &[String]) -> DirectoryResult<Vec<GroupId>> {
    let mut ids = Vec::with_capacity(titles.len());
    for title in titles {
        let matches = portal.search_groups(title)?;
        match matches.len() {
            1 => ids.push(matches.into_iter().next().expect("one match")),
            0 => Logger::warn("groups.not_found", &[("group", title)]),
            n => Logger::warn(
                "groups.ambiguous",
                &[("group", title), ("matches", &n.to_string())],
            ),
        }
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::memory::MemoryPortal;

    #[test]
    fn test_unknown_groups_are_skipped_not_fatal() {
        let portal = MemoryPortal::new();
        let gis_team = portal.seed_group("GIS Team");
        portal.seed_group("Emergency Management");

        let titles = vec!["GIS Team".to_string(), "NO SUCH GROUP".to_string()];
        let ids = resolve_groups(&portal, &titles).unwrap();
        assert_eq!(ids, vec![gis_team]);
    }

    #[test]
    fn test_ambiguous_group_title_is_skipped() {
        let portal = MemoryPortal::new();
        portal.seed_group("GIS Team");
        portal.seed_group("GIS Team");

        let ids = resolve_groups(&portal, &["GIS Team".to_string()]).unwrap();
        assert!(ids.is_empty());
    }
}
