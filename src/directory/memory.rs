//! In-memory portal backend
//!
//! A complete `Portal` implementation with the same observable semantics as
//! the live backend: exact-match search, archive-on-replace, refusal to
//! delete protected items, group sharing ignored without the member-edit
//! flag, and metadata left stale by replace. Used by the test suite and by
//! rehearsal runs that must not touch a live portal.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, VecDeque};

use chrono::Utc;
use uuid::Uuid;

use super::error::{DirectoryError, DirectoryResult};
use super::portal::Portal;
use super::query::ItemQuery;
use super::record::{
    ArtifactId, ArtifactRecord, Comment, ContentStatus, GroupId, ItemProperties, ItemType,
    ItemUpdate, PublishParams, Sharing,
};

/// In-memory content portal.
pub struct MemoryPortal {
    items: RefCell<BTreeMap<ArtifactId, ArtifactRecord>>,
    groups: RefCell<Vec<(String, GroupId)>>,
    /// One-shot injected failures, keyed by operation name.
    failures: RefCell<HashMap<&'static str, VecDeque<DirectoryError>>>,
    /// One-shot search failures keyed by queried title.
    search_failures: RefCell<Vec<(String, DirectoryError)>>,
    /// When false, replace succeeds but no archive item appears. Emulates an
    /// observed backend failure mode.
    archive_on_replace: Cell<bool>,
}

impl MemoryPortal {
    pub fn new() -> Self {
        Self {
            items: RefCell::new(BTreeMap::new()),
            groups: RefCell::new(Vec::new()),
            failures: RefCell::new(HashMap::new()),
            search_failures: RefCell::new(Vec::new()),
            archive_on_replace: Cell::new(true),
        }
    }

    fn mint_id() -> ArtifactId {
        ArtifactId::new(Uuid::new_v4().simple().to_string())
    }

    /// Insert a fully-formed record.
    pub fn seed(&self, record: ArtifactRecord) -> ArtifactId {
        let id = record.id.clone();
        self.items.borrow_mut().insert(id.clone(), record);
        id
    }

    /// Insert a minimal record with a fresh id.
    pub fn seed_item(&self, title: &str, name: &str, item_type: ItemType) -> ArtifactId {
        self.seed(ArtifactRecord {
            id: Self::mint_id(),
            title: title.to_string(),
            name: name.to_string(),
            item_type,
            description: String::new(),
            snippet: String::new(),
            access_information: String::new(),
            license_info: String::new(),
            content_status: ContentStatus::None,
            protected: false,
            sharing: Sharing::default(),
            comments: Vec::new(),
            thumbnail: None,
        })
    }

    /// Register a group so `search_groups` can find it.
    pub fn seed_group(&self, title: &str) -> GroupId {
        let id = GroupId::new(Uuid::new_v4().simple().to_string());
        self.groups.borrow_mut().push((title.to_string(), id.clone()));
        id
    }

    /// Queue a failure for the next call of the named operation
    /// (one of "search", "get", "add", "update", "replace", "publish",
    /// "delete", "protect", "share", "add_comment", "search_groups").
    pub fn inject_failure(&self, op: &'static str, error: DirectoryError) {
        self.failures
            .borrow_mut()
            .entry(op)
            .or_default()
            .push_back(error);
    }

    /// Fail the next search whose query title equals `title`.
    pub fn inject_search_failure_for_title(&self, title: &str, error: DirectoryError) {
        self.search_failures
            .borrow_mut()
            .push((title.to_string(), error));
    }

    /// Make subsequent replaces succeed without creating the archive item.
    pub fn set_archive_on_replace(&self, enabled: bool) {
        self.archive_on_replace.set(enabled);
    }

    /// Snapshot of every record, in id order.
    pub fn records(&self) -> Vec<ArtifactRecord> {
        self.items.borrow().values().cloned().collect()
    }

    /// Snapshot of one record.
    pub fn record(&self, id: &ArtifactId) -> Option<ArtifactRecord> {
        self.items.borrow().get(id).cloned()
    }

    fn take_failure(&self, op: &'static str) -> Option<DirectoryError> {
        self.failures.borrow_mut().get_mut(op)?.pop_front()
    }

    fn fail_if_injected(&self, op: &'static str) -> DirectoryResult<()> {
        match self.take_failure(op) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl Default for MemoryPortal {
    fn default() -> Self {
        Self::new()
    }
}

impl Portal for MemoryPortal {
    fn search(&self, query: &ItemQuery) -> DirectoryResult<Vec<ArtifactRecord>> {
        self.fail_if_injected("search")?;
        if let Some(title) = &query.title {
            let mut targeted = self.search_failures.borrow_mut();
            if let Some(pos) = targeted.iter().position(|(t, _)| t == title) {
                let (_, error) = targeted.remove(pos);
                return Err(error);
            }
        }
        query.validate()?;
        Ok(self
            .items
            .borrow()
            .values()
            .filter(|record| query.matches(record))
            .cloned()
            .collect())
    }

    fn get(&self, id: &ArtifactId) -> DirectoryResult<Option<ArtifactRecord>> {
        self.fail_if_injected("get")?;
        Ok(self.items.borrow().get(id).cloned())
    }

    fn add(
        &self,
        properties: ItemProperties,
        data: Option<&[u8]>,
        _folder: Option<&str>,
    ) -> DirectoryResult<ArtifactRecord> {
        self.fail_if_injected("add")?;
        let item_type = properties
            .item_type
            .ok_or_else(|| DirectoryError::Backend("item type is required".to_string()))?;
        let name = if properties.name.is_empty() {
            properties.title.replace(' ', "_")
        } else {
            properties.name
        };
        let record = ArtifactRecord {
            id: Self::mint_id(),
            title: properties.title,
            name,
            item_type,
            description: properties.description,
            snippet: properties.snippet,
            access_information: properties.access_information,
            license_info: properties.license_info,
            content_status: ContentStatus::None,
            protected: false,
            sharing: Sharing::default(),
            comments: Vec::new(),
            thumbnail: data.map(|bytes| bytes.to_vec()),
        };
        self.items
            .borrow_mut()
            .insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(
        &self,
        id: &ArtifactId,
        update: &ItemUpdate,
        thumbnail: Option<&[u8]>,
    ) -> DirectoryResult<()> {
        self.fail_if_injected("update")?;
        let mut items = self.items.borrow_mut();
        let record = items
            .get_mut(id)
            .ok_or_else(|| DirectoryError::NotFound(id.clone()))?;
        update.apply(record);
        if let Some(bytes) = thumbnail {
            record.thumbnail = Some(bytes.to_vec());
        }
        Ok(())
    }

    fn replace(
        &self,
        target: &ArtifactId,
        source: &ArtifactId,
        archive_name: &str,
        _replace_metadata: bool,
    ) -> DirectoryResult<()> {
        self.fail_if_injected("replace")?;
        let mut items = self.items.borrow_mut();
        let old_target = items
            .get(target)
            .cloned()
            .ok_or_else(|| DirectoryError::NotFound(target.clone()))?;
        let source_record = items
            .remove(source)
            .ok_or_else(|| DirectoryError::NotFound(source.clone()))?;

        // The previous target survives as a new archive item. It keeps the
        // old metadata and protection flag.
        if self.archive_on_replace.get() {
            let archive = ArtifactRecord {
                id: Self::mint_id(),
                title: archive_name.to_string(),
                name: archive_name.to_string(),
                ..old_target.clone()
            };
            items.insert(archive.id.clone(), archive);
        }

        // The target keeps its id, title, name, and sharing; its content now
        // comes from the source. Like the live backend, metadata is left
        // stale regardless of replace_metadata; callers re-apply it.
        let record = items.get_mut(target).expect("target present");
        record.thumbnail = source_record.thumbnail;
        Ok(())
    }

    fn publish(&self, id: &ArtifactId, _params: &PublishParams) -> DirectoryResult<ArtifactRecord> {
        self.fail_if_injected("publish")?;
        let package = self
            .items
            .borrow()
            .get(id)
            .cloned()
            .ok_or_else(|| DirectoryError::NotFound(id.clone()))?;
        if !package.item_type.is_package() {
            return Err(DirectoryError::Backend(format!(
                "item {} is not a package",
                id
            )));
        }
        let service = ArtifactRecord {
            id: Self::mint_id(),
            item_type: ItemType::TileService,
            content_status: ContentStatus::None,
            protected: false,
            sharing: Sharing::default(),
            comments: Vec::new(),
            ..package
        };
        self.items
            .borrow_mut()
            .insert(service.id.clone(), service.clone());
        Ok(service)
    }

    fn delete(&self, id: &ArtifactId) -> DirectoryResult<()> {
        self.fail_if_injected("delete")?;
        let mut items = self.items.borrow_mut();
        let record = items
            .get(id)
            .ok_or_else(|| DirectoryError::NotFound(id.clone()))?;
        if record.protected {
            return Err(DirectoryError::Protected(id.clone()));
        }
        items.remove(id);
        Ok(())
    }

    fn protect(&self, id: &ArtifactId, enable: bool) -> DirectoryResult<()> {
        self.fail_if_injected("protect")?;
        let mut items = self.items.borrow_mut();
        let record = items
            .get_mut(id)
            .ok_or_else(|| DirectoryError::NotFound(id.clone()))?;
        record.protected = enable;
        Ok(())
    }

    fn share(&self, id: &ArtifactId, sharing: &Sharing) -> DirectoryResult<()> {
        self.fail_if_injected("share")?;
        let mut items = self.items.borrow_mut();
        let record = items
            .get_mut(id)
            .ok_or_else(|| DirectoryError::NotFound(id.clone()))?;
        let mut applied = sharing.clone();
        // The live backend silently drops the group list unless members are
        // allowed to edit.
        if !applied.allow_members_to_edit {
            applied.groups.clear();
        }
        record.sharing = applied;
        Ok(())
    }

    fn add_comment(&self, id: &ArtifactId, text: &str) -> DirectoryResult<()> {
        self.fail_if_injected("add_comment")?;
        let mut items = self.items.borrow_mut();
        let record = items
            .get_mut(id)
            .ok_or_else(|| DirectoryError::NotFound(id.clone()))?;
        record.comments.push(Comment {
            text: text.to_string(),
            created: Utc::now(),
        });
        Ok(())
    }

    fn search_groups(&self, title: &str) -> DirectoryResult<Vec<GroupId>> {
        self.fail_if_injected("search_groups")?;
        Ok(self
            .groups
            .borrow()
            .iter()
            .filter(|(t, _)| t == title)
            .map(|(_, id)| id.clone())
            .collect())
    }
}
