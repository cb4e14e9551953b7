//! Gallery: a titled container of ordered entries with a trash flag.

use super::collection::EntryCollection;
use chrono::{DateTime, Utc};
use std::fmt;

/// Storage handle of a gallery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GalleryId(pub(crate) u64);

impl GalleryId {
    /// Wraps a store-assigned key. Each store keeps its keys unique.
    pub fn new(raw: u64) -> Self {
        GalleryId(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for GalleryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gallery#{}", self.0)
    }
}

/// Sort key inside a partition: creation time, ties broken by creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrderingKey {
    pub created_at: DateTime<Utc>,
    pub sequence: u64,
}

/// A named, orderable container of entries.
#[derive(Debug)]
pub struct Gallery {
    id: GalleryId,
    title: String,
    entries: EntryCollection,
    removed: bool,
    ordering_key: OrderingKey,
    /// Bumped on every content change so live queries can report updates.
    revision: u64,
}

impl Gallery {
    /// A fresh, active, empty gallery record. Stores call this from `create_record`.
    pub fn new(id: GalleryId, title: String, ordering_key: OrderingKey) -> Self {
        Self {
            id,
            title,
            entries: EntryCollection::new(),
            removed: false,
            ordering_key,
            revision: 0,
        }
    }

    pub fn id(&self) -> GalleryId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn entries(&self) -> &EntryCollection {
        &self.entries
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    pub fn ordering_key(&self) -> OrderingKey {
        self.ordering_key
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn entries_mut(&mut self) -> &mut EntryCollection {
        &mut self.entries
    }

    pub(crate) fn set_title(&mut self, title: String) {
        self.title = title;
        self.touch();
    }

    pub(crate) fn set_removed(&mut self, removed: bool) {
        self.removed = removed;
    }

    pub(crate) fn touch(&mut self) {
        self.revision += 1;
    }
}
