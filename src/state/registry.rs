//! Registry of all galleries with trash/restore lifecycle.
//!
//! Owned by the coordination thread. Every mutation refreshes the live grouped
//! view and publishes the resulting [`ChangeBatch`] to subscribers, in the
//! order the mutations were applied.

use super::collection::EntryCollection;
use super::gallery::{Gallery, GalleryId, OrderingKey};
use super::sections::{ChangeBatch, LiveQuery, Section};
use crate::config::DEFAULT_GALLERY_TITLE;
use crate::error::{GalleryError, Result};
use crate::store::{GalleryStore, MemoryStore};
use crate::title_utils::uniquify;
use chrono::Utc;
use log::{debug, info};
use std::sync::mpsc;

pub struct GalleryRegistry<S: GalleryStore = MemoryStore> {
    store: S,
    query: LiveQuery,
    next_sequence: u64,
    subscribers: Vec<mpsc::Sender<ChangeBatch>>,
}

impl GalleryRegistry<MemoryStore> {
    /// Creates a registry backed by an empty in-memory store.
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new())
    }
}

impl<S: GalleryStore> GalleryRegistry<S> {
    /// Creates a registry over the records already present in `store`.
    pub fn new(store: S) -> Self {
        let query = LiveQuery::new(store.records());
        let next_sequence = store
            .records()
            .iter()
            .map(|g| g.ordering_key().sequence + 1)
            .max()
            .unwrap_or(0);

        Self {
            store,
            query,
            next_sequence,
            subscribers: Vec::new(),
        }
    }

    /// Current sections: active galleries first, then trashed ones; empty partitions are omitted.
    pub fn sections(&self) -> &[Section] {
        self.query.snapshot()
    }

    /// Registers a listener for change batches.
    pub fn subscribe(&mut self) -> mpsc::Receiver<ChangeBatch> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn gallery(&self, id: GalleryId) -> Option<&Gallery> {
        self.store.record(id)
    }

    /// Creates an active gallery with a default title unique among all galleries, trashed included.
    pub fn create(&mut self) -> Result<GalleryId> {
        // Titles are read before the new record exists.
        let titles: Vec<String> = self
            .store
            .records()
            .iter()
            .map(|g| g.title().to_string())
            .collect();
        let title = uniquify(DEFAULT_GALLERY_TITLE, &titles);

        let ordering_key = OrderingKey {
            created_at: Utc::now(),
            sequence: self.next_sequence,
        };
        self.next_sequence += 1;

        let id = self.store.create_record(title.clone(), ordering_key)?;
        info!("Created {} \"{}\"", id, title);
        self.publish();
        Ok(id)
    }

    /// Moves an active gallery to the trash.
    pub fn trash(&mut self, id: GalleryId) -> Result<()> {
        let gallery = self.record_mut(id)?;
        if gallery.is_removed() {
            return Err(GalleryError::InvalidState(format!("{} is already in the trash", id)));
        }
        gallery.set_removed(true);
        info!("Trashed {}", id);
        self.publish();
        Ok(())
    }

    /// Brings a trashed gallery back to the active partition.
    pub fn restore(&mut self, id: GalleryId) -> Result<()> {
        let gallery = self.record_mut(id)?;
        if !gallery.is_removed() {
            return Err(GalleryError::InvalidState(format!("{} is not in the trash", id)));
        }
        gallery.set_removed(false);
        info!("Restored {}", id);
        self.publish();
        Ok(())
    }

    /// Permanently deletes a trashed gallery.
    ///
    /// Fails without mutating anything if the gallery is still active.
    pub fn purge(&mut self, id: GalleryId) -> Result<()> {
        if !self.record_mut(id)?.is_removed() {
            return Err(GalleryError::InvalidState(format!(
                "{} must be trashed before it can be purged",
                id
            )));
        }
        let gallery = self.store.delete_record(id)?;
        info!("Purged {} \"{}\"", id, gallery.title());
        self.publish();
        Ok(())
    }

    /// Trashes an active gallery, or purges one that is already trashed.
    pub fn delete(&mut self, id: GalleryId) -> Result<()> {
        if self.record_mut(id)?.is_removed() {
            self.purge(id)
        } else {
            self.trash(id)
        }
    }

    /// Renames a gallery. A title taken by another gallery gets a numeric suffix.
    ///
    /// Returns the title actually stored.
    pub fn rename(&mut self, id: GalleryId, title: &str) -> Result<String> {
        let title = title.trim();
        if title.is_empty() {
            return Err(GalleryError::InvalidState("title must not be empty".to_string()));
        }

        let others: Vec<String> = self
            .store
            .records()
            .iter()
            .filter(|g| g.id() != id)
            .map(|g| g.title().to_string())
            .collect();
        let title = uniquify(title, &others);

        let gallery = self.record_mut(id)?;
        if gallery.title() != title {
            debug!("Renamed {} \"{}\" -> \"{}\"", id, gallery.title(), title);
            gallery.set_title(title.clone());
            self.publish();
        }
        Ok(title)
    }

    /// Entries of an active gallery. A trashed gallery has no visible entries.
    pub fn collection(&self, id: GalleryId) -> Result<&EntryCollection> {
        let gallery = self.store.record(id).ok_or(GalleryError::UnknownGallery(id))?;
        if gallery.is_removed() {
            return Err(GalleryError::InvalidState(format!("{} is in the trash", id)));
        }
        Ok(gallery.entries())
    }

    /// Runs `edit` against the entries of an active gallery.
    ///
    /// The gallery is touched and an update published only if `edit` actually
    /// changed the collection; a rejected or no-op edit leaves everything as it was.
    pub fn edit_collection<R>(
        &mut self,
        id: GalleryId,
        edit: impl FnOnce(&mut EntryCollection) -> R,
    ) -> Result<R> {
        if self.record_mut(id)?.is_removed() {
            return Err(GalleryError::InvalidState(format!("{} is in the trash", id)));
        }
        self.edit_entries(id, edit)
    }

    /// Like [`Self::edit_collection`] but also reaches trashed galleries.
    ///
    /// Pending inserts must resolve even if their gallery was trashed meanwhile.
    pub(crate) fn edit_entries<R>(
        &mut self,
        id: GalleryId,
        edit: impl FnOnce(&mut EntryCollection) -> R,
    ) -> Result<R> {
        let gallery = self.record_mut(id)?;
        let before = gallery.entries().mutation_count();
        let result = edit(gallery.entries_mut());
        if gallery.entries().mutation_count() == before {
            debug!("Edit of {} left its entries unchanged", id);
            return Ok(result);
        }
        gallery.touch();
        self.publish();
        Ok(result)
    }

    fn record_mut(&mut self, id: GalleryId) -> Result<&mut Gallery> {
        self.store
            .record_mut(id)
            .ok_or(GalleryError::UnknownGallery(id))
    }

    fn publish(&mut self) {
        let batch = self.query.refresh(self.store.records());
        if batch.is_empty() {
            return;
        }
        debug!(
            "Publishing {} section / {} row changes",
            batch.section_changes.len(),
            batch.row_changes.len()
        );
        self.subscribers.retain(|tx| tx.send(batch.clone()).is_ok());
    }
}
