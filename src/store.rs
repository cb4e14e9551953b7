//! Storage collaborator for galleries.
//!
//! The registry only needs record allocation, deletion and access to the
//! current record set; the live grouped view is computed on top of that.

use crate::error::{GalleryError, Result};
use crate::state::{Gallery, GalleryId, OrderingKey};
use log::debug;
use std::collections::BTreeMap;

/// Minimal persistence contract consumed by [`crate::state::GalleryRegistry`].
///
/// Every method applies its change before returning; the registry issues the
/// next user action only after the previous call succeeded.
pub trait GalleryStore {
    /// Allocates and stores a new gallery record.
    fn create_record(&mut self, title: String, ordering_key: OrderingKey) -> Result<GalleryId>;

    /// Permanently removes a record, returning it.
    fn delete_record(&mut self, id: GalleryId) -> Result<Gallery>;

    fn record(&self, id: GalleryId) -> Option<&Gallery>;

    fn record_mut(&mut self, id: GalleryId) -> Option<&mut Gallery>;

    /// All records in unspecified order.
    fn records(&self) -> Vec<&Gallery>;
}

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    galleries: BTreeMap<GalleryId, Gallery>,
    next_id: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GalleryStore for MemoryStore {
    fn create_record(&mut self, title: String, ordering_key: OrderingKey) -> Result<GalleryId> {
        self.next_id += 1;
        let id = GalleryId::new(self.next_id);
        debug!("Store: create {} ({})", id, title);
        self.galleries.insert(id, Gallery::new(id, title, ordering_key));
        Ok(id)
    }

    fn delete_record(&mut self, id: GalleryId) -> Result<Gallery> {
        debug!("Store: delete {}", id);
        self.galleries
            .remove(&id)
            .ok_or(GalleryError::UnknownGallery(id))
    }

    fn record(&self, id: GalleryId) -> Option<&Gallery> {
        self.galleries.get(&id)
    }

    fn record_mut(&mut self, id: GalleryId) -> Option<&mut Gallery> {
        self.galleries.get_mut(&id)
    }

    fn records(&self) -> Vec<&Gallery> {
        self.galleries.values().collect()
    }
}
