//! Ordered entry sequence of one gallery.
//!
//! Supports relocation, removal and a two-phase insert: a placeholder reserves
//! an index while the dropped content is being fetched, and is later either
//! replaced by the real entry or removed. The placeholder is found again by its
//! handle, never by a captured index, so moves and removals that happen while
//! the fetch is in flight are honoured.

use super::entry::{Entry, EntryId};
use crate::error::{GalleryError, Result};
use log::debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;

static NEXT_PLACEHOLDER_ID: AtomicU64 = AtomicU64::new(1);

/// Handle to a placeholder returned by [`EntryCollection::begin_async_insert`].
///
/// Resolving a handle a second time (commit or abort) is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaceholderHandle(u64);

impl PlaceholderHandle {
    fn next() -> Self {
        PlaceholderHandle(NEXT_PLACEHOLDER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// One position in the collection.
///
/// A placeholder occupies its index like any entry; readers render it as a pending slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Entry(Entry),
    Placeholder(PlaceholderHandle),
}

impl Item {
    pub fn entry(&self) -> Option<&Entry> {
        match self {
            Item::Entry(entry) => Some(entry),
            Item::Placeholder(_) => None,
        }
    }

    pub fn into_entry(self) -> Option<Entry> {
        match self {
            Item::Entry(entry) => Some(entry),
            Item::Placeholder(_) => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Item::Placeholder(_))
    }
}

/// Structural change applied to a collection, in the order it happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionChange {
    Insert(usize),
    Delete(usize),
    /// `from` is an index before the move, `to` an index after it.
    Move { from: usize, to: usize },
    /// The item at this index changed in place (placeholder became an entry).
    Reload(usize),
}

/// The ordered `Entry | Placeholder` sequence of a gallery.
#[derive(Default)]
pub struct EntryCollection {
    items: Vec<Item>,
    subscribers: Vec<mpsc::Sender<CollectionChange>>,
    /// Number of structural changes applied so far.
    mutations: u64,
}

impl EntryCollection {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a collection holding `entries` in order.
    pub fn from_entries(entries: impl IntoIterator<Item = Entry>) -> Self {
        Self {
            items: entries.into_iter().map(Item::Entry).collect(),
            subscribers: Vec::new(),
            mutations: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    /// Increases with every applied change; unchanged across rejected or no-op calls.
    pub fn mutation_count(&self) -> u64 {
        self.mutations
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Committed entries in order, skipping pending placeholders.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.items.iter().filter_map(Item::entry)
    }

    /// Number of placeholders still waiting for resolution.
    pub fn pending_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_placeholder()).count()
    }

    /// Current index of the entry with this identity.
    pub fn index_of(&self, id: EntryId) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.entry().is_some_and(|entry| entry.id() == id))
    }

    /// Current index of a pending placeholder.
    pub fn placeholder_index(&self, handle: PlaceholderHandle) -> Option<usize> {
        self.items
            .iter()
            .position(|item| *item == Item::Placeholder(handle))
    }

    /// Registers a listener for structural changes.
    pub fn subscribe(&mut self) -> mpsc::Receiver<CollectionChange> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// Relocates the item at `from` to `to`.
    ///
    /// `to` is interpreted against the sequence with the item already taken out,
    /// so `move_item(i, i)` leaves the order untouched.
    pub fn move_item(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.items.len();
        self.check_index(from, len)?;
        self.check_index(to, len)?;

        if from == to {
            return Ok(());
        }

        let item = self.items.remove(from);
        self.items.insert(to, item);
        debug!("Moved item {} -> {} ({} items)", from, to, len);
        self.emit(CollectionChange::Move { from, to });
        Ok(())
    }

    /// Removes and returns the item at `at`.
    ///
    /// Removing a placeholder is allowed; its pending insert then resolves as a no-op.
    pub fn remove(&mut self, at: usize) -> Result<Item> {
        self.check_index(at, self.items.len())?;
        let item = self.items.remove(at);
        debug!("Removed item at {}", at);
        self.emit(CollectionChange::Delete(at));
        Ok(item)
    }

    /// Removes the entry with this identity, if it is still present.
    pub fn remove_by_reference(&mut self, id: EntryId) -> Option<Entry> {
        let Some(index) = self.index_of(id) else {
            debug!("Entry {} already gone, nothing to remove", id);
            return None;
        };

        let removed = self.items.remove(index);
        self.emit(CollectionChange::Delete(index));
        removed.into_entry()
    }

    /// Reserves index `at` for content that is still being fetched.
    pub fn begin_async_insert(&mut self, at: usize) -> Result<PlaceholderHandle> {
        let len = self.items.len();
        if at > len {
            return Err(GalleryError::IndexOutOfRange { index: at, len });
        }

        let handle = PlaceholderHandle::next();
        self.items.insert(at, Item::Placeholder(handle));
        debug!("Placeholder {:?} reserved at {}", handle, at);
        self.emit(CollectionChange::Insert(at));
        Ok(handle)
    }

    /// Replaces the placeholder with `entry` wherever the placeholder is now.
    ///
    /// Returns the index the entry landed at, or `None` when the placeholder was
    /// already resolved or removed.
    pub fn commit_async_insert(&mut self, handle: PlaceholderHandle, entry: Entry) -> Option<usize> {
        let Some(index) = self.placeholder_index(handle) else {
            debug!("Placeholder {:?} no longer present, commit dropped", handle);
            return None;
        };

        debug!("Placeholder {:?} committed at {} as {}", handle, index, entry.id());
        self.items[index] = Item::Entry(entry);
        self.emit(CollectionChange::Reload(index));
        Some(index)
    }

    /// Removes the placeholder. Returns `false` if it was already gone.
    pub fn abort_async_insert(&mut self, handle: PlaceholderHandle) -> bool {
        let Some(index) = self.placeholder_index(handle) else {
            return false;
        };

        self.items.remove(index);
        debug!("Placeholder {:?} aborted at {}", handle, index);
        self.emit(CollectionChange::Delete(index));
        true
    }

    fn check_index(&self, index: usize, len: usize) -> Result<()> {
        if index < len {
            Ok(())
        } else {
            Err(GalleryError::IndexOutOfRange { index, len })
        }
    }

    fn emit(&mut self, change: CollectionChange) {
        self.mutations += 1;
        self.subscribers.retain(|tx| tx.send(change).is_ok());
    }
}

impl std::fmt::Debug for EntryCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryCollection")
            .field("items", &self.items)
            .finish()
    }
}
