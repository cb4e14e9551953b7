//! Drag-and-drop transfer descriptors.
//!
//! A drag session is represented by an explicit [`Transfer`] passed into the
//! drop operations instead of session-wide state.

use super::collection::{EntryCollection, PlaceholderHandle};
use super::entry::{Entry, EntryId};
use super::gallery::GalleryId;
use crate::error::{GalleryError, Result};
use log::debug;

/// What is being dragged.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// An entry of a gallery in this process, with the url its content comes from.
    Entry { id: EntryId, url: String },
    /// A url coming from outside; its content has to be fetched before it can be inserted.
    Url(String),
}

/// A dragged item and the collection it was picked up from, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Transfer {
    pub payload: Payload,
    pub origin: Option<GalleryId>,
}

impl Transfer {
    /// An entry dragged from `origin`.
    pub fn local(entry: &Entry, origin: GalleryId) -> Self {
        Self {
            payload: Payload::Entry {
                id: entry.id(),
                url: entry.url().to_string(),
            },
            origin: Some(origin),
        }
    }

    /// A url dragged in from outside.
    pub fn external(url: impl Into<String>) -> Self {
        Self {
            payload: Payload::Url(url.into()),
            origin: None,
        }
    }

    fn is_from(&self, target: GalleryId) -> bool {
        self.origin == Some(target)
    }
}

/// How a drop over a collection would be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropProposal {
    Forbidden,
    Move,
    Copy,
}

impl DropProposal {
    /// Proposal for dropping `transfer` onto the collection of `target`.
    ///
    /// Nothing can be dropped when no gallery is shown.
    pub fn for_target(target: Option<GalleryId>, transfer: &Transfer) -> Self {
        match target {
            None => DropProposal::Forbidden,
            Some(target) if transfer.is_from(target) => DropProposal::Move,
            Some(_) => DropProposal::Copy,
        }
    }
}

/// Result of [`perform_drop`].
#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome {
    /// A local entry was relocated to this index.
    Moved(usize),
    /// A placeholder was reserved; the caller resolves it once `url` is fetched.
    ///
    /// Entries dragged in from another gallery take this path too and end up as
    /// a new entry with its own identity.
    Pending { handle: PlaceholderHandle, url: String },
}

/// Applies a drop at `destination` to the collection of `target`.
///
/// Only transfers that originate in the same collection move. Anything else is
/// copied: its url is fetched again and inserted through a placeholder.
pub fn perform_drop(
    collection: &mut EntryCollection,
    target: GalleryId,
    transfer: &Transfer,
    destination: usize,
) -> Result<DropOutcome> {
    match &transfer.payload {
        Payload::Entry { id, .. } if transfer.is_from(target) => {
            let from = collection.index_of(*id).ok_or_else(|| {
                GalleryError::InvalidState(format!("{} is no longer in {}", id, target))
            })?;
            let to = destination.min(collection.len().saturating_sub(1));
            collection.move_item(from, to)?;
            Ok(DropOutcome::Moved(to))
        }
        Payload::Entry { url, .. } | Payload::Url(url) => {
            let handle = collection.begin_async_insert(destination)?;
            Ok(DropOutcome::Pending {
                handle,
                url: url.clone(),
            })
        }
    }
}

/// Drops `transfer` on the trash target of the collection of `target`.
///
/// Accepted only for entries dragged out of that same collection. Returns
/// whether an entry was removed; a concurrent removal makes this a no-op.
pub fn drop_on_trash(collection: &mut EntryCollection, target: GalleryId, transfer: &Transfer) -> bool {
    match &transfer.payload {
        Payload::Entry { id, .. } if transfer.is_from(target) => {
            let removed = collection.remove_by_reference(*id).is_some();
            debug!("Trash drop of {} on {}: removed={}", id, target, removed);
            removed
        }
        _ => false,
    }
}
