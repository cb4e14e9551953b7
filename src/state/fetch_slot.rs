//! Per-slot fetch state.
//!
//! A presentation slot can be rebound to another entry while the fetch for its
//! previous entry is still running. Every bind starts a new generation, and a
//! completion is written only if it carries the current generation and the
//! slot is still waiting for content. Everything else is discarded.

use super::entry::{Entry, EntryId};
use crate::config::INVALID_CONTENT_MARKER;
use crate::error::FetchError;
use crate::image_loader::ImageBytes;
use log::{debug, warn};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(pub(crate) u64);

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot#{}", self.0)
    }
}

/// What a slot currently displays.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotContent {
    Empty,
    /// Loading indicator running.
    Loading,
    Loaded(ImageBytes),
    /// Terminal marker for a failed fetch. A new bind is needed to retry.
    Invalid,
}

/// Identifies one fetch request: the slot, its bind generation and the url.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    pub slot: SlotId,
    pub generation: u64,
    pub url: String,
}

/// Outcome of a fetch, posted back to the coordination thread.
#[derive(Debug)]
pub struct FetchCompletion {
    pub ticket: FetchTicket,
    pub result: Result<ImageBytes, FetchError>,
}

#[derive(Debug)]
pub struct FetchSlot {
    id: SlotId,
    generation: u64,
    bound: Option<EntryId>,
    content: SlotContent,
}

impl FetchSlot {
    pub fn new(id: SlotId) -> Self {
        Self {
            id,
            generation: 0,
            bound: None,
            content: SlotContent::Empty,
        }
    }

    pub fn id(&self) -> SlotId {
        self.id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn bound_entry(&self) -> Option<EntryId> {
        self.bound
    }

    pub fn content(&self) -> &SlotContent {
        &self.content
    }

    pub fn is_loading(&self) -> bool {
        self.content == SlotContent::Loading
    }

    /// Whether real content is shown; the detail view opens only then.
    pub fn is_loaded(&self) -> bool {
        matches!(self.content, SlotContent::Loaded(_))
    }

    /// Marker text for a failed fetch.
    pub fn marker(&self) -> Option<&'static str> {
        (self.content == SlotContent::Invalid).then_some(INVALID_CONTENT_MARKER)
    }

    /// Binds the slot to `entry`: clears the content, starts loading and
    /// returns the single fetch request for this bind.
    pub fn bind(&mut self, entry: &Entry) -> FetchTicket {
        self.generation += 1;
        self.bound = Some(entry.id());
        self.content = SlotContent::Loading;
        FetchTicket {
            slot: self.id,
            generation: self.generation,
            url: entry.url().to_string(),
        }
    }

    /// Clears the slot so any in-flight result is discarded.
    pub fn unbind(&mut self) {
        self.generation += 1;
        self.bound = None;
        self.content = SlotContent::Empty;
    }

    /// Applies a completion. Returns `true` if it was written, `false` if stale.
    pub fn apply(&mut self, completion: FetchCompletion) -> bool {
        let ticket = &completion.ticket;
        if ticket.slot != self.id || ticket.generation != self.generation {
            debug!(
                "{}: discarding stale result for {} (generation {} != {})",
                self.id, ticket.url, ticket.generation, self.generation
            );
            return false;
        }
        if !self.is_loading() {
            debug!("{}: content already written, ignoring {}", self.id, ticket.url);
            return false;
        }

        self.content = match completion.result {
            Ok(bytes) => SlotContent::Loaded(bytes),
            Err(e) => {
                warn!("{}: {}", self.id, e);
                SlotContent::Invalid
            }
        };
        true
    }
}
