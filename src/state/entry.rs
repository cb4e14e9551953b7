//! A single image reference inside a gallery.

use crate::error::{GalleryError, Result};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_ENTRY_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of an entry.
///
/// Two entries may share a url; they are told apart by this id, never by content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u64);

impl EntryId {
    fn next() -> Self {
        EntryId(NEXT_ENTRY_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entry#{}", self.0)
    }
}

/// An image reference: a url and the aspect ratio (width / height) of the image behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    id: EntryId,
    url: String,
    aspect_ratio: f64,
}

impl Entry {
    /// Creates an entry with a fresh identity.
    ///
    /// Fails if `url` is empty or `aspect_ratio` is not a positive finite number.
    pub fn new(url: impl Into<String>, aspect_ratio: f64) -> Result<Self> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(GalleryError::InvalidEntry("url must not be empty".to_string()));
        }
        if !(aspect_ratio.is_finite() && aspect_ratio > 0.0) {
            return Err(GalleryError::InvalidEntry(format!(
                "aspect ratio must be positive, got {}",
                aspect_ratio
            )));
        }

        Ok(Self {
            id: EntryId::next(),
            url,
            aspect_ratio,
        })
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }
}
