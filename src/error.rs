//! Unified error types for the gallery core.

use crate::state::GalleryId;
use std::fmt;

/// Errors raised by gallery and collection operations.
#[derive(Debug, Clone, PartialEq)]
pub enum GalleryError {
    /// A position argument outside the current sequence.
    IndexOutOfRange { index: usize, len: usize },
    /// The operation is not valid for the gallery's current state (nothing was mutated).
    InvalidState(String),
    /// No gallery with this id exists.
    UnknownGallery(GalleryId),
    /// An entry was built from an empty url or a non-positive aspect ratio.
    InvalidEntry(String),
    /// The storage collaborator rejected a write.
    Storage(String),
}

impl fmt::Display for GalleryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GalleryError::IndexOutOfRange { index, len } => {
                write!(f, "Index {} out of range for collection of length {}", index, len)
            }
            GalleryError::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
            GalleryError::UnknownGallery(id) => write!(f, "Unknown gallery: {}", id),
            GalleryError::InvalidEntry(msg) => write!(f, "Invalid entry: {}", msg),
            GalleryError::Storage(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

impl std::error::Error for GalleryError {}

/// Errors raised while fetching image bytes.
///
/// These never escape a fetch slot; the slot turns them into its invalid marker.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
    /// The url could not be parsed or does not name a fetchable resource.
    InvalidUrl(String),
    /// Reading the resource failed.
    Io(String),
    /// The worker could not hand the result back.
    Worker(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::InvalidUrl(msg) => write!(f, "Invalid image url: {}", msg),
            FetchError::Io(msg) => write!(f, "Image fetch failed: {}", msg),
            FetchError::Worker(msg) => write!(f, "Fetch worker error: {}", msg),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<std::io::Error> for FetchError {
    fn from(err: std::io::Error) -> Self {
        FetchError::Io(err.to_string())
    }
}

impl From<url::ParseError> for FetchError {
    fn from(err: url::ParseError) -> Self {
        FetchError::InvalidUrl(err.to_string())
    }
}

/// Type alias for Results in this crate.
pub type Result<T> = std::result::Result<T, GalleryError>;
