//! Photo gallery core: ordered image collections, trash/restore lifecycle with
//! a live sectioned view, and image fetching that tolerates slot reuse.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod image_loader;
pub mod services;
pub mod state;
pub mod store;
pub mod title_utils;

pub use error::{FetchError, GalleryError, Result};
pub use image_loader::{FileSource, ImageBytes, ImageSource};
pub use services::{FetchService, InsertResolution, InsertService};
pub use state::{
    ChangeBatch, DropOutcome, DropProposal, Entry, EntryCollection, EntryId, Gallery, GalleryId,
    GalleryRegistry, PlaceholderHandle, Section, SlotContent, SlotId, Transfer,
};
pub use store::{GalleryStore, MemoryStore};
pub use title_utils::uniquify;
