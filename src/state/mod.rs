//! Gallery state owned by the coordination thread.

pub mod collection;
pub mod entry;
pub mod fetch_slot;
pub mod gallery;
pub mod registry;
pub mod sections;
pub mod transfer;

pub use collection::{CollectionChange, EntryCollection, Item, PlaceholderHandle};
pub use entry::{Entry, EntryId};
pub use fetch_slot::{FetchCompletion, FetchSlot, FetchTicket, SlotContent, SlotId};
pub use gallery::{Gallery, GalleryId, OrderingKey};
pub use registry::GalleryRegistry;
pub use sections::{
    ChangeBatch, GalleryRow, LiveQuery, Partition, RowChange, RowPath, Section, SectionChange,
};
pub use transfer::{DropOutcome, DropProposal, Payload, Transfer};
