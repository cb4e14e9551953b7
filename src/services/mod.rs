//! Service layer for work that crosses into the worker pool.
//!
//! Both services keep their results on a main queue and apply them only when
//! the coordination thread pumps them.

pub mod fetch_service;
pub mod insert_service;

pub use fetch_service::FetchService;
pub use insert_service::{InsertCompletion, InsertResolution, InsertService};
