//! Service for drops that bring new images into a gallery.
//!
//! An external drop reserves a placeholder right away. The url is then
//! fetched and its image size probed on the worker pool; the result comes back
//! through the main queue and [`InsertService::pump`] commits the entry at the
//! placeholder's current position, or removes the placeholder when the fetch
//! failed.

use crate::config::FALLBACK_ASPECT_RATIO;
use crate::dispatch::MainQueue;
use crate::error::{FetchError, Result};
use crate::image_loader::{ImageSource, probe_aspect_ratio};
use crate::state::transfer::perform_drop;
use crate::state::{DropOutcome, Entry, GalleryId, GalleryRegistry, PlaceholderHandle, Transfer};
use crate::store::GalleryStore;
use log::{debug, info, warn};
use rayon::ThreadPool;
use std::sync::Arc;
use std::time::Duration;

/// Result of fetching a dropped url.
#[derive(Debug)]
pub struct InsertCompletion {
    pub gallery: GalleryId,
    pub handle: PlaceholderHandle,
    pub url: String,
    /// Probed aspect ratio; `None` when the bytes are not a readable image.
    pub result: std::result::Result<Option<f64>, FetchError>,
}

/// How a pending insert ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertResolution {
    Committed { gallery: GalleryId, index: usize },
    Aborted { gallery: GalleryId },
    /// The placeholder or its gallery was already gone.
    Dropped,
}

pub struct InsertService {
    pool: Arc<ThreadPool>,
    source: Arc<dyn ImageSource>,
    queue: MainQueue<InsertCompletion>,
    pending: usize,
}

impl InsertService {
    pub fn new(pool: Arc<ThreadPool>, source: Arc<dyn ImageSource>) -> Self {
        Self {
            pool,
            source,
            queue: MainQueue::new(),
            pending: 0,
        }
    }

    /// Inserts whose fetch has not been resolved yet.
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Drops `transfer` onto `gallery` at `destination`.
    ///
    /// Local transfers are moved immediately; external ones reserve a
    /// placeholder and start fetching.
    pub fn drop_into<S: GalleryStore>(
        &mut self,
        registry: &mut GalleryRegistry<S>,
        gallery: GalleryId,
        transfer: &Transfer,
        destination: usize,
    ) -> Result<DropOutcome> {
        let outcome = registry.edit_collection(gallery, |entries| {
            perform_drop(entries, gallery, transfer, destination)
        })??;

        if let DropOutcome::Pending { handle, url } = &outcome {
            self.start(gallery, *handle, url.clone());
        }
        Ok(outcome)
    }

    fn start(&mut self, gallery: GalleryId, handle: PlaceholderHandle, url: String) {
        self.pending += 1;
        debug!("Fetching dropped {} for {:?} in {}", url, handle, gallery);
        let source = Arc::clone(&self.source);
        let poster = self.queue.poster();
        self.pool.spawn(move || {
            let result = source.fetch(&url).map(|bytes| probe_aspect_ratio(&bytes));
            poster.post(InsertCompletion {
                gallery,
                handle,
                url,
                result,
            });
        });
    }

    /// Resolves every insert whose fetch finished so far.
    pub fn pump<S: GalleryStore>(&mut self, registry: &mut GalleryRegistry<S>) -> Vec<InsertResolution> {
        self.queue
            .drain()
            .into_iter()
            .map(|completion| self.resolve(registry, completion))
            .collect()
    }

    /// Waits up to `timeout` for one finished insert, then resolves it and everything else queued.
    pub fn pump_blocking<S: GalleryStore>(
        &mut self,
        registry: &mut GalleryRegistry<S>,
        timeout: Duration,
    ) -> Vec<InsertResolution> {
        let Some(first) = self.queue.recv_timeout(timeout) else {
            return Vec::new();
        };
        let mut resolved = vec![self.resolve(registry, first)];
        resolved.extend(self.pump(registry));
        resolved
    }

    fn resolve<S: GalleryStore>(
        &mut self,
        registry: &mut GalleryRegistry<S>,
        completion: InsertCompletion,
    ) -> InsertResolution {
        self.pending = self.pending.saturating_sub(1);
        let InsertCompletion {
            gallery,
            handle,
            url,
            result,
        } = completion;

        let entry = match result {
            Ok(ratio) => {
                let ratio = ratio.unwrap_or_else(|| {
                    warn!("Could not read image size of {}, using {}", url, FALLBACK_ASPECT_RATIO);
                    FALLBACK_ASPECT_RATIO
                });
                Entry::new(url, ratio).ok()
            }
            Err(e) => {
                warn!("Dropped image could not be fetched: {}", e);
                None
            }
        };

        let resolution = match entry {
            Some(entry) => registry
                .edit_entries(gallery, |entries| entries.commit_async_insert(handle, entry))
                .ok()
                .flatten()
                .map(|index| InsertResolution::Committed { gallery, index }),
            None => registry
                .edit_entries(gallery, |entries| entries.abort_async_insert(handle))
                .ok()
                .filter(|removed| *removed)
                .map(|_| InsertResolution::Aborted { gallery }),
        };

        match resolution {
            Some(resolution) => {
                info!("Insert {:?} resolved: {:?}", handle, resolution);
                resolution
            }
            None => {
                debug!("Insert {:?} had nothing left to resolve", handle);
                InsertResolution::Dropped
            }
        }
    }
}
