//! Command-line driver: drops the images given as arguments into a new
//! gallery, fetches each of them through a fetch slot and logs the outcome.

use log::{info, warn};
use photo_gallery_core::config::FETCH_WORKER_THREADS;
use photo_gallery_core::dispatch::worker_pool;
use photo_gallery_core::{
    FetchService, FileSource, GalleryRegistry, ImageSource, InsertService, SlotContent, Transfer,
};
use std::sync::Arc;
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(10);

fn image_args() -> Vec<String> {
    std::env::args()
        .skip(1)
        .filter(|arg| !arg.starts_with('-'))
        .collect()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(debug_assertions)]
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Debug)
        .init();
    #[cfg(not(debug_assertions))]
    env_logger::init();

    let urls = image_args();
    if urls.is_empty() {
        warn!("No images given; usage: photo-gallery <path-or-file-url>...");
        return Ok(());
    }

    let pool = worker_pool(FETCH_WORKER_THREADS)?;
    let source: Arc<dyn ImageSource> = Arc::new(FileSource);
    let mut registry = GalleryRegistry::in_memory();
    let changes = registry.subscribe();
    let mut inserts = InsertService::new(Arc::clone(&pool), Arc::clone(&source));
    let mut fetches = FetchService::new(pool, source);

    let gallery = registry.create()?;
    for url in &urls {
        let end = registry.collection(gallery)?.len();
        inserts.drop_into(&mut registry, gallery, &Transfer::external(url.as_str()), end)?;
    }
    while inserts.pending() > 0 {
        if inserts.pump_blocking(&mut registry, WAIT).is_empty() {
            warn!("Timed out waiting for dropped images");
            break;
        }
    }

    let entries: Vec<_> = registry.collection(gallery)?.entries().cloned().collect();
    let slots: Vec<_> = entries
        .iter()
        .map(|entry| {
            let slot = fetches.create_slot();
            fetches.bind(slot, entry);
            slot
        })
        .collect();
    while fetches.in_flight() > 0 {
        if fetches.pump_blocking(WAIT) == 0 && fetches.in_flight() > 0 {
            warn!("Timed out waiting for image fetches");
            break;
        }
    }

    for (entry, slot) in entries.iter().zip(&slots) {
        let state = match fetches.slot(*slot).map(|s| s.content()) {
            Some(SlotContent::Loaded(bytes)) => format!("{} bytes", bytes.len()),
            Some(SlotContent::Invalid) => "invalid".to_string(),
            _ => "pending".to_string(),
        };
        info!("{} (ratio {:.3}): {}", entry.url(), entry.aspect_ratio(), state);
    }

    let batches = changes.try_iter().count();
    let title = registry.gallery(gallery).map(|g| g.title().to_string()).unwrap_or_default();
    info!(
        "\"{}\" holds {} of {} dropped images ({} change batches)",
        title,
        entries.len(),
        urls.len(),
        batches
    );

    Ok(())
}
