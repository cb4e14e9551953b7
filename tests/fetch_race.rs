mod common;

use common::{GatedSource, WAIT};
use photo_gallery_core::dispatch::worker_pool;
use photo_gallery_core::{Entry, FetchError, FetchService, SlotContent};
use std::sync::Arc;

#[test]
fn late_result_of_previous_bind_never_overwrites() {
    let source = Arc::new(GatedSource::default());
    let release_a = source.gate("https://img/a.jpg");
    let release_b = source.gate("https://img/b.jpg");
    let mut service = FetchService::new(worker_pool(2).unwrap(), source.clone());

    let a = Entry::new("https://img/a.jpg", 1.0).unwrap();
    let b = Entry::new("https://img/b.jpg", 1.0).unwrap();
    let slot = service.create_slot();

    assert!(service.bind(slot, &a));
    assert!(service.bind(slot, &b));
    assert_eq!(service.in_flight(), 2);
    assert_eq!(service.slot(slot).unwrap().bound_entry(), Some(b.id()));

    release_b.send(Ok(b"B".to_vec())).unwrap();
    assert_eq!(service.pump_blocking(WAIT), 1);

    release_a.send(Ok(b"A".to_vec())).unwrap();
    assert_eq!(service.pump_blocking(WAIT), 0);

    assert_eq!(service.in_flight(), 0);
    assert_eq!(
        service.slot(slot).unwrap().content(),
        &SlotContent::Loaded(Arc::new(b"B".to_vec()))
    );
}

#[test]
fn stale_failure_does_not_mark_new_bind_invalid() {
    let source = Arc::new(GatedSource::default());
    let release_a = source.gate("https://img/a.jpg");
    let release_b = source.gate("https://img/b.jpg");
    let mut service = FetchService::new(worker_pool(2).unwrap(), source.clone());

    let slot = service.create_slot();
    service.bind(slot, &Entry::new("https://img/a.jpg", 1.0).unwrap());
    service.bind(slot, &Entry::new("https://img/b.jpg", 1.0).unwrap());

    release_a
        .send(Err(FetchError::Io("connection reset".to_string())))
        .unwrap();
    assert_eq!(service.pump_blocking(WAIT), 0);
    assert!(service.slot(slot).unwrap().is_loading());
    assert_eq!(service.slot(slot).unwrap().marker(), None);

    release_b.send(Ok(b"B".to_vec())).unwrap();
    assert_eq!(service.pump_blocking(WAIT), 1);
    assert!(service.slot(slot).unwrap().is_loaded());
}

#[test]
fn failed_fetch_shows_marker_until_rebind() {
    let source = Arc::new(GatedSource::default());
    let release_first = source.gate("https://img/a.jpg");
    let mut service = FetchService::new(worker_pool(1).unwrap(), source.clone());
    let entry = Entry::new("https://img/a.jpg", 1.0).unwrap();
    let slot = service.create_slot();

    service.bind(slot, &entry);
    release_first
        .send(Err(FetchError::Io("404".to_string())))
        .unwrap();
    assert_eq!(service.pump_blocking(WAIT), 1);
    assert_eq!(service.slot(slot).unwrap().content(), &SlotContent::Invalid);
    assert!(service.slot(slot).unwrap().marker().is_some());

    // Nothing retries on its own; a fresh bind does.
    let release_retry = source.gate("https://img/a.jpg");
    service.bind(slot, &entry);
    assert!(service.slot(slot).unwrap().is_loading());
    release_retry.send(Ok(b"A".to_vec())).unwrap();
    assert_eq!(service.pump_blocking(WAIT), 1);
    assert!(service.slot(slot).unwrap().is_loaded());
}

#[test]
fn released_slot_drops_result() {
    let source = Arc::new(GatedSource::default());
    let release = source.gate("https://img/a.jpg");
    let mut service = FetchService::new(worker_pool(1).unwrap(), source.clone());

    let slot = service.create_slot();
    service.bind(slot, &Entry::new("https://img/a.jpg", 1.0).unwrap());
    assert!(service.release_slot(slot));

    release.send(Ok(b"A".to_vec())).unwrap();
    assert_eq!(service.pump_blocking(WAIT), 0);
    assert!(service.slot(slot).is_none());
    assert!(!service.bind(slot, &Entry::new("https://img/a.jpg", 1.0).unwrap()));
}
