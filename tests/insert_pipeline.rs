mod common;

use common::{GatedSource, WAIT, png_bytes};
use photo_gallery_core::dispatch::worker_pool;
use photo_gallery_core::state::RowChange;
use photo_gallery_core::{
    DropOutcome, Entry, FetchError, FileSource, GalleryRegistry, InsertResolution, InsertService,
    Transfer,
};
use std::sync::Arc;

fn registry_with_entries(n: usize) -> (GalleryRegistry, photo_gallery_core::GalleryId, Vec<Entry>) {
    let mut registry = GalleryRegistry::in_memory();
    let gallery = registry.create().unwrap();
    let entries: Vec<_> = (0..n)
        .map(|i| Entry::new(format!("https://img/{}.jpg", i), 1.0).unwrap())
        .collect();
    let seeded = entries.clone();
    registry
        .edit_collection(gallery, move |c| {
            for (i, entry) in seeded.into_iter().enumerate() {
                let handle = c.begin_async_insert(i).unwrap();
                c.commit_async_insert(handle, entry);
            }
        })
        .unwrap();
    (registry, gallery, entries)
}

#[test]
fn commit_lands_at_placeholder_position_after_move() {
    let source = Arc::new(GatedSource::default());
    let release = source.gate("https://img/new.png");
    let mut service = InsertService::new(worker_pool(1).unwrap(), source.clone());
    let (mut registry, gallery, entries) = registry_with_entries(2);

    let outcome = service
        .drop_into(&mut registry, gallery, &Transfer::external("https://img/new.png"), 0)
        .unwrap();
    let DropOutcome::Pending { handle, .. } = outcome else {
        panic!("external drop must be pending");
    };
    assert_eq!(service.pending(), 1);
    assert_eq!(registry.collection(gallery).unwrap().len(), 3);

    // The user drags the first real entry in front of the placeholder.
    service
        .drop_into(&mut registry, gallery, &Transfer::local(&entries[0], gallery), 0)
        .unwrap();
    assert_eq!(
        registry.collection(gallery).unwrap().placeholder_index(handle),
        Some(1)
    );

    release.send(Ok(png_bytes(40, 20))).unwrap();
    let resolved = service.pump_blocking(&mut registry, WAIT);
    assert_eq!(resolved, [InsertResolution::Committed { gallery, index: 1 }]);

    let collection = registry.collection(gallery).unwrap();
    let inserted = collection.get(1).unwrap().entry().unwrap();
    assert_eq!(inserted.url(), "https://img/new.png");
    assert_eq!(inserted.aspect_ratio(), 2.0);
    assert_eq!(collection.pending_count(), 0);
    assert_eq!(service.pending(), 0);
}

#[test]
fn failed_fetch_removes_placeholder() {
    let source = Arc::new(GatedSource::default());
    let release = source.gate("https://img/broken.png");
    let mut service = InsertService::new(worker_pool(1).unwrap(), source.clone());
    let (mut registry, gallery, _) = registry_with_entries(1);

    service
        .drop_into(&mut registry, gallery, &Transfer::external("https://img/broken.png"), 1)
        .unwrap();
    release
        .send(Err(FetchError::Io("timed out".to_string())))
        .unwrap();

    let resolved = service.pump_blocking(&mut registry, WAIT);
    assert_eq!(resolved, [InsertResolution::Aborted { gallery }]);
    assert_eq!(registry.collection(gallery).unwrap().len(), 1);
}

#[test]
fn undecodable_bytes_commit_with_fallback_ratio() {
    let source = Arc::new(GatedSource::default());
    let release = source.gate("https://img/odd.bin");
    let mut service = InsertService::new(worker_pool(1).unwrap(), source.clone());
    let (mut registry, gallery, _) = registry_with_entries(0);

    service
        .drop_into(&mut registry, gallery, &Transfer::external("https://img/odd.bin"), 0)
        .unwrap();
    release.send(Ok(b"not an image".to_vec())).unwrap();

    let resolved = service.pump_blocking(&mut registry, WAIT);
    assert_eq!(resolved, [InsertResolution::Committed { gallery, index: 0 }]);
    let collection = registry.collection(gallery).unwrap();
    assert_eq!(collection.get(0).unwrap().entry().unwrap().aspect_ratio(), 1.0);
}

#[test]
fn placeholder_removed_by_user_resolves_as_noop() {
    let source = Arc::new(GatedSource::default());
    let release = source.gate("https://img/new.png");
    let mut service = InsertService::new(worker_pool(1).unwrap(), source.clone());
    let (mut registry, gallery, _) = registry_with_entries(1);

    service
        .drop_into(&mut registry, gallery, &Transfer::external("https://img/new.png"), 0)
        .unwrap();
    registry.edit_collection(gallery, |c| c.remove(0)).unwrap().unwrap();

    release.send(Ok(png_bytes(2, 2))).unwrap();
    let resolved = service.pump_blocking(&mut registry, WAIT);
    assert_eq!(resolved, [InsertResolution::Dropped]);
    assert_eq!(registry.collection(gallery).unwrap().len(), 1);
}

#[test]
fn insert_resolves_in_trashed_gallery() {
    let source = Arc::new(GatedSource::default());
    let release = source.gate("https://img/new.png");
    let mut service = InsertService::new(worker_pool(1).unwrap(), source.clone());
    let (mut registry, gallery, _) = registry_with_entries(0);

    service
        .drop_into(&mut registry, gallery, &Transfer::external("https://img/new.png"), 0)
        .unwrap();
    registry.trash(gallery).unwrap();

    release.send(Ok(png_bytes(3, 6))).unwrap();
    let resolved = service.pump_blocking(&mut registry, WAIT);
    assert_eq!(resolved, [InsertResolution::Committed { gallery, index: 0 }]);

    registry.restore(gallery).unwrap();
    let collection = registry.collection(gallery).unwrap();
    assert_eq!(collection.len(), 1);
    assert_eq!(collection.get(0).unwrap().entry().unwrap().aspect_ratio(), 0.5);
}

#[test]
fn insert_for_purged_gallery_is_dropped() {
    let source = Arc::new(GatedSource::default());
    let release = source.gate("https://img/new.png");
    let mut service = InsertService::new(worker_pool(1).unwrap(), source.clone());
    let (mut registry, gallery, _) = registry_with_entries(0);

    service
        .drop_into(&mut registry, gallery, &Transfer::external("https://img/new.png"), 0)
        .unwrap();
    registry.trash(gallery).unwrap();
    registry.purge(gallery).unwrap();

    release.send(Ok(png_bytes(2, 2))).unwrap();
    assert_eq!(
        service.pump_blocking(&mut registry, WAIT),
        [InsertResolution::Dropped]
    );
    assert!(registry.gallery(gallery).is_none());
}

#[test]
fn drop_into_trashed_gallery_is_rejected() {
    let mut service = InsertService::new(worker_pool(1).unwrap(), Arc::new(FileSource));
    let (mut registry, gallery, _) = registry_with_entries(0);
    registry.trash(gallery).unwrap();

    let result = service.drop_into(&mut registry, gallery, &Transfer::external("a.png"), 0);
    assert!(result.is_err());
    assert_eq!(service.pending(), 0);
}

#[test]
fn file_drop_end_to_end_publishes_updates() {
    let dir = std::env::temp_dir().join(format!("gallery-insert-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("wide.png");
    std::fs::write(&path, png_bytes(30, 10)).unwrap();
    let url = url::Url::from_file_path(&path).unwrap().to_string();

    let mut service = InsertService::new(worker_pool(2).unwrap(), Arc::new(FileSource));
    let (mut registry, gallery, _) = registry_with_entries(0);
    let changes = registry.subscribe();

    service
        .drop_into(&mut registry, gallery, &Transfer::external(url.as_str()), 0)
        .unwrap();
    let resolved = service.pump_blocking(&mut registry, WAIT);
    assert_eq!(resolved, [InsertResolution::Committed { gallery, index: 0 }]);

    let collection = registry.collection(gallery).unwrap();
    assert_eq!(collection.get(0).unwrap().entry().unwrap().aspect_ratio(), 3.0);

    let batches: Vec<_> = changes.try_iter().collect();
    assert_eq!(batches.len(), 2);
    assert!(batches
        .iter()
        .all(|b| b.section_changes.is_empty()
            && matches!(b.row_changes[..], [RowChange::Update { .. }])));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn entry_from_another_gallery_is_copied_with_new_identity() {
    let source = Arc::new(GatedSource::default());
    let release = source.gate("https://img/0.jpg");
    let mut service = InsertService::new(worker_pool(1).unwrap(), source.clone());
    let (mut registry, origin, entries) = registry_with_entries(1);
    let target = registry.create().unwrap();

    let outcome = service
        .drop_into(&mut registry, target, &Transfer::local(&entries[0], origin), 0)
        .unwrap();
    assert!(matches!(outcome, DropOutcome::Pending { .. }));

    release.send(Ok(png_bytes(10, 20))).unwrap();
    let resolved = service.pump_blocking(&mut registry, WAIT);
    assert_eq!(resolved, [InsertResolution::Committed { gallery: target, index: 0 }]);

    let copy = registry.collection(target).unwrap().get(0).unwrap().entry().unwrap().clone();
    assert_eq!(copy.url(), entries[0].url());
    assert_ne!(copy.id(), entries[0].id());
    assert_eq!(copy.aspect_ratio(), 0.5);
    assert_eq!(registry.collection(origin).unwrap().index_of(entries[0].id()), Some(0));
}

#[test]
fn rejected_drop_leaves_gallery_untouched() {
    let mut service = InsertService::new(worker_pool(1).unwrap(), Arc::new(FileSource));
    let (mut registry, gallery, entries) = registry_with_entries(1);
    registry
        .edit_collection(gallery, |c| c.remove_by_reference(entries[0].id()))
        .unwrap()
        .unwrap();
    let revision = registry.gallery(gallery).unwrap().revision();
    let changes = registry.subscribe();

    let result = service.drop_into(&mut registry, gallery, &Transfer::local(&entries[0], gallery), 0);
    assert!(result.is_err());
    assert_eq!(registry.gallery(gallery).unwrap().revision(), revision);
    assert!(changes.try_recv().is_err());
    assert_eq!(service.pending(), 0);
}
