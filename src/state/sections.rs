//! Live grouped view over the gallery set.
//!
//! Galleries are split into two partitions by their `removed` flag and each
//! partition is ordered by [`OrderingKey`]. Only non-empty partitions become
//! sections, and a section's label comes from its partition, never from its
//! position. Every refresh diffs the previous snapshot against the new one and
//! yields a single [`ChangeBatch`] whose old positions refer to the previous
//! snapshot and whose new positions refer to the new one.

use super::gallery::{Gallery, GalleryId, OrderingKey};
use crate::config::{ACTIVE_SECTION_LABEL, REMOVED_SECTION_LABEL};
use std::collections::HashMap;

/// Bucket a gallery belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Partition {
    Active,
    Removed,
}

impl Partition {
    /// Partition predicate over a gallery.
    pub fn of(gallery: &Gallery) -> Self {
        if gallery.is_removed() {
            Partition::Removed
        } else {
            Partition::Active
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Partition::Active => ACTIVE_SECTION_LABEL,
            Partition::Removed => REMOVED_SECTION_LABEL,
        }
    }
}

/// One gallery as seen by the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct GalleryRow {
    pub id: GalleryId,
    pub title: String,
    pub entry_count: usize,
    revision: u64,
}

/// A non-empty partition.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub partition: Partition,
    pub rows: Vec<GalleryRow>,
}

impl Section {
    pub fn label(&self) -> &'static str {
        self.partition.label()
    }
}

/// Position of a row within a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RowPath {
    pub section: usize,
    pub row: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionChange {
    /// Index in the new snapshot.
    Insert(usize),
    /// Index in the old snapshot.
    Delete(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowChange {
    Insert { new: RowPath },
    Delete { old: RowPath },
    Update { old: RowPath, new: RowPath },
    /// Delete at `old` in the old snapshot and insert at `new` in the new one.
    Move { old: RowPath, new: RowPath },
}

/// Changes between two consecutive snapshots, applied as one unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeBatch {
    pub section_changes: Vec<SectionChange>,
    pub row_changes: Vec<RowChange>,
}

impl ChangeBatch {
    pub fn is_empty(&self) -> bool {
        self.section_changes.is_empty() && self.row_changes.is_empty()
    }
}

/// Builds the section snapshot for a set of galleries.
pub fn build_sections<'a>(galleries: impl IntoIterator<Item = &'a Gallery>) -> Vec<Section> {
    let mut buckets: [Vec<(OrderingKey, GalleryRow)>; 2] = [Vec::new(), Vec::new()];

    for gallery in galleries {
        let row = GalleryRow {
            id: gallery.id(),
            title: gallery.title().to_string(),
            entry_count: gallery.entries().len(),
            revision: gallery.revision(),
        };
        let bucket = match Partition::of(gallery) {
            Partition::Active => 0,
            Partition::Removed => 1,
        };
        buckets[bucket].push((gallery.ordering_key(), row));
    }

    [Partition::Active, Partition::Removed]
        .into_iter()
        .zip(buckets)
        .filter(|(_, rows)| !rows.is_empty())
        .map(|(partition, mut rows)| {
            rows.sort_by_key(|(key, row)| (*key, row.id));
            Section {
                partition,
                rows: rows.into_iter().map(|(_, row)| row).collect(),
            }
        })
        .collect()
}

struct Located<'a> {
    partition: Partition,
    path: RowPath,
    row: &'a GalleryRow,
}

fn locate(sections: &[Section]) -> HashMap<GalleryId, Located<'_>> {
    let mut map = HashMap::new();
    for (section_index, section) in sections.iter().enumerate() {
        for (row_index, row) in section.rows.iter().enumerate() {
            map.insert(
                row.id,
                Located {
                    partition: section.partition,
                    path: RowPath {
                        section: section_index,
                        row: row_index,
                    },
                    row,
                },
            );
        }
    }
    map
}

/// Computes the change batch turning `before` into `after`.
pub fn diff(before: &[Section], after: &[Section]) -> ChangeBatch {
    let mut batch = ChangeBatch::default();

    for (index, section) in before.iter().enumerate() {
        if !after.iter().any(|s| s.partition == section.partition) {
            batch.section_changes.push(SectionChange::Delete(index));
        }
    }
    for (index, section) in after.iter().enumerate() {
        if !before.iter().any(|s| s.partition == section.partition) {
            batch.section_changes.push(SectionChange::Insert(index));
        }
    }

    let old = locate(before);
    let new = locate(after);

    let mut deletes = Vec::new();
    let mut inserts = Vec::new();
    let mut moves = Vec::new();
    let mut updates = Vec::new();

    for (id, was) in &old {
        match new.get(id) {
            None => deletes.push(was.path),
            Some(now) if now.partition != was.partition => moves.push((was.path, now.path)),
            Some(now) if now.row != was.row => updates.push((was.path, now.path)),
            Some(_) => {}
        }
    }
    for (id, now) in &new {
        if !old.contains_key(id) {
            inserts.push(now.path);
        }
    }

    deletes.sort_by(|a, b| b.cmp(a));
    inserts.sort();
    moves.sort();
    updates.sort();

    batch
        .row_changes
        .extend(deletes.into_iter().map(|old| RowChange::Delete { old }));
    batch
        .row_changes
        .extend(inserts.into_iter().map(|new| RowChange::Insert { new }));
    batch
        .row_changes
        .extend(moves.into_iter().map(|(old, new)| RowChange::Move { old, new }));
    batch
        .row_changes
        .extend(updates.into_iter().map(|(old, new)| RowChange::Update { old, new }));

    batch
}

/// Keeps the last published snapshot and turns record changes into batches.
#[derive(Debug, Default)]
pub struct LiveQuery {
    snapshot: Vec<Section>,
}

impl LiveQuery {
    pub fn new<'a>(galleries: impl IntoIterator<Item = &'a Gallery>) -> Self {
        Self {
            snapshot: build_sections(galleries),
        }
    }

    pub fn snapshot(&self) -> &[Section] {
        &self.snapshot
    }

    /// Recomputes the snapshot and returns the batch relative to the previous one.
    pub fn refresh<'a>(&mut self, galleries: impl IntoIterator<Item = &'a Gallery>) -> ChangeBatch {
        let next = build_sections(galleries);
        let batch = diff(&self.snapshot, &next);
        self.snapshot = next;
        batch
    }
}

/// Panics if `batch` addresses a row or section that is not in its snapshot.
#[cfg(test)]
pub(crate) fn assert_paths_valid(batch: &ChangeBatch, before: &[Section], after: &[Section]) {
    let in_snapshot = |sections: &[Section], path: &RowPath| {
        sections
            .get(path.section)
            .is_some_and(|s| path.row < s.rows.len())
    };
    for change in &batch.row_changes {
        match change {
            RowChange::Insert { new } => assert!(in_snapshot(after, new)),
            RowChange::Delete { old } => assert!(in_snapshot(before, old)),
            RowChange::Update { old, new } | RowChange::Move { old, new } => {
                assert!(in_snapshot(before, old));
                assert!(in_snapshot(after, new));
            }
        }
    }
    for change in &batch.section_changes {
        match change {
            SectionChange::Insert(i) => assert!(*i < after.len()),
            SectionChange::Delete(i) => assert!(*i < before.len()),
        }
    }
}
