//! Application configuration constants.

/// Base title for newly created galleries.
pub const DEFAULT_GALLERY_TITLE: &str = "Untitled";

/// Section label for galleries that are not in the trash.
pub const ACTIVE_SECTION_LABEL: &str = "Active";

/// Section label for trashed galleries.
pub const REMOVED_SECTION_LABEL: &str = "Recently Deleted";

/// Number of fetch worker threads.
pub const FETCH_WORKER_THREADS: usize = 4;

/// Aspect ratio used when dropped bytes cannot be probed as an image.
pub const FALLBACK_ASPECT_RATIO: f64 = 1.0;

/// Text shown by a slot whose fetch failed.
pub const INVALID_CONTENT_MARKER: &str = "Not valid image";
