//! Fetching image bytes for a url.
//!
//! Decoding is not done here; the only thing read out of the bytes is the
//! image size, used to give dropped entries their aspect ratio.

use crate::error::FetchError;
use log::debug;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;
use url::Url;

/// Fetched, undecoded image content.
pub type ImageBytes = Arc<Vec<u8>>;

/// "GET bytes from url" capability. Called from worker threads.
pub trait ImageSource: Send + Sync + 'static {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Reads `file://` urls and plain filesystem paths.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileSource;

impl ImageSource for FileSource {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let path = resolve_path(url)?;
        let bytes = std::fs::read(&path)?;
        debug!("Read {} bytes from {}", bytes.len(), path.display());
        Ok(bytes)
    }
}

/// Maps a url to a local path.
fn resolve_path(url: &str) -> Result<PathBuf, FetchError> {
    match Url::parse(url) {
        Ok(parsed) if parsed.scheme() == "file" => parsed
            .to_file_path()
            .map_err(|_| FetchError::InvalidUrl(format!("not a local file url: {}", url))),
        Ok(parsed) => Err(FetchError::InvalidUrl(format!(
            "unsupported scheme '{}' in {}",
            parsed.scheme(),
            url
        ))),
        Err(url::ParseError::RelativeUrlWithoutBase) => Ok(PathBuf::from(url)),
        Err(e) => Err(e.into()),
    }
}

/// Width / height of the image encoded in `bytes`, if its header can be read.
pub fn probe_aspect_ratio(bytes: &[u8]) -> Option<f64> {
    let (width, height) = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()?;

    if width == 0 || height == 0 {
        return None;
    }
    Some(width as f64 / height as f64)
}
