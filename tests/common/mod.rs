#![allow(dead_code)]

use photo_gallery_core::FetchError;
use photo_gallery_core::image_loader::ImageSource;
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Mutex;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

pub const WAIT: Duration = Duration::from_secs(10);

pub type Release = Sender<Result<Vec<u8>, FetchError>>;

/// Source whose fetches block until the test releases them.
#[derive(Default)]
pub struct GatedSource {
    gates: Mutex<HashMap<String, Receiver<Result<Vec<u8>, FetchError>>>>,
}

impl GatedSource {
    /// Registers a gate for `url`; the returned sender decides what the fetch yields.
    pub fn gate(&self, url: &str) -> Release {
        let (tx, rx) = mpsc::channel();
        self.gates.lock().unwrap().insert(url.to_string(), rx);
        tx
    }
}

impl ImageSource for GatedSource {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let gate = self.gates.lock().unwrap().remove(url);
        match gate {
            Some(rx) => rx
                .recv()
                .unwrap_or_else(|_| Err(FetchError::Worker("gate dropped".to_string()))),
            None => Err(FetchError::InvalidUrl(format!("no gate for {}", url))),
        }
    }
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::new(width, height);
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}
