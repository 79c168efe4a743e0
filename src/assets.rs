//! In-memory raster asset store.
//!
//! Card state only carries asset ids; the decoded pixels live here, keyed
//! by uuid. Uploaded photos and encoded QR rasters both land in this table,
//! which the renderer reads and never mutates.

use image::{DynamicImage, imageops::FilterType};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::TarjetaError;

/// Largest dimension kept after upload. Covers the print resolution of the
/// biggest card (600 × 3) with headroom for user zoom.
const MAX_UPLOAD_DIM: u32 = 2400;

#[derive(Debug, Clone, Default)]
pub struct AssetStore {
    images: HashMap<Uuid, Arc<DynamicImage>>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, img: DynamicImage) -> Uuid {
        let id = Uuid::new_v4();
        self.images.insert(id, Arc::new(img));
        id
    }

    pub fn get(&self, id: Uuid) -> Option<Arc<DynamicImage>> {
        self.images.get(&id).cloned()
    }

    pub fn remove(&mut self, id: Uuid) {
        self.images.remove(&id);
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Decode an uploaded image and clamp it to a workable size.
///
/// Downscaling at ingest keeps preview rendering fast; Lanczos3 preserves
/// enough detail for the 3x print capture.
pub fn decode_upload(bytes: &[u8]) -> Result<DynamicImage, TarjetaError> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| TarjetaError::Image(format!("Failed to decode image: {}", e)))?;

    let (w, h) = (img.width(), img.height());
    if w == 0 || h == 0 {
        return Err(TarjetaError::Image("image has zero dimension".to_string()));
    }
    if w <= MAX_UPLOAD_DIM && h <= MAX_UPLOAD_DIM {
        return Ok(img);
    }

    let scale = MAX_UPLOAD_DIM as f32 / w.max(h) as f32;
    let nw = ((w as f32 * scale).round() as u32).max(1);
    let nh = ((h as f32 * scale).round() as u32).max(1);
    Ok(img.resize(nw, nh, FilterType::Lanczos3))
}
