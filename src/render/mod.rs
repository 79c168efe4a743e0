//! # Card Rasterization
//!
//! Renders one card's state onto an RGBA pixel buffer, back to front:
//! background → border → rounded-clipped image → text → QR stickers.
//!
//! ```text
//! CardState + AssetStore → render_card() → RgbaImage → PNG bytes
//! ```
//!
//! The same renderer serves the interactive preview (1x) and the print
//! capture (3x); only the target pixel size differs.

mod card;
pub mod rounded;
pub mod text;

pub use card::{fit_size, render_card};

use image::RgbaImage;

use crate::error::TarjetaError;

/// Encode a rendered surface as PNG bytes.
pub fn to_png(img: &RgbaImage) -> Result<Vec<u8>, TarjetaError> {
    let mut buf = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| TarjetaError::Image(format!("Failed to encode PNG: {}", e)))?;
    Ok(buf)
}
