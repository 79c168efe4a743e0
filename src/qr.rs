//! QR sticker rasterization.
//!
//! Payloads are encoded once at a fixed high error-correction level and a
//! fixed pixel width, independent of the sticker's later on-canvas display
//! size. The resulting raster is stored in the asset store and referenced
//! by the card's `QrElement`.

use image::{DynamicImage, Rgba, RgbaImage};
use qrcode::{EcLevel, QrCode};

use crate::error::TarjetaError;

/// Encoded raster width in pixels (modules are integer-scaled up to this).
pub const QR_PIXEL_WIDTH: u32 = 240;

/// Encode a payload into a square black-on-white raster.
///
/// Empty payloads are a validation failure, surfaced before any state is
/// mutated; encoder rejections (payload too long for EC level H) are
/// reported as `Qr` errors.
pub fn encode(data: &str) -> Result<DynamicImage, TarjetaError> {
    if data.trim().is_empty() {
        return Err(TarjetaError::Validation("QR payload is empty".to_string()));
    }

    let code = QrCode::with_error_correction_level(data, EcLevel::H)
        .map_err(|e| TarjetaError::Qr(format!("QR encoding failed: {}", e)))?;

    let modules = code.width();
    let cell = (QR_PIXEL_WIDTH as usize / modules).max(1);
    let size = (modules * cell) as u32;

    let mut img = RgbaImage::from_pixel(size, size, Rgba([255, 255, 255, 255]));
    for qy in 0..modules {
        for qx in 0..modules {
            if code[(qx, qy)] != qrcode::Color::Dark {
                continue;
            }
            for cy in 0..cell {
                for cx in 0..cell {
                    img.put_pixel(
                        (qx * cell + cx) as u32,
                        (qy * cell + cy) as u32,
                        Rgba([0, 0, 0, 255]),
                    );
                }
            }
        }
    }

    Ok(DynamicImage::ImageRgba8(img))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_produces_square_raster() {
        let img = encode("https://example.com").unwrap();
        assert_eq!(img.width(), img.height());
        assert!(img.width() <= QR_PIXEL_WIDTH);
        assert!(img.width() > 0);
    }

    #[test]
    fn encode_rejects_empty_payload() {
        assert!(matches!(encode(""), Err(TarjetaError::Validation(_))));
        assert!(matches!(encode("   "), Err(TarjetaError::Validation(_))));
    }

    #[test]
    fn encode_has_dark_and_light_modules() {
        let img = encode("hello").unwrap().to_rgba8();
        let mut dark = 0usize;
        let mut light = 0usize;
        for p in img.pixels() {
            if p.0[0] == 0 {
                dark += 1;
            } else {
                light += 1;
            }
        }
        assert!(dark > 0 && light > 0);
    }
}
