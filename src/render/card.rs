//! One-card rasterization: the Canvas Renderer.
//!
//! Paint order is load-bearing: background first (opaque, so prints never
//! show transparent gaps), then the border frame, then the photo clipped to
//! the rounded inner rect, then text and QR stickers unclipped on top.

use image::{DynamicImage, Rgba, RgbaImage};
use rayon::prelude::*;

use crate::assets::AssetStore;
use crate::card::{CardImage, CardState};
use crate::error::TarjetaError;
use crate::render::rounded::RoundedRect;
use crate::render::text::TextRasterizer;

/// Aspect-preserving "fit inside" policy.
///
/// Width-first: take the full available width and derive height from the
/// image aspect ratio; if that overflows vertically, take the full height
/// instead. Deterministic and idempotent for fixed inputs.
pub fn fit_size(img_w: f32, img_h: f32, avail_w: f32, avail_h: f32) -> (f32, f32) {
    if img_w <= 0.0 || img_h <= 0.0 || avail_w <= 0.0 || avail_h <= 0.0 {
        return (0.0, 0.0);
    }
    let aspect = img_w / img_h;
    let mut width = avail_w;
    let mut height = width / aspect;
    if height > avail_h {
        height = avail_h;
        width = height * aspect;
    }
    (width, height)
}

/// Render a card at the given pixel size.
///
/// The renderer reads state and assets and never mutates either. A missing
/// image asset is skipped here (the interactive preview should not fail);
/// print preparation performs its own strict readiness check first.
pub fn render_card(
    card: &CardState,
    assets: &AssetStore,
    width: u32,
    height: u32,
) -> Result<RgbaImage, TarjetaError> {
    if width == 0 || height == 0 {
        return Err(TarjetaError::Render(format!(
            "card size {}x{} is empty",
            width, height
        )));
    }

    // 1. Opaque background.
    let mut bg = card.background.rgba();
    bg.0[3] = 255;
    let mut img = RgbaImage::from_pixel(width, height, bg);

    // 2. Border frame: four independent edge rectangles.
    draw_border(&mut img, card);

    // 3+4. Rounded clip and the photo inside it.
    let clip = RoundedRect::new(
        card.border.left,
        card.border.top,
        width as f32 - card.border.right,
        height as f32 - card.border.bottom,
        card.corner_radius,
    );
    if let Some(card_image) = &card.image {
        if let Some(photo) = assets.get(card_image.asset) {
            draw_photo(&mut img, &clip, card_image, &photo);
        }
    }

    // 5. Text elements, unclipped, wrapped to the space left of the right edge.
    let mut raster = TextRasterizer::new();
    for text in &card.texts {
        let max_width = (width as f32 - text.x).max(1.0);
        raster.draw(
            &mut img,
            &text.content,
            &text.font_family,
            text.font_size,
            text.color.rgba(),
            text.bold,
            text.x,
            text.y,
            max_width,
        );
    }

    // 6. QR stickers, unclipped, square.
    for qr in &card.qr_stickers {
        if let Some(code) = assets.get(qr.asset) {
            draw_qr(&mut img, &code, qr.x, qr.y, qr.size);
        }
    }

    Ok(img)
}

fn fill_rect(img: &mut RgbaImage, x0: f32, y0: f32, x1: f32, y1: f32, color: Rgba<u8>) {
    let (w, h) = (img.width() as i64, img.height() as i64);
    let x0 = (x0.floor() as i64).clamp(0, w);
    let y0 = (y0.floor() as i64).clamp(0, h);
    let x1 = (x1.ceil() as i64).clamp(0, w);
    let y1 = (y1.ceil() as i64).clamp(0, h);
    for y in y0..y1 {
        for x in x0..x1 {
            img.put_pixel(x as u32, y as u32, color);
        }
    }
}

fn draw_border(img: &mut RgbaImage, card: &CardState) {
    let (w, h) = (img.width() as f32, img.height() as f32);
    let b = card.border;
    let color = card.border_color.rgba();
    if b.top > 0.0 {
        fill_rect(img, 0.0, 0.0, w, b.top, color);
    }
    if b.bottom > 0.0 {
        fill_rect(img, 0.0, h - b.bottom, w, h, color);
    }
    if b.left > 0.0 {
        fill_rect(img, 0.0, 0.0, b.left, h, color);
    }
    if b.right > 0.0 {
        fill_rect(img, w - b.right, 0.0, w, h, color);
    }
}

/// Bilinear sample; `None` outside the source bounds.
fn sample_bilinear(src: &RgbaImage, x: f32, y: f32) -> Option<Rgba<u8>> {
    if x < 0.0 || y < 0.0 || x > src.width() as f32 - 1.0 || y > src.height() as f32 - 1.0 {
        return None;
    }
    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(src.width() - 1);
    let y1 = (y0 + 1).min(src.height() - 1);
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = src.get_pixel(x0, y0);
    let p10 = src.get_pixel(x1, y0);
    let p01 = src.get_pixel(x0, y1);
    let p11 = src.get_pixel(x1, y1);

    let mut out = [0u8; 4];
    for c in 0..4 {
        let top = p00.0[c] as f32 * (1.0 - fx) + p10.0[c] as f32 * fx;
        let bottom = p01.0[c] as f32 * (1.0 - fx) + p11.0[c] as f32 * fx;
        out[c] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    Some(Rgba(out))
}

/// Draw the photo fitted into the clip rect, then transformed by the user
/// scale and rotation about its own center.
///
/// Inverse mapping: every destination pixel inside the clip is mapped back
/// through rotation and scale into photo coordinates and sampled bilinearly.
/// The clip shape itself is unaffected by rotation; only photo content can
/// be cut off by it.
fn draw_photo(img: &mut RgbaImage, clip: &RoundedRect, card_image: &CardImage, photo: &DynamicImage) {
    let src = photo.to_rgba8();
    let (src_w, src_h) = (src.width() as f32, src.height() as f32);
    let (avail_w, avail_h) = (clip.width(), clip.height());
    let (fit_w, _fit_h) = fit_size(src_w, src_h, avail_w, avail_h);
    if fit_w <= 0.0 {
        return;
    }

    // Total source→dest scale: aspect fit times user zoom.
    let scale = (fit_w / src_w) * card_image.scale;
    let (clip_cx, clip_cy) = clip.center();
    let cx = clip_cx + card_image.offset_x;
    let cy = clip_cy + card_image.offset_y;
    let theta = card_image.rotation.to_radians();
    let (sin, cos) = theta.sin_cos();

    let width = img.width() as usize;
    let buf: &mut [u8] = &mut *img;
    buf.par_chunks_mut(width * 4)
        .enumerate()
        .for_each(|(y, row)| {
            let py = y as f32 + 0.5;
            for x in 0..width {
                let px = x as f32 + 0.5;
                let coverage = clip.coverage(px, py);
                if coverage <= 0.0 {
                    continue;
                }

                // Undo translation, rotation, then scale.
                let dx = px - cx;
                let dy = py - cy;
                let ux = (dx * cos + dy * sin) / scale;
                let uy = (-dx * sin + dy * cos) / scale;
                let sx = ux + src_w / 2.0;
                let sy = uy + src_h / 2.0;

                let Some(mut sample) = sample_bilinear(&src, sx, sy) else {
                    continue;
                };
                sample.0[3] = (sample.0[3] as f32 * coverage) as u8;

                let offset = x * 4;
                let mut dst = Rgba([
                    row[offset],
                    row[offset + 1],
                    row[offset + 2],
                    row[offset + 3],
                ]);
                crate::color::blend_over(&mut dst, sample);
                row[offset..offset + 4].copy_from_slice(&dst.0);
            }
        });
}

/// Nearest-neighbor blit of a QR raster into a square of `size` pixels.
fn draw_qr(img: &mut RgbaImage, code: &DynamicImage, x: f32, y: f32, size: f32) {
    let src = code.to_rgba8();
    if src.width() == 0 || size < 1.0 {
        return;
    }
    let (img_w, img_h) = (img.width() as i64, img.height() as i64);
    let out = size.round() as i64;

    for dy in 0..out {
        let py = y as i64 + dy;
        if py < 0 || py >= img_h {
            continue;
        }
        let sy = ((dy as f32 / size) * src.height() as f32) as u32;
        let sy = sy.min(src.height() - 1);
        for dx in 0..out {
            let px = x as i64 + dx;
            if px < 0 || px >= img_w {
                continue;
            }
            let sx = ((dx as f32 / size) * src.width() as f32) as u32;
            let sx = sx.min(src.width() - 1);
            img.put_pixel(px as u32, py as u32, *src.get_pixel(sx, sy));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{AddQr, AddText, CardUpdate, EdgeThickness, apply_update};
    use crate::color::Color;

    fn solid_asset(assets: &mut AssetStore, w: u32, h: u32, color: [u8; 4]) -> uuid::Uuid {
        let img = RgbaImage::from_pixel(w, h, Rgba(color));
        assets.insert(DynamicImage::ImageRgba8(img))
    }

    #[test]
    fn fit_width_limited() {
        // Wide image in a wide slot: width wins.
        assert_eq!(fit_size(200.0, 100.0, 100.0, 100.0), (100.0, 50.0));
    }

    #[test]
    fn fit_height_limited() {
        // Tall image: height wins, width derived.
        assert_eq!(fit_size(100.0, 200.0, 100.0, 100.0), (50.0, 100.0));
    }

    #[test]
    fn fit_is_idempotent() {
        let (w1, h1) = fit_size(1234.0, 777.0, 560.0, 380.0);
        let (w2, h2) = fit_size(1234.0, 777.0, 560.0, 380.0);
        assert_eq!((w1, h1), (w2, h2));
        // Re-fitting the already-fitted size is a fixed point.
        let (w3, h3) = fit_size(w1, h1, 560.0, 380.0);
        assert!((w3 - w1).abs() < 0.01 && (h3 - h1).abs() < 0.01);
    }

    #[test]
    fn border_frame_with_square_inner_corners() {
        let card = CardState {
            border: EdgeThickness::uniform(10.0),
            border_color: Color::rgb(0, 0, 255),
            corner_radius: 0.0,
            ..CardState::default()
        };
        let img = render_card(&card, &AssetStore::new(), 100, 80).unwrap();
        // Border band is filled.
        assert_eq!(img.get_pixel(5, 5).0, [0, 0, 255, 255]);
        assert_eq!(img.get_pixel(99, 40).0, [0, 0, 255, 255]);
        // Inner corner is square: the first interior pixel is background.
        assert_eq!(img.get_pixel(10, 10).0, [255, 255, 255, 255]);
        assert_eq!(img.get_pixel(50, 40).0, [255, 255, 255, 255]);
    }

    #[test]
    fn photo_fills_clip_center() {
        let mut assets = AssetStore::new();
        let asset = solid_asset(&mut assets, 40, 20, [0, 200, 0, 255]);
        let card = apply_update(&CardState::default(), CardUpdate::SetImage { asset }).unwrap();
        let img = render_card(&card, &assets, 200, 100).unwrap();
        assert_eq!(img.get_pixel(100, 50).0, [0, 200, 0, 255]);
    }

    #[test]
    fn rounded_clip_keeps_corners_background() {
        let mut assets = AssetStore::new();
        let asset = solid_asset(&mut assets, 100, 100, [200, 0, 0, 255]);
        let mut card = apply_update(&CardState::default(), CardUpdate::SetImage { asset }).unwrap();
        card = apply_update(&card, CardUpdate::SetCornerRadius { px: 30.0 }).unwrap();
        // Square card so the fitted photo covers the whole clip rect.
        let img = render_card(&card, &assets, 100, 100).unwrap();
        // Corner pixel is outside the rounded clip: stays background.
        assert_eq!(img.get_pixel(1, 1).0, [255, 255, 255, 255]);
        // Center is photo.
        assert_eq!(img.get_pixel(50, 50).0, [200, 0, 0, 255]);
    }

    #[test]
    fn rotation_moves_content_not_clip() {
        let mut assets = AssetStore::new();
        // Half-green / half-blue source to make rotation observable.
        let mut src = RgbaImage::from_pixel(100, 100, Rgba([0, 255, 0, 255]));
        for y in 0..100 {
            for x in 0..50 {
                src.put_pixel(x, y, Rgba([0, 0, 255, 255]));
            }
        }
        let asset = assets.insert(DynamicImage::ImageRgba8(src));
        let mut card = apply_update(&CardState::default(), CardUpdate::SetImage { asset }).unwrap();
        let before = render_card(&card, &assets, 100, 100).unwrap();
        assert_eq!(before.get_pixel(10, 50).0, [0, 0, 255, 255]);

        card = apply_update(&card, CardUpdate::SetRotation { degrees: 180.0 }).unwrap();
        let after = render_card(&card, &assets, 100, 100).unwrap();
        assert_eq!(after.get_pixel(10, 50).0, [0, 255, 0, 255]);
    }

    #[test]
    fn missing_asset_is_skipped_not_fatal() {
        let card = apply_update(
            &CardState::default(),
            CardUpdate::SetImage { asset: uuid::Uuid::new_v4() },
        )
        .unwrap();
        let img = render_card(&card, &AssetStore::new(), 60, 40).unwrap();
        assert_eq!(img.get_pixel(30, 20).0, [255, 255, 255, 255]);
    }

    #[test]
    fn text_and_qr_draw_on_top() {
        let mut assets = AssetStore::new();
        let qr_asset = assets.insert(crate::qr::encode("https://example.com").unwrap());
        let mut card = apply_update(
            &CardState::default(),
            CardUpdate::AddText(AddText {
                x: 5.0,
                y: 5.0,
                content: Some("Hi".into()),
                color: Some(Color::rgb(255, 0, 0)),
                ..Default::default()
            }),
        )
        .unwrap();
        card = apply_update(
            &card,
            CardUpdate::AddQr(AddQr {
                x: 100.0,
                y: 100.0,
                size: 50.0,
                data: "https://example.com".into(),
                asset: qr_asset,
            }),
        )
        .unwrap();
        let img = render_card(&card, &assets, 200, 200).unwrap();
        let reds = img.pixels().filter(|p| p.0 == [255, 0, 0, 255]).count();
        let blacks = img.pixels().filter(|p| p.0 == [0, 0, 0, 255]).count();
        assert!(reds > 0, "text pixels present");
        assert!(blacks > 0, "QR pixels present");
    }

    #[test]
    fn zero_size_is_an_error() {
        assert!(render_card(&CardState::default(), &AssetStore::new(), 0, 10).is_err());
    }
}
