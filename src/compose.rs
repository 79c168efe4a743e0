//! # Print Compositor
//!
//! Produces one combined high-resolution raster for the whole print job:
//! every active card is captured independently (and concurrently) at the
//! print multiplier, then composited into its destination rectangle per the
//! layout geometry. Captures are all-or-nothing; composition never starts
//! until every capture for the job has resolved, and no partial job is ever
//! submitted.
//!
//! The compositor owns the combined raster exclusively; card state and the
//! asset store are read-only to it, so the interactive editor is untouched
//! on both the success and failure paths.

use async_trait::async_trait;
use chrono::Utc;
use image::{Rgba, RgbaImage, imageops, imageops::FilterType};
use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;

use crate::assets::AssetStore;
use crate::error::TarjetaError;
use crate::layout::{
    CanvasMargins, LayoutMode, Page, Rect, Slot, Workspace, destination_rects,
};
use crate::render;

/// Explicit slot → captured-surface handle table.
///
/// Populated as captures resolve; the compositor reads it through
/// [`SurfaceRegistry::require`], which makes the readiness check explicit
/// instead of relying on ambient state.
#[derive(Debug, Default)]
pub struct SurfaceRegistry {
    surfaces: HashMap<Slot, RgbaImage>,
}

impl SurfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, slot: Slot, surface: RgbaImage) {
        self.surfaces.insert(slot, surface);
    }

    pub fn get(&self, slot: Slot) -> Option<&RgbaImage> {
        self.surfaces.get(&slot)
    }

    pub fn require(&self, slot: Slot) -> Result<&RgbaImage, TarjetaError> {
        self.surfaces
            .get(&slot)
            .ok_or(TarjetaError::SurfaceNotReady(slot))
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }
}

/// A fully composited print job, ready for submission.
#[derive(Debug)]
pub struct PrintJob {
    pub image: RgbaImage,
    pub page: Page,
    pub mode: LayoutMode,
}

/// Issue one capture per slot, all before any is awaited, then join them
/// all. Any failure aborts the whole set; no partial registry is returned.
pub async fn capture_all<F, Fut>(slots: &[Slot], capture: F) -> Result<SurfaceRegistry, TarjetaError>
where
    F: Fn(Slot) -> Fut,
    Fut: Future<Output = Result<RgbaImage, TarjetaError>> + Send + 'static,
{
    // Spawn everything first so multi-card layouts capture concurrently.
    let handles: Vec<(Slot, tokio::task::JoinHandle<Result<RgbaImage, TarjetaError>>)> = slots
        .iter()
        .map(|&slot| (slot, tokio::spawn(capture(slot))))
        .collect();

    let mut registry = SurfaceRegistry::new();
    for (slot, handle) in handles {
        let surface = handle
            .await
            .map_err(|e| TarjetaError::Print(format!("capture task for {} failed: {}", slot, e)))??;
        registry.insert(slot, surface);
    }
    Ok(registry)
}

/// Strict readiness check before any capture is issued: every asset a card
/// references must be present. The interactive renderer tolerates missing
/// assets; the print path aborts instead of emitting a blank card.
pub fn verify_ready(
    workspace: &Workspace,
    assets: &AssetStore,
    slots: &[Slot],
) -> Result<(), TarjetaError> {
    for &slot in slots {
        let card = workspace.card(slot);
        if let Some(img) = &card.image {
            if assets.get(img.asset).is_none() {
                return Err(TarjetaError::SurfaceNotReady(slot));
            }
        }
        for qr in &card.qr_stickers {
            if assets.get(qr.asset).is_none() {
                return Err(TarjetaError::SurfaceNotReady(slot));
            }
        }
    }
    Ok(())
}

/// Per-slot destination rectangles at the given resolution multiplier.
fn scaled_rects(
    mode: LayoutMode,
    margins: &CanvasMargins,
    multiplier: u32,
) -> (u32, u32, Vec<(Slot, Rect)>) {
    let (w, h) = mode.canvas_size();
    let canvas = (w * multiplier, h * multiplier);
    let rects = destination_rects(mode, canvas, &margins.scaled(multiplier as f32));
    (canvas.0, canvas.1, rects)
}

/// Composite captured surfaces into the single combined raster.
///
/// Slot order is top-left, top-right, bottom-left, bottom-right; the
/// partition is non-overlapping so order is a simplification, not a
/// correctness requirement.
pub fn composite(
    registry: &SurfaceRegistry,
    mode: LayoutMode,
    margins: &CanvasMargins,
    multiplier: u32,
) -> Result<RgbaImage, TarjetaError> {
    let (canvas_w, canvas_h, rects) = scaled_rects(mode, margins, multiplier);
    let mut combined = RgbaImage::from_pixel(canvas_w, canvas_h, Rgba([255, 255, 255, 255]));

    for (slot, rect) in rects {
        let surface = registry.require(slot)?;
        let dest_w = rect.width.round().max(1.0) as u32;
        let dest_h = rect.height.round().max(1.0) as u32;

        if surface.width() == dest_w && surface.height() == dest_h {
            imageops::overlay(&mut combined, surface, rect.x.round() as i64, rect.y.round() as i64);
        } else {
            // Captures normally match their destination exactly; resize is
            // the fallback for rounding drift.
            let resized = imageops::resize(surface, dest_w, dest_h, FilterType::Lanczos3);
            imageops::overlay(&mut combined, &resized, rect.x.round() as i64, rect.y.round() as i64);
        }
    }

    Ok(combined)
}

/// Prepare the full print job: readiness check, concurrent per-slot capture
/// at the multiplier, then composition.
///
/// Takes owned snapshots so the captures can move across threads; the live
/// editor state is never touched.
pub async fn prepare(
    workspace: Workspace,
    assets: AssetStore,
    multiplier: u32,
) -> Result<PrintJob, TarjetaError> {
    let mode = workspace.mode;
    let margins = workspace.margins;
    let slots = mode.active_slots();
    verify_ready(&workspace, &assets, slots)?;

    let (_, _, rects) = scaled_rects(mode, &margins, multiplier);
    let sizes: HashMap<Slot, (u32, u32)> = rects
        .iter()
        .map(|(slot, r)| {
            (
                *slot,
                (r.width.round().max(1.0) as u32, r.height.round().max(1.0) as u32),
            )
        })
        .collect();

    let workspace = std::sync::Arc::new(workspace);
    let assets = std::sync::Arc::new(assets);

    let registry = capture_all(slots, |slot| {
        let workspace = workspace.clone();
        let assets = assets.clone();
        let (w, h) = sizes[&slot];
        async move {
            // Styling and element geometry grow with the capture.
            let card = workspace.card(slot).scaled(multiplier as f32);
            tokio::task::spawn_blocking(move || render::render_card(&card, &assets, w, h))
            .await
            .map_err(|e| TarjetaError::Print(format!("render task failed: {}", e)))?
        }
    })
    .await?;

    let image = composite(&registry, mode, &margins, multiplier)?;
    Ok(PrintJob {
        image,
        page: mode.page(),
        mode,
    })
}

/// The platform print mechanism seam.
#[async_trait]
pub trait PrintTarget: Send + Sync {
    /// Submit a prepared job; returns an operator-visible job reference.
    async fn submit(&self, job: PrintJob) -> Result<String, TarjetaError>;
}

/// Writes finished jobs as PNG files into a spool directory, one per print
/// request, named by timestamp and page orientation.
#[derive(Debug, Clone)]
pub struct SpoolPrinter {
    dir: PathBuf,
}

impl SpoolPrinter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

#[async_trait]
impl PrintTarget for SpoolPrinter {
    async fn submit(&self, job: PrintJob) -> Result<String, TarjetaError> {
        let stamp = Utc::now().format("%Y%m%d-%H%M%S");
        let orientation = match job.page {
            Page::Landscape => "landscape",
            Page::Portrait => "portrait",
        };
        let path = self.dir.join(format!("tarjeta-{}-{}.png", stamp, orientation));
        let (width, height) = (job.image.width(), job.image.height());

        let dir = self.dir.clone();
        let out = path.clone();
        tokio::task::spawn_blocking(move || -> Result<(), TarjetaError> {
            std::fs::create_dir_all(&dir)?;
            job.image
                .save(&out)
                .map_err(|e| TarjetaError::Print(format!("Failed to write spool file: {}", e)))
        })
        .await
        .map_err(|e| TarjetaError::Print(format!("spool task failed: {}", e)))??;

        println!("[print] Spooled {}x{} job to {}", width, height, path.display());
        Ok(path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{CardUpdate, apply_update};
    use crate::layout::PRINT_MULTIPLIER;
    use std::time::{Duration, Instant};

    fn solid(w: u32, h: u32, color: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba(color))
    }

    fn grid_margins() -> CanvasMargins {
        CanvasMargins {
            top: 10.0,
            bottom: 10.0,
            left: 20.0,
            right: 20.0,
        }
    }

    #[tokio::test]
    async fn captures_run_concurrently_and_join_completely() {
        // One straggler resolving last must not produce a partial result.
        let start = Instant::now();
        let registry = capture_all(LayoutMode::GridLandscape.active_slots(), |slot| async move {
            let delay = if slot == Slot::BottomRight { 80 } else { 20 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(solid(10, 10, [0, 0, 0, 255]))
        })
        .await
        .unwrap();

        assert_eq!(registry.len(), 4, "all four captures present");
        for slot in Slot::ALL {
            assert!(registry.get(slot).is_some());
        }
        // Serial awaiting of sequentially-issued sleeps would take 140ms+.
        assert!(
            start.elapsed() < Duration::from_millis(140),
            "captures must be issued before any is awaited"
        );
    }

    #[tokio::test]
    async fn one_failed_capture_aborts_the_job() {
        let result = capture_all(LayoutMode::TwoUp.active_slots(), |slot| async move {
            if slot == Slot::TopRight {
                Err(TarjetaError::Render("boom".into()))
            } else {
                Ok(solid(10, 10, [0, 0, 0, 255]))
            }
        })
        .await;
        assert!(result.is_err());
    }

    #[test]
    fn composite_requires_every_active_slot() {
        let mut registry = SurfaceRegistry::new();
        registry.insert(Slot::TopLeft, solid(880, 1170, [1, 1, 1, 255]));
        // TopRight missing for TwoUp.
        let err = composite(&registry, LayoutMode::TwoUp, &grid_margins(), PRINT_MULTIPLIER);
        assert!(matches!(err, Err(TarjetaError::SurfaceNotReady(Slot::TopRight))));
    }

    #[test]
    fn composite_places_cards_in_their_quadrants() {
        let mut registry = SurfaceRegistry::new();
        let colors = [
            (Slot::TopLeft, [255, 0, 0, 255]),
            (Slot::TopRight, [0, 255, 0, 255]),
            (Slot::BottomLeft, [0, 0, 255, 255]),
            (Slot::BottomRight, [255, 255, 0, 255]),
        ];
        // Grid landscape, 3x: quadrant size (300-m)*3 per side.
        for (slot, color) in colors {
            let w = (300.0 - 20.0) * 3.0;
            let h = (200.0 - 10.0) * 3.0;
            registry.insert(slot, solid(w as u32, h as u32, color));
        }
        let out = composite(
            &registry,
            LayoutMode::GridLandscape,
            &grid_margins(),
            PRINT_MULTIPLIER,
        )
        .unwrap();
        assert_eq!((out.width(), out.height()), (1800, 1200));

        // Sample the center of each quadrant.
        assert_eq!(out.get_pixel(450, 300).0, [255, 0, 0, 255]);
        assert_eq!(out.get_pixel(1350, 300).0, [0, 255, 0, 255]);
        assert_eq!(out.get_pixel(450, 900).0, [0, 0, 255, 255]);
        assert_eq!(out.get_pixel(1350, 900).0, [255, 255, 0, 255]);
        // Margin strip stays white.
        assert_eq!(out.get_pixel(10, 600).0, [255, 255, 255, 255]);
    }

    #[tokio::test]
    async fn prepare_renders_all_cards_of_a_grid() {
        let mut ws = Workspace::new();
        ws.set_mode(LayoutMode::GridLandscape);
        for slot in Slot::ALL {
            ws.select(slot);
            ws.dispatch(CardUpdate::SetUniformBorder { px: 4.0 }).unwrap();
        }
        let job = prepare(ws, AssetStore::new(), PRINT_MULTIPLIER).await.unwrap();
        assert_eq!((job.image.width(), job.image.height()), (1800, 1200));
        assert_eq!(job.page, Page::Landscape);
    }

    #[tokio::test]
    async fn prepare_aborts_on_missing_asset() {
        let mut ws = Workspace::new();
        ws.dispatch(CardUpdate::SetImage { asset: uuid::Uuid::new_v4() })
            .unwrap();
        let err = prepare(ws, AssetStore::new(), PRINT_MULTIPLIER).await;
        assert!(matches!(err, Err(TarjetaError::SurfaceNotReady(Slot::TopLeft))));
    }

    #[test]
    fn verify_ready_checks_qr_assets_too() {
        let mut ws = Workspace::new();
        let card = apply_update(
            ws.card(Slot::TopLeft),
            CardUpdate::AddQr(crate::card::AddQr {
                x: 0.0,
                y: 0.0,
                size: 40.0,
                data: "x".into(),
                asset: uuid::Uuid::new_v4(),
            }),
        )
        .unwrap();
        ws.replace_card(Slot::TopLeft, card);
        let err = verify_ready(&ws, &AssetStore::new(), &[Slot::TopLeft]);
        assert!(matches!(err, Err(TarjetaError::SurfaceNotReady(Slot::TopLeft))));
    }
}
