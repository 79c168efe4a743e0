//! PNG preview API handlers.
//!
//! Previews render at screen resolution and tolerate missing assets, so
//! the editor can poll them while an upload is still in flight. The print
//! path is the strict one.

use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::compose::{self, SurfaceRegistry};
use crate::layout::{Slot, destination_rects};
use crate::render;

use super::super::state::AppState;
use super::error_reply;

/// GET /api/card/:slot/preview - Render one card at its on-canvas size.
pub async fn card(
    State(state): State<Arc<AppState>>,
    Path(slot): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, Json<Value>)> {
    let slot = Slot::parse(&slot).ok_or((
        StatusCode::BAD_REQUEST,
        Json(json!({"success": false, "error": format!("Unknown slot '{}'", slot)})),
    ))?;

    // Snapshot under the read lock, render outside it.
    let (card, assets, rect) = {
        let ws = state.workspace.read().await;
        let rect = destination_rects(ws.mode, ws.mode.canvas_size(), &ws.margins)
            .into_iter()
            .find(|(s, _)| *s == slot)
            .map(|(_, r)| r)
            .ok_or((
                StatusCode::NOT_FOUND,
                Json(json!({
                    "success": false,
                    "error": format!("Slot {} is not active in the current layout", slot),
                })),
            ))?;
        let assets = state.assets.read().await.clone();
        (ws.card(slot).clone(), assets, rect)
    };

    let png = tokio::task::spawn_blocking(move || {
        let w = rect.width.round().max(1.0) as u32;
        let h = rect.height.round().max(1.0) as u32;
        let img = render::render_card(&card, &assets, w, h)?;
        render::to_png(&img)
    })
    .await
    .map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"success": false, "error": format!("Render task failed: {}", e)})),
        )
    })?
    .map_err(error_reply)?;

    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}

/// GET /api/preview - Render the combined canvas at screen resolution.
pub async fn combined(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, Json<Value>)> {
    let (workspace, assets) = {
        let ws = state.workspace.read().await;
        let assets = state.assets.read().await.clone();
        (ws.clone(), assets)
    };

    let png = tokio::task::spawn_blocking(move || {
        let mode = workspace.mode;
        let rects = destination_rects(mode, mode.canvas_size(), &workspace.margins);
        let mut registry = SurfaceRegistry::new();
        for (slot, rect) in rects {
            let w = rect.width.round().max(1.0) as u32;
            let h = rect.height.round().max(1.0) as u32;
            let surface = render::render_card(workspace.card(slot), &assets, w, h)?;
            registry.insert(slot, surface);
        }
        let combined = compose::composite(&registry, mode, &workspace.margins, 1)?;
        render::to_png(&combined)
    })
    .await
    .map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"success": false, "error": format!("Render task failed: {}", e)})),
        )
    })?
    .map_err(error_reply)?;

    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}
