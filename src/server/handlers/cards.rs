//! Editor state and card mutation API handlers.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

use crate::card::{AddQr, CardUpdate};
use crate::layout::{CanvasMargins, LayoutMode, Slot};
use crate::qr;

use super::super::state::AppState;
use super::error_reply;

/// GET /api/state - The complete editor snapshot.
pub async fn state(State(state): State<Arc<AppState>>) -> Json<Value> {
    let ws = state.workspace.read().await;
    let (width, height) = ws.mode.canvas_size();
    Json(json!({
        "workspace": &*ws,
        "active_slot": ws.active_slot(),
        "canvas": {"width": width, "height": height},
        "page": ws.mode.page(),
    }))
}

/// Request body for setting the layout mode.
#[derive(Debug, Deserialize)]
pub struct SetLayoutRequest {
    pub mode: LayoutMode,
}

/// PUT /api/layout - Switch the layout mode.
///
/// Inactive slots keep their state; the selection is re-resolved so edits
/// never route to a slot the new mode hides.
pub async fn set_layout(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SetLayoutRequest>,
) -> Json<Value> {
    let mut ws = state.workspace.write().await;
    ws.set_mode(req.mode);
    let (width, height) = ws.mode.canvas_size();
    Json(json!({
        "success": true,
        "mode": ws.mode,
        "active_slot": ws.active_slot(),
        "canvas": {"width": width, "height": height},
    }))
}

/// Request body for selecting a slot.
#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub slot: Slot,
}

/// PUT /api/active - Select the slot edits route to.
pub async fn select(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SelectRequest>,
) -> Json<Value> {
    let mut ws = state.workspace.write().await;
    ws.select(req.slot);
    Json(json!({"success": true, "active_slot": ws.active_slot()}))
}

/// PUT /api/margins - Set the global canvas margins.
pub async fn set_margins(
    State(state): State<Arc<AppState>>,
    Json(margins): Json<CanvasMargins>,
) -> Json<Value> {
    let mut ws = state.workspace.write().await;
    ws.margins = margins.clamped();
    Json(json!({"success": true, "margins": ws.margins}))
}

/// POST /api/card/update - Apply one edit to the active card.
pub async fn update(
    State(state): State<Arc<AppState>>,
    Json(update): Json<CardUpdate>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut ws = state.workspace.write().await;
    let slot = ws.dispatch(update).map_err(error_reply)?;
    Ok(Json(json!({
        "success": true,
        "slot": slot,
        "card": ws.card(slot),
    })))
}

/// Request body for adding a QR sticker.
#[derive(Debug, Deserialize)]
pub struct AddQrRequest {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub data: String,
}

/// POST /api/card/qr - Encode a payload and add the sticker to the active
/// card.
///
/// The raster is encoded and registered as an asset first; the card only
/// records the reference.
pub async fn add_qr(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddQrRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let raster = qr::encode(&req.data).map_err(error_reply)?;

    let asset = state.assets.write().await.insert(raster);
    let mut ws = state.workspace.write().await;
    let slot = ws
        .dispatch(CardUpdate::AddQr(AddQr {
            x: req.x,
            y: req.y,
            size: req.size,
            data: req.data,
            asset,
        }))
        .map_err(error_reply)?;

    // The new sticker is the last one pushed.
    let sticker = ws.card(slot).qr_stickers.last().cloned();
    Ok(Json(json!({
        "success": true,
        "slot": slot,
        "sticker": sticker,
    })))
}
