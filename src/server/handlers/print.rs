//! Print API handler.

use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::compose::{self, PrintTarget};
use crate::layout::PRINT_MULTIPLIER;

use super::super::state::AppState;
use super::error_reply;

/// POST /api/print - Capture every active card at print resolution,
/// composite and spool the job.
///
/// All-or-nothing: a single card that cannot be captured fails the whole
/// request and nothing is spooled.
pub async fn print(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    // Owned snapshots; the editor stays responsive during the capture.
    let (workspace, assets) = {
        let ws = state.workspace.read().await;
        let assets = state.assets.read().await.clone();
        (ws.clone(), assets)
    };

    let mode = workspace.mode;
    println!(
        "[print] Print request: mode={:?}, {} card(s)",
        mode,
        mode.active_slots().len()
    );

    let job = compose::prepare(workspace, assets, PRINT_MULTIPLIER)
        .await
        .map_err(error_reply)?;

    let (width, height) = (job.image.width(), job.image.height());
    let reference = state.printer.submit(job).await.map_err(error_reply)?;

    Ok(Json(json!({
        "success": true,
        "job": reference,
        "width": width,
        "height": height,
    })))
}
