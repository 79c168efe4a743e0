//! Template API handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

use crate::templates::Template;

use super::super::state::AppState;
use super::error_reply;

/// GET /api/templates - List saved templates.
pub async fn list(State(state): State<Arc<AppState>>) -> Json<Vec<Template>> {
    let store = state.templates.read().await;
    Json(store.list().to_vec())
}

/// Request body for saving a template.
#[derive(Debug, Deserialize)]
pub struct SaveRequest {
    pub name: String,
}

/// POST /api/templates - Snapshot the active card's styling under a name.
pub async fn save(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SaveRequest>,
) -> Result<Json<Template>, (StatusCode, Json<Value>)> {
    let card = {
        let ws = state.workspace.read().await;
        ws.card(ws.active_slot()).clone()
    };

    // The thumbnail render is CPU work.
    let template = tokio::task::spawn_blocking(move || Template::from_card(&req.name, &card))
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"success": false, "error": format!("Thumbnail task failed: {}", e)})),
            )
        })?
        .map_err(error_reply)?;

    let mut store = state.templates.write().await;
    store.save(template.clone()).map_err(error_reply)?;
    println!("[templates] Saved '{}' ({} total)", template.name, store.list().len());
    Ok(Json(template))
}

/// DELETE /api/templates/:name - Remove a template and its thumbnail.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut store = state.templates.write().await;
    let deleted = store.delete(&name).map_err(error_reply)?;
    if !deleted {
        return Err((
            StatusCode::NOT_FOUND,
            Json(json!({"success": false, "error": format!("No template '{}'", name)})),
        ));
    }
    Ok(Json(json!({"success": true})))
}

/// POST /api/templates/:name/apply - Merge a template's styling into the
/// active card. Content elements are untouched.
pub async fn apply(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let template = {
        let store = state.templates.read().await;
        store.get(&name).cloned().ok_or((
            StatusCode::NOT_FOUND,
            Json(json!({"success": false, "error": format!("No template '{}'", name)})),
        ))?
    };

    let mut ws = state.workspace.write().await;
    let slot = ws.active_slot();
    let styled = template.apply_to(ws.card(slot));
    ws.replace_card(slot, styled);
    Ok(Json(json!({
        "success": true,
        "slot": slot,
        "card": ws.card(slot),
    })))
}
