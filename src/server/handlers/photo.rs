//! Photo upload API handler.

use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
};
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;

use crate::assets;
use crate::card::CardUpdate;
use crate::layout::Slot;

use super::super::state::AppState;
use super::error_reply;

/// Response from the upload endpoint.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub asset: String,
    pub filename: String,
    pub width: u32,
    pub height: u32,
    pub slot: Slot,
}

/// POST /api/photo/upload - Upload a photo and set it on the active card.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, (StatusCode, Json<Value>)> {
    // Extract the image field from multipart
    let mut image_data: Option<Vec<u8>> = None;
    let mut filename = String::from("unknown");

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "error": format!("Multipart error: {}", e)})),
        )
    })? {
        let name = field.name().unwrap_or("").to_string();
        if name == "image" {
            filename = field.file_name().unwrap_or("unknown").to_string();
            let bytes = field.bytes().await.map_err(|e| {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"success": false, "error": format!("Failed to read image: {}", e)})),
                )
            })?;
            image_data = Some(bytes.to_vec());
            break;
        }
    }

    let image_bytes = image_data.ok_or((
        StatusCode::BAD_REQUEST,
        Json(json!({"success": false, "error": "No image field found"})),
    ))?;

    // Decode and clamp on the blocking pool; large JPEGs are slow to decode.
    let img = tokio::task::spawn_blocking(move || assets::decode_upload(&image_bytes))
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"success": false, "error": format!("Decode task failed: {}", e)})),
            )
        })?
        .map_err(error_reply)?;

    let (width, height) = (img.width(), img.height());
    let asset = state.assets.write().await.insert(img);

    let mut ws = state.workspace.write().await;
    let slot = ws
        .dispatch(CardUpdate::SetImage { asset })
        .map_err(error_reply)?;

    println!(
        "[photo] Uploaded {} ({}x{}) onto slot {}",
        filename, width, height, slot
    );

    Ok(Json(UploadResponse {
        success: true,
        asset: asset.to_string(),
        filename,
        width,
        height,
        slot,
    }))
}
