//! HTTP handlers for the server.

pub mod cards;
pub mod photo;
pub mod preview;
pub mod print;
pub mod templates;

use axum::Json;
use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::error::TarjetaError;

/// Map a domain error onto an HTTP status and JSON error body.
pub(crate) fn error_reply(e: TarjetaError) -> (StatusCode, Json<Value>) {
    let status = match &e {
        TarjetaError::Validation(_) | TarjetaError::Qr(_) | TarjetaError::Image(_) => {
            StatusCode::BAD_REQUEST
        }
        TarjetaError::SurfaceNotReady(_) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(json!({"success": false, "error": e.to_string()})))
}
