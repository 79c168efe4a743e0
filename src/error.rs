//! # Error Types
//!
//! This module defines error types used throughout the tarjeta library.

use thiserror::Error;

use crate::layout::Slot;

/// Main error type for tarjeta operations
#[derive(Debug, Error)]
pub enum TarjetaError {
    /// User input rejected before any state was touched
    #[error("Validation error: {0}")]
    Validation(String),

    /// QR payload could not be encoded
    #[error("QR error: {0}")]
    Qr(String),

    /// Image decoding or processing error
    #[error("Image error: {0}")]
    Image(String),

    /// Card rasterization error
    #[error("Render error: {0}")]
    Render(String),

    /// A card surface was not captured when the compositor needed it
    #[error("Surface for slot {0} is not ready")]
    SurfaceNotReady(Slot),

    /// Print job preparation or submission failure
    #[error("Print error: {0}")]
    Print(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
