//! # Tarjeta - Printable Photo-Card Editor
//!
//! Tarjeta is a Rust library and server for laying out photo cards and
//! compositing them into printable sheets. It provides:
//!
//! - **Card state**: pure, copy-on-write edits per card slot
//! - **Layout**: single, two-up and four-up grid arrangements
//! - **Rendering**: rounded-rect clipped photos, bitmap text and QR stickers
//! - **Composition**: concurrent high-resolution captures merged onto one page
//! - **Templates**: persisted styling presets with thumbnails
//!
//! ## Quick Start
//!
//! ```no_run
//! use tarjeta::{
//!     assets::AssetStore,
//!     card::CardUpdate,
//!     compose,
//!     layout::{LayoutMode, PRINT_MULTIPLIER, Workspace},
//! };
//!
//! # async fn example() -> Result<(), tarjeta::TarjetaError> {
//! // Build an editor workspace
//! let mut workspace = Workspace::new();
//! let mut assets = AssetStore::new();
//! workspace.set_mode(LayoutMode::TwoUp);
//!
//! // Place an uploaded photo on the active card
//! let photo = tarjeta::assets::decode_upload(&std::fs::read("photo.jpg")?)?;
//! let asset = assets.insert(photo);
//! workspace.dispatch(CardUpdate::SetImage { asset })?;
//!
//! // Capture every active card at print resolution and combine them
//! let job = compose::prepare(workspace, assets, PRINT_MULTIPLIER).await?;
//! job.image.save("sheet.png").unwrap();
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`card`] | Per-card editable state and pure update application |
//! | [`layout`] | Layout modes, slot routing and canvas partitioning |
//! | [`render`] | Card rasterization: clipping, photos, text, QR |
//! | [`compose`] | Print capture, composition and spooling |
//! | [`templates`] | Persisted styling presets |
//! | [`server`] | HTTP editor server |
//! | [`error`] | Error types |

pub mod assets;
pub mod card;
pub mod color;
pub mod compose;
pub mod error;
pub mod layout;
pub mod qr;
pub mod render;
pub mod server;
pub mod templates;

// Re-exports for convenience
pub use error::TarjetaError;
pub use layout::{LayoutMode, Slot, Workspace};
