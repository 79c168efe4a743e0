//! # HTTP Server for the Card Editor
//!
//! Serves the editor frontend and the JSON API driving it: layout and card
//! mutations, photo uploads, PNG previews, printing and templates.
//!
//! ## Usage
//!
//! ```bash
//! tarjeta serve --listen 0.0.0.0:8080 --spool ./spool
//! ```
//!
//! Then open http://localhost:8080 in a browser to start editing.

mod handlers;
mod state;
mod static_files;

pub use state::ServerConfig;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
};
use std::sync::Arc;

use crate::error::TarjetaError;
use state::AppState;

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use tarjeta::server::{ServerConfig, serve};
///
/// # async fn example() -> Result<(), tarjeta::error::TarjetaError> {
/// let config = ServerConfig {
///     listen_addr: "0.0.0.0:8080".to_string(),
///     spool_dir: "./spool".into(),
///     template_path: "./templates.json".into(),
/// };
///
/// serve(config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig) -> Result<(), TarjetaError> {
    let app_state = Arc::new(AppState::new(config.clone()));

    let app = Router::new()
        // Frontend
        .route("/", get(static_files::index_handler))
        .route("/assets/*path", get(static_files::asset_handler))
        // Editor state API
        .route("/api/state", get(handlers::cards::state))
        .route("/api/layout", put(handlers::cards::set_layout))
        .route("/api/active", put(handlers::cards::select))
        .route("/api/margins", put(handlers::cards::set_margins))
        // Card API
        .route("/api/card/update", post(handlers::cards::update))
        .route("/api/card/qr", post(handlers::cards::add_qr))
        .route("/api/card/:slot/preview", get(handlers::preview::card))
        // Photo API (50MB limit for uploads)
        .route(
            "/api/photo/upload",
            post(handlers::photo::upload).layer(DefaultBodyLimit::max(50 * 1024 * 1024)),
        )
        // Preview and print API
        .route("/api/preview", get(handlers::preview::combined))
        .route("/api/print", post(handlers::print::print))
        // Template API
        .route(
            "/api/templates",
            get(handlers::templates::list).post(handlers::templates::save),
        )
        .route("/api/templates/:name", delete(handlers::templates::delete))
        .route("/api/templates/:name/apply", post(handlers::templates::apply))
        .with_state(app_state);

    println!("Tarjeta HTTP server starting...");
    println!("Listening on: {}", config.listen_addr);
    println!("Spool directory: {}", config.spool_dir.display());
    println!("Template file: {}", config.template_path.display());
    println!();
    println!(
        "Open http://{}/ in your browser to edit cards",
        config.listen_addr
    );
    println!();

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| {
            TarjetaError::Print(format!("Failed to bind to {}: {}", config.listen_addr, e))
        })?;

    axum::serve(listener, app)
        .await
        .map_err(|e| TarjetaError::Print(format!("Server error: {}", e)))?;

    Ok(())
}
