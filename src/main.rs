//! # Tarjeta CLI
//!
//! Command-line interface for the photo-card editor.
//!
//! ## Usage
//!
//! ```bash
//! # Start the editor server
//! tarjeta serve --listen 0.0.0.0:8080
//!
//! # Compose a card sheet offline and save it as a PNG
//! tarjeta compose --mode grid_landscape --photo vacation.jpg --out sheet.png
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use tarjeta::{
    TarjetaError, Workspace, assets,
    card::{AddQr, AddText, CardUpdate},
    compose,
    layout::{LayoutMode, PRINT_MULTIPLIER, Slot},
    qr,
    server::{ServerConfig, serve},
};

/// Tarjeta - Printable photo-card editor
#[derive(Parser, Debug)]
#[command(name = "tarjeta")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the editor HTTP server
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "0.0.0.0:8080")]
        listen: String,

        /// Directory finished print jobs are written into
        #[arg(long, default_value = "./spool")]
        spool: PathBuf,

        /// Path of the template collection file
        #[arg(long, default_value = "./templates.json")]
        templates: PathBuf,
    },

    /// Compose a card sheet offline and write it as a PNG
    Compose {
        /// Layout mode: single, two_up, grid_landscape, grid_portrait
        #[arg(long, default_value = "single")]
        mode: String,

        /// Output PNG path
        #[arg(long, default_value = "tarjeta.png")]
        out: PathBuf,

        /// Photo placed on every active card
        #[arg(long)]
        photo: Option<PathBuf>,

        /// Caption text added to every active card
        #[arg(long)]
        text: Option<String>,

        /// QR payload added to every active card
        #[arg(long)]
        qr: Option<String>,

        /// Uniform border thickness in pixels
        #[arg(long, default_value = "0")]
        border: f32,

        /// Corner radius in pixels
        #[arg(long, default_value = "0")]
        radius: f32,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[tokio::main]
async fn run() -> Result<(), TarjetaError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            listen,
            spool,
            templates,
        } => {
            serve(ServerConfig {
                listen_addr: listen,
                spool_dir: spool,
                template_path: templates,
            })
            .await
        }
        Commands::Compose {
            mode,
            out,
            photo,
            text,
            qr,
            border,
            radius,
        } => compose_to_file(&mode, &out, photo, text, qr, border, radius).await,
    }
}

fn parse_mode(s: &str) -> Result<LayoutMode, TarjetaError> {
    match s {
        "single" => Ok(LayoutMode::Single),
        "two_up" => Ok(LayoutMode::TwoUp),
        "grid_landscape" => Ok(LayoutMode::GridLandscape),
        "grid_portrait" => Ok(LayoutMode::GridPortrait),
        other => Err(TarjetaError::Validation(format!(
            "Unknown layout mode '{}'. Options: single, two_up, grid_landscape, grid_portrait",
            other
        ))),
    }
}

/// Build a workspace from the CLI options, capture it at print resolution
/// and save the combined sheet.
async fn compose_to_file(
    mode: &str,
    out: &PathBuf,
    photo: Option<PathBuf>,
    text: Option<String>,
    qr_data: Option<String>,
    border: f32,
    radius: f32,
) -> Result<(), TarjetaError> {
    let mode = parse_mode(mode)?;
    let mut workspace = Workspace::new();
    let mut store = assets::AssetStore::new();
    workspace.set_mode(mode);

    let photo_asset = match photo {
        Some(path) => {
            let bytes = std::fs::read(&path)?;
            Some(store.insert(assets::decode_upload(&bytes)?))
        }
        None => None,
    };
    let qr_asset = match &qr_data {
        Some(data) => Some(store.insert(qr::encode(data)?)),
        None => None,
    };

    for slot in mode.active_slots() {
        populate_slot(&mut workspace, *slot, photo_asset, &text, &qr_data, qr_asset)?;
        apply_styling(&mut workspace, *slot, border, radius)?;
    }

    println!("Composing {:?} sheet...", mode);
    let job = compose::prepare(workspace, store, PRINT_MULTIPLIER).await?;
    job.image
        .save(out)
        .map_err(|e| TarjetaError::Image(format!("Failed to save PNG: {}", e)))?;
    println!(
        "Saved {}x{} sheet to {}",
        job.image.width(),
        job.image.height(),
        out.display()
    );
    Ok(())
}

fn populate_slot(
    workspace: &mut Workspace,
    slot: Slot,
    photo: Option<uuid::Uuid>,
    text: &Option<String>,
    qr_data: &Option<String>,
    qr_asset: Option<uuid::Uuid>,
) -> Result<(), TarjetaError> {
    workspace.select(slot);
    if let Some(asset) = photo {
        workspace.dispatch(CardUpdate::SetImage { asset })?;
    }
    if let Some(content) = text {
        workspace.dispatch(CardUpdate::AddText(AddText {
            x: 20.0,
            y: 20.0,
            content: Some(content.clone()),
            ..Default::default()
        }))?;
    }
    if let (Some(data), Some(asset)) = (qr_data, qr_asset) {
        workspace.dispatch(CardUpdate::AddQr(AddQr {
            x: 20.0,
            y: 60.0,
            size: 60.0,
            data: data.clone(),
            asset,
        }))?;
    }
    Ok(())
}

fn apply_styling(
    workspace: &mut Workspace,
    slot: Slot,
    border: f32,
    radius: f32,
) -> Result<(), TarjetaError> {
    workspace.select(slot);
    if border > 0.0 {
        workspace.dispatch(CardUpdate::SetUniformBorder { px: border })?;
    }
    if radius > 0.0 {
        workspace.dispatch(CardUpdate::SetCornerRadius { px: radius })?;
    }
    Ok(())
}
