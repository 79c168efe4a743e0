//! Server state and configuration.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;

use crate::assets::AssetStore;
use crate::compose::SpoolPrinter;
use crate::layout::Workspace;
use crate::templates::TemplateStore;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub listen_addr: String,
    /// Directory finished print jobs are spooled into.
    pub spool_dir: PathBuf,
    /// Path of the persisted template collection.
    pub template_path: PathBuf,
}

/// Application state shared across handlers.
pub struct AppState {
    pub config: ServerConfig,
    /// Unix timestamp of server boot for cache busting.
    pub boot_time: u64,
    /// The live editor state. Handlers take the write lock only for the
    /// duration of a dispatch; captures work on owned snapshots.
    pub workspace: RwLock<Workspace>,
    pub assets: RwLock<AssetStore>,
    pub templates: RwLock<TemplateStore>,
    pub printer: SpoolPrinter,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let boot_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();
        let templates = TemplateStore::open(config.template_path.clone());
        let printer = SpoolPrinter::new(config.spool_dir.clone());
        Self {
            config,
            boot_time,
            workspace: RwLock::new(Workspace::new()),
            assets: RwLock::new(AssetStore::new()),
            templates: RwLock::new(templates),
            printer,
        }
    }
}
