//! # Template Store
//!
//! Named, persisted styling presets: border color and thickness, corner
//! radius and default text styling. Templates deliberately exclude
//! per-instance content: the photo, live text elements and QR stickers
//! never round-trip through a template.
//!
//! The whole collection persists as one JSON array file and is rewritten on
//! every mutation. A corrupt or missing file degrades to an empty
//! collection instead of failing the application.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::assets::AssetStore;
use crate::card::{CardState, EdgeThickness, TextElement};
use crate::color::Color;
use crate::error::TarjetaError;
use crate::render;

/// Thumbnail raster dimensions.
const THUMB_SIZE: (u32, u32) = (120, 80);
/// Characters of default text shown on the thumbnail.
const THUMB_TEXT_LEN: usize = 12;

/// A persisted styling preset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub name: String,
    pub border_color: Color,
    pub border: EdgeThickness,
    pub corner_radius: f32,
    pub background: Color,
    pub default_text_content: String,
    pub default_text_size: f32,
    pub default_text_color: Color,
    /// Base64 PNG preview, rendered at save time.
    #[serde(default)]
    pub thumbnail: Option<String>,
    pub saved_at: DateTime<Utc>,
}

impl Template {
    /// Snapshot a card's styling. Content fields are not copied.
    pub fn from_card(name: &str, card: &CardState) -> Result<Self, TarjetaError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TarjetaError::Validation("template name is empty".to_string()));
        }
        let mut template = Self {
            name: name.to_string(),
            border_color: card.border_color,
            border: card.border,
            corner_radius: card.corner_radius,
            background: card.background,
            default_text_content: card.default_text_content.clone(),
            default_text_size: card.default_text_size,
            default_text_color: card.default_text_color,
            thumbnail: None,
            saved_at: Utc::now(),
        };
        template.thumbnail = template.render_thumbnail().ok();
        Ok(template)
    }

    /// Merge this template's styling into a card, leaving the photo, text
    /// elements and QR stickers untouched.
    pub fn apply_to(&self, card: &CardState) -> CardState {
        let mut next = card.clone();
        next.border_color = self.border_color;
        next.border = self.border;
        next.corner_radius = self.corner_radius.max(0.0);
        next.background = self.background;
        next.default_text_content = self.default_text_content.clone();
        next.default_text_size = self.default_text_size;
        next.default_text_color = self.default_text_color;
        next
    }

    /// Render a miniature of the styling: border, background and the
    /// truncated default text. The live photo and elements never appear.
    fn render_thumbnail(&self) -> Result<String, TarjetaError> {
        let preview_text: String = self
            .default_text_content
            .chars()
            .take(THUMB_TEXT_LEN)
            .collect();
        // Border thickness shrunk in proportion to the miniature size.
        let shrink = |px: f32| (px / 4.0).min(THUMB_SIZE.1 as f32 / 4.0);
        let card = CardState {
            border_color: self.border_color,
            border: EdgeThickness {
                top: shrink(self.border.top),
                bottom: shrink(self.border.bottom),
                left: shrink(self.border.left),
                right: shrink(self.border.right),
            },
            corner_radius: self.corner_radius / 4.0,
            background: self.background,
            texts: vec![TextElement {
                id: "thumb".to_string(),
                x: 10.0,
                y: 30.0,
                content: preview_text,
                font_size: 12.0,
                font_family: "small".to_string(),
                color: self.default_text_color,
                bold: false,
            }],
            ..CardState::default()
        };
        let img = render::render_card(&card, &AssetStore::new(), THUMB_SIZE.0, THUMB_SIZE.1)?;
        Ok(BASE64.encode(render::to_png(&img)?))
    }
}

/// Disk-backed template collection.
#[derive(Debug)]
pub struct TemplateStore {
    path: PathBuf,
    templates: Vec<Template>,
}

impl TemplateStore {
    /// Open a store at `path`. Missing or corrupt data yields an empty
    /// collection; this is a recovery path, not an error.
    pub fn open(path: PathBuf) -> Self {
        let templates = match std::fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<Vec<Template>>(&bytes) {
                Ok(templates) => templates,
                Err(e) => {
                    println!(
                        "[templates] Ignoring corrupt collection at {}: {}",
                        path.display(),
                        e
                    );
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        };
        Self { path, templates }
    }

    pub fn list(&self) -> &[Template] {
        &self.templates
    }

    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.name == name)
    }

    /// Upsert by name and rewrite the whole collection.
    pub fn save(&mut self, template: Template) -> Result<(), TarjetaError> {
        match self.templates.iter_mut().find(|t| t.name == template.name) {
            Some(existing) => *existing = template,
            None => self.templates.push(template),
        }
        self.persist()
    }

    /// Remove by name; returns whether anything was deleted. The thumbnail
    /// is discarded with the entry.
    pub fn delete(&mut self, name: &str) -> Result<bool, TarjetaError> {
        let before = self.templates.len();
        self.templates.retain(|t| t.name != name);
        let deleted = self.templates.len() != before;
        if deleted {
            self.persist()?;
        }
        Ok(deleted)
    }

    fn persist(&self) -> Result<(), TarjetaError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec_pretty(&self.templates)
            .map_err(|e| TarjetaError::Print(format!("template serialization failed: {}", e)))?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}
