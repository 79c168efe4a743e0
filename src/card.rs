//! # Per-Card Editor State
//!
//! The editable data model for one card: image placement, border and corner
//! styling, free-text annotations and QR stickers.
//!
//! All mutations go through [`apply_update`], a pure function from the
//! current state and a [`CardUpdate`] to a new state. Callers replace the
//! whole card entry with the result (copy-on-write per slot); nothing here
//! mutates in place, which keeps the routing layer's "only the active slot
//! changes" contract trivial to uphold.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::color::Color;
use crate::error::TarjetaError;

/// Per-edge border thickness in pixels.
///
/// A single uniform thickness is the degenerate case where all four edges
/// are equal; the per-edge model is the canonical superset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct EdgeThickness {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl EdgeThickness {
    pub fn uniform(px: f32) -> Self {
        let px = px.max(0.0);
        Self {
            top: px,
            bottom: px,
            left: px,
            right: px,
        }
    }

    fn clamped(self) -> Self {
        Self {
            top: self.top.max(0.0),
            bottom: self.bottom.max(0.0),
            left: self.left.max(0.0),
            right: self.right.max(0.0),
        }
    }
}

/// A draggable text annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub content: String,
    pub font_size: f32,
    pub font_family: String,
    pub color: Color,
    pub bold: bool,
}

/// A draggable QR sticker. The encoded raster lives in the asset store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QrElement {
    pub id: String,
    pub x: f32,
    pub y: f32,
    /// On-canvas display size (square), independent of the encoded width.
    pub size: f32,
    /// The payload string that was encoded.
    pub data: String,
    /// Asset id of the encoded raster.
    pub asset: Uuid,
}

/// The background photo and its user transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CardImage {
    pub asset: Uuid,
    /// User zoom on top of the aspect-preserving fit. Clamped positive.
    pub scale: f32,
    /// Degrees, wraps into [0, 360).
    pub rotation: f32,
    /// Manual drag displacement from the fitted center. Reset on re-fit.
    pub offset_x: f32,
    pub offset_y: f32,
}

fn default_font_size() -> f32 {
    20.0
}

fn default_font_family() -> String {
    "plex".to_string()
}

fn default_text_content() -> String {
    "Your text".to_string()
}

/// One card's complete editable state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardState {
    pub image: Option<CardImage>,
    pub background: Color,
    pub border_color: Color,
    pub border: EdgeThickness,
    /// Non-negative; clamped on every update.
    pub corner_radius: f32,
    pub texts: Vec<TextElement>,
    pub qr_stickers: Vec<QrElement>,
    /// Template values seeding the next-created text element.
    #[serde(default = "default_text_content")]
    pub default_text_content: String,
    #[serde(default = "default_font_size")]
    pub default_text_size: f32,
    pub default_text_color: Color,
    /// Monotonic counter feeding element id generation. Never decremented,
    /// so ids are unique within the card and never reused after deletion.
    pub element_seq: u64,
}

impl Default for CardState {
    fn default() -> Self {
        Self {
            image: None,
            background: Color::WHITE,
            border_color: Color::BLACK,
            border: EdgeThickness::default(),
            corner_radius: 0.0,
            texts: Vec::new(),
            qr_stickers: Vec::new(),
            default_text_content: default_text_content(),
            default_text_size: default_font_size(),
            default_text_color: Color::BLACK,
            element_seq: 0,
        }
    }
}

impl CardState {
    /// Scale every pixel-denominated field by `factor`.
    ///
    /// Used when rasterizing at a resolution multiplier: the capture must
    /// be the same card, larger, so positions, border, radius, text and
    /// sticker sizes all grow together. The user zoom is unitless and is
    /// left alone.
    pub fn scaled(&self, factor: f32) -> CardState {
        let mut card = self.clone();
        card.border = EdgeThickness {
            top: card.border.top * factor,
            bottom: card.border.bottom * factor,
            left: card.border.left * factor,
            right: card.border.right * factor,
        };
        card.corner_radius *= factor;
        if let Some(img) = card.image.as_mut() {
            img.offset_x *= factor;
            img.offset_y *= factor;
        }
        for text in &mut card.texts {
            text.x *= factor;
            text.y *= factor;
            text.font_size *= factor;
        }
        for qr in &mut card.qr_stickers {
            qr.x *= factor;
            qr.y *= factor;
            qr.size *= factor;
        }
        card
    }
}

/// A single edit routed to the active card.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum CardUpdate {
    SetImage { asset: Uuid },
    ClearImage,
    SetScale { scale: f32 },
    SetRotation { degrees: f32 },
    MoveImage { dx: f32, dy: f32 },
    SetBackground { color: Color },
    SetBorderColor { color: Color },
    SetBorderThickness { thickness: EdgeThickness },
    SetUniformBorder { px: f32 },
    SetCornerRadius { px: f32 },
    AddText(AddText),
    EditText { id: String, content: String },
    RemoveText { id: String },
    AddQr(AddQr),
    RemoveQr { id: String },
    MoveElement { id: String, x: f32, y: f32 },
    SetTextDefaults(TextDefaults),
    ClearCard,
}

/// Payload for `AddText`; omitted fields fall back to the card's defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddText {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub font_size: Option<f32>,
    #[serde(default)]
    pub font_family: Option<String>,
    #[serde(default)]
    pub color: Option<Color>,
    #[serde(default)]
    pub bold: bool,
}

/// Payload for `AddQr`. The handler encodes the payload and registers the
/// raster asset before dispatching; state only records the reference.
#[derive(Debug, Clone, Deserialize)]
pub struct AddQr {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub data: String,
    pub asset: Uuid,
}

/// New default styling for future text elements.
#[derive(Debug, Clone, Deserialize)]
pub struct TextDefaults {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub font_size: Option<f32>,
    #[serde(default)]
    pub color: Option<Color>,
}

/// Generate the next element id: monotonic count plus a time-based salt,
/// collision-free even under rapid successive additions.
fn next_element_id(seq: u64) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    format!("{}-{}", seq, millis)
}

/// Apply one update to a card, producing the new state.
///
/// Pure: the input card is only read. Validation failures leave the caller's
/// state untouched by construction.
pub fn apply_update(card: &CardState, update: CardUpdate) -> Result<CardState, TarjetaError> {
    let mut next = card.clone();
    match update {
        CardUpdate::SetImage { asset } => {
            // Fresh image: re-fit discards any previous drag offset.
            next.image = Some(CardImage {
                asset,
                scale: 1.0,
                rotation: 0.0,
                offset_x: 0.0,
                offset_y: 0.0,
            });
        }
        CardUpdate::ClearImage => next.image = None,
        CardUpdate::SetScale { scale } => {
            if scale <= 0.0 {
                return Err(TarjetaError::Validation(format!(
                    "scale must be positive, got {}",
                    scale
                )));
            }
            if let Some(img) = next.image.as_mut() {
                img.scale = scale;
            }
        }
        CardUpdate::SetRotation { degrees } => {
            if let Some(img) = next.image.as_mut() {
                img.rotation = degrees.rem_euclid(360.0);
            }
        }
        CardUpdate::MoveImage { dx, dy } => {
            if let Some(img) = next.image.as_mut() {
                img.offset_x += dx;
                img.offset_y += dy;
            }
        }
        CardUpdate::SetBackground { color } => next.background = color,
        CardUpdate::SetBorderColor { color } => next.border_color = color,
        CardUpdate::SetBorderThickness { thickness } => next.border = thickness.clamped(),
        CardUpdate::SetUniformBorder { px } => next.border = EdgeThickness::uniform(px),
        CardUpdate::SetCornerRadius { px } => next.corner_radius = px.max(0.0),
        CardUpdate::AddText(add) => {
            let id = next_element_id(next.element_seq);
            next.element_seq += 1;
            next.texts.push(TextElement {
                id,
                x: add.x,
                y: add.y,
                content: add.content.unwrap_or_else(|| next.default_text_content.clone()),
                font_size: add.font_size.unwrap_or(next.default_text_size),
                font_family: add.font_family.unwrap_or_else(default_font_family),
                color: add.color.unwrap_or(next.default_text_color),
                bold: add.bold,
            });
        }
        CardUpdate::EditText { id, content } => {
            let Some(text) = next.texts.iter_mut().find(|t| t.id == id) else {
                return Err(TarjetaError::Validation(format!("no text element '{}'", id)));
            };
            text.content = content;
        }
        CardUpdate::RemoveText { id } => next.texts.retain(|t| t.id != id),
        CardUpdate::AddQr(add) => {
            let id = next_element_id(next.element_seq);
            next.element_seq += 1;
            next.qr_stickers.push(QrElement {
                id,
                x: add.x,
                y: add.y,
                size: add.size.max(1.0),
                data: add.data,
                asset: add.asset,
            });
        }
        CardUpdate::RemoveQr { id } => next.qr_stickers.retain(|q| q.id != id),
        CardUpdate::MoveElement { id, x, y } => {
            // Drag-end report: texts and stickers share one id namespace.
            if let Some(text) = next.texts.iter_mut().find(|t| t.id == id) {
                text.x = x;
                text.y = y;
            } else if let Some(qr) = next.qr_stickers.iter_mut().find(|q| q.id == id) {
                qr.x = x;
                qr.y = y;
            } else {
                return Err(TarjetaError::Validation(format!("no element '{}'", id)));
            }
        }
        CardUpdate::SetTextDefaults(defaults) => {
            if let Some(content) = defaults.content {
                next.default_text_content = content;
            }
            if let Some(size) = defaults.font_size {
                next.default_text_size = size.max(1.0);
            }
            if let Some(color) = defaults.color {
                next.default_text_color = color;
            }
        }
        CardUpdate::ClearCard => {
            // Styling defaults are kept; content is dropped. The element
            // counter survives so ids are never reused.
            let seq = next.element_seq;
            next = CardState {
                element_seq: seq,
                ..CardState::default()
            };
        }
    }
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    fn add_text_at(x: f32, y: f32) -> CardUpdate {
        CardUpdate::AddText(AddText {
            x,
            y,
            ..Default::default()
        })
    }

    #[test]
    fn add_text_uses_defaults() {
        let card = CardState {
            default_text_color: Color::parse("#FF0000").unwrap(),
            default_text_size: 20.0,
            default_text_content: "Hello".into(),
            ..CardState::default()
        };
        let card = apply_update(&card, add_text_at(10.0, 20.0)).unwrap();
        assert_eq!(card.texts.len(), 1);
        let t = &card.texts[0];
        assert_eq!(t.content, "Hello");
        assert_eq!(t.font_size, 20.0);
        assert_eq!(t.color, Color::rgb(255, 0, 0));
        assert!(!t.id.is_empty());
    }

    #[test]
    fn element_ids_unique_under_rapid_adds() {
        let mut card = CardState::default();
        for i in 0..50 {
            card = apply_update(&card, add_text_at(i as f32, 0.0)).unwrap();
        }
        for _ in 0..10 {
            card = apply_update(
                &card,
                CardUpdate::AddQr(AddQr {
                    x: 0.0,
                    y: 0.0,
                    size: 60.0,
                    data: "https://example.com".into(),
                    asset: Uuid::new_v4(),
                }),
            )
            .unwrap();
        }
        let ids: HashSet<&str> = card
            .texts
            .iter()
            .map(|t| t.id.as_str())
            .chain(card.qr_stickers.iter().map(|q| q.id.as_str()))
            .collect();
        assert_eq!(ids.len(), 60, "element ids must be pairwise unique");
    }

    #[test]
    fn ids_not_reused_after_deletion() {
        let mut card = CardState::default();
        card = apply_update(&card, add_text_at(0.0, 0.0)).unwrap();
        let first_id = card.texts[0].id.clone();
        card = apply_update(&card, CardUpdate::RemoveText { id: first_id.clone() }).unwrap();
        card = apply_update(&card, add_text_at(0.0, 0.0)).unwrap();
        let first_seq: u64 = first_id.split('-').next().unwrap().parse().unwrap();
        let new_seq: u64 = card.texts[0].id.split('-').next().unwrap().parse().unwrap();
        assert!(new_seq > first_seq);
    }

    #[test]
    fn rotation_wraps() {
        let mut card = CardState::default();
        card = apply_update(&card, CardUpdate::SetImage { asset: Uuid::new_v4() }).unwrap();
        card = apply_update(&card, CardUpdate::SetRotation { degrees: 450.0 }).unwrap();
        assert_eq!(card.image.unwrap().rotation, 90.0);
        card = apply_update(&card, CardUpdate::SetRotation { degrees: -90.0 }).unwrap();
        assert_eq!(card.image.unwrap().rotation, 270.0);
    }

    #[test]
    fn scale_must_be_positive() {
        let card = apply_update(
            &CardState::default(),
            CardUpdate::SetImage { asset: Uuid::new_v4() },
        )
        .unwrap();
        assert!(apply_update(&card, CardUpdate::SetScale { scale: 0.0 }).is_err());
        assert!(apply_update(&card, CardUpdate::SetScale { scale: -1.0 }).is_err());
        let card = apply_update(&card, CardUpdate::SetScale { scale: 2.5 }).unwrap();
        assert_eq!(card.image.unwrap().scale, 2.5);
    }

    #[test]
    fn corner_radius_clamped_non_negative() {
        let card = apply_update(
            &CardState::default(),
            CardUpdate::SetCornerRadius { px: -5.0 },
        )
        .unwrap();
        assert_eq!(card.corner_radius, 0.0);
    }

    #[test]
    fn new_image_discards_drag_offset() {
        let mut card = apply_update(
            &CardState::default(),
            CardUpdate::SetImage { asset: Uuid::new_v4() },
        )
        .unwrap();
        card = apply_update(&card, CardUpdate::MoveImage { dx: 15.0, dy: -4.0 }).unwrap();
        assert_eq!(card.image.unwrap().offset_x, 15.0);
        card = apply_update(&card, CardUpdate::SetImage { asset: Uuid::new_v4() }).unwrap();
        let img = card.image.unwrap();
        assert_eq!((img.offset_x, img.offset_y), (0.0, 0.0));
        assert_eq!(img.scale, 1.0);
    }

    #[test]
    fn move_element_reaches_both_collections() {
        let mut card = apply_update(&CardState::default(), add_text_at(1.0, 1.0)).unwrap();
        card = apply_update(
            &card,
            CardUpdate::AddQr(AddQr {
                x: 0.0,
                y: 0.0,
                size: 40.0,
                data: "x".into(),
                asset: Uuid::new_v4(),
            }),
        )
        .unwrap();
        let text_id = card.texts[0].id.clone();
        let qr_id = card.qr_stickers[0].id.clone();
        card = apply_update(&card, CardUpdate::MoveElement { id: text_id, x: 9.0, y: 8.0 }).unwrap();
        card = apply_update(&card, CardUpdate::MoveElement { id: qr_id, x: 7.0, y: 6.0 }).unwrap();
        assert_eq!((card.texts[0].x, card.texts[0].y), (9.0, 8.0));
        assert_eq!((card.qr_stickers[0].x, card.qr_stickers[0].y), (7.0, 6.0));
        assert!(
            apply_update(&card, CardUpdate::MoveElement { id: "missing".into(), x: 0.0, y: 0.0 })
                .is_err()
        );
    }

    #[test]
    fn scaled_grows_pixel_fields_only() {
        let mut card = CardState {
            border: EdgeThickness::uniform(4.0),
            corner_radius: 10.0,
            ..CardState::default()
        };
        card = apply_update(&card, CardUpdate::SetImage { asset: Uuid::new_v4() }).unwrap();
        card = apply_update(&card, CardUpdate::SetScale { scale: 2.0 }).unwrap();
        card = apply_update(&card, CardUpdate::MoveImage { dx: 5.0, dy: 0.0 }).unwrap();
        card = apply_update(&card, add_text_at(10.0, 20.0)).unwrap();

        let big = card.scaled(3.0);
        assert_eq!(big.border, EdgeThickness::uniform(12.0));
        assert_eq!(big.corner_radius, 30.0);
        assert_eq!(big.image.unwrap().offset_x, 15.0);
        // User zoom is unitless and untouched.
        assert_eq!(big.image.unwrap().scale, 2.0);
        assert_eq!((big.texts[0].x, big.texts[0].y), (30.0, 60.0));
        assert_eq!(big.texts[0].font_size, card.texts[0].font_size * 3.0);
    }

    #[test]
    fn apply_is_pure() {
        let card = CardState::default();
        let before = card.clone();
        let _ = apply_update(&card, add_text_at(0.0, 0.0)).unwrap();
        assert_eq!(card, before);
    }
}
