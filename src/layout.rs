//! # Layout Coordinator
//!
//! Owns the set of per-card states, maps the active layout mode to the
//! number and placement of cards, and routes UI edits to the correct card.
//!
//! The routing rule (which slot receives an edit) is a pure function of
//! (layout mode, selected slot), implemented as [`resolve_active`] so it can
//! be tested in isolation rather than scattered through handlers.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::card::{CardState, CardUpdate, apply_update};
use crate::error::TarjetaError;

/// Logical (screen-resolution) canvas size for landscape layouts.
pub const CANVAS_LANDSCAPE: (u32, u32) = (600, 400);
/// Logical canvas size for portrait layouts.
pub const CANVAS_PORTRAIT: (u32, u32) = (400, 600);
/// Resolution multiplier applied when rasterizing for print.
pub const PRINT_MULTIPLIER: u32 = 3;

/// A fixed card position, independent of whether the chosen layout mode
/// currently activates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Slot {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Slot {
    pub const ALL: [Slot; 4] = [
        Slot::TopLeft,
        Slot::TopRight,
        Slot::BottomLeft,
        Slot::BottomRight,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Slot::TopLeft => "top-left",
            Slot::TopRight => "top-right",
            Slot::BottomLeft => "bottom-left",
            Slot::BottomRight => "bottom-right",
        }
    }

    pub fn parse(s: &str) -> Option<Slot> {
        Slot::ALL.into_iter().find(|slot| slot.key() == s)
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Physical page the combined raster is printed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    Landscape,
    Portrait,
}

/// The layout selection governing how many cards are active and how they
/// tile into the final print canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    /// One card filling the whole content rect.
    Single,
    /// Two cards side by side, each half the content width.
    TwoUp,
    /// Four quadrants on the landscape page.
    GridLandscape,
    /// Four quadrants on the portrait page.
    GridPortrait,
}

impl LayoutMode {
    pub fn page(self) -> Page {
        match self {
            LayoutMode::GridPortrait => Page::Portrait,
            _ => Page::Landscape,
        }
    }

    /// Logical print-canvas size at screen resolution.
    pub fn canvas_size(self) -> (u32, u32) {
        match self.page() {
            Page::Landscape => CANVAS_LANDSCAPE,
            Page::Portrait => CANVAS_PORTRAIT,
        }
    }

    /// The slots this mode activates, in composition order.
    pub fn active_slots(self) -> &'static [Slot] {
        match self {
            LayoutMode::Single => &[Slot::TopLeft],
            LayoutMode::TwoUp => &[Slot::TopLeft, Slot::TopRight],
            LayoutMode::GridLandscape | LayoutMode::GridPortrait => &Slot::ALL,
        }
    }
}

/// Resolve which slot receives an edit.
///
/// Single always routes to the fixed default slot; other modes honor the
/// selection when it is active and fall back to the first active slot.
pub fn resolve_active(mode: LayoutMode, selected: Slot) -> Slot {
    let active = mode.active_slots();
    if active.contains(&selected) {
        selected
    } else {
        active[0]
    }
}

/// Global whitespace reserved outside all card content on the combined
/// print canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct CanvasMargins {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl CanvasMargins {
    pub fn clamped(self) -> Self {
        Self {
            top: self.top.max(0.0),
            bottom: self.bottom.max(0.0),
            left: self.left.max(0.0),
            right: self.right.max(0.0),
        }
    }

    pub fn scaled(self, factor: f32) -> Self {
        Self {
            top: self.top * factor,
            bottom: self.bottom * factor,
            left: self.left * factor,
            right: self.right * factor,
        }
    }
}

/// An axis-aligned destination rectangle on the combined canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn area(&self) -> f32 {
        self.width * self.height
    }
}

/// Partition the combined canvas into per-card destination rectangles.
///
/// `TwoUp` splits the content rect (canvas minus margins) into two equal
/// halves. Grid modes split the canvas into quadrants where each quadrant
/// receives only the margin bordering the outer canvas edge on its side:
/// a per-quadrant margin distribution, not a uniform shrink.
pub fn destination_rects(
    mode: LayoutMode,
    canvas: (u32, u32),
    margins: &CanvasMargins,
) -> Vec<(Slot, Rect)> {
    let (cw, ch) = (canvas.0 as f32, canvas.1 as f32);
    let m = margins.clamped();
    let content_w = (cw - m.left - m.right).max(0.0);
    let content_h = (ch - m.top - m.bottom).max(0.0);

    match mode {
        LayoutMode::Single => vec![(
            Slot::TopLeft,
            Rect {
                x: m.left,
                y: m.top,
                width: content_w,
                height: content_h,
            },
        )],
        LayoutMode::TwoUp => {
            let half = content_w / 2.0;
            vec![
                (
                    Slot::TopLeft,
                    Rect {
                        x: m.left,
                        y: m.top,
                        width: half,
                        height: content_h,
                    },
                ),
                (
                    Slot::TopRight,
                    Rect {
                        x: m.left + half,
                        y: m.top,
                        width: half,
                        height: content_h,
                    },
                ),
            ]
        }
        LayoutMode::GridLandscape | LayoutMode::GridPortrait => {
            let mid_x = cw / 2.0;
            let mid_y = ch / 2.0;
            vec![
                (
                    Slot::TopLeft,
                    Rect {
                        x: m.left,
                        y: m.top,
                        width: (mid_x - m.left).max(0.0),
                        height: (mid_y - m.top).max(0.0),
                    },
                ),
                (
                    Slot::TopRight,
                    Rect {
                        x: mid_x,
                        y: m.top,
                        width: (mid_x - m.right).max(0.0),
                        height: (mid_y - m.top).max(0.0),
                    },
                ),
                (
                    Slot::BottomLeft,
                    Rect {
                        x: m.left,
                        y: mid_y,
                        width: (mid_x - m.left).max(0.0),
                        height: (mid_y - m.bottom).max(0.0),
                    },
                ),
                (
                    Slot::BottomRight,
                    Rect {
                        x: mid_x,
                        y: mid_y,
                        width: (mid_x - m.right).max(0.0),
                        height: (mid_y - m.bottom).max(0.0),
                    },
                ),
            ]
        }
    }
}

/// The interactive editor state: one card per slot, the current layout
/// mode, the selected slot and the global margins.
#[derive(Debug, Clone, Serialize)]
pub struct Workspace {
    pub mode: LayoutMode,
    pub selected: Slot,
    pub margins: CanvasMargins,
    cards: HashMap<Slot, CardState>,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    /// Each slot gets its own materialized default state; no shared
    /// reference, so per-slot copy-on-write is explicit.
    pub fn new() -> Self {
        let cards = Slot::ALL
            .into_iter()
            .map(|slot| (slot, CardState::default()))
            .collect();
        Self {
            mode: LayoutMode::Single,
            selected: Slot::TopLeft,
            margins: CanvasMargins::default(),
            cards,
        }
    }

    pub fn card(&self, slot: Slot) -> &CardState {
        // All four slots are populated at construction.
        &self.cards[&slot]
    }

    /// The slot edits currently route to.
    pub fn active_slot(&self) -> Slot {
        resolve_active(self.mode, self.selected)
    }

    pub fn set_mode(&mut self, mode: LayoutMode) {
        self.mode = mode;
        self.selected = resolve_active(mode, self.selected);
    }

    pub fn select(&mut self, slot: Slot) {
        self.selected = resolve_active(self.mode, slot);
    }

    /// Single dispatch point: resolve the active slot, apply the pure
    /// update, replace that slot's entry. Other slots are untouched.
    pub fn dispatch(&mut self, update: CardUpdate) -> Result<Slot, TarjetaError> {
        let slot = self.active_slot();
        let next = apply_update(self.card(slot), update)?;
        self.cards.insert(slot, next);
        Ok(slot)
    }

    /// Replace one slot's state wholesale (template application).
    pub fn replace_card(&mut self, slot: Slot, card: CardState) {
        self.cards.insert(slot, card);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::AddText;
    use pretty_assertions::assert_eq;

    #[test]
    fn single_always_routes_to_top_left() {
        assert_eq!(resolve_active(LayoutMode::Single, Slot::BottomRight), Slot::TopLeft);
        assert_eq!(resolve_active(LayoutMode::Single, Slot::TopLeft), Slot::TopLeft);
    }

    #[test]
    fn two_up_falls_back_when_selection_inactive() {
        assert_eq!(resolve_active(LayoutMode::TwoUp, Slot::TopRight), Slot::TopRight);
        assert_eq!(resolve_active(LayoutMode::TwoUp, Slot::BottomLeft), Slot::TopLeft);
    }

    #[test]
    fn grid_honors_any_slot() {
        for slot in Slot::ALL {
            assert_eq!(resolve_active(LayoutMode::GridLandscape, slot), slot);
        }
    }

    #[test]
    fn two_up_halves_fill_content_rect() {
        let margins = CanvasMargins {
            top: 10.0,
            bottom: 10.0,
            left: 20.0,
            right: 20.0,
        };
        let rects = destination_rects(LayoutMode::TwoUp, (600, 400), &margins);
        assert_eq!(rects.len(), 2);
        let (_, a) = rects[0];
        let (_, b) = rects[1];
        assert_eq!((a.width, a.height), (280.0, 380.0));
        assert_eq!((b.width, b.height), (280.0, 380.0));
        assert_eq!(a.x + a.width, b.x);
        // No gaps, no overlaps: card area + margin area covers the canvas.
        let margin_area = 600.0 * 400.0 - 560.0 * 380.0;
        assert_eq!(a.area() + b.area() + margin_area, 600.0 * 400.0);
    }

    #[test]
    fn grid_quadrants_take_outer_margins_only() {
        let margins = CanvasMargins {
            top: 10.0,
            bottom: 10.0,
            left: 20.0,
            right: 20.0,
        };
        let rects = destination_rects(LayoutMode::GridLandscape, (600, 400), &margins);
        assert_eq!(rects.len(), 4);
        let total: f32 = rects.iter().map(|(_, r)| r.area()).sum();
        // Margin strips: left/right are full-height, top/bottom span the
        // content width between them.
        let margin_area = 2.0 * (20.0 * 400.0) + 2.0 * (10.0 * 560.0);
        assert_eq!(total + margin_area, 600.0 * 400.0);

        // Top-left quadrant is inset by top+left only.
        let tl = rects.iter().find(|(s, _)| *s == Slot::TopLeft).unwrap().1;
        assert_eq!((tl.x, tl.y), (20.0, 10.0));
        assert_eq!((tl.width, tl.height), (280.0, 190.0));
        // Bottom-right quadrant starts at the canvas midpoint.
        let br = rects.iter().find(|(s, _)| *s == Slot::BottomRight).unwrap().1;
        assert_eq!((br.x, br.y), (300.0, 200.0));
        assert_eq!((br.width, br.height), (280.0, 190.0));
    }

    #[test]
    fn grid_portrait_uses_portrait_canvas() {
        assert_eq!(LayoutMode::GridPortrait.canvas_size(), CANVAS_PORTRAIT);
        assert_eq!(LayoutMode::GridLandscape.canvas_size(), CANVAS_LANDSCAPE);
        assert_eq!(LayoutMode::GridPortrait.page(), Page::Portrait);
    }

    #[test]
    fn dispatch_touches_only_active_slot() {
        let mut ws = Workspace::new();
        ws.set_mode(LayoutMode::GridLandscape);
        ws.select(Slot::TopRight);
        let before_tl = ws.card(Slot::TopLeft).clone();
        let before_bl = ws.card(Slot::BottomLeft).clone();
        ws.dispatch(CardUpdate::AddText(AddText {
            x: 5.0,
            y: 5.0,
            ..Default::default()
        }))
        .unwrap();
        assert_eq!(ws.card(Slot::TopRight).texts.len(), 1);
        assert_eq!(ws.card(Slot::TopLeft), &before_tl);
        assert_eq!(ws.card(Slot::BottomLeft), &before_bl);
    }

    #[test]
    fn mode_change_reresolves_selection() {
        let mut ws = Workspace::new();
        ws.set_mode(LayoutMode::GridLandscape);
        ws.select(Slot::BottomRight);
        ws.set_mode(LayoutMode::TwoUp);
        assert_eq!(ws.selected, Slot::TopLeft);
    }

    #[test]
    fn slot_keys_round_trip() {
        for slot in Slot::ALL {
            assert_eq!(Slot::parse(slot.key()), Some(slot));
        }
        assert_eq!(Slot::parse("middle"), None);
    }
}
