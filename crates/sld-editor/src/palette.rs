//! Symbol palette: catalog entries grouped for drag-and-drop placement.
//!
//! The palette never touches the diagram. Starting a drag yields the
//! payload string the canvas will receive on drop.

use sld_core::{Category, SwitchState, SymbolKind};
use sld_render::symbol_svg;

/// Thumbnail edge length in pixels.
pub const THUMBNAIL_SIZE: f32 = 32.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaletteGroup {
    pub category: Category,
    pub title: &'static str,
    pub kinds: &'static [SymbolKind],
}

pub const GROUPS: [PaletteGroup; 3] = [
    PaletteGroup {
        category: Category::Equipment,
        title: "Thiết bị",
        kinds: &[
            SymbolKind::Transformer,
            SymbolKind::Generator,
            SymbolKind::Load,
            SymbolKind::Ct,
        ],
    },
    PaletteGroup {
        category: Category::Switching,
        title: "Khí cụ đóng cắt",
        kinds: &[
            SymbolKind::CircuitBreaker,
            SymbolKind::Disconnect,
            SymbolKind::GroundSwitch,
            SymbolKind::Fuse,
        ],
    },
    PaletteGroup {
        category: Category::Connection,
        title: "Kết nối",
        kinds: &[SymbolKind::Busbar, SymbolKind::PowerLine],
    },
];

/// Drag-session state.
#[derive(Debug, Clone, Default)]
pub struct Palette {
    dragging: Option<SymbolKind>,
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn groups(&self) -> &'static [PaletteGroup] {
        &GROUPS
    }

    /// Begin dragging an entry. Returns the drag payload.
    pub fn begin_drag(&mut self, kind: SymbolKind) -> &'static str {
        log::trace!("palette drag start: {kind}");
        self.dragging = Some(kind);
        kind.as_str()
    }

    pub fn end_drag(&mut self) {
        self.dragging = None;
    }

    pub fn dragging(&self) -> Option<SymbolKind> {
        self.dragging
    }

    /// SVG thumbnail for an entry, closed state.
    pub fn thumbnail(kind: SymbolKind) -> String {
        symbol_svg(kind, SwitchState::Closed, THUMBNAIL_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    #[test]
    fn groups_cover_catalog_exactly_once() {
        let mut seen = HashSet::new();
        for group in GROUPS {
            for &kind in group.kinds {
                assert_eq!(kind.spec().category, group.category, "{kind}");
                assert!(seen.insert(kind), "{kind} listed twice");
            }
        }
        assert_eq!(seen.len(), SymbolKind::ALL.len());
    }

    #[test]
    fn drag_session() {
        let mut palette = Palette::new();
        assert_eq!(palette.begin_drag(SymbolKind::GroundSwitch), "groundSwitch");
        assert_eq!(palette.dragging(), Some(SymbolKind::GroundSwitch));
        palette.end_drag();
        assert_eq!(palette.dragging(), None);
    }

    #[test]
    fn thumbnails_are_fixed_size() {
        let svg = Palette::thumbnail(SymbolKind::Busbar);
        assert!(svg.contains("width=\"32\" height=\"32\""));
    }
}
