//! Screen-space overlays: zoom controls and minimap.
//!
//! Chrome is laid out against the surface, not the diagram, and is never
//! part of an exported image.

use sld_core::{Bounds, Diagram, SurfaceSize, ViewTransform};

pub const MARGIN: f32 = 15.0;
pub const BUTTON_SIZE: f32 = 26.0;
pub const MINIMAP_WIDTH: f32 = 200.0;
pub const MINIMAP_HEIGHT: f32 = 150.0;

/// Buttons in the bottom-left control stack, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    ZoomIn,
    ZoomOut,
    FitView,
}

impl Control {
    pub const ALL: [Control; 3] = [Control::ZoomIn, Control::ZoomOut, Control::FitView];

    pub fn glyph(self) -> &'static str {
        match self {
            Control::ZoomIn => "+",
            Control::ZoomOut => "−",
            Control::FitView => "⤢",
        }
    }
}

/// Where each overlay sits on a given surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChromeLayout {
    pub controls: [(Control, Bounds); 3],
    pub minimap: Bounds,
}

impl ChromeLayout {
    pub fn new(surface: SurfaceSize) -> Self {
        let stack_top = surface.height - MARGIN - BUTTON_SIZE * 3.0;
        let button = |i: usize| {
            Bounds::new(
                MARGIN,
                stack_top + BUTTON_SIZE * i as f32,
                BUTTON_SIZE,
                BUTTON_SIZE,
            )
        };
        Self {
            controls: [
                (Control::ZoomIn, button(0)),
                (Control::ZoomOut, button(1)),
                (Control::FitView, button(2)),
            ],
            minimap: Bounds::new(
                surface.width - MARGIN - MINIMAP_WIDTH,
                surface.height - MARGIN - MINIMAP_HEIGHT,
                MINIMAP_WIDTH,
                MINIMAP_HEIGHT,
            ),
        }
    }

    pub fn control_at(&self, x: f32, y: f32) -> Option<Control> {
        self.controls
            .iter()
            .find(|(_, b)| b.contains(x, y))
            .map(|&(c, _)| c)
    }
}

/// Maps diagram space into the minimap box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimapProjection {
    /// Diagram region shown: content plus the visible viewport.
    pub world: Bounds,
    pub scale: f32,
    pub offset: (f32, f32),
}

impl MinimapProjection {
    pub fn new(diagram: &Diagram, view: ViewTransform, surface: SurfaceSize, frame: Bounds) -> Self {
        let visible = view.visible_rect(surface);
        let world = diagram
            .content_bounds()
            .map_or(visible, |c| c.union(&visible))
            .inflate(10.0);
        let scale = (frame.width / world.width.max(1.0)).min(frame.height / world.height.max(1.0));
        // Center the scaled world inside the frame.
        let offset = (
            frame.x + (frame.width - world.width * scale) / 2.0 - world.x * scale,
            frame.y + (frame.height - world.height * scale) / 2.0 - world.y * scale,
        );
        Self {
            world,
            scale,
            offset,
        }
    }

    pub fn project(&self, b: Bounds) -> Bounds {
        Bounds::new(
            b.x * self.scale + self.offset.0,
            b.y * self.scale + self.offset.1,
            b.width * self.scale,
            b.height * self.scale,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sld_core::{Position, SymbolKind};

    #[test]
    fn controls_stack_in_bottom_left() {
        let layout = ChromeLayout::new(SurfaceSize::new(800.0, 600.0));
        assert_eq!(layout.control_at(20.0, 600.0 - 15.0 - 5.0), Some(Control::FitView));
        assert_eq!(layout.control_at(20.0, 600.0 - 15.0 - 78.0 + 1.0), Some(Control::ZoomIn));
        assert_eq!(layout.control_at(400.0, 300.0), None);
    }

    #[test]
    fn minimap_sits_in_bottom_right() {
        let layout = ChromeLayout::new(SurfaceSize::new(800.0, 600.0));
        assert_eq!(layout.minimap, Bounds::new(585.0, 435.0, 200.0, 150.0));
    }

    #[test]
    fn projection_fits_inside_frame() {
        let mut d = Diagram::new();
        d.add_node(SymbolKind::Busbar, Position::new(-500.0, 0.0));
        d.add_node(SymbolKind::Load, Position::new(1200.0, 900.0));
        let surface = SurfaceSize::new(800.0, 600.0);
        let frame = ChromeLayout::new(surface).minimap;
        let proj = MinimapProjection::new(&d, ViewTransform::IDENTITY, surface, frame);
        let world = proj.project(proj.world);
        assert!(world.x >= frame.x - 1e-3 && world.y >= frame.y - 1e-3);
        assert!(world.x + world.width <= frame.x + frame.width + 1e-3);
        assert!(world.y + world.height <= frame.y + frame.height + 1e-3);
    }
}
