//! Viewport geometry: screen ↔ diagram transforms, grid snap, bounds.
//!
//! Screen space is surface pixels with the origin at the top-left of the
//! canvas. Diagram ("flow") space is where node positions live:
//! `screen = flow * zoom + (x, y)`.

use crate::model::Position;
use serde::{Deserialize, Serialize};

/// Grid unit used for snapping and the dot background.
pub const GRID_SIZE: f32 = 15.0;

pub const MIN_ZOOM: f32 = 0.5;
pub const MAX_ZOOM: f32 = 2.0;

/// Round a position to the nearest grid intersection.
pub fn snap_to_grid(p: Position, grid: f32) -> Position {
    if grid <= 0.0 {
        return p;
    }
    Position::new((p.x / grid).round() * grid, (p.y / grid).round() * grid)
}

/// Clamp into `[min, max]` without panicking on inverted or NaN limits.
fn clamp_zoom(zoom: f32, min: f32, max: f32) -> f32 {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    zoom.max(lo).min(hi)
}

/// Pan offset and zoom factor of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub x: f32,
    pub y: f32,
    pub zoom: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    pub const IDENTITY: ViewTransform = ViewTransform {
        x: 0.0,
        y: 0.0,
        zoom: 1.0,
    };

    pub fn new(x: f32, y: f32, zoom: f32) -> Self {
        Self { x, y, zoom }
    }

    pub fn screen_to_flow(&self, sx: f32, sy: f32) -> Position {
        Position::new((sx - self.x) / self.zoom, (sy - self.y) / self.zoom)
    }

    pub fn flow_to_screen(&self, p: Position) -> (f32, f32) {
        (p.x * self.zoom + self.x, p.y * self.zoom + self.y)
    }

    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
    }

    /// Scale by `factor` keeping the diagram point under `(sx, sy)` fixed.
    /// Returns whether the zoom changed.
    pub fn zoom_at(&mut self, sx: f32, sy: f32, factor: f32, min: f32, max: f32) -> bool {
        let zoom = clamp_zoom(self.zoom * factor, min, max);
        if (zoom - self.zoom).abs() < f32::EPSILON {
            return false;
        }
        let anchor = self.screen_to_flow(sx, sy);
        self.zoom = zoom;
        self.x = sx - anchor.x * zoom;
        self.y = sy - anchor.y * zoom;
        true
    }

    /// Center `bounds` in a surface of the given size.
    pub fn fit(bounds: Bounds, surface: SurfaceSize, padding: f32, min: f32, max: f32) -> Self {
        if bounds.width <= 0.0 && bounds.height <= 0.0 {
            return Self::IDENTITY;
        }
        let avail_w = (surface.width * (1.0 - 2.0 * padding)).max(1.0);
        let avail_h = (surface.height * (1.0 - 2.0 * padding)).max(1.0);
        let zoom = (avail_w / bounds.width.max(1.0))
            .min(avail_h / bounds.height.max(1.0));
        let zoom = clamp_zoom(zoom, min, max);
        let (cx, cy) = bounds.center();
        Self {
            x: surface.width / 2.0 - cx * zoom,
            y: surface.height / 2.0 - cy * zoom,
            zoom,
        }
    }

    /// The diagram-space rectangle visible through a surface.
    pub fn visible_rect(&self, surface: SurfaceSize) -> Bounds {
        let tl = self.screen_to_flow(0.0, 0.0);
        Bounds::new(
            tl.x,
            tl.y,
            surface.width / self.zoom,
            surface.height / self.zoom,
        )
    }
}

/// Pixel size of the render surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSize {
    pub width: f32,
    pub height: f32,
}

impl SurfaceSize {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle in diagram space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = (self.x + self.width).max(other.x + other.width);
        let bottom = (self.y + self.height).max(other.y + other.height);
        Bounds::new(x, y, right - x, bottom - y)
    }

    pub fn inflate(&self, by: f32) -> Bounds {
        Bounds::new(
            self.x - by,
            self.y - by,
            self.width + 2.0 * by,
            self.height + 2.0 * by,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn snap_rounds_to_nearest() {
        assert_eq!(
            snap_to_grid(Position::new(7.4, 7.6), GRID_SIZE),
            Position::new(0.0, 15.0)
        );
        assert_eq!(
            snap_to_grid(Position::new(-8.0, 100.0), GRID_SIZE),
            Position::new(-15.0, 105.0)
        );
    }

    #[test]
    fn transform_roundtrip() {
        let vt = ViewTransform::new(40.0, -20.0, 1.5);
        let p = vt.screen_to_flow(130.0, 100.0);
        assert_eq!(p, Position::new(60.0, 80.0));
        assert_eq!(vt.flow_to_screen(p), (130.0, 100.0));
    }

    #[test]
    fn zoom_keeps_anchor_fixed() {
        let mut vt = ViewTransform::IDENTITY;
        let before = vt.screen_to_flow(200.0, 150.0);
        assert!(vt.zoom_at(200.0, 150.0, 1.2, MIN_ZOOM, MAX_ZOOM));
        let after = vt.screen_to_flow(200.0, 150.0);
        assert!((before.x - after.x).abs() < 1e-3);
        assert!((before.y - after.y).abs() < 1e-3);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut vt = ViewTransform::new(0.0, 0.0, MAX_ZOOM);
        assert!(!vt.zoom_at(0.0, 0.0, 1.2, MIN_ZOOM, MAX_ZOOM));
        assert_eq!(vt.zoom, MAX_ZOOM);
        vt.zoom_at(0.0, 0.0, 0.01, MIN_ZOOM, MAX_ZOOM);
        assert_eq!(vt.zoom, MIN_ZOOM);
    }

    #[test]
    fn inverted_limits_do_not_panic() {
        let mut vt = ViewTransform::IDENTITY;
        assert!(vt.zoom_at(0.0, 0.0, 1.2, 3.0, 2.0));
        assert_eq!(vt.zoom, 2.0);
        let fit = ViewTransform::fit(
            Bounds::new(0.0, 0.0, 100.0, 100.0),
            SurfaceSize::new(800.0, 600.0),
            0.1,
            3.0,
            2.0,
        );
        assert_eq!(fit.zoom, 3.0);
    }

    #[test]
    fn fit_centers_content() {
        let bounds = Bounds::new(100.0, 100.0, 200.0, 100.0);
        let surface = SurfaceSize::new(800.0, 600.0);
        let vt = ViewTransform::fit(bounds, surface, 0.1, MIN_ZOOM, MAX_ZOOM);
        let (sx, sy) = vt.flow_to_screen(Position::new(200.0, 150.0));
        assert!((sx - 400.0).abs() < 1e-3);
        assert!((sy - 300.0).abs() < 1e-3);
        assert_eq!(vt.zoom, MAX_ZOOM);
    }

    #[test]
    fn union_covers_both() {
        let a = Bounds::new(0.0, 0.0, 10.0, 10.0);
        let b = Bounds::new(20.0, -5.0, 5.0, 5.0);
        assert_eq!(a.union(&b), Bounds::new(0.0, -5.0, 25.0, 15.0));
    }
}
