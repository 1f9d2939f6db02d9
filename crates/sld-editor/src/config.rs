//! Host-tunable editor settings.
//!
//! Every field has a default, so hosts may pass a partial JSON object (or
//! nothing at all).

use crate::input::Modifiers;
use serde::{Deserialize, Serialize};
use sld_core::viewport::{GRID_SIZE, MAX_ZOOM, MIN_ZOOM};

/// Which modifier makes a click add to the selection instead of replacing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AdditiveModifier {
    #[default]
    Shift,
    Ctrl,
    Meta,
    Alt,
}

impl AdditiveModifier {
    pub fn held(self, m: &Modifiers) -> bool {
        match self {
            AdditiveModifier::Shift => m.shift,
            AdditiveModifier::Ctrl => m.ctrl,
            AdditiveModifier::Meta => m.meta,
            AdditiveModifier::Alt => m.alt,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Maximum retained undo snapshots.
    pub history_capacity: usize,
    pub grid_size: f32,
    pub snap_to_grid: bool,
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Factor applied per zoom-in/zoom-out step.
    pub zoom_step: f32,
    /// Supersampling factor for exported images.
    pub export_pixel_ratio: f32,
    /// How long a success/error export status stays visible.
    pub status_display_ms: u64,
    pub additive_modifier: AdditiveModifier,
    /// Screen pixels.
    pub handle_hit_radius: f32,
    /// Screen pixels.
    pub edge_hit_tolerance: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: 20,
            grid_size: GRID_SIZE,
            snap_to_grid: true,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            zoom_step: 1.2,
            export_pixel_ratio: 2.0,
            status_display_ms: 3000,
            additive_modifier: AdditiveModifier::Shift,
            handle_hit_radius: 10.0,
            edge_hit_tolerance: 10.0,
        }
    }
}

fn positive_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}

impl EditorConfig {
    /// Replace unusable host values: non-finite or non-positive zoom
    /// limits, zoom step, pixel ratio and grid fall back to defaults, and
    /// inverted zoom limits are swapped.
    pub fn normalized(self) -> Self {
        let defaults = Self::default();
        let min_zoom = positive_or(self.min_zoom, defaults.min_zoom);
        let max_zoom = positive_or(self.max_zoom, defaults.max_zoom);
        let (min_zoom, max_zoom) = if min_zoom <= max_zoom {
            (min_zoom, max_zoom)
        } else {
            log::warn!("swapping inverted zoom limits {min_zoom} > {max_zoom}");
            (max_zoom, min_zoom)
        };
        let non_negative = |v: f32, d: f32| if v.is_finite() && v >= 0.0 { v } else { d };
        Self {
            min_zoom,
            max_zoom,
            zoom_step: positive_or(self.zoom_step, defaults.zoom_step),
            export_pixel_ratio: positive_or(self.export_pixel_ratio, defaults.export_pixel_ratio),
            grid_size: positive_or(self.grid_size, defaults.grid_size),
            handle_hit_radius: non_negative(self.handle_hit_radius, defaults.handle_hit_radius),
            edge_hit_tolerance: non_negative(self.edge_hit_tolerance, defaults.edge_hit_tolerance),
            ..self
        }
    }

    /// Grid unit used when placing or moving nodes, if snapping is on.
    pub fn snap_unit(&self) -> Option<f32> {
        (self.snap_to_grid && self.grid_size > 0.0).then_some(self.grid_size)
    }
}
