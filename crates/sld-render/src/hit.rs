//! Hit testing: screen point → what is under it.
//!
//! Checks overlays first, then walks nodes and edges front to back (last
//! painted = topmost). Tolerances are given in screen pixels and converted
//! to diagram units through the current zoom.

use crate::chrome::{ChromeLayout, Control};
use crate::route::edge_route;
use crate::svg::{DELETE_BUTTON_RADIUS, delete_button_center, handle_centers};
use kurbo::{Line, ParamCurveNearest, Point, Rect};
use sld_core::{Diagram, EdgeId, HandleSide, NodeId, SurfaceSize, ViewTransform};

/// Screen-pixel tolerances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitTolerance {
    pub handle_radius: f32,
    pub edge_distance: f32,
}

impl Default for HitTolerance {
    fn default() -> Self {
        Self {
            handle_radius: 10.0,
            edge_distance: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Control(Control),
    /// Inside the minimap frame; swallows the pointer.
    Minimap,
    DeleteButton(NodeId),
    Handle { node: NodeId, side: HandleSide },
    Node(NodeId),
    Edge(EdgeId),
    Empty,
}

/// Find what lies under screen position `(sx, sy)`.
pub fn hit_test(
    diagram: &Diagram,
    view: ViewTransform,
    surface: SurfaceSize,
    tolerance: HitTolerance,
    sx: f32,
    sy: f32,
) -> Hit {
    let layout = ChromeLayout::new(surface);
    if let Some(control) = layout.control_at(sx, sy) {
        return Hit::Control(control);
    }
    if layout.minimap.contains(sx, sy) {
        return Hit::Minimap;
    }

    let p = view.screen_to_flow(sx, sy);
    let pt = Point::new(p.x as f64, p.y as f64);
    let zoom = view.zoom as f64;

    for node in diagram.nodes().filter(|n| n.selected) {
        let (cx, cy) = delete_button_center(node);
        if pt.distance(Point::new(cx as f64, cy as f64)) <= DELETE_BUTTON_RADIUS as f64 {
            return Hit::DeleteButton(node.id);
        }
    }

    if let Some((node, side)) = handle_at(diagram, view, tolerance.handle_radius, sx, sy) {
        return Hit::Handle { node, side };
    }

    let nodes: Vec<_> = diagram.nodes().collect();
    for node in nodes.iter().rev() {
        let spec = node.kind.spec();
        let rect = Rect::from_origin_size(
            (node.position.x as f64, node.position.y as f64),
            (spec.width as f64, spec.height as f64),
        );
        if rect.contains(pt) {
            return Hit::Node(node.id);
        }
    }

    let max_dist = tolerance.edge_distance as f64 / zoom;
    let edges: Vec<_> = diagram.edges().collect();
    for edge in edges.iter().rev() {
        let Some(route) = edge_route(diagram, edge) else {
            continue;
        };
        let near = route.windows(2).any(|w| {
            let seg = Line::new(
                (w[0].0 as f64, w[0].1 as f64),
                (w[1].0 as f64, w[1].1 as f64),
            );
            seg.nearest(pt, 1e-6).distance_sq <= max_dist * max_dist
        });
        if near {
            return Hit::Edge(edge.id);
        }
    }

    Hit::Empty
}

/// Topmost handle within `radius` screen pixels of `(sx, sy)`.
pub fn handle_at(
    diagram: &Diagram,
    view: ViewTransform,
    radius: f32,
    sx: f32,
    sy: f32,
) -> Option<(NodeId, HandleSide)> {
    let p = view.screen_to_flow(sx, sy);
    let pt = Point::new(p.x as f64, p.y as f64);
    let max_dist = radius as f64 / view.zoom as f64;

    let nodes: Vec<_> = diagram.nodes().collect();
    nodes.iter().rev().find_map(|node| {
        handle_centers(node)
            .map(|(side, (hx, hy))| (side, pt.distance(Point::new(hx as f64, hy as f64))))
            .filter(|&(_, d)| d <= max_dist)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(side, _)| (node.id, side))
    })
}
