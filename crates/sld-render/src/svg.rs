//! SVG painter for symbols and whole canvas scenes.
//!
//! The same scene string feeds both the browser surface and the PNG
//! export; [`SceneLayers`] decides which overlays are included.

use crate::chrome::{ChromeLayout, Control, MinimapProjection};
use crate::route::edge_route;
use sld_core::{
    Diagram, Drawing, Fill, GRID_SIZE, HandleSide, Node, Primitive, SurfaceSize, SwitchState,
    SymbolKind, ViewTransform,
};
use std::fmt::Write;

// ─── Theme ───────────────────────────────────────────────────────────────

pub const BACKGROUND: &str = "#ffffff";
pub const SYMBOL_COLOR: &str = "#111827";
pub const EDGE_COLOR: &str = "#475569";
pub const SELECTED_COLOR: &str = "#2563eb";
pub const GRID_DOT_COLOR: &str = "#cbd5e1";
pub const DELETE_COLOR: &str = "#ef4444";
pub const HANDLE_RADIUS: f32 = 4.0;
/// Offset of the delete button's center from the node's top-right corner.
pub const DELETE_BUTTON_OFFSET: (f32, f32) = (8.0, -8.0);
pub const DELETE_BUTTON_RADIUS: f32 = 8.0;

// ─── Scene ───────────────────────────────────────────────────────────────

/// Which parts of the canvas to paint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneLayers {
    /// Dot background.
    pub grid: bool,
    /// Handles, selection rings, delete buttons, provisional connection.
    pub interaction: bool,
    /// Zoom controls and minimap.
    pub chrome: bool,
}

impl SceneLayers {
    pub const INTERACTIVE: SceneLayers = SceneLayers {
        grid: true,
        interaction: true,
        chrome: true,
    };
    /// Content only, as written to exported images.
    pub const EXPORT: SceneLayers = SceneLayers {
        grid: true,
        interaction: false,
        chrome: false,
    };
}

/// A connection being drawn, in diagram coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Provisional {
    pub from: (f32, f32),
    pub to: (f32, f32),
}

/// Everything needed to paint one frame.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub diagram: &'a Diagram,
    pub view: ViewTransform,
    pub surface: SurfaceSize,
    pub provisional: Option<Provisional>,
    pub layers: SceneLayers,
}

/// Paint a scene as a standalone SVG document sized to the surface.
pub fn render_scene(scene: &Scene<'_>) -> String {
    let SurfaceSize { width, height } = scene.surface;
    let mut svg = String::with_capacity(4096);
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    );
    let _ = writeln!(
        svg,
        r#"<rect width="{width}" height="{height}" fill="{BACKGROUND}"/>"#
    );

    if scene.layers.grid {
        write_grid(&mut svg, scene.view, width, height);
    }

    let ViewTransform { x, y, zoom } = scene.view;
    let _ = writeln!(svg, r#"<g transform="translate({x} {y}) scale({zoom})">"#);
    for edge in scene.diagram.edges() {
        let Some(route) = edge_route(scene.diagram, edge) else {
            continue;
        };
        let color = if edge.selected && scene.layers.interaction {
            SELECTED_COLOR
        } else {
            EDGE_COLOR
        };
        let _ = writeln!(
            svg,
            r#"<polyline data-id="{}" points="{}" fill="none" stroke="{color}" stroke-width="2"/>"#,
            escape_xml(edge.id.as_str()),
            points_attr(&route),
        );
    }
    for node in scene.diagram.nodes() {
        write_node(&mut svg, node, scene.layers.interaction);
    }
    if scene.layers.interaction
        && let Some(p) = scene.provisional
    {
        let _ = writeln!(
            svg,
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{SELECTED_COLOR}" stroke-width="2" stroke-dasharray="5 5"/>"#,
            p.from.0, p.from.1, p.to.0, p.to.1
        );
    }
    svg.push_str("</g>\n");

    if scene.layers.chrome {
        write_chrome(&mut svg, scene);
    }
    svg.push_str("</svg>\n");
    svg
}

fn write_grid(svg: &mut String, view: ViewTransform, width: f32, height: f32) {
    let gap = GRID_SIZE * view.zoom;
    let r = (view.zoom).clamp(0.5, 1.5);
    let _ = writeln!(
        svg,
        r#"<defs><pattern id="sld-dots" x="{}" y="{}" width="{gap}" height="{gap}" patternUnits="userSpaceOnUse"><circle cx="{r}" cy="{r}" r="{r}" fill="{GRID_DOT_COLOR}"/></pattern></defs>"#,
        view.x.rem_euclid(gap),
        view.y.rem_euclid(gap),
    );
    let _ = writeln!(
        svg,
        r#"<rect width="{width}" height="{height}" fill="url(#sld-dots)"/>"#
    );
}

fn write_node(svg: &mut String, node: &Node, interaction: bool) {
    let spec = node.kind.spec();
    let (w, h) = (spec.width, spec.height);
    let _ = writeln!(
        svg,
        r#"<g data-id="{}" transform="translate({} {})">"#,
        escape_xml(node.id.as_str()),
        node.position.x,
        node.position.y
    );
    write_drawing(svg, &node.kind.render(node.switch_state), SYMBOL_COLOR);

    if let Some(label) = &node.label {
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="{}" font-size="12" font-family="sans-serif" text-anchor="middle" fill="{SYMBOL_COLOR}">{}</text>"#,
            w / 2.0,
            h + 14.0,
            escape_xml(label)
        );
    }
    if let Some(tag) = &node.voltage_tag {
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="{}" font-size="10" font-family="sans-serif" fill="{SELECTED_COLOR}">{}</text>"#,
            w + 4.0,
            h / 2.0 + 3.0,
            escape_xml(tag)
        );
    }

    if interaction {
        if node.selected {
            let _ = writeln!(
                svg,
                r#"<rect x="-4" y="-4" width="{}" height="{}" rx="3" fill="none" stroke="{SELECTED_COLOR}" stroke-width="1.5" stroke-dasharray="4 3"/>"#,
                w + 8.0,
                h + 8.0
            );
            let (cx, cy) = (w + DELETE_BUTTON_OFFSET.0, DELETE_BUTTON_OFFSET.1);
            let _ = writeln!(
                svg,
                r##"<circle cx="{cx}" cy="{cy}" r="{DELETE_BUTTON_RADIUS}" fill="{DELETE_COLOR}"/><text x="{cx}" y="{}" font-size="12" font-family="sans-serif" text-anchor="middle" fill="#ffffff">×</text>"##,
                cy + 4.0
            );
        }
        for &side in spec.handles {
            let (hx, hy) = spec.handle_anchor(side);
            let _ = writeln!(
                svg,
                r##"<circle class="handle handle-{}" cx="{hx}" cy="{hy}" r="{HANDLE_RADIUS}" fill="#ffffff" stroke="{EDGE_COLOR}" stroke-width="1.5"/>"##,
                side.id()
            );
        }
    }
    svg.push_str("</g>\n");
}

fn write_chrome(svg: &mut String, scene: &Scene<'_>) {
    let layout = ChromeLayout::new(scene.surface);
    for (control, b) in layout.controls {
        let _ = writeln!(
            svg,
            r##"<g class="control" data-control="{}"><rect x="{}" y="{}" width="{}" height="{}" fill="#ffffff" stroke="#e5e7eb"/><text x="{}" y="{}" font-size="14" font-family="sans-serif" text-anchor="middle" fill="{SYMBOL_COLOR}">{}</text></g>"##,
            control_name(control),
            b.x,
            b.y,
            b.width,
            b.height,
            b.x + b.width / 2.0,
            b.y + b.height / 2.0 + 5.0,
            control.glyph()
        );
    }

    let frame = layout.minimap;
    let _ = writeln!(
        svg,
        r##"<g class="minimap"><rect x="{}" y="{}" width="{}" height="{}" fill="#f8fafc" stroke="#e5e7eb"/>"##,
        frame.x, frame.y, frame.width, frame.height
    );
    let proj = MinimapProjection::new(scene.diagram, scene.view, scene.surface, frame);
    for node in scene.diagram.nodes() {
        let Some(b) = scene.diagram.node_bounds(node.id) else {
            continue;
        };
        let m = proj.project(b);
        let _ = writeln!(
            svg,
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}"/>"#,
            m.x,
            m.y,
            m.width.max(1.0),
            m.height.max(1.0),
            node.kind.spec().minimap_color
        );
    }
    let v = proj.project(scene.view.visible_rect(scene.surface));
    let _ = writeln!(
        svg,
        r#"<rect x="{}" y="{}" width="{}" height="{}" fill="none" stroke="{SELECTED_COLOR}" stroke-width="1"/></g>"#,
        v.x, v.y, v.width, v.height
    );
}

fn control_name(control: Control) -> &'static str {
    match control {
        Control::ZoomIn => "zoom-in",
        Control::ZoomOut => "zoom-out",
        Control::FitView => "fit-view",
    }
}

// ─── Symbols ─────────────────────────────────────────────────────────────

/// Append a drawing's primitives, painted in `color`.
pub fn write_drawing(svg: &mut String, drawing: &Drawing, color: &str) {
    for prim in &drawing.primitives {
        let _ = match prim {
            Primitive::Line { from, to, width } => writeln!(
                svg,
                r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{color}" stroke-width="{width}" stroke-linecap="round"/>"#,
                from.0, from.1, to.0, to.1
            ),
            Primitive::Circle { center, r, fill } => writeln!(
                svg,
                r#"<circle cx="{}" cy="{}" r="{r}" {}/>"#,
                center.0,
                center.1,
                fill_attrs(*fill, color)
            ),
            Primitive::Rect {
                x,
                y,
                width,
                height,
                fill,
            } => writeln!(
                svg,
                r#"<rect x="{x}" y="{y}" width="{width}" height="{height}" {}/>"#,
                fill_attrs(*fill, color)
            ),
            Primitive::Polygon { points } => writeln!(
                svg,
                r#"<polygon points="{}" fill="{color}"/>"#,
                points_attr(points)
            ),
            Primitive::Text {
                x,
                y,
                size,
                content,
            } => writeln!(
                svg,
                r#"<text x="{x}" y="{y}" font-size="{size}" font-weight="bold" font-family="sans-serif" text-anchor="middle" fill="{color}">{}</text>"#,
                escape_xml(content)
            ),
        };
    }
}

fn fill_attrs(fill: Fill, color: &str) -> String {
    match fill {
        Fill::Solid => format!(r#"fill="{color}""#),
        Fill::Outline(w) => format!(r#"fill="none" stroke="{color}" stroke-width="{w}""#),
    }
}

fn points_attr(points: &[(f32, f32)]) -> String {
    points
        .iter()
        .map(|(x, y)| format!("{x},{y}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Standalone SVG of one symbol scaled into a `size`×`size` box, used for
/// palette thumbnails.
pub fn symbol_svg(kind: SymbolKind, state: SwitchState, size: f32) -> String {
    let drawing = kind.render(state);
    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}" viewBox="0 0 {} {}" preserveAspectRatio="xMidYMid meet">"#,
        drawing.width, drawing.height
    );
    svg.push('\n');
    write_drawing(&mut svg, &drawing, SYMBOL_COLOR);
    svg.push_str("</svg>\n");
    svg
}

/// Delete-button center for a node, in diagram coordinates.
pub fn delete_button_center(node: &Node) -> (f32, f32) {
    let spec = node.kind.spec();
    (
        node.position.x + spec.width + DELETE_BUTTON_OFFSET.0,
        node.position.y + DELETE_BUTTON_OFFSET.1,
    )
}

/// Handle centers for a node, in diagram coordinates.
pub fn handle_centers(node: &Node) -> impl Iterator<Item = (HandleSide, (f32, f32))> + '_ {
    let spec = node.kind.spec();
    spec.handles.iter().map(move |&side| {
        let (ax, ay) = spec.handle_anchor(side);
        (side, (node.position.x + ax, node.position.y + ay))
    })
}

/// Escape XML special characters and drop characters XML 1.0 cannot carry.
pub fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\t' | '\n' | '\r' => out.push(c),
            c if c < '\u{20}' || c == '\u{FFFE}' || c == '\u{FFFF}' => {}
            c => out.push(c),
        }
    }
    out
}
