//! Integration tests: end-to-end editing sessions through the shell.
//!
//! Drives `EditorShell` with synthetic input the way a browser host would
//! and checks what the host gets to see.

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use sld_core::*;
use sld_editor::*;
use sld_render::{RasterError, Rasterizer};

const SURFACE: SurfaceSize = SurfaceSize::new(800.0, 600.0);

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Default)]
struct Host {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    exported: Vec<String>,
    saved: Vec<String>,
    confirm_answer: bool,
    confirms: usize,
}

impl EditorHost for Host {
    fn nodes_changed(&mut self, nodes: &[Node]) {
        self.nodes = nodes.to_vec();
    }

    fn edges_changed(&mut self, edges: &[Edge]) {
        self.edges = edges.to_vec();
    }

    fn image_exported(&mut self, data_url: &str) {
        self.exported.push(data_url.to_string());
    }

    fn save_file(&mut self, file_name: &str, _data_url: &str) {
        self.saved.push(file_name.to_string());
    }

    fn confirm(&mut self, _message: &str) -> bool {
        self.confirms += 1;
        self.confirm_answer
    }
}

/// Returns a fixed byte string instead of a real PNG.
struct FakeRasterizer(Result<Vec<u8>, RasterError>);

impl Rasterizer for FakeRasterizer {
    fn rasterize(&self, svg: &str, scale: f32) -> Result<Vec<u8>, RasterError> {
        assert!(svg.starts_with("<svg"));
        assert_eq!(scale, 2.0);
        self.0.clone()
    }
}

fn seeded(n: usize) -> (Vec<Node>, Vec<Edge>) {
    let mut d = Diagram::new();
    for i in 0..n {
        d.add_node(SymbolKind::Load, Position::new(i as f32 * 90.0, 30.0));
    }
    let snap = d.snapshot();
    (snap.nodes.to_vec(), snap.edges.to_vec())
}

fn editor(host: Host, n: usize, raster: FakeRasterizer) -> EditorShell<Host, FakeRasterizer> {
    init_logs();
    let (nodes, edges) = seeded(n);
    let mut shell =
        EditorShell::with_rasterizer(host, nodes, edges, EditorConfig::default(), raster);
    shell.mount_surface(SURFACE);
    shell
}

fn png() -> FakeRasterizer {
    FakeRasterizer(Ok(b"\x89PNG".to_vec()))
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 11, 5).unwrap()
}

fn press_release(shell: &mut EditorShell<Host, FakeRasterizer>, from: (f32, f32), to: (f32, f32)) {
    shell.handle(InputEvent::click_down(from.0, from.1));
    shell.handle(InputEvent::PointerMove { x: to.0, y: to.1 });
    shell.handle(InputEvent::click_up(to.0, to.1));
}

// ─── Editing ─────────────────────────────────────────────────────────────

#[test]
fn place_connect_and_delete() {
    let mut shell = editor(Host::default(), 0, png());

    shell.handle(InputEvent::drop(100.0, 100.0, "transformer"));
    shell.handle(InputEvent::drop(100.0, 200.0, "circuitBreaker"));
    assert_eq!(shell.symbol_count(), 2);
    let ids: Vec<NodeId> = shell.diagram().nodes().map(|n| n.id).collect();
    let (tx, cb) = (ids[0], ids[1]);

    let from = shell.diagram().handle_point(tx, HandleSide::Bottom).unwrap();
    let to = shell.diagram().handle_point(cb, HandleSide::Top).unwrap();
    press_release(&mut shell, from, to);

    assert_eq!(shell.diagram().edge_count(), 1);
    assert_eq!(shell.host().edges.len(), 1);
    let edge = &shell.host().edges[0];
    assert!(edge.touches(tx) && edge.touches(cb));

    let center = shell.diagram().node_bounds(cb).unwrap().center();
    shell.handle(InputEvent::click_down(center.0, center.1));
    shell.handle(InputEvent::click_up(center.0, center.1));
    assert_eq!(shell.diagram().selected_nodes(), vec![cb]);

    shell.handle(InputEvent::key("Delete", Modifiers::NONE));
    assert_eq!(shell.diagram().node_count(), 1);
    assert_eq!(shell.diagram().edge_count(), 0);
    assert_eq!(shell.host().nodes.len(), 1);
    assert!(shell.host().edges.is_empty());
}

#[test]
fn drop_with_foreign_payload_changes_nothing() {
    let mut shell = editor(Host::default(), 1, png());
    let before = shell.snapshot();
    let effect = shell.handle(InputEvent::drop(300.0, 300.0, "text/uri-list"));
    assert_eq!(effect, CanvasEffect::Nothing);
    assert_eq!(shell.snapshot(), before);
    assert_eq!(shell.history().len(), 1);
}

#[test]
fn clear_all_declined_keeps_everything() {
    let mut shell = editor(Host::default(), 3, png());
    assert!(!shell.clear_all());
    assert_eq!(shell.host().confirms, 1);
    assert_eq!(shell.symbol_count(), 3);
    assert_eq!(shell.history().len(), 1);
}

// ─── History ─────────────────────────────────────────────────────────────

#[test]
fn undo_then_redo_is_identity() {
    let mut shell = editor(Host::default(), 1, png());
    shell.handle(InputEvent::drop(300.0, 120.0, "generator"));
    shell.handle(InputEvent::drop(300.0, 300.0, "fuse"));
    let after = shell.snapshot();

    assert!(shell.undo());
    assert_eq!(shell.symbol_count(), 2);
    assert!(shell.redo());
    assert_eq!(shell.snapshot(), after);
    assert!(!shell.redo());
}

#[test]
fn history_is_bounded() {
    let mut shell = editor(Host::default(), 0, png());
    for i in 0..30 {
        shell.handle(InputEvent::drop(40.0 + i as f32 * 20.0, 100.0, "ct"));
    }
    assert_eq!(shell.history().len(), 20);
    let mut undos = 0;
    while shell.undo() {
        undos += 1;
    }
    assert_eq!(undos, 19);
    assert_eq!(shell.symbol_count(), 11);
}

#[test]
fn new_commit_discards_redo() {
    let mut shell = editor(Host::default(), 0, png());
    shell.handle(InputEvent::drop(60.0, 60.0, "busbar"));
    shell.handle(InputEvent::drop(60.0, 160.0, "load"));
    shell.undo();
    assert!(shell.can_redo());
    shell.handle(InputEvent::drop(260.0, 160.0, "generator"));
    assert!(!shell.can_redo());
}

// ─── Export ──────────────────────────────────────────────────────────────

#[test]
fn export_delivers_image_and_file_name() {
    let mut shell = editor(Host::default(), 2, png());
    assert!(shell.can_export());
    let artifact = shell.export(today(), 1_000).unwrap();
    assert_eq!(artifact.file_name, "so-do-luoi-2024-11-05.png");
    assert_eq!(shell.export_status(), ExportStatus::Success);
    assert_eq!(shell.host().exported, vec![artifact.data_url.clone()]);
    assert_eq!(shell.host().saved, vec!["so-do-luoi-2024-11-05.png".to_string()]);
    assert!(shell.tick(4_000));
    assert_eq!(shell.export_status(), ExportStatus::Idle);
}

#[test]
fn export_without_surface_reports_error_then_idles() {
    init_logs();
    let (nodes, edges) = seeded(2);
    let mut shell =
        EditorShell::with_rasterizer(Host::default(), nodes, edges, EditorConfig::default(), png());

    let err = shell.export(today(), 10_000).unwrap_err();
    assert_eq!(err, ExportError::SurfaceNotMounted);
    assert_eq!(shell.export_status(), ExportStatus::Error);
    assert_eq!(shell.export_status().caption(), "Lỗi xuất");

    assert!(!shell.tick(12_999));
    assert!(shell.tick(13_000));
    assert_eq!(shell.export_status(), ExportStatus::Idle);
    assert!(shell.host().exported.is_empty());
    assert!(shell.host().saved.is_empty());
}

#[test]
fn rasterizer_failure_is_reported() {
    let mut shell = editor(
        Host::default(),
        1,
        FakeRasterizer(Err(RasterError::Parse("bad".into()))),
    );
    assert!(matches!(
        shell.export(today(), 0),
        Err(ExportError::Rasterize(_))
    ));
    assert_eq!(shell.export_status(), ExportStatus::Error);
    assert!(shell.host().exported.is_empty());
}

#[test]
fn export_is_serialized() {
    let mut shell = editor(Host::default(), 1, png());
    let pending = shell.begin_export(today(), 0).unwrap();
    assert!(!shell.can_export());
    assert_eq!(shell.begin_export(today(), 5), Err(ExportError::Busy));
    assert_eq!(shell.export_status(), ExportStatus::Exporting);
    shell.finish_export(pending, 10).unwrap();
    assert_eq!(shell.host().exported.len(), 1);
}

#[test]
fn empty_diagram_cannot_export() {
    let mut shell = editor(Host::default(), 0, png());
    assert!(!shell.can_export());
    assert_eq!(shell.export(today(), 0), Err(ExportError::EmptyDiagram));
    assert_eq!(shell.export_status(), ExportStatus::Idle);
}

// ─── Configuration ───────────────────────────────────────────────────────

#[test]
fn inverted_zoom_limits_are_tolerated() {
    init_logs();
    let config: EditorConfig = serde_json::from_str(r#"{"minZoom":3.0}"#).unwrap();
    let (nodes, edges) = seeded(2);
    let mut shell = EditorShell::with_rasterizer(Host::default(), nodes, edges, config, png());
    shell.mount_surface(SURFACE);

    shell.handle(InputEvent::Scroll {
        x: 400.0,
        y: 300.0,
        dx: 0.0,
        dy: 0.0,
        zoom: 1.2,
    });
    assert_eq!(shell.canvas().view.zoom, 2.0);
    shell.perform(ShortcutAction::ZoomIn);
    shell.perform(ShortcutAction::ZoomToFit);
    let zoom = shell.canvas().view.zoom;
    assert!((2.0..=3.0).contains(&zoom), "zoom {zoom}");
}
