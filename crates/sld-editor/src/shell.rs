//! Editor shell: wires palette, canvas, history and export together and
//! reports every committed change to the host.
//!
//! All operations are synchronous. Time is passed in explicitly
//! (`now_ms`, `today`) so the shell stays deterministic and testable.

use crate::canvas::{Canvas, CanvasEffect};
use crate::config::EditorConfig;
use crate::export::{ExportArtifact, ExportError, ExportStatus, ExportTracker, PendingExport};
use crate::history::History;
use crate::input::InputEvent;
use crate::palette::Palette;
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use chrono::NaiveDate;
use sld_core::{Diagram, Edge, Node, NodeId, NodePatch, Snapshot, SurfaceSize, SymbolKind};
use sld_render::{Rasterizer, ResvgRasterizer};

pub const CLEAR_CONFIRM_MESSAGE: &str = "Bạn có chắc muốn xóa toàn bộ sơ đồ?";
pub const EXPORT_SUCCESS_MESSAGE: &str = "Hình ảnh đã được xuất thành công";
pub const EMPTY_CANVAS_MESSAGE: &str = "Kéo ký hiệu từ bảng bên trái vào đây";
pub const CANVAS_HINT: &str = "Zoom: Cuộn chuột | Di chuyển: Kéo nền | Xóa: Chọn + Delete";

/// Callbacks into the embedding page. Every method has a no-op default.
pub trait EditorHost {
    /// Full node list after a committed change, undo, redo or clear.
    fn nodes_changed(&mut self, _nodes: &[Node]) {}
    /// Full edge list after a committed change, undo, redo or clear.
    fn edges_changed(&mut self, _edges: &[Edge]) {}
    /// A PNG export succeeded.
    fn image_exported(&mut self, _data_url: &str) {}
    /// Offer the exported image as a file download.
    fn save_file(&mut self, _file_name: &str, _data_url: &str) {}
    /// Blocking yes/no question. Declines by default.
    fn confirm(&mut self, _message: &str) -> bool {
        false
    }
}

pub struct EditorShell<H: EditorHost, R: Rasterizer = ResvgRasterizer> {
    host: H,
    canvas: Canvas,
    palette: Palette,
    history: History,
    export: ExportTracker,
    rasterizer: R,
    config: EditorConfig,
}

impl<H: EditorHost> EditorShell<H> {
    /// Mount an editor over host-supplied seeds.
    pub fn new(host: H, nodes: Vec<Node>, edges: Vec<Edge>, config: EditorConfig) -> Self {
        Self::with_rasterizer(host, nodes, edges, config, ResvgRasterizer::new())
    }
}

impl<H: EditorHost, R: Rasterizer> EditorShell<H, R> {
    pub fn with_rasterizer(
        host: H,
        nodes: Vec<Node>,
        edges: Vec<Edge>,
        config: EditorConfig,
        rasterizer: R,
    ) -> Self {
        let config = config.normalized();
        let diagram = Diagram::from_parts(nodes, edges);
        let mut history = History::new(config.history_capacity);
        history.push(diagram.snapshot());
        log::debug!(
            "editor mounted with {} node(s), {} edge(s)",
            diagram.node_count(),
            diagram.edge_count()
        );
        Self {
            host,
            canvas: Canvas::new(diagram),
            palette: Palette::new(),
            history,
            export: ExportTracker::new(config.status_display_ms),
            rasterizer,
            config,
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn diagram(&self) -> &Diagram {
        &self.canvas.diagram
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn snapshot(&self) -> Snapshot {
        self.canvas.diagram.snapshot()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Number of placed symbols, shown in the toolbar caption.
    pub fn symbol_count(&self) -> usize {
        self.canvas.diagram.node_count()
    }

    /// Toolbar caption, e.g. `(3 ký hiệu)`.
    pub fn symbol_caption(&self) -> String {
        format!("({} ký hiệu)", self.symbol_count())
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn can_clear(&self) -> bool {
        !self.canvas.diagram.is_empty()
    }

    pub fn can_export(&self) -> bool {
        !self.export.in_flight() && self.canvas.diagram.node_count() > 0
    }

    pub fn export_status(&self) -> ExportStatus {
        self.export.status()
    }

    // ─── Surface & palette ───────────────────────────────────────────────

    pub fn mount_surface(&mut self, surface: SurfaceSize) {
        self.canvas.mount(surface);
    }

    pub fn unmount_surface(&mut self) {
        self.canvas.unmount();
    }

    /// Interactive SVG frame, or `None` while the surface is unmounted.
    pub fn render(&self) -> Option<String> {
        self.canvas.render()
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn begin_palette_drag(&mut self, kind: SymbolKind) -> &'static str {
        self.palette.begin_drag(kind)
    }

    pub fn end_palette_drag(&mut self) {
        self.palette.end_drag();
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Feed one input event through shortcuts and the canvas.
    pub fn handle(&mut self, event: InputEvent) -> CanvasEffect {
        let effect = match event {
            InputEvent::Key { key, modifiers } => {
                return match ShortcutMap::resolve(&key, &modifiers) {
                    Some(action) => self.perform(action),
                    None => CanvasEffect::Nothing,
                };
            }
            // Browsers hide the payload until drop; fall back to the
            // palette's own drag session.
            InputEvent::DragOver {
                x,
                y,
                payload: None,
            } => {
                let payload = self.palette.dragging().map(|k| k.as_str().to_string());
                self.canvas
                    .handle(&InputEvent::DragOver { x, y, payload }, &self.config)
            }
            event @ InputEvent::Drop { .. } => {
                self.palette.end_drag();
                self.canvas.handle(&event, &self.config)
            }
            event => self.canvas.handle(&event, &self.config),
        };
        if effect == CanvasEffect::Committed {
            self.commit();
        }
        effect
    }

    /// Run a keyboard or toolbar action.
    pub fn perform(&mut self, action: ShortcutAction) -> CanvasEffect {
        log::trace!("action {action:?}");
        let effect = match action {
            ShortcutAction::Undo => redraw_if(self.undo()),
            ShortcutAction::Redo => redraw_if(self.redo()),
            ShortcutAction::Delete => self.canvas.delete_selection(),
            ShortcutAction::SelectAll => self.canvas.select_all(),
            ShortcutAction::Deselect => self.canvas.deselect(),
            ShortcutAction::ZoomIn => self.canvas.zoom_by(self.config.zoom_step, &self.config),
            ShortcutAction::ZoomOut => self
                .canvas
                .zoom_by(1.0 / self.config.zoom_step, &self.config),
            ShortcutAction::ZoomToFit => self.canvas.fit_view(&self.config),
        };
        if effect == CanvasEffect::Committed {
            self.commit();
        }
        effect
    }

    // ─── Mutations ───────────────────────────────────────────────────────

    /// Record the current diagram and tell the host.
    fn commit(&mut self) {
        let snapshot = self.canvas.diagram.snapshot();
        self.history.push(snapshot.clone());
        self.notify(&snapshot);
    }

    fn notify(&mut self, snapshot: &Snapshot) {
        self.host.nodes_changed(&snapshot.nodes);
        self.host.edges_changed(&snapshot.edges);
    }

    /// Merge attribute changes into a node and record them.
    /// Returns `false` for unknown ids or no-op patches.
    pub fn update_node(&mut self, id: NodeId, patch: NodePatch) -> bool {
        if !self.canvas.diagram.update_node_attributes(id, patch) {
            return false;
        }
        self.commit();
        true
    }

    pub fn set_node_label(&mut self, id: NodeId, label: impl Into<String>) -> bool {
        self.update_node(id, NodePatch::label(label))
    }

    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.undo().cloned() else {
            return false;
        };
        self.restore(&snapshot);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.history.redo().cloned() else {
            return false;
        };
        self.restore(&snapshot);
        true
    }

    fn restore(&mut self, snapshot: &Snapshot) {
        self.canvas.cancel();
        self.canvas.diagram.restore(snapshot);
        self.notify(snapshot);
    }

    /// Empty the diagram after the host confirms. Returns whether it was
    /// cleared.
    pub fn clear_all(&mut self) -> bool {
        if self.canvas.diagram.is_empty() {
            return false;
        }
        if !self.host.confirm(CLEAR_CONFIRM_MESSAGE) {
            log::debug!("clear-all declined");
            return false;
        }
        self.canvas.cancel();
        self.canvas.diagram.restore(&Snapshot::empty());
        self.commit();
        self.export.reset();
        true
    }

    // ─── Export ──────────────────────────────────────────────────────────

    /// Capture the export surface and enter the exporting state.
    ///
    /// A second export while one is running is refused with `Busy`, and an
    /// empty diagram with `EmptyDiagram`; neither touches the status. A
    /// missing surface is a real failure and is reported as such.
    pub fn begin_export(&mut self, today: NaiveDate, now_ms: u64) -> Result<PendingExport, ExportError> {
        if self.export.in_flight() {
            return Err(ExportError::Busy);
        }
        let Some(svg) = self.canvas.render_export() else {
            self.export.start()?;
            return Err(self.fail_export(ExportError::SurfaceNotMounted, now_ms));
        };
        if self.canvas.diagram.node_count() == 0 {
            return Err(ExportError::EmptyDiagram);
        }
        self.export.start()?;
        Ok(PendingExport {
            svg,
            scale: self.config.export_pixel_ratio,
            date: today,
        })
    }

    /// Rasterize a captured surface and deliver the image to the host.
    pub fn finish_export(
        &mut self,
        pending: PendingExport,
        now_ms: u64,
    ) -> Result<ExportArtifact, ExportError> {
        let png = match self.rasterizer.rasterize(&pending.svg, pending.scale) {
            Ok(png) => png,
            Err(err) => return Err(self.fail_export(err.into(), now_ms)),
        };
        let artifact = ExportArtifact::new(png, pending.date);
        self.export.succeed(now_ms);
        log::debug!("exported {} ({} bytes)", artifact.file_name, artifact.png.len());
        self.host.image_exported(&artifact.data_url);
        self.host.save_file(&artifact.file_name, &artifact.data_url);
        Ok(artifact)
    }

    /// Run a whole export in one call.
    pub fn export(&mut self, today: NaiveDate, now_ms: u64) -> Result<ExportArtifact, ExportError> {
        let pending = self.begin_export(today, now_ms)?;
        self.finish_export(pending, now_ms)
    }

    fn fail_export(&mut self, err: ExportError, now_ms: u64) -> ExportError {
        log::error!("export failed: {err}");
        self.export.fail(now_ms);
        err
    }

    /// Advance timers. Returns whether anything visible changed.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        self.export.tick(now_ms)
    }
}

fn redraw_if(changed: bool) -> CanvasEffect {
    if changed {
        CanvasEffect::Redraw
    } else {
        CanvasEffect::Nothing
    }
}
