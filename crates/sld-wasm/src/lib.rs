//! WASM bridge for the single-line diagram editor.
//!
//! Compiled via `wasm-pack build --target web`. The page owns the DOM: it
//! forwards pointer, wheel, drag and key events, paints the SVG returned
//! by [`SldEditor::render`] and reads toolbar state from
//! [`SldEditor::status_json`].

mod host;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sld_core::{Edge, Node, NodeId, NodePatch, SurfaceSize, SymbolKind};
use sld_editor::{
    CANVAS_HINT, CanvasEffect, EMPTY_CANVAS_MESSAGE, EXPORT_SUCCESS_MESSAGE, EditorConfig,
    EditorShell, ExportStatus, GROUPS, InputEvent, Modifiers, Palette, ShortcutAction,
};
use wasm_bindgen::prelude::*;

pub use host::JsHost;

/// Browser-facing editor. One instance per mounted canvas.
#[wasm_bindgen]
pub struct SldEditor {
    shell: EditorShell<JsHost>,
}

#[wasm_bindgen]
impl SldEditor {
    /// Mount an editor. `seed_json` is `{"nodes":[...],"edges":[...]}`
    /// (either key may be omitted); `config_json` overrides defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32, seed_json: &str, config_json: Option<String>) -> Self {
        runtime_setup();

        let seed = parse_seed(seed_json);
        let config = config_json
            .as_deref()
            .map(parse_config)
            .unwrap_or_default();
        let mut shell = EditorShell::new(JsHost::default(), seed.nodes, seed.edges, config);
        shell.mount_surface(SurfaceSize::new(width, height));
        Self { shell }
    }

    // ─── Host callbacks ──────────────────────────────────────────────────

    pub fn set_on_nodes_change(&mut self, callback: js_sys::Function) {
        self.shell.host_mut().on_nodes_change = Some(callback);
    }

    pub fn set_on_edges_change(&mut self, callback: js_sys::Function) {
        self.shell.host_mut().on_edges_change = Some(callback);
    }

    pub fn set_on_image_export(&mut self, callback: js_sys::Function) {
        self.shell.host_mut().on_image_export = Some(callback);
    }

    // ─── Surface ─────────────────────────────────────────────────────────

    /// Current frame as SVG markup. Empty while unmounted.
    pub fn render(&self) -> String {
        self.shell.render().unwrap_or_default()
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.shell.mount_surface(SurfaceSize::new(width, height));
    }

    pub fn unmount(&mut self) {
        self.shell.unmount_surface();
    }

    // ─── Input ───────────────────────────────────────────────────────────
    //
    // Handlers return `true` when the page should re-render.

    #[allow(clippy::too_many_arguments)]
    pub fn handle_pointer_down(
        &mut self,
        x: f32,
        y: f32,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> bool {
        let modifiers = modifiers(shift, ctrl, alt, meta);
        needs_redraw(&self.shell.handle(InputEvent::PointerDown { x, y, modifiers }))
    }

    pub fn handle_pointer_move(&mut self, x: f32, y: f32) -> bool {
        needs_redraw(&self.shell.handle(InputEvent::PointerMove { x, y }))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn handle_pointer_up(
        &mut self,
        x: f32,
        y: f32,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> bool {
        let modifiers = modifiers(shift, ctrl, alt, meta);
        needs_redraw(&self.shell.handle(InputEvent::PointerUp { x, y, modifiers }))
    }

    /// Returns the id of the node whose label should be edited, or an
    /// empty string.
    pub fn handle_double_click(&mut self, x: f32, y: f32) -> String {
        match self.shell.handle(InputEvent::DoubleClick { x, y }) {
            CanvasEffect::EditLabel(id) => id.as_str().to_string(),
            _ => String::new(),
        }
    }

    /// `zoom` is the multiplicative factor for pinch/ctrl-wheel, 1.0 for
    /// a plain scroll.
    pub fn handle_wheel(&mut self, x: f32, y: f32, dx: f32, dy: f32, zoom: f32) -> bool {
        needs_redraw(&self.shell.handle(InputEvent::Scroll { x, y, dx, dy, zoom }))
    }

    pub fn handle_drag_over(&mut self, x: f32, y: f32, payload: Option<String>) -> bool {
        needs_redraw(&self.shell.handle(InputEvent::DragOver { x, y, payload }))
    }

    pub fn handle_drag_leave(&mut self) -> bool {
        needs_redraw(&self.shell.handle(InputEvent::DragLeave))
    }

    pub fn handle_drop(&mut self, x: f32, y: f32, payload: Option<String>) -> bool {
        needs_redraw(&self.shell.handle(InputEvent::Drop { x, y, payload }))
    }

    pub fn handle_key(&mut self, key: &str, shift: bool, ctrl: bool, alt: bool, meta: bool) -> bool {
        let modifiers = modifiers(shift, ctrl, alt, meta);
        needs_redraw(&self.shell.handle(InputEvent::key(key, modifiers)))
    }

    // ─── Palette ─────────────────────────────────────────────────────────

    /// Grouped palette entries with SVG thumbnails, as JSON.
    pub fn palette_json(&self) -> String {
        serde_json::to_string(&palette_sections()).unwrap_or_else(|_| "[]".to_string())
    }

    /// Start a palette drag. Returns the payload to put on the
    /// `DataTransfer`, or an empty string for an unknown kind.
    pub fn begin_palette_drag(&mut self, kind: &str) -> String {
        match kind.parse::<SymbolKind>() {
            Ok(kind) => self.shell.begin_palette_drag(kind).to_string(),
            Err(err) => {
                log::warn!("{err}");
                String::new()
            }
        }
    }

    pub fn end_palette_drag(&mut self) {
        self.shell.end_palette_drag();
    }

    // ─── Toolbar ─────────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        self.shell.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.shell.redo()
    }

    pub fn clear_all(&mut self) -> bool {
        self.shell.clear_all()
    }

    pub fn zoom_in(&mut self) -> bool {
        needs_redraw(&self.shell.perform(ShortcutAction::ZoomIn))
    }

    pub fn zoom_out(&mut self) -> bool {
        needs_redraw(&self.shell.perform(ShortcutAction::ZoomOut))
    }

    pub fn fit_view(&mut self) -> bool {
        needs_redraw(&self.shell.perform(ShortcutAction::ZoomToFit))
    }

    pub fn delete_selected(&mut self) -> bool {
        needs_redraw(&self.shell.perform(ShortcutAction::Delete))
    }

    /// Export the diagram as PNG. Returns JSON:
    /// `{"ok":true,"fileName":"..."}` or `{"ok":false,"error":"..."}`.
    pub fn export_png(&mut self) -> String {
        let now = js_sys::Date::now() as u64;
        let result = match self.shell.export(today(), now) {
            Ok(artifact) => serde_json::json!({ "ok": true, "fileName": artifact.file_name }),
            Err(err) => serde_json::json!({ "ok": false, "error": err.to_string() }),
        };
        result.to_string()
    }

    /// Advance status timers. Returns `true` if the toolbar changed.
    pub fn tick(&mut self) -> bool {
        self.shell.tick(js_sys::Date::now() as u64)
    }

    /// Toolbar and overlay state, as JSON.
    pub fn status_json(&self) -> String {
        serde_json::to_string(&status(&self.shell)).unwrap_or_else(|_| "{}".to_string())
    }

    // ─── Attributes ──────────────────────────────────────────────────────

    pub fn set_node_label(&mut self, id: &str, label: &str) -> bool {
        let Some(id) = NodeId::lookup(id) else {
            return false;
        };
        self.shell.set_node_label(id, label)
    }

    /// Flip a breaker or disconnector between open and closed.
    pub fn toggle_switch(&mut self, id: &str) -> bool {
        let Some(id) = NodeId::lookup(id) else {
            return false;
        };
        let Some(node) = self.shell.diagram().node(id) else {
            return false;
        };
        if !node.kind.is_switching() {
            return false;
        }
        let patch = NodePatch {
            switch_state: Some(node.switch_state.toggled()),
            ..NodePatch::default()
        };
        self.shell.update_node(id, patch)
    }

    /// Merge a JSON attribute patch into a node.
    pub fn update_node_json(&mut self, id: &str, patch_json: &str) -> bool {
        let Some(node) = NodeId::lookup(id) else {
            return false;
        };
        match serde_json::from_str::<NodePatch>(patch_json) {
            Ok(patch) => self.shell.update_node(node, patch),
            Err(err) => {
                log::warn!("bad node patch for {id}: {err}");
                false
            }
        }
    }

    pub fn nodes_json(&self) -> String {
        let snapshot = self.shell.snapshot();
        serde_json::to_string(&*snapshot.nodes).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn edges_json(&self) -> String {
        let snapshot = self.shell.snapshot();
        serde_json::to_string(&*snapshot.edges).unwrap_or_else(|_| "[]".to_string())
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Seed {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

fn parse_seed(json: &str) -> Seed {
    if json.trim().is_empty() {
        return Seed::default();
    }
    serde_json::from_str(json).unwrap_or_else(|err| {
        log::warn!("ignoring unreadable seed diagram: {err}");
        Seed::default()
    })
}

fn parse_config(json: &str) -> EditorConfig {
    serde_json::from_str::<EditorConfig>(json)
        .unwrap_or_else(|err| {
            log::warn!("ignoring unreadable editor config: {err}");
            EditorConfig::default()
        })
        .normalized()
}

fn modifiers(shift: bool, ctrl: bool, alt: bool, meta: bool) -> Modifiers {
    Modifiers {
        shift,
        ctrl,
        alt,
        meta,
    }
}

fn needs_redraw(effect: &CanvasEffect) -> bool {
    !matches!(effect, CanvasEffect::Nothing)
}

/// Date part of an ISO-8601 timestamp such as `Date.toISOString()`.
fn parse_iso_date(iso: &str) -> Option<NaiveDate> {
    let date = iso.get(..10)?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

fn today() -> NaiveDate {
    let iso: String = js_sys::Date::new_0().to_iso_string().into();
    parse_iso_date(&iso).unwrap_or_default()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PaletteEntry {
    kind: &'static str,
    name: &'static str,
    code: &'static str,
    thumbnail: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PaletteSection {
    title: &'static str,
    entries: Vec<PaletteEntry>,
}

fn palette_sections() -> Vec<PaletteSection> {
    GROUPS
        .iter()
        .map(|group| PaletteSection {
            title: group.title,
            entries: group
                .kinds
                .iter()
                .map(|&kind| {
                    let spec = kind.spec();
                    PaletteEntry {
                        kind: kind.as_str(),
                        name: spec.name,
                        code: spec.code,
                        thumbnail: Palette::thumbnail(kind),
                    }
                })
                .collect(),
        })
        .collect()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Status {
    symbol_count: usize,
    symbol_caption: String,
    can_undo: bool,
    can_redo: bool,
    can_clear: bool,
    can_export: bool,
    export_status: ExportStatus,
    export_caption: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    empty_message: Option<&'static str>,
    hint: &'static str,
}

fn status<H: sld_editor::EditorHost, R: sld_render::Rasterizer>(shell: &EditorShell<H, R>) -> Status {
    let export_status = shell.export_status();
    Status {
        symbol_count: shell.symbol_count(),
        symbol_caption: shell.symbol_caption(),
        can_undo: shell.can_undo(),
        can_redo: shell.can_redo(),
        can_clear: shell.can_clear(),
        can_export: shell.can_export(),
        export_status,
        export_caption: export_status.caption(),
        message: (export_status == ExportStatus::Success).then_some(EXPORT_SUCCESS_MESSAGE),
        empty_message: (shell.symbol_count() == 0).then_some(EMPTY_CANVAS_MESSAGE),
        hint: CANVAS_HINT,
    }
}

// ─── Runtime ─────────────────────────────────────────────────────────────

/// Routes `log` records to the browser console.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
struct ConsoleLogger;

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let msg = JsValue::from_str(&format!("[{}] {}", record.target(), record.args()));
        match record.level() {
            log::Level::Error => web_sys::console::error_1(&msg),
            log::Level::Warn => web_sys::console::warn_1(&msg),
            _ => web_sys::console::log_1(&msg),
        }
    }

    fn flush(&self) {}
}

/// Install the panic hook and console logger once per page.
fn runtime_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SETUP: Once = Once::new();
        static LOGGER: ConsoleLogger = ConsoleLogger;
        SETUP.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("SLD WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
            if log::set_logger(&LOGGER).is_ok() {
                log::set_max_level(log::LevelFilter::Info);
            }
        });
    }
}
