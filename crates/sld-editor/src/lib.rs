//! Single-line diagram editor: canvas interaction, palette, bounded
//! undo/redo and PNG export, behind a host-agnostic shell.

pub mod canvas;
pub mod config;
pub mod export;
pub mod history;
pub mod input;
pub mod palette;
pub mod shell;
pub mod shortcuts;

pub use canvas::{Canvas, CanvasEffect, Interaction};
pub use config::{AdditiveModifier, EditorConfig};
pub use export::{ExportArtifact, ExportError, ExportStatus, ExportTracker, PendingExport};
pub use history::History;
pub use input::{InputEvent, Modifiers};
pub use palette::{GROUPS, Palette, PaletteGroup};
pub use shell::{
    CANVAS_HINT, CLEAR_CONFIRM_MESSAGE, EMPTY_CANVAS_MESSAGE, EXPORT_SUCCESS_MESSAGE, EditorHost,
    EditorShell,
};
pub use shortcuts::{ShortcutAction, ShortcutMap};
