//! Interactive canvas: viewport, pointer-session state machine, selection.
//!
//! Raw input goes in, diagram mutations come out. Every gesture that
//! changes the diagram ends in [`CanvasEffect::Committed`]; selection,
//! panning and zooming only ask for a redraw.
//!
//! | Gesture                          | Session            | Result        |
//! |----------------------------------|--------------------|---------------|
//! | press + drag on empty canvas     | `Panning`          | view moves    |
//! | drag-over with a symbol payload  | `DropArmed`        | node on drop  |
//! | press on a handle, release on one| `ConnectDrawing`   | edge          |
//! | press + drag on a node           | `DraggingNodes`    | nodes moved   |

use crate::config::EditorConfig;
use crate::input::{InputEvent, Modifiers};
use sld_core::{
    Connection, Diagram, HandleSide, NodeId, NodePatch, Position, SurfaceSize, SymbolKind,
    ViewTransform, snap_to_grid,
};
use sld_render::{
    Control, Hit, HitTolerance, Provisional, Scene, SceneLayers, handle_at, hit_test,
    render_scene,
};

/// Padding fraction used by fit-view.
const FIT_PADDING: f32 = 0.1;

/// Current pointer session.
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    Idle,
    Panning {
        last: (f32, f32),
        moved: bool,
        additive: bool,
    },
    DropArmed {
        kind: SymbolKind,
    },
    ConnectDrawing {
        node: NodeId,
        side: HandleSide,
        /// Pointer in diagram coordinates.
        pointer: Position,
    },
    DraggingNodes {
        grabbed: NodeId,
        /// Pointer at press, in diagram coordinates.
        origin: Position,
        start: Vec<(NodeId, Position)>,
        moved: bool,
        additive: bool,
    },
}

/// What the shell should do after an event.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEffect {
    Nothing,
    /// View or transient state changed.
    Redraw,
    /// The diagram changed and must be recorded.
    Committed,
    /// The host should prompt for a new label.
    EditLabel(NodeId),
}

#[derive(Debug, Clone)]
pub struct Canvas {
    pub diagram: Diagram,
    pub view: ViewTransform,
    surface: Option<SurfaceSize>,
    interaction: Interaction,
}

impl Canvas {
    pub fn new(diagram: Diagram) -> Self {
        Self {
            diagram,
            view: ViewTransform::IDENTITY,
            surface: None,
            interaction: Interaction::Idle,
        }
    }

    // ─── Surface ─────────────────────────────────────────────────────────

    pub fn mount(&mut self, surface: SurfaceSize) {
        log::debug!("surface mounted at {}x{}", surface.width, surface.height);
        self.surface = Some(surface);
    }

    pub fn unmount(&mut self) {
        log::debug!("surface unmounted");
        self.surface = None;
        self.interaction = Interaction::Idle;
    }

    pub fn surface(&self) -> Option<SurfaceSize> {
        self.surface
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    /// Abandon any gesture in progress. Live drag moves are kept.
    pub fn cancel(&mut self) {
        self.interaction = Interaction::Idle;
    }

    // ─── Events ──────────────────────────────────────────────────────────

    pub fn handle(&mut self, event: &InputEvent, config: &EditorConfig) -> CanvasEffect {
        match event {
            InputEvent::PointerDown { x, y, modifiers } => {
                self.pointer_down(*x, *y, modifiers, config)
            }
            InputEvent::PointerMove { x, y } => self.pointer_move(*x, *y, config),
            InputEvent::PointerUp { x, y, modifiers } => self.pointer_up(*x, *y, modifiers, config),
            InputEvent::DoubleClick { x, y } => match self.hit(*x, *y, config) {
                Hit::Node(id) => CanvasEffect::EditLabel(id),
                _ => CanvasEffect::Nothing,
            },
            InputEvent::Scroll {
                x,
                y,
                dx,
                dy,
                zoom,
            } => {
                if (*zoom - 1.0).abs() > f32::EPSILON {
                    self.zoom_at(*x, *y, *zoom, config)
                } else if *dx != 0.0 || *dy != 0.0 {
                    self.view.pan_by(-dx, -dy);
                    CanvasEffect::Redraw
                } else {
                    CanvasEffect::Nothing
                }
            }
            InputEvent::DragOver { payload, .. } => {
                let kind = payload.as_deref().and_then(|p| p.parse::<SymbolKind>().ok());
                let armable = matches!(
                    self.interaction,
                    Interaction::Idle | Interaction::DropArmed { .. }
                );
                if let (Some(kind), true) = (kind, armable)
                    && self.interaction != (Interaction::DropArmed { kind })
                {
                    log::trace!("drop armed: {kind}");
                    self.interaction = Interaction::DropArmed { kind };
                }
                CanvasEffect::Nothing
            }
            InputEvent::DragLeave => {
                if matches!(self.interaction, Interaction::DropArmed { .. }) {
                    self.interaction = Interaction::Idle;
                }
                CanvasEffect::Nothing
            }
            InputEvent::Drop { x, y, payload } => self.drop_symbol(*x, *y, payload.as_deref(), config),
            // Keyboard handling lives in the shell.
            InputEvent::Key { .. } => CanvasEffect::Nothing,
        }
    }

    fn hit(&self, x: f32, y: f32, config: &EditorConfig) -> Hit {
        let Some(surface) = self.surface else {
            return Hit::Empty;
        };
        hit_test(&self.diagram, self.view, surface, tolerance(config), x, y)
    }

    fn pointer_down(
        &mut self,
        x: f32,
        y: f32,
        modifiers: &Modifiers,
        config: &EditorConfig,
    ) -> CanvasEffect {
        let additive = config.additive_modifier.held(modifiers);
        match self.hit(x, y, config) {
            Hit::Control(control) => self.apply_control(control, config),
            Hit::Minimap => CanvasEffect::Nothing,
            Hit::DeleteButton(id) => {
                self.interaction = Interaction::Idle;
                if self.diagram.delete_nodes(&[id]) > 0 {
                    CanvasEffect::Committed
                } else {
                    CanvasEffect::Nothing
                }
            }
            Hit::Handle { node, side } => {
                log::trace!("connect start: {node}:{}", side.id());
                self.interaction = Interaction::ConnectDrawing {
                    node,
                    side,
                    pointer: self.view.screen_to_flow(x, y),
                };
                CanvasEffect::Redraw
            }
            Hit::Node(id) => {
                let selected = self.diagram.node(id).is_some_and(|n| n.selected);
                if additive && selected {
                    // Toggled off: nothing under the pointer to drag.
                    self.diagram.set_node_selected(id, false);
                    self.interaction = Interaction::Idle;
                    return CanvasEffect::Redraw;
                }
                if additive {
                    self.diagram.set_node_selected(id, true);
                } else if !selected {
                    self.select_only_node(id);
                }
                let start = self
                    .diagram
                    .nodes()
                    .filter(|n| n.selected)
                    .map(|n| (n.id, n.position))
                    .collect();
                self.interaction = Interaction::DraggingNodes {
                    grabbed: id,
                    origin: self.view.screen_to_flow(x, y),
                    start,
                    moved: false,
                    additive,
                };
                CanvasEffect::Redraw
            }
            Hit::Edge(id) => {
                if additive {
                    let selected = self.diagram.edge(id).is_some_and(|e| e.selected);
                    self.diagram.set_edge_selected(id, !selected);
                } else {
                    self.diagram.clear_selection();
                    self.diagram.set_edge_selected(id, true);
                }
                CanvasEffect::Redraw
            }
            Hit::Empty => {
                self.interaction = Interaction::Panning {
                    last: (x, y),
                    moved: false,
                    additive,
                };
                CanvasEffect::Nothing
            }
        }
    }

    fn pointer_move(&mut self, x: f32, y: f32, config: &EditorConfig) -> CanvasEffect {
        let pointer = self.view.screen_to_flow(x, y);
        match &mut self.interaction {
            Interaction::Panning { last, moved, .. } => {
                let (dx, dy) = (x - last.0, y - last.1);
                if dx == 0.0 && dy == 0.0 {
                    return CanvasEffect::Nothing;
                }
                *last = (x, y);
                *moved = true;
                self.view.pan_by(dx, dy);
                CanvasEffect::Redraw
            }
            Interaction::ConnectDrawing { pointer: p, .. } => {
                *p = pointer;
                CanvasEffect::Redraw
            }
            Interaction::DraggingNodes {
                origin,
                start,
                moved,
                ..
            } => {
                let (dx, dy) = (pointer.x - origin.x, pointer.y - origin.y);
                if dx == 0.0 && dy == 0.0 && !*moved {
                    return CanvasEffect::Nothing;
                }
                *moved = true;
                let targets: Vec<(NodeId, Position)> = start
                    .iter()
                    .map(|&(id, p)| {
                        let raw = Position::new(p.x + dx, p.y + dy);
                        let snapped = config.snap_unit().map_or(raw, |g| snap_to_grid(raw, g));
                        (id, snapped)
                    })
                    .collect();
                for (id, position) in targets {
                    self.diagram
                        .update_node_attributes(id, NodePatch::position(position));
                }
                CanvasEffect::Redraw
            }
            Interaction::Idle | Interaction::DropArmed { .. } => CanvasEffect::Nothing,
        }
    }

    fn pointer_up(
        &mut self,
        x: f32,
        y: f32,
        _modifiers: &Modifiers,
        config: &EditorConfig,
    ) -> CanvasEffect {
        let session = std::mem::replace(&mut self.interaction, Interaction::Idle);
        match session {
            Interaction::Panning {
                moved, additive, ..
            } => {
                if !moved && !additive && self.diagram.clear_selection() {
                    CanvasEffect::Redraw
                } else {
                    CanvasEffect::Nothing
                }
            }
            Interaction::ConnectDrawing { node, side, .. } => {
                let target = self
                    .surface
                    .and_then(|_| handle_at(&self.diagram, self.view, config.handle_hit_radius, x, y));
                let Some(conn) = target.and_then(|to| self.compatible((node, side), to)) else {
                    log::trace!("connection discarded");
                    return CanvasEffect::Redraw;
                };
                match self.diagram.add_edge(conn) {
                    Ok(_) => CanvasEffect::Committed,
                    Err(err) => {
                        log::warn!("connection refused: {err}");
                        CanvasEffect::Redraw
                    }
                }
            }
            Interaction::DraggingNodes {
                grabbed,
                start,
                moved,
                additive,
                ..
            } => {
                let changed = start.iter().any(|&(id, p)| {
                    self.diagram.node(id).is_some_and(|n| n.position != p)
                });
                if changed {
                    CanvasEffect::Committed
                } else if !moved && !additive {
                    self.select_only_node(grabbed);
                    CanvasEffect::Redraw
                } else {
                    CanvasEffect::Nothing
                }
            }
            Interaction::Idle | Interaction::DropArmed { .. } => {
                self.interaction = session;
                CanvasEffect::Nothing
            }
        }
    }

    /// Place a symbol from a drop payload. Anything that is not a catalog
    /// identifier is ignored without a state change.
    fn drop_symbol(
        &mut self,
        x: f32,
        y: f32,
        payload: Option<&str>,
        config: &EditorConfig,
    ) -> CanvasEffect {
        let Some(kind) = payload.and_then(|p| p.parse::<SymbolKind>().ok()) else {
            log::trace!("ignoring drop with payload {payload:?}");
            return CanvasEffect::Nothing;
        };
        let raw = self.view.screen_to_flow(x, y);
        let position = config.snap_unit().map_or(raw, |g| snap_to_grid(raw, g));
        self.diagram.add_node(kind, position);
        self.interaction = Interaction::Idle;
        CanvasEffect::Committed
    }

    /// Build the connection for a handle-to-handle gesture, if allowed.
    ///
    /// Both ends must be on different nodes and play opposite roles, and
    /// the same connection must not exist yet. The edge runs from the
    /// source-role handle to the target-role handle whichever end the
    /// gesture started from.
    pub fn compatible(
        &self,
        from: (NodeId, HandleSide),
        to: (NodeId, HandleSide),
    ) -> Option<Connection> {
        if from.0 == to.0 || from.1.role() == to.1.role() {
            return None;
        }
        let (src, dst) = if from.1.role() == sld_core::HandleRole::Source {
            (from, to)
        } else {
            (to, from)
        };
        let conn = Connection::new(src.0, dst.0).with_handles(src.1, dst.1);
        (!self.diagram.connection_exists(&conn)).then_some(conn)
    }

    // ─── Selection ───────────────────────────────────────────────────────

    fn select_only_node(&mut self, id: NodeId) {
        self.diagram.clear_selection();
        self.diagram.set_node_selected(id, true);
    }

    /// Delete selected nodes (with their edges) and selected edges.
    pub fn delete_selection(&mut self) -> CanvasEffect {
        let nodes = self.diagram.selected_nodes();
        let edges = self.diagram.selected_edges();
        let removed = self.diagram.delete_edges(&edges) + self.diagram.delete_nodes(&nodes);
        if removed > 0 {
            self.interaction = Interaction::Idle;
            CanvasEffect::Committed
        } else {
            CanvasEffect::Nothing
        }
    }

    pub fn select_all(&mut self) -> CanvasEffect {
        if self.diagram.select_all() {
            CanvasEffect::Redraw
        } else {
            CanvasEffect::Nothing
        }
    }

    pub fn deselect(&mut self) -> CanvasEffect {
        let was_busy = self.interaction != Interaction::Idle;
        self.interaction = Interaction::Idle;
        if self.diagram.clear_selection() || was_busy {
            CanvasEffect::Redraw
        } else {
            CanvasEffect::Nothing
        }
    }

    // ─── View ────────────────────────────────────────────────────────────

    fn zoom_at(&mut self, x: f32, y: f32, factor: f32, config: &EditorConfig) -> CanvasEffect {
        if self
            .view
            .zoom_at(x, y, factor, config.min_zoom, config.max_zoom)
        {
            CanvasEffect::Redraw
        } else {
            CanvasEffect::Nothing
        }
    }

    /// Zoom about the surface center.
    pub fn zoom_by(&mut self, factor: f32, config: &EditorConfig) -> CanvasEffect {
        let (cx, cy) = self
            .surface
            .map_or((0.0, 0.0), |s| (s.width / 2.0, s.height / 2.0));
        self.zoom_at(cx, cy, factor, config)
    }

    pub fn fit_view(&mut self, config: &EditorConfig) -> CanvasEffect {
        let (Some(surface), Some(bounds)) = (self.surface, self.diagram.content_bounds()) else {
            return CanvasEffect::Nothing;
        };
        self.view = ViewTransform::fit(bounds, surface, FIT_PADDING, config.min_zoom, config.max_zoom);
        CanvasEffect::Redraw
    }

    fn apply_control(&mut self, control: Control, config: &EditorConfig) -> CanvasEffect {
        match control {
            Control::ZoomIn => self.zoom_by(config.zoom_step, config),
            Control::ZoomOut => self.zoom_by(1.0 / config.zoom_step, config),
            Control::FitView => self.fit_view(config),
        }
    }

    // ─── Painting ────────────────────────────────────────────────────────

    fn provisional(&self) -> Option<Provisional> {
        let Interaction::ConnectDrawing {
            node,
            side,
            pointer,
        } = &self.interaction
        else {
            return None;
        };
        let from = self.diagram.handle_point(*node, *side)?;
        Some(Provisional {
            from,
            to: (pointer.x, pointer.y),
        })
    }

    fn scene(&self, surface: SurfaceSize, layers: SceneLayers) -> String {
        render_scene(&Scene {
            diagram: &self.diagram,
            view: self.view,
            surface,
            provisional: self.provisional(),
            layers,
        })
    }

    /// The interactive frame, or `None` while unmounted.
    pub fn render(&self) -> Option<String> {
        self.surface
            .map(|surface| self.scene(surface, SceneLayers::INTERACTIVE))
    }

    /// The content layer as it would be exported, or `None` while unmounted.
    pub fn render_export(&self) -> Option<String> {
        self.surface
            .map(|surface| self.scene(surface, SceneLayers::EXPORT))
    }
}

fn tolerance(config: &EditorConfig) -> HitTolerance {
    HitTolerance {
        handle_radius: config.handle_hit_radius,
        edge_distance: config.edge_hit_tolerance,
    }
}
