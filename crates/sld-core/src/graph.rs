//! The live node/edge collection for one diagram.
//!
//! Backed by a `petgraph::StableDiGraph` so node removal cascades to
//! incident edges and indices stay valid across deletions. Insertion order
//! is tracked separately and doubles as z-order.

use crate::id::{EdgeId, IdAllocator, NodeId};
use crate::model::{Connection, Edge, Node, NodePatch, Position, Snapshot};
use crate::symbol::{HandleRole, HandleSide, SymbolKind};
use crate::viewport::Bounds;
use petgraph::Direction;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("node {0} is not in the diagram")]
    UnknownNode(NodeId),
}

/// One diagram: nodes, edges and the session's id counter.
#[derive(Debug, Clone, Default)]
pub struct Diagram {
    graph: StableDiGraph<Node, Edge>,
    node_index: HashMap<NodeId, NodeIndex>,
    edge_index: HashMap<EdgeId, EdgeIndex>,
    node_order: Vec<NodeId>,
    edge_order: Vec<EdgeId>,
    ids: IdAllocator,
}

impl Diagram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from host-supplied seeds.
    ///
    /// Duplicate node ids keep the first occurrence; edges with a missing
    /// endpoint or a duplicate id are dropped. Fresh ids are allocated past
    /// any seeded `node_N` / `edge_N`.
    pub fn from_parts(
        nodes: impl IntoIterator<Item = Node>,
        edges: impl IntoIterator<Item = Edge>,
    ) -> Self {
        let mut diagram = Self::new();
        diagram.load(nodes, edges);
        diagram
    }

    fn load(&mut self, nodes: impl IntoIterator<Item = Node>, edges: impl IntoIterator<Item = Edge>) {
        for node in nodes {
            if self.node_index.contains_key(&node.id) {
                log::warn!("dropping seed node with duplicate id {}", node.id);
                continue;
            }
            self.ids.reserve_node(node.id);
            self.insert_node(node);
        }
        for edge in edges {
            if self.edge_index.contains_key(&edge.id) {
                log::warn!("dropping seed edge with duplicate id {}", edge.id);
                continue;
            }
            let (Some(&s), Some(&t)) = (
                self.node_index.get(&edge.source),
                self.node_index.get(&edge.target),
            ) else {
                log::warn!(
                    "dropping seed edge {}: endpoint {} -> {} missing",
                    edge.id,
                    edge.source,
                    edge.target
                );
                continue;
            };
            self.ids.reserve_edge(edge.id);
            self.insert_edge(s, t, edge);
        }
    }

    fn insert_node(&mut self, node: Node) -> NodeId {
        let id = node.id;
        let idx = self.graph.add_node(node);
        self.node_index.insert(id, idx);
        self.node_order.push(id);
        id
    }

    fn insert_edge(&mut self, s: NodeIndex, t: NodeIndex, edge: Edge) -> EdgeId {
        let id = edge.id;
        let idx = self.graph.add_edge(s, t, edge);
        self.edge_index.insert(id, idx);
        self.edge_order.push(id);
        id
    }

    // ─── Mutations ───────────────────────────────────────────────────────

    /// Place a new symbol. The position is stored as given.
    pub fn add_node(&mut self, kind: SymbolKind, position: Position) -> NodeId {
        let id = self.ids.next_node();
        log::debug!("add node {id} ({kind}) at ({}, {})", position.x, position.y);
        self.insert_node(Node::new(id, kind, position))
    }

    /// Remove nodes and every edge touching them. Unknown ids are skipped.
    /// Returns how many nodes were removed.
    pub fn delete_nodes(&mut self, ids: &[NodeId]) -> usize {
        let mut removed = 0;
        for id in ids {
            let Some(idx) = self.node_index.remove(id) else {
                continue;
            };
            let incident: Vec<EdgeId> = self
                .graph
                .edges_directed(idx, Direction::Outgoing)
                .chain(self.graph.edges_directed(idx, Direction::Incoming))
                .map(|e| e.weight().id)
                .collect();
            for edge in &incident {
                self.edge_index.remove(edge);
            }
            self.edge_order.retain(|e| !incident.contains(e));
            self.node_order.retain(|n| n != id);
            // StableGraph drops the incident edges with the node.
            self.graph.remove_node(idx);
            removed += 1;
        }
        if removed > 0 {
            log::debug!("deleted {removed} node(s)");
        }
        removed
    }

    /// Connect two existing nodes. Self-loops are accepted here.
    pub fn add_edge(&mut self, conn: Connection) -> Result<EdgeId, GraphError> {
        let s = *self
            .node_index
            .get(&conn.source)
            .ok_or(GraphError::UnknownNode(conn.source))?;
        let t = *self
            .node_index
            .get(&conn.target)
            .ok_or(GraphError::UnknownNode(conn.target))?;
        let id = self.ids.next_edge();
        log::debug!("add edge {id}: {} -> {}", conn.source, conn.target);
        let edge = Edge {
            id,
            source: conn.source,
            target: conn.target,
            source_handle: conn.source_handle,
            target_handle: conn.target_handle,
            selected: false,
        };
        Ok(self.insert_edge(s, t, edge))
    }

    /// Remove edges. Unknown ids are skipped. Returns how many were removed.
    pub fn delete_edges(&mut self, ids: &[EdgeId]) -> usize {
        let mut removed = 0;
        for id in ids {
            let Some(idx) = self.edge_index.remove(id) else {
                continue;
            };
            self.graph.remove_edge(idx);
            self.edge_order.retain(|e| e != id);
            removed += 1;
        }
        removed
    }

    /// Merge attribute changes into a node. Returns `false` for unknown ids
    /// and for patches that change nothing.
    pub fn update_node_attributes(&mut self, id: NodeId, patch: NodePatch) -> bool {
        let Some(node) = self.node_mut(id) else {
            return false;
        };
        patch.apply(node)
    }

    /// Replace the whole content with a snapshot. The id counter keeps its
    /// position so ids are never handed out twice.
    pub fn restore(&mut self, snapshot: &Snapshot) {
        self.graph.clear();
        self.node_index.clear();
        self.edge_index.clear();
        self.node_order.clear();
        self.edge_order.clear();
        self.load(snapshot.nodes.iter().cloned(), snapshot.edges.iter().cloned());
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(
            self.nodes().cloned().collect(),
            self.edges().cloned().collect(),
        )
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    /// Nodes in insertion (z) order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.node_order
            .iter()
            .filter_map(|id| self.node_index.get(id).map(|&idx| &self.graph[idx]))
    }

    /// Edges in insertion (z) order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edge_order
            .iter()
            .filter_map(|id| self.edge_index.get(id).map(|&idx| &self.graph[idx]))
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.node_index.get(&id).map(|&idx| &self.graph[idx])
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let idx = *self.node_index.get(&id)?;
        self.graph.node_weight_mut(idx)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edge_index.get(&id).map(|&idx| &self.graph[idx])
    }

    fn edge_mut(&mut self, id: EdgeId) -> Option<&mut Edge> {
        let idx = *self.edge_index.get(&id)?;
        self.graph.edge_weight_mut(idx)
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node_index.contains_key(&id)
    }

    pub fn node_count(&self) -> usize {
        self.node_order.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_order.is_empty() && self.edge_order.is_empty()
    }

    /// Whether an edge with the same endpoints and handles already exists,
    /// in either direction.
    pub fn connection_exists(&self, conn: &Connection) -> bool {
        let reversed = Connection {
            source: conn.target,
            source_handle: conn.target_handle,
            target: conn.source,
            target_handle: conn.source_handle,
        };
        self.edges().any(|e| {
            let c = e.connection();
            c == *conn || c == reversed
        })
    }

    // ─── Geometry ────────────────────────────────────────────────────────

    /// Node rectangle in diagram space.
    pub fn node_bounds(&self, id: NodeId) -> Option<Bounds> {
        self.node(id).map(node_bounds)
    }

    /// Bounding box of every node, or `None` for an empty diagram.
    pub fn content_bounds(&self) -> Option<Bounds> {
        self.nodes().map(node_bounds).reduce(|a, b| a.union(&b))
    }

    /// Diagram-space anchor of a node's handle, if the node exposes it.
    pub fn handle_point(&self, id: NodeId, side: HandleSide) -> Option<(f32, f32)> {
        let node = self.node(id)?;
        handle_point(node, side)
    }

    /// Start and end points of an edge. Missing handles fall back to the
    /// node's first handle of the matching role, then to its center.
    pub fn edge_endpoints(&self, edge: &Edge) -> Option<((f32, f32), (f32, f32))> {
        let source = self.node(edge.source)?;
        let target = self.node(edge.target)?;
        Some((
            endpoint(source, edge.source_handle, HandleRole::Source),
            endpoint(target, edge.target_handle, HandleRole::Target),
        ))
    }

    // ─── Selection ───────────────────────────────────────────────────────
    //
    // Selection is transient view state: it travels with snapshots but is
    // never a committed change on its own.

    pub fn set_node_selected(&mut self, id: NodeId, selected: bool) -> bool {
        match self.node_mut(id) {
            Some(node) if node.selected != selected => {
                node.selected = selected;
                true
            }
            _ => false,
        }
    }

    pub fn set_edge_selected(&mut self, id: EdgeId, selected: bool) -> bool {
        match self.edge_mut(id) {
            Some(edge) if edge.selected != selected => {
                edge.selected = selected;
                true
            }
            _ => false,
        }
    }

    /// Deselect everything. Returns whether anything was selected.
    pub fn clear_selection(&mut self) -> bool {
        let mut changed = false;
        for node in self.graph.node_weights_mut() {
            changed |= std::mem::replace(&mut node.selected, false);
        }
        for edge in self.graph.edge_weights_mut() {
            changed |= std::mem::replace(&mut edge.selected, false);
        }
        changed
    }

    pub fn select_all(&mut self) -> bool {
        let mut changed = false;
        for node in self.graph.node_weights_mut() {
            changed |= !std::mem::replace(&mut node.selected, true);
        }
        for edge in self.graph.edge_weights_mut() {
            changed |= !std::mem::replace(&mut edge.selected, true);
        }
        changed
    }

    pub fn selected_nodes(&self) -> Vec<NodeId> {
        self.nodes().filter(|n| n.selected).map(|n| n.id).collect()
    }

    pub fn selected_edges(&self) -> Vec<EdgeId> {
        self.edges().filter(|e| e.selected).map(|e| e.id).collect()
    }

    pub fn has_selection(&self) -> bool {
        self.nodes().any(|n| n.selected) || self.edges().any(|e| e.selected)
    }
}

fn node_bounds(node: &Node) -> Bounds {
    let spec = node.kind.spec();
    Bounds::new(node.position.x, node.position.y, spec.width, spec.height)
}

/// Diagram-space anchor of a handle on a node.
pub fn handle_point(node: &Node, side: HandleSide) -> Option<(f32, f32)> {
    let spec = node.kind.spec();
    if !spec.has_handle(side) {
        return None;
    }
    let (ax, ay) = spec.handle_anchor(side);
    Some((node.position.x + ax, node.position.y + ay))
}

fn endpoint(node: &Node, handle: Option<HandleSide>, role: HandleRole) -> (f32, f32) {
    handle
        .or_else(|| node.kind.spec().first_handle(role))
        .and_then(|side| handle_point(node, side))
        .unwrap_or_else(|| node_bounds(node).center())
}
