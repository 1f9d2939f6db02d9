//! Node and edge records as the host sees them.
//!
//! These are plain values: the [`Diagram`](crate::graph::Diagram) owns the
//! live graph, and a [`Snapshot`] freezes its ordered contents for history
//! and change notification. JSON field names follow the host protocol
//! (`voltageTag`, `switchState`, `sourceNodeId`, …).

use crate::id::{EdgeId, NodeId};
use crate::symbol::{HandleSide, SwitchState, SymbolKind};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A point in diagram coordinates. Node positions are top-left corners.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One placed electrical symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    pub kind: SymbolKind,
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voltage_tag: Option<String>,
    /// Only drawn for switching kinds.
    #[serde(default)]
    pub switch_state: SwitchState,
    #[serde(default)]
    pub selected: bool,
}

impl Node {
    pub fn new(id: NodeId, kind: SymbolKind, position: Position) -> Self {
        Self {
            id,
            kind,
            position,
            label: None,
            voltage_tag: None,
            switch_state: SwitchState::Closed,
            selected: false,
        }
    }
}

/// A connection between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: EdgeId,
    #[serde(rename = "sourceNodeId")]
    pub source: NodeId,
    #[serde(rename = "targetNodeId")]
    pub target: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<HandleSide>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<HandleSide>,
    #[serde(default)]
    pub selected: bool,
}

impl Edge {
    pub fn connection(&self) -> Connection {
        Connection {
            source: self.source,
            source_handle: self.source_handle,
            target: self.target,
            target_handle: self.target_handle,
        }
    }

    pub fn touches(&self, node: NodeId) -> bool {
        self.source == node || self.target == node
    }
}

/// The endpoints of a prospective edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Connection {
    pub source: NodeId,
    pub source_handle: Option<HandleSide>,
    pub target: NodeId,
    pub target_handle: Option<HandleSide>,
}

impl Connection {
    pub fn new(source: NodeId, target: NodeId) -> Self {
        Self {
            source,
            source_handle: None,
            target,
            target_handle: None,
        }
    }

    pub fn with_handles(mut self, source: HandleSide, target: HandleSide) -> Self {
        self.source_handle = Some(source);
        self.target_handle = Some(target);
        self
    }
}

/// Partial attribute update. `None` leaves a field untouched.
///
/// An empty `label` or `voltage_tag` string clears the attribute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodePatch {
    pub label: Option<String>,
    pub voltage_tag: Option<String>,
    pub switch_state: Option<SwitchState>,
    pub position: Option<Position>,
}

impl NodePatch {
    pub fn is_empty(&self) -> bool {
        self.label.is_none()
            && self.voltage_tag.is_none()
            && self.switch_state.is_none()
            && self.position.is_none()
    }

    pub fn position(position: Position) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    /// Merge into `node`. Returns whether anything changed.
    pub(crate) fn apply(self, node: &mut Node) -> bool {
        let before = node.clone();
        if let Some(label) = self.label {
            node.label = non_empty(label);
        }
        if let Some(tag) = self.voltage_tag {
            node.voltage_tag = non_empty(tag);
        }
        if let Some(state) = self.switch_state {
            node.switch_state = state;
        }
        if let Some(position) = self.position {
            node.position = position;
        }
        *node != before
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

/// Immutable, cheaply clonable copy of the ordered node and edge lists.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub nodes: Arc<[Node]>,
    pub edges: Arc<[Edge]>,
}

impl Snapshot {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self {
            nodes: nodes.into(),
            edges: edges.into(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Same content ignoring the transient `selected` flags.
    pub fn same_content(&self, other: &Snapshot) -> bool {
        fn strip_node(n: &Node) -> Node {
            Node {
                selected: false,
                ..n.clone()
            }
        }
        fn strip_edge(e: &Edge) -> Edge {
            Edge {
                selected: false,
                ..e.clone()
            }
        }
        self.nodes.len() == other.nodes.len()
            && self.edges.len() == other.edges.len()
            && self
                .nodes
                .iter()
                .zip(other.nodes.iter())
                .all(|(a, b)| strip_node(a) == strip_node(b))
            && self
                .edges
                .iter()
                .zip(other.edges.iter())
                .all(|(a, b)| strip_edge(a) == strip_edge(b))
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn node_json_uses_host_field_names() {
        let mut node = Node::new(
            NodeId::intern("node_0"),
            SymbolKind::CircuitBreaker,
            Position::new(15.0, 30.0),
        );
        node.voltage_tag = Some("22kV".into());
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["kind"], "circuitBreaker");
        assert_eq!(json["voltageTag"], "22kV");
        assert_eq!(json["switchState"], "closed");
        assert!(json.get("label").is_none());
    }

    #[test]
    fn seed_node_defaults_missing_fields() {
        let node: Node = serde_json::from_str(
            r#"{"id":"n1","kind":"disconnect","position":{"x":1,"y":2}}"#,
        )
        .unwrap();
        assert_eq!(node.switch_state, SwitchState::Closed);
        assert!(!node.selected);
        assert_eq!(node.label, None);
    }

    #[test]
    fn edge_json_uses_node_id_names() {
        let edge: Edge = serde_json::from_str(
            r#"{"id":"e1","sourceNodeId":"a","targetNodeId":"b","sourceHandle":"top"}"#,
        )
        .unwrap();
        assert_eq!(edge.source.as_str(), "a");
        assert_eq!(edge.source_handle, Some(HandleSide::Top));
        assert_eq!(edge.target_handle, None);
        let back = serde_json::to_value(&edge).unwrap();
        assert_eq!(back["targetNodeId"], "b");
    }

    #[test]
    fn patch_merges_and_clears() {
        let mut node = Node::new(
            NodeId::intern("node_1"),
            SymbolKind::Transformer,
            Position::default(),
        );
        assert!(NodePatch::label("T1").apply(&mut node));
        assert_eq!(node.label.as_deref(), Some("T1"));
        assert!(!NodePatch::label("T1").apply(&mut node));
        assert!(NodePatch::label("").apply(&mut node));
        assert_eq!(node.label, None);
        assert!(!NodePatch::default().apply(&mut node));
    }

    #[test]
    fn same_content_ignores_selection() {
        let node = Node::new(
            NodeId::intern("node_2"),
            SymbolKind::Load,
            Position::default(),
        );
        let a = Snapshot::new(vec![node.clone()], vec![]);
        let b = Snapshot::new(
            vec![Node {
                selected: true,
                ..node
            }],
            vec![],
        );
        assert_ne!(a, b);
        assert!(a.same_content(&b));
    }
}
