use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// Process-wide interner backing [`NodeId`] and [`EdgeId`].
///
/// Only stores strings. Identity is allocated per diagram by [`IdAllocator`].
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

macro_rules! interned_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(Spur);

        impl $name {
            /// Intern a string as an ID, or return the existing one.
            pub fn intern(s: &str) -> Self {
                $name(INTERNER.get_or_intern(s))
            }

            /// Look up an already interned ID without storing new strings.
            pub fn lookup(s: &str) -> Option<Self> {
                INTERNER.get(s).map($name)
            }

            /// Resolve back to a string slice.
            pub fn as_str(&self) -> &str {
                INTERNER.resolve(&self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "#{}", self.as_str())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Ok($name::intern(&s))
            }
        }
    };
}

interned_id!(
    /// Identifier of a symbol node, unique within one diagram.
    NodeId
);

interned_id!(
    /// Identifier of a connection, unique within one diagram.
    EdgeId
);

const NODE_PREFIX: &str = "node_";
const EDGE_PREFIX: &str = "edge_";

/// Session-scoped ID counter.
///
/// Each diagram owns one allocator, so two editors never share mutable
/// counter state. Counters only move forward: an ID handed out once is never
/// handed out again while the allocator lives, even after undo.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next_node: u64,
    next_edge: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next `node_N` ID.
    pub fn next_node(&mut self) -> NodeId {
        let n = self.next_node;
        self.next_node += 1;
        NodeId::intern(&format!("{NODE_PREFIX}{n}"))
    }

    /// Allocate the next `edge_N` ID.
    pub fn next_edge(&mut self) -> EdgeId {
        let n = self.next_edge;
        self.next_edge += 1;
        EdgeId::intern(&format!("{EDGE_PREFIX}{n}"))
    }

    /// Advance the node counter past a seeded ID of the form `node_N`.
    pub fn reserve_node(&mut self, id: NodeId) {
        if let Some(n) = numeric_suffix(id.as_str(), NODE_PREFIX) {
            self.next_node = self.next_node.max(n.saturating_add(1));
        }
    }

    /// Advance the edge counter past a seeded ID of the form `edge_N`.
    pub fn reserve_edge(&mut self, id: EdgeId) {
        if let Some(n) = numeric_suffix(id.as_str(), EDGE_PREFIX) {
            self.next_edge = self.next_edge.max(n.saturating_add(1));
        }
    }
}

fn numeric_suffix(s: &str, prefix: &str) -> Option<u64> {
    s.strip_prefix(prefix)?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = NodeId::intern("feeder_1");
        let b = NodeId::intern("feeder_1");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "feeder_1");
    }

    #[test]
    fn lookup_does_not_intern() {
        assert_eq!(NodeId::lookup("substation_never_seen"), None);
        assert_eq!(NodeId::lookup("substation_never_seen"), None);
        let id = NodeId::intern("substation_seen");
        assert_eq!(NodeId::lookup("substation_seen"), Some(id));
        assert_eq!(EdgeId::lookup("substation_seen").unwrap().as_str(), "substation_seen");
    }

    #[test]
    fn allocator_is_monotonic() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.next_node().as_str(), "node_0");
        assert_eq!(ids.next_node().as_str(), "node_1");
        assert_eq!(ids.next_edge().as_str(), "edge_0");
    }

    #[test]
    fn separate_allocators_do_not_share_counters() {
        let mut a = IdAllocator::new();
        let mut b = IdAllocator::new();
        a.next_node();
        a.next_node();
        assert_eq!(b.next_node().as_str(), "node_0");
    }

    #[test]
    fn reserve_skips_past_seeded_ids() {
        let mut ids = IdAllocator::new();
        ids.reserve_node(NodeId::intern("node_7"));
        ids.reserve_node(NodeId::intern("node_3"));
        ids.reserve_node(NodeId::intern("breaker_a"));
        ids.reserve_edge(EdgeId::intern("edge_2"));
        assert_eq!(ids.next_node().as_str(), "node_8");
        assert_eq!(ids.next_edge().as_str(), "edge_3");
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = NodeId::intern("node_42");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"node_42\"");
        let back: NodeId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
