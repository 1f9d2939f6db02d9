//! Orthogonal edge routing shared by the painter and hit testing.

use sld_core::{Diagram, Edge, HandleRole, HandleSide};
use smallvec::SmallVec;

/// Polyline in diagram coordinates, consecutive points distinct.
pub type Route = SmallVec<[(f32, f32); 4]>;

/// Route an edge as a step line: leave the source handle along its axis,
/// turn at the midpoint, arrive at the target handle along the same axis.
pub fn edge_route(diagram: &Diagram, edge: &Edge) -> Option<Route> {
    let (s, t) = diagram.edge_endpoints(edge)?;
    let side = edge.source_handle.or_else(|| {
        diagram
            .node(edge.source)
            .and_then(|n| n.kind.spec().first_handle(HandleRole::Source))
    });
    let horizontal = matches!(side, Some(HandleSide::Left | HandleSide::Right));

    let mut points: Route = SmallVec::new();
    if horizontal {
        let mx = (s.0 + t.0) / 2.0;
        points.extend([s, (mx, s.1), (mx, t.1), t]);
    } else {
        let my = (s.1 + t.1) / 2.0;
        points.extend([s, (s.0, my), (t.0, my), t]);
    }
    points.dedup();
    Some(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sld_core::{Connection, Position, SymbolKind};

    #[test]
    fn vertical_handles_route_through_midline() {
        let mut d = Diagram::new();
        let a = d.add_node(SymbolKind::CircuitBreaker, Position::new(0.0, 100.0));
        let b = d.add_node(SymbolKind::Transformer, Position::new(60.0, 0.0));
        let id = d
            .add_edge(Connection::new(a, b).with_handles(HandleSide::Top, HandleSide::Bottom))
            .unwrap();
        let edge = d.edge(id).unwrap();
        let route = edge_route(&d, edge).unwrap();
        assert_eq!(
            route.as_slice(),
            &[(20.0, 100.0), (20.0, 90.0), (90.0, 90.0), (90.0, 80.0)]
        );
    }

    #[test]
    fn aligned_handles_drop_repeated_turns() {
        let mut d = Diagram::new();
        let a = d.add_node(SymbolKind::Load, Position::new(0.0, 100.0));
        let b = d.add_node(SymbolKind::Transformer, Position::new(-5.0, 0.0));
        let id = d
            .add_edge(Connection::new(a, b).with_handles(HandleSide::Top, HandleSide::Bottom))
            .unwrap();
        let route = edge_route(&d, d.edge(id).unwrap()).unwrap();
        assert_eq!(route.as_slice(), &[(25.0, 100.0), (25.0, 90.0), (25.0, 80.0)]);
    }
}
