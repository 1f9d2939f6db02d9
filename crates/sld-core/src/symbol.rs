//! IEC 60617 symbol catalog for single-line diagrams.
//!
//! The catalog is static data indexed by [`SymbolKind`]: display metadata,
//! intrinsic size, palette category and connection-handle layout. Adding a
//! symbol means adding one enum variant, one [`SymbolSpec`] row and one
//! renderer; nothing else branches on the kind.

use crate::drawing::{Drawing, Fill};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ─── Kinds ───────────────────────────────────────────────────────────────

/// The closed set of electrical symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SymbolKind {
    Transformer,
    CircuitBreaker,
    Disconnect,
    GroundSwitch,
    Busbar,
    PowerLine,
    Load,
    Generator,
    Ct,
    Fuse,
}

impl SymbolKind {
    /// Every kind, in catalog order.
    pub const ALL: [SymbolKind; 10] = [
        SymbolKind::Transformer,
        SymbolKind::CircuitBreaker,
        SymbolKind::Disconnect,
        SymbolKind::GroundSwitch,
        SymbolKind::Busbar,
        SymbolKind::PowerLine,
        SymbolKind::Load,
        SymbolKind::Generator,
        SymbolKind::Ct,
        SymbolKind::Fuse,
    ];

    /// The identifier used in drag payloads and host JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            SymbolKind::Transformer => "transformer",
            SymbolKind::CircuitBreaker => "circuitBreaker",
            SymbolKind::Disconnect => "disconnect",
            SymbolKind::GroundSwitch => "groundSwitch",
            SymbolKind::Busbar => "busbar",
            SymbolKind::PowerLine => "powerLine",
            SymbolKind::Load => "load",
            SymbolKind::Generator => "generator",
            SymbolKind::Ct => "ct",
            SymbolKind::Fuse => "fuse",
        }
    }

    /// Catalog metadata for this kind.
    pub fn spec(self) -> &'static SymbolSpec {
        let spec = &CATALOG[self as usize];
        debug_assert_eq!(spec.kind, self, "catalog row out of order");
        spec
    }

    /// Whether the node carries a meaningful open/closed state.
    pub fn is_switching(self) -> bool {
        matches!(
            self,
            SymbolKind::CircuitBreaker | SymbolKind::Disconnect | SymbolKind::GroundSwitch
        )
    }

    /// Render the symbol. Pure: the same inputs always give the same drawing.
    /// `state` is ignored by kinds that are not switching devices.
    pub fn render(self, state: SwitchState) -> Drawing {
        match self {
            SymbolKind::Transformer => transformer(),
            SymbolKind::CircuitBreaker => circuit_breaker(state),
            SymbolKind::Disconnect => disconnect(state),
            SymbolKind::GroundSwitch => ground_switch(state),
            SymbolKind::Busbar => busbar(),
            SymbolKind::PowerLine => power_line(),
            SymbolKind::Load => load(),
            SymbolKind::Generator => generator(),
            SymbolKind::Ct => current_transformer(),
            SymbolKind::Fuse => fuse(),
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A string that names no symbol in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown symbol kind `{0}`")]
pub struct UnknownSymbol(pub String);

impl FromStr for SymbolKind {
    type Err = UnknownSymbol;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SymbolKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownSymbol(s.to_string()))
    }
}

/// Open/closed state of a switching device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SwitchState {
    Open,
    #[default]
    Closed,
}

impl SwitchState {
    pub fn toggled(self) -> Self {
        match self {
            SwitchState::Open => SwitchState::Closed,
            SwitchState::Closed => SwitchState::Open,
        }
    }
}

// ─── Handles ─────────────────────────────────────────────────────────────

/// Side of a node's boundary that exposes a connection point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleSide {
    Top,
    Bottom,
    Left,
    Right,
}

/// Direction a handle plays in a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleRole {
    Source,
    Target,
}

impl HandleSide {
    pub fn id(self) -> &'static str {
        match self {
            HandleSide::Top => "top",
            HandleSide::Bottom => "bottom",
            HandleSide::Left => "left",
            HandleSide::Right => "right",
        }
    }

    /// Top and left handles start connections; bottom and right end them.
    pub fn role(self) -> HandleRole {
        match self {
            HandleSide::Top | HandleSide::Left => HandleRole::Source,
            HandleSide::Bottom | HandleSide::Right => HandleRole::Target,
        }
    }
}

const VERTICAL: &[HandleSide] = &[HandleSide::Top, HandleSide::Bottom];
const HORIZONTAL: &[HandleSide] = &[HandleSide::Left, HandleSide::Right];
const TOP_ONLY: &[HandleSide] = &[HandleSide::Top];

// ─── Catalog ─────────────────────────────────────────────────────────────

/// Palette grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Equipment,
    Switching,
    Connection,
}

/// Immutable metadata for one symbol kind.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolSpec {
    pub kind: SymbolKind,
    /// Display name.
    pub name: &'static str,
    /// Short code shown under palette thumbnails.
    pub code: &'static str,
    pub width: f32,
    pub height: f32,
    pub category: Category,
    pub handles: &'static [HandleSide],
    /// Fill used for this kind on the minimap.
    pub minimap_color: &'static str,
}

impl SymbolSpec {
    pub fn has_handle(&self, side: HandleSide) -> bool {
        self.handles.contains(&side)
    }

    /// Handle anchor relative to the symbol's top-left corner.
    pub fn handle_anchor(&self, side: HandleSide) -> (f32, f32) {
        match side {
            HandleSide::Top => (self.width / 2.0, 0.0),
            HandleSide::Bottom => (self.width / 2.0, self.height),
            HandleSide::Left => (0.0, self.height / 2.0),
            HandleSide::Right => (self.width, self.height / 2.0),
        }
    }

    /// First handle with the given role, if the layout has one.
    pub fn first_handle(&self, role: HandleRole) -> Option<HandleSide> {
        self.handles.iter().copied().find(|h| h.role() == role)
    }
}

const DEFAULT_MINIMAP: &str = "#6b7280";

/// Indexed by `SymbolKind as usize`.
static CATALOG: [SymbolSpec; 10] = [
    SymbolSpec {
        kind: SymbolKind::Transformer,
        name: "Máy biến áp",
        code: "MBA",
        width: 60.0,
        height: 80.0,
        category: Category::Equipment,
        handles: VERTICAL,
        minimap_color: "#3b82f6",
    },
    SymbolSpec {
        kind: SymbolKind::CircuitBreaker,
        name: "Máy cắt",
        code: "MC",
        width: 40.0,
        height: 60.0,
        category: Category::Switching,
        handles: VERTICAL,
        minimap_color: "#ef4444",
    },
    SymbolSpec {
        kind: SymbolKind::Disconnect,
        name: "Dao cách ly",
        code: "DCL",
        width: 40.0,
        height: 50.0,
        category: Category::Switching,
        handles: VERTICAL,
        minimap_color: "#f97316",
    },
    SymbolSpec {
        kind: SymbolKind::GroundSwitch,
        name: "Dao tiếp địa",
        code: "TD",
        width: 40.0,
        height: 50.0,
        category: Category::Switching,
        handles: VERTICAL,
        minimap_color: "#f97316",
    },
    SymbolSpec {
        kind: SymbolKind::Busbar,
        name: "Thanh cái",
        code: "BUS",
        width: 200.0,
        height: 10.0,
        category: Category::Connection,
        handles: HORIZONTAL,
        minimap_color: "#64748b",
    },
    SymbolSpec {
        kind: SymbolKind::PowerLine,
        name: "Đường dây",
        code: "LINE",
        width: 100.0,
        height: 4.0,
        category: Category::Connection,
        handles: HORIZONTAL,
        minimap_color: DEFAULT_MINIMAP,
    },
    SymbolSpec {
        kind: SymbolKind::Load,
        name: "Phụ tải",
        code: "LOAD",
        width: 50.0,
        height: 50.0,
        category: Category::Equipment,
        handles: TOP_ONLY,
        minimap_color: DEFAULT_MINIMAP,
    },
    SymbolSpec {
        kind: SymbolKind::Generator,
        name: "Máy phát điện",
        code: "GEN",
        width: 60.0,
        height: 60.0,
        category: Category::Equipment,
        handles: TOP_ONLY,
        minimap_color: DEFAULT_MINIMAP,
    },
    SymbolSpec {
        kind: SymbolKind::Ct,
        name: "Biến dòng",
        code: "CT",
        width: 40.0,
        height: 40.0,
        category: Category::Equipment,
        handles: HORIZONTAL,
        minimap_color: DEFAULT_MINIMAP,
    },
    SymbolSpec {
        kind: SymbolKind::Fuse,
        name: "Cầu chì",
        code: "FUSE",
        width: 30.0,
        height: 50.0,
        category: Category::Switching,
        handles: VERTICAL,
        minimap_color: DEFAULT_MINIMAP,
    },
];

// ─── Renderers ───────────────────────────────────────────────────────────

fn transformer() -> Drawing {
    let mut d = Drawing::new(60.0, 80.0);
    // Primary and secondary windings
    d.circle(30.0, 25.0, 15.0, Fill::Outline(2.0))
        .circle(30.0, 55.0, 15.0, Fill::Outline(2.0))
        .line(30.0, 0.0, 30.0, 10.0)
        .line(30.0, 70.0, 30.0, 80.0);
    d
}

fn circuit_breaker(state: SwitchState) -> Drawing {
    let mut d = Drawing::new(40.0, 60.0);
    d.line(20.0, 0.0, 20.0, 15.0)
        .rect(15.0, 15.0, 10.0, 4.0, Fill::Solid);
    match state {
        SwitchState::Closed => d.line(20.0, 19.0, 20.0, 41.0),
        SwitchState::Open => d.line(20.0, 19.0, 32.0, 38.0),
    };
    d.rect(15.0, 41.0, 10.0, 4.0, Fill::Solid)
        .line(20.0, 45.0, 20.0, 60.0)
        // Breaker cross
        .line_w(10.0, 25.0, 18.0, 35.0, 1.5)
        .line_w(18.0, 25.0, 10.0, 35.0, 1.5);
    d
}

fn disconnect(state: SwitchState) -> Drawing {
    let mut d = Drawing::new(40.0, 50.0);
    d.line(20.0, 0.0, 20.0, 12.0)
        .circle(20.0, 14.0, 3.0, Fill::Solid);
    match state {
        SwitchState::Closed => d.line(20.0, 14.0, 20.0, 36.0),
        SwitchState::Open => d.line(20.0, 14.0, 32.0, 32.0),
    };
    d.circle(20.0, 36.0, 3.0, Fill::Solid)
        .line(20.0, 38.0, 20.0, 50.0);
    d
}

fn ground_switch(state: SwitchState) -> Drawing {
    let mut d = Drawing::new(40.0, 50.0);
    d.line(20.0, 0.0, 20.0, 10.0)
        .circle(20.0, 12.0, 3.0, Fill::Solid);
    match state {
        SwitchState::Closed => d.line(20.0, 12.0, 20.0, 28.0),
        SwitchState::Open => d.line(20.0, 12.0, 8.0, 26.0),
    };
    // Earth bars, widest first
    d.line(10.0, 30.0, 30.0, 30.0)
        .line(13.0, 35.0, 27.0, 35.0)
        .line(16.0, 40.0, 24.0, 40.0)
        .line(19.0, 45.0, 21.0, 45.0);
    d
}

fn busbar() -> Drawing {
    let mut d = Drawing::new(200.0, 10.0);
    d.rect(0.0, 3.0, 200.0, 4.0, Fill::Solid);
    d
}

fn power_line() -> Drawing {
    let mut d = Drawing::new(100.0, 4.0);
    d.line(0.0, 2.0, 100.0, 2.0);
    d
}

fn load() -> Drawing {
    let mut d = Drawing::new(50.0, 50.0);
    d.line(25.0, 0.0, 25.0, 10.0).polygon(&[
        (25.0, 10.0),
        (15.0, 25.0),
        (20.0, 25.0),
        (20.0, 45.0),
        (30.0, 45.0),
        (30.0, 25.0),
        (35.0, 25.0),
    ]);
    d
}

fn generator() -> Drawing {
    let mut d = Drawing::new(60.0, 60.0);
    d.circle(30.0, 35.0, 20.0, Fill::Outline(2.0))
        .text(30.0, 41.0, 16.0, "G")
        .line(30.0, 0.0, 30.0, 15.0);
    d
}

fn current_transformer() -> Drawing {
    let mut d = Drawing::new(40.0, 40.0);
    d.line(0.0, 20.0, 40.0, 20.0)
        .circle(20.0, 20.0, 12.0, Fill::Outline(2.0))
        .circle(20.0, 8.0, 2.0, Fill::Solid)
        .circle(20.0, 32.0, 2.0, Fill::Solid);
    d
}

fn fuse() -> Drawing {
    let mut d = Drawing::new(30.0, 50.0);
    d.line(15.0, 0.0, 15.0, 10.0)
        .rect(5.0, 10.0, 20.0, 30.0, Fill::Outline(2.0))
        .line_w(15.0, 15.0, 15.0, 35.0, 1.0)
        .line(15.0, 40.0, 15.0, 50.0);
    d
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn catalog_rows_match_enum_order() {
        for kind in SymbolKind::ALL {
            assert_eq!(kind.spec().kind, kind);
        }
    }

    #[test]
    fn parse_roundtrip_for_every_kind() {
        for kind in SymbolKind::ALL {
            assert_eq!(kind.as_str().parse::<SymbolKind>(), Ok(kind));
        }
    }

    #[test]
    fn unknown_payload_is_rejected() {
        assert!("capacitor".parse::<SymbolKind>().is_err());
        assert!("".parse::<SymbolKind>().is_err());
        assert!("Transformer".parse::<SymbolKind>().is_err());
    }

    #[test]
    fn serde_names_match_payload_ids() {
        for kind in SymbolKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn handle_layouts() {
        use HandleSide::*;
        for kind in [SymbolKind::Busbar, SymbolKind::PowerLine, SymbolKind::Ct] {
            assert_eq!(kind.spec().handles, &[Left, Right]);
        }
        for kind in [SymbolKind::Load, SymbolKind::Generator] {
            assert_eq!(kind.spec().handles, &[Top]);
        }
        for kind in [
            SymbolKind::Transformer,
            SymbolKind::CircuitBreaker,
            SymbolKind::Disconnect,
            SymbolKind::GroundSwitch,
            SymbolKind::Fuse,
        ] {
            assert_eq!(kind.spec().handles, &[Top, Bottom]);
        }
    }

    #[test]
    fn drawing_size_matches_intrinsic_size() {
        for kind in SymbolKind::ALL {
            let spec = kind.spec();
            let d = kind.render(SwitchState::Closed);
            assert_eq!((d.width, d.height), (spec.width, spec.height), "{kind}");
            assert!(!d.primitives.is_empty());
        }
    }

    #[test]
    fn switching_devices_draw_state() {
        for kind in SymbolKind::ALL {
            let open = kind.render(SwitchState::Open);
            let closed = kind.render(SwitchState::Closed);
            if kind.is_switching() {
                assert_ne!(open, closed, "{kind} must distinguish open/closed");
            } else {
                assert_eq!(open, closed, "{kind} ignores switch state");
            }
            assert_eq!(kind.render(SwitchState::Open), open);
        }
    }

    #[test]
    fn handle_anchors_sit_on_the_boundary() {
        let spec = SymbolKind::Transformer.spec();
        assert_eq!(spec.handle_anchor(HandleSide::Top), (30.0, 0.0));
        assert_eq!(spec.handle_anchor(HandleSide::Bottom), (30.0, 80.0));
        let bus = SymbolKind::Busbar.spec();
        assert_eq!(bus.handle_anchor(HandleSide::Right), (200.0, 5.0));
    }
}
