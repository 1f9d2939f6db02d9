//! Resolution-independent vector drawings produced by symbol renderers.
//!
//! Coordinates are in the symbol's intrinsic box, origin at the top-left.
//! All primitives are painted in the symbol's foreground color; painters
//! decide what that color is.

use smallvec::SmallVec;

/// How a closed shape is painted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fill {
    /// Filled with the foreground color, no outline.
    Solid,
    /// Outline only, with the given stroke width.
    Outline(f32),
}

/// A single drawing primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Line {
        from: (f32, f32),
        to: (f32, f32),
        width: f32,
    },
    Circle {
        center: (f32, f32),
        r: f32,
        fill: Fill,
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Fill,
    },
    /// Filled polygon.
    Polygon { points: SmallVec<[(f32, f32); 8]> },
    /// Bold, horizontally centered text. `y` is the baseline.
    Text {
        x: f32,
        y: f32,
        size: f32,
        content: &'static str,
    },
}

/// The output of a symbol renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct Drawing {
    pub width: f32,
    pub height: f32,
    pub primitives: Vec<Primitive>,
}

impl Drawing {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            primitives: Vec::new(),
        }
    }

    /// Stroked line with the default 2-unit width.
    pub fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> &mut Self {
        self.line_w(x1, y1, x2, y2, 2.0)
    }

    pub fn line_w(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, width: f32) -> &mut Self {
        self.primitives.push(Primitive::Line {
            from: (x1, y1),
            to: (x2, y2),
            width,
        });
        self
    }

    pub fn circle(&mut self, cx: f32, cy: f32, r: f32, fill: Fill) -> &mut Self {
        self.primitives.push(Primitive::Circle {
            center: (cx, cy),
            r,
            fill,
        });
        self
    }

    pub fn rect(&mut self, x: f32, y: f32, width: f32, height: f32, fill: Fill) -> &mut Self {
        self.primitives.push(Primitive::Rect {
            x,
            y,
            width,
            height,
            fill,
        });
        self
    }

    pub fn polygon(&mut self, points: &[(f32, f32)]) -> &mut Self {
        self.primitives.push(Primitive::Polygon {
            points: SmallVec::from_slice(points),
        });
        self
    }

    pub fn text(&mut self, x: f32, y: f32, size: f32, content: &'static str) -> &mut Self {
        self.primitives.push(Primitive::Text {
            x,
            y,
            size,
            content,
        });
        self
    }
}
