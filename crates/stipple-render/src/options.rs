//! Per-trace options uploaded into draw batches.
//!
//! Positions are interleaved `[x0, y0, x1, y1, ...]` in linearized data
//! space, with NaN marking a missing sample. Marker, text and error batches
//! share the trace's buffer through an `Arc`; line and fill batches own a
//! reshaped copy.

use crate::Color;
use std::sync::Arc;

/// An attribute that is either shared by every point or given per point.
#[derive(Debug, Clone, PartialEq)]
pub enum PerPoint<T> {
    Scalar(T),
    Array(Vec<T>),
}

impl<T> PerPoint<T> {
    pub fn scalar(value: T) -> Self {
        Self::Scalar(value)
    }

    pub fn array(values: Vec<T>) -> Self {
        Self::Array(values)
    }

    /// Value for point `index`.
    ///
    /// Arrays shorter than the trace yield `None` past their end rather than
    /// falling back to anything.
    pub fn get(&self, index: usize) -> Option<&T> {
        match self {
            Self::Scalar(value) => Some(value),
            Self::Array(values) => values.get(index),
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    /// The scalar value, or the first array entry.
    pub fn first(&self) -> Option<&T> {
        self.get(0)
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> PerPoint<U> {
        match self {
            Self::Scalar(value) => PerPoint::Scalar(f(value)),
            Self::Array(values) => PerPoint::Array(values.iter().map(f).collect()),
        }
    }
}

impl<T: Default> Default for PerPoint<T> {
    fn default() -> Self {
        Self::Scalar(T::default())
    }
}

/// How the area attached to a trace is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FillMode {
    #[default]
    None,
    /// Down (or up) to `y = 0`.
    ToZeroY,
    /// Across to `x = 0`.
    ToZeroX,
    /// Each connected run closed onto itself.
    ToSelf,
    /// Like `ToSelf`, but stacked under the neighbouring trace's fill.
    ToNext,
    /// Band between this trace and the next trace on the subplot.
    ToNextY,
}

impl FillMode {
    /// Whether the fill region involves the neighbouring trace.
    pub fn fills_to_next(self) -> bool {
        matches!(self, Self::ToNext | Self::ToNextY)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MarkerSymbol {
    #[default]
    Circle,
    Square,
    Diamond,
    Cross,
    X,
    TriangleUp,
    TriangleDown,
    Star,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextBaseline {
    Top,
    #[default]
    Middle,
    Bottom,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineSpec {
    pub positions: Vec<f64>,
    pub color: Color,
    pub width: f32,
    /// Dash pattern in pixels, `None` for solid.
    pub dashes: Option<Vec<f32>>,
    pub opacity: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FillSpec {
    pub positions: Vec<f64>,
    pub color: Color,
    pub opacity: f32,
    /// Vertex indices where excluded sub-polygons start.
    pub hole: Vec<usize>,
    pub mode: FillMode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub positions: Arc<[f64]>,
    pub size: PerPoint<f32>,
    pub color: PerPoint<Color>,
    pub border_color: PerPoint<Color>,
    pub border_width: PerPoint<f32>,
    pub symbol: PerPoint<MarkerSymbol>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorSpec {
    pub positions: Arc<[f64]>,
    /// Four values per point: `[left, right, bottom, top]` extents.
    pub errors: Vec<f64>,
    pub color: Color,
    pub thickness: f32,
    /// Whisker cap width in pixels.
    pub cap_width: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextSpec {
    pub positions: Arc<[f64]>,
    pub text: PerPoint<String>,
    pub color: PerPoint<Color>,
    pub font_family: PerPoint<String>,
    pub font_size: PerPoint<f32>,
    pub align: PerPoint<TextAlign>,
    pub baseline: PerPoint<TextBaseline>,
    /// Pixel offset from the anchor point.
    pub offset: PerPoint<[f32; 2]>,
}

/// Where a batch draws on the canvas and which data window it shows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportRange {
    /// `[left, bottom, right, top]` in canvas pixels.
    pub viewport: [f64; 4],
    /// `[x_min, y_min, x_max, y_max]` in linearized data space.
    pub range: [f64; 4],
}
