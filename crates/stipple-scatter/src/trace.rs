//! The user-facing trace model.
//!
//! A [`Trace`] is immutable for one calculation cycle. Sessions hold it in an
//! `Arc` and replace it wholesale when the data or style changes.

use bitflags::bitflags;
use stipple_render::{Color, FillMode, MarkerSymbol, PerPoint};

bitflags! {
    /// Which visual parts of a trace are drawn.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TraceMode: u8 {
        const LINES = 1 << 0;
        const MARKERS = 1 << 1;
        const TEXT = 1 << 2;
    }
}

impl Default for TraceMode {
    fn default() -> Self {
        Self::MARKERS
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineStyle {
    pub color: Color,
    pub width: f32,
    /// Dash pattern in pixels, `None` for solid.
    pub dash: Option<Vec<f32>>,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: Color::from_hex(0x1F77B4),
            width: 2.0,
            dash: None,
        }
    }
}

/// Marker outline.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerLine {
    pub color: PerPoint<Color>,
    pub width: PerPoint<f32>,
}

impl Default for MarkerLine {
    fn default() -> Self {
        Self {
            color: PerPoint::scalar(Color::WHITE),
            width: PerPoint::scalar(0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerStyle {
    /// Diameter in pixels.
    pub size: PerPoint<f32>,
    pub color: PerPoint<Color>,
    pub opacity: PerPoint<f32>,
    pub symbol: PerPoint<MarkerSymbol>,
    pub line: MarkerLine,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            size: PerPoint::scalar(6.0),
            color: PerPoint::scalar(Color::from_hex(0x1F77B4)),
            opacity: PerPoint::scalar(1.0),
            symbol: PerPoint::scalar(MarkerSymbol::Circle),
            line: MarkerLine::default(),
        }
    }
}

/// Style overrides applied to selected or unselected points.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SelectionStyle {
    pub marker_color: Option<Color>,
    pub marker_opacity: Option<f32>,
    pub marker_size: Option<f32>,
    pub text_color: Option<Color>,
}

impl SelectionStyle {
    pub fn has_marker_style(&self) -> bool {
        self.marker_color.is_some() || self.marker_opacity.is_some() || self.marker_size.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub family: PerPoint<String>,
    pub size: PerPoint<f32>,
    pub color: PerPoint<Color>,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            family: PerPoint::scalar("sans-serif".to_string()),
            size: PerPoint::scalar(12.0),
            color: PerPoint::scalar(Color::from_hex(0x444444)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VerticalPosition {
    Top,
    #[default]
    Middle,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HorizontalPosition {
    Left,
    #[default]
    Center,
    Right,
}

/// Where a text label sits relative to its point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextPosition {
    pub vertical: VerticalPosition,
    pub horizontal: HorizontalPosition,
}

impl TextPosition {
    pub const fn new(vertical: VerticalPosition, horizontal: HorizontalPosition) -> Self {
        Self {
            vertical,
            horizontal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HoverLabel {
    pub bgcolor: Option<PerPoint<Color>>,
    pub bordercolor: Option<PerPoint<Color>>,
    pub font: Option<Font>,
    pub namelength: Option<PerPoint<i32>>,
}

/// How the length of an error bar is derived.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorValue {
    /// Same absolute length for every point.
    Constant(f64),
    /// Percentage of the point's value.
    Percent(f64),
    /// Square root of the point's value.
    Sqrt,
    /// One length per point.
    Data(Vec<f64>),
}

impl ErrorValue {
    /// Length of the bar at a point with `value`. NaN when undefined.
    pub fn magnitude(&self, value: f64, index: usize) -> f64 {
        match self {
            Self::Constant(c) => *c,
            Self::Percent(p) => (value * p / 100.0).abs(),
            Self::Sqrt => value.abs().sqrt(),
            Self::Data(values) => values.get(index).copied().unwrap_or(f64::NAN),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorBars {
    pub visible: bool,
    /// Positive direction, and both directions when `minus` is `None`.
    pub plus: ErrorValue,
    /// Negative direction of an asymmetric bar.
    pub minus: Option<ErrorValue>,
    pub color: Color,
    pub thickness: f32,
    /// Whisker width in pixels.
    pub width: f32,
}

impl ErrorBars {
    pub fn symmetric(value: ErrorValue) -> Self {
        Self {
            visible: true,
            plus: value,
            minus: None,
            color: Color::from_hex(0x444444),
            thickness: 2.0,
            width: 4.0,
        }
    }

    pub fn asymmetric(plus: ErrorValue, minus: ErrorValue) -> Self {
        Self {
            minus: Some(minus),
            ..Self::symmetric(plus)
        }
    }

    /// `(minus, plus)` lengths at one point. Undefined lengths are NaN.
    pub fn extents(&self, value: f64, index: usize) -> (f64, f64) {
        let plus = self.plus.magnitude(value, index);
        let minus = match &self.minus {
            Some(minus) => minus.magnitude(value, index),
            None => plus,
        };
        (minus, plus)
    }
}

/// One dataset plotted on a subplot.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub name: String,
    /// Missing samples are NaN.
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub mode: TraceMode,
    pub visible: bool,
    pub opacity: f32,
    pub fill: FillMode,
    pub fillcolor: Option<Color>,
    pub line: LineStyle,
    pub marker: MarkerStyle,
    pub selected: SelectionStyle,
    pub unselected: SelectionStyle,
    /// Points selected before any interaction.
    pub selectedpoints: Option<Vec<usize>>,
    pub error_x: Option<ErrorBars>,
    pub error_y: Option<ErrorBars>,
    pub text: Option<PerPoint<String>>,
    pub hovertext: Option<PerPoint<String>>,
    pub textposition: PerPoint<TextPosition>,
    pub textfont: Font,
    pub customdata: Option<PerPoint<String>>,
    pub hoverlabel: Option<HoverLabel>,
    pub hoverinfo: Option<PerPoint<String>>,
    pub hovertemplate: Option<PerPoint<String>>,
}

impl Trace {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Self {
        Self {
            name: String::new(),
            x,
            y,
            mode: TraceMode::default(),
            visible: true,
            opacity: 1.0,
            fill: FillMode::None,
            fillcolor: None,
            line: LineStyle::default(),
            marker: MarkerStyle::default(),
            selected: SelectionStyle::default(),
            unselected: SelectionStyle::default(),
            selectedpoints: None,
            error_x: None,
            error_y: None,
            text: None,
            hovertext: None,
            textposition: PerPoint::default(),
            textfont: Font::default(),
            customdata: None,
            hoverlabel: None,
            hoverinfo: None,
            hovertemplate: None,
        }
    }

    /// Build from `(x, y)` pairs.
    pub fn from_points(points: &[(f64, f64)]) -> Self {
        let (x, y) = points.iter().copied().unzip();
        Self::new(x, y)
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_mode(mut self, mode: TraceMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_fill(mut self, fill: FillMode) -> Self {
        self.fill = fill;
        self
    }

    pub fn with_text(mut self, text: PerPoint<String>) -> Self {
        self.text = Some(text);
        self.mode |= TraceMode::TEXT;
        self
    }

    /// Number of points. Extra entries in the longer coordinate array are
    /// ignored.
    pub fn len(&self) -> usize {
        self.x.len().min(self.y.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_lines(&self) -> bool {
        self.mode.contains(TraceMode::LINES)
    }

    pub fn has_markers(&self) -> bool {
        self.mode.contains(TraceMode::MARKERS)
    }

    pub fn has_text(&self) -> bool {
        self.mode.contains(TraceMode::TEXT) && self.text.is_some()
    }

    /// The color that identifies the trace in legends and hover labels.
    pub fn color_at(&self, index: usize) -> Color {
        if self.has_markers() {
            if let Some(color) = self.marker.color.get(index) {
                return *color;
            }
        }
        if self.has_lines() {
            return self.line.color;
        }
        self.fillcolor.unwrap_or(self.line.color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_len_uses_shorter_axis() {
        let trace = Trace::new(vec![1.0, 2.0, 3.0], vec![1.0, 2.0]);
        assert_eq!(trace.len(), 2);
        assert!(!trace.is_empty());
    }

    #[test]
    fn test_error_extents() {
        let bars = ErrorBars::symmetric(ErrorValue::Percent(10.0));
        assert_eq!(bars.extents(-20.0, 0), (2.0, 2.0));

        let bars = ErrorBars::asymmetric(ErrorValue::Constant(1.0), ErrorValue::Sqrt);
        assert_eq!(bars.extents(9.0, 0), (3.0, 1.0));

        let bars = ErrorBars::symmetric(ErrorValue::Data(vec![0.5]));
        assert_eq!(bars.extents(1.0, 0), (0.5, 0.5));
        assert!(bars.extents(1.0, 1).0.is_nan());
    }

    #[test]
    fn test_color_falls_back_from_marker_to_line() {
        let mut trace = Trace::from_points(&[(0.0, 0.0)]).with_mode(TraceMode::LINES);
        trace.line.color = Color::WHITE;
        assert_eq!(trace.color_at(0), Color::WHITE);

        trace.mode = TraceMode::MARKERS;
        trace.marker.color = PerPoint::array(vec![Color::BLACK]);
        assert_eq!(trace.color_at(0), Color::BLACK);
    }

    #[test]
    fn test_with_text_enables_text_mode() {
        let trace = Trace::from_points(&[(0.0, 0.0)]).with_text(PerPoint::scalar("a".into()));
        assert!(trace.has_text());
        assert!(trace.has_markers());
    }
}
