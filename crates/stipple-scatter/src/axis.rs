//! Axis transforms and subplot addressing.
//!
//! Scene code works in *linearized* units: raw data on linear axes, `log10`
//! of the data on log axes. [`AxisTransform`] is the seam to whatever owns
//! the real axes; [`Axis`] is a plain implementation for hosts (and tests)
//! that do not have their own.

use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AxisType {
    #[default]
    Linear,
    Log,
}

/// Conversion between data values and canvas pixels for one axis.
pub trait AxisTransform: Send + Sync {
    fn axis_type(&self) -> AxisType;

    /// Data value to linearized units. NaN when the value cannot be shown
    /// (non-positive values on a log axis, non-finite input).
    fn to_linear(&self, value: f64) -> f64;

    /// Inverse of [`to_linear`](Self::to_linear).
    fn from_linear(&self, value: f64) -> f64;

    /// Data value to canvas pixels.
    ///
    /// With `clip`, values that cannot be represented land just beyond the
    /// start of the visible range instead of producing NaN.
    fn data_to_pixel(&self, value: f64, clip: bool) -> f64;

    /// Canvas pixels to a data value.
    fn pixel_to_data(&self, px: f64) -> f64;

    /// Visible range in linearized units, `(start, end)`. May be reversed.
    fn range(&self) -> (f64, f64);

    /// Fraction of the plot area spanned by this axis.
    fn domain(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    fn is_log(&self) -> bool {
        self.axis_type() == AxisType::Log
    }
}

/// A linear or log10 axis mapping `range.0 -> pixels.0` and
/// `range.1 -> pixels.1`.
///
/// Pixel space follows the canvas, so a y axis usually maps its range onto
/// `(height, 0)`.
///
/// ```
/// use stipple_scatter::{Axis, AxisTransform};
///
/// let x = Axis::linear((0.0, 10.0), (0.0, 100.0));
/// assert_eq!(x.data_to_pixel(2.5, false), 25.0);
/// assert_eq!(x.pixel_to_data(50.0), 5.0);
///
/// // Log ranges are given in decades.
/// let y = Axis::log((0.0, 2.0), (200.0, 0.0));
/// assert_eq!(y.data_to_pixel(10.0, false), 100.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Axis {
    kind: AxisType,
    range: (f64, f64),
    pixels: (f64, f64),
    domain: (f64, f64),
}

impl Axis {
    pub fn linear(range: (f64, f64), pixels: (f64, f64)) -> Self {
        Self {
            kind: AxisType::Linear,
            range,
            pixels,
            domain: (0.0, 1.0),
        }
    }

    /// A log10 axis; `range` is in decades (`(0.0, 3.0)` shows 1 to 1000).
    pub fn log(range: (f64, f64), pixels: (f64, f64)) -> Self {
        Self {
            kind: AxisType::Log,
            range,
            pixels,
            domain: (0.0, 1.0),
        }
    }

    pub fn with_domain(mut self, domain: (f64, f64)) -> Self {
        self.domain = domain;
        self
    }

    pub fn with_range(mut self, range: (f64, f64)) -> Self {
        self.range = range;
        self
    }

    fn scale(&self) -> f64 {
        let span = self.range.1 - self.range.0;
        if span == 0.0 {
            0.0
        } else {
            (self.pixels.1 - self.pixels.0) / span
        }
    }
}

impl AxisTransform for Axis {
    fn axis_type(&self) -> AxisType {
        self.kind
    }

    fn to_linear(&self, value: f64) -> f64 {
        if !value.is_finite() {
            return f64::NAN;
        }
        match self.kind {
            AxisType::Linear => value,
            AxisType::Log if value > 0.0 => value.log10(),
            AxisType::Log => f64::NAN,
        }
    }

    fn from_linear(&self, value: f64) -> f64 {
        match self.kind {
            AxisType::Linear => value,
            AxisType::Log => 10f64.powf(value),
        }
    }

    fn data_to_pixel(&self, value: f64, clip: bool) -> f64 {
        let mut linear = self.to_linear(value);
        if !linear.is_finite() {
            if !clip || value.is_nan() {
                return f64::NAN;
            }
            // Push unrepresentable values well off the start of the range.
            let span = (self.range.1 - self.range.0).abs().max(1.0);
            linear = self.range.0.min(self.range.1) - span;
        }
        self.pixels.0 + (linear - self.range.0) * self.scale()
    }

    fn pixel_to_data(&self, px: f64) -> f64 {
        let pixel_span = self.pixels.1 - self.pixels.0;
        if pixel_span == 0.0 {
            return self.from_linear(self.range.0);
        }
        let linear = self.range.0 + (px - self.pixels.0) * (self.range.1 - self.range.0) / pixel_span;
        self.from_linear(linear)
    }

    fn range(&self) -> (f64, f64) {
        self.range
    }

    fn domain(&self) -> (f64, f64) {
        self.domain
    }
}

/// Identifier of an x or y axis. `0` is the primary axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct AxisId(pub u32);

/// The `(x axis, y axis)` pair that identifies a subplot and its scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SubplotKey {
    pub x: AxisId,
    pub y: AxisId,
}

impl SubplotKey {
    pub const PRIMARY: SubplotKey = SubplotKey::new(0, 0);

    pub const fn new(x: u32, y: u32) -> Self {
        Self {
            x: AxisId(x),
            y: AxisId(y),
        }
    }
}

impl fmt::Display for SubplotKey {
    /// Formats as `xy`, `x2y`, `x2y3`, ...
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn part(f: &mut fmt::Formatter<'_>, name: char, id: AxisId) -> fmt::Result {
            match id.0 {
                0 => write!(f, "{}", name),
                n => write!(f, "{}{}", name, n + 1),
            }
        }
        part(f, 'x', self.x)?;
        part(f, 'y', self.y)
    }
}

/// A subplot: its key plus the two axes traces are plotted against.
#[derive(Clone)]
pub struct Subplot {
    pub key: SubplotKey,
    pub xaxis: Arc<dyn AxisTransform>,
    pub yaxis: Arc<dyn AxisTransform>,
}

impl Subplot {
    pub fn new(
        key: SubplotKey,
        xaxis: impl AxisTransform + 'static,
        yaxis: impl AxisTransform + 'static,
    ) -> Self {
        Self {
            key,
            xaxis: Arc::new(xaxis),
            yaxis: Arc::new(yaxis),
        }
    }

    /// Whether either axis is logarithmic.
    pub fn has_log_axis(&self) -> bool {
        self.xaxis.is_log() || self.yaxis.is_log()
    }
}

impl fmt::Debug for Subplot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subplot")
            .field("key", &self.key)
            .field("x_range", &self.xaxis.range())
            .field("y_range", &self.yaxis.range())
            .finish()
    }
}
