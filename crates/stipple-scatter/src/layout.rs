//! Figure layout: canvas size, margins and interaction mode.

use crate::AxisTransform;
use stipple_render::ViewportRange;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Margin {
    pub l: f64,
    pub r: f64,
    pub t: f64,
    pub b: f64,
}

impl Margin {
    pub const fn uniform(value: f64) -> Self {
        Self {
            l: value,
            r: value,
            t: value,
            b: value,
        }
    }
}

/// What a pointer drag does on the plot area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DragMode {
    #[default]
    Zoom,
    Pan,
    /// Rectangle selection.
    Select,
    /// Free-form polygon selection.
    Lasso,
}

impl DragMode {
    pub fn is_selection(self) -> bool {
        matches!(self, Self::Select | Self::Lasso)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
    pub drag_mode: DragMode,
    /// Clicking a point selects it.
    pub click_select: bool,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            width: 700.0,
            height: 450.0,
            margin: Margin {
                l: 80.0,
                r: 80.0,
                t: 100.0,
                b: 80.0,
            },
            drag_mode: DragMode::Zoom,
            click_select: false,
        }
    }
}

impl Layout {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn with_margin(mut self, margin: Margin) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_drag_mode(mut self, drag_mode: DragMode) -> Self {
        self.drag_mode = drag_mode;
        self
    }

    pub fn with_click_select(mut self, click_select: bool) -> Self {
        self.click_select = click_select;
        self
    }

    /// `[left, bottom, right, top]` of the subplot in canvas pixels, with
    /// the origin at the bottom-left corner.
    pub fn viewport(&self, xaxis: &dyn AxisTransform, yaxis: &dyn AxisTransform) -> [f64; 4] {
        let m = self.margin;
        let w = self.width - m.l - m.r;
        let h = self.height - m.t - m.b;
        let (x0, x1) = xaxis.domain();
        let (y0, y1) = yaxis.domain();
        [
            m.l + x0 * w,
            m.b + y0 * h,
            (self.width - m.r) - (1.0 - x1) * w,
            (self.height - m.t) - (1.0 - y1) * h,
        ]
    }

    /// Viewport plus the visible data window, as uploaded into batches.
    pub fn viewport_range(
        &self,
        xaxis: &dyn AxisTransform,
        yaxis: &dyn AxisTransform,
    ) -> ViewportRange {
        let (xs, xe) = xaxis.range();
        let (ys, ye) = yaxis.range();
        ViewportRange {
            viewport: self.viewport(xaxis, yaxis),
            range: [xs, ys, xe, ye],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Axis;

    #[test]
    fn test_viewport_with_domains() {
        let layout = Layout::new(200.0, 100.0).with_margin(Margin::uniform(10.0));
        let x = Axis::linear((0.0, 1.0), (0.0, 180.0)).with_domain((0.5, 1.0));
        let y = Axis::linear((0.0, 1.0), (80.0, 0.0));

        assert_eq!(layout.viewport(&x, &y), [100.0, 10.0, 190.0, 90.0]);
    }

    #[test]
    fn test_viewport_range_carries_axis_ranges() {
        let layout = Layout::new(100.0, 100.0).with_margin(Margin::default());
        let x = Axis::linear((-1.0, 1.0), (0.0, 100.0));
        let y = Axis::log((0.0, 3.0), (100.0, 0.0));

        let vr = layout.viewport_range(&x, &y);
        assert_eq!(vr.viewport, [0.0, 0.0, 100.0, 100.0]);
        assert_eq!(vr.range, [-1.0, 0.0, 1.0, 3.0]);
    }

    #[test]
    fn test_drag_mode_selection() {
        assert!(DragMode::Lasso.is_selection());
        assert!(DragMode::Select.is_selection());
        assert!(!DragMode::Pan.is_selection());
    }
}
