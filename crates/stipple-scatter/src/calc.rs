use crate::{AxisExtremes, PointIndex, Subplot, SubplotKey, Trace};
use std::sync::Arc;

/// Positions interleaved as `[x0, y0, x1, y1, ...]`, linearized per axis.
/// Missing or unrepresentable samples are NaN.
pub fn linearize_positions(trace: &Trace, subplot: &Subplot) -> Arc<[f64]> {
    let (xa, ya) = (subplot.xaxis.as_ref(), subplot.yaxis.as_ref());
    (0..trace.len())
        .flat_map(|i| [xa.to_linear(trace.x[i]), ya.to_linear(trace.y[i])])
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
struct PixelCache {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl PixelCache {
    fn compute(trace: &Trace, len: usize, subplot: &Subplot) -> Self {
        Self {
            x: (0..len).map(|i| subplot.xaxis.data_to_pixel(trace.x[i], false)).collect(),
            y: (0..len).map(|i| subplot.yaxis.data_to_pixel(trace.y[i], false)).collect(),
        }
    }
}

/// The result of calculating one trace: what hover and selection need to
/// work without recalculating.
#[derive(Debug, Clone)]
pub struct CalculatedTrace {
    pub trace: Arc<Trace>,
    pub subplot: SubplotKey,
    /// Index of the trace inside its subplot's scene.
    pub index: usize,
    pub positions: Arc<[f64]>,
    pub point_index: PointIndex,
    pub extremes: AxisExtremes,
    pixels: Option<PixelCache>,
}

impl CalculatedTrace {
    pub(crate) fn new(
        trace: Arc<Trace>,
        subplot: SubplotKey,
        index: usize,
        point_index: PointIndex,
        extremes: AxisExtremes,
    ) -> Self {
        Self {
            trace,
            subplot,
            index,
            positions: Arc::clone(point_index.positions()),
            point_index,
            extremes,
            pixels: None,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Cached pixel x coordinates, present only while selecting.
    pub fn xpx(&self) -> Option<&[f64]> {
        self.pixels.as_ref().map(|p| p.x.as_slice())
    }

    pub fn ypx(&self) -> Option<&[f64]> {
        self.pixels.as_ref().map(|p| p.y.as_slice())
    }

    /// Recompute the pixel caches against the current axes.
    pub(crate) fn cache_pixels(&mut self, subplot: &Subplot) {
        self.pixels = Some(PixelCache::compute(&self.trace, self.len(), subplot));
    }

    /// Pixel coordinates of every point, computed on first use.
    pub(crate) fn pixels(&mut self, subplot: &Subplot) -> (&[f64], &[f64]) {
        let len = self.len();
        let trace = &self.trace;
        let cache = self
            .pixels
            .get_or_insert_with(|| PixelCache::compute(trace, len, subplot));
        (cache.x.as_slice(), cache.y.as_slice())
    }

    pub(crate) fn clear_pixels(&mut self) {
        self.pixels = None;
    }
}
