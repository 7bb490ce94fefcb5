//! Static spatial index over a trace's positions.
//!
//! Built once per calculation and never updated. Small traces (and traces on
//! log axes) get the identity index, which answers every query by scanning;
//! large traces get a uniform grid over the bounding box of their finite
//! points, stored as compressed rows so the whole index is two flat arrays.

use std::borrow::Cow;
use std::sync::Arc;
use stipple_core::profiling::profile_function;

/// Average number of points per grid cell the grid aims for.
const TARGET_CELL_POINTS: f64 = 16.0;
/// Upper bound on cells per side.
const MAX_CELLS_PER_SIDE: usize = 1024;

/// Axis-aligned rectangle in linearized data units, closed on every side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataRect {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl DataRect {
    pub const fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    /// Inverted or NaN rectangles contain nothing.
    pub fn is_valid(&self) -> bool {
        self.xmin <= self.xmax && self.ymin <= self.ymax
    }

    #[inline]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.xmin && x <= self.xmax && y >= self.ymin && y <= self.ymax
    }
}

#[derive(Debug, Clone)]
pub enum PointIndex {
    /// No partition; every query scans all points.
    Identity {
        positions: Arc<[f64]>,
        ids: Vec<usize>,
    },
    Grid(GridIndex),
}

impl PointIndex {
    /// Index interleaved `positions`.
    ///
    /// Traces with fewer than `threshold` points, or plotted against a log
    /// axis, get the identity index.
    pub fn build(positions: Arc<[f64]>, threshold: usize, log_axis: bool) -> Self {
        profile_function!();
        let count = positions.len() / 2;
        if count < threshold || log_axis {
            Self::identity(positions)
        } else {
            Self::Grid(GridIndex::new(positions))
        }
    }

    pub fn identity(positions: Arc<[f64]>) -> Self {
        let ids = (0..positions.len() / 2).collect();
        Self::Identity { positions, ids }
    }

    pub fn is_identity(&self) -> bool {
        matches!(self, Self::Identity { .. })
    }

    /// Number of indexed points, valid or not.
    pub fn len(&self) -> usize {
        self.positions().len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn positions(&self) -> &Arc<[f64]> {
        match self {
            Self::Identity { positions, .. } => positions,
            Self::Grid(grid) => &grid.positions,
        }
    }

    /// Every point inside `rect`. Order is unspecified.
    pub fn range(&self, rect: DataRect) -> Vec<usize> {
        if !rect.is_valid() {
            return Vec::new();
        }
        match self {
            Self::Identity { positions, ids } => ids
                .iter()
                .copied()
                .filter(|&id| rect.contains(positions[2 * id], positions[2 * id + 1]))
                .collect(),
            Self::Grid(grid) => grid.range(rect),
        }
    }

    /// Points worth testing against `rect`, in ascending id order: all of
    /// them for the identity index, the range result for a grid.
    pub fn candidates(&self, rect: DataRect) -> Cow<'_, [usize]> {
        match self {
            Self::Identity { ids, .. } => Cow::Borrowed(ids.as_slice()),
            Self::Grid(grid) => {
                let mut ids = grid.range(rect);
                ids.sort_unstable();
                Cow::Owned(ids)
            }
        }
    }
}

/// Uniform grid partition. Cell `(col, row)` holds
/// `entries[starts[row * cols + col]..starts[row * cols + col + 1]]`.
#[derive(Debug, Clone)]
pub struct GridIndex {
    positions: Arc<[f64]>,
    origin: [f64; 2],
    cell_size: [f64; 2],
    cols: usize,
    rows: usize,
    starts: Vec<u32>,
    entries: Vec<u32>,
}

impl GridIndex {
    pub fn new(positions: Arc<[f64]>) -> Self {
        let mut min = [f64::INFINITY; 2];
        let mut max = [f64::NEG_INFINITY; 2];
        let mut finite = 0usize;
        for point in positions.chunks_exact(2) {
            if point[0].is_finite() && point[1].is_finite() {
                finite += 1;
                for axis in 0..2 {
                    min[axis] = min[axis].min(point[axis]);
                    max[axis] = max[axis].max(point[axis]);
                }
            }
        }
        if finite == 0 {
            min = [0.0; 2];
            max = [0.0; 2];
        }

        let side = ((finite as f64 / TARGET_CELL_POINTS).sqrt().ceil() as usize)
            .clamp(1, MAX_CELLS_PER_SIDE);
        let cell = |axis: usize| {
            let size = (max[axis] - min[axis]) / side as f64;
            if size > 0.0 { size } else { 1.0 }
        };

        let mut grid = Self {
            positions: Arc::clone(&positions),
            origin: min,
            cell_size: [cell(0), cell(1)],
            cols: side,
            rows: side,
            starts: vec![0; side * side + 1],
            entries: Vec::with_capacity(finite),
        };

        // Counting sort of point ids into cells.
        let mut cells = Vec::with_capacity(finite);
        for (id, point) in positions.chunks_exact(2).enumerate() {
            if point[0].is_finite() && point[1].is_finite() {
                let cell = grid.cell_of(point[0], point[1]);
                grid.starts[cell + 1] += 1;
                cells.push((id as u32, cell));
            }
        }
        for i in 1..grid.starts.len() {
            grid.starts[i] += grid.starts[i - 1];
        }
        let mut cursor = grid.starts.clone();
        grid.entries.resize(finite, 0);
        for (id, cell) in cells {
            grid.entries[cursor[cell] as usize] = id;
            cursor[cell] += 1;
        }

        grid
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    /// Clamped cell coordinate along one axis. Monotone in `value`, so a
    /// rectangle maps onto a contiguous block of cells.
    #[inline]
    fn coord(&self, axis: usize, value: f64, cells: usize) -> usize {
        let offset = ((value - self.origin[axis]) / self.cell_size[axis]).floor();
        offset.clamp(0.0, (cells - 1) as f64) as usize
    }

    #[inline]
    fn cell_of(&self, x: f64, y: f64) -> usize {
        self.coord(1, y, self.rows) * self.cols + self.coord(0, x, self.cols)
    }

    pub fn range(&self, rect: DataRect) -> Vec<usize> {
        if !rect.is_valid() {
            return Vec::new();
        }
        let c0 = self.coord(0, rect.xmin, self.cols);
        let c1 = self.coord(0, rect.xmax, self.cols);
        let r0 = self.coord(1, rect.ymin, self.rows);
        let r1 = self.coord(1, rect.ymax, self.rows);

        let mut out = Vec::new();
        for row in r0..=r1 {
            let first = self.starts[row * self.cols + c0] as usize;
            let last = self.starts[row * self.cols + c1 + 1] as usize;
            for &id in &self.entries[first..last] {
                let id = id as usize;
                if rect.contains(self.positions[2 * id], self.positions[2 * id + 1]) {
                    out.push(id);
                }
            }
        }
        out
    }
}
