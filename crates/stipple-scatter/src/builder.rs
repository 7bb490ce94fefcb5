//! Geometry for batch options.
//!
//! Everything here is a pure function of calculated positions. Per-trace
//! geometry (trimmed lines, error extents, label placement) is attached
//! while a trace is calculated; fills need their neighbours and are built
//! for the whole scene when it is realized.

use crate::{AxisTransform, ErrorBars, ResolvedStyle, Subplot, TextPosition, Trace, TraceSlots};
use crate::{HorizontalPosition, VerticalPosition};
use std::sync::Arc;
use stipple_render::{FillMode, PerPoint, TextAlign, TextBaseline, TextSpec};

#[inline]
fn valid(x: f64, y: f64) -> bool {
    !x.is_nan() && !y.is_nan()
}

/// Data bounds of a trace in linearized units, widened by its error bars.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AxisExtremes {
    pub x: Option<(f64, f64)>,
    pub y: Option<(f64, f64)>,
    /// Extra room in pixels needed around the data for markers.
    pub padding: f32,
}

impl AxisExtremes {
    fn widen(bounds: &mut Option<(f64, f64)>, lo: f64, hi: f64) {
        if !lo.is_finite() || !hi.is_finite() {
            return;
        }
        *bounds = Some(match *bounds {
            Some((min, max)) => (min.min(lo), max.max(hi)),
            None => (lo, hi),
        });
    }
}

/// Strip leading and trailing points where either coordinate is NaN.
///
/// Gaps inside the line are kept; they break the line when drawn.
pub fn trim_line(positions: &[f64]) -> Vec<f64> {
    let pairs = positions.len() / 2;
    let first = (0..pairs).find(|&i| valid(positions[2 * i], positions[2 * i + 1]));
    let Some(first) = first else {
        return Vec::new();
    };
    let last = (first..pairs)
        .rev()
        .find(|&i| valid(positions[2 * i], positions[2 * i + 1]))
        .unwrap_or(first);
    positions[2 * first..2 * last + 2].to_vec()
}

/// Close the area between the line and the axis line `axis = 0`.
///
/// `axis` is the coordinate being zeroed: 1 for `y = 0`, 0 for `x = 0`. Only
/// that coordinate decides which end points are defined. A synthetic vertex
/// is added at each end unless the end point already sits on the axis line.
fn fill_to_zero(src: &[f64], axis: usize) -> Vec<f64> {
    let pairs = src.len() / 2;
    let Some(first) = (0..pairs).find(|&i| !src[2 * i + axis].is_nan()) else {
        return Vec::new();
    };
    let last = (first..pairs)
        .rev()
        .find(|&i| !src[2 * i + axis].is_nan())
        .unwrap_or(first);

    let on_axis = |i: usize| {
        let mut vertex = [src[2 * i], src[2 * i + 1]];
        vertex[axis] = 0.0;
        vertex
    };

    let mut pos = Vec::with_capacity(2 * (last - first) + 6);
    if src[2 * first + axis] != 0.0 {
        pos.extend(on_axis(first));
    }
    pos.extend_from_slice(&src[2 * first..2 * last + 2]);
    if src[2 * last + axis] != 0.0 {
        pos.extend(on_axis(last));
    }
    pos
}

pub fn fill_to_zero_y(src: &[f64]) -> Vec<f64> {
    fill_to_zero(src, 1)
}

pub fn fill_to_zero_x(src: &[f64]) -> Vec<f64> {
    fill_to_zero(src, 0)
}

/// Close every run of valid points back onto its first vertex. Rings are
/// separated by a NaN pair.
pub fn fill_closed_runs(src: &[f64]) -> Vec<f64> {
    let mut pos = Vec::with_capacity(src.len() + 8);
    let mut run_start = None;
    let close = |pos: &mut Vec<f64>, start: usize, end: usize| {
        if !pos.is_empty() {
            pos.extend([f64::NAN, f64::NAN]);
        }
        pos.extend_from_slice(&src[2 * start..2 * end]);
        pos.extend_from_slice(&src[2 * start..2 * start + 2]);
    };

    let pairs = src.len() / 2;
    for i in 0..pairs {
        match (valid(src[2 * i], src[2 * i + 1]), run_start) {
            (true, None) => run_start = Some(i),
            (false, Some(start)) => {
                close(&mut pos, start, i);
                run_start = None;
            }
            _ => {}
        }
    }
    if let Some(start) = run_start {
        close(&mut pos, start, pairs);
    }
    pos
}

/// Band between a trace and its neighbour: own valid points, then the
/// neighbour's valid points in reverse.
pub fn fill_between(src: &[f64], next: Option<&[f64]>) -> Vec<f64> {
    let mut pos: Vec<f64> = src
        .chunks_exact(2)
        .filter(|p| valid(p[0], p[1]))
        .flatten()
        .copied()
        .collect();
    if let Some(next) = next {
        pos.extend(
            next.chunks_exact(2)
                .rev()
                .filter(|p| valid(p[0], p[1]))
                .flatten()
                .copied(),
        );
    }
    pos
}

/// Append `prev` to `pos` as excluded sub-polygons. Returns the vertex
/// indices at which each one starts.
pub fn append_hole(pos: &mut Vec<f64>, prev: &[f64]) -> Vec<usize> {
    let offset = pos.len() / 2;
    let mut hole = vec![offset];
    for (j, point) in prev.chunks_exact(2).enumerate() {
        if !valid(point[0], point[1]) {
            hole.push(j + offset + 1);
        }
    }
    pos.extend_from_slice(prev);
    hole
}

/// Positions a trace's fill is built from: its trimmed line, else its raw
/// positions.
fn fill_source(slots: &TraceSlots) -> &[f64] {
    match &slots.line {
        Some(line) => &line.positions,
        None => &slots.positions,
    }
}

/// Build the fill polygon of every trace and return the fill draw order.
///
/// Entry `i` of the order lists the fills drawn just before trace `i`: its
/// own fill (unless it is a band towards a previous trace) followed by the
/// fill of trace `i + 1` when that one fills towards its neighbour.
pub fn build_fills(traces: &mut [TraceSlots]) -> Vec<Option<Vec<usize>>> {
    let count = traces.len();
    let modes: Vec<Option<FillMode>> = traces
        .iter()
        .map(|t| t.fill.as_ref().map(|f| f.mode))
        .collect();
    let adjacent = |i: usize| modes.get(i).copied().flatten().is_some_and(FillMode::fills_to_next);

    let mut built = Vec::with_capacity(count);
    for (i, slots) in traces.iter().enumerate() {
        let Some(fill) = &slots.fill else {
            built.push(None);
            continue;
        };

        let src = fill_source(slots);
        let next = traces.get(i + 1).filter(|_| adjacent(i + 1));

        let mut color = fill.color;
        let mut pos = match fill.mode {
            FillMode::None => Vec::new(),
            FillMode::ToZeroY => fill_to_zero_y(src),
            FillMode::ToZeroX => fill_to_zero_x(src),
            FillMode::ToSelf | FillMode::ToNext => fill_closed_runs(src),
            FillMode::ToNextY => {
                let next_line = next.and_then(|n| n.line.as_ref());
                if let Some(next_fill) = next.and_then(|n| n.fill.as_ref()) {
                    if next_line.is_some() {
                        color = next_fill.color;
                    }
                }
                fill_between(src, next_line.map(|l| l.positions.as_slice()))
            }
        };

        let mut hole = Vec::new();
        if i > 0 && fill.mode.fills_to_next() && adjacent(i - 1) {
            hole = append_hole(&mut pos, fill_source(&traces[i - 1]));
        }

        built.push(Some((pos, hole, color)));
    }

    let mut order = Vec::with_capacity(count);
    for (i, (slots, geometry)) in traces.iter_mut().zip(built).enumerate() {
        if let (Some(fill), Some((positions, hole, color))) = (&mut slots.fill, geometry) {
            fill.positions = positions;
            fill.hole = hole;
            fill.color = color;
        }

        let mut entry = Vec::new();
        if slots.fill.is_some() && (i == 0 || !adjacent(i)) {
            entry.push(i);
        }
        if adjacent(i + 1) {
            entry.push(i + 1);
        }
        order.push((!entry.is_empty()).then_some(entry));
    }
    order
}

/// Error extents of one axis, four values per point, plus the span they
/// cover in linearized units.
///
/// `axis` selects the coordinate: 0 for x errors (left, right), 1 for y
/// errors (bottom, top).
pub fn error_extents(
    bars: &ErrorBars,
    values: &[f64],
    positions: &[f64],
    axis: usize,
    transform: &dyn AxisTransform,
) -> (Vec<f64>, Option<(f64, f64)>) {
    let pairs = positions.len() / 2;
    let mut errors = vec![0.0; 4 * pairs];
    let mut bounds = None;

    for i in 0..pairs {
        let value = values.get(i).copied().unwrap_or(f64::NAN);
        let center = positions[2 * i + axis];
        if !center.is_finite() {
            continue;
        }
        let (minus, plus) = bars.extents(value, i);
        let lo = transform.to_linear(value - minus);
        let hi = transform.to_linear(value + plus);
        let below = if lo.is_finite() { (center - lo).max(0.0) } else { 0.0 };
        let above = if hi.is_finite() { (hi - center).max(0.0) } else { 0.0 };

        errors[4 * i + 2 * axis] = below;
        errors[4 * i + 2 * axis + 1] = above;
        AxisExtremes::widen(&mut bounds, center - below, center + above);
    }

    (errors, bounds)
}

/// Anchor, alignment and pixel offset of a label, given the marker diameter.
pub fn text_anchor(position: TextPosition, marker_size: f32) -> (TextAlign, TextBaseline, [f32; 2]) {
    let half = marker_size / 2.0;
    let (align, dx) = match position.horizontal {
        HorizontalPosition::Left => (TextAlign::Right, -half),
        HorizontalPosition::Center => (TextAlign::Center, 0.0),
        HorizontalPosition::Right => (TextAlign::Left, half),
    };
    let (baseline, dy) = match position.vertical {
        VerticalPosition::Top => (TextBaseline::Bottom, half),
        VerticalPosition::Middle => (TextBaseline::Middle, 0.0),
        VerticalPosition::Bottom => (TextBaseline::Top, -half),
    };
    (align, baseline, [dx, dy])
}

/// Resolve `position` into the label alignment fields of `labels`.
pub fn place_text(labels: &mut TextSpec, position: &PerPoint<TextPosition>, marker_size: &PerPoint<f32>) {
    if !position.is_array() && !marker_size.is_array() {
        let pos = position.first().copied().unwrap_or_default();
        let size = marker_size.first().copied().unwrap_or(0.0);
        let (align, baseline, offset) = text_anchor(pos, size);
        labels.align = PerPoint::scalar(align);
        labels.baseline = PerPoint::scalar(baseline);
        labels.offset = PerPoint::scalar(offset);
        return;
    }

    let len = labels.positions.len() / 2;
    let mut align = Vec::with_capacity(len);
    let mut baseline = Vec::with_capacity(len);
    let mut offset = Vec::with_capacity(len);
    for i in 0..len {
        let pos = position.get(i).copied().unwrap_or_default();
        let size = marker_size.get(i).copied().unwrap_or(0.0);
        let (a, b, o) = text_anchor(pos, size);
        align.push(a);
        baseline.push(b);
        offset.push(o);
    }
    labels.align = PerPoint::array(align);
    labels.baseline = PerPoint::array(baseline);
    labels.offset = PerPoint::array(offset);
}

/// Attach per-trace geometry to resolved options.
pub fn build_slots(
    trace: &Trace,
    style: ResolvedStyle,
    positions: Arc<[f64]>,
    subplot: &Subplot,
) -> (TraceSlots, AxisExtremes) {
    let mut slots = TraceSlots::new(Arc::clone(&positions), style);
    let mut extremes = AxisExtremes::default();

    for point in positions.chunks_exact(2) {
        AxisExtremes::widen(&mut extremes.x, point[0], point[0]);
        AxisExtremes::widen(&mut extremes.y, point[1], point[1]);
    }

    if let Some(line) = &mut slots.line {
        line.positions = trim_line(&positions);
    }

    if let (Some(opts), Some(bars)) = (&mut slots.error_x, &trace.error_x) {
        let (errors, bounds) = error_extents(bars, &trace.x, &positions, 0, subplot.xaxis.as_ref());
        opts.errors = errors;
        if let Some((lo, hi)) = bounds {
            AxisExtremes::widen(&mut extremes.x, lo, hi);
        }
    }
    if let (Some(opts), Some(bars)) = (&mut slots.error_y, &trace.error_y) {
        let (errors, bounds) = error_extents(bars, &trace.y, &positions, 1, subplot.yaxis.as_ref());
        opts.errors = errors;
        if let Some((lo, hi)) = bounds {
            AxisExtremes::widen(&mut extremes.y, lo, hi);
        }
    }

    let no_marker = PerPoint::scalar(0.0);
    let size_of = |marker: &Option<stipple_render::MarkerSpec>| -> PerPoint<f32> {
        marker.as_ref().map_or_else(|| no_marker.clone(), |m| m.size.clone())
    };
    let base_size = size_of(&slots.marker);
    if let Some(text) = &mut slots.text {
        place_text(text, &trace.textposition, &base_size);
    }
    if let Some(text) = &mut slots.text_selected {
        let size = match &slots.marker_selected {
            Some(_) => size_of(&slots.marker_selected),
            None => base_size.clone(),
        };
        place_text(text, &trace.textposition, &size);
    }
    if let Some(text) = &mut slots.text_unselected {
        let size = match &slots.marker_unselected {
            Some(_) => size_of(&slots.marker_unselected),
            None => base_size.clone(),
        };
        place_text(text, &trace.textposition, &size);
    }

    if let Some(marker) = &slots.marker {
        extremes.padding = match &marker.size {
            PerPoint::Scalar(size) => size / 2.0,
            PerPoint::Array(sizes) => {
                sizes.iter().copied().filter(|s| s.is_finite()).fold(0.0, f32::max) / 2.0
            }
        };
    }

    (slots, extremes)
}
