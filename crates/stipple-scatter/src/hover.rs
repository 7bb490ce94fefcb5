//! Nearest-point lookup for hover labels.

use crate::{CalculatedTrace, DataRect, PointIndex, Subplot, TextPosition};
use std::borrow::Cow;
use stipple_core::math::pixel_distance;
use stipple_core::profiling::profile_function;
use stipple_render::{Color, MarkerSymbol, PerPoint};

/// How hover distance is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HoverMode {
    /// Horizontal pixel distance only.
    X,
    /// Euclidean pixel distance.
    Y,
    /// Euclidean pixel distance.
    #[default]
    Closest,
}

/// Every per-point attribute a hover label may show, resolved for one
/// point.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointDetail {
    pub point_index: usize,
    pub x: f64,
    pub y: f64,
    pub text: Option<String>,
    pub hovertext: Option<String>,
    pub customdata: Option<String>,
    pub textposition: Option<TextPosition>,
    pub text_size: Option<f32>,
    pub text_color: Option<Color>,
    pub text_family: Option<String>,
    pub marker_size: Option<f32>,
    pub marker_opacity: Option<f32>,
    pub marker_symbol: Option<MarkerSymbol>,
    pub marker_color: Option<Color>,
    pub marker_line_color: Option<Color>,
    pub marker_line_width: Option<f32>,
    pub hover_bgcolor: Option<Color>,
    pub hover_bordercolor: Option<Color>,
    pub hover_font_size: Option<f32>,
    pub hover_font_color: Option<Color>,
    pub hover_font_family: Option<String>,
    pub hover_namelength: Option<i32>,
    pub hoverinfo: Option<String>,
    pub hovertemplate: Option<String>,
    /// `(minus, plus)` error bar lengths in data units.
    pub x_error: Option<(f64, f64)>,
    pub y_error: Option<(f64, f64)>,
}

/// The point a hover resolved to, with label geometry in pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct HoverPoint {
    /// Scene index of the trace.
    pub trace_index: usize,
    pub point_index: usize,
    /// Distance used to pick the point (horizontal in [`HoverMode::X`]).
    pub distance: f64,
    /// Euclidean distance to the point.
    pub spike_distance: f64,
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
    pub x_label: f64,
    pub y_label: f64,
    pub color: Color,
    pub text: Option<String>,
    pub hovertemplate: Option<String>,
    pub detail: PointDetail,
}

fn at<T: Clone>(value: &PerPoint<T>, index: usize) -> Option<T> {
    value.get(index).cloned()
}

fn opt_at<T: Clone>(value: &Option<PerPoint<T>>, index: usize) -> Option<T> {
    value.as_ref().and_then(|v| v.get(index).cloned())
}

/// Find the point of `calc` nearest to data position `(x, y)`.
///
/// Candidates come from the trace's spatial index over a square of
/// `2 * max_distance` pixels around the query (spanning the whole y range in
/// [`HoverMode::X`]). They are scanned in index order and the first strict
/// improvement under `max_distance` wins, so of two equidistant points the
/// one met first is kept.
pub fn hover_points(
    calc: &CalculatedTrace,
    subplot: &Subplot,
    x: f64,
    y: f64,
    mode: HoverMode,
    max_distance: f64,
) -> Option<HoverPoint> {
    profile_function!();
    let trace = &calc.trace;
    if !trace.visible {
        return None;
    }
    let (xa, ya) = (subplot.xaxis.as_ref(), subplot.yaxis.as_ref());
    let xpx = xa.data_to_pixel(x, false);
    let ypx = ya.data_to_pixel(y, false);

    let ids: Cow<'_, [usize]> = match &calc.point_index {
        PointIndex::Identity { ids, .. } => Cow::Borrowed(ids.as_slice()),
        index @ PointIndex::Grid(_) => {
            let xl = xa.pixel_to_data(xpx - max_distance);
            let xr = xa.pixel_to_data(xpx + max_distance);
            let (ymin, ymax) = if mode == HoverMode::X {
                let (r0, r1) = ya.range();
                (r0.min(r1), r0.max(r1))
            } else {
                let yl = ya.pixel_to_data(ypx - max_distance);
                let yr = ya.pixel_to_data(ypx + max_distance);
                (yl.min(yr), yl.max(yr))
            };
            index.candidates(DataRect::new(xl.min(xr), ymin, xl.max(xr), ymax))
        }
    };

    let mut min_dist = max_distance;
    let mut spike = f64::NAN;
    let mut found = None;
    for &id in ids.iter() {
        let dx = xa.data_to_pixel(trace.x[id], false) - xpx;
        if mode == HoverMode::X {
            if dx.abs() < min_dist {
                min_dist = dx.abs();
                let dy = ya.data_to_pixel(trace.y[id], false) - ypx;
                spike = pixel_distance(dx, dy);
                found = Some(id);
            }
        } else {
            let dy = ya.data_to_pixel(trace.y[id], false) - ypx;
            let dist = pixel_distance(dx, dy);
            if dist < min_dist {
                min_dist = dist;
                spike = dist;
                found = Some(id);
            }
        }
    }

    let id = found?;
    Some(describe_point(calc, subplot, id, min_dist, spike))
}

fn describe_point(
    calc: &CalculatedTrace,
    subplot: &Subplot,
    id: usize,
    distance: f64,
    spike_distance: f64,
) -> HoverPoint {
    let trace = &calc.trace;
    let (px, py) = (trace.x[id], trace.y[id]);

    let mut detail = PointDetail {
        point_index: id,
        x: px,
        y: py,
        text: opt_at(&trace.text, id),
        hovertext: opt_at(&trace.hovertext, id),
        customdata: opt_at(&trace.customdata, id),
        textposition: at(&trace.textposition, id),
        text_size: at(&trace.textfont.size, id),
        text_color: at(&trace.textfont.color, id),
        text_family: at(&trace.textfont.family, id),
        marker_size: at(&trace.marker.size, id),
        marker_opacity: at(&trace.marker.opacity, id),
        marker_symbol: at(&trace.marker.symbol, id),
        marker_color: at(&trace.marker.color, id),
        marker_line_color: at(&trace.marker.line.color, id),
        marker_line_width: at(&trace.marker.line.width, id),
        hoverinfo: opt_at(&trace.hoverinfo, id),
        hovertemplate: opt_at(&trace.hovertemplate, id),
        ..Default::default()
    };

    if let Some(label) = &trace.hoverlabel {
        detail.hover_bgcolor = opt_at(&label.bgcolor, id);
        detail.hover_bordercolor = opt_at(&label.bordercolor, id);
        detail.hover_namelength = opt_at(&label.namelength, id);
        if let Some(font) = &label.font {
            detail.hover_font_size = at(&font.size, id);
            detail.hover_font_color = at(&font.color, id);
            detail.hover_font_family = at(&font.family, id);
        }
    }

    let error = |bars: &Option<crate::ErrorBars>, value: f64| {
        bars.as_ref()
            .filter(|b| b.visible)
            .map(|b| b.extents(value, id))
            .filter(|(minus, plus)| !minus.is_nan() || !plus.is_nan())
    };
    detail.x_error = error(&trace.error_x, px);
    detail.y_error = error(&trace.error_y, py);

    let xp = subplot.xaxis.data_to_pixel(px, true);
    let yp = subplot.yaxis.data_to_pixel(py, true);
    let radius = 1.0;

    HoverPoint {
        trace_index: calc.index,
        point_index: id,
        distance,
        spike_distance,
        x0: xp - radius,
        x1: xp + radius,
        y0: yp - radius,
        y1: yp + radius,
        x_label: px,
        y_label: py,
        color: trace.color_at(id),
        text: detail.hovertext.clone().or_else(|| detail.text.clone()),
        hovertemplate: detail.hovertemplate.clone(),
        detail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AxisExtremes, Axis, SubplotKey, Trace, linearize_positions};
    use std::sync::Arc;

    /// 10 pixels per data unit on both axes.
    fn subplot() -> Subplot {
        Subplot::new(
            SubplotKey::PRIMARY,
            Axis::linear((0.0, 10.0), (0.0, 100.0)),
            Axis::linear((0.0, 10.0), (100.0, 0.0)),
        )
    }

    fn calc(trace: Trace, threshold: usize) -> CalculatedTrace {
        let subplot = subplot();
        let positions = linearize_positions(&trace, &subplot);
        let index = PointIndex::build(positions, threshold, false);
        CalculatedTrace::new(Arc::new(trace), subplot.key, 0, index, AxisExtremes::default())
    }

    #[test]
    fn test_x_mode_uses_horizontal_distance() {
        let calc = calc(Trace::from_points(&[(0.0, 0.0), (5.0, 1.0)]), 100);
        let hit = hover_points(&calc, &subplot(), 1.0, 1.0, HoverMode::X, 20.0).expect("hit");
        assert_eq!(hit.point_index, 0);
        assert_eq!(hit.distance, 10.0);
        assert!((hit.spike_distance - 200f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_first_strict_improvement_wins_ties() {
        // Both points are 10px from the query; the first one scanned stays.
        let calc = calc(Trace::from_points(&[(4.0, 5.0), (6.0, 5.0)]), 100);
        let hit = hover_points(&calc, &subplot(), 5.0, 5.0, HoverMode::Closest, 20.0).expect("hit");
        assert_eq!(hit.point_index, 0);
    }

    #[test]
    fn test_nothing_within_max_distance() {
        let calc = calc(Trace::from_points(&[(0.0, 0.0)]), 100);
        assert!(hover_points(&calc, &subplot(), 5.0, 5.0, HoverMode::Closest, 20.0).is_none());
    }

    #[test]
    fn test_grid_and_identity_agree() {
        let points: Vec<(f64, f64)> = (0..400)
            .map(|i| ((i % 20) as f64 * 0.5, (i / 20) as f64 * 0.5))
            .collect();
        let identity = calc(Trace::from_points(&points), usize::MAX);
        let grid = calc(Trace::from_points(&points), 0);
        assert!(!grid.point_index.is_identity());

        for (x, y, mode) in [(3.1, 4.2, HoverMode::Closest), (7.7, 0.4, HoverMode::X)] {
            let a = hover_points(&identity, &subplot(), x, y, mode, 8.0)
                .map(|h| (h.point_index, h.distance));
            let b = hover_points(&grid, &subplot(), x, y, mode, 8.0)
                .map(|h| (h.point_index, h.distance));
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_grid_breaks_ties_in_point_order() {
        // Two points 40px above and below the query, in different grid rows.
        let mut points = vec![(5.0, 9.0), (5.0, 1.0)];
        for (cx, cy) in [(0.0, 0.0), (10.0, 0.0), (0.0, 10.0), (10.0, 10.0)] {
            points.extend(std::iter::repeat_n((cx, cy), 4));
        }
        let identity = calc(Trace::from_points(&points), usize::MAX);
        let grid = calc(Trace::from_points(&points), 0);
        assert!(!grid.point_index.is_identity());

        let a = hover_points(&identity, &subplot(), 5.0, 5.0, HoverMode::Closest, 50.0);
        let b = hover_points(&grid, &subplot(), 5.0, 5.0, HoverMode::Closest, 50.0);
        assert_eq!(a.map(|h| h.point_index), Some(0));
        assert_eq!(b.map(|h| h.point_index), Some(0));
    }

    #[test]
    fn test_detail_resolves_arrays_then_scalars() {
        let mut trace = Trace::from_points(&[(1.0, 1.0), (2.0, 2.0)]);
        trace.text = Some(PerPoint::array(vec!["a".into(), "b".into()]));
        trace.hovertext = Some(PerPoint::array(vec!["only first".into()]));
        trace.marker.size = PerPoint::array(vec![4.0, 8.0]);
        trace.error_y = Some(crate::ErrorBars::symmetric(crate::ErrorValue::Constant(0.5)));
        let calc = calc(trace, 100);

        let hit = hover_points(&calc, &subplot(), 2.0, 2.0, HoverMode::Closest, 5.0).expect("hit");
        assert_eq!(hit.point_index, 1);
        assert_eq!(hit.text.as_deref(), Some("b"));
        assert_eq!(hit.detail.hovertext, None);
        assert_eq!(hit.detail.marker_size, Some(8.0));
        assert_eq!(hit.detail.marker_opacity, Some(1.0));
        assert_eq!(hit.detail.y_error, Some((0.5, 0.5)));
        assert_eq!(hit.detail.x_error, None);
        assert_eq!((hit.x0, hit.x1, hit.y0, hit.y1), (19.0, 21.0, 79.0, 81.0));
    }
}
