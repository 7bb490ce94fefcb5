//! Point selection.
//!
//! While a subplot is in selection mode its scene holds, for every
//! partitioned trace, the indices of selected and unselected points. The
//! base marker batch draws the unselected subset with dimmed options and the
//! selection-layer batch draws the selected subset on top.

use crate::{CalculatedTrace, Layout, SceneState, Subplot};
use std::sync::Arc;
use stipple_core::alloc::HashSet;
use stipple_core::math::DVec2;
use stipple_core::profiling::profile_function;
use stipple_render::{Color, MarkerSpec, PerPoint, RenderContext};

/// Decides which pixel positions fall inside a selection region.
///
/// Closures `Fn(DVec2, usize) -> bool` implement this directly.
pub trait SelectionTester {
    /// Whether the point at pixel position `point` (trace point `index`) is
    /// selected.
    fn contains(&self, point: DVec2, index: usize) -> bool;

    /// A zero-area region clears the selection instead of selecting.
    fn is_degenerate(&self) -> bool {
        false
    }
}

impl<F> SelectionTester for F
where
    F: Fn(DVec2, usize) -> bool,
{
    fn contains(&self, point: DVec2, index: usize) -> bool {
        self(point, index)
    }
}

/// Axis-aligned box selection in pixels, closed on every side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionRect {
    min: DVec2,
    max: DVec2,
}

impl SelectionRect {
    /// Box spanned by two opposite corners, in any order.
    pub fn new(a: DVec2, b: DVec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }
}

impl SelectionTester for SelectionRect {
    fn contains(&self, point: DVec2, _index: usize) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    fn is_degenerate(&self) -> bool {
        let size = self.max - self.min;
        !(size.x > 0.0 && size.y > 0.0 && size.is_finite())
    }
}

/// Lasso selection in pixels using the even-odd rule.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionPolygon {
    vertices: Vec<DVec2>,
}

impl SelectionPolygon {
    pub fn new(vertices: Vec<DVec2>) -> Self {
        Self { vertices }
    }

    /// Signed shoelace area.
    fn area(&self) -> f64 {
        let n = self.vertices.len();
        (0..n)
            .map(|i| {
                let (a, b) = (self.vertices[i], self.vertices[(i + 1) % n]);
                a.x * b.y - b.x * a.y
            })
            .sum::<f64>()
            / 2.0
    }
}

impl SelectionTester for SelectionPolygon {
    fn contains(&self, point: DVec2, _index: usize) -> bool {
        let v = &self.vertices;
        let mut inside = false;
        let mut j = v.len().wrapping_sub(1);
        for i in 0..v.len() {
            let (a, b) = (v[i], v[j]);
            if (a.y > point.y) != (b.y > point.y)
                && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    fn is_degenerate(&self) -> bool {
        let area = self.area();
        self.vertices.len() < 3 || area == 0.0 || !area.is_finite()
    }
}

/// A point picked by a selection, in data units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectedPoint {
    pub point_index: usize,
    pub x: f64,
    pub y: f64,
}

/// What a call to [`select_points`] did to the scene.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SelectionChange {
    /// The trace cannot be selected from.
    Ignored,
    Cleared,
    Selected(Vec<SelectedPoint>),
}

/// Split `[0, len)` into the pre-selected indices and the rest. Out of range
/// and repeated indices are dropped.
pub fn partition_points(selected: &[usize], len: usize) -> (Vec<usize>, Vec<usize>) {
    let mut seen = HashSet::with_capacity(selected.len());
    let selected: Vec<usize> = selected
        .iter()
        .copied()
        .filter(|&i| i < len && seen.insert(i))
        .collect();
    let unselected = (0..len).filter(|i| !seen.contains(i)).collect();
    (selected, unselected)
}

/// Base marker options for unpartitioned traces, unselected options for the
/// rest.
fn unselected_markers(scene: &SceneState) -> Vec<Option<MarkerSpec>> {
    scene
        .traces()
        .iter()
        .enumerate()
        .map(|(i, t)| {
            if scene.is_partitioned(i) {
                t.marker_unselected.clone().or_else(|| t.marker.clone())
            } else {
                t.marker.clone()
            }
        })
        .collect()
}

fn selected_markers(scene: &SceneState) -> Vec<Option<MarkerSpec>> {
    scene
        .traces()
        .iter()
        .map(|t| t.marker_selected.clone().or_else(|| t.marker.clone()))
        .collect()
}

/// Recolor the labels of trace `index` after its partition changed.
///
/// Selected labels take the selected text color, else their base color.
/// Unselected labels take the unselected text color, else their base color
/// with alpha set to `dim`.
pub(crate) fn style_text_selection(scene: &mut SceneState, index: usize, dim: f32) {
    let Some(slots) = scene.trace(index) else {
        return;
    };
    let Some(base) = &slots.text else {
        return;
    };

    let mut options = base.clone();
    if let Some((selected, unselected)) = scene.partition(index) {
        let selected_color = slots.text_selected.as_ref().and_then(|t| t.color.first()).copied();
        let unselected_color = slots.text_unselected.as_ref().and_then(|t| t.color.first()).copied();
        let base_color = |j: usize| base.color.get(j).copied().unwrap_or(Color::TRANSPARENT);

        let mut colors = vec![Color::TRANSPARENT; slots.points];
        for &j in selected {
            if let Some(color) = colors.get_mut(j) {
                *color = selected_color.unwrap_or_else(|| base_color(j));
            }
        }
        for &j in unselected {
            if let Some(color) = colors.get_mut(j) {
                *color = unselected_color.unwrap_or_else(|| base_color(j).with_alpha(dim));
            }
        }
        options.color = PerPoint::array(colors);
    }

    scene.update_text(index, &options);
}

/// Leave selection mode: drop every partition and restore base options.
pub(crate) fn clear_selection(scene: &mut SceneState) {
    scene.clear_partitions();
    let markers = scene.base_markers();
    scene.update_markers(&markers);

    let texts: Vec<_> = scene
        .traces()
        .iter()
        .enumerate()
        .filter_map(|(i, t)| t.text.clone().map(|text| (i, text)))
        .collect();
    for (i, text) in texts {
        scene.update_text(i, &text);
    }
}

/// Partition `calc` against `tester` and push the result into the scene.
pub(crate) fn select_points(
    scene: &mut SceneState,
    context: &dyn RenderContext,
    subplot: &Subplot,
    calc: &mut CalculatedTrace,
    tester: Option<&dyn SelectionTester>,
    dim: f32,
) -> SelectionChange {
    profile_function!();
    let trace = Arc::clone(&calc.trace);
    let has_markers = trace.has_markers();
    let has_text = trace.has_text();
    if !trace.visible || (!has_markers && !has_text) {
        return SelectionChange::Ignored;
    }

    let Some(tester) = tester.filter(|t| !t.is_degenerate()) else {
        tracing::debug!("Clearing selection on {}", subplot.key);
        clear_selection(scene);
        calc.clear_pixels();
        return SelectionChange::Cleared;
    };

    let len = calc.len();
    let index = calc.index;
    let (xpx, ypx) = calc.pixels(subplot);
    let mut points = Vec::new();
    let mut selected = Vec::new();
    let mut unselected = Vec::new();
    for i in 0..len {
        if tester.contains(DVec2::new(xpx[i], ypx[i]), i) {
            selected.push(i);
            points.push(SelectedPoint {
                point_index: i,
                x: trace.x[i],
                y: trace.y[i],
            });
        } else {
            unselected.push(i);
        }
    }

    scene.ensure_selection_layer(context);
    if !scene.is_partitioned(index) {
        scene.unselect_unpartitioned();
        let layer = selected_markers(scene);
        scene.update_selection_layer(&layer);
        if has_markers {
            let markers = unselected_markers(scene);
            scene.update_markers(&markers);
        }
    }
    scene.set_partition(index, selected, unselected);

    if has_text {
        style_text_selection(scene, index, dim);
    }

    SelectionChange::Selected(points)
}

/// Selection work done on every plot: decide whether the subplot is in
/// selection mode, apply pre-selected points, and refresh the pixel caches
/// and marker options to match.
pub(crate) fn prepare_selection(
    scene: &mut SceneState,
    context: &dyn RenderContext,
    subplot: &Subplot,
    layout: &Layout,
    calcs: &mut [CalculatedTrace],
    dim: f32,
) {
    scene.clear_partitions();
    let select_mode = layout.drag_mode.is_selection()
        || layout.click_select
        || calcs.iter().any(|c| c.trace.selectedpoints.is_some());

    if !select_mode {
        for calc in calcs.iter_mut() {
            calc.clear_pixels();
        }
        let markers = scene.base_markers();
        scene.update_markers(&markers);
        return;
    }

    scene.ensure_partitions();
    for calc in calcs.iter_mut() {
        if let Some(points) = &calc.trace.selectedpoints {
            let (selected, unselected) = partition_points(points, calc.len());
            scene.set_partition(calc.index, selected, unselected);
        }
        calc.cache_pixels(subplot);
    }

    scene.ensure_selection_layer(context);
    let markers = if scene.any_partitioned() {
        unselected_markers(scene)
    } else {
        scene.base_markers()
    };
    scene.update_markers(&markers);
    let layer = selected_markers(scene);
    scene.update_selection_layer(&layer);

    for calc in calcs.iter() {
        if calc.trace.has_text() {
            style_text_selection(scene, calc.index, dim);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_normalizes_corners() {
        let rect = SelectionRect::new(DVec2::new(10.0, 0.0), DVec2::new(0.0, 10.0));
        assert!(rect.contains(DVec2::new(10.0, 10.0), 0));
        assert!(rect.contains(DVec2::new(5.0, 5.0), 0));
        assert!(!rect.contains(DVec2::new(f64::NAN, 5.0), 0));
        assert!(!rect.is_degenerate());
        assert!(SelectionRect::new(DVec2::ZERO, DVec2::new(0.0, 10.0)).is_degenerate());
    }

    #[test]
    fn test_polygon_even_odd() {
        let square = SelectionPolygon::new(vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(10.0, 0.0),
            DVec2::new(10.0, 10.0),
            DVec2::new(0.0, 10.0),
        ]);
        assert!(square.contains(DVec2::new(5.0, 5.0), 0));
        assert!(!square.contains(DVec2::new(15.0, 5.0), 0));
        assert!(!square.is_degenerate());

        let line = SelectionPolygon::new(vec![DVec2::ZERO, DVec2::new(5.0, 5.0), DVec2::new(10.0, 10.0)]);
        assert!(line.is_degenerate());
        assert!(SelectionPolygon::new(Vec::new()).is_degenerate());
        assert!(!SelectionPolygon::new(Vec::new()).contains(DVec2::ZERO, 0));
    }

    #[test]
    fn test_closure_tester() {
        let even = |_: DVec2, index: usize| index % 2 == 0;
        assert!(even.contains(DVec2::ZERO, 4));
        assert!(!even.contains(DVec2::ZERO, 3));
        assert!(!even.is_degenerate());
    }

    #[test]
    fn test_partition_points() {
        let (selected, unselected) = partition_points(&[3, 1, 3, 9], 5);
        assert_eq!(selected, vec![3, 1]);
        assert_eq!(unselected, vec![0, 2, 4]);
    }
}
