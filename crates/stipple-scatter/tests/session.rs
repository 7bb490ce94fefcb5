mod common;

use common::{calculate, layout, session, subplot};
use std::sync::Arc;
use stipple_render::{Color, ContextError, FillMode, GlExtensions, PerPoint};
use stipple_scatter::{
    Axis, DragMode, PlotOutcome, RenderSession, SceneConfig, Subplot, SubplotKey, Trace, TraceMode,
};
use stipple_test_utils::{BatchKind, MockRenderContext, RenderCall};

#[test]
fn test_plot_draws_in_layer_order() {
    let (mock, mut session) = session();
    let trace = Trace::from_points(&[(1.0, 1.0), (2.0, 3.0)])
        .with_mode(TraceMode::LINES | TraceMode::MARKERS)
        .with_fill(FillMode::ToZeroY);
    let mut calcs = calculate(&mut session, vec![trace]);

    assert_eq!(session.plot(&subplot(), &layout(), &mut calcs), PlotOutcome::Drawn);

    let kinds: Vec<_> = mock.draw_calls().iter().filter_map(RenderCall::kind).collect();
    assert_eq!(kinds, vec![BatchKind::Fill, BatchKind::Line, BatchKind::Marker]);
    assert!(matches!(
        &mock.draw_calls()[0],
        RenderCall::DrawMany { items, .. } if items == &vec![0]
    ));
}

#[test]
fn test_batches_created_once_per_kind() {
    let (mock, mut session) = session();
    let traces = vec![
        Trace::from_points(&[(1.0, 1.0)]).with_mode(TraceMode::LINES),
        Trace::from_points(&[(2.0, 2.0)]).with_mode(TraceMode::LINES | TraceMode::MARKERS),
    ];
    let mut calcs = calculate(&mut session, traces);
    session.plot(&subplot(), &layout(), &mut calcs);

    assert_eq!(mock.count_creates(BatchKind::Line), 1);
    assert_eq!(mock.count_creates(BatchKind::Marker), 1);
    assert_eq!(mock.count_creates(BatchKind::Fill), 0);
    assert_eq!(mock.last_lines().len(), 2);
    assert!(mock.last_markers()[0].is_none());
    assert!(mock.last_markers()[1].is_some());
}

#[test]
fn test_recalculation_is_idempotent() {
    let (mock, mut session) = session();
    let make = || {
        let mut trace = Trace::from_points(&[(1.0, 2.0), (f64::NAN, 1.0), (3.0, 4.0)])
            .with_mode(TraceMode::LINES | TraceMode::MARKERS)
            .with_fill(FillMode::ToSelf)
            .with_text(PerPoint::scalar("p".to_string()));
        trace.error_y = Some(stipple_scatter::ErrorBars::symmetric(
            stipple_scatter::ErrorValue::Percent(10.0),
        ));
        trace
    };

    let mut calcs = calculate(&mut session, vec![make()]);
    session.plot(&subplot(), &layout(), &mut calcs);
    let first = (
        mock.last_lines(),
        mock.last_fills(),
        mock.last_markers(),
        mock.last_errors(),
        mock.last_texts(),
    );

    let mut calcs = calculate(&mut session, vec![make()]);
    session.plot(&subplot(), &layout(), &mut calcs);
    let second = (
        mock.last_lines(),
        mock.last_fills(),
        mock.last_markers(),
        mock.last_errors(),
        mock.last_texts(),
    );

    // NaN fill separators make a plain `==` on positions useless, so compare
    // the debug output.
    assert_eq!(format!("{:?}", first), format!("{:?}", second));
    assert_eq!(session.scene(SubplotKey::PRIMARY).map(|s| s.count()), Some(1));
    assert_eq!(mock.count_creates(BatchKind::Line), 1);
}

#[test]
fn test_scene_accumulates_until_plotted() {
    let (_mock, mut session) = session();
    let traces = vec![
        Trace::from_points(&[(1.0, 1.0)]),
        Trace::from_points(&[(2.0, 2.0)]),
        Trace::from_points(&[(3.0, 3.0)]),
    ];
    let calcs = calculate(&mut session, traces);

    let indices: Vec<_> = calcs.iter().map(|c| c.index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
    let scene = session.scene(SubplotKey::PRIMARY).expect("scene");
    assert_eq!(scene.count(), 3);
    assert!(scene.is_dirty());
}

#[test]
fn test_plot_sorts_traces_by_scene_index() {
    let (_mock, mut session) = session();
    let mut calcs = calculate(
        &mut session,
        vec![Trace::from_points(&[(1.0, 1.0)]), Trace::from_points(&[(2.0, 2.0)])],
    );
    calcs.reverse();
    session.plot(&subplot(), &layout(), &mut calcs);
    assert_eq!(calcs[0].index, 0);
    assert_eq!(calcs[1].index, 1);
}

#[test]
fn test_to_zero_y_fill_geometry() {
    let (mock, mut session) = session();
    let trace = Trace::from_points(&[(1.0, 2.0), (2.0, 3.0), (3.0, 0.0)])
        .with_mode(TraceMode::LINES)
        .with_fill(FillMode::ToZeroY);
    let mut calcs = calculate(&mut session, vec![trace]);
    session.plot(&subplot(), &layout(), &mut calcs);

    let fill = mock.last_fills()[0].clone().expect("fill");
    assert_eq!(fill.positions, vec![1.0, 0.0, 1.0, 2.0, 2.0, 3.0, 3.0, 0.0]);
    assert_eq!(fill.mode, FillMode::ToZeroY);
}

#[test]
fn test_adjacent_fill_without_next_line() {
    let (mock, mut session) = session();
    let traces = vec![
        Trace::from_points(&[(0.0, 0.0), (1.0, 1.0)])
            .with_mode(TraceMode::LINES)
            .with_fill(FillMode::ToNextY),
        Trace::from_points(&[(0.0, 2.0), (1.0, 3.0)]).with_fill(FillMode::ToNextY),
    ];
    let mut calcs = calculate(&mut session, traces);
    assert_eq!(session.plot(&subplot(), &layout(), &mut calcs), PlotOutcome::Drawn);

    let fills = mock.last_fills();
    let first = fills[0].clone().expect("fill");
    assert_eq!(first.positions, vec![0.0, 0.0, 1.0, 1.0]);
    assert!(mock.draw_calls().contains(&RenderCall::DrawMany {
        id: 1,
        kind: BatchKind::Fill,
        items: vec![0, 1],
    }));
}

#[test]
fn test_error_bars_use_two_slots_per_trace() {
    let (mock, mut session) = session();
    let mut trace = Trace::from_points(&[(1.0, 5.0), (2.0, 6.0)]);
    trace.error_y = Some(stipple_scatter::ErrorBars::symmetric(
        stipple_scatter::ErrorValue::Constant(2.0),
    ));
    let mut calcs = calculate(&mut session, vec![trace]);
    assert_eq!(calcs[0].extremes.y, Some((3.0, 8.0)));
    assert_eq!(calcs[0].extremes.x, Some((1.0, 2.0)));

    session.plot(&subplot(), &layout(), &mut calcs);
    let errors = mock.last_errors();
    assert_eq!(errors.len(), 2);
    assert!(errors[0].is_none());
    let y = errors[1].clone().expect("y errors");
    assert_eq!(y.errors, vec![0.0, 0.0, 2.0, 2.0, 0.0, 0.0, 2.0, 2.0]);
    assert!(
        mock.draw_calls()
            .iter()
            .any(|call| matches!(call, RenderCall::Draw { kind: BatchKind::Error, item: 1, .. }))
    );
}

#[test]
fn test_context_failure_reinitializes_scene() {
    let (mock, mut session) = session();
    let mut calcs = calculate(&mut session, vec![Trace::from_points(&[(1.0, 1.0)])]);

    mock.set_available(false);
    let outcome = session.plot(&subplot(), &layout(), &mut calcs);
    assert!(matches!(outcome, PlotOutcome::Skipped(ContextError::Unavailable(_))));
    let scene = session.scene(SubplotKey::PRIMARY).expect("scene kept");
    assert_eq!(scene.count(), 0);
    assert!(scene.is_dirty());
    assert!(mock.draw_calls().is_empty());

    mock.set_available(true);
    let mut calcs = calculate(&mut session, vec![Trace::from_points(&[(1.0, 1.0)])]);
    assert_eq!(calcs[0].index, 0);
    assert_eq!(session.plot(&subplot(), &layout(), &mut calcs), PlotOutcome::Drawn);
    assert_eq!(mock.draw_calls().len(), 1);
}

#[test]
fn test_missing_extensions_skip_draw() {
    let mock = Arc::new(MockRenderContext::with_extensions(GlExtensions::INSTANCED_ARRAYS));
    let mut session = RenderSession::new(mock.clone());
    let mut calcs = calculate(&mut session, vec![Trace::from_points(&[(1.0, 1.0)])]);

    assert_eq!(
        session.plot(&subplot(), &layout(), &mut calcs),
        PlotOutcome::Skipped(ContextError::MissingExtensions(GlExtensions::ELEMENT_INDEX_UINT))
    );
    assert_eq!(mock.count_creates(BatchKind::Marker), 0);
}

#[test]
fn test_plot_without_scene_or_traces() {
    let (_mock, mut session) = session();
    assert_eq!(session.plot(&subplot(), &layout(), &mut []), PlotOutcome::Empty);

    let mut calcs = calculate(&mut session, vec![Trace::from_points(&[(1.0, 1.0)])]);
    let other = Subplot::new(
        SubplotKey::new(1, 1),
        Axis::linear((0.0, 1.0), (0.0, 1.0)),
        Axis::linear((0.0, 1.0), (1.0, 0.0)),
    );
    assert_eq!(session.plot(&other, &layout(), &mut calcs), PlotOutcome::NoScene);
}

#[test]
fn test_text_batches_follow_trace_count() {
    let (mock, mut session) = session();
    let text = |x: f64| Trace::from_points(&[(x, x)]).with_text(PerPoint::scalar("t".to_string()));

    let mut calcs = calculate(&mut session, vec![text(1.0), text(2.0)]);
    session.plot(&subplot(), &layout(), &mut calcs);
    assert_eq!(mock.count_creates(BatchKind::Text), 2);

    let mut calcs = calculate(&mut session, vec![text(1.0)]);
    session.plot(&subplot(), &layout(), &mut calcs);
    assert_eq!(mock.count_destroys(BatchKind::Text), 1);
    assert_eq!(mock.last_texts().len(), 1);
}

#[test]
fn test_relayout_pushes_new_range() {
    let (mock, mut session) = session();
    let mut calcs = calculate(&mut session, vec![Trace::from_points(&[(1.0, 1.0)])]);
    assert!(!session.relayout(&subplot(), &layout()));

    session.plot(&subplot(), &layout(), &mut calcs);
    let zoomed = Subplot::new(
        SubplotKey::PRIMARY,
        Axis::linear((0.0, 5.0), (0.0, 100.0)),
        Axis::linear((0.0, 10.0), (100.0, 0.0)),
    );
    mock.clear_calls();
    assert!(session.relayout(&zoomed, &layout()));

    let viewport = mock.last_viewport().expect("viewport");
    assert_eq!(viewport.range, [0.0, 0.0, 5.0, 10.0]);
    assert_eq!(viewport.viewport, [0.0, 0.0, 100.0, 100.0]);
    assert_eq!(mock.draw_calls().len(), 1);
    assert_eq!(mock.count_updates(BatchKind::Marker), 0);
}

#[test]
fn test_log_axis_never_gets_grid_index() {
    let mock = Arc::new(MockRenderContext::new());
    let config = SceneConfig {
        index_threshold: 10,
        ..Default::default()
    };
    let mut session = RenderSession::with_config(mock, config);
    let points: Vec<(f64, f64)> = (1..=20).map(|i| (i as f64, i as f64)).collect();

    let linear = session.calculate(&subplot(), Arc::new(Trace::from_points(&points)));
    assert!(!linear.point_index.is_identity());

    let log = Subplot::new(
        SubplotKey::new(1, 0),
        Axis::log((0.0, 2.0), (0.0, 100.0)),
        Axis::linear((0.0, 20.0), (100.0, 0.0)),
    );
    let calc = session.calculate(&log, Arc::new(Trace::from_points(&points)));
    assert!(calc.point_index.is_identity());
    assert_eq!(calc.positions[2], 2f64.log10());
    assert_eq!(session.scene_count(), 2);
}

#[test]
fn test_destroy_releases_every_batch() {
    let (mock, mut session) = session();
    let mut trace = Trace::from_points(&[(1.0, 1.0), (2.0, 2.0)])
        .with_mode(TraceMode::LINES | TraceMode::MARKERS)
        .with_fill(FillMode::ToZeroX)
        .with_text(PerPoint::scalar("t".to_string()));
    trace.error_x = Some(stipple_scatter::ErrorBars::symmetric(
        stipple_scatter::ErrorValue::Sqrt,
    ));
    let mut calcs = calculate(&mut session, vec![trace]);
    session.plot(&subplot(), &layout().with_drag_mode(DragMode::Lasso), &mut calcs);

    assert!(session.destroy(SubplotKey::PRIMARY));
    for kind in [
        BatchKind::Line,
        BatchKind::Fill,
        BatchKind::Marker,
        BatchKind::SelectMarker,
        BatchKind::Error,
        BatchKind::Text,
    ] {
        assert_eq!(mock.count_destroys(kind), 1, "{:?}", kind);
    }
    assert!(session.scene(SubplotKey::PRIMARY).is_none());
    assert!(!session.destroy(SubplotKey::PRIMARY));
}

#[test]
fn test_retain_drops_unlisted_subplots() {
    let (_mock, mut session) = session();
    let second = Subplot::new(
        SubplotKey::new(1, 1),
        Axis::linear((0.0, 1.0), (0.0, 1.0)),
        Axis::linear((0.0, 1.0), (1.0, 0.0)),
    );
    session.calculate(&subplot(), Arc::new(Trace::from_points(&[(1.0, 1.0)])));
    session.calculate(&second, Arc::new(Trace::from_points(&[(1.0, 1.0)])));
    assert_eq!(session.scene_count(), 2);

    session.retain(|key| *key == SubplotKey::PRIMARY);
    assert_eq!(session.scene_count(), 1);
    assert!(session.scene(SubplotKey::new(1, 1)).is_none());
}

#[test]
fn test_marker_colors_reach_batch() {
    let (mock, mut session) = session();
    let mut trace = Trace::from_points(&[(1.0, 1.0)]);
    trace.marker.color = PerPoint::scalar(Color::rgb(0.0, 1.0, 0.0));
    trace.opacity = 0.5;
    let mut calcs = calculate(&mut session, vec![trace]);
    session.plot(&subplot(), &layout(), &mut calcs);

    let marker = mock.last_markers()[0].clone().expect("marker");
    assert_eq!(marker.color, PerPoint::scalar(Color::rgba(0.0, 1.0, 0.0, 0.5)));
    assert_eq!(&*marker.positions, &[1.0, 1.0]);
}
