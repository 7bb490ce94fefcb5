#![allow(dead_code)]

use std::sync::Arc;
use stipple_scatter::{Axis, CalculatedTrace, Layout, Margin, RenderSession, Subplot, SubplotKey, Trace};
use stipple_test_utils::MockRenderContext;

/// 10 pixels per data unit, y pointing up on screen.
pub fn subplot() -> Subplot {
    Subplot::new(
        SubplotKey::PRIMARY,
        Axis::linear((0.0, 10.0), (0.0, 100.0)),
        Axis::linear((0.0, 10.0), (100.0, 0.0)),
    )
}

pub fn layout() -> Layout {
    Layout::new(100.0, 100.0).with_margin(Margin::default())
}

pub fn session() -> (Arc<MockRenderContext>, RenderSession) {
    let mock = Arc::new(MockRenderContext::new());
    let session = RenderSession::new(mock.clone());
    (mock, session)
}

/// Calculate every trace on the primary subplot.
pub fn calculate(session: &mut RenderSession, traces: Vec<Trace>) -> Vec<CalculatedTrace> {
    let subplot = subplot();
    traces
        .into_iter()
        .map(|trace| session.calculate(&subplot, Arc::new(trace)))
        .collect()
}
