//! Mock implementation of `RenderContext` for testing.
//!
//! Batches created by the mock share one recording state with the context,
//! so a test keeps the context around and inspects it after the code under
//! test has consumed the boxed batches.

use crate::{BatchKind, RenderCall};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use stipple_render::{
    BatchLayer, ContextError, DrawBatch, ErrorSpec, FillSpec, GlExtensions, LineSpec, MarkerSpec,
    RenderContext, TextBatch, TextSpec, ViewportRange,
};

/// State shared between the context and every batch it created.
#[derive(Default)]
struct MockState {
    calls: Mutex<Vec<RenderCall>>,
    next_id: Mutex<usize>,
    lines: Mutex<Vec<Option<LineSpec>>>,
    fills: Mutex<Vec<Option<FillSpec>>>,
    markers: Mutex<Vec<Option<MarkerSpec>>>,
    selected_markers: Mutex<Vec<Option<MarkerSpec>>>,
    errors: Mutex<Vec<Option<ErrorSpec>>>,
    texts: Mutex<BTreeMap<usize, TextSpec>>,
    viewport: Mutex<Option<ViewportRange>>,
}

impl MockState {
    fn record(&self, call: RenderCall) {
        self.calls.lock().push(call);
    }

    fn allocate(&self, kind: BatchKind) -> usize {
        let mut next = self.next_id.lock();
        let id = *next;
        *next += 1;
        self.record(RenderCall::CreateBatch { id, kind });
        id
    }
}

/// Where a batch of a given option type keeps its latest update.
type Sink<T> = fn(&MockState) -> &Mutex<Vec<Option<T>>>;

fn line_sink(state: &MockState) -> &Mutex<Vec<Option<LineSpec>>> {
    &state.lines
}

fn fill_sink(state: &MockState) -> &Mutex<Vec<Option<FillSpec>>> {
    &state.fills
}

fn marker_sink(state: &MockState) -> &Mutex<Vec<Option<MarkerSpec>>> {
    &state.markers
}

fn selected_marker_sink(state: &MockState) -> &Mutex<Vec<Option<MarkerSpec>>> {
    &state.selected_markers
}

fn error_sink(state: &MockState) -> &Mutex<Vec<Option<ErrorSpec>>> {
    &state.errors
}

struct MockBatch<T: 'static> {
    id: usize,
    kind: BatchKind,
    state: Arc<MockState>,
    sink: Sink<T>,
}

impl<T: Clone + Send + 'static> DrawBatch<T> for MockBatch<T> {
    fn update(&mut self, options: &[Option<T>]) {
        *(self.sink)(&self.state).lock() = options.to_vec();
        self.state.record(RenderCall::Update {
            id: self.id,
            kind: self.kind,
            items: options.len(),
        });
    }

    fn set_viewport(&mut self, viewport: &ViewportRange) {
        *self.state.viewport.lock() = Some(*viewport);
        self.state.record(RenderCall::SetViewport {
            id: self.id,
            kind: self.kind,
        });
    }

    fn draw(&mut self, item: usize) {
        self.state.record(RenderCall::Draw {
            id: self.id,
            kind: self.kind,
            item,
        });
    }

    fn draw_many(&mut self, items: &[usize]) {
        self.state.record(RenderCall::DrawMany {
            id: self.id,
            kind: self.kind,
            items: items.to_vec(),
        });
    }

    fn draw_subsets(&mut self, subsets: &[Option<Vec<usize>>]) {
        self.state.record(RenderCall::DrawSubsets {
            id: self.id,
            kind: self.kind,
            subsets: subsets.to_vec(),
        });
    }

    fn destroy(&mut self) {
        self.state.record(RenderCall::Destroy {
            id: self.id,
            kind: self.kind,
        });
    }
}

struct MockTextBatch {
    id: usize,
    state: Arc<MockState>,
}

impl TextBatch for MockTextBatch {
    fn update(&mut self, options: &TextSpec) {
        self.state.texts.lock().insert(self.id, options.clone());
        self.state.record(RenderCall::Update {
            id: self.id,
            kind: BatchKind::Text,
            items: 1,
        });
    }

    fn set_viewport(&mut self, viewport: &ViewportRange) {
        *self.state.viewport.lock() = Some(*viewport);
        self.state.record(RenderCall::SetViewport {
            id: self.id,
            kind: BatchKind::Text,
        });
    }

    fn render(&mut self) {
        self.state.record(RenderCall::Render { id: self.id });
    }

    fn destroy(&mut self) {
        self.state.texts.lock().remove(&self.id);
        self.state.record(RenderCall::Destroy {
            id: self.id,
            kind: BatchKind::Text,
        });
    }
}

/// Mock implementation of `RenderContext` for testing.
///
/// # Example
///
/// ```rust
/// use stipple_render::{GlExtensions, RenderContext};
/// use stipple_test_utils::MockRenderContext;
///
/// let mock = MockRenderContext::with_extensions(GlExtensions::INSTANCED_ARRAYS);
/// assert!(mock.prepare(GlExtensions::SCATTER).is_err());
///
/// mock.set_extensions(GlExtensions::SCATTER);
/// assert!(mock.prepare(GlExtensions::SCATTER).is_ok());
/// ```
pub struct MockRenderContext {
    state: Arc<MockState>,
    extensions: Mutex<GlExtensions>,
    available: Mutex<bool>,
}

impl MockRenderContext {
    /// A context supporting every extension.
    pub fn new() -> Self {
        Self::with_extensions(GlExtensions::all())
    }

    /// A context supporting only `extensions`.
    pub fn with_extensions(extensions: GlExtensions) -> Self {
        Self {
            state: Arc::new(MockState::default()),
            extensions: Mutex::new(extensions),
            available: Mutex::new(true),
        }
    }

    /// Simulate losing (or regaining) the context.
    pub fn set_available(&self, available: bool) {
        *self.available.lock() = available;
    }

    pub fn set_extensions(&self, extensions: GlExtensions) {
        *self.extensions.lock() = extensions;
    }

    /// Get a copy of all recorded calls.
    pub fn calls(&self) -> Vec<RenderCall> {
        self.state.calls.lock().clone()
    }

    /// Clear recorded calls (useful between test steps).
    pub fn clear_calls(&self) {
        self.state.calls.lock().clear();
    }

    pub fn call_count(&self) -> usize {
        self.state.calls.lock().len()
    }

    /// Recorded draw and render calls, in order.
    pub fn draw_calls(&self) -> Vec<RenderCall> {
        self.state
            .calls
            .lock()
            .iter()
            .filter(|call| call.is_draw())
            .cloned()
            .collect()
    }

    pub fn count_creates(&self, kind: BatchKind) -> usize {
        self.count(|call| matches!(call, RenderCall::CreateBatch { kind: k, .. } if *k == kind))
    }

    pub fn count_updates(&self, kind: BatchKind) -> usize {
        self.count(|call| matches!(call, RenderCall::Update { kind: k, .. } if *k == kind))
    }

    pub fn count_destroys(&self, kind: BatchKind) -> usize {
        self.count(|call| matches!(call, RenderCall::Destroy { kind: k, .. } if *k == kind))
    }

    fn count(&self, pred: impl Fn(&RenderCall) -> bool) -> usize {
        self.state.calls.lock().iter().filter(|call| pred(call)).count()
    }

    /// Latest options uploaded to the line batch.
    pub fn last_lines(&self) -> Vec<Option<LineSpec>> {
        self.state.lines.lock().clone()
    }

    pub fn last_fills(&self) -> Vec<Option<FillSpec>> {
        self.state.fills.lock().clone()
    }

    /// Latest options uploaded to the base marker batch.
    pub fn last_markers(&self) -> Vec<Option<MarkerSpec>> {
        self.state.markers.lock().clone()
    }

    /// Latest options uploaded to the selection-layer marker batch.
    pub fn last_selected_markers(&self) -> Vec<Option<MarkerSpec>> {
        self.state.selected_markers.lock().clone()
    }

    pub fn last_errors(&self) -> Vec<Option<ErrorSpec>> {
        self.state.errors.lock().clone()
    }

    /// Latest options of every live text batch, in creation order.
    pub fn last_texts(&self) -> Vec<TextSpec> {
        self.state.texts.lock().values().cloned().collect()
    }

    pub fn last_viewport(&self) -> Option<ViewportRange> {
        *self.state.viewport.lock()
    }

    fn batch<T: Clone + Send + 'static>(
        &self,
        kind: BatchKind,
        sink: Sink<T>,
    ) -> Box<dyn DrawBatch<T>> {
        let id = self.state.allocate(kind);
        Box::new(MockBatch {
            id,
            kind,
            state: Arc::clone(&self.state),
            sink,
        })
    }
}

impl Default for MockRenderContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderContext for MockRenderContext {
    fn prepare(&self, required: GlExtensions) -> Result<(), ContextError> {
        let result = if !*self.available.lock() {
            Err(ContextError::Unavailable("mock context lost".to_string()))
        } else {
            let missing = required.difference(*self.extensions.lock());
            if missing.is_empty() {
                Ok(())
            } else {
                Err(ContextError::MissingExtensions(missing))
            }
        };

        self.state.record(RenderCall::Prepare { ok: result.is_ok() });
        result
    }

    fn create_line_batch(&self) -> Box<dyn DrawBatch<LineSpec>> {
        self.batch(BatchKind::Line, line_sink)
    }

    fn create_fill_batch(&self) -> Box<dyn DrawBatch<FillSpec>> {
        self.batch(BatchKind::Fill, fill_sink)
    }

    fn create_marker_batch(&self, layer: BatchLayer) -> Box<dyn DrawBatch<MarkerSpec>> {
        match layer {
            BatchLayer::Base => self.batch(BatchKind::Marker, marker_sink),
            BatchLayer::Selection => self.batch(BatchKind::SelectMarker, selected_marker_sink),
        }
    }

    fn create_error_batch(&self) -> Box<dyn DrawBatch<ErrorSpec>> {
        self.batch(BatchKind::Error, error_sink)
    }

    fn create_text_batch(&self) -> Box<dyn TextBatch> {
        let id = self.state.allocate(BatchKind::Text);
        Box::new(MockTextBatch {
            id,
            state: Arc::clone(&self.state),
        })
    }
}
