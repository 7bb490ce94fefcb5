//! Per-subplot scene state.
//!
//! A [`SceneState`] collects the options of every trace on one subplot
//! while traces are calculated, creates the GPU batches it needs the first
//! time it is plotted, and issues draws in a fixed layering order: per
//! trace fill, line, error bars, markers and labels, then the selection
//! layer on top.

use crate::ResolvedStyle;
use std::sync::Arc;
use stipple_render::{
    BatchLayer, DrawBatch, ErrorSpec, FillSpec, LineSpec, MarkerSpec, RenderContext, TextBatch,
    TextSpec, ViewportRange,
};

/// Options for one trace, one slot per visual kind.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceSlots {
    /// Number of points in the trace.
    pub points: usize,
    /// Interleaved linearized positions, NaN for missing samples.
    pub positions: Arc<[f64]>,
    pub line: Option<LineSpec>,
    pub fill: Option<FillSpec>,
    pub marker: Option<MarkerSpec>,
    pub marker_selected: Option<MarkerSpec>,
    pub marker_unselected: Option<MarkerSpec>,
    pub error_x: Option<ErrorSpec>,
    pub error_y: Option<ErrorSpec>,
    pub text: Option<TextSpec>,
    pub text_selected: Option<TextSpec>,
    pub text_unselected: Option<TextSpec>,
}

impl TraceSlots {
    pub fn new(positions: Arc<[f64]>, style: ResolvedStyle) -> Self {
        Self {
            points: positions.len() / 2,
            positions,
            line: style.line,
            fill: style.fill,
            marker: style.marker,
            marker_selected: style.marker_selected,
            marker_unselected: style.marker_unselected,
            error_x: style.error_x,
            error_y: style.error_y,
            text: style.text,
            text_selected: style.text_selected,
            text_unselected: style.text_unselected,
        }
    }
}

/// A GPU object that is requested while traces are calculated and created
/// on the next plot.
enum Lazy<B> {
    Absent,
    Requested,
    Live(B),
}

impl<B> Lazy<B> {
    fn request(&mut self) {
        if matches!(self, Self::Absent) {
            *self = Self::Requested;
        }
    }

    fn realize(&mut self, create: impl FnOnce() -> B) {
        if matches!(self, Self::Requested) {
            *self = Self::Live(create());
        }
    }

    fn live(&mut self) -> Option<&mut B> {
        match self {
            Self::Live(batch) => Some(batch),
            _ => None,
        }
    }

    fn is_live(&self) -> bool {
        matches!(self, Self::Live(_))
    }

    fn take(&mut self) -> Option<B> {
        match std::mem::replace(self, Self::Absent) {
            Self::Live(batch) => Some(batch),
            _ => None,
        }
    }
}

/// Per-trace selected / unselected point lists. `None` entries belong to
/// traces that are not being partitioned.
pub type Partition = Vec<Option<Vec<usize>>>;

/// Everything drawn on one subplot.
pub struct SceneState {
    count: usize,
    dirty: bool,
    traces: Vec<TraceSlots>,
    fill_order: Vec<Option<Vec<usize>>>,
    select_batch: Option<Partition>,
    unselect_batch: Option<Partition>,
    line: Lazy<Box<dyn DrawBatch<LineSpec>>>,
    fill: Lazy<Box<dyn DrawBatch<FillSpec>>>,
    marker: Lazy<Box<dyn DrawBatch<MarkerSpec>>>,
    error: Lazy<Box<dyn DrawBatch<ErrorSpec>>>,
    text: Lazy<Vec<Box<dyn TextBatch>>>,
    selection: Option<Box<dyn DrawBatch<MarkerSpec>>>,
    /// Last viewport pushed to the batches.
    viewport: Option<ViewportRange>,
}

impl Default for SceneState {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneState {
    pub fn new() -> Self {
        Self {
            count: 0,
            dirty: true,
            traces: Vec::new(),
            fill_order: Vec::new(),
            select_batch: None,
            unselect_batch: None,
            line: Lazy::Absent,
            fill: Lazy::Absent,
            marker: Lazy::Absent,
            error: Lazy::Absent,
            text: Lazy::Absent,
            selection: None,
            viewport: None,
        }
    }

    /// Number of traces pushed since the last reset.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Whether options changed since the scene was last realized.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn traces(&self) -> &[TraceSlots] {
        &self.traces
    }

    pub fn trace(&self, index: usize) -> Option<&TraceSlots> {
        self.traces.get(index)
    }

    pub fn fill_order(&self) -> &[Option<Vec<usize>>] {
        &self.fill_order
    }

    pub fn select_batch(&self) -> Option<&Partition> {
        self.select_batch.as_ref()
    }

    pub fn unselect_batch(&self) -> Option<&Partition> {
        self.unselect_batch.as_ref()
    }

    pub fn has_selection_layer(&self) -> bool {
        self.selection.is_some()
    }

    pub fn has_marker_batch(&self) -> bool {
        self.marker.is_live()
    }

    /// Start a new calculation pass. A realized scene drops its pending
    /// options; a scene still accumulating keeps them.
    pub fn begin_pass(&mut self) {
        if !self.dirty {
            tracing::debug!("Resetting scene options ({} traces)", self.count);
            self.count = 0;
            self.traces.clear();
            self.fill_order.clear();
            self.dirty = true;
        }
    }

    /// Append a trace and return its scene index.
    pub fn push_trace(&mut self, slots: TraceSlots) -> usize {
        self.request_batches(&slots);
        self.traces.push(slots);
        self.count = self.traces.len();
        self.count - 1
    }

    fn request_batches(&mut self, slots: &TraceSlots) {
        if slots.line.is_some() {
            self.line.request();
        }
        if slots.fill.is_some() {
            self.fill.request();
        }
        if slots.marker.is_some() {
            self.marker.request();
        }
        if slots.error_x.is_some() || slots.error_y.is_some() {
            self.error.request();
        }
        if slots.text.is_some() {
            self.text.request();
        }
    }

    /// Back to the state of a freshly created scene, releasing any batches.
    pub fn reinit(&mut self) {
        self.destroy();
        *self = Self::new();
    }

    /// Create requested batches and upload every pending option.
    pub fn realize(&mut self, context: &dyn RenderContext) {
        let count = self.count;

        // Batches released by `destroy` are requested again.
        let traces = std::mem::take(&mut self.traces);
        for slots in &traces {
            self.request_batches(slots);
        }
        self.traces = traces;

        self.fill_order = crate::builder::build_fills(&mut self.traces);

        self.line.realize(|| {
            tracing::trace!("Creating line batch");
            context.create_line_batch()
        });
        self.fill.realize(|| {
            tracing::trace!("Creating fill batch");
            context.create_fill_batch()
        });
        self.marker.realize(|| {
            tracing::trace!("Creating marker batch");
            context.create_marker_batch(BatchLayer::Base)
        });
        self.error.realize(|| {
            tracing::trace!("Creating error bar batch");
            context.create_error_batch()
        });
        self.text.realize(Vec::new);

        if let Some(batches) = self.text.live() {
            let keep = count.min(batches.len());
            for mut extra in batches.drain(keep..) {
                extra.destroy();
            }
            while batches.len() < count {
                tracing::trace!("Creating text batch {}", batches.len());
                batches.push(context.create_text_batch());
            }
        }

        if let Some(batch) = self.line.live() {
            let options: Vec<_> = self.traces.iter().map(|t| t.line.clone()).collect();
            batch.update(&options);
        }
        if let Some(batch) = self.fill.live() {
            let options: Vec<_> = self.traces.iter().map(|t| t.fill.clone()).collect();
            batch.update(&options);
        }
        if let Some(batch) = self.marker.live() {
            let options: Vec<_> = self.traces.iter().map(|t| t.marker.clone()).collect();
            batch.update(&options);
        }
        if let Some(batch) = self.error.live() {
            let options: Vec<_> = self
                .traces
                .iter()
                .map(|t| t.error_x.clone())
                .chain(self.traces.iter().map(|t| t.error_y.clone()))
                .collect();
            batch.update(&options);
        }
        if let Some(batches) = self.text.live() {
            for (batch, slots) in batches.iter_mut().zip(&self.traces) {
                if let Some(text) = &slots.text {
                    batch.update(text);
                }
            }
        }

        self.dirty = false;
    }

    /// Push a viewport to every live batch. Batches created later, such as a
    /// selection layer made by a select call, start from this viewport.
    pub fn set_viewport(&mut self, viewport: &ViewportRange) {
        self.viewport = Some(*viewport);
        if let Some(batch) = self.line.live() {
            batch.set_viewport(viewport);
        }
        if let Some(batch) = self.fill.live() {
            batch.set_viewport(viewport);
        }
        if let Some(batch) = self.marker.live() {
            batch.set_viewport(viewport);
        }
        if let Some(batch) = self.error.live() {
            batch.set_viewport(viewport);
        }
        if let Some(batch) = self.selection.as_mut() {
            batch.set_viewport(viewport);
        }
        if let Some(batches) = self.text.live() {
            for batch in batches {
                batch.set_viewport(viewport);
            }
        }
    }

    /// Issue every draw call for the scene.
    pub fn draw(&mut self) {
        let count = self.count;
        for (i, slots) in self.traces.iter().enumerate() {
            if let (Some(batch), Some(Some(order))) = (self.fill.live(), self.fill_order.get(i)) {
                batch.draw_many(order);
            }
            if slots.line.is_some() {
                if let Some(batch) = self.line.live() {
                    batch.draw(i);
                }
            }
            if let Some(batch) = self.error.live() {
                if slots.error_x.is_some() {
                    batch.draw(i);
                }
                if slots.error_y.is_some() {
                    batch.draw(i + count);
                }
            }
            if slots.marker.is_some() && !self.is_partitioned(i) {
                if let Some(batch) = self.marker.live() {
                    batch.draw(i);
                }
            }
            if slots.text.is_some() {
                if let Some(batch) = self.text.live().and_then(|batches| batches.get_mut(i)) {
                    batch.render();
                }
            }
        }

        if let (Some(select), Some(unselect)) = (&self.select_batch, &self.unselect_batch) {
            if let (Some(layer), Some(base)) = (self.selection.as_mut(), self.marker.live()) {
                layer.draw_subsets(select);
                base.draw_subsets(unselect);
            }
        }
    }

    /// Release every batch. The scene keeps its options and can be realized
    /// again.
    pub fn destroy(&mut self) {
        if let Some(mut batch) = self.line.take() {
            batch.destroy();
        }
        if let Some(mut batch) = self.fill.take() {
            batch.destroy();
        }
        if let Some(mut batch) = self.marker.take() {
            batch.destroy();
        }
        if let Some(mut batch) = self.error.take() {
            batch.destroy();
        }
        if let Some(mut batch) = self.selection.take() {
            batch.destroy();
        }
        if let Some(batches) = self.text.take() {
            for mut batch in batches {
                batch.destroy();
            }
        }
        self.select_batch = None;
        self.unselect_batch = None;
        self.dirty = true;
    }

    /// Create the selection-layer batch if missing, on the last viewport.
    pub(crate) fn ensure_selection_layer(&mut self, context: &dyn RenderContext) {
        if self.selection.is_some() {
            return;
        }
        tracing::trace!("Creating selection marker batch");
        let mut batch = context.create_marker_batch(BatchLayer::Selection);
        if let Some(viewport) = &self.viewport {
            batch.set_viewport(viewport);
        }
        self.selection = Some(batch);
    }

    /// Make sure both partitions exist, sized to the current trace count.
    pub(crate) fn ensure_partitions(&mut self) {
        let count = self.count;
        for partition in [&mut self.select_batch, &mut self.unselect_batch] {
            partition.get_or_insert_with(Vec::new).resize(count, None);
        }
    }

    pub(crate) fn clear_partitions(&mut self) {
        self.select_batch = None;
        self.unselect_batch = None;
    }

    pub(crate) fn is_partitioned(&self, index: usize) -> bool {
        self.select_batch
            .as_ref()
            .is_some_and(|select| matches!(select.get(index), Some(Some(_))))
    }

    pub(crate) fn partition(&self, index: usize) -> Option<(&[usize], &[usize])> {
        let selected = self.select_batch.as_ref()?.get(index)?.as_deref()?;
        let unselected = self.unselect_batch.as_ref()?.get(index)?.as_deref()?;
        Some((selected, unselected))
    }

    pub(crate) fn set_partition(&mut self, index: usize, selected: Vec<usize>, unselected: Vec<usize>) {
        self.ensure_partitions();
        if let (Some(select), Some(unselect)) = (&mut self.select_batch, &mut self.unselect_batch) {
            if index < select.len() {
                select[index] = Some(selected);
                unselect[index] = Some(unselected);
            }
        }
    }

    /// Put every trace without a partition into the fully unselected state.
    pub(crate) fn unselect_unpartitioned(&mut self) {
        self.ensure_partitions();
        if let (Some(select), Some(unselect)) = (&mut self.select_batch, &mut self.unselect_batch) {
            for (i, slots) in self.traces.iter().enumerate() {
                if select[i].is_none() {
                    select[i] = Some(Vec::new());
                    unselect[i] = Some((0..slots.points).collect());
                }
            }
        }
    }

    pub(crate) fn any_partitioned(&self) -> bool {
        self.select_batch
            .as_ref()
            .is_some_and(|select| select.iter().any(Option::is_some))
    }

    /// Upload `options` into the base marker batch.
    pub(crate) fn update_markers(&mut self, options: &[Option<MarkerSpec>]) {
        if let Some(batch) = self.marker.live() {
            batch.update(options);
        }
    }

    pub(crate) fn update_selection_layer(&mut self, options: &[Option<MarkerSpec>]) {
        if let Some(batch) = self.selection.as_mut() {
            batch.update(options);
        }
    }

    pub(crate) fn update_text(&mut self, index: usize, options: &TextSpec) {
        if let Some(batch) = self.text.live().and_then(|batches| batches.get_mut(index)) {
            batch.update(options);
        }
    }

    /// Base marker options of every trace.
    pub(crate) fn base_markers(&self) -> Vec<Option<MarkerSpec>> {
        self.traces.iter().map(|t| t.marker.clone()).collect()
    }
}

impl std::fmt::Debug for SceneState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneState")
            .field("count", &self.count)
            .field("dirty", &self.dirty)
            .field("line", &self.line.is_live())
            .field("fill", &self.fill.is_live())
            .field("marker", &self.marker.is_live())
            .field("error", &self.error.is_live())
            .field("text", &self.text.is_live())
            .field("selection", &self.selection.is_some())
            .field("viewport", &self.viewport)
            .finish()
    }
}
