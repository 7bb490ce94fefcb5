//! The host-facing entry point.
//!
//! A [`RenderSession`] owns one [`SceneState`] per subplot and drives them
//! through calculate, plot and interaction passes:
//!
//! ```
//! use std::sync::Arc;
//! use stipple_scatter::{Axis, Layout, PlotOutcome, RenderSession, Subplot, SubplotKey, Trace};
//! use stipple_test_utils::MockRenderContext;
//!
//! let mut session = RenderSession::new(Arc::new(MockRenderContext::new()));
//! let subplot = Subplot::new(
//!     SubplotKey::PRIMARY,
//!     Axis::linear((0.0, 10.0), (0.0, 540.0)),
//!     Axis::linear((0.0, 10.0), (270.0, 0.0)),
//! );
//!
//! let trace = Arc::new(Trace::from_points(&[(1.0, 2.0), (3.0, 4.0)]));
//! let mut calcs = vec![session.calculate(&subplot, trace)];
//! let outcome = session.plot(&subplot, &Layout::default(), &mut calcs);
//! assert_eq!(outcome, PlotOutcome::Drawn);
//! ```

use crate::selection::{self, SelectionChange};
use crate::{
    CalculatedTrace, DefaultStyleResolver, HoverMode, HoverPoint, Layout, PointIndex, SceneConfig,
    SceneState, SelectedPoint, SelectionTester, StyleResolver, Subplot, SubplotKey, Trace,
};
use std::sync::Arc;
use stipple_core::alloc::HashMap;
use stipple_core::profiling::profile_function;
use stipple_render::{ContextError, RenderContext};

/// Callbacks for interaction results. Every method has an empty default.
pub trait SessionObserver: Send {
    fn on_hover(&self, _subplot: SubplotKey, _point: &HoverPoint) {}

    fn on_unhover(&self, _subplot: SubplotKey) {}

    fn on_selected(&self, _subplot: SubplotKey, _trace_index: usize, _points: &[SelectedPoint]) {}

    fn on_deselect(&self, _subplot: SubplotKey) {}
}

/// What a call to [`RenderSession::plot`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlotOutcome {
    Drawn,
    /// No traces were given.
    Empty,
    /// Nothing was calculated for the subplot.
    NoScene,
    /// The rendering context could not be used; the scene was reset and the
    /// draw skipped.
    Skipped(ContextError),
}

pub struct RenderSession {
    context: Arc<dyn RenderContext>,
    config: SceneConfig,
    style: Box<dyn StyleResolver>,
    scenes: HashMap<SubplotKey, SceneState>,
    observers: Vec<Box<dyn SessionObserver>>,
}

impl RenderSession {
    pub fn new(context: Arc<dyn RenderContext>) -> Self {
        Self::with_config(context, SceneConfig::default())
    }

    pub fn with_config(context: Arc<dyn RenderContext>, config: SceneConfig) -> Self {
        Self {
            context,
            style: Box::new(DefaultStyleResolver::new(config.deselect_dim)),
            config,
            scenes: HashMap::new(),
            observers: Vec::new(),
        }
    }

    pub fn with_style_resolver(mut self, style: impl StyleResolver + 'static) -> Self {
        self.style = Box::new(style);
        self
    }

    pub fn add_observer(&mut self, observer: impl SessionObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn scene(&self, key: SubplotKey) -> Option<&SceneState> {
        self.scenes.get(&key)
    }

    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    /// Compute positions, index and options for `trace` and queue them on
    /// the subplot's scene.
    pub fn calculate(&mut self, subplot: &Subplot, trace: Arc<Trace>) -> CalculatedTrace {
        profile_function!();
        let positions = crate::linearize_positions(&trace, subplot);
        let point_index = PointIndex::build(
            Arc::clone(&positions),
            self.config.index_threshold,
            subplot.has_log_axis(),
        );

        let style = self.style.resolve(&trace, &positions);
        let (slots, extremes) = crate::builder::build_slots(&trace, style, positions, subplot);

        let scene = self.scenes.entry(subplot.key).or_insert_with(|| {
            tracing::debug!("Creating scene for subplot {}", subplot.key);
            SceneState::new()
        });
        scene.begin_pass();
        let index = scene.push_trace(slots);

        CalculatedTrace::new(trace, subplot.key, index, point_index, extremes)
    }

    /// Realize and draw the subplot's scene.
    ///
    /// `calcs` are the subplot's traces from the last calculation pass. They
    /// are sorted into scene order, and their pixel caches are refreshed or
    /// dropped depending on whether the subplot is in selection mode.
    pub fn plot(
        &mut self,
        subplot: &Subplot,
        layout: &Layout,
        calcs: &mut [CalculatedTrace],
    ) -> PlotOutcome {
        profile_function!();
        if calcs.is_empty() {
            return PlotOutcome::Empty;
        }
        let Some(scene) = self.scenes.get_mut(&subplot.key) else {
            return PlotOutcome::NoScene;
        };

        if let Err(err) = self.context.prepare(self.config.required_extensions) {
            tracing::warn!("Skipping draw of subplot {}: {}", subplot.key, err);
            scene.reinit();
            return PlotOutcome::Skipped(err);
        }

        calcs.sort_by_key(|calc| calc.index);

        if scene.is_dirty() {
            tracing::trace!("Realizing scene {} ({} traces)", subplot.key, scene.count());
            scene.realize(self.context.as_ref());
        }

        selection::prepare_selection(
            scene,
            self.context.as_ref(),
            subplot,
            layout,
            calcs,
            self.config.deselect_dim,
        );

        scene.set_viewport(&layout.viewport_range(subplot.xaxis.as_ref(), subplot.yaxis.as_ref()));
        scene.draw();
        PlotOutcome::Drawn
    }

    /// Push new axis ranges to a realized scene and redraw it.
    pub fn relayout(&mut self, subplot: &Subplot, layout: &Layout) -> bool {
        let Some(scene) = self.scenes.get_mut(&subplot.key) else {
            return false;
        };
        if scene.is_dirty() {
            return false;
        }
        scene.set_viewport(&layout.viewport_range(subplot.xaxis.as_ref(), subplot.yaxis.as_ref()));
        scene.draw();
        true
    }

    /// Redraw a realized scene as is.
    pub fn draw(&mut self, key: SubplotKey) -> bool {
        match self.scenes.get_mut(&key) {
            Some(scene) if !scene.is_dirty() => {
                scene.draw();
                true
            }
            _ => false,
        }
    }

    /// Nearest point of `calc` to `(x, y)`, in data units. Observers are told
    /// about a hit.
    pub fn hover(
        &self,
        subplot: &Subplot,
        calc: &CalculatedTrace,
        x: f64,
        y: f64,
        mode: HoverMode,
        max_distance: f64,
    ) -> Option<HoverPoint> {
        let point = crate::hover_points(calc, subplot, x, y, mode, max_distance)?;
        for observer in &self.observers {
            observer.on_hover(subplot.key, &point);
        }
        Some(point)
    }

    /// Tell observers the pointer left the subplot.
    pub fn unhover(&self, key: SubplotKey) {
        for observer in &self.observers {
            observer.on_unhover(key);
        }
    }

    /// Select points of `calc` inside `tester`, in pixels. `None` or a
    /// degenerate region clears the subplot's selection.
    ///
    /// Clearing here drops the pixel cache of `calc` only; the subplot's
    /// other traces keep theirs until the next [`plot`](Self::plot). Use
    /// [`deselect`](Self::deselect) to clear every trace at once.
    pub fn select(
        &mut self,
        subplot: &Subplot,
        calc: &mut CalculatedTrace,
        tester: Option<&dyn SelectionTester>,
    ) -> Vec<SelectedPoint> {
        let Some(scene) = self.scenes.get_mut(&subplot.key) else {
            return Vec::new();
        };

        let change = selection::select_points(
            scene,
            self.context.as_ref(),
            subplot,
            calc,
            tester,
            self.config.deselect_dim,
        );
        if matches!(change, SelectionChange::Ignored) {
            return Vec::new();
        }
        if !scene.is_dirty() {
            scene.draw();
        }

        match change {
            SelectionChange::Selected(points) => {
                for observer in &self.observers {
                    observer.on_selected(subplot.key, calc.index, &points);
                }
                points
            }
            _ => {
                for observer in &self.observers {
                    observer.on_deselect(subplot.key);
                }
                Vec::new()
            }
        }
    }

    /// Leave selection mode on a subplot, restoring base styling and
    /// dropping the pixel caches of every trace in `calcs`.
    pub fn deselect(&mut self, subplot: &Subplot, calcs: &mut [CalculatedTrace]) -> bool {
        let Some(scene) = self.scenes.get_mut(&subplot.key) else {
            return false;
        };

        tracing::debug!("Clearing selection on {}", subplot.key);
        selection::clear_selection(scene);
        for calc in calcs.iter_mut() {
            calc.clear_pixels();
        }
        if !scene.is_dirty() {
            scene.draw();
        }

        for observer in &self.observers {
            observer.on_deselect(subplot.key);
        }
        true
    }

    /// Release a subplot's batches and forget its scene.
    pub fn destroy(&mut self, key: SubplotKey) -> bool {
        match self.scenes.remove(&key) {
            Some(mut scene) => {
                tracing::debug!("Destroying scene for subplot {}", key);
                scene.destroy();
                true
            }
            None => false,
        }
    }

    /// Destroy every scene whose key fails `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&SubplotKey) -> bool) {
        let doomed: Vec<SubplotKey> = self.scenes.keys().filter(|key| !keep(key)).copied().collect();
        for key in doomed {
            self.destroy(key);
        }
    }
}

impl Drop for RenderSession {
    fn drop(&mut self) {
        for scene in self.scenes.values_mut() {
            scene.destroy();
        }
    }
}
