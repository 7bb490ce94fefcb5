//! Draw batch traits.
//!
//! A batch holds geometry for one visual kind across every trace of a
//! subplot. Item `i` of an update is trace `i`; `None` means the trace does
//! not use this kind. The error batch is the exception and holds `2 * count`
//! items, x errors first.

use crate::{TextSpec, ViewportRange};

/// Which marker batch a context is asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BatchLayer {
    /// Regular markers, also used for the dimmed unselected points.
    Base,
    /// Highlighted points while a selection is active. Lives on the canvas
    /// layer above the base layer.
    Selection,
}

/// An update-in-place collection of geometry of one kind.
pub trait DrawBatch<T>: Send {
    /// Replace the per-item options.
    fn update(&mut self, options: &[Option<T>]);

    /// Set the viewport and data range used by every item.
    fn set_viewport(&mut self, viewport: &ViewportRange);

    /// Draw a single item.
    fn draw(&mut self, item: usize);

    /// Draw several items in one call, in the given order.
    fn draw_many(&mut self, items: &[usize]);

    /// Draw a subset of points for each item; `None` skips the item.
    fn draw_subsets(&mut self, subsets: &[Option<Vec<usize>>]);

    /// Release the GPU resources. The batch must not be used afterwards.
    fn destroy(&mut self);
}

/// Text labels for one trace.
pub trait TextBatch: Send {
    fn update(&mut self, options: &TextSpec);

    fn set_viewport(&mut self, viewport: &ViewportRange);

    fn render(&mut self);

    fn destroy(&mut self);
}
