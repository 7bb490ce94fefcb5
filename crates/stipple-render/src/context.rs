//! Rendering context abstraction.

use crate::{
    BatchLayer, DrawBatch, ErrorSpec, FillSpec, GlExtensions, LineSpec, MarkerSpec, TextBatch,
};

/// Why a context could not be used for drawing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    /// No context could be acquired (lost, or never created).
    Unavailable(String),
    /// The context exists but lacks required extensions.
    MissingExtensions(GlExtensions),
}

impl std::fmt::Display for ContextError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(msg) => write!(f, "Rendering context unavailable: {}", msg),
            Self::MissingExtensions(missing) => {
                write!(f, "Missing context extensions: {}", missing.names().join(", "))
            }
        }
    }
}

impl std::error::Error for ContextError {}

/// Provider of draw batches backed by a GPU context.
///
/// Methods take `&self` and return owned, boxed batches so one context can be
/// shared (via `Arc`) between every subplot of a session. Implementations use
/// interior mutability where they need to track state.
pub trait RenderContext: Send + Sync {
    /// Make sure the context exists and supports `required`.
    ///
    /// Called before every realization pass; failure is not fatal and the
    /// caller simply retries on its next pass.
    fn prepare(&self, required: GlExtensions) -> Result<(), ContextError>;

    fn create_line_batch(&self) -> Box<dyn DrawBatch<LineSpec>>;

    fn create_fill_batch(&self) -> Box<dyn DrawBatch<FillSpec>>;

    fn create_marker_batch(&self, layer: BatchLayer) -> Box<dyn DrawBatch<MarkerSpec>>;

    fn create_error_batch(&self) -> Box<dyn DrawBatch<ErrorSpec>>;

    fn create_text_batch(&self) -> Box<dyn TextBatch>;
}
