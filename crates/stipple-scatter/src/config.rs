use stipple_render::GlExtensions;

/// Point count at which a trace gets a real spatial index.
pub const DEFAULT_INDEX_THRESHOLD: usize = 100_000;

/// Alpha given to unselected points that have no explicit unselected style.
pub const DEFAULT_DESELECT_DIM: f32 = 0.2;

/// Tunables of a [`RenderSession`](crate::RenderSession).
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    /// Traces with at least this many points are spatially indexed, unless
    /// one of their axes is logarithmic.
    pub index_threshold: usize,
    /// Dimming alpha for unselected markers and labels.
    pub deselect_dim: f32,
    /// Extensions the context must offer before batches are realized.
    pub required_extensions: GlExtensions,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            index_threshold: DEFAULT_INDEX_THRESHOLD,
            deselect_dim: DEFAULT_DESELECT_DIM,
            required_extensions: GlExtensions::SCATTER,
        }
    }
}
