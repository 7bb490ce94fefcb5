//! Test utilities for Stipple.
//!
//! The main component is `MockRenderContext` (requires the `mock` feature), a
//! [`RenderContext`](stipple_render::RenderContext) that hands out recording
//! batches instead of GPU ones. Every update, viewport change, draw and
//! destroy is logged as a [`RenderCall`], and the most recent options per
//! batch kind are kept for assertions.
//!
//! # Example
//!
//! ```rust
//! # #[cfg(feature = "mock")]
//! # {
//! use stipple_render::{GlExtensions, RenderContext};
//! use stipple_test_utils::{BatchKind, MockRenderContext};
//!
//! let mock = MockRenderContext::new();
//! assert!(mock.prepare(GlExtensions::SCATTER).is_ok());
//!
//! let mut lines = mock.create_line_batch();
//! lines.update(&[None, None]);
//! lines.draw(1);
//!
//! assert_eq!(mock.count_creates(BatchKind::Line), 1);
//! assert_eq!(mock.draw_calls().len(), 1);
//! # }
//! ```

#[cfg(feature = "mock")]
pub mod mock_render;
mod render_call;

#[cfg(feature = "mock")]
pub use mock_render::*;
pub use render_call::*;
