//! Stipple Scatter
//!
//! Scene management for GPU scatter plots. Traces are calculated into
//! per-subplot scenes, realized into shared draw batches on plot, and then
//! hovered and selected without recalculation.
//!
//! # Passes
//!
//! 1. [`RenderSession::calculate`] linearizes a trace's positions, builds its
//!    [`PointIndex`] and queues its batch options on the subplot's
//!    [`SceneState`]
//! 2. [`RenderSession::plot`] negotiates the [`RenderContext`], creates the
//!    batches the scene asked for, uploads options and draws
//! 3. [`RenderSession::hover`] and [`RenderSession::select`] work from the
//!    [`CalculatedTrace`] alone
//!
//! Drawing itself goes through the traits in `stipple_render`, so any
//! backend (or the recording mock in `stipple_test_utils`) can sit
//! underneath.
//!
//! [`RenderContext`]: stipple_render::RenderContext

mod axis;
pub mod builder;
mod calc;
mod config;
mod hover;
mod index;
mod layout;
mod scene;
mod selection;
mod session;
mod style;
mod trace;

pub use axis::*;
pub use builder::AxisExtremes;
pub use calc::*;
pub use config::*;
pub use hover::*;
pub use index::*;
pub use layout::*;
pub use scene::*;
pub use selection::{
    SelectedPoint, SelectionPolygon, SelectionRect, SelectionTester, partition_points,
};
pub use session::*;
pub use style::*;
pub use trace::*;
