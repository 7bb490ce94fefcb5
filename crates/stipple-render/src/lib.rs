//! Stipple Render
//!
//! The contract between the scatter scene manager and whatever actually talks
//! to the GPU. Nothing in here issues GPU commands itself:
//!
//! - [`RenderContext`] hands out draw batches once the required
//!   [`GlExtensions`] have been negotiated
//! - [`DrawBatch`] / [`TextBatch`] are update-in-place geometry collections,
//!   one per visual kind, shared by every trace of a subplot
//! - the `*Spec` types are the per-trace options uploaded into those batches

mod batch;
mod color;
mod context;
mod extensions;
mod options;

pub use batch::*;
pub use color::*;
pub use context::*;
pub use extensions::*;
pub use options::*;
