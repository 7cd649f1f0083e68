//! Render backend abstraction
//!
//! Geometry construction and rasterization are collaborator concerns: the
//! core only decides *when* a renderable must be (re)built, attached,
//! detached, or released. [`backend::RenderBackend`] is the seam; the
//! bundled [`backend::HeadlessBackend`] tracks resources without a GPU.

pub mod backend;
pub mod lighting;

pub use backend::{BackendResult, HeadlessBackend, RenderBackend, RenderError, RenderableHandle, SharedBackend};
pub use lighting::DirectionalLight;
