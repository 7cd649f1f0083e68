//! Backend abstraction traits for renderable resources
//!
//! Backends own the renderable representations of scene objects. The
//! registry drives the resource lifecycle through this trait and never
//! touches geometry itself; the render handle set is mutated only by the
//! registry and read only by the per-frame render pass.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use slotmap::{Key, KeyData, SlotMap};
use thiserror::Error;

use crate::camera::Camera;
use crate::render::lighting::DirectionalLight;
use crate::scene::object::{ObjectKind, ObjectPayload};

/// Render backend errors
#[derive(Error, Debug)]
pub enum RenderError {
    /// Building a renderable representation failed
    #[error("failed to build renderable: {0}")]
    BuildFailed(String),

    /// The render pass failed
    #[error("render pass failed: {0}")]
    PassFailed(String),
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, RenderError>;

/// Handle to a renderable resource stored in the backend
///
/// Exclusively owned by the scene object it was built for; the owner must
/// release it before discarding or rebuilding the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderableHandle(pub u64);

/// Main rendering backend trait
///
/// Abstracts over concrete renderers and provides a consistent interface for
/// the registry and the frame loop.
pub trait RenderBackend: Send {
    /// Build the renderable representation for a validated object payload
    fn build_renderable(
        &mut self,
        kind: ObjectKind,
        payload: &ObjectPayload,
    ) -> BackendResult<RenderableHandle>;

    /// Add a built renderable to the active render set
    fn attach(&mut self, handle: RenderableHandle);

    /// Remove a renderable from the active render set (resources stay alive)
    fn detach(&mut self, handle: RenderableHandle);

    /// Free the renderable's underlying resources
    fn release(&mut self, handle: RenderableHandle);

    /// Draw the active render set from the given viewpoint
    fn render_frame(&mut self, camera: &Camera, light: &DirectionalLight) -> BackendResult<()>;
}

/// Backend handle shared between the registry and the frame loop
pub type SharedBackend = Arc<Mutex<dyn RenderBackend>>;

slotmap::new_key_type! {
    struct RenderableKey;
}

fn key_of(handle: RenderableHandle) -> RenderableKey {
    KeyData::from_ffi(handle.0).into()
}

/// Backend that tracks resources without a GPU
///
/// Useful for running the viewer on machines without a graphics stack and as
/// the backend under test: it maintains the built and attached sets with the
/// same lifecycle rules a real renderer would.
#[derive(Default)]
pub struct HeadlessBackend {
    built: SlotMap<RenderableKey, ObjectKind>,
    attached: HashSet<RenderableKey>,
    frames_rendered: u64,
}

impl HeadlessBackend {
    /// Create an empty headless backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of currently built renderables
    pub fn built_count(&self) -> usize {
        self.built.len()
    }

    /// Number of renderables in the active render set
    pub fn attached_count(&self) -> usize {
        self.attached.len()
    }

    /// Whether the handle refers to a live renderable
    pub fn is_built(&self, handle: RenderableHandle) -> bool {
        self.built.contains_key(key_of(handle))
    }

    /// Whether the handle is in the active render set
    pub fn is_attached(&self, handle: RenderableHandle) -> bool {
        self.attached.contains(&key_of(handle))
    }

    /// Number of frames drawn so far
    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }
}

impl RenderBackend for HeadlessBackend {
    fn build_renderable(
        &mut self,
        kind: ObjectKind,
        _payload: &ObjectPayload,
    ) -> BackendResult<RenderableHandle> {
        let key = self.built.insert(kind);
        log::debug!("built {} renderable {:?}", kind, key);
        Ok(RenderableHandle(key.data().as_ffi()))
    }

    fn attach(&mut self, handle: RenderableHandle) {
        let key = key_of(handle);
        if self.built.contains_key(key) {
            self.attached.insert(key);
        } else {
            log::warn!("attach on unknown handle {:?}", handle);
        }
    }

    fn detach(&mut self, handle: RenderableHandle) {
        self.attached.remove(&key_of(handle));
    }

    fn release(&mut self, handle: RenderableHandle) {
        let key = key_of(handle);
        self.attached.remove(&key);
        if self.built.remove(key).is_none() {
            log::warn!("release on unknown handle {:?}", handle);
        }
    }

    fn render_frame(&mut self, _camera: &Camera, _light: &DirectionalLight) -> BackendResult<()> {
        self.frames_rendered += 1;
        log::trace!(
            "frame {}: {} renderables attached",
            self.frames_rendered,
            self.attached.len()
        );
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::object::ObjectPayload;

    #[test]
    fn lifecycle_tracks_built_and_attached_sets() {
        let mut backend = HeadlessBackend::new();
        let handle = backend
            .build_renderable(ObjectKind::DefaultCube, &ObjectPayload::None)
            .unwrap();
        assert!(backend.is_built(handle));
        assert!(!backend.is_attached(handle));

        backend.attach(handle);
        assert!(backend.is_attached(handle));

        backend.detach(handle);
        assert!(!backend.is_attached(handle));
        assert!(backend.is_built(handle));

        backend.release(handle);
        assert!(!backend.is_built(handle));
    }

    #[test]
    fn release_also_removes_from_active_set() {
        let mut backend = HeadlessBackend::new();
        let handle = backend
            .build_renderable(ObjectKind::GroundPlane, &ObjectPayload::None)
            .unwrap();
        backend.attach(handle);
        backend.release(handle);
        assert_eq!(backend.attached_count(), 0);
        assert_eq!(backend.built_count(), 0);
    }

    #[test]
    fn handles_are_unique_across_rebuilds() {
        let mut backend = HeadlessBackend::new();
        let first = backend
            .build_renderable(ObjectKind::DefaultCube, &ObjectPayload::None)
            .unwrap();
        backend.release(first);
        let second = backend
            .build_renderable(ObjectKind::DefaultCube, &ObjectPayload::None)
            .unwrap();
        assert_ne!(first, second);
    }
}
