//! Viewer engine facade
//!
//! [`ViewerEngine`] wires the registry, sync channel, camera rig, light, and
//! render backend together and drives them in a fixed per-tick order. The
//! embedding application owns the loop; the engine owns everything inside it.

use std::sync::Arc;

use thiserror::Error;

use crate::camera::CameraRig;
use crate::core::config::{ConfigError, ViewerConfig};
use crate::events::{Notifier, ViewerEvent};
use crate::foundation::time::FpsCounter;
use crate::render::backend::{RenderError, SharedBackend};
use crate::render::lighting::DirectionalLight;
use crate::scene::object::SceneError;
use crate::scene::registry::ObjectRegistry;
use crate::sync::channel::{ConnectionState, SyncChannel, Transport};

/// Engine construction and runtime errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// The configuration failed validation
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Building the built-in scene objects failed
    #[error(transparent)]
    Scene(#[from] SceneError),

    /// The render pass failed
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// The viewer core: scene state, synchronization, and camera in one place
pub struct ViewerEngine {
    config: ViewerConfig,
    camera: CameraRig,
    registry: ObjectRegistry,
    channel: SyncChannel,
    light: DirectionalLight,
    fps: FpsCounter,
    backend: SharedBackend,
    notifier: Notifier,
}

impl ViewerEngine {
    /// Build an engine over the given backend.
    ///
    /// Validates the configuration and seeds the built-in scene objects.
    pub fn new(config: ViewerConfig, backend: SharedBackend) -> Result<Self, EngineError> {
        config.validate()?;

        let notifier = Notifier::new();
        let registry = ObjectRegistry::new(
            Arc::clone(&backend),
            notifier.clone(),
            config.scene.show_ground_plane,
        )?;
        let camera = CameraRig::new(&config.camera, config.scene.render_distance);
        let channel = SyncChannel::new(notifier.clone());
        let light = DirectionalLight::new(config.scene.light_color, config.scene.light_intensity);
        let fps = FpsCounter::new(config.fps_interval);

        log::info!(
            "viewer engine ready (ground plane {}, smoothing window {})",
            if config.scene.show_ground_plane { "shown" } else { "hidden" },
            config.camera.smoothing_window
        );

        Ok(Self {
            config,
            camera,
            registry,
            channel,
            light,
            fps,
            backend,
            notifier,
        })
    }

    /// Register an observer for engine notifications
    pub fn subscribe<F>(&self, callback: F)
    where
        F: FnMut(&ViewerEvent) + Send + 'static,
    {
        self.notifier.subscribe(callback);
    }

    /// Attach a transport to the sync channel
    pub fn connect(&mut self, transport: Box<dyn Transport>) {
        self.channel.connect(transport);
    }

    /// Detach the sync transport, if any
    pub fn disconnect(&mut self) {
        self.channel.disconnect();
    }

    /// Current sync connection state
    pub fn connection_state(&self) -> ConnectionState {
        self.channel.state()
    }

    /// Drain pending sync messages into the registry.
    ///
    /// Call once per tick, before [`Self::tick`], so a frame never renders
    /// half-applied scene state.
    pub fn pump_messages(&mut self) {
        self.channel.pump(&mut self.registry);
    }

    /// Advance one frame: camera step, light follow, render pass, fps tick
    pub fn tick(&mut self, dt: f32) -> Result<(), EngineError> {
        self.camera.update(dt);
        self.light
            .follow(self.camera.position(), self.camera.look_at());
        self.backend
            .lock()
            .unwrap()
            .render_frame(self.camera.camera(), &self.light)?;
        self.fps.update();
        Ok(())
    }

    /// Latest frame-rate estimate
    pub fn fps(&self) -> f32 {
        self.fps.fps()
    }

    /// Engine configuration
    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Camera rig
    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    /// Mutable camera rig for viewpoint requests
    pub fn camera_mut(&mut self) -> &mut CameraRig {
        &mut self.camera
    }

    /// Object registry
    pub fn registry(&self) -> &ObjectRegistry {
        &self.registry
    }

    /// Mutable object registry for local operations
    pub fn registry_mut(&mut self) -> &mut ObjectRegistry {
        &mut self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::foundation::math::Vec3;
    use crate::render::backend::HeadlessBackend;
    use crate::sync::channel::testing::ScriptedTransport;
    use crate::sync::channel::TransportEvent;

    fn headless_engine() -> (ViewerEngine, Arc<Mutex<HeadlessBackend>>) {
        let backend = Arc::new(Mutex::new(HeadlessBackend::new()));
        let engine =
            ViewerEngine::new(ViewerConfig::default(), backend.clone()).expect("engine setup");
        (engine, backend)
    }

    #[test]
    fn invalid_config_is_rejected() {
        let backend = Arc::new(Mutex::new(HeadlessBackend::new()));
        let mut config = ViewerConfig::default();
        config.camera.smoothing_window = 0;
        assert!(matches!(
            ViewerEngine::new(config, backend),
            Err(EngineError::Config(_))
        ));
    }

    #[test]
    fn tick_renders_one_frame() {
        let (mut engine, backend) = headless_engine();
        engine.tick(1.0 / 60.0).unwrap();
        engine.tick(1.0 / 60.0).unwrap();
        assert_eq!(backend.lock().unwrap().frames_rendered(), 2);
    }

    #[test]
    fn light_follows_the_post_step_camera() {
        let (mut engine, _) = headless_engine();
        engine
            .camera_mut()
            .set_position(Vec3::new(10.0, 0.0, 0.0), true);
        engine.tick(1.0 / 60.0).unwrap();

        // The light offset is computed from the camera state after this
        // tick's interpolation step, not before it.
        let camera_position = engine.camera.position();
        let relative = camera_position - engine.camera.look_at();
        let expected = camera_position + Vec3::new(relative.y, -relative.x, 0.0);
        assert!((engine.light.position - expected).norm() < 1e-5);
    }

    #[test]
    fn messages_pumped_before_tick_land_in_the_same_frame() {
        let (mut engine, _) = headless_engine();
        let frame = serde_json::json!({
            "type": "add",
            "data": {
                "id": "pc",
                "kind": "PointCloud",
                "payload": { "points": [[0.0, 0.0, 0.0]] },
            },
        })
        .to_string();
        engine.connect(Box::new(ScriptedTransport::new([
            TransportEvent::Opened,
            TransportEvent::Frame(frame),
        ])));

        engine.pump_messages();
        engine.tick(1.0 / 60.0).unwrap();

        assert_eq!(engine.connection_state(), ConnectionState::Connected);
        assert!(engine.registry().contains("pc"));
    }

    #[test]
    fn fps_estimate_appears_after_the_first_window() {
        let backend = Arc::new(Mutex::new(HeadlessBackend::new()));
        let mut config = ViewerConfig::default();
        config.fps_interval = 3;
        let mut engine = ViewerEngine::new(config, backend).expect("engine setup");

        assert_eq!(engine.fps(), 0.0);
        for _ in 0..5 {
            engine.tick(1.0 / 60.0).unwrap();
        }
        assert!(engine.fps() > 0.0);
    }
}
