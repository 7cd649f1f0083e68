//! Camera state and smooth viewpoint transitions
//!
//! [`CameraRig`] owns the camera's spatial configuration and its transition
//! machinery. Goal changes go through [`CameraRig::set_position`] /
//! [`CameraRig::set_look_at`]; every tick the rig advances one interpolation
//! step toward the current targets. A new smooth request recaptures the
//! origin from wherever the camera visually is, so re-targeting mid-flight
//! never produces a jump. All inputs are clamped or normalized defensively;
//! rig operations cannot fail.

use crate::core::config::CameraConfig;
use crate::foundation::math::{rotate_about_axis, utils, Mat4, Point3, Unit, Vec3};

/// Minimum camera-to-look-at distance enforced by zooming
const MIN_ZOOM: f32 = 0.1;

/// Threshold below which a direction vector is considered degenerate
const DEGENERATE: f32 = 1e-6;

/// Perspective camera in Z-up world space
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,
    /// Point the camera is looking at in world space
    pub target: Vec3,
    /// Up vector for camera orientation
    pub up: Vec3,
    /// Field of view angle in radians
    pub fov: f32,
    /// Aspect ratio (width / height)
    pub aspect: f32,
    /// Distance to the near clipping plane
    pub near: f32,
    /// Distance to the far clipping plane
    pub far: f32,
}

impl Camera {
    /// Create a perspective camera looking from `position` at `target`
    pub fn perspective(position: Vec3, target: Vec3, fov_degrees: f32, far: f32) -> Self {
        Self {
            position,
            target,
            up: Vec3::z(),
            fov: utils::deg_to_rad(fov_degrees),
            aspect: 1.0,
            near: 0.1,
            far,
        }
    }

    /// Update the aspect ratio for viewport changes
    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        if (self.aspect - aspect).abs() > 0.01 {
            log::info!("camera aspect ratio changed: {:.3} -> {:.3}", self.aspect, aspect);
        }
        self.aspect = aspect;
    }

    /// View matrix for world-to-camera transformation
    pub fn get_view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(
            &Point3::from(self.position),
            &Point3::from(self.target),
            &self.up,
        )
    }

    /// Perspective projection matrix
    pub fn get_projection_matrix(&self) -> Mat4 {
        Mat4::new_perspective(self.aspect, self.fov, self.near, self.far)
    }

    /// Combined view-projection matrix
    pub fn get_view_projection_matrix(&self) -> Mat4 {
        self.get_projection_matrix() * self.get_view_matrix()
    }
}

/// Camera rig: transition state machine plus derived viewpoint operations
pub struct CameraRig {
    camera: Camera,

    origin_position: Vec3,
    target_position: Vec3,
    origin_look_at: Vec3,
    target_look_at: Vec3,

    /// Ticks elapsed in the current transition, in `[0, smoothing_window]`
    progress: u32,
    smoothing_window: u32,

    /// Autonomous rotation rate in degrees per second (0 disables)
    pub auto_rotate_rate: f32,
}

impl CameraRig {
    /// Create a settled rig from camera configuration
    pub fn new(config: &CameraConfig, far: f32) -> Self {
        let position = Vec3::from(config.position);
        let look_at = Vec3::from(config.look_at);
        let smoothing_window = config.smoothing_window.max(1);

        Self {
            camera: Camera::perspective(position, look_at, config.fov_degrees, far),
            origin_position: position,
            target_position: position,
            origin_look_at: look_at,
            target_look_at: look_at,
            progress: smoothing_window,
            smoothing_window,
            auto_rotate_rate: config.auto_rotate,
        }
    }

    /// Whether no transition is in flight
    pub fn is_settled(&self) -> bool {
        self.progress >= self.smoothing_window
    }

    /// Current rendered position (interpolated while transitioning)
    pub fn position(&self) -> Vec3 {
        self.interpolate(self.origin_position, self.target_position)
    }

    /// Current rendered look-at point (interpolated while transitioning)
    pub fn look_at(&self) -> Vec3 {
        self.interpolate(self.origin_look_at, self.target_look_at)
    }

    /// Most recently requested position goal
    pub fn target_position(&self) -> Vec3 {
        self.target_position
    }

    /// Most recently requested look-at goal
    pub fn target_look_at(&self) -> Vec3 {
        self.target_look_at
    }

    /// Transition length in ticks
    pub fn smoothing_window(&self) -> u32 {
        self.smoothing_window
    }

    /// Change the transition length (clamped to at least 1 tick)
    pub fn set_smoothing_window(&mut self, window: u32) {
        let window = window.max(1);
        if self.is_settled() {
            self.progress = window;
        } else {
            self.progress = self.progress.min(window);
        }
        self.smoothing_window = window;
    }

    /// Projection camera reflecting the latest rendered state
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Mutable projection camera (aspect-ratio updates and the like)
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Advance one tick: apply auto-rotation, then one interpolation step
    pub fn update(&mut self, dt: f32) {
        if self.auto_rotate_rate != 0.0 {
            let angle = utils::deg_to_rad(self.auto_rotate_rate) * dt;
            self.rotate_horizontal(angle, true);
        }

        if !self.is_settled() {
            self.progress += 1;
        }

        self.camera.position = self.position();
        self.camera.target = self.look_at();
    }

    /// Request a position goal
    ///
    /// Smooth requests re-enter the transition from the current interpolated
    /// state; non-smooth requests jump and settle immediately.
    pub fn set_position(&mut self, position: Vec3, smooth: bool) {
        if smooth {
            self.begin_transition();
            self.target_position = position;
        } else {
            self.origin_position = position;
            self.target_position = position;
            self.progress = self.smoothing_window;
        }
    }

    /// Request a look-at goal (same semantics as [`Self::set_position`])
    pub fn set_look_at(&mut self, look_at: Vec3, smooth: bool) {
        if smooth {
            self.begin_transition();
            self.target_look_at = look_at;
        } else {
            self.origin_look_at = look_at;
            self.target_look_at = look_at;
            self.progress = self.smoothing_window;
        }
    }

    /// Distance between the position and look-at goals
    pub fn zoom(&self) -> f32 {
        self.relative_position().norm()
    }

    /// Rescale the camera-to-look-at distance (floored at a minimum length)
    pub fn set_zoom(&mut self, zoom: f32) {
        let zoom = zoom.max(MIN_ZOOM);
        let relative = self.relative_position();
        let direction = if relative.norm() > DEGENERATE {
            relative.normalize()
        } else {
            Vec3::x()
        };
        self.set_position(self.target_look_at + direction * zoom, true);
    }

    /// Orbit about the up axis by `angle` radians
    pub fn rotate_horizontal(&mut self, angle: f32, smooth: bool) {
        let relative = rotate_about_axis(self.relative_position(), &Vec3::z_axis(), angle);
        self.set_position(self.target_look_at + relative, smooth);
    }

    /// Orbit about the horizontal axis orthogonal to the view by `angle` radians
    pub fn rotate_vertical(&mut self, angle: f32, smooth: bool) {
        let relative = self.relative_position();
        let axis = Vec3::new(-relative.y, relative.x, 0.0);
        if axis.norm() <= DEGENERATE {
            // Looking straight along the up axis; no horizontal axis to
            // rotate about.
            return;
        }
        let axis = Unit::new_normalize(axis);
        let relative = rotate_about_axis(relative, &axis, angle);
        self.set_position(self.target_look_at + relative, smooth);
    }

    /// Pan sideways; position and look-at move together so framing is kept
    pub fn move_horizontal(&mut self, distance: f32, smooth: bool) {
        let relative = self.relative_position();
        let side = Vec3::new(-relative.y, relative.x, 0.0);
        if side.norm() <= DEGENERATE {
            return;
        }
        let movement = side.normalize() * distance;
        self.set_position(self.target_position + movement, smooth);
        self.set_look_at(self.target_look_at + movement, smooth);
    }

    /// Pan along the up axis; position and look-at move together
    pub fn move_vertical(&mut self, distance: f32, smooth: bool) {
        let movement = Vec3::z() * distance;
        self.set_position(self.target_position + movement, smooth);
        self.set_look_at(self.target_look_at + movement, smooth);
    }

    /// Relative vector from the look-at goal to the position goal
    fn relative_position(&self) -> Vec3 {
        self.target_position - self.target_look_at
    }

    /// Restart the transition from the current interpolated state.
    ///
    /// Both origins are recaptured: the progress counter is shared between
    /// the position and look-at axes, so leaving either origin stale would
    /// make that axis jump when progress resets.
    fn begin_transition(&mut self) {
        let position = self.position();
        let look_at = self.look_at();
        self.origin_position = position;
        self.origin_look_at = look_at;
        self.progress = 0;
    }

    fn interpolate(&self, origin: Vec3, target: Vec3) -> Vec3 {
        if self.is_settled() {
            target
        } else {
            origin.lerp(&target, self.progress as f32 / self.smoothing_window as f32)
        }
    }
}
