//! Camera-relative directional light
//!
//! The key light trails the camera from the side so the scene stays lit
//! however the viewpoint moves. It is recomputed once per tick from the
//! post-step camera state, between the camera advance and the render pass.

use crate::foundation::math::Vec3;

/// Directional light derived from the camera
#[derive(Debug, Clone)]
pub struct DirectionalLight {
    /// Light color as a packed RGB integer
    pub color: u32,
    /// Light intensity
    pub intensity: f32,
    /// World-space light position
    pub position: Vec3,
    /// Normalized direction the light points in
    pub direction: Vec3,
}

impl DirectionalLight {
    /// Create a light with the given color and intensity
    pub fn new(color: u32, intensity: f32) -> Self {
        Self {
            color,
            intensity,
            position: Vec3::zeros(),
            direction: -Vec3::z(),
        }
    }

    /// Reposition relative to the camera and aim at its look-at point
    pub fn follow(&mut self, camera_position: Vec3, camera_look_at: Vec3) {
        let relative = camera_position - camera_look_at;
        // Offset sideways from the camera, perpendicular to the view in the
        // horizontal plane.
        self.position = camera_position + Vec3::new(relative.y, -relative.x, 0.0);

        let aim = camera_look_at - self.position;
        if aim.norm() > f32::EPSILON {
            self.direction = aim.normalize();
        }
    }
}
