//! Math utilities and types
//!
//! Provides fundamental math types for the viewer. The mirrored scene uses a
//! Z-up right-handed world (the up axis is +Z).

pub use nalgebra::{Unit, Vector3};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4x4 matrix type
pub type Mat4 = nalgebra::Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }

    /// Linear interpolation
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }
}

/// Rotate a vector about an axis by the given angle in radians
pub fn rotate_about_axis(v: Vec3, axis: &Unit<Vec3>, angle: f32) -> Vec3 {
    nalgebra::Rotation3::from_axis_angle(axis, angle) * v
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rotate_quarter_turn_about_z() {
        let v = Vec3::new(1.0, 0.0, 0.0);
        let rotated = rotate_about_axis(v, &Vec3::z_axis(), constants::PI / 2.0);
        assert_relative_eq!(rotated.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(rotated.y, 1.0, epsilon = 1e-6);
        assert_relative_eq!(rotated.z, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn lerp_endpoints() {
        assert_relative_eq!(utils::lerp(2.0, 10.0, 0.0), 2.0);
        assert_relative_eq!(utils::lerp(2.0, 10.0, 1.0), 10.0);
        assert_relative_eq!(utils::lerp(2.0, 10.0, 0.5), 6.0);
    }
}
