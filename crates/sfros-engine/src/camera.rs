//! Free-camera helper exposed by the graphical engine.

use nalgebra::Vector3;

/// Interactive camera ("trackball") currently driving the main view.
pub trait CameraHelper {
    /// World-space eye position.
    fn eye_position(&self) -> Vector3<f32>;

    /// World-space unit vector the camera is looking along.
    fn looking_direction(&self) -> Vector3<f32>;
}
