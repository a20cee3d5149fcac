//! # Screen Unprojection
//!
//! Maps a 2D click back into world space so spawned objects and lights land in
//! front of the camera.
//!
//! ## How it works
//!
//! 1. **Screen to NDC**: `x' = 2x/w - 1`, `y' = 1 - 2y/h` (screen origin is top-left)
//! 2. **Depth hint**: the NDC point gets a fixed depth instead of a depth-buffer sample
//! 3. **Inverse transform**: apply `inverse(projection * view)` and divide by `w`
//!
//! Because the depth is a constant, every click lands on the same virtual
//! surface in view space rather than on the geometry under the cursor.
//!
//! ## Usage
//!
//! ```no_run
//! use spectra::gfx::{camera::{CameraSettings, FlyCamera}, picking::Unprojector};
//! use cgmath::Vector3;
//!
//! let mut camera = FlyCamera::new(Vector3::new(0.0, 0.0, 2.0), CameraSettings::default());
//! camera.set_viewport_dimensions(800, 600);
//! let unprojector = Unprojector::new(0.9);
//! if let Some(point) = unprojector.unproject_from_camera((400.0, 300.0), &camera) {
//!     println!("click lands at {:?}", point);
//! }
//! ```

use cgmath::{Matrix4, SquareMatrix, Vector3, Vector4};

use crate::gfx::camera::FlyCamera;

/// Default placement depth in wgpu NDC (`0` = near plane, `1` = far plane)
pub const DEFAULT_NDC_DEPTH: f32 = 0.98;

/// Maps a screen position and NDC depth to a world-space point
///
/// Returns `None` when the viewport has no area, `projection * view` is not
/// invertible, or the homogeneous `w` collapses to zero.
pub fn unproject(
    screen: (f32, f32),
    viewport: (u32, u32),
    view: Matrix4<f32>,
    projection: Matrix4<f32>,
    ndc_depth: f32,
) -> Option<Vector3<f32>> {
    let (width, height) = viewport;
    if width == 0 || height == 0 {
        return None;
    }

    let ndc_x = (2.0 * screen.0) / width as f32 - 1.0;
    let ndc_y = 1.0 - (2.0 * screen.1) / height as f32;

    let inv_view_proj = (projection * view).invert()?;
    let world = inv_view_proj * Vector4::new(ndc_x, ndc_y, ndc_depth, 1.0);

    if world.w.abs() <= f32::EPSILON {
        return None;
    }

    let point = world.truncate() / world.w;
    if point.x.is_finite() && point.y.is_finite() && point.z.is_finite() {
        Some(point)
    } else {
        None
    }
}

/// Click-placement helper holding the tunable depth hint
#[derive(Debug, Clone, Copy)]
pub struct Unprojector {
    ndc_depth: f32,
}

impl Unprojector {
    pub fn new(ndc_depth: f32) -> Self {
        Self {
            ndc_depth: ndc_depth.clamp(0.0, 1.0),
        }
    }

    pub fn ndc_depth(&self) -> f32 {
        self.ndc_depth
    }

    pub fn set_ndc_depth(&mut self, ndc_depth: f32) {
        self.ndc_depth = ndc_depth.clamp(0.0, 1.0);
    }

    /// Unprojects using the camera's current matrices and viewport
    pub fn unproject_from_camera(
        &self,
        screen: (f32, f32),
        camera: &FlyCamera,
    ) -> Option<Vector3<f32>> {
        unproject(
            screen,
            camera.viewport_dimensions(),
            camera.view_matrix(),
            camera.projection_matrix(),
            self.ndc_depth,
        )
    }
}

impl Default for Unprojector {
    fn default() -> Self {
        Self::new(DEFAULT_NDC_DEPTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::camera::CameraSettings;
    use cgmath::InnerSpace;

    fn camera_at(position: Vector3<f32>) -> FlyCamera {
        let settings = CameraSettings::default().with_yaw_pitch(-90.0, 0.0);
        let mut camera = FlyCamera::new(position, settings);
        camera.set_viewport_dimensions(800, 600);
        camera
    }

    #[test]
    fn test_center_click_lands_in_front_of_camera() {
        let camera = camera_at(Vector3::new(0.0, 0.0, 2.0));
        let point = Unprojector::new(0.9)
            .unproject_from_camera((400.0, 300.0), &camera)
            .unwrap();

        assert!(point.x.abs() < 1e-4);
        assert!(point.y.abs() < 1e-4);

        let view_depth = camera.position.z - point.z;
        assert!(view_depth >= camera.near_plane);
        assert!(view_depth <= camera.far_plane);
    }

    #[test]
    fn test_project_then_unproject_round_trip() {
        let mut camera = camera_at(Vector3::new(1.0, 2.0, 8.0));
        camera.process_mouse_movement(40.0, -60.0, true);

        let world = camera.position + camera.front() * 6.0 + camera.right() * 0.75;
        let (x, y, depth) = camera.project(world).unwrap();
        let back = unproject(
            (x, y),
            camera.viewport_dimensions(),
            camera.view_matrix(),
            camera.projection_matrix(),
            depth,
        )
        .unwrap();

        assert!((back - world).magnitude() < 1e-2);
    }

    #[test]
    fn test_zero_viewport_returns_none() {
        let camera = camera_at(Vector3::new(0.0, 0.0, 2.0));
        let result = unproject(
            (0.0, 0.0),
            (0, 600),
            camera.view_matrix(),
            camera.projection_matrix(),
            0.5,
        );
        assert!(result.is_none());
    }

    #[test]
    fn test_singular_matrix_returns_none() {
        let result = unproject(
            (10.0, 10.0),
            (100, 100),
            Matrix4::identity(),
            Matrix4::from_nonuniform_scale(1.0, 1.0, 0.0),
            0.5,
        );
        assert!(result.is_none());
    }

    #[test]
    fn test_depth_hint_is_clamped() {
        assert_eq!(Unprojector::new(3.0).ndc_depth(), 1.0);
        assert_eq!(Unprojector::new(-1.0).ndc_depth(), 0.0);
    }
}
