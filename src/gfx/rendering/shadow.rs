//! Shadow map settings and the light-space transform

use cgmath::{ortho, InnerSpace, Matrix4, Point3, Vector3};

use crate::gfx::camera::fly_camera::OPENGL_TO_WGPU_MATRIX;

/// Fixed directional shadow caster
///
/// The shadow camera sits at `light_position` and looks at the origin through
/// an orthographic box of half-size `extent`.
#[derive(Debug, Clone, Copy)]
pub struct ShadowSettings {
    /// Side length of the square depth target, independent of the window
    pub resolution: u32,
    pub light_position: Vector3<f32>,
    pub extent: f32,
    pub near: f32,
    pub far: f32,
    /// Rasterizer bias used by the depth-only pipeline
    pub depth_bias_constant: i32,
    pub depth_bias_slope: f32,
    /// Bias subtracted in the lit shader before the comparison
    pub compare_bias: f32,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            resolution: 1024,
            light_position: Vector3::new(-10.0, 10.0, 0.0),
            extent: 20.0,
            near: 1.0,
            far: 40.0,
            depth_bias_constant: 2,
            depth_bias_slope: 2.0,
            compare_bias: 0.002,
        }
    }
}

impl ShadowSettings {
    pub fn with_resolution(mut self, resolution: u32) -> Self {
        self.resolution = resolution.max(1);
        self
    }

    pub fn with_light_position(mut self, position: Vector3<f32>) -> Self {
        self.light_position = position;
        self
    }

    pub fn with_extent(mut self, extent: f32, near: f32, far: f32) -> Self {
        self.extent = extent;
        self.near = near;
        self.far = far;
        self
    }

    /// Direction the shadow camera looks, from the light toward the origin
    pub fn light_direction(&self) -> Vector3<f32> {
        (-self.light_position).normalize()
    }

    /// `projection * view` of the shadow camera in wgpu clip space
    pub fn light_space_matrix(&self) -> Matrix4<f32> {
        let direction = self.light_direction();
        // look_at degenerates when the view direction is parallel to up
        let up = if direction.cross(Vector3::unit_y()).magnitude2() < 1e-6 {
            Vector3::unit_z()
        } else {
            Vector3::unit_y()
        };

        let view = Matrix4::look_at_rh(
            Point3::new(
                self.light_position.x,
                self.light_position.y,
                self.light_position.z,
            ),
            Point3::new(0.0, 0.0, 0.0),
            up,
        );
        let e = self.extent;
        let projection = ortho(-e, e, -e, e, self.near, self.far);

        OPENGL_TO_WGPU_MATRIX * projection * view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_light_ndc(m: Matrix4<f32>, p: Vector3<f32>) -> Vector3<f32> {
        let clip = m * p.extend(1.0);
        clip.truncate() / clip.w
    }

    #[test]
    fn test_origin_maps_to_shadow_map_center() {
        let settings = ShadowSettings::default();
        let ndc = to_light_ndc(settings.light_space_matrix(), Vector3::new(0.0, 0.0, 0.0));

        assert!(ndc.x.abs() < 1e-5);
        assert!(ndc.y.abs() < 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn test_closer_points_have_smaller_depth() {
        let settings = ShadowSettings::default();
        let m = settings.light_space_matrix();
        let toward_light = settings.light_position * 0.25;

        let near = to_light_ndc(m, toward_light);
        let origin = to_light_ndc(m, Vector3::new(0.0, 0.0, 0.0));
        assert!(near.z < origin.z);
    }

    #[test]
    fn test_default_direction_matches_directional_light() {
        let dir = ShadowSettings::default().light_direction();
        let expected = Vector3::new(1.0, -1.0, 0.0).normalize();
        assert!((dir - expected).magnitude() < 1e-6);
    }

    #[test]
    fn test_straight_down_light_stays_finite() {
        let settings = ShadowSettings::default().with_light_position(Vector3::new(0.0, 15.0, 0.0));
        let m = settings.light_space_matrix();
        let values: &[f32; 16] = m.as_ref();
        assert!(values.iter().all(|v| v.is_finite()));
    }
}
