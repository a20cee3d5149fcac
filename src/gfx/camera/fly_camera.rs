use super::camera_utils::Camera;
use cgmath::*;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

pub const MIN_PITCH: f32 = -89.0;
pub const MAX_PITCH: f32 = 89.0;
pub const MIN_ZOOM: f32 = 1.0;
pub const MAX_ZOOM: f32 = 45.0;

/// Movement directions understood by [`FlyCamera::process_keyboard`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
}

/// Tunable camera parameters
#[derive(Debug, Clone, Copy)]
pub struct CameraSettings {
    /// Yaw in degrees; -90 looks down -Z
    pub yaw: f32,
    /// Pitch in degrees
    pub pitch: f32,
    pub movement_speed: f32,
    pub mouse_sensitivity: f32,
    /// Vertical field of view in degrees
    pub zoom: f32,
    pub near_plane: f32,
    pub far_plane: f32,
    /// Rate used by [`FlyCamera::follow_target`]
    pub follow_lerp_rate: f32,
    /// Follow position is `target - follow_offset`
    pub follow_offset: Vector3<f32>,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            yaw: -90.0,
            pitch: -15.0,
            movement_speed: 7.5,
            mouse_sensitivity: 0.1,
            zoom: 45.0,
            near_plane: 0.1,
            far_plane: 100.0,
            follow_lerp_rate: 7.5,
            follow_offset: Vector3::new(0.0, -2.0, -6.0),
        }
    }
}

impl CameraSettings {
    pub fn with_yaw_pitch(mut self, yaw: f32, pitch: f32) -> Self {
        self.yaw = yaw;
        self.pitch = pitch;
        self
    }

    pub fn with_movement_speed(mut self, speed: f32) -> Self {
        self.movement_speed = speed;
        self
    }

    pub fn with_clip_planes(mut self, near: f32, far: f32) -> Self {
        self.near_plane = near;
        self.far_plane = far;
        self
    }
}

/// First-person camera driven by yaw/pitch Euler angles
///
/// `front`, `right` and `up` are always an orthonormal basis; they are
/// recomputed from `yaw`/`pitch` whenever the orientation changes.
#[derive(Debug, Clone, Copy)]
pub struct FlyCamera {
    pub position: Vector3<f32>,
    front: Vector3<f32>,
    up: Vector3<f32>,
    right: Vector3<f32>,
    world_up: Vector3<f32>,
    yaw: f32,
    pitch: f32,
    pub movement_speed: f32,
    pub mouse_sensitivity: f32,
    zoom: f32,
    pub near_plane: f32,
    pub far_plane: f32,
    viewport_width: u32,
    viewport_height: u32,
    follow_lerp_rate: f32,
    follow_offset: Vector3<f32>,
}

impl Camera for FlyCamera {
    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }
}

impl FlyCamera {
    pub fn new(position: Vector3<f32>, settings: CameraSettings) -> Self {
        let mut camera = Self {
            position,
            front: -Vector3::unit_z(),
            up: Vector3::unit_y(),
            right: Vector3::unit_x(),
            world_up: Vector3::unit_y(),
            yaw: settings.yaw,
            pitch: settings.pitch.clamp(MIN_PITCH, MAX_PITCH),
            movement_speed: settings.movement_speed,
            mouse_sensitivity: settings.mouse_sensitivity,
            zoom: settings.zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            near_plane: settings.near_plane,
            far_plane: settings.far_plane,
            viewport_width: 1,
            viewport_height: 1,
            follow_lerp_rate: settings.follow_lerp_rate,
            follow_offset: settings.follow_offset,
        };
        camera.update_camera_vectors();
        camera
    }

    pub fn process_keyboard(&mut self, direction: CameraMovement, delta_time: f32) {
        let velocity = self.movement_speed * delta_time;
        match direction {
            CameraMovement::Forward => self.position += self.front * velocity,
            CameraMovement::Backward => self.position -= self.front * velocity,
            CameraMovement::Left => self.position -= self.right * velocity,
            CameraMovement::Right => self.position += self.right * velocity,
        }
    }

    pub fn process_mouse_movement(&mut self, x_offset: f32, y_offset: f32, constrain_pitch: bool) {
        self.yaw += x_offset * self.mouse_sensitivity;
        self.pitch += y_offset * self.mouse_sensitivity;

        // Keep the view from flipping over the poles
        if constrain_pitch {
            self.pitch = self.pitch.clamp(MIN_PITCH, MAX_PITCH);
        }

        self.update_camera_vectors();
    }

    pub fn process_mouse_scroll(&mut self, y_offset: f32) {
        self.zoom = (self.zoom - y_offset).clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Sets the orientation directly, in degrees
    pub fn set_orientation(&mut self, yaw: f32, pitch: f32) {
        self.yaw = yaw;
        self.pitch = pitch.clamp(MIN_PITCH, MAX_PITCH);
        self.update_camera_vectors();
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        let eye = Point3::from_vec(self.position);
        let target = Point3::from_vec(self.position + self.front);
        Matrix4::look_at_rh(eye, target, self.up)
    }

    /// Perspective projection in wgpu clip space (depth in `[0, 1]`)
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX
            * perspective(Deg(self.zoom), self.aspect(), self.near_plane, self.far_plane)
    }

    /// Aspect ratio with both dimensions clamped to at least one pixel
    pub fn aspect(&self) -> f32 {
        self.viewport_width.max(1) as f32 / self.viewport_height.max(1) as f32
    }

    /// Must be called on every resize; nothing else updates the aspect ratio
    pub fn set_viewport_dimensions(&mut self, width: u32, height: u32) {
        self.viewport_width = width;
        self.viewport_height = height;
    }

    pub fn viewport_dimensions(&self) -> (u32, u32) {
        (self.viewport_width, self.viewport_height)
    }

    /// Damped pursuit of a point at a fixed offset from `target`
    pub fn follow_target(&mut self, target: Vector3<f32>, delta_time: f32) {
        let desired = target - self.follow_offset;
        let t = (self.follow_lerp_rate * delta_time).clamp(0.0, 1.0);
        self.position = self.position.lerp(desired, t);
    }

    /// Projects a world point to screen pixels plus NDC depth
    ///
    /// Returns `None` for points behind the camera.
    pub fn project(&self, world: Vector3<f32>) -> Option<(f32, f32, f32)> {
        let clip = self.build_view_projection_matrix() * world.extend(1.0);
        if clip.w <= f32::EPSILON {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        let width = self.viewport_width.max(1) as f32;
        let height = self.viewport_height.max(1) as f32;

        Some((
            (ndc.x + 1.0) * 0.5 * width,
            (1.0 - ndc.y) * 0.5 * height,
            ndc.z,
        ))
    }

    pub fn front(&self) -> Vector3<f32> {
        self.front
    }

    pub fn right(&self) -> Vector3<f32> {
        self.right
    }

    pub fn up(&self) -> Vector3<f32> {
        self.up
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    // Roll is never changed; only yaw and pitch drive the basis
    fn update_camera_vectors(&mut self) {
        let (yaw, pitch) = (Deg(self.yaw), Deg(self.pitch));
        let front = Vector3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        );
        self.front = front.normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn camera_at_origin() -> FlyCamera {
        let mut camera = FlyCamera::new(Vector3::zero(), CameraSettings::default().with_yaw_pitch(-90.0, 0.0));
        camera.set_viewport_dimensions(1600, 1200);
        camera
    }

    #[test]
    fn test_default_orientation_looks_down_negative_z() {
        let camera = camera_at_origin();
        assert!((camera.front() - Vector3::new(0.0, 0.0, -1.0)).magnitude() < EPS);
        assert!((camera.right() - Vector3::new(1.0, 0.0, 0.0)).magnitude() < EPS);
        assert!((camera.up() - Vector3::new(0.0, 1.0, 0.0)).magnitude() < EPS);
    }

    #[test]
    fn test_basis_stays_orthonormal() {
        let mut camera = camera_at_origin();
        for (dx, dy) in [(35.0, 12.0), (-400.0, 80.0), (1234.0, -900.0)] {
            camera.process_mouse_movement(dx, dy, true);
            let (f, r, u) = (camera.front(), camera.right(), camera.up());
            assert!((f.magnitude() - 1.0).abs() < EPS);
            assert!((r.magnitude() - 1.0).abs() < EPS);
            assert!((u.magnitude() - 1.0).abs() < EPS);
            assert!(f.dot(r).abs() < EPS);
            assert!(f.dot(u).abs() < EPS);
            assert!(r.dot(u).abs() < EPS);
        }
    }

    #[test]
    fn test_pitch_clamps_at_89() {
        let mut camera = camera_at_origin();
        for _ in 0..50 {
            camera.process_mouse_movement(0.0, 1000.0, true);
        }
        assert_eq!(camera.pitch(), 89.0);

        for _ in 0..50 {
            camera.process_mouse_movement(0.0, -1000.0, true);
        }
        assert_eq!(camera.pitch(), -89.0);
    }

    #[test]
    fn test_unconstrained_pitch_passes_limit() {
        let mut camera = camera_at_origin();
        camera.process_mouse_movement(0.0, 1000.0, false);
        assert!(camera.pitch() > 89.0);
    }

    #[test]
    fn test_zoom_stays_in_range() {
        let mut camera = camera_at_origin();
        for dy in [1.0e6, -3.0, 0.5, -1.0e6, 12.0, -44.0] {
            camera.process_mouse_scroll(dy);
            assert!(camera.zoom() >= 1.0 && camera.zoom() <= 45.0);
        }
        camera.process_mouse_scroll(100.0);
        assert_eq!(camera.zoom(), 1.0);
        camera.process_mouse_scroll(-100.0);
        assert_eq!(camera.zoom(), 45.0);
    }

    #[test]
    fn test_keyboard_movement_scales_with_delta_time() {
        let mut camera = camera_at_origin();
        camera.process_keyboard(CameraMovement::Forward, 0.5);
        assert!((camera.position - Vector3::new(0.0, 0.0, -3.75)).magnitude() < EPS);

        camera.process_keyboard(CameraMovement::Right, 1.0);
        assert!((camera.position - Vector3::new(7.5, 0.0, -3.75)).magnitude() < EPS);

        camera.process_keyboard(CameraMovement::Left, 1.0);
        camera.process_keyboard(CameraMovement::Backward, 0.5);
        assert!(camera.position.magnitude() < EPS);
    }

    #[test]
    fn test_follow_never_overshoots() {
        let mut camera = camera_at_origin();
        let target = Vector3::new(10.0, 0.0, 0.0);
        let desired = Vector3::new(10.0, 2.0, 6.0);

        camera.follow_target(target, 0.01);
        let partial = camera.position;
        assert!(partial.magnitude() > 0.0);
        assert!((partial - desired).magnitude() < desired.magnitude());

        // A huge frame time clamps the blend factor to one
        camera.follow_target(target, 10.0);
        assert!((camera.position - desired).magnitude() < EPS);
    }

    #[test]
    fn test_zero_viewport_keeps_projection_finite() {
        let mut camera = camera_at_origin();
        camera.set_viewport_dimensions(0, 0);
        assert_eq!(camera.aspect(), 1.0);

        let proj = camera.projection_matrix();
        let values: &[f32; 16] = proj.as_ref();
        assert!(values.iter().all(|v| v.is_finite()));
        assert!(proj.invert().is_some());
    }

    #[test]
    fn test_project_center_of_view() {
        let mut camera = camera_at_origin();
        camera.position = Vector3::new(0.0, 0.0, 2.0);
        let (x, y, depth) = camera.project(Vector3::new(0.0, 0.0, -5.0)).unwrap();
        assert!((x - 800.0).abs() < 1e-2);
        assert!((y - 600.0).abs() < 1e-2);
        assert!(depth > 0.0 && depth < 1.0);

        assert!(camera.project(Vector3::new(0.0, 0.0, 10.0)).is_none());
    }
}
