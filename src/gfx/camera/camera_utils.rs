use cgmath::{Matrix4, Vector3};
use winit::event::{ElementState, KeyEvent, MouseScrollDelta};

use super::{
    camera_controller::CameraController,
    fly_camera::{CameraSettings, FlyCamera},
};

/// Owns the camera together with the controller that feeds it input
pub struct CameraManager {
    pub camera: FlyCamera,
    pub controller: CameraController,
}

impl CameraManager {
    pub fn new(camera: FlyCamera, controller: CameraController) -> Self {
        Self { camera, controller }
    }

    pub fn from_settings(position: Vector3<f32>, settings: CameraSettings) -> Self {
        Self::new(FlyCamera::new(position, settings), CameraController::new())
    }

    pub fn process_keyboard_event(&mut self, event: &KeyEvent) {
        self.controller.process_keyed_event(event);
    }

    pub fn process_mouse_button(&mut self, state: ElementState) {
        self.controller.set_mouse_look(state == ElementState::Pressed);
    }

    pub fn process_mouse_motion(&mut self, delta: (f64, f64)) {
        self.controller.process_mouse_motion(delta, &mut self.camera);
    }

    pub fn process_scroll(&mut self, delta: &MouseScrollDelta) {
        self.controller.process_scroll(delta, &mut self.camera);
    }

    /// Applies held movement keys for this frame
    pub fn update(&mut self, delta_time: f32) {
        self.controller.update_camera(&mut self.camera, delta_time);
    }
}

pub trait Camera: Sized {
    fn build_view_projection_matrix(&self) -> Matrix4<f32>;
}

pub fn convert_matrix4_to_array(matrix4: Matrix4<f32>) -> [[f32; 4]; 4] {
    matrix4.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, SquareMatrix};

    #[test]
    fn test_update_without_input_keeps_camera_still() {
        let mut manager =
            CameraManager::from_settings(Vector3::new(0.0, 1.0, 3.0), CameraSettings::default());
        let before = manager.camera.view_matrix();

        manager.update(0.5);

        assert_eq!(manager.camera.position, Vector3::new(0.0, 1.0, 3.0));
        assert_eq!(manager.camera.view_matrix(), before);
    }

    #[test]
    fn test_view_projection_comes_straight_from_camera() {
        let mut manager =
            CameraManager::from_settings(Vector3::new(2.0, 0.0, 0.0), CameraSettings::default());
        manager.camera.set_viewport_dimensions(800, 600);
        manager.update(0.016);

        let camera = &manager.camera;
        let expected = camera.projection_matrix() * camera.view_matrix();
        assert_eq!(camera.build_view_projection_matrix(), expected);
        assert!(expected.invert().is_some());
        assert!((camera.front().magnitude() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_matrix_conversion_is_column_major() {
        let m = Matrix4::from_translation(Vector3::new(1.0, 2.0, 3.0));
        let columns = convert_matrix4_to_array(m);
        assert_eq!(columns[3], [1.0, 2.0, 3.0, 1.0]);
    }
}
