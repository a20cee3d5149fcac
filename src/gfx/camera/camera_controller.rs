use std::collections::HashSet;

use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, KeyEvent, MouseScrollDelta},
    keyboard::{KeyCode, PhysicalKey},
};

use super::fly_camera::{CameraMovement, FlyCamera};

/// Pixel-delta scroll events are divided by this to match line deltas
const PIXELS_PER_SCROLL_LINE: f32 = 40.0;

/// Translates raw window input into [`FlyCamera`] calls
///
/// Movement keys are tracked as held state and applied once per frame so the
/// distance travelled depends on frame time rather than key repeat rate.
#[derive(Debug, Default)]
pub struct CameraController {
    held: HashSet<CameraMovement>,
    mouse_look: bool,
}

impl CameraController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process_keyed_event(&mut self, event: &KeyEvent) {
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        let Some(movement) = movement_for_key(code) else {
            return;
        };

        match event.state {
            ElementState::Pressed => {
                self.held.insert(movement);
            }
            ElementState::Released => {
                self.held.remove(&movement);
            }
        }
    }

    pub fn set_mouse_look(&mut self, enabled: bool) {
        self.mouse_look = enabled;
    }

    pub fn is_mouse_look(&self) -> bool {
        self.mouse_look
    }

    /// Raw device deltas; screen y grows downward so it is inverted for pitch
    pub fn process_mouse_motion(&mut self, delta: (f64, f64), camera: &mut FlyCamera) {
        if !self.mouse_look {
            return;
        }
        camera.process_mouse_movement(delta.0 as f32, -delta.1 as f32, true);
    }

    pub fn process_scroll(&mut self, delta: &MouseScrollDelta, camera: &mut FlyCamera) {
        let lines = match delta {
            MouseScrollDelta::LineDelta(_, y) => *y,
            MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => {
                *y as f32 / PIXELS_PER_SCROLL_LINE
            }
        };
        camera.process_mouse_scroll(lines);
    }

    pub fn update_camera(&self, camera: &mut FlyCamera, delta_time: f32) {
        for movement in &self.held {
            camera.process_keyboard(*movement, delta_time);
        }
    }

    /// Drops all held keys, used when the window loses focus
    pub fn release_all(&mut self) {
        self.held.clear();
        self.mouse_look = false;
    }

    pub fn is_moving(&self) -> bool {
        !self.held.is_empty()
    }
}

fn movement_for_key(code: KeyCode) -> Option<CameraMovement> {
    match code {
        KeyCode::KeyW | KeyCode::ArrowUp => Some(CameraMovement::Forward),
        KeyCode::KeyS | KeyCode::ArrowDown => Some(CameraMovement::Backward),
        KeyCode::KeyA | KeyCode::ArrowLeft => Some(CameraMovement::Left),
        KeyCode::KeyD | KeyCode::ArrowRight => Some(CameraMovement::Right),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::camera::fly_camera::CameraSettings;
    use cgmath::{InnerSpace, Vector3, Zero};

    #[test]
    fn test_key_mapping() {
        assert_eq!(movement_for_key(KeyCode::KeyW), Some(CameraMovement::Forward));
        assert_eq!(movement_for_key(KeyCode::ArrowLeft), Some(CameraMovement::Left));
        assert_eq!(movement_for_key(KeyCode::KeyF), None);
    }

    #[test]
    fn test_motion_ignored_without_mouse_look() {
        let mut camera = FlyCamera::new(Vector3::zero(), CameraSettings::default());
        let mut controller = CameraController::new();
        let yaw = camera.yaw();

        controller.process_mouse_motion((50.0, 0.0), &mut camera);
        assert_eq!(camera.yaw(), yaw);

        controller.set_mouse_look(true);
        controller.process_mouse_motion((50.0, 0.0), &mut camera);
        assert!((camera.yaw() - (yaw + 5.0)).abs() < 1e-4);
    }

    #[test]
    fn test_scroll_zooms_in() {
        let mut camera = FlyCamera::new(Vector3::zero(), CameraSettings::default());
        let mut controller = CameraController::new();
        controller.process_scroll(&MouseScrollDelta::LineDelta(0.0, 5.0), &mut camera);
        assert_eq!(camera.zoom(), 40.0);
    }

    #[test]
    fn test_no_held_keys_means_no_motion() {
        let mut camera = FlyCamera::new(Vector3::zero(), CameraSettings::default());
        let controller = CameraController::new();
        controller.update_camera(&mut camera, 1.0);
        assert!(camera.position.magnitude() < 1e-6);
        assert!(!controller.is_moving());
    }
}
