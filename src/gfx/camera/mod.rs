pub mod camera_controller;
pub mod camera_utils;
pub mod fly_camera;

pub use camera_controller::CameraController;
pub use camera_utils::{Camera, CameraManager};
pub use fly_camera::{CameraMovement, CameraSettings, FlyCamera};
