//! Viewer configuration
//!
//! Everything tunable at startup lives here; the app takes one [`ViewerConfig`]
//! and hands the relevant pieces to the scene and the render engine.

use std::path::PathBuf;

use cgmath::Vector3;

use crate::gfx::{
    camera::CameraSettings, picking::DEFAULT_NDC_DEPTH, rendering::shadow::ShadowSettings,
    resources::LightingConfig,
};

/// Environment variable that turns on per-frame shadow pass logging
pub const SHADOW_DEBUG_ENV: &str = "SPECTRA_SHADOW_DEBUG";

#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub title: String,
    pub window_size: (u32, u32),
    pub clear_color: wgpu::Color,
    pub camera_position: Vector3<f32>,
    pub camera: CameraSettings,
    pub shadow: ShadowSettings,
    pub lighting: LightingConfig,
    /// Depth hint used when placing objects by clicking, in wgpu NDC `[0, 1]`
    pub ndc_depth: f32,
    /// Uniform scale of the cubes drawn at point light positions
    pub light_marker_scale: f32,
    /// Adds a ground plane that receives shadows
    pub ground_plane: bool,
    pub model_path: Option<PathBuf>,
    pub shadow_debug: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: "Spectra".to_string(),
            window_size: (1600, 1200),
            clear_color: wgpu::Color {
                r: 0.1,
                g: 0.1,
                b: 0.1,
                a: 1.0,
            },
            camera_position: Vector3::new(0.0, 1.0, 3.0),
            camera: CameraSettings::default(),
            shadow: ShadowSettings::default(),
            lighting: LightingConfig::default(),
            ndc_depth: DEFAULT_NDC_DEPTH,
            light_marker_scale: 0.2,
            ground_plane: true,
            model_path: None,
            shadow_debug: std::env::var_os(SHADOW_DEBUG_ENV).is_some(),
        }
    }
}

impl ViewerConfig {
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = (width.max(1), height.max(1));
        self
    }

    pub fn with_camera(mut self, position: Vector3<f32>, settings: CameraSettings) -> Self {
        self.camera_position = position;
        self.camera = settings;
        self
    }

    pub fn with_shadow(mut self, shadow: ShadowSettings) -> Self {
        self.shadow = shadow;
        self
    }

    pub fn with_lighting(mut self, lighting: LightingConfig) -> Self {
        self.lighting = lighting;
        self
    }

    pub fn with_ndc_depth(mut self, ndc_depth: f32) -> Self {
        self.ndc_depth = ndc_depth.clamp(0.0, 1.0);
        self
    }

    pub fn with_ground_plane(mut self, enabled: bool) -> Self {
        self.ground_plane = enabled;
        self
    }

    pub fn with_model(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = Some(path.into());
        self
    }

    pub fn with_shadow_debug(mut self, enabled: bool) -> Self {
        self.shadow_debug = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        let config = ViewerConfig::default()
            .with_title("demo")
            .with_window_size(0, 720)
            .with_ndc_depth(1.5)
            .with_model("assets/backpack.obj")
            .with_ground_plane(false);

        assert_eq!(config.title, "demo");
        assert_eq!(config.window_size, (1, 720));
        assert_eq!(config.ndc_depth, 1.0);
        assert_eq!(config.model_path, Some(PathBuf::from("assets/backpack.obj")));
        assert!(!config.ground_plane);
    }
}
