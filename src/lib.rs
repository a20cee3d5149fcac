// src/lib.rs
//! Spectra 3D Viewer
//!
//! An interactive scene viewer built on wgpu and winit: a first-person fly
//! camera, click-to-spawn cubes and point lights, and shadow-mapped lighting.

pub mod app;
pub mod config;
pub mod error;
pub mod gfx;
pub mod ui;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::SpectraApp;
pub use config::ViewerConfig;
pub use error::AppError;

/// Builds and runs a viewer with the given configuration
pub fn run(config: ViewerConfig) -> Result<(), AppError> {
    SpectraApp::with_config(config)?.run()
}
