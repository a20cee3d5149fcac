//! # Graphics Module
//!
//! All graphics functionality of the viewer: the fly camera, bounding boxes,
//! click unprojection, scene state, GPU resources and the render engine.
//!
//! ## Architecture Overview
//!
//! - **Camera System** ([`camera`]) - First-person camera with keyboard, mouse look and zoom
//! - **Bounds** ([`bounds`]) - Axis-aligned boxes with non-compounding scale
//! - **Picking** ([`picking`]) - Screen-to-world unprojection for click placement
//! - **Scene Management** ([`scene`]) - Models plus bounded pools of cubes and lights
//! - **Rendering Pipeline** ([`rendering`]) - Shadow depth pass followed by the lit pass
//! - **Resource Management** ([`resources`]) - Uniform blocks, textures and bind groups
//!
//! ## Usage
//!
//! ```no_run
//! use spectra::{config::ViewerConfig, gfx::scene::Scene};
//!
//! // The render engine is created by SpectraApp once a window exists
//! let scene = Scene::from_config(&ViewerConfig::default());
//! println!("{:?}", scene.scene_bounds());
//! ```

pub mod bounds;
pub mod camera;
pub mod geometry;
pub mod picking;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use bounds::{BoundingBox, ScaledBounds};
pub use camera::FlyCamera;
pub use rendering::render_engine::RenderEngine;
