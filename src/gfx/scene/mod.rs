//! # Scene Management Module
//!
//! Scene state of the viewer: loaded models, the bounded pools of spawned
//! cubes and point lights, and the vertex format shared by every mesh.
//!
//! ## Key Components
//!
//! - [`Scene`] - Owns the camera, models and pools; the only writer of scene state
//! - [`Model`] / [`Mesh`] - Geometry with cached, non-compounding bounds
//! - [`FifoPool`] - Fixed-capacity insertion-ordered pool with oldest eviction
//! - [`Vertex3D`] - Position, normal, color and texture coordinates
//!
//! ## Usage
//!
//! ```no_run
//! use spectra::{config::ViewerConfig, gfx::scene::Scene};
//!
//! let mut scene = Scene::from_config(&ViewerConfig::default());
//! scene.spawn_object_at((800.0, 600.0));
//! scene.update(1.0 / 60.0);
//! ```

pub mod object;
pub mod pool;
pub mod scene;
pub mod vertex;

// Re-export main types
pub use object::{DrawModel, Mesh, Model};
pub use pool::{
    FifoPool, LightPool, ObjectPool, PointLight, SpawnedObject, MAX_OBJECTS, MAX_POINT_LIGHTS,
};
pub use scene::{Scene, SceneStatistics};
pub use vertex::Vertex3D;
