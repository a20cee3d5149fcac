//! GPU resource management
//!
//! Handles textures, uniform blocks, and bind groups for rendering.

pub mod global_bindings;
pub mod instance_bindings;
pub mod material;
pub mod texture_resource;
pub mod uniform_schema;

pub use global_bindings::{GlobalBindings, GlobalUBO, LightingConfig, SceneUniforms};
pub use instance_bindings::{InstanceBindings, InstanceSlot, InstanceUniform};
pub use material::{MaterialBindings, MeshMaterial};
pub use texture_resource::{ImageData, TextureResource};
