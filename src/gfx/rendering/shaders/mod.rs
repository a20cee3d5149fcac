//! Bundled WGSL sources

pub const SCENE: &str = include_str!("scene.wgsl");
pub const LIGHT_CUBE: &str = include_str!("light_cube.wgsl");
pub const SHADOW_DEPTH: &str = include_str!("shadow_depth.wgsl");
