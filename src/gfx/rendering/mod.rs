//! Core rendering functionality
//!
//! Handles render pipelines, the shadow caster, bundled shaders, and frame rendering.

pub mod pipeline_manager;
pub mod render_engine;
pub mod shaders;
pub mod shadow;

// Re-export main types
pub use pipeline_manager::{PipelineConfig, PipelineManager, PipelineStats};
pub use render_engine::RenderEngine;
pub use shadow::ShadowSettings;
