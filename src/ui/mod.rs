//! # User Interface Module
//!
//! Dear ImGui overlay for the viewer.
//!
//! ## Key Components
//!
//! - [`UiManager`] - ImGui integration with winit and wgpu, input capture
//! - [`scene_inspector_panel`] - Camera, spawn pool, lighting and model inspector
//!
//! ## Input Handling
//!
//! Events are offered to the UI first. When ImGui wants the mouse or the
//! keyboard, the event does not reach the camera or the spawn handlers.

pub mod manager;
pub mod panel;

// Re-export main types
pub use manager::UiManager;
pub use panel::{scene_inspector_panel, InspectorState};
