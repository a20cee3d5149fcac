//! Error types for the Spectra viewer
//!
//! Each concern gets its own enum so callers can tell a bad asset (recoverable,
//! logged) apart from a bad shader or GPU setup (fatal at startup).

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while importing models and textures
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("failed to load OBJ file {path}: {source}")]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("failed to decode texture {path}: {source}")]
    Texture {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("model {0} contains no meshes")]
    EmptyModel(PathBuf),
}

/// Mismatches between the uniform schema and a WGSL shader source
#[derive(Error, Debug, PartialEq)]
pub enum ShaderError {
    #[error("shader '{shader}' does not declare struct {name}")]
    MissingStruct { shader: String, name: String },

    #[error("shader '{shader}' struct {name} has {found} members, expected {expected}")]
    MemberCount {
        shader: String,
        name: String,
        expected: usize,
        found: usize,
    },

    #[error(
        "shader '{shader}' struct {name} member {index} is `{found}`, expected `{expected}`"
    )]
    MemberMismatch {
        shader: String,
        name: String,
        index: usize,
        expected: String,
        found: String,
    },
}

/// Fatal errors raised while bringing up or driving the GPU
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no compatible GPU adapter found: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to request device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface reports no supported formats")]
    NoSurfaceFormat,

    #[error(transparent)]
    Shader(#[from] ShaderError),

    #[error("pipeline '{0}' could not be created")]
    Pipeline(String),

    #[error("GPU ran out of memory while acquiring a frame")]
    OutOfMemory,
}

/// Everything that can stop the viewer
#[derive(Error, Debug)]
pub enum AppError {
    #[error("event loop failed: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Asset(#[from] AssetError),
}
