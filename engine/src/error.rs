use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong while bringing a scene up.
///
/// Once a scene is running nothing in the per-frame path returns these; the
/// only failures left at that point are audio hiccups and dropped frames,
/// which are logged.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("failed to decode image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("missing asset `{0}`")]
    MissingAsset(String),

    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no graphics adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to open graphics device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface cannot present frames: {0}")]
    Presentation(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
