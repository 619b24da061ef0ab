use thiserror::Error;

use crate::backend::GraphicsApi;
use crate::format::DxgiFormat;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    #[error("device rejected the request: {0}")]
    Rejected(String),
    #[error("native handle is not a live texture of this device's API")]
    InvalidTexture,
    #[error("texture has {0} sample(s); multisampled views need at least 2")]
    NotMultisampled(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    RenderTarget,
    DepthStencil,
}

impl ViewKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RenderTarget => "render-target",
            Self::DepthStencil => "depth-stencil",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to create {} view with format {format}", .kind.as_str())]
pub struct ViewError {
    pub kind: ViewKind,
    pub format: DxgiFormat,
    #[source]
    pub source: DeviceError,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("no graphics device (device initialize event not received)")]
    NoDevice,
    #[error("no checkerboard backend for graphics api {0:?}")]
    Unsupported(GraphicsApi),
    #[error("frame parity {0} is out of range (expected 0 or 1)")]
    InvalidParity(i32),
    #[error("G-buffer slot {0} is out of range (expected 0..5)")]
    InvalidSlot(i32),
    #[error("texture handle is null")]
    NullTexture,
    #[error("failed to import texture: {0}")]
    Import(#[source] DeviceError),
    #[error(transparent)]
    View(#[from] ViewError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for env var {var}")]
    InvalidEnv { var: &'static str, value: String },
}
