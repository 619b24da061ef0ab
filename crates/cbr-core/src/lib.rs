//! Checkerboard-rendering G-buffer redirection.
//!
//! The host renders its deferred G-buffer at half resolution. On every frame [`FrameRedirector`]
//! swaps the host's bound render targets for one of two cached buffer sets (see
//! [`DualBufferCache`]), alternating between them and offsetting odd frames by half a pixel so a
//! later resolve pass can reconstruct a full-resolution image from the two interleaved frames.
//!
//! This crate is graphics-API agnostic. Devices plug in through [`GfxDevice`]; the host plugin
//! drives everything through the object-safe [`RenderBackend`] facade.

pub mod backend;
pub mod cache;
pub mod config;
pub mod device;
pub mod error;
pub mod format;
pub mod redirect;
pub mod stats;
pub mod view;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use backend::{CheckerboardRenderer, DeviceEvent, GraphicsApi, RenderBackend};
pub use cache::{BufferSet, DualBufferCache, FrameParity, GBufferSlot};
pub use config::CbrConfig;
pub use device::{
    ClearFlags, DeviceSource, GfxContext, GfxDevice, NativeTexture, TextureDesc, ViewDesc,
    Viewport, GBUFFER_SLOT_COUNT,
};
pub use error::{CacheError, ConfigError, DeviceError, ViewError, ViewKind};
pub use format::{resolve_typed_format, DxgiFormat};
pub use redirect::{FrameRedirector, RedirectOutcome, Snapshot};
pub use stats::{CbrStats, CbrStatsSnapshot};
