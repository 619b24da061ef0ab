//! Native plugin that lets the host engine drive checkerboard rendering.
//!
//! The host script caches its two G-buffer sets through [`ffi::CacheNativeGBuffer`] and
//! [`ffi::CacheNativeDepth`], then issues render events 0 (redirect) and 1 (restore) around its
//! G-buffer pass via the callback returned by [`ffi::GetRenderEventFunc`].

pub mod ffi;
pub mod host;
pub mod logging;
pub mod plugin;
pub mod unity;

pub use host::{HostInterfaces, UnityHost};
pub use plugin::{select_backend, BackendSelector, Plugin, RenderEvent};
