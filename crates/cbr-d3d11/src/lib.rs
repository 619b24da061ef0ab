//! Direct3D 11 implementation of the `cbr-core` device capabilities.
//!
//! Everything that touches the D3D11 COM API is gated on `cfg(windows)`. The conversions between
//! core types and their D3D11 counterparts are plain data mappings and compile everywhere, so they
//! are unit tested on every host.

mod convert;

#[cfg(windows)]
mod device;

pub use convert::{clear_flags_bits, DSV_DIMENSION_TEXTURE2DMS, RTV_DIMENSION_TEXTURE2DMS};

#[cfg(windows)]
pub use device::{D3D11Context, D3D11Device};
