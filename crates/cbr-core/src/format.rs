//! DXGI pixel formats and typeless → typed resolution.
//!
//! Host render textures are created with typeless storage formats so they can be bound both as
//! render targets and as shader resources. Views need a concrete typed format, which is what
//! [`resolve_typed_format`] provides.

use core::fmt;

/// A DXGI format identifier.
///
/// Stored as the raw `DXGI_FORMAT` value so formats we have no name for still round-trip
/// unchanged through the resolver and into the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct DxgiFormat(pub u32);

impl DxgiFormat {
    pub const UNKNOWN: Self = Self(0);

    pub const R16G16B16A16_TYPELESS: Self = Self(9);
    pub const R16G16B16A16_FLOAT: Self = Self(10);

    pub const R32G8X24_TYPELESS: Self = Self(19);
    pub const D32_FLOAT_S8X24_UINT: Self = Self(20);

    pub const R10G10B10A2_TYPELESS: Self = Self(23);
    pub const R10G10B10A2_UNORM: Self = Self(24);

    pub const R8G8B8A8_TYPELESS: Self = Self(27);
    pub const R8G8B8A8_UNORM: Self = Self(28);

    pub const R32_TYPELESS: Self = Self(39);
    pub const D32_FLOAT: Self = Self(40);

    pub const R24G8_TYPELESS: Self = Self(44);
    pub const D24_UNORM_S8_UINT: Self = Self(45);

    pub const B8G8R8A8_TYPELESS: Self = Self(90);
    pub const B8G8R8A8_UNORM: Self = Self(87);

    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Storage-only formats that cannot be used directly for a view.
    pub fn is_typeless(self) -> bool {
        matches!(
            self,
            Self::R16G16B16A16_TYPELESS
                | Self::R32G8X24_TYPELESS
                | Self::R10G10B10A2_TYPELESS
                | Self::R8G8B8A8_TYPELESS
                | Self::R32_TYPELESS
                | Self::R24G8_TYPELESS
                | Self::B8G8R8A8_TYPELESS
        )
    }

    pub fn name(self) -> Option<&'static str> {
        Some(match self {
            Self::UNKNOWN => "UNKNOWN",
            Self::R16G16B16A16_TYPELESS => "R16G16B16A16_TYPELESS",
            Self::R16G16B16A16_FLOAT => "R16G16B16A16_FLOAT",
            Self::R32G8X24_TYPELESS => "R32G8X24_TYPELESS",
            Self::D32_FLOAT_S8X24_UINT => "D32_FLOAT_S8X24_UINT",
            Self::R10G10B10A2_TYPELESS => "R10G10B10A2_TYPELESS",
            Self::R10G10B10A2_UNORM => "R10G10B10A2_UNORM",
            Self::R8G8B8A8_TYPELESS => "R8G8B8A8_TYPELESS",
            Self::R8G8B8A8_UNORM => "R8G8B8A8_UNORM",
            Self::R32_TYPELESS => "R32_TYPELESS",
            Self::D32_FLOAT => "D32_FLOAT",
            Self::R24G8_TYPELESS => "R24G8_TYPELESS",
            Self::D24_UNORM_S8_UINT => "D24_UNORM_S8_UINT",
            Self::B8G8R8A8_TYPELESS => "B8G8R8A8_TYPELESS",
            Self::B8G8R8A8_UNORM => "B8G8R8A8_UNORM",
            _ => return None,
        })
    }
}

impl fmt::Display for DxgiFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "DXGI_FORMAT({})", self.0),
        }
    }
}

/// Maps the typeless storage formats used for checkerboard G-buffers to the typed format a view
/// of that storage must declare.
///
/// Total: formats outside the recognised set are passed through unchanged. Whether the device
/// accepts the passthrough format for the requested view is left to view creation.
pub fn resolve_typed_format(format: DxgiFormat) -> DxgiFormat {
    match format {
        DxgiFormat::R8G8B8A8_TYPELESS => DxgiFormat::R8G8B8A8_UNORM,
        DxgiFormat::R10G10B10A2_TYPELESS => DxgiFormat::R10G10B10A2_UNORM,
        DxgiFormat::R16G16B16A16_TYPELESS => DxgiFormat::R16G16B16A16_FLOAT,
        DxgiFormat::R32G8X24_TYPELESS => DxgiFormat::D32_FLOAT_S8X24_UINT,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECOGNISED: &[(DxgiFormat, DxgiFormat)] = &[
        (DxgiFormat::R8G8B8A8_TYPELESS, DxgiFormat::R8G8B8A8_UNORM),
        (DxgiFormat::R10G10B10A2_TYPELESS, DxgiFormat::R10G10B10A2_UNORM),
        (
            DxgiFormat::R16G16B16A16_TYPELESS,
            DxgiFormat::R16G16B16A16_FLOAT,
        ),
        (DxgiFormat::R32G8X24_TYPELESS, DxgiFormat::D32_FLOAT_S8X24_UINT),
    ];

    #[test]
    fn recognised_typeless_formats_resolve() {
        for &(typeless, typed) in RECOGNISED {
            assert_eq!(resolve_typed_format(typeless), typed, "{typeless}");
            // Typed outputs are outside the recognised set, so resolving again is a no-op.
            assert_eq!(resolve_typed_format(typed), typed, "{typed}");
        }
    }

    #[test]
    fn unrecognised_formats_pass_through() {
        for raw in 0..=200u32 {
            let format = DxgiFormat(raw);
            if RECOGNISED.iter().any(|&(typeless, _)| typeless == format) {
                continue;
            }
            assert_eq!(resolve_typed_format(format), format);
        }
        assert_eq!(
            resolve_typed_format(DxgiFormat(u32::MAX)),
            DxgiFormat(u32::MAX)
        );
    }

    #[test]
    fn other_depth_typeless_formats_are_not_remapped() {
        assert_eq!(
            resolve_typed_format(DxgiFormat::R24G8_TYPELESS),
            DxgiFormat::R24G8_TYPELESS
        );
        assert_eq!(
            resolve_typed_format(DxgiFormat::R32_TYPELESS),
            DxgiFormat::R32_TYPELESS
        );
    }

    #[test]
    fn display_uses_names_when_known() {
        assert_eq!(DxgiFormat::R8G8B8A8_UNORM.to_string(), "R8G8B8A8_UNORM");
        assert_eq!(DxgiFormat(1234).to_string(), "DXGI_FORMAT(1234)");
    }
}
