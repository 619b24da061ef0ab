use cbr_core::ClearFlags;

/// `D3D11_RTV_DIMENSION_TEXTURE2DMS`.
pub const RTV_DIMENSION_TEXTURE2DMS: i32 = 6;
/// `D3D11_DSV_DIMENSION_TEXTURE2DMS`.
pub const DSV_DIMENSION_TEXTURE2DMS: i32 = 5;

/// `D3D11_CLEAR_FLAG` bits. [`ClearFlags`] already uses the D3D11 values.
pub fn clear_flags_bits(flags: ClearFlags) -> u32 {
    flags.bits()
}
