//! Multisampled render-target / depth-stencil view construction.

use tracing::debug;

use crate::device::{GfxDevice, ViewDesc};
use crate::error::{DeviceError, ViewError, ViewKind};
use crate::format::resolve_typed_format;

/// Resolves the view description for `texture`. Single-sampled textures are refused.
fn multisampled_view_desc<D: GfxDevice>(
    device: &D,
    texture: &D::Texture,
    kind: ViewKind,
) -> Result<ViewDesc, ViewError> {
    let desc = device.texture_desc(texture);
    let format = resolve_typed_format(desc.format);
    if desc.sample_count < 2 {
        debug!(%format, sample_count = desc.sample_count, "texture is not multisampled");
        return Err(ViewError {
            kind,
            format,
            source: DeviceError::NotMultisampled(desc.sample_count),
        });
    }
    Ok(ViewDesc { format })
}

/// Builds a `Texture2DMs` render-target view of `texture`.
///
/// A device rejection (format/dimension mismatch, destroyed resource, ...) is reported as a
/// [`ViewError`]; it is never fatal.
pub fn create_render_target_view<D: GfxDevice>(
    device: &D,
    texture: &D::Texture,
) -> Result<D::Rtv, ViewError> {
    let desc = multisampled_view_desc(device, texture, ViewKind::RenderTarget)?;
    device
        .create_render_target_view(texture, &desc)
        .map_err(|source| {
            debug!(format = %desc.format, error = %source, "render-target view rejected");
            ViewError {
                kind: ViewKind::RenderTarget,
                format: desc.format,
                source,
            }
        })
}

/// Builds a `Texture2DMs` depth-stencil view of `texture`.
pub fn create_depth_stencil_view<D: GfxDevice>(
    device: &D,
    texture: &D::Texture,
) -> Result<D::Dsv, ViewError> {
    let desc = multisampled_view_desc(device, texture, ViewKind::DepthStencil)?;
    device
        .create_depth_stencil_view(texture, &desc)
        .map_err(|source| {
            debug!(format = %desc.format, error = %source, "depth-stencil view rejected");
            ViewError {
                kind: ViewKind::DepthStencil,
                format: desc.format,
                source,
            }
        })
}
