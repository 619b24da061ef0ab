//! Capability boundary towards the host graphics device.
//!
//! The core never talks to a graphics API directly. A backend crate implements [`GfxDevice`] and
//! [`GfxContext`] for its API (e.g. `cbr-d3d11` for Direct3D 11); tests use the recording mock in
//! [`crate::testing`].

use core::ffi::c_void;
use core::ptr::NonNull;

use bitflags::bitflags;

use crate::error::DeviceError;
use crate::format::DxgiFormat;

/// Number of color render targets the checkerboard G-buffer uses.
pub const GBUFFER_SLOT_COUNT: usize = 5;

/// The subset of a 2D texture description the view factory needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureDesc {
    pub format: DxgiFormat,
    pub sample_count: u32,
}

/// A `Texture2DMs` view of a multisampled 2D texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewDesc {
    pub format: DxgiFormat,
}

bitflags! {
    /// Planes cleared by [`GfxContext::clear_depth_stencil_view`]. Values match `D3D11_CLEAR_FLAG`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClearFlags: u32 {
        const DEPTH = 0x1;
        const STENCIL = 0x2;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub top_left_x: f32,
    pub top_left_y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

/// A host-native texture pointer as handed across the plugin boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeTexture(NonNull<c_void>);

impl NativeTexture {
    /// Wraps a raw pointer received from the host. Returns `None` for null.
    ///
    /// # Safety
    ///
    /// A non-null `ptr` must point to a live texture object of the graphics API of the device it
    /// will be imported into, and stay alive for the duration of the import call.
    pub unsafe fn from_raw(ptr: *mut c_void) -> Option<Self> {
        NonNull::new(ptr).map(Self)
    }

    pub fn as_ptr(self) -> *mut c_void {
        self.0.as_ptr()
    }
}

/// Graphics device capabilities used to build and bind the checkerboard buffer sets.
pub trait GfxDevice {
    type Texture: Clone;
    type Rtv: Clone;
    type Dsv: Clone;
    /// Immediate command context. Dropping it releases the reference acquired by
    /// [`GfxDevice::immediate_context`].
    type Context: GfxContext<Rtv = Self::Rtv, Dsv = Self::Dsv>;

    /// Takes a counted reference to a host-native texture.
    fn import_texture(&self, native: NativeTexture) -> Result<Self::Texture, DeviceError>;

    fn texture_desc(&self, texture: &Self::Texture) -> TextureDesc;

    fn create_render_target_view(
        &self,
        texture: &Self::Texture,
        desc: &ViewDesc,
    ) -> Result<Self::Rtv, DeviceError>;

    fn create_depth_stencil_view(
        &self,
        texture: &Self::Texture,
        desc: &ViewDesc,
    ) -> Result<Self::Dsv, DeviceError>;

    /// `None` when the device cannot hand out its immediate context right now (e.g. outside an
    /// active frame).
    fn immediate_context(&self) -> Option<Self::Context>;
}

/// Output-merger and rasterizer state the redirector reads and writes.
pub trait GfxContext {
    type Rtv;
    type Dsv;

    /// Fills `colors` (one entry per bound slot, `None` where nothing is bound) and `depth` with
    /// the currently bound targets.
    fn render_targets(&self, colors: &mut [Option<Self::Rtv>], depth: &mut Option<Self::Dsv>);

    fn set_render_targets(&self, colors: &[Option<Self::Rtv>], depth: Option<&Self::Dsv>);

    fn clear_render_target_view(&self, view: &Self::Rtv, color: [f32; 4]);

    fn clear_depth_stencil_view(
        &self,
        view: &Self::Dsv,
        flags: ClearFlags,
        depth: f32,
        stencil: u8,
    );

    /// The first bound viewport, if any.
    fn viewport(&self) -> Option<Viewport>;

    fn set_viewport(&self, viewport: Viewport);
}

/// Host interface provider that can hand out the device for backend `D`.
pub trait DeviceSource<D> {
    fn acquire_device(&self) -> Option<D>;
}
