use cbr_core::{
    ClearFlags, DeviceError, DxgiFormat, GfxContext, GfxDevice, NativeTexture, TextureDesc,
    ViewDesc, Viewport, GBUFFER_SLOT_COUNT,
};
use tracing::{debug, trace};
use windows::core::Interface;
use windows::Win32::Graphics::Direct3D11::{
    ID3D11DepthStencilView, ID3D11Device, ID3D11DeviceContext, ID3D11RenderTargetView,
    ID3D11Resource, ID3D11Texture2D, D3D11_DEPTH_STENCIL_VIEW_DESC, D3D11_DSV_DIMENSION,
    D3D11_RENDER_TARGET_VIEW_DESC, D3D11_RTV_DIMENSION, D3D11_TEXTURE2D_DESC, D3D11_VIEWPORT,
};
use windows::Win32::Graphics::Dxgi::Common::DXGI_FORMAT;

use crate::convert::{clear_flags_bits, DSV_DIMENSION_TEXTURE2DMS, RTV_DIMENSION_TEXTURE2DMS};

/// Host-owned D3D11 device. Cloning adds a COM reference.
#[derive(Debug, Clone)]
pub struct D3D11Device {
    device: ID3D11Device,
}

impl D3D11Device {
    pub fn new(device: ID3D11Device) -> Self {
        Self { device }
    }

    /// Borrows the host's raw `ID3D11Device*` and takes a reference of our own.
    ///
    /// # Safety
    ///
    /// `raw` must be null or a live `ID3D11Device`.
    pub unsafe fn from_raw_borrowed(raw: *mut core::ffi::c_void) -> Option<Self> {
        // SAFETY: upheld by the caller.
        unsafe { ID3D11Device::from_raw_borrowed(&raw) }
            .cloned()
            .map(Self::new)
    }

    pub fn raw(&self) -> &ID3D11Device {
        &self.device
    }
}

fn rejected(err: windows::core::Error) -> DeviceError {
    DeviceError::Rejected(format!("{err} (hresult {:#010x})", err.code().0))
}

impl GfxDevice for D3D11Device {
    type Texture = ID3D11Texture2D;
    type Rtv = ID3D11RenderTargetView;
    type Dsv = ID3D11DepthStencilView;
    type Context = D3D11Context;

    fn import_texture(&self, native: NativeTexture) -> Result<ID3D11Texture2D, DeviceError> {
        let raw = native.as_ptr();
        // SAFETY: `NativeTexture::from_raw` requires a live texture object; `cast` takes its own
        // reference before the borrow ends.
        let resource = unsafe { ID3D11Resource::from_raw_borrowed(&raw) }
            .ok_or(DeviceError::InvalidTexture)?;
        resource
            .cast::<ID3D11Texture2D>()
            .map_err(|_| DeviceError::InvalidTexture)
    }

    fn texture_desc(&self, texture: &ID3D11Texture2D) -> TextureDesc {
        let mut desc = D3D11_TEXTURE2D_DESC::default();
        // SAFETY: `desc` is a valid out pointer.
        unsafe { texture.GetDesc(&mut desc) };
        TextureDesc {
            format: DxgiFormat(desc.Format.0 as u32),
            sample_count: desc.SampleDesc.Count,
        }
    }

    fn create_render_target_view(
        &self,
        texture: &ID3D11Texture2D,
        desc: &ViewDesc,
    ) -> Result<ID3D11RenderTargetView, DeviceError> {
        let view_desc = D3D11_RENDER_TARGET_VIEW_DESC {
            Format: DXGI_FORMAT(desc.format.raw() as i32),
            ViewDimension: D3D11_RTV_DIMENSION(RTV_DIMENSION_TEXTURE2DMS),
            ..Default::default()
        };
        let mut view = None;
        // SAFETY: descriptor and out pointer are valid for the call.
        unsafe {
            self.device
                .CreateRenderTargetView(texture, Some(&view_desc), Some(&mut view))
        }
        .map_err(rejected)?;
        view.ok_or(DeviceError::Rejected("device returned no render target view".into()))
    }

    fn create_depth_stencil_view(
        &self,
        texture: &ID3D11Texture2D,
        desc: &ViewDesc,
    ) -> Result<ID3D11DepthStencilView, DeviceError> {
        let view_desc = D3D11_DEPTH_STENCIL_VIEW_DESC {
            Format: DXGI_FORMAT(desc.format.raw() as i32),
            ViewDimension: D3D11_DSV_DIMENSION(DSV_DIMENSION_TEXTURE2DMS),
            ..Default::default()
        };
        let mut view = None;
        // SAFETY: descriptor and out pointer are valid for the call.
        unsafe {
            self.device
                .CreateDepthStencilView(texture, Some(&view_desc), Some(&mut view))
        }
        .map_err(rejected)?;
        view.ok_or(DeviceError::Rejected("device returned no depth stencil view".into()))
    }

    fn immediate_context(&self) -> Option<D3D11Context> {
        // SAFETY: plain COM getter on a live device.
        match unsafe { self.device.GetImmediateContext() } {
            Ok(context) => Some(D3D11Context { context }),
            Err(err) => {
                debug!(%err, "immediate context unavailable");
                None
            }
        }
    }
}

/// Immediate context reference; released when dropped.
#[derive(Debug)]
pub struct D3D11Context {
    context: ID3D11DeviceContext,
}

impl GfxContext for D3D11Context {
    type Rtv = ID3D11RenderTargetView;
    type Dsv = ID3D11DepthStencilView;

    fn render_targets(
        &self,
        colors: &mut [Option<ID3D11RenderTargetView>],
        depth: &mut Option<ID3D11DepthStencilView>,
    ) {
        let count = colors.len().min(GBUFFER_SLOT_COUNT);
        // SAFETY: both out pointers are valid; returned views carry their own references.
        unsafe {
            self.context
                .OMGetRenderTargets(Some(&mut colors[..count]), Some(depth))
        };
    }

    fn set_render_targets(
        &self,
        colors: &[Option<ID3D11RenderTargetView>],
        depth: Option<&ID3D11DepthStencilView>,
    ) {
        trace!(slots = colors.len(), depth = depth.is_some(), "OMSetRenderTargets");
        // SAFETY: views are live COM objects owned by the caller.
        unsafe { self.context.OMSetRenderTargets(Some(colors), depth) };
    }

    fn clear_render_target_view(&self, view: &ID3D11RenderTargetView, color: [f32; 4]) {
        // SAFETY: `view` is live and `color` outlives the call.
        unsafe { self.context.ClearRenderTargetView(view, &color) };
    }

    fn clear_depth_stencil_view(
        &self,
        view: &ID3D11DepthStencilView,
        flags: ClearFlags,
        depth: f32,
        stencil: u8,
    ) {
        // SAFETY: `view` is live.
        unsafe {
            self.context
                .ClearDepthStencilView(view, clear_flags_bits(flags), depth, stencil)
        };
    }

    fn viewport(&self) -> Option<Viewport> {
        let mut count = 1u32;
        let mut vp = D3D11_VIEWPORT::default();
        // SAFETY: `count` is 1 so at most one viewport is written into `vp`.
        unsafe { self.context.RSGetViewports(&mut count, Some(&mut vp)) };
        (count > 0).then(|| Viewport {
            top_left_x: vp.TopLeftX,
            top_left_y: vp.TopLeftY,
            width: vp.Width,
            height: vp.Height,
            min_depth: vp.MinDepth,
            max_depth: vp.MaxDepth,
        })
    }

    fn set_viewport(&self, viewport: Viewport) {
        let vp = D3D11_VIEWPORT {
            TopLeftX: viewport.top_left_x,
            TopLeftY: viewport.top_left_y,
            Width: viewport.width,
            Height: viewport.height,
            MinDepth: viewport.min_depth,
            MaxDepth: viewport.max_depth,
        };
        // SAFETY: the slice outlives the call.
        unsafe { self.context.RSSetViewports(Some(&[vp])) };
    }
}
