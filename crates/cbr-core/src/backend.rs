//! Backend capability set and the generic checkerboard renderer implementing it.

use core::fmt;

use tracing::{debug, info, warn};

use crate::cache::{DualBufferCache, FrameParity, GBufferSlot};
use crate::config::CbrConfig;
use crate::device::{DeviceSource, GfxDevice, NativeTexture};
use crate::error::CacheError;
use crate::redirect::{FrameRedirector, RedirectOutcome};
use crate::stats::CbrStats;

/// Graphics API reported by the host. Values match `UnityGfxRenderer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphicsApi {
    D3D11,
    Null,
    OpenGLES30,
    Metal,
    OpenGLCore,
    D3D12,
    Vulkan,
    Other(i32),
}

impl GraphicsApi {
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            2 => Self::D3D11,
            4 => Self::Null,
            11 => Self::OpenGLES30,
            16 => Self::Metal,
            17 => Self::OpenGLCore,
            18 => Self::D3D12,
            21 => Self::Vulkan,
            other => Self::Other(other),
        }
    }
}

/// Device lifecycle events dispatched by the host. Values match `UnityGfxDeviceEventType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceEvent {
    Initialize,
    Shutdown,
    BeforeReset,
    AfterReset,
}

impl DeviceEvent {
    pub fn from_raw(raw: i32) -> Option<Self> {
        Some(match raw {
            0 => Self::Initialize,
            1 => Self::Shutdown,
            2 => Self::BeforeReset,
            3 => Self::AfterReset,
            _ => return None,
        })
    }
}

/// Everything the host integration layer can ask of a backend.
///
/// `H` is the host's interface provider; each backend knows how to pull its device out of it.
pub trait RenderBackend<H: ?Sized> {
    fn process_device_event(&mut self, event: DeviceEvent, host: &H);

    /// Caches a host color texture for `parity`/`slot` and builds its view.
    fn cache_color_texture(
        &mut self,
        texture: NativeTexture,
        parity: FrameParity,
        slot: GBufferSlot,
    ) -> Result<(), CacheError>;

    fn cache_depth_texture(
        &mut self,
        texture: NativeTexture,
        parity: FrameParity,
    ) -> Result<(), CacheError>;

    fn release_all(&mut self);

    fn redirect(&mut self) -> RedirectOutcome;

    fn restore(&mut self) -> bool;

    fn stats(&self) -> &CbrStats;
}

/// Checkerboard G-buffer redirection over any [`GfxDevice`].
pub struct CheckerboardRenderer<D: GfxDevice> {
    device: Option<D>,
    cache: DualBufferCache<D>,
    redirector: FrameRedirector<D>,
    stats: CbrStats,
}

impl<D: GfxDevice> CheckerboardRenderer<D> {
    pub fn new(config: CbrConfig) -> Self {
        Self {
            device: None,
            cache: DualBufferCache::new(),
            redirector: FrameRedirector::new(config),
            stats: CbrStats::new(),
        }
    }

    pub fn device(&self) -> Option<&D> {
        self.device.as_ref()
    }

    pub fn cache(&self) -> &DualBufferCache<D> {
        &self.cache
    }

    pub fn redirector(&self) -> &FrameRedirector<D> {
        &self.redirector
    }

    pub fn parity(&self) -> FrameParity {
        self.redirector.parity()
    }

    /// Adopts `device`, dropping everything built against a previous one.
    pub fn attach_device(&mut self, device: D) {
        self.clear_views();
        self.device = Some(device);
    }

    /// Releases all views, then the device itself.
    pub fn detach_device(&mut self) {
        self.release_views();
        self.device = None;
    }

    pub fn cache_color(
        &mut self,
        texture: D::Texture,
        parity: FrameParity,
        slot: GBufferSlot,
    ) -> Result<(), CacheError> {
        let device = self.device.as_ref().ok_or(CacheError::NoDevice)?;
        let result = self.cache.cache_color_texture(device, texture, parity, slot);
        self.count_view(result.is_ok());
        Ok(result?)
    }

    pub fn cache_depth(
        &mut self,
        texture: D::Texture,
        parity: FrameParity,
    ) -> Result<(), CacheError> {
        let device = self.device.as_ref().ok_or(CacheError::NoDevice)?;
        let result = self.cache.cache_depth_texture(device, texture, parity);
        self.count_view(result.is_ok());
        Ok(result?)
    }

    fn count_view(&self, ok: bool) {
        if ok {
            self.stats.inc_views_created();
        } else {
            self.stats.inc_view_failures();
        }
    }

    fn import(&self, native: NativeTexture) -> Result<D::Texture, CacheError> {
        let device = self.device.as_ref().ok_or(CacheError::NoDevice)?;
        device.import_texture(native).map_err(CacheError::Import)
    }

    fn clear_views(&mut self) {
        self.cache.release_all();
        self.redirector.reset();
    }

    /// [`Self::clear_views`] on an explicit release or a device teardown; counted in the stats.
    fn release_views(&mut self) {
        self.clear_views();
        self.stats.inc_releases();
    }
}

impl<D, H> RenderBackend<H> for CheckerboardRenderer<D>
where
    D: GfxDevice,
    H: DeviceSource<D> + ?Sized,
{
    fn process_device_event(&mut self, event: DeviceEvent, host: &H) {
        match event {
            DeviceEvent::Initialize => match host.acquire_device() {
                Some(device) => {
                    info!("graphics device initialized");
                    self.attach_device(device);
                }
                None => warn!("device initialize event without a retrievable device"),
            },
            DeviceEvent::Shutdown => {
                info!("graphics device shutting down; releasing cached views");
                self.detach_device();
            }
            DeviceEvent::BeforeReset => {
                debug!("device reset pending; releasing cached views");
                self.release_views();
            }
            DeviceEvent::AfterReset => debug!("device reset complete; awaiting re-cache"),
        }
    }

    fn cache_color_texture(
        &mut self,
        texture: NativeTexture,
        parity: FrameParity,
        slot: GBufferSlot,
    ) -> Result<(), CacheError> {
        let texture = self.import(texture)?;
        self.cache_color(texture, parity, slot)
    }

    fn cache_depth_texture(
        &mut self,
        texture: NativeTexture,
        parity: FrameParity,
    ) -> Result<(), CacheError> {
        let texture = self.import(texture)?;
        self.cache_depth(texture, parity)
    }

    fn release_all(&mut self) {
        self.release_views();
    }

    fn redirect(&mut self) -> RedirectOutcome {
        let Some(device) = self.device.as_ref() else {
            self.stats.inc_redirects_skipped();
            return RedirectOutcome::Skipped;
        };
        self.redirector.redirect(device, &self.cache, &self.stats)
    }

    fn restore(&mut self) -> bool {
        let Some(device) = self.device.as_ref() else {
            self.stats.inc_restores_skipped();
            return false;
        };
        self.redirector.restore(device, &self.stats)
    }

    fn stats(&self) -> &CbrStats {
        &self.stats
    }
}

impl<D: GfxDevice> fmt::Debug for CheckerboardRenderer<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckerboardRenderer")
            .field("has_device", &self.device.is_some())
            .field("cache", &self.cache)
            .field("redirector", &self.redirector)
            .finish()
    }
}
