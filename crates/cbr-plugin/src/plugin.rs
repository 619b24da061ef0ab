use core::ffi::c_void;

use cbr_core::{
    CacheError, CbrConfig, CbrStatsSnapshot, DeviceEvent, FrameParity, GBufferSlot, GraphicsApi,
    NativeTexture, RedirectOutcome, RenderBackend,
};
use tracing::{debug, info, warn};

use crate::host::{HostInterfaces, UnityHost};

/// Builds the backend for a host graphics API, or `None` if none is compiled in for it.
pub type BackendSelector<H> = fn(GraphicsApi, CbrConfig) -> Option<Box<dyn RenderBackend<H>>>;

/// Render-thread events the host issues through `GetRenderEventFunc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderEvent {
    /// Bind this frame's checkerboard G-buffer set.
    Redirect,
    /// Rebind the host's own targets.
    Restore,
}

impl RenderEvent {
    pub fn from_raw(event_id: i32) -> Option<Self> {
        match event_id {
            0 => Some(Self::Redirect),
            1 => Some(Self::Restore),
            _ => None,
        }
    }
}

/// Backends available for [`UnityHost`] on this target.
#[cfg(windows)]
pub fn select_backend(
    api: GraphicsApi,
    config: CbrConfig,
) -> Option<Box<dyn RenderBackend<UnityHost>>> {
    use cbr_core::CheckerboardRenderer;
    use cbr_d3d11::D3D11Device;

    match api {
        GraphicsApi::D3D11 => Some(Box::new(CheckerboardRenderer::<D3D11Device>::new(config))),
        _ => None,
    }
}

/// Backends available for [`UnityHost`] on this target.
#[cfg(not(windows))]
pub fn select_backend(
    api: GraphicsApi,
    config: CbrConfig,
) -> Option<Box<dyn RenderBackend<UnityHost>>> {
    let _ = (api, config);
    None
}

/// One loaded plugin instance: the host, and the backend for its current graphics API.
pub struct Plugin<H> {
    host: H,
    config: CbrConfig,
    select: BackendSelector<H>,
    api: GraphicsApi,
    backend: Option<Box<dyn RenderBackend<H>>>,
}

impl<H: HostInterfaces> Plugin<H> {
    /// Creates an idle plugin; the backend is chosen on the first [`DeviceEvent::Initialize`].
    pub fn new(host: H, config: CbrConfig, select: BackendSelector<H>) -> Self {
        Self {
            host,
            config,
            select,
            api: GraphicsApi::Null,
            backend: None,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn api(&self) -> GraphicsApi {
        self.api
    }

    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    pub fn on_device_event(&mut self, event: DeviceEvent) {
        if event == DeviceEvent::Initialize {
            self.api = self.host.renderer();
            self.backend = (self.select)(self.api, self.config);
            match self.backend {
                Some(_) => info!(api = ?self.api, "checkerboard backend selected"),
                None => warn!(api = ?self.api, "no checkerboard backend for graphics api"),
            }
        }

        if let Some(backend) = self.backend.as_mut() {
            backend.process_device_event(event, &self.host);
        }

        if event == DeviceEvent::Shutdown {
            self.backend = None;
            self.api = GraphicsApi::Null;
        }
    }

    fn backend_mut(&mut self) -> Result<&mut (dyn RenderBackend<H> + 'static), CacheError> {
        let api = self.api;
        self.backend.as_deref_mut().ok_or(match api {
            // Not initialized yet, or shut down.
            GraphicsApi::Null => CacheError::NoDevice,
            api => CacheError::Unsupported(api),
        })
    }

    /// Caches G-buffer texture `slot` of buffer set `frame` from a raw host texture pointer.
    pub fn cache_color(
        &mut self,
        texture: *mut c_void,
        frame: i32,
        slot: i32,
    ) -> Result<(), CacheError> {
        let parity = FrameParity::try_from(frame)?;
        let slot = GBufferSlot::try_from(slot)?;
        // SAFETY: the host passes null or a native texture of its current device.
        let texture = unsafe { NativeTexture::from_raw(texture) }.ok_or(CacheError::NullTexture)?;
        self.backend_mut()?.cache_color_texture(texture, parity, slot)
    }

    /// Caches the depth texture of buffer set `frame` from a raw host texture pointer.
    pub fn cache_depth(&mut self, texture: *mut c_void, frame: i32) -> Result<(), CacheError> {
        let parity = FrameParity::try_from(frame)?;
        // SAFETY: the host passes null or a native texture of its current device.
        let texture = unsafe { NativeTexture::from_raw(texture) }.ok_or(CacheError::NullTexture)?;
        self.backend_mut()?.cache_depth_texture(texture, parity)
    }

    pub fn release_all(&mut self) {
        if let Some(backend) = self.backend.as_mut() {
            backend.release_all();
        }
    }

    pub fn render_event(&mut self, event_id: i32) {
        let Some(event) = RenderEvent::from_raw(event_id) else {
            warn!(event_id, "ignoring unknown render event");
            return;
        };
        let Some(backend) = self.backend.as_mut() else {
            debug!(?event, "render event without a backend");
            return;
        };
        match event {
            RenderEvent::Redirect => {
                if let RedirectOutcome::Skipped = backend.redirect() {
                    debug!("redirect skipped");
                }
            }
            RenderEvent::Restore => {
                backend.restore();
            }
        }
    }

    /// Counters of the active backend; zeroed when there is none.
    pub fn stats(&self) -> CbrStatsSnapshot {
        self.backend
            .as_ref()
            .map(|backend| backend.stats().snapshot())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cbr_core::testing::{MockDevice, MockHost};
    use cbr_core::{CheckerboardRenderer, DeviceSource, DxgiFormat};
    use pretty_assertions::assert_eq;

    struct TestHost {
        api: GraphicsApi,
        inner: MockHost,
    }

    impl HostInterfaces for TestHost {
        fn renderer(&self) -> GraphicsApi {
            self.api
        }
    }

    impl DeviceSource<MockDevice> for TestHost {
        fn acquire_device(&self) -> Option<MockDevice> {
            self.inner.acquire_device()
        }
    }

    fn mock_backends(
        api: GraphicsApi,
        config: CbrConfig,
    ) -> Option<Box<dyn RenderBackend<TestHost>>> {
        match api {
            GraphicsApi::D3D11 => Some(Box::new(CheckerboardRenderer::<MockDevice>::new(config))),
            _ => None,
        }
    }

    fn plugin(api: GraphicsApi) -> (MockDevice, Plugin<TestHost>) {
        let device = MockDevice::new();
        let host = TestHost {
            api,
            inner: MockHost::new(device.clone()),
        };
        let mut plugin = Plugin::new(host, CbrConfig::default(), mock_backends);
        plugin.on_device_event(DeviceEvent::Initialize);
        (device, plugin)
    }

    fn handle(texture: &cbr_core::testing::MockTexture) -> *mut c_void {
        MockDevice::native_handle(texture).as_ptr()
    }

    #[test]
    fn render_event_ids_decode() {
        assert_eq!(RenderEvent::from_raw(0), Some(RenderEvent::Redirect));
        assert_eq!(RenderEvent::from_raw(1), Some(RenderEvent::Restore));
        assert_eq!(RenderEvent::from_raw(2), None);
        assert_eq!(RenderEvent::from_raw(-1), None);
    }

    #[test]
    fn unsupported_api_has_no_backend() {
        let (device, mut plugin) = plugin(GraphicsApi::Vulkan);
        assert!(!plugin.has_backend());
        assert_eq!(plugin.api(), GraphicsApi::Vulkan);

        let tex = device.texture(DxgiFormat::R8G8B8A8_TYPELESS);
        let err = plugin.cache_color(handle(&tex), 0, 0).unwrap_err();
        assert_eq!(err, CacheError::Unsupported(GraphicsApi::Vulkan));
        assert_eq!(
            err.to_string(),
            "no checkerboard backend for graphics api Vulkan"
        );
        assert_eq!(
            plugin.cache_depth(handle(&tex), 1),
            Err(CacheError::Unsupported(GraphicsApi::Vulkan))
        );
        plugin.render_event(0);
        plugin.render_event(1);
        assert!(device.take_commands().is_empty());
        assert_eq!(plugin.stats(), CbrStatsSnapshot::default());
    }

    #[test]
    fn caching_before_initialize_reports_no_device() {
        let device = MockDevice::new();
        let host = TestHost {
            api: GraphicsApi::D3D11,
            inner: MockHost::new(device.clone()),
        };
        let mut plugin = Plugin::new(host, CbrConfig::default(), mock_backends);
        let tex = device.texture(DxgiFormat::R8G8B8A8_TYPELESS);

        assert_eq!(
            plugin.cache_color(handle(&tex), 0, 0),
            Err(CacheError::NoDevice)
        );
    }

    #[test]
    fn host_arguments_are_validated() {
        let (device, mut plugin) = plugin(GraphicsApi::D3D11);
        let tex = device.texture(DxgiFormat::R8G8B8A8_TYPELESS);

        assert_eq!(
            plugin.cache_color(handle(&tex), 2, 0),
            Err(CacheError::InvalidParity(2))
        );
        assert_eq!(
            plugin.cache_color(handle(&tex), 0, 5),
            Err(CacheError::InvalidSlot(5))
        );
        assert_eq!(
            plugin.cache_color(core::ptr::null_mut(), 0, 0),
            Err(CacheError::NullTexture)
        );
        assert_eq!(
            plugin.cache_depth(core::ptr::null_mut(), 1),
            Err(CacheError::NullTexture)
        );
        assert_eq!(plugin.cache_color(handle(&tex), 1, 4), Ok(()));
    }

    #[test]
    fn render_events_dispatch_to_redirect_and_restore() {
        let (device, mut plugin) = plugin(GraphicsApi::D3D11);
        let tex = device.texture(DxgiFormat::R8G8B8A8_TYPELESS);
        plugin.cache_color(handle(&tex), 0, 0).unwrap();

        plugin.render_event(0);
        plugin.render_event(1);
        plugin.render_event(7);

        let stats = plugin.stats();
        assert_eq!(stats.redirects, 1);
        assert_eq!(stats.restores, 1);
    }

    #[test]
    fn shutdown_drops_backend_until_next_initialize() {
        let (device, mut plugin) = plugin(GraphicsApi::D3D11);
        let tex = device.texture(DxgiFormat::R8G8B8A8_TYPELESS);

        plugin.on_device_event(DeviceEvent::Shutdown);
        assert!(!plugin.has_backend());
        assert_eq!(plugin.api(), GraphicsApi::Null);
        assert_eq!(
            plugin.cache_color(handle(&tex), 0, 0),
            Err(CacheError::NoDevice)
        );

        plugin.on_device_event(DeviceEvent::Initialize);
        assert!(plugin.has_backend());
        assert_eq!(plugin.cache_color(handle(&tex), 0, 0), Ok(()));
    }
}
