use core::ptr::NonNull;

use cbr_core::GraphicsApi;

use crate::unity::{
    DeviceEventCallback, IUnityGraphics, IUnityInterfaces, UnityInterfaceGuid,
    IUNITY_GRAPHICS_GUID,
};

/// What the plugin needs from the host beyond the device itself.
pub trait HostInterfaces {
    /// The graphics API the host is currently rendering with.
    fn renderer(&self) -> GraphicsApi;
}

/// The host's interface registry, as received by `UnityPluginLoad`.
#[derive(Debug, Clone, Copy)]
pub struct UnityHost {
    interfaces: NonNull<IUnityInterfaces>,
}

// SAFETY: the registry and the interface tables it hands out live for the whole process and the
// host documents them as callable from any thread.
unsafe impl Send for UnityHost {}

impl UnityHost {
    /// # Safety
    ///
    /// A non-null `interfaces` must point to the host's registry and stay valid until the plugin
    /// is unloaded.
    pub unsafe fn new(interfaces: *mut IUnityInterfaces) -> Option<Self> {
        NonNull::new(interfaces).map(|interfaces| Self { interfaces })
    }

    fn registry(&self) -> &IUnityInterfaces {
        // SAFETY: validity is guaranteed by the contract of `UnityHost::new`.
        unsafe { self.interfaces.as_ref() }
    }

    /// Looks up interface `guid`, returning null if the host does not provide it.
    pub fn interface(&self, guid: UnityInterfaceGuid) -> *mut core::ffi::c_void {
        // SAFETY: host-provided function table entry.
        unsafe { (self.registry().get_interface_split)(guid.high, guid.low) }
    }

    /// # Safety
    ///
    /// `guid` must identify an interface whose table layout is `T`.
    unsafe fn table<T>(&self, guid: UnityInterfaceGuid) -> Option<&T> {
        // SAFETY: layout is guaranteed by the caller; the table is host-owned and process-lived.
        unsafe { self.interface(guid).cast::<T>().as_ref() }
    }

    pub fn graphics(&self) -> Option<&IUnityGraphics> {
        // SAFETY: `IUNITY_GRAPHICS_GUID` names `IUnityGraphics`.
        unsafe { self.table(IUNITY_GRAPHICS_GUID) }
    }

    /// Registers `callback` for device lifecycle events. Returns `false` if the host has no
    /// graphics interface.
    pub fn register_device_event_callback(&self, callback: DeviceEventCallback) -> bool {
        let Some(graphics) = self.graphics() else {
            return false;
        };
        // SAFETY: host-provided function table entry.
        unsafe { (graphics.register_device_event_callback)(Some(callback)) };
        true
    }

    pub fn unregister_device_event_callback(&self, callback: DeviceEventCallback) {
        if let Some(graphics) = self.graphics() {
            // SAFETY: host-provided function table entry.
            unsafe { (graphics.unregister_device_event_callback)(Some(callback)) };
        }
    }
}

impl HostInterfaces for UnityHost {
    fn renderer(&self) -> GraphicsApi {
        match self.graphics() {
            // SAFETY: host-provided function table entry.
            Some(graphics) => GraphicsApi::from_raw(unsafe { (graphics.get_renderer)() }),
            None => GraphicsApi::Null,
        }
    }
}

#[cfg(windows)]
mod d3d11 {
    use cbr_core::DeviceSource;
    use cbr_d3d11::D3D11Device;

    use super::UnityHost;
    use crate::unity::{IUnityGraphicsD3D11, IUNITY_GRAPHICS_D3D11_GUID};

    impl DeviceSource<D3D11Device> for UnityHost {
        fn acquire_device(&self) -> Option<D3D11Device> {
            // SAFETY: `IUNITY_GRAPHICS_D3D11_GUID` names `IUnityGraphicsD3D11`.
            let d3d11 = unsafe { self.table::<IUnityGraphicsD3D11>(IUNITY_GRAPHICS_D3D11_GUID) }?;
            // SAFETY: the host returns null or its live device.
            unsafe { D3D11Device::from_raw_borrowed((d3d11.get_device)()) }
        }
    }
}
