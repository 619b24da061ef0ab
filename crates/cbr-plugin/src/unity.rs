//! Host interface tables, laid out as in `IUnityInterface.h` / `IUnityGraphics.h`.
//!
//! Only the prefix of each table that the plugin calls into is declared; the host owns the tables
//! and they are only ever accessed through pointers it hands out.

use core::ffi::c_void;

/// 128-bit interface id, split into two halves.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnityInterfaceGuid {
    pub high: u64,
    pub low: u64,
}

impl UnityInterfaceGuid {
    pub const fn new(high: u64, low: u64) -> Self {
        Self { high, low }
    }
}

pub const IUNITY_GRAPHICS_GUID: UnityInterfaceGuid =
    UnityInterfaceGuid::new(0x7CBA0A9CA4DDB544, 0x8C5AD4926EB17B11);

pub const IUNITY_GRAPHICS_D3D11_GUID: UnityInterfaceGuid =
    UnityInterfaceGuid::new(0xAAB37EF87A87D748, 0xBF76967F07EFB177);

/// `IUnityInterfaces`: the registry the host passes to `UnityPluginLoad`.
#[repr(C)]
pub struct IUnityInterfaces {
    pub get_interface: unsafe extern "system" fn(guid: UnityInterfaceGuid) -> *mut c_void,
    pub register_interface: unsafe extern "system" fn(guid: UnityInterfaceGuid, ptr: *mut c_void),
    pub get_interface_split: unsafe extern "system" fn(high: u64, low: u64) -> *mut c_void,
    pub register_interface_split:
        unsafe extern "system" fn(high: u64, low: u64, ptr: *mut c_void),
}

/// Device lifecycle callback (`IUnityGraphicsDeviceEventCallback`).
pub type DeviceEventCallback = unsafe extern "system" fn(event_type: i32);

/// Render-thread callback handed out by `GetRenderEventFunc` (`UnityRenderingEvent`).
pub type RenderingEvent = unsafe extern "system" fn(event_id: i32);

#[repr(C)]
pub struct IUnityGraphics {
    /// Returns a `UnityGfxRenderer` value.
    pub get_renderer: unsafe extern "system" fn() -> i32,
    pub register_device_event_callback:
        unsafe extern "system" fn(callback: Option<DeviceEventCallback>),
    pub unregister_device_event_callback:
        unsafe extern "system" fn(callback: Option<DeviceEventCallback>),
    pub reserve_event_id_range: unsafe extern "system" fn(count: i32) -> i32,
}

#[repr(C)]
pub struct IUnityGraphicsD3D11 {
    /// Returns the host's `ID3D11Device*` without adding a reference.
    pub get_device: unsafe extern "system" fn() -> *mut c_void,
}
