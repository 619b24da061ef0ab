//! Drives the exported symbols against a fake host registry that has a graphics interface but
//! hands out no device.

use core::ffi::c_void;
use std::sync::atomic::{AtomicUsize, Ordering};

use cbr::ffi::{
    CacheNativeDepth, CacheNativeGBuffer, GetCbrStatsJson, GetRenderEventFunc, ReleaseNativeCBR,
    UnityPluginLoad, UnityPluginUnload,
};
use cbr::unity::{
    DeviceEventCallback, IUnityGraphics, IUnityInterfaces, UnityInterfaceGuid,
    IUNITY_GRAPHICS_GUID,
};

static REGISTERED: AtomicUsize = AtomicUsize::new(0);
static UNREGISTERED: AtomicUsize = AtomicUsize::new(0);

/// `kUnityGfxRendererD3D11`.
unsafe extern "system" fn get_renderer() -> i32 {
    2
}

unsafe extern "system" fn register(callback: Option<DeviceEventCallback>) {
    assert!(callback.is_some());
    REGISTERED.fetch_add(1, Ordering::SeqCst);
}

unsafe extern "system" fn unregister(callback: Option<DeviceEventCallback>) {
    assert!(callback.is_some());
    UNREGISTERED.fetch_add(1, Ordering::SeqCst);
}

unsafe extern "system" fn reserve_event_id_range(_count: i32) -> i32 {
    0
}

static GRAPHICS: IUnityGraphics = IUnityGraphics {
    get_renderer,
    register_device_event_callback: register,
    unregister_device_event_callback: unregister,
    reserve_event_id_range,
};

unsafe extern "system" fn get_interface(guid: UnityInterfaceGuid) -> *mut c_void {
    unsafe { get_interface_split(guid.high, guid.low) }
}

unsafe extern "system" fn register_interface(_guid: UnityInterfaceGuid, _ptr: *mut c_void) {}

unsafe extern "system" fn get_interface_split(high: u64, low: u64) -> *mut c_void {
    if UnityInterfaceGuid::new(high, low) == IUNITY_GRAPHICS_GUID {
        &GRAPHICS as *const IUnityGraphics as *mut c_void
    } else {
        core::ptr::null_mut()
    }
}

unsafe extern "system" fn register_interface_split(_high: u64, _low: u64, _ptr: *mut c_void) {}

fn stats_json() -> String {
    let len = unsafe { GetCbrStatsJson(core::ptr::null_mut(), 0) };
    let mut buf = vec![0u8; len + 1];
    let written = unsafe { GetCbrStatsJson(buf.as_mut_ptr(), buf.len()) };
    assert_eq!(written, len);
    assert_eq!(buf[len], 0);
    String::from_utf8(buf[..len].to_vec()).unwrap()
}

#[test]
fn exports_without_a_device_fail_softly() {
    // Before load every entry point is inert.
    let mut dummy = 0u32;
    let texture = &mut dummy as *mut u32 as *mut c_void;
    assert!(!unsafe { CacheNativeGBuffer(texture, 0, 0) });
    ReleaseNativeCBR();

    let mut registry = IUnityInterfaces {
        get_interface,
        register_interface,
        get_interface_split,
        register_interface_split,
    };
    unsafe { UnityPluginLoad(&mut registry) };
    assert_eq!(REGISTERED.load(Ordering::SeqCst), 1);

    assert!(!unsafe { CacheNativeGBuffer(texture, 0, 0) });
    assert!(!unsafe { CacheNativeGBuffer(texture, 0, 9) });
    assert!(!unsafe { CacheNativeGBuffer(core::ptr::null_mut(), 1, 0) });
    assert!(!unsafe { CacheNativeDepth(texture, 1) });
    assert!(!unsafe { CacheNativeDepth(texture, -1) });

    let render_event = GetRenderEventFunc();
    for event_id in [0, 1, 42] {
        unsafe { render_event(event_id) };
    }
    ReleaseNativeCBR();

    let json = stats_json();
    assert!(json.contains("\"redirects\":0"), "{json}");

    // Truncation keeps the buffer NUL-terminated.
    let mut small = [0xffu8; 4];
    let full = unsafe { GetCbrStatsJson(small.as_mut_ptr(), small.len()) };
    assert_eq!(full, json.len());
    assert_eq!(&small, b"{\"r\0");

    UnityPluginUnload();
    assert_eq!(UNREGISTERED.load(Ordering::SeqCst), 1);
    assert!(!unsafe { CacheNativeDepth(texture, 0) });

    // A second unload is a no-op.
    UnityPluginUnload();
    assert_eq!(UNREGISTERED.load(Ordering::SeqCst), 1);
}
