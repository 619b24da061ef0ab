//! Symbols exported to the host.
//!
//! The host gives entry points no context pointer, so the single [`Plugin`] lives in a
//! process-wide slot. Every entry point takes the lock for its full duration.

use core::ffi::c_void;
use std::sync::{Mutex, MutexGuard, PoisonError};

use cbr_core::{CbrConfig, CbrStatsSnapshot, DeviceEvent};
use tracing::{debug, warn};

use crate::host::UnityHost;
use crate::logging;
use crate::plugin::{select_backend, Plugin};
use crate::unity::{IUnityInterfaces, RenderingEvent};

struct PluginSlot(Mutex<Option<Plugin<UnityHost>>>);

// SAFETY: all access goes through the mutex. Backends hold host device objects that the host
// allows to be used from its main and render threads.
unsafe impl Sync for PluginSlot {}

static PLUGIN: PluginSlot = PluginSlot(Mutex::new(None));

fn lock() -> MutexGuard<'static, Option<Plugin<UnityHost>>> {
    PLUGIN.0.lock().unwrap_or_else(PoisonError::into_inner)
}

fn with_plugin<R>(default: R, f: impl FnOnce(&mut Plugin<UnityHost>) -> R) -> R {
    match lock().as_mut() {
        Some(plugin) => f(plugin),
        None => {
            debug!("plugin entry point called before load");
            default
        }
    }
}

unsafe extern "system" fn on_device_event(event_type: i32) {
    let Some(event) = DeviceEvent::from_raw(event_type) else {
        debug!(event_type, "ignoring unknown device event");
        return;
    };
    with_plugin((), |plugin| plugin.on_device_event(event));
}

unsafe extern "system" fn on_render_event(event_id: i32) {
    with_plugin((), |plugin| plugin.render_event(event_id));
}

/// Called by the host right after loading the library.
///
/// # Safety
///
/// `interfaces` must be null or the host's interface registry, valid until [`UnityPluginUnload`].
#[no_mangle]
pub unsafe extern "system" fn UnityPluginLoad(interfaces: *mut IUnityInterfaces) {
    logging::init();

    // SAFETY: forwarded from the caller.
    let Some(host) = (unsafe { UnityHost::new(interfaces) }) else {
        warn!("plugin loaded without an interface registry");
        return;
    };
    let config = CbrConfig::from_env().unwrap_or_else(|err| {
        warn!(%err, "invalid configuration; using defaults");
        CbrConfig::default()
    });

    *lock() = Some(Plugin::new(host, config, select_backend));
    if !host.register_device_event_callback(on_device_event) {
        warn!("host has no graphics interface; device events will not arrive");
    }
    // The device may already exist; replay the event the host sent before we registered.
    with_plugin((), |plugin| plugin.on_device_event(DeviceEvent::Initialize));
}

#[no_mangle]
pub extern "system" fn UnityPluginUnload() {
    let Some(mut plugin) = lock().take() else {
        return;
    };
    plugin.host().unregister_device_event_callback(on_device_event);
    plugin.on_device_event(DeviceEvent::Shutdown);
}

/// Caches G-buffer texture `slot` (0..=4) of buffer set `frame` (0 or 1).
///
/// # Safety
///
/// `texture` must be null or a native texture of the host's current graphics device.
#[no_mangle]
pub unsafe extern "C" fn CacheNativeGBuffer(texture: *mut c_void, frame: i32, slot: i32) -> bool {
    with_plugin(false, |plugin| match plugin.cache_color(texture, frame, slot) {
        Ok(()) => true,
        Err(err) => {
            warn!(%err, frame, slot, "CacheNativeGBuffer failed");
            false
        }
    })
}

/// Caches the depth texture of buffer set `frame` (0 or 1).
///
/// # Safety
///
/// `texture` must be null or a native texture of the host's current graphics device.
#[no_mangle]
pub unsafe extern "C" fn CacheNativeDepth(texture: *mut c_void, frame: i32) -> bool {
    with_plugin(false, |plugin| match plugin.cache_depth(texture, frame) {
        Ok(()) => true,
        Err(err) => {
            warn!(%err, frame, "CacheNativeDepth failed");
            false
        }
    })
}

#[no_mangle]
pub extern "C" fn ReleaseNativeCBR() {
    with_plugin((), Plugin::release_all);
}

#[no_mangle]
pub extern "C" fn GetRenderEventFunc() -> RenderingEvent {
    on_render_event
}

/// Writes the telemetry counters as NUL-terminated JSON into `buf` (truncating to `len - 1`
/// bytes) and returns the full JSON length. Pass a null `buf` to query the length.
///
/// # Safety
///
/// A non-null `buf` must be writable for `len` bytes.
#[no_mangle]
pub unsafe extern "C" fn GetCbrStatsJson(buf: *mut u8, len: usize) -> usize {
    let json = with_plugin(CbrStatsSnapshot::default(), |plugin| plugin.stats()).to_json();
    if !buf.is_null() && len > 0 {
        let n = json.len().min(len - 1);
        // SAFETY: `buf` is writable for `len > n` bytes per the caller contract.
        unsafe {
            core::ptr::copy_nonoverlapping(json.as_ptr(), buf, n);
            *buf.add(n) = 0;
        }
    }
    json.len()
}
