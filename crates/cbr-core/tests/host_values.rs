//! Values that cross the host boundary: format ids, parity/slot integers, env config, stats JSON.

use cbr_core::{
    resolve_typed_format, CacheError, CbrConfig, CbrStats, ConfigError, DeviceEvent, DxgiFormat,
    FrameParity, GBufferSlot, GraphicsApi,
};
use pretty_assertions::assert_eq;

#[test]
fn host_gbuffer_formats_resolve_to_renderable_formats() {
    // Diffuse, specular, normal, emission, shadow mask, then depth.
    let storage = [27u32, 27, 23, 9, 27, 19];
    let resolved: Vec<u32> = storage
        .iter()
        .map(|&raw| resolve_typed_format(DxgiFormat(raw)).raw())
        .collect();
    assert_eq!(resolved, vec![28, 28, 24, 10, 28, 20]);
}

#[test]
fn resolution_is_stable_for_any_raw_value() {
    for raw in 0..=200u32 {
        let format = DxgiFormat(raw);
        let once = resolve_typed_format(format);
        assert_eq!(resolve_typed_format(format), once);
        if !matches!(raw, 9 | 19 | 23 | 27) {
            assert_eq!(once, format, "DXGI_FORMAT({raw}) should pass through");
        }
    }
}

#[test]
fn host_integers_map_to_checked_types() {
    let slots: Vec<String> = (0..5i32)
        .map(|i| GBufferSlot::try_from(i).unwrap().label().to_owned())
        .collect();
    assert_eq!(
        slots,
        vec!["diffuse", "specular", "normal", "emission", "shadow-mask"]
    );
    assert_eq!(
        GBufferSlot::try_from(i32::MAX),
        Err(CacheError::InvalidSlot(i32::MAX))
    );
    assert_eq!(FrameParity::try_from(-1), Err(CacheError::InvalidParity(-1)));

    assert_eq!(GraphicsApi::from_raw(2), GraphicsApi::D3D11);
    assert_eq!(DeviceEvent::from_raw(3), Some(DeviceEvent::AfterReset));
}

#[test]
fn error_messages_name_the_offending_value() {
    assert_eq!(
        CacheError::InvalidSlot(7).to_string(),
        "G-buffer slot 7 is out of range (expected 0..5)"
    );
    let err = CbrConfig::from_lookup(|_| Some("left".into())).unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid value \"left\" for env var CBR_VIEWPORT_SHIFT_X"
    );
    assert!(matches!(err, ConfigError::InvalidEnv { .. }));
}

#[test]
fn stats_json_is_stable() {
    let stats = CbrStats::new();
    stats.inc_redirects();
    stats.inc_restores();
    stats.inc_viewport_shifts();
    assert_eq!(
        stats.to_json(),
        "{\"redirects\":1,\"redirects_skipped\":0,\"restores\":1,\"restores_skipped\":0,\
         \"viewport_shifts\":1,\"views_created\":0,\"view_failures\":0,\"releases\":0}"
    );
}
