//! The two checkerboard buffer sets (one per frame parity) and their views.

use core::fmt;

use tracing::{debug, warn};

use crate::device::{GfxDevice, GBUFFER_SLOT_COUNT};
use crate::error::{CacheError, ViewError};
use crate::view::{create_depth_stencil_view, create_render_target_view};

/// Which of the two buffer sets a frame renders into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FrameParity {
    #[default]
    Even,
    Odd,
}

impl FrameParity {
    pub const fn index(self) -> usize {
        match self {
            Self::Even => 0,
            Self::Odd => 1,
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Even => Self::Odd,
            Self::Odd => Self::Even,
        }
    }
}

impl TryFrom<i32> for FrameParity {
    type Error = CacheError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Even),
            1 => Ok(Self::Odd),
            other => Err(CacheError::InvalidParity(other)),
        }
    }
}

/// Index of a color attachment in a buffer set, checked to be in `0..GBUFFER_SLOT_COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GBufferSlot(u8);

impl GBufferSlot {
    pub const DIFFUSE: Self = Self(0);
    pub const SPECULAR: Self = Self(1);
    pub const NORMAL: Self = Self(2);
    pub const EMISSION: Self = Self(3);
    /// Checkerboard coverage mask; cleared to opaque instead of the miss color.
    pub const MASK: Self = Self(4);

    pub const ALL: [Self; GBUFFER_SLOT_COUNT] = [
        Self::DIFFUSE,
        Self::SPECULAR,
        Self::NORMAL,
        Self::EMISSION,
        Self::MASK,
    ];

    pub fn new(index: usize) -> Option<Self> {
        (index < GBUFFER_SLOT_COUNT).then_some(Self(index as u8))
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub fn label(self) -> &'static str {
        match self.0 {
            0 => "diffuse",
            1 => "specular",
            2 => "normal",
            3 => "emission",
            _ => "shadow-mask",
        }
    }
}

impl TryFrom<i32> for GBufferSlot {
    type Error = CacheError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        usize::try_from(value)
            .ok()
            .and_then(Self::new)
            .ok_or(CacheError::InvalidSlot(value))
    }
}

impl fmt::Display for GBufferSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.0, self.label())
    }
}

/// One parity's worth of targets: five color attachments plus a depth-stencil attachment.
pub struct BufferSet<D: GfxDevice> {
    textures: [Option<D::Texture>; GBUFFER_SLOT_COUNT],
    color_views: [Option<D::Rtv>; GBUFFER_SLOT_COUNT],
    depth_texture: Option<D::Texture>,
    depth_view: Option<D::Dsv>,
}

impl<D: GfxDevice> BufferSet<D> {
    fn new() -> Self {
        Self {
            textures: Default::default(),
            color_views: Default::default(),
            depth_texture: None,
            depth_view: None,
        }
    }

    pub fn texture(&self, slot: GBufferSlot) -> Option<&D::Texture> {
        self.textures[slot.index()].as_ref()
    }

    pub fn color_view(&self, slot: GBufferSlot) -> Option<&D::Rtv> {
        self.color_views[slot.index()].as_ref()
    }

    /// All color views in slot order; empty slots are `None`.
    pub fn color_views(&self) -> &[Option<D::Rtv>; GBUFFER_SLOT_COUNT] {
        &self.color_views
    }

    pub fn depth_texture(&self) -> Option<&D::Texture> {
        self.depth_texture.as_ref()
    }

    pub fn depth_view(&self) -> Option<&D::Dsv> {
        self.depth_view.as_ref()
    }

    /// `true` once every color slot and the depth slot hold a view.
    pub fn is_complete(&self) -> bool {
        self.color_views.iter().all(Option::is_some) && self.depth_view.is_some()
    }

    fn release(&mut self) {
        self.color_views = Default::default();
        self.depth_view = None;
        self.textures = Default::default();
        self.depth_texture = None;
    }
}

impl<D: GfxDevice> fmt::Debug for BufferSet<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let present = |views: &[Option<D::Rtv>]| -> [bool; GBUFFER_SLOT_COUNT] {
            let mut out = [false; GBUFFER_SLOT_COUNT];
            for (flag, view) in out.iter_mut().zip(views) {
                *flag = view.is_some();
            }
            out
        };
        f.debug_struct("BufferSet")
            .field("color_views", &present(&self.color_views))
            .field("depth_view", &self.depth_view.is_some())
            .finish()
    }
}

/// Both parities' buffer sets.
pub struct DualBufferCache<D: GfxDevice> {
    sets: [BufferSet<D>; 2],
}

impl<D: GfxDevice> DualBufferCache<D> {
    pub fn new() -> Self {
        Self {
            sets: [BufferSet::new(), BufferSet::new()],
        }
    }

    pub fn set(&self, parity: FrameParity) -> &BufferSet<D> {
        &self.sets[parity.index()]
    }

    /// Stores `texture` in `parity`/`slot` and builds its render-target view.
    ///
    /// The texture is stored even when view creation fails; the slot's view is then left empty
    /// so a stale view of a previous texture can never be bound.
    pub fn cache_color_texture(
        &mut self,
        device: &D,
        texture: D::Texture,
        parity: FrameParity,
        slot: GBufferSlot,
    ) -> Result<(), ViewError> {
        let set = &mut self.sets[parity.index()];
        let view = create_render_target_view(device, &texture);
        set.textures[slot.index()] = Some(texture);
        match view {
            Ok(view) => {
                set.color_views[slot.index()] = Some(view);
                debug!(?parity, %slot, "cached G-buffer render target");
                Ok(())
            }
            Err(err) => {
                set.color_views[slot.index()] = None;
                warn!(?parity, %slot, error = %err, "G-buffer render-target view creation failed");
                Err(err)
            }
        }
    }

    /// Stores `texture` as the depth buffer of `parity` and builds its depth-stencil view.
    pub fn cache_depth_texture(
        &mut self,
        device: &D,
        texture: D::Texture,
        parity: FrameParity,
    ) -> Result<(), ViewError> {
        let set = &mut self.sets[parity.index()];
        let view = create_depth_stencil_view(device, &texture);
        set.depth_texture = Some(texture);
        match view {
            Ok(view) => {
                set.depth_view = Some(view);
                debug!(?parity, "cached depth buffer");
                Ok(())
            }
            Err(err) => {
                set.depth_view = None;
                warn!(?parity, error = %err, "depth-stencil view creation failed");
                Err(err)
            }
        }
    }

    /// Drops every view and texture reference of both parities. Idempotent.
    pub fn release_all(&mut self) {
        for set in &mut self.sets {
            set.release();
        }
    }
}

impl<D: GfxDevice> Default for DualBufferCache<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: GfxDevice> fmt::Debug for DualBufferCache<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DualBufferCache")
            .field("even", &self.sets[0])
            .field("odd", &self.sets[1])
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::DxgiFormat;
    use crate::testing::MockDevice;

    #[test]
    fn slot_and_parity_bounds_are_checked() {
        assert_eq!(GBufferSlot::try_from(4), Ok(GBufferSlot::MASK));
        assert_eq!(GBufferSlot::try_from(5), Err(CacheError::InvalidSlot(5)));
        assert_eq!(GBufferSlot::try_from(-1), Err(CacheError::InvalidSlot(-1)));
        assert_eq!(GBufferSlot::new(GBUFFER_SLOT_COUNT), None);

        assert_eq!(FrameParity::try_from(0), Ok(FrameParity::Even));
        assert_eq!(FrameParity::try_from(1), Ok(FrameParity::Odd));
        assert_eq!(FrameParity::try_from(2), Err(CacheError::InvalidParity(2)));
    }

    #[test]
    fn parity_toggles_and_wraps() {
        assert_eq!(FrameParity::Even.toggled(), FrameParity::Odd);
        assert_eq!(FrameParity::Odd.toggled(), FrameParity::Even);
        assert_eq!(FrameParity::default(), FrameParity::Even);
    }

    #[test]
    fn caches_are_independent_per_parity() {
        let device = MockDevice::new();
        let mut cache = DualBufferCache::new();
        let tex = device.texture(DxgiFormat::R8G8B8A8_TYPELESS);

        cache
            .cache_color_texture(&device, tex.clone(), FrameParity::Odd, GBufferSlot::NORMAL)
            .unwrap();

        assert!(cache.set(FrameParity::Odd).color_view(GBufferSlot::NORMAL).is_some());
        assert!(cache.set(FrameParity::Even).color_view(GBufferSlot::NORMAL).is_none());
        assert_eq!(
            cache.set(FrameParity::Odd).texture(GBufferSlot::NORMAL),
            Some(&tex)
        );
    }

    #[test]
    fn failed_view_still_stores_texture_and_clears_stale_view() {
        let device = MockDevice::new();
        let mut cache = DualBufferCache::new();
        let good = device.texture(DxgiFormat::R8G8B8A8_TYPELESS);
        let bad = device.texture(DxgiFormat::R8G8B8A8_TYPELESS);
        device.reject_views_of(&bad);

        cache
            .cache_color_texture(&device, good, FrameParity::Even, GBufferSlot::DIFFUSE)
            .unwrap();
        let err = cache
            .cache_color_texture(&device, bad.clone(), FrameParity::Even, GBufferSlot::DIFFUSE)
            .unwrap_err();

        assert_eq!(err.format, DxgiFormat::R8G8B8A8_UNORM);
        let set = cache.set(FrameParity::Even);
        assert_eq!(set.texture(GBufferSlot::DIFFUSE), Some(&bad));
        assert!(set.color_view(GBufferSlot::DIFFUSE).is_none());
    }

    #[test]
    fn depth_cache_builds_depth_view() {
        let device = MockDevice::new();
        let mut cache = DualBufferCache::new();
        let depth = device.texture(DxgiFormat::R32G8X24_TYPELESS);

        cache
            .cache_depth_texture(&device, depth, FrameParity::Even)
            .unwrap();
        let view = cache.set(FrameParity::Even).depth_view().unwrap();
        assert_eq!(view.desc.format, DxgiFormat::D32_FLOAT_S8X24_UINT);
        assert!(cache.set(FrameParity::Odd).depth_view().is_none());
    }

    #[test]
    fn release_all_empties_both_sets_and_is_idempotent() {
        let device = MockDevice::new();
        let mut cache = DualBufferCache::new();
        for parity in [FrameParity::Even, FrameParity::Odd] {
            for slot in GBufferSlot::ALL {
                let tex = device.texture(DxgiFormat::R8G8B8A8_TYPELESS);
                cache.cache_color_texture(&device, tex, parity, slot).unwrap();
            }
            let depth = device.texture(DxgiFormat::R32G8X24_TYPELESS);
            cache.cache_depth_texture(&device, depth, parity).unwrap();
            assert!(cache.set(parity).is_complete());
        }

        cache.release_all();
        cache.release_all();

        for parity in [FrameParity::Even, FrameParity::Odd] {
            let set = cache.set(parity);
            assert!(set.color_views().iter().all(Option::is_none));
            assert!(set.depth_view().is_none());
            assert!(set.depth_texture().is_none());
        }
    }
}
