//! Per-frame swap of the host's G-buffer targets for the checkerboard buffer sets.
//!
//! Each `redirect` snapshots whatever the host has bound, clears and binds the buffer set of the
//! current [`FrameParity`], and flips the parity. Odd frames additionally shift the viewport half
//! a pixel to the right so the two low-resolution frames interleave into one full-resolution
//! checkerboard. `restore` rebinds the snapshot.

use core::fmt;

use tracing::{debug, trace};

use crate::cache::{DualBufferCache, FrameParity, GBufferSlot};
use crate::config::CbrConfig;
use crate::device::{ClearFlags, GfxContext, GfxDevice, GBUFFER_SLOT_COUNT};
use crate::stats::CbrStats;

/// The host's bound targets captured by the last `redirect`.
pub struct Snapshot<D: GfxDevice> {
    colors: [Option<D::Rtv>; GBUFFER_SLOT_COUNT],
    depth: Option<D::Dsv>,
}

impl<D: GfxDevice> Snapshot<D> {
    fn new() -> Self {
        Self {
            colors: Default::default(),
            depth: None,
        }
    }

    pub fn colors(&self) -> &[Option<D::Rtv>; GBUFFER_SLOT_COUNT] {
        &self.colors
    }

    pub fn depth(&self) -> Option<&D::Dsv> {
        self.depth.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.iter().all(Option::is_none) && self.depth.is_none()
    }

    fn capture(&mut self, ctx: &D::Context) {
        // Drop the previous capture first so its references are released before re-filling.
        self.clear();
        ctx.render_targets(&mut self.colors, &mut self.depth);
    }

    fn clear(&mut self) {
        self.colors = Default::default();
        self.depth = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectOutcome {
    /// The buffer set of `parity` was cleared and bound.
    Bound {
        parity: FrameParity,
        viewport_shifted: bool,
    },
    /// No immediate context (or no device); nothing happened and the parity is unchanged.
    Skipped,
}

/// Parity state machine plus the host-target snapshot.
pub struct FrameRedirector<D: GfxDevice> {
    parity: FrameParity,
    snapshot: Snapshot<D>,
    config: CbrConfig,
}

impl<D: GfxDevice> FrameRedirector<D> {
    pub fn new(config: CbrConfig) -> Self {
        Self {
            parity: FrameParity::Even,
            snapshot: Snapshot::new(),
            config,
        }
    }

    /// Parity the next `redirect` will bind.
    pub fn parity(&self) -> FrameParity {
        self.parity
    }

    pub fn snapshot(&self) -> &Snapshot<D> {
        &self.snapshot
    }

    pub fn config(&self) -> &CbrConfig {
        &self.config
    }

    fn clear_color(&self, slot: GBufferSlot) -> [f32; 4] {
        if slot == GBufferSlot::MASK {
            self.config.mask_color
        } else {
            self.config.miss_color
        }
    }

    pub fn redirect(
        &mut self,
        device: &D,
        cache: &DualBufferCache<D>,
        stats: &CbrStats,
    ) -> RedirectOutcome {
        let Some(ctx) = device.immediate_context() else {
            trace!("redirect skipped: immediate context unavailable");
            stats.inc_redirects_skipped();
            return RedirectOutcome::Skipped;
        };

        self.snapshot.capture(&ctx);

        let parity = self.parity;
        let mut viewport_shifted = false;
        if parity == FrameParity::Odd {
            // Shift relative to whatever viewport is bound right now, not a stored baseline.
            match ctx.viewport() {
                Some(mut viewport) => {
                    viewport.top_left_x += self.config.viewport_shift_x;
                    ctx.set_viewport(viewport);
                    viewport_shifted = true;
                    stats.inc_viewport_shifts();
                }
                None => debug!("odd frame without a bound viewport; skipping sub-pixel shift"),
            }
        }

        let set = cache.set(parity);
        for slot in GBufferSlot::ALL {
            match set.color_view(slot) {
                Some(view) => ctx.clear_render_target_view(view, self.clear_color(slot)),
                None => trace!(?parity, %slot, "empty G-buffer slot; bound as null"),
            }
        }
        if let Some(depth) = set.depth_view() {
            ctx.clear_depth_stencil_view(
                depth,
                ClearFlags::DEPTH | ClearFlags::STENCIL,
                self.config.depth_clear,
                self.config.stencil_clear,
            );
        }
        ctx.set_render_targets(set.color_views(), set.depth_view());

        self.parity = parity.toggled();
        stats.inc_redirects();
        RedirectOutcome::Bound {
            parity,
            viewport_shifted,
        }
    }

    /// Rebinds the targets captured by the last `redirect`. Returns `false` if no context was
    /// available.
    pub fn restore(&self, device: &D, stats: &CbrStats) -> bool {
        let Some(ctx) = device.immediate_context() else {
            trace!("restore skipped: immediate context unavailable");
            stats.inc_restores_skipped();
            return false;
        };
        ctx.set_render_targets(&self.snapshot.colors, self.snapshot.depth.as_ref());
        stats.inc_restores();
        true
    }

    /// Back to the initial state: parity Even, snapshot empty.
    pub fn reset(&mut self) {
        self.parity = FrameParity::Even;
        self.snapshot.clear();
    }
}

impl<D: GfxDevice> fmt::Debug for FrameRedirector<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameRedirector")
            .field("parity", &self.parity)
            .field("snapshot_empty", &self.snapshot.is_empty())
            .field("config", &self.config)
            .finish()
    }
}
