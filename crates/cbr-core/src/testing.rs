//! Recording mock device for tests.
//!
//! [`MockDevice`] keeps its state behind an `Rc`, so clones (including the one handed out through
//! [`MockHost`]) observe the same textures, bound targets and command log.

use core::cell::{Cell, RefCell};
use core::ffi::c_void;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::device::{
    ClearFlags, DeviceSource, GfxContext, GfxDevice, NativeTexture, TextureDesc, ViewDesc,
    Viewport,
};
use crate::error::DeviceError;
use crate::format::DxgiFormat;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MockTexture {
    pub id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockRtv {
    pub id: u32,
    pub texture: MockTexture,
    pub desc: ViewDesc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockDsv {
    pub id: u32,
    pub texture: MockTexture,
    pub desc: ViewDesc,
}

/// Context calls that change GPU state, in issue order.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    ClearRenderTarget {
        view: u32,
        color: [f32; 4],
    },
    ClearDepthStencil {
        view: u32,
        flags: ClearFlags,
        depth: f32,
        stencil: u8,
    },
    SetRenderTargets {
        colors: Vec<Option<u32>>,
        depth: Option<u32>,
    },
    SetViewport(Viewport),
}

struct MockState {
    textures: RefCell<HashMap<u64, TextureDesc>>,
    rejected: RefCell<HashSet<u64>>,
    next_texture: Cell<u64>,
    next_view: Cell<u32>,
    view_requests: Cell<usize>,
    context_available: Cell<bool>,
    live_contexts: Cell<usize>,
    contexts_acquired: Cell<usize>,
    bound_colors: RefCell<Vec<Option<MockRtv>>>,
    bound_depth: RefCell<Option<MockDsv>>,
    viewport: Cell<Option<Viewport>>,
    commands: RefCell<Vec<Command>>,
}

#[derive(Clone)]
pub struct MockDevice {
    state: Rc<MockState>,
}

impl MockDevice {
    pub fn new() -> Self {
        Self {
            state: Rc::new(MockState {
                textures: RefCell::new(HashMap::new()),
                rejected: RefCell::new(HashSet::new()),
                next_texture: Cell::new(1),
                next_view: Cell::new(1),
                view_requests: Cell::new(0),
                context_available: Cell::new(true),
                live_contexts: Cell::new(0),
                contexts_acquired: Cell::new(0),
                bound_colors: RefCell::new(Vec::new()),
                bound_depth: RefCell::new(None),
                viewport: Cell::new(None),
                commands: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Creates a 2x multisampled texture of `format`.
    pub fn texture(&self, format: DxgiFormat) -> MockTexture {
        self.texture_with_samples(format, 2)
    }

    pub fn texture_with_samples(&self, format: DxgiFormat, sample_count: u32) -> MockTexture {
        let id = self.state.next_texture.get();
        self.state.next_texture.set(id + 1);
        self.state.textures.borrow_mut().insert(
            id,
            TextureDesc {
                format,
                sample_count,
            },
        );
        MockTexture { id }
    }

    /// View creations that reached the device, successful or not.
    pub fn view_requests(&self) -> usize {
        self.state.view_requests.get()
    }

    /// The pointer the host would hand across the plugin boundary for `texture`.
    pub fn native_handle(texture: &MockTexture) -> NativeTexture {
        // SAFETY: mock handles are never dereferenced; `import_texture` maps them back by address.
        unsafe { NativeTexture::from_raw(texture.id as usize as *mut c_void) }
            .expect("mock texture ids start at 1")
    }

    /// Makes every subsequent view request for `texture` fail.
    pub fn reject_views_of(&self, texture: &MockTexture) {
        self.state.rejected.borrow_mut().insert(texture.id);
    }

    /// Simulates the host destroying `texture`.
    pub fn destroy_texture(&self, texture: &MockTexture) {
        self.state.textures.borrow_mut().remove(&texture.id);
    }

    pub fn set_context_available(&self, available: bool) {
        self.state.context_available.set(available);
    }

    pub fn live_contexts(&self) -> usize {
        self.state.live_contexts.get()
    }

    pub fn contexts_acquired(&self) -> usize {
        self.state.contexts_acquired.get()
    }

    pub fn bind_viewport(&self, viewport: Viewport) {
        self.state.viewport.set(Some(viewport));
    }

    pub fn bound_viewport(&self) -> Option<Viewport> {
        self.state.viewport.get()
    }

    /// Binds views of the given textures as if the host had set them, returning
    /// [`MockDevice::bound_targets`].
    pub fn bind_host_targets(
        &self,
        colors: &[Option<&MockTexture>],
        depth: Option<&MockTexture>,
    ) -> (Vec<Option<u32>>, Option<u32>) {
        let colors = colors
            .iter()
            .map(|tex| {
                tex.map(|tex| MockRtv {
                    id: self.next_view_id(),
                    texture: tex.clone(),
                    desc: self.host_view_desc(tex),
                })
            })
            .collect();
        let depth = depth.map(|tex| MockDsv {
            id: self.next_view_id(),
            texture: tex.clone(),
            desc: self.host_view_desc(tex),
        });
        *self.state.bound_colors.borrow_mut() = colors;
        *self.state.bound_depth.borrow_mut() = depth;
        self.bound_targets()
    }

    /// Ids of the bound color views (trailing empty slots trimmed) and depth view.
    pub fn bound_targets(&self) -> (Vec<Option<u32>>, Option<u32>) {
        let mut colors: Vec<Option<u32>> = self
            .state
            .bound_colors
            .borrow()
            .iter()
            .map(|view| view.as_ref().map(|view| view.id))
            .collect();
        while colors.last() == Some(&None) {
            colors.pop();
        }
        let depth = self.state.bound_depth.borrow().as_ref().map(|view| view.id);
        (colors, depth)
    }

    pub fn take_commands(&self) -> Vec<Command> {
        core::mem::take(&mut *self.state.commands.borrow_mut())
    }

    fn next_view_id(&self) -> u32 {
        let id = self.state.next_view.get();
        self.state.next_view.set(id + 1);
        id
    }

    fn host_view_desc(&self, texture: &MockTexture) -> ViewDesc {
        let format = self
            .state
            .textures
            .borrow()
            .get(&texture.id)
            .map_or(DxgiFormat::UNKNOWN, |desc| desc.format);
        ViewDesc { format }
    }

    fn check_view_request(
        &self,
        texture: &MockTexture,
        desc: &ViewDesc,
    ) -> Result<(), DeviceError> {
        self.state.view_requests.set(self.state.view_requests.get() + 1);
        if !self.state.textures.borrow().contains_key(&texture.id) {
            return Err(DeviceError::Rejected(format!(
                "texture {} was destroyed",
                texture.id
            )));
        }
        if self.state.rejected.borrow().contains(&texture.id) {
            return Err(DeviceError::Rejected(format!(
                "view of texture {} rejected",
                texture.id
            )));
        }
        if desc.format.is_typeless() || desc.format == DxgiFormat::UNKNOWN {
            return Err(DeviceError::Rejected(format!(
                "format {} is not valid for a view",
                desc.format
            )));
        }
        Ok(())
    }
}

impl Default for MockDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for MockDevice {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MockDevice")
            .field("textures", &self.state.textures.borrow().len())
            .field("live_contexts", &self.state.live_contexts.get())
            .finish()
    }
}

impl GfxDevice for MockDevice {
    type Texture = MockTexture;
    type Rtv = MockRtv;
    type Dsv = MockDsv;
    type Context = MockContext;

    fn import_texture(&self, native: NativeTexture) -> Result<MockTexture, DeviceError> {
        let id = native.as_ptr() as usize as u64;
        if self.state.textures.borrow().contains_key(&id) {
            Ok(MockTexture { id })
        } else {
            Err(DeviceError::InvalidTexture)
        }
    }

    fn texture_desc(&self, texture: &MockTexture) -> TextureDesc {
        self.state
            .textures
            .borrow()
            .get(&texture.id)
            .copied()
            .unwrap_or(TextureDesc {
                format: DxgiFormat::UNKNOWN,
                sample_count: 0,
            })
    }

    fn create_render_target_view(
        &self,
        texture: &MockTexture,
        desc: &ViewDesc,
    ) -> Result<MockRtv, DeviceError> {
        self.check_view_request(texture, desc)?;
        Ok(MockRtv {
            id: self.next_view_id(),
            texture: texture.clone(),
            desc: *desc,
        })
    }

    fn create_depth_stencil_view(
        &self,
        texture: &MockTexture,
        desc: &ViewDesc,
    ) -> Result<MockDsv, DeviceError> {
        self.check_view_request(texture, desc)?;
        Ok(MockDsv {
            id: self.next_view_id(),
            texture: texture.clone(),
            desc: *desc,
        })
    }

    fn immediate_context(&self) -> Option<MockContext> {
        if !self.state.context_available.get() {
            return None;
        }
        self.state.live_contexts.set(self.state.live_contexts.get() + 1);
        self.state
            .contexts_acquired
            .set(self.state.contexts_acquired.get() + 1);
        Some(MockContext {
            state: Rc::clone(&self.state),
        })
    }
}

/// Immediate context handed out by [`MockDevice`]; tracks its own release on drop.
pub struct MockContext {
    state: Rc<MockState>,
}

impl Drop for MockContext {
    fn drop(&mut self) {
        self.state.live_contexts.set(self.state.live_contexts.get() - 1);
    }
}

impl GfxContext for MockContext {
    type Rtv = MockRtv;
    type Dsv = MockDsv;

    fn render_targets(&self, colors: &mut [Option<MockRtv>], depth: &mut Option<MockDsv>) {
        let bound = self.state.bound_colors.borrow();
        for (i, out) in colors.iter_mut().enumerate() {
            *out = bound.get(i).cloned().flatten();
        }
        *depth = self.state.bound_depth.borrow().clone();
    }

    fn set_render_targets(&self, colors: &[Option<MockRtv>], depth: Option<&MockDsv>) {
        *self.state.bound_colors.borrow_mut() = colors.to_vec();
        *self.state.bound_depth.borrow_mut() = depth.cloned();
        self.state.commands.borrow_mut().push(Command::SetRenderTargets {
            colors: colors
                .iter()
                .map(|view| view.as_ref().map(|view| view.id))
                .collect(),
            depth: depth.map(|view| view.id),
        });
    }

    fn clear_render_target_view(&self, view: &MockRtv, color: [f32; 4]) {
        self.state
            .commands
            .borrow_mut()
            .push(Command::ClearRenderTarget {
                view: view.id,
                color,
            });
    }

    fn clear_depth_stencil_view(
        &self,
        view: &MockDsv,
        flags: ClearFlags,
        depth: f32,
        stencil: u8,
    ) {
        self.state
            .commands
            .borrow_mut()
            .push(Command::ClearDepthStencil {
                view: view.id,
                flags,
                depth,
                stencil,
            });
    }

    fn viewport(&self) -> Option<Viewport> {
        self.state.viewport.get()
    }

    fn set_viewport(&self, viewport: Viewport) {
        self.state.viewport.set(Some(viewport));
        self.state
            .commands
            .borrow_mut()
            .push(Command::SetViewport(viewport));
    }
}

/// Host interface provider for tests. Hands out clones of one [`MockDevice`].
#[derive(Debug, Clone, Default)]
pub struct MockHost {
    device: Option<MockDevice>,
}

impl MockHost {
    pub fn new(device: MockDevice) -> Self {
        Self {
            device: Some(device),
        }
    }

    /// A host whose interface lookup fails (e.g. wrong graphics API).
    pub fn without_device() -> Self {
        Self { device: None }
    }
}

impl DeviceSource<MockDevice> for MockHost {
    fn acquire_device(&self) -> Option<MockDevice> {
        self.device.clone()
    }
}
