// renderer/recording.rs
use crate::renderer::state::{
    ClearChannel, ClearPolicy, CullMode, DepthStencilMode, DepthStencilTarget, DrawCall,
    ImagespaceEffect, RenderTarget, RendererState, ResourceId,
};

/// A single call made against the renderer facade.
#[derive(Debug, Clone, PartialEq)]
pub enum StateCall {
    BeginEvent(String),
    EndEvent,
    DepthStencilMode(DepthStencilMode),
    AlphaTestRef { enabled: bool, reference: f32 },
    BlendSlot(u32),
    BlendMode(u32),
    CullMode(CullMode),
    ApplyDepthShift,
    ResetDepthShift,
    CopyResource { dst: ResourceId, src: ResourceId },
    ClearDepthStencil(ClearChannel),
    ClearColor([f32; 4]),
    BindRenderTarget {
        slot: u32,
        target: Option<RenderTarget>,
        clear: ClearPolicy,
    },
    DepthStencilTarget {
        target: Option<DepthStencilTarget>,
        clear: ClearPolicy,
    },
    RestoreRenderTargets,
    Imagespace(ImagespaceEffect),
    Draw(DrawCall),
}

/// Facade that records calls instead of touching a device. Used for pass
/// captures and in tests.
#[derive(Debug)]
pub struct RecordingState {
    calls: Vec<StateCall>,
    depth_mode: DepthStencilMode,
    depth_target: DepthStencilTarget,
    event_depth: usize,
}

impl RecordingState {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            depth_mode: DepthStencilMode::Test,
            depth_target: DepthStencilTarget::Main,
            event_depth: 0,
        }
    }

    pub fn calls(&self) -> &[StateCall] {
        &self.calls
    }

    pub fn draws(&self) -> Vec<DrawCall> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                StateCall::Draw(draw) => Some(*draw),
                _ => None,
            })
            .collect()
    }

    /// Names of every opened event, in order.
    pub fn events(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                StateCall::BeginEvent(name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn depth_modes(&self) -> Vec<DepthStencilMode> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                StateCall::DepthStencilMode(mode) => Some(*mode),
                _ => None,
            })
            .collect()
    }

    pub fn depth_mode(&self) -> DepthStencilMode {
        self.depth_mode
    }

    /// Index of the first recorded call matching `predicate`.
    pub fn position(&self, predicate: impl Fn(&StateCall) -> bool) -> Option<usize> {
        self.calls.iter().position(predicate)
    }

    pub fn contains(&self, call: &StateCall) -> bool {
        self.calls.contains(call)
    }

    /// True when every opened event was closed.
    pub fn events_balanced(&self) -> bool {
        self.event_depth == 0
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl Default for RecordingState {
    fn default() -> Self {
        Self::new()
    }
}

impl RendererState for RecordingState {
    fn begin_event(&mut self, name: &str) {
        self.event_depth += 1;
        self.calls.push(StateCall::BeginEvent(name.to_owned()));
    }

    fn end_event(&mut self) {
        self.event_depth = self.event_depth.saturating_sub(1);
        self.calls.push(StateCall::EndEvent);
    }

    fn set_depth_stencil_mode(&mut self, mode: DepthStencilMode) {
        self.depth_mode = mode;
        self.calls.push(StateCall::DepthStencilMode(mode));
    }

    fn set_alpha_test_ref(&mut self, enabled: bool, reference: f32) {
        self.calls.push(StateCall::AlphaTestRef { enabled, reference });
    }

    fn set_blend_slot(&mut self, slot: u32) {
        self.calls.push(StateCall::BlendSlot(slot));
    }

    fn set_blend_mode(&mut self, mode: u32) {
        self.calls.push(StateCall::BlendMode(mode));
    }

    fn set_cull_mode(&mut self, mode: CullMode) {
        self.calls.push(StateCall::CullMode(mode));
    }

    fn apply_scene_depth_shift(&mut self) {
        self.calls.push(StateCall::ApplyDepthShift);
    }

    fn reset_scene_depth_shift(&mut self) {
        self.calls.push(StateCall::ResetDepthShift);
    }

    fn copy_resource(&mut self, dst: ResourceId, src: ResourceId) {
        self.calls.push(StateCall::CopyResource { dst, src });
    }

    fn clear_depth_stencil(&mut self, channel: ClearChannel) {
        self.calls.push(StateCall::ClearDepthStencil(channel));
    }

    fn set_clear_color(&mut self, color: [f32; 4]) {
        self.calls.push(StateCall::ClearColor(color));
    }

    fn bind_render_target_slot(&mut self, slot: u32, target: Option<RenderTarget>, clear: ClearPolicy) {
        self.calls
            .push(StateCall::BindRenderTarget { slot, target, clear });
    }

    fn set_depth_stencil_target(&mut self, target: Option<DepthStencilTarget>, clear: ClearPolicy) {
        if let Some(target) = target {
            self.depth_target = target;
        }
        self.calls.push(StateCall::DepthStencilTarget { target, clear });
    }

    fn current_depth_stencil_target(&self) -> DepthStencilTarget {
        self.depth_target
    }

    fn restore_render_targets(&mut self) {
        self.calls.push(StateCall::RestoreRenderTargets);
    }

    fn run_imagespace(&mut self, effect: ImagespaceEffect) {
        self.calls.push(StateCall::Imagespace(effect));
    }

    fn draw(&mut self, call: &DrawCall) {
        self.calls.push(StateCall::Draw(*call));
    }
}
