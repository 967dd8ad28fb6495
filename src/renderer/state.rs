// renderer/state.rs
use crate::renderer::flags::RenderFlags;
use crate::renderer::technique::TechniqueId;
use crate::scene::ObjectId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepthStencilMode {
    Disabled,
    Test,
    Write,
    TestWrite,
    TestEqual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CullMode {
    None,
    Back,
    Front,
}

/// Color targets the accumulator binds directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderTarget {
    Main,
    NormalTaaMaskSsrMask,
    MotionVector,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DepthStencilTarget {
    Main,
    MainCopy,
    Shadowmap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceId {
    DepthStencil(DepthStencilTarget),
    /// Depth copy consumed by screen-space reflections.
    SsrDepth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClearPolicy {
    Clear,
    NoClear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClearChannel {
    Depth,
    Stencil,
    DepthStencil,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImagespaceEffect {
    /// Screen-space reflections plus the downsample chain feeding lighting.
    ReflectionsAndDownsample,
}

/// One emitted draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DrawCall {
    pub technique: TechniqueId,
    pub object: ObjectId,
    pub flags: RenderFlags,
}

/// Stateful GPU facade driven by the finishers. Implementations own every
/// device object; the accumulator only issues state changes and draws.
pub trait RendererState {
    fn begin_event(&mut self, name: &str);
    fn end_event(&mut self);

    fn set_depth_stencil_mode(&mut self, mode: DepthStencilMode);
    fn set_alpha_test_ref(&mut self, enabled: bool, reference: f32);
    fn set_blend_slot(&mut self, slot: u32);
    fn set_blend_mode(&mut self, mode: u32);
    fn set_cull_mode(&mut self, mode: CullMode);

    fn apply_scene_depth_shift(&mut self);
    fn reset_scene_depth_shift(&mut self);

    fn copy_resource(&mut self, dst: ResourceId, src: ResourceId);
    fn clear_depth_stencil(&mut self, channel: ClearChannel);
    fn set_clear_color(&mut self, color: [f32; 4]);

    /// `None` explicitly disables the slot.
    fn bind_render_target_slot(&mut self, slot: u32, target: Option<RenderTarget>, clear: ClearPolicy);
    fn set_depth_stencil_target(&mut self, target: Option<DepthStencilTarget>, clear: ClearPolicy);
    fn current_depth_stencil_target(&self) -> DepthStencilTarget;
    fn restore_render_targets(&mut self);

    fn run_imagespace(&mut self, effect: ImagespaceEffect);

    fn draw(&mut self, call: &DrawCall);
}
