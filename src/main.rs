use std::sync::Arc;

use glam::Vec3;
use render_accumulator::renderer::technique::{
    DISTANT_TREE_DEPTH, GRASS_SHADOW_L, SHADOWMAP_FIRST, SKY_BASE_PRE, WATER_SSR, WATER_SSR_BASE,
    WATER_STENCIL,
};
use render_accumulator::renderer::{
    Accumulator, ClearChannel, ClearPolicy, CommandQueue, CullMode, DepthStencilMode,
    DepthStencilTarget, DrawCall, GroupKind, ImagespaceEffect, RenderContext,
    RenderFlags, RenderMode, RenderTarget, RendererState, ResourceId, ShaderGlobals,
};
use render_accumulator::scene::{Camera, Geometry, LightData, ObjectId, PropertyFlags, Scene, ShaderProperty};
use render_accumulator::{init_logging, AccumulatorSettings};

/// Prints every facade call, indented by event depth.
struct LoggingState {
    depth: usize,
    depth_target: DepthStencilTarget,
}

impl LoggingState {
    fn new(depth_target: DepthStencilTarget) -> Self {
        Self {
            depth: 0,
            depth_target,
        }
    }

    fn line(&self, text: std::fmt::Arguments<'_>) {
        log::info!("{:indent$}{}", "", text, indent = self.depth * 2);
    }
}

impl RendererState for LoggingState {
    fn begin_event(&mut self, name: &str) {
        self.line(format_args!("> {name}"));
        self.depth += 1;
    }

    fn end_event(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn set_depth_stencil_mode(&mut self, mode: DepthStencilMode) {
        self.line(format_args!("depth-stencil {mode:?}"));
    }

    fn set_alpha_test_ref(&mut self, enabled: bool, reference: f32) {
        self.line(format_args!("alpha test {enabled} @ {reference:.3}"));
    }

    fn set_blend_slot(&mut self, slot: u32) {
        self.line(format_args!("blend slot {slot}"));
    }

    fn set_blend_mode(&mut self, mode: u32) {
        self.line(format_args!("blend mode {mode}"));
    }

    fn set_cull_mode(&mut self, mode: CullMode) {
        self.line(format_args!("cull {mode:?}"));
    }

    fn apply_scene_depth_shift(&mut self) {
        self.line(format_args!("depth shift on"));
    }

    fn reset_scene_depth_shift(&mut self) {
        self.line(format_args!("depth shift off"));
    }

    fn copy_resource(&mut self, dst: ResourceId, src: ResourceId) {
        self.line(format_args!("copy {src:?} -> {dst:?}"));
    }

    fn clear_depth_stencil(&mut self, channel: ClearChannel) {
        self.line(format_args!("clear {channel:?}"));
    }

    fn set_clear_color(&mut self, color: [f32; 4]) {
        self.line(format_args!("clear color {color:?}"));
    }

    fn bind_render_target_slot(&mut self, slot: u32, target: Option<RenderTarget>, clear: ClearPolicy) {
        self.line(format_args!("target[{slot}] = {target:?} ({clear:?})"));
    }

    fn set_depth_stencil_target(&mut self, target: Option<DepthStencilTarget>, clear: ClearPolicy) {
        if let Some(target) = target {
            self.depth_target = target;
        }
        self.line(format_args!("depth target = {target:?} ({clear:?})"));
    }

    fn current_depth_stencil_target(&self) -> DepthStencilTarget {
        self.depth_target
    }

    fn restore_render_targets(&mut self) {
        self.line(format_args!("restore targets"));
    }

    fn run_imagespace(&mut self, effect: ImagespaceEffect) {
        self.line(format_args!("imagespace {effect:?}"));
    }

    fn draw(&mut self, call: &DrawCall) {
        self.line(format_args!("draw object {} technique {:#x}", call.object.0, call.technique));
    }
}

fn build_scene() -> Scene {
    let light = Arc::new(LightData::new(0x4));
    let mut scene = Scene::new();
    let objects = [
        ShaderProperty::new(0x10).with_light_data(Arc::clone(&light)),
        ShaderProperty::new(DISTANT_TREE_DEPTH),
        ShaderProperty::new(SHADOWMAP_FIRST),
        ShaderProperty::new(GRASS_SHADOW_L),
        ShaderProperty::new(SKY_BASE_PRE),
        ShaderProperty::new(0x30).with_group(GroupKind::LOD_TERRAIN),
        ShaderProperty::new(0x31).with_group(GroupKind::SKY_CLOUDS),
        ShaderProperty::new(0x32).with_flags(PropertyFlags::DECAL),
        ShaderProperty::new(0x33).with_flags(PropertyFlags::BLENDED_DECAL),
        ShaderProperty::new(WATER_STENCIL),
        ShaderProperty::new(WATER_SSR_BASE),
        ShaderProperty::new(WATER_SSR),
    ];
    for (id, property) in objects.into_iter().enumerate() {
        scene.spawn(Geometry::new(ObjectId(id as u32), property));
    }
    scene
}

fn main() {
    init_logging();

    let settings = AccumulatorSettings::load();
    let globals = ShaderGlobals::from_settings(&settings);
    let commands = CommandQueue::new();
    let scene = build_scene();

    let mut main_pass = Accumulator::main_pass(&settings);
    main_pass.set_camera(Some(Camera::perspective(Vec3::new(0.0, 2.0, 8.0), Vec3::ZERO, 1.0)));

    let mut shadow_pass = Accumulator::shadow_pass(&settings, RenderMode::SHADOW_MAP_OR_MASK_FIRST);
    shadow_pass.set_camera(Some(Camera::shadow(Vec3::new(-0.3, -1.0, -0.2), Vec3::ZERO, 20.0)));

    scene.submit(shadow_pass.registrations(), 0);
    let mut state = LoggingState::new(DepthStencilTarget::Shadowmap);
    shadow_pass.finish_accumulating(
        RenderFlags::empty(),
        &mut RenderContext::new(&mut state, &globals, &commands),
    );

    scene.submit(main_pass.registrations(), 0);
    let mut state = LoggingState::new(DepthStencilTarget::Main);
    main_pass.finish_accumulating(
        RenderFlags::SSR | RenderFlags::POST_LIGHTING,
        &mut RenderContext::new(&mut state, &globals, &commands),
    );

    for accumulator in [&shadow_pass, &main_pass] {
        let stats = accumulator.frame_stats();
        log::info!(
            "{}: {} accepted, {} rejected, {} skipped, {} draws, {} discarded",
            accumulator.name(),
            stats.accepted,
            stats.rejected,
            stats.skipped,
            stats.draws,
            stats.discarded
        );
    }
    log::info!(
        "water stencil present: {}, {} render commands queued",
        globals.water_stencil_present(),
        commands.drain().len()
    );
}
