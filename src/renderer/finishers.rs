// renderer/finishers.rs
// Frame-end draw sequences selected by render mode.

use crate::renderer::accumulator::Accumulator;
use crate::renderer::context::RenderContext;
use crate::renderer::flags::RenderFlags;
use crate::renderer::group::GroupKind;
use crate::renderer::state::{
    ClearChannel, ClearPolicy, CullMode, DepthStencilMode, ImagespaceEffect, RenderTarget,
    ResourceId,
};
use crate::renderer::technique::{
    TechniqueRange, DISTANT_TREE_DEPTH, GRASS_DIRONLY_LF, GRASS_SHADOW_LSB, SHADOWMAP_FIRST,
    SHADOWMAP_LAST, SKY_BASE_PRE, SKY_CLOUDS_FADE, WATER_DISPLACEMENT_STENCIL_VC, WATER_SSR,
    WATER_SSR_BASE, WATER_STENCIL,
};

const SKY_ALPHA_TEST_REF: f32 = 128.0 / 255.0;

const BLEND_SLOT_DEFAULT: u32 = 1;
const BLEND_SLOT_DECALS: u32 = 10;
const BLEND_SLOT_ALPHA: u32 = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FinisherKind {
    Default,
    ShadowMapOrMask,
    InterfaceElements,
    FirstPerson,
    LodOnly,
    PrecipitationOcclusion,
}

impl FinisherKind {
    pub fn finish(self, accumulator: &mut Accumulator, flags: RenderFlags, ctx: &mut RenderContext<'_>) {
        match self {
            Self::Default => finish_default(accumulator, flags, ctx),
            Self::ShadowMapOrMask => finish_shadow_map_or_mask(accumulator, flags, ctx),
            Self::InterfaceElements => finish_interface_elements(accumulator, flags, ctx),
            Self::FirstPerson => finish_first_person(accumulator, flags, ctx),
            Self::LodOnly => finish_lod_only(accumulator, flags, ctx),
            Self::PrecipitationOcclusion => finish_precipitation_occlusion(accumulator, flags, ctx),
        }
    }
}

fn has_camera(accumulator: &Accumulator) -> bool {
    let present = accumulator.camera().is_some();
    if !present {
        log::debug!("{}: no camera bound, skipping pass", accumulator.name());
    }
    present
}

pub fn finish_default(accumulator: &mut Accumulator, flags: RenderFlags, ctx: &mut RenderContext<'_>) {
    ctx.event("FinishAccumulating_Default", |ctx| {
        render_scene_normal(accumulator, flags, ctx);
        render_scene_normal_alpha_z(accumulator, flags, ctx);
    });
}

/// The ordered main-pass sequence. Depth-stencil changes and target rebinds
/// between steps are order dependent.
pub fn render_scene_normal(accumulator: &mut Accumulator, flags: RenderFlags, ctx: &mut RenderContext<'_>) {
    if !has_camera(accumulator) {
        return;
    }

    let switch_depth_modes = accumulator.draws_after_depth_prepass() && !ctx.globals.use_early_z();
    let depth_shift = flags.applies_scene_depth_shift();
    let everything = TechniqueRange::ALL;

    ctx.globals.set_water_stencil_present(false);
    ctx.state.begin_event("RenderSceneNormal");

    if switch_depth_modes {
        ctx.state.set_depth_stencil_mode(DepthStencilMode::TestEqual);
    }
    if depth_shift {
        ctx.state.apply_scene_depth_shift();
    }

    ctx.event("RenderBatches", |ctx| {
        accumulator.render_from_main_group(TechniqueRange::new(1, DISTANT_TREE_DEPTH), flags, None, ctx);
    });

    ctx.event("LowAniso", |ctx| {
        accumulator.render_from_main_group(everything, flags, Some(GroupKind::LOW_ANISO), ctx);
    });

    ctx.event("RenderGrass", |ctx| {
        accumulator.render_from_main_group(
            TechniqueRange::new(GRASS_DIRONLY_LF, GRASS_SHADOW_LSB),
            flags,
            None,
            ctx,
        );
    });

    ctx.event("RenderNoShadowGroup", |ctx| {
        accumulator.render_from_main_group(everything, flags, Some(GroupKind::NO_SHADOW), ctx);
    });

    ctx.event("RenderLODObjects", |ctx| {
        accumulator.render_from_main_group(everything, flags, Some(GroupKind::LOD_OBJECTS), ctx);
        if switch_depth_modes {
            ctx.state.set_depth_stencil_mode(DepthStencilMode::TestWrite);
        }
    });

    ctx.event("RenderLODLand", |ctx| {
        accumulator.render_from_main_group(everything, flags, Some(GroupKind::LOD_TERRAIN), ctx);
        if depth_shift {
            ctx.state.reset_scene_depth_shift();
        }
    });

    ctx.event("RenderSky", |ctx| {
        ctx.state.set_alpha_test_ref(true, SKY_ALPHA_TEST_REF);
        accumulator.render_from_main_group(
            TechniqueRange::new(SKY_BASE_PRE, SKY_CLOUDS_FADE),
            flags,
            None,
            ctx,
        );
    });

    ctx.event("RenderSkyClouds", |ctx| {
        ctx.state.set_blend_slot(BLEND_SLOT_ALPHA);
        accumulator.render_from_main_group(everything, flags, Some(GroupKind::SKY_CLOUDS), ctx);
        ctx.state.set_blend_slot(BLEND_SLOT_DEFAULT);
    });

    if depth_shift {
        ctx.state.apply_scene_depth_shift();
    }

    ctx.state.set_blend_slot(BLEND_SLOT_DECALS);
    accumulator.render_decals(false, flags, ctx);

    ctx.event("BlendedDecals", |ctx| {
        ctx.state.set_blend_slot(BLEND_SLOT_ALPHA);
        accumulator.render_decals(true, flags, ctx);
    });

    ctx.state.set_blend_mode(0);
    ctx.state.set_blend_slot(BLEND_SLOT_DEFAULT);

    if flags.wants_ssr() && accumulator.batch().has_technique_passes(WATER_SSR_BASE, WATER_SSR) {
        let source = ctx.state.current_depth_stencil_target();
        ctx.state
            .copy_resource(ResourceId::SsrDepth, ResourceId::DepthStencil(source));
    }

    ctx.event("RenderWaterStencil", |ctx| {
        if accumulator
            .batch()
            .has_technique_passes(WATER_STENCIL, WATER_DISPLACEMENT_STENCIL_VC)
        {
            render_water_stencil(accumulator, flags, ctx);
        }
    });

    if flags.wants_post_lighting() {
        render_post_lighting(ctx);
    }

    if depth_shift {
        ctx.state.reset_scene_depth_shift();
    }

    ctx.state.end_event();
}

fn render_water_stencil(accumulator: &mut Accumulator, flags: RenderFlags, ctx: &mut RenderContext<'_>) {
    ctx.state.clear_depth_stencil(ClearChannel::Stencil);
    ctx.state.set_clear_color([0.0; 4]);

    ctx.state
        .bind_render_target_slot(0, Some(RenderTarget::NormalTaaMaskSsrMask), ClearPolicy::NoClear);
    ctx.state
        .bind_render_target_slot(1, Some(RenderTarget::MotionVector), ClearPolicy::NoClear);
    for slot in 2..=4 {
        ctx.state.bind_render_target_slot(slot, None, ClearPolicy::NoClear);
    }

    accumulator.render_from_main_group(
        TechniqueRange::new(WATER_STENCIL, WATER_DISPLACEMENT_STENCIL_VC),
        flags,
        None,
        ctx,
    );

    ctx.state.restore_render_targets();
    ctx.globals.set_water_stencil_present(true);
}

fn render_post_lighting(ctx: &mut RenderContext<'_>) {
    let depth_target = ctx.state.current_depth_stencil_target();

    ctx.state.set_depth_stencil_target(None, ClearPolicy::NoClear);
    for slot in 1..=4 {
        ctx.state.bind_render_target_slot(slot, None, ClearPolicy::NoClear);
    }

    ctx.state
        .run_imagespace(ImagespaceEffect::ReflectionsAndDownsample);

    ctx.state
        .bind_render_target_slot(0, Some(RenderTarget::Main), ClearPolicy::NoClear);
    ctx.state
        .set_depth_stencil_target(Some(depth_target), ClearPolicy::NoClear);
    ctx.state.set_depth_stencil_mode(DepthStencilMode::Test);
}

/// Second main-pass step: the alpha-tested depth group.
pub fn render_scene_normal_alpha_z(
    accumulator: &mut Accumulator,
    flags: RenderFlags,
    ctx: &mut RenderContext<'_>,
) {
    if !has_camera(accumulator) {
        return;
    }

    ctx.event("RenderSceneNormalAlphaZ", |ctx| {
        accumulator.render_from_main_group(TechniqueRange::ALL, flags, Some(GroupKind::ALPHA_Z), ctx);
    });
}

pub fn finish_shadow_map_or_mask(
    accumulator: &mut Accumulator,
    flags: RenderFlags,
    ctx: &mut RenderContext<'_>,
) {
    if !has_camera(accumulator) {
        return;
    }

    let depth_shift = flags.applies_shadow_depth_shift();

    ctx.event("FinishAccumulating_ShadowMapOrMask", |ctx| {
        if depth_shift {
            ctx.state.apply_scene_depth_shift();
        }

        if flags.is_volumetric_lighting_shadow() {
            ctx.event("Volumetric lighting specific shadow map", |ctx| {
                ctx.state.set_cull_mode(CullMode::None);
                accumulator.render_from_main_group(
                    TechniqueRange::ALL,
                    flags,
                    Some(GroupKind::VOLUMETRIC_SHADOW),
                    ctx,
                );
            });
        } else {
            ctx.event("RenderBatches", |ctx| {
                accumulator.render_from_main_group(
                    TechniqueRange::new(SHADOWMAP_FIRST, SHADOWMAP_LAST),
                    flags,
                    None,
                    ctx,
                );
                accumulator.render_from_main_group(
                    TechniqueRange::new(GRASS_DIRONLY_LF, GRASS_SHADOW_LSB),
                    flags,
                    None,
                    ctx,
                );
                accumulator.render_from_main_group(
                    TechniqueRange::ALL,
                    flags,
                    Some(GroupKind::LOD_OBJECTS),
                    ctx,
                );
            });

            ctx.event("LowAniso", |ctx| {
                accumulator.render_from_main_group(
                    TechniqueRange::ALL,
                    flags,
                    Some(GroupKind::LOW_ANISO),
                    ctx,
                );
            });

            ctx.event("Decals", |ctx| {
                accumulator.render_decals(true, flags, ctx);
            });
        }

        if depth_shift {
            ctx.state.reset_scene_depth_shift();
        }
    });
}

pub fn finish_interface_elements(
    accumulator: &mut Accumulator,
    flags: RenderFlags,
    ctx: &mut RenderContext<'_>,
) {
    if !has_camera(accumulator) {
        return;
    }

    ctx.event("FinishAccumulating_InterfaceElements", |ctx| {
        accumulator.render_from_main_group(TechniqueRange::ALL, flags, None, ctx);
    });
}

pub fn finish_first_person(accumulator: &mut Accumulator, flags: RenderFlags, ctx: &mut RenderContext<'_>) {
    if !has_camera(accumulator) {
        return;
    }

    ctx.event("FinishAccumulating_FirstPerson", |ctx| {
        accumulator.render_from_main_group(TechniqueRange::ALL, flags, None, ctx);
        accumulator.render_from_main_group(
            TechniqueRange::ALL,
            flags,
            Some(GroupKind::FIRST_PERSON),
            ctx,
        );
        accumulator.render_decals(true, flags, ctx);
    });
}

/// Terrain LOD then object LOD with landscape noise disabled; the noise flag
/// comes back when the scope ends, whatever path leaves it.
pub fn finish_lod_only(accumulator: &mut Accumulator, flags: RenderFlags, ctx: &mut RenderContext<'_>) {
    if !has_camera(accumulator) {
        return;
    }

    let globals = ctx.globals;
    let _noise = globals.suspend_lod_landscape_noise();

    ctx.event("FinishAccumulating_LODOnly", |ctx| {
        ctx.event("RenderLODLand", |ctx| {
            accumulator.render_from_main_group(
                TechniqueRange::ALL,
                flags,
                Some(GroupKind::LOD_TERRAIN),
                ctx,
            );
        });
        ctx.event("RenderLODObjects", |ctx| {
            accumulator.render_from_main_group(
                TechniqueRange::ALL,
                flags,
                Some(GroupKind::LOD_OBJECTS),
                ctx,
            );
        });
    });
}

pub fn finish_precipitation_occlusion(
    accumulator: &mut Accumulator,
    flags: RenderFlags,
    ctx: &mut RenderContext<'_>,
) {
    if !has_camera(accumulator) {
        return;
    }

    if ctx.globals.log_unexercised_modes() {
        log::warn!(
            "{}: precipitation occlusion finisher triggered (mode {})",
            accumulator.name(),
            accumulator.render_mode().index()
        );
    }

    ctx.event("FinishAccumulating_PrecipitationOcclusion", |ctx| {
        accumulator.render_from_main_group(
            TechniqueRange::ALL,
            flags,
            Some(GroupKind::PRECIPITATION_OCCLUSION),
            ctx,
        );
    });
}
