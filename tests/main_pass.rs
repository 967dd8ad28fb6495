use render_accumulator::renderer::technique::{
    GRASS_SHADOW_L, SKY_BASE_PRE, WATER_DISPLACEMENT_STENCIL_VC, WATER_SSR, WATER_SSR_BASE,
    WATER_STENCIL,
};
use render_accumulator::renderer::{
    Accumulator, ClearChannel, ClearPolicy, CommandQueue, DepthStencilMode, DepthStencilTarget,
    GroupKind, ImagespaceEffect, RecordingState, RenderContext, RenderFlags, RenderGroup,
    RenderTarget, ResourceId, ShaderGlobals, StateCall,
};
use render_accumulator::scene::{Camera, Geometry, ObjectId, PropertyFlags, ShaderProperty};
use render_accumulator::AccumulatorSettings;

fn main_pass(settings: &AccumulatorSettings) -> Accumulator {
    let mut accumulator = Accumulator::main_pass(settings);
    accumulator.set_camera(Some(Camera::default()));
    accumulator
}

fn register(accumulator: &mut Accumulator, id: u32, property: ShaderProperty) {
    let outcome = accumulator.register_object(&Geometry::new(ObjectId(id), property), 0);
    assert!(outcome.is_accepted(), "object {id} was not accepted: {outcome:?}");
}

/// One object per step of the main-pass sequence, ids in expected draw order.
fn register_every_step(accumulator: &mut Accumulator) {
    register(accumulator, 1, ShaderProperty::new(0x10));
    register(accumulator, 2, ShaderProperty::new(0x11).with_group(GroupKind::LOW_ANISO));
    register(accumulator, 3, ShaderProperty::new(GRASS_SHADOW_L));
    register(accumulator, 4, ShaderProperty::new(0x12).with_group(GroupKind::NO_SHADOW));
    register(accumulator, 5, ShaderProperty::new(0x13).with_group(GroupKind::LOD_OBJECTS));
    register(accumulator, 6, ShaderProperty::new(0x14).with_group(GroupKind::LOD_TERRAIN));
    register(accumulator, 7, ShaderProperty::new(SKY_BASE_PRE));
    register(accumulator, 8, ShaderProperty::new(0x15).with_group(GroupKind::SKY_CLOUDS));
    register(accumulator, 9, ShaderProperty::new(0x16).with_flags(PropertyFlags::DECAL));
    register(accumulator, 10, ShaderProperty::new(0x17).with_flags(PropertyFlags::BLENDED_DECAL));
}

fn finish(accumulator: &mut Accumulator, globals: &ShaderGlobals, flags: RenderFlags) -> RecordingState {
    let commands = CommandQueue::new();
    let mut state = RecordingState::new();
    accumulator.finish_accumulating(flags, &mut RenderContext::new(&mut state, globals, &commands));
    state
}

fn drawn_objects(state: &RecordingState) -> Vec<u32> {
    state.draws().iter().map(|draw| draw.object.0).collect()
}

#[test]
fn default_frame_draws_steps_in_order() {
    let settings = AccumulatorSettings::default();
    let globals = ShaderGlobals::from_settings(&settings);
    let mut accumulator = main_pass(&settings);
    register_every_step(&mut accumulator);

    let state = finish(&mut accumulator, &globals, RenderFlags::empty());

    assert_eq!(drawn_objects(&state), (1..=10).collect::<Vec<_>>());
    assert_eq!(
        state.depth_modes(),
        vec![DepthStencilMode::TestEqual, DepthStencilMode::TestWrite]
    );
    assert!(state.events_balanced());
    assert!(!state.calls().iter().any(|call| matches!(call, StateCall::CopyResource { .. })));
    assert!(!state.contains(&StateCall::Imagespace(ImagespaceEffect::ReflectionsAndDownsample)));
    assert!(!globals.water_stencil_present());

    let stats = accumulator.frame_stats();
    assert_eq!(stats.accepted, 10);
    assert_eq!(stats.draws, 10);
    assert_eq!(accumulator.batch().item_count(), 0);
}

fn draw_of(state: &RecordingState, id: u32) -> usize {
    state
        .position(|call| matches!(call, StateCall::Draw(draw) if draw.object == ObjectId(id)))
        .unwrap()
}

#[test]
fn sky_and_decal_steps_set_alpha_and_blend_state() {
    let settings = AccumulatorSettings::default();
    let globals = ShaderGlobals::from_settings(&settings);
    let mut accumulator = main_pass(&settings);
    register_every_step(&mut accumulator);

    let state = finish(&mut accumulator, &globals, RenderFlags::empty());
    let calls = state.calls();
    let after = |from: usize, wanted: &StateCall| {
        calls[from..]
            .iter()
            .position(|call| call == wanted)
            .map(|offset| from + offset)
            .unwrap_or_else(|| panic!("{wanted:?} not found after call {from}"))
    };

    let alpha_test = after(
        0,
        &StateCall::AlphaTestRef {
            enabled: true,
            reference: 128.0 / 255.0,
        },
    );
    assert!(draw_of(&state, 6) < alpha_test && alpha_test < draw_of(&state, 7));

    let clouds_slot = after(draw_of(&state, 7), &StateCall::BlendSlot(11));
    let clouds_draw = draw_of(&state, 8);
    let clouds_restore = after(clouds_draw, &StateCall::BlendSlot(1));
    assert!(clouds_slot < clouds_draw);

    let decal_slot = after(clouds_restore, &StateCall::BlendSlot(10));
    assert!(decal_slot < draw_of(&state, 9));
    let blended_slot = after(draw_of(&state, 9), &StateCall::BlendSlot(11));
    assert!(blended_slot < draw_of(&state, 10));

    let blend_mode = after(draw_of(&state, 10), &StateCall::BlendMode(0));
    let slot_reset = after(blend_mode, &StateCall::BlendSlot(1));
    assert!(blend_mode < slot_reset);
}

#[test]
fn precompiled_sky_clouds_group_draws_itself() {
    let settings = AccumulatorSettings::default();
    let globals = ShaderGlobals::from_settings(&settings);
    let mut accumulator = main_pass(&settings);
    accumulator
        .batch_mut()
        .setup_group(RenderGroup::precompiled(GroupKind::SKY_CLOUDS));
    register_every_step(&mut accumulator);
    register(&mut accumulator, 11, ShaderProperty::new(0x18).with_group(GroupKind::SKY_CLOUDS));

    let state = finish(&mut accumulator, &globals, RenderFlags::empty());

    let drawn = drawn_objects(&state);
    assert_eq!(&drawn[7..9], &[8, 11]);
    assert_eq!(accumulator.frame_stats().draws, 11);

    let group = accumulator.batch().group(GroupKind::SKY_CLOUDS).unwrap();
    assert!(group.is_precompiled());
    assert!(!group.is_registered());
}

#[test]
fn water_stencil_presence_is_reset_each_main_pass() {
    let settings = AccumulatorSettings::default();
    let globals = ShaderGlobals::from_settings(&settings);
    let mut accumulator = main_pass(&settings);

    register(&mut accumulator, 1, ShaderProperty::new(WATER_STENCIL));
    register(&mut accumulator, 2, ShaderProperty::new(WATER_DISPLACEMENT_STENCIL_VC));
    finish(&mut accumulator, &globals, RenderFlags::empty());
    assert!(globals.water_stencil_present());

    register_every_step(&mut accumulator);
    finish(&mut accumulator, &globals, RenderFlags::empty());
    assert!(!globals.water_stencil_present());
}

#[test]
fn depth_mode_switches_after_lod_objects() {
    let settings = AccumulatorSettings::default();
    let globals = ShaderGlobals::from_settings(&settings);
    let mut accumulator = main_pass(&settings);
    register_every_step(&mut accumulator);

    let state = finish(&mut accumulator, &globals, RenderFlags::empty());

    let test_write = state
        .position(|call| call == &StateCall::DepthStencilMode(DepthStencilMode::TestWrite))
        .unwrap();
    let lod_objects_draw = state
        .position(|call| matches!(call, StateCall::Draw(draw) if draw.object == ObjectId(5)))
        .unwrap();
    let lod_land_draw = state
        .position(|call| matches!(call, StateCall::Draw(draw) if draw.object == ObjectId(6)))
        .unwrap();
    assert!(lod_objects_draw < test_write && test_write < lod_land_draw);
}

#[test]
fn early_z_leaves_depth_modes_alone() {
    let settings = AccumulatorSettings {
        use_early_z: true,
        ..AccumulatorSettings::default()
    };
    let globals = ShaderGlobals::from_settings(&settings);
    let mut accumulator = main_pass(&settings);
    register_every_step(&mut accumulator);

    let state = finish(&mut accumulator, &globals, RenderFlags::empty());
    assert!(state.depth_modes().is_empty());
    assert_eq!(state.draws().len(), 10);
}

#[test]
fn depth_shift_is_applied_twice_and_reset_twice() {
    let settings = AccumulatorSettings::default();
    let globals = ShaderGlobals::from_settings(&settings);
    let mut accumulator = main_pass(&settings);
    register_every_step(&mut accumulator);

    let state = finish(&mut accumulator, &globals, RenderFlags::empty());
    let count = |wanted: &StateCall| state.calls().iter().filter(|call| *call == wanted).count();
    assert_eq!(count(&StateCall::ApplyDepthShift), 2);
    assert_eq!(count(&StateCall::ResetDepthShift), 2);
}

#[test]
fn depth_or_alpha_only_frames_skip_the_depth_shift() {
    for flags in [RenderFlags::DEPTH_ONLY, RenderFlags::ALPHA_ONLY] {
        let settings = AccumulatorSettings::default();
        let globals = ShaderGlobals::from_settings(&settings);
        let mut accumulator = main_pass(&settings);
        register_every_step(&mut accumulator);

        let state = finish(&mut accumulator, &globals, flags);
        assert!(!state.contains(&StateCall::ApplyDepthShift), "{flags:?}");
        assert!(!state.contains(&StateCall::ResetDepthShift), "{flags:?}");
    }
}

#[test]
fn ssr_copy_needs_both_water_techniques() {
    let settings = AccumulatorSettings::default();
    let globals = ShaderGlobals::from_settings(&settings);
    let copy = StateCall::CopyResource {
        dst: ResourceId::SsrDepth,
        src: ResourceId::DepthStencil(DepthStencilTarget::Main),
    };

    let mut accumulator = main_pass(&settings);
    register(&mut accumulator, 1, ShaderProperty::new(WATER_SSR_BASE));
    let state = finish(&mut accumulator, &globals, RenderFlags::SSR);
    assert!(!state.contains(&copy));

    register(&mut accumulator, 1, ShaderProperty::new(WATER_SSR_BASE));
    register(&mut accumulator, 2, ShaderProperty::new(WATER_SSR));
    let state = finish(&mut accumulator, &globals, RenderFlags::SSR);
    assert!(state.contains(&copy));

    register(&mut accumulator, 1, ShaderProperty::new(WATER_SSR_BASE));
    register(&mut accumulator, 2, ShaderProperty::new(WATER_SSR));
    let state = finish(&mut accumulator, &globals, RenderFlags::empty());
    assert!(!state.contains(&copy));
}

#[test]
fn water_stencil_rebinds_targets_and_publishes_presence() {
    let settings = AccumulatorSettings::default();
    let globals = ShaderGlobals::from_settings(&settings);
    let mut accumulator = main_pass(&settings);
    register(&mut accumulator, 1, ShaderProperty::new(WATER_STENCIL));
    register(&mut accumulator, 2, ShaderProperty::new(WATER_DISPLACEMENT_STENCIL_VC));

    let state = finish(&mut accumulator, &globals, RenderFlags::empty());

    let clear = state
        .position(|call| call == &StateCall::ClearDepthStencil(ClearChannel::Stencil))
        .unwrap();
    let bind = state
        .position(|call| {
            call == &StateCall::BindRenderTarget {
                slot: 0,
                target: Some(RenderTarget::NormalTaaMaskSsrMask),
                clear: ClearPolicy::NoClear,
            }
        })
        .unwrap();
    let first_draw = state.position(|call| matches!(call, StateCall::Draw(_))).unwrap();
    let restore = state
        .position(|call| call == &StateCall::RestoreRenderTargets)
        .unwrap();

    assert!(clear < bind && bind < first_draw && first_draw < restore);
    assert!(state.contains(&StateCall::ClearColor([0.0; 4])));
    assert_eq!(drawn_objects(&state), vec![1, 2]);
    assert!(globals.water_stencil_present());
}

#[test]
fn post_lighting_runs_imagespace_and_returns_to_depth_test() {
    let settings = AccumulatorSettings::default();
    let globals = ShaderGlobals::from_settings(&settings);
    let mut accumulator = main_pass(&settings);
    register_every_step(&mut accumulator);

    let state = finish(&mut accumulator, &globals, RenderFlags::POST_LIGHTING);

    let unbind = state
        .position(|call| {
            call == &StateCall::DepthStencilTarget {
                target: None,
                clear: ClearPolicy::NoClear,
            }
        })
        .unwrap();
    let imagespace = state
        .position(|call| call == &StateCall::Imagespace(ImagespaceEffect::ReflectionsAndDownsample))
        .unwrap();
    let rebind = state
        .position(|call| {
            call == &StateCall::DepthStencilTarget {
                target: Some(DepthStencilTarget::Main),
                clear: ClearPolicy::NoClear,
            }
        })
        .unwrap();

    assert!(unbind < imagespace && imagespace < rebind);
    assert_eq!(
        state.depth_modes(),
        vec![
            DepthStencilMode::TestEqual,
            DepthStencilMode::TestWrite,
            DepthStencilMode::Test
        ]
    );
}

#[test]
fn suppressed_grass_shadows_are_discarded() {
    let settings = AccumulatorSettings {
        suppress_grass_shadows: true,
        ..AccumulatorSettings::default()
    };
    let globals = ShaderGlobals::from_settings(&settings);
    let mut accumulator = main_pass(&settings);
    register_every_step(&mut accumulator);

    let state = finish(&mut accumulator, &globals, RenderFlags::empty());

    assert!(!drawn_objects(&state).contains(&3));
    assert_eq!(accumulator.frame_stats().discarded, 1);
    assert_eq!(accumulator.frame_stats().draws, 9);
}

#[test]
fn missing_camera_skips_the_pass() {
    let settings = AccumulatorSettings::default();
    let globals = ShaderGlobals::from_settings(&settings);
    let mut accumulator = Accumulator::main_pass(&settings);
    register_every_step(&mut accumulator);

    let state = finish(&mut accumulator, &globals, RenderFlags::empty());

    assert!(state.calls().is_empty());
    assert_eq!(accumulator.batch().item_count(), 0);
}
