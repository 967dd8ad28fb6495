// renderer/accumulator.rs
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::renderer::batch::BatchClassifier;
use crate::renderer::commands::RegistrationQueue;
use crate::renderer::context::RenderContext;
use crate::renderer::finishers;
use crate::renderer::flags::RenderFlags;
use crate::renderer::group::GroupKind;
use crate::renderer::mode_table::{RenderMode, RenderModeTable};
use crate::renderer::state::DrawCall;
use crate::renderer::technique::{is_grass_shadow, TechniqueId, TechniqueRange};
use crate::scene::{Camera, Geometry, ShaderProperty};
use crate::settings::AccumulatorSettings;

/// Shadow-override mask value that clears the light data's accumulation
/// flags instead of merging bits into them.
pub const SHADOW_OVERRIDE_ALL: u32 = 0xFFFF;

static NEXT_ACCUMULATOR_ID: AtomicU32 = AtomicU32::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccumulatorId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccumulatorPhase {
    Idle,
    Registering,
    Finishing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoShaderProperty,
    HiddenDismemberPart,
    NotRenderable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    Accepted,
    /// The registrar declined the object.
    Rejected,
    /// Filtered out before reaching a registrar.
    Skipped(SkipReason),
}

impl RegisterOutcome {
    /// Mirrors the engine's boolean: skipped objects count as handled.
    pub fn is_handled(self) -> bool {
        !matches!(self, Self::Rejected)
    }

    pub fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub accepted: u32,
    pub rejected: u32,
    pub skipped: u32,
    pub draws: u32,
    pub discarded: u32,
}

/// Per-pass accumulation state: collects geometry during traversal and
/// drives the mode's finisher at frame end.
#[derive(Debug)]
pub struct Accumulator {
    id: AccumulatorId,
    name: String,
    mode: RenderMode,
    table: &'static RenderModeTable,
    camera: Option<Camera>,
    batch: BatchClassifier,
    registrations: Arc<RegistrationQueue>,
    phase: AccumulatorPhase,
    has_pending_draws: bool,
    current_technique: TechniqueId,
    depth_prepass: bool,
    grass_shadow_camera_adjust: bool,
    suppress_grass_shadows: bool,
    shadow_override_mask: u32,
    shadow_override_bits: u32,
    stats: FrameStats,
    last_frame: FrameStats,
}

impl Accumulator {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: AccumulatorId(NEXT_ACCUMULATOR_ID.fetch_add(1, Ordering::Relaxed)),
            name: name.into(),
            mode: RenderMode::DEFAULT,
            table: RenderModeTable::standard(),
            camera: None,
            batch: BatchClassifier::standard(),
            registrations: Arc::new(RegistrationQueue::new()),
            phase: AccumulatorPhase::Idle,
            has_pending_draws: false,
            current_technique: 0,
            depth_prepass: false,
            grass_shadow_camera_adjust: false,
            suppress_grass_shadows: false,
            shadow_override_mask: 0,
            shadow_override_bits: 0,
            stats: FrameStats::default(),
            last_frame: FrameStats::default(),
        }
    }

    /// Main-pass accumulator configured from settings.
    pub fn main_pass(settings: &AccumulatorSettings) -> Self {
        let mut accumulator = Self::new("MainPass");
        accumulator.depth_prepass = settings.main_pass_depth_prepass;
        accumulator.suppress_grass_shadows = settings.suppress_grass_shadows;
        accumulator
    }

    /// Shadow accumulator for `mode`, carrying the configured overrides.
    pub fn shadow_pass(settings: &AccumulatorSettings, mode: RenderMode) -> Self {
        let mut accumulator = Self::new("ShadowPass");
        accumulator.mode = mode;
        accumulator.suppress_grass_shadows = settings.suppress_grass_shadows;
        accumulator.set_shadow_override(settings.shadow_override_mask, settings.shadow_override_bits);
        accumulator
    }

    pub fn with_table(mut self, table: &'static RenderModeTable) -> Self {
        self.table = table;
        self
    }

    pub fn with_batch(mut self, batch: BatchClassifier) -> Self {
        self.batch = batch;
        self
    }

    pub fn id(&self) -> AccumulatorId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn render_mode(&self) -> RenderMode {
        self.mode
    }

    pub fn set_render_mode(&mut self, mode: RenderMode) {
        self.mode = mode;
    }

    pub fn camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }

    pub fn set_camera(&mut self, camera: Option<Camera>) {
        self.camera = camera;
    }

    pub fn batch(&self) -> &BatchClassifier {
        &self.batch
    }

    pub fn batch_mut(&mut self) -> &mut BatchClassifier {
        &mut self.batch
    }

    pub fn phase(&self) -> AccumulatorPhase {
        self.phase
    }

    pub fn has_pending_draws(&self) -> bool {
        self.has_pending_draws
    }

    pub fn current_technique(&self) -> TechniqueId {
        self.current_technique
    }

    /// The pass draws after a depth pre-pass and starts in test-equal.
    pub fn set_depth_prepass(&mut self, enabled: bool) {
        self.depth_prepass = enabled;
    }

    pub fn draws_after_depth_prepass(&self) -> bool {
        self.depth_prepass
    }

    pub fn set_grass_shadow_camera_adjust(&mut self, enabled: bool) {
        self.grass_shadow_camera_adjust = enabled;
    }

    pub fn set_suppress_grass_shadows(&mut self, enabled: bool) {
        self.suppress_grass_shadows = enabled;
    }

    pub fn grass_shadows_suppressed(&self) -> bool {
        self.grass_shadow_camera_adjust || self.suppress_grass_shadows
    }

    /// `mask == 0` disables the override, [`SHADOW_OVERRIDE_ALL`] clears the
    /// flags, any other mask ORs `bits` into them.
    pub fn set_shadow_override(&mut self, mask: u32, bits: u32) {
        self.shadow_override_mask = mask;
        self.shadow_override_bits = bits;
    }

    /// Counters of the last finished frame.
    pub fn frame_stats(&self) -> FrameStats {
        self.last_frame
    }

    pub fn register_object(&mut self, geometry: &Geometry, aux: u64) -> RegisterOutcome {
        assert!(
            self.phase != AccumulatorPhase::Finishing,
            "accumulator {} received an object while finishing",
            self.name
        );
        self.phase = AccumulatorPhase::Registering;

        let Some(property) = geometry.shader_property.as_ref() else {
            return self.skip(SkipReason::NoShaderProperty);
        };

        if geometry
            .skin_instance
            .is_some_and(|skin| skin.is_hidden_dismember_part())
        {
            return self.skip(SkipReason::HiddenDismemberPart);
        }

        if !geometry.renderer_data && geometry.skin_instance.is_none() && !geometry.kind.is_particle() {
            return self.skip(SkipReason::NotRenderable);
        }

        let registrar = self.table.registrar(self.mode);
        let accepted = registrar.register(self, geometry, property, aux);
        self.apply_shadow_override(property);

        if accepted {
            self.stats.accepted += 1;
            RegisterOutcome::Accepted
        } else {
            self.stats.rejected += 1;
            RegisterOutcome::Rejected
        }
    }

    /// Queue traversal threads push into. Drained on the render thread by
    /// [`Accumulator::apply_registrations`] and at the start of every finish.
    pub fn registrations(&self) -> &Arc<RegistrationQueue> {
        &self.registrations
    }

    /// Applies everything queued so far, in insertion order.
    pub fn apply_registrations(&mut self) -> usize {
        let registrations = self.registrations.drain();
        let count = registrations.len();
        for registration in registrations {
            self.register_object(&registration.geometry, registration.aux);
        }
        count
    }

    /// Applies any pending registrations, then runs the mode's finisher.
    pub fn finish_accumulating(&mut self, flags: RenderFlags, ctx: &mut RenderContext<'_>) {
        let late = self.apply_registrations();
        if late > 0 {
            log::debug!("{}: applied {} registrations at finish", self.name, late);
        }
        self.phase = AccumulatorPhase::Finishing;

        if self.mode.is_default() {
            finishers::render_scene_normal(self, flags, ctx);
        } else {
            let finisher = self.table.finisher(self.mode);
            finisher.finish(self, flags, ctx);
        }

        log::debug!(
            "{}: finished mode {} with {} draws, {} discarded, {} accepted",
            self.name,
            self.mode.index(),
            self.stats.draws,
            self.stats.discarded,
            self.stats.accepted
        );

        self.batch.clear();
        self.has_pending_draws = false;
        self.last_frame = std::mem::take(&mut self.stats);
        self.phase = AccumulatorPhase::Idle;
    }

    /// One render step: the wildcard window over the main lists, or a single
    /// group. Missing groups are skipped; precompiled groups draw themselves.
    pub fn render_from_main_group(
        &mut self,
        range: TechniqueRange,
        flags: RenderFlags,
        group: Option<GroupKind>,
        ctx: &mut RenderContext<'_>,
    ) {
        let Some(kind) = group else {
            self.render_techniques(range, flags, None, ctx);
            return;
        };

        let Some(precompiled) = self.batch.group(kind).map(|group| group.is_precompiled()) else {
            return;
        };

        if !precompiled {
            self.render_techniques(range, flags, Some(kind), ctx);
        } else if let Some(group) = self.batch.group_mut(kind) {
            self.stats.draws += group.render(flags, &mut *ctx.state) as u32;
        }
    }

    pub fn render_techniques(
        &mut self,
        range: TechniqueRange,
        flags: RenderFlags,
        group: Option<GroupKind>,
        ctx: &mut RenderContext<'_>,
    ) {
        let globals = ctx.globals;
        let _current = globals.bind_accumulator(self.id, ctx.commands);

        self.current_technique = 0;
        let suppress_grass_shadows = self.grass_shadows_suppressed();

        let Some(passes) = self.batch.passes_mut(group) else {
            self.has_pending_draws = false;
            return;
        };

        passes.begin_window(range);
        self.has_pending_draws = passes.produce_next();

        while self.has_pending_draws {
            self.current_technique = passes.current_technique().unwrap_or_default();

            if suppress_grass_shadows && is_grass_shadow(self.current_technique) {
                self.stats.discarded += 1;
                self.has_pending_draws = passes.discard_next();
            } else {
                self.stats.draws += 1;
                self.has_pending_draws = passes.render_next(flags, &mut *ctx.state);
            }
        }

        if let Some(group) = group.and_then(|kind| self.batch.group_mut(kind)) {
            group.unregister();
        }
    }

    /// Draws the normal or blended decal list in registration order.
    pub fn render_decals(&mut self, blended: bool, flags: RenderFlags, ctx: &mut RenderContext<'_>) {
        let globals = ctx.globals;
        let _current = globals.bind_accumulator(self.id, ctx.commands);

        for item in self.batch.take_decals(blended) {
            ctx.state.draw(&DrawCall {
                technique: item.technique,
                object: item.object,
                flags,
            });
            self.stats.draws += 1;
        }
    }

    fn skip(&mut self, reason: SkipReason) -> RegisterOutcome {
        self.stats.skipped += 1;
        RegisterOutcome::Skipped(reason)
    }

    fn apply_shadow_override(&self, property: &ShaderProperty) {
        if self.shadow_override_mask == 0 {
            return;
        }
        let Some(light_data) = property.light_data.as_ref() else {
            return;
        };

        if self.shadow_override_mask == SHADOW_OVERRIDE_ALL {
            light_data.clear_shadow_accum_flags();
        } else {
            light_data.merge_shadow_accum_flags(self.shadow_override_bits);
        }
    }
}
