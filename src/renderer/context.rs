// renderer/context.rs
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::renderer::accumulator::AccumulatorId;
use crate::renderer::commands::{CommandQueue, RenderCommand};
use crate::renderer::state::RendererState;
use crate::settings::AccumulatorSettings;

/// Render-thread state shared between passes.
#[derive(Debug)]
pub struct ShaderGlobals {
    current_accumulator: Mutex<Option<AccumulatorId>>,
    lod_landscape_noise: AtomicBool,
    water_stencil_present: AtomicBool,
    use_early_z: bool,
    log_unexercised_modes: bool,
}

impl ShaderGlobals {
    pub fn new() -> Self {
        Self {
            current_accumulator: Mutex::new(None),
            lod_landscape_noise: AtomicBool::new(true),
            water_stencil_present: AtomicBool::new(false),
            use_early_z: false,
            log_unexercised_modes: true,
        }
    }

    pub fn from_settings(settings: &AccumulatorSettings) -> Self {
        Self {
            use_early_z: settings.use_early_z,
            log_unexercised_modes: settings.log_unexercised_modes,
            ..Self::new()
        }
    }

    pub fn current_accumulator(&self) -> Option<AccumulatorId> {
        *self.lock_current()
    }

    /// Makes `id` the current accumulator until the returned scope drops.
    /// The previous accumulator is restored on every exit path.
    pub fn bind_accumulator<'a>(
        &'a self,
        id: AccumulatorId,
        commands: &'a CommandQueue<RenderCommand>,
    ) -> AccumulatorScope<'a> {
        let previous = self.lock_current().replace(id);
        commands.insert(RenderCommand::SetAccumulator(Some(id)));
        AccumulatorScope {
            globals: self,
            commands,
            previous,
        }
    }

    pub fn lod_landscape_noise(&self) -> bool {
        self.lod_landscape_noise.load(Ordering::Acquire)
    }

    /// Disables LOD landscape noise until the returned scope drops.
    pub fn suspend_lod_landscape_noise(&self) -> LodNoiseScope<'_> {
        self.lod_landscape_noise.store(false, Ordering::Release);
        LodNoiseScope { globals: self }
    }

    pub fn water_stencil_present(&self) -> bool {
        self.water_stencil_present.load(Ordering::Acquire)
    }

    /// Cleared when a main-pass sequence starts, set once its water stencil
    /// has been drawn.
    pub fn set_water_stencil_present(&self, present: bool) {
        self.water_stencil_present.store(present, Ordering::Release);
    }

    pub fn use_early_z(&self) -> bool {
        self.use_early_z
    }

    pub fn log_unexercised_modes(&self) -> bool {
        self.log_unexercised_modes
    }

    fn lock_current(&self) -> MutexGuard<'_, Option<AccumulatorId>> {
        self.current_accumulator
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for ShaderGlobals {
    fn default() -> Self {
        Self::new()
    }
}

pub struct AccumulatorScope<'a> {
    globals: &'a ShaderGlobals,
    commands: &'a CommandQueue<RenderCommand>,
    previous: Option<AccumulatorId>,
}

impl Drop for AccumulatorScope<'_> {
    fn drop(&mut self) {
        self.commands.insert(RenderCommand::ClearShaderAndTechnique);
        *self.globals.lock_current() = self.previous;
        self.commands
            .insert(RenderCommand::SetAccumulator(self.previous));
    }
}

pub struct LodNoiseScope<'a> {
    globals: &'a ShaderGlobals,
}

impl Drop for LodNoiseScope<'_> {
    fn drop(&mut self) {
        self.globals
            .lod_landscape_noise
            .store(true, Ordering::Release);
    }
}

/// Everything a finisher drives besides its accumulator.
pub struct RenderContext<'a> {
    pub state: &'a mut dyn RendererState,
    pub globals: &'a ShaderGlobals,
    pub commands: &'a CommandQueue<RenderCommand>,
}

impl<'a> RenderContext<'a> {
    pub fn new(
        state: &'a mut dyn RendererState,
        globals: &'a ShaderGlobals,
        commands: &'a CommandQueue<RenderCommand>,
    ) -> Self {
        Self {
            state,
            globals,
            commands,
        }
    }

    /// Runs `body` between a begin/end event pair.
    pub(crate) fn event(&mut self, name: &str, body: impl FnOnce(&mut Self)) {
        self.state.begin_event(name);
        body(self);
        self.state.end_event();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulator_scope_restores_previous_binding() {
        let globals = ShaderGlobals::new();
        let commands = CommandQueue::new();

        {
            let _outer = globals.bind_accumulator(AccumulatorId(1), &commands);
            {
                let _inner = globals.bind_accumulator(AccumulatorId(2), &commands);
                assert_eq!(globals.current_accumulator(), Some(AccumulatorId(2)));
            }
            assert_eq!(globals.current_accumulator(), Some(AccumulatorId(1)));
        }

        assert_eq!(globals.current_accumulator(), None);
        assert_eq!(
            commands.drain().last().copied(),
            Some(RenderCommand::SetAccumulator(None))
        );
    }

    #[test]
    fn lod_noise_is_restored_when_scope_drops() {
        let globals = ShaderGlobals::new();
        {
            let _scope = globals.suspend_lod_landscape_noise();
            assert!(!globals.lod_landscape_noise());
        }
        assert!(globals.lod_landscape_noise());
    }
}
