// renderer/mode_table.rs
use std::sync::OnceLock;

use crate::renderer::finishers::FinisherKind;
use crate::renderer::registrars::RegistrarKind;

pub const RENDER_MODE_COUNT: usize = 30;

/// Index into the render-mode table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderMode(u32);

impl RenderMode {
    pub const DEFAULT: Self = Self(0);
    pub const SHADOW_MAP_OR_MASK_FIRST: Self = Self(12);
    pub const SHADOW_MAP_OR_MASK_LAST: Self = Self(17);
    pub const INTERFACE: Self = Self(20);
    pub const FIRST_PERSON: Self = Self(22);
    pub const LOD_ONLY: Self = Self(25);
    pub const LOD_ONLY_SECONDARY: Self = Self(26);
    pub const PRECIPITATION_OCCLUSION: Self = Self(28);

    /// Panics when `index` is outside the table.
    pub fn new(index: u32) -> Self {
        assert!(
            (index as usize) < RENDER_MODE_COUNT,
            "render mode {index} out of range (0..{RENDER_MODE_COUNT})"
        );
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn is_default(self) -> bool {
        self == Self::DEFAULT
    }

    pub fn is_shadow_map_or_mask(self) -> bool {
        (Self::SHADOW_MAP_OR_MASK_FIRST..=Self::SHADOW_MAP_OR_MASK_LAST).contains(&self)
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (0..RENDER_MODE_COUNT as u32).map(Self)
    }
}

/// Registrar/finisher pair per mode. Empty slots resolve to slot 0, which is
/// always populated.
#[derive(Debug, Clone)]
pub struct RenderModeTable {
    registrars: [Option<RegistrarKind>; RENDER_MODE_COUNT],
    finishers: [Option<FinisherKind>; RENDER_MODE_COUNT],
}

impl RenderModeTable {
    pub fn new(default_registrar: RegistrarKind, default_finisher: FinisherKind) -> Self {
        let mut registrars = [None; RENDER_MODE_COUNT];
        let mut finishers = [None; RENDER_MODE_COUNT];
        registrars[0] = Some(default_registrar);
        finishers[0] = Some(default_finisher);
        Self {
            registrars,
            finishers,
        }
    }

    pub fn with_registrar(mut self, mode: RenderMode, registrar: RegistrarKind) -> Self {
        self.registrars[mode.index()] = Some(registrar);
        self
    }

    /// Slot 0 cannot be cleared.
    pub fn with_finisher(mut self, mode: RenderMode, finisher: Option<FinisherKind>) -> Self {
        if mode.is_default() && finisher.is_none() {
            return self;
        }
        self.finishers[mode.index()] = finisher;
        self
    }

    /// Table used by every accumulator unless one is supplied explicitly.
    pub fn standard() -> &'static Self {
        static TABLE: OnceLock<RenderModeTable> = OnceLock::new();
        TABLE.get_or_init(Self::build_standard)
    }

    fn build_standard() -> Self {
        let mut table = Self::new(RegistrarKind::Default, FinisherKind::Default);

        for index in 0..RENDER_MODE_COUNT as u32 {
            let mode = RenderMode(index);
            let registrar = match index {
                0..=11 | 22 | 27 | 29 => Some(RegistrarKind::Default),
                12..=17 => Some(RegistrarKind::ShadowMapOrMask),
                20 => Some(RegistrarKind::Interface),
                25 | 26 => Some(RegistrarKind::Lod),
                _ => None,
            };
            if let Some(registrar) = registrar {
                table = table.with_registrar(mode, registrar);
            }

            let finisher = match index {
                12..=17 => Some(FinisherKind::ShadowMapOrMask),
                20 => Some(FinisherKind::InterfaceElements),
                22 => Some(FinisherKind::FirstPerson),
                25 | 26 => Some(FinisherKind::LodOnly),
                28 => Some(FinisherKind::PrecipitationOcclusion),
                _ => None,
            };
            table = table.with_finisher(mode, finisher);
        }

        table
    }

    pub fn registrar(&self, mode: RenderMode) -> RegistrarKind {
        match self.registrars[mode.index()] {
            Some(registrar) => registrar,
            None => {
                log::debug!("No registrar for render mode {}, using slot 0", mode.index());
                self.default_registrar()
            }
        }
    }

    pub fn finisher(&self, mode: RenderMode) -> FinisherKind {
        match self.finishers[mode.index()] {
            Some(finisher) => finisher,
            None => {
                log::debug!("No finisher for render mode {}, using slot 0", mode.index());
                self.default_finisher()
            }
        }
    }

    pub fn resolve(&self, mode: RenderMode) -> (RegistrarKind, FinisherKind) {
        (self.registrar(mode), self.finisher(mode))
    }

    pub fn has_explicit_finisher(&self, mode: RenderMode) -> bool {
        self.finishers[mode.index()].is_some()
    }

    fn default_registrar(&self) -> RegistrarKind {
        self.registrars[0].unwrap_or(RegistrarKind::Default)
    }

    fn default_finisher(&self) -> FinisherKind {
        self.finishers[0].unwrap_or(FinisherKind::Default)
    }
}
