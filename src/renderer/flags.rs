use bitflags::bitflags;

bitflags! {
    /// Per-finish options. Bit values match the engine's raw flag word.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RenderFlags: u32 {
        const DEPTH_ONLY = 0x002;
        const ALPHA_ONLY = 0x008;
        /// Shadow passes: apply the scene depth shift around the batches.
        const DEPTH_SHIFT = 0x020;
        /// Rebind targets and run the lighting/SSR imagespace block.
        const POST_LIGHTING = 0x040;
        const SSR = 0x080;
        const VOLUMETRIC_LIGHTING_SHADOW = 0x100;
    }
}

impl RenderFlags {
    /// Builds flags from a raw word, keeping unknown bits.
    pub fn from_raw(raw: u32) -> Self {
        Self::from_bits_retain(raw)
    }

    pub fn is_depth_only(self) -> bool {
        self.contains(Self::DEPTH_ONLY)
    }

    pub fn is_alpha_only(self) -> bool {
        self.contains(Self::ALPHA_ONLY)
    }

    pub fn wants_ssr(self) -> bool {
        self.contains(Self::SSR)
    }

    pub fn wants_post_lighting(self) -> bool {
        self.contains(Self::POST_LIGHTING)
    }

    pub fn is_volumetric_lighting_shadow(self) -> bool {
        self.contains(Self::VOLUMETRIC_LIGHTING_SHADOW)
    }

    /// Main pass: `flags & 0xA == 0`.
    pub fn applies_scene_depth_shift(self) -> bool {
        !self.intersects(Self::DEPTH_ONLY | Self::ALPHA_ONLY)
    }

    /// Shadow pass: `flags & 0x22 == 0x20`.
    pub fn applies_shadow_depth_shift(self) -> bool {
        self.contains(Self::DEPTH_SHIFT) && !self.contains(Self::DEPTH_ONLY)
    }
}
