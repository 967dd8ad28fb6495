// renderer/group.rs
use crate::renderer::batch::PassList;
use crate::renderer::flags::RenderFlags;
use crate::renderer::state::RendererState;
use crate::renderer::technique::TechniqueId;
use crate::scene::ObjectId;

pub const GROUP_COUNT: usize = 16;

/// Slot of a render group inside a batch classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupKind(u8);

impl GroupKind {
    pub const LOD_TERRAIN: Self = Self(0);
    pub const LOD_OBJECTS: Self = Self(1);
    pub const NO_SHADOW: Self = Self(8);
    pub const LOW_ANISO: Self = Self(9);
    pub const FIRST_PERSON: Self = Self(10);
    pub const INTERFACE: Self = Self(11);
    pub const ALPHA_Z: Self = Self(12);
    pub const SKY_CLOUDS: Self = Self(13);
    pub const PRECIPITATION_OCCLUSION: Self = Self(14);
    pub const VOLUMETRIC_SHADOW: Self = Self(15);

    pub const NAMED: [Self; 10] = [
        Self::LOD_TERRAIN,
        Self::LOD_OBJECTS,
        Self::NO_SHADOW,
        Self::LOW_ANISO,
        Self::FIRST_PERSON,
        Self::INTERFACE,
        Self::ALPHA_Z,
        Self::SKY_CLOUDS,
        Self::PRECIPITATION_OCCLUSION,
        Self::VOLUMETRIC_SHADOW,
    ];

    /// Panics on an out-of-range slot.
    pub fn new(index: usize) -> Self {
        assert!(
            index < GROUP_COUNT,
            "group index {index} out of range (0..{GROUP_COUNT})"
        );
        Self(index as u8)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn is_lod(self) -> bool {
        self == Self::LOD_TERRAIN || self == Self::LOD_OBJECTS
    }

    pub fn name(self) -> &'static str {
        match self.0 {
            0 => "LODTerrain",
            1 => "LODObjects",
            8 => "NoShadow",
            9 => "LowAniso",
            10 => "FirstPerson",
            11 => "Interface",
            12 => "AlphaZ",
            13 => "SkyClouds",
            14 => "PrecipitationOcclusion",
            15 => "VolumetricShadow",
            _ => "Unnamed",
        }
    }
}

/// A named bucket with its own technique lists.
#[derive(Debug)]
pub struct RenderGroup {
    kind: GroupKind,
    precompiled: bool,
    registered: bool,
    passes: PassList,
}

impl RenderGroup {
    pub fn new(kind: GroupKind) -> Self {
        Self {
            kind,
            precompiled: false,
            registered: false,
            passes: PassList::new(),
        }
    }

    /// Precompiled groups draw through [`RenderGroup::render`] instead of
    /// technique-window iteration.
    pub fn precompiled(kind: GroupKind) -> Self {
        Self {
            precompiled: true,
            ..Self::new(kind)
        }
    }

    pub fn kind(&self) -> GroupKind {
        self.kind
    }

    pub fn is_precompiled(&self) -> bool {
        self.precompiled
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    pub fn passes(&self) -> &PassList {
        &self.passes
    }

    pub fn passes_mut(&mut self) -> &mut PassList {
        &mut self.passes
    }

    pub(crate) fn add(&mut self, technique: TechniqueId, object: ObjectId) {
        self.registered = true;
        self.passes.add(technique, object);
    }

    /// Self-contained routine: draws every item in ascending technique order.
    pub fn render(&mut self, flags: RenderFlags, state: &mut dyn RendererState) -> usize {
        let drawn = self.passes.render_all(flags, state);
        self.unregister();
        drawn
    }

    /// Drops whatever is left for this frame.
    pub fn unregister(&mut self) {
        self.passes.clear();
        self.registered = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::recording::RecordingState;

    #[test]
    #[should_panic(expected = "out of range")]
    fn group_index_is_bounded() {
        let _ = GroupKind::new(GROUP_COUNT);
    }

    #[test]
    fn precompiled_render_draws_everything_and_unregisters() {
        let mut group = RenderGroup::precompiled(GroupKind::SKY_CLOUDS);
        group.add(30, ObjectId(1));
        group.add(10, ObjectId(2));
        assert!(group.is_registered());

        let mut state = RecordingState::new();
        assert_eq!(group.render(RenderFlags::empty(), &mut state), 2);

        let techniques: Vec<_> = state.draws().iter().map(|d| d.technique).collect();
        assert_eq!(techniques, vec![10, 30]);
        assert!(!group.is_registered());
        assert!(group.passes().is_empty());
    }
}
