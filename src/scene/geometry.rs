// scene/geometry.rs
// Drawable geometry as seen by the accumulator.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use bitflags::bitflags;

use crate::renderer::group::GroupKind;
use crate::renderer::technique::TechniqueId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    TriShape,
    Particles,
    ParticleShaderDynamicTriShape,
}

impl GeometryKind {
    pub fn is_particle(self) -> bool {
        matches!(self, Self::Particles | Self::ParticleShaderDynamicTriShape)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkinInstance {
    Standard,
    /// Dismemberable part; invisible parts are never registered.
    Dismember { visible: bool },
}

impl SkinInstance {
    pub fn is_hidden_dismember_part(&self) -> bool {
        matches!(self, Self::Dismember { visible: false })
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PropertyFlags: u32 {
        const CAST_SHADOWS = 1 << 0;
        const DECAL = 1 << 1;
        const BLENDED_DECAL = 1 << 2;
    }
}

/// Light-data block attached to a shader property. The accumulator may
/// rewrite its shadow accumulation flags while the owning object registers.
#[derive(Debug, Default)]
pub struct LightData {
    shadow_accum_flags: AtomicU32,
}

impl LightData {
    pub fn new(shadow_accum_flags: u32) -> Self {
        Self {
            shadow_accum_flags: AtomicU32::new(shadow_accum_flags),
        }
    }

    pub fn shadow_accum_flags(&self) -> u32 {
        self.shadow_accum_flags.load(Ordering::Acquire)
    }

    pub fn clear_shadow_accum_flags(&self) {
        self.shadow_accum_flags.store(0, Ordering::Release);
    }

    pub fn merge_shadow_accum_flags(&self, bits: u32) {
        self.shadow_accum_flags.fetch_or(bits, Ordering::AcqRel);
    }
}

#[derive(Debug, Clone)]
pub struct ShaderProperty {
    pub technique: TechniqueId,
    /// Group the object asks to be drawn with, if any.
    pub group: Option<GroupKind>,
    pub flags: PropertyFlags,
    pub light_data: Option<Arc<LightData>>,
}

impl ShaderProperty {
    pub fn new(technique: TechniqueId) -> Self {
        Self {
            technique,
            group: None,
            flags: PropertyFlags::CAST_SHADOWS,
            light_data: None,
        }
    }

    pub fn with_group(mut self, group: GroupKind) -> Self {
        self.group = Some(group);
        self
    }

    pub fn with_flags(mut self, flags: PropertyFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_light_data(mut self, light_data: Arc<LightData>) -> Self {
        self.light_data = Some(light_data);
        self
    }

    pub fn casts_shadows(&self) -> bool {
        self.flags.contains(PropertyFlags::CAST_SHADOWS)
    }
}

/// One geometry submission.
#[derive(Debug, Clone)]
pub struct Geometry {
    pub id: ObjectId,
    pub kind: GeometryKind,
    pub shader_property: Option<ShaderProperty>,
    pub skin_instance: Option<SkinInstance>,
    /// Vertex/index data already resident on the GPU.
    pub renderer_data: bool,
}

impl Geometry {
    pub fn new(id: ObjectId, property: ShaderProperty) -> Self {
        Self {
            id,
            kind: GeometryKind::TriShape,
            shader_property: Some(property),
            skin_instance: None,
            renderer_data: true,
        }
    }

    pub fn without_property(id: ObjectId) -> Self {
        Self {
            id,
            kind: GeometryKind::TriShape,
            shader_property: None,
            skin_instance: None,
            renderer_data: true,
        }
    }

    pub fn with_kind(mut self, kind: GeometryKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_skin(mut self, skin: SkinInstance) -> Self {
        self.skin_instance = Some(skin);
        self
    }

    pub fn with_renderer_data(mut self, resident: bool) -> Self {
        self.renderer_data = resident;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_ors_into_existing_flags() {
        let data = LightData::new(0b0101);
        data.merge_shadow_accum_flags(0b0010);
        assert_eq!(data.shadow_accum_flags(), 0b0111);
        data.clear_shadow_accum_flags();
        assert_eq!(data.shadow_accum_flags(), 0);
    }

    #[test]
    fn only_invisible_dismember_parts_are_hidden() {
        assert!(SkinInstance::Dismember { visible: false }.is_hidden_dismember_part());
        assert!(!SkinInstance::Dismember { visible: true }.is_hidden_dismember_part());
        assert!(!SkinInstance::Standard.is_hidden_dismember_part());
    }
}
