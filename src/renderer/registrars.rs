// renderer/registrars.rs
// Per-mode admission of geometry into the batch classifier.

use crate::renderer::accumulator::Accumulator;
use crate::renderer::batch::PassItem;
use crate::scene::{Geometry, PropertyFlags, ShaderProperty};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistrarKind {
    Default,
    ShadowMapOrMask,
    Interface,
    Lod,
}

impl RegistrarKind {
    /// Returns whether the object was accepted into a list.
    pub fn register(
        self,
        accumulator: &mut Accumulator,
        geometry: &Geometry,
        property: &ShaderProperty,
        aux: u64,
    ) -> bool {
        match self {
            Self::Default => register_default(accumulator, geometry, property, aux),
            Self::ShadowMapOrMask => register_shadow_map_or_mask(accumulator, geometry, property, aux),
            Self::Interface => register_interface(accumulator, geometry, property),
            Self::Lod => register_lod(accumulator, geometry, property),
        }
    }
}

fn pass_item(geometry: &Geometry, property: &ShaderProperty) -> PassItem {
    PassItem {
        technique: property.technique,
        object: geometry.id,
    }
}

fn register_default(
    accumulator: &mut Accumulator,
    geometry: &Geometry,
    property: &ShaderProperty,
    _aux: u64,
) -> bool {
    let item = pass_item(geometry, property);
    let batch = accumulator.batch_mut();

    if property.flags.contains(PropertyFlags::BLENDED_DECAL) {
        batch.add_decal(item, true);
    } else if property.flags.contains(PropertyFlags::DECAL) {
        batch.add_decal(item, false);
    } else {
        batch.add(item, property.group);
    }
    true
}

fn register_shadow_map_or_mask(
    accumulator: &mut Accumulator,
    geometry: &Geometry,
    property: &ShaderProperty,
    aux: u64,
) -> bool {
    if !property.casts_shadows() {
        return false;
    }
    register_default(accumulator, geometry, property, aux)
}

/// Interface elements ignore group hints and decal flags.
fn register_interface(accumulator: &mut Accumulator, geometry: &Geometry, property: &ShaderProperty) -> bool {
    accumulator
        .batch_mut()
        .add(pass_item(geometry, property), None);
    true
}

fn register_lod(accumulator: &mut Accumulator, geometry: &Geometry, property: &ShaderProperty) -> bool {
    match property.group {
        Some(group) if group.is_lod() => {
            accumulator
                .batch_mut()
                .add(pass_item(geometry, property), Some(group));
            true
        }
        _ => false,
    }
}
