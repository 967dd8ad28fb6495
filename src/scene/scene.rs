// scene/scene.rs
use std::sync::Arc;

use hecs::{Entity, World};
use rayon::prelude::*;

use crate::renderer::accumulator::{Accumulator, RegisterOutcome};
use crate::renderer::commands::{Registration, RegistrationQueue};
use crate::scene::Geometry;

/// Geometry attached to an entity.
#[derive(Debug, Clone)]
pub struct Drawable(pub Arc<Geometry>);

#[derive(Debug, Clone, Copy)]
pub struct Visible(pub bool);

impl Default for Visible {
    fn default() -> Self {
        Self(true)
    }
}

/// Traversal source for accumulators.
pub struct Scene {
    pub world: World,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            world: World::new(),
        }
    }

    pub fn spawn(&mut self, geometry: Geometry) -> Entity {
        self.world
            .spawn((Drawable(Arc::new(geometry)), Visible::default()))
    }

    pub fn set_visible(&mut self, entity: Entity, visible: bool) -> bool {
        match self.world.get::<&mut Visible>(entity) {
            Ok(mut flag) => {
                flag.0 = visible;
                true
            }
            Err(_) => false,
        }
    }

    pub fn len(&self) -> u32 {
        self.world.len()
    }

    pub fn is_empty(&self) -> bool {
        self.world.len() == 0
    }

    /// Visible geometry, ordered by entity id so submission is deterministic.
    fn visible_geometry(&self) -> Vec<Arc<Geometry>> {
        let mut found: Vec<(Entity, Arc<Geometry>)> = self
            .world
            .query::<(&Drawable, &Visible)>()
            .iter()
            .filter(|(_, (_, visible))| visible.0)
            .map(|(entity, (drawable, _))| (entity, Arc::clone(&drawable.0)))
            .collect();
        found.sort_by_key(|(entity, _)| entity.id());
        found.into_iter().map(|(_, geometry)| geometry).collect()
    }

    /// Builds registrations for every visible object in parallel and queues
    /// them for the render thread. Skip rules are left to the accumulator.
    /// Returns how many were queued.
    pub fn submit(&self, queue: &RegistrationQueue, aux: u64) -> usize {
        let registrations: Vec<Registration> = self
            .visible_geometry()
            .into_par_iter()
            .map(|geometry| Registration { geometry, aux })
            .collect();

        let count = registrations.len();
        queue.extend(registrations);
        log::debug!("Queued {} registrations", count);
        count
    }

    /// Registers visible geometry directly on the calling thread.
    pub fn register_into(&self, accumulator: &mut Accumulator, aux: u64) -> Vec<RegisterOutcome> {
        self.visible_geometry()
            .iter()
            .map(|geometry| accumulator.register_object(geometry, aux))
            .collect()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
