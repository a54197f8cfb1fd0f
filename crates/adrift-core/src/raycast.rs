//! Raycast seam between the gameplay core and the host engine.
//!
//! The real game answers "what is the player looking at" with a physics
//! trace. The core only needs the answer, so it asks through [`Raycaster`]
//! and ships a cone-based implementation good enough for headless runs
//! and tests.

use hecs::{Entity, World};

use crate::components::{Transform, Vec3};
use crate::interaction::is_interactable;

/// Result of a cast: the object hit and where.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub entity: Entity,
    pub point: Vec3,
    pub distance: f32,
}

/// Forward-looking query against the scene, supplied by the host.
pub trait Raycaster {
    fn cast(&self, world: &World, origin: Vec3, forward: Vec3, range: f32) -> Option<RayHit>;
}

/// Stand-in for a physics trace: hits the nearest interactable entity
/// inside a view cone around the ray.
#[derive(Debug, Clone, Copy)]
pub struct ConeRaycaster {
    pub half_angle_deg: f32,
}

impl ConeRaycaster {
    pub fn new(half_angle_deg: f32) -> Self {
        Self { half_angle_deg }
    }
}

impl Default for ConeRaycaster {
    fn default() -> Self {
        Self::new(10.0)
    }
}

impl Raycaster for ConeRaycaster {
    fn cast(&self, world: &World, origin: Vec3, forward: Vec3, range: f32) -> Option<RayHit> {
        let forward = forward.normalize();
        if forward == Vec3::ZERO {
            return None;
        }
        let min_alignment = self.half_angle_deg.to_radians().cos();

        let mut best: Option<RayHit> = None;
        for (entity, transform) in world.query::<&Transform>().iter() {
            if !is_interactable(world, entity) {
                continue;
            }
            let offset = transform.position - origin;
            let distance = offset.length();
            if distance <= f32::EPSILON || distance > range {
                continue;
            }
            if forward.dot(&offset.normalize()) < min_alignment {
                continue;
            }
            if best.map_or(true, |b| distance < b.distance) {
                best = Some(RayHit {
                    entity,
                    point: transform.position,
                    distance,
                });
            }
        }
        best
    }
}
