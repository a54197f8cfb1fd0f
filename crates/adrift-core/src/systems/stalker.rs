//! The stalker hazard: statues that only move while unobserved.

use hecs::{Entity, World};
use rand::Rng;
use tracing::{debug, info};

use crate::components::{StalkerStatue, Transform, Vec3};
use crate::events::WorldEvent;
use crate::systems::interaction::ViewPoint;

/// Shard scatter rolled when a statue breaks, for the host's VFX layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ShardScatter {
    pub scales: Vec<f32>,
}

/// Whether the viewer's look cone covers a point.
fn is_observed(view: ViewPoint, half_angle_deg: f32, point: Vec3) -> bool {
    let offset = point - view.origin;
    if offset.length() <= f32::EPSILON {
        return true;
    }
    view.forward.normalize().dot(&offset.normalize()) >= half_angle_deg.to_radians().cos()
}

/// Advance every statue that is currently unobserved.
pub fn stalker_system(world: &mut World, view: ViewPoint, dt: f32, events: &mut Vec<WorldEvent>) {
    for (_, (statue, transform)) in world.query_mut::<(&mut StalkerStatue, &mut Transform)>() {
        if statue.broken || statue.reached {
            continue;
        }
        if is_observed(view, statue.observe_half_angle_deg, transform.position) {
            continue;
        }

        let to_player = view.origin - transform.position;
        let distance = to_player.length();
        let step = statue.speed * dt;
        if distance <= statue.reach + step {
            transform.position = view.origin;
            statue.reached = true;
            events.push(WorldEvent::StalkerReachedPlayer);
            info!("stalker reached the player");
        } else {
            transform.position = transform.position + to_player.normalize() * step;
            transform.forward = to_player.normalize();
            debug!(distance, "stalker advanced");
        }
    }
}

/// Shatter a statue: it never moves again, and the scatter tells the host
/// how many shards to spawn and at what scales.
pub fn break_statue(
    world: &mut World,
    entity: Entity,
    rng: &mut impl Rng,
) -> Option<ShardScatter> {
    let mut statue = world.get::<&mut StalkerStatue>(entity).ok()?;
    if statue.broken {
        return None;
    }
    statue.broken = true;

    let spec = statue.shards;
    let count = rng.gen_range(spec.min_shards..=spec.max_shards);
    let scales = (0..count)
        .map(|_| rng.gen_range(spec.min_scale..=spec.max_scale))
        .collect();
    info!(count, "stalker shattered");
    Some(ShardScatter { scales })
}
