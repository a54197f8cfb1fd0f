//! Per-tick interaction tracking: raycast, highlight transitions, and
//! held-interact delivery.
//!
//! The tracker keeps two separate pieces of state: which entity is
//! highlighted, and whether the interact input is held. Releasing the
//! input — or losing the target while holding — delivers the stop
//! notification exactly once, so a machine can never be left accumulating
//! progress with nobody at the controls.

use hecs::{Entity, World};
use tracing::debug;

use crate::components::Vec3;
use crate::hud::HudModel;
use crate::interaction::{is_interactable, with_interactable, InteractionResponse};
use crate::raycast::Raycaster;

/// The player's eye for this tick.
#[derive(Debug, Clone, Copy)]
pub struct ViewPoint {
    pub origin: Vec3,
    pub forward: Vec3,
}

/// A response paired with the entity that produced it.
pub type TaggedResponse = (Entity, InteractionResponse);

#[derive(Debug)]
pub struct InteractionTracker {
    /// Maximum targeting distance.
    pub range: f32,
    current: Option<Entity>,
    interacting: bool,
}

impl InteractionTracker {
    pub fn new(range: f32) -> Self {
        Self {
            range,
            current: None,
            interacting: false,
        }
    }

    /// The currently highlighted entity, if any.
    pub fn current(&self) -> Option<Entity> {
        self.current
    }

    pub fn is_interacting(&self) -> bool {
        self.interacting
    }

    /// The interact input went down. Delivers one immediate interact to the
    /// highlighted target; the per-tick path takes over afterward.
    pub fn begin_interact(
        &mut self,
        world: &World,
        interactor: Entity,
        responses: &mut Vec<TaggedResponse>,
    ) {
        self.interacting = true;
        if let Some(entity) = self.current {
            Self::deliver_interact(world, entity, interactor, responses);
        }
    }

    /// The interact input went up. Notifies the target exactly once.
    pub fn end_interact(&mut self, world: &World, responses: &mut Vec<TaggedResponse>) {
        if !self.interacting {
            return;
        }
        self.interacting = false;
        if let Some(entity) = self.current {
            Self::deliver_release(world, entity, responses);
        }
    }

    /// One frame of targeting: cast, transition highlights, refresh the
    /// prompt, and keep delivering interact while the input is held.
    pub fn tick(
        &mut self,
        world: &World,
        caster: &dyn Raycaster,
        interactor: Entity,
        view: ViewPoint,
        hud: &mut HudModel,
        responses: &mut Vec<TaggedResponse>,
    ) {
        let hit = caster
            .cast(world, view.origin, view.forward, self.range)
            .filter(|h| is_interactable(world, h.entity));

        match hit {
            Some(hit) if Some(hit.entity) == self.current => {
                // Same target; drop it if it stopped accepting interaction
                // (a machine finishing under the crosshair), otherwise keep
                // the prompt tracking its state.
                let allowed =
                    with_interactable(world, hit.entity, |i| i.can_interact()).unwrap_or(false);
                if allowed {
                    self.refresh_prompt(world, hit.entity, hud);
                } else {
                    self.clear_current(world, hud, responses);
                }
            }
            Some(hit) => {
                self.clear_current(world, hud, responses);
                let allowed =
                    with_interactable(world, hit.entity, |i| i.can_interact()).unwrap_or(false);
                if allowed {
                    with_interactable(world, hit.entity, |i| i.on_highlight());
                    self.current = Some(hit.entity);
                    self.refresh_prompt(world, hit.entity, hud);
                    debug!(entity = ?hit.entity, distance = hit.distance, "highlighted");
                }
            }
            None => self.clear_current(world, hud, responses),
        }

        if self.interacting {
            if let Some(entity) = self.current {
                Self::deliver_interact(world, entity, interactor, responses);
            }
        }
    }

    fn refresh_prompt(&self, world: &World, entity: Entity, hud: &mut HudModel) {
        match with_interactable(world, entity, |i| i.interaction_text()).flatten() {
            Some(text) => hud.prompt.show(text),
            None => hud.prompt.hide(),
        }
    }

    /// Unhighlight and forget the current target. While the input is held
    /// this also counts as a release for the old target, so stop semantics
    /// survive the aim drifting away mid-fix.
    fn clear_current(
        &mut self,
        world: &World,
        hud: &mut HudModel,
        responses: &mut Vec<TaggedResponse>,
    ) {
        if let Some(old) = self.current.take() {
            if self.interacting {
                Self::deliver_release(world, old, responses);
            }
            with_interactable(world, old, |i| i.on_unhighlight());
            hud.prompt.hide();
        }
    }

    fn deliver_interact(
        world: &World,
        entity: Entity,
        interactor: Entity,
        responses: &mut Vec<TaggedResponse>,
    ) {
        if let Some(response) = with_interactable(world, entity, |i| i.interact(interactor)) {
            if response != InteractionResponse::None {
                responses.push((entity, response));
            }
        }
    }

    fn deliver_release(world: &World, entity: Entity, responses: &mut Vec<TaggedResponse>) {
        if let Some(response) = with_interactable(world, entity, |i| i.interact_released()) {
            if response != InteractionResponse::None {
                responses.push((entity, response));
            }
        }
    }
}
