use super::{
    component::{gravity_of, set_gravity},
    controller::{ActiveController, BehaviorGravityController},
    listener::{self, ListenerError, ListenerTarget},
    params, GravityComponent, GravitySettings, GravityType,
};
use crate::physics::collision::Collider;
use bevy::{
    ecs::{component::ComponentId, world::DeferredWorld},
    prelude::*,
};

/// Area a holder has to overlap to pick the entity up. Mirrored along with the main collider.
#[derive(Debug, Default, Clone, Copy, PartialEq, Component)]
pub struct PickupCollider(pub Collider);

/// Carried by the given holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Component)]
pub struct Held(pub Entity);

/// Follows its holder's gravity and falls back to normal some time after being let go.
#[derive(Debug, Clone, Copy, Component)]
#[require(GravityComponent)]
#[component(on_add = listen_for_changes)]
pub struct GravityHoldable {
    invert_time: f32,
    elapsed: f64,
}

/// Frame deltas are rounded to `f32`, so an exact multiple of the step can sum to just under
/// the invert time.
const EXPIRY_TOLERANCE: f64 = 1e-4;

impl Default for GravityHoldable {
    fn default() -> Self {
        Self::new(params::HOLDABLE_INVERT_TIME)
    }
}

impl GravityHoldable {
    pub fn new(invert_time: f32) -> Self {
        Self {
            invert_time,
            elapsed: 0.,
        }
    }

    pub fn invert_time(&self) -> f32 {
        self.invert_time
    }

    /// Also restarts the countdown.
    pub fn set_invert_time(&mut self, invert_time: f32) {
        self.invert_time = invert_time;
        self.elapsed = 0.;
    }

    pub fn remaining(&self) -> f32 {
        (self.invert_time as f64 - self.elapsed).max(0.) as f32
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.;
    }

    fn expired(&self) -> bool {
        self.elapsed + EXPIRY_TOLERANCE >= self.invert_time as f64
    }

    /// Advances the release countdown by `delta`.
    ///
    /// Only counts down while `current` is inverted and the feature is enabled. Returns `true`
    /// on the step the countdown runs out.
    pub fn tick(&mut self, delta: f32, current: GravityType) -> bool {
        if self.invert_time <= 0. || self.expired() || current != GravityType::Inverted {
            return false;
        }

        self.elapsed += delta as f64;
        self.expired()
    }
}

fn listen_for_changes(mut world: DeferredWorld, entity: Entity, _: ComponentId) {
    world.commands().queue(move |world: &mut World| {
        listener::add_listener(
            world,
            entity,
            ListenerTarget::Entity(entity),
            listener::listener(|world, subject, _| {
                let mut holdable = world.get_mut::<GravityHoldable>(subject).ok_or(
                    ListenerError::MissingComponent {
                        entity: subject,
                        component: "GravityHoldable",
                    },
                )?;
                holdable.reset();
                Ok(())
            }),
        );
    });
}

/// New holdables take their invert time from the active behaviour controller, falling back
/// to the player's settings.
pub fn init_holdable_invert_time(
    behavior: ActiveController<BehaviorGravityController>,
    settings: Option<Res<GravitySettings>>,
    mut holdables: Query<&mut GravityHoldable, Added<GravityHoldable>>,
) {
    let invert_time = behavior
        .get()
        .map(|controller| controller.holdable_reset_time)
        .or_else(|| settings.map(|s| s.holdable_invert_time))
        .unwrap_or(params::HOLDABLE_INVERT_TIME);

    for mut holdable in holdables.iter_mut() {
        holdable.set_invert_time(invert_time);
    }
}

pub fn update_holdables(world: &mut World) {
    let delta = world
        .get_resource::<Time>()
        .map_or(0., |time| time.delta_secs());
    step_holdables(world, delta);
}

pub fn step_holdables(world: &mut World, delta: f32) {
    let holdables = world
        .query_filtered::<(Entity, Option<&Held>), With<GravityHoldable>>()
        .iter(world)
        .map(|(entity, held)| (entity, held.map(|h| h.0)))
        .collect::<Vec<_>>();

    for (entity, holder) in holdables {
        match holder {
            Some(holder) => follow_holder(world, entity, holder),
            None => {
                let current = gravity_of(world, entity);
                let expired = world
                    .get_mut::<GravityHoldable>(entity)
                    .is_some_and(|mut holdable| holdable.tick(delta, current));
                if expired {
                    set_gravity(world, entity, GravityType::Normal);
                }
            }
        }
    }
}

fn follow_holder(world: &mut World, entity: Entity, holder: Entity) {
    if let Some(mut holdable) = world.get_mut::<GravityHoldable>(entity) {
        holdable.reset();
    }

    let target = gravity_of(world, holder);
    if gravity_of(world, entity) != target {
        set_gravity(world, entity, target);
    }
}
