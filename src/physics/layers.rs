use super::{collision::Collision, trigger::Triggers};
use bevy::prelude::*;
use core::marker::PhantomData;

/// Placed on dynamic bodies to enable collisions with the static bodies of layer `T`.
#[derive(Debug, Component)]
#[require(Collision<T>)]
pub struct CollidesWith<T: Component>(PhantomData<T>);

impl<T: Component> Default for CollidesWith<T> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

/// Placed on any body to let the [`Trigger`](super::trigger::Trigger)s of layer `T` see it.
#[derive(Debug, Component)]
#[require(Triggers<T>)]
pub struct TriggersWith<T: Component>(PhantomData<T>);

impl<T: Component> Default for TriggersWith<T> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

#[derive(Default, Debug, Component)]
pub struct Wall;

pub trait RegisterPhysicsLayer {
    fn register_trigger_layer<T: Component>(&mut self) -> &mut Self;
    fn register_collision_layer<T: Component>(&mut self) -> &mut Self;
    fn register_grounded_layer<T: Component>(&mut self) -> &mut Self;
}

impl RegisterPhysicsLayer for App {
    fn register_trigger_layer<T: Component>(&mut self) -> &mut Self {
        self.add_systems(
            super::Physics,
            super::trigger::handle_triggers::<T>
                .after(super::CollisionSystems::Resolution)
                .before(super::trigger::emit_trigger_states)
                .in_set(super::PhysicsSystems::Collision),
        )
    }

    fn register_collision_layer<T: Component>(&mut self) -> &mut Self {
        self.add_systems(
            super::Physics,
            super::collision::handle_collisions::<T>
                .in_set(super::CollisionSystems::Resolution)
                .in_set(super::PhysicsSystems::Collision),
        )
    }

    fn register_grounded_layer<T: Component>(&mut self) -> &mut Self {
        self.add_systems(
            super::Physics,
            super::collision::update_grounded::<T>
                .in_set(super::CollisionSystems::Grounding)
                .in_set(super::PhysicsSystems::Collision),
        )
    }
}
