use super::velocity::{Acceleration, Velocity};
use crate::gravity::{math, GravityComponent};
use bevy::prelude::*;

/// Gravity force for a body with normal gravity. Inverted bodies receive the mirrored force.
#[derive(Debug, Clone, Copy, Resource)]
pub struct Gravity(pub Vec2);

impl Default for Gravity {
    fn default() -> Self {
        Self(Vec2::NEG_Y * 10.)
    }
}

/// Fastest a body may fall, measured along its own gravity.
pub const TERMINAL_VELOCITY: f32 = 300.;

/// An entity who is not falling.
#[derive(Debug, Default, Clone, Copy, Component)]
pub struct Grounded;

/// An entity who experiences [`Gravity`].
#[derive(Debug, Default, Clone, Copy, Component)]
pub struct Gravitational;

pub fn apply_gravity(
    gravity: Res<Gravity>,
    mut object_query: Query<
        (&mut Acceleration, &Velocity, Option<&GravityComponent>),
        (With<Gravitational>, Without<Grounded>),
    >,
) {
    for (mut acceleration, velocity, component) in object_query.iter_mut() {
        let direction = GravityComponent::direction_of(component);
        if math::effective_y(direction, velocity.0.y) > -TERMINAL_VELOCITY {
            acceleration.apply_force(math::effective_vec(direction, gravity.0));
        }
    }
}
