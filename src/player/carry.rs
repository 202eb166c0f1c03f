//! Picking up and carrying [`GravityHoldable`]s.

use super::{params, Action, Player};
use crate::gravity::{math, GravityComponent, GravityHoldable, GravityType, Held, PickupCollider};
use crate::physics::prelude::*;
use bevy::prelude::*;
use leafwing_input_manager::prelude::ActionState;

/// The holdable the player is carrying.
#[derive(Debug, Clone, Copy, Component)]
pub struct Carrying(pub Entity);

pub(super) fn toggle_carry(
    mut commands: Commands,
    player: Option<
        Single<
            (
                Entity,
                &ActionState<Action>,
                &Transform,
                &Collider,
                &Velocity,
                &Sprite,
                Option<&Carrying>,
            ),
            With<Player>,
        >,
    >,
    holdables: Query<
        (Entity, &Transform, &PickupCollider),
        (With<GravityHoldable>, Without<Held>, Without<Player>),
    >,
    mut velocities: Query<&mut Velocity, (With<GravityHoldable>, Without<Player>)>,
) {
    let Some((entity, action_state, transform, collider, velocity, sprite, carrying)) =
        player.map(|p| p.into_inner())
    else {
        return;
    };

    if !action_state.just_pressed(&Action::Interact) {
        return;
    }

    if let Some(carrying) = carrying {
        commands.entity(entity).remove::<Carrying>();
        if let Some(mut holdable) = commands.get_entity(carrying.0) {
            holdable.remove::<Held>();
        }

        if let Ok(mut held_velocity) = velocities.get_mut(carrying.0) {
            let facing = if sprite.flip_x { -1. } else { 1. };
            held_velocity.0 = velocity.0 + Vec2::X * facing * params::THROW_SPEED;
        }
        return;
    }

    let body = collider.absolute(transform);
    if let Some((holdable, _, _)) = holdables
        .iter()
        .find(|(_, t, pickup)| pickup.0.absolute(t).collides_with(&body))
    {
        commands.entity(holdable).insert(Held(entity));
        commands.entity(entity).insert(Carrying(holdable));
    }
}

/// Where a carried body's origin goes so its feet rest on the holder's head.
pub fn carry_position(
    holder: &AbsoluteCollider,
    direction: GravityType,
    collider: &Collider,
    transform: &Transform,
) -> Vec2 {
    let head = math::surface_y(direction, holder);
    let body = collider.absolute(transform);
    let origin = transform.translation.xy();

    Vec2::new(
        origin.x + holder.center().x - body.center().x,
        origin.y + head - math::feet_y(direction, &body),
    )
}

pub(super) fn follow_holder(
    mut holdables: Query<
        (&Held, &mut Transform, &Collider, &GravityComponent, &mut Velocity),
        Without<Player>,
    >,
    holders: Query<(&Transform, &Collider, &GravityComponent), With<Player>>,
) {
    for (held, mut transform, collider, gravity, mut velocity) in holdables.iter_mut() {
        let Ok((holder_transform, holder_collider, holder_gravity)) = holders.get(held.0) else {
            continue;
        };

        // the holdable only adopts the holder's gravity once the gravity step has run
        if gravity.current() != holder_gravity.current() {
            continue;
        }

        let holder = holder_collider.absolute(holder_transform);
        let position = carry_position(&holder, gravity.current(), collider, &transform);
        transform.translation.x = position.x;
        transform.translation.y = position.y;
        velocity.0 = Vec2::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn carried_bodies_sit_on_the_holders_head() {
        let holder = Collider::from_feet(Vec2::new(10., 14.))
            .absolute(&Transform::from_xyz(20., 0., 0.));
        let crate_collider = Collider::from_feet(Vec2::splat(8.));
        let position = carry_position(
            &holder,
            GravityType::Normal,
            &crate_collider,
            &Transform::from_xyz(-30., -30., 0.),
        );

        assert_relative_eq!(position.x, 20.);
        assert_relative_eq!(position.y, 14.);
    }

    #[test]
    fn inverted_holders_carry_below_themselves() {
        // inverted bodies keep their origin at the feet, which now touch the ceiling
        let holder = math::mirror_collider(&Collider::from_feet(Vec2::new(10., 14.)))
            .absolute(&Transform::from_xyz(0., 100., 0.));
        let crate_collider = math::mirror_collider(&Collider::from_feet(Vec2::splat(8.)));
        let position = carry_position(
            &holder,
            GravityType::Inverted,
            &crate_collider,
            &Transform::default(),
        );

        assert_relative_eq!(position.x, 0.);
        assert_relative_eq!(position.y, 86.);
    }
}
