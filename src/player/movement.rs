use super::{params, Action, Direction, Player};
use crate::gravity::{math, GravityComponent, VvvvvvJump, VvvvvvState};
use crate::physics::prelude::*;
use bevy::prelude::*;
use leafwing_input_manager::prelude::ActionState;

#[derive(Debug, Component)]
pub struct Jumping(Timer);

impl Default for Jumping {
    fn default() -> Self {
        Self(Timer::from_seconds(params::JUMP_MAX_DURATION, TimerMode::Once))
    }
}

/// The player is pressed against a wall on `side` (-1 left, 1 right).
#[derive(Debug, Clone, Copy, PartialEq, Component)]
pub struct WallContact {
    pub side: f32,
}

pub(super) fn start_jump(
    mut commands: Commands,
    player: Option<
        Single<(Entity, &ActionState<Action>, Has<Grounded>, Has<WallContact>), With<Player>>,
    >,
    vvvvvv: Res<VvvvvvState>,
    mut flips: EventWriter<VvvvvvJump>,
) {
    let Some((entity, action_state, grounded, on_wall)) = player.map(|p| p.into_inner()) else {
        return;
    };

    if !action_state.just_pressed(&Action::Jump) {
        return;
    }

    if vvvvvv.active {
        flips.send(VvvvvvJump);
    } else if grounded || on_wall {
        commands.entity(entity).insert(Jumping::default());
    }
}

pub(super) fn jumping(
    mut commands: Commands,
    player: Option<
        Single<
            (
                Entity,
                &ActionState<Action>,
                &GravityComponent,
                &mut Velocity,
                &mut Jumping,
            ),
            With<Player>,
        >,
    >,
    time: Res<Time>,
) {
    let Some((entity, action_state, gravity, mut velocity, mut jumping)) =
        player.map(|p| p.into_inner())
    else {
        return;
    };

    jumping.0.tick(time.delta());
    if jumping.0.finished() || !action_state.pressed(&Action::Jump) {
        commands.entity(entity).remove::<Jumping>();
        velocity.0.y /= 2.;
        return;
    }

    velocity.0.y = math::effective_y(gravity.current(), params::JUMP_SPEED);
}

pub(super) fn wall_jump_impulse(
    player: Option<
        Single<(&mut Velocity, &WallContact), (With<Player>, Added<Jumping>, Without<Grounded>)>,
    >,
) {
    let Some((mut velocity, contact)) = player.map(|p| p.into_inner()) else {
        return;
    };

    velocity.0.x = -contact.side * params::WALL_IMPULSE;
}

/// Tracks whether the collision step pushed the player out of a wall sideways.
pub(super) fn detect_wall_contact(
    mut commands: Commands,
    player: Option<Single<(Entity, &Resolution, Option<&WallContact>), With<Player>>>,
) {
    let Some((entity, resolution, contact)) = player.map(|p| p.into_inner()) else {
        return;
    };

    let push = resolution.get().x;
    if push != 0. {
        let side = -push.signum();
        if contact.map_or(true, |c| c.side != side) {
            commands.entity(entity).insert(WallContact { side });
        }
    } else if contact.is_some() {
        commands.entity(entity).remove::<WallContact>();
    }
}

pub(super) fn wall_slide(
    player: Option<
        Single<(&mut Velocity, &GravityComponent), (With<Player>, With<WallContact>, Without<Grounded>)>,
    >,
) {
    let Some((mut velocity, gravity)) = player.map(|p| p.into_inner()) else {
        return;
    };

    let direction = gravity.current();
    let fall = math::effective_y(direction, velocity.0.y).max(-params::SLIDE_SPEED);
    velocity.0.y = math::effective_y(direction, fall);
}

/// Holding towards the floor in the air pulls the player down faster.
pub(super) fn fast_fall(
    player: Option<
        Single<
            (&ActionState<Action>, &GravityComponent, &mut Acceleration),
            (With<Player>, Without<Grounded>, Without<Jumping>),
        >,
    >,
) {
    let Some((action_state, gravity, mut acceleration)) = player.map(|p| p.into_inner()) else {
        return;
    };

    let direction = gravity.current();
    let axis = math::effective_axis(direction, action_state.clamped_axis_pair(&Action::Run));
    if axis.y < -0.5 {
        acceleration.apply_force(math::down(direction) * params::FAST_FALL_FORCE);
    }
}

pub(super) fn ground_strafe(
    player: Option<Single<(&mut Velocity, &Direction), (With<Player>, With<Grounded>)>>,
) {
    let Some((mut velocity, direction)) = player.map(|p| p.into_inner()) else {
        return;
    };

    velocity.0.x = direction.unit().x * params::WALK_SPEED;
}

pub(super) fn air_strafe(
    player: Option<Single<(&mut Velocity, &Direction), (With<Player>, Without<Grounded>)>>,
) {
    let Some((mut velocity, direction)) = player.map(|p| p.into_inner()) else {
        return;
    };

    match direction {
        Direction::Right => {
            if velocity.0.x < params::WALK_SPEED {
                velocity.0.x = (velocity.0.x + params::AIR_ACCEL * params::WALK_SPEED)
                    .min(params::WALK_SPEED);
            }
        }
        Direction::Left => {
            if velocity.0.x > -params::WALK_SPEED {
                velocity.0.x = (velocity.0.x - params::AIR_ACCEL * params::WALK_SPEED)
                    .max(-params::WALK_SPEED);
            }
        }
        Direction::None => {}
    }
}

pub(super) fn air_damping(
    player: Option<
        Single<&mut Velocity, (With<Player>, Without<Grounded>, Without<WallContact>)>,
    >,
) {
    let Some(mut velocity) = player else {
        return;
    };

    velocity.0.x *= 1.0 - params::AIR_DAMPING;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gravity::{test_world, GravityHooks, GravityType};
    use approx::assert_relative_eq;

    fn inverted_body(world: &mut World, velocity: Vec2) -> Entity {
        let entity = world
            .spawn((
                Player,
                Velocity(velocity),
                WallContact { side: 1. },
                GravityComponent {
                    update_entity: false,
                    hooks: GravityHooks::default(),
                    ..Default::default()
                },
            ))
            .id();
        world.flush();
        crate::gravity::set_gravity(world, entity, GravityType::Inverted);
        entity
    }

    #[test]
    fn wall_slide_caps_the_fall_towards_the_ceiling() {
        let mut world = test_world();
        let player = inverted_body(&mut world, Vec2::new(0., 200.));

        let mut schedule = Schedule::default();
        schedule.add_systems(wall_slide);
        schedule.run(&mut world);

        let velocity = world.get::<Velocity>(player).unwrap();
        assert_relative_eq!(velocity.0.y, params::SLIDE_SPEED);
    }

    #[test]
    fn wall_slide_leaves_upward_motion_alone() {
        let mut world = test_world();
        let player = inverted_body(&mut world, Vec2::new(0., -120.));

        let mut schedule = Schedule::default();
        schedule.add_systems(wall_slide);
        schedule.run(&mut world);

        let velocity = world.get::<Velocity>(player).unwrap();
        assert_relative_eq!(velocity.0.y, -120.);
    }
}
