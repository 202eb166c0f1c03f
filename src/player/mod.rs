use crate::gravity::{
    math, GravityComponent, GravityFieldLayer, GravityHooks, GravitySystems, PlayerGravity,
};
use crate::physics::{prelude::*, CollisionSystems, Physics, PhysicsSystems};
use crate::visuals::{flip_sprite, FlipFlash};
use bevy::prelude::*;
use bevy::sprite::Anchor;
use leafwing_input_manager::{
    plugin::InputManagerPlugin,
    prelude::{ActionState, InputMap},
    Actionlike,
};

mod carry;
mod input;
mod movement;
pub mod params;

pub use carry::Carrying;
pub use movement::{Jumping, WallContact};

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(InputManagerPlugin::<Action>::default())
            .add_systems(
                Update,
                (update_direction, movement::start_jump, carry::toggle_carry).chain(),
            )
            .add_systems(
                Physics,
                (
                    (
                        movement::fast_fall,
                        movement::wall_slide,
                        movement::jumping,
                        movement::wall_jump_impulse,
                        movement::ground_strafe,
                        movement::air_strafe,
                        movement::air_damping,
                    )
                        .chain()
                        .before(PhysicsSystems::Velocity),
                    movement::detect_wall_contact
                        .after(CollisionSystems::Resolution)
                        .in_set(PhysicsSystems::Collision),
                    carry::follow_holder.after(GravitySystems::Holdables),
                ),
            );
    }
}

#[derive(Default, Component)]
#[require(ActionState<Action>, InputMap<Action>(input::input_map), Direction)]
#[require(PlayerGravity, GravityComponent(gravity), FlipFlash)]
#[require(Velocity, Gravitational, DynamicBody, Collider(collider))]
#[require(MaxVelocity(|| MaxVelocity(Vec2::splat(params::MAX_VEL))))]
#[require(layers::CollidesWith<layers::Wall>)]
#[require(layers::TriggersWith<GravityFieldLayer>)]
#[require(Sprite(sprite))]
pub struct Player;

fn gravity() -> GravityComponent {
    GravityComponent::with_hooks(GravityHooks {
        update_visuals: Some(flip_sprite),
        ..Default::default()
    })
    .with_session_flag("player_inverted")
}

fn collider() -> Collider {
    Collider::from_feet(params::PLAYER_SIZE)
}

fn sprite() -> Sprite {
    Sprite {
        anchor: Anchor::BottomCenter,
        ..Sprite::from_color(Color::WHITE, params::PLAYER_SIZE)
    }
}

#[derive(Actionlike, PartialEq, Eq, Hash, Clone, Copy, Debug, Reflect)]
pub enum Action {
    #[actionlike(DualAxis)]
    Run,
    Jump,
    Interact,
}

#[derive(Default, PartialEq, Eq, Hash, Clone, Copy, Debug, Reflect, Component)]
pub enum Direction {
    #[default]
    None,
    Right,
    Left,
}

impl Direction {
    pub fn unit(self) -> Vec2 {
        match self {
            Self::None => Vec2::ZERO,
            Self::Left => Vec2::NEG_X,
            Self::Right => Vec2::X,
        }
    }

    pub fn from_vec(vec: Vec2) -> Self {
        if vec.x > 0.0 {
            Direction::Right
        } else if vec.x < 0.0 {
            Direction::Left
        } else {
            Direction::None
        }
    }
}

fn update_direction(
    player: Option<
        Single<
            (
                &ActionState<Action>,
                &GravityComponent,
                &mut Direction,
                &mut Sprite,
            ),
            With<Player>,
        >,
    >,
) {
    let Some((action_state, gravity, mut direction, mut sprite)) = player.map(|p| p.into_inner())
    else {
        return;
    };

    let axis = math::effective_axis(gravity.current(), action_state.clamped_axis_pair(&Action::Run));
    let new_direction = Direction::from_vec(axis);
    if *direction != new_direction {
        *direction = new_direction;
    }

    match new_direction {
        Direction::Right => sprite.flip_x = false,
        Direction::Left => sprite.flip_x = true,
        Direction::None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_ignores_vertical_input() {
        assert_eq!(Direction::from_vec(Vec2::new(0.5, -1.)), Direction::Right);
        assert_eq!(Direction::from_vec(Vec2::new(-0.5, 1.)), Direction::Left);
        assert_eq!(Direction::from_vec(Vec2::Y), Direction::None);
        assert_eq!(Direction::None.unit(), Vec2::ZERO);
    }
}
