use super::{
    component::{gravity_of, set_gravity},
    math, params, GravityFieldLayer, GravitySound, GravityType, PlayerGravity,
};
use crate::physics::{gravity::Grounded, trigger::TriggerEvent, velocity::Velocity};
use bevy::prelude::*;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum SpringOrientation {
    #[default]
    Floor,
    Ceiling,
}

/// A pad that sets the player's gravity when touched and bounces them off.
#[derive(Debug, Clone, Copy, Component)]
#[require(GravityFieldLayer)]
pub struct GravitySpring {
    pub orientation: SpringOrientation,
    pub gravity_type: GravityType,
    /// Seconds before the spring changes gravity again. The bounce itself has no cooldown.
    pub cooldown: f32,
    cooldown_remaining: f32,
}

impl Default for GravitySpring {
    fn default() -> Self {
        Self::new(SpringOrientation::Floor, GravityType::Toggle)
    }
}

impl GravitySpring {
    pub fn new(orientation: SpringOrientation, gravity_type: GravityType) -> Self {
        Self {
            orientation,
            gravity_type,
            cooldown: params::SPRING_COOLDOWN,
            cooldown_remaining: 0.,
        }
    }

    pub fn ready(&self) -> bool {
        self.cooldown_remaining <= 0.
    }
}

/// The player touched `spring`. Returns whether the spring changed gravity or bounced.
pub fn spring_contact(world: &mut World, spring_entity: Entity, player: Entity) -> bool {
    if world.get::<PlayerGravity>(player).is_none() {
        return false;
    }

    let Some(spring) = world.get::<GravitySpring>(spring_entity).copied() else {
        return false;
    };
    let Some(velocity) = world.get::<Velocity>(player).map(|v| v.0) else {
        return false;
    };

    // only springs the player moves into
    match spring.orientation {
        SpringOrientation::Floor if velocity.y > 0. => return false,
        SpringOrientation::Ceiling if velocity.y < 0. => return false,
        _ => {}
    }

    let applied = spring.ready() && set_gravity(world, player, spring.gravity_type);
    if applied {
        if let Some(mut spring) = world.get_mut::<GravitySpring>(spring_entity) {
            spring.cooldown_remaining = spring.cooldown;
        }
    }

    let direction = gravity_of(world, player);
    let bounces = matches!(
        (spring.orientation, direction),
        (SpringOrientation::Floor, GravityType::Normal)
            | (SpringOrientation::Ceiling, GravityType::Inverted)
    );

    if bounces {
        if let Some(mut velocity) = world.get_mut::<Velocity>(player) {
            velocity.0.y = math::effective_y(direction, params::SPRING_BOUNCE_SPEED);
        }
        world.entity_mut(player).remove::<Grounded>();
    }

    if !applied && !bounces {
        return false;
    }

    if world.contains_resource::<Events<GravitySound>>() {
        world.send_event(GravitySound(params::SPRING_SOUND.to_owned()));
    }

    true
}

pub fn tick_spring_cooldowns(time: Res<Time>, mut springs: Query<&mut GravitySpring>) {
    for mut spring in springs.iter_mut() {
        if spring.cooldown_remaining > 0. {
            spring.cooldown_remaining = (spring.cooldown_remaining - time.delta_secs()).max(0.);
        }
    }
}

pub fn handle_spring_triggers(
    mut commands: Commands,
    mut reader: EventReader<TriggerEvent>,
    springs: Query<(), With<GravitySpring>>,
    players: Query<(), With<PlayerGravity>>,
) {
    for TriggerEvent { trigger, target } in reader.read().copied() {
        if springs.contains(trigger) && players.contains(target) {
            commands.queue(move |world: &mut World| {
                spring_contact(world, trigger, target);
            });
        }
    }
}
