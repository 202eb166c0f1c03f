//! Flip-instead-of-jump controls.

use super::{
    component::{gravity_of, player, set_gravity},
    controller::{active_controller, ActiveController, VvvvvvGravityController},
    math, params, GravityFieldLayer, GravityRequest, GravitySession, GravitySettings,
    GravitySound, PlayerGravity,
};
use crate::physics::{
    gravity::Grounded,
    trigger::{TriggerEnter, TriggerExit},
    velocity::Velocity,
};
use bevy::prelude::*;

/// Enables [`VvvvvvMode::TriggerBased`](super::VvvvvvMode::TriggerBased) controllers while the
/// player is inside.
#[derive(Debug, Default, Clone, Copy, Component)]
#[require(GravityFieldLayer)]
pub struct VvvvvvField;

/// Sent by the player's input when jump is pressed while [`VvvvvvState::active`].
#[derive(Debug, Default, Clone, Copy, Event)]
pub struct VvvvvvJump;

#[derive(Debug, Default, Resource)]
pub struct VvvvvvState {
    /// Whether jumping currently flips gravity instead.
    pub active: bool,
    buffer_remaining: f32,
}

impl VvvvvvState {
    pub fn buffered(&self) -> bool {
        self.buffer_remaining > 0.
    }
}

pub fn handle_vvvvvv_fields(
    mut enter: EventReader<TriggerEnter>,
    mut exit: EventReader<TriggerExit>,
    fields: Query<(), With<VvvvvvField>>,
    players: Query<(), With<PlayerGravity>>,
    mut session: ResMut<GravitySession>,
) {
    for event in exit.read() {
        if fields.contains(event.trigger) && players.contains(event.target) {
            session.vvvvvv_trigger = false;
        }
    }

    for event in enter.read() {
        if fields.contains(event.trigger) && players.contains(event.target) {
            session.vvvvvv_trigger = true;
        }
    }
}

pub fn update_vvvvvv_state(
    controller: ActiveController<VvvvvvGravityController>,
    settings: Res<GravitySettings>,
    session: Res<GravitySession>,
    mut state: ResMut<VvvvvvState>,
) {
    let active = controller
        .get()
        .is_some_and(|controller| controller.is_vvvvvv(&settings, &session));

    if state.active != active {
        info!("vvvvvv mode {}", if active { "enabled" } else { "disabled" });
        state.active = active;
    }

    if !active {
        state.buffer_remaining = 0.;
    }
}

/// Flips the player on jump presses, buffering presses made in the air.
pub fn update_vvvvvv(world: &mut World) {
    let delta = world
        .get_resource::<Time>()
        .map_or(0., |time| time.delta_secs());
    step_vvvvvv(world, delta);
}

pub fn step_vvvvvv(world: &mut World, delta: f32) {
    let pressed = world
        .get_resource_mut::<Events<VvvvvvJump>>()
        .is_some_and(|mut events| events.drain().count() > 0);

    let Some(controller) = active_controller::<VvvvvvGravityController>(world) else {
        return;
    };
    let active = world
        .get_resource::<VvvvvvState>()
        .is_some_and(|state| state.active);
    let Some(player) = player(world).filter(|_| active) else {
        return;
    };

    let grounded = world.get::<Grounded>(player).is_some();
    let Some(mut state) = world.get_resource_mut::<VvvvvvState>() else {
        return;
    };

    let flip = if pressed {
        if !grounded {
            state.buffer_remaining = params::VVVVVV_FLIP_BUFFER;
        }
        grounded
    } else if state.buffer_remaining > 0. {
        state.buffer_remaining -= delta;
        grounded
    } else {
        false
    };

    if flip {
        state.buffer_remaining = 0.;
        flip_player(world, player, &controller);
    }
}

fn flip_player(world: &mut World, player: Entity, controller: &VvvvvvGravityController) {
    if !set_gravity(world, player, GravityRequest::toggle()) {
        return;
    }

    let direction = gravity_of(world, player);
    if let Some(mut velocity) = world.get_mut::<Velocity>(player) {
        velocity.0.y = math::effective_y(direction, -params::VVVVVV_FLIP_SPEED);
    }
    world.entity_mut(player).remove::<Grounded>();

    let sound = world
        .get_resource::<GravitySettings>()
        .and_then(|settings| controller.flip_sound(settings));
    if let Some(sound) = sound {
        if world.contains_resource::<Events<GravitySound>>() {
            world.send_event(GravitySound(sound));
        }
    }
}
