//! Per entity gravity direction and everything that changes it.
//!
//! A subject's direction lives in its [`GravityComponent`] and only changes through
//! [`set_gravity`]. Fields, springs, holdables, the VVVVVV controls and the console are all
//! sources that end up calling it.

use crate::physics::{layers::RegisterPhysicsLayer, trigger, Physics, PhysicsSystems};
use bevy::prelude::*;

mod change;
mod component;
pub mod console;
mod controller;
mod direction;
mod field;
mod holdable;
pub mod listener;
pub mod math;
pub mod params;
mod session;
mod settings;
mod spring;
mod vvvvvv;

pub use change::{GravityChange, GravityChanged, GravityRequest};
pub use component::{
    default_update_colliders, default_update_position, default_update_speed, gravity_of,
    player, player_gravity, set_gravity, set_player_gravity, should_invert,
    should_invert_checked, should_invert_player, should_invert_player_checked, GeometryHook,
    GravityCommandsExt, GravityComponent, GravityHooks, InvertCheck, PlayerGravity, SetGravity,
};
pub use controller::{
    active_controller, resolve_active, ActiveController, BehaviorGravityController,
    GravityController, SoundGravityController, VvvvvvGravityController, VvvvvvMode,
};
pub use direction::GravityType;
pub use field::{
    actor_kind, field_enter, field_leave, field_stay, spawn_field_gravity, ActorKind,
    GravityField, GravityFieldLayer, GravitySound, SpawnGravityField,
};
pub use holdable::{step_holdables, GravityHoldable, Held, PickupCollider};
pub use listener::{
    add_listener, dispatch_listeners, remove_listener, GravityListener, GravityListeners,
    ListenerError, ListenerFn, ListenerId, ListenerTarget,
};
pub use session::{GravityContext, GravitySession, RoomTransition};
pub use settings::{GravitySettings, Setting};
pub use spring::{spring_contact, GravitySpring, SpringOrientation};
pub use vvvvvv::{step_vvvvvv, VvvvvvField, VvvvvvJump, VvvvvvState};

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, SystemSet)]
pub enum GravitySystems {
    /// Prepares sources for this step: cooldowns, muffles and controller overrides.
    Prepare,
    /// Reacts to trigger overlaps found by the physics step.
    Sources,
    Holdables,
    /// Applies room transitions to the session before anything spawns into the new room.
    Session,
}

#[derive(Debug)]
pub struct GravityPlugin;

impl Plugin for GravityPlugin {
    fn build(&self, app: &mut App) {
        app.register_trigger_layer::<GravityFieldLayer>();

        app.add_event::<GravityChanged>()
            .add_event::<GravitySound>()
            .add_event::<RoomTransition>()
            .add_event::<VvvvvvJump>()
            .add_event::<console::ConsoleInput>()
            .add_event::<console::ConsoleOutput>()
            .register_type::<GravityType>()
            .register_type::<GravitySettings>()
            .init_resource::<GravityListeners>()
            .init_resource::<GravityContext>()
            .init_resource::<GravitySession>()
            .init_resource::<GravitySettings>()
            .init_resource::<VvvvvvState>()
            .add_systems(
                Update,
                (
                    session::begin_room_transition.in_set(GravitySystems::Session),
                    vvvvvv::update_vvvvvv_state,
                    console::handle_console_input,
                    field::play_gravity_sounds,
                ),
            )
            .add_systems(
                Physics,
                (
                    (
                        field::assign_field_sounds,
                        field::tick_field_muffles,
                        spring::tick_spring_cooldowns,
                        holdable::init_holdable_invert_time,
                    )
                        .in_set(GravitySystems::Prepare),
                    (
                        field::handle_field_triggers,
                        spring::handle_spring_triggers,
                        vvvvvv::handle_vvvvvv_fields,
                    )
                        .after(trigger::emit_trigger_states)
                        .in_set(GravitySystems::Sources),
                    (holdable::update_holdables, vvvvvv::update_vvvvvv)
                        .chain()
                        .in_set(GravitySystems::Holdables),
                ),
            )
            .configure_sets(
                Physics,
                (
                    GravitySystems::Prepare.before(PhysicsSystems::Collision),
                    GravitySystems::Sources.after(PhysicsSystems::Collision),
                    GravitySystems::Holdables.after(GravitySystems::Sources),
                ),
            );
    }
}

#[cfg(test)]
pub(crate) fn test_world() -> World {
    let mut world = World::new();
    world.init_resource::<GravityListeners>();
    world.init_resource::<GravityContext>();
    world.init_resource::<GravitySession>();
    world.init_resource::<GravitySettings>();
    world.init_resource::<VvvvvvState>();
    world.init_resource::<Events<GravityChanged>>();
    world.init_resource::<Events<GravitySound>>();
    world.init_resource::<Events<RoomTransition>>();
    world.init_resource::<Events<VvvvvvJump>>();
    world.init_resource::<Events<console::ConsoleInput>>();
    world.init_resource::<Events<console::ConsoleOutput>>();
    world
}
