use bevy::app::FixedMainScheduleOrder;
use bevy::{ecs::schedule::ScheduleLabel, prelude::*};
use layers::RegisterPhysicsLayer;

pub mod collision;
pub mod debug;
pub mod gravity;
pub mod layers;
pub mod spatial;
pub mod trigger;
pub mod velocity;

#[allow(unused)]
pub mod prelude {
    pub use super::collision::*;
    pub use super::gravity::*;
    pub use super::layers;
    pub use super::trigger::*;
    pub use super::velocity::*;
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, ScheduleLabel)]
pub struct Physics;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, SystemSet)]
pub enum CollisionSystems {
    Resolution,
    Grounding,
}

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, SystemSet)]
pub enum PhysicsSystems {
    Velocity,
    Collision,
}

#[derive(Debug)]
pub struct PhysicsPlugin;

impl Plugin for PhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.init_schedule(Physics);
        app.world_mut()
            .resource_mut::<FixedMainScheduleOrder>()
            .insert_after(FixedUpdate, Physics);

        app.register_collision_layer::<layers::Wall>()
            .register_grounded_layer::<layers::Wall>();

        app.add_event::<trigger::TriggerEvent>()
            .add_event::<trigger::TriggerEnter>()
            .add_event::<trigger::TriggerExit>()
            .init_resource::<gravity::Gravity>()
            .insert_resource(debug::ShowCollision(false))
            .add_systems(Startup, spatial::init_static_body_storage)
            .add_systems(Update, debug::update_show_collision)
            .add_systems(
                PostUpdate,
                debug::debug_draw_colliders.after(TransformSystem::TransformPropagate),
            )
            .add_systems(
                Physics,
                (
                    (gravity::apply_gravity, velocity::apply_velocity)
                        .chain()
                        .in_set(PhysicsSystems::Velocity),
                    collision::clear_resolution.before(PhysicsSystems::Collision),
                    (
                        bevy::transform::systems::sync_simple_transforms,
                        bevy::transform::systems::propagate_transforms,
                        spatial::remove_static_body_from_spatial_map,
                        spatial::store_static_body_in_spatial_map,
                    )
                        .chain()
                        .before(PhysicsSystems::Collision)
                        .after(PhysicsSystems::Velocity),
                    trigger::emit_trigger_states
                        .after(CollisionSystems::Resolution)
                        .in_set(PhysicsSystems::Collision),
                ),
            )
            .configure_sets(
                Physics,
                (
                    PhysicsSystems::Velocity.before(PhysicsSystems::Collision),
                    CollisionSystems::Resolution.before(CollisionSystems::Grounding),
                ),
            );
    }
}
