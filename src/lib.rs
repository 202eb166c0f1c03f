#![allow(clippy::type_complexity)]

pub mod gravity;
pub mod physics;
pub mod player;
pub mod ui;
pub mod visuals;

pub const TILE_SIZE: f32 = 16.;

pub mod prelude {
    pub use crate::gravity::{
        GravityCommandsExt, GravityComponent, GravityField, GravityPlugin, GravitySystems,
        GravityType, PlayerGravity,
    };
    pub use crate::physics::PhysicsPlugin;
    pub use crate::player::{Player, PlayerPlugin};
    pub use crate::ui::UiPlugin;
    pub use crate::visuals::VisualsPlugin;
}
