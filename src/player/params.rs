use bevy::math::Vec2;

pub const PLAYER_SIZE: Vec2 = Vec2::new(10., 14.);

pub const MAX_VEL: f32 = 300.;
pub const WALL_IMPULSE: f32 = 160.;
pub const WALK_SPEED: f32 = 110.;
pub const AIR_ACCEL: f32 = 0.08;
pub const AIR_DAMPING: f32 = 0.04;
pub const SLIDE_SPEED: f32 = 40.;

pub const JUMP_SPEED: f32 = 200.;
pub const JUMP_MAX_DURATION: f32 = 0.2;

/// Extra pull towards the floor while holding down in the air.
pub const FAST_FALL_FORCE: f32 = 8.;

/// Horizontal speed added to a holdable when it is let go.
pub const THROW_SPEED: f32 = 120.;
