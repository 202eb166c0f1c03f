/// A field plays its sound at most once within this window.
pub const AUDIO_MUFFLE_SECONDS: f32 = 0.2;

/// Seconds a released holdable stays inverted before falling back to normal.
pub const HOLDABLE_INVERT_TIME: f32 = 2.;

/// Speed a VVVVVV flip launches the player towards the new floor.
pub const VVVVVV_FLIP_SPEED: f32 = 160.;
/// How long an airborne flip press waits for the player to land.
pub const VVVVVV_FLIP_BUFFER: f32 = 0.1;
pub const VVVVVV_FLIP_SOUND: &str = "audio/sfx/gravity_toggle.wav";

/// Nested listener dispatches beyond this depth are dropped.
pub const MAX_DISPATCH_DEPTH: usize = 8;

pub const SPRING_COOLDOWN: f32 = 1.;
pub const SPRING_BOUNCE_SPEED: f32 = 250.;
pub const SPRING_SOUND: &str = "audio/sfx/spring.wav";
