use super::GravityType;
use bevy::{prelude::*, utils::HashMap};
use serde::{Deserialize, Serialize};

/// Gravity state that survives room transitions for the length of one playthrough.
#[derive(Debug, Clone, PartialEq, Resource, Serialize, Deserialize)]
pub struct GravitySession {
    /// Mirrors the player's direction.
    pub current_gravity: GravityType,
    /// The player's direction when they last left a room.
    pub previous_gravity: Option<GravityType>,
    /// Direction the player spawns with when nothing else applies.
    pub initial_gravity: GravityType,
    pub override_semaphore: u32,
    pub flags: HashMap<String, bool>,
    pub vvvvvv_trigger: bool,
    /// Set when a debug command altered gravity.
    pub run_invalidated: bool,
}

impl Default for GravitySession {
    fn default() -> Self {
        Self::new(GravityType::Normal)
    }
}

impl GravitySession {
    pub fn new(initial_gravity: GravityType) -> Self {
        Self {
            current_gravity: initial_gravity,
            previous_gravity: None,
            initial_gravity,
            override_semaphore: 0,
            flags: HashMap::default(),
            vvvvvv_trigger: false,
            run_invalidated: false,
        }
    }

    /// The direction the player takes when attaching without a spawn field.
    pub fn spawn_gravity(&self) -> GravityType {
        self.previous_gravity.unwrap_or(self.initial_gravity)
    }

    pub fn begin_transition(&mut self) {
        self.previous_gravity = Some(self.current_gravity);
    }

    pub fn flag(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    pub fn set_flag(&mut self, name: &str, value: bool) {
        self.flags.insert(name.to_owned(), value);
    }

    pub fn push_override(&mut self) {
        self.override_semaphore += 1;
    }

    pub fn pop_override(&mut self) {
        self.override_semaphore = self.override_semaphore.saturating_sub(1);
    }

    pub fn overridden(&self) -> bool {
        self.override_semaphore > 0
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Scene references the gravity systems need, passed around instead of kept in statics.
#[derive(Debug, Default, Resource)]
pub struct GravityContext {
    pub player: Option<Entity>,
    next_controller_order: u64,
}

impl GravityContext {
    pub(crate) fn next_controller_order(&mut self) -> u64 {
        self.next_controller_order += 1;
        self.next_controller_order
    }
}

/// Sent when the player leaves a room.
#[derive(Debug, Default, Clone, Copy, Event)]
pub struct RoomTransition;

pub fn begin_room_transition(
    mut reader: EventReader<RoomTransition>,
    mut session: ResMut<GravitySession>,
) {
    if reader.read().last().is_some() {
        session.begin_transition();
    }
}
