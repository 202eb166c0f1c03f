use super::params;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// A user override for a level-configured behaviour.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Reflect, Serialize, Deserialize)]
pub enum Setting {
    /// Whatever the level's controller says.
    #[default]
    Default,
    Enabled,
    Disabled,
}

impl Setting {
    pub fn resolve(self, level: bool) -> bool {
        match self {
            Self::Default => level,
            Self::Enabled => true,
            Self::Disabled => false,
        }
    }
}

/// Player-facing gravity options.
#[derive(Debug, Clone, Resource, Reflect, Serialize, Deserialize)]
pub struct GravitySettings {
    pub vvvvvv_mode: Setting,
    pub vvvvvv_flip_sound: Setting,
    /// Used by holdables when no behaviour controller is active.
    pub holdable_invert_time: f32,
}

impl Default for GravitySettings {
    fn default() -> Self {
        Self {
            vvvvvv_mode: Setting::Default,
            vvvvvv_flip_sound: Setting::Default,
            holdable_invert_time: params::HOLDABLE_INVERT_TIME,
        }
    }
}
