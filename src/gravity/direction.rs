use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Which way is down for a subject.
///
/// Only [`GravityType::Normal`] and [`GravityType::Inverted`] are ever stored on a subject.
/// [`GravityType::Toggle`] is a request that resolves against the current value and
/// [`GravityType::None`] is a placeholder for sources that should do nothing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Reflect, Serialize, Deserialize)]
pub enum GravityType {
    None,
    #[default]
    Normal,
    Inverted,
    Toggle,
}

impl GravityType {
    /// Parses the integer codes used by level data and the console.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(Self::None),
            0 => Some(Self::Normal),
            1 => Some(Self::Inverted),
            2 => Some(Self::Toggle),
            _ => None,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::None => -1,
            Self::Normal => 0,
            Self::Inverted => 1,
            Self::Toggle => 2,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Normal => Self::Inverted,
            Self::Inverted => Self::Normal,
            other => other,
        }
    }

    pub fn is_resting(self) -> bool {
        matches!(self, Self::Normal | Self::Inverted)
    }

    /// Multiplier that turns a vertical quantity expressed for normal gravity into one for
    /// this direction.
    pub fn sign(self) -> f32 {
        match self {
            Self::Inverted => -1.,
            _ => 1.,
        }
    }

    pub fn color(self) -> Color {
        match self {
            Self::Normal => Color::srgb(0.0, 0.4, 1.0),
            Self::Inverted => Color::srgb(1.0, 0.2, 0.2),
            Self::Toggle => Color::srgb(0.6, 0.2, 1.0),
            Self::None => Color::WHITE,
        }
    }
}

impl std::fmt::Display for GravityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::None => "None",
            Self::Normal => "Normal",
            Self::Inverted => "Inverted",
            Self::Toggle => "Toggle",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_only_swaps_resting_values() {
        assert_eq!(GravityType::Normal.opposite(), GravityType::Inverted);
        assert_eq!(GravityType::Inverted.opposite(), GravityType::Normal);
        assert_eq!(GravityType::Toggle.opposite(), GravityType::Toggle);
        assert_eq!(GravityType::None.opposite(), GravityType::None);
    }

    #[test]
    fn codes_outside_the_table_are_rejected() {
        assert_eq!(GravityType::from_code(2), Some(GravityType::Toggle));
        assert_eq!(GravityType::from_code(-1), Some(GravityType::None));
        assert_eq!(GravityType::from_code(3), None);
        assert_eq!(GravityType::from_code(-2), None);
        for code in -1..=2 {
            assert_eq!(GravityType::from_code(code).map(GravityType::code), Some(code));
        }
    }
}
