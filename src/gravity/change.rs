use super::GravityType;
use bevy::prelude::*;

/// A request to change a subject's gravity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravityRequest {
    pub gravity_type: GravityType,
    pub momentum_multiplier: f32,
    pub instant: bool,
}

impl GravityRequest {
    pub fn new(gravity_type: GravityType) -> Self {
        Self {
            gravity_type,
            momentum_multiplier: 1.,
            instant: false,
        }
    }

    pub fn toggle() -> Self {
        Self::new(GravityType::Toggle)
    }

    pub fn with_momentum(mut self, momentum_multiplier: f32) -> Self {
        self.momentum_multiplier = momentum_multiplier.max(0.);
        self
    }

    pub fn instant(mut self) -> Self {
        self.instant = true;
        self
    }
}

impl From<GravityType> for GravityRequest {
    fn from(gravity_type: GravityType) -> Self {
        Self::new(gravity_type)
    }
}

/// An accepted transition. Both values are resting directions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravityChange {
    pub new_value: GravityType,
    pub old_value: GravityType,
    pub momentum_multiplier: f32,
    pub was_toggle: bool,
    pub instant: bool,
}

impl GravityChange {
    /// Resolves `request` against the subject's current direction.
    pub fn resolve(current: GravityType, request: &GravityRequest) -> Self {
        let was_toggle = request.gravity_type == GravityType::Toggle;
        let new_value = if was_toggle {
            current.opposite()
        } else {
            request.gravity_type
        };

        Self {
            new_value,
            old_value: current,
            momentum_multiplier: request.momentum_multiplier,
            was_toggle,
            instant: request.instant,
        }
    }

    /// A change with no previous state, used to announce a subject's direction.
    pub fn refresh(current: GravityType) -> Self {
        Self {
            new_value: current,
            old_value: current,
            momentum_multiplier: 1.,
            was_toggle: false,
            instant: true,
        }
    }

    pub fn changed(&self) -> bool {
        self.new_value != self.old_value
    }
}

/// Buffered copy of every accepted transition for systems that don't need to react
/// inside the transition itself.
#[derive(Debug, Clone, Copy, Event)]
pub struct GravityChanged {
    pub entity: Entity,
    pub change: GravityChange,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_resolves_to_the_opposite_of_current() {
        for current in [GravityType::Normal, GravityType::Inverted] {
            let change = GravityChange::resolve(current, &GravityRequest::toggle());
            assert_eq!(change.new_value, current.opposite());
            assert_eq!(change.old_value, current);
            assert!(change.was_toggle);
            assert!(change.changed());
        }
    }

    #[test]
    fn same_value_is_an_unchanged_transition() {
        let change = GravityChange::resolve(
            GravityType::Inverted,
            &GravityRequest::new(GravityType::Inverted),
        );
        assert!(!change.changed());
        assert!(!change.was_toggle);
    }

    #[test]
    fn momentum_is_never_negative() {
        let request = GravityRequest::new(GravityType::Inverted).with_momentum(-3.);
        assert_eq!(request.momentum_multiplier, 0.);
    }
}
