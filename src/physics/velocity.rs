use bevy::prelude::*;

#[derive(Debug, Default, Clone, Copy, Component)]
#[require(Acceleration)]
pub struct Velocity(pub Vec2);

/// Absolute max velocity in both the x and y axis.
#[derive(Debug, Clone, Copy, Component)]
pub struct MaxVelocity(pub Vec2);

/// Forces gathered during a physics step, consumed by [`apply_velocity`].
#[derive(Debug, Default, Clone, Component)]
#[require(Mass)]
pub struct Acceleration {
    forces: Vec<Vec2>,
}

impl Acceleration {
    pub fn apply_force(&mut self, force: Vec2) {
        self.forces.push(force);
    }

    pub fn apply(&self, mass: &Mass, velocity: &mut Velocity, max: Option<&MaxVelocity>) {
        for force in self.forces.iter() {
            velocity.0 += *force / mass.0;
        }

        if let Some(max) = max {
            let limit = max.0.abs();
            velocity.0 = velocity.0.clamp(-limit, limit);
        }
    }
}

#[derive(Debug, Clone, Copy, Component)]
pub struct Mass(pub f32);

impl Default for Mass {
    fn default() -> Self {
        Self(1.)
    }
}

pub fn apply_velocity(
    mut query: Query<(
        &mut Transform,
        &mut Velocity,
        &mut Acceleration,
        &Mass,
        Option<&MaxVelocity>,
    )>,
    time: Res<Time>,
) {
    for (mut transform, mut velocity, mut acceleration, mass, max) in query.iter_mut() {
        acceleration.apply(mass, &mut velocity, max);
        transform.translation += (velocity.0 * time.delta_secs()).extend(0.);
        acceleration.forces.clear();
    }
}
