use super::{
    gravity::Grounded,
    layers,
    spatial::{SpatialData, SpatialHash, StaticBodyData},
    velocity::Velocity,
};
use crate::gravity::{math, GravityComponent};
use bevy::prelude::*;
use std::{cmp::Ordering, marker::PhantomData};

/// Entities a [`DynamicBody`] with [`layers::CollidesWith<T>`] touched this frame on layer `T`.
#[derive(Component)]
pub struct Collision<T>(smallvec::SmallVec<[Entity; 4]>, PhantomData<T>);

impl<T> Default for Collision<T> {
    fn default() -> Self {
        Self(smallvec::SmallVec::default(), PhantomData)
    }
}

impl<T> Collision<T> {
    pub fn entities(&self) -> &[Entity] {
        &self.0
    }
}

/// Accumulated push-out applied to this entity during collision checking.
#[derive(Default, Component)]
pub struct Resolution(Vec2);

impl Resolution {
    pub fn get(&self) -> Vec2 {
        self.0
    }
}

/// Never moves after spawning. Stored in the [`SpatialHash`] of its layer.
#[derive(Debug, Default, Clone, Copy, Component)]
#[require(Collider)]
pub struct StaticBody;

#[derive(Debug, Default, Clone, Copy, Component)]
#[require(Collider)]
pub struct DynamicBody;

/// Axis aligned box relative to the entity's [`Transform`].
///
/// Y is up, so `tl.y` is the top edge and `tl.y - size.y` the bottom edge.
#[derive(Debug, Default, Clone, Copy, PartialEq, Component)]
#[require(Resolution)]
pub struct Collider {
    pub tl: Vec2,
    pub size: Vec2,
}

impl Collider {
    pub const fn from_rect(tl: Vec2, size: Vec2) -> Self {
        Self { tl, size }
    }

    /// A box whose bottom edge sits on the origin, centered horizontally.
    pub fn from_feet(size: Vec2) -> Self {
        Self::from_rect(Vec2::new(-size.x / 2., size.y), size)
    }

    pub fn top(&self) -> f32 {
        self.tl.y
    }

    pub fn bottom(&self) -> f32 {
        self.tl.y - self.size.y
    }

    pub fn absolute(&self, transform: &Transform) -> AbsoluteCollider {
        AbsoluteCollider {
            tl: self.tl + transform.translation.xy(),
            size: self.size,
        }
    }

    pub fn global_absolute(&self, transform: &GlobalTransform) -> AbsoluteCollider {
        AbsoluteCollider {
            tl: self.tl + transform.translation().xy(),
            size: self.size,
        }
    }
}

/// A [`Collider`] placed in world space.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct AbsoluteCollider {
    pub tl: Vec2,
    pub size: Vec2,
}

impl AbsoluteCollider {
    pub fn position(&self) -> Vec2 {
        self.tl
    }

    pub fn br(&self) -> Vec2 {
        Vec2::new(self.tl.x + self.size.x, self.tl.y - self.size.y)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.tl.x + self.size.x * 0.5, self.tl.y - self.size.y * 0.5)
    }

    pub fn min_x(&self) -> f32 {
        self.tl.x
    }

    pub fn max_x(&self) -> f32 {
        self.tl.x + self.size.x
    }

    pub fn min_y(&self) -> f32 {
        self.tl.y - self.size.y
    }

    pub fn max_y(&self) -> f32 {
        self.tl.y
    }

    pub fn overlaps_x(&self, other: &Self) -> bool {
        self.min_x() < other.max_x() && other.min_x() < self.max_x()
    }

    pub fn collides_with(&self, other: &Self) -> bool {
        !(other.max_y() < self.min_y()
            || other.min_x() > self.max_x()
            || other.min_y() > self.max_y()
            || other.max_x() < self.min_x())
    }

    /// Smallest push along one axis that separates `self` from `other`.
    pub fn resolution(&self, other: &Self) -> Vec2 {
        let x_overlap = (self.max_x().min(other.max_x()) - self.min_x().max(other.min_x())).max(0.);
        let y_overlap = (self.max_y().min(other.max_y()) - self.min_y().max(other.min_y())).max(0.);

        if x_overlap == 0. || y_overlap == 0. {
            return Vec2::ZERO;
        }

        let delta = self.center() - other.center();
        if x_overlap < y_overlap {
            Vec2::new(x_overlap * delta.x.signum(), 0.)
        } else {
            Vec2::new(0., y_overlap * delta.y.signum())
        }
    }
}

pub fn clear_resolution(mut q: Query<&mut Resolution>) {
    for mut res in q.iter_mut() {
        res.0 = Vec2::ZERO;
    }
}

pub fn handle_collisions<T: Component>(
    map_query: Query<&SpatialHash<StaticBodyData>, With<T>>,
    mut dynamic_bodies: Query<
        (
            &mut Transform,
            &Collider,
            &mut Velocity,
            &mut Resolution,
            &mut Collision<T>,
        ),
        (With<DynamicBody>, With<layers::CollidesWith<T>>),
    >,
) {
    for (mut transform, collider, mut velocity, mut resolution, mut collision) in
        dynamic_bodies.iter_mut()
    {
        let mut absolute = collider.absolute(&transform);
        let mut touched = smallvec::SmallVec::new();

        for map in map_query.iter() {
            let mut nearby = map.nearby_objects(&absolute.position()).collect::<Vec<_>>();

            // deepest overlap first so corners don't snag
            nearby.sort_by(|a, b| {
                let a = absolute.resolution(&a.collider).length_squared();
                let b = absolute.resolution(&b.collider).length_squared();
                b.partial_cmp(&a).unwrap_or(Ordering::Equal)
            });

            for SpatialData {
                entity,
                collider: other,
                ..
            } in nearby
            {
                if !absolute.collides_with(other) {
                    continue;
                }

                let push = absolute.resolution(other);
                if push == Vec2::ZERO {
                    continue;
                }

                touched.push(*entity);
                resolution.0 += push;
                transform.translation += push.extend(0.);
                absolute = collider.absolute(&transform);

                if push.y != 0. {
                    velocity.0.y = 0.;
                }
            }
        }

        collision.0 = touched;
    }
}

/// Inserts [`Grounded`] on bodies resting on layer `T`.
///
/// "Resting" depends on the body's gravity: a normal body stands on the top face of a
/// static body, an inverted one hangs from its bottom face.
pub fn update_grounded<T: Component>(
    mut commands: Commands,
    map_query: Query<&SpatialHash<StaticBodyData>, With<T>>,
    dynamic_bodies: Query<
        (
            Entity,
            &Transform,
            &Collider,
            &Velocity,
            Option<&GravityComponent>,
        ),
        (With<DynamicBody>, With<layers::CollidesWith<T>>),
    >,
) {
    for (entity, transform, collider, velocity, gravity) in dynamic_bodies.iter() {
        let direction = GravityComponent::direction_of(gravity);
        let absolute = collider.absolute(transform);
        let feet = math::feet_y(direction, &absolute);
        let falling_or_still = math::effective_y(direction, velocity.0.y) <= 0.;

        let grounded = falling_or_still
            && map_query.iter().any(|map| {
                map.nearby_objects(&absolute.position()).any(|data| {
                    let surface = math::surface_y(direction, &data.collider);
                    (feet - surface).abs() < 0.1 && absolute.overlaps_x(&data.collider)
                })
            });

        if grounded {
            commands.entity(entity).insert(Grounded);
        } else {
            commands.entity(entity).remove::<Grounded>();
        }
    }
}
