//! Sign helpers for every vertical quantity that depends on gravity.
//!
//! Physics code expresses vertical values as if gravity were normal (down is -Y) and passes
//! them through these functions. No call site negates Y on its own.

use super::GravityType;
use crate::physics::collision::{AbsoluteCollider, Collider};
use bevy::prelude::*;
use std::cmp::Ordering;

/// Converts a vertical value between the normal frame and `direction`'s frame.
///
/// The conversion is its own inverse.
pub fn effective_y(direction: GravityType, y: f32) -> f32 {
    y * direction.sign()
}

pub fn effective_vec(direction: GravityType, v: Vec2) -> Vec2 {
    Vec2::new(v.x, effective_y(direction, v.y))
}

/// Input axes encode "up" as +Y, so they flip exactly like any other vertical value.
pub fn effective_axis(direction: GravityType, axis: Vec2) -> Vec2 {
    effective_vec(direction, axis)
}

/// Orders two heights measured against gravity: `Greater` means `a` is further from the floor.
pub fn effective_compare(direction: GravityType, a: f32, b: f32) -> Ordering {
    effective_y(direction, a)
        .partial_cmp(&effective_y(direction, b))
        .unwrap_or(Ordering::Equal)
}

pub fn is_above(direction: GravityType, a: f32, b: f32) -> bool {
    effective_compare(direction, a, b) == Ordering::Greater
}

pub fn down(direction: GravityType) -> Vec2 {
    effective_vec(direction, Vec2::NEG_Y)
}

pub fn up(direction: GravityType) -> Vec2 {
    -down(direction)
}

/// The edge of a body that touches the floor.
pub fn feet_y(direction: GravityType, collider: &AbsoluteCollider) -> f32 {
    match direction {
        GravityType::Inverted => collider.max_y(),
        _ => collider.min_y(),
    }
}

/// The face of a static body that something standing on it touches.
pub fn surface_y(direction: GravityType, collider: &AbsoluteCollider) -> f32 {
    match direction {
        GravityType::Inverted => collider.min_y(),
        _ => collider.max_y(),
    }
}

/// Reflects a collider's vertical extents through its entity's origin: the new top is the
/// negated old bottom and the new bottom the negated old top.
pub fn mirror_collider(collider: &Collider) -> Collider {
    Collider::from_rect(Vec2::new(collider.tl.x, -collider.bottom()), collider.size)
}

/// How far the origin moves so a mirrored collider covers the same world space.
///
/// For a collider anchored at the feet this is its height, so the old top becomes the new
/// reference point.
pub fn flip_origin_offset(collider: &Collider) -> f32 {
    collider.top() + collider.bottom()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverted_flips_vertical_values_only() {
        assert_eq!(effective_y(GravityType::Normal, 3.), 3.);
        assert_eq!(effective_y(GravityType::Inverted, 3.), -3.);
        assert_eq!(
            effective_vec(GravityType::Inverted, Vec2::new(2., -5.)),
            Vec2::new(2., 5.)
        );
        assert_eq!(down(GravityType::Inverted), Vec2::Y);
        assert_eq!(up(GravityType::Normal), Vec2::Y);
    }

    #[test]
    fn compare_follows_gravity() {
        assert!(is_above(GravityType::Normal, 10., 0.));
        assert!(is_above(GravityType::Inverted, 0., 10.));
        assert_eq!(effective_compare(GravityType::Inverted, 4., 4.), Ordering::Equal);
    }

    #[test]
    fn mirroring_twice_restores_the_collider() {
        let collider = Collider::from_rect(Vec2::new(-4., 11.), Vec2::new(8., 11.));
        let once = mirror_collider(&collider);
        assert_eq!(once.top(), -collider.bottom());
        assert_eq!(once.bottom(), -collider.top());
        assert_eq!(mirror_collider(&once), collider);
    }

    #[test]
    fn flipped_collider_keeps_its_world_span() {
        let collider = Collider::from_rect(Vec2::new(0., 5.), Vec2::new(8., 12.));
        let transform = Transform::from_xyz(0., 100., 0.);
        let before = collider.absolute(&transform);

        let moved = transform.with_translation(
            transform.translation + Vec3::Y * flip_origin_offset(&collider),
        );
        let after = mirror_collider(&collider).absolute(&moved);

        assert_eq!(before.min_y(), after.min_y());
        assert_eq!(before.max_y(), after.max_y());
    }
}
