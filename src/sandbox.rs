//! A single test room with one of every gravity source.

use bevy::prelude::*;
use bevy::sprite::Anchor;
use gravity_flip::gravity::{
    BehaviorGravityController, GravityComponent, GravityField, GravityFieldLayer,
    GravityHoldable, GravityHooks, GravitySpring, GravityType, PickupCollider,
    SoundGravityController, SpawnGravityField, SpringOrientation, VvvvvvField,
    VvvvvvGravityController, VvvvvvMode,
};
use gravity_flip::physics::prelude::*;
use gravity_flip::physics::trigger::Trigger;
use gravity_flip::player::Player;
use gravity_flip::visuals::{flip_sprite, FlipFlash};
use gravity_flip::TILE_SIZE;

const ROOM_WIDTH: f32 = 30. * TILE_SIZE;
const ROOM_HEIGHT: f32 = 16. * TILE_SIZE;

const WALL_COLOR: Color = Color::srgb(0.2, 0.18, 0.25);
const CRATE_COLOR: Color = Color::srgb(0.7, 0.5, 0.3);

/// Converts tile coordinates, measured from the room's bottom left corner, into world space.
fn tile(x: f32, y: f32) -> Vec2 {
    Vec2::new(x * TILE_SIZE - ROOM_WIDTH / 2., y * TILE_SIZE - ROOM_HEIGHT / 2.)
}

/// A box spanning `size` tiles up and to the right of the tile `at`.
fn tile_rect(at: Vec2, size: Vec2) -> (Transform, Collider) {
    let size = size * TILE_SIZE;
    (
        Transform::from_translation(tile(at.x, at.y).extend(0.)),
        Collider::from_rect(Vec2::new(0., size.y), size),
    )
}

fn area_sprite(color: Color, collider: &Collider) -> Sprite {
    Sprite {
        anchor: Anchor::BottomLeft,
        ..Sprite::from_color(color, collider.size)
    }
}

pub fn spawn(In(root): In<Entity>, mut commands: Commands) {
    commands.entity(root).insert((
        Name::new("Sandbox"),
        Transform::default(),
        Visibility::default(),
    ));

    commands.entity(root).with_children(|room| {
        // floor, ceiling, sides and a ledge in the middle
        for (at, size) in [
            (Vec2::new(0., 0.), Vec2::new(30., 1.)),
            (Vec2::new(0., 15.), Vec2::new(30., 1.)),
            (Vec2::new(0., 1.), Vec2::new(1., 14.)),
            (Vec2::new(29., 1.), Vec2::new(1., 14.)),
            (Vec2::new(12., 7.), Vec2::new(6., 1.)),
        ] {
            let (transform, collider) = tile_rect(at, size);
            room.spawn((
                StaticBody,
                transform,
                collider,
                area_sprite(WALL_COLOR, &collider),
            ));
        }

        let (transform, collider) = tile_rect(Vec2::new(1., 1.), Vec2::new(3., 4.));
        room.spawn((
            Name::new("Spawn field"),
            SpawnGravityField {
                gravity_type: GravityType::Normal,
            },
            Trigger(collider),
            transform,
        ));

        for (at, size, gravity_type) in [
            (Vec2::new(5., 1.), Vec2::new(2., 4.), GravityType::Inverted),
            (Vec2::new(9., 11.), Vec2::new(2., 4.), GravityType::Normal),
            (Vec2::new(19., 1.), Vec2::new(1., 14.), GravityType::Toggle),
        ] {
            let (transform, collider) = tile_rect(at, size);
            let mut field = GravityField::new(gravity_type);
            field.affects_holdable_actors = true;
            room.spawn((
                field,
                Trigger(collider),
                transform,
                area_sprite(gravity_type.color().with_alpha(0.2), &collider),
            ));
        }

        for (at, orientation, gravity_type) in [
            (Vec2::new(14., 1.), SpringOrientation::Floor, GravityType::Normal),
            (Vec2::new(15., 14.75), SpringOrientation::Ceiling, GravityType::Normal),
        ] {
            let (transform, collider) = tile_rect(at, Vec2::new(1., 1. / 4.));
            room.spawn((
                GravitySpring::new(orientation, gravity_type),
                Trigger(collider),
                transform,
                area_sprite(Color::srgb(0.9, 0.9, 0.2), &collider),
            ));
        }

        let (transform, collider) = tile_rect(Vec2::new(22., 1.), Vec2::new(7., 14.));
        room.spawn((
            Name::new("VVVVVV zone"),
            VvvvvvField,
            Trigger(collider),
            transform,
            area_sprite(Color::srgba(0.3, 1., 0.6, 0.1), &collider),
        ));

        room.spawn((
            Name::new("Room controller"),
            BehaviorGravityController::default(),
            SoundGravityController {
                normal_sound: Some("audio/sfx/gravity_normal.wav".into()),
                inverted_sound: Some("audio/sfx/gravity_inverted.wav".into()),
                toggle_sound: Some("audio/sfx/gravity_toggle.wav".into()),
            },
            VvvvvvGravityController {
                mode: VvvvvvMode::TriggerBased,
                flip_sound: None,
            },
        ));

        let crate_size = Vec2::splat(TILE_SIZE * 0.75);
        room.spawn((
            Name::new("Crate"),
            GravityHoldable::default(),
            GravityComponent::with_hooks(GravityHooks {
                update_visuals: Some(flip_sprite),
                ..Default::default()
            }),
            PickupCollider(Collider::from_feet(crate_size + TILE_SIZE)),
            Collider::from_feet(crate_size),
            DynamicBody,
            Velocity::default(),
            Gravitational,
            layers::CollidesWith::<layers::Wall>::default(),
            layers::TriggersWith::<GravityFieldLayer>::default(),
            FlipFlash { rest: CRATE_COLOR },
            Sprite {
                anchor: Anchor::BottomCenter,
                ..Sprite::from_color(CRATE_COLOR, crate_size)
            },
            Transform::from_translation(tile(8., 1.).extend(0.)),
        ));

        room.spawn((
            Player,
            Transform::from_translation(tile(2.5, 1.).extend(1.)),
        ));
    });
}
