use super::collision::{Collider, DynamicBody, StaticBody};
use super::trigger::Trigger;
use crate::gravity::{GravityComponent, GravityField};
use bevy::input::keyboard::KeyboardInput;
use bevy::input::ButtonState;
use bevy::prelude::*;

#[derive(Resource)]
pub struct ShowCollision(pub bool);

pub fn update_show_collision(
    mut reader: EventReader<KeyboardInput>,
    mut show: ResMut<ShowCollision>,
) {
    for event in reader.read() {
        if matches!(
            event,
            KeyboardInput {
                key_code: KeyCode::KeyP,
                state: ButtonState::Pressed,
                repeat: false,
                ..
            }
        ) {
            show.0 = !show.0;
        }
    }
}

/// Outlines bodies and triggers. Fields are tinted with the colour of their direction,
/// dynamic bodies with the colour of their current gravity.
pub fn debug_draw_colliders(
    mut gizmos: Gizmos,
    show: Res<ShowCollision>,
    static_bodies: Query<(&GlobalTransform, &Collider), With<StaticBody>>,
    dynamic_bodies: Query<(&GlobalTransform, &Collider, Option<&GravityComponent>), With<DynamicBody>>,
    triggers: Query<(&GlobalTransform, &Trigger, Option<&GravityField>)>,
) {
    if !show.0 {
        return;
    }

    for (transform, collider) in static_bodies.iter() {
        let abs = collider.global_absolute(transform);
        gizmos.rect_2d(Isometry2d::from_translation(abs.center()), abs.size, Color::WHITE);
    }

    for (transform, collider, gravity) in dynamic_bodies.iter() {
        let abs = collider.global_absolute(transform);
        let color = GravityComponent::direction_of(gravity).color();
        gizmos.rect_2d(Isometry2d::from_translation(abs.center()), abs.size, color);
    }

    for (transform, trigger, field) in triggers.iter() {
        let abs = trigger.0.global_absolute(transform);
        let color = field.map_or(Color::srgb(0., 1., 0.), |f| f.gravity_type.color());
        gizmos.rect_2d(Isometry2d::from_translation(abs.center()), abs.size, color);
    }
}
