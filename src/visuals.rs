//! Sprite feedback for gravity transitions.

use crate::gravity::{GravityChanged, GravityType};
use bevy::{
    ecs::world::DeferredWorld,
    prelude::*,
    sprite::Anchor,
};
use bevy_tween::bevy_time_runner::TimeRunner;
use bevy_tween::combinator::tween;
use bevy_tween::prelude::*;
use interpolate::sprite_color_to;
use std::time::Duration;

const FLASH_SECONDS: f32 = 0.25;

pub struct VisualsPlugin;

impl Plugin for VisualsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (flash_on_gravity_change, despawn_finished_tweens).chain(),
        );
    }
}

/// Animation entities tagged with this are removed once their timeline completes.
#[derive(Component)]
pub struct DespawnFinished;

pub fn despawn_finished_tweens(
    mut commands: Commands,
    tween_query: Query<(Entity, &TimeRunner), With<DespawnFinished>>,
) {
    for (entity, runner) in tween_query.iter() {
        if runner.is_completed() {
            commands.entity(entity).despawn_recursive();
        }
    }
}

/// Sprite tint that a [`FlipFlash`] fades back to.
#[derive(Debug, Clone, Copy, Component)]
pub struct FlipFlash {
    pub rest: Color,
}

impl Default for FlipFlash {
    fn default() -> Self {
        Self { rest: Color::WHITE }
    }
}

/// Tints the sprite with the new direction's color, then fades back.
pub fn flash_on_gravity_change(
    mut commands: Commands,
    mut reader: EventReader<GravityChanged>,
    flashes: Query<&FlipFlash, With<Sprite>>,
) {
    for event in reader.read() {
        if !event.change.changed() {
            continue;
        }

        let Ok(flash) = flashes.get(event.entity) else {
            continue;
        };

        let target = event.entity.into_target();
        commands
            .animation()
            .insert(tween(
                Duration::from_secs_f32(FLASH_SECONDS),
                EaseKind::QuadraticOut,
                target
                    .state(event.change.new_value.color())
                    .with(sprite_color_to(flash.rest)),
            ))
            .insert(DespawnFinished);
    }
}

/// Visual hook for sprites drawn from the feet: hangs the sprite from the origin and flips
/// it upside down while inverted.
pub fn flip_sprite(world: &mut DeferredWorld, entity: Entity, change: &crate::gravity::GravityChange) {
    if let Some(mut sprite) = world.get_mut::<Sprite>(entity) {
        let inverted = change.new_value == GravityType::Inverted;
        sprite.flip_y = inverted;
        sprite.anchor = if inverted {
            Anchor::TopCenter
        } else {
            Anchor::BottomCenter
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gravity::GravityChange;

    #[test]
    fn flip_sprite_hangs_inverted_sprites_from_the_origin() {
        let mut world = World::new();
        let entity = world.spawn(Sprite::default()).id();

        let change = GravityChange::resolve(GravityType::Normal, &GravityType::Inverted.into());
        flip_sprite(&mut DeferredWorld::from(&mut world), entity, &change);
        let sprite = world.get::<Sprite>(entity).unwrap();
        assert!(sprite.flip_y);
        assert_eq!(sprite.anchor, Anchor::TopCenter);

        let change = GravityChange::resolve(GravityType::Inverted, &GravityType::Normal.into());
        flip_sprite(&mut DeferredWorld::from(&mut world), entity, &change);
        let sprite = world.get::<Sprite>(entity).unwrap();
        assert!(!sprite.flip_y);
        assert_eq!(sprite.anchor, Anchor::BottomCenter);
    }
}
