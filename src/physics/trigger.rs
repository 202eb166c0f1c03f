use super::{
    collision::Collider,
    layers::TriggersWith,
    spatial::{SpatialData, SpatialHash},
};
use bevy::prelude::*;
use std::marker::PhantomData;

/// Marks an entity as a [`TriggerEvent`] source.
///
/// Only bodies with the matching [`TriggersWith`] layer are reported.
#[derive(Debug, Default, Clone, Copy, Component)]
pub struct Trigger(pub Collider);

/// The triggers of layer `T` this body is inside of, refreshed every physics step.
#[derive(Component)]
pub struct Triggers<T>(smallvec::SmallVec<[Entity; 4]>, PhantomData<T>);

impl<T> Default for Triggers<T> {
    fn default() -> Self {
        Self(smallvec::SmallVec::default(), PhantomData)
    }
}

impl<T> Triggers<T> {
    pub fn entities(&self) -> &[Entity] {
        &self.0
    }
}

/// Sent every step while `target` overlaps `trigger`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Event)]
pub struct TriggerEvent {
    pub trigger: Entity,
    pub target: Entity,
}

/// Sent on the first step `target` overlaps `trigger`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Event)]
pub struct TriggerEnter {
    pub trigger: Entity,
    pub target: Entity,
}

/// Sent on the first step `target` no longer overlaps `trigger`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Event)]
pub struct TriggerExit {
    pub trigger: Entity,
    pub target: Entity,
}

/// Diffs this step's overlaps against the last step's into enter and exit events.
pub fn emit_trigger_states(
    mut enter: EventWriter<TriggerEnter>,
    mut exit: EventWriter<TriggerExit>,
    mut reader: EventReader<TriggerEvent>,
    mut active: Local<Vec<(Entity, Entity)>>,
) {
    let mut current: Vec<(Entity, Entity)> = Vec::new();
    for event in reader.read() {
        let pair = (event.trigger, event.target);
        if !current.contains(&pair) {
            current.push(pair);
        }
    }

    for (trigger, target) in active.iter() {
        if !current.contains(&(*trigger, *target)) {
            exit.send(TriggerExit {
                trigger: *trigger,
                target: *target,
            });
        }
    }

    for (trigger, target) in current.iter() {
        if !active.contains(&(*trigger, *target)) {
            enter.send(TriggerEnter {
                trigger: *trigger,
                target: *target,
            });
        }
    }

    *active = current;
}

pub fn handle_triggers<T: Component>(
    triggers: Query<(Entity, &GlobalTransform, &Trigger), With<T>>,
    bodies: Query<(Entity, &GlobalTransform, &Collider), With<TriggersWith<T>>>,
    mut body_triggers: Query<&mut Triggers<T>>,
    mut writer: EventWriter<TriggerEvent>,
) {
    for mut triggers in body_triggers.iter_mut() {
        triggers.0.clear();
    }

    let body_map = SpatialHash::new_with(
        64.,
        bodies
            .iter()
            .map(|(e, t, c)| SpatialData::from_entity(e, t, c, ())),
    );

    for (entity, transform, trigger) in triggers.iter() {
        let collider = trigger.0.global_absolute(transform);

        for SpatialData {
            entity: body,
            collider: body_collider,
            ..
        } in body_map.nearby_objects(&collider.position())
        {
            if *body == entity || !collider.collides_with(body_collider) {
                continue;
            }

            if let Ok(mut triggers) = body_triggers.get_mut(*body) {
                if triggers.0.contains(&entity) {
                    continue;
                }
                triggers.0.push(entity);
            }

            writer.send(TriggerEvent {
                trigger: entity,
                target: *body,
            });
        }
    }
}
