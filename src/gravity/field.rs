use super::{
    component::{gravity_of, set_gravity},
    controller::{ActiveController, SoundGravityController},
    params, GravityComponent, GravityHoldable, GravityRequest, GravityType, PlayerGravity,
};
use crate::physics::{
    collision::Collider,
    trigger::{Trigger, TriggerEnter, TriggerExit, Triggers},
};
use bevy::prelude::*;

/// Trigger layer shared by every gravity volume.
#[derive(Debug, Default, Clone, Copy, Component)]
pub struct GravityFieldLayer;

/// Sets the gravity of actors that enter or stay inside its [`Trigger`].
#[derive(Debug, Clone, Component)]
#[require(GravityFieldLayer)]
pub struct GravityField {
    pub gravity_type: GravityType,
    pub affects_player: bool,
    pub affects_holdable_actors: bool,
    pub affects_other_actors: bool,
    pub momentum_multiplier: f32,
    pub sound: Option<String>,
    /// Applied when an actor leaves. [`GravityType::None`] leaves the actor as it is.
    pub leave_gravity: GravityType,
    muffle_remaining: f32,
}

impl Default for GravityField {
    fn default() -> Self {
        Self {
            gravity_type: GravityType::Normal,
            affects_player: true,
            affects_holdable_actors: false,
            affects_other_actors: false,
            momentum_multiplier: 1.,
            sound: None,
            leave_gravity: GravityType::None,
            muffle_remaining: 0.,
        }
    }
}

impl GravityField {
    pub fn new(gravity_type: GravityType) -> Self {
        Self {
            gravity_type,
            ..Default::default()
        }
    }

    pub fn affects(&self, kind: ActorKind) -> bool {
        match kind {
            ActorKind::Player => self.affects_player,
            ActorKind::Holdable => self.affects_holdable_actors,
            ActorKind::Other => self.affects_other_actors,
        }
    }

    fn request(&self, gravity_type: GravityType) -> GravityRequest {
        GravityRequest::new(gravity_type).with_momentum(self.momentum_multiplier)
    }
}

/// Decides the player's gravity when it spawns inside.
#[derive(Debug, Default, Clone, Copy, Component)]
pub struct SpawnGravityField {
    pub gravity_type: GravityType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorKind {
    Player,
    Holdable,
    Other,
}

pub fn actor_kind(world: &World, actor: Entity) -> ActorKind {
    if world.get::<PlayerGravity>(actor).is_some() {
        ActorKind::Player
    } else if world.get::<GravityHoldable>(actor).is_some() {
        ActorKind::Holdable
    } else {
        ActorKind::Other
    }
}

/// A sound cue requested by a gravity source.
#[derive(Debug, Clone, PartialEq, Eq, Event)]
pub struct GravitySound(pub String);

fn affecting_field(world: &World, field: Entity, actor: Entity) -> Option<GravityField> {
    let kind = actor_kind(world, actor);
    world
        .get::<GravityField>(field)
        .filter(|f| f.gravity_type != GravityType::None && f.affects(kind))
        .cloned()
}

/// An actor entered `field`. Returns whether the actor's direction changed.
pub fn field_enter(world: &mut World, field_entity: Entity, actor: Entity) -> bool {
    let Some(field) = affecting_field(world, field_entity, actor) else {
        return false;
    };

    let before = gravity_of(world, actor);
    if !set_gravity(world, actor, field.request(field.gravity_type)) {
        return false;
    }

    let changed = gravity_of(world, actor) != before;
    if changed {
        play_field_sound(world, field_entity);
    }
    changed
}

/// An actor is still inside `field`. Only concrete directions the actor doesn't already
/// have are applied, so a field does not fire every frame.
pub fn field_stay(world: &mut World, field_entity: Entity, actor: Entity) -> bool {
    let Some(field) = affecting_field(world, field_entity, actor) else {
        return false;
    };

    if !field.gravity_type.is_resting() || field.gravity_type == gravity_of(world, actor) {
        return false;
    }

    set_gravity(world, actor, field.request(field.gravity_type))
}

pub fn field_leave(world: &mut World, field_entity: Entity, actor: Entity) -> bool {
    let kind = actor_kind(world, actor);
    let Some(field) = world
        .get::<GravityField>(field_entity)
        .filter(|f| f.leave_gravity != GravityType::None && f.affects(kind))
        .cloned()
    else {
        return false;
    };

    set_gravity(world, actor, field.request(field.leave_gravity))
}

fn play_field_sound(world: &mut World, field_entity: Entity) {
    let Some(mut field) = world.get_mut::<GravityField>(field_entity) else {
        return;
    };

    if field.muffle_remaining > 0. {
        return;
    }

    let Some(sound) = field.sound.clone().filter(|s| !s.trim().is_empty()) else {
        return;
    };

    field.muffle_remaining = params::AUDIO_MUFFLE_SECONDS;
    if world.contains_resource::<Events<GravitySound>>() {
        world.send_event(GravitySound(sound));
    }
}

/// The direction of the first spawn field overlapping `actor`.
///
/// Compared in world space so actors and fields can live under differently placed rooms.
pub fn spawn_field_gravity(world: &mut World, actor: Entity) -> Option<GravityType> {
    let transform = world_transform(world, actor)?;
    let body = world.get::<Collider>(actor)?.absolute(&transform);

    let fields = world
        .query::<(Entity, &SpawnGravityField, &Trigger)>()
        .iter(world)
        .filter(|(_, field, _)| field.gravity_type.is_resting())
        .map(|(entity, field, trigger)| (entity, field.gravity_type, trigger.0))
        .collect::<Vec<_>>();

    fields
        .into_iter()
        .find(|(entity, _, trigger)| {
            world_transform(world, *entity)
                .is_some_and(|transform| trigger.absolute(&transform).collides_with(&body))
        })
        .map(|(_, gravity_type, _)| gravity_type)
}

/// `entity`'s transform composed with every ancestor's.
///
/// [`GlobalTransform`] is only propagated in `PostUpdate`, which is too late for an actor
/// spawned this frame.
fn world_transform(world: &World, entity: Entity) -> Option<Transform> {
    let mut transform = *world.get::<Transform>(entity)?;
    let mut current = entity;
    while let Some(parent) = world.get::<Parent>(current) {
        current = parent.get();
        if let Some(parent_transform) = world.get::<Transform>(current) {
            transform = parent_transform.mul_transform(transform);
        }
    }
    Some(transform)
}

pub fn tick_field_muffles(time: Res<Time>, mut fields: Query<&mut GravityField>) {
    for mut field in fields.iter_mut() {
        if field.muffle_remaining > 0. {
            field.muffle_remaining -= time.delta_secs();
        }
    }
}

/// Fills in the sound of new fields from the active [`SoundGravityController`].
pub fn assign_field_sounds(
    sounds: ActiveController<SoundGravityController>,
    mut fields: Query<&mut GravityField, Added<GravityField>>,
) {
    let Some(controller) = sounds.get() else {
        return;
    };

    for mut field in fields.iter_mut() {
        if field.sound.is_none() {
            field.sound = controller.sound_for(field.gravity_type).map(str::to_owned);
        }
    }
}

/// Turns trigger overlaps into field enter, stay and leave calls.
///
/// Leaves are handled first so an actor crossing from one field into another ends up with
/// the second field's gravity.
pub fn handle_field_triggers(
    mut commands: Commands,
    mut enter: EventReader<TriggerEnter>,
    mut exit: EventReader<TriggerExit>,
    fields: Query<(), With<GravityField>>,
    actors: Query<(Entity, &Triggers<GravityFieldLayer>), With<GravityComponent>>,
) {
    for TriggerExit { trigger, target } in exit.read().copied() {
        if fields.contains(trigger) {
            commands.queue(move |world: &mut World| {
                field_leave(world, trigger, target);
            });
        }
    }

    let mut entered = Vec::new();
    for TriggerEnter { trigger, target } in enter.read().copied() {
        if fields.contains(trigger) {
            entered.push((trigger, target));
            commands.queue(move |world: &mut World| {
                field_enter(world, trigger, target);
            });
        }
    }

    for (actor, triggers) in actors.iter() {
        for trigger in triggers.entities().iter().copied() {
            if fields.contains(trigger) && !entered.contains(&(trigger, actor)) {
                commands.queue(move |world: &mut World| {
                    field_stay(world, trigger, actor);
                });
            }
        }
    }
}

pub fn play_gravity_sounds(
    mut commands: Commands,
    mut reader: EventReader<GravitySound>,
    server: Option<Res<AssetServer>>,
) {
    let Some(server) = server else {
        reader.clear();
        return;
    };

    for GravitySound(path) in reader.read() {
        commands.spawn((
            AudioPlayer::<AudioSource>::new(server.load(path.clone())),
            PlaybackSettings::DESPAWN,
        ));
    }
}
