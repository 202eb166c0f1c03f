//! Scene-wide registry of callbacks that observe gravity transitions.
//!
//! Listeners run synchronously inside [`set_gravity`](super::set_gravity) with exclusive world
//! access, after the subject's direction and geometry have been updated.

use super::{params, GravityChange};
use bevy::{
    ecs::{component::ComponentId, world::DeferredWorld},
    prelude::*,
};
use smallvec::SmallVec;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("entity {0} no longer exists")]
    MissingEntity(Entity),
    #[error("entity {entity} has no `{component}`")]
    MissingComponent {
        entity: Entity,
        component: &'static str,
    },
    #[error("{0}")]
    Custom(String),
}

pub type ListenerFn =
    Arc<dyn Fn(&mut World, Entity, &GravityChange) -> Result<(), ListenerError> + Send + Sync>;

/// Wraps a closure as a [`ListenerFn`].
pub fn listener<F>(f: F) -> ListenerFn
where
    F: Fn(&mut World, Entity, &GravityChange) -> Result<(), ListenerError> + Send + Sync + 'static,
{
    Arc::new(f)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Which subjects a listener hears about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerTarget {
    Any,
    Entity(Entity),
}

impl ListenerTarget {
    pub fn matches(&self, subject: Entity) -> bool {
        match self {
            Self::Any => true,
            Self::Entity(entity) => *entity == subject,
        }
    }
}

struct Registration {
    id: ListenerId,
    owner: Entity,
    target: ListenerTarget,
    callback: ListenerFn,
}

#[derive(Default, Resource)]
pub struct GravityListeners {
    next_id: u64,
    registrations: Vec<Registration>,
    dispatching: Vec<Entity>,
}

impl GravityListeners {
    pub fn register(
        &mut self,
        owner: Entity,
        target: ListenerTarget,
        callback: ListenerFn,
    ) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.registrations.push(Registration {
            id,
            owner,
            target,
            callback,
        });
        id
    }

    pub fn unregister(&mut self, id: ListenerId) -> bool {
        let len = self.registrations.len();
        self.registrations.retain(|r| r.id != id);
        self.registrations.len() != len
    }

    pub fn unregister_owner(&mut self, owner: Entity) {
        self.registrations.retain(|r| r.owner != owner);
    }

    pub fn contains(&self, id: ListenerId) -> bool {
        self.registrations.iter().any(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Listeners interested in `subject`, in registration order.
    fn snapshot(&self, subject: Entity) -> Vec<(ListenerId, Entity, ListenerFn)> {
        self.registrations
            .iter()
            .filter(|r| r.target.matches(subject))
            .map(|r| (r.id, r.owner, r.callback.clone()))
            .collect()
    }
}

/// Tracks the listeners an entity owns so they are unregistered when it goes away.
#[derive(Debug, Default, Component)]
#[component(on_remove = unregister_owned_listeners)]
pub struct GravityListener {
    ids: SmallVec<[ListenerId; 2]>,
}

impl GravityListener {
    pub fn ids(&self) -> &[ListenerId] {
        &self.ids
    }
}

fn unregister_owned_listeners(mut world: DeferredWorld, entity: Entity, _: ComponentId) {
    let Some(ids) = world.get::<GravityListener>(entity).map(|l| l.ids.clone()) else {
        return;
    };

    if let Some(mut listeners) = world.get_resource_mut::<GravityListeners>() {
        for id in ids {
            listeners.unregister(id);
        }
    }
}

/// Registers `callback` on behalf of `owner`.
///
/// Returns `None` when `owner` does not exist.
pub fn add_listener(
    world: &mut World,
    owner: Entity,
    target: ListenerTarget,
    callback: ListenerFn,
) -> Option<ListenerId> {
    if !world.entities().contains(owner) {
        warn!("tried to add a gravity listener to missing entity {owner}");
        return None;
    }

    world.init_resource::<GravityListeners>();
    let id = world
        .resource_mut::<GravityListeners>()
        .register(owner, target, callback);

    match world.get_mut::<GravityListener>(owner) {
        Some(mut listener) => listener.ids.push(id),
        None => {
            world.entity_mut(owner).insert(GravityListener {
                ids: SmallVec::from_slice(&[id]),
            });
        }
    }

    Some(id)
}

pub fn remove_listener(world: &mut World, id: ListenerId) -> bool {
    let removed = world
        .get_resource_mut::<GravityListeners>()
        .is_some_and(|mut listeners| listeners.unregister(id));

    if removed {
        let mut owners = world.query::<&mut GravityListener>();
        for mut listener in owners.iter_mut(world) {
            listener.ids.retain(|owned| *owned != id);
        }
    }

    removed
}

/// Runs every listener interested in `subject` and returns how many ran.
///
/// A listener removed while an earlier one runs is skipped. A listener that fails is logged
/// and the remaining listeners still run. Dispatching `subject` again from inside one of its
/// own listeners is dropped, as is any nesting past [`params::MAX_DISPATCH_DEPTH`].
pub fn dispatch_listeners(world: &mut World, subject: Entity, change: &GravityChange) -> usize {
    let snapshot = {
        let Some(mut listeners) = world.get_resource_mut::<GravityListeners>() else {
            return 0;
        };

        if listeners.dispatching.contains(&subject) {
            warn!("gravity listeners of {subject} changed its gravity while being notified, skipping nested dispatch");
            return 0;
        }

        if listeners.dispatching.len() >= params::MAX_DISPATCH_DEPTH {
            warn!(
                "gravity listener dispatch nested deeper than {}, skipping {subject}",
                params::MAX_DISPATCH_DEPTH
            );
            return 0;
        }

        listeners.dispatching.push(subject);
        listeners.snapshot(subject)
    };

    let mut ran = 0;
    for (id, owner, callback) in snapshot {
        let registered = world
            .get_resource::<GravityListeners>()
            .is_some_and(|listeners| listeners.contains(id));
        if !registered {
            continue;
        }

        ran += 1;
        if let Err(err) = callback(world, subject, change) {
            warn!("gravity listener owned by {owner} failed for {subject}: {err}");
        }
    }

    if let Some(mut listeners) = world.get_resource_mut::<GravityListeners>() {
        if let Some(index) = listeners.dispatching.iter().rposition(|e| *e == subject) {
            listeners.dispatching.remove(index);
        }
    }

    ran
}
