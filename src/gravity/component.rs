use super::{
    field, listener, math, GravityChange, GravityChanged, GravityContext, GravityRequest,
    GravitySession, GravityType, PickupCollider,
};
use crate::physics::{collision::Collider, velocity::Velocity};
use bevy::{
    ecs::{component::ComponentId, world::DeferredWorld},
    prelude::*,
};

/// Applies part of a transition to the subject's own components.
pub type GeometryHook = fn(&mut DeferredWorld, Entity, &GravityChange);
/// Decides whether an inverted subject should currently behave inverted.
pub type InvertCheck = fn(&World, Entity) -> bool;

/// Per subject replacements for the default transition behaviour.
///
/// Any hook left as `None` falls back to the default: the origin moves so the collider keeps
/// its world space, colliders are mirrored, vertical speed is reversed and visuals are left
/// alone.
#[derive(Debug, Default, Clone, Copy)]
pub struct GravityHooks {
    pub update_position: Option<GeometryHook>,
    pub update_colliders: Option<GeometryHook>,
    pub update_speed: Option<GeometryHook>,
    pub update_visuals: Option<GeometryHook>,
    pub check_invert: Option<InvertCheck>,
}

/// Gravity direction of one subject.
///
/// The direction only changes through [`set_gravity`], which keeps the subject's geometry and
/// the listeners consistent with it.
#[derive(Debug, Clone, Component)]
#[component(on_add = attach_gravity, on_remove = detach_gravity)]
pub struct GravityComponent {
    pub(crate) current: GravityType,
    /// Rejects every request while set.
    pub locked: bool,
    /// When cleared, requests still change the direction but leave geometry untouched.
    pub update_entity: bool,
    pub hooks: GravityHooks,
    /// Session flag that mirrors whether this subject is inverted.
    pub session_flag: Option<String>,
}

impl Default for GravityComponent {
    fn default() -> Self {
        Self {
            current: GravityType::Normal,
            locked: false,
            update_entity: true,
            hooks: GravityHooks::default(),
            session_flag: None,
        }
    }
}

impl GravityComponent {
    pub fn with_hooks(hooks: GravityHooks) -> Self {
        Self {
            hooks,
            ..Default::default()
        }
    }

    pub fn with_session_flag(mut self, flag: impl Into<String>) -> Self {
        self.session_flag = Some(flag.into());
        self
    }

    pub fn current(&self) -> GravityType {
        self.current
    }

    pub fn should_invert(&self) -> bool {
        self.current == GravityType::Inverted
    }

    /// Subjects without a component fall with normal gravity.
    pub fn direction_of(component: Option<&Self>) -> GravityType {
        component.map_or(GravityType::Normal, |c| c.current)
    }
}

/// Marks the subject the console, session and VVVVVV controls act on.
#[derive(Debug, Default, Clone, Copy, Component)]
#[require(GravityComponent)]
#[component(on_add = attach_player, on_remove = detach_player)]
pub struct PlayerGravity;

/// Requests a gravity change on `entity`.
///
/// Returns `false` without touching anything if the subject has no [`GravityComponent`], is
/// locked, or the request is [`GravityType::None`]. Otherwise the new direction is stored,
/// the geometry hooks run, and every listener is notified before returning `true`, even when
/// the direction did not actually change.
pub fn set_gravity(world: &mut World, entity: Entity, request: impl Into<GravityRequest>) -> bool {
    let request = request.into();
    let Some(mut component) = world.get_mut::<GravityComponent>(entity) else {
        return false;
    };

    if component.locked || request.gravity_type == GravityType::None {
        return false;
    }

    let change = GravityChange::resolve(component.current, &request);
    component.current = change.new_value;
    let hooks = component.hooks;
    let update_entity = component.update_entity;
    let flag = component.session_flag.clone();

    debug!(
        "{entity} gravity {} -> {} (toggle: {}, momentum: {})",
        change.old_value, change.new_value, change.was_toggle, change.momentum_multiplier
    );

    if update_entity {
        apply_change(&mut DeferredWorld::from(&mut *world), entity, &hooks, &change);
    }

    let is_player = world.get::<PlayerGravity>(entity).is_some();
    if let Some(mut session) = world.get_resource_mut::<GravitySession>() {
        if is_player {
            session.current_gravity = change.new_value;
        }
        if let Some(flag) = flag {
            session.set_flag(&flag, change.new_value == GravityType::Inverted);
        }
    }

    if world.contains_resource::<Events<GravityChanged>>() {
        world.send_event(GravityChanged { entity, change });
    }

    listener::dispatch_listeners(world, entity, &change);
    true
}

/// [`set_gravity`] on the current player, if any.
pub fn set_player_gravity(world: &mut World, request: impl Into<GravityRequest>) -> bool {
    match player(world) {
        Some(entity) => set_gravity(world, entity, request),
        None => false,
    }
}

pub fn player(world: &World) -> Option<Entity> {
    world.get_resource::<GravityContext>().and_then(|c| c.player)
}

pub fn gravity_of(world: &World, entity: Entity) -> GravityType {
    GravityComponent::direction_of(world.get::<GravityComponent>(entity))
}

pub fn should_invert(world: &World, entity: Entity) -> bool {
    gravity_of(world, entity) == GravityType::Inverted
}

/// Like [`should_invert`], but also honours the subject's [`GravityHooks::check_invert`].
///
/// Built-in movement reads [`GravityComponent::current`] directly. This query is for game
/// code that wants a subject to keep falling normally while it is inverted, for example during
/// a cutscene.
pub fn should_invert_checked(world: &World, entity: Entity) -> bool {
    world
        .get::<GravityComponent>(entity)
        .is_some_and(|component| {
            component.should_invert()
                && component
                    .hooks
                    .check_invert
                    .map_or(true, |check| check(world, entity))
        })
}

pub fn player_gravity(world: &World) -> GravityType {
    player(world).map_or(GravityType::Normal, |e| gravity_of(world, e))
}

pub fn should_invert_player(world: &World) -> bool {
    player(world).is_some_and(|e| should_invert(world, e))
}

/// False while any external override holds the session's semaphore.
///
/// Nothing inside the crate takes the semaphore. Callers outside it hold it with
/// [`GravitySession::push_override`] and check the player through this query.
pub fn should_invert_player_checked(world: &World) -> bool {
    let overridden = world
        .get_resource::<GravitySession>()
        .is_some_and(|s| s.overridden());
    !overridden && player(world).is_some_and(|e| should_invert_checked(world, e))
}

fn apply_change(world: &mut DeferredWorld, entity: Entity, hooks: &GravityHooks, change: &GravityChange) {
    hooks.update_position.unwrap_or(default_update_position)(world, entity, change);
    hooks.update_colliders.unwrap_or(default_update_colliders)(world, entity, change);
    hooks.update_speed.unwrap_or(default_update_speed)(world, entity, change);
    if let Some(update_visuals) = hooks.update_visuals {
        update_visuals(world, entity, change);
    }
}

pub fn default_update_position(world: &mut DeferredWorld, entity: Entity, change: &GravityChange) {
    if !change.changed() {
        return;
    }

    let Some(offset) = world
        .get::<Collider>(entity)
        .map(math::flip_origin_offset)
    else {
        return;
    };

    if let Some(mut transform) = world.get_mut::<Transform>(entity) {
        transform.translation.y += offset;
    }
}

pub fn default_update_colliders(world: &mut DeferredWorld, entity: Entity, change: &GravityChange) {
    if !change.changed() {
        return;
    }

    if let Some(mut collider) = world.get_mut::<Collider>(entity) {
        *collider = math::mirror_collider(&collider);
    }
    if let Some(mut pickup) = world.get_mut::<PickupCollider>(entity) {
        pickup.0 = math::mirror_collider(&pickup.0);
    }
}

pub fn default_update_speed(world: &mut DeferredWorld, entity: Entity, change: &GravityChange) {
    if !change.changed() {
        return;
    }

    if let Some(mut velocity) = world.get_mut::<Velocity>(entity) {
        velocity.0.y *= -change.momentum_multiplier;
    }
}

fn attach_gravity(mut world: DeferredWorld, entity: Entity, _: ComponentId) {
    // the player announces itself once its spawn direction is known
    if world.get::<PlayerGravity>(entity).is_some() {
        return;
    }

    world.commands().queue(move |world: &mut World| {
        if let Some(component) = world.get::<GravityComponent>(entity) {
            let change = GravityChange::refresh(component.current);
            listener::dispatch_listeners(world, entity, &change);
        }
    });
}

fn detach_gravity(mut world: DeferredWorld, entity: Entity, _: ComponentId) {
    let Some(component) = world.get::<GravityComponent>(entity) else {
        return;
    };

    let change = GravityChange {
        new_value: GravityType::Normal,
        old_value: component.current,
        momentum_multiplier: 1.,
        was_toggle: false,
        instant: true,
    };
    let hooks = component.hooks;
    let revert = component.update_entity && !component.locked;
    let flag = component.session_flag.clone();

    if revert {
        apply_change(&mut world, entity, &hooks, &change);
    }

    if let Some(flag) = flag {
        if let Some(mut session) = world.get_resource_mut::<GravitySession>() {
            session.set_flag(&flag, false);
        }
    }
}

fn attach_player(mut world: DeferredWorld, entity: Entity, _: ComponentId) {
    if let Some(mut context) = world.get_resource_mut::<GravityContext>() {
        if let Some(previous) = context.player.replace(entity) {
            if previous != entity {
                warn!("{entity} replaced {previous} as the gravity player");
            }
        }
    }

    world.commands().queue(move |world: &mut World| {
        let spawn = field::spawn_field_gravity(world, entity);
        let session = world
            .get_resource::<GravitySession>()
            .map(GravitySession::spawn_gravity);
        let gravity = spawn.or(session).unwrap_or(GravityType::Normal);

        info!("player {entity} spawned with {gravity} gravity");
        set_gravity(world, entity, GravityRequest::new(gravity).instant());
    });
}

fn detach_player(mut world: DeferredWorld, entity: Entity, _: ComponentId) {
    if let Some(mut context) = world.get_resource_mut::<GravityContext>() {
        if context.player == Some(entity) {
            context.player = None;
        }
    }
}

/// Queued form of [`set_gravity`].
#[derive(Debug, Clone, Copy)]
pub struct SetGravity {
    pub entity: Entity,
    pub request: GravityRequest,
}

impl Command for SetGravity {
    fn apply(self, world: &mut World) {
        set_gravity(world, self.entity, self.request);
    }
}

pub trait GravityCommandsExt {
    fn set_gravity(&mut self, entity: Entity, request: impl Into<GravityRequest>);
    fn set_player_gravity(&mut self, request: impl Into<GravityRequest>);
    fn add_gravity_listener(
        &mut self,
        owner: Entity,
        target: listener::ListenerTarget,
        callback: listener::ListenerFn,
    );
}

impl GravityCommandsExt for Commands<'_, '_> {
    fn set_gravity(&mut self, entity: Entity, request: impl Into<GravityRequest>) {
        self.queue(SetGravity {
            entity,
            request: request.into(),
        });
    }

    fn set_player_gravity(&mut self, request: impl Into<GravityRequest>) {
        let request = request.into();
        self.queue(move |world: &mut World| {
            set_player_gravity(world, request);
        });
    }

    fn add_gravity_listener(
        &mut self,
        owner: Entity,
        target: listener::ListenerTarget,
        callback: listener::ListenerFn,
    ) {
        self.queue(move |world: &mut World| {
            listener::add_listener(world, owner, target, callback);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gravity::{listener::ListenerTarget, test_world};

    #[derive(Default, Resource)]
    struct Heard(Vec<GravityChange>);

    fn hear(world: &mut World, target: ListenerTarget) {
        world.init_resource::<Heard>();
        let owner = world.spawn_empty().id();
        listener::add_listener(
            world,
            owner,
            target,
            listener::listener(|world, _, change| {
                world.resource_mut::<Heard>().0.push(*change);
                Ok(())
            }),
        );
    }

    fn heard(world: &World) -> &[GravityChange] {
        &world.resource::<Heard>().0
    }

    fn body(world: &mut World) -> Entity {
        let entity = world
            .spawn((
                GravityComponent::default(),
                Transform::from_xyz(0., 50., 0.),
                Collider::from_feet(Vec2::new(8., 12.)),
                Velocity(Vec2::new(3., -40.)),
            ))
            .id();
        world.flush();
        entity
    }

    #[test]
    fn toggle_resolves_from_either_state() {
        let mut world = test_world();
        let entity = body(&mut world);
        hear(&mut world, ListenerTarget::Entity(entity));

        for start in [GravityType::Normal, GravityType::Inverted] {
            set_gravity(&mut world, entity, GravityRequest::new(start).instant());
            assert!(set_gravity(&mut world, entity, GravityRequest::toggle()));
            assert_eq!(gravity_of(&world, entity), start.opposite());

            let last = heard(&world).last().copied().unwrap();
            assert!(last.was_toggle);
            assert_eq!(last.old_value, start);
            assert_eq!(last.new_value, start.opposite());
        }
    }

    #[test]
    fn locked_subject_rejects_everything() {
        let mut world = test_world();
        let entity = body(&mut world);
        hear(&mut world, ListenerTarget::Any);
        world.get_mut::<GravityComponent>(entity).unwrap().locked = true;

        for request in [
            GravityType::Normal,
            GravityType::Inverted,
            GravityType::Toggle,
            GravityType::None,
        ] {
            assert!(!set_gravity(&mut world, entity, request));
        }

        assert_eq!(gravity_of(&world, entity), GravityType::Normal);
        assert!(heard(&world).is_empty());
        assert_eq!(world.get::<Velocity>(entity).unwrap().0.y, -40.);
    }

    #[test]
    fn none_request_is_rejected() {
        let mut world = test_world();
        let entity = body(&mut world);
        hear(&mut world, ListenerTarget::Any);

        assert!(!set_gravity(&mut world, entity, GravityType::None));
        assert!(heard(&world).is_empty());
    }

    #[test]
    fn repeated_request_refreshes_without_moving_geometry() {
        let mut world = test_world();
        let entity = body(&mut world);
        set_gravity(&mut world, entity, GravityType::Inverted);
        hear(&mut world, ListenerTarget::Entity(entity));

        let collider = *world.get::<Collider>(entity).unwrap();
        let translation = world.get::<Transform>(entity).unwrap().translation;
        let velocity = world.get::<Velocity>(entity).unwrap().0;

        assert!(set_gravity(&mut world, entity, GravityType::Inverted));
        assert!(set_gravity(&mut world, entity, GravityType::Inverted));

        assert_eq!(heard(&world).len(), 2);
        assert!(heard(&world).iter().all(|change| !change.changed()));
        assert_eq!(*world.get::<Collider>(entity).unwrap(), collider);
        assert_eq!(world.get::<Transform>(entity).unwrap().translation, translation);
        assert_eq!(world.get::<Velocity>(entity).unwrap().0, velocity);
    }

    #[test]
    fn flip_mirrors_geometry_once() {
        let mut world = test_world();
        let entity = body(&mut world);
        hear(&mut world, ListenerTarget::Entity(entity));

        let before = *world.get::<Collider>(entity).unwrap();
        let span = before.absolute(world.get::<Transform>(entity).unwrap());

        set_gravity(&mut world, entity, GravityType::Inverted);

        let after = *world.get::<Collider>(entity).unwrap();
        assert_eq!(after.top(), -before.bottom());
        assert_eq!(after.bottom(), -before.top());
        assert_eq!(world.get::<Velocity>(entity).unwrap().0, Vec2::new(3., 40.));

        let moved = after.absolute(world.get::<Transform>(entity).unwrap());
        assert_eq!(moved.min_y(), span.min_y());
        assert_eq!(moved.max_y(), span.max_y());

        assert_eq!(
            heard(&world),
            &[GravityChange {
                new_value: GravityType::Inverted,
                old_value: GravityType::Normal,
                momentum_multiplier: 1.,
                was_toggle: false,
                instant: false,
            }]
        );
    }

    #[test]
    fn two_toggles_cancel_out() {
        let mut world = test_world();
        let entity = body(&mut world);
        let collider = *world.get::<Collider>(entity).unwrap();
        let translation = world.get::<Transform>(entity).unwrap().translation;
        hear(&mut world, ListenerTarget::Entity(entity));

        set_gravity(&mut world, entity, GravityType::Toggle);
        set_gravity(&mut world, entity, GravityType::Toggle);

        assert_eq!(gravity_of(&world, entity), GravityType::Normal);
        assert_eq!(heard(&world).len(), 2);
        assert_eq!(*world.get::<Collider>(entity).unwrap(), collider);
        assert_eq!(world.get::<Transform>(entity).unwrap().translation, translation);
    }

    #[test]
    fn momentum_scales_reversed_speed() {
        let mut world = test_world();
        let entity = body(&mut world);

        set_gravity(
            &mut world,
            entity,
            GravityRequest::new(GravityType::Inverted).with_momentum(0.5),
        );
        assert_eq!(world.get::<Velocity>(entity).unwrap().0.y, 20.);
    }

    #[test]
    fn disabled_updates_still_change_direction_and_notify() {
        let mut world = test_world();
        let entity = body(&mut world);
        hear(&mut world, ListenerTarget::Any);
        world.get_mut::<GravityComponent>(entity).unwrap().update_entity = false;
        let collider = *world.get::<Collider>(entity).unwrap();

        assert!(set_gravity(&mut world, entity, GravityType::Inverted));
        assert_eq!(gravity_of(&world, entity), GravityType::Inverted);
        assert_eq!(heard(&world).len(), 1);
        assert_eq!(*world.get::<Collider>(entity).unwrap(), collider);
        assert_eq!(world.get::<Velocity>(entity).unwrap().0.y, -40.);
    }

    #[test]
    fn custom_hooks_replace_defaults() {
        #[derive(Component)]
        struct Flipped(bool);

        fn visuals(world: &mut DeferredWorld, entity: Entity, change: &GravityChange) {
            if let Some(mut flipped) = world.get_mut::<Flipped>(entity) {
                flipped.0 = change.new_value == GravityType::Inverted;
            }
        }

        fn keep_speed(_: &mut DeferredWorld, _: Entity, _: &GravityChange) {}

        let mut world = test_world();
        let entity = body(&mut world);
        world.entity_mut(entity).insert((
            GravityComponent::with_hooks(GravityHooks {
                update_speed: Some(keep_speed),
                update_visuals: Some(visuals),
                ..Default::default()
            }),
            Flipped(false),
        ));

        set_gravity(&mut world, entity, GravityType::Inverted);
        assert!(world.get::<Flipped>(entity).unwrap().0);
        assert_eq!(world.get::<Velocity>(entity).unwrap().0.y, -40.);
    }

    #[derive(Default, Resource)]
    struct SeenByHook(Option<GravityType>);

    fn record_direction(world: &mut DeferredWorld, entity: Entity, _: &GravityChange) {
        let current = world.get::<GravityComponent>(entity).map(GravityComponent::current);
        world.resource_mut::<SeenByHook>().0 = current;
    }

    #[test]
    fn queued_request_applies_once_with_hooks_after_the_flip() {
        let mut world = test_world();
        world.init_resource::<SeenByHook>();
        let entity = body(&mut world);
        world
            .get_mut::<GravityComponent>(entity)
            .unwrap()
            .hooks
            .update_position = Some(record_direction);
        hear(&mut world, ListenerTarget::Entity(entity));

        let mut schedule = Schedule::default();
        schedule.add_systems(move |mut commands: Commands| {
            commands.set_gravity(entity, GravityType::Inverted);
        });
        schedule.run(&mut world);

        assert_eq!(gravity_of(&world, entity), GravityType::Inverted);
        assert_eq!(heard(&world).len(), 1);
        assert_eq!(heard(&world)[0].new_value, GravityType::Inverted);
        assert_eq!(world.resource::<SeenByHook>().0, Some(GravityType::Inverted));
        assert_eq!(world.get::<Velocity>(entity).unwrap().0.y, 40.);
    }

    #[test]
    fn queued_player_request_and_listener_reach_the_player() {
        let mut world = test_world();
        world.init_resource::<Heard>();
        let player = world.spawn(PlayerGravity).id();
        world.flush();
        let owner = world.spawn_empty().id();

        let mut schedule = Schedule::default();
        schedule.add_systems(move |mut commands: Commands| {
            commands.add_gravity_listener(
                owner,
                ListenerTarget::Entity(player),
                listener::listener(|world, _, change| {
                    world.resource_mut::<Heard>().0.push(*change);
                    Ok(())
                }),
            );
            commands.set_player_gravity(GravityType::Toggle);
        });
        schedule.run(&mut world);

        assert_eq!(gravity_of(&world, player), GravityType::Inverted);
        assert_eq!(
            world.resource::<GravitySession>().current_gravity,
            GravityType::Inverted
        );
        assert_eq!(heard(&world).len(), 1);
        assert!(heard(&world)[0].was_toggle);
    }

    #[test]
    fn check_invert_gates_checked_queries() {
        fn never(_: &World, _: Entity) -> bool {
            false
        }

        let mut world = test_world();
        let entity = world
            .spawn(GravityComponent::with_hooks(GravityHooks {
                check_invert: Some(never),
                ..Default::default()
            }))
            .id();

        set_gravity(&mut world, entity, GravityType::Inverted);
        assert!(should_invert(&world, entity));
        assert!(!should_invert_checked(&world, entity));
    }

    #[test]
    fn missing_component_defaults_to_normal() {
        let mut world = test_world();
        let entity = world.spawn_empty().id();

        assert_eq!(gravity_of(&world, entity), GravityType::Normal);
        assert!(!should_invert(&world, entity));
        assert!(!should_invert_checked(&world, entity));
        assert!(!set_gravity(&mut world, entity, GravityType::Inverted));
        assert!(!should_invert_player(&world));
        assert!(!set_player_gravity(&mut world, GravityType::Toggle));
    }

    #[test]
    fn removal_reverts_geometry_and_clears_flag() {
        let mut world = test_world();
        let entity = body(&mut world);
        world
            .get_mut::<GravityComponent>(entity)
            .unwrap()
            .session_flag = Some("flipped".into());
        let collider = *world.get::<Collider>(entity).unwrap();
        let translation = world.get::<Transform>(entity).unwrap().translation;

        set_gravity(&mut world, entity, GravityType::Inverted);
        assert!(world.resource::<GravitySession>().flag("flipped"));

        hear(&mut world, ListenerTarget::Any);
        world.entity_mut(entity).remove::<GravityComponent>();

        assert_eq!(*world.get::<Collider>(entity).unwrap(), collider);
        assert_eq!(world.get::<Transform>(entity).unwrap().translation, translation);
        assert!(!world.resource::<GravitySession>().flag("flipped"));
        assert!(heard(&world).is_empty());
    }

    #[test]
    fn player_spawns_with_previous_room_gravity() {
        let mut world = test_world();
        {
            let mut session = world.resource_mut::<GravitySession>();
            session.current_gravity = GravityType::Inverted;
            session.begin_transition();
        }

        let player = world
            .spawn((PlayerGravity, Collider::from_feet(Vec2::new(8., 12.))))
            .id();
        world.flush();

        assert_eq!(super::player(&world), Some(player));
        assert!(should_invert_player(&world));
        assert!(should_invert_player_checked(&world));

        world.resource_mut::<GravitySession>().push_override();
        assert!(!should_invert_player_checked(&world));

        world.despawn(player);
        assert_eq!(super::player(&world), None);
    }

    #[test]
    fn player_changes_are_mirrored_into_the_session() {
        let mut world = test_world();
        world.spawn(PlayerGravity);
        world.flush();

        set_player_gravity(&mut world, GravityType::Toggle);
        assert_eq!(
            world.resource::<GravitySession>().current_gravity,
            GravityType::Inverted
        );
    }
}
