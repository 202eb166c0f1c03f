//! Scene scoped configuration entities.
//!
//! Several controllers of one kind may exist in a scene, but only one of them is active.

use super::{params, GravityContext, GravitySession, GravitySettings, GravityType, Setting};
use bevy::{
    ecs::{component::ComponentId, system::SystemParam, world::DeferredWorld},
    prelude::*,
};

/// Bookkeeping shared by every controller kind.
#[derive(Debug, Default, Clone, Copy, Component)]
#[component(on_add = stamp_order)]
pub struct GravityController {
    /// Persistent controllers take precedence over ones that only belong to the current room.
    pub persistent: bool,
    order: u64,
}

impl GravityController {
    pub fn persistent() -> Self {
        Self {
            persistent: true,
            order: 0,
        }
    }

    pub fn order(&self) -> u64 {
        self.order
    }
}

fn stamp_order(mut world: DeferredWorld, entity: Entity, _: ComponentId) {
    let Some(order) = world
        .get_resource_mut::<GravityContext>()
        .map(|mut context| context.next_controller_order())
    else {
        return;
    };

    if let Some(mut controller) = world.get_mut::<GravityController>(entity) {
        controller.order = order;
    }
}

/// The last persistent controller if there is one, otherwise the first one constructed.
pub fn resolve_active<'a>(
    controllers: impl IntoIterator<Item = (Entity, &'a GravityController)>,
) -> Option<Entity> {
    let mut first: Option<(Entity, u64)> = None;
    let mut persistent: Option<(Entity, u64)> = None;

    for (entity, controller) in controllers {
        if first.map_or(true, |(_, order)| controller.order < order) {
            first = Some((entity, controller.order));
        }
        if controller.persistent && persistent.map_or(true, |(_, order)| controller.order > order) {
            persistent = Some((entity, controller.order));
        }
    }

    persistent.or(first).map(|(entity, _)| entity)
}

/// The active controller of kind `T`.
#[derive(SystemParam)]
pub struct ActiveController<'w, 's, T: Component> {
    controllers: Query<'w, 's, (Entity, &'static GravityController, &'static T)>,
}

impl<T: Component> ActiveController<'_, '_, T> {
    pub fn entity(&self) -> Option<Entity> {
        resolve_active(self.controllers.iter().map(|(entity, meta, _)| (entity, meta)))
    }

    pub fn get(&self) -> Option<&T> {
        let entity = self.entity()?;
        self.controllers.get(entity).ok().map(|(_, _, controller)| controller)
    }
}

/// Exclusive access version of [`ActiveController`].
pub fn active_controller<T: Component + Clone>(world: &mut World) -> Option<T> {
    let mut query = world.query::<(Entity, &GravityController, &T)>();
    let active = resolve_active(query.iter(world).map(|(entity, meta, _)| (entity, meta)))?;
    query.get(world, active).ok().map(|(_, _, controller)| controller.clone())
}

/// Overrides how held objects behave.
#[derive(Debug, Clone, Component)]
#[require(GravityController)]
pub struct BehaviorGravityController {
    /// Seconds a released holdable stays inverted. Zero or less disables the reset.
    pub holdable_reset_time: f32,
}

impl Default for BehaviorGravityController {
    fn default() -> Self {
        Self {
            holdable_reset_time: params::HOLDABLE_INVERT_TIME,
        }
    }
}

/// Default cues for fields that don't name their own.
#[derive(Debug, Default, Clone, Component)]
#[require(GravityController)]
pub struct SoundGravityController {
    pub normal_sound: Option<String>,
    pub inverted_sound: Option<String>,
    pub toggle_sound: Option<String>,
}

impl SoundGravityController {
    pub fn sound_for(&self, gravity_type: GravityType) -> Option<&str> {
        match gravity_type {
            GravityType::Normal => self.normal_sound.as_deref(),
            GravityType::Inverted => self.inverted_sound.as_deref(),
            GravityType::Toggle => self.toggle_sound.as_deref(),
            GravityType::None => None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum VvvvvvMode {
    #[default]
    Off,
    On,
    /// Enabled while the player is inside a [`VvvvvvField`](super::VvvvvvField).
    TriggerBased,
}

/// Replaces jumping with flipping gravity.
#[derive(Debug, Default, Clone, Component)]
#[require(GravityController)]
pub struct VvvvvvGravityController {
    pub mode: VvvvvvMode,
    pub flip_sound: Option<String>,
}

impl VvvvvvGravityController {
    pub fn is_vvvvvv(&self, settings: &GravitySettings, session: &GravitySession) -> bool {
        let level = match self.mode {
            VvvvvvMode::Off => false,
            VvvvvvMode::On => true,
            VvvvvvMode::TriggerBased => session.vvvvvv_trigger,
        };
        settings.vvvvvv_mode.resolve(level)
    }

    /// The cue to play on a flip, after applying the player's sound setting.
    pub fn flip_sound(&self, settings: &GravitySettings) -> Option<String> {
        let configured = self.flip_sound.clone().filter(|sound| !sound.trim().is_empty());
        match settings.vvvvvv_flip_sound {
            Setting::Default => configured,
            Setting::Enabled => configured.or_else(|| Some(params::VVVVVV_FLIP_SOUND.to_owned())),
            Setting::Disabled => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gravity::test_world;

    #[test]
    fn first_constructed_wins_without_persistent() {
        let mut world = test_world();
        let first = world
            .spawn(BehaviorGravityController {
                holdable_reset_time: 1.,
            })
            .id();
        world.spawn(BehaviorGravityController {
            holdable_reset_time: 5.,
        });

        let controllers = world
            .query::<(Entity, &GravityController)>()
            .iter(&world)
            .collect::<Vec<_>>();
        assert_eq!(resolve_active(controllers), Some(first));
        assert_eq!(
            active_controller::<BehaviorGravityController>(&mut world)
                .map(|c| c.holdable_reset_time),
            Some(1.)
        );
    }

    #[test]
    fn last_persistent_wins() {
        let mut world = test_world();
        world.spawn(BehaviorGravityController {
            holdable_reset_time: 1.,
        });
        world.spawn((
            GravityController::persistent(),
            BehaviorGravityController {
                holdable_reset_time: 2.,
            },
        ));
        world.spawn((
            GravityController::persistent(),
            BehaviorGravityController {
                holdable_reset_time: 3.,
            },
        ));
        world.spawn(BehaviorGravityController {
            holdable_reset_time: 4.,
        });

        assert_eq!(
            active_controller::<BehaviorGravityController>(&mut world)
                .map(|c| c.holdable_reset_time),
            Some(3.)
        );
    }

    #[test]
    fn kinds_resolve_independently() {
        let mut world = test_world();
        world.spawn(BehaviorGravityController::default());
        world.spawn(VvvvvvGravityController {
            mode: VvvvvvMode::On,
            flip_sound: None,
        });

        assert!(active_controller::<VvvvvvGravityController>(&mut world).is_some());
        assert!(active_controller::<SoundGravityController>(&mut world).is_none());
    }

    #[test]
    fn vvvvvv_mode_honours_settings_and_trigger() {
        let controller = VvvvvvGravityController {
            mode: VvvvvvMode::TriggerBased,
            flip_sound: None,
        };
        let mut settings = GravitySettings::default();
        let mut session = GravitySession::default();

        assert!(!controller.is_vvvvvv(&settings, &session));
        session.vvvvvv_trigger = true;
        assert!(controller.is_vvvvvv(&settings, &session));
        settings.vvvvvv_mode = Setting::Disabled;
        assert!(!controller.is_vvvvvv(&settings, &session));
    }

    #[test]
    fn flip_sound_setting() {
        let mut controller = VvvvvvGravityController::default();
        let mut settings = GravitySettings::default();
        assert_eq!(controller.flip_sound(&settings), None);

        settings.vvvvvv_flip_sound = Setting::Enabled;
        assert_eq!(
            controller.flip_sound(&settings).as_deref(),
            Some(params::VVVVVV_FLIP_SOUND)
        );

        controller.flip_sound = Some("audio/sfx/custom.wav".into());
        settings.vvvvvv_flip_sound = Setting::Default;
        assert_eq!(
            controller.flip_sound(&settings).as_deref(),
            Some("audio/sfx/custom.wav")
        );

        settings.vvvvvv_flip_sound = Setting::Disabled;
        assert_eq!(controller.flip_sound(&settings), None);
    }
}
