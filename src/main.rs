#![allow(clippy::type_complexity)]

use bevy::{
    input::{keyboard::KeyboardInput, ButtonState},
    prelude::*,
};
use bevy_tween::DefaultTweenPlugins;
use gravity_flip::gravity::console::ConsoleInput;
use gravity_flip::gravity::{GravitySession, RoomTransition};
use gravity_flip::physics::gravity::Gravity;
use gravity_flip::prelude::*;

mod sandbox;

fn main() {
    App::default()
        .add_plugins((
            DefaultPlugins.set(ImagePlugin::default_nearest()),
            DefaultTweenPlugins,
            PhysicsPlugin,
            GravityPlugin,
            PlayerPlugin,
            UiPlugin,
            VisualsPlugin,
        ))
        .insert_resource(Gravity(Vec2::NEG_Y * 10.))
        .add_systems(Startup, spawn_camera)
        .add_systems(
            Update,
            (
                close_on_escape,
                (request_reload, console_shortcuts, save_session)
                    .before(GravitySystems::Session),
                load_sandbox.after(GravitySystems::Session),
            ),
        )
        .run();
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        OrthographicProjection {
            scale: 0.4,
            ..OrthographicProjection::default_2d()
        },
    ));
}

fn close_on_escape(mut reader: EventReader<KeyboardInput>, mut writer: EventWriter<AppExit>) {
    for input in reader.read() {
        if input.state == ButtonState::Pressed && input.key_code == KeyCode::Escape {
            writer.send(AppExit::Success);
        }
    }
}

fn just_pressed(reader: &mut EventReader<KeyboardInput>, key: KeyCode) -> bool {
    reader
        .read()
        .filter(|i| !i.repeat && i.key_code == key && i.state == ButtonState::Pressed)
        .count()
        > 0
}

/// Leaving the room through R carries the player's gravity into the reloaded room.
fn request_reload(mut reader: EventReader<KeyboardInput>, mut writer: EventWriter<RoomTransition>) {
    if just_pressed(&mut reader, KeyCode::KeyR) {
        writer.send(RoomTransition);
    }
}

fn console_shortcuts(mut reader: EventReader<KeyboardInput>, mut writer: EventWriter<ConsoleInput>) {
    for input in reader.read() {
        if input.repeat || input.state != ButtonState::Pressed {
            continue;
        }

        let line = match input.key_code {
            KeyCode::KeyG => "gravity 2",
            KeyCode::KeyI => "initial_gravity 1",
            KeyCode::KeyN => "initial_gravity 0",
            _ => continue,
        };
        writer.send(ConsoleInput(line.to_string()));
    }
}

fn save_session(mut reader: EventReader<KeyboardInput>, session: Res<GravitySession>) {
    if !just_pressed(&mut reader, KeyCode::F5) {
        return;
    }

    match session.to_json() {
        Ok(json) => info!("gravity session: {json}"),
        Err(err) => warn!("failed to serialize gravity session: {err}"),
    }
}

fn load_sandbox(
    mut commands: Commands,
    mut reader: EventReader<RoomTransition>,
    mut level_entity: Local<Option<Entity>>,
) {
    if level_entity.is_none() || reader.read().count() > 0 {
        level_entity.map(|e| commands.entity(e).despawn_recursive());

        let entity = commands.spawn_empty().id();
        commands.run_system_cached_with(sandbox::spawn, entity);
        *level_entity = Some(entity);
    }
}
