use crate::gravity::{
    console::ConsoleOutput, listener, player, GravityChange, GravityCommandsExt, GravitySession,
    GravityType, ListenerError, ListenerTarget, VvvvvvState,
};
use bevy::prelude::*;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_ui)
            .add_systems(Update, (update_session_text, update_console_text));
    }
}

#[derive(Component)]
struct UiRoot;

/// Swatch colored with the player's gravity.
#[derive(Component)]
struct GravitySwatch;

#[derive(Component)]
struct GravityLabel;

#[derive(Component)]
struct SessionText;

#[derive(Component)]
struct ConsoleText;

/// Converts a world-space pixel into a UI pixel.
fn uipx(px: f32) -> Val {
    Val::Px(px * 4.0)
}

fn spawn_ui(mut commands: Commands) {
    let mut indicator = None;
    commands
        .spawn((
            UiRoot,
            Node {
                flex_direction: FlexDirection::Column,
                row_gap: uipx(2.),
                padding: UiRect::all(uipx(3.)),
                ..Default::default()
            },
        ))
        .with_children(|parent| {
            parent
                .spawn(Node {
                    column_gap: uipx(2.),
                    align_items: AlignItems::Center,
                    ..Default::default()
                })
                .with_children(|parent| {
                    indicator = Some(
                        parent
                            .spawn((
                                GravitySwatch,
                                Node {
                                    width: uipx(6.),
                                    height: uipx(6.),
                                    ..Default::default()
                                },
                                BackgroundColor(GravityType::Normal.color()),
                            ))
                            .id(),
                    );
                    parent.spawn((
                        GravityLabel,
                        Text::new(indicator_label(GravityType::Normal)),
                        TextFont::from_font_size(16.),
                    ));
                });

            parent.spawn((
                SessionText,
                Text::default(),
                TextFont::from_font_size(12.),
            ));
            parent.spawn((
                ConsoleText,
                Text::default(),
                TextFont::from_font_size(12.),
                TextColor(Color::srgb(0.7, 0.7, 0.7)),
            ));
        });

    if let Some(owner) = indicator {
        commands.add_gravity_listener(
            owner,
            ListenerTarget::Any,
            listener::listener(update_indicator),
        );
    }
}

fn indicator_label(gravity: GravityType) -> String {
    format!("Gravity: {gravity}")
}

fn update_indicator(
    world: &mut World,
    subject: Entity,
    change: &GravityChange,
) -> Result<(), ListenerError> {
    if player(world) != Some(subject) {
        return Ok(());
    }

    let mut swatches = world.query_filtered::<&mut BackgroundColor, With<GravitySwatch>>();
    for mut color in swatches.iter_mut(world) {
        color.0 = change.new_value.color();
    }

    let mut labels = world.query_filtered::<&mut Text, With<GravityLabel>>();
    let mut found = false;
    for mut text in labels.iter_mut(world) {
        text.0 = indicator_label(change.new_value);
        found = true;
    }

    if !found {
        return Err(ListenerError::Custom("gravity indicator label is missing".into()));
    }

    Ok(())
}

fn update_session_text(
    session: Res<GravitySession>,
    vvvvvv: Res<VvvvvvState>,
    text: Option<Single<&mut Text, With<SessionText>>>,
) {
    let Some(mut text) = text else {
        return;
    };

    if !session.is_changed() && !vvvvvv.is_changed() {
        return;
    }

    text.0 = format!(
        "initial {} | previous {} | vvvvvv {}{}",
        session.initial_gravity,
        session
            .previous_gravity
            .map_or_else(|| "-".to_string(), |g| g.to_string()),
        if vvvvvv.active { "on" } else { "off" },
        if session.run_invalidated { " | run invalidated" } else { "" },
    );
}

fn update_console_text(
    mut reader: EventReader<ConsoleOutput>,
    text: Option<Single<&mut Text, With<ConsoleText>>>,
) {
    let Some(mut text) = text else {
        return;
    };

    if let Some(output) = reader.read().last() {
        text.0 = output.0.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gravity::{set_player_gravity, test_world, PlayerGravity};

    #[test]
    fn indicator_follows_the_player_only() {
        let mut world = test_world();
        let swatch = world
            .spawn((GravitySwatch, BackgroundColor(GravityType::Normal.color())))
            .id();
        let label = world.spawn((GravityLabel, Text::default())).id();
        listener::add_listener(
            &mut world,
            swatch,
            ListenerTarget::Any,
            listener::listener(update_indicator),
        );

        let player = world.spawn(PlayerGravity).id();
        world.flush();
        assert_eq!(world.get::<Text>(label).unwrap().0, "Gravity: Normal");

        set_player_gravity(&mut world, GravityType::Inverted);
        assert_eq!(world.get::<Text>(label).unwrap().0, "Gravity: Inverted");
        assert_eq!(
            world.get::<BackgroundColor>(swatch).unwrap().0,
            GravityType::Inverted.color()
        );

        let other = world.spawn(crate::gravity::GravityComponent::default()).id();
        world.flush();
        crate::gravity::set_gravity(&mut world, other, GravityType::Normal);
        assert_eq!(world.get::<Text>(label).unwrap().0, "Gravity: Inverted");
        assert!(world.get::<PlayerGravity>(player).is_some());
    }
}
