//! Debug console commands.
//!
//! ```text
//! gravity [0|1|2]         set the player's gravity to normal, inverted or toggle it
//! initial_gravity [0|1]   set the gravity the player spawns with
//! ```
//!
//! Without an argument both commands report the current value. Values outside the listed
//! range are ignored, as is `gravity` while there is no player to apply it to.

use super::{
    component::{player_gravity, set_player_gravity},
    GravityRequest, GravitySession, GravityType,
};
use bevy::prelude::*;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    Gravity(Option<i32>),
    InitialGravity(Option<i32>),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConsoleError {
    #[error("no command given")]
    Empty,
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    #[error("expected a number, got `{0}`")]
    InvalidArgument(String),
    #[error("`{0}` takes at most one argument")]
    TooManyArguments(&'static str),
}

impl FromStr for ConsoleCommand {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let name = words.next().ok_or(ConsoleError::Empty)?;
        let (name, command): (&'static str, fn(Option<i32>) -> Self) = match name {
            "gravity" => ("gravity", Self::Gravity),
            "initial_gravity" => ("initial_gravity", Self::InitialGravity),
            other => return Err(ConsoleError::UnknownCommand(other.to_owned())),
        };

        let argument = words
            .next()
            .map(|arg| {
                arg.parse::<i32>()
                    .map_err(|_| ConsoleError::InvalidArgument(arg.to_owned()))
            })
            .transpose()?;

        if words.next().is_some() {
            return Err(ConsoleError::TooManyArguments(name));
        }

        Ok(command(argument))
    }
}

/// A line typed into the console.
#[derive(Debug, Clone, Event)]
pub struct ConsoleInput(pub String);

/// A line the console prints back.
#[derive(Debug, Clone, PartialEq, Eq, Event)]
pub struct ConsoleOutput(pub String);

/// Runs `command` and returns what it printed, if anything.
pub fn run_console_command(world: &mut World, command: ConsoleCommand) -> Option<String> {
    match command {
        ConsoleCommand::Gravity(None) => Some(format!(
            "Current gravity state: {}",
            player_gravity(world)
        )),
        ConsoleCommand::Gravity(Some(code)) => {
            let gravity_type = GravityType::from_code(code).filter(|g| *g != GravityType::None)?;
            if !set_player_gravity(world, GravityRequest::new(gravity_type)) {
                return None;
            }
            invalidate_run(world);
            Some(format!(
                "Current gravity is now: {}",
                player_gravity(world)
            ))
        }
        ConsoleCommand::InitialGravity(None) => {
            let session = world.get_resource::<GravitySession>()?;
            Some(format!("Initial gravity state: {}", session.initial_gravity))
        }
        ConsoleCommand::InitialGravity(Some(code)) => {
            let gravity_type = GravityType::from_code(code).filter(|g| g.is_resting())?;
            let mut session = world.get_resource_mut::<GravitySession>()?;
            session.initial_gravity = gravity_type;
            session.run_invalidated = true;
            Some(format!("Initial gravity is now: {gravity_type}"))
        }
    }
}

fn invalidate_run(world: &mut World) {
    if let Some(mut session) = world.get_resource_mut::<GravitySession>() {
        if !session.run_invalidated {
            warn!("gravity changed from the console, this run no longer counts");
        }
        session.run_invalidated = true;
    }
}

pub fn handle_console_input(world: &mut World) {
    let lines = world
        .get_resource_mut::<Events<ConsoleInput>>()
        .map(|mut events| events.drain().map(|input| input.0).collect::<Vec<_>>())
        .unwrap_or_default();

    for line in lines {
        let reply = match line.parse::<ConsoleCommand>() {
            Ok(command) => run_console_command(world, command),
            Err(err) => Some(err.to_string()),
        };

        if let Some(reply) = reply {
            info!("{reply}");
            if world.contains_resource::<Events<ConsoleOutput>>() {
                world.send_event(ConsoleOutput(reply));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gravity::{component::gravity_of, GravityComponent, PlayerGravity};

    #[test]
    fn parses_commands() {
        assert_eq!("gravity".parse::<ConsoleCommand>(), Ok(ConsoleCommand::Gravity(None)));
        assert_eq!("gravity 2".parse::<ConsoleCommand>(), Ok(ConsoleCommand::Gravity(Some(2))));
        assert_eq!(
            "  initial_gravity   1 ".parse::<ConsoleCommand>(),
            Ok(ConsoleCommand::InitialGravity(Some(1)))
        );
        assert_eq!("".parse::<ConsoleCommand>(), Err(ConsoleError::Empty));
        assert_eq!(
            "gravity up".parse::<ConsoleCommand>(),
            Err(ConsoleError::InvalidArgument("up".into()))
        );
        assert_eq!(
            "gravity 1 2".parse::<ConsoleCommand>(),
            Err(ConsoleError::TooManyArguments("gravity"))
        );
        assert_eq!(
            "noclip".parse::<ConsoleCommand>(),
            Err(ConsoleError::UnknownCommand("noclip".into()))
        );
    }

    fn world_with_player() -> (World, Entity) {
        let mut world = crate::gravity::test_world();
        let player = world.spawn(PlayerGravity).id();
        world.flush();
        (world, player)
    }

    #[test]
    fn gravity_command_sets_and_toggles() {
        let (mut world, player) = world_with_player();

        let reply = run_console_command(&mut world, ConsoleCommand::Gravity(Some(1)));
        assert_eq!(reply.as_deref(), Some("Current gravity is now: Inverted"));
        assert_eq!(gravity_of(&world, player), GravityType::Inverted);
        assert!(world.resource::<GravitySession>().run_invalidated);

        run_console_command(&mut world, ConsoleCommand::Gravity(Some(2)));
        run_console_command(&mut world, ConsoleCommand::Gravity(Some(2)));
        assert_eq!(gravity_of(&world, player), GravityType::Normal);
    }

    #[test]
    fn out_of_range_values_are_ignored() {
        let (mut world, player) = world_with_player();

        for code in [3, -1, 42] {
            assert_eq!(
                run_console_command(&mut world, ConsoleCommand::Gravity(Some(code))),
                None
            );
        }
        assert_eq!(
            run_console_command(&mut world, ConsoleCommand::InitialGravity(Some(2))),
            None
        );
        assert_eq!(gravity_of(&world, player), GravityType::Normal);
        assert!(!world.resource::<GravitySession>().run_invalidated);
    }

    #[test]
    fn gravity_without_a_player_changes_nothing() {
        let mut world = crate::gravity::test_world();

        assert_eq!(
            run_console_command(&mut world, ConsoleCommand::Gravity(Some(1))),
            None
        );
        assert!(!world.resource::<GravitySession>().run_invalidated);

        let locked = world.spawn(PlayerGravity).id();
        world.flush();
        world.get_mut::<GravityComponent>(locked).unwrap().locked = true;
        assert_eq!(
            run_console_command(&mut world, ConsoleCommand::Gravity(Some(2))),
            None
        );
        assert_eq!(gravity_of(&world, locked), GravityType::Normal);
        assert!(!world.resource::<GravitySession>().run_invalidated);
    }

    #[test]
    fn commands_without_arguments_report() {
        let (mut world, _) = world_with_player();
        assert_eq!(
            run_console_command(&mut world, ConsoleCommand::Gravity(None)).as_deref(),
            Some("Current gravity state: Normal")
        );

        run_console_command(&mut world, ConsoleCommand::InitialGravity(Some(1)));
        assert_eq!(
            run_console_command(&mut world, ConsoleCommand::InitialGravity(None)).as_deref(),
            Some("Initial gravity state: Inverted")
        );
    }

    #[test]
    fn input_events_produce_output_events() {
        let (mut world, _) = world_with_player();
        world.send_event(ConsoleInput("gravity 1".into()));
        world.send_event(ConsoleInput("gravity 7".into()));
        world.send_event(ConsoleInput("jump".into()));

        handle_console_input(&mut world);

        let output = world
            .resource_mut::<Events<ConsoleOutput>>()
            .drain()
            .collect::<Vec<_>>();
        assert_eq!(
            output,
            vec![
                ConsoleOutput("Current gravity is now: Inverted".into()),
                ConsoleOutput("unknown command `jump`".into()),
            ]
        );
    }
}
