use super::Action;
use bevy::prelude::*;
use leafwing_input_manager::prelude::{
    GamepadStick, InputMap, VirtualDPad, WithDualAxisProcessingPipelineExt,
};

pub(super) fn input_map() -> InputMap<Action> {
    InputMap::new([
        (Action::Jump, KeyCode::Space),
        (Action::Interact, KeyCode::KeyE),
    ])
    .with(Action::Jump, GamepadButton::South)
    .with(Action::Interact, GamepadButton::West)
    .with_dual_axis(Action::Run, GamepadStick::LEFT.with_deadzone_symmetric(0.3))
    .with_dual_axis(Action::Run, VirtualDPad::wasd())
    .with_dual_axis(Action::Run, VirtualDPad::arrow_keys())
}
