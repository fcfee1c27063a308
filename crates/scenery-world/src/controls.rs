use winit::keyboard::KeyCode;

use crate::config::WorldConfig;
use crate::world::ViewState;

const ROTATION_STEP_DEGREES: f32 = 5.0;
const DISTANCE_STEP: f32 = 1.0;
const MIN_DISTANCE: f32 = 1.0;

/// What a key press does to the view.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ViewAction {
    /// Adds degrees to `rotation_x`.
    RotateX(f32),
    /// Adds degrees to `rotation_y`.
    RotateY(f32),
    /// Adds to `distance`, never going below the minimum.
    Dolly(f32),
    ToggleGrid,
    Exit,
}

impl ViewAction {
    pub fn from_key(key: KeyCode) -> Option<Self> {
        let action = match key {
            KeyCode::ArrowUp => ViewAction::RotateX(-ROTATION_STEP_DEGREES),
            KeyCode::ArrowDown => ViewAction::RotateX(ROTATION_STEP_DEGREES),
            KeyCode::ArrowLeft => ViewAction::RotateY(-ROTATION_STEP_DEGREES),
            KeyCode::ArrowRight => ViewAction::RotateY(ROTATION_STEP_DEGREES),
            KeyCode::Equal | KeyCode::NumpadAdd => ViewAction::Dolly(-DISTANCE_STEP),
            KeyCode::Minus | KeyCode::NumpadSubtract => ViewAction::Dolly(DISTANCE_STEP),
            KeyCode::KeyG => ViewAction::ToggleGrid,
            KeyCode::Escape => ViewAction::Exit,
            _ => return None,
        };
        Some(action)
    }

    /// Applies the action. Returns `false` for [`ViewAction::Exit`], which
    /// the host handles.
    pub fn apply(self, view: &mut ViewState, config: &mut WorldConfig) -> bool {
        match self {
            ViewAction::RotateX(d) => view.rotation_x = (view.rotation_x + d) % 360.0,
            ViewAction::RotateY(d) => view.rotation_y = (view.rotation_y + d) % 360.0,
            ViewAction::Dolly(d) => view.distance = (view.distance + d).max(MIN_DISTANCE),
            ViewAction::ToggleGrid => config.show_grid = !config.show_grid,
            ViewAction::Exit => return false,
        }
        true
    }
}
