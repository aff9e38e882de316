//! Keyboard handling: turns key presses into move keys for the server

use macroquad::prelude::*;
use shared::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// A direction key, encoded the way the server expects it
    Move(char),
    Quit,
}

const WATCHED_KEYS: [KeyCode; 10] = [
    KeyCode::W,
    KeyCode::A,
    KeyCode::S,
    KeyCode::D,
    KeyCode::Up,
    KeyCode::Left,
    KeyCode::Down,
    KeyCode::Right,
    KeyCode::Q,
    KeyCode::Escape,
];

/// Maps a physical key to the event it triggers, if any.
pub fn event_for_key(key: KeyCode) -> Option<InputEvent> {
    let direction = match key {
        KeyCode::W | KeyCode::Up => Direction::Up,
        KeyCode::A | KeyCode::Left => Direction::Left,
        KeyCode::S | KeyCode::Down => Direction::Down,
        KeyCode::D | KeyCode::Right => Direction::Right,
        KeyCode::Q | KeyCode::Escape => return Some(InputEvent::Quit),
        _ => return None,
    };
    Some(InputEvent::Move(direction.key()))
}

pub struct InputManager;

impl InputManager {
    pub fn new() -> Self {
        Self
    }

    /// Events for keys pressed since the previous frame. One event per
    /// press; holding a key does not repeat it.
    pub fn update(&mut self) -> Vec<InputEvent> {
        WATCHED_KEYS
            .iter()
            .filter(|key| is_key_pressed(**key))
            .filter_map(|key| event_for_key(*key))
            .collect()
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}
