use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub mod protocol;

pub use protocol::{read_frame, write_frame, Request, Response, MAX_FRAME_LEN};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 1234;
pub const SPAWN_X: i32 = 5;
pub const SPAWN_Y: i32 = 10;
pub const STARTING_LIVES: i32 = 3;
pub const PLAYER_SYMBOL: char = '☺';
pub const PLAYER_COLOR: i32 = 7;
pub const POLL_INTERVAL_MS: u64 = 100;
pub const MOVE_RETRIES: u32 = 3;
pub const MOVE_RETRY_BACKOFF_MS: u64 = 200;

pub type PlayerId = u32;

/// A single map tile: what it looks like and whether it can be walked on.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub symbol: char,
    pub passable: bool,
    pub color_fg: i32,
    pub color_bg: i32,
}

impl Cell {
    pub fn empty() -> Self {
        Self {
            symbol: ' ',
            passable: true,
            color_fg: 0,
            color_bg: 0,
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::empty()
    }
}

/// Static tile map. Rows may have different lengths, so every bounds check
/// is made against the row being addressed.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
}

impl Grid {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// True when the map has no rows at all.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell(&self, x: i32, y: i32) -> Option<&Cell> {
        if x < 0 || y < 0 {
            return None;
        }
        self.rows.get(y as usize)?.get(x as usize)
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        self.cell(x, y).is_some()
    }

    /// Out-of-bounds coordinates are never passable.
    pub fn is_passable(&self, x: i32, y: i32) -> bool {
        self.cell(x, y).map_or(false, |cell| cell.passable)
    }
}

/// Four-directional movement decoded from a WASD key.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Left,
    Down,
    Right,
}

impl Direction {
    pub fn from_key(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'w' => Some(Direction::Up),
            'a' => Some(Direction::Left),
            's' => Some(Direction::Down),
            'd' => Some(Direction::Right),
            _ => None,
        }
    }

    pub fn key(self) -> char {
        match self {
            Direction::Up => 'w',
            Direction::Left => 'a',
            Direction::Down => 's',
            Direction::Right => 'd',
        }
    }

    /// Unit displacement as (dx, dy); rows grow downwards.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Down => (0, 1),
            Direction::Right => (1, 0),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub pos_x: i32,
    pub pos_y: i32,
    /// Marker drawn at the player's position
    pub symbol: Cell,
    /// Map cell currently underneath the player
    pub standing_on: Cell,
    /// Highest move sequence seen from this player; lower or equal ones are dropped
    pub last_applied_sequence: u64,
    pub lives_remaining: i32,
}

impl Player {
    pub fn new(id: PlayerId, pos_x: i32, pos_y: i32, standing_on: Cell) -> Self {
        Self {
            id,
            pos_x,
            pos_y,
            symbol: Cell {
                symbol: PLAYER_SYMBOL,
                passable: false,
                color_fg: PLAYER_COLOR,
                color_bg: 0,
            },
            standing_on,
            last_applied_sequence: 0,
            lives_remaining: STARTING_LIVES,
        }
    }

    pub fn position(&self) -> (i32, i32) {
        (self.pos_x, self.pos_y)
    }
}

/// The grid plus every registered player. This is both the unit the server
/// locks and the snapshot handed to clients.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct GameState {
    pub grid: Grid,
    pub players: HashMap<PlayerId, Player>,
}

impl GameState {
    pub fn new(grid: Grid) -> Self {
        Self {
            grid,
            players: HashMap::new(),
        }
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Returns the id of any player other than `excluding` standing on (x, y).
    pub fn occupant_at(&self, x: i32, y: i32, excluding: PlayerId) -> Option<PlayerId> {
        self.players
            .values()
            .find(|p| p.id != excluding && p.pos_x == x && p.pos_y == y)
            .map(|p| p.id)
    }
}

/// A single movement request as produced by a client keypress.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct MoveCommand {
    pub player_id: PlayerId,
    pub key: char,
    pub sequence: u64,
}

impl MoveCommand {
    pub fn direction(&self) -> Option<Direction> {
        Direction::from_key(self.key)
    }
}
