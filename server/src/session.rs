//! Player registration and session bookkeeping.
//!
//! The session manager owns identifier allocation and per-player activity
//! timestamps. It never holds a lock of its own: the state server keeps it
//! next to the [`GameState`] under the same mutex, so registration and
//! eviction always see a consistent player set.

use crate::error::ServerError;
use log::info;
use shared::{Cell, GameState, Player, PlayerId, SPAWN_X, SPAWN_Y};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Activity record for a registered player
#[derive(Debug)]
pub struct Session {
    pub player_id: PlayerId,
    /// Last time any request from this player reached the server
    pub last_seen: Instant,
}

impl Session {
    pub fn new(player_id: PlayerId) -> Self {
        Self {
            player_id,
            last_seen: Instant::now(),
        }
    }

    pub fn touch(&mut self) {
        self.last_seen = Instant::now();
    }

    pub fn is_timed_out(&self, timeout: Duration) -> bool {
        self.last_seen.elapsed() > timeout
    }
}

pub struct SessionManager {
    sessions: HashMap<PlayerId, Session>,
    /// Next identifier to hand out; never decreases, so ids are not reused
    next_player_id: PlayerId,
    spawn: (i32, i32),
}

impl SessionManager {
    pub fn new() -> Self {
        Self::with_spawn(SPAWN_X, SPAWN_Y)
    }

    pub fn with_spawn(x: i32, y: i32) -> Self {
        Self {
            sessions: HashMap::new(),
            next_player_id: 1,
            spawn: (x, y),
        }
    }

    /// Adds a new player at the spawn point and returns its id together with
    /// a copy of the resulting state.
    ///
    /// The spawn cell is neither checked for walls nor for other players, so
    /// several fresh players may share it until they move away.
    pub fn register_player(
        &mut self,
        state: &mut GameState,
    ) -> Result<(PlayerId, GameState), ServerError> {
        if state.grid.is_empty() {
            return Err(ServerError::MapNotLoaded);
        }

        let player_id = self.next_player_id;
        self.next_player_id += 1;

        let (x, y) = self.spawn;
        let standing_on = state.grid.cell(x, y).copied().unwrap_or_default();
        state
            .players
            .insert(player_id, Player::new(player_id, x, y, standing_on));
        self.sessions.insert(player_id, Session::new(player_id));

        info!("Player {} registered at ({}, {})", player_id, x, y);
        info!("Total players: {}", state.player_count());

        Ok((player_id, state.clone()))
    }

    /// Refreshes the activity timestamp of a known player.
    pub fn touch(&mut self, player_id: PlayerId) {
        if let Some(session) = self.sessions.get_mut(&player_id) {
            session.touch();
        }
    }

    /// Removes players that have been silent for longer than `timeout` and
    /// returns their ids.
    pub fn evict_idle(&mut self, state: &mut GameState, timeout: Duration) -> Vec<PlayerId> {
        let mut timed_out: Vec<PlayerId> = self
            .sessions
            .values()
            .filter(|session| session.is_timed_out(timeout))
            .map(|session| session.player_id)
            .collect();
        timed_out.sort_unstable();

        for player_id in &timed_out {
            self.sessions.remove(player_id);
            if state.players.remove(player_id).is_some() {
                info!("Player {} evicted after {:?} of inactivity", player_id, timeout);
            }
        }

        timed_out
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::parse_map;

    fn open_state() -> GameState {
        let row = " ".repeat(12);
        let text = vec![row; 12].join("\n");
        GameState::new(parse_map(&text))
    }

    #[test]
    fn test_session_timeout() {
        let mut session = Session::new(1);
        assert!(!session.is_timed_out(Duration::from_secs(1)));

        session.last_seen = Instant::now() - Duration::from_secs(2);
        assert!(session.is_timed_out(Duration::from_secs(1)));

        session.touch();
        assert!(!session.is_timed_out(Duration::from_secs(1)));
    }

    #[test]
    fn test_register_assigns_sequential_ids() {
        let mut manager = SessionManager::new();
        let mut state = open_state();

        let ids: Vec<PlayerId> = (0..5)
            .map(|_| manager.register_player(&mut state).unwrap().0)
            .collect();

        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(manager.len(), 5);
        assert_eq!(state.player_count(), 5);
    }

    #[test]
    fn test_register_places_player_at_spawn() {
        let mut manager = SessionManager::new();
        let mut state = open_state();

        let (id, snapshot) = manager.register_player(&mut state).unwrap();
        let player = snapshot.player(id).unwrap();

        assert_eq!(player.position(), (SPAWN_X, SPAWN_Y));
        assert_eq!(player.standing_on, Cell::empty());
        assert_eq!(player.last_applied_sequence, 0);
    }

    #[test]
    fn test_register_returns_detached_snapshot() {
        let mut manager = SessionManager::new();
        let mut state = open_state();

        let (id, snapshot) = manager.register_player(&mut state).unwrap();
        state.players.get_mut(&id).unwrap().pos_x = 0;

        assert_eq!(snapshot.player(id).unwrap().pos_x, SPAWN_X);
    }

    #[test]
    fn test_spawn_is_not_checked_for_occupancy() {
        let mut manager = SessionManager::new();
        let mut state = open_state();

        let (first, _) = manager.register_player(&mut state).unwrap();
        let (second, _) = manager.register_player(&mut state).unwrap();

        assert_eq!(
            state.player(first).unwrap().position(),
            state.player(second).unwrap().position()
        );
    }

    #[test]
    fn test_spawn_outside_ragged_grid_stands_on_floor() {
        let mut manager = SessionManager::new();
        let mut state = GameState::new(parse_map("▤▤"));

        let (id, _) = manager.register_player(&mut state).unwrap();
        assert_eq!(state.player(id).unwrap().standing_on, Cell::empty());
    }

    #[test]
    fn test_register_fails_without_map() {
        let mut manager = SessionManager::new();
        let mut state = GameState::default();

        let result = manager.register_player(&mut state);
        assert!(matches!(result, Err(ServerError::MapNotLoaded)));
        assert!(manager.is_empty());

        // A failed registration does not consume an id
        let mut state = open_state();
        assert_eq!(manager.register_player(&mut state).unwrap().0, 1);
    }

    #[test]
    fn test_evict_idle_removes_player_and_keeps_counter() {
        let mut manager = SessionManager::new();
        let mut state = open_state();

        let (stale, _) = manager.register_player(&mut state).unwrap();
        let (active, _) = manager.register_player(&mut state).unwrap();
        manager.sessions.get_mut(&stale).unwrap().last_seen =
            Instant::now() - Duration::from_secs(10);

        let evicted = manager.evict_idle(&mut state, Duration::from_secs(5));

        assert_eq!(evicted, vec![stale]);
        assert!(state.player(stale).is_none());
        assert!(state.player(active).is_some());
        assert_eq!(manager.len(), 1);

        let (next, _) = manager.register_player(&mut state).unwrap();
        assert_eq!(next, 3);
    }

    #[test]
    fn test_evict_idle_returns_sorted_ids() {
        let mut manager = SessionManager::new();
        let mut state = open_state();

        for _ in 0..8 {
            manager.register_player(&mut state).unwrap();
        }
        for session in manager.sessions.values_mut() {
            if session.player_id != 4 {
                session.last_seen = Instant::now() - Duration::from_secs(10);
            }
        }

        let evicted = manager.evict_idle(&mut state, Duration::from_secs(5));

        assert_eq!(evicted, vec![1, 2, 3, 5, 6, 7, 8]);
        assert_eq!(state.player_count(), 1);
        assert!(state.player(4).is_some());
    }

    #[test]
    fn test_custom_spawn_is_not_checked_for_walls() {
        let mut manager = SessionManager::with_spawn(0, 0);
        let mut state = GameState::new(parse_map("▤▤▤\n▤ ▤\n▤▤▤"));

        let (id, _) = manager.register_player(&mut state).unwrap();
        let player = state.player(id).unwrap();

        assert_eq!(player.position(), (0, 0));
        assert_eq!(player.standing_on.symbol, '▤');
        assert!(!player.standing_on.passable);
    }

    #[test]
    fn test_touch_unknown_player_is_ignored() {
        let mut manager = SessionManager::new();
        manager.touch(42);
        assert!(manager.is_empty());
    }
}
