//! The single authoritative copy of the game.
//!
//! [`StateServer`] owns the grid, the player registry and the session
//! bookkeeping behind one mutex. Every operation takes that lock for its
//! whole duration; nothing else in the server can reach the state.

use crate::commands::{process_move, MoveOutcome};
use crate::error::ServerError;
use crate::session::SessionManager;
use shared::{GameState, Grid, MoveCommand, PlayerId};
use std::time::Duration;
use tokio::sync::Mutex;

/// Result of a successful registration
#[derive(Debug, Clone)]
pub struct Registration {
    pub player_id: PlayerId,
    pub state: GameState,
}

struct Inner {
    game: GameState,
    sessions: SessionManager,
}

pub struct StateServer {
    inner: Mutex<Inner>,
}

impl StateServer {
    pub fn new(grid: Grid) -> Self {
        Self::with_sessions(grid, SessionManager::new())
    }

    pub fn with_sessions(grid: Grid, sessions: SessionManager) -> Self {
        Self {
            inner: Mutex::new(Inner {
                game: GameState::new(grid),
                sessions,
            }),
        }
    }

    pub async fn register_player(&self) -> Result<Registration, ServerError> {
        let mut guard = self.inner.lock().await;
        let Inner { game, sessions } = &mut *guard;

        let (player_id, state) = sessions.register_player(game)?;
        Ok(Registration { player_id, state })
    }

    /// Applies a move. Rejections are absorbed here; the outcome is returned
    /// for logging and tests only.
    pub async fn move_player(&self, command: MoveCommand) -> MoveOutcome {
        let mut guard = self.inner.lock().await;
        let Inner { game, sessions } = &mut *guard;

        sessions.touch(command.player_id);
        process_move(game, &command)
    }

    /// Returns a point-in-time copy of the whole state. When `player_id` is
    /// given, the call also counts as activity for that player.
    pub async fn snapshot(&self, player_id: Option<PlayerId>) -> GameState {
        let mut guard = self.inner.lock().await;
        if let Some(id) = player_id {
            guard.sessions.touch(id);
        }
        guard.game.clone()
    }

    pub async fn evict_idle(&self, timeout: Duration) -> Vec<PlayerId> {
        let mut guard = self.inner.lock().await;
        let Inner { game, sessions } = &mut *guard;

        sessions.evict_idle(game, timeout)
    }

    pub async fn player_count(&self) -> usize {
        self.inner.lock().await.game.player_count()
    }
}
