//! Client side of the remote operations: registration, state polling and
//! move submission with bounded retry.

use crate::connection::Connection;
use crate::error::ClientError;
use crate::game::ClientView;
use log::{error, info, warn};
use shared::{
    GameState, MoveCommand, PlayerId, Request, Response, MOVE_RETRIES, MOVE_RETRY_BACKOFF_MS,
    POLL_INTERVAL_MS,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{interval, sleep, MissedTickBehavior};

/// Hands out strictly increasing move sequence numbers, starting at 1.
/// Safe to share between concurrently running move tasks.
#[derive(Debug, Default)]
pub struct SequenceCounter {
    last: AtomicU64,
}

impl SequenceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> u64 {
        self.last.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// How often and how patiently a move is resent after a transport failure
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: MOVE_RETRIES,
            backoff: Duration::from_millis(MOVE_RETRY_BACKOFF_MS),
        }
    }
}

/// A registered player's handle on the server. Cheap to clone; clones share
/// the connection and the sequence counter.
#[derive(Clone)]
pub struct GameClient {
    player_id: PlayerId,
    connection: Arc<Mutex<Connection>>,
    sequence: Arc<SequenceCounter>,
    retry: RetryPolicy,
}

impl GameClient {
    /// Connects, registers a new player and returns the client together with
    /// the initial snapshot.
    pub async fn register(server_addr: &str) -> Result<(Self, GameState), ClientError> {
        Self::register_with(Connection::new(server_addr), RetryPolicy::default()).await
    }

    pub async fn register_with(
        mut connection: Connection,
        retry: RetryPolicy,
    ) -> Result<(Self, GameState), ClientError> {
        let (player_id, state) = match connection.call(&Request::RegisterPlayer).await? {
            Response::Registered { player_id, state } => (player_id, state),
            Response::Error { reason } => return Err(ClientError::Rejected(reason)),
            other => return Err(ClientError::UnexpectedResponse(format!("{:?}", other))),
        };
        info!("Joined the game as player {}", player_id);

        let client = GameClient {
            player_id,
            connection: Arc::new(Mutex::new(connection)),
            sequence: Arc::new(SequenceCounter::new()),
            retry,
        };
        Ok((client, state))
    }

    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    pub async fn poll_state(&self) -> Result<GameState, ClientError> {
        let request = Request::GetGameState {
            player_id: Some(self.player_id),
        };
        match self.connection.lock().await.call(&request).await? {
            Response::GameState(state) => Ok(state),
            Response::Error { reason } => Err(ClientError::Rejected(reason)),
            other => Err(ClientError::UnexpectedResponse(format!("{:?}", other))),
        }
    }

    /// Builds the next move command. The sequence number is taken here, once,
    /// so every retry of the command carries the same number and the server
    /// applies it at most once.
    pub fn next_command(&self, key: char) -> MoveCommand {
        MoveCommand {
            player_id: self.player_id,
            key,
            sequence: self.sequence.next(),
        }
    }

    pub async fn send_move(&self, key: char) -> Result<(), ClientError> {
        self.send_command(self.next_command(key)).await
    }

    /// Sends `command`, retrying on transport failure up to the configured
    /// number of attempts.
    pub async fn send_command(&self, command: MoveCommand) -> Result<(), ClientError> {
        let request = Request::MovePlayer(command);

        let mut last_error = ClientError::Disconnected;
        for attempt in 1..=self.retry.attempts {
            let result = self.connection.lock().await.call(&request).await;
            match result {
                Ok(Response::MoveAck) => return Ok(()),
                Ok(other) => {
                    return Err(ClientError::UnexpectedResponse(format!("{:?}", other)));
                }
                Err(e) => {
                    warn!(
                        "Move {} failed (attempt {}/{}): {}",
                        command.sequence, attempt, self.retry.attempts, e
                    );
                    last_error = e;
                }
            }

            if attempt < self.retry.attempts {
                sleep(self.retry.backoff).await;
            }
        }

        Err(last_error)
    }

    /// Fire-and-forget move submission. The sequence number is assigned
    /// before the task is spawned, so keypress order is sequence order even
    /// when several moves are in flight. A move that still fails after all
    /// retries is logged and dropped.
    pub fn dispatch_move(&self, key: char) {
        let command = self.next_command(key);
        let client = self.clone();
        tokio::spawn(async move {
            if let Err(e) = client.send_command(command).await {
                warn!("Giving up on move {}: {}", command.sequence, e);
            }
        });
    }

    /// Refreshes `view` every [`POLL_INTERVAL_MS`] until a poll fails or a
    /// snapshot arrives without our player, which means the server evicted
    /// us. Either way the reason is returned and the view is flagged.
    pub async fn run_poller(&self, view: Arc<StdMutex<ClientView>>) -> ClientError {
        let mut ticker = interval(Duration::from_millis(POLL_INTERVAL_MS));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let polled = self.poll_state().await.and_then(|state| {
                if state.player(self.player_id).is_some() {
                    Ok(state)
                } else {
                    Err(ClientError::Evicted)
                }
            });

            match polled {
                Ok(state) => {
                    let mut guard = view.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                    guard.apply_snapshot(state);
                }
                Err(e) => {
                    error!("Lost connection to server: {}", e);
                    let mut guard = view.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                    guard.mark_connection_lost(e.to_string());
                    return e;
                }
            }
        }
    }
}
