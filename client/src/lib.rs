//! # Game Client Library
//!
//! Client side of the tile arena. The server owns the world; the client only
//! registers, polls snapshots and forwards key presses as move commands.
//!
//! ## Module Organization
//!
//! - [`connection`]: one lazily dialed TCP stream with a per-call timeout
//! - [`network`]: registration, state polling and retried move submission
//! - [`game`]: the latest snapshot and how it is composed into a frame
//! - [`input`]: keyboard to move-key mapping
//! - [`rendering`]: macroquad drawing of the composed frame
//!
//! ## Usage Example
//!
//! ```no_run
//! use client::network::GameClient;
//!
//! # async fn run() -> Result<(), client::error::ClientError> {
//! let (game, _initial) = GameClient::register("127.0.0.1:1234").await?;
//! game.send_move('d').await?;
//! let state = game.poll_state().await?;
//! println!("{} players online", state.player_count());
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod error;
pub mod game;
pub mod input;
pub mod network;
pub mod rendering;
