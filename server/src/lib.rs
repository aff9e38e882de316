//! # Tile Arena Server Library
//!
//! Authoritative server for a small multiplayer tile game. One process owns
//! the canonical world (a tile map and the set of registered players) and
//! answers remote calls from thin clients that render snapshots and forward
//! keypresses.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative State
//! The server holds the only copy of the game. Clients never predict; they
//! poll for a full snapshot on a fixed interval and draw whatever comes back.
//!
//! ### Idempotent Movement
//! Clients retry move calls after transport failures without knowing whether
//! an earlier attempt landed. Every move carries a per-player sequence
//! number, and the server applies each sequence at most once. Older or
//! repeated sequences are dropped silently.
//!
//! ### Collision Rules
//! A move succeeds only if the destination lies inside the map row it
//! addresses, is passable, and is not occupied by another player. Rejected
//! moves are normal game outcomes and are never reported as errors.
//!
//! ## Architecture Design
//!
//! ### One Lock
//! Grid, player registry and session bookkeeping sit behind a single mutex
//! inside [`state::StateServer`]. Registration, moves and snapshots each hold
//! it for their whole duration, so two players can never be validated into
//! the same cell and snapshots are always consistent.
//!
//! ### Task Per Connection
//! Each accepted TCP connection is served by its own tokio task. Requests
//! from different clients run in parallel and serialize only at the lock.
//!
//! ## Module Organization
//!
//! - `map`: map file loading and the symbol table
//! - `session`: player id allocation, spawning, activity tracking, eviction
//! - `commands`: the move command processor
//! - `state`: the lock-owning state server exposing the remote operations
//! - `network`: TCP listener, framing and request dispatch
//! - `config`, `error`: runtime settings and error types
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::ServerConfig;
//! use server::map::load_map;
//! use server::network::Server;
//! use server::state::StateServer;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::default();
//!     let grid = load_map(&config.map_path)?;
//!
//!     let state = Arc::new(StateServer::new(grid));
//!     let server = Server::bind(&config, state).await?;
//!     server.run().await;
//!
//!     Ok(())
//! }
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod map;
pub mod network;
pub mod session;
pub mod state;
