//! Move command processing.
//!
//! Commands are applied at most once per player: each player carries a
//! sequence watermark, and anything at or below it is dropped. The watermark
//! advances as soon as a command passes that gate, before the move itself is
//! validated, so a blocked move is consumed exactly like a successful one.
//!
//! Validation runs in a fixed order and stops at the first failure:
//! 1. destination inside the grid, checked against the destination row
//! 2. destination cell passable
//! 3. no other player on the destination
//!
//! Rejections are ordinary game outcomes, not errors. The caller only ever
//! observes them through later snapshots.

use log::debug;
use shared::{GameState, MoveCommand, PlayerId};

/// What happened to a single move command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Position changed.
    Moved { x: i32, y: i32 },
    /// Key was not a direction; sequence consumed, position unchanged.
    NullMove,
    /// No such player.
    UnknownPlayer,
    /// Sequence at or below the player's watermark.
    Stale { last_applied: u64 },
    /// Destination outside the grid.
    OutOfBounds,
    /// Destination cell is not passable.
    Blocked,
    /// Another player stands on the destination.
    Occupied { by: PlayerId },
}

impl MoveOutcome {
    pub fn is_moved(&self) -> bool {
        matches!(self, MoveOutcome::Moved { .. })
    }
}

/// Applies `command` to `state`. Must be called with exclusive access to the
/// whole state so the occupancy check sees every committed position.
pub fn apply_move(state: &mut GameState, command: &MoveCommand) -> MoveOutcome {
    let (from_x, from_y) = {
        let Some(player) = state.players.get_mut(&command.player_id) else {
            return MoveOutcome::UnknownPlayer;
        };

        if command.sequence <= player.last_applied_sequence {
            return MoveOutcome::Stale {
                last_applied: player.last_applied_sequence,
            };
        }
        player.last_applied_sequence = command.sequence;

        player.position()
    };

    let Some(direction) = command.direction() else {
        return MoveOutcome::NullMove;
    };
    let (dx, dy) = direction.offset();
    let (to_x, to_y) = (from_x + dx, from_y + dy);

    let outcome = validate_destination(state, command.player_id, to_x, to_y);
    if outcome.is_moved() {
        let standing_on = state.grid.cell(to_x, to_y).copied().unwrap_or_default();
        if let Some(player) = state.players.get_mut(&command.player_id) {
            player.pos_x = to_x;
            player.pos_y = to_y;
            player.standing_on = standing_on;
        }
    }

    outcome
}

fn validate_destination(state: &GameState, mover: PlayerId, x: i32, y: i32) -> MoveOutcome {
    let Some(cell) = state.grid.cell(x, y) else {
        return MoveOutcome::OutOfBounds;
    };
    if !cell.passable {
        return MoveOutcome::Blocked;
    }
    if let Some(by) = state.occupant_at(x, y, mover) {
        return MoveOutcome::Occupied { by };
    }
    MoveOutcome::Moved { x, y }
}

/// Applies a command and logs the outcome. Used by the state server, which
/// never reports rejections back to the caller.
pub fn process_move(state: &mut GameState, command: &MoveCommand) -> MoveOutcome {
    let outcome = apply_move(state, command);
    debug!(
        "Move from player {} (key {:?}, seq {}): {:?}",
        command.player_id, command.key, command.sequence, outcome
    );
    outcome
}
