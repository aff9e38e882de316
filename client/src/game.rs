use shared::{Cell, GameState, PlayerId};

pub const WAITING_MESSAGE: &str = "Waiting for map...";

/// What the client knows about the world: the latest snapshot and who we are.
#[derive(Debug, Clone)]
pub struct ClientView {
    pub player_id: PlayerId,
    pub state: GameState,
    /// Set once polling fails; the client stops after showing it
    pub connection_lost: Option<String>,
}

impl ClientView {
    pub fn new(player_id: PlayerId, state: GameState) -> Self {
        Self {
            player_id,
            state,
            connection_lost: None,
        }
    }

    pub fn apply_snapshot(&mut self, state: GameState) {
        self.state = state;
    }

    pub fn mark_connection_lost(&mut self, reason: String) {
        self.connection_lost = Some(reason);
    }

    pub fn own_position(&self) -> Option<(i32, i32)> {
        self.state.player(self.player_id).map(|p| p.position())
    }

    /// The grid with every player's marker drawn over the cell they stand on.
    /// Players outside the grid are not drawn. Empty when there is no map yet.
    pub fn compose_frame(&self) -> Vec<Vec<Cell>> {
        let mut frame: Vec<Vec<Cell>> = self.state.grid.rows().to_vec();

        for player in self.state.players.values() {
            if player.pos_x < 0 || player.pos_y < 0 {
                continue;
            }
            if let Some(cell) = frame
                .get_mut(player.pos_y as usize)
                .and_then(|row| row.get_mut(player.pos_x as usize))
            {
                *cell = player.symbol;
            }
        }

        frame
    }

    /// The frame as plain text, one string per row.
    pub fn frame_text(&self) -> Vec<String> {
        if self.state.grid.is_empty() {
            return vec![WAITING_MESSAGE.to_string()];
        }
        self.compose_frame()
            .iter()
            .map(|row| row.iter().map(|cell| cell.symbol).collect())
            .collect()
    }

    pub fn status_line(&self) -> String {
        format!(
            "You are player {} | {} players online | WASD/arrows to move, Q to quit",
            self.player_id,
            self.state.player_count()
        )
    }
}
