//! Text snapshot of the visible game state, sent to everyone after each change.

use crate::game::GameState;

pub const STATE_HEADER: &str = "STATE\n";
pub const PLAYER_INFO_HEADER: &str = "ACTIVE PLAYER INFO (IF EXISTS)\n";

/// Builds the full snapshot: header, grid rows, then one block per active player.
pub fn build_state_string(state: &GameState) -> String {
    let mut buffer = String::from(STATE_HEADER);

    for row in state.render_grid() {
        buffer.extend(row.iter());
        buffer.push('\n');
    }

    buffer.push_str(PLAYER_INFO_HEADER);
    for player in state.active_players() {
        let Some(position) = player.position else {
            continue;
        };
        buffer.push_str(&format!("Player {}\n", player.slot));
        buffer.push_str(&format!(
            "Player position: ({}, {})\n",
            position.row, position.col
        ));
        buffer.push_str(&format!("Player health points {}\n", player.hp));
    }

    buffer
}
