//! Outgoing traffic produced by the game logic, and the advisory texts.
//!
//! The game logic never touches sockets. It queues `GameMessage`s in order and
//! the connection table delivers them while the session lock is still held.

use shared::player_glyph;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameMessage {
    /// Text for one slot only.
    Send { slot: usize, text: String },
    /// Text for every connected slot, optionally skipping one.
    Broadcast { text: String, exclude: Option<usize> },
    /// Shut the slot's connection and stop its worker.
    Close { slot: usize },
}

pub const SERVER_FULL: &str = "Server full. Please try again later.\n";

pub fn welcome(slot: usize) -> String {
    format!("Welcome! You are Player {} (slot {}).\n", player_glyph(slot), slot)
}

pub fn your_turn() -> String {
    "It is your turn.\n".to_string()
}

pub fn players_turn(slot: usize) -> String {
    format!("It is Player {}'s turn.\n", player_glyph(slot))
}

pub fn not_your_turn(holder: usize) -> String {
    format!(
        "It is not your turn. Waiting for Player {}.\n",
        player_glyph(holder)
    )
}

pub fn you_quit() -> String {
    "You have quit the game.\n".to_string()
}

pub fn player_quit(slot: usize) -> String {
    format!("Player {} has quit.\n", player_glyph(slot))
}

pub fn player_disconnected(slot: usize) -> String {
    format!("Player {} disconnected.\n", player_glyph(slot))
}

pub fn defeated() -> String {
    "You have been defeated!\n".to_string()
}

pub fn player_defeated(slot: usize) -> String {
    format!("Player {} was defeated.\n", player_glyph(slot))
}
