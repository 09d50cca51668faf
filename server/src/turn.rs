//! Turn ownership and rotation.

use crate::game::GameState;
use crate::messages::{self, GameMessage};
use shared::MAX_PLAYERS;

impl GameState {
    pub fn holds_turn(&self, slot: usize) -> bool {
        self.current_turn == slot
    }

    /// Passes the turn to the next active, living slot after the current one.
    ///
    /// With nobody else eligible the pointer stays put, unless its own slot
    /// has gone inactive, in which case it falls back to slot 0.
    pub fn rotate_turn(&mut self) {
        let next = (1..MAX_PLAYERS)
            .map(|offset| (self.current_turn + offset) % MAX_PLAYERS)
            .find(|&slot| self.players[slot].active && self.players[slot].hp > 0);

        match next {
            Some(slot) => self.current_turn = slot,
            None if !self.players[self.current_turn].active => self.current_turn = 0,
            None => {}
        }
    }
}

/// Tells the turn holder it may act and everybody else whom they wait for.
pub fn announce_turn(state: &GameState, outbox: &mut Vec<GameMessage>) {
    let holder = state.current_turn;
    if !state.players[holder].active {
        return;
    }

    outbox.push(GameMessage::Send {
        slot: holder,
        text: messages::your_turn(),
    });
    outbox.push(GameMessage::Broadcast {
        text: messages::players_turn(holder),
        exclude: Some(holder),
    });
}
