//! Shuriken flight and hit resolution.
//!
//! Every player owns at most one shuriken. A shuriken travels one cell per
//! accepted in-turn command in a fixed direction and is consumed by the first
//! player it reaches. Leaving the grid or striking an obstacle just removes it.

use crate::game::{GameState, Position};
use crate::messages::{self, GameMessage};
use log::{debug, info};
use shared::{player_glyph, Direction, MAX_PLAYERS, SHURIKEN_DAMAGE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shuriken {
    pub position: Position,
    pub direction: Direction,
    /// Set on the turn it was thrown so the next tick leaves it in place.
    pub just_spawned: bool,
}

/// Advances every shuriken in flight by one cell, in owner slot order.
pub fn tick_shurikens(state: &mut GameState, outbox: &mut Vec<GameMessage>) {
    for owner in 0..MAX_PLAYERS {
        let Some(mut shuriken) = state.players[owner].shuriken else {
            continue;
        };

        if shuriken.just_spawned {
            shuriken.just_spawned = false;
            state.players[owner].shuriken = Some(shuriken);
            continue;
        }

        let target = shuriken
            .position
            .step(shuriken.direction)
            .filter(|target| !state.is_obstacle(*target));

        match target {
            Some(target) => {
                shuriken.position = target;
                state.players[owner].shuriken = Some(shuriken);
                resolve_collision(state, owner, outbox);
            }
            None => {
                debug!(
                    "Shuriken of Player {} dropped at ({}, {})",
                    player_glyph(owner),
                    shuriken.position.row,
                    shuriken.position.col
                );
                state.players[owner].shuriken = None;
            }
        }
    }
}

/// Throws a shuriken from `owner` towards `direction`.
///
/// The shuriken appears on the neighbouring cell and is checked for a hit
/// immediately, so an adjacent target is struck on the same action. Returns
/// false when the throw is refused because one is already in flight.
pub fn throw_shuriken(
    state: &mut GameState,
    owner: usize,
    direction: Direction,
    outbox: &mut Vec<GameMessage>,
) -> bool {
    let player = &state.players[owner];
    if !player.active || player.shuriken.is_some() {
        return false;
    }

    let target = player
        .position
        .and_then(|position| position.step(direction))
        .filter(|target| !state.is_obstacle(*target));

    let Some(target) = target else {
        debug!(
            "Shuriken of Player {} blocked on release",
            player_glyph(owner)
        );
        return true;
    };

    state.players[owner].shuriken = Some(Shuriken {
        position: target,
        direction,
        just_spawned: true,
    });
    resolve_collision(state, owner, outbox);
    true
}

/// Applies a hit if the owner's shuriken shares a cell with an active player.
pub fn resolve_collision(state: &mut GameState, owner: usize, outbox: &mut Vec<GameMessage>) {
    let Some(shuriken) = state.players[owner].shuriken else {
        return;
    };
    let Some(victim) = state.player_at(shuriken.position) else {
        return;
    };

    state.players[owner].shuriken = None;

    let player = &mut state.players[victim];
    player.hp = player.hp.saturating_sub(SHURIKEN_DAMAGE);
    info!(
        "Player {} hit Player {} ({} hp left)",
        player_glyph(owner),
        player_glyph(victim),
        player.hp
    );

    if player.hp == 0 {
        defeat(state, victim, outbox);
    }
}

fn defeat(state: &mut GameState, victim: usize, outbox: &mut Vec<GameMessage>) {
    info!("Player {} was defeated", player_glyph(victim));

    outbox.push(GameMessage::Send {
        slot: victim,
        text: messages::defeated(),
    });
    outbox.push(GameMessage::Broadcast {
        text: messages::player_defeated(victim),
        exclude: Some(victim),
    });
    state.release_player(victim);
    outbox.push(GameMessage::Close { slot: victim });
}
