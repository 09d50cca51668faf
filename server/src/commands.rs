//! Command processing: one call is one complete game step.
//!
//! Every function here runs with the session lock held and returns the
//! messages the step produced, in delivery order.

use crate::game::GameState;
use crate::messages::{self, GameMessage};
use crate::shuriken::{throw_shuriken, tick_shurikens};
use crate::snapshot::build_state_string;
use crate::turn::announce_turn;
use log::{debug, info};
use shared::{player_glyph, Command};

/// How a participant left the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Departure {
    Quit,
    Disconnect,
}

/// Seats a new participant in `slot` and greets them.
pub fn handle_join(state: &mut GameState, slot: usize) -> Vec<GameMessage> {
    state.activate_player(slot);

    // Nobody holds a live turn (everyone left earlier): the newcomer gets it.
    if !state.players[state.current_turn].active {
        state.current_turn = slot;
    }

    let turn_notice = if state.holds_turn(slot) {
        messages::your_turn()
    } else {
        messages::players_turn(state.current_turn)
    };

    vec![
        GameMessage::Send {
            slot,
            text: messages::welcome(slot),
        },
        snapshot(state),
        GameMessage::Send {
            slot,
            text: turn_notice,
        },
    ]
}

/// Runs one line of input from `slot` through the game.
///
/// Unrecognized input is dropped silently. Input from a slot that does not
/// hold the turn only earns that slot a reminder. Otherwise shurikens advance,
/// the command is applied, the new state is broadcast and the turn passes on.
pub fn process_command(state: &mut GameState, slot: usize, text: &str) -> Vec<GameMessage> {
    let mut outbox = Vec::new();

    let Some(command) = Command::parse(text) else {
        debug!(
            "Ignoring unrecognized input {:?} from Player {}",
            text,
            player_glyph(slot)
        );
        return outbox;
    };

    if !state.holds_turn(slot) {
        info!(
            "Player {} tried {} out of turn",
            player_glyph(slot),
            command
        );
        outbox.push(GameMessage::Send {
            slot,
            text: messages::not_your_turn(state.current_turn),
        });
        return outbox;
    }

    debug!("Player {} issued {}", player_glyph(slot), command);
    tick_shurikens(state, &mut outbox);

    // A shuriken may have taken the actor out during the tick.
    let actor_alive = state.players[slot].active;
    match command {
        Command::Quit if actor_alive => {
            depart(state, slot, Departure::Quit, &mut outbox);
            return outbox;
        }
        Command::Quit => {}
        Command::Move(direction) => {
            state.move_player(slot, direction);
        }
        Command::Attack(direction) => {
            if !throw_shuriken(state, slot, direction, &mut outbox) {
                debug!(
                    "Player {} already has a shuriken in flight",
                    player_glyph(slot)
                );
            }
        }
    }

    outbox.push(snapshot(state));
    state.rotate_turn();
    announce_turn(state, &mut outbox);
    outbox
}

/// Cleans up after a connection that went away without saying QUIT.
pub fn handle_disconnect(state: &mut GameState, slot: usize) -> Vec<GameMessage> {
    let mut outbox = Vec::new();
    if state.players[slot].active {
        depart(state, slot, Departure::Disconnect, &mut outbox);
    }
    outbox
}

fn depart(state: &mut GameState, slot: usize, departure: Departure, outbox: &mut Vec<GameMessage>) {
    info!("Player {} left the game ({:?})", player_glyph(slot), departure);

    match departure {
        Departure::Quit => {
            outbox.push(GameMessage::Send {
                slot,
                text: messages::you_quit(),
            });
            outbox.push(GameMessage::Broadcast {
                text: messages::player_quit(slot),
                exclude: Some(slot),
            });
        }
        Departure::Disconnect => {
            outbox.push(GameMessage::Broadcast {
                text: messages::player_disconnected(slot),
                exclude: Some(slot),
            });
        }
    }

    let held_turn = state.holds_turn(slot);
    state.release_player(slot);
    outbox.push(GameMessage::Close { slot });
    outbox.push(snapshot(state));

    if held_turn {
        state.rotate_turn();
        announce_turn(state, outbox);
    }
}

fn snapshot(state: &GameState) -> GameMessage {
    GameMessage::Broadcast {
        text: build_state_string(state),
        exclude: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Position;
    use crate::shuriken::Shuriken;
    use shared::{Direction, MAX_PLAYERS, SHURIKEN_DAMAGE, STARTING_HP};

    fn seated(count: usize) -> GameState {
        let mut state = GameState::new();
        for slot in 0..count {
            handle_join(&mut state, slot);
        }
        state
    }

    fn broadcasts(outbox: &[GameMessage]) -> Vec<&str> {
        outbox
            .iter()
            .filter_map(|message| match message {
                GameMessage::Broadcast {
                    text,
                    exclude: None,
                } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_first_join_gets_turn() {
        let mut state = GameState::new();
        let outbox = handle_join(&mut state, 0);

        assert!(state.started);
        assert_eq!(state.current_turn, 0);
        assert_eq!(outbox.len(), 3);
        assert_eq!(
            outbox[2],
            GameMessage::Send {
                slot: 0,
                text: messages::your_turn()
            }
        );
    }

    #[test]
    fn test_later_join_is_told_who_plays() {
        let mut state = seated(1);
        let outbox = handle_join(&mut state, 1);

        assert_eq!(state.current_turn, 0);
        assert_eq!(
            outbox[2],
            GameMessage::Send {
                slot: 1,
                text: messages::players_turn(0)
            }
        );
    }

    #[test]
    fn test_rejoin_after_everyone_left_gets_turn() {
        let mut state = seated(2);
        process_command(&mut state, 0, "QUIT");
        process_command(&mut state, 1, "QUIT");
        assert_eq!(state.active_count, 0);

        handle_join(&mut state, 0);
        assert_eq!(state.current_turn, 0);
        handle_join(&mut state, 1);
        assert_eq!(state.current_turn, 0);
    }

    #[test]
    fn test_unknown_command_changes_nothing() {
        let mut state = seated(2);
        let before = state.clone();

        let outbox = process_command(&mut state, 0, "DANCE");

        assert!(outbox.is_empty());
        assert_eq!(state.current_turn, before.current_turn);
        assert_eq!(state.players, before.players);
    }

    #[test]
    fn test_out_of_turn_is_rejected_without_side_effects() {
        let mut state = seated(2);
        process_command(&mut state, 0, "ATTACK RIGHT");
        process_command(&mut state, 1, "MOVE RIGHT");
        let before = state.clone();
        assert_eq!(state.current_turn, 0);

        let outbox = process_command(&mut state, 1, "MOVE DOWN");

        assert_eq!(
            outbox,
            vec![GameMessage::Send {
                slot: 1,
                text: messages::not_your_turn(0)
            }]
        );
        assert_eq!(state.players, before.players);
        assert_eq!(state.current_turn, 0);
    }

    #[test]
    fn test_accepted_command_broadcasts_then_rotates() {
        let mut state = seated(3);

        let outbox = process_command(&mut state, 0, "MOVE RIGHT");

        assert_eq!(state.players[0].position, Some(Position::new(0, 1)));
        assert_eq!(state.current_turn, 1);
        let snapshots = broadcasts(&outbox);
        assert_eq!(snapshots.len(), 1);
        assert!(snapshots[0].starts_with("STATE\n.A...\n"));
        assert_eq!(
            outbox.last(),
            Some(&GameMessage::Broadcast {
                text: messages::players_turn(1),
                exclude: Some(1)
            })
        );
    }

    #[test]
    fn test_blocked_move_still_uses_turn() {
        let mut state = seated(2);

        process_command(&mut state, 0, "MOVE UP");

        assert_eq!(state.players[0].position, Some(Position::new(0, 0)));
        assert_eq!(state.current_turn, 1);
    }

    #[test]
    fn test_turn_sequence_follows_active_slots() {
        let mut state = seated(MAX_PLAYERS);
        for expected_next in [1, 2, 3, 0, 1] {
            let actor = state.current_turn;
            process_command(&mut state, actor, "MOVE RIGHT");
            assert_eq!(state.current_turn, expected_next);
        }
    }

    #[test]
    fn test_attack_adjacent_scenario() {
        let mut state = seated(2);
        state.players[1].position = Some(Position::new(0, 1));

        process_command(&mut state, 0, "ATTACK RIGHT");

        assert_eq!(state.players[1].hp, STARTING_HP - SHURIKEN_DAMAGE);
        assert!(state.players[1].active);
        assert_eq!(state.players[0].shuriken, None);
        assert_eq!(state.current_turn, 1);
    }

    #[test]
    fn test_second_hit_defeats_and_rotation_skips_victim() {
        let mut state = seated(3);
        state.players[1].position = Some(Position::new(0, 1));
        state.players[1].hp = 50;

        let outbox = process_command(&mut state, 0, "ATTACK RIGHT");

        assert!(!state.players[1].active);
        assert_eq!(state.active_count, 2);
        assert!(outbox.contains(&GameMessage::Close { slot: 1 }));
        assert_eq!(state.current_turn, 2);

        process_command(&mut state, 2, "MOVE RIGHT");
        assert_eq!(state.current_turn, 0);
        process_command(&mut state, 0, "MOVE RIGHT");
        assert_eq!(state.current_turn, 2);
    }

    #[test]
    fn test_attack_with_shuriken_in_flight_spawns_nothing() {
        let mut state = seated(1);

        process_command(&mut state, 0, "ATTACK DOWN");
        // first tick after the throw only clears the spawn flag
        process_command(&mut state, 0, "ATTACK RIGHT");

        let shuriken = state.players[0].shuriken.unwrap();
        assert_eq!(shuriken.direction, Direction::Down);
        assert_eq!(shuriken.position, Position::new(1, 0));
    }

    #[test]
    fn test_projectile_advances_once_per_accepted_command() {
        let mut state = seated(2);
        state.players[1].position = Some(Position::new(4, 4));

        process_command(&mut state, 0, "ATTACK RIGHT");
        assert_eq!(
            state.players[0].shuriken.unwrap().position,
            Position::new(0, 1)
        );

        process_command(&mut state, 1, "NOT A COMMAND");
        assert!(state.players[0].shuriken.unwrap().just_spawned);

        process_command(&mut state, 1, "MOVE LEFT");
        let shuriken = state.players[0].shuriken.unwrap();
        assert_eq!(shuriken.position, Position::new(0, 1));
        assert!(!shuriken.just_spawned);

        process_command(&mut state, 0, "MOVE DOWN");
        assert_eq!(
            state.players[0].shuriken.unwrap().position,
            Position::new(0, 2)
        );
    }

    #[test]
    fn test_quit_by_last_player_holding_turn() {
        let mut state = seated(2);
        process_command(&mut state, 0, "QUIT");
        assert_eq!(state.current_turn, 1);

        let outbox = process_command(&mut state, 1, "QUIT");

        assert_eq!(state.current_turn, 0);
        assert_eq!(state.active_count, 0);
        assert_eq!(
            outbox[0],
            GameMessage::Send {
                slot: 1,
                text: messages::you_quit()
            }
        );
        assert!(outbox.contains(&GameMessage::Close { slot: 1 }));
        let snapshots = broadcasts(&outbox);
        assert_eq!(snapshots.len(), 1);
        assert!(snapshots[0].ends_with("ACTIVE PLAYER INFO (IF EXISTS)\n"));
    }

    /// Slot 0 at 50 hp with slot 1's shuriken about to land on it.
    fn actor_in_line_of_fire() -> GameState {
        let mut state = seated(2);
        state.players[0].hp = SHURIKEN_DAMAGE;
        state.players[1].shuriken = Some(Shuriken {
            position: Position::new(0, 1),
            direction: Direction::Left,
            just_spawned: false,
        });
        state
    }

    #[test]
    fn test_quit_after_defeat_in_own_tick() {
        let mut state = actor_in_line_of_fire();

        let outbox = process_command(&mut state, 0, "QUIT");

        assert_eq!(
            outbox[0],
            GameMessage::Send {
                slot: 0,
                text: messages::defeated()
            }
        );
        assert!(!outbox.contains(&GameMessage::Send {
            slot: 0,
            text: messages::you_quit()
        }));
        assert!(!broadcasts(&outbox).is_empty());
        assert!(!state.players[0].active);
        assert_eq!(state.active_count, 1);
        assert_eq!(state.current_turn, 1);
        assert!(state.players[1].shuriken.is_none());
    }

    #[test]
    fn test_move_after_defeat_in_own_tick() {
        let mut state = actor_in_line_of_fire();

        let outbox = process_command(&mut state, 0, "MOVE DOWN");

        assert!(outbox.contains(&GameMessage::Close { slot: 0 }));
        assert_eq!(state.players[0].position, None);
        assert_eq!(state.active_count, 1);
        assert_eq!(state.current_turn, 1);
        assert!(outbox.contains(&GameMessage::Send {
            slot: 1,
            text: messages::your_turn()
        }));
    }

    #[test]
    fn test_quit_is_still_turn_checked() {
        let mut state = seated(2);

        let outbox = process_command(&mut state, 1, "QUIT");

        assert!(state.players[1].active);
        assert_eq!(outbox.len(), 1);
    }

    #[test]
    fn test_disconnect_of_non_holder_keeps_turn() {
        let mut state = seated(3);

        let outbox = handle_disconnect(&mut state, 2);

        assert_eq!(state.current_turn, 0);
        assert_eq!(state.active_count, 2);
        assert_eq!(
            outbox[0],
            GameMessage::Broadcast {
                text: messages::player_disconnected(2),
                exclude: Some(2)
            }
        );
        assert!(!outbox
            .iter()
            .any(|m| matches!(m, GameMessage::Send { slot: 2, .. })));
    }

    #[test]
    fn test_disconnect_of_holder_rotates() {
        let mut state = seated(3);

        handle_disconnect(&mut state, 0);

        assert_eq!(state.current_turn, 1);
    }

    #[test]
    fn test_disconnect_of_free_slot_is_noop() {
        let mut state = seated(1);
        assert!(handle_disconnect(&mut state, 3).is_empty());
        assert_eq!(state.active_count, 1);
    }

    #[test]
    fn test_active_count_matches_active_players() {
        let mut state = seated(MAX_PLAYERS);
        state.players[1].position = Some(Position::new(0, 1));
        state.players[1].hp = 50;
        process_command(&mut state, 0, "ATTACK RIGHT");
        handle_disconnect(&mut state, 3);
        let actor = state.current_turn;
        process_command(&mut state, actor, "QUIT");

        assert_eq!(state.active_count, state.active_players().count());
        assert!(state.active_players().all(|p| p.hp > 0));
    }
}
