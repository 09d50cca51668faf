//! Canonical arena state: the obstacle grid and the fixed table of player slots.

use crate::shuriken::Shuriken;
use log::info;
use shared::{
    player_glyph, Direction, EMPTY_GLYPH, GRID_COLS, GRID_ROWS, MAX_PLAYERS, OBSTACLES,
    OBSTACLE_GLYPH, SHURIKEN_GLYPH, STARTING_HP,
};

/// A cell coordinate. Row 0 is the top of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Returns the neighbouring cell in `direction`, or `None` past the grid edge.
    pub fn step(self, direction: Direction) -> Option<Position> {
        let (d_row, d_col) = direction.delta();
        let row = self.row.checked_add_signed(d_row)?;
        let col = self.col.checked_add_signed(d_col)?;

        if row < GRID_ROWS && col < GRID_COLS {
            Some(Position { row, col })
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Obstacle,
}

/// One participant slot.
///
/// A free slot holds the defaults: no position, full health, inactive and
/// without a shuriken in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub slot: usize,
    pub position: Option<Position>,
    pub hp: u32,
    pub active: bool,
    pub shuriken: Option<Shuriken>,
}

impl Player {
    pub fn new(slot: usize) -> Self {
        Self {
            slot,
            position: None,
            hp: STARTING_HP,
            active: false,
            shuriken: None,
        }
    }

    pub fn glyph(&self) -> char {
        player_glyph(self.slot)
    }
}

/// Authoritative game state. Only ever mutated while the session lock is held.
#[derive(Debug, Clone)]
pub struct GameState {
    pub grid: [[Cell; GRID_COLS]; GRID_ROWS],
    pub players: [Player; MAX_PLAYERS],
    pub current_turn: usize,
    pub started: bool,
    pub active_count: usize,
}

impl GameState {
    pub fn new() -> Self {
        let mut grid = [[Cell::Empty; GRID_COLS]; GRID_ROWS];
        for (row, col) in OBSTACLES {
            grid[row][col] = Cell::Obstacle;
        }

        Self {
            grid,
            players: std::array::from_fn(Player::new),
            current_turn: 0,
            started: false,
            active_count: 0,
        }
    }

    pub fn is_obstacle(&self, position: Position) -> bool {
        self.grid[position.row][position.col] == Cell::Obstacle
    }

    pub fn is_full(&self) -> bool {
        self.active_count >= MAX_PLAYERS
    }

    /// Lowest-numbered slot not currently claimed, if any.
    pub fn free_slot(&self) -> Option<usize> {
        if self.is_full() {
            return None;
        }
        self.players.iter().position(|player| !player.active)
    }

    /// Claims `slot` for a new participant at its spawn cell.
    ///
    /// The very first participant the process ever sees starts the game and
    /// is handed the turn.
    pub fn activate_player(&mut self, slot: usize) {
        let spawn = Position::new(slot % GRID_ROWS, 0);
        let player = &mut self.players[slot];
        if player.active {
            return;
        }

        *player = Player::new(slot);
        player.position = Some(spawn);
        player.active = true;
        self.active_count += 1;

        if !self.started {
            self.started = true;
            self.current_turn = slot;
        }

        info!(
            "Player {} joined at ({}, {}), {} active",
            player_glyph(slot),
            spawn.row,
            spawn.col,
            self.active_count
        );
    }

    /// Resets `slot` to its defaults and returns it to the free pool.
    pub fn release_player(&mut self, slot: usize) {
        if self.players[slot].active {
            self.active_count -= 1;
        }
        self.players[slot] = Player::new(slot);
    }

    /// Steps a player one cell. Edges and obstacles make this a silent no-op.
    ///
    /// Returns whether the player actually moved.
    pub fn move_player(&mut self, slot: usize, direction: Direction) -> bool {
        let player = &self.players[slot];
        if !player.active {
            return false;
        }

        let target = player
            .position
            .and_then(|position| position.step(direction))
            .filter(|target| !self.is_obstacle(*target));

        match target {
            Some(target) => {
                self.players[slot].position = Some(target);
                true
            }
            None => false,
        }
    }

    /// First active player, in slot order, standing on `position`.
    pub fn player_at(&self, position: Position) -> Option<usize> {
        self.players
            .iter()
            .find(|player| player.active && player.position == Some(position))
            .map(|player| player.slot)
    }

    pub fn active_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|player| player.active)
    }

    /// Renders the visible grid: obstacles, then shurikens, then players on top.
    pub fn render_grid(&self) -> [[char; GRID_COLS]; GRID_ROWS] {
        let mut rows = [[EMPTY_GLYPH; GRID_COLS]; GRID_ROWS];
        for (row, cells) in self.grid.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                if *cell == Cell::Obstacle {
                    rows[row][col] = OBSTACLE_GLYPH;
                }
            }
        }

        let mut overlay = |position: Position, glyph: char| {
            if self.grid[position.row][position.col] != Cell::Obstacle {
                rows[position.row][position.col] = glyph;
            }
        };

        for player in self.active_players() {
            if let Some(shuriken) = player.shuriken {
                overlay(shuriken.position, SHURIKEN_GLYPH);
            }
        }
        for player in self.active_players() {
            if let Some(position) = player.position {
                overlay(position, player.glyph());
            }
        }

        rows
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
