//! Command grammar and arena constants shared by the server and the terminal client.

use std::fmt;

pub const GRID_ROWS: usize = 5;
pub const GRID_COLS: usize = 5;
pub const MAX_PLAYERS: usize = 4;
pub const STARTING_HP: u32 = 100;
pub const SHURIKEN_DAMAGE: u32 = 50;

/// Obstacle cells as (row, col). Placed once when the arena is created.
pub const OBSTACLES: [(usize, usize); 2] = [(2, 2), (1, 3)];

pub const EMPTY_GLYPH: char = '.';
pub const OBSTACLE_GLYPH: char = '#';
pub const SHURIKEN_GLYPH: char = '*';

/// Returns the glyph used for a slot on the grid and in advisories ('A', 'B', ...).
pub fn player_glyph(slot: usize) -> char {
    debug_assert!(slot < MAX_PLAYERS);
    (b'A' + slot as u8) as char
}

/// A cardinal direction on the grid. Rows grow downwards, columns to the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Keywords in the order they are searched for inside a command.
    const KEYWORDS: [(&'static str, Direction); 4] = [
        ("UP", Direction::Up),
        ("DOWN", Direction::Down),
        ("LEFT", Direction::Left),
        ("RIGHT", Direction::Right),
    ];

    /// Finds the first direction keyword contained anywhere in `text`.
    ///
    /// Matching is by substring, so `"MOVE UPWARDS"` resolves to `Up`.
    pub fn find_in(text: &str) -> Option<Direction> {
        Self::KEYWORDS
            .iter()
            .find(|(keyword, _)| text.contains(keyword))
            .map(|(_, direction)| *direction)
    }

    /// Unit step as (row delta, col delta).
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Up => "UP",
            Direction::Down => "DOWN",
            Direction::Left => "LEFT",
            Direction::Right => "RIGHT",
        };
        f.write_str(name)
    }
}

/// A recognized client command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    Attack(Direction),
    Quit,
}

impl Command {
    /// Parses one line of client input.
    ///
    /// The verb must open the line and is case-sensitive. Returns `None` for
    /// anything unrecognized, including a verb without a direction.
    pub fn parse(text: &str) -> Option<Command> {
        if text.starts_with("MOVE") {
            Direction::find_in(text).map(Command::Move)
        } else if text.starts_with("ATTACK") {
            Direction::find_in(text).map(Command::Attack)
        } else if text.starts_with("QUIT") {
            Some(Command::Quit)
        } else {
            None
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Move(direction) => write!(f, "MOVE {}", direction),
            Command::Attack(direction) => write!(f, "ATTACK {}", direction),
            Command::Quit => f.write_str("QUIT"),
        }
    }
}
