// Battlesnake API Types
// See https://docs.battlesnake.com/api

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Game metadata including ID, ruleset, and timeout
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Game {
    pub id: String,
    #[serde(default)]
    pub ruleset: HashMap<String, Value>,
    #[serde(default)]
    pub timeout: u32,
}

/// Board state including dimensions, food, snakes, and hazards
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Board {
    pub height: i32,
    pub width: i32,
    pub food: Vec<Coord>,
    pub snakes: Vec<Battlesnake>,
    #[serde(default)]
    pub hazards: Vec<Coord>,
}

/// Largest accepted board side; official boards top out at 25
pub const MAX_BOARD_SIDE: i32 = 255;

impl Board {
    /// Checks the invariants the pathfinding core relies on.
    ///
    /// Dimensions must be positive and at most `MAX_BOARD_SIDE`, every snake
    /// must have a body, and every body, food and hazard coordinate must lie
    /// on the board.
    pub fn validate(&self) -> Result<(), String> {
        if self.width <= 0 || self.height <= 0 {
            return Err(format!(
                "Invalid board dimensions {}x{}",
                self.width, self.height
            ));
        }
        if self.width > MAX_BOARD_SIDE || self.height > MAX_BOARD_SIDE {
            return Err(format!(
                "Board {}x{} exceeds the {}x{} limit",
                self.width, self.height, MAX_BOARD_SIDE, MAX_BOARD_SIDE
            ));
        }

        for snake in &self.snakes {
            if snake.body.is_empty() {
                return Err(format!("Snake '{}' has an empty body", snake.id));
            }
            if let Some(c) = snake.body.iter().find(|c| !self.in_bounds(c)) {
                return Err(format!(
                    "Snake '{}' has a segment off the board at ({}, {})",
                    snake.id, c.x, c.y
                ));
            }
        }

        if let Some(c) = self.food.iter().find(|c| !self.in_bounds(c)) {
            return Err(format!("Food off the board at ({}, {})", c.x, c.y));
        }
        if let Some(c) = self.hazards.iter().find(|c| !self.in_bounds(c)) {
            return Err(format!("Hazard off the board at ({}, {})", c.x, c.y));
        }

        Ok(())
    }

    /// Looks up a snake by id
    pub fn snake(&self, id: &str) -> Option<&Battlesnake> {
        self.snakes.iter().find(|s| s.id == id)
    }

    fn in_bounds(&self, coord: &Coord) -> bool {
        coord.x >= 0 && coord.y >= 0 && coord.x < self.width && coord.y < self.height
    }
}

/// Snake representation with all state information
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Battlesnake {
    pub id: String,
    pub name: String,
    pub health: i32,
    pub body: Vec<Coord>,
    pub head: Coord,
    pub length: i32,
    #[serde(default)]
    pub latency: String,
    #[serde(default)]
    pub shout: String,
}

impl Battlesnake {
    /// Builds a snake from its body, deriving head and length
    pub fn new(id: &str, health: i32, body: Vec<Coord>) -> Self {
        let head = body.first().copied().unwrap_or(Coord { x: 0, y: 0 });
        Battlesnake {
            id: id.to_string(),
            name: id.to_string(),
            health,
            length: body.len() as i32,
            body,
            head,
            latency: "0".to_string(),
            shout: String::new(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// The tail segment, if it will vacate next turn.
    /// A stacked tail (last two segments equal) means the snake just ate and
    /// the tail stays put.
    pub fn vacating_tail(&self) -> Option<Coord> {
        let n = self.body.len();
        if n < 2 || self.body[n - 1] == self.body[n - 2] {
            return None;
        }
        Some(self.body[n - 1])
    }
}

/// 2D coordinate on the board
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub fn new(x: i32, y: i32) -> Self {
        Coord { x, y }
    }

    /// Calculates Manhattan distance between two coordinates
    pub fn manhattan(&self, other: &Coord) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

/// Represents the four possible movement directions for a Battlesnake
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// Returns all possible directions.
    /// This order drives neighbour expansion and failsafe scanning, so it must not change.
    pub fn all() -> [Direction; 4] {
        [Direction::Left, Direction::Right, Direction::Up, Direction::Down]
    }

    /// Converts direction to string representation for API response
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }

    /// Unit offset of this direction; y grows downwards
    pub fn offset(&self) -> (i32, i32) {
        match self {
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
        }
    }

    /// Maps a unit offset back to its direction
    pub fn from_offset(offset: (i32, i32)) -> Option<Direction> {
        Direction::all().iter().copied().find(|d| d.offset() == offset)
    }

    /// Calculates the next coordinate when moving in this direction
    pub fn apply(&self, coord: &Coord) -> Coord {
        let (dx, dy) = self.offset();
        Coord {
            x: coord.x + dx,
            y: coord.y + dy,
        }
    }

    pub fn parse(s: &str) -> Result<Direction, String> {
        match s.trim().to_lowercase().as_str() {
            "left" => Ok(Direction::Left),
            "right" => Ok(Direction::Right),
            "up" => Ok(Direction::Up),
            "down" => Ok(Direction::Down),
            other => Err(format!("Invalid direction '{}'", other)),
        }
    }
}

/// Complete game state received from the API
#[derive(Deserialize, Serialize, Debug)]
pub struct GameState {
    pub game: Game,
    pub turn: i32,
    pub board: Board,
    pub you: Battlesnake,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(snakes: Vec<Battlesnake>, food: Vec<Coord>) -> Board {
        Board {
            height: 5,
            width: 5,
            food,
            snakes,
            hazards: vec![],
        }
    }

    #[test]
    fn test_direction_offsets_round_trip_through_table() {
        for dir in Direction::all().iter() {
            assert_eq!(Direction::from_offset(dir.offset()), Some(*dir));
        }
        assert_eq!(Direction::from_offset((1, 1)), None);
        assert_eq!(Direction::Up.apply(&Coord::new(2, 2)), Coord::new(2, 1));
    }

    #[test]
    fn test_direction_serializes_lowercase() {
        let json = serde_json::to_string(&Direction::Down).unwrap();
        assert_eq!(json, "\"down\"");
        assert_eq!(Direction::parse("LEFT"), Ok(Direction::Left));
        assert!(Direction::parse("north").is_err());
    }

    #[test]
    fn test_validate_accepts_well_formed_board() {
        let board = board_with(
            vec![Battlesnake::new("me", 90, vec![Coord::new(0, 0), Coord::new(0, 1)])],
            vec![Coord::new(4, 4)],
        );
        assert!(board.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_bounds_segment() {
        let board = board_with(
            vec![Battlesnake::new("me", 90, vec![Coord::new(0, 0), Coord::new(-1, 0)])],
            vec![],
        );
        assert!(board.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_body_and_bad_dimensions() {
        let board = board_with(vec![Battlesnake::new("me", 90, vec![])], vec![]);
        assert!(board.validate().is_err());

        let mut board = board_with(vec![], vec![]);
        board.width = 0;
        assert!(board.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_board() {
        let mut board = board_with(vec![], vec![]);
        board.width = MAX_BOARD_SIDE + 1;
        assert!(board.validate().is_err());

        board.width = i32::MAX;
        board.height = i32::MAX;
        assert!(board.validate().is_err());

        board.width = MAX_BOARD_SIDE;
        board.height = MAX_BOARD_SIDE;
        assert!(board.validate().is_ok());
    }

    #[test]
    fn test_stacked_tail_does_not_vacate() {
        let fed = Battlesnake::new(
            "me",
            100,
            vec![Coord::new(1, 1), Coord::new(1, 2), Coord::new(1, 2)],
        );
        assert_eq!(fed.vacating_tail(), None);

        let moving = Battlesnake::new(
            "me",
            100,
            vec![Coord::new(1, 1), Coord::new(1, 2), Coord::new(1, 3)],
        );
        assert_eq!(moving.vacating_tail(), Some(Coord::new(1, 3)));
    }
}
