// Occupancy grid used for pathfinding
//
// A width x height obstruction map with an optional risk weight per cell.
// Built fresh every turn from the board snapshot and never shared across turns.

use rand::Rng;

use crate::config::Config;
use crate::types::{Battlesnake, Board, Coord, Direction};

/// Obstruction map with per-cell traversal risk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: i32,
    height: i32,
    blocked: Vec<bool>,
    risk: Vec<u32>,
}

impl Grid {
    /// Creates an all-clear grid
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        let len = width as usize * height as usize;
        Grid {
            width,
            height,
            blocked: vec![false; len],
            risk: vec![0; len],
        }
    }

    /// Builds this turn's grid for `you`.
    ///
    /// Every living snake body is obstructed, including our own. Opponents
    /// selected by the head avoidance policy also get their four possible
    /// next head cells obstructed. Hazards carry the configured risk weight.
    pub fn from_board(board: &Board, you: &Battlesnake, config: &Config) -> Self {
        let mut grid = Grid::new(board.width, board.height);
        let our_len = you.body.len();

        for snake in board.snakes.iter().filter(|s| s.is_alive()) {
            for segment in &snake.body {
                grid.obstruct(*segment);
            }

            if snake.id == you.id {
                continue;
            }

            if config
                .policy
                .head_avoidance
                .blocks(snake.body.len(), our_len)
            {
                if let Some(head) = snake.body.first() {
                    for dir in Direction::all().iter() {
                        // Off-board projections are silently dropped by obstruct
                        grid.obstruct(dir.apply(head));
                    }
                }
            }
        }

        for hazard in &board.hazards {
            grid.set_risk(*hazard, config.search.hazard_risk_weight);
        }

        grid
    }

    /// Checks if the grid contains a cell
    pub fn contains(&self, cell: Coord) -> bool {
        cell.x >= 0 && cell.y >= 0 && cell.x < self.width && cell.y < self.height
    }

    /// Dense index of an in-bounds cell, for per-cell bookkeeping arrays
    pub fn index_of(&self, cell: Coord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        Some(cell.y as usize * self.width as usize + cell.x as usize)
    }

    pub fn len(&self) -> usize {
        self.blocked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocked.is_empty()
    }

    /// Obstructs a cell; out-of-bounds cells are ignored
    pub fn obstruct(&mut self, cell: Coord) {
        if let Some(idx) = self.index_of(cell) {
            self.blocked[idx] = true;
        }
    }

    /// Clears an obstruction; out-of-bounds cells are ignored
    pub fn free(&mut self, cell: Coord) {
        if let Some(idx) = self.index_of(cell) {
            self.blocked[idx] = false;
        }
    }

    /// Checks if a cell is obstructed. Off-board cells count as obstructed.
    pub fn obstructed(&self, cell: Coord) -> bool {
        self.index_of(cell).map(|idx| self.blocked[idx]).unwrap_or(true)
    }

    /// In bounds and not obstructed
    pub fn is_free(&self, cell: Coord) -> bool {
        !self.obstructed(cell)
    }

    pub fn set_risk(&mut self, cell: Coord, weight: u32) {
        if let Some(idx) = self.index_of(cell) {
            self.risk[idx] = weight;
        }
    }

    /// Extra cost of stepping onto a cell; 0 when unweighted
    pub fn risk_weight(&self, cell: Coord) -> u32 {
        self.index_of(cell).map(|idx| self.risk[idx]).unwrap_or(0)
    }

    /// In-bounds, unobstructed cardinal neighbours in `Direction::all()` order
    pub fn neighbors(&self, cell: Coord) -> Vec<Coord> {
        Direction::all()
            .iter()
            .map(|dir| dir.apply(&cell))
            .filter(|n| self.is_free(*n))
            .collect()
    }

    pub fn free_count(&self) -> usize {
        self.blocked.iter().filter(|b| !**b).count()
    }

    /// Samples a uniformly random unobstructed cell by rejection sampling.
    /// Returns None when nothing free turns up within `max_attempts` draws.
    pub fn random_free_cell<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        max_attempts: usize,
    ) -> Option<Coord> {
        if self.is_empty() {
            return None;
        }

        for _ in 0..max_attempts {
            let cell = Coord {
                x: rng.random_range(0..self.width),
                y: rng.random_range(0..self.height),
            };
            if self.is_free(cell) {
                return Some(cell);
            }
        }

        None
    }
}
