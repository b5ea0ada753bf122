// Monte Carlo trap detection
//
// Estimates whether following a candidate path leaves us with less room than
// staying where we are. A batch of random cells free in both the current grid
// and a simulated grid (our body having followed the path) is drawn; each one
// is searched for from our head now and from the path's goal afterwards.
// Fewer reachable goals after the move means the move is a trap.

use log::debug;
use rand::Rng;

use crate::config::Config;
use crate::grid::Grid;
use crate::path::Path;
use crate::search::reachable;
use crate::types::Coord;

/// Reachable-goal counts over one sample batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscapeVerdict {
    pub samples: usize,
    pub current_reachable: usize,
    pub candidate_reachable: usize,
}

impl EscapeVerdict {
    /// The candidate reaches fewer sampled goals than the current position
    pub fn is_trap(&self) -> bool {
        self.candidate_reachable < self.current_reachable
    }
}

/// Sampling trap detector with a fixed per-call budget
#[derive(Debug, Clone, Copy)]
pub struct EscapeEvaluator {
    sample_count: usize,
    random_cell_attempts: usize,
}

impl EscapeEvaluator {
    pub fn new(sample_count: usize, random_cell_attempts: usize) -> Self {
        EscapeEvaluator {
            sample_count,
            random_cell_attempts,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.escape.sample_count,
            config.wander.random_cell_attempts,
        )
    }

    /// Judges a candidate path for a snake whose body (head first) is `body`
    pub fn evaluate<R: Rng + ?Sized>(
        &self,
        grid: &Grid,
        body: &[Coord],
        path: &Path,
        rng: &mut R,
    ) -> EscapeVerdict {
        let future = simulate_path(grid, body, path);
        let verdict = self.compare(grid, path.start(), &future, path.goal(), rng);
        debug!(
            "Escape check toward ({}, {}): {}/{} now, {}/{} after",
            path.goal().x,
            path.goal().y,
            verdict.current_reachable,
            verdict.samples,
            verdict.candidate_reachable,
            verdict.samples
        );
        verdict
    }

    /// Compares reachability from `current` on `grid` against `candidate` on
    /// `future`, using goals sampled from `grid`.
    ///
    /// Goals the future grid obstructs (cells our body will cover) are
    /// dropped from the batch so they count against neither side.
    pub fn compare<R: Rng + ?Sized>(
        &self,
        grid: &Grid,
        current: Coord,
        future: &Grid,
        candidate: Coord,
        rng: &mut R,
    ) -> EscapeVerdict {
        let goals: Vec<Coord> = (0..self.sample_count)
            .filter_map(|_| grid.random_free_cell(&mut *rng, self.random_cell_attempts))
            .filter(|g| future.is_free(*g))
            .collect();

        let current_reachable = goals
            .iter()
            .filter(|g| reachable(grid, current, **g))
            .count();
        let candidate_reachable = goals
            .iter()
            .filter(|g| reachable(future, candidate, **g))
            .count();

        EscapeVerdict {
            samples: goals.len(),
            current_reachable,
            candidate_reachable,
        }
    }
}

/// Copy of `grid` as it would look once our snake has followed `path`.
///
/// The body advances one cell per step without growing: path cells the body
/// still covers at the goal become obstructed and tail cells it has left behind
/// are freed. The original grid is untouched.
pub fn simulate_path(grid: &Grid, body: &[Coord], path: &Path) -> Grid {
    let mut future = grid.clone();
    let length = body.len().max(1);

    let mut travelled = path.cells();
    travelled.remove(0);
    travelled.reverse();

    let future_body: Vec<Coord> = travelled
        .into_iter()
        .chain(body.iter().copied())
        .take(length)
        .collect();

    for segment in body {
        future.free(*segment);
    }
    for segment in &future_body {
        future.obstruct(*segment);
    }

    future
}
