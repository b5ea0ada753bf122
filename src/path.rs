// Forward path produced by the search
//
// The search records a predecessor per visited cell. Reconstruction walks that
// chain backwards once and stores the forward links, so callers can step from
// the start toward the goal.

use std::collections::HashMap;

use crate::types::{Coord, Direction};

/// Route from `start` to `goal` as forward links
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    start: Coord,
    goal: Coord,
    next: HashMap<Coord, Coord>,
    steps: usize,
}

impl Path {
    /// Rebuilds the forward route from a predecessor lookup.
    ///
    /// `came_from` must yield the predecessor of every cell on the route from
    /// `goal` back to `start`, and `None` at `start`.
    pub fn from_predecessors<F>(start: Coord, goal: Coord, came_from: F) -> Self
    where
        F: Fn(Coord) -> Option<Coord>,
    {
        let mut next = HashMap::new();
        let mut current = goal;
        while current != start {
            match came_from(current) {
                Some(prev) => {
                    next.insert(prev, current);
                    current = prev;
                }
                None => break,
            }
        }

        Path {
            start: current,
            goal,
            steps: next.len(),
            next,
        }
    }

    pub fn start(&self) -> Coord {
        self.start
    }

    pub fn goal(&self) -> Coord {
        self.goal
    }

    /// Number of moves from start to goal
    pub fn len(&self) -> usize {
        self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps == 0
    }

    /// Cell that follows `cell` on the way to the goal
    pub fn next(&self, cell: Coord) -> Option<Coord> {
        self.next.get(&cell).copied()
    }

    /// First cell after the start
    pub fn first_step(&self) -> Option<Coord> {
        self.next(self.start)
    }

    /// Direction of the first move; None when start == goal
    pub fn direction(&self) -> Option<Direction> {
        let step = self.first_step()?;
        Direction::from_offset((step.x - self.start.x, step.y - self.start.y))
    }

    /// All cells from start to goal inclusive
    pub fn cells(&self) -> Vec<Coord> {
        let mut cells = Vec::with_capacity(self.steps + 1);
        let mut current = self.start;
        cells.push(current);
        while let Some(n) = self.next(current) {
            cells.push(n);
            current = n;
        }
        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(cells: &[Coord]) -> HashMap<Coord, Coord> {
        cells.windows(2).map(|w| (w[1], w[0])).collect()
    }

    #[test]
    fn test_reconstructs_forward_links() {
        let route = [
            Coord::new(0, 0),
            Coord::new(1, 0),
            Coord::new(1, 1),
            Coord::new(2, 1),
        ];
        let back = chain(&route);
        let path = Path::from_predecessors(route[0], route[3], |c| back.get(&c).copied());

        assert_eq!(path.len(), 3);
        assert_eq!(path.start(), route[0]);
        assert_eq!(path.goal(), route[3]);
        assert_eq!(path.cells(), route.to_vec());
        assert_eq!(path.first_step(), Some(Coord::new(1, 0)));
        assert_eq!(path.direction(), Some(Direction::Right));
    }

    #[test]
    fn test_direction_matches_first_offset() {
        let route = [Coord::new(3, 3), Coord::new(3, 2), Coord::new(2, 2)];
        let back = chain(&route);
        let path = Path::from_predecessors(route[0], route[2], |c| back.get(&c).copied());
        assert_eq!(path.direction(), Some(Direction::Up));
    }

    #[test]
    fn test_degenerate_path_has_no_direction() {
        let here = Coord::new(4, 4);
        let path = Path::from_predecessors(here, here, |_| None);
        assert!(path.is_empty());
        assert_eq!(path.direction(), None);
        assert_eq!(path.cells(), vec![here]);
    }
}
