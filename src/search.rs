// A* path search over the occupancy grid
//
// Step cost is 1 plus the risk weight of the cell entered. Manhattan distance
// never overestimates that, so the first time the goal leaves the frontier
// its route is a cheapest one.

use crate::frontier::PriorityFrontier;
use crate::grid::Grid;
use crate::path::Path;
use crate::types::Coord;

/// Cost of entering `cell`
fn step_cost(grid: &Grid, cell: Coord) -> u32 {
    1 + grid.risk_weight(cell)
}

/// Finds a cheapest path from `start` to `goal`, or None if the goal is unreachable.
///
/// The start cell itself may be obstructed (it is usually our own head); every
/// other cell on the returned path is free in `grid`.
pub fn a_star(grid: &Grid, start: Coord, goal: Coord) -> Option<Path> {
    let start_idx = grid.index_of(start)?;
    grid.index_of(goal)?;

    let mut cost_so_far = vec![u32::MAX; grid.len()];
    let mut came_from: Vec<Option<Coord>> = vec![None; grid.len()];
    let mut frontier = PriorityFrontier::new();

    cost_so_far[start_idx] = 0;
    frontier.enqueue((start, 0u32), start.manhattan(&goal) as u32);

    while let Some((current, cost)) = frontier.dequeue() {
        if current == goal {
            return Some(Path::from_predecessors(start, goal, |c| {
                grid.index_of(c).and_then(|i| came_from[i])
            }));
        }

        let current_idx = grid.index_of(current)?;
        if cost != cost_so_far[current_idx] {
            // Stale copy, a cheaper one was already expanded
            continue;
        }

        for neighbor in grid.neighbors(current) {
            let idx = match grid.index_of(neighbor) {
                Some(idx) => idx,
                None => continue,
            };
            let new_cost = cost.saturating_add(step_cost(grid, neighbor));
            if new_cost < cost_so_far[idx] {
                cost_so_far[idx] = new_cost;
                came_from[idx] = Some(current);
                let priority = new_cost.saturating_add(neighbor.manhattan(&goal) as u32);
                frontier.enqueue((neighbor, new_cost), priority);
            }
        }
    }

    None
}

/// Whether `goal` can be reached from `start`
pub fn reachable(grid: &Grid, start: Coord, goal: Coord) -> bool {
    a_star(grid, start, goal).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::VecDeque;

    /// Plain BFS distance, used as an oracle for unweighted grids
    fn bfs_distance(grid: &Grid, start: Coord, goal: Coord) -> Option<usize> {
        let mut dist = vec![usize::MAX; grid.len()];
        let mut queue = VecDeque::new();
        dist[grid.index_of(start)?] = 0;
        queue.push_back(start);
        while let Some(cell) = queue.pop_front() {
            let d = dist[grid.index_of(cell)?];
            if cell == goal {
                return Some(d);
            }
            for n in grid.neighbors(cell) {
                let i = grid.index_of(n)?;
                if dist[i] == usize::MAX {
                    dist[i] = d + 1;
                    queue.push_back(n);
                }
            }
        }
        None
    }

    fn random_grid(rng: &mut StdRng, w: i32, h: i32, density: f64) -> Grid {
        let mut grid = Grid::new(w, h);
        for x in 0..w {
            for y in 0..h {
                if rng.random_bool(density) {
                    grid.obstruct(Coord::new(x, y));
                }
            }
        }
        grid
    }

    #[test]
    fn test_straight_line_on_empty_grid() {
        let grid = Grid::new(5, 5);
        let path = a_star(&grid, Coord::new(2, 2), Coord::new(0, 2)).unwrap();
        assert_eq!(path.len(), 2);
        assert_eq!(
            path.cells(),
            vec![Coord::new(2, 2), Coord::new(1, 2), Coord::new(0, 2)]
        );
    }

    #[test]
    fn test_routes_around_a_wall() {
        let mut grid = Grid::new(5, 5);
        for y in 0..4 {
            grid.obstruct(Coord::new(2, y));
        }
        let path = a_star(&grid, Coord::new(0, 0), Coord::new(4, 0)).unwrap();
        // Down to row 4, across, back up
        assert_eq!(path.len(), 12);
        for cell in path.cells().iter().skip(1) {
            assert!(grid.is_free(*cell));
        }
    }

    #[test]
    fn test_unreachable_goal() {
        let mut grid = Grid::new(5, 5);
        for y in 0..5 {
            grid.obstruct(Coord::new(2, y));
        }
        assert!(a_star(&grid, Coord::new(0, 0), Coord::new(4, 4)).is_none());
        assert!(!reachable(&grid, Coord::new(0, 0), Coord::new(4, 4)));
    }

    #[test]
    fn test_obstructed_or_off_board_goal() {
        let mut grid = Grid::new(3, 3);
        grid.obstruct(Coord::new(2, 2));
        assert!(a_star(&grid, Coord::new(0, 0), Coord::new(2, 2)).is_none());
        assert!(a_star(&grid, Coord::new(0, 0), Coord::new(5, 0)).is_none());
    }

    #[test]
    fn test_start_equals_goal() {
        let grid = Grid::new(3, 3);
        let path = a_star(&grid, Coord::new(1, 1), Coord::new(1, 1)).unwrap();
        assert!(path.is_empty());
        assert_eq!(path.direction(), None);
    }

    #[test]
    fn test_obstructed_start_can_still_leave() {
        let mut grid = Grid::new(3, 1);
        grid.obstruct(Coord::new(0, 0));
        let path = a_star(&grid, Coord::new(0, 0), Coord::new(2, 0)).unwrap();
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn test_prefers_low_risk_detour() {
        let mut grid = Grid::new(3, 3);
        grid.set_risk(Coord::new(1, 0), 10);
        let path = a_star(&grid, Coord::new(0, 0), Coord::new(2, 0)).unwrap();
        assert!(!path.cells().contains(&Coord::new(1, 0)));
        assert_eq!(path.len(), 4);
    }

    #[test]
    fn test_matches_bfs_oracle_on_random_grids() {
        let mut rng = StdRng::seed_from_u64(2024);
        for _ in 0..200 {
            let grid = random_grid(&mut rng, 6, 6, 0.3);
            let start = Coord::new(rng.random_range(0..6), rng.random_range(0..6));
            let goal = match grid.random_free_cell(&mut rng, 200) {
                Some(goal) => goal,
                None => continue,
            };

            let expected = bfs_distance(&grid, start, goal);
            let found = a_star(&grid, start, goal);
            assert_eq!(found.as_ref().map(|p| p.len()), expected);

            if let Some(path) = found {
                let cells = path.cells();
                assert_eq!(cells.first(), Some(&start));
                assert_eq!(cells.last(), Some(&goal));
                for cell in cells.iter().skip(1) {
                    assert!(grid.is_free(*cell), "path crosses obstruction");
                }
                for pair in cells.windows(2) {
                    assert_eq!(pair[0].manhattan(&pair[1]), 1);
                }
                if let (Some(dir), Some(step)) = (path.direction(), path.first_step()) {
                    assert_eq!(dir.apply(&start), step);
                }
            }
        }
    }
}
