// Welcome to
// __________         __    __  .__                               __
// \______   \_____ _/  |__/  |_|  |   ____   ______ ____ _____  |  | __ ____
//  |    |  _/\__  \\   __\   __\  | _/ __ \ /  ___//    \\__  \ |  |/ // __ \
//  |    |   \ / __ \|  |  |  | |  |_\  ___/ \___ \|   |  \/ __ \|    <\  ___/
//  |________/(______/__|  |__| |____/\_____>______>___|__(______/__|__\\_____>
//
// Move selection: chase safe food, otherwise wander somewhere that does not
// box us in, otherwise wander anywhere, and finally make sure the chosen step
// does not run straight into a wall or body.

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::debug_logger::DebugLogger;
use crate::escape::EscapeEvaluator;
use crate::grid::Grid;
use crate::search::a_star;
use crate::types::{Battlesnake, Board, Coord, Direction, Game};

/// Which stage of the policy produced the move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    FoodSeek,
    SafeWander,
    UnconstrainedWander,
    Failsafe,
}

/// Outcome of one turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub direction: Direction,
    pub tier: Tier,
    /// Length of the planned path, when a path was planned
    pub path_len: Option<usize>,
}

impl Decision {
    fn failsafe(direction: Direction) -> Self {
        Decision {
            direction,
            tier: Tier::Failsafe,
            path_len: None,
        }
    }
}

/// Per-turn inputs shared by every tier
struct Turn<'a> {
    board: &'a Board,
    you: &'a Battlesnake,
    config: &'a Config,
    grid: Grid,
    tail_free: Grid,
    evaluator: EscapeEvaluator,
}

impl<'a> Turn<'a> {
    fn new(board: &'a Board, you: &'a Battlesnake, config: &'a Config) -> Self {
        let grid = Grid::from_board(board, you, config);
        let tail_free = tail_free_grid(&grid, you);
        Turn {
            board,
            you,
            config,
            grid,
            tail_free,
            evaluator: EscapeEvaluator::from_config(config),
        }
    }

    fn head(&self) -> Coord {
        self.you.body[0]
    }

    /// Nearest uncontested food, if the path there is not a trap
    fn food_seek<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Decision> {
        let target = uncontested_food(self.board, self.you)
            .into_iter()
            .min_by_key(|f| self.head().manhattan(f))?;

        let path = a_star(&self.grid, self.head(), target)?;
        let direction = path.direction()?;

        let verdict = self.evaluator.evaluate(&self.grid, &self.you.body, &path, rng);
        if verdict.is_trap() {
            debug!(
                "Food at ({}, {}) rejected as a trap",
                target.x, target.y
            );
            return None;
        }

        Some(Decision {
            direction,
            tier: Tier::FoodSeek,
            path_len: Some(path.len()),
        })
    }

    /// Random reachable goal that passes the trap check
    fn safe_wander<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Decision> {
        for _ in 0..self.config.wander.safe_attempts {
            let goal = self
                .grid
                .random_free_cell(&mut *rng, self.config.wander.random_cell_attempts)?;

            let path = match a_star(&self.grid, self.head(), goal) {
                Some(path) if !path.is_empty() => path,
                _ => continue,
            };
            let direction = match path.direction() {
                Some(direction) => direction,
                None => continue,
            };

            if self
                .evaluator
                .evaluate(&self.grid, &self.you.body, &path, &mut *rng)
                .is_trap()
            {
                continue;
            }

            return Some(Decision {
                direction,
                tier: Tier::SafeWander,
                path_len: Some(path.len()),
            });
        }
        None
    }

    /// Random reachable goal on the tail-freed grid, no trap check
    fn unconstrained_wander<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Decision> {
        for _ in 0..self.config.wander.unconstrained_attempts {
            let goal = self
                .tail_free
                .random_free_cell(&mut *rng, self.config.wander.random_cell_attempts)?;

            if let Some(path) = a_star(&self.tail_free, self.head(), goal) {
                if let Some(direction) = path.direction() {
                    return Some(Decision {
                        direction,
                        tier: Tier::UnconstrainedWander,
                        path_len: Some(path.len()),
                    });
                }
            }
        }
        None
    }
}

/// Copy of `grid` with our tail cleared when it is about to move
fn tail_free_grid(grid: &Grid, you: &Battlesnake) -> Grid {
    let mut tail_free = grid.clone();
    if let Some(tail) = you.vacating_tail() {
        tail_free.free(tail);
    }
    tail_free
}

/// Food that no other living snake is strictly closer to
pub fn uncontested_food(board: &Board, you: &Battlesnake) -> Vec<Coord> {
    let head = match you.body.first() {
        Some(head) => *head,
        None => return vec![],
    };
    board
        .food
        .iter()
        .filter(|food| {
            let ours = head.manhattan(food);
            !board
                .snakes
                .iter()
                .filter(|s| s.id != you.id && s.is_alive() && !s.body.is_empty())
                .any(|s| s.body[0].manhattan(food) < ours)
        })
        .copied()
        .collect()
}

/// Last line of defence: keep `chosen` if it lands on a free cell of
/// `tail_free`, otherwise take the first other direction that does.
/// Falls back to `default` when every direction is blocked.
pub fn failsafe(
    tail_free: &Grid,
    head: Coord,
    chosen: Option<Direction>,
    default: Direction,
) -> (Direction, bool) {
    let first = chosen.unwrap_or(default);
    if tail_free.is_free(first.apply(&head)) {
        return (first, chosen.is_some());
    }

    Direction::all()
        .iter()
        .copied()
        .filter(|d| *d != first)
        .find(|d| tail_free.is_free(d.apply(&head)))
        .map(|d| (d, false))
        .unwrap_or((default, false))
}

/// Picks this turn's move for snake `you_id`.
///
/// Pure in the board, configuration and random source: the same inputs and
/// seed always give the same decision.
pub fn decide<R: Rng + ?Sized>(
    board: &Board,
    you_id: &str,
    config: &Config,
    rng: &mut R,
) -> Decision {
    let you = match board.snake(you_id) {
        Some(you) if !you.body.is_empty() => you,
        _ => {
            warn!("Snake '{}' not on the board, using default move", you_id);
            return Decision::failsafe(config.policy.default_direction);
        }
    };

    let turn = Turn::new(board, you, config);

    let planned = turn
        .food_seek(&mut *rng)
        .or_else(|| {
            debug!("No safe food, wandering");
            turn.safe_wander(&mut *rng)
        })
        .or_else(|| {
            debug!("No safe wander target, ignoring trap check");
            turn.unconstrained_wander(&mut *rng)
        });

    let (direction, kept) = failsafe(
        &turn.tail_free,
        turn.head(),
        planned.map(|d| d.direction),
        config.policy.default_direction,
    );

    match planned {
        Some(decision) if kept => decision,
        _ => {
            debug!("Failsafe picked {}", direction.as_str());
            Decision::failsafe(direction)
        }
    }
}

/// Failsafe-only answer, used when the full decision is not available in time
pub fn fallback_decision(board: &Board, you_id: &str, config: &Config) -> Decision {
    let default = config.policy.default_direction;
    match board.snake(you_id) {
        Some(you) if !you.body.is_empty() => {
            let grid = Grid::from_board(board, you, config);
            let tail_free = tail_free_grid(&grid, you);
            let (direction, _) = failsafe(&tail_free, you.body[0], None, default);
            Decision::failsafe(direction)
        }
        _ => Decision::failsafe(default),
    }
}

/// Battlesnake Bot with OOP-style API
/// Takes static configuration dependencies and exposes methods corresponding to API endpoints
pub struct Bot {
    config: Config,
    logger: DebugLogger,
}

impl Bot {
    /// Creates a new Bot instance with the given configuration
    ///
    /// # Arguments
    /// * `config` - Static configuration that does not change during the bot's lifetime
    pub fn new(config: Config) -> Self {
        Bot {
            config,
            logger: DebugLogger::disabled(),
        }
    }

    /// Creates a Bot that records every decision to `logger`
    pub fn with_logger(config: Config, logger: DebugLogger) -> Self {
        Bot { config, logger }
    }

    /// Returns bot metadata and appearance
    /// Corresponds to GET / endpoint
    pub fn info(&self) -> Value {
        info!("INFO");

        let appearance = &self.config.appearance;
        json!({
            "apiversion": "1",
            "author": appearance.author,
            "color": appearance.color,
            "head": appearance.head,
            "tail": appearance.tail,
        })
    }

    /// Called when a game starts
    /// Corresponds to POST /start endpoint
    pub fn start(&self, game: &Game, _turn: &i32, _board: &Board, _you: &Battlesnake) {
        info!("GAME START {}", game.id);
    }

    /// Called when a game ends
    /// Corresponds to POST /end endpoint
    pub fn end(&self, game: &Game, _turn: &i32, _board: &Board, _you: &Battlesnake) {
        info!("GAME OVER {}", game.id);
    }

    /// Computes and returns the next move
    /// Corresponds to POST /move endpoint
    ///
    /// The decision runs on a blocking thread and is bounded by the effective
    /// time budget; if it does not finish in time the failsafe move is sent.
    ///
    /// # Arguments
    /// * `_game` - Current game metadata
    /// * `turn` - Current turn number
    /// * `board` - Current board state
    /// * `you` - Your snake's current state
    ///
    /// # Returns
    /// * `Value` - JSON response containing the chosen move direction
    pub async fn get_move(
        &self,
        _game: &Game,
        turn: &i32,
        board: &Board,
        you: &Battlesnake,
    ) -> Value {
        let start_time = Instant::now();

        if let Err(e) = board.validate() {
            warn!("Turn {}: rejecting board ({}), using default move", turn, e);
            return self.response(self.config.policy.default_direction);
        }

        let seed = self
            .config
            .debug
            .rng_seed
            .unwrap_or_else(|| rand::rng().random());

        let task_board = board.clone();
        let you_id = you.id.clone();
        let config = self.config.clone();
        let budget = Duration::from_millis(self.config.timing.effective_budget_ms());
        let (decision, timed_out) = self
            .decide_within(*turn, board, &you.id, budget, move || {
                let mut rng = StdRng::seed_from_u64(seed);
                decide(&task_board, &you_id, &config, &mut rng)
            })
            .await;

        info!(
            "Turn {}: Chose {} ({:?}, path: {:?}, time: {}ms)",
            turn,
            decision.direction.as_str(),
            decision.tier,
            decision.path_len,
            start_time.elapsed().as_millis()
        );

        self.logger
            .log_move(*turn, &you.id, board.clone(), decision, seed, timed_out);

        self.response(decision.direction)
    }

    /// Runs `task` on a blocking thread for at most `budget`.
    ///
    /// Returns the failsafe-only decision if the task fails or overruns; the
    /// flag is true when the budget ran out.
    async fn decide_within<F>(
        &self,
        turn: i32,
        board: &Board,
        you_id: &str,
        budget: Duration,
        task: F,
    ) -> (Decision, bool)
    where
        F: FnOnce() -> Decision + Send + 'static,
    {
        let handle = tokio::task::spawn_blocking(task);

        match tokio::time::timeout(budget, handle).await {
            Ok(Ok(decision)) => (decision, false),
            Ok(Err(e)) => {
                warn!("Turn {}: decision task failed: {}", turn, e);
                (fallback_decision(board, you_id, &self.config), false)
            }
            Err(_) => {
                warn!(
                    "Turn {}: no decision within {}ms, using failsafe",
                    turn,
                    budget.as_millis()
                );
                (fallback_decision(board, you_id, &self.config), true)
            }
        }
    }

    fn response(&self, direction: Direction) -> Value {
        json!({
            "move": direction.as_str(),
            "shout": self.config.appearance.shout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snake(id: &str, body: &[(i32, i32)]) -> Battlesnake {
        Battlesnake::new(id, 90, body.iter().map(|&(x, y)| Coord::new(x, y)).collect())
    }

    fn board(width: i32, height: i32, snakes: Vec<Battlesnake>, food: &[(i32, i32)]) -> Board {
        Board {
            width,
            height,
            food: food.iter().map(|&(x, y)| Coord::new(x, y)).collect(),
            snakes,
            hazards: vec![],
        }
    }

    #[test]
    fn test_contested_food_is_excluded() {
        let me = snake("me", &[(0, 0)]);
        let other = snake("other", &[(6, 6)]);
        let b = board(7, 7, vec![me.clone(), other], &[(1, 0), (5, 6), (3, 3)]);
        // (3,3) is a tie at distance 6, so it stays
        assert_eq!(
            uncontested_food(&b, &me),
            vec![Coord::new(1, 0), Coord::new(3, 3)]
        );
    }

    #[test]
    fn test_dead_snakes_do_not_contest_food() {
        let me = snake("me", &[(0, 0)]);
        let mut other = snake("other", &[(2, 1)]);
        other.health = 0;
        let b = board(5, 5, vec![me.clone(), other], &[(2, 2)]);
        assert_eq!(uncontested_food(&b, &me), vec![Coord::new(2, 2)]);
    }

    #[test]
    fn test_failsafe_keeps_safe_choice() {
        let grid = Grid::new(3, 3);
        let (dir, kept) = failsafe(&grid, Coord::new(1, 1), Some(Direction::Up), Direction::Left);
        assert_eq!(dir, Direction::Up);
        assert!(kept);
    }

    #[test]
    fn test_failsafe_scans_in_table_order() {
        let mut grid = Grid::new(3, 3);
        grid.obstruct(Coord::new(1, 0));
        grid.obstruct(Coord::new(0, 1));
        // Up is blocked; Left is blocked; Right is the first free alternative
        let (dir, kept) = failsafe(&grid, Coord::new(1, 1), Some(Direction::Up), Direction::Left);
        assert_eq!(dir, Direction::Right);
        assert!(!kept);
    }

    #[test]
    fn test_failsafe_never_leaves_the_board_when_avoidable() {
        let grid = Grid::new(3, 3);
        let (dir, _) = failsafe(&grid, Coord::new(0, 0), None, Direction::Left);
        assert_eq!(dir, Direction::Right);
    }

    #[test]
    fn test_failsafe_all_blocked_returns_default() {
        let mut grid = Grid::new(1, 1);
        grid.obstruct(Coord::new(0, 0));
        let (dir, kept) = failsafe(&grid, Coord::new(0, 0), Some(Direction::Up), Direction::Down);
        assert_eq!(dir, Direction::Down);
        assert!(!kept);
    }

    #[test]
    fn test_missing_snake_gets_default() {
        let b = board(5, 5, vec![snake("someone", &[(1, 1)])], &[]);
        let config = Config::default_hardcoded();
        let mut rng = StdRng::seed_from_u64(0);
        let decision = decide(&b, "me", &config, &mut rng);
        assert_eq!(decision.direction, config.policy.default_direction);
        assert_eq!(decision.tier, Tier::Failsafe);
    }

    #[test]
    fn test_fallback_decision_avoids_walls() {
        let me = snake("me", &[(0, 2), (1, 2), (2, 2)]);
        let b = board(5, 5, vec![me], &[]);
        let config = Config::default_hardcoded();
        let decision = fallback_decision(&b, "me", &config);
        // Default is left, which is off the board; right is our neck
        assert_eq!(decision.direction, Direction::Up);
        assert_eq!(decision.tier, Tier::Failsafe);
    }

    #[tokio::test]
    async fn test_overrunning_decision_answers_failsafe() {
        let me = snake("me", &[(0, 2), (1, 2), (2, 2)]);
        let b = board(5, 5, vec![me], &[(0, 4)]);
        let bot = Bot::new(Config::default_hardcoded());

        let (decision, timed_out) = bot
            .decide_within(7, &b, "me", Duration::from_millis(20), || {
                std::thread::sleep(Duration::from_millis(300));
                Decision {
                    direction: Direction::Down,
                    tier: Tier::FoodSeek,
                    path_len: Some(2),
                }
            })
            .await;

        assert!(timed_out);
        assert_eq!(decision, fallback_decision(&b, "me", &bot.config));
        assert_eq!(decision.direction, Direction::Up);
        assert_eq!(decision.tier, Tier::Failsafe);
    }

    #[tokio::test]
    async fn test_decision_within_budget_is_kept() {
        let me = snake("me", &[(0, 2), (1, 2), (2, 2)]);
        let b = board(5, 5, vec![me], &[]);
        let bot = Bot::new(Config::default_hardcoded());
        let planned = Decision {
            direction: Direction::Down,
            tier: Tier::SafeWander,
            path_len: Some(3),
        };

        let (decision, timed_out) = bot
            .decide_within(1, &b, "me", Duration::from_secs(5), move || planned)
            .await;

        assert!(!timed_out);
        assert_eq!(decision, planned);
    }

    #[test]
    fn test_info_reports_configured_appearance() {
        let bot = Bot::new(Config::default_hardcoded());
        let info = bot.info();
        assert_eq!(info["apiversion"], "1");
        assert_eq!(info["color"], "#EF0006");
    }
}
