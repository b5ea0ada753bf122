// Replay module for analyzing historical game states and debugging decision-making
//
// This module provides functionality to:
// 1. Parse JSONL debug logs
// 2. Re-run the decision on historical states with the logged seed
// 3. Compare logged vs replayed moves
// 4. Generate summary statistics

use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use crate::bot::{decide, fallback_decision, Tier};
use crate::config::Config;
use crate::debug_logger::DebugLogEntry;
use crate::types::Direction;

/// A single log entry from the debug JSONL file
pub type LogEntry = DebugLogEntry;

/// Result of replaying a single turn
#[derive(Debug, Clone)]
pub struct ReplayResult {
    pub turn: i32,
    pub original_move: Direction,
    pub replayed_move: Direction,
    pub matches: bool,
    pub original_tier: Tier,
    pub replayed_tier: Tier,
    /// Replayed through the failsafe because the logged turn overran its budget
    pub timed_out: bool,
    pub computation_time_ms: u128,
}

/// Statistics for a complete replay session
#[derive(Debug, Default)]
pub struct ReplayStats {
    pub total_turns: usize,
    pub matches: usize,
    pub mismatches: usize,
    pub timed_out: usize,
    pub match_rate: f64,
}

/// Replay engine for analyzing debug logs
pub struct ReplayEngine {
    config: Config,
    verbose: bool,
}

impl ReplayEngine {
    /// Creates a new replay engine with the given configuration
    pub fn new(config: Config, verbose: bool) -> Self {
        ReplayEngine { config, verbose }
    }

    /// Loads all log entries from a JSONL file
    pub fn load_log_file<P: AsRef<Path>>(&self, log_path: P) -> Result<Vec<LogEntry>, String> {
        let file =
            File::open(log_path.as_ref()).map_err(|e| format!("Failed to open log file: {}", e))?;

        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| format!("Failed to read line {}: {}", line_num + 1, e))?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: LogEntry = serde_json::from_str(&line)
                .map_err(|e| format!("Failed to parse JSON on line {}: {}", line_num + 1, e))?;

            entries.push(entry);
        }

        info!("Loaded {} log entries", entries.len());
        Ok(entries)
    }

    /// Replays a single log entry and compares the result
    pub fn replay_entry(&self, entry: &LogEntry) -> Result<ReplayResult, String> {
        if self.verbose {
            info!("Replaying turn {}...", entry.turn);
        }

        entry.board.validate()?;
        if entry.board.snake(&entry.you_id).is_none() {
            return Err(format!(
                "Snake with id '{}' not found in board state",
                entry.you_id
            ));
        }

        let original_move = Direction::parse(&entry.chosen_move)?;

        let start_time = Instant::now();
        let decision = if entry.timed_out {
            fallback_decision(&entry.board, &entry.you_id, &self.config)
        } else {
            let mut rng = StdRng::seed_from_u64(entry.seed);
            decide(&entry.board, &entry.you_id, &self.config, &mut rng)
        };
        let computation_time = start_time.elapsed().as_millis();

        let matches = original_move == decision.direction;

        if self.verbose {
            if matches {
                info!(
                    "Turn {}: ✓ MATCH - {} ({:?}{}, time: {}ms)",
                    entry.turn,
                    decision.direction.as_str(),
                    decision.tier,
                    if entry.timed_out { ", timed out" } else { "" },
                    computation_time
                );
            } else {
                warn!(
                    "Turn {}: ✗ MISMATCH - Original: {} ({:?}), Replayed: {} ({:?})",
                    entry.turn,
                    original_move.as_str(),
                    entry.tier,
                    decision.direction.as_str(),
                    decision.tier
                );
            }
        }

        Ok(ReplayResult {
            turn: entry.turn,
            original_move,
            replayed_move: decision.direction,
            matches,
            original_tier: entry.tier,
            replayed_tier: decision.tier,
            timed_out: entry.timed_out,
            computation_time_ms: computation_time,
        })
    }

    /// Replays all entries in parallel, keeping log order
    pub fn replay_all(&self, entries: &[LogEntry]) -> Vec<ReplayResult> {
        entries
            .par_iter()
            .filter_map(|entry| match self.replay_entry(entry) {
                Ok(result) => Some(result),
                Err(e) => {
                    warn!("Failed to replay turn {}: {}", entry.turn, e);
                    None
                }
            })
            .collect()
    }

    /// Replays specific turns from a log file
    pub fn replay_turns(
        &self,
        entries: &[LogEntry],
        turn_numbers: &[i32],
    ) -> Result<Vec<ReplayResult>, String> {
        let selected = turn_numbers
            .iter()
            .map(|turn_num| {
                entries
                    .iter()
                    .find(|e| e.turn == *turn_num)
                    .cloned()
                    .ok_or_else(|| format!("Turn {} not found in log file", turn_num))
            })
            .collect::<Result<Vec<_>, String>>()?;

        Ok(self.replay_all(&selected))
    }

    /// Checks that the replayed move for each listed turn is one of the accepted moves
    pub fn validate_expected_moves(
        &self,
        entries: &[LogEntry],
        expected: &[(i32, Vec<Direction>)],
    ) -> Result<(), String> {
        let mut failures = Vec::new();

        for (turn, accepted) in expected {
            let entry = entries
                .iter()
                .find(|e| e.turn == *turn)
                .ok_or_else(|| format!("Turn {} not found in log file", turn))?;
            let result = self.replay_entry(entry)?;

            if !accepted.contains(&result.replayed_move) {
                let names: Vec<&str> = accepted.iter().map(|d| d.as_str()).collect();
                failures.push(format!(
                    "turn {}: expected {}, got {}",
                    turn,
                    names.join("|"),
                    result.replayed_move.as_str()
                ));
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(failures.join("; "))
        }
    }

    /// Generates statistics from replay results
    pub fn generate_stats(&self, results: &[ReplayResult]) -> ReplayStats {
        let total_turns = results.len();
        let matches = results.iter().filter(|r| r.matches).count();
        let mismatches = total_turns - matches;
        let timed_out = results.iter().filter(|r| r.timed_out).count();
        let match_rate = if total_turns > 0 {
            (matches as f64 / total_turns as f64) * 100.0
        } else {
            0.0
        };

        ReplayStats {
            total_turns,
            matches,
            mismatches,
            timed_out,
            match_rate,
        }
    }

    /// Prints a summary report to stdout
    pub fn print_summary(&self, results: &[ReplayResult]) {
        let stats = self.generate_stats(results);

        println!("\n========== REPLAY SUMMARY ==========");
        println!("Total turns:  {}", stats.total_turns);
        println!("Matches:      {}", stats.matches);
        println!("Mismatches:   {}", stats.mismatches);
        println!("Timed out:    {}", stats.timed_out);
        println!("Match rate:   {:.1}%", stats.match_rate);

        let mismatched: Vec<_> = results.iter().filter(|r| !r.matches).collect();
        if !mismatched.is_empty() {
            println!("\nMismatched turns:");
            for r in mismatched {
                println!(
                    "  Turn {:>4}: logged {:<5} ({:?}) replayed {:<5} ({:?})",
                    r.turn,
                    r.original_move.as_str(),
                    r.original_tier,
                    r.replayed_move.as_str(),
                    r.replayed_tier
                );
            }
        }
        println!("====================================\n");
    }
}
