// Configuration module for reading Snake.toml
// Every tunable the move engine uses lives here and is passed explicitly into each decision

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::types::Direction;

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub timing: TimingConfig,
    pub search: SearchConfig,
    pub escape: EscapeConfig,
    pub wander: WanderConfig,
    pub policy: PolicyConfig,
    pub appearance: AppearanceConfig,
    pub debug: DebugConfig,
}

/// Timing constants
#[derive(Debug, Deserialize, Clone)]
pub struct TimingConfig {
    pub response_time_budget_ms: u64,
    pub network_overhead_ms: u64,
}

impl TimingConfig {
    /// Computes the effective computation budget
    pub fn effective_budget_ms(&self) -> u64 {
        self.response_time_budget_ms.saturating_sub(self.network_overhead_ms)
    }
}

/// Path search cost model
#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    /// Extra traversal cost for hazard cells
    pub hazard_risk_weight: u32,
}

/// Monte Carlo trap detection
#[derive(Debug, Deserialize, Clone)]
pub struct EscapeConfig {
    pub sample_count: usize,
}

/// Retry bounds for the wander tiers and free-cell sampling
#[derive(Debug, Deserialize, Clone)]
pub struct WanderConfig {
    pub safe_attempts: usize,
    pub unconstrained_attempts: usize,
    pub random_cell_attempts: usize,
}

/// Which opponents get their possible next head cells blocked
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HeadAvoidance {
    Never,
    EqualOrLonger,
    Always,
}

impl HeadAvoidance {
    /// Whether an opponent of `opponent_len` should have its next heads blocked
    pub fn blocks(&self, opponent_len: usize, our_len: usize) -> bool {
        match self {
            HeadAvoidance::Never => false,
            HeadAvoidance::EqualOrLonger => opponent_len >= our_len,
            HeadAvoidance::Always => true,
        }
    }
}

/// Decision policy knobs
#[derive(Debug, Deserialize, Clone)]
pub struct PolicyConfig {
    pub head_avoidance: HeadAvoidance,
    pub default_direction: Direction,
}

/// Appearance reported on GET /
#[derive(Debug, Deserialize, Clone)]
pub struct AppearanceConfig {
    pub author: String,
    pub color: String,
    pub head: String,
    pub tail: String,
    pub shout: String,
}

/// Debug configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_file_path: String,
    /// Fixed seed for every turn; a fresh seed is drawn per turn when unset
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Snake.toml configuration file
    ///
    /// # Returns
    /// * `Result<Config, String>` - Parsed configuration or error message
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        Self::from_toml_str(&contents)
    }

    /// Parses configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, String> {
        let config: Config =
            toml::from_str(contents).map_err(|e| format!("Failed to parse config file: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads default configuration from Snake.toml in the project root
    pub fn load_default() -> Result<Self, String> {
        Self::from_file("Snake.toml")
    }

    fn validate(&self) -> Result<(), String> {
        if self.escape.sample_count == 0 {
            return Err("escape.sample_count must be at least 1".to_string());
        }
        if self.wander.random_cell_attempts == 0 {
            return Err("wander.random_cell_attempts must be at least 1".to_string());
        }
        Ok(())
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Snake.toml
    pub fn default_hardcoded() -> Self {
        Config {
            timing: TimingConfig {
                response_time_budget_ms: 400,
                network_overhead_ms: 50,
            },
            search: SearchConfig {
                hazard_risk_weight: 5,
            },
            escape: EscapeConfig { sample_count: 20 },
            wander: WanderConfig {
                safe_attempts: 10,
                unconstrained_attempts: 10,
                random_cell_attempts: 500,
            },
            policy: PolicyConfig {
                head_avoidance: HeadAvoidance::EqualOrLonger,
                default_direction: Direction::Left,
            },
            appearance: AppearanceConfig {
                author: "snakes-on-a-plane".to_string(),
                color: "#EF0006".to_string(),
                head: "default".to_string(),
                tail: "default".to_string(),
                shout: "snakes-on-a-plane!".to_string(),
            },
            debug: DebugConfig {
                enabled: false,
                log_file_path: "battlesnake_debug.jsonl".to_string(),
                rng_seed: None,
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            eprintln!(
                "Warning: Could not load Snake.toml ({}), using hardcoded defaults",
                e
            );
            Self::default_hardcoded()
        })
    }
}
