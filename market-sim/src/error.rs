use std::path::PathBuf;

use crate::config::MarketMode;

/// Precondition violations for a simulation run.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("population must be non-empty: {households} households, {firms} firms")]
    EmptyPopulation { households: u32, firms: u32 },

    #[error("simulation needs at least one day")]
    NoDays,

    #[error("initial {name} level must be finite and positive, got {value}")]
    InvalidLevel { name: &'static str, value: f64 },

    #[error("mode {mode:?} needs wage schedules for both sides of the labor market")]
    MissingWageSchedules { mode: MarketMode },

    #[error("cash balances must be non-negative, got households={households} firms={firms}")]
    NegativeCash { households: i64, firms: i64 },

    #[error("schedule {schedule} gave {value} at rank {rank}; values must be finite and within ±{limit}")]
    InvalidSchedule {
        schedule: &'static str,
        rank: u32,
        value: f64,
        limit: f64,
    },

    #[error("schedule table must have at least one value")]
    EmptySchedule,

    #[error("failed to read config {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Precondition violations for the multistart optimizer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OptimizeError {
    #[error("tolerance must be positive, got {0}")]
    NonPositiveTolerance(f64),

    #[error("warm-up rounds ({warmup}) exceed total rounds ({rounds})")]
    WarmupExceedsRounds { warmup: usize, rounds: usize },

    #[error("bounds must be finite and well-ordered: lower={lower} upper={upper}")]
    InvalidBounds { lower: f64, upper: f64 },
}
