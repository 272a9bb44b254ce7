// Double-auction market simulation
//
// Module structure:
// - types        IDs, price units, market kinds
// - config       Run configuration and on-disk run files
// - schedule     Per-rank generator functions for participant bounds
// - agents/      Households, firms and the population container
// - market/      Quotes, bilateral clearing, pairing, per-day ledger
// - labor/       Wage-bound scaling and labor matching
// - day          One market-day: match, aggregate, concede, count
// - simulation   Day loop and output series
// - optimize/    Multistart minimizer with a BFGS local solver

pub mod agents;
pub mod config;
pub mod day;
pub mod error;
pub mod labor;
pub mod market;
pub mod optimize;
pub mod schedule;
pub mod simulation;
pub mod types;

#[cfg(feature = "instrument")]
pub use instrument;

pub use agents::{Firm, Household, Population};
pub use config::{BudgetConfig, MarketMode, RunFile, SimConfig};
pub use day::{DayContext, MarketDay, run_market_day};
pub use error::{OptimizeError, SimError};
pub use labor::{clear_labor_pair, clear_wage, employer_ceiling, worker_floor};
pub use market::{
    Clearing, DayLedger, Eligibility, MatchOutcome, NoTrade, Quote, QuoteSide, clear_goods_pair,
    clear_pair, cross_product,
};
pub use optimize::{
    Bfgs, Bounds, LocalMinimizer, LocalMinimum, MultistartResult, MultistartSettings, multistart,
};
pub use schedule::{ScheduleFile, ScheduleDef, Schedules};
pub use simulation::{DaySummary, MarketLevels, Simulation, SimulationSeries};
pub use types::{Day, FirmId, HouseholdId, Level, MarketKind, Pairing, Price};
