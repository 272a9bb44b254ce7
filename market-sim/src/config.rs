//! Run configuration.
//!
//! `SimConfig` holds everything about a run except the generator functions
//! (see [`crate::schedule`]). Defaults match the classic classroom setup:
//! 25 households, 25 firms, 30 days, both markets open.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::schedule::ScheduleFile;
use crate::types::Day;

const DEFAULT_HOUSEHOLDS: u32 = 25;
const DEFAULT_FIRMS: u32 = 25;
const DEFAULT_DAYS: Day = 30;
const DEFAULT_INITIAL_PRICE: f64 = 10.0;
const DEFAULT_INITIAL_WAGE: f64 = 10.0;
const DEFAULT_SEED: u64 = 42;

/// Which markets clear each day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketMode {
    GoodsOnly,
    LaborOnly,
    #[default]
    Both,
}

impl MarketMode {
    pub fn goods_enabled(self) -> bool {
        matches!(self, Self::GoodsOnly | Self::Both)
    }

    pub fn labor_enabled(self) -> bool {
        matches!(self, Self::LaborOnly | Self::Both)
    }
}

/// Starting cash for the budget-constrained variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetConfig {
    pub household_cash: i64,
    pub firm_cash: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub households: u32,
    pub firms: u32,
    pub days: Day,
    pub mode: MarketMode,
    pub initial_price: f64,
    pub initial_wage: f64,
    pub seed: u64,
    /// `None` runs the unconstrained market.
    pub budget: Option<BudgetConfig>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            households: DEFAULT_HOUSEHOLDS,
            firms: DEFAULT_FIRMS,
            days: DEFAULT_DAYS,
            mode: MarketMode::default(),
            initial_price: DEFAULT_INITIAL_PRICE,
            initial_wage: DEFAULT_INITIAL_WAGE,
            seed: DEFAULT_SEED,
            budget: None,
        }
    }
}

impl SimConfig {
    /// Check run preconditions. Schedule presence is checked in
    /// [`crate::Simulation::new`], which sees both halves.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.households == 0 || self.firms == 0 {
            return Err(SimError::EmptyPopulation {
                households: self.households,
                firms: self.firms,
            });
        }
        if self.days == 0 {
            return Err(SimError::NoDays);
        }
        check_level("price", self.initial_price)?;
        check_level("wage", self.initial_wage)?;
        if let Some(budget) = self.budget {
            if budget.household_cash < 0 || budget.firm_cash < 0 {
                return Err(SimError::NegativeCash {
                    households: budget.household_cash,
                    firms: budget.firm_cash,
                });
            }
        }
        Ok(())
    }
}

fn check_level(name: &'static str, value: f64) -> Result<(), SimError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidLevel { name, value })
    }
}

/// On-disk run description: config plus declarative schedules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunFile {
    #[serde(default)]
    pub sim: SimConfig,
    pub schedules: ScheduleFile,
}

impl RunFile {
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, SimError> {
        let json = fs::read_to_string(path).map_err(|source| SimError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SimConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.households, 25);
        assert_eq!(config.days, 30);
        assert_eq!(config.mode, MarketMode::Both);
    }

    #[test]
    fn rejects_empty_population_and_zero_days() {
        let config = SimConfig {
            firms: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SimError::EmptyPopulation { firms: 0, .. })
        ));

        let config = SimConfig {
            days: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(SimError::NoDays)));
    }

    #[test]
    fn rejects_bad_levels_and_cash() {
        let config = SimConfig {
            initial_price: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SimError::InvalidLevel { name: "price", .. })
        ));

        let config = SimConfig {
            budget: Some(BudgetConfig {
                household_cash: -1,
                firm_cash: 0,
            }),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(SimError::NegativeCash { .. })));
    }

    #[test]
    fn mode_flags() {
        assert!(MarketMode::GoodsOnly.goods_enabled());
        assert!(!MarketMode::GoodsOnly.labor_enabled());
        assert!(MarketMode::LaborOnly.labor_enabled());
        assert!(!MarketMode::LaborOnly.goods_enabled());
        assert!(MarketMode::Both.goods_enabled() && MarketMode::Both.labor_enabled());
    }

    #[test]
    fn run_file_fills_missing_fields_with_defaults() {
        let json = r#"{
            "sim": { "days": 5, "mode": "goods_only" },
            "schedules": {
                "price_demand": { "linear": { "intercept": 20.0, "slope": -0.5 } },
                "price_supply": { "constant": { "value": 8.0 } }
            }
        }"#;
        let run = RunFile::from_json(json).unwrap();
        assert_eq!(run.sim.days, 5);
        assert_eq!(run.sim.mode, MarketMode::GoodsOnly);
        assert_eq!(run.sim.households, 25);
        assert!(run.schedules.wage_demand.is_none());
    }

    #[test]
    fn run_file_reports_parse_errors() {
        assert!(matches!(RunFile::from_json("{"), Err(SimError::Parse(_))));
    }
}
