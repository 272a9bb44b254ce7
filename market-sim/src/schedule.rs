//! Per-rank generator functions for participant bounds.
//!
//! A schedule maps a participant's rank (1-based) to a reservation value:
//! the price ceiling of household `i` is `price_demand(i + 1)`, the price
//! floor of firm `j` is `price_supply(j + 1)`, and likewise for real wages.

use serde::{Deserialize, Serialize};

use crate::error::SimError;

pub type ScheduleFn = Box<dyn Fn(u32) -> f64>;

/// Generator functions for one run. Wage schedules are only required when
/// the labor market is enabled.
pub struct Schedules {
    pub price_demand: ScheduleFn,
    pub price_supply: ScheduleFn,
    pub wage_demand: Option<ScheduleFn>,
    pub wage_supply: Option<ScheduleFn>,
}

impl Schedules {
    /// Goods-market-only schedules.
    pub fn goods(
        price_demand: impl Fn(u32) -> f64 + 'static,
        price_supply: impl Fn(u32) -> f64 + 'static,
    ) -> Self {
        Self {
            price_demand: Box::new(price_demand),
            price_supply: Box::new(price_supply),
            wage_demand: None,
            wage_supply: None,
        }
    }

    pub fn with_labor(
        mut self,
        wage_demand: impl Fn(u32) -> f64 + 'static,
        wage_supply: impl Fn(u32) -> f64 + 'static,
    ) -> Self {
        self.wage_demand = Some(Box::new(wage_demand));
        self.wage_supply = Some(Box::new(wage_supply));
        self
    }

    pub fn has_labor(&self) -> bool {
        self.wage_demand.is_some() && self.wage_supply.is_some()
    }
}

/// Declarative schedule for config files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleDef {
    Constant { value: f64 },
    /// `intercept + slope * rank`
    Linear { intercept: f64, slope: f64 },
    /// Value per rank starting at rank 1; ranks past the end reuse the last value.
    Table { values: Vec<f64> },
}

impl ScheduleDef {
    pub fn value(&self, rank: u32) -> f64 {
        match self {
            Self::Constant { value } => *value,
            Self::Linear { intercept, slope } => intercept + slope * rank as f64,
            Self::Table { values } => {
                let idx = (rank.max(1) as usize - 1).min(values.len().saturating_sub(1));
                values.get(idx).copied().unwrap_or(0.0)
            }
        }
    }

    pub fn validate(&self) -> Result<(), SimError> {
        match self {
            Self::Table { values } if values.is_empty() => Err(SimError::EmptySchedule),
            _ => Ok(()),
        }
    }

    pub fn into_fn(self) -> ScheduleFn {
        Box::new(move |rank| self.value(rank))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleFile {
    pub price_demand: ScheduleDef,
    pub price_supply: ScheduleDef,
    #[serde(default)]
    pub wage_demand: Option<ScheduleDef>,
    #[serde(default)]
    pub wage_supply: Option<ScheduleDef>,
}

impl ScheduleFile {
    pub fn into_schedules(self) -> Result<Schedules, SimError> {
        let defs = [
            Some(&self.price_demand),
            Some(&self.price_supply),
            self.wage_demand.as_ref(),
            self.wage_supply.as_ref(),
        ];
        for def in defs.into_iter().flatten() {
            def.validate()?;
        }

        Ok(Schedules {
            price_demand: self.price_demand.into_fn(),
            price_supply: self.price_supply.into_fn(),
            wage_demand: self.wage_demand.map(ScheduleDef::into_fn),
            wage_supply: self.wage_supply.map(ScheduleDef::into_fn),
        })
    }
}
