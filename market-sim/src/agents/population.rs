use crate::config::{BudgetConfig, SimConfig};
use crate::error::SimError;
use crate::labor::{employer_ceiling, worker_floor};
use crate::market::Quote;
use crate::schedule::{ScheduleFn, Schedules};
use crate::types::{FirmId, HouseholdId, Pairing, Price, to_price};

use super::{Firm, Household};

/// Both participant populations. Ids double as indices.
#[derive(Debug, Clone, Default)]
pub struct Population {
    pub households: Vec<Household>,
    pub firms: Vec<Firm>,
}

/// Largest magnitude a schedule may return. Leaves room to scale real wages
/// by the price level without leaving the `Price` range.
pub const MAX_SCHEDULE_VALUE: f64 = 1e12;

/// Evaluate a schedule at `rank`, rejecting values that cannot become prices.
fn sample(schedule: &'static str, f: &ScheduleFn, rank: u32) -> Result<f64, SimError> {
    let value = f(rank);
    if value.is_finite() && value.abs() <= MAX_SCHEDULE_VALUE {
        Ok(value)
    } else {
        Err(SimError::InvalidSchedule {
            schedule,
            rank,
            value,
            limit: MAX_SCHEDULE_VALUE,
        })
    }
}

fn sample_optional(
    schedule: &'static str,
    f: Option<&ScheduleFn>,
    rank: u32,
) -> Result<f64, SimError> {
    f.map_or(Ok(0.0), |f| sample(schedule, f, rank))
}

impl Population {
    /// Build participants from the per-rank schedules. Household `i` and
    /// firm `j` read their bounds at rank `i + 1` / `j + 1`; every quote
    /// starts at the initial level.
    pub fn from_schedules(config: &SimConfig, schedules: &Schedules) -> Result<Self, SimError> {
        let start_price = to_price(config.initial_price);
        let start_wage = to_price(config.initial_wage);
        let cash = config.budget.unwrap_or(BudgetConfig {
            household_cash: 0,
            firm_cash: 0,
        });

        let households = (0..config.households)
            .map(|i| {
                let rank = i + 1;
                let max_price = sample("price_demand", &schedules.price_demand, rank)?;
                let min_real_wage =
                    sample_optional("wage_supply", schedules.wage_supply.as_ref(), rank)?;
                Ok(Household::new(
                    HouseholdId::new(i),
                    Quote::demand(to_price(max_price), start_price),
                    Quote::supply(
                        worker_floor(min_real_wage, config.initial_price),
                        start_wage,
                    ),
                    min_real_wage,
                )
                .with_cash(cash.household_cash))
            })
            .collect::<Result<Vec<_>, SimError>>()?;

        let firms = (0..config.firms)
            .map(|j| {
                let rank = j + 1;
                let min_price = sample("price_supply", &schedules.price_supply, rank)?;
                let max_real_wage =
                    sample_optional("wage_demand", schedules.wage_demand.as_ref(), rank)?;
                Ok(Firm::new(
                    FirmId::new(j),
                    Quote::supply(to_price(min_price), start_price),
                    Quote::demand(
                        employer_ceiling(max_real_wage, config.initial_price),
                        start_wage,
                    ),
                    max_real_wage,
                )
                .with_cash(cash.firm_cash))
            })
            .collect::<Result<Vec<_>, SimError>>()?;

        Ok(Self { households, firms })
    }

    pub fn household(&self, id: HouseholdId) -> Option<&Household> {
        self.households.get(id.0 as usize)
    }

    pub fn firm(&self, id: FirmId) -> Option<&Firm> {
        self.firms.get(id.0 as usize)
    }

    /// Disjoint mutable access to both members of a pairing.
    pub fn pair_mut(&mut self, (h, f): Pairing) -> Option<(&mut Household, &mut Firm)> {
        let household = self.households.get_mut(h.0 as usize)?;
        let firm = self.firms.get_mut(f.0 as usize)?;
        Some((household, firm))
    }

    pub fn household_ids(&self) -> Vec<HouseholdId> {
        self.households.iter().map(|h| h.id).collect()
    }

    pub fn firm_ids(&self) -> Vec<FirmId> {
        self.firms.iter().map(|f| f.id).collect()
    }

    pub fn total_cash(&self) -> Price {
        let household_cash: Price = self.households.iter().map(|h| h.cash).sum();
        let firm_cash: Price = self.firms.iter().map(|f| f.cash).sum();
        household_cash + firm_cash
    }
}
