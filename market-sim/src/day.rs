//! One simulated day of one market.
//!
//! Sequence per market-day:
//! 1. (labor) rescale nominal wage bounds by the price level
//! 2. shuffle the candidate pairings
//! 3. attempt every pairing in order, each participant clearing at most once
//! 4. new level = mean clearing value, or the previous level if nothing cleared
//! 5. unmatched participants concede one unit; matched ones are left alone
//! 6. count willing demand/supply at the new level

use std::collections::HashSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::agents::Population;
use crate::labor::{clear_labor_pair, rebase_wage_bounds};
use crate::market::{DayLedger, MatchOutcome, clear_goods_pair, shuffle_pairings};
use crate::types::{Day, Level, MarketKind, Pairing, Price};

/// Aggregate result of one market on one day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketDay {
    pub market: MarketKind,
    pub level: Level,
    pub demand: u32,
    pub supply: u32,
    pub trades: u32,
}

impl MarketDay {
    /// A closed market keeps its level and reports no activity.
    pub fn closed(market: MarketKind, level: Level) -> Self {
        Self {
            market,
            level,
            demand: 0,
            supply: 0,
            trades: 0,
        }
    }
}

/// Inputs shared by both markets for one day.
#[derive(Debug, Clone, Copy)]
pub struct DayContext {
    pub day: Day,
    /// Previous level of the market being cleared.
    pub previous_level: Level,
    /// Price level used to scale real wages (labor only).
    pub price_level: Level,
    pub budget: bool,
}

/// Mean of the day's clearing values.
pub fn mean_level(values: &[Price]) -> Option<Level> {
    if values.is_empty() {
        return None;
    }
    let total: f64 = values.iter().map(|&v| v as f64).sum();
    Some(total / values.len() as f64)
}

pub fn run_market_day<R: Rng + ?Sized>(
    market: MarketKind,
    population: &mut Population,
    pairings: &mut [Pairing],
    ctx: DayContext,
    rng: &mut R,
) -> MarketDay {
    if market == MarketKind::Labor {
        rebase_wage_bounds(population, ctx.price_level);
    }

    shuffle_pairings(pairings, rng);

    let mut ledger = DayLedger::new(market);
    let mut cleared = Vec::new();

    for &pair in pairings.iter() {
        let Some((household, firm)) = population.pair_mut(pair) else {
            continue;
        };
        let outcome = match market {
            MarketKind::Goods => clear_goods_pair(household, firm, &mut ledger, ctx.budget),
            MarketKind::Labor => clear_labor_pair(household, firm, &mut ledger, ctx.budget),
        };

        if let MatchOutcome::Cleared(clearing) = outcome {
            #[cfg(feature = "instrument")]
            tracing::info!(
                target: "trade",
                day = ctx.day,
                market = market.as_str(),
                household_id = pair.0.0,
                firm_id = pair.1.0,
                price = clearing.price,
                demand_surplus = clearing.demand_surplus,
                supply_surplus = clearing.supply_surplus,
            );
            cleared.push(clearing.price);
        }
    }

    let level = mean_level(&cleared).unwrap_or(ctx.previous_level);
    concede_unmatched(market, population, pairings, &ledger);
    let (demand, supply) = count_willing(market, population, level);

    let result = MarketDay {
        market,
        level,
        demand,
        supply,
        trades: ledger.trades(),
    };

    #[cfg(feature = "instrument")]
    tracing::info!(
        target: "market_day",
        day = ctx.day,
        market = market.as_str(),
        level = result.level,
        demand = result.demand,
        supply = result.supply,
        trades = result.trades,
    );
    tracing::debug!(
        day = ctx.day,
        market = market.as_str(),
        level,
        trades = result.trades,
        "market day cleared"
    );

    result
}

/// Walk the pairings and visit each participant once by id. Anyone who did
/// not clear today moves one unit toward the other side.
fn concede_unmatched(
    market: MarketKind,
    population: &mut Population,
    pairings: &[Pairing],
    ledger: &DayLedger,
) {
    let mut seen_households = HashSet::new();
    let mut seen_firms = HashSet::new();

    for &(h, f) in pairings {
        if seen_households.insert(h) && !ledger.household_transacted(h) {
            if let Some(household) = population.households.get_mut(h.0 as usize) {
                match market {
                    MarketKind::Goods => household.buy.concede(),
                    MarketKind::Labor => household.work.concede(),
                }
            }
        }
        if seen_firms.insert(f) && !ledger.firm_transacted(f) {
            if let Some(firm) = population.firms.get_mut(f.0 as usize) {
                match market {
                    MarketKind::Goods => firm.sell.concede(),
                    MarketKind::Labor => firm.hire.concede(),
                }
            }
        }
    }
}

/// (demand, supply) participants willing to trade at `level`.
fn count_willing(market: MarketKind, population: &Population, level: Level) -> (u32, u32) {
    let households = &population.households;
    let firms = &population.firms;
    match market {
        MarketKind::Goods => (
            households.iter().filter(|h| h.buy.accepts(level)).count() as u32,
            firms.iter().filter(|f| f.sell.accepts(level)).count() as u32,
        ),
        MarketKind::Labor => (
            firms.iter().filter(|f| f.hire.accepts(level)).count() as u32,
            households.iter().filter(|h| h.work.accepts(level)).count() as u32,
        ),
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::agents::{Firm, Household};
    use crate::market::{Quote, cross_product};
    use crate::types::{FirmId, HouseholdId};

    fn goods_population(bids: &[(Price, Price)], asks: &[(Price, Price)]) -> Population {
        Population {
            households: bids
                .iter()
                .enumerate()
                .map(|(i, &(ceiling, current))| {
                    Household::new(
                        HouseholdId(i as u32),
                        Quote::demand(ceiling, current),
                        Quote::supply(1, 1),
                        0.0,
                    )
                })
                .collect(),
            firms: asks
                .iter()
                .enumerate()
                .map(|(j, &(floor, current))| {
                    Firm::new(
                        FirmId(j as u32),
                        Quote::supply(floor, current),
                        Quote::demand(0, 0),
                        0.0,
                    )
                })
                .collect(),
        }
    }

    fn ctx(previous_level: Level) -> DayContext {
        DayContext {
            day: 0,
            previous_level,
            price_level: previous_level,
            budget: false,
        }
    }

    fn run_goods(population: &mut Population, previous_level: Level, seed: u64) -> MarketDay {
        let mut pairings = cross_product(&population.household_ids(), &population.firm_ids());
        let mut rng = StdRng::seed_from_u64(seed);
        run_market_day(
            MarketKind::Goods,
            population,
            &mut pairings,
            ctx(previous_level),
            &mut rng,
        )
    }

    #[test]
    fn mean_level_of_clearings() {
        assert_eq!(mean_level(&[]), None);
        assert_eq!(mean_level(&[4, 6]), Some(5.0));
        assert_eq!(mean_level(&[5, 6, 6]), Some(17.0 / 3.0));
    }

    #[test]
    fn single_pair_clears_and_is_not_nudged_again() {
        let mut population = goods_population(&[(10, 10)], &[(5, 5)]);
        let day = run_goods(&mut population, 7.0, 1);

        assert_eq!(day.trades, 1);
        assert_eq!(day.level, 5.0);
        assert_eq!(population.households[0].buy.current, 9);
        assert_eq!(population.firms[0].sell.current, 6);
        // At level 5: the household's ceiling 10 admits it, the firm's floor 5 too.
        assert_eq!((day.demand, day.supply), (1, 1));
    }

    #[test]
    fn no_trade_carries_level_and_concedes() {
        let mut population = goods_population(&[(4, 2)], &[(5, 7)]);
        let day = run_goods(&mut population, 7.0, 1);

        assert_eq!(day.trades, 0);
        assert_eq!(day.level, 7.0);
        assert_eq!(population.households[0].buy.current, 3);
        assert_eq!(population.firms[0].sell.current, 6);
        assert!(population.households[0].buy.current <= population.households[0].buy.bound);
        assert!(population.firms[0].sell.current >= population.firms[0].sell.bound);
        // Level 7 is above the ceiling of 4, and above the floor of 5.
        assert_eq!((day.demand, day.supply), (0, 1));
    }

    #[test]
    fn each_participant_clears_at_most_once() {
        // Three eager buyers, one seller: exactly one trade.
        let mut population = goods_population(&[(20, 20), (20, 20), (20, 20)], &[(1, 1)]);
        let day = run_goods(&mut population, 10.0, 3);

        assert_eq!(day.trades, 1);
        let tightened = population
            .households
            .iter()
            .filter(|h| h.buy.current == 19)
            .count();
        // The buyer that traded tightened; the other two conceded past their
        // ceiling and will be clamped on the next attempt.
        assert_eq!(tightened, 1);
        let conceded = population
            .households
            .iter()
            .filter(|h| h.buy.current == 21)
            .count();
        assert_eq!(conceded, 2);
        assert_eq!(population.firms[0].sell.current, 2);
    }

    fn labor_population(min_real_wage: f64, max_real_wage: f64) -> Population {
        Population {
            households: vec![Household::new(
                HouseholdId(0),
                Quote::demand(0, 0),
                Quote::supply(0, 5),
                min_real_wage,
            )],
            firms: vec![Firm::new(
                FirmId(0),
                Quote::supply(0, 0),
                Quote::demand(0, 5),
                max_real_wage,
            )],
        }
    }

    fn labor_ctx() -> DayContext {
        DayContext {
            day: 0,
            previous_level: 5.0,
            price_level: 10.0,
            budget: false,
        }
    }

    #[test]
    fn labor_day_rebases_bounds_and_hires_on_overlap() {
        let mut population = labor_population(0.5, 2.0);
        let mut pairings = cross_product(&population.household_ids(), &population.firm_ids());
        let mut rng = StdRng::seed_from_u64(9);

        let day = run_market_day(
            MarketKind::Labor,
            &mut population,
            &mut pairings,
            labor_ctx(),
            &mut rng,
        );

        // Floor 0.5 * 10 + 1 = 6, ceiling 2 * 10 = 20. The ask clamps up to 6;
        // the bid of 5 does not matter once the bounds overlap.
        assert_eq!(population.households[0].work.bound, 6);
        assert_eq!(population.firms[0].hire.bound, 20);
        assert_eq!(day.trades, 1);
        assert_eq!(day.level, 6.0);
        assert_eq!(population.households[0].work.current, 7);
        assert_eq!(population.firms[0].hire.current, 4);

        let day = run_market_day(
            MarketKind::Labor,
            &mut population,
            &mut pairings,
            labor_ctx(),
            &mut rng,
        );
        assert_eq!(day.trades, 1);
        assert_eq!(day.level, 7.0);
    }

    #[test]
    fn labor_day_without_overlap_carries_wage() {
        // Floor 3 * 10 + 1 = 31 above ceiling 20.
        let mut population = labor_population(3.0, 2.0);
        let mut pairings = cross_product(&population.household_ids(), &population.firm_ids());
        let mut rng = StdRng::seed_from_u64(9);

        for round in 0..3 {
            let day = run_market_day(
                MarketKind::Labor,
                &mut population,
                &mut pairings,
                labor_ctx(),
                &mut rng,
            );
            assert_eq!(day.trades, 0);
            assert_eq!(day.level, 5.0);
            // The ask is clamped to 31 and drops back to 30 each day; the
            // bid sits inside its ceiling and keeps rising.
            assert_eq!(population.households[0].work.current, 30);
            assert_eq!(population.firms[0].hire.current, 6 + round);
        }
    }
}
