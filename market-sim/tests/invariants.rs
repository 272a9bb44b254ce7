use std::collections::HashSet;

use polars::prelude::*;
use tracing::subscriber::with_default;

use market_sim::instrument::{self, DataFrameSubscriber, Recorder};
use market_sim::{BudgetConfig, MarketMode, Schedules, SimConfig, Simulation, SimulationSeries};

fn schedules() -> Schedules {
    Schedules::goods(|r| 40.0 - r as f64, |r| 2.0 + r as f64)
        .with_labor(|r| 2.0 - 0.05 * r as f64, |r| 0.3 + 0.02 * r as f64)
}

fn config(seed: u64) -> SimConfig {
    SimConfig {
        households: 20,
        firms: 15,
        days: 40,
        mode: MarketMode::Both,
        seed,
        ..Default::default()
    }
}

fn recorded_run(config: SimConfig) -> (SimulationSeries, Recorder) {
    instrument::clear();
    let sim = Simulation::new(config, schedules()).unwrap();
    let series = with_default(DataFrameSubscriber, || sim.run());
    (series, instrument::drain())
}

#[test]
fn invariant_each_participant_clears_once_per_market_day() {
    let (_, recorder) = recorded_run(config(1));
    let trades = recorder.table("trade").expect("no trades recorded");

    let days = trades.u64s("day").unwrap();
    let markets = trades.strs("market").unwrap();
    let households = trades.u64s("household_id").unwrap();
    let firms = trades.u64s("firm_id").unwrap();

    let mut seen_households = HashSet::new();
    let mut seen_firms = HashSet::new();
    for i in 0..trades.row_count {
        assert!(
            seen_households.insert((days[i], markets[i].as_str(), households[i])),
            "household {} cleared twice in {} on day {}",
            households[i],
            markets[i],
            days[i]
        );
        assert!(
            seen_firms.insert((days[i], markets[i].as_str(), firms[i])),
            "firm {} cleared twice in {} on day {}",
            firms[i],
            markets[i],
            days[i]
        );
    }
}

#[test]
fn invariant_clearing_price_within_pair_bounds() {
    let (_, recorder) = recorded_run(config(2));
    let trades = recorder.table("trade").unwrap();

    let demand_surplus = trades.i64s("demand_surplus").unwrap();
    let supply_surplus = trades.i64s("supply_surplus").unwrap();
    for (i, (d, s)) in demand_surplus.iter().zip(supply_surplus).enumerate() {
        assert!(*d >= 0, "row {i}: price above the ceiling by {}", -d);
        assert!(*s >= 0, "row {i}: price below the floor by {}", -s);
    }
}

/// Per-day mean clearing value of one market, sorted by day.
fn daily_means(trades: &DataFrame, market: &str) -> (Vec<u64>, Vec<f64>) {
    let means = trades
        .clone()
        .lazy()
        .filter(col("market").eq(lit(market)))
        .group_by([col("day")])
        .agg([col("price").cast(DataType::Float64).mean().alias("mean_price")])
        .sort(["day"], Default::default())
        .collect()
        .unwrap();

    let days = means
        .column("day")
        .unwrap()
        .u64()
        .unwrap()
        .into_no_null_iter()
        .collect();
    let values = means
        .column("mean_price")
        .unwrap()
        .f64()
        .unwrap()
        .into_no_null_iter()
        .collect();
    (days, values)
}

fn assert_level_follows_trades(trades: &DataFrame, market: &str, series: &[f64], initial: f64) {
    let (days, means) = daily_means(trades, market);
    assert!(!days.is_empty(), "no {market} trades recorded");

    let mut previous = initial;
    for (day, level) in series.iter().enumerate() {
        match days.iter().position(|&d| d == day as u64) {
            Some(i) => assert!(
                (level - means[i]).abs() < 1e-9,
                "{market} day {day}: level {level} != mean {}",
                means[i]
            ),
            None => assert_eq!(*level, previous, "{market} day {day}: no trade but level moved"),
        }
        previous = *level;
    }
}

#[test]
fn invariant_level_is_mean_of_clearings_or_carried() {
    let config = config(3);
    let (initial_price, initial_wage) = (config.initial_price, config.initial_wage);
    let (series, recorder) = recorded_run(config);

    let trades = recorder.table("trade").unwrap().to_dataframe().unwrap();
    assert_level_follows_trades(&trades, "goods", &series.price, initial_price);
    assert_level_follows_trades(&trades, "labor", &series.wage, initial_wage);
}

#[test]
fn invariant_wage_carried_when_no_hire_is_possible() {
    // Every worker floor (1.0 * p + 1) sits above every employer ceiling
    // (0.5 * p).
    let schedules = Schedules::goods(|r| 40.0 - r as f64, |r| 2.0 + r as f64)
        .with_labor(|_| 0.5, |_| 1.0);
    let config = SimConfig {
        households: 6,
        firms: 6,
        days: 12,
        mode: MarketMode::LaborOnly,
        initial_wage: 7.5,
        ..Default::default()
    };

    instrument::clear();
    let sim = Simulation::new(config, schedules).unwrap();
    let series = with_default(DataFrameSubscriber, || sim.run());
    let recorder = instrument::drain();

    assert_eq!(series.wage, vec![7.5; 12]);
    assert!(recorder.table("trade").is_none());
    let market_days = recorder.table("market_day").unwrap();
    assert!(market_days.u64s("trades").unwrap().iter().all(|&n| n == 0));
}

#[test]
fn invariant_market_day_events_match_series() {
    let (series, recorder) = recorded_run(config(4));
    let market_days = recorder.table("market_day").unwrap();

    // One row per market per day.
    assert_eq!(market_days.row_count, 2 * series.len());

    let markets = market_days.strs("market").unwrap();
    let levels = market_days.f64s("level").unwrap();
    let demand = market_days.u64s("demand").unwrap();

    let goods_levels: Vec<f64> = (0..market_days.row_count)
        .filter(|&i| markets[i] == "goods")
        .map(|i| levels[i])
        .collect();
    let labor_demand: Vec<u32> = (0..market_days.row_count)
        .filter(|&i| markets[i] == "labor")
        .map(|i| demand[i] as u32)
        .collect();

    assert_eq!(goods_levels, series.price);
    assert_eq!(labor_demand, series.labor_demand);
}

#[test]
fn invariant_cash_conserved_with_budgets() {
    let config = SimConfig {
        budget: Some(BudgetConfig {
            household_cash: 30,
            firm_cash: 200,
        }),
        ..config(5)
    };
    let mut sim = Simulation::new(config, schedules()).unwrap();
    let initial = sim.initial_cash();
    assert_eq!(initial, 20 * 30 + 15 * 200);

    while !sim.is_finished() {
        sim.step();
        let population = sim.population();
        assert_eq!(
            population.total_cash(),
            initial,
            "cash drifted on day {}",
            sim.day()
        );
        assert!(population.households.iter().all(|h| h.cash >= 0));
        assert!(population.firms.iter().all(|f| f.cash >= 0));
    }
}

#[test]
fn invariant_counts_bounded_by_population() {
    let (series, _) = recorded_run(config(6));
    assert!(series.goods_demand.iter().all(|&n| n <= 20));
    assert!(series.goods_supply.iter().all(|&n| n <= 15));
    assert!(series.labor_demand.iter().all(|&n| n <= 15));
    assert!(series.labor_supply.iter().all(|&n| n <= 20));
}
