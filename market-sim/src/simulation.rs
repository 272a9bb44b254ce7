// Simulation run: participants, market levels and the day loop

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::agents::Population;
use crate::config::SimConfig;
use crate::day::{DayContext, MarketDay, run_market_day};
use crate::error::SimError;
use crate::market::cross_product;
use crate::schedule::Schedules;
use crate::types::{Day, Level, MarketKind, Pairing, Price};

/// Aggregate levels carried from one day to the next.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketLevels {
    /// Goods price level; also the reference for scaling real wages.
    pub price: Level,
    pub wage: Level,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub day: Day,
    pub labor: MarketDay,
    pub goods: MarketDay,
}

/// Per-day output series, each of length `days`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationSeries {
    pub price: Vec<Level>,
    pub wage: Vec<Level>,
    pub goods_demand: Vec<u32>,
    pub goods_supply: Vec<u32>,
    pub labor_demand: Vec<u32>,
    pub labor_supply: Vec<u32>,
}

impl SimulationSeries {
    fn with_capacity(days: usize) -> Self {
        Self {
            price: Vec::with_capacity(days),
            wage: Vec::with_capacity(days),
            goods_demand: Vec::with_capacity(days),
            goods_supply: Vec::with_capacity(days),
            labor_demand: Vec::with_capacity(days),
            labor_supply: Vec::with_capacity(days),
        }
    }

    pub fn push(&mut self, summary: &DaySummary) {
        self.price.push(summary.goods.level);
        self.wage.push(summary.labor.level);
        self.goods_demand.push(summary.goods.demand);
        self.goods_supply.push(summary.goods.supply);
        self.labor_demand.push(summary.labor.demand);
        self.labor_supply.push(summary.labor.supply);
    }

    pub fn len(&self) -> usize {
        self.price.len()
    }

    pub fn is_empty(&self) -> bool {
        self.price.is_empty()
    }
}

/// Complete state of one double-auction run.
pub struct Simulation {
    config: SimConfig,
    population: Population,
    pairings: Vec<Pairing>,
    levels: MarketLevels,
    day: Day,
    rng: StdRng,
    series: SimulationSeries,
    initial_cash: Price,
}

impl Simulation {
    /// Validate the run and build both populations. Nothing is simulated yet.
    pub fn new(config: SimConfig, schedules: Schedules) -> Result<Self, SimError> {
        config.validate()?;
        if config.mode.labor_enabled() && !schedules.has_labor() {
            return Err(SimError::MissingWageSchedules { mode: config.mode });
        }

        let population = Population::from_schedules(&config, &schedules)?;
        let pairings = cross_product(&population.household_ids(), &population.firm_ids());
        let levels = MarketLevels {
            price: config.initial_price,
            wage: config.initial_wage,
        };
        let initial_cash = population.total_cash();

        tracing::debug!(
            households = config.households,
            firms = config.firms,
            days = config.days,
            mode = ?config.mode,
            seed = config.seed,
            "simulation created"
        );

        Ok(Self {
            rng: StdRng::seed_from_u64(config.seed),
            series: SimulationSeries::with_capacity(config.days as usize),
            config,
            population,
            pairings,
            levels,
            day: 0,
            initial_cash,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn levels(&self) -> MarketLevels {
        self.levels
    }

    /// Days simulated so far.
    pub fn day(&self) -> Day {
        self.day
    }

    pub fn is_finished(&self) -> bool {
        self.day >= self.config.days
    }

    pub fn series(&self) -> &SimulationSeries {
        &self.series
    }

    pub fn initial_cash(&self) -> Price {
        self.initial_cash
    }

    /// Advance one day: labor clears first against yesterday's price level,
    /// then goods.
    pub fn step(&mut self) -> DaySummary {
        let day = self.day;
        let mode = self.config.mode;
        let budget = self.config.budget.is_some();

        let labor = if mode.labor_enabled() {
            let ctx = DayContext {
                day,
                previous_level: self.levels.wage,
                price_level: self.levels.price,
                budget,
            };
            run_market_day(
                MarketKind::Labor,
                &mut self.population,
                &mut self.pairings,
                ctx,
                &mut self.rng,
            )
        } else {
            MarketDay::closed(MarketKind::Labor, self.levels.wage)
        };
        self.levels.wage = labor.level;

        let goods = if mode.goods_enabled() {
            let ctx = DayContext {
                day,
                previous_level: self.levels.price,
                price_level: self.levels.price,
                budget,
            };
            run_market_day(
                MarketKind::Goods,
                &mut self.population,
                &mut self.pairings,
                ctx,
                &mut self.rng,
            )
        } else {
            MarketDay::closed(MarketKind::Goods, self.levels.price)
        };
        self.levels.price = goods.level;

        let summary = DaySummary { day, labor, goods };
        self.series.push(&summary);
        self.day += 1;

        tracing::debug!(
            day,
            price = self.levels.price,
            wage = self.levels.wage,
            "day complete"
        );
        summary
    }

    /// Simulate the remaining days and return the full series.
    pub fn run(mut self) -> SimulationSeries {
        while !self.is_finished() {
            self.step();
        }
        self.series
    }
}
