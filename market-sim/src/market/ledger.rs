use std::collections::HashSet;

use crate::types::{FirmId, HouseholdId, MarketKind};

/// Who has already cleared in one market on one day.
///
/// A fresh ledger is created at the start of every market-day and dropped at
/// the end, so "transacted" state never leaks across days.
#[derive(Debug, Clone)]
pub struct DayLedger {
    market: MarketKind,
    households: HashSet<HouseholdId>,
    firms: HashSet<FirmId>,
    trades: u32,
}

impl DayLedger {
    pub fn new(market: MarketKind) -> Self {
        Self {
            market,
            households: HashSet::new(),
            firms: HashSet::new(),
            trades: 0,
        }
    }

    pub fn market(&self) -> MarketKind {
        self.market
    }

    /// Neither side has cleared yet today.
    pub fn is_free(&self, household: HouseholdId, firm: FirmId) -> bool {
        !self.households.contains(&household) && !self.firms.contains(&firm)
    }

    pub fn record(&mut self, household: HouseholdId, firm: FirmId) {
        let fresh_household = self.households.insert(household);
        let fresh_firm = self.firms.insert(firm);
        debug_assert!(fresh_household && fresh_firm, "participant cleared twice");
        self.trades += 1;
    }

    pub fn household_transacted(&self, id: HouseholdId) -> bool {
        self.households.contains(&id)
    }

    pub fn firm_transacted(&self, id: FirmId) -> bool {
        self.firms.contains(&id)
    }

    pub fn trades(&self) -> u32 {
        self.trades
    }
}
