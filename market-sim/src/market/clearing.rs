use crate::agents::{Firm, Household};
use crate::types::{MarketKind, Price};

use super::ledger::DayLedger;
use super::quote::Quote;

// === BILATERAL CLEARING ===

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Clearing {
    pub price: Price,
    /// Ceiling minus price.
    pub demand_surplus: Price,
    /// Price minus floor.
    pub supply_surplus: Price,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NoTrade {
    /// One side already cleared today.
    AlreadyTransacted,
    /// Ask above bid after clamping.
    NoOverlap,
    /// The paying side cannot cover the price.
    InsufficientCash,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MatchOutcome {
    Cleared(Clearing),
    NoTrade(NoTrade),
}

impl MatchOutcome {
    pub fn clearing(self) -> Option<Clearing> {
        match self {
            Self::Cleared(c) => Some(c),
            Self::NoTrade(_) => None,
        }
    }
}

/// Per-attempt conditions that live outside the two quotes.
#[derive(Clone, Copy, Debug, Default)]
pub struct Eligibility {
    pub already_transacted: bool,
    /// Cash available to the paying (demand) side, when budgets apply.
    pub cash_limit: Option<Price>,
}

/// Attempt one bilateral trade.
///
/// Both quotes are clamped into their bounds first, whatever the outcome.
/// The pair clears at the ask when it does not exceed the bid; both sides
/// then record their surplus and tighten by one unit.
pub fn clear_pair(demand: &mut Quote, supply: &mut Quote, eligibility: Eligibility) -> MatchOutcome {
    demand.clamp();
    supply.clamp();

    if eligibility.already_transacted {
        return MatchOutcome::NoTrade(NoTrade::AlreadyTransacted);
    }
    if supply.current > demand.current {
        return MatchOutcome::NoTrade(NoTrade::NoOverlap);
    }

    let price = supply.current;
    if eligibility.cash_limit.is_some_and(|cash| cash < price) {
        return MatchOutcome::NoTrade(NoTrade::InsufficientCash);
    }

    MatchOutcome::Cleared(settle(demand, supply, price))
}

/// Record both surpluses at `price` and tighten both quotes.
pub(crate) fn settle(demand: &mut Quote, supply: &mut Quote, price: Price) -> Clearing {
    let clearing = Clearing {
        price,
        demand_surplus: demand.bound - price,
        supply_surplus: price - supply.bound,
    };
    demand.surplus = clearing.demand_surplus;
    supply.surplus = clearing.supply_surplus;
    demand.tighten();
    supply.tighten();
    clearing
}

// === GOODS MARKET ===

/// Household buys from firm. Records both sides in the ledger and moves
/// cash when the pair clears.
pub fn clear_goods_pair(
    household: &mut Household,
    firm: &mut Firm,
    ledger: &mut DayLedger,
    budget: bool,
) -> MatchOutcome {
    debug_assert_eq!(ledger.market(), MarketKind::Goods);
    let eligibility = Eligibility {
        already_transacted: !ledger.is_free(household.id, firm.id),
        cash_limit: budget.then_some(household.cash),
    };

    let outcome = clear_pair(&mut household.buy, &mut firm.sell, eligibility);
    if let MatchOutcome::Cleared(clearing) = outcome {
        ledger.record(household.id, firm.id);
        if budget {
            household.cash -= clearing.price;
            firm.cash += clearing.price;
        }
    }
    outcome
}
