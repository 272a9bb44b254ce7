use crate::agents::{Firm, Household, Population};
use crate::market::clearing::settle;
use crate::market::{DayLedger, Eligibility, MatchOutcome, NoTrade, Quote};
use crate::types::{Level, MarketKind, Price, to_price};

// === WAGE BOUNDS ===

/// Nominal wage floor for a worker at price level `price_level`:
/// the scaled real reservation wage, truncated, plus one unit.
pub fn worker_floor(min_real_wage: f64, price_level: Level) -> Price {
    to_price(min_real_wage * price_level).saturating_add(1)
}

/// Nominal wage ceiling for an employer, truncated toward zero.
pub fn employer_ceiling(max_real_wage: f64, price_level: Level) -> Price {
    to_price(max_real_wage * price_level)
}

/// Re-derive every nominal wage bound from the current price level.
pub fn rebase_wage_bounds(population: &mut Population, price_level: Level) {
    for household in &mut population.households {
        household.work.bound = worker_floor(household.min_real_wage, price_level);
    }
    for firm in &mut population.firms {
        firm.hire.bound = employer_ceiling(firm.max_real_wage, price_level);
    }
}

// === LABOR MATCHING ===

/// Hire when the worker's floor does not exceed the employer's ceiling.
///
/// Unlike goods, the current quotes do not gate the match; they only set the
/// wage: the worker's clamped ask, capped at the employer's ceiling.
pub fn clear_wage(hire: &mut Quote, work: &mut Quote, eligibility: Eligibility) -> MatchOutcome {
    hire.clamp();
    work.clamp();

    if eligibility.already_transacted {
        return MatchOutcome::NoTrade(NoTrade::AlreadyTransacted);
    }
    if work.bound > hire.bound {
        return MatchOutcome::NoTrade(NoTrade::NoOverlap);
    }

    let wage = work.current.min(hire.bound);
    if eligibility.cash_limit.is_some_and(|cash| cash < wage) {
        return MatchOutcome::NoTrade(NoTrade::InsufficientCash);
    }

    MatchOutcome::Cleared(settle(hire, work, wage))
}

/// Firm hires household, recording both in the ledger and paying the wage
/// when budgets apply.
pub fn clear_labor_pair(
    household: &mut Household,
    firm: &mut Firm,
    ledger: &mut DayLedger,
    budget: bool,
) -> MatchOutcome {
    debug_assert_eq!(ledger.market(), MarketKind::Labor);
    let eligibility = Eligibility {
        already_transacted: !ledger.is_free(household.id, firm.id),
        cash_limit: budget.then_some(firm.cash),
    };

    let outcome = clear_wage(&mut firm.hire, &mut household.work, eligibility);
    if let MatchOutcome::Cleared(clearing) = outcome {
        ledger.record(household.id, firm.id);
        if budget {
            firm.cash -= clearing.price;
            household.cash += clearing.price;
        }
    }
    outcome
}
