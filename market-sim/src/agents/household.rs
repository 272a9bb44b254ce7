use crate::market::Quote;
use crate::types::{HouseholdId, Price};

/// A household buys goods and sells labor.
#[derive(Debug, Clone)]
pub struct Household {
    pub id: HouseholdId,
    /// Goods bid; bound is the price ceiling.
    pub buy: Quote,
    /// Labor ask; bound is the nominal wage floor for the current day.
    pub work: Quote,
    /// Reservation wage in goods units, scaled by the price level each day.
    pub min_real_wage: f64,
    pub cash: Price,
}

impl Household {
    pub fn new(id: HouseholdId, buy: Quote, work: Quote, min_real_wage: f64) -> Self {
        Self {
            id,
            buy,
            work,
            min_real_wage,
            cash: 0,
        }
    }

    pub fn with_cash(mut self, cash: Price) -> Self {
        self.cash = cash;
        self
    }
}
