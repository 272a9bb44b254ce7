use crate::market::Quote;
use crate::types::{FirmId, Price};

/// A firm sells goods and hires labor.
#[derive(Debug, Clone)]
pub struct Firm {
    pub id: FirmId,
    /// Goods ask; bound is the price floor.
    pub sell: Quote,
    /// Labor bid; bound is the nominal wage ceiling for the current day.
    pub hire: Quote,
    /// Highest wage worth paying, in goods units.
    pub max_real_wage: f64,
    pub cash: Price,
}

impl Firm {
    pub fn new(id: FirmId, sell: Quote, hire: Quote, max_real_wage: f64) -> Self {
        Self {
            id,
            sell,
            hire,
            max_real_wage,
            cash: 0,
        }
    }

    pub fn with_cash(mut self, cash: Price) -> Self {
        self.cash = cash;
        self
    }
}
