use crate::types::{Level, Price};

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum QuoteSide {
    /// Bids; `bound` is a ceiling.
    Demand,
    /// Asks; `bound` is a floor.
    Supply,
}

/// One participant's position on one side of one market.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Quote {
    pub side: QuoteSide,
    pub bound: Price,
    pub current: Price,
    /// Surplus from the most recent clearing.
    pub surplus: Price,
}

impl Quote {
    pub fn demand(ceiling: Price, current: Price) -> Self {
        Self {
            side: QuoteSide::Demand,
            bound: ceiling,
            current,
            surplus: 0,
        }
    }

    pub fn supply(floor: Price, current: Price) -> Self {
        Self {
            side: QuoteSide::Supply,
            bound: floor,
            current,
            surplus: 0,
        }
    }

    /// Pull `current` back inside the bound.
    pub fn clamp(&mut self) {
        self.current = match self.side {
            QuoteSide::Demand => self.current.min(self.bound),
            QuoteSide::Supply => self.current.max(self.bound),
        };
    }

    /// After a clearing: bids drop, asks rise.
    pub fn tighten(&mut self) {
        match self.side {
            QuoteSide::Demand => self.current -= 1,
            QuoteSide::Supply => self.current += 1,
        }
    }

    /// After a day without a trade: bids rise, asks drop. May step past the
    /// bound; the next `clamp` pulls it back.
    pub fn concede(&mut self) {
        match self.side {
            QuoteSide::Demand => self.current += 1,
            QuoteSide::Supply => self.current -= 1,
        }
    }

    /// Whether this participant is willing to trade at `level`.
    pub fn accepts(&self, level: Level) -> bool {
        match self.side {
            QuoteSide::Demand => level <= self.bound as f64,
            QuoteSide::Supply => level >= self.bound as f64,
        }
    }
}
