// Core ID types and type aliases

use serde::{Deserialize, Serialize};

// === TYPE ALIASES ===

/// Quotes, bounds and clearing values are whole price units.
pub type Price = i64;

/// Aggregate price or wage level (mean of a day's clearing values).
pub type Level = f64;

pub type Day = u32;

// === NEWTYPE IDS ===

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct HouseholdId(pub u32);

impl HouseholdId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct FirmId(pub u32);

impl FirmId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

/// Candidate match between one household and one firm.
pub type Pairing = (HouseholdId, FirmId);

// === MARKETS ===

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketKind {
    Goods,
    Labor,
}

impl MarketKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Goods => "goods",
            Self::Labor => "labor",
        }
    }
}

/// Truncate a real-valued schedule or scaled bound toward zero.
pub fn to_price(value: f64) -> Price {
    value.trunc() as Price
}
