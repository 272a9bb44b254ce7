pub mod clearing;
pub mod ledger;
pub mod pairing;
pub mod quote;

pub use clearing::*;
pub use ledger::*;
pub use pairing::*;
pub use quote::*;
