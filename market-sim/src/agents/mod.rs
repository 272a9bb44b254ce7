pub mod firm;
pub mod household;
pub mod population;

pub use firm::*;
pub use household::*;
pub use population::*;
