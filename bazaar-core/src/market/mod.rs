pub mod adjustment;
pub mod day;
pub mod negotiation;

pub use adjustment::*;
pub use day::*;
pub use negotiation::*;
