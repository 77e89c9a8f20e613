pub mod buyer;
pub mod population;
pub mod seller;

pub use buyer::*;
pub use population::*;
pub use seller::*;
