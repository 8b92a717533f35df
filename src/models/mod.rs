pub mod request;
pub mod selectors;
pub mod timeseries;

pub use request::*;
pub use selectors::*;
pub use timeseries::*;
