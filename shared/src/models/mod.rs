//! Domain models for the order management platform

mod catalog;
mod order;
mod profit;
mod status;

pub use catalog::*;
pub use order::*;
pub use profit::*;
pub use status::*;
