//! Business logic services for the order management platform

pub mod order;
pub mod reporting;

pub use order::OrderService;
pub use reporting::ReportingService;
