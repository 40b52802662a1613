//! Metrics Domain
//!
//! Read-side aggregation over the loan book and cash book: the
//! dashboard summary, the daily interest trend, and a reconciliation
//! pass that cross-checks the two balance decompositions.
//!
//! Everything here is pure; the engine works over a snapshot the
//! caller assembled and never touches storage itself.

pub mod engine;
pub mod error;
pub mod summary;
pub mod trend;

pub use engine::{MetricsEngine, ReconciliationReport, DEFAULT_TREND_DAYS};
pub use error::MetricsError;
pub use summary::PortfolioSummary;
pub use trend::{daily_interest, TrendPoint};
