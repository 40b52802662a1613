//! Metrics domain errors

use thiserror::Error;

/// Errors raised when assembling a metrics snapshot
///
/// Read-side aggregation never fails on missing data; an empty
/// portfolio reports zeros. The only hard failure is feeding the
/// engine data that belongs to someone else.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetricsError {
    #[error("Loan {loan} belongs to business {got}, metrics run for {expected}")]
    OwnerMismatch {
        loan: String,
        expected: String,
        got: String,
    },
}
