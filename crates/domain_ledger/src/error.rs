//! Ledger domain errors

use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::MoneyError;

/// Errors that can occur in the ledger domain
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Entry amount is zero or negative
    #[error("Invalid amount: ledger entries must be positive, got {amount}")]
    InvalidAmount { amount: Decimal },

    /// Entry belongs to a different business
    #[error("Owner mismatch: cash book belongs to {expected}, entry belongs to {got}")]
    OwnerMismatch { expected: String, got: String },

    /// Entry not found
    #[error("Ledger entry not found: {0}")]
    EntryNotFound(String),

    /// Arithmetic failure
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),
}
