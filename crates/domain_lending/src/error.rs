//! Lending domain errors

use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::MoneyError;
use domain_ledger::LedgerError;

/// Errors that can occur in the lending domain
#[derive(Debug, Error)]
pub enum LendingError {
    /// Bad input, operation not attempted
    #[error("Validation error: {0}")]
    Validation(String),

    /// Loan not found
    #[error("Loan not found: {0}")]
    LoanNotFound(String),

    /// Payment not found
    #[error("Payment not found: {0}")]
    PaymentNotFound(String),

    /// Payment amount is zero or negative
    #[error("Invalid payment amount: {amount}")]
    InvalidPaymentAmount { amount: Decimal },

    /// The requested lifecycle edge is not allowed
    #[error("Invalid transition: cannot {action} a loan in status {from}")]
    InvalidTransition { from: String, action: String },

    /// Balance check failed at disbursement
    #[error("Insufficient working capital: required {required}, available {available}")]
    InsufficientCapital {
        required: Decimal,
        available: Decimal,
    },

    /// Ledger write failed
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Arithmetic failure
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),
}

impl LendingError {
    pub fn validation(message: impl Into<String>) -> Self {
        LendingError::Validation(message.into())
    }
}
