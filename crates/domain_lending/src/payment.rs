//! Repayment records
//!
//! This module defines the payment record created once per repayment
//! event, carrying the proportional principal/interest split.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{LoanId, Money, PaymentId};

/// How the borrower paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash over the counter
    #[default]
    Cash,
    /// Bank transfer
    BankTransfer,
    /// Mobile money wallet
    MobileMoney,
    /// Cheque
    Cheque,
    /// Anything else
    Other,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::MobileMoney => "mobile_money",
            PaymentMethod::Cheque => "cheque",
            PaymentMethod::Other => "other",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Settled; the normal state for recorded repayments
    Paid,
    /// Awaiting confirmation
    Pending,
    /// Did not go through
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "paid",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Collection details captured when a repayment is recorded
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentMetadata {
    /// How the borrower paid
    pub method: PaymentMethod,
    /// External reference (bank ref, mobile money code)
    pub transaction_reference: Option<String>,
    /// Free-text notes
    pub notes: Option<String>,
}

impl PaymentMetadata {
    pub fn with_method(method: PaymentMethod) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.transaction_reference = Some(reference.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// A repayment received against a loan
///
/// Created exactly once per repayment event. Immutable after creation
/// except through the historical backfill, which rewrites the principal
/// and interest portions of rows recorded before the proportional split
/// existed.
///
/// # Invariants
///
/// - `principal_portion + interest_portion == amount_paid` to the cent
/// - Fee and penalty portions are always zero under the flat-rate model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier
    pub id: PaymentId,
    /// Loan this repayment belongs to
    pub loan_id: LoanId,
    /// Amount received
    pub amount_paid: Money,
    /// Share applied to principal
    pub principal_portion: Money,
    /// Share applied to interest
    pub interest_portion: Money,
    /// Fees collected (always zero, kept for wire compatibility)
    pub fee_portion: Money,
    /// Penalties collected (always zero, kept for wire compatibility)
    pub penalty_portion: Money,
    /// Calendar day the borrower paid
    pub paid_date: NaiveDate,
    /// Status
    pub status: PaymentStatus,
    /// How the borrower paid
    pub method: PaymentMethod,
    /// External reference
    pub transaction_reference: Option<String>,
    /// Free-text notes
    pub notes: Option<String>,
    /// When the record was created
    pub recorded_at: DateTime<Utc>,
}

impl Payment {
    /// Creates a settled payment record with the given split
    pub fn settled(
        loan_id: LoanId,
        amount_paid: Money,
        principal_portion: Money,
        interest_portion: Money,
        paid_date: NaiveDate,
        metadata: PaymentMetadata,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: PaymentId::new_v7(),
            loan_id,
            amount_paid,
            principal_portion,
            interest_portion,
            fee_portion: Money::ZERO,
            penalty_portion: Money::ZERO,
            paid_date,
            status: PaymentStatus::Paid,
            method: metadata.method,
            transaction_reference: metadata.transaction_reference,
            notes: metadata.notes,
            recorded_at,
        }
    }

    /// True if the payment counts toward collections
    pub fn is_paid(&self) -> bool {
        self.status == PaymentStatus::Paid
    }
}
