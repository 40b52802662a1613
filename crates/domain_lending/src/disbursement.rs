//! Disbursement records
//!
//! A disbursement documents the payout of a loan's principal. The cash
//! movement itself lives in the ledger; this record carries the payout
//! method and processing state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{DisbursementId, LoanId, Money};

/// Processing state of a payout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisbursementStatus {
    /// Created, cash movement not yet confirmed
    Pending,
    /// Paid out
    Processed,
    /// Payout failed
    Failed,
    /// Payout undone
    Reversed,
}

impl DisbursementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisbursementStatus::Pending => "pending",
            DisbursementStatus::Processed => "processed",
            DisbursementStatus::Failed => "failed",
            DisbursementStatus::Reversed => "reversed",
        }
    }
}

impl fmt::Display for DisbursementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the principal reached the borrower
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisbursementMethod {
    /// Handed over outside any integrated channel
    #[default]
    Manual,
    /// Bank transfer
    BankTransfer,
    /// Mobile money wallet
    MobileMoney,
}

impl DisbursementMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisbursementMethod::Manual => "manual",
            DisbursementMethod::BankTransfer => "bank_transfer",
            DisbursementMethod::MobileMoney => "mobile_money",
        }
    }
}

impl fmt::Display for DisbursementMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A principal payout to a borrower
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Disbursement {
    /// Unique identifier
    pub id: DisbursementId,
    /// Loan being paid out
    pub loan_id: LoanId,
    /// Amount paid out (the loan principal)
    pub amount: Money,
    /// Payout channel
    pub method: DisbursementMethod,
    /// Processing state
    pub status: DisbursementStatus,
    /// External reference for the payout
    pub reference: Option<String>,
    /// When the payout was initiated
    pub disbursed_at: DateTime<Utc>,
    /// When the payout was confirmed
    pub processed_at: Option<DateTime<Utc>>,
}

impl Disbursement {
    /// Creates a pending payout
    pub fn pending(loan_id: LoanId, amount: Money, disbursed_at: DateTime<Utc>) -> Self {
        Self {
            id: DisbursementId::new_v7(),
            loan_id,
            amount,
            method: DisbursementMethod::default(),
            status: DisbursementStatus::Pending,
            reference: None,
            disbursed_at,
            processed_at: None,
        }
    }

    /// Sets the payout channel
    pub fn via(mut self, method: DisbursementMethod) -> Self {
        self.method = method;
        self
    }

    /// Sets the external reference
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Marks the payout confirmed
    pub fn mark_processed(&mut self, at: DateTime<Utc>) {
        self.status = DisbursementStatus::Processed;
        self.processed_at = Some(at);
    }

    /// Marks the payout failed
    pub fn mark_failed(&mut self) {
        self.status = DisbursementStatus::Failed;
    }
}
