//! Ledger entry types
//!
//! This module defines the structure of cash movements in the
//! append-only ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{BusinessId, EntryId, LoanId, Money};

use crate::error::LedgerError;

/// Direction of a cash movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryType {
    /// Cash coming into the business
    Inflow,
    /// Cash leaving the business
    Outflow,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Inflow => "inflow",
            EntryType::Outflow => "outflow",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Business category of a cash movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryCategory {
    /// Owner puts working capital into the business
    CapitalInjection,
    /// Owner takes working capital out of the business
    CapitalWithdrawal,
    /// Loan principal paid out to a borrower
    Disbursement,
    /// Borrower repayment received
    Repayment,
    /// Operating expense
    Expense,
    /// Anything that does not fit the above
    Other,
}

impl EntryCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryCategory::CapitalInjection => "capital_injection",
            EntryCategory::CapitalWithdrawal => "capital_withdrawal",
            EntryCategory::Disbursement => "disbursement",
            EntryCategory::Repayment => "repayment",
            EntryCategory::Expense => "expense",
            EntryCategory::Other => "other",
        }
    }
}

impl fmt::Display for EntryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single cash movement in the ledger
///
/// Entries are append-only: once recorded they are never updated or
/// deleted. Balances are always recomputed from the full entry set
/// rather than cached, so an entry's amount must be strictly positive
/// and its direction carried by [`EntryType`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique entry identifier
    pub id: EntryId,
    /// Business whose cash book this entry belongs to
    pub owner: BusinessId,
    /// Direction of the movement
    pub entry_type: EntryType,
    /// Business category
    pub category: EntryCategory,
    /// Amount moved (always positive)
    pub amount: Money,
    /// When the movement happened
    pub occurred_at: DateTime<Utc>,
    /// Optional free-text description
    pub description: Option<String>,
    /// Loan this movement relates to, for disbursements and repayments
    pub loan_id: Option<LoanId>,
}

impl LedgerEntry {
    /// Creates a new ledger entry
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidAmount`] if the amount is not
    /// strictly positive.
    pub fn new(
        owner: BusinessId,
        entry_type: EntryType,
        category: EntryCategory,
        amount: Money,
        occurred_at: DateTime<Utc>,
    ) -> Result<Self, LedgerError> {
        if !amount.is_positive() {
            return Err(LedgerError::InvalidAmount {
                amount: amount.amount(),
            });
        }

        Ok(Self {
            id: EntryId::new_v7(),
            owner,
            entry_type,
            category,
            amount,
            occurred_at,
            description: None,
            loan_id: None,
        })
    }

    /// Adds a description to the entry
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Links the entry to a loan
    pub fn with_loan(mut self, loan_id: LoanId) -> Self {
        self.loan_id = Some(loan_id);
        self
    }

    /// The amount with its direction applied: positive for inflows,
    /// negative for outflows
    pub fn signed_amount(&self) -> Money {
        match self.entry_type {
            EntryType::Inflow => self.amount,
            EntryType::Outflow => -self.amount,
        }
    }
}

/// Constructors for the cash movements this system records
pub struct CashMovements;

impl CashMovements {
    /// Owner adds working capital
    pub fn capital_injection(
        owner: BusinessId,
        amount: Money,
        occurred_at: DateTime<Utc>,
    ) -> Result<LedgerEntry, LedgerError> {
        LedgerEntry::new(
            owner,
            EntryType::Inflow,
            EntryCategory::CapitalInjection,
            amount,
            occurred_at,
        )
        .map(|e| e.with_description("Working capital added"))
    }

    /// Owner withdraws working capital
    pub fn capital_withdrawal(
        owner: BusinessId,
        amount: Money,
        occurred_at: DateTime<Utc>,
    ) -> Result<LedgerEntry, LedgerError> {
        LedgerEntry::new(
            owner,
            EntryType::Outflow,
            EntryCategory::CapitalWithdrawal,
            amount,
            occurred_at,
        )
        .map(|e| e.with_description("Working capital reduced"))
    }

    /// Loan principal paid out to a borrower
    pub fn disbursement(
        owner: BusinessId,
        loan_id: LoanId,
        amount: Money,
        occurred_at: DateTime<Utc>,
    ) -> Result<LedgerEntry, LedgerError> {
        LedgerEntry::new(
            owner,
            EntryType::Outflow,
            EntryCategory::Disbursement,
            amount,
            occurred_at,
        )
        .map(|e| e.with_loan(loan_id).with_description("Loan disbursement"))
    }

    /// Borrower repayment received
    pub fn repayment(
        owner: BusinessId,
        loan_id: LoanId,
        amount: Money,
        occurred_at: DateTime<Utc>,
    ) -> Result<LedgerEntry, LedgerError> {
        LedgerEntry::new(
            owner,
            EntryType::Inflow,
            EntryCategory::Repayment,
            amount,
            occurred_at,
        )
        .map(|e| e.with_loan(loan_id).with_description("Loan repayment"))
    }

    /// Operating expense paid
    pub fn expense(
        owner: BusinessId,
        amount: Money,
        description: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Result<LedgerEntry, LedgerError> {
        LedgerEntry::new(
            owner,
            EntryType::Outflow,
            EntryCategory::Expense,
            amount,
            occurred_at,
        )
        .map(|e| e.with_description(description))
    }
}
