//! Loan Aggregate Root
//!
//! The Loan aggregate is the consistency boundary for a single credit:
//! its fixed flat-rate schedule, its repayments, and its lifecycle
//! status.
//!
//! # Invariants
//!
//! - `total_due = principal + principal * rate / 100` is fixed at
//!   origination and never recalculated retroactively
//! - `total_paid` is a cache of `Σ payments.amount_paid`, refreshed
//!   inside the same write that appends a payment
//! - The loan closes automatically once `total_paid` comes within the
//!   rounding tolerance of `total_due`

use chrono::{DateTime, Days, Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{BorrowerId, BusinessId, LoanId, Money, Rate};

use crate::error::LendingError;
use crate::payment::Payment;

/// Rounding slack allowed when deciding a loan is fully repaid
const CLOSE_TOLERANCE: Decimal = dec!(0.1);

/// Loan lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    /// Drafted, not yet submitted for review
    Pending,
    /// Submitted for approval
    Submitted,
    /// Approved, awaiting disbursement
    Approved,
    /// Disbursed and collecting repayments
    Active,
    /// Fully repaid
    Closed,
    /// Written off as unrecoverable
    Defaulted,
    /// Turned down at review
    Rejected,
    /// Withdrawn before disbursement
    Cancelled,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Pending => "pending",
            LoanStatus::Submitted => "submitted",
            LoanStatus::Approved => "approved",
            LoanStatus::Active => "active",
            LoanStatus::Closed => "closed",
            LoanStatus::Defaulted => "defaulted",
            LoanStatus::Rejected => "rejected",
            LoanStatus::Cancelled => "cancelled",
        }
    }

    /// True for states with no outgoing edges in the lifecycle
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LoanStatus::Closed
                | LoanStatus::Defaulted
                | LoanStatus::Rejected
                | LoanStatus::Cancelled
        )
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Unit the loan term is counted in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermUnit {
    Days,
    Weeks,
    #[default]
    Months,
    Years,
}

impl TermUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            TermUnit::Days => "days",
            TermUnit::Weeks => "weeks",
            TermUnit::Months => "months",
            TermUnit::Years => "years",
        }
    }

    /// Advances a date by `count` of this unit
    pub fn add_to(&self, date: NaiveDate, count: u32) -> NaiveDate {
        let advanced = match self {
            TermUnit::Days => date.checked_add_days(Days::new(count as u64)),
            TermUnit::Weeks => date.checked_add_days(Days::new(count as u64 * 7)),
            TermUnit::Months => date.checked_add_months(Months::new(count)),
            TermUnit::Years => date.checked_add_months(Months::new(count * 12)),
        };
        advanced.expect("Date overflow computing loan due date")
    }
}

impl fmt::Display for TermUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A loan and its repayments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loan {
    /// Unique identifier
    pub id: LoanId,
    /// Business that owns the loan
    pub business: BusinessId,
    /// Borrower the loan was issued to
    pub borrower: BorrowerId,
    /// Amount lent, excluding interest
    pub principal: Money,
    /// Flat interest rate in percent over the full term
    pub interest_rate: Rate,
    /// Term length, counted in `term_unit` periods; the field name
    /// follows the storage column, months being the default unit
    pub term_months: u32,
    /// Unit the term is counted in
    pub term_unit: TermUnit,
    /// When the term starts
    pub start_date: NaiveDate,
    /// Lifecycle status
    pub status: LoanStatus,
    /// What the borrower needs the money for
    pub purpose: Option<String>,
    /// Cached `Σ payments.amount_paid`, refreshed on every payment write
    pub total_paid: Money,
    /// Repayments received, oldest first
    pub payments: Vec<Payment>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Loan {
    /// Originates a new pending loan
    ///
    /// # Errors
    ///
    /// Returns [`LendingError::Validation`] if the principal is
    /// negative, the rate is outside 0..=100 percent, or the term is
    /// zero.
    pub fn originate(
        business: BusinessId,
        borrower: BorrowerId,
        principal: Money,
        interest_rate: Rate,
        term_months: u32,
        term_unit: TermUnit,
        start_date: NaiveDate,
    ) -> Result<Self, LendingError> {
        if principal.is_negative() {
            return Err(LendingError::validation(format!(
                "Principal must not be negative, got {}",
                principal
            )));
        }
        let percentage = interest_rate.as_percentage();
        if percentage < Decimal::ZERO || percentage > dec!(100) {
            return Err(LendingError::validation(format!(
                "Interest rate must be within 0..=100 percent, got {}",
                percentage
            )));
        }
        if term_months == 0 {
            return Err(LendingError::validation(
                "Term must be at least one period",
            ));
        }

        let now = Utc::now();
        Ok(Self {
            id: LoanId::new_v7(),
            business,
            borrower,
            principal,
            interest_rate,
            term_months,
            term_unit,
            start_date,
            status: LoanStatus::Pending,
            purpose: None,
            total_paid: Money::ZERO,
            payments: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Sets the loan purpose
    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = Some(purpose.into());
        self
    }

    /// Interest owed over the full term: `principal * rate / 100`
    ///
    /// Derived from fields fixed at origination, so the schedule never
    /// shifts after the fact.
    pub fn expected_interest(&self) -> Money {
        self.interest_rate.apply(&self.principal)
    }

    /// Everything the borrower owes: principal plus flat interest
    pub fn total_due(&self) -> Money {
        self.principal + self.expected_interest()
    }

    /// What remains to be collected, floored at zero
    pub fn outstanding(&self) -> Money {
        (self.total_due() - self.total_paid).floor_zero()
    }

    /// The day the full amount falls due
    pub fn due_date(&self) -> NaiveDate {
        self.term_unit.add_to(self.start_date, self.term_months)
    }

    /// Sum of principal portions over settled payments
    pub fn paid_principal(&self) -> Money {
        self.payments
            .iter()
            .filter(|p| p.is_paid())
            .map(|p| p.principal_portion)
            .sum()
    }

    /// Sum of interest portions over settled payments
    pub fn paid_interest(&self) -> Money {
        self.payments
            .iter()
            .filter(|p| p.is_paid())
            .map(|p| p.interest_portion)
            .sum()
    }

    /// Appends a repayment, refreshes the `total_paid` cache, and closes
    /// the loan when the balance is settled
    ///
    /// Returns true if this payment closed the loan. The close check
    /// allows [`CLOSE_TOLERANCE`] of rounding slack below `total_due`.
    pub fn apply_payment(&mut self, payment: Payment) -> bool {
        self.payments.push(payment);
        self.recompute_total_paid();
        self.updated_at = Utc::now();

        let settled_threshold = self.total_due() - Money::new(CLOSE_TOLERANCE);
        if self.total_paid >= settled_threshold && self.status != LoanStatus::Closed {
            self.status = LoanStatus::Closed;
            return true;
        }
        false
    }

    /// Refreshes the cached `total_paid` from the payment records
    pub fn recompute_total_paid(&mut self) {
        self.total_paid = self.payments.iter().map(|p| p.amount_paid).sum();
    }

    /// Sets the status without any edge checks; lifecycle rules live in
    /// the workflow engine
    pub(crate) fn force_status(&mut self, status: LoanStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}
