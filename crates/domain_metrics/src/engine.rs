//! Portfolio Metrics Engine
//!
//! Pure read-side aggregation over one owner's cash book and loan
//! book. Nothing here persists state: callers assemble a snapshot (the
//! database-backed path reads it inside one repeatable-read
//! transaction) and every figure is derived on demand.
//!
//! Amounts keep full precision internally; rounding to cents happens
//! once, when the [`PortfolioSummary`] is built.

use std::collections::HashSet;

use chrono::{Duration, NaiveDate};

use core_kernel::{DateRange, Money};
use domain_ledger::{CashBook, EntryCategory, EntryType};
use domain_lending::{Loan, LoanStatus};

use crate::error::MetricsError;
use crate::summary::PortfolioSummary;
use crate::trend::{daily_interest, TrendPoint};

/// Days covered by the default profit trend
pub const DEFAULT_TREND_DAYS: u32 = 30;

/// Outflow categories that are not operating expenses
const NON_EXPENSE_OUTFLOWS: [EntryCategory; 2] = [
    EntryCategory::Disbursement,
    EntryCategory::CapitalWithdrawal,
];

/// Both balance decompositions for one owner, and their difference
///
/// A non-zero delta means the loan book and the cash book disagree,
/// usually because payment rows predate the ledger or the allocation
/// backfill has not run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationReport {
    /// Balance rebuilt from working capital and loan-book aggregates
    pub metrics_balance: Money,
    /// Balance summed directly from ledger entries
    pub ledger_balance: Money,
    /// `metrics_balance - ledger_balance`
    pub delta: Money,
    /// Settled payments with no interest portion on interest-bearing loans
    pub unallocated_interest_payments: usize,
}

impl ReconciliationReport {
    /// True when the decompositions agree and no payment needs repair
    pub fn is_consistent(&self) -> bool {
        self.delta.is_zero() && self.unallocated_interest_payments == 0
    }
}

/// Derives portfolio figures for one owner at one instant
pub struct MetricsEngine<'a> {
    book: &'a CashBook,
    loans: &'a [Loan],
    today: NaiveDate,
}

impl<'a> MetricsEngine<'a> {
    /// Builds an engine over one owner's snapshot
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::OwnerMismatch`] if any loan belongs to a
    /// different business than the cash book.
    pub fn new(
        book: &'a CashBook,
        loans: &'a [Loan],
        today: NaiveDate,
    ) -> Result<Self, MetricsError> {
        for loan in loans {
            if loan.business != book.owner() {
                return Err(MetricsError::OwnerMismatch {
                    loan: loan.id.to_string(),
                    expected: book.owner().to_string(),
                    got: loan.business.to_string(),
                });
            }
        }
        Ok(Self { book, loans, today })
    }

    /// The stored base capital figure
    pub fn working_capital(&self) -> Money {
        self.book.working_capital()
    }

    /// Operating outflows: everything going out except disbursements
    /// and capital withdrawals
    pub fn expenses(&self) -> Money {
        self.book.outflow_excluding(&NON_EXPENSE_OUTFLOWS)
    }

    /// Σ principal portions over settled payments
    pub fn principal_collected(&self) -> Money {
        self.loans.iter().map(|loan| loan.paid_principal()).sum()
    }

    /// Σ interest portions over settled payments
    pub fn interest_collected(&self) -> Money {
        self.loans.iter().map(|loan| loan.paid_interest()).sum()
    }

    /// Principal and interest written off on defaulted loans
    ///
    /// Each component is floored at zero per loan, so a defaulted loan
    /// that overpaid one component never offsets losses on another.
    pub fn losses_from_defaults(&self) -> Money {
        self.loans
            .iter()
            .filter(|loan| loan.status == LoanStatus::Defaulted)
            .map(|loan| {
                let principal_lost = (loan.principal - loan.paid_principal()).floor_zero();
                let interest_lost = (loan.expected_interest() - loan.paid_interest()).floor_zero();
                principal_lost + interest_lost
            })
            .sum()
    }

    /// Realized profit: interest collected minus expenses and losses
    ///
    /// Can be negative when expenses or write-offs outrun collections.
    pub fn profit_made(&self) -> Money {
        self.interest_collected() - self.expenses() - self.losses_from_defaults()
    }

    /// Interest still expected from active loans, never negative
    pub fn unrealized_profit(&self) -> Money {
        self.loans
            .iter()
            .filter(|loan| loan.status == LoanStatus::Active)
            .map(|loan| (loan.expected_interest() - loan.paid_interest()).floor_zero())
            .sum()
    }

    /// Σ disbursement outflows
    pub fn total_disbursed(&self) -> Money {
        self.book
            .sum_of(EntryType::Outflow, EntryCategory::Disbursement)
    }

    /// Cash on hand, rebuilt from the loan-book aggregates
    ///
    /// `working_capital - total_disbursed + principal_collected +
    /// interest_collected - expenses`. On consistent data this equals
    /// [`CashBook::current_balance`]; [`MetricsEngine::reconcile`]
    /// reports any drift.
    pub fn current_balance(&self) -> Money {
        self.working_capital() - self.total_disbursed()
            + self.principal_collected()
            + self.interest_collected()
            - self.expenses()
    }

    /// Working capital plus realized profit
    pub fn business_value(&self) -> Money {
        self.working_capital() + self.profit_made()
    }

    /// Distinct borrowers holding at least one loan
    pub fn total_borrowers(&self) -> usize {
        self.loans
            .iter()
            .map(|loan| loan.borrower)
            .collect::<HashSet<_>>()
            .len()
    }

    /// Loans in any status
    pub fn total_loans(&self) -> usize {
        self.loans.len()
    }

    /// Σ outstanding over non-terminal loans
    pub fn total_outstanding(&self) -> Money {
        self.loans
            .iter()
            .filter(|loan| !loan.status.is_terminal())
            .map(|loan| loan.outstanding())
            .sum()
    }

    /// Σ `total_paid` over all loans
    pub fn total_paid(&self) -> Money {
        self.loans.iter().map(|loan| loan.total_paid).sum()
    }

    /// Active loans with a due date in `(today, today + 7]`
    pub fn loans_due_in_next_7_days(&self) -> usize {
        self.loans
            .iter()
            .filter(|loan| loan.status == LoanStatus::Active && self.due_within_week(loan))
            .count()
    }

    /// Σ outstanding over active loans already past due
    pub fn overdue_amount(&self) -> Money {
        self.loans
            .iter()
            .filter(|loan| loan.status == LoanStatus::Active && loan.due_date() < self.today)
            .map(|loan| loan.outstanding())
            .sum()
    }

    /// Σ outstanding over active loans due within the next seven days
    pub fn due_this_week_amount(&self) -> Money {
        self.loans
            .iter()
            .filter(|loan| loan.status == LoanStatus::Active && self.due_within_week(loan))
            .map(|loan| loan.outstanding())
            .sum()
    }

    /// Σ amounts received today across the whole book
    pub fn collected_today(&self) -> Money {
        self.loans
            .iter()
            .flat_map(|loan| loan.payments.iter())
            .filter(|payment| payment.is_paid() && payment.paid_date == self.today)
            .map(|payment| payment.amount_paid)
            .sum()
    }

    /// Interest collected per trailing day including today, oldest first
    pub fn profit_trend(&self, days: u32) -> Vec<TrendPoint> {
        daily_interest(self.loans, DateRange::trailing(self.today, days))
    }

    /// The full dashboard payload, rounded to cents at every field
    pub fn summary(&self) -> PortfolioSummary {
        PortfolioSummary {
            total_borrowers: self.total_borrowers(),
            total_loans: self.total_loans(),
            total_outstanding_amount: self.total_outstanding().round_cents(),
            total_paid_amount: self.total_paid().round_cents(),
            current_balance: self.current_balance().round_cents(),
            loans_due_in_next_7_days: self.loans_due_in_next_7_days(),
            overdue_amount: self.overdue_amount().round_cents(),
            due_this_week_amount: self.due_this_week_amount().round_cents(),
            collected_today: self.collected_today().round_cents(),
            profit_trend: self.profit_trend(DEFAULT_TREND_DAYS),
            working_capital: self.working_capital().round_cents(),
            estimated_profit: self.unrealized_profit().round_cents(),
            profit_made: self.profit_made().round_cents(),
            money_in_business: self.business_value().round_cents(),
            expenses: self.expenses().round_cents(),
            losses: self.losses_from_defaults().round_cents(),
        }
    }

    /// Recomputes both balance decompositions and flags payments the
    /// allocation backfill would repair
    ///
    /// Findings are logged via `tracing::warn!` and reported, never
    /// raised as errors.
    pub fn reconcile(&self) -> ReconciliationReport {
        let metrics_balance = self.current_balance();
        let ledger_balance = self.book.current_balance();
        let delta = metrics_balance - ledger_balance;

        let mut unallocated_interest_payments = 0;
        for loan in self
            .loans
            .iter()
            .filter(|loan| !loan.interest_rate.is_zero_or_below())
        {
            for payment in loan.payments.iter().filter(|payment| {
                payment.is_paid()
                    && payment.amount_paid.is_positive()
                    && payment.interest_portion.is_zero()
            }) {
                unallocated_interest_payments += 1;
                tracing::warn!(
                    loan_id = %loan.id,
                    payment_id = %payment.id,
                    amount = %payment.amount_paid,
                    "Settled payment carries no interest portion on an interest-bearing loan"
                );
            }
        }

        if !delta.is_zero() {
            tracing::warn!(
                owner = %self.book.owner(),
                metrics = %metrics_balance,
                ledger = %ledger_balance,
                delta = %delta,
                "Balance decompositions disagree"
            );
        }

        ReconciliationReport {
            metrics_balance,
            ledger_balance,
            delta,
            unallocated_interest_payments,
        }
    }

    fn due_within_week(&self, loan: &Loan) -> bool {
        let due = loan.due_date();
        due > self.today && due <= self.today + Duration::days(7)
    }
}
