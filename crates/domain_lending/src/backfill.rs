//! Payment Allocation Backfill
//!
//! Repayment rows written before proportional allocation existed carry
//! the whole amount on principal and a zero interest portion. This
//! module recomputes the split for those rows from the loan's fixed
//! schedule and leaves everything else untouched.
//!
//! The pass is idempotent: a repaired row has a non-zero interest
//! portion and is skipped on the next run, and rows whose recomputed
//! split matches what is already stored are never rewritten.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use core_kernel::{Money, Rate};

use crate::allocation::proportional_split;
use crate::error::LendingError;
use crate::loan::Loan;
use crate::payment::Payment;

/// Counters from one repair pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackfillReport {
    /// Payment rows examined
    pub scanned: usize,
    /// Rows whose portions were rewritten
    pub repaired: usize,
    /// Rows left as they were
    pub skipped: usize,
}

impl BackfillReport {
    fn merge(&mut self, other: BackfillReport) {
        self.scanned += other.scanned;
        self.repaired += other.repaired;
        self.skipped += other.skipped;
    }
}

/// Repairs allocation portions on historical payment rows
pub struct PaymentBackfill;

impl PaymentBackfill {
    /// Recomputes the split for a single payment row.
    ///
    /// Returns true if the row was rewritten. A row is left alone when
    /// the loan carries no interest (zero interest is correct there),
    /// when its interest portion is already non-zero, or when the
    /// amount paid is not positive.
    pub fn backfill_payment(
        principal: Money,
        rate: Rate,
        payment: &mut Payment,
    ) -> Result<bool, LendingError> {
        if rate.is_zero_or_below() {
            return Ok(false);
        }
        if !payment.interest_portion.is_zero() {
            return Ok(false);
        }
        if !payment.amount_paid.is_positive() {
            return Ok(false);
        }

        let split = proportional_split(principal, rate, payment.amount_paid)?;
        if payment.principal_portion == split.principal && payment.interest_portion == split.interest
        {
            // Tiny amounts round to zero interest and recompute to the
            // values already stored; the row is correct as it stands.
            return Ok(false);
        }

        debug!(
            payment_id = %payment.id,
            loan_id = %payment.loan_id,
            amount = %payment.amount_paid,
            principal_portion = %split.principal,
            interest_portion = %split.interest,
            "Backfilled payment allocation"
        );
        payment.principal_portion = split.principal;
        payment.interest_portion = split.interest;
        Ok(true)
    }

    /// Repairs every payment on one loan
    pub fn backfill_loan(loan: &mut Loan) -> Result<BackfillReport, LendingError> {
        let principal = loan.principal;
        let rate = loan.interest_rate;

        let mut report = BackfillReport::default();
        for payment in loan.payments.iter_mut() {
            report.scanned += 1;
            if Self::backfill_payment(principal, rate, payment)? {
                report.repaired += 1;
            } else {
                report.skipped += 1;
            }
        }

        if report.repaired > 0 {
            loan.updated_at = chrono::Utc::now();
        }
        Ok(report)
    }

    /// Repairs every payment across a set of loans and reports totals
    pub fn backfill_portfolio(loans: &mut [Loan]) -> Result<BackfillReport, LendingError> {
        let mut report = BackfillReport::default();
        for loan in loans.iter_mut() {
            report.merge(Self::backfill_loan(loan)?);
        }

        info!(
            scanned = report.scanned,
            repaired = report.repaired,
            skipped = report.skipped,
            "Payment allocation backfill finished"
        );
        Ok(report)
    }
}
