//! Daily Interest Trend
//!
//! Buckets collected interest per calendar day over a reporting window.
//! Every day in the window appears in the output, zeros included, so
//! chart consumers never have to fill gaps themselves.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{DateRange, Money};
use domain_lending::Loan;

/// One day of collected interest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub amount: Money,
}

/// Interest collected per day over `window`, oldest first
///
/// Only settled payments count. Amounts are rounded to cents.
pub fn daily_interest(loans: &[Loan], window: DateRange) -> Vec<TrendPoint> {
    let mut by_day: BTreeMap<NaiveDate, Money> =
        window.iter_days().map(|day| (day, Money::ZERO)).collect();

    for payment in loans.iter().flat_map(|loan| loan.payments.iter()) {
        if !payment.is_paid() || !window.contains(payment.paid_date) {
            continue;
        }
        if let Some(total) = by_day.get_mut(&payment.paid_date) {
            *total = *total + payment.interest_portion;
        }
    }

    by_day
        .into_iter()
        .map(|(date, amount)| TrendPoint {
            date,
            amount: amount.round_cents(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use core_kernel::{BorrowerId, BusinessId, Rate};
    use domain_lending::{LoanStatus, Payment, PaymentMetadata, TermUnit};
    use rust_decimal_macros::dec;

    fn active_loan() -> Loan {
        let mut loan = Loan::originate(
            BusinessId::new(),
            BorrowerId::new(),
            Money::from_major(10_000),
            Rate::from_percentage(dec!(12)),
            6,
            TermUnit::Months,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )
        .unwrap();
        loan.status = LoanStatus::Active;
        loan
    }

    fn paid_on(loan: &Loan, date: NaiveDate, interest: rust_decimal::Decimal) -> Payment {
        Payment::settled(
            loan.id,
            Money::new(interest + dec!(100)),
            Money::new(dec!(100)),
            Money::new(interest),
            date,
            PaymentMetadata::default(),
            Utc::now(),
        )
    }

    #[test]
    fn test_every_window_day_is_present() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let points = daily_interest(&[], DateRange::trailing(today, 30));

        assert_eq!(points.len(), 30);
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(points[29].date, today);
        assert!(points.iter().all(|p| p.amount.is_zero()));
    }

    #[test]
    fn test_same_day_payments_accumulate() {
        let mut loan = active_loan();
        let day = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        loan.apply_payment(paid_on(&loan, day, dec!(40.25)));
        loan.apply_payment(paid_on(&loan, day, dec!(10.00)));

        let window = DateRange::trailing(NaiveDate::from_ymd_opt(2024, 6, 20).unwrap(), 7);
        let points = daily_interest(&[loan], window);

        let on_day = points.iter().find(|p| p.date == day).unwrap();
        assert_eq!(on_day.amount, Money::new(dec!(50.25)));
    }

    #[test]
    fn test_payments_outside_window_are_ignored() {
        let mut loan = active_loan();
        let stale = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        loan.apply_payment(paid_on(&loan, stale, dec!(99)));

        let window = DateRange::trailing(NaiveDate::from_ymd_opt(2024, 6, 20).unwrap(), 7);
        let points = daily_interest(&[loan], window);

        assert!(points.iter().all(|p| p.amount.is_zero()));
    }
}
