//! Integration tests for the metrics domain
//!
//! Builds small portfolios through the lending and ledger operations,
//! then checks the derived dashboard figures against hand-computed
//! values.

use chrono::{Duration, NaiveDate, Utc};
use core_kernel::{ActorId, BorrowerId, BusinessId, Money, Rate};
use domain_ledger::CashBook;
use domain_lending::{
    Loan, LoanStatus, Payment, PaymentMetadata, RepaymentAllocator, TermUnit, WorkflowEngine,
};
use domain_metrics::MetricsEngine;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
}

fn originate(owner: BusinessId, principal: i64, rate_pct: i64) -> Loan {
    Loan::originate(
        owner,
        BorrowerId::new(),
        Money::from_major(principal),
        Rate::from_percentage(Decimal::new(rate_pct, 0)),
        3,
        TermUnit::Months,
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
    )
    .unwrap()
}

/// Runs a loan through submit, approve, and disbursement
fn disburse(loan: &mut Loan, book: &mut CashBook) {
    let workflow = WorkflowEngine::permissive();
    let actor = ActorId::new();
    let now = Utc::now();
    workflow.submit(loan, actor, None, now).unwrap();
    workflow.approve(loan, actor, None, now).unwrap();
    workflow.disburse(loan, book, actor, None, now).unwrap();
}

fn repay(loan: &mut Loan, book: &mut CashBook, amount: Decimal, on: NaiveDate) {
    RepaymentAllocator::record_payment(
        loan,
        book,
        Money::new(amount),
        on,
        PaymentMetadata::default(),
        Utc::now(),
    )
    .unwrap();
}

mod trend_window {
    use super::*;

    #[test]
    fn test_single_payment_five_days_ago() {
        let owner = BusinessId::new();
        let book = CashBook::new(owner);
        let today = today();

        let mut loan = originate(owner, 10_000, 12);
        loan.status = LoanStatus::Active;
        let five_days_ago = today - Duration::days(5);
        let payment = Payment::settled(
            loan.id,
            Money::new(dec!(705.17)),
            Money::new(dec!(629.67)),
            Money::new(dec!(75.50)),
            five_days_ago,
            PaymentMetadata::default(),
            Utc::now(),
        );
        loan.apply_payment(payment);

        let loans = vec![loan];
        let engine = MetricsEngine::new(&book, &loans, today).unwrap();
        let trend = engine.profit_trend(30);

        assert_eq!(trend.len(), 30);
        assert_eq!(trend[0].date, today - Duration::days(29));
        assert_eq!(trend[29].date, today);

        let zeros = trend.iter().filter(|p| p.amount.is_zero()).count();
        assert_eq!(zeros, 29);

        let hit = trend.iter().find(|p| p.date == five_days_ago).unwrap();
        assert_eq!(hit.amount, Money::new(dec!(75.50)));
    }

    #[test]
    fn test_trend_is_ordered_oldest_first() {
        let owner = BusinessId::new();
        let book = CashBook::new(owner);
        let engine = MetricsEngine::new(&book, &[], today()).unwrap();

        let trend = engine.profit_trend(14);
        for pair in trend.windows(2) {
            assert!(pair[0].date < pair[1].date);
        }
    }
}

mod dashboard_summary {
    use super::*;

    #[test]
    fn test_numbers_after_a_small_season() {
        let owner = BusinessId::new();
        let mut book = CashBook::new(owner);
        let today = today();
        let now = Utc::now();
        book.inject_capital(Money::from_major(50_000), now).unwrap();

        // Loan one: 10000 at 12, one repayment of 1120
        let mut first = originate(owner, 10_000, 12);
        disburse(&mut first, &mut book);
        repay(&mut first, &mut book, dec!(1120), today - Duration::days(3));

        // Loan two: 5000 at 10, fully settled in two payments
        let mut second = originate(owner, 5_000, 10);
        disburse(&mut second, &mut book);
        repay(&mut second, &mut book, dec!(2750), today - Duration::days(2));
        repay(&mut second, &mut book, dec!(2750), today);
        assert_eq!(second.status, LoanStatus::Closed);

        book.record_expense(Money::new(dec!(200)), "Field agent fuel", now)
            .unwrap();

        let loans = vec![first, second];
        let engine = MetricsEngine::new(&book, &loans, today).unwrap();
        let summary = engine.summary();

        assert_eq!(summary.total_loans, 2);
        assert_eq!(summary.total_borrowers, 2);
        // Only the open loan still carries an outstanding balance
        assert_eq!(
            summary.total_outstanding_amount,
            Money::new(dec!(10080.00))
        );
        assert_eq!(summary.total_paid_amount, Money::new(dec!(6620.00)));
        // 50000 - 15000 disbursed + 6620 repaid - 200 expenses
        assert_eq!(summary.current_balance, Money::new(dec!(41420.00)));
        assert_eq!(summary.current_balance, book.current_balance());
        assert_eq!(summary.collected_today, Money::new(dec!(2750.00)));
        // 120 + 250 + 250 interest collected, minus the expense
        assert_eq!(summary.profit_made, Money::new(dec!(420.00)));
        assert_eq!(summary.working_capital, Money::new(dec!(50000.00)));
        assert_eq!(summary.money_in_business, Money::new(dec!(50420.00)));
        assert_eq!(summary.expenses, Money::new(dec!(200.00)));
        assert_eq!(summary.losses, Money::ZERO);
        // 1200 expected on the open loan minus 120 collected
        assert_eq!(summary.estimated_profit, Money::new(dec!(1080.00)));
        assert_eq!(summary.profit_trend.len(), 30);
    }

    #[test]
    fn test_defaulted_loan_shows_as_losses() {
        let owner = BusinessId::new();
        let mut book = CashBook::new(owner);
        let now = Utc::now();
        book.inject_capital(Money::from_major(20_000), now).unwrap();

        // 8000 at 5: expected interest 400; 3000/100 collected, then
        // written off
        let mut loan = originate(owner, 8_000, 5);
        disburse(&mut loan, &mut book);
        let payment = Payment::settled(
            loan.id,
            Money::new(dec!(3100)),
            Money::new(dec!(3000)),
            Money::new(dec!(100)),
            today() - Duration::days(30),
            PaymentMetadata::default(),
            Utc::now(),
        );
        loan.apply_payment(payment);
        WorkflowEngine::permissive()
            .mark_defaulted(&mut loan, ActorId::new(), None, now)
            .unwrap();

        let loans = vec![loan];
        let engine = MetricsEngine::new(&book, &loans, today()).unwrap();
        let summary = engine.summary();

        assert_eq!(summary.losses, Money::new(dec!(5300.00)));
        // 100 interest collected - 5300 losses
        assert_eq!(summary.profit_made, Money::new(dec!(-5200.00)));
        // Defaulted is terminal, so nothing counts as outstanding
        assert_eq!(summary.total_outstanding_amount, Money::ZERO);
        assert_eq!(summary.estimated_profit, Money::ZERO);
    }
}

mod reconciliation {
    use super::*;

    #[test]
    fn test_clean_books_reconcile() {
        let owner = BusinessId::new();
        let mut book = CashBook::new(owner);
        book.inject_capital(Money::from_major(10_000), Utc::now())
            .unwrap();

        let mut loan = originate(owner, 2_000, 15);
        disburse(&mut loan, &mut book);
        repay(&mut loan, &mut book, dec!(575), today() - Duration::days(1));

        let loans = vec![loan];
        let engine = MetricsEngine::new(&book, &loans, today()).unwrap();
        let report = engine.reconcile();

        assert!(report.is_consistent());
        assert_eq!(report.metrics_balance, report.ledger_balance);
        assert_eq!(report.unallocated_interest_payments, 0);
    }

    #[test]
    fn test_payment_without_ledger_entry_shows_a_delta() {
        let owner = BusinessId::new();
        let mut book = CashBook::new(owner);
        book.inject_capital(Money::from_major(10_000), Utc::now())
            .unwrap();

        // Payment applied straight to the loan, bypassing the book
        let mut loan = originate(owner, 2_000, 15);
        disburse(&mut loan, &mut book);
        let orphan = Payment::settled(
            loan.id,
            Money::new(dec!(575)),
            Money::new(dec!(500)),
            Money::new(dec!(75)),
            today(),
            PaymentMetadata::default(),
            Utc::now(),
        );
        loan.apply_payment(orphan);

        let loans = vec![loan];
        let engine = MetricsEngine::new(&book, &loans, today()).unwrap();
        let report = engine.reconcile();

        // Metrics sees the collected portions, the ledger does not
        assert_eq!(report.delta, Money::new(dec!(575)));
        assert!(!report.is_consistent());
    }
}
