//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible defaults.
//! These builders allow tests to specify only the relevant fields while using
//! defaults for everything else. They build real domain aggregates, so tests
//! can place a loan or a ledger entry in any state a scenario needs.

use chrono::{DateTime, NaiveDate, Utc};
use core_kernel::{BorrowerId, BusinessId, EntryId, LoanId, Money, PaymentId, Rate};
use domain_ledger::{EntryCategory, EntryType, LedgerEntry};
use domain_lending::{Loan, LoanStatus, Payment, PaymentMethod, PaymentStatus, TermUnit};
use rust_decimal_macros::dec;

use crate::fixtures::{IdFixtures, MoneyFixtures, RateFixtures, TemporalFixtures};

/// Builder for constructing test loans
pub struct LoanBuilder {
    id: LoanId,
    business: BusinessId,
    borrower: BorrowerId,
    principal: Money,
    interest_rate: Rate,
    term_months: u32,
    term_unit: TermUnit,
    start_date: NaiveDate,
    status: LoanStatus,
    purpose: Option<String>,
    payments: Vec<Payment>,
}

impl Default for LoanBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LoanBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        Self {
            id: LoanId::new_v7(),
            business: IdFixtures::business_id(),
            borrower: IdFixtures::borrower_id(),
            principal: MoneyFixtures::typical_principal(),
            interest_rate: RateFixtures::flat_rate(),
            term_months: 6,
            term_unit: TermUnit::Months,
            start_date: TemporalFixtures::loan_start(),
            status: LoanStatus::Pending,
            purpose: None,
            payments: Vec::new(),
        }
    }

    /// Creates a builder preset to an active, disbursed loan
    pub fn active() -> Self {
        Self::new().with_status(LoanStatus::Active)
    }

    /// Sets the loan ID
    pub fn with_id(mut self, id: LoanId) -> Self {
        self.id = id;
        self
    }

    /// Sets the owning business
    pub fn with_business(mut self, business: BusinessId) -> Self {
        self.business = business;
        self
    }

    /// Sets the borrower
    pub fn with_borrower(mut self, borrower: BorrowerId) -> Self {
        self.borrower = borrower;
        self
    }

    /// Sets the principal
    pub fn with_principal(mut self, principal: Money) -> Self {
        self.principal = principal;
        self
    }

    /// Sets the flat interest rate
    pub fn with_rate(mut self, rate: Rate) -> Self {
        self.interest_rate = rate;
        self
    }

    /// Sets the term length in `term_unit` periods
    pub fn with_term(mut self, count: u32, unit: TermUnit) -> Self {
        self.term_months = count;
        self.term_unit = unit;
        self
    }

    /// Sets the start date
    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = date;
        self
    }

    /// Sets the lifecycle status
    pub fn with_status(mut self, status: LoanStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the purpose
    pub fn with_purpose(mut self, purpose: impl Into<String>) -> Self {
        self.purpose = Some(purpose.into());
        self
    }

    /// Appends a repayment; the built loan's cached total reflects it
    pub fn with_payment(mut self, payment: Payment) -> Self {
        self.payments.push(payment);
        self
    }

    /// Builds the loan
    pub fn build(self) -> Loan {
        let now = Utc::now();
        let mut loan = Loan {
            id: self.id,
            business: self.business,
            borrower: self.borrower,
            principal: self.principal,
            interest_rate: self.interest_rate,
            term_months: self.term_months,
            term_unit: self.term_unit,
            start_date: self.start_date,
            status: self.status,
            purpose: self.purpose,
            total_paid: Money::ZERO,
            payments: self.payments,
            created_at: now,
            updated_at: now,
        };
        loan.recompute_total_paid();
        loan
    }
}

/// Builder for constructing test payments
pub struct PaymentBuilder {
    id: PaymentId,
    loan_id: LoanId,
    amount_paid: Money,
    principal_portion: Money,
    interest_portion: Money,
    paid_date: NaiveDate,
    status: PaymentStatus,
    method: PaymentMethod,
    transaction_reference: Option<String>,
    notes: Option<String>,
    recorded_at: DateTime<Utc>,
}

impl Default for PaymentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PaymentBuilder {
    /// Creates a new builder with default values
    ///
    /// The default split matches a 10% flat-rate loan: 1100.00 paid,
    /// 1000.00 to principal and 100.00 to interest.
    pub fn new() -> Self {
        Self {
            id: PaymentId::new_v7(),
            loan_id: IdFixtures::loan_id(),
            amount_paid: MoneyFixtures::typical_repayment(),
            principal_portion: Money::new(dec!(1000.00)),
            interest_portion: Money::new(dec!(100.00)),
            paid_date: TemporalFixtures::first_payment_date(),
            status: PaymentStatus::Paid,
            method: PaymentMethod::Cash,
            transaction_reference: None,
            notes: None,
            recorded_at: TemporalFixtures::later_entry_timestamp(),
        }
    }

    /// Sets the payment ID
    pub fn with_id(mut self, id: PaymentId) -> Self {
        self.id = id;
        self
    }

    /// Sets the loan the payment belongs to
    pub fn with_loan(mut self, loan_id: LoanId) -> Self {
        self.loan_id = loan_id;
        self
    }

    /// Sets the amount paid and its principal/interest split
    pub fn with_amounts(mut self, amount_paid: Money, principal: Money, interest: Money) -> Self {
        self.amount_paid = amount_paid;
        self.principal_portion = principal;
        self.interest_portion = interest;
        self
    }

    /// Sets the paid date
    pub fn with_paid_date(mut self, date: NaiveDate) -> Self {
        self.paid_date = date;
        self
    }

    /// Sets the status
    pub fn with_status(mut self, status: PaymentStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the payment method
    pub fn with_method(mut self, method: PaymentMethod) -> Self {
        self.method = method;
        self
    }

    /// Sets the external transaction reference
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.transaction_reference = Some(reference.into());
        self
    }

    /// Sets the recorded-at timestamp
    pub fn with_recorded_at(mut self, at: DateTime<Utc>) -> Self {
        self.recorded_at = at;
        self
    }

    /// Builds the payment
    pub fn build(self) -> Payment {
        Payment {
            id: self.id,
            loan_id: self.loan_id,
            amount_paid: self.amount_paid,
            principal_portion: self.principal_portion,
            interest_portion: self.interest_portion,
            fee_portion: Money::ZERO,
            penalty_portion: Money::ZERO,
            paid_date: self.paid_date,
            status: self.status,
            method: self.method,
            transaction_reference: self.transaction_reference,
            notes: self.notes,
            recorded_at: self.recorded_at,
        }
    }
}

/// Builder for constructing test ledger entries
pub struct LedgerEntryBuilder {
    owner: BusinessId,
    entry_type: EntryType,
    category: EntryCategory,
    amount: Money,
    occurred_at: DateTime<Utc>,
    description: Option<String>,
    loan_id: Option<LoanId>,
}

impl Default for LedgerEntryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerEntryBuilder {
    /// Creates a new builder with default values (a capital injection)
    pub fn new() -> Self {
        Self {
            owner: IdFixtures::business_id(),
            entry_type: EntryType::Inflow,
            category: EntryCategory::CapitalInjection,
            amount: MoneyFixtures::hundred(),
            occurred_at: TemporalFixtures::entry_timestamp(),
            description: None,
            loan_id: None,
        }
    }

    /// Builds a capital injection entry
    pub fn capital_injection() -> Self {
        Self::new()
    }

    /// Builds a repayment inflow entry
    pub fn repayment() -> Self {
        Self::new()
            .with_movement(EntryType::Inflow, EntryCategory::Repayment)
            .with_loan(IdFixtures::loan_id())
    }

    /// Builds a disbursement outflow entry
    pub fn disbursement() -> Self {
        Self::new()
            .with_movement(EntryType::Outflow, EntryCategory::Disbursement)
            .with_loan(IdFixtures::loan_id())
    }

    /// Builds an operating expense entry
    pub fn expense() -> Self {
        Self::new().with_movement(EntryType::Outflow, EntryCategory::Expense)
    }

    /// Sets the owning business
    pub fn with_owner(mut self, owner: BusinessId) -> Self {
        self.owner = owner;
        self
    }

    /// Sets the direction and category together
    pub fn with_movement(mut self, entry_type: EntryType, category: EntryCategory) -> Self {
        self.entry_type = entry_type;
        self.category = category;
        self
    }

    /// Sets the amount
    pub fn with_amount(mut self, amount: Money) -> Self {
        self.amount = amount;
        self
    }

    /// Sets the occurred-at timestamp
    pub fn with_occurred_at(mut self, at: DateTime<Utc>) -> Self {
        self.occurred_at = at;
        self
    }

    /// Sets the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Links the entry to a loan
    pub fn with_loan(mut self, loan_id: LoanId) -> Self {
        self.loan_id = Some(loan_id);
        self
    }

    /// Builds the ledger entry
    pub fn build(self) -> LedgerEntry {
        LedgerEntry {
            id: EntryId::new_v7(),
            owner: self.owner,
            entry_type: self.entry_type,
            category: self.category,
            amount: self.amount,
            occurred_at: self.occurred_at,
            description: self.description,
            loan_id: self.loan_id,
        }
    }
}
