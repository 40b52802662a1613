//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for common entities across the lending
//! system. These fixtures are designed to be consistent and predictable
//! for unit tests.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use core_kernel::{ActorId, BorrowerId, BusinessId, EntryId, LoanId, Money, PaymentId, Rate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// A small round amount for arithmetic tests
    pub fn hundred() -> Money {
        Money::new(dec!(100.00))
    }

    /// A typical microloan principal
    pub fn typical_principal() -> Money {
        Money::new(dec!(10000.00))
    }

    /// A smaller principal for partial-repayment scenarios
    pub fn small_principal() -> Money {
        Money::new(dec!(2500.00))
    }

    /// An opening capital injection large enough to fund several loans
    pub fn opening_capital() -> Money {
        Money::new(dec!(100000.00))
    }

    /// A typical single repayment
    pub fn typical_repayment() -> Money {
        Money::new(dec!(1100.00))
    }

    /// A zero amount
    pub fn zero() -> Money {
        Money::ZERO
    }

    /// A negative amount for sign-check tests
    pub fn negative_adjustment() -> Money {
        Money::new(dec!(-50.00))
    }
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Standard loan start date (Jan 15, 2024)
    pub fn loan_start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    /// First repayment date, one month into the term
    pub fn first_payment_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 15).unwrap()
    }

    /// Mid-term date for partial-progress scenarios
    pub fn mid_term_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 15).unwrap()
    }

    /// Reporting date used when building metric snapshots
    pub fn reporting_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    /// Timestamp for the first ledger entry of a scenario
    pub fn entry_timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap()
    }

    /// Timestamp strictly after [`Self::entry_timestamp`]
    pub fn later_entry_timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 15, 14, 30, 0).unwrap()
    }

    /// Timestamp strictly before [`Self::entry_timestamp`]
    pub fn earlier_timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 12, 1, 8, 0, 0).unwrap()
    }
}

/// Fixture for identifier test data
pub struct IdFixtures;

impl IdFixtures {
    /// Creates a deterministic business ID for testing
    pub fn business_id() -> BusinessId {
        BusinessId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440001").unwrap())
    }

    /// Creates a deterministic borrower ID for testing
    pub fn borrower_id() -> BorrowerId {
        BorrowerId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440002").unwrap())
    }

    /// Creates a deterministic loan ID for testing
    pub fn loan_id() -> LoanId {
        LoanId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440003").unwrap())
    }

    /// Creates a deterministic payment ID for testing
    pub fn payment_id() -> PaymentId {
        PaymentId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440004").unwrap())
    }

    /// Creates a deterministic actor ID for testing workflow actions
    pub fn actor_id() -> ActorId {
        ActorId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440005").unwrap())
    }

    /// Creates a deterministic ledger entry ID for testing
    pub fn entry_id() -> EntryId {
        EntryId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440006").unwrap())
    }
}

/// Fixture for rate and decimal test data
pub struct RateFixtures;

impl RateFixtures {
    /// Standard flat rate (10% over the full term)
    pub fn flat_rate() -> Rate {
        Rate::from_percentage(dec!(10))
    }

    /// A zero rate for interest-free loans
    pub fn zero_rate() -> Rate {
        Rate::from_percentage(Decimal::ZERO)
    }

    /// A high rate that still passes origination validation
    pub fn high_rate() -> Rate {
        Rate::from_percentage(dec!(35))
    }

    /// Tolerance of one cent for rounding comparisons
    pub fn cent_tolerance() -> Decimal {
        dec!(0.01)
    }

    /// Small epsilon for decimal comparisons
    pub fn epsilon() -> Decimal {
        dec!(0.000001)
    }
}

/// Fixture for string test data
pub struct StringFixtures;

impl StringFixtures {
    /// Test business name
    pub fn business_name() -> &'static str {
        "Sunrise Traders"
    }

    /// Test borrower name
    pub fn borrower_name() -> &'static str {
        "Grace Adhiambo"
    }

    /// Test phone number
    pub fn phone() -> &'static str {
        "+254-700-123456"
    }

    /// Test loan purpose
    pub fn purpose() -> &'static str {
        "Restock market stall inventory"
    }

    /// Test mobile money transaction reference
    pub fn transaction_reference() -> &'static str {
        "MM-XK74Q921"
    }

    /// Test workflow comment
    pub fn workflow_comment() -> &'static str {
        "Reviewed by branch officer"
    }
}
