//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data
//! that maintains domain invariants.

use chrono::{Duration, NaiveDate};
use core_kernel::{BorrowerId, BusinessId, LoanId, Money, Rate};
use domain_lending::{PaymentMethod, TermUnit};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Strategy for generating valid positive amounts in minor units
pub fn positive_amount_minor_strategy() -> impl Strategy<Value = i64> {
    1i64..1_000_000_000i64
}

/// Strategy for generating amounts that may be negative
pub fn amount_minor_strategy() -> impl Strategy<Value = i64> {
    -1_000_000_000i64..1_000_000_000i64
}

/// Strategy for generating valid Money values with positive amounts
pub fn positive_money_strategy() -> impl Strategy<Value = Money> {
    positive_amount_minor_strategy().prop_map(Money::from_minor)
}

/// Strategy for generating valid Money values (can be negative)
pub fn money_strategy() -> impl Strategy<Value = Money> {
    amount_minor_strategy().prop_map(Money::from_minor)
}

/// Strategy for generating microloan-scale principals (100.00 to 50,000.00)
pub fn principal_strategy() -> impl Strategy<Value = Money> {
    (10_000i64..5_000_000i64).prop_map(Money::from_minor)
}

/// Strategy for generating flat rates within origination bounds (0% to 100%)
pub fn flat_rate_strategy() -> impl Strategy<Value = Rate> {
    (0u32..=10_000u32).prop_map(|n| Rate::from_percentage(Decimal::new(n as i64, 2)))
}

/// Strategy for generating strictly positive flat rates
pub fn nonzero_flat_rate_strategy() -> impl Strategy<Value = Rate> {
    (1u32..=10_000u32).prop_map(|n| Rate::from_percentage(Decimal::new(n as i64, 2)))
}

/// Strategy for generating term lengths (1 to 60 periods)
pub fn term_length_strategy() -> impl Strategy<Value = u32> {
    1u32..=60u32
}

/// Strategy for generating term units
pub fn term_unit_strategy() -> impl Strategy<Value = TermUnit> {
    prop_oneof![
        Just(TermUnit::Days),
        Just(TermUnit::Weeks),
        Just(TermUnit::Months),
        Just(TermUnit::Years),
    ]
}

/// Strategy for generating payment methods
pub fn payment_method_strategy() -> impl Strategy<Value = PaymentMethod> {
    prop_oneof![
        Just(PaymentMethod::Cash),
        Just(PaymentMethod::BankTransfer),
        Just(PaymentMethod::MobileMoney),
        Just(PaymentMethod::Cheque),
        Just(PaymentMethod::Other),
    ]
}

/// Strategy for generating calendar dates within 2024
pub fn date_in_2024_strategy() -> impl Strategy<Value = NaiveDate> {
    (0i64..366i64).prop_map(|days| {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(days)
    })
}

/// Strategy for generating split ratios in the unit interval
pub fn split_ratio_strategy() -> impl Strategy<Value = Decimal> {
    (0u32..=10_000u32).prop_map(|n| Decimal::new(n as i64, 4))
}

/// Strategy for generating BusinessId
pub fn business_id_strategy() -> impl Strategy<Value = BusinessId> {
    any::<[u8; 16]>().prop_map(|bytes| BusinessId::from_uuid(uuid::Uuid::from_bytes(bytes)))
}

/// Strategy for generating BorrowerId
pub fn borrower_id_strategy() -> impl Strategy<Value = BorrowerId> {
    any::<[u8; 16]>().prop_map(|bytes| BorrowerId::from_uuid(uuid::Uuid::from_bytes(bytes)))
}

/// Strategy for generating LoanId
pub fn loan_id_strategy() -> impl Strategy<Value = LoanId> {
    any::<[u8; 16]>().prop_map(|bytes| LoanId::from_uuid(uuid::Uuid::from_bytes(bytes)))
}

/// Strategy for generating borrower names
pub fn name_strategy() -> impl Strategy<Value = String> {
    "[A-Z][a-z]{2,10}".prop_map(|s| s)
}

/// Strategy for generating valid phone numbers
pub fn phone_strategy() -> impl Strategy<Value = String> {
    (100u32..999u32, 100_000u32..999_999u32)
        .prop_map(|(prefix, line)| format!("+254-{}-{}", prefix, line))
}

/// Strategy for generating loan purposes
pub fn purpose_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Restock inventory".to_string()),
        Just("Buy farm inputs".to_string()),
        Just("School fees bridge".to_string()),
        Just("Repair delivery bicycle".to_string()),
        Just("Expand market stall".to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    proptest! {
        #[test]
        fn positive_money_is_always_positive(money in positive_money_strategy()) {
            prop_assert!(money.amount() > Decimal::ZERO);
        }

        #[test]
        fn flat_rate_stays_within_origination_bounds(rate in flat_rate_strategy()) {
            prop_assert!(rate.as_percentage() >= Decimal::ZERO);
            prop_assert!(rate.as_percentage() <= dec!(100));
        }

        #[test]
        fn principal_is_microloan_scale(principal in principal_strategy()) {
            prop_assert!(principal.amount() >= dec!(100));
            prop_assert!(principal.amount() <= dec!(50000));
        }

        #[test]
        fn term_length_is_at_least_one_period(term in term_length_strategy()) {
            prop_assert!(term >= 1);
        }

        #[test]
        fn split_ratio_stays_in_unit_interval(ratio in split_ratio_strategy()) {
            prop_assert!(ratio >= Decimal::ZERO);
            prop_assert!(ratio <= Decimal::ONE);
        }

        #[test]
        fn generated_dates_fall_within_2024(date in date_in_2024_strategy()) {
            prop_assert!(date >= NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
            prop_assert!(date <= NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
        }
    }
}
