//! Money types with precise decimal arithmetic
//!
//! This module provides a type-safe representation of monetary values
//! using rust_decimal for precise calculations without floating-point errors.
//! The portfolio operates in a single business-wide currency, so amounts
//! carry no currency tag; they are plain fixed-point values.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during money operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Overflow during calculation")]
    Overflow,
}

/// A monetary amount
///
/// Money uses rust_decimal for precise arithmetic without floating-point
/// errors. Amounts are stored with 4 decimal places internally so that
/// intermediate rate calculations keep sub-cent precision; boundary values
/// are rounded to cents via [`Money::round_cents`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Creates a new Money value
    pub fn new(amount: Decimal) -> Self {
        Self(amount.round_dp(4))
    }

    /// Creates Money from an integer amount in major units (whole currency)
    pub fn from_major(units: i64) -> Self {
        Self(Decimal::new(units, 0))
    }

    /// Creates Money from an integer amount in minor units (cents)
    pub fn from_minor(minor_units: i64) -> Self {
        Self(Decimal::new(minor_units, 2))
    }

    /// Returns the amount
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is strictly positive
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Returns true if the amount is negative
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Returns the absolute value
    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Rounds to whole cents (2 decimal places), the boundary precision
    pub fn round_cents(&self) -> Self {
        Self(self.0.round_dp(2))
    }

    /// Rounds using banker's rounding (round half to even)
    pub fn round_bankers(&self, dp: u32) -> Self {
        Self(self.0.round_dp_with_strategy(
            dp,
            rust_decimal::RoundingStrategy::MidpointNearestEven,
        ))
    }

    /// Clamps negative amounts to zero, leaving positive amounts untouched
    pub fn floor_zero(&self) -> Self {
        if self.0.is_sign_negative() {
            Self::ZERO
        } else {
            *self
        }
    }

    /// Checked addition that returns an error on decimal overflow
    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        self.0
            .checked_add(other.0)
            .map(Self::new)
            .ok_or(MoneyError::Overflow)
    }

    /// Checked subtraction that returns an error on decimal overflow
    pub fn checked_sub(&self, other: &Money) -> Result<Money, MoneyError> {
        self.0
            .checked_sub(other.0)
            .map(Self::new)
            .ok_or(MoneyError::Overflow)
    }

    /// Multiplies by a scalar (e.g., for rate calculations)
    pub fn multiply(&self, factor: Decimal) -> Self {
        Self::new(self.0 * factor)
    }

    /// Divides by a scalar
    pub fn divide(&self, divisor: Decimal) -> Result<Self, MoneyError> {
        if divisor.is_zero() {
            return Err(MoneyError::DivisionByZero);
        }
        Ok(Self::new(self.0 / divisor))
    }

    /// Splits this amount into two portions according to `ratio` (0..=1).
    ///
    /// The second portion is `amount * ratio` rounded to whole cents; the
    /// first portion is the exact remainder, so the two always sum back to
    /// the original amount. The first portion absorbs any rounding residue.
    pub fn split_by_ratio(&self, ratio: Decimal) -> Result<(Money, Money), MoneyError> {
        if ratio < Decimal::ZERO || ratio > Decimal::ONE {
            return Err(MoneyError::InvalidAmount(format!(
                "Ratio must be within [0, 1], got {ratio}"
            )));
        }
        let portion = self.multiply(ratio).round_cents();
        let remainder = self.checked_sub(&portion)?;
        Ok((remainder, portion))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s)
            .map(Self::new)
            .map_err(|e| MoneyError::InvalidAmount(e.to_string()))
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self::new(amount)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.0 + other.0)
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.0 - other.0)
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.0)
    }
}

impl Mul<Decimal> for Money {
    type Output = Self;

    fn mul(self, factor: Decimal) -> Self {
        self.multiply(factor)
    }
}

impl Div<Decimal> for Money {
    type Output = Self;

    fn div(self, divisor: Decimal) -> Self {
        self.divide(divisor).expect("Division by zero in Money::div")
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, m| acc + *m)
    }
}

/// Represents a percentage rate (e.g., a loan's flat interest rate)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rate {
    /// The rate as a decimal (e.g., 0.05 for 5%)
    value: Decimal,
}

impl Rate {
    pub const ZERO: Rate = Rate { value: Decimal::ZERO };

    /// Creates a rate from a decimal value (e.g., 0.05 for 5%)
    pub fn new(value: Decimal) -> Self {
        Self { value }
    }

    /// Creates a rate from a percentage (e.g., 5.0 for 5%)
    pub fn from_percentage(percentage: Decimal) -> Self {
        Self {
            value: percentage / dec!(100),
        }
    }

    /// Returns the rate as a decimal
    pub fn as_decimal(&self) -> Decimal {
        self.value
    }

    /// Returns the rate as a percentage
    pub fn as_percentage(&self) -> Decimal {
        self.value * dec!(100)
    }

    /// Returns true if the rate is zero or negative
    pub fn is_zero_or_below(&self) -> bool {
        self.value <= Decimal::ZERO
    }

    /// Applies this rate to a money amount
    pub fn apply(&self, money: &Money) -> Money {
        money.multiply(self.value)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percentage().round_dp(4))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_creation() {
        let m = Money::new(dec!(100.50));
        assert_eq!(m.amount(), dec!(100.50));
    }

    #[test]
    fn test_money_from_minor() {
        let m = Money::from_minor(10050);
        assert_eq!(m.amount(), dec!(100.50));
    }

    #[test]
    fn test_money_arithmetic() {
        let a = Money::new(dec!(100.00));
        let b = Money::new(dec!(50.00));

        assert_eq!((a + b).amount(), dec!(150.00));
        assert_eq!((a - b).amount(), dec!(50.00));
    }

    #[test]
    fn test_floor_zero_clamps_negatives() {
        assert_eq!(Money::new(dec!(-12.34)).floor_zero(), Money::ZERO);
        assert_eq!(Money::new(dec!(12.34)).floor_zero(), Money::new(dec!(12.34)));
    }

    #[test]
    fn test_split_by_ratio_reconciles() {
        // 12% flat on 10000: interest share of a 1120 payment is 120.00
        let payment = Money::new(dec!(1120));
        let ratio = dec!(1200) / dec!(11200);

        let (principal, interest) = payment.split_by_ratio(ratio).unwrap();
        assert_eq!(interest.amount(), dec!(120.00));
        assert_eq!(principal.amount(), dec!(1000.00));
        assert_eq!(principal + interest, payment);
    }

    #[test]
    fn test_split_by_ratio_rejects_out_of_range() {
        let m = Money::new(dec!(100));
        assert!(m.split_by_ratio(dec!(1.5)).is_err());
        assert!(m.split_by_ratio(dec!(-0.1)).is_err());
    }

    #[test]
    fn test_split_zero_ratio_gives_all_to_remainder() {
        let m = Money::new(dec!(250.00));
        let (remainder, portion) = m.split_by_ratio(Decimal::ZERO).unwrap();
        assert_eq!(remainder, m);
        assert!(portion.is_zero());
    }

    #[test]
    fn test_rate_application() {
        let rate = Rate::from_percentage(dec!(5.0));
        let amount = Money::new(dec!(1000.00));

        let charge = rate.apply(&amount);
        assert_eq!(charge.amount(), dec!(50.00));
    }

    #[test]
    fn test_money_sum() {
        let entries = vec![
            Money::new(dec!(10.25)),
            Money::new(dec!(4.75)),
            Money::new(dec!(5.00)),
        ];
        let total: Money = entries.iter().sum();
        assert_eq!(total.amount(), dec!(20.00));
    }

    #[test]
    fn test_money_serializes_transparently() {
        let m = Money::from_minor(12050);
        assert_eq!(serde_json::to_string(&m).unwrap(), "\"120.50\"");

        let back: Money = serde_json::from_str("\"120.50\"").unwrap();
        assert_eq!(back, m);
    }
}
