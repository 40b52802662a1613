//! Core Kernel - Foundational types and utilities for the lending system
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic
//! - Temporal types for day-bucketed reporting and deterministic clocks
//! - Common identifiers and value objects

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod error;

pub use money::{Money, MoneyError, Rate};
pub use temporal::{Clock, DateRange, FixedClock, SystemClock, Timezone};
pub use identifiers::{
    ActorId, AuditEntryId, BorrowerId, BusinessId, DisbursementId,
    EntryId, LoanId, PaymentId,
};
pub use error::CoreError;
