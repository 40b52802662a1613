//! Repository implementations for domain entities
//!
//! This module provides concrete repository implementations that handle
//! database access for each domain aggregate. Repositories encapsulate
//! SQL queries and map between database rows and domain types.
//!
//! # Architecture
//!
//! Each repository follows these principles:
//! - Domain rules run in memory on hydrated aggregates; repositories
//!   only load, lock, and persist
//! - Financial mutations are single transactions, all-or-nothing
//! - Balances and totals are recomputed inside the same write that
//!   changes their inputs

pub mod audit;
pub mod ledger;
pub mod loans;
pub mod metrics;
pub mod parties;

pub use audit::AuditRepository;
pub use ledger::LedgerRepository;
pub use loans::{LoanRepository, NewLoan};
pub use metrics::MetricsRepository;
pub use parties::PartyRepository;
