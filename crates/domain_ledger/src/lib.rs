//! Ledger Domain - Append-Only Cash Book
//!
//! This crate implements the cash movement record for the lending core.
//! Every shilling entering or leaving the business is an immutable entry,
//! and the cash balance is always derived by summation.
//!
//! # Principles
//!
//! - Entries are append-only: corrections are new entries, never edits
//! - `current_balance = Σ inflow − Σ outflow`, recomputed on every query
//! - The working-capital base figure changes only through capital
//!   operations that also record the movement
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_ledger::{CashBook, CashMovements};
//!
//! let mut book = CashBook::new(owner);
//! book.inject_capital(initial_capital, now)?;
//! book.append(CashMovements::disbursement(owner, loan_id, principal, now)?)?;
//!
//! let balance = book.current_balance();
//! ```

pub mod cash_book;
pub mod entry;
pub mod error;

pub use cash_book::CashBook;
pub use entry::{CashMovements, EntryCategory, EntryType, LedgerEntry};
pub use error::LedgerError;
