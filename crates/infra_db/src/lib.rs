//! Infrastructure Database Layer
//!
//! This crate provides the PostgreSQL persistence layer for the
//! microloan portfolio system, using SQLx with the repository pattern.
//!
//! # Architecture
//!
//! Domain crates stay synchronous and pure; this crate hydrates their
//! aggregates from rows, runs the domain operation in memory, and
//! persists the result inside one transaction. Consistency rules:
//!
//! - Payment writes lock the loan row (`SELECT ... FOR UPDATE`), so a
//!   loan's payment set and cached totals change serially
//! - Disbursement takes a per-owner advisory lock around its
//!   check-then-act on the cash balance
//! - Metrics reads run in one repeatable-read snapshot
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, DatabaseConfig, LoanRepository};
//!
//! let pool = create_pool(DatabaseConfig::from_env()?).await?;
//! let loans = LoanRepository::new(pool);
//! ```

pub mod config;
pub mod error;
pub mod pool;
pub mod repositories;

pub use config::DatabaseConfig;
pub use error::DatabaseError;
pub use pool::{create_pool, create_pool_from_url, run_migrations, DatabasePool};
pub use repositories::{
    AuditRepository, LedgerRepository, LoanRepository, MetricsRepository, NewLoan,
    PartyRepository,
};
