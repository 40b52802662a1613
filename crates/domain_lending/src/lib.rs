//! Lending Domain
//!
//! This crate implements the loan book: origination, the approval and
//! disbursement workflow, flat-rate repayment allocation, and the
//! backfill pass that repairs historical payment rows.
//!
//! # Loan Lifecycle
//!
//! ```text
//! Pending -> Submitted -> Approved -> Active -> Closed
//!        \-> Cancelled        \-> Rejected  \-> Defaulted
//! ```
//!
//! Money amounts ride on [`core_kernel::Money`] and every cash effect
//! of a lending operation lands in the owning business's cash book.

pub mod allocation;
pub mod audit;
pub mod backfill;
pub mod disbursement;
pub mod error;
pub mod loan;
pub mod payment;
pub mod workflow;

pub use allocation::{proportional_split, AllocatedAmounts, RecordedPayment, RepaymentAllocator};
pub use audit::{AuditEntry, WorkflowAction};
pub use backfill::{BackfillReport, PaymentBackfill};
pub use disbursement::{Disbursement, DisbursementMethod, DisbursementStatus};
pub use error::LendingError;
pub use loan::{Loan, LoanStatus, TermUnit};
pub use payment::{Payment, PaymentMetadata, PaymentMethod, PaymentStatus};
pub use workflow::{CompletedDisbursement, TransitionPolicy, WorkflowEngine};
