//! Loan lifecycle workflow
//!
//! The lifecycle is an explicit transition table:
//!
//! ```text
//! pending -> submitted -> approved -> active -> closed | defaulted
//! ```
//!
//! with `rejected` and `cancelled` reachable from pending, submitted,
//! and approved. How strictly the table is enforced is a policy choice:
//! the permissive default applies any requested edge, so historical
//! records that hold transitions the table forbids stay replayable,
//! while the strict policy refuses edges outside the table.
//! Disbursement is guarded under both policies.

use chrono::{DateTime, Utc};

use core_kernel::{ActorId, EntryId, Money};
use domain_ledger::{CashBook, CashMovements};

use crate::audit::{AuditEntry, WorkflowAction};
use crate::disbursement::Disbursement;
use crate::error::LendingError;
use crate::loan::{Loan, LoanStatus};

/// How strictly the legal-transition table is enforced
///
/// `Permissive` applies any `(from, to)` edge, including edges out of
/// terminal states. `Strict` refuses everything outside the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPolicy {
    #[default]
    Permissive,
    Strict,
}

/// The result of a successful disbursement
#[derive(Debug, Clone)]
pub struct CompletedDisbursement {
    /// The payout record, already marked processed
    pub disbursement: Disbursement,
    /// The ledger entry the cash outflow was recorded under
    pub entry_id: EntryId,
    /// The audit entry for the approved -> active edge
    pub audit: AuditEntry,
}

/// Drives loan lifecycle transitions
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkflowEngine {
    policy: TransitionPolicy,
}

impl WorkflowEngine {
    pub fn new(policy: TransitionPolicy) -> Self {
        Self { policy }
    }

    /// Engine that applies any requested edge
    pub fn permissive() -> Self {
        Self::new(TransitionPolicy::Permissive)
    }

    /// Engine that enforces the legal-transition table
    pub fn strict() -> Self {
        Self::new(TransitionPolicy::Strict)
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    /// The target the legal table assigns to `(from, action)`, if any
    ///
    /// Terminal states have no outgoing edges here; under the
    /// permissive policy the generic [`WorkflowEngine::transition`] can
    /// still leave them.
    pub fn legal_target(from: LoanStatus, action: WorkflowAction) -> Option<LoanStatus> {
        use LoanStatus::*;
        use WorkflowAction::*;

        match (from, action) {
            (Pending, Submit) => Some(Submitted),
            (Submitted, Approve) => Some(Approved),
            (Pending, Reject) | (Submitted, Reject) | (Approved, Reject) => Some(Rejected),
            (Pending, Cancel) | (Submitted, Cancel) | (Approved, Cancel) => Some(Cancelled),
            (Approved, Disburse) => Some(Active),
            (Active, Close) => Some(Closed),
            (Active, Default) => Some(Defaulted),
            _ => None,
        }
    }

    /// Applies a transition and returns the audit entry for it
    ///
    /// Under the permissive policy this sets `to_status` regardless of
    /// the current status. Under the strict policy the `(from, action)`
    /// pair must be in the legal table and the table's target must be
    /// `to_status`.
    ///
    /// # Errors
    ///
    /// Returns [`LendingError::InvalidTransition`] when the strict
    /// policy refuses the edge; the loan is left unchanged.
    pub fn transition(
        &self,
        loan: &mut Loan,
        actor: ActorId,
        action: WorkflowAction,
        to_status: LoanStatus,
        comments: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<AuditEntry, LendingError> {
        let from_status = loan.status;

        if self.policy == TransitionPolicy::Strict
            && Self::legal_target(from_status, action) != Some(to_status)
        {
            return Err(LendingError::InvalidTransition {
                from: from_status.to_string(),
                action: action.to_string(),
            });
        }

        loan.force_status(to_status);

        tracing::info!(
            loan_id = %loan.id,
            action = %action,
            from = %from_status,
            to = %to_status,
            "Loan transitioned"
        );

        Ok(AuditEntry::record(
            loan.id,
            actor,
            action,
            from_status,
            to_status,
            comments,
            now,
        ))
    }

    /// Submits a pending loan for approval
    pub fn submit(
        &self,
        loan: &mut Loan,
        actor: ActorId,
        comments: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<AuditEntry, LendingError> {
        self.transition(
            loan,
            actor,
            WorkflowAction::Submit,
            LoanStatus::Submitted,
            comments,
            now,
        )
    }

    /// Approves a loan for disbursement
    pub fn approve(
        &self,
        loan: &mut Loan,
        actor: ActorId,
        comments: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<AuditEntry, LendingError> {
        self.transition(
            loan,
            actor,
            WorkflowAction::Approve,
            LoanStatus::Approved,
            comments,
            now,
        )
    }

    /// Turns a loan down
    pub fn reject(
        &self,
        loan: &mut Loan,
        actor: ActorId,
        comments: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<AuditEntry, LendingError> {
        self.transition(
            loan,
            actor,
            WorkflowAction::Reject,
            LoanStatus::Rejected,
            comments,
            now,
        )
    }

    /// Withdraws a loan before disbursement
    pub fn cancel(
        &self,
        loan: &mut Loan,
        actor: ActorId,
        comments: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<AuditEntry, LendingError> {
        self.transition(
            loan,
            actor,
            WorkflowAction::Cancel,
            LoanStatus::Cancelled,
            comments,
            now,
        )
    }

    /// Writes an active loan off as unrecoverable
    pub fn mark_defaulted(
        &self,
        loan: &mut Loan,
        actor: ActorId,
        comments: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<AuditEntry, LendingError> {
        self.transition(
            loan,
            actor,
            WorkflowAction::Default,
            LoanStatus::Defaulted,
            comments,
            now,
        )
    }

    /// Pays out an approved loan and activates it
    ///
    /// The guard is intrinsic rather than policy-dependent: the loan
    /// must be `approved`, and the cash book must hold at least the
    /// principal. On success the payout record, the outflow entry, and
    /// the status change happen together; callers needing durability
    /// wrap the same sequence in one database transaction.
    ///
    /// # Errors
    ///
    /// - [`LendingError::InvalidTransition`] if the loan is not approved
    /// - [`LendingError::InsufficientCapital`] if the balance check
    ///   fails; nothing is written and the loan stays approved
    pub fn disburse(
        &self,
        loan: &mut Loan,
        book: &mut CashBook,
        actor: ActorId,
        comments: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<CompletedDisbursement, LendingError> {
        if loan.status != LoanStatus::Approved {
            return Err(LendingError::InvalidTransition {
                from: loan.status.to_string(),
                action: WorkflowAction::Disburse.to_string(),
            });
        }

        let available = book.current_balance();
        if available < loan.principal {
            return Err(LendingError::InsufficientCapital {
                required: loan.principal.amount(),
                available: available.amount(),
            });
        }

        let mut disbursement = Disbursement::pending(loan.id, loan.principal, now);
        let entry = CashMovements::disbursement(book.owner(), loan.id, loan.principal, now)?;
        let entry_id = book.append(entry)?;
        disbursement.mark_processed(now);

        let from_status = loan.status;
        loan.force_status(LoanStatus::Active);

        tracing::info!(
            loan_id = %loan.id,
            principal = %loan.principal,
            remaining = %book.current_balance(),
            "Loan disbursed"
        );

        let audit = AuditEntry::record(
            loan.id,
            actor,
            WorkflowAction::Disburse,
            from_status,
            LoanStatus::Active,
            comments,
            now,
        );

        Ok(CompletedDisbursement {
            disbursement,
            entry_id,
            audit,
        })
    }
}

/// Checks a payment amount can be disbursed from the available balance
pub fn has_sufficient_capital(book: &CashBook, principal: Money) -> bool {
    book.current_balance() >= principal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::TermUnit;
    use chrono::NaiveDate;
    use core_kernel::{BorrowerId, BusinessId, Rate};
    use domain_ledger::{EntryCategory, EntryType};
    use rust_decimal_macros::dec;

    fn pending_loan(principal: i64) -> Loan {
        Loan::originate(
            BusinessId::new(),
            BorrowerId::new(),
            Money::from_major(principal),
            Rate::from_percentage(dec!(10)),
            6,
            TermUnit::Months,
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        )
        .unwrap()
    }

    fn funded_book(loan: &Loan, amount: i64) -> CashBook {
        let mut book = CashBook::new(loan.business);
        if amount > 0 {
            book.inject_capital(Money::from_major(amount), Utc::now())
                .unwrap();
        }
        book
    }

    #[test]
    fn test_full_lifecycle_to_active() {
        let engine = WorkflowEngine::permissive();
        let actor = ActorId::new();
        let now = Utc::now();

        let mut loan = pending_loan(1_000);
        let mut book = funded_book(&loan, 5_000);

        let submitted = engine.submit(&mut loan, actor, None, now).unwrap();
        assert_eq!(submitted.from_status, LoanStatus::Pending);
        assert_eq!(submitted.to_status, LoanStatus::Submitted);

        let approved = engine
            .approve(&mut loan, actor, Some("Income verified".to_string()), now)
            .unwrap();
        assert_eq!(approved.to_status, LoanStatus::Approved);

        let completed = engine.disburse(&mut loan, &mut book, actor, None, now).unwrap();
        assert_eq!(loan.status, LoanStatus::Active);
        assert_eq!(completed.audit.from_status, LoanStatus::Approved);
        assert_eq!(completed.audit.to_status, LoanStatus::Active);
        assert_eq!(
            completed.disbursement.status,
            crate::disbursement::DisbursementStatus::Processed
        );

        // 5000 in, 1000 paid out
        assert_eq!(book.current_balance(), Money::from_major(4_000));
        let outflow = &book.entries()[1];
        assert_eq!(outflow.entry_type, EntryType::Outflow);
        assert_eq!(outflow.category, EntryCategory::Disbursement);
        assert_eq!(outflow.loan_id, Some(loan.id));
    }

    #[test]
    fn test_disburse_requires_approved_status() {
        let engine = WorkflowEngine::permissive();
        let mut loan = pending_loan(1_000);
        let mut book = funded_book(&loan, 5_000);

        let result = engine.disburse(&mut loan, &mut book, ActorId::new(), None, Utc::now());

        assert!(matches!(
            result,
            Err(LendingError::InvalidTransition { .. })
        ));
        assert_eq!(loan.status, LoanStatus::Pending);
        assert!(book.entries().len() == 1); // only the capital injection
    }

    #[test]
    fn test_disburse_fails_on_insufficient_capital() {
        let engine = WorkflowEngine::permissive();
        let actor = ActorId::new();
        let now = Utc::now();

        let mut loan = pending_loan(1_000);
        let mut book = funded_book(&loan, 500);
        engine.approve(&mut loan, actor, None, now).unwrap();

        let entries_before = book.entries().len();
        let result = engine.disburse(&mut loan, &mut book, actor, None, now);

        match result {
            Err(LendingError::InsufficientCapital {
                required,
                available,
            }) => {
                assert_eq!(required, dec!(1000));
                assert_eq!(available, dec!(500));
            }
            other => panic!("Expected InsufficientCapital, got {:?}", other),
        }

        // Nothing written, status unchanged
        assert_eq!(loan.status, LoanStatus::Approved);
        assert_eq!(book.entries().len(), entries_before);
        assert_eq!(book.current_balance(), Money::from_major(500));
    }

    #[test]
    fn test_permissive_applies_any_edge() {
        let engine = WorkflowEngine::permissive();
        let mut loan = pending_loan(1_000);
        loan.status = LoanStatus::Closed;

        // Permissive mode can pull a loan out of a terminal state
        let audit = engine
            .transition(
                &mut loan,
                ActorId::new(),
                WorkflowAction::Approve,
                LoanStatus::Approved,
                None,
                Utc::now(),
            )
            .unwrap();

        assert_eq!(loan.status, LoanStatus::Approved);
        assert_eq!(audit.from_status, LoanStatus::Closed);
    }

    #[test]
    fn test_strict_refuses_edges_outside_the_table() {
        let engine = WorkflowEngine::strict();
        let mut loan = pending_loan(1_000);
        loan.status = LoanStatus::Closed;

        let result = engine.transition(
            &mut loan,
            ActorId::new(),
            WorkflowAction::Approve,
            LoanStatus::Approved,
            None,
            Utc::now(),
        );

        assert!(matches!(
            result,
            Err(LendingError::InvalidTransition { .. })
        ));
        assert_eq!(loan.status, LoanStatus::Closed);
    }

    #[test]
    fn test_strict_accepts_the_legal_path() {
        let engine = WorkflowEngine::strict();
        let actor = ActorId::new();
        let now = Utc::now();

        let mut loan = pending_loan(2_000);
        let mut book = funded_book(&loan, 10_000);

        engine.submit(&mut loan, actor, None, now).unwrap();
        engine.approve(&mut loan, actor, None, now).unwrap();
        engine.disburse(&mut loan, &mut book, actor, None, now).unwrap();
        engine
            .mark_defaulted(&mut loan, actor, Some("90 days overdue".to_string()), now)
            .unwrap();

        assert_eq!(loan.status, LoanStatus::Defaulted);
    }

    #[test]
    fn test_strict_rejects_mismatched_target() {
        let engine = WorkflowEngine::strict();
        let mut loan = pending_loan(1_000);

        // submit action must land on submitted, not approved
        let result = engine.transition(
            &mut loan,
            ActorId::new(),
            WorkflowAction::Submit,
            LoanStatus::Approved,
            None,
            Utc::now(),
        );

        assert!(matches!(
            result,
            Err(LendingError::InvalidTransition { .. })
        ));
        assert_eq!(loan.status, LoanStatus::Pending);
    }

    #[test]
    fn test_cancel_reachable_from_review_states() {
        for from in [LoanStatus::Pending, LoanStatus::Submitted, LoanStatus::Approved] {
            assert_eq!(
                WorkflowEngine::legal_target(from, WorkflowAction::Cancel),
                Some(LoanStatus::Cancelled)
            );
            assert_eq!(
                WorkflowEngine::legal_target(from, WorkflowAction::Reject),
                Some(LoanStatus::Rejected)
            );
        }
        assert_eq!(
            WorkflowEngine::legal_target(LoanStatus::Active, WorkflowAction::Cancel),
            None
        );
    }

    #[test]
    fn test_exact_balance_is_sufficient() {
        let mut loan = pending_loan(1_000);
        loan.status = LoanStatus::Approved;
        let mut book = funded_book(&loan, 1_000);

        assert!(has_sufficient_capital(&book, loan.principal));
        let engine = WorkflowEngine::permissive();
        engine
            .disburse(&mut loan, &mut book, ActorId::new(), None, Utc::now())
            .unwrap();
        assert_eq!(book.current_balance(), Money::ZERO);
    }
}
