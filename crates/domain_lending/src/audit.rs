//! Workflow audit trail
//!
//! Every lifecycle transition appends one immutable audit entry naming
//! who moved the loan, from where, to where, and why.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{ActorId, AuditEntryId, LoanId};

use crate::loan::LoanStatus;

/// What the actor did to the loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowAction {
    Submit,
    Approve,
    Reject,
    Cancel,
    Disburse,
    Default,
    Close,
}

impl WorkflowAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowAction::Submit => "submit",
            WorkflowAction::Approve => "approve",
            WorkflowAction::Reject => "reject",
            WorkflowAction::Cancel => "cancel",
            WorkflowAction::Disburse => "disburse",
            WorkflowAction::Default => "default",
            WorkflowAction::Close => "close",
        }
    }
}

impl fmt::Display for WorkflowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One immutable record of a lifecycle transition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Unique identifier
    pub id: AuditEntryId,
    /// Loan that was moved
    pub loan_id: LoanId,
    /// Who moved it
    pub actor: ActorId,
    /// What they did
    pub action: WorkflowAction,
    /// Status before
    pub from_status: LoanStatus,
    /// Status after
    pub to_status: LoanStatus,
    /// Reviewer comments
    pub comments: Option<String>,
    /// When the transition happened
    pub recorded_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn record(
        loan_id: LoanId,
        actor: ActorId,
        action: WorkflowAction,
        from_status: LoanStatus,
        to_status: LoanStatus,
        comments: Option<String>,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AuditEntryId::new_v7(),
            loan_id,
            actor,
            action,
            from_status,
            to_status,
            comments,
            recorded_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_wire_names() {
        assert_eq!(
            serde_json::to_string(&WorkflowAction::Disburse).unwrap(),
            "\"disburse\""
        );
        assert_eq!(WorkflowAction::Default.as_str(), "default");
    }

    #[test]
    fn test_audit_entry_captures_edge() {
        let entry = AuditEntry::record(
            LoanId::new(),
            ActorId::new(),
            WorkflowAction::Approve,
            LoanStatus::Submitted,
            LoanStatus::Approved,
            Some("Income verified".to_string()),
            Utc::now(),
        );

        assert_eq!(entry.from_status, LoanStatus::Submitted);
        assert_eq!(entry.to_status, LoanStatus::Approved);
        assert_eq!(entry.comments.as_deref(), Some("Income verified"));
    }
}
