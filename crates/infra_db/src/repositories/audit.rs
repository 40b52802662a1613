//! Audit repository implementation
//!
//! The audit log is the append-only record of workflow transitions.
//! Transition transactions write their entries inline through
//! [`insert_audit_entry`]; this repository covers standalone appends and
//! reads.

use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use core_kernel::{ActorId, AuditEntryId, LoanId};
use domain_lending::{AuditEntry, WorkflowAction};

use crate::error::DatabaseError;
use crate::repositories::loans::parse_loan_status;

/// Repository for the workflow audit trail
#[derive(Debug, Clone)]
pub struct AuditRepository {
    pool: PgPool,
}

impl AuditRepository {
    /// Creates a new AuditRepository with the given connection pool
    ///
    /// # Arguments
    ///
    /// * `pool` - The PostgreSQL connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Appends an audit entry
    ///
    /// # Arguments
    ///
    /// * `entry` - The transition record to append
    pub async fn record(&self, entry: &AuditEntry) -> Result<(), DatabaseError> {
        insert_audit_entry(&self.pool, entry).await
    }

    /// Retrieves the transition history of a loan, oldest first
    ///
    /// # Arguments
    ///
    /// * `loan_id` - The loan identifier
    pub async fn find_by_loan(&self, loan_id: LoanId) -> Result<Vec<AuditEntry>, DatabaseError> {
        let rows = sqlx::query_as::<_, AuditRow>(
            r#"
            SELECT audit_id, loan_id, actor_id, action,
                   from_status, to_status, comments, recorded_at
            FROM audit_log
            WHERE loan_id = $1
            ORDER BY recorded_at, audit_id
            "#,
        )
        .bind(Uuid::from(loan_id))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AuditRow::into_domain).collect()
    }
}

/// Inserts one audit row; transition transactions call this inline
pub(crate) async fn insert_audit_entry<'e>(
    executor: impl PgExecutor<'e>,
    entry: &AuditEntry,
) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO audit_log (
            audit_id, loan_id, actor_id, action,
            from_status, to_status, comments, recorded_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(Uuid::from(entry.id))
    .bind(Uuid::from(entry.loan_id))
    .bind(Uuid::from(entry.actor))
    .bind(entry.action.as_str())
    .bind(entry.from_status.as_str())
    .bind(entry.to_status.as_str())
    .bind(entry.comments.as_deref())
    .bind(entry.recorded_at)
    .execute(executor)
    .await?;

    Ok(())
}

fn parse_workflow_action(value: &str) -> Result<WorkflowAction, DatabaseError> {
    match value {
        "submit" => Ok(WorkflowAction::Submit),
        "approve" => Ok(WorkflowAction::Approve),
        "reject" => Ok(WorkflowAction::Reject),
        "cancel" => Ok(WorkflowAction::Cancel),
        "disburse" => Ok(WorkflowAction::Disburse),
        "default" => Ok(WorkflowAction::Default),
        "close" => Ok(WorkflowAction::Close),
        other => Err(DatabaseError::SerializationError(format!(
            "Unknown workflow action '{other}'"
        ))),
    }
}

/// Database row for an audit entry
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AuditRow {
    pub audit_id: Uuid,
    pub loan_id: Uuid,
    pub actor_id: Uuid,
    pub action: String,
    pub from_status: String,
    pub to_status: String,
    pub comments: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl AuditRow {
    /// Maps the row onto the domain audit entry
    pub fn into_domain(self) -> Result<AuditEntry, DatabaseError> {
        Ok(AuditEntry {
            id: AuditEntryId::from(self.audit_id),
            loan_id: LoanId::from(self.loan_id),
            actor: ActorId::from(self.actor_id),
            action: parse_workflow_action(&self.action)?,
            from_status: parse_loan_status(&self.from_status)?,
            to_status: parse_loan_status(&self.to_status)?,
            comments: self.comments,
            recorded_at: self.recorded_at,
        })
    }
}
