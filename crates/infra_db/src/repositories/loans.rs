//! Loan repository implementation
//!
//! This module provides database access for the loan aggregate: loans
//! with their payments, the transactional repayment write, workflow
//! transitions, guarded disbursement, and the historical allocation
//! backfill.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgExecutor, PgPool};
use uuid::Uuid;

use core_kernel::{ActorId, BorrowerId, BusinessId, LoanId, Money, PaymentId, Rate};
use domain_ledger::CashBook;
use domain_lending::{
    AuditEntry, BackfillReport, CompletedDisbursement, Disbursement, Loan, LoanStatus, Payment,
    PaymentBackfill, PaymentMetadata, PaymentMethod, PaymentStatus, RecordedPayment,
    RepaymentAllocator, TermUnit, TransitionPolicy, WorkflowAction, WorkflowEngine,
};

use crate::error::DatabaseError;
use crate::repositories::{audit, ledger};

/// Repository for the loan aggregate
///
/// Every financial mutation here is one transaction: the loan row is
/// locked for the duration, and the loan's cached totals, its payment
/// rows, and the ledger entries they imply commit or roll back together.
#[derive(Debug, Clone)]
pub struct LoanRepository {
    pool: PgPool,
}

impl LoanRepository {
    /// Creates a new LoanRepository with the given connection pool
    ///
    /// # Arguments
    ///
    /// * `pool` - The PostgreSQL connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Originates a new pending loan
    ///
    /// # Arguments
    ///
    /// * `new_loan` - The loan data to insert
    ///
    /// # Returns
    ///
    /// The created loan in `pending` status
    pub async fn create_loan(&self, new_loan: NewLoan) -> Result<Loan, DatabaseError> {
        let mut loan = Loan::originate(
            new_loan.business,
            new_loan.borrower,
            new_loan.principal,
            new_loan.interest_rate,
            new_loan.term_months,
            new_loan.term_unit,
            new_loan.start_date,
        )?;
        if let Some(purpose) = new_loan.purpose {
            loan = loan.with_purpose(purpose);
        }

        insert_loan(&self.pool, &loan).await?;
        Ok(loan)
    }

    /// Retrieves a loan with its payments
    ///
    /// # Arguments
    ///
    /// * `loan_id` - The loan identifier
    pub async fn get_by_id(&self, loan_id: LoanId) -> Result<Loan, DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        fetch_loan(&mut conn, loan_id).await
    }

    /// Retrieves all loans for a business, oldest first, payments included
    ///
    /// # Arguments
    ///
    /// * `business` - The owning business identifier
    pub async fn find_by_business(&self, business: BusinessId) -> Result<Vec<Loan>, DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        fetch_portfolio(&mut conn, business).await
    }

    /// Records a repayment against an active loan
    ///
    /// One transaction covers the proportional split, the payment row,
    /// the ledger inflow, and the refresh of the loan's cached totals.
    /// The loan row is locked so concurrent repayments on the same loan
    /// serialize.
    ///
    /// # Arguments
    ///
    /// * `loan_id` - The loan being repaid
    /// * `amount_paid` - Amount received, strictly positive
    /// * `paid_date` - Calendar day the borrower paid
    /// * `metadata` - Collection details (method, reference, notes)
    ///
    /// # Returns
    ///
    /// The created payment, the ledger entry id, and whether this
    /// payment closed the loan
    pub async fn record_payment(
        &self,
        loan_id: LoanId,
        amount_paid: Money,
        paid_date: NaiveDate,
        metadata: PaymentMetadata,
    ) -> Result<RecordedPayment, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let mut loan = lock_loan(&mut tx, loan_id).await?;

        // Scratch book; the allocator appends the inflow entry here and
        // only that entry row is persisted.
        let mut book = CashBook::new(loan.business);
        let recorded = RepaymentAllocator::record_payment(
            &mut loan,
            &mut book,
            amount_paid,
            paid_date,
            metadata,
            Utc::now(),
        )?;

        insert_payment(&mut *tx, &recorded.payment).await?;
        let entry = ledger::entry_by_id(&book, recorded.entry_id)?;
        ledger::insert_entry(&mut *tx, entry).await?;
        update_loan_state(&mut *tx, &loan).await?;

        tx.commit().await?;
        Ok(recorded)
    }

    /// Applies a workflow transition and appends its audit entry
    ///
    /// # Arguments
    ///
    /// * `loan_id` - The loan to move
    /// * `actor` - Who is moving it
    /// * `action` - The workflow action taken
    /// * `to_status` - The requested target status
    /// * `comments` - Optional reviewer comments
    /// * `policy` - How strictly the transition table is enforced
    ///
    /// # Returns
    ///
    /// The updated loan and the audit entry recorded for the edge
    pub async fn apply_transition(
        &self,
        loan_id: LoanId,
        actor: ActorId,
        action: WorkflowAction,
        to_status: LoanStatus,
        comments: Option<String>,
        policy: TransitionPolicy,
    ) -> Result<(Loan, AuditEntry), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let mut loan = lock_loan(&mut tx, loan_id).await?;
        let engine = WorkflowEngine::new(policy);
        let audit_entry = engine.transition(&mut loan, actor, action, to_status, comments, Utc::now())?;

        update_loan_state(&mut *tx, &loan).await?;
        audit::insert_audit_entry(&mut *tx, &audit_entry).await?;

        tx.commit().await?;
        Ok((loan, audit_entry))
    }

    /// Pays out an approved loan and activates it
    ///
    /// The balance check and the ledger write are atomic per owner: a
    /// transaction-scoped advisory lock on the owner serializes
    /// concurrent disbursements, so two payouts cannot both pass the
    /// check against the same balance. On failure nothing is written and
    /// the loan stays `approved`.
    ///
    /// # Arguments
    ///
    /// * `loan_id` - The approved loan to pay out
    /// * `actor` - Who authorized the payout
    /// * `comments` - Optional comments for the audit trail
    ///
    /// # Returns
    ///
    /// The activated loan plus the payout record, ledger entry id, and
    /// audit entry
    pub async fn disburse(
        &self,
        loan_id: LoanId,
        actor: ActorId,
        comments: Option<String>,
    ) -> Result<(Loan, CompletedDisbursement), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let mut loan = lock_loan(&mut tx, loan_id).await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(owner_lock_key(loan.business))
            .execute(&mut *tx)
            .await?;

        let mut book = ledger::fetch_cash_book(&mut tx, loan.business).await?;
        let engine = WorkflowEngine::permissive();
        let completed = engine.disburse(&mut loan, &mut book, actor, comments, Utc::now())?;

        let entry = ledger::entry_by_id(&book, completed.entry_id)?;
        ledger::insert_entry(&mut *tx, entry).await?;
        insert_disbursement(&mut *tx, &completed.disbursement).await?;
        audit::insert_audit_entry(&mut *tx, &completed.audit).await?;
        update_loan_state(&mut *tx, &loan).await?;

        tx.commit().await?;
        Ok((loan, completed))
    }

    /// Repairs principal/interest portions on payments recorded before
    /// the proportional split existed
    ///
    /// Runs over every loan in one transaction and rewrites only rows
    /// whose recomputed split differs from what is stored, so a second
    /// run reports zero repairs.
    ///
    /// # Returns
    ///
    /// Counters over all scanned payment rows
    pub async fn backfill_allocations(&self) -> Result<BackfillReport, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let loan_rows = sqlx::query_as::<_, LoanRow>(
            r#"
            SELECT loan_id, business_id, borrower_id, principal, interest_rate,
                   term_months, term_unit, start_date, status, purpose,
                   total_paid, created_at, updated_at
            FROM loans
            ORDER BY loan_id
            FOR UPDATE
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        let mut report = BackfillReport::default();
        for row in loan_rows {
            let loan_id = LoanId::from(row.loan_id);
            let payment_rows = fetch_payment_rows(&mut *tx, loan_id).await?;
            let mut loan = loan_from_rows(row, payment_rows)?;

            let before: Vec<(Money, Money)> = loan
                .payments
                .iter()
                .map(|p| (p.principal_portion, p.interest_portion))
                .collect();

            let loan_report = PaymentBackfill::backfill_loan(&mut loan)?;
            report.scanned += loan_report.scanned;
            report.repaired += loan_report.repaired;
            report.skipped += loan_report.skipped;

            if loan_report.repaired == 0 {
                continue;
            }

            for (payment, (principal_before, interest_before)) in
                loan.payments.iter().zip(before)
            {
                if payment.principal_portion == principal_before
                    && payment.interest_portion == interest_before
                {
                    continue;
                }
                sqlx::query(
                    "UPDATE payments SET principal_portion = $2, interest_portion = $3 WHERE payment_id = $1",
                )
                .bind(Uuid::from(payment.id))
                .bind(payment.principal_portion.amount())
                .bind(payment.interest_portion.amount())
                .execute(&mut *tx)
                .await?;
            }

            sqlx::query("UPDATE loans SET updated_at = $2 WHERE loan_id = $1")
                .bind(Uuid::from(loan.id))
                .bind(loan.updated_at)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        tracing::info!(
            scanned = report.scanned,
            repaired = report.repaired,
            skipped = report.skipped,
            "Allocation backfill committed"
        );
        Ok(report)
    }
}

/// Data for originating a new loan
#[derive(Debug, Clone)]
pub struct NewLoan {
    pub business: BusinessId,
    pub borrower: BorrowerId,
    pub principal: Money,
    pub interest_rate: Rate,
    pub term_months: u32,
    pub term_unit: TermUnit,
    pub start_date: NaiveDate,
    pub purpose: Option<String>,
}

/// Loads a loan with its payments
pub(crate) async fn fetch_loan(
    conn: &mut PgConnection,
    loan_id: LoanId,
) -> Result<Loan, DatabaseError> {
    let row = sqlx::query_as::<_, LoanRow>(
        r#"
        SELECT loan_id, business_id, borrower_id, principal, interest_rate,
               term_months, term_unit, start_date, status, purpose,
               total_paid, created_at, updated_at
        FROM loans
        WHERE loan_id = $1
        "#,
    )
    .bind(Uuid::from(loan_id))
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| DatabaseError::not_found("Loan", loan_id))?;

    let payment_rows = fetch_payment_rows(&mut *conn, loan_id).await?;
    loan_from_rows(row, payment_rows)
}

/// Loads a loan with its payments, locking the loan row
async fn lock_loan(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    loan_id: LoanId,
) -> Result<Loan, DatabaseError> {
    let row = sqlx::query_as::<_, LoanRow>(
        r#"
        SELECT loan_id, business_id, borrower_id, principal, interest_rate,
               term_months, term_unit, start_date, status, purpose,
               total_paid, created_at, updated_at
        FROM loans
        WHERE loan_id = $1
        FOR UPDATE
        "#,
    )
    .bind(Uuid::from(loan_id))
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| DatabaseError::not_found("Loan", loan_id))?;

    let payment_rows = fetch_payment_rows(&mut **tx, loan_id).await?;
    loan_from_rows(row, payment_rows)
}

/// Loads every loan of a business with its payments, oldest loan first
pub(crate) async fn fetch_portfolio(
    conn: &mut PgConnection,
    business: BusinessId,
) -> Result<Vec<Loan>, DatabaseError> {
    let rows = sqlx::query_as::<_, LoanRow>(
        r#"
        SELECT loan_id, business_id, borrower_id, principal, interest_rate,
               term_months, term_unit, start_date, status, purpose,
               total_paid, created_at, updated_at
        FROM loans
        WHERE business_id = $1
        ORDER BY created_at, loan_id
        "#,
    )
    .bind(Uuid::from(business))
    .fetch_all(&mut *conn)
    .await?;

    let loan_ids: Vec<Uuid> = rows.iter().map(|r| r.loan_id).collect();
    let payment_rows = sqlx::query_as::<_, PaymentRow>(
        r#"
        SELECT payment_id, loan_id, amount_paid, principal_portion,
               interest_portion, fee_portion, penalty_portion, paid_date,
               status, method, transaction_reference, notes, recorded_at
        FROM payments
        WHERE loan_id = ANY($1)
        ORDER BY recorded_at, payment_id
        "#,
    )
    .bind(&loan_ids)
    .fetch_all(&mut *conn)
    .await?;

    let mut grouped: HashMap<Uuid, Vec<PaymentRow>> = HashMap::new();
    for payment in payment_rows {
        grouped.entry(payment.loan_id).or_default().push(payment);
    }

    rows.into_iter()
        .map(|row| {
            let payments = grouped.remove(&row.loan_id).unwrap_or_default();
            loan_from_rows(row, payments)
        })
        .collect()
}

async fn fetch_payment_rows<'e>(
    executor: impl PgExecutor<'e>,
    loan_id: LoanId,
) -> Result<Vec<PaymentRow>, DatabaseError> {
    let rows = sqlx::query_as::<_, PaymentRow>(
        r#"
        SELECT payment_id, loan_id, amount_paid, principal_portion,
               interest_portion, fee_portion, penalty_portion, paid_date,
               status, method, transaction_reference, notes, recorded_at
        FROM payments
        WHERE loan_id = $1
        ORDER BY recorded_at, payment_id
        "#,
    )
    .bind(Uuid::from(loan_id))
    .fetch_all(executor)
    .await?;

    Ok(rows)
}

async fn insert_loan<'e>(executor: impl PgExecutor<'e>, loan: &Loan) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO loans (
            loan_id, business_id, borrower_id, principal, interest_rate,
            term_months, term_unit, start_date, status, purpose,
            total_paid, created_at, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        "#,
    )
    .bind(Uuid::from(loan.id))
    .bind(Uuid::from(loan.business))
    .bind(Uuid::from(loan.borrower))
    .bind(loan.principal.amount())
    .bind(loan.interest_rate.as_percentage())
    .bind(loan.term_months as i32)
    .bind(loan.term_unit.as_str())
    .bind(loan.start_date)
    .bind(loan.status.as_str())
    .bind(loan.purpose.as_deref())
    .bind(loan.total_paid.amount())
    .bind(loan.created_at)
    .bind(loan.updated_at)
    .execute(executor)
    .await?;

    Ok(())
}

async fn insert_payment<'e>(
    executor: impl PgExecutor<'e>,
    payment: &Payment,
) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO payments (
            payment_id, loan_id, amount_paid, principal_portion,
            interest_portion, fee_portion, penalty_portion, paid_date,
            status, method, transaction_reference, notes, recorded_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        "#,
    )
    .bind(Uuid::from(payment.id))
    .bind(Uuid::from(payment.loan_id))
    .bind(payment.amount_paid.amount())
    .bind(payment.principal_portion.amount())
    .bind(payment.interest_portion.amount())
    .bind(payment.fee_portion.amount())
    .bind(payment.penalty_portion.amount())
    .bind(payment.paid_date)
    .bind(payment.status.as_str())
    .bind(payment.method.as_str())
    .bind(payment.transaction_reference.as_deref())
    .bind(payment.notes.as_deref())
    .bind(payment.recorded_at)
    .execute(executor)
    .await?;

    Ok(())
}

async fn insert_disbursement<'e>(
    executor: impl PgExecutor<'e>,
    disbursement: &Disbursement,
) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO disbursements (
            disbursement_id, loan_id, amount, method, status,
            reference, disbursed_at, processed_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(Uuid::from(disbursement.id))
    .bind(Uuid::from(disbursement.loan_id))
    .bind(disbursement.amount.amount())
    .bind(disbursement.method.as_str())
    .bind(disbursement.status.as_str())
    .bind(disbursement.reference.as_deref())
    .bind(disbursement.disbursed_at)
    .bind(disbursement.processed_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// Writes back the loan fields that change after origination
async fn update_loan_state<'e>(
    executor: impl PgExecutor<'e>,
    loan: &Loan,
) -> Result<(), DatabaseError> {
    sqlx::query("UPDATE loans SET status = $2, total_paid = $3, updated_at = $4 WHERE loan_id = $1")
        .bind(Uuid::from(loan.id))
        .bind(loan.status.as_str())
        .bind(loan.total_paid.amount())
        .bind(loan.updated_at)
        .execute(executor)
        .await?;

    Ok(())
}

/// Advisory lock key for an owner, from the first eight bytes of the id
fn owner_lock_key(owner: BusinessId) -> i64 {
    let bytes = owner.as_uuid().as_bytes();
    i64::from_be_bytes([
        bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
    ])
}

/// Maps a loan row and its payment rows onto the domain aggregate
pub(crate) fn loan_from_rows(
    row: LoanRow,
    payment_rows: Vec<PaymentRow>,
) -> Result<Loan, DatabaseError> {
    let payments = payment_rows
        .into_iter()
        .map(payment_from_row)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Loan {
        id: LoanId::from(row.loan_id),
        business: BusinessId::from(row.business_id),
        borrower: BorrowerId::from(row.borrower_id),
        principal: Money::new(row.principal),
        interest_rate: Rate::from_percentage(row.interest_rate),
        term_months: row.term_months as u32,
        term_unit: parse_term_unit(&row.term_unit)?,
        start_date: row.start_date,
        status: parse_loan_status(&row.status)?,
        purpose: row.purpose,
        total_paid: Money::new(row.total_paid),
        payments,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn payment_from_row(row: PaymentRow) -> Result<Payment, DatabaseError> {
    Ok(Payment {
        id: PaymentId::from(row.payment_id),
        loan_id: LoanId::from(row.loan_id),
        amount_paid: Money::new(row.amount_paid),
        principal_portion: Money::new(row.principal_portion),
        interest_portion: Money::new(row.interest_portion),
        fee_portion: Money::new(row.fee_portion),
        penalty_portion: Money::new(row.penalty_portion),
        paid_date: row.paid_date,
        status: parse_payment_status(&row.status)?,
        method: parse_payment_method(&row.method)?,
        transaction_reference: row.transaction_reference,
        notes: row.notes,
        recorded_at: row.recorded_at,
    })
}

pub(crate) fn parse_loan_status(value: &str) -> Result<LoanStatus, DatabaseError> {
    match value {
        "pending" => Ok(LoanStatus::Pending),
        "submitted" => Ok(LoanStatus::Submitted),
        "approved" => Ok(LoanStatus::Approved),
        "active" => Ok(LoanStatus::Active),
        "closed" => Ok(LoanStatus::Closed),
        "defaulted" => Ok(LoanStatus::Defaulted),
        "rejected" => Ok(LoanStatus::Rejected),
        "cancelled" => Ok(LoanStatus::Cancelled),
        other => Err(DatabaseError::SerializationError(format!(
            "Unknown loan status '{other}'"
        ))),
    }
}

fn parse_term_unit(value: &str) -> Result<TermUnit, DatabaseError> {
    match value {
        "days" => Ok(TermUnit::Days),
        "weeks" => Ok(TermUnit::Weeks),
        "months" => Ok(TermUnit::Months),
        "years" => Ok(TermUnit::Years),
        other => Err(DatabaseError::SerializationError(format!(
            "Unknown term unit '{other}'"
        ))),
    }
}

fn parse_payment_status(value: &str) -> Result<PaymentStatus, DatabaseError> {
    match value {
        "paid" => Ok(PaymentStatus::Paid),
        "pending" => Ok(PaymentStatus::Pending),
        "failed" => Ok(PaymentStatus::Failed),
        other => Err(DatabaseError::SerializationError(format!(
            "Unknown payment status '{other}'"
        ))),
    }
}

fn parse_payment_method(value: &str) -> Result<PaymentMethod, DatabaseError> {
    match value {
        "cash" => Ok(PaymentMethod::Cash),
        "bank_transfer" => Ok(PaymentMethod::BankTransfer),
        "mobile_money" => Ok(PaymentMethod::MobileMoney),
        "cheque" => Ok(PaymentMethod::Cheque),
        "other" => Ok(PaymentMethod::Other),
        other => Err(DatabaseError::SerializationError(format!(
            "Unknown payment method '{other}'"
        ))),
    }
}

/// Database row for a loan
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LoanRow {
    pub loan_id: Uuid,
    pub business_id: Uuid,
    pub borrower_id: Uuid,
    pub principal: Decimal,
    /// Flat rate in percent, as stored
    pub interest_rate: Decimal,
    pub term_months: i32,
    pub term_unit: String,
    pub start_date: NaiveDate,
    pub status: String,
    pub purpose: Option<String>,
    pub total_paid: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database row for a payment
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PaymentRow {
    pub payment_id: Uuid,
    pub loan_id: Uuid,
    pub amount_paid: Decimal,
    pub principal_portion: Decimal,
    pub interest_portion: Decimal,
    pub fee_portion: Decimal,
    pub penalty_portion: Decimal,
    pub paid_date: NaiveDate,
    pub status: String,
    pub method: String,
    pub transaction_reference: Option<String>,
    pub notes: Option<String>,
    pub recorded_at: DateTime<Utc>,
}
