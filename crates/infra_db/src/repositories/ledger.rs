//! Ledger repository implementation
//!
//! This module provides database access for the append-only cash book.
//! Entries are inserted and read, never updated or deleted; balances are
//! recomputed from the entry set on every read.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgExecutor, PgPool};
use uuid::Uuid;

use core_kernel::{BusinessId, EntryId, LoanId, Money};
use domain_ledger::{CashBook, CashMovements, EntryCategory, EntryType, LedgerEntry};

use crate::error::DatabaseError;

/// Repository for a business's cash book
///
/// Capital operations lock the owning business row so the stored
/// working-capital figure and the entry it implies move together.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: PgPool,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository with the given connection pool
    ///
    /// # Arguments
    ///
    /// * `pool` - The PostgreSQL connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Records a generic cash movement
    ///
    /// # Arguments
    ///
    /// * `owner` - Business whose cash book receives the entry
    /// * `entry_type` - Direction of the movement
    /// * `category` - Business category
    /// * `amount` - Amount moved, strictly positive
    /// * `occurred_at` - When the movement happened
    ///
    /// # Returns
    ///
    /// The identifier of the new entry
    pub async fn record_entry(
        &self,
        owner: BusinessId,
        entry_type: EntryType,
        category: EntryCategory,
        amount: Money,
        occurred_at: DateTime<Utc>,
    ) -> Result<EntryId, DatabaseError> {
        let entry = LedgerEntry::new(owner, entry_type, category, amount, occurred_at)?;
        insert_entry(&self.pool, &entry).await?;
        Ok(entry.id)
    }

    /// Adds working capital to a business
    ///
    /// Appends an inflow/capital_injection entry and raises the stored
    /// working-capital figure in the same transaction.
    ///
    /// # Arguments
    ///
    /// * `owner` - The business identifier
    /// * `amount` - Capital added, at least 0.01
    /// * `occurred_at` - When the capital arrived
    pub async fn inject_capital(
        &self,
        owner: BusinessId,
        amount: Money,
        occurred_at: DateTime<Utc>,
    ) -> Result<EntryId, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let working_capital = lock_working_capital(&mut tx, owner).await?;
        let mut book = CashBook::from_parts(owner, working_capital, Vec::new())?;
        let entry_id = book.inject_capital(amount, occurred_at)?;

        let entry = entry_by_id(&book, entry_id)?;
        insert_entry(&mut *tx, entry).await?;
        update_working_capital(&mut tx, owner, book.working_capital()).await?;

        tx.commit().await?;
        Ok(entry_id)
    }

    /// Sets the working-capital figure to a new total
    ///
    /// The difference against the current figure is recorded as a
    /// capital injection or withdrawal entry. Setting the same total is
    /// a no-op and returns `None`.
    ///
    /// # Arguments
    ///
    /// * `owner` - The business identifier
    /// * `new_total` - The new working-capital figure, non-negative
    /// * `occurred_at` - When the adjustment happened
    pub async fn adjust_working_capital(
        &self,
        owner: BusinessId,
        new_total: Money,
        occurred_at: DateTime<Utc>,
    ) -> Result<Option<EntryId>, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let working_capital = lock_working_capital(&mut tx, owner).await?;
        let mut book = CashBook::from_parts(owner, working_capital, Vec::new())?;
        let entry_id = book.adjust_working_capital(new_total, occurred_at)?;

        if let Some(entry_id) = entry_id {
            let entry = entry_by_id(&book, entry_id)?;
            insert_entry(&mut *tx, entry).await?;
            update_working_capital(&mut tx, owner, book.working_capital()).await?;
        }

        tx.commit().await?;
        Ok(entry_id)
    }

    /// Records an operating expense
    ///
    /// # Arguments
    ///
    /// * `owner` - The business identifier
    /// * `amount` - Expense amount, strictly positive
    /// * `description` - What the money was spent on
    /// * `occurred_at` - When the expense was paid
    pub async fn record_expense(
        &self,
        owner: BusinessId,
        amount: Money,
        description: &str,
        occurred_at: DateTime<Utc>,
    ) -> Result<EntryId, DatabaseError> {
        let entry = CashMovements::expense(owner, amount, description, occurred_at)?;
        insert_entry(&self.pool, &entry).await?;
        Ok(entry.id)
    }

    /// Current cash balance for a business: `Σ inflow − Σ outflow`
    ///
    /// Computed fresh from the stored entries. A business with no
    /// entries has a zero balance.
    ///
    /// # Arguments
    ///
    /// * `owner` - The business identifier
    pub async fn current_balance(&self, owner: BusinessId) -> Result<Money, DatabaseError> {
        let balance: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(
                CASE WHEN entry_type = 'inflow' THEN amount ELSE -amount END
            ), 0)
            FROM ledger_entries
            WHERE owner_id = $1
            "#,
        )
        .bind(Uuid::from(owner))
        .fetch_one(&self.pool)
        .await?;

        Ok(Money::new(balance))
    }

    /// Retrieves all entries for a business, oldest first
    ///
    /// # Arguments
    ///
    /// * `owner` - The business identifier
    pub async fn find_entries(&self, owner: BusinessId) -> Result<Vec<LedgerEntry>, DatabaseError> {
        fetch_entries(&self.pool, owner).await
    }

    /// Rebuilds the full cash book for a business
    ///
    /// # Arguments
    ///
    /// * `owner` - The business identifier
    pub async fn load_cash_book(&self, owner: BusinessId) -> Result<CashBook, DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        fetch_cash_book(&mut conn, owner).await
    }
}

/// Inserts one ledger entry row
pub(crate) async fn insert_entry<'e>(
    executor: impl PgExecutor<'e>,
    entry: &LedgerEntry,
) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO ledger_entries (
            entry_id, owner_id, entry_type, category,
            amount, occurred_at, description, loan_id
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(Uuid::from(entry.id))
    .bind(Uuid::from(entry.owner))
    .bind(entry.entry_type.as_str())
    .bind(entry.category.as_str())
    .bind(entry.amount.amount())
    .bind(entry.occurred_at)
    .bind(entry.description.as_deref())
    .bind(entry.loan_id.map(Uuid::from))
    .execute(executor)
    .await?;

    Ok(())
}

/// Loads all entries for a business, oldest first
pub(crate) async fn fetch_entries<'e>(
    executor: impl PgExecutor<'e>,
    owner: BusinessId,
) -> Result<Vec<LedgerEntry>, DatabaseError> {
    let rows = sqlx::query_as::<_, LedgerEntryRow>(
        r#"
        SELECT entry_id, owner_id, entry_type, category,
               amount, occurred_at, description, loan_id
        FROM ledger_entries
        WHERE owner_id = $1
        ORDER BY occurred_at, entry_id
        "#,
    )
    .bind(Uuid::from(owner))
    .fetch_all(executor)
    .await?;

    rows.into_iter().map(LedgerEntryRow::into_domain).collect()
}

/// Rebuilds the cash book from the business row and its entries
pub(crate) async fn fetch_cash_book(
    conn: &mut PgConnection,
    owner: BusinessId,
) -> Result<CashBook, DatabaseError> {
    let working_capital = fetch_working_capital(&mut *conn, owner).await?;
    let entries = fetch_entries(&mut *conn, owner).await?;
    let book = CashBook::from_parts(owner, working_capital, entries)?;
    Ok(book)
}

async fn fetch_working_capital<'e>(
    executor: impl PgExecutor<'e>,
    owner: BusinessId,
) -> Result<Money, DatabaseError> {
    let working_capital: Decimal =
        sqlx::query_scalar("SELECT working_capital FROM businesses WHERE business_id = $1")
            .bind(Uuid::from(owner))
            .fetch_optional(executor)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Business", owner))?;

    Ok(Money::new(working_capital))
}

/// Locks the business row and returns the stored working capital
async fn lock_working_capital(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    owner: BusinessId,
) -> Result<Money, DatabaseError> {
    let working_capital: Decimal = sqlx::query_scalar(
        "SELECT working_capital FROM businesses WHERE business_id = $1 FOR UPDATE",
    )
    .bind(Uuid::from(owner))
    .fetch_optional(&mut **tx)
    .await?
    .ok_or_else(|| DatabaseError::not_found("Business", owner))?;

    Ok(Money::new(working_capital))
}

async fn update_working_capital(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    owner: BusinessId,
    working_capital: Money,
) -> Result<(), DatabaseError> {
    sqlx::query("UPDATE businesses SET working_capital = $2, updated_at = $3 WHERE business_id = $1")
        .bind(Uuid::from(owner))
        .bind(working_capital.amount())
        .bind(Utc::now())
        .execute(&mut **tx)
        .await?;

    Ok(())
}

/// Finds an entry the domain appended to an in-memory book
pub(crate) fn entry_by_id(book: &CashBook, entry_id: EntryId) -> Result<&LedgerEntry, DatabaseError> {
    book.entries()
        .iter()
        .find(|e| e.id == entry_id)
        .ok_or_else(|| {
            DatabaseError::TransactionFailed(format!(
                "Entry {} missing from in-memory cash book",
                entry_id
            ))
        })
}

/// Database row for a ledger entry
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LedgerEntryRow {
    pub entry_id: Uuid,
    pub owner_id: Uuid,
    pub entry_type: String,
    pub category: String,
    pub amount: Decimal,
    pub occurred_at: DateTime<Utc>,
    pub description: Option<String>,
    pub loan_id: Option<Uuid>,
}

impl LedgerEntryRow {
    /// Maps the row onto the domain entry type
    pub fn into_domain(self) -> Result<LedgerEntry, DatabaseError> {
        Ok(LedgerEntry {
            id: EntryId::from(self.entry_id),
            owner: BusinessId::from(self.owner_id),
            entry_type: parse_entry_type(&self.entry_type)?,
            category: parse_entry_category(&self.category)?,
            amount: Money::new(self.amount),
            occurred_at: self.occurred_at,
            description: self.description,
            loan_id: self.loan_id.map(LoanId::from),
        })
    }
}

fn parse_entry_type(value: &str) -> Result<EntryType, DatabaseError> {
    match value {
        "inflow" => Ok(EntryType::Inflow),
        "outflow" => Ok(EntryType::Outflow),
        other => Err(DatabaseError::SerializationError(format!(
            "Unknown entry type '{other}'"
        ))),
    }
}

fn parse_entry_category(value: &str) -> Result<EntryCategory, DatabaseError> {
    match value {
        "capital_injection" => Ok(EntryCategory::CapitalInjection),
        "capital_withdrawal" => Ok(EntryCategory::CapitalWithdrawal),
        "disbursement" => Ok(EntryCategory::Disbursement),
        "repayment" => Ok(EntryCategory::Repayment),
        "expense" => Ok(EntryCategory::Expense),
        "other" => Ok(EntryCategory::Other),
        other => Err(DatabaseError::SerializationError(format!(
            "Unknown entry category '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trip() {
        for category in [
            EntryCategory::CapitalInjection,
            EntryCategory::CapitalWithdrawal,
            EntryCategory::Disbursement,
            EntryCategory::Repayment,
            EntryCategory::Expense,
            EntryCategory::Other,
        ] {
            assert_eq!(parse_entry_category(category.as_str()).unwrap(), category);
        }
        assert!(parse_entry_category("dividend").is_err());
    }

    #[test]
    fn test_entry_type_round_trip() {
        assert_eq!(parse_entry_type("inflow").unwrap(), EntryType::Inflow);
        assert_eq!(parse_entry_type("outflow").unwrap(), EntryType::Outflow);
        assert!(parse_entry_type("sideways").is_err());
    }
}
