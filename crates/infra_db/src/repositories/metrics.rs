//! Metrics repository implementation
//!
//! Dashboard reads load the owner's cash book and full loan portfolio
//! inside one repeatable-read transaction, so every aggregate in a
//! summary comes from the same snapshot.

use chrono::NaiveDate;
use sqlx::PgPool;

use core_kernel::BusinessId;
use domain_ledger::CashBook;
use domain_lending::Loan;
use domain_metrics::{MetricsEngine, PortfolioSummary, ReconciliationReport};

use crate::error::DatabaseError;
use crate::repositories::{ledger, loans};

/// Repository for portfolio metrics reads
#[derive(Debug, Clone)]
pub struct MetricsRepository {
    pool: PgPool,
}

impl MetricsRepository {
    /// Creates a new MetricsRepository with the given connection pool
    ///
    /// # Arguments
    ///
    /// * `pool` - The PostgreSQL connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Computes the dashboard summary for a business
    ///
    /// # Arguments
    ///
    /// * `owner` - The business identifier
    /// * `today` - The reporting date the due/overdue windows anchor on
    pub async fn portfolio_summary(
        &self,
        owner: BusinessId,
        today: NaiveDate,
    ) -> Result<PortfolioSummary, DatabaseError> {
        let (book, loans) = self.load_snapshot(owner).await?;
        let engine = MetricsEngine::new(&book, &loans, today)?;
        Ok(engine.summary())
    }

    /// Cross-checks the metrics balance against the ledger balance
    ///
    /// Findings are logged, never raised; the report carries the delta
    /// for callers that want to act on it.
    ///
    /// # Arguments
    ///
    /// * `owner` - The business identifier
    /// * `today` - The reporting date
    pub async fn reconcile(
        &self,
        owner: BusinessId,
        today: NaiveDate,
    ) -> Result<ReconciliationReport, DatabaseError> {
        let (book, loans) = self.load_snapshot(owner).await?;
        let engine = MetricsEngine::new(&book, &loans, today)?;
        Ok(engine.reconcile())
    }

    /// Loads the cash book and loan portfolio from one snapshot
    async fn load_snapshot(
        &self,
        owner: BusinessId,
    ) -> Result<(CashBook, Vec<Loan>), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
            .execute(&mut *tx)
            .await?;

        let book = ledger::fetch_cash_book(&mut tx, owner).await?;
        let loans = loans::fetch_portfolio(&mut tx, owner).await?;

        tx.commit().await?;
        Ok((book, loans))
    }
}
