//! Party repository implementation
//!
//! Businesses and borrowers are thin identity records; the interesting
//! state hangs off them through loans and the ledger.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{BorrowerId, BusinessId};

use crate::error::DatabaseError;

/// Repository for business owners and their borrowers
#[derive(Debug, Clone)]
pub struct PartyRepository {
    pool: PgPool,
}

impl PartyRepository {
    /// Creates a new PartyRepository with the given connection pool
    ///
    /// # Arguments
    ///
    /// * `pool` - The PostgreSQL connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Registers a new business
    ///
    /// The business starts with zero working capital; capital arrives
    /// through the ledger's capital operations.
    ///
    /// # Arguments
    ///
    /// * `name` - Display name of the business
    pub async fn create_business(&self, name: &str) -> Result<BusinessRow, DatabaseError> {
        let business_id = BusinessId::new_v7();
        let now = Utc::now();

        let row = sqlx::query_as::<_, BusinessRow>(
            r#"
            INSERT INTO businesses (business_id, name, working_capital, created_at, updated_at)
            VALUES ($1, $2, 0, $3, $3)
            RETURNING business_id, name, working_capital, created_at, updated_at
            "#,
        )
        .bind(Uuid::from(business_id))
        .bind(name)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Retrieves a business by its identifier
    ///
    /// # Arguments
    ///
    /// * `business_id` - The business identifier
    pub async fn get_business(&self, business_id: BusinessId) -> Result<BusinessRow, DatabaseError> {
        let row = sqlx::query_as::<_, BusinessRow>(
            r#"
            SELECT business_id, name, working_capital, created_at, updated_at
            FROM businesses
            WHERE business_id = $1
            "#,
        )
        .bind(Uuid::from(business_id))
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Business", business_id))?;

        Ok(row)
    }

    /// Registers a borrower under a business
    ///
    /// # Arguments
    ///
    /// * `business_id` - The business the borrower belongs to
    /// * `name` - Borrower's display name
    /// * `phone` - Optional contact number
    pub async fn create_borrower(
        &self,
        business_id: BusinessId,
        name: &str,
        phone: Option<&str>,
    ) -> Result<BorrowerRow, DatabaseError> {
        let borrower_id = BorrowerId::new_v7();
        let now = Utc::now();

        let row = sqlx::query_as::<_, BorrowerRow>(
            r#"
            INSERT INTO borrowers (borrower_id, business_id, name, phone, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING borrower_id, business_id, name, phone, created_at
            "#,
        )
        .bind(Uuid::from(borrower_id))
        .bind(Uuid::from(business_id))
        .bind(name)
        .bind(phone)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Retrieves a borrower by identifier
    ///
    /// # Arguments
    ///
    /// * `borrower_id` - The borrower identifier
    pub async fn get_borrower(&self, borrower_id: BorrowerId) -> Result<BorrowerRow, DatabaseError> {
        let row = sqlx::query_as::<_, BorrowerRow>(
            r#"
            SELECT borrower_id, business_id, name, phone, created_at
            FROM borrowers
            WHERE borrower_id = $1
            "#,
        )
        .bind(Uuid::from(borrower_id))
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Borrower", borrower_id))?;

        Ok(row)
    }

    /// Lists the borrowers registered under a business
    ///
    /// # Arguments
    ///
    /// * `business_id` - The business identifier
    pub async fn find_borrowers(
        &self,
        business_id: BusinessId,
    ) -> Result<Vec<BorrowerRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, BorrowerRow>(
            r#"
            SELECT borrower_id, business_id, name, phone, created_at
            FROM borrowers
            WHERE business_id = $1
            ORDER BY name
            "#,
        )
        .bind(Uuid::from(business_id))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

/// Database row for a business
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BusinessRow {
    pub business_id: Uuid,
    pub name: String,
    pub working_capital: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database row for a borrower
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BorrowerRow {
    pub borrower_id: Uuid,
    pub business_id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}
