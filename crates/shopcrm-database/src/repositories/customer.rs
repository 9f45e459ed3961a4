//! Customer repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use shopcrm_core::error::{AppError, ErrorKind};
use shopcrm_core::result::AppResult;
use shopcrm_core::types::id::CustomerId;
use shopcrm_entity::customer::CustomerContact;

use crate::store::CustomerStore;

/// PostgreSQL-backed customer directory.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    /// Create a new customer repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerStore for CustomerRepository {
    async fn find_contact(&self, id: CustomerId) -> AppResult<Option<CustomerContact>> {
        sqlx::query_as::<_, CustomerContact>(
            "SELECT name, email, phone FROM customers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load customer contact", e)
        })
    }
}
