//! Unit of Work Pattern Implementation
//!
//! Provides transactional boundaries for database operations.
//! A `TransactionContext` persists its work only through `commit`; dropping
//! it on any other path rolls the transaction back.

use sqlx::{PgPool, Postgres, Transaction};
use std::sync::Arc;

/// Scoped transaction that wraps a SQLx transaction.
///
/// SQLx rolls an uncommitted transaction back when it is dropped, so every
/// early return between `begin` and `commit` leaves the database untouched.
pub struct TransactionContext {
    tx: Transaction<'static, Postgres>,
}

impl TransactionContext {
    /// Create a new transaction context.
    pub fn new(tx: Transaction<'static, Postgres>) -> Self {
        Self { tx }
    }

    /// Get a reference to the underlying transaction for query execution.
    pub fn as_mut(&mut self) -> &mut Transaction<'static, Postgres> {
        &mut self.tx
    }

    /// Commit the transaction.
    pub async fn commit(self) -> Result<(), sqlx::Error> {
        self.tx.commit().await
    }

    /// Roll the transaction back explicitly.
    pub async fn rollback(self) -> Result<(), sqlx::Error> {
        self.tx.rollback().await
    }
}

/// PostgreSQL Unit of Work implementation.
#[derive(Clone)]
pub struct PgUnitOfWork {
    pool: Arc<PgPool>,
}

impl PgUnitOfWork {
    /// Create a new Unit of Work instance.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Create from a PgPool directly.
    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Begin a new transaction.
    pub async fn begin(&self) -> Result<TransactionContext, sqlx::Error> {
        let tx = self.pool.begin().await?;
        Ok(TransactionContext::new(tx))
    }

    /// Pool used for single-statement reads.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
