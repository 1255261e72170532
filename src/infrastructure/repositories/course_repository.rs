//! Course Repository Implementation
//!
//! Persists the course aggregate without an ORM. Writes run a write plan in
//! one transaction and stop at the first failing statement; reads issue a
//! single LEFT JOIN query and decode the fan-out rows.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::course_decoder::CourseAssembler;
use super::course_store::{CourseStatement, CourseStore, CourseTransaction, PgCourseStore};
use super::write_plan::{create_plan, delete_plan, update_plan};
use crate::domain::{Course, CourseRepository};
use crate::shared::error::{Operation, PersistenceError};

/// Course repository over any `CourseStore`.
///
/// Every operation runs under `deadline`. When it expires the in-flight
/// future is dropped together with its transaction, which rolls back.
pub struct AggregateCourseRepository<S> {
    store: S,
    deadline: Duration,
}

/// PostgreSQL-backed course repository.
pub type PgCourseRepository = AggregateCourseRepository<PgCourseStore>;

impl PgCourseRepository {
    /// Creates a repository over the given connection pool.
    pub fn from_pool(pool: PgPool, deadline: Duration) -> Self {
        Self::new(PgCourseStore::new(pool), deadline)
    }
}

impl<S: CourseStore> AggregateCourseRepository<S> {
    pub fn new(store: S, deadline: Duration) -> Self {
        Self { store, deadline }
    }

    async fn with_deadline<T>(
        &self,
        operation: Operation,
        work: impl Future<Output = Result<T, PersistenceError>>,
    ) -> Result<T, PersistenceError> {
        match tokio::time::timeout(self.deadline, work).await {
            Ok(result) => result,
            Err(_) => {
                let timeout_ms = u64::try_from(self.deadline.as_millis()).unwrap_or(u64::MAX);
                tracing::warn!(%operation, timeout_ms, "Course operation exceeded its deadline");
                Err(PersistenceError::Timeout {
                    operation,
                    timeout_ms,
                })
            }
        }
    }

    /// Execute `plan` atomically.
    async fn run_plan(
        &self,
        operation: Operation,
        course_id: Uuid,
        plan: Vec<CourseStatement>,
    ) -> Result<(), PersistenceError> {
        let mut tx = self
            .store
            .begin()
            .await
            .map_err(|source| PersistenceError::Begin { operation, source })?;

        for statement in &plan {
            let outcome = match tx.execute(statement).await {
                Ok(0) if statement.must_affect_row() => Err(sqlx::Error::RowNotFound),
                Ok(_) => Ok(()),
                Err(e) => Err(e),
            };
            if let Err(source) = outcome {
                let phase = statement.phase();
                tracing::warn!(
                    %course_id,
                    %operation,
                    %phase,
                    error = %source,
                    "Statement failed, rolling back"
                );
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!(%course_id, %operation, error = %rollback_err, "Rollback failed");
                }
                return Err(PersistenceError::Statement {
                    operation,
                    phase,
                    source,
                });
            }
        }

        tx.commit()
            .await
            .map_err(|source| PersistenceError::Commit { operation, source })?;

        tracing::debug!(%course_id, %operation, statements = plan.len(), "Transaction committed");
        Ok(())
    }
}

#[async_trait]
impl<S: CourseStore> CourseRepository for AggregateCourseRepository<S> {
    async fn create(&self, course: &Course) -> Result<(), PersistenceError> {
        let plan = create_plan(course);
        self.with_deadline(
            Operation::Create,
            self.run_plan(Operation::Create, course.id, plan),
        )
        .await
    }

    async fn read_one(&self, id: Uuid) -> Result<Course, PersistenceError> {
        self.with_deadline(Operation::ReadOne, async {
            let rows = self
                .store
                .fetch_graph(id)
                .await
                .map_err(|e| PersistenceError::from_read(Operation::ReadOne, e))?;

            let row_count = rows.len();
            let mut assembler = CourseAssembler::new(Operation::ReadOne);
            for row in rows {
                assembler.push_graph_row(row)?;
            }

            let course = assembler
                .finish()
                .into_iter()
                .find(|c| c.id == id)
                .unwrap_or_default();

            tracing::debug!(course_id = %id, rows = row_count, found = !course.is_empty(), "Course graph loaded");
            Ok(course)
        })
        .await
    }

    async fn read_many(&self, limit: u32, offset: u32) -> Result<Vec<Course>, PersistenceError> {
        self.with_deadline(Operation::ReadMany, async {
            let rows = self
                .store
                .fetch_listing(limit, offset)
                .await
                .map_err(|e| PersistenceError::from_read(Operation::ReadMany, e))?;

            let row_count = rows.len();
            let mut assembler = CourseAssembler::new(Operation::ReadMany);
            for row in rows {
                assembler.push_listing_row(row)?;
            }

            let courses = assembler.finish();
            tracing::debug!(limit, offset, rows = row_count, courses = courses.len(), "Course page loaded");
            Ok(courses)
        })
        .await
    }

    async fn update(&self, id: Uuid, course: &Course) -> Result<(), PersistenceError> {
        let plan = update_plan(id, course);
        self.with_deadline(Operation::Update, self.run_plan(Operation::Update, id, plan))
            .await
    }

    async fn delete(&self, id: Uuid) -> Result<(), PersistenceError> {
        self.with_deadline(
            Operation::Delete,
            self.run_plan(Operation::Delete, id, delete_plan(id)),
        )
        .await
    }
}
