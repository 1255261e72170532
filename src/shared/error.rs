//! Application Error Types
//!
//! `PersistenceError` carries the failure kinds of the course persistence
//! layer. `AppError` is the HTTP-facing error with Axum integration.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;

/// Repository operation an error happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    ReadOne,
    ReadMany,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Create => "create course",
            Operation::ReadOne => "read course",
            Operation::ReadMany => "read courses",
            Operation::Update => "update course",
            Operation::Delete => "delete course",
        })
    }
}

/// Step of a write plan. The display text is the phase label carried by
/// statement failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WritePhase {
    InsertCourse,
    LinkTag,
    InsertGallery,
    InsertSection,
    InsertLesson,
    UpdateCourse,
    UnlinkTags,
    UpsertGallery,
    UpsertSection,
    UpsertLesson,
    DeleteTagLinks,
    DeleteReviewLinks,
    DeleteGallery,
    DeleteLessons,
    DeleteSections,
    DeleteCourse,
}

impl fmt::Display for WritePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WritePhase::InsertCourse => "failed to create course",
            WritePhase::LinkTag => "failed to link course to tag",
            WritePhase::InsertGallery => "failed to create gallery item",
            WritePhase::InsertSection => "failed to create section",
            WritePhase::InsertLesson => "failed to create lesson",
            WritePhase::UpdateCourse => "failed to update course details",
            WritePhase::UnlinkTags => "failed to delete existing tags for the course",
            WritePhase::UpsertGallery => "failed to update or insert gallery item",
            WritePhase::UpsertSection => "failed to update or insert section",
            WritePhase::UpsertLesson => "failed to update or insert lesson",
            WritePhase::DeleteTagLinks => "failed to delete CourseTags associations",
            WritePhase::DeleteReviewLinks => "failed to delete CourseReviews associations",
            WritePhase::DeleteGallery => "failed to delete CourseGallery",
            WritePhase::DeleteLessons => "failed to delete CourseLessons",
            WritePhase::DeleteSections => "failed to delete CourseSections",
            WritePhase::DeleteCourse => "failed to delete Course",
        })
    }
}

/// Course persistence failures.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("{operation}: failed to begin transaction: {source}")]
    Begin {
        operation: Operation,
        source: sqlx::Error,
    },

    #[error("{operation}: {phase}: {source}")]
    Statement {
        operation: Operation,
        phase: WritePhase,
        source: sqlx::Error,
    },

    #[error("{operation}: failed to commit transaction: {source}")]
    Commit {
        operation: Operation,
        source: sqlx::Error,
    },

    #[error("{operation}: failed to query rows: {source}")]
    Query {
        operation: Operation,
        source: sqlx::Error,
    },

    #[error("{operation}: failed to scan row: {message}")]
    Decode {
        operation: Operation,
        message: String,
    },

    #[error("{operation}: exceeded deadline of {timeout_ms}ms")]
    Timeout { operation: Operation, timeout_ms: u64 },
}

impl PersistenceError {
    /// Classify a read failure. Column decoding problems are scan errors,
    /// everything else is a query error.
    pub fn from_read(operation: Operation, err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::Decode(_)
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::ColumnIndexOutOfBounds { .. } => PersistenceError::Decode {
                operation,
                message: err.to_string(),
            },
            source => PersistenceError::Query { operation, source },
        }
    }

    pub fn operation(&self) -> Operation {
        match self {
            PersistenceError::Begin { operation, .. }
            | PersistenceError::Statement { operation, .. }
            | PersistenceError::Commit { operation, .. }
            | PersistenceError::Query { operation, .. }
            | PersistenceError::Decode { operation, .. }
            | PersistenceError::Timeout { operation, .. } => *operation,
        }
    }

    /// Write phase that failed, for statement errors.
    pub fn phase(&self) -> Option<WritePhase> {
        match self {
            PersistenceError::Statement { phase, .. } => Some(*phase),
            _ => None,
        }
    }

    /// True when a statement was rejected by a foreign key constraint.
    pub fn is_foreign_key_violation(&self) -> bool {
        match self {
            PersistenceError::Statement {
                source: sqlx::Error::Database(db_err),
                ..
            } => db_err.is_foreign_key_violation(),
            _ => false,
        }
    }
}

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        errors: Vec<FieldError>,
    },
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

/// Field-level validation error
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut errors = None;
        let (status, code, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, 10001, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, 10002, msg),
            AppError::Validation {
                message,
                errors: field_errors,
            } => {
                errors = Some(field_errors);
                (StatusCode::BAD_REQUEST, 10007, message)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, 10000, "Internal server error".into())
            }
            AppError::Persistence(e) => {
                tracing::error!(operation = %e.operation(), "Persistence error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, 10000, "Internal server error".into())
            }
        };

        let body = ErrorResponse {
            code,
            message,
            errors,
        };

        (status, Json(body)).into_response()
    }
}
