//! Repository Implementations
//!
//! PostgreSQL implementation of the `CourseRepository` domain trait.
//!
//! - **course_store** - `CourseStore` seam, typed write statements, join rows, Postgres binding
//! - **write_plan** - ordered statement lists for create, update and delete
//! - **course_decoder** - folds LEFT JOIN fan-out rows back into course graphs
//! - **course_repository** - transactions, deadlines and error context
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use sqlx::PgPool;
//! use crate::infrastructure::repositories::PgCourseRepository;
//!
//! async fn setup_repositories(pool: PgPool) {
//!     let course_repo = PgCourseRepository::from_pool(pool, Duration::from_secs(5));
//! }
//! ```

pub mod course_decoder;
pub mod course_repository;
pub mod course_store;
pub mod write_plan;

pub use course_decoder::{CourseAssembler, OrderedGroup};
pub use course_repository::{AggregateCourseRepository, PgCourseRepository};
pub use course_store::{
    CourseGraphRow, CourseListingRow, CourseRecord, CourseStatement, CourseStore,
    CourseTransaction, GalleryRecord, LessonRecord, PgCourseStore, SectionRecord,
};
