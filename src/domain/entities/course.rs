//! Course aggregate entities and repository trait.
//!
//! A course owns its gallery items, sections and lessons. Tags are shared
//! between courses and only linked through the `course_tags_courses`
//! junction table.
//!
//! Tables:
//! - `courses(id, name, description, language)`
//! - `course_tags(id, name)` + `course_tags_courses(course_id, course_tags_id)`
//! - `course_galleries(id, course_id, url)`
//! - `course_sections(id, course_id, name)`
//! - `course_lessons(id, course_id, course_section_id, title, video_url)`
//! - `course_reviews(id, course_id, user_id, value, comment)` + `course_reviews_courses`

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::Language;
use crate::shared::error::PersistenceError;

/// Root of the course aggregate.
///
/// `Course::default()` (nil id) is what a lookup for an unknown id returns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub language: Language,
    pub tags: Vec<CourseTag>,
    pub gallery: Vec<CourseGallery>,
    pub sections: Vec<CourseSection>,
}

impl Course {
    /// True for the zero-value course returned when no row matched.
    pub fn is_empty(&self) -> bool {
        self.id.is_nil()
    }

    /// All lessons across sections, in section order.
    pub fn lessons(&self) -> impl Iterator<Item = &CourseLesson> {
        self.sections.iter().flat_map(|s| s.lessons.iter())
    }
}

/// Tag shared by many courses. Names are globally unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseTag {
    pub id: Uuid,
    pub name: String,
}

/// Gallery image owned by a single course.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseGallery {
    pub id: Uuid,
    pub course_id: Uuid,
    pub url: String,
}

/// Section of a course with its ordered lessons.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseSection {
    pub id: Uuid,
    pub course_id: Uuid,
    pub name: String,
    pub lessons: Vec<CourseLesson>,
}

/// Lesson inside a section. `course_section_id` must name a section of the
/// same course.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseLesson {
    pub id: Uuid,
    pub course_id: Uuid,
    pub course_section_id: Uuid,
    pub title: String,
    pub video_url: String,
}

/// User review of a course. Only removed alongside its course here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseReview {
    pub id: Uuid,
    pub course_id: Uuid,
    pub user_id: Uuid,
    pub value: i32,
    pub comment: String,
}

/// Persistence contract for the course aggregate.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseRepository: Send + Sync {
    /// Persist the whole graph in one transaction.
    async fn create(&self, course: &Course) -> Result<(), PersistenceError>;

    /// Load one course with tags, gallery, sections and lessons.
    ///
    /// Returns `Course::default()` when the id is unknown.
    async fn read_one(&self, id: Uuid) -> Result<Course, PersistenceError>;

    /// Load a page of courses with tags and gallery only.
    async fn read_many(&self, limit: u32, offset: u32) -> Result<Vec<Course>, PersistenceError>;

    /// Update scalars, replace tag links and upsert children.
    async fn update(&self, id: Uuid, course: &Course) -> Result<(), PersistenceError>;

    /// Remove the course and everything that references it.
    async fn delete(&self, id: Uuid) -> Result<(), PersistenceError>;
}
