//! # Domain Entities
//!
//! The course aggregate: a course with its tags, gallery images, sections
//! and lessons, plus the reviews that reference it.
//!
//! ## Repository Traits
//!
//! `CourseRepository` defines the persistence contract. It is implemented in
//! the infrastructure layer, following the dependency inversion principle.

mod course;

pub use course::{
    Course, CourseGallery, CourseLesson, CourseRepository, CourseReview, CourseSection, CourseTag,
};

#[cfg(test)]
pub use course::MockCourseRepository;
