//! # Domain Layer
//!
//! The course aggregate and its persistence contract. Independent of any
//! database or HTTP framework.
//!
//! ## Structure
//!
//! - **entities**: Course, CourseTag, CourseGallery, CourseSection, CourseLesson, CourseReview
//! - **value_objects**: Language

pub mod entities;
pub mod value_objects;

// Re-export commonly used types
pub use entities::*;
pub use value_objects::*;
