//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **CourseService**: Course catalog reads and aggregate writes

pub mod course_service;

pub use course_service::{
    CourseDraft, CourseDto, CourseError, CourseService, CourseServiceImpl, GalleryDraft,
    LessonDraft, SectionDraft,
};
