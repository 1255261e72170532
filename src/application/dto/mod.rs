//! Data Transfer Objects
//!
//! DTOs for API request/response serialization.

pub mod request;
pub mod response;

pub use request::{CourseRequest, GalleryRequest, LessonRequest, ListCoursesQuery, SectionRequest};
pub use response::{CourseResponse, GalleryResponse, LessonResponse, SectionResponse, TagResponse};
