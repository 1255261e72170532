//! Response DTOs
//!
//! Data structures for API response bodies.

use serde::Serialize;

use crate::application::services::CourseDto;
use crate::domain::{CourseGallery, CourseLesson, CourseSection, CourseTag};

/// Course response
#[derive(Debug, Serialize)]
pub struct CourseResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub language: String,
    pub tags: Vec<TagResponse>,
    pub gallery: Vec<GalleryResponse>,
    pub sections: Vec<SectionResponse>,
}

impl From<CourseDto> for CourseResponse {
    fn from(course: CourseDto) -> Self {
        Self {
            id: course.id.to_string(),
            name: course.name,
            description: course.description,
            language: course.language,
            tags: course.tags.into_iter().map(TagResponse::from).collect(),
            gallery: course.gallery.into_iter().map(GalleryResponse::from).collect(),
            sections: course.sections.into_iter().map(SectionResponse::from).collect(),
        }
    }
}

/// Tag response
#[derive(Debug, Serialize)]
pub struct TagResponse {
    pub id: String,
    pub name: String,
}

impl From<CourseTag> for TagResponse {
    fn from(tag: CourseTag) -> Self {
        Self {
            id: tag.id.to_string(),
            name: tag.name,
        }
    }
}

/// Gallery item response
#[derive(Debug, Serialize)]
pub struct GalleryResponse {
    pub id: String,
    pub course_id: String,
    pub url: String,
}

impl From<CourseGallery> for GalleryResponse {
    fn from(item: CourseGallery) -> Self {
        Self {
            id: item.id.to_string(),
            course_id: item.course_id.to_string(),
            url: item.url,
        }
    }
}

/// Section response
#[derive(Debug, Serialize)]
pub struct SectionResponse {
    pub id: String,
    pub course_id: String,
    pub name: String,
    pub lessons: Vec<LessonResponse>,
}

impl From<CourseSection> for SectionResponse {
    fn from(section: CourseSection) -> Self {
        Self {
            id: section.id.to_string(),
            course_id: section.course_id.to_string(),
            name: section.name,
            lessons: section.lessons.into_iter().map(LessonResponse::from).collect(),
        }
    }
}

/// Lesson response
#[derive(Debug, Serialize)]
pub struct LessonResponse {
    pub id: String,
    pub course_id: String,
    pub course_section_id: String,
    pub title: String,
    pub video_url: String,
}

impl From<CourseLesson> for LessonResponse {
    fn from(lesson: CourseLesson) -> Self {
        Self {
            id: lesson.id.to_string(),
            course_id: lesson.course_id.to_string(),
            course_section_id: lesson.course_section_id.to_string(),
            title: lesson.title,
            video_url: lesson.video_url,
        }
    }
}
