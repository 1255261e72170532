//! Request DTOs
//!
//! Data structures for API request bodies.

use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::application::services::{CourseDraft, GalleryDraft, LessonDraft, SectionDraft};
use crate::domain::Language;

/// Course create/update request.
///
/// Child `id`s are used by updates only.
#[derive(Debug, Deserialize, Validate)]
pub struct CourseRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[validate(custom(function = "validate_language"))]
    pub language: String,

    /// Ids of existing tags
    #[serde(default)]
    pub tags: Vec<Uuid>,

    #[serde(default)]
    #[validate(nested)]
    pub gallery: Vec<GalleryRequest>,

    #[serde(default)]
    #[validate(nested)]
    pub sections: Vec<SectionRequest>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct GalleryRequest {
    pub id: Option<Uuid>,

    #[validate(length(min = 1, message = "URL must not be empty"))]
    pub url: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SectionRequest {
    pub id: Option<Uuid>,

    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    #[serde(default)]
    #[validate(nested)]
    pub lessons: Vec<LessonRequest>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LessonRequest {
    pub id: Option<Uuid>,

    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    #[validate(length(min = 1, message = "Video URL must not be empty"))]
    pub video_url: String,
}

/// Course listing query parameters
#[derive(Debug, Deserialize)]
pub struct ListCoursesQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

fn validate_language(value: &str) -> Result<(), ValidationError> {
    Language::parse(value).map(|_| ()).map_err(|_| {
        let mut err = ValidationError::new("language");
        err.message = Some("Language must be a two-letter code".into());
        err
    })
}

impl TryFrom<CourseRequest> for CourseDraft {
    type Error = crate::domain::InvalidLanguage;

    fn try_from(request: CourseRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: request.name,
            description: request.description,
            language: Language::parse(&request.language)?,
            tag_ids: request.tags,
            gallery: request
                .gallery
                .into_iter()
                .map(|g| GalleryDraft {
                    id: g.id,
                    url: g.url,
                })
                .collect(),
            sections: request
                .sections
                .into_iter()
                .map(|s| SectionDraft {
                    id: s.id,
                    name: s.name,
                    lessons: s
                        .lessons
                        .into_iter()
                        .map(|l| LessonDraft {
                            id: l.id,
                            title: l.title,
                            video_url: l.video_url,
                        })
                        .collect(),
                })
                .collect(),
        })
    }
}
