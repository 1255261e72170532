//! Course Service
//!
//! Turns client drafts into course aggregates and drives the repository.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::config::PaginationSettings;
use crate::domain::{
    Course, CourseGallery, CourseLesson, CourseRepository, CourseSection, CourseTag, Language,
};
use crate::shared::error::{PersistenceError, WritePhase};

/// Course service trait
#[async_trait]
pub trait CourseService: Send + Sync {
    /// Get one course with its full graph
    async fn get_course(&self, course_id: Uuid) -> Result<CourseDto, CourseError>;

    /// List a page of courses (tags and gallery only)
    async fn list_courses(
        &self,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Vec<CourseDto>, CourseError>;

    /// Create a course from a draft
    async fn create_course(&self, draft: CourseDraft) -> Result<CourseDto, CourseError>;

    /// Update an existing course
    async fn update_course(&self, course_id: Uuid, draft: CourseDraft)
        -> Result<CourseDto, CourseError>;

    /// Delete a course and everything it owns
    async fn delete_course(&self, course_id: Uuid) -> Result<(), CourseError>;
}

/// Course as submitted by a client.
///
/// Child ids are only honored on update, and only for children the course
/// already owns. Any other id is replaced with a fresh one.
#[derive(Debug, Clone)]
pub struct CourseDraft {
    pub name: String,
    pub description: String,
    pub language: Language,
    pub tag_ids: Vec<Uuid>,
    pub gallery: Vec<GalleryDraft>,
    pub sections: Vec<SectionDraft>,
}

#[derive(Debug, Clone)]
pub struct GalleryDraft {
    pub id: Option<Uuid>,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct SectionDraft {
    pub id: Option<Uuid>,
    pub name: String,
    pub lessons: Vec<LessonDraft>,
}

#[derive(Debug, Clone)]
pub struct LessonDraft {
    pub id: Option<Uuid>,
    pub title: String,
    pub video_url: String,
}

/// Course data transfer object
#[derive(Debug, Clone, PartialEq)]
pub struct CourseDto {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub language: String,
    pub tags: Vec<CourseTag>,
    pub gallery: Vec<CourseGallery>,
    pub sections: Vec<CourseSection>,
}

impl From<Course> for CourseDto {
    fn from(course: Course) -> Self {
        Self {
            id: course.id,
            name: course.name,
            description: course.description,
            language: course.language.into(),
            tags: course.tags,
            gallery: course.gallery,
            sections: course.sections,
        }
    }
}

/// Course service errors
#[derive(Debug, thiserror::Error)]
pub enum CourseError {
    #[error("Course not found")]
    NotFound,

    #[error("Unknown tag")]
    UnknownTag,

    #[error(transparent)]
    Persistence(PersistenceError),
}

impl From<PersistenceError> for CourseError {
    fn from(err: PersistenceError) -> Self {
        if err.phase() == Some(WritePhase::LinkTag) && err.is_foreign_key_violation() {
            CourseError::UnknownTag
        } else {
            CourseError::Persistence(err)
        }
    }
}

/// Child ids a stored course already owns.
#[derive(Debug, Default)]
struct OwnedIds {
    gallery: HashSet<Uuid>,
    sections: HashSet<Uuid>,
    lessons: HashSet<Uuid>,
}

impl OwnedIds {
    fn of(course: &Course) -> Self {
        Self {
            gallery: course.gallery.iter().map(|g| g.id).collect(),
            sections: course.sections.iter().map(|s| s.id).collect(),
            lessons: course
                .sections
                .iter()
                .flat_map(|s| s.lessons.iter().map(|l| l.id))
                .collect(),
        }
    }
}

/// CourseService implementation
pub struct CourseServiceImpl<R: CourseRepository> {
    course_repo: Arc<R>,
    pagination: PaginationSettings,
}

impl<R: CourseRepository> CourseServiceImpl<R> {
    pub fn new(course_repo: Arc<R>, pagination: PaginationSettings) -> Self {
        Self {
            course_repo,
            pagination,
        }
    }

    /// Build the aggregate for `course_id`. A draft child id is kept only
    /// when `owned` already holds it; every other child gets a fresh id.
    /// Repeated tag ids collapse to their first occurrence.
    fn assemble(course_id: Uuid, draft: CourseDraft, owned: &OwnedIds) -> Course {
        let child_id = |id: Option<Uuid>, known: &HashSet<Uuid>| match id {
            Some(id) if known.contains(&id) => id,
            _ => Uuid::new_v4(),
        };

        let sections = draft
            .sections
            .into_iter()
            .map(|section| {
                let section_id = child_id(section.id, &owned.sections);
                CourseSection {
                    id: section_id,
                    course_id,
                    name: section.name,
                    lessons: section
                        .lessons
                        .into_iter()
                        .map(|lesson| CourseLesson {
                            id: child_id(lesson.id, &owned.lessons),
                            course_id,
                            course_section_id: section_id,
                            title: lesson.title,
                            video_url: lesson.video_url,
                        })
                        .collect(),
                }
            })
            .collect();

        let mut seen_tags = HashSet::new();
        Course {
            id: course_id,
            name: draft.name,
            description: draft.description,
            language: draft.language,
            tags: draft
                .tag_ids
                .into_iter()
                .filter(|id| seen_tags.insert(*id))
                .map(|id| CourseTag {
                    id,
                    name: String::new(),
                })
                .collect(),
            gallery: draft
                .gallery
                .into_iter()
                .map(|item| CourseGallery {
                    id: child_id(item.id, &owned.gallery),
                    course_id,
                    url: item.url,
                })
                .collect(),
            sections,
        }
    }

    async fn load(&self, course_id: Uuid) -> Result<Course, CourseError> {
        let course = self.course_repo.read_one(course_id).await?;
        if course.is_empty() {
            return Err(CourseError::NotFound);
        }
        Ok(course)
    }
}

#[async_trait]
impl<R: CourseRepository + 'static> CourseService for CourseServiceImpl<R> {
    async fn get_course(&self, course_id: Uuid) -> Result<CourseDto, CourseError> {
        self.load(course_id).await.map(CourseDto::from)
    }

    async fn list_courses(
        &self,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Vec<CourseDto>, CourseError> {
        let page = page.unwrap_or(1).max(1);
        let limit = self.pagination.resolve_limit(limit);
        let offset = (page - 1).saturating_mul(limit);

        let courses = self.course_repo.read_many(limit, offset).await?;
        Ok(courses.into_iter().map(CourseDto::from).collect())
    }

    async fn create_course(&self, draft: CourseDraft) -> Result<CourseDto, CourseError> {
        let course = Self::assemble(Uuid::new_v4(), draft, &OwnedIds::default());
        self.course_repo.create(&course).await?;

        tracing::info!(course_id = %course.id, sections = course.sections.len(), "Course created");

        self.load(course.id).await.map(CourseDto::from)
    }

    async fn update_course(
        &self,
        course_id: Uuid,
        draft: CourseDraft,
    ) -> Result<CourseDto, CourseError> {
        let current = self.load(course_id).await?;

        let course = Self::assemble(course_id, draft, &OwnedIds::of(&current));
        self.course_repo.update(course_id, &course).await?;

        tracing::info!(%course_id, "Course updated");

        self.load(course_id).await.map(CourseDto::from)
    }

    async fn delete_course(&self, course_id: Uuid) -> Result<(), CourseError> {
        self.load(course_id).await?;
        self.course_repo.delete(course_id).await?;

        tracing::info!(%course_id, "Course deleted");
        Ok(())
    }
}
