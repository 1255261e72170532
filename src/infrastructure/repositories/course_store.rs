//! Course Store
//!
//! The boundary between the course repository and the database. Writes are
//! expressed as typed `CourseStatement`s executed inside a transaction;
//! reads return the flattened LEFT JOIN rows that the decoder folds back
//! into course graphs.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::Language;
use crate::infrastructure::database::{PgUnitOfWork, TransactionContext};
use crate::shared::error::WritePhase;

/// Scalar columns of the `courses` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseRecord {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub language: Language,
}

/// Row of `course_galleries`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryRecord {
    pub id: Uuid,
    pub course_id: Uuid,
    pub url: String,
}

/// Row of `course_sections`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRecord {
    pub id: Uuid,
    pub course_id: Uuid,
    pub name: String,
}

/// Row of `course_lessons`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonRecord {
    pub id: Uuid,
    pub course_id: Uuid,
    pub course_section_id: Uuid,
    pub title: String,
    pub video_url: String,
}

/// One statement of a write plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourseStatement {
    InsertCourse(CourseRecord),
    LinkTag { course_id: Uuid, tag_id: Uuid },
    InsertGallery(GalleryRecord),
    InsertSection(SectionRecord),
    InsertLesson(LessonRecord),
    UpdateCourse(CourseRecord),
    UnlinkTags { course_id: Uuid },
    UpsertGallery(GalleryRecord),
    UpsertSection(SectionRecord),
    UpsertLesson(LessonRecord),
    DeleteTagLinks { course_id: Uuid },
    DeleteReviewLinks { course_id: Uuid },
    DeleteGallery { course_id: Uuid },
    DeleteLessons { course_id: Uuid },
    DeleteSections { course_id: Uuid },
    DeleteCourse { id: Uuid },
}

impl CourseStatement {
    /// Phase label reported when this statement fails.
    pub fn phase(&self) -> WritePhase {
        match self {
            CourseStatement::InsertCourse(_) => WritePhase::InsertCourse,
            CourseStatement::LinkTag { .. } => WritePhase::LinkTag,
            CourseStatement::InsertGallery(_) => WritePhase::InsertGallery,
            CourseStatement::InsertSection(_) => WritePhase::InsertSection,
            CourseStatement::InsertLesson(_) => WritePhase::InsertLesson,
            CourseStatement::UpdateCourse(_) => WritePhase::UpdateCourse,
            CourseStatement::UnlinkTags { .. } => WritePhase::UnlinkTags,
            CourseStatement::UpsertGallery(_) => WritePhase::UpsertGallery,
            CourseStatement::UpsertSection(_) => WritePhase::UpsertSection,
            CourseStatement::UpsertLesson(_) => WritePhase::UpsertLesson,
            CourseStatement::DeleteTagLinks { .. } => WritePhase::DeleteTagLinks,
            CourseStatement::DeleteReviewLinks { .. } => WritePhase::DeleteReviewLinks,
            CourseStatement::DeleteGallery { .. } => WritePhase::DeleteGallery,
            CourseStatement::DeleteLessons { .. } => WritePhase::DeleteLessons,
            CourseStatement::DeleteSections { .. } => WritePhase::DeleteSections,
            CourseStatement::DeleteCourse { .. } => WritePhase::DeleteCourse,
        }
    }

    /// Upserts only touch rows of their own course, so zero affected rows
    /// means the id is owned by another course.
    pub fn must_affect_row(&self) -> bool {
        matches!(
            self,
            CourseStatement::UpsertGallery(_)
                | CourseStatement::UpsertSection(_)
                | CourseStatement::UpsertLesson(_)
        )
    }
}

/// Flattened row of the single-course graph query.
///
/// Every column after the course scalars comes from a LEFT JOIN and is
/// `None` when that join found nothing on this row.
#[derive(Debug, Clone, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct CourseGraphRow {
    pub course_id: Uuid,
    pub name: String,
    pub description: String,
    pub language: String,
    pub tag_id: Option<Uuid>,
    pub tag_name: Option<String>,
    pub gallery_id: Option<Uuid>,
    pub gallery_url: Option<String>,
    pub gallery_course_id: Option<Uuid>,
    pub section_id: Option<Uuid>,
    pub section_name: Option<String>,
    pub section_course_id: Option<Uuid>,
    pub lesson_id: Option<Uuid>,
    pub lesson_title: Option<String>,
    pub lesson_video_url: Option<String>,
    pub lesson_course_id: Option<Uuid>,
    pub lesson_section_id: Option<Uuid>,
}

/// Flattened row of the course listing query (tags and gallery only).
#[derive(Debug, Clone, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct CourseListingRow {
    pub course_id: Uuid,
    pub name: String,
    pub description: String,
    pub language: String,
    pub tag_id: Option<Uuid>,
    pub tag_name: Option<String>,
    pub gallery_id: Option<Uuid>,
    pub gallery_url: Option<String>,
    pub gallery_course_id: Option<Uuid>,
}

/// Transaction handle used by a write plan.
///
/// Implementations roll back when dropped without `commit`.
#[async_trait]
pub trait CourseTransaction: Send {
    /// Execute one statement, returning the number of affected rows.
    async fn execute(&mut self, statement: &CourseStatement) -> Result<u64, sqlx::Error>;

    async fn commit(self) -> Result<(), sqlx::Error>;

    async fn rollback(self) -> Result<(), sqlx::Error>;
}

/// Database access used by the course repository.
#[async_trait]
pub trait CourseStore: Send + Sync {
    type Tx: CourseTransaction;

    async fn begin(&self) -> Result<Self::Tx, sqlx::Error>;

    /// All join rows for one course.
    async fn fetch_graph(&self, id: Uuid) -> Result<Vec<CourseGraphRow>, sqlx::Error>;

    /// Join rows for one page of courses.
    async fn fetch_listing(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<CourseListingRow>, sqlx::Error>;
}

mod sql {
    pub const INSERT_COURSE: &str = r#"
        INSERT INTO courses (id, name, description, language)
        VALUES ($1, $2, $3, $4)
    "#;

    pub const LINK_TAG: &str = r#"
        INSERT INTO course_tags_courses (course_id, course_tags_id)
        VALUES ($1, $2)
    "#;

    pub const INSERT_GALLERY: &str = r#"
        INSERT INTO course_galleries (id, course_id, url)
        VALUES ($1, $2, $3)
    "#;

    pub const INSERT_SECTION: &str = r#"
        INSERT INTO course_sections (id, course_id, name)
        VALUES ($1, $2, $3)
    "#;

    pub const INSERT_LESSON: &str = r#"
        INSERT INTO course_lessons (id, course_id, course_section_id, title, video_url)
        VALUES ($1, $2, $3, $4, $5)
    "#;

    pub const UPDATE_COURSE: &str = r#"
        UPDATE courses
        SET name = $2,
            description = $3,
            language = $4,
            updated_at = NOW()
        WHERE id = $1
    "#;

    pub const DELETE_TAG_LINKS: &str = "DELETE FROM course_tags_courses WHERE course_id = $1";

    pub const UPSERT_GALLERY: &str = r#"
        INSERT INTO course_galleries (id, course_id, url)
        VALUES ($1, $2, $3)
        ON CONFLICT (id) DO UPDATE SET url = EXCLUDED.url, updated_at = NOW()
        WHERE course_galleries.course_id = EXCLUDED.course_id
    "#;

    pub const UPSERT_SECTION: &str = r#"
        INSERT INTO course_sections (id, course_id, name)
        VALUES ($1, $2, $3)
        ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, updated_at = NOW()
        WHERE course_sections.course_id = EXCLUDED.course_id
    "#;

    pub const UPSERT_LESSON: &str = r#"
        INSERT INTO course_lessons (id, course_id, course_section_id, title, video_url)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (id) DO UPDATE
        SET title = EXCLUDED.title,
            video_url = EXCLUDED.video_url,
            updated_at = NOW()
        WHERE course_lessons.course_id = EXCLUDED.course_id
    "#;

    pub const DELETE_REVIEW_LINKS: &str =
        "DELETE FROM course_reviews_courses WHERE course_id = $1";

    pub const DELETE_GALLERY: &str = "DELETE FROM course_galleries WHERE course_id = $1";

    pub const DELETE_LESSONS: &str = "DELETE FROM course_lessons WHERE course_id = $1";

    pub const DELETE_SECTIONS: &str = "DELETE FROM course_sections WHERE course_id = $1";

    pub const DELETE_COURSE: &str = "DELETE FROM courses WHERE id = $1";

    pub const SELECT_GRAPH: &str = r#"
        SELECT c.id AS course_id, c.name, c.description, c.language,
               t.id AS tag_id, t.name AS tag_name,
               g.id AS gallery_id, g.url AS gallery_url, g.course_id AS gallery_course_id,
               s.id AS section_id, s.name AS section_name, s.course_id AS section_course_id,
               l.id AS lesson_id, l.title AS lesson_title, l.video_url AS lesson_video_url,
               l.course_id AS lesson_course_id, l.course_section_id AS lesson_section_id
        FROM courses c
        LEFT JOIN course_tags_courses tc ON c.id = tc.course_id
        LEFT JOIN course_tags t ON tc.course_tags_id = t.id
        LEFT JOIN course_galleries g ON c.id = g.course_id
        LEFT JOIN course_sections s ON c.id = s.course_id
        LEFT JOIN course_lessons l ON s.id = l.course_section_id
        WHERE c.id = $1
        ORDER BY tc.created_at, g.created_at, s.created_at, l.created_at
    "#;

    pub const SELECT_LISTING: &str = r#"
        SELECT c.id AS course_id, c.name, c.description, c.language,
               t.id AS tag_id, t.name AS tag_name,
               g.id AS gallery_id, g.url AS gallery_url, g.course_id AS gallery_course_id
        FROM (
            SELECT id, name, description, language
            FROM courses
            ORDER BY name, id
            LIMIT $1 OFFSET $2
        ) c
        LEFT JOIN course_tags_courses tc ON c.id = tc.course_id
        LEFT JOIN course_tags t ON tc.course_tags_id = t.id
        LEFT JOIN course_galleries g ON c.id = g.course_id
        ORDER BY c.name, c.id, tc.created_at, g.created_at
    "#;
}

#[async_trait]
impl CourseTransaction for TransactionContext {
    async fn execute(&mut self, statement: &CourseStatement) -> Result<u64, sqlx::Error> {
        let query = match statement {
            CourseStatement::InsertCourse(c) => sqlx::query(sql::INSERT_COURSE)
                .bind(c.id)
                .bind(&c.name)
                .bind(&c.description)
                .bind(c.language.as_str()),
            CourseStatement::UpdateCourse(c) => sqlx::query(sql::UPDATE_COURSE)
                .bind(c.id)
                .bind(&c.name)
                .bind(&c.description)
                .bind(c.language.as_str()),
            CourseStatement::LinkTag { course_id, tag_id } => {
                sqlx::query(sql::LINK_TAG).bind(*course_id).bind(*tag_id)
            }
            CourseStatement::InsertGallery(g) => sqlx::query(sql::INSERT_GALLERY)
                .bind(g.id)
                .bind(g.course_id)
                .bind(&g.url),
            CourseStatement::UpsertGallery(g) => sqlx::query(sql::UPSERT_GALLERY)
                .bind(g.id)
                .bind(g.course_id)
                .bind(&g.url),
            CourseStatement::InsertSection(s) => sqlx::query(sql::INSERT_SECTION)
                .bind(s.id)
                .bind(s.course_id)
                .bind(&s.name),
            CourseStatement::UpsertSection(s) => sqlx::query(sql::UPSERT_SECTION)
                .bind(s.id)
                .bind(s.course_id)
                .bind(&s.name),
            CourseStatement::InsertLesson(l) => sqlx::query(sql::INSERT_LESSON)
                .bind(l.id)
                .bind(l.course_id)
                .bind(l.course_section_id)
                .bind(&l.title)
                .bind(&l.video_url),
            CourseStatement::UpsertLesson(l) => sqlx::query(sql::UPSERT_LESSON)
                .bind(l.id)
                .bind(l.course_id)
                .bind(l.course_section_id)
                .bind(&l.title)
                .bind(&l.video_url),
            CourseStatement::UnlinkTags { course_id }
            | CourseStatement::DeleteTagLinks { course_id } => {
                sqlx::query(sql::DELETE_TAG_LINKS).bind(*course_id)
            }
            CourseStatement::DeleteReviewLinks { course_id } => {
                sqlx::query(sql::DELETE_REVIEW_LINKS).bind(*course_id)
            }
            CourseStatement::DeleteGallery { course_id } => {
                sqlx::query(sql::DELETE_GALLERY).bind(*course_id)
            }
            CourseStatement::DeleteLessons { course_id } => {
                sqlx::query(sql::DELETE_LESSONS).bind(*course_id)
            }
            CourseStatement::DeleteSections { course_id } => {
                sqlx::query(sql::DELETE_SECTIONS).bind(*course_id)
            }
            CourseStatement::DeleteCourse { id } => sqlx::query(sql::DELETE_COURSE).bind(*id),
        };

        let result = query.execute(&mut **self.as_mut()).await?;
        Ok(result.rows_affected())
    }

    async fn commit(self) -> Result<(), sqlx::Error> {
        TransactionContext::commit(self).await
    }

    async fn rollback(self) -> Result<(), sqlx::Error> {
        TransactionContext::rollback(self).await
    }
}

/// PostgreSQL course store.
#[derive(Clone)]
pub struct PgCourseStore {
    uow: PgUnitOfWork,
}

impl PgCourseStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            uow: PgUnitOfWork::from_pool(pool),
        }
    }
}

#[async_trait]
impl CourseStore for PgCourseStore {
    type Tx = TransactionContext;

    async fn begin(&self) -> Result<Self::Tx, sqlx::Error> {
        self.uow.begin().await
    }

    async fn fetch_graph(&self, id: Uuid) -> Result<Vec<CourseGraphRow>, sqlx::Error> {
        sqlx::query_as::<_, CourseGraphRow>(sql::SELECT_GRAPH)
            .bind(id)
            .fetch_all(self.uow.pool())
            .await
    }

    async fn fetch_listing(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<CourseListingRow>, sqlx::Error> {
        sqlx::query_as::<_, CourseListingRow>(sql::SELECT_LISTING)
            .bind(i64::from(limit))
            .bind(i64::from(offset))
            .fetch_all(self.uow.pool())
            .await
    }
}
