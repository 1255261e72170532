//! Course Handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::application::dto::request::{CourseRequest, ListCoursesQuery};
use crate::application::dto::response::CourseResponse;
use crate::application::services::{CourseDraft, CourseError};
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

impl From<CourseError> for AppError {
    fn from(err: CourseError) -> Self {
        match err {
            CourseError::NotFound => AppError::NotFound("Course not found".into()),
            CourseError::UnknownTag => AppError::BadRequest("Unknown tag".into()),
            CourseError::Persistence(e) => AppError::Persistence(e),
        }
    }
}

fn parse_course_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::BadRequest("Invalid course ID".into()))
}

fn into_draft(body: CourseRequest) -> Result<CourseDraft, AppError> {
    body.validate().map_err(validation_error)?;
    CourseDraft::try_from(body).map_err(|e| AppError::BadRequest(e.to_string()))
}

/// Get course by ID
pub async fn get_course(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> Result<Json<CourseResponse>, AppError> {
    let course_id = parse_course_id(&course_id)?;
    let course = state.courses.get_course(course_id).await?;

    Ok(Json(CourseResponse::from(course)))
}

/// List courses, one page at a time
pub async fn list_courses(
    State(state): State<AppState>,
    Query(params): Query<ListCoursesQuery>,
) -> Result<Json<Vec<CourseResponse>>, AppError> {
    let courses = state
        .courses
        .list_courses(params.page, params.limit)
        .await?;

    Ok(Json(courses.into_iter().map(CourseResponse::from).collect()))
}

/// Create a new course
pub async fn create_course(
    State(state): State<AppState>,
    Json(body): Json<CourseRequest>,
) -> Result<(StatusCode, Json<CourseResponse>), AppError> {
    let draft = into_draft(body)?;
    let course = state.courses.create_course(draft).await?;

    Ok((StatusCode::CREATED, Json(CourseResponse::from(course))))
}

/// Update a course
pub async fn update_course(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
    Json(body): Json<CourseRequest>,
) -> Result<Json<CourseResponse>, AppError> {
    let course_id = parse_course_id(&course_id)?;
    let draft = into_draft(body)?;
    let course = state.courses.update_course(course_id, draft).await?;

    Ok(Json(CourseResponse::from(course)))
}

/// Delete a course
pub async fn delete_course(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let course_id = parse_course_id(&course_id)?;
    state.courses.delete_course(course_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
