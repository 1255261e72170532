//! Write Plans
//!
//! Each aggregate write is an ordered list of statements executed in a
//! single transaction. The order follows foreign key direction: parents
//! before children on insert, children before parents on delete.

use uuid::Uuid;

use super::course_store::{
    CourseRecord, CourseStatement, GalleryRecord, LessonRecord, SectionRecord,
};
use crate::domain::Course;

fn course_record(id: Uuid, course: &Course) -> CourseRecord {
    CourseRecord {
        id,
        name: course.name.clone(),
        description: course.description.clone(),
        language: course.language.clone(),
    }
}

/// Child rows of `course`, all stamped with `course_id`.
///
/// Lessons are written right after their section, in payload order.
fn child_statements(
    course_id: Uuid,
    course: &Course,
    gallery: fn(GalleryRecord) -> CourseStatement,
    section: fn(SectionRecord) -> CourseStatement,
    lesson: fn(LessonRecord) -> CourseStatement,
) -> Vec<CourseStatement> {
    let mut plan = Vec::new();

    plan.extend(course.gallery.iter().map(|item| {
        gallery(GalleryRecord {
            id: item.id,
            course_id,
            url: item.url.clone(),
        })
    }));

    for s in &course.sections {
        plan.push(section(SectionRecord {
            id: s.id,
            course_id,
            name: s.name.clone(),
        }));

        plan.extend(s.lessons.iter().map(|l| {
            lesson(LessonRecord {
                id: l.id,
                course_id,
                course_section_id: s.id,
                title: l.title.clone(),
                video_url: l.video_url.clone(),
            })
        }));
    }

    plan
}

/// course -> tag links -> gallery -> (section -> its lessons)*
pub fn create_plan(course: &Course) -> Vec<CourseStatement> {
    let mut plan = vec![CourseStatement::InsertCourse(course_record(course.id, course))];

    plan.extend(course.tags.iter().map(|tag| CourseStatement::LinkTag {
        course_id: course.id,
        tag_id: tag.id,
    }));

    plan.extend(child_statements(
        course.id,
        course,
        CourseStatement::InsertGallery,
        CourseStatement::InsertSection,
        CourseStatement::InsertLesson,
    ));

    plan
}

/// Update scalars, replace every tag link, upsert the rest.
///
/// Gallery items, sections and lessons missing from `course` are not
/// removed.
pub fn update_plan(id: Uuid, course: &Course) -> Vec<CourseStatement> {
    let mut plan = vec![
        CourseStatement::UpdateCourse(course_record(id, course)),
        CourseStatement::UnlinkTags { course_id: id },
    ];

    plan.extend(course.tags.iter().map(|tag| CourseStatement::LinkTag {
        course_id: id,
        tag_id: tag.id,
    }));

    plan.extend(child_statements(
        id,
        course,
        CourseStatement::UpsertGallery,
        CourseStatement::UpsertSection,
        CourseStatement::UpsertLesson,
    ));

    plan
}

/// tag links -> review links -> gallery -> lessons -> sections -> course
pub fn delete_plan(id: Uuid) -> Vec<CourseStatement> {
    vec![
        CourseStatement::DeleteTagLinks { course_id: id },
        CourseStatement::DeleteReviewLinks { course_id: id },
        CourseStatement::DeleteGallery { course_id: id },
        CourseStatement::DeleteLessons { course_id: id },
        CourseStatement::DeleteSections { course_id: id },
        CourseStatement::DeleteCourse { id },
    ]
}
