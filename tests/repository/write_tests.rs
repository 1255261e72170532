//! Create / Update / Delete

use std::time::Duration;

use pretty_assertions::assert_eq;
use test_case::test_case;
use uuid::Uuid;

use course_catalog::domain::{Course, CourseGallery, CourseLesson, CourseRepository, CourseTag};
use course_catalog::infrastructure::repositories::{AggregateCourseRepository, CourseStatement};
use course_catalog::shared::error::{Operation, PersistenceError, WritePhase};

use crate::common::*;

fn rows_referencing(tables: &Tables, course_id: Uuid) -> usize {
    tables.courses.iter().filter(|c| c.id == course_id).count()
        + tables.tag_links.iter().filter(|(c, _)| *c == course_id).count()
        + tables.review_links.iter().filter(|(c, _)| *c == course_id).count()
        + tables.gallery.iter().filter(|g| g.course_id == course_id).count()
        + tables.sections.iter().filter(|s| s.course_id == course_id).count()
        + tables.lessons.iter().filter(|l| l.course_id == course_id).count()
}

#[tokio::test]
async fn test_create_then_read_returns_the_same_graph() {
    let (repo, store) = repository();
    let course = mock_course();

    repo.create(&course).await.unwrap();

    let read = repo.read_one(course.id).await.unwrap();
    assert_eq!(read, course);
    assert_eq!(store.commits(), 1);
    assert_eq!(store.rollbacks(), 0);
}

#[tokio::test]
async fn test_mock_course_fan_out_collapses_to_counts() {
    let (repo, store) = repository();
    let course = mock_course();
    repo.create(&course).await.unwrap();

    // 2 tags x 1 gallery x 4 (section, lesson) pairs
    assert_eq!(store.tables().graph_rows(course.id).len(), 8);

    let read = repo.read_one(course.id).await.unwrap();
    assert_eq!(read.tags.len(), 2);
    assert_eq!(read.gallery.len(), 1);
    assert_eq!(read.sections.len(), 2);
    assert_eq!(read.lessons().count(), 4);
    assert!(read.sections.iter().all(|s| s.lessons.len() == 2));

    let names: Vec<_> = read.tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Mock Tag", "Mock Tag 2"]);
}

#[test_case(0, 0, 0 ; "bare course")]
#[test_case(1, 1, 0 ; "section without lessons")]
#[test_case(3, 2, 5 ; "wide graph")]
#[test_case(2, 4, 1 ; "one lesson per section")]
#[tokio::test]
async fn test_round_trip_preserves_counts(tag_count: usize, sections: usize, lessons: usize) {
    let (repo, store) = repository();
    let tags: Vec<CourseTag> = (0..tag_count).map(|_| fake_tag()).collect();
    store.seed_tags(&tags);

    let course = fake_course("Round Trip", &tags, sections, lessons);
    repo.create(&course).await.unwrap();

    let read = repo.read_one(course.id).await.unwrap();
    assert_eq!(read.tags.len(), tag_count);
    assert_eq!(read.gallery.len(), 1);
    assert_eq!(read.sections.len(), sections);
    for section in &read.sections {
        assert_eq!(section.lessons.len(), lessons);
    }
    assert_eq!(read, course);
}

#[tokio::test]
async fn test_failed_lesson_insert_leaves_nothing_behind() {
    let (repo, store) = repository();
    let course = mock_course();
    let second_section = id(SECTION_2_ID);
    store.fail_when(move |s| {
        matches!(s, CourseStatement::InsertLesson(l) if l.course_section_id == second_section)
    });

    let err = repo.create(&course).await.unwrap_err();
    assert_eq!(err.operation(), Operation::Create);
    assert_eq!(err.phase(), Some(WritePhase::InsertLesson));
    assert!(err.to_string().contains("failed to create lesson"));

    store.clear_failures();
    assert!(repo.read_one(course.id).await.unwrap().is_empty());
    assert_eq!(rows_referencing(&store.tables(), course.id), 0);
    assert_eq!(store.commits(), 0);
    assert_eq!(store.rollbacks(), 1);
}

#[tokio::test]
async fn test_create_stops_at_the_first_failing_statement() {
    let (repo, store) = repository();
    store.fail_when(|s| matches!(s, CourseStatement::InsertGallery(_)));

    repo.create(&mock_course()).await.unwrap_err();

    let executed = store.executed();
    assert_eq!(executed.len(), 4);
    assert!(matches!(executed.last(), Some(CourseStatement::InsertGallery(_))));
}

#[tokio::test]
async fn test_unknown_tag_is_a_foreign_key_violation() {
    let (repo, store) = repository();
    let mut course = mock_course();
    course.tags.push(CourseTag {
        id: Uuid::new_v4(),
        name: "Never Seeded".into(),
    });

    let err = repo.create(&course).await.unwrap_err();
    assert_eq!(err.phase(), Some(WritePhase::LinkTag));
    assert!(err.is_foreign_key_violation());
    assert!(store.tables().courses.is_empty());
}

#[tokio::test]
async fn test_duplicate_course_id_is_rejected() {
    let (repo, _store) = repository();
    let course = mock_course();
    repo.create(&course).await.unwrap();

    let err = repo.create(&course).await.unwrap_err();
    assert_eq!(err.phase(), Some(WritePhase::InsertCourse));
    assert!(!err.is_foreign_key_violation());
}

#[tokio::test]
async fn test_begin_failure_runs_no_statements() {
    let (repo, store) = repository();
    store.fail_begin();

    let err = repo.create(&mock_course()).await.unwrap_err();
    assert!(matches!(
        err,
        PersistenceError::Begin {
            operation: Operation::Create,
            ..
        }
    ));
    assert!(store.executed().is_empty());
}

#[tokio::test]
async fn test_commit_failure_is_reported_separately() {
    let (repo, store) = repository();
    store.fail_commit();

    let err = repo.create(&mock_course()).await.unwrap_err();
    assert!(matches!(err, PersistenceError::Commit { .. }));
    assert_eq!(err.phase(), None);
    assert!(store.tables().courses.is_empty());
}

#[tokio::test]
async fn test_deadline_rolls_back_the_transaction() {
    let store = MemoryCourseStore::new();
    store.seed_tags(&mock_tags());
    store.delay_statements(Duration::from_millis(200));
    let repo = AggregateCourseRepository::new(store.clone(), Duration::from_millis(50));

    let err = repo.create(&mock_course()).await.unwrap_err();
    assert!(matches!(
        err,
        PersistenceError::Timeout {
            operation: Operation::Create,
            timeout_ms: 50
        }
    ));
    assert_eq!(store.rollbacks(), 1);
    assert_eq!(store.commits(), 0);
    assert!(store.tables().courses.is_empty());
}

#[tokio::test]
async fn test_concurrent_creates_both_commit() {
    let (repo, store) = repository();
    let tags = mock_tags();
    let first = fake_course("First", &tags, 1, 2);
    let second = fake_course("Second", &tags, 2, 1);

    let (a, b) = tokio::join!(repo.create(&first), repo.create(&second));
    a.unwrap();
    b.unwrap();

    assert_eq!(store.tables().courses.len(), 2);
    assert_eq!(repo.read_one(first.id).await.unwrap(), first);
    assert_eq!(repo.read_one(second.id).await.unwrap(), second);
}

#[tokio::test]
async fn test_update_with_no_tags_removes_every_link() {
    let (repo, store) = repository();
    let course = mock_course();
    repo.create(&course).await.unwrap();

    let mut changed = course.clone();
    changed.tags.clear();
    repo.update(course.id, &changed).await.unwrap();

    let read = repo.read_one(course.id).await.unwrap();
    assert!(read.tags.is_empty());
    assert!(store.tables().tag_links.is_empty());
    // tags themselves are shared and stay
    assert_eq!(store.tables().tags.len(), 2);
}

#[tokio::test]
async fn test_update_replaces_tags_in_payload_order() {
    let (repo, _store) = repository();
    let course = mock_course();
    repo.create(&course).await.unwrap();

    let mut changed = course.clone();
    changed.tags.reverse();
    changed.tags.truncate(1);
    repo.update(course.id, &changed).await.unwrap();

    let read = repo.read_one(course.id).await.unwrap();
    assert_eq!(read.tags, vec![mock_tags()[1].clone()]);
}

#[tokio::test]
async fn test_update_keeps_children_missing_from_the_payload() {
    let (repo, _store) = repository();
    let course = mock_course();
    repo.create(&course).await.unwrap();

    let added = CourseGallery {
        id: Uuid::new_v4(),
        course_id: course.id,
        url: "https://www.bing.com".into(),
    };
    let mut changed = course.clone();
    changed.gallery = vec![added.clone()];
    changed.sections.truncate(1);
    repo.update(course.id, &changed).await.unwrap();

    let read = repo.read_one(course.id).await.unwrap();
    // the original gallery item is not removed
    assert_eq!(read.gallery, vec![course.gallery[0].clone(), added]);
    assert_eq!(read.sections.len(), 2);
    assert_eq!(read.lessons().count(), 4);
}

#[tokio::test]
async fn test_update_changes_scalars_and_upserts_children() {
    let (repo, _store) = repository();
    let course = mock_course();
    repo.create(&course).await.unwrap();

    let mut changed = course.clone();
    changed.name = "Mock Course Updated".into();
    changed.language = "id".parse().unwrap();
    changed.sections[0].name = "Renamed Section".into();
    changed.sections[0].lessons[1].title = "Renamed Lesson".into();
    let section_id = changed.sections[1].id;
    changed.sections[1].lessons.push(CourseLesson {
        id: Uuid::new_v4(),
        course_id: course.id,
        course_section_id: section_id,
        title: "Bonus Lesson".into(),
        video_url: "https://www.youtube.com/bonus".into(),
    });
    repo.update(course.id, &changed).await.unwrap();

    let read = repo.read_one(course.id).await.unwrap();
    assert_eq!(read, changed);
}

fn is_row_not_found(err: &PersistenceError) -> bool {
    matches!(
        err,
        PersistenceError::Statement {
            source: sqlx::Error::RowNotFound,
            ..
        }
    )
}

#[tokio::test]
async fn test_update_cannot_take_over_another_courses_section() {
    let (repo, store) = repository();
    let owner = mock_course();
    repo.create(&owner).await.unwrap();

    let other = fake_course("Other", &[], 0, 0);
    repo.create(&other).await.unwrap();

    let mut hijack = other.clone();
    let mut section = owner.sections[0].clone();
    section.course_id = other.id;
    section.name = "Hijacked".into();
    section.lessons.clear();
    hijack.sections = vec![section];

    let err = repo.update(other.id, &hijack).await.unwrap_err();
    assert_eq!(err.phase(), Some(WritePhase::UpsertSection));
    assert!(is_row_not_found(&err));
    assert_eq!(store.rollbacks(), 1);

    assert_eq!(repo.read_one(owner.id).await.unwrap(), owner);
    assert_eq!(repo.read_one(other.id).await.unwrap(), other);
}

#[tokio::test]
async fn test_update_cannot_overwrite_another_courses_gallery() {
    let (repo, store) = repository();
    let owner = mock_course();
    repo.create(&owner).await.unwrap();

    let other = fake_course("Other", &[], 0, 0);
    repo.create(&other).await.unwrap();

    let mut hijack = other.clone();
    hijack.gallery = vec![CourseGallery {
        id: owner.gallery[0].id,
        course_id: other.id,
        url: "https://hijacked".into(),
    }];

    let err = repo.update(other.id, &hijack).await.unwrap_err();
    assert_eq!(err.phase(), Some(WritePhase::UpsertGallery));
    assert!(is_row_not_found(&err));

    assert_eq!(store.tables().gallery.len(), 2);
    assert_eq!(repo.read_one(owner.id).await.unwrap(), owner);
    assert_eq!(repo.read_one(other.id).await.unwrap(), other);
}

#[tokio::test]
async fn test_update_cannot_retitle_another_courses_lesson() {
    let (repo, _store) = repository();
    let owner = mock_course();
    repo.create(&owner).await.unwrap();

    let other = fake_course("Other", &[], 1, 0);
    repo.create(&other).await.unwrap();

    // the other course's own section, carrying the owner's lesson id
    let mut hijack = other.clone();
    let section_id = hijack.sections[0].id;
    hijack.sections[0].lessons = vec![CourseLesson {
        id: owner.sections[0].lessons[0].id,
        course_id: other.id,
        course_section_id: section_id,
        title: "Hijacked".into(),
        video_url: "https://hijacked".into(),
    }];

    let err = repo.update(other.id, &hijack).await.unwrap_err();
    assert_eq!(err.phase(), Some(WritePhase::UpsertLesson));
    assert!(is_row_not_found(&err));

    assert_eq!(repo.read_one(owner.id).await.unwrap(), owner);
}

#[tokio::test]
async fn test_failed_update_keeps_previous_state() {
    let (repo, store) = repository();
    let course = mock_course();
    repo.create(&course).await.unwrap();
    store.fail_when(|s| matches!(s, CourseStatement::UpsertSection(_)));

    let mut changed = course.clone();
    changed.name = "Should Not Stick".into();
    changed.tags.clear();

    let err = repo.update(course.id, &changed).await.unwrap_err();
    assert_eq!(err.operation(), Operation::Update);
    assert_eq!(err.phase(), Some(WritePhase::UpsertSection));

    store.clear_failures();
    assert_eq!(repo.read_one(course.id).await.unwrap(), course);
}

#[tokio::test]
async fn test_update_unlink_failure_is_labelled() {
    let (repo, store) = repository();
    let course = mock_course();
    repo.create(&course).await.unwrap();
    store.fail_when(|s| matches!(s, CourseStatement::UnlinkTags { .. }));

    let err = repo.update(course.id, &course).await.unwrap_err();
    assert_eq!(err.phase(), Some(WritePhase::UnlinkTags));
    assert!(err
        .to_string()
        .starts_with("update course: failed to delete existing tags for the course"));
}

#[tokio::test]
async fn test_delete_removes_every_referencing_row() {
    let (repo, store) = repository();
    let course = mock_course();
    repo.create(&course).await.unwrap();
    let review = store.seed_review(course.id);

    repo.delete(course.id).await.unwrap();

    assert!(repo.read_one(course.id).await.unwrap().is_empty());
    let tables = store.tables();
    assert_eq!(rows_referencing(&tables, course.id), 0);
    // only the junction row goes; tags and the review itself stay
    assert_eq!(tables.tags.len(), 2);
    assert!(tables.reviews.iter().any(|r| r.id == review.id));
}

#[tokio::test]
async fn test_delete_leaves_other_courses_alone() {
    let (repo, store) = repository();
    let doomed = mock_course();
    let kept = fake_course("Kept", &mock_tags(), 2, 2);
    repo.create(&doomed).await.unwrap();
    repo.create(&kept).await.unwrap();
    store.seed_review(kept.id);

    repo.delete(doomed.id).await.unwrap();

    assert_eq!(repo.read_one(kept.id).await.unwrap(), kept);
    assert_eq!(store.tables().review_links.len(), 1);
}

#[test_case(WritePhase::DeleteTagLinks ; "tag links")]
#[test_case(WritePhase::DeleteReviewLinks ; "review links")]
#[test_case(WritePhase::DeleteGallery ; "gallery")]
#[test_case(WritePhase::DeleteLessons ; "lessons")]
#[test_case(WritePhase::DeleteSections ; "sections")]
#[test_case(WritePhase::DeleteCourse ; "course")]
#[tokio::test]
async fn test_failed_delete_keeps_the_course(phase: WritePhase) {
    let (repo, store) = repository();
    let course = mock_course();
    repo.create(&course).await.unwrap();
    store.fail_when(move |s| s.phase() == phase);

    let err = repo.delete(course.id).await.unwrap_err();
    assert_eq!(err.operation(), Operation::Delete);
    assert_eq!(err.phase(), Some(phase));

    store.clear_failures();
    assert_eq!(repo.read_one(course.id).await.unwrap(), course);
}

#[tokio::test]
async fn test_delete_of_unknown_course_is_a_no_op() {
    let (repo, store) = repository();

    repo.delete(Uuid::new_v4()).await.unwrap();

    assert_eq!(store.commits(), 1);
    assert_eq!(store.executed().len(), 6);
}

#[tokio::test]
async fn test_zero_value_course_reads_as_empty() {
    let (repo, _store) = repository();
    assert_eq!(repo.read_one(Uuid::nil()).await.unwrap(), Course::default());
}
