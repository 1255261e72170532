//! Course Row Decoder
//!
//! Folds flattened LEFT JOIN rows back into course graphs. One LEFT JOIN
//! query over independent one-to-many relations repeats every tag, gallery
//! item, section and lesson on many rows; the decoder groups rows along the
//! key path course -> {tags, gallery, sections -> lessons} and keeps the
//! first occurrence of each identity, in row order.
//!
//! A join column that is `NULL` or holds the nil UUID means "no match on
//! this row" and never produces an entity.

use std::collections::HashMap;
use std::convert::Infallible;

use uuid::Uuid;

use super::course_store::{CourseGraphRow, CourseListingRow};
use crate::domain::{Course, CourseGallery, CourseLesson, CourseSection, CourseTag, Language};
use crate::shared::error::{Operation, PersistenceError};

/// Insertion-ordered collection keyed by identity.
#[derive(Debug)]
pub struct OrderedGroup<T> {
    index: HashMap<Uuid, usize>,
    items: Vec<T>,
}

impl<T> Default for OrderedGroup<T> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            items: Vec::new(),
        }
    }
}

impl<T> OrderedGroup<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the item stored under `id`, inserting `make()` at the end if
    /// the id has not been seen.
    pub fn get_or_insert_with(&mut self, id: Uuid, make: impl FnOnce() -> T) -> &mut T {
        match self.get_or_try_insert_with(id, || Ok::<_, Infallible>(make())) {
            Ok(item) => item,
            Err(never) => match never {},
        }
    }

    /// Fallible variant of `get_or_insert_with`; `make` only runs for an
    /// unseen id.
    pub fn get_or_try_insert_with<E>(
        &mut self,
        id: Uuid,
        make: impl FnOnce() -> Result<T, E>,
    ) -> Result<&mut T, E> {
        let slot = match self.index.get(&id) {
            Some(&slot) => slot,
            None => {
                self.items.push(make()?);
                let slot = self.items.len() - 1;
                self.index.insert(id, slot);
                slot
            }
        };
        Ok(&mut self.items[slot])
    }

    /// Insert unless `id` was already seen. Returns whether it was inserted.
    pub fn insert_new(&mut self, id: Uuid, make: impl FnOnce() -> T) -> bool {
        if self.index.contains_key(&id) {
            return false;
        }
        self.get_or_insert_with(id, make);
        true
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

#[derive(Debug)]
struct SectionNode {
    section: CourseSection,
    lessons: OrderedGroup<CourseLesson>,
}

#[derive(Debug)]
struct CourseNode {
    course: Course,
    tags: OrderedGroup<CourseTag>,
    gallery: OrderedGroup<CourseGallery>,
    sections: OrderedGroup<SectionNode>,
}

impl CourseNode {
    fn add_tag(&mut self, id: Option<Uuid>, name: Option<String>) {
        if let Some(id) = present(id) {
            self.tags.insert_new(id, || CourseTag {
                id,
                name: name.unwrap_or_default(),
            });
        }
    }

    fn add_gallery(&mut self, id: Option<Uuid>, url: Option<String>, course_id: Option<Uuid>) {
        let owner = self.course.id;
        if let Some(id) = present(id) {
            self.gallery.insert_new(id, || CourseGallery {
                id,
                course_id: present(course_id).unwrap_or(owner),
                url: url.unwrap_or_default(),
            });
        }
    }

    fn into_course(self) -> Course {
        let mut course = self.course;
        course.tags = self.tags.into_vec();
        course.gallery = self.gallery.into_vec();
        course.sections = self
            .sections
            .into_vec()
            .into_iter()
            .map(|node| {
                let mut section = node.section;
                section.lessons = node.lessons.into_vec();
                section
            })
            .collect();
        course
    }
}

/// Treat the nil UUID like a missing join match.
fn present(id: Option<Uuid>) -> Option<Uuid> {
    id.filter(|id| !id.is_nil())
}

/// Accumulates course graphs from a row stream.
#[derive(Debug)]
pub struct CourseAssembler {
    operation: Operation,
    courses: OrderedGroup<CourseNode>,
}

impl CourseAssembler {
    pub fn new(operation: Operation) -> Self {
        Self {
            operation,
            courses: OrderedGroup::new(),
        }
    }

    /// The first row of a course seeds its scalar fields.
    fn course_node(
        &mut self,
        id: Uuid,
        name: String,
        description: String,
        language: &str,
    ) -> Result<&mut CourseNode, PersistenceError> {
        if id.is_nil() {
            return Err(PersistenceError::Decode {
                operation: self.operation,
                message: "course row carries the nil identifier".into(),
            });
        }

        let operation = self.operation;
        self.courses.get_or_try_insert_with(id, || {
            let language = Language::parse(language).map_err(|e| PersistenceError::Decode {
                operation,
                message: format!("course {}: {}", id, e),
            })?;

            Ok(CourseNode {
                course: Course {
                    id,
                    name,
                    description,
                    language,
                    ..Default::default()
                },
                tags: OrderedGroup::new(),
                gallery: OrderedGroup::new(),
                sections: OrderedGroup::new(),
            })
        })
    }

    /// Fold one row of the full graph query.
    pub fn push_graph_row(&mut self, row: CourseGraphRow) -> Result<(), PersistenceError> {
        let node = self.course_node(row.course_id, row.name, row.description, &row.language)?;
        let course_id = node.course.id;

        node.add_tag(row.tag_id, row.tag_name);
        node.add_gallery(row.gallery_id, row.gallery_url, row.gallery_course_id);

        if let Some(section_id) = present(row.section_id) {
            let section = node.sections.get_or_insert_with(section_id, || SectionNode {
                section: CourseSection {
                    id: section_id,
                    course_id: present(row.section_course_id).unwrap_or(course_id),
                    name: row.section_name.unwrap_or_default(),
                    lessons: Vec::new(),
                },
                lessons: OrderedGroup::new(),
            });

            if let Some(lesson_id) = present(row.lesson_id) {
                section.lessons.insert_new(lesson_id, || CourseLesson {
                    id: lesson_id,
                    course_id: present(row.lesson_course_id).unwrap_or(course_id),
                    course_section_id: present(row.lesson_section_id).unwrap_or(section_id),
                    title: row.lesson_title.unwrap_or_default(),
                    video_url: row.lesson_video_url.unwrap_or_default(),
                });
            }
        }

        Ok(())
    }

    /// Fold one row of the listing query.
    pub fn push_listing_row(&mut self, row: CourseListingRow) -> Result<(), PersistenceError> {
        let node = self.course_node(row.course_id, row.name, row.description, &row.language)?;
        node.add_tag(row.tag_id, row.tag_name);
        node.add_gallery(row.gallery_id, row.gallery_url, row.gallery_course_id);
        Ok(())
    }

    /// Courses in order of first appearance.
    pub fn finish(self) -> Vec<Course> {
        self.courses
            .into_vec()
            .into_iter()
            .map(CourseNode::into_course)
            .collect()
    }
}
