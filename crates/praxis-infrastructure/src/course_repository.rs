//! Document-store backed CourseRepository implementation.

use crate::json_store::JsonDocumentStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use praxis_core::course::{Course, CourseRepository};

const COLLECTION: &str = "courses";

/// Reads course documents from `courses/{id}.json`.
///
/// Courses are written by the admin panel; this side only needs `save` to
/// seed catalogs in development and tests.
pub struct JsonCourseRepository {
    store: JsonDocumentStore,
}

impl JsonCourseRepository {
    pub fn new(store: JsonDocumentStore) -> Self {
        Self { store }
    }

    /// Writes a course document (development/test seeding).
    pub async fn save(&self, course: &Course) -> Result<()> {
        self.store
            .save(COLLECTION, &course.id, course)
            .await
            .context("Failed to save course")
    }
}

#[async_trait]
impl CourseRepository for JsonCourseRepository {
    async fn find_by_id(&self, course_id: &str) -> Result<Option<Course>> {
        self.store
            .load(COLLECTION, course_id)
            .await
            .context("Failed to load course")
    }
}
