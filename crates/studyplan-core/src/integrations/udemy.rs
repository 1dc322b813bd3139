//! Udemy curriculum fetch -- course lookup by slug, then the public
//! curriculum component for that course id.

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::course::CourseData;
use crate::curriculum::{course_slug, transform_curriculum, CourseMeta, CurriculumResponse};
use crate::error::{CoreError, Result};
use crate::integrations::traits::Integration;
use crate::integrations::truncate_body;

const SERVICE: &str = "udemy";

pub struct CurriculumClient {
    http: Client,
    base_url: String,
}

impl CurriculumClient {
    /// Client against `base_url` (normally `https://www.udemy.com`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Resolve a course page URL and return its normalized syllabus.
    pub async fn fetch_course(&self, course_url: &str) -> Result<CourseData> {
        let slug = course_slug(course_url)?;
        let meta = self.fetch_meta(&slug).await?;
        let course_id = meta
            .id
            .ok_or_else(|| CoreError::integration(SERVICE, "Course ID not found in course metadata"))?;

        let curriculum = self.fetch_curriculum(course_id).await?;
        let course = transform_curriculum(&curriculum, meta.title);
        tracing::info!(
            slug = %slug,
            course_id,
            sections = course.sections.len(),
            lessons = course.lesson_count(),
            "curriculum fetched"
        );
        Ok(course)
    }

    /// Course id and title for a slug.
    pub async fn fetch_meta(&self, slug: &str) -> Result<CourseMeta> {
        let url = format!("{}/api-2.0/courses/{slug}/", self.base_url);
        tracing::info!(%url, "GET course meta");
        self.get_json(&url, &[("fields[course]", "id,title")], "Failed to resolve course id")
            .await
    }

    /// Raw curriculum payload for a course id.
    pub async fn fetch_curriculum(&self, course_id: u64) -> Result<CurriculumResponse> {
        let url = format!(
            "{}/api-2.0/course-landing-components/{course_id}/me/",
            self.base_url
        );
        tracing::info!(%url, "GET curriculum");
        self.get_json(&url, &[("components", "curriculum_context")], "Failed to fetch curriculum")
            .await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        failure: &str,
    ) -> Result<T> {
        let resp = self.http.get(url).query(query).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            tracing::warn!(%url, %status, body = %truncate_body(&text, 200), "curriculum request failed");
            return Err(CoreError::integration(
                SERVICE,
                format!("{failure} ({}). {}", status.as_u16(), truncate_body(&text, 400)),
            ));
        }

        Ok(resp.json::<T>().await?)
    }
}

impl Integration for CurriculumClient {
    fn name(&self) -> &str {
        SERVICE
    }

    fn display_name(&self) -> &str {
        "Udemy"
    }

    /// The curriculum endpoints are public.
    fn is_authenticated(&self) -> bool {
        true
    }
}
