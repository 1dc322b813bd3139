//! Boundary between the curriculum API's loose JSON and [`CourseData`].
//!
//! Every field of the remote payload is optional. Fallbacks:
//! - section title: `title`, then `name`, then `Section {n}`
//! - lesson title: `title`, then `name`; untitled items are dropped
//! - lesson duration: `content_summary`, then formatted `content_length`, then `—`

use serde::Deserialize;
use url::Url;

use crate::course::{CourseData, Lesson, Section};
use crate::duration::{format_seconds, normalize_duration};
use crate::error::{Result, ValidationError};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurriculumResponse {
    #[serde(default)]
    pub curriculum_context: Option<CurriculumEnvelope>,
    #[serde(default)]
    pub data: Option<CurriculumContext>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurriculumEnvelope {
    #[serde(default)]
    pub data: Option<CurriculumContext>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurriculumContext {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub sections: Option<Vec<Option<CurriculumSection>>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurriculumSection {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub content_length: Option<f64>,
    #[serde(default)]
    pub items: Option<Vec<Option<CurriculumItem>>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurriculumItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub content_summary: Option<String>,
    #[serde(default)]
    pub content_length: Option<f64>,
}

/// Course metadata answered by the course lookup endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CourseMeta {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
}

impl CurriculumResponse {
    /// The curriculum body, wherever the API chose to put it.
    pub fn context(&self) -> Option<&CurriculumContext> {
        self.curriculum_context
            .as_ref()
            .and_then(|env| env.data.as_ref())
            .or(self.data.as_ref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Normalize a curriculum payload into sections of lessons.
///
/// `course_title` comes from the metadata lookup; when absent the
/// curriculum's own title is used.
pub fn transform_curriculum(response: &CurriculumResponse, course_title: Option<String>) -> CourseData {
    let context = response.context();
    let course_title = course_title
        .filter(|t| !t.trim().is_empty())
        .or_else(|| non_blank(context.and_then(|c| c.title.as_deref())).map(str::to_string));

    let sections = context
        .and_then(|c| c.sections.as_ref())
        .map(|sections| {
            sections
                .iter()
                .enumerate()
                .filter_map(|(idx, section)| section.as_ref().map(|s| transform_section(idx, s)))
                .collect()
        })
        .unwrap_or_default();

    CourseData {
        course_title,
        sections,
    }
}

fn transform_section(section_idx: usize, section: &CurriculumSection) -> Section {
    let title = non_blank(section.title.as_deref())
        .or_else(|| non_blank(section.name.as_deref()))
        .map(str::to_string)
        .unwrap_or_else(|| format!("Section {}", section_idx + 1));

    let lessons = section
        .items
        .iter()
        .flatten()
        .enumerate()
        .filter_map(|(item_idx, item)| {
            let item = item.as_ref()?;
            let item_title = non_blank(item.title.as_deref()).or_else(|| non_blank(item.name.as_deref()))?;
            let duration = match non_blank(item.content_summary.as_deref()) {
                Some(summary) => summary.to_string(),
                None => normalize_duration(None, item.content_length),
            };
            Some(Lesson {
                id: format!("{section_idx}-{item_idx}-{item_title}"),
                title: item_title.to_string(),
                duration,
                section: Some(title.clone()),
            })
        })
        .collect();

    Section {
        time_required: format_seconds(section.content_length),
        title,
        lessons,
    }
}

/// Extract the course slug from a course page URL.
///
/// `https://host/course/<slug>/...` yields `<slug>`; any other URL yields its
/// first path segment.
pub fn course_slug(course_url: &str) -> Result<String> {
    let url = Url::parse(course_url.trim()).map_err(|e| ValidationError::InvalidUrl {
        url: course_url.to_string(),
        message: e.to_string(),
    })?;

    let parts: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    let slug = match parts.iter().position(|p| *p == "course") {
        Some(idx) => parts.get(idx + 1),
        None => parts.first(),
    };

    slug.map(|s| s.to_string())
        .ok_or_else(|| ValidationError::MissingSlug(course_url.to_string()).into())
}
