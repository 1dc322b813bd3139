//! Normalized course shapes handed to the planner and the display layer.

use serde::{Deserialize, Serialize};

use crate::duration;

/// One syllabus item with a raw, human-written duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: String,
    pub title: String,
    pub duration: String,
    /// Display title of the owning section.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

impl Lesson {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        duration: impl Into<String>,
        section: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            duration: duration.into(),
            section,
        }
    }

    /// Parsed duration, zero when the text is unparseable.
    pub fn seconds(&self) -> u64 {
        duration::parse_duration(Some(&self.duration)).unwrap_or(0)
    }
}

/// A named group of lessons in the source curriculum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub title: String,
    /// Formatted total length as reported by the curriculum API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_required: Option<String>,
    pub lessons: Vec<Lesson>,
}

/// A fetched course, already validated and normalized.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_title: Option<String>,
    pub sections: Vec<Section>,
}

impl CourseData {
    /// Flatten sections into one ordered lesson list.
    ///
    /// Each lesson is stamped with its section's title so plan days can show
    /// where a lesson came from after the sections are gone.
    pub fn lessons(&self) -> Vec<Lesson> {
        self.sections
            .iter()
            .flat_map(|section| {
                section.lessons.iter().map(move |lesson| Lesson {
                    section: Some(section.title.clone()),
                    ..lesson.clone()
                })
            })
            .collect()
    }

    pub fn lesson_count(&self) -> usize {
        self.sections.iter().map(|s| s.lessons.len()).sum()
    }

    /// Sum of parsed lesson durations across the whole course.
    pub fn total_seconds(&self) -> u64 {
        self.sections
            .iter()
            .flat_map(|s| s.lessons.iter())
            .map(Lesson::seconds)
            .fold(0, u64::saturating_add)
    }
}
