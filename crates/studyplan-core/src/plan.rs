//! Day-by-day study planner.
//!
//! Lessons are packed into days greedily, in input order:
//! - a day is closed as soon as the next lesson would push it over capacity
//! - a lesson longer than a whole day still gets a day of its own
//! - lessons are never reordered or dropped

use serde::{Deserialize, Serialize};

use crate::course::Lesson;

/// One capacity-bounded day of the plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDay {
    /// 1-based, contiguous across a plan.
    pub day: u32,
    pub total_seconds: u64,
    pub lessons: Vec<Lesson>,
}

/// A run of one day's lessons that share a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionChunk<'a> {
    /// `None` for lessons that were never assigned a section.
    pub section: Option<&'a str>,
    pub lessons: Vec<&'a Lesson>,
    pub total_seconds: u64,
}

impl PlanDay {
    fn open(day: u32) -> Self {
        Self {
            day,
            total_seconds: 0,
            lessons: Vec::new(),
        }
    }

    pub fn lesson_count(&self) -> usize {
        self.lessons.len()
    }

    /// Group this day's lessons by section, sections in order of first appearance.
    pub fn section_chunks(&self) -> Vec<SectionChunk<'_>> {
        let mut chunks: Vec<SectionChunk<'_>> = Vec::new();
        for lesson in &self.lessons {
            let section = lesson.section.as_deref();
            let seconds = lesson.seconds();
            match chunks.iter_mut().find(|c| c.section == section) {
                Some(chunk) => {
                    chunk.lessons.push(lesson);
                    chunk.total_seconds = chunk.total_seconds.saturating_add(seconds);
                }
                None => chunks.push(SectionChunk {
                    section,
                    lessons: vec![lesson],
                    total_seconds: seconds,
                }),
            }
        }
        chunks
    }
}

/// Totals across a whole plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    pub days: usize,
    pub lessons: usize,
    pub total_seconds: u64,
}

impl PlanSummary {
    pub fn of(plan: &[PlanDay]) -> Self {
        Self {
            days: plan.len(),
            lessons: plan.iter().map(PlanDay::lesson_count).sum(),
            total_seconds: plan
                .iter()
                .map(|d| d.total_seconds)
                .fold(0, u64::saturating_add),
        }
    }
}

/// Greedy first-fit-by-order planner.
#[derive(Debug, Clone, Copy)]
pub struct PlanBuilder {
    daily_hours: f64,
}

impl PlanBuilder {
    /// Planner with the given daily capacity in (possibly fractional) hours.
    pub fn new(daily_hours: f64) -> Self {
        Self { daily_hours }
    }

    /// Daily capacity in whole seconds, `None` when the hours are not positive.
    pub fn daily_capacity_secs(&self) -> Option<u64> {
        if self.daily_hours > 0.0 {
            // `as` saturates for an infinite capacity.
            Some((self.daily_hours * 3600.0).round() as u64)
        } else {
            None
        }
    }

    /// Partition `lessons` into days.
    ///
    /// Empty input or a non-positive (or NaN) capacity yields an empty plan.
    /// Unparseable durations count as zero seconds.
    pub fn build(&self, lessons: &[Lesson]) -> Vec<PlanDay> {
        let capacity = match self.daily_capacity_secs() {
            Some(c) if !lessons.is_empty() => c,
            _ => return Vec::new(),
        };

        let mut days = Vec::new();
        let mut current = PlanDay::open(1);

        for lesson in lessons {
            let seconds = lesson.seconds();
            let will_exceed = current.total_seconds.saturating_add(seconds) > capacity
                && !current.lessons.is_empty();

            if will_exceed {
                let next = current.day + 1;
                days.push(std::mem::replace(&mut current, PlanDay::open(next)));
            }
            current.lessons.push(lesson.clone());
            current.total_seconds = current.total_seconds.saturating_add(seconds);
        }

        if !current.lessons.is_empty() {
            days.push(current);
        }

        days
    }
}

/// Convenience wrapper around [`PlanBuilder::build`].
pub fn build_plan(lessons: &[Lesson], daily_hours: f64) -> Vec<PlanDay> {
    PlanBuilder::new(daily_hours).build(lessons)
}
