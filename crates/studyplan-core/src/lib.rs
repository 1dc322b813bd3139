//! # studyplan core library
//!
//! Turns a course syllabus into a day-by-day study plan. The CLI binary is a
//! thin layer over the same library.
//!
//! ## Architecture
//!
//! - **Duration codec**: free-form lesson durations to seconds and back
//! - **Planner**: greedy, order-preserving packing of lessons into days
//! - **Curriculum**: boundary types for the course API and their normalization
//! - **Integrations**: Udemy curriculum fetch and Trello board export
//! - **Storage**: TOML configuration and a SQLite cache of fetched courses
//!
//! ## Key Components
//!
//! - [`parse_duration`] / [`format_seconds`] / [`normalize_duration`]
//! - [`PlanBuilder`] and [`build_plan`]
//! - [`CurriculumClient`] and [`TrelloClient`]
//! - [`Config`] and [`CourseCache`]

pub mod course;
pub mod curriculum;
pub mod duration;
pub mod error;
pub mod integrations;
pub mod plan;
pub mod storage;

pub use course::{CourseData, Lesson, Section};
pub use duration::{format_clock, format_compact, format_seconds, normalize_duration, parse_duration};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use integrations::{CurriculumClient, ExportSummary, Integration, TrelloClient, TrelloCredentials};
pub use plan::{build_plan, PlanBuilder, PlanDay, PlanSummary, SectionChunk};
pub use storage::{CachedCourse, Config, CourseCache};
