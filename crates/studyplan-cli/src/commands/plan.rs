use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Subcommand};
use serde::Deserialize;
use studyplan_core::{
    format_clock, Config, CourseData, Lesson, PlanBuilder, PlanDay, PlanSummary, TrelloClient,
    TrelloCredentials,
};

use super::course::load_course;

#[derive(Subcommand)]
pub enum PlanAction {
    /// Split a course into days of at most --hours of lessons
    Build {
        #[command(flatten)]
        source: PlanSource,
        /// Daily study hours (fractions allowed); defaults to planner.daily_hours
        #[arg(long)]
        hours: Option<f64>,
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
    /// Build a plan and export it to a new Trello board
    Export {
        #[command(flatten)]
        source: PlanSource,
        /// Daily study hours (fractions allowed); defaults to planner.daily_hours
        #[arg(long)]
        hours: Option<f64>,
        /// Board name; defaults to the course title
        #[arg(long)]
        title: Option<String>,
        /// Open the board in the browser afterwards
        #[arg(long)]
        open: bool,
    },
}

/// Where the lessons come from.
#[derive(Args)]
pub struct PlanSource {
    /// Course page URL
    #[arg(required_unless_present = "from_file", conflicts_with = "from_file")]
    url: Option<String>,
    /// Read a course (as printed by `course fetch --json`) or a lesson array from a file
    #[arg(long, value_name = "PATH")]
    from_file: Option<PathBuf>,
    /// Ignore the local cache and fetch again
    #[arg(long)]
    refresh: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PlanInput {
    Lessons(Vec<Lesson>),
    Course(CourseData),
}

impl PlanInput {
    fn into_parts(self) -> (Option<String>, Vec<Lesson>) {
        match self {
            PlanInput::Lessons(lessons) => (None, lessons),
            PlanInput::Course(course) => {
                let lessons = course.lessons();
                (course.course_title, lessons)
            }
        }
    }
}

fn read_input(path: &Path) -> Result<PlanInput, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let input = serde_json::from_str(&content)
        .map_err(|e| format!("{} is neither a course nor a lesson list: {e}", path.display()))?;
    Ok(input)
}

async fn lessons_for(
    source: &PlanSource,
    config: &Config,
) -> Result<(Option<String>, Vec<Lesson>), Box<dyn std::error::Error>> {
    let (title, lessons) = match (&source.from_file, &source.url) {
        (Some(path), _) => read_input(path)?.into_parts(),
        (None, Some(url)) => {
            let course = load_course(config, url, source.refresh).await?;
            let lessons = course.lessons();
            (course.course_title, lessons)
        }
        (None, None) => return Err("a course URL or --from-file is required".into()),
    };

    if lessons.is_empty() {
        return Err("no lessons found for this course".into());
    }
    Ok((title, lessons))
}

fn planner(hours: Option<f64>, config: &Config) -> Result<PlanBuilder, Box<dyn std::error::Error>> {
    let hours = hours.unwrap_or(config.planner.daily_hours);
    if !(hours > 0.0) || !hours.is_finite() {
        return Err(format!("daily hours must be a positive number, got {hours}").into());
    }
    Ok(PlanBuilder::new(hours))
}

pub async fn run(action: PlanAction, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        PlanAction::Build {
            source,
            hours,
            json,
        } => {
            let builder = planner(hours, config)?;
            let (title, lessons) = lessons_for(&source, config).await?;
            let plan = builder.build(&lessons);

            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                if let Some(title) = title {
                    println!("{title}");
                }
                print_plan(&plan, &builder);
            }
        }
        PlanAction::Export {
            source,
            hours,
            title,
            open,
        } => {
            let builder = planner(hours, config)?;
            let credentials = TrelloCredentials::load().ok_or(
                "Trello credentials not configured; run `studyplan auth trello login` \
                 or set TRELLO_API_KEY and TRELLO_TOKEN",
            )?;
            let (course_title, lessons) = lessons_for(&source, config).await?;
            let board_name = title
                .or(course_title)
                .ok_or("the course has no title; pass --title")?;
            let plan = builder.build(&lessons);

            let client = TrelloClient::new(&config.trello.base_url, credentials)
                .with_request_delay(Duration::from_millis(config.trello.request_delay_ms))
                .with_long_lesson_secs(config.trello.long_lesson_secs);
            let summary = client.export_plan(&board_name, &plan).await?;

            println!(
                "exported {} day(s), {} card(s), {} checklist item(s)",
                summary.lists, summary.cards, summary.check_items
            );
            if summary.failed_check_items > 0 {
                eprintln!(
                    "warning: {} checklist item(s) could not be created",
                    summary.failed_check_items
                );
            }
            println!("{}", summary.board_url);

            if open && !summary.board_url.is_empty() {
                open::that(&summary.board_url)?;
            }
        }
    }
    Ok(())
}

fn print_plan(plan: &[PlanDay], builder: &PlanBuilder) {
    let summary = PlanSummary::of(plan);
    let capacity = builder.daily_capacity_secs().unwrap_or(0);
    println!(
        "{} day(s), {} lesson(s), {} total at {} per day",
        summary.days,
        summary.lessons,
        format_clock(summary.total_seconds),
        format_clock(capacity)
    );

    for day in plan {
        println!();
        let over = if day.total_seconds > capacity { "  (over capacity)" } else { "" };
        println!("Day {}  {}{over}", day.day, format_clock(day.total_seconds));
        for (idx, lesson) in day.lessons.iter().enumerate() {
            let section = lesson
                .section
                .as_deref()
                .map(|s| format!("[{s}] "))
                .unwrap_or_default();
            println!(
                "  {:>3}  {section}{:<50} {:>10}",
                idx + 1,
                lesson.title,
                lesson.duration
            );
        }
    }
}
