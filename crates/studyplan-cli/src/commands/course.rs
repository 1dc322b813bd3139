use clap::Subcommand;
use studyplan_core::{format_clock, Config, CourseCache, CourseData, CurriculumClient};

#[derive(Subcommand)]
pub enum CourseAction {
    /// Fetch a course syllabus and list its sections and lessons
    Fetch {
        /// Course page URL (e.g. https://www.udemy.com/course/<slug>/)
        url: String,
        /// Ignore the local cache and fetch again
        #[arg(long)]
        refresh: bool,
        /// Print the normalized course as JSON
        #[arg(long)]
        json: bool,
    },
    /// List cached course URLs
    Cached,
    /// Forget cached courses (one URL, or all of them)
    ClearCache {
        /// Only forget this course
        url: Option<String>,
    },
}

pub async fn run(action: CourseAction, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        CourseAction::Fetch { url, refresh, json } => {
            let course = load_course(config, &url, refresh).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&course)?);
            } else {
                print_course(&course);
            }
        }
        CourseAction::Cached => {
            let cache = CourseCache::open()?;
            for url in cache.urls()? {
                println!("{url}");
            }
        }
        CourseAction::ClearCache { url } => {
            let cache = CourseCache::open()?;
            match url {
                Some(url) => {
                    if cache.remove(&url)? {
                        println!("forgot {url}");
                    } else {
                        println!("not cached: {url}");
                    }
                }
                None => println!("cleared {} cached course(s)", cache.clear()?),
            }
        }
    }
    Ok(())
}

/// Course for `url`, from the cache when allowed, otherwise from the API.
///
/// Cache failures are logged and never block a fetch.
pub async fn load_course(
    config: &Config,
    url: &str,
    refresh: bool,
) -> Result<CourseData, Box<dyn std::error::Error>> {
    let cache = if config.curriculum.cache_enabled {
        CourseCache::open()
            .map_err(|e| tracing::warn!(error = %e, "course cache unavailable"))
            .ok()
    } else {
        None
    };

    if let (Some(cache), false) = (&cache, refresh) {
        match cache.get(url) {
            Ok(Some(hit)) => {
                tracing::debug!(url, fetched_at = %hit.fetched_at, "using cached course");
                return Ok(hit.course);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "course cache lookup failed"),
        }
    }

    let client = CurriculumClient::new(&config.curriculum.base_url);
    let course = client.fetch_course(url).await?;

    if let Some(cache) = &cache {
        if let Err(e) = cache.put(url, &course) {
            tracing::warn!(error = %e, "could not cache course");
        }
    }
    Ok(course)
}

fn print_course(course: &CourseData) {
    println!("{}", course.course_title.as_deref().unwrap_or("(untitled course)"));
    println!(
        "{} sections, {} lessons, {} total",
        course.sections.len(),
        course.lesson_count(),
        format_clock(course.total_seconds())
    );

    for (idx, section) in course.sections.iter().enumerate() {
        println!();
        match &section.time_required {
            Some(time) => println!("{}. {}  ({time})", idx + 1, section.title),
            None => println!("{}. {}", idx + 1, section.title),
        }
        for (n, lesson) in section.lessons.iter().enumerate() {
            println!("  {:>3}  {:<60} {:>10}", n + 1, lesson.title, lesson.duration);
        }
    }
}
