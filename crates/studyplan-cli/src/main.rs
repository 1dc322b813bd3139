use clap::{CommandFactory, Parser, Subcommand};
use studyplan_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(
    name = "studyplan",
    version,
    about = "Split a course syllabus into a day-by-day study plan"
)]
struct Cli {
    /// Log filter (e.g. "debug", "studyplan_core=trace"); overrides RUST_LOG
    #[arg(short = 'l', long = "log-level", global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch and inspect course syllabi
    Course {
        #[command(subcommand)]
        action: commands::course::CourseAction,
    },
    /// Build and export study plans
    Plan {
        #[command(subcommand)]
        action: commands::plan::PlanAction,
    },
    /// Parse or format lesson durations
    Duration {
        #[command(subcommand)]
        action: commands::duration::DurationAction,
    },
    /// Authentication management for integrations
    Auth {
        #[command(subcommand)]
        action: commands::auth::AuthAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Priority: --log-level > RUST_LOG > config `log_level`.
fn setup_logging(cli_level: Option<&str>, config_level: &str) {
    let filter = match cli_level {
        Some(level) => EnvFilter::try_new(level),
        None => EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(config_level)),
    }
    .unwrap_or_else(|e| {
        eprintln!("warning: bad log filter ({e}), defaulting to warn");
        EnvFilter::new("warn")
    });

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = Config::load_or_default();
    setup_logging(cli.log_level.as_deref(), &config.log_level);
    tracing::debug!(config_dir = ?Config::path().ok(), "configuration loaded");

    let result = match cli.command {
        Commands::Course { action } => commands::course::run(action, &config).await,
        Commands::Plan { action } => commands::plan::run(action, &config).await,
        Commands::Duration { action } => commands::duration::run(action),
        Commands::Auth { action } => commands::auth::run(action, &config).await,
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "studyplan", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
