use clap::Subcommand;
use studyplan_core::{format_compact, format_seconds, parse_duration};

#[derive(Subcommand)]
pub enum DurationAction {
    /// Convert a duration like "1:02:03", "10min" or "1h 5m" to seconds
    Parse {
        /// Duration text
        text: String,
    },
    /// Render a number of seconds as H:MM:SS or M:SS
    Format {
        /// Seconds (fractions are rounded)
        #[arg(allow_negative_numbers = true)]
        seconds: f64,
        /// Use the "1h 30m" form instead
        #[arg(long)]
        compact: bool,
    },
}

pub fn run(action: DurationAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        DurationAction::Parse { text } => {
            let secs = parse_duration(Some(&text))
                .ok_or_else(|| format!("cannot parse duration: {text:?}"))?;
            println!("{secs}");
        }
        DurationAction::Format { seconds, compact } => {
            let out = if compact {
                if !seconds.is_finite() || seconds < 0.0 {
                    return Err(format!("not a duration: {seconds}").into());
                }
                format_compact(seconds.round() as u64)
            } else {
                format_seconds(Some(seconds)).ok_or_else(|| format!("not a duration: {seconds}"))?
            };
            println!("{out}");
        }
    }
    Ok(())
}
