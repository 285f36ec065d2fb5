use anyhow::{Context, Result};
use chrono::Local;

use studydeck_lib::srs::algorithm::format_interval;

use crate::app::App;
use crate::OutputFormat;

pub fn run_review(app: &App, deck: &str, card: &str, rating: u8, format: &OutputFormat) -> Result<()> {
    let state = app
        .engine
        .record_review_rating(deck, card, rating, Local::now())
        .with_context(|| format!("Failed to record review of {}", card))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
        OutputFormat::Plain => {
            println!("Reviewed {} ({:?})", state.card_id, state.quality);
            println!(
                "  Next review: {} ({})",
                state.next_review_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                format_interval(state.interval_days)
            );
            println!("  Ease factor: {:.2}", state.ease_factor);
            println!("  Repetitions: {}", state.repetitions);
        }
    }

    Ok(())
}

pub fn run_preview(app: &App, deck: &str, card: &str, format: &OutputFormat) -> Result<()> {
    let preview = app.engine.preview_intervals(deck, card);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&preview)?);
        }
        OutputFormat::Plain => {
            println!(
                "1 Again: {}  2 Hard: {}  3 Good: {}  4 Easy: {}",
                format_interval(preview.again),
                format_interval(preview.hard),
                format_interval(preview.good),
                format_interval(preview.easy)
            );
        }
    }

    Ok(())
}
