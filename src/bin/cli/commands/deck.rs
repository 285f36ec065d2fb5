use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;

use studydeck_lib::srs::DeckSnapshot;

use crate::app::App;
use crate::OutputFormat;

pub fn run_export(app: &App, deck: &str, output: Option<&Path>) -> Result<()> {
    let snapshot = app.engine.export_deck(deck, Local::now());
    let json = serde_json::to_string_pretty(&snapshot)?;

    match output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "Exported {} review state(s) of {} to {}",
                snapshot.reviews.len(),
                deck,
                path.display()
            );
        }
        None => println!("{}", json),
    }

    Ok(())
}

pub fn run_import(app: &App, file: &Path, format: &OutputFormat) -> Result<()> {
    let content = fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let snapshot: DeckSnapshot =
        serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", file.display()))?;
    let deck = snapshot.deck_id.clone();

    let summary = app
        .engine
        .import_deck(snapshot)
        .with_context(|| format!("Failed to import deck {}", deck))?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "deckId": deck,
                "reviews": summary.reviews,
                "sessionStats": summary.session_stats,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!(
                "Imported deck {}: {} review state(s), {} session day(s)",
                deck, summary.reviews, summary.session_stats
            );
        }
    }

    Ok(())
}

pub fn run_delete(app: &App, deck: &str, format: &OutputFormat) -> Result<()> {
    app.engine
        .delete_deck_data(deck)
        .with_context(|| format!("Failed to delete deck {}", deck))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::json!({ "deckId": deck, "deleted": true }));
        }
        OutputFormat::Plain => println!("Deleted scheduling data for {}", deck),
    }

    Ok(())
}
