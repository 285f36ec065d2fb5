use anyhow::Result;
use chrono::Local;

use crate::app::{load_cards, App};
use crate::{CardArgs, OutputFormat};

pub fn run_today(app: &App, deck: &str, format: &OutputFormat) -> Result<()> {
    let stats = app.engine.get_today_stats(deck, Local::now());

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        OutputFormat::Plain => {
            println!("Reviewed today: {}", stats.reviewed);
            println!("Learned today:  {}", stats.learned);
            println!("Accuracy:       {:.0}%", stats.accuracy * 100.0);
            println!("Streak:         {} day(s)", stats.streak);
        }
    }

    Ok(())
}

pub fn run_overview(app: &App, deck: &str, cards: &CardArgs, format: &OutputFormat) -> Result<()> {
    let cards = load_cards(deck, cards)?;
    let overview = app.engine.get_deck_overview(deck, &cards, Local::now());

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&overview)?);
        }
        OutputFormat::Plain => {
            println!("Cards:     {}", overview.total_cards);
            println!("  New:      {}", overview.new_cards);
            println!("  Learning: {}", overview.learning_cards);
            println!("  Review:   {}", overview.review_cards);
            println!("Due now:   {}", overview.due_cards);
            println!("Today:     {} review(s)", overview.reviews_today);
            println!("Streak:    {} day(s), longest {}", overview.streak_days, overview.longest_streak);
        }
    }

    Ok(())
}

pub fn run_history(app: &App, deck: &str, days: Option<u32>, format: &OutputFormat) -> Result<()> {
    let days = days.unwrap_or(app.config.history_days);
    let history = app.engine.get_session_history(deck, days, Local::now());

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&history)?);
        }
        OutputFormat::Plain => {
            if history.is_empty() {
                println!("No sessions in the last {} day(s).", days);
                return Ok(());
            }

            println!("{:<12} {:>8} {:>12}", "Date", "Reviews", "Avg quality");
            for stat in &history {
                println!(
                    "{:<12} {:>8} {:>12.2}",
                    stat.day().format("%Y-%m-%d"),
                    stat.cards_reviewed,
                    stat.average_quality
                );
            }
        }
    }

    Ok(())
}
