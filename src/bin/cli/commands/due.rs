use anyhow::Result;
use chrono::{DateTime, Local, Utc};

use studydeck_lib::srs::algorithm::format_interval;
use studydeck_lib::srs::{CardWithSchedule, Flashcard};

use crate::app::{load_cards, App};
use crate::{CardArgs, OutputFormat};

pub fn run_due(app: &App, deck: &str, cards: &CardArgs, format: &OutputFormat) -> Result<()> {
    let cards = load_cards(deck, cards)?;
    let now = Local::now();
    let due = app.engine.get_due_cards(deck, &cards, now);

    print_cards(&due, now, format, "No cards due.")
}

pub fn run_upcoming(
    app: &App,
    deck: &str,
    cards: &CardArgs,
    limit: Option<usize>,
    format: &OutputFormat,
) -> Result<()> {
    let cards = load_cards(deck, cards)?;
    let limit = limit.unwrap_or(app.config.upcoming_limit);
    let now = Local::now();
    let upcoming = app.engine.get_upcoming_cards(deck, &cards, limit, now);

    print_cards(&upcoming, now, format, "No upcoming cards.")
}

fn print_cards(
    cards: &[CardWithSchedule<Flashcard>],
    now: DateTime<Local>,
    format: &OutputFormat,
    empty_message: &str,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(cards)?);
        }
        OutputFormat::Plain => {
            if cards.is_empty() {
                println!("{}", empty_message);
                return Ok(());
            }

            let id_width = cards.iter().map(|c| c.card.id.len()).max().unwrap_or(2).clamp(2, 36);
            println!("{:<iw$} {:<16} {:<8} {}", "ID", "Next review", "Interval", "Front", iw = id_width);
            println!("{}", "-".repeat(id_width + 16 + 8 + 20));

            for scheduled in cards {
                let next = if scheduled.is_new() {
                    "new".to_string()
                } else if scheduled.next_review <= now.with_timezone(&Utc) {
                    "due".to_string()
                } else {
                    scheduled
                        .next_review
                        .with_timezone(&Local)
                        .format("%Y-%m-%d %H:%M")
                        .to_string()
                };
                let front: String = scheduled.card.front.chars().take(40).collect();
                println!(
                    "{:<iw$} {:<16} {:<8} {}",
                    scheduled.card.id,
                    next,
                    format_interval(scheduled.interval),
                    front,
                    iw = id_width
                );
            }

            println!();
            println!("{} card(s)", cards.len());
        }
    }

    Ok(())
}
