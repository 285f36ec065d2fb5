mod app;
mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "studydeck-cli", about = "Spaced repetition scheduling for study decks", version)]
struct Cli {
    /// Store scheduling data in this directory (overrides the config file)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Config file (default: <config dir>/studydeck/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

/// Where the cards of a deck come from
#[derive(Args, Debug)]
pub struct CardArgs {
    /// JSON file holding an array of flashcards
    #[arg(long, conflicts_with = "card")]
    cards_file: Option<PathBuf>,

    /// Card id (repeat for several cards)
    #[arg(long)]
    card: Vec<String>,
}

#[derive(Subcommand)]
enum Command {
    /// List cards due for review
    Due {
        /// Deck id
        deck: String,
        #[command(flatten)]
        cards: CardArgs,
    },

    /// List cards scheduled in the future
    Upcoming {
        /// Deck id
        deck: String,
        #[command(flatten)]
        cards: CardArgs,
        /// Maximum results (default from config)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Grade a card: 1 again, 2 hard, 3 good, 4 easy
    Review {
        /// Deck id
        deck: String,
        /// Card id
        card: String,
        /// Rating from 1 to 4
        rating: u8,
    },

    /// Show the interval each rating would give a card
    Preview {
        /// Deck id
        deck: String,
        /// Card id
        card: String,
    },

    /// Show today's reviews, accuracy and streak
    Stats {
        /// Deck id
        deck: String,
    },

    /// Show card counts by phase
    Overview {
        /// Deck id
        deck: String,
        #[command(flatten)]
        cards: CardArgs,
    },

    /// Show daily session stats
    History {
        /// Deck id
        deck: String,
        /// Number of days (default from config)
        #[arg(long)]
        days: Option<u32>,
    },

    /// Export a deck's scheduling data as JSON
    Export {
        /// Deck id
        deck: String,
        /// Write to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Import a deck export, replacing that deck's data
    Import {
        /// File produced by `export`
        file: PathBuf,
    },

    /// Delete all scheduling data of a deck
    DeleteDeck {
        /// Deck id
        deck: String,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let app = app::App::new(cli.config.as_deref(), cli.data_dir)?;

    match cli.command {
        Command::Due { deck, cards } => {
            commands::due::run_due(&app, &deck, &cards, &cli.format)?;
        }
        Command::Upcoming { deck, cards, limit } => {
            commands::due::run_upcoming(&app, &deck, &cards, limit, &cli.format)?;
        }
        Command::Review { deck, card, rating } => {
            commands::review::run_review(&app, &deck, &card, rating, &cli.format)?;
        }
        Command::Preview { deck, card } => {
            commands::review::run_preview(&app, &deck, &card, &cli.format)?;
        }
        Command::Stats { deck } => {
            commands::stats::run_today(&app, &deck, &cli.format)?;
        }
        Command::Overview { deck, cards } => {
            commands::stats::run_overview(&app, &deck, &cards, &cli.format)?;
        }
        Command::History { deck, days } => {
            commands::stats::run_history(&app, &deck, days, &cli.format)?;
        }
        Command::Export { deck, output } => {
            commands::deck::run_export(&app, &deck, output.as_deref())?;
        }
        Command::Import { file } => {
            commands::deck::run_import(&app, &file, &cli.format)?;
        }
        Command::DeleteDeck { deck } => {
            commands::deck::run_delete(&app, &deck, &cli.format)?;
        }
    }

    Ok(())
}
