use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use studydeck_lib::config::Config;
use studydeck_lib::srs::{Flashcard, SpacedRepetitionEngine};
use studydeck_lib::storage::JsonFileStore;

use crate::CardArgs;

/// Shared application state for CLI commands
pub struct App {
    pub config: Config,
    pub engine: SpacedRepetitionEngine<JsonFileStore>,
}

impl App {
    /// Load config and open the store
    pub fn new(config_path: Option<&Path>, data_dir: Option<PathBuf>) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => Config::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => Config::load_or_default().context("Failed to load config")?,
        };
        if data_dir.is_some() {
            config.data_dir = data_dir;
        }

        let data_dir = config.data_dir().context("Failed to get data directory")?;
        log::debug!("Using data directory {}", data_dir.display());
        let store = JsonFileStore::new(data_dir.clone())
            .with_context(|| format!("Failed to open store in {}", data_dir.display()))?;

        Ok(Self {
            config,
            engine: SpacedRepetitionEngine::new(store),
        })
    }
}

/// Resolve the cards of a deck from a cards file or explicit ids
pub fn load_cards(deck_id: &str, args: &CardArgs) -> Result<Vec<Flashcard>> {
    if let Some(path) = &args.cards_file {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let cards: Vec<Flashcard> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse cards in {}", path.display()))?;
        return Ok(cards);
    }

    if args.card.is_empty() {
        bail!("No cards given: pass --cards-file or at least one --card");
    }

    Ok(args
        .card
        .iter()
        .map(|id| Flashcard::with_id(deck_id, id))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_cards_from_ids() {
        let args = CardArgs {
            cards_file: None,
            card: vec!["hola".to_string(), "adios".to_string()],
        };

        let cards = load_cards("spanish", &args).unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].id, "hola");
        assert_eq!(cards[1].deck_id, "spanish");
    }

    #[test]
    fn test_cards_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("cards.json");
        fs::write(
            &path,
            r#"[{"id": "hola", "front": "hola", "back": "hello", "tags": ["greeting"]}, {"id": "adios"}]"#,
        )
        .unwrap();
        let args = CardArgs {
            cards_file: Some(path),
            card: Vec::new(),
        };

        let cards = load_cards("spanish", &args).unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].back, "hello");
        assert_eq!(cards[0].tags, vec!["greeting".to_string()]);
        assert_eq!(cards[1].front, "");
    }

    #[test]
    fn test_no_cards_is_an_error() {
        let args = CardArgs {
            cards_file: None,
            card: Vec::new(),
        };
        assert!(load_cards("spanish", &args).is_err());
    }
}
