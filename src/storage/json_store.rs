//! JSON file storage for scheduling data
//!
//! Directory structure:
//! ```text
//! {data_dir}/srs/
//! ├── reviews.json         # Array of all card review states
//! └── session_stats.json   # Array of all daily session stats
//! ```
//!
//! A file that no longer parses is renamed to `<name>.corrupt-<timestamp>`
//! when it is read, so the next save cannot overwrite the only copy.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::store::{filter_deck, ReviewStore, Result};
use crate::srs::models::{CardReviewState, DailySessionStat};

/// Storage for review states and session stats as JSON files
pub struct JsonFileStore {
    srs_dir: PathBuf,
}

impl JsonFileStore {
    /// Create a new store rooted at `data_dir`
    pub fn new(data_dir: PathBuf) -> Result<Self> {
        let srs_dir = data_dir.join("srs");
        fs::create_dir_all(&srs_dir)?;

        Ok(Self { srs_dir })
    }

    /// Get the path to the review states file
    fn reviews_file(&self) -> PathBuf {
        self.srs_dir.join("reviews.json")
    }

    /// Get the path to the session stats file
    fn session_stats_file(&self) -> PathBuf {
        self.srs_dir.join("session_stats.json")
    }

    fn read_list<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(path)?;
        match serde_json::from_str::<Vec<T>>(&content) {
            Ok(items) => Ok(items),
            Err(e) => {
                Self::set_aside(path)?;
                Err(e.into())
            }
        }
    }

    /// Move an unparsable file out of the way, keeping its contents
    fn set_aside(path: &Path) -> Result<PathBuf> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stamp = Utc::now().format("%Y%m%dT%H%M%S%.3f");
        let corrupt_path = path.with_file_name(format!("{}.corrupt-{}", name, stamp));

        fs::rename(path, &corrupt_path)?;
        log::warn!(
            "Moved unreadable {} to {}",
            path.display(),
            corrupt_path.display()
        );
        Ok(corrupt_path)
    }

    /// Write through a sibling temp file so readers never see a partial file
    fn write_list<T: Serialize>(path: &Path, items: &[T]) -> Result<()> {
        let json = serde_json::to_string_pretty(items)?;
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, path)?;
        Ok(())
    }
}

impl ReviewStore for JsonFileStore {
    fn load_reviews(&self, deck_id: Option<&str>) -> Result<Vec<CardReviewState>> {
        let reviews: Vec<CardReviewState> = Self::read_list(&self.reviews_file())?;
        Ok(filter_deck(reviews, deck_id, |r: &CardReviewState| r.deck_id.as_str()))
    }

    fn save_reviews(&self, reviews: &[CardReviewState]) -> Result<()> {
        Self::write_list(&self.reviews_file(), reviews)
    }

    fn load_session_stats(&self, deck_id: Option<&str>) -> Result<Vec<DailySessionStat>> {
        let stats: Vec<DailySessionStat> = Self::read_list(&self.session_stats_file())?;
        Ok(filter_deck(stats, deck_id, |s: &DailySessionStat| s.deck_id.as_str()))
    }

    fn save_session_stats(&self, stats: &[DailySessionStat]) -> Result<()> {
        Self::write_list(&self.session_stats_file(), stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::srs::models::Quality;
    use crate::storage::StorageError;
    use chrono::{Duration, NaiveDate, TimeZone, Utc};
    use tempfile::TempDir;

    fn create_test_store() -> (JsonFileStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp_dir.path().to_path_buf()).unwrap();
        (store, temp_dir)
    }

    fn review(card_id: &str, deck_id: &str) -> CardReviewState {
        let reviewed_at = Utc.with_ymd_and_hms(2026, 3, 10, 8, 0, 0).unwrap();
        CardReviewState {
            card_id: card_id.to_string(),
            deck_id: deck_id.to_string(),
            quality: Quality::Good,
            reviewed_at,
            interval_days: 6,
            ease_factor: 2.36,
            repetitions: 1,
            next_review_at: reviewed_at + Duration::days(6),
        }
    }

    #[test]
    fn test_empty_store_loads_nothing() {
        let (store, _temp) = create_test_store();

        assert!(store.load_reviews(None).unwrap().is_empty());
        assert!(store.load_session_stats(Some("deck")).unwrap().is_empty());
    }

    #[test]
    fn test_save_and_load_filtered_by_deck() {
        let (store, _temp) = create_test_store();

        store
            .save_reviews(&[review("a", "spanish"), review("b", "spanish"), review("c", "chemistry")])
            .unwrap();

        assert_eq!(store.load_reviews(None).unwrap().len(), 3);
        let spanish = store.load_reviews(Some("spanish")).unwrap();
        assert_eq!(spanish.len(), 2);
        assert!(spanish.iter().all(|r| r.deck_id == "spanish"));
        assert_eq!(spanish[0], review("a", "spanish"));
    }

    #[test]
    fn test_session_stats_persist() {
        let (store, temp) = create_test_store();
        let day = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();

        store
            .save_session_stats(&[DailySessionStat::new("spanish", day, Quality::Easy)])
            .unwrap();

        let reopened = JsonFileStore::new(temp.path().to_path_buf()).unwrap();
        let stats = reopened.load_session_stats(Some("spanish")).unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].day(), day);
        assert_eq!(stats[0].cards_reviewed, 1);
    }

    #[test]
    fn test_save_replaces_collection() {
        let (store, temp) = create_test_store();

        store.save_reviews(&[review("a", "d"), review("b", "d")]).unwrap();
        store.save_reviews(&[review("b", "d")]).unwrap();

        let reviews = store.load_reviews(None).unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].card_id, "b");
        assert!(!temp.path().join("srs").join("reviews.json.tmp").exists());
    }

    fn corrupt_files(temp: &TempDir) -> Vec<PathBuf> {
        fs::read_dir(temp.path().join("srs"))
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| path.to_string_lossy().contains(".corrupt-"))
            .collect()
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let (store, temp) = create_test_store();
        fs::write(temp.path().join("srs").join("reviews.json"), "{ not json").unwrap();

        assert!(matches!(store.load_reviews(None), Err(StorageError::Json(_))));
    }

    #[test]
    fn test_malformed_file_is_set_aside() {
        let (store, temp) = create_test_store();
        let reviews_file = temp.path().join("srs").join("reviews.json");
        fs::write(&reviews_file, "[{\"cardId\": \"a\", \"deckId\": \"chemistry\"").unwrap();

        assert!(store.load_reviews(None).is_err());
        assert!(!reviews_file.exists());

        let corrupt = corrupt_files(&temp);
        assert_eq!(corrupt.len(), 1);
        assert!(corrupt[0]
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("reviews.json.corrupt-"));
        assert!(fs::read_to_string(&corrupt[0]).unwrap().contains("chemistry"));

        // Once moved, the collection reads as empty and saves normally
        assert!(store.load_reviews(None).unwrap().is_empty());
        store.save_reviews(&[review("b", "spanish")]).unwrap();
        assert_eq!(store.load_reviews(None).unwrap().len(), 1);
        assert_eq!(corrupt_files(&temp).len(), 1);
    }
}
