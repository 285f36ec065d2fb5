use thiserror::Error;

use crate::srs::models::{CardReviewState, DailySessionStat};

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Write rejected: {0}")]
    WriteRejected(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Persistent home of review states and session stats.
///
/// Each collection is loaded and saved as a whole; `save_*` replaces the
/// stored collection. Implementations must not expose a half-written
/// collection: a failed save leaves the previous contents readable.
///
/// A load that fails with [`StorageError::Json`] reports data that can never
/// be parsed. The engine then saves over it, so an implementation must keep
/// such data somewhere the next save does not reach. Any other error is
/// taken as possibly transient and stops the engine from saving.
pub trait ReviewStore {
    /// Load review states, optionally only those of one deck
    fn load_reviews(&self, deck_id: Option<&str>) -> Result<Vec<CardReviewState>>;

    fn save_reviews(&self, reviews: &[CardReviewState]) -> Result<()>;

    /// Load session stats, optionally only those of one deck
    fn load_session_stats(&self, deck_id: Option<&str>) -> Result<Vec<DailySessionStat>>;

    fn save_session_stats(&self, stats: &[DailySessionStat]) -> Result<()>;
}

impl<S: ReviewStore + ?Sized> ReviewStore for &S {
    fn load_reviews(&self, deck_id: Option<&str>) -> Result<Vec<CardReviewState>> {
        (**self).load_reviews(deck_id)
    }

    fn save_reviews(&self, reviews: &[CardReviewState]) -> Result<()> {
        (**self).save_reviews(reviews)
    }

    fn load_session_stats(&self, deck_id: Option<&str>) -> Result<Vec<DailySessionStat>> {
        (**self).load_session_stats(deck_id)
    }

    fn save_session_stats(&self, stats: &[DailySessionStat]) -> Result<()> {
        (**self).save_session_stats(stats)
    }
}

/// Keep only the records of `deck_id`, or everything when no deck is given
pub(crate) fn filter_deck<T>(items: Vec<T>, deck_id: Option<&str>, deck_of: impl Fn(&T) -> &str) -> Vec<T> {
    match deck_id {
        Some(deck_id) => items.into_iter().filter(|item| deck_of(item) == deck_id).collect(),
        None => items,
    }
}
