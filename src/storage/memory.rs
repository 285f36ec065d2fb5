//! In-memory review store
//!
//! Keeps both collections in a mutex. Reads and writes can be made to fail
//! on demand, which is how the engine's failure handling is exercised.

use std::io;
use std::sync::{Mutex, MutexGuard};

use super::store::{filter_deck, ReviewStore, Result, StorageError};
use crate::srs::models::{CardReviewState, DailySessionStat};

#[derive(Default)]
struct Collections {
    reviews: Vec<CardReviewState>,
    session_stats: Vec<DailySessionStat>,
    fail_reads: bool,
    fail_review_writes: bool,
    fail_stat_writes: bool,
}

/// In-process store, for embedding the engine without a disk and for tests
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing records
    pub fn with_records(reviews: Vec<CardReviewState>, session_stats: Vec<DailySessionStat>) -> Self {
        Self {
            inner: Mutex::new(Collections {
                reviews,
                session_stats,
                ..Collections::default()
            }),
        }
    }

    /// Make subsequent loads of either collection fail with an I/O error
    pub fn fail_reads(&self, fail: bool) {
        self.lock().fail_reads = fail;
    }

    /// Make subsequent saves of either collection fail
    pub fn fail_writes(&self, fail: bool) {
        let mut inner = self.lock();
        inner.fail_review_writes = fail;
        inner.fail_stat_writes = fail;
    }

    /// Make subsequent session-stat saves fail while review saves succeed
    pub fn fail_session_stat_writes(&self, fail: bool) {
        self.lock().fail_stat_writes = fail;
    }

    fn lock(&self) -> MutexGuard<'_, Collections> {
        // A panic while holding the lock cannot leave a half-assigned Vec
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ReviewStore for MemoryStore {
    fn load_reviews(&self, deck_id: Option<&str>) -> Result<Vec<CardReviewState>> {
        let inner = self.lock();
        if inner.fail_reads {
            return Err(read_error("review states"));
        }
        let reviews = inner.reviews.clone();
        Ok(filter_deck(reviews, deck_id, |r: &CardReviewState| r.deck_id.as_str()))
    }

    fn save_reviews(&self, reviews: &[CardReviewState]) -> Result<()> {
        let mut inner = self.lock();
        if inner.fail_review_writes {
            return Err(StorageError::WriteRejected("review states".to_string()));
        }
        inner.reviews = reviews.to_vec();
        Ok(())
    }

    fn load_session_stats(&self, deck_id: Option<&str>) -> Result<Vec<DailySessionStat>> {
        let inner = self.lock();
        if inner.fail_reads {
            return Err(read_error("session stats"));
        }
        let stats = inner.session_stats.clone();
        Ok(filter_deck(stats, deck_id, |s: &DailySessionStat| s.deck_id.as_str()))
    }

    fn save_session_stats(&self, stats: &[DailySessionStat]) -> Result<()> {
        let mut inner = self.lock();
        if inner.fail_stat_writes {
            return Err(StorageError::WriteRejected("session stats".to_string()));
        }
        inner.session_stats = stats.to_vec();
        Ok(())
    }
}

fn read_error(what: &str) -> StorageError {
    StorageError::Io(io::Error::new(
        io::ErrorKind::Other,
        format!("{} unavailable", what),
    ))
}
