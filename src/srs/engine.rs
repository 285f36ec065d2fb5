//! Spaced repetition engine
//!
//! Owns the interpretation of review states and session stats kept in a
//! [`ReviewStore`]. Every operation that depends on the current time takes
//! it as `now`; the engine never reads the clock itself.
//!
//! Reads that fail or return malformed data are treated as an empty history.
//! Operations that rewrite a collection are stricter: they start from an
//! empty collection only when the store reports malformed data, which the
//! store has already set aside. Any other read error aborts the write.
//! Writes are not retried: a failed write is returned to the caller and the
//! previously stored data stays in place.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, Local, NaiveDate, Utc};

use super::algorithm::{self, calculate_next_review, ReviewResult};
use super::calendar;
use super::error::{Result, SrsError};
use super::models::*;
use super::streak;
use crate::storage::{Result as StorageResult, ReviewStore, StorageError};

/// Number of upcoming cards returned when no limit is configured
pub const DEFAULT_UPCOMING_LIMIT: usize = 10;

type ReviewKey = (String, String);

pub struct SpacedRepetitionEngine<S: ReviewStore> {
    store: S,
}

impl<S: ReviewStore> SpacedRepetitionEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ===== Loading =====

    fn load_reviews(&self, deck_id: Option<&str>) -> Vec<CardReviewState> {
        self.store.load_reviews(deck_id).unwrap_or_else(|e| {
            log::warn!(
                "Failed to load review states ({}); treating {} as unreviewed",
                e,
                deck_id.unwrap_or("all decks")
            );
            Vec::new()
        })
    }

    fn load_session_stats(&self, deck_id: Option<&str>) -> Vec<DailySessionStat> {
        self.store.load_session_stats(deck_id).unwrap_or_else(|e| {
            log::warn!(
                "Failed to load session stats ({}); treating {} as having no sessions",
                e,
                deck_id.unwrap_or("all decks")
            );
            Vec::new()
        })
    }

    /// Every review state, for an operation that saves the whole collection
    fn load_reviews_for_update(&self) -> Result<Vec<CardReviewState>> {
        recover_malformed(self.store.load_reviews(None), "review states")
    }

    /// Every session stat, for an operation that saves the whole collection
    fn load_session_stats_for_update(&self) -> Result<Vec<DailySessionStat>> {
        recover_malformed(self.store.load_session_stats(None), "session stats")
    }

    /// Review states of one deck keyed by card id
    fn deck_states(&self, deck_id: &str) -> HashMap<String, CardReviewState> {
        self.load_reviews(Some(deck_id))
            .into_iter()
            .map(|state| (state.card_id.clone(), state))
            .collect()
    }

    fn session_days(&self, deck_id: &str) -> Vec<NaiveDate> {
        self.load_session_stats(Some(deck_id))
            .iter()
            .map(DailySessionStat::day)
            .collect()
    }

    // ===== Writing =====

    /// Persist both collections as one logical write.
    ///
    /// If the session stats cannot be saved, the review states are put back
    /// to `previous_reviews` before the error is returned.
    fn commit(
        &self,
        previous_reviews: &[CardReviewState],
        reviews: &[CardReviewState],
        stats: &[DailySessionStat],
    ) -> Result<()> {
        self.store.save_reviews(reviews)?;

        if let Err(e) = self.store.save_session_stats(stats) {
            log::warn!("Failed to save session stats, restoring review states: {}", e);
            if let Err(restore) = self.store.save_reviews(previous_reviews) {
                log::error!("Failed to restore review states: {}", restore);
            }
            return Err(e.into());
        }

        Ok(())
    }

    // ===== Scheduling =====

    /// Cards due for review at `now`.
    ///
    /// Never-reviewed cards come first in their input order, followed by
    /// reviewed cards with the most overdue first.
    pub fn get_due_cards<C: ReviewCard + Clone>(
        &self,
        deck_id: &str,
        cards: &[C],
        now: DateTime<Local>,
    ) -> Vec<CardWithSchedule<C>> {
        let states = self.deck_states(deck_id);
        let now_utc = now.with_timezone(&Utc);

        let mut due: Vec<CardWithSchedule<C>> = cards
            .iter()
            .filter_map(|card| {
                let state = states.get(card.card_id());
                match state {
                    Some(state) if !state.is_due(now_utc) => None,
                    _ => Some(CardWithSchedule::new(card.clone(), state, now)),
                }
            })
            .collect();

        // Stable: new cards keep their relative order
        due.sort_by(|a, b| match (a.is_new(), b.is_new()) {
            (true, true) => std::cmp::Ordering::Equal,
            (true, false) => std::cmp::Ordering::Less,
            (false, true) => std::cmp::Ordering::Greater,
            (false, false) => a.next_review.cmp(&b.next_review),
        });

        due
    }

    /// Reviewed cards not yet due, soonest first, at most `limit` of them
    pub fn get_upcoming_cards<C: ReviewCard + Clone>(
        &self,
        deck_id: &str,
        cards: &[C],
        limit: usize,
        now: DateTime<Local>,
    ) -> Vec<CardWithSchedule<C>> {
        let states = self.deck_states(deck_id);
        let now_utc = now.with_timezone(&Utc);

        let mut upcoming: Vec<CardWithSchedule<C>> = cards
            .iter()
            .filter_map(|card| {
                states
                    .get(card.card_id())
                    .filter(|state| !state.is_due(now_utc))
                    .map(|state| CardWithSchedule::new(card.clone(), Some(state), now))
            })
            .collect();

        upcoming.sort_by(|a, b| a.next_review.cmp(&b.next_review));
        upcoming.truncate(limit);
        upcoming
    }

    /// Record a review with a raw 1-4 rating
    pub fn record_review_rating(
        &self,
        deck_id: &str,
        card_id: &str,
        rating: u8,
        now: DateTime<Local>,
    ) -> Result<CardReviewState> {
        let quality = Quality::try_from(rating)?;
        self.record_review(deck_id, card_id, quality, now)
    }

    /// Grade a card and reschedule it.
    ///
    /// Replaces the card's review state and folds the rating into today's
    /// session stat for the deck.
    pub fn record_review(
        &self,
        deck_id: &str,
        card_id: &str,
        quality: Quality,
        now: DateTime<Local>,
    ) -> Result<CardReviewState> {
        let previous_reviews = self.load_reviews_for_update()?;
        let mut stats = self.load_session_stats_for_update()?;
        let mut reviews = index_reviews(previous_reviews.clone());

        let key: ReviewKey = (card_id.to_string(), deck_id.to_string());
        let now_utc = now.with_timezone(&Utc);

        let ReviewResult {
            interval_days,
            ease_factor,
            repetitions,
            next_review_at,
        } = calculate_next_review(reviews.get(&key), quality, now_utc);

        let state = CardReviewState {
            card_id: card_id.to_string(),
            deck_id: deck_id.to_string(),
            quality,
            reviewed_at: now_utc,
            interval_days,
            ease_factor,
            repetitions,
            next_review_at,
        };

        log::debug!(
            "Card {} in deck {} rated {:?}: interval {}d, ease {:.2}, repetitions {}",
            card_id,
            deck_id,
            quality,
            interval_days,
            ease_factor,
            repetitions
        );

        reviews.insert(key, state.clone());
        let reviews: Vec<CardReviewState> = reviews.into_values().collect();

        upsert_session_stat(&mut stats, deck_id, now.date_naive(), quality);

        self.commit(&previous_reviews, &reviews, &stats)?;
        Ok(state)
    }

    // ===== Statistics =====

    /// Today's activity in a deck
    pub fn get_today_stats(&self, deck_id: &str, now: DateTime<Local>) -> TodayStats {
        let (start, end) = calendar::day_window(now);

        let today: Vec<CardReviewState> = self
            .load_reviews(Some(deck_id))
            .into_iter()
            .filter(|r| r.reviewed_at >= start && r.reviewed_at < end)
            .collect();

        let reviewed = today.len();
        let learned = today.iter().filter(|r| r.repetitions == 1).count();
        let correct = today.iter().filter(|r| r.quality.is_correct()).count();
        let accuracy = if reviewed > 0 {
            correct as f64 / reviewed as f64
        } else {
            0.0
        };

        TodayStats {
            reviewed,
            learned,
            accuracy,
            streak: self.calculate_streak(deck_id, now),
        }
    }

    /// Consecutive days with a session, ending today or yesterday
    pub fn calculate_streak(&self, deck_id: &str, now: DateTime<Local>) -> u32 {
        streak::current_streak(&self.session_days(deck_id), now.date_naive())
    }

    /// Longest run of consecutive session days in the deck's history
    pub fn longest_streak(&self, deck_id: &str) -> u32 {
        streak::longest_streak(&self.session_days(deck_id))
    }

    /// Session stats of the last `days` calendar days, oldest first
    pub fn get_session_history(
        &self,
        deck_id: &str,
        days: u32,
        now: DateTime<Local>,
    ) -> Vec<DailySessionStat> {
        if days == 0 {
            return Vec::new();
        }

        let today = now.date_naive();
        let first_day = today
            .checked_sub_signed(Duration::days(i64::from(days) - 1))
            .unwrap_or(NaiveDate::MIN);

        let mut history: Vec<DailySessionStat> = self
            .load_session_stats(Some(deck_id))
            .into_iter()
            .filter(|s| {
                let day = s.day();
                day >= first_day && day <= today
            })
            .collect();

        history.sort_by(|a, b| a.date.cmp(&b.date));
        history
    }

    /// Card counts by phase, plus today's reviews and streaks
    pub fn get_deck_overview<C: ReviewCard>(
        &self,
        deck_id: &str,
        cards: &[C],
        now: DateTime<Local>,
    ) -> DeckOverview {
        let states = self.deck_states(deck_id);
        let now_utc = now.with_timezone(&Utc);

        let mut overview = DeckOverview {
            total_cards: cards.len(),
            ..DeckOverview::default()
        };

        for card in cards {
            match states.get(card.card_id()) {
                None => {
                    overview.new_cards += 1;
                    overview.due_cards += 1;
                }
                Some(state) => {
                    if state.repetitions == 0 {
                        overview.learning_cards += 1;
                    } else {
                        overview.review_cards += 1;
                    }
                    if state.is_due(now_utc) {
                        overview.due_cards += 1;
                    }
                }
            }
        }

        let today = self.get_today_stats(deck_id, now);
        overview.reviews_today = today.reviewed;
        overview.streak_days = today.streak;
        overview.longest_streak = self.longest_streak(deck_id);
        overview
    }

    /// Interval each rating would give the card right now
    pub fn preview_intervals(&self, deck_id: &str, card_id: &str) -> IntervalPreview {
        let states = self.deck_states(deck_id);
        algorithm::preview_intervals(states.get(card_id))
    }

    // ===== Deck lifecycle =====

    /// Remove every review state and session stat of a deck
    pub fn delete_deck_data(&self, deck_id: &str) -> Result<()> {
        let previous_reviews = self.load_reviews_for_update()?;
        let stats = self.load_session_stats_for_update()?;

        let has_reviews = previous_reviews.iter().any(|r| r.deck_id == deck_id);
        let has_stats = stats.iter().any(|s| s.deck_id == deck_id);
        if !has_reviews && !has_stats {
            log::debug!("No scheduling data for deck {}, nothing to delete", deck_id);
            return Ok(());
        }

        let reviews: Vec<CardReviewState> = previous_reviews
            .iter()
            .filter(|r| r.deck_id != deck_id)
            .cloned()
            .collect();
        let stats: Vec<DailySessionStat> = stats.into_iter().filter(|s| s.deck_id != deck_id).collect();

        self.commit(&previous_reviews, &reviews, &stats)?;
        log::info!(
            "Deleted scheduling data for deck {} ({} review states)",
            deck_id,
            previous_reviews.len() - reviews.len()
        );
        Ok(())
    }

    /// Copy a deck's scheduling state for export
    pub fn export_deck(&self, deck_id: &str, now: DateTime<Local>) -> DeckSnapshot {
        let mut reviews = self.load_reviews(Some(deck_id));
        reviews.sort_by(|a, b| a.card_id.cmp(&b.card_id));
        let mut session_stats = self.load_session_stats(Some(deck_id));
        session_stats.sort_by(|a, b| a.date.cmp(&b.date));

        DeckSnapshot {
            version: SNAPSHOT_VERSION,
            deck_id: deck_id.to_string(),
            exported_at: now.with_timezone(&Utc),
            reviews,
            session_stats,
        }
    }

    /// Replace a deck's scheduling state with the contents of a snapshot
    pub fn import_deck(&self, snapshot: DeckSnapshot) -> Result<ImportSummary> {
        validate_snapshot(&snapshot)?;
        let deck_id = snapshot.deck_id.as_str();

        let previous_reviews = self.load_reviews_for_update()?;
        let previous_stats = self.load_session_stats_for_update()?;
        let mut reviews = index_reviews(
            previous_reviews
                .iter()
                .filter(|r| r.deck_id != deck_id)
                .cloned()
                .collect(),
        );
        let imported = index_reviews(snapshot.reviews);
        let review_count = imported.len();
        reviews.extend(imported);

        let mut stats: Vec<DailySessionStat> = previous_stats
            .into_iter()
            .filter(|s| s.deck_id != deck_id)
            .collect();
        let mut imported_stats: BTreeMap<NaiveDate, DailySessionStat> = BTreeMap::new();
        for stat in snapshot.session_stats {
            imported_stats.insert(stat.day(), stat);
        }
        let stat_count = imported_stats.len();
        stats.extend(imported_stats.into_values());

        let reviews: Vec<CardReviewState> = reviews.into_values().collect();
        self.commit(&previous_reviews, &reviews, &stats)?;

        log::info!(
            "Imported deck {}: {} review states, {} session days",
            deck_id,
            review_count,
            stat_count
        );
        Ok(ImportSummary {
            reviews: review_count,
            session_stats: stat_count,
        })
    }
}

/// Treat malformed stored data as empty and pass any other read error on
fn recover_malformed<T>(loaded: StorageResult<Vec<T>>, what: &str) -> Result<Vec<T>> {
    match loaded {
        Ok(items) => Ok(items),
        Err(StorageError::Json(e)) => {
            log::warn!("Stored {} are malformed ({}); starting from none", what, e);
            Ok(Vec::new())
        }
        Err(e) => Err(e.into()),
    }
}

/// Key review states by (card, deck); a later duplicate replaces an earlier one
fn index_reviews(reviews: Vec<CardReviewState>) -> BTreeMap<ReviewKey, CardReviewState> {
    reviews.into_iter().map(|state| (state.key(), state)).collect()
}

/// Fold a rating into the deck's session for `day`, opening one if needed
fn upsert_session_stat(stats: &mut Vec<DailySessionStat>, deck_id: &str, day: NaiveDate, quality: Quality) {
    match stats.iter_mut().find(|s| s.deck_id == deck_id && s.day() == day) {
        Some(stat) => stat.record(quality),
        None => stats.push(DailySessionStat::new(deck_id, day, quality)),
    }
}

fn validate_snapshot(snapshot: &DeckSnapshot) -> Result<()> {
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(SrsError::InvalidSnapshot(format!(
            "unsupported version {}",
            snapshot.version
        )));
    }
    if snapshot.deck_id.is_empty() {
        return Err(SrsError::InvalidSnapshot("missing deck id".to_string()));
    }

    let foreign_review = snapshot.reviews.iter().find(|r| r.deck_id != snapshot.deck_id);
    let foreign_stat = snapshot.session_stats.iter().find(|s| s.deck_id != snapshot.deck_id);
    if let Some(foreign) = foreign_review.map(|r| &r.deck_id).or(foreign_stat.map(|s| &s.deck_id)) {
        return Err(SrsError::InvalidSnapshot(format!(
            "record for deck {} in snapshot of deck {}",
            foreign, snapshot.deck_id
        )));
    }

    if let Some(bad) = snapshot
        .reviews
        .iter()
        .find(|r| r.ease_factor.is_nan() || r.ease_factor < algorithm::MIN_EASE_FACTOR)
    {
        return Err(SrsError::InvalidSnapshot(format!(
            "card {} has ease factor {} below {}",
            bad.card_id,
            bad.ease_factor,
            algorithm::MIN_EASE_FACTOR
        )));
    }

    Ok(())
}
