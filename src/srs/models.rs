//! Data models for the spaced repetition engine

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::calendar;
use super::error::SrsError;

/// Self-assessed recall quality for a single review
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Quality {
    /// Forgot the answer
    Again = 1,
    /// Recalled with serious difficulty
    Hard = 2,
    /// Recalled after some hesitation
    Good = 3,
    /// Trivially easy
    Easy = 4,
}

impl Quality {
    pub fn value(self) -> u8 {
        self as u8
    }

    /// Whether this rating counts as a successful recall
    pub fn is_correct(self) -> bool {
        self >= Quality::Good
    }
}

impl TryFrom<u8> for Quality {
    type Error = SrsError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Again),
            2 => Ok(Self::Hard),
            3 => Ok(Self::Good),
            4 => Ok(Self::Easy),
            other => Err(SrsError::InvalidQuality(other)),
        }
    }
}

impl From<Quality> for u8 {
    fn from(quality: Quality) -> Self {
        quality.value()
    }
}

/// Scheduling state for one card within one deck
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardReviewState {
    pub card_id: String,
    pub deck_id: String,
    /// Most recent rating
    pub quality: Quality,
    pub reviewed_at: DateTime<Utc>,
    /// Days until the next review, as of `reviewed_at`
    pub interval_days: u32,
    /// SM-2 ease factor, never below 1.3
    pub ease_factor: f64,
    /// Consecutive successful reviews
    pub repetitions: u32,
    pub next_review_at: DateTime<Utc>,
}

impl CardReviewState {
    /// Identity of the record: one state per (card, deck)
    pub fn key(&self) -> (String, String) {
        (self.card_id.clone(), self.deck_id.clone())
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review_at <= now
    }
}

/// Per-day review aggregate for a deck
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySessionStat {
    pub deck_id: String,
    /// Local midnight of the session day
    pub date: DateTime<Utc>,
    pub cards_reviewed: u32,
    pub average_quality: f64,
}

impl DailySessionStat {
    /// Open a session for `day` with its first review
    pub fn new(deck_id: &str, day: NaiveDate, quality: Quality) -> Self {
        Self {
            deck_id: deck_id.to_string(),
            date: calendar::start_of_day(day).with_timezone(&Utc),
            cards_reviewed: 1,
            average_quality: f64::from(quality.value()),
        }
    }

    /// Local calendar day this session belongs to
    pub fn day(&self) -> NaiveDate {
        calendar::local_day(self.date)
    }

    /// Fold one more review into the running mean
    pub fn record(&mut self, quality: Quality) {
        let count = f64::from(self.cards_reviewed);
        self.average_quality =
            (self.average_quality * count + f64::from(quality.value())) / (count + 1.0);
        self.cards_reviewed += 1;
    }
}

/// Anything the engine can schedule: it only needs a stable id
pub trait ReviewCard {
    fn card_id(&self) -> &str;
}

impl ReviewCard for String {
    fn card_id(&self) -> &str {
        self
    }
}

impl ReviewCard for &str {
    fn card_id(&self) -> &str {
        self
    }
}

/// A flashcard with question (front) and answer (back)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub id: String,
    #[serde(default)]
    pub deck_id: String,
    #[serde(default)]
    pub front: String,
    #[serde(default)]
    pub back: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Flashcard {
    /// A card known only by id, e.g. when ids are passed on the command line
    pub fn with_id(deck_id: &str, id: &str) -> Self {
        Self {
            id: id.to_string(),
            deck_id: deck_id.to_string(),
            front: String::new(),
            back: String::new(),
            tags: Vec::new(),
        }
    }
}

impl ReviewCard for Flashcard {
    fn card_id(&self) -> &str {
        &self.id
    }
}

/// A card together with its derived schedule, used for review sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardWithSchedule<C> {
    pub card: C,
    /// `None` for a card that was never reviewed in this deck
    pub last_review: Option<DateTime<Utc>>,
    pub next_review: DateTime<Utc>,
    pub interval: u32,
    pub repetitions: u32,
}

impl<C> CardWithSchedule<C> {
    pub(crate) fn new(card: C, state: Option<&CardReviewState>, now: DateTime<Local>) -> Self {
        match state {
            Some(state) => Self {
                card,
                last_review: Some(state.reviewed_at),
                next_review: state.next_review_at,
                interval: state.interval_days,
                repetitions: state.repetitions,
            },
            None => Self {
                card,
                last_review: None,
                next_review: now.with_timezone(&Utc),
                interval: 0,
                repetitions: 0,
            },
        }
    }

    pub fn is_new(&self) -> bool {
        self.last_review.is_none()
    }
}

/// Summary of today's activity in a deck
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayStats {
    pub reviewed: usize,
    /// Cards that graduated to their first successful repetition today
    pub learned: usize,
    /// Fraction of today's reviews rated Good or Easy
    pub accuracy: f64,
    pub streak: u32,
}

/// Card counts and streaks for a deck
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckOverview {
    pub total_cards: usize,
    pub new_cards: usize,
    pub learning_cards: usize,
    pub review_cards: usize,
    pub due_cards: usize,
    pub reviews_today: usize,
    pub streak_days: u32,
    pub longest_streak: u32,
}

/// Interval in days that each rating would produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalPreview {
    pub again: u32,
    pub hard: u32,
    pub good: u32,
    pub easy: u32,
}

pub const SNAPSHOT_VERSION: u32 = 1;

/// Portable copy of one deck's scheduling state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckSnapshot {
    pub version: u32,
    pub deck_id: String,
    pub exported_at: DateTime<Utc>,
    #[serde(default)]
    pub reviews: Vec<CardReviewState>,
    #[serde(default)]
    pub session_stats: Vec<DailySessionStat>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub reviews: usize,
    pub session_stats: usize,
}
