//! Spaced repetition scheduling for study decks
//!
//! This module provides:
//! - SM-2 derived interval and ease factor calculation
//! - Per-card review state tracking, one record per (card, deck)
//! - Daily session stats and streaks
//! - Deck overview, export and import

pub mod algorithm;
pub mod calendar;
pub mod engine;
pub mod error;
pub mod models;
pub mod streak;

pub use engine::{SpacedRepetitionEngine, DEFAULT_UPCOMING_LIMIT};
pub use error::SrsError;
pub use models::*;
