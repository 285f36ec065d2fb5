//! SM-2 derived scheduling
//!
//! Ease factor and repetition bookkeeping follow SuperMemo 2, mapped onto a
//! four-button scale:
//! - 1: Again, the answer was forgotten
//! - 2: Hard, recalled with serious difficulty
//! - 3: Good, recalled after hesitation
//! - 4: Easy, perfect recall
//!
//! After the SM-2 interval is computed, a per-rating multiplier shortens
//! (Again, Hard) or stretches (Easy) it.

use chrono::{DateTime, Duration, Utc};

use super::models::{CardReviewState, IntervalPreview, Quality};

/// Minimum ease factor allowed
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Ease factor of a card on its first graded review
pub const INITIAL_EASE_FACTOR: f64 = 2.5;

/// Longest interval a card can be scheduled out, about a century
pub const MAX_INTERVAL_DAYS: u32 = 36500;

/// Result of calculating the next review
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewResult {
    pub interval_days: u32,
    pub ease_factor: f64,
    pub repetitions: u32,
    pub next_review_at: DateTime<Utc>,
}

/// Ease factor after a review.
///
/// EF' = EF + (0.1 - (5-q) * (0.08 + (5-q) * 0.02)), floored at 1.3.
/// A card without history starts at 2.5 whatever the rating.
pub fn next_ease_factor(previous: Option<f64>, quality: Quality) -> f64 {
    match previous {
        None => INITIAL_EASE_FACTOR,
        Some(ease) => {
            let q = 5.0 - f64::from(quality.value());
            (ease + (0.1 - q * (0.08 + q * 0.02))).max(MIN_EASE_FACTOR)
        }
    }
}

/// Consecutive successes after a review
pub fn next_repetitions(previous: Option<u32>, quality: Quality) -> u32 {
    if !quality.is_correct() {
        0
    } else {
        previous.map_or(1, |reps| reps + 1)
    }
}

/// SM-2 interval before the rating multiplier
fn base_interval(repetitions: u32, previous_interval: Option<u32>, ease_factor: f64) -> u32 {
    match repetitions {
        0 => 1,
        1 => 6,
        _ => {
            let previous = previous_interval.filter(|days| *days > 0).unwrap_or(1);
            round_days(f64::from(previous) * ease_factor)
        }
    }
}

/// Shorten or stretch an interval according to the rating
pub fn apply_quality_multiplier(interval: u32, quality: Quality) -> u32 {
    let days = f64::from(interval);
    match quality {
        Quality::Again => round_days(days * 0.2).max(1),
        Quality::Hard => round_days(days * 0.6).max(1),
        Quality::Good => interval,
        Quality::Easy => round_days(days * 1.3),
    }
}

fn round_days(days: f64) -> u32 {
    days.round().clamp(0.0, f64::from(u32::MAX)) as u32
}

/// Calculate the next schedule for a card reviewed at `now`
pub fn calculate_next_review(
    previous: Option<&CardReviewState>,
    quality: Quality,
    now: DateTime<Utc>,
) -> ReviewResult {
    let ease_factor = next_ease_factor(previous.map(|s| s.ease_factor), quality);
    let repetitions = next_repetitions(previous.map(|s| s.repetitions), quality);
    let interval = base_interval(
        repetitions,
        previous.map(|s| s.interval_days),
        ease_factor,
    );
    let interval_days = apply_quality_multiplier(interval, quality).min(MAX_INTERVAL_DAYS);
    let next_review_at = now
        .checked_add_signed(Duration::days(i64::from(interval_days)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);

    ReviewResult {
        interval_days,
        ease_factor,
        repetitions,
        next_review_at,
    }
}

/// Calculate the interval each rating would give.
/// Used to show users what pressing each button would do.
pub fn preview_intervals(previous: Option<&CardReviewState>) -> IntervalPreview {
    // Only the interval is read, so any instant works here
    let now = DateTime::<Utc>::default();
    let interval = |quality| calculate_next_review(previous, quality, now).interval_days;

    IntervalPreview {
        again: interval(Quality::Again),
        hard: interval(Quality::Hard),
        good: interval(Quality::Good),
        easy: interval(Quality::Easy),
    }
}

/// Format an interval in days to a human-readable string
pub fn format_interval(days: u32) -> String {
    match days {
        0 => "now".to_string(),
        1..=6 => format!("{}d", days),
        7..=29 => format!("{}w", days / 7),
        30..=364 => format!("{}mo", days / 30),
        _ => format!("{}y", days / 365),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    fn reviewed_state(repetitions: u32, interval_days: u32, ease_factor: f64) -> CardReviewState {
        let reviewed_at = now() - Duration::days(i64::from(interval_days));
        CardReviewState {
            card_id: "card".to_string(),
            deck_id: "deck".to_string(),
            quality: Quality::Good,
            reviewed_at,
            interval_days,
            ease_factor,
            repetitions,
            next_review_at: now(),
        }
    }

    #[test]
    fn test_first_review_easy() {
        let result = calculate_next_review(None, Quality::Easy, now());

        assert_eq!(result.repetitions, 1);
        // 6 days, stretched by the easy multiplier: round(6 * 1.3) = 8
        assert_eq!(result.interval_days, 8);
        assert_eq!(result.ease_factor, INITIAL_EASE_FACTOR);
        assert_eq!(result.next_review_at, Utc.with_ymd_and_hms(2026, 3, 18, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_first_review_good() {
        let result = calculate_next_review(None, Quality::Good, now());

        assert_eq!(result.repetitions, 1);
        assert_eq!(result.interval_days, 6);
    }

    #[test]
    fn test_first_review_failed() {
        let again = calculate_next_review(None, Quality::Again, now());
        assert_eq!(again.repetitions, 0);
        assert_eq!(again.interval_days, 1);
        assert_eq!(again.ease_factor, INITIAL_EASE_FACTOR);

        let hard = calculate_next_review(None, Quality::Hard, now());
        assert_eq!(hard.repetitions, 0);
        assert_eq!(hard.interval_days, 1);
    }

    #[test]
    fn test_subsequent_review_good_uses_updated_ease() {
        let state = reviewed_state(2, 6, 2.5);
        let result = calculate_next_review(Some(&state), Quality::Good, now());

        // EF' = 2.5 - 0.14 = 2.36; round(6 * 2.36) = 14
        assert!((result.ease_factor - 2.36).abs() < 1e-9);
        assert_eq!(result.repetitions, 3);
        assert_eq!(result.interval_days, 14);
    }

    #[test]
    fn test_subsequent_review_easy_keeps_ease() {
        let state = reviewed_state(3, 10, 2.5);
        let result = calculate_next_review(Some(&state), Quality::Easy, now());

        assert!((result.ease_factor - 2.5).abs() < 1e-9);
        // round(10 * 2.5) = 25, round(25 * 1.3) = 33
        assert_eq!(result.interval_days, 33);
    }

    #[test]
    fn test_again_resets_at_any_repetition_count() {
        for repetitions in [0, 1, 2, 7, 40] {
            let state = reviewed_state(repetitions, 90, 2.8);
            let result = calculate_next_review(Some(&state), Quality::Again, now());

            assert_eq!(result.repetitions, 0);
            assert_eq!(result.interval_days, 1);
            assert_eq!(result.next_review_at, now() + Duration::days(1));
        }
    }

    #[test]
    fn test_zero_interval_treated_as_one_day() {
        let state = reviewed_state(4, 0, 2.0);
        let result = calculate_next_review(Some(&state), Quality::Good, now());

        // EF' = 1.86; round(1 * 1.86) = 2
        assert_eq!(result.interval_days, 2);
    }

    #[test]
    fn test_ease_factor_minimum() {
        let mut state = reviewed_state(5, 10, 1.4);
        let sequence = [
            Quality::Again,
            Quality::Hard,
            Quality::Again,
            Quality::Good,
            Quality::Hard,
            Quality::Again,
            Quality::Easy,
            Quality::Again,
        ];

        for quality in sequence {
            let result = calculate_next_review(Some(&state), quality, now());
            assert!(result.ease_factor >= MIN_EASE_FACTOR);
            state.ease_factor = result.ease_factor;
            state.repetitions = result.repetitions;
            state.interval_days = result.interval_days;
        }
        assert_eq!(state.ease_factor, MIN_EASE_FACTOR);
    }

    #[test]
    fn test_interval_capped_after_repeated_easy() {
        let mut state: Option<CardReviewState> = None;

        for _ in 0..30 {
            let result = calculate_next_review(state.as_ref(), Quality::Easy, now());
            assert!(result.interval_days <= MAX_INTERVAL_DAYS);
            assert_eq!(
                result.next_review_at,
                now() + Duration::days(i64::from(result.interval_days))
            );

            let mut next = reviewed_state(result.repetitions, result.interval_days, result.ease_factor);
            next.quality = Quality::Easy;
            state = Some(next);
        }

        assert_eq!(state.map(|s| s.interval_days), Some(MAX_INTERVAL_DAYS));
    }

    #[test]
    fn test_huge_stored_interval_is_capped() {
        let mut state = reviewed_state(9, 10, 2.5);
        state.interval_days = u32::MAX;

        let preview = preview_intervals(Some(&state));
        assert_eq!(preview.again, 1);
        assert_eq!(preview.good, MAX_INTERVAL_DAYS);
        assert_eq!(preview.easy, MAX_INTERVAL_DAYS);
    }

    #[test]
    fn test_next_review_saturates_at_latest_date() {
        let late = DateTime::<Utc>::MAX_UTC - Duration::days(3);
        let state = reviewed_state(3, 10, 2.5);

        let result = calculate_next_review(Some(&state), Quality::Good, late);
        assert_eq!(result.next_review_at, DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn test_multiplier_is_monotonic_in_quality() {
        for interval in 1..=400 {
            let again = apply_quality_multiplier(interval, Quality::Again);
            let hard = apply_quality_multiplier(interval, Quality::Hard);
            let good = apply_quality_multiplier(interval, Quality::Good);
            let easy = apply_quality_multiplier(interval, Quality::Easy);

            assert!(again <= hard && hard <= good && good <= easy, "interval {}", interval);
            if interval >= 2 {
                assert!(again < good, "interval {}", interval);
                assert!(easy > good, "interval {}", interval);
            }
        }
    }

    #[test]
    fn test_preview_intervals() {
        let state = reviewed_state(1, 6, 2.5);
        let preview = preview_intervals(Some(&state));

        assert_eq!(preview.again, 1);
        assert_eq!(preview.hard, 1);
        // EF' = 2.36; round(6 * 2.36) = 14
        assert_eq!(preview.good, 14);
        // EF' = 2.5; round(6 * 2.5) = 15, round(15 * 1.3) = 20
        assert_eq!(preview.easy, 20);

        let new_card = preview_intervals(None);
        assert_eq!(new_card, IntervalPreview { again: 1, hard: 1, good: 6, easy: 8 });
    }

    #[test]
    fn test_format_interval() {
        assert_eq!(format_interval(0), "now");
        assert_eq!(format_interval(1), "1d");
        assert_eq!(format_interval(5), "5d");
        assert_eq!(format_interval(7), "1w");
        assert_eq!(format_interval(14), "2w");
        assert_eq!(format_interval(30), "1mo");
        assert_eq!(format_interval(90), "3mo");
        assert_eq!(format_interval(365), "1y");
        assert_eq!(format_interval(730), "2y");
    }
}
