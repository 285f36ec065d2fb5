//! Day streaks over session dates

use chrono::{Duration, NaiveDate};

/// Current streak ending today.
///
/// Days are walked newest first. The first session may be today or
/// yesterday; every later session must sit exactly `streak` days before
/// today to extend the chain. A chain seeded by yesterday is therefore
/// still measured against today and stops at its second day.
pub fn current_streak(days: &[NaiveDate], today: NaiveDate) -> u32 {
    let mut days: Vec<NaiveDate> = days.iter().copied().filter(|d| *d <= today).collect();
    days.sort_unstable_by(|a, b| b.cmp(a));
    days.dedup();

    let mut streak: u32 = 0;
    for day in days {
        let days_diff = (today - day).num_days();
        if days_diff == i64::from(streak) || (streak == 0 && days_diff <= 1) {
            streak += 1;
        } else {
            break;
        }
    }

    streak
}

/// Longest run of consecutive days anywhere in the history
pub fn longest_streak(days: &[NaiveDate]) -> u32 {
    let mut days = days.to_vec();
    if days.is_empty() {
        return 0;
    }

    days.sort_unstable();
    days.dedup();

    let mut longest = 0;
    let mut current = 1;

    for pair in days.windows(2) {
        if pair[1] - pair[0] == Duration::days(1) {
            current += 1;
        } else {
            longest = longest.max(current);
            current = 1;
        }
    }

    longest.max(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    fn days_ago(offsets: &[i64]) -> Vec<NaiveDate> {
        offsets.iter().map(|d| today() - Duration::days(*d)).collect()
    }

    #[test]
    fn test_consecutive_days() {
        assert_eq!(current_streak(&days_ago(&[0, 1, 2]), today()), 3);
        assert_eq!(current_streak(&days_ago(&[2, 0, 1, 4]), today()), 3);
    }

    #[test]
    fn test_gap_breaks_chain() {
        assert_eq!(current_streak(&days_ago(&[0, 2]), today()), 1);
    }

    #[test]
    fn test_yesterday_seeds_streak() {
        assert_eq!(current_streak(&days_ago(&[1]), today()), 1);
        // Measured against today, yesterday's chain does not extend further back
        assert_eq!(current_streak(&days_ago(&[1, 2, 3]), today()), 1);
    }

    #[test]
    fn test_stale_history_has_no_streak() {
        assert_eq!(current_streak(&days_ago(&[2, 3, 4]), today()), 0);
        assert_eq!(current_streak(&[], today()), 0);
    }

    #[test]
    fn test_future_and_duplicate_days_ignored() {
        let mut days = days_ago(&[0, 0, 1]);
        days.push(today() + Duration::days(3));
        assert_eq!(current_streak(&days, today()), 2);
    }

    #[test]
    fn test_longest_streak() {
        assert_eq!(longest_streak(&[]), 0);
        assert_eq!(longest_streak(&days_ago(&[9])), 1);
        assert_eq!(longest_streak(&days_ago(&[0, 1, 5, 6, 7, 8, 12])), 4);
        assert_eq!(longest_streak(&days_ago(&[3, 2, 2, 1])), 3);
    }
}
