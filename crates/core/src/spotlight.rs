//! Spotlight window resolution.
//!
//! A spotlight entry is "active" when its `[start_date, end_date)` window
//! contains the current instant. The active entry for a category is always
//! recomputed from the append-only history and the clock — there is no
//! stored "current" pointer to drift out of sync with the windows.

use crate::types::Timestamp;

/// The window fields of one spotlight entry, as needed for resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start_date: Timestamp,
    pub end_date: Timestamp,
    pub created_at: Timestamp,
}

/// Whether a `[start, end)` window contains `now`.
pub fn is_active_at(start: Timestamp, end: Timestamp, now: Timestamp) -> bool {
    start <= now && now < end
}

/// Pick the active entry among `windows` at instant `now`.
///
/// Among entries whose window contains `now`, the one with the latest
/// `start_date` wins; ties break on `created_at` descending. Returns the
/// index into `windows`, or `None` when no window covers `now`.
///
/// Windows may overlap freely — a manual override appended with
/// `start_date = now` supersedes an earlier automatic entry without that
/// entry being shortened or deleted.
pub fn pick_active(windows: &[Window], now: Timestamp) -> Option<usize> {
    windows
        .iter()
        .enumerate()
        .filter(|(_, w)| is_active_at(w.start_date, w.end_date, now))
        .max_by_key(|(_, w)| (w.start_date, w.created_at))
        .map(|(i, _)| i)
}

/// Validate the window of a new manual override starting at `now`.
///
/// The override would be born expired if `end_date <= now`, so that is
/// rejected.
pub fn validate_override_window(now: Timestamp, end_date: Timestamp) -> Result<(), String> {
    if end_date <= now {
        Err(format!(
            "end_date {end_date} is not after the override start {now}"
        ))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn t(secs: i64) -> Timestamp {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn window(start: i64, end: i64, created: i64) -> Window {
        Window {
            start_date: t(start),
            end_date: t(end),
            created_at: t(created),
        }
    }

    // -----------------------------------------------------------------------
    // is_active_at
    // -----------------------------------------------------------------------

    #[test]
    fn window_contains_now() {
        assert!(is_active_at(t(100), t(200), t(150)));
    }

    #[test]
    fn window_start_is_inclusive() {
        assert!(is_active_at(t(100), t(200), t(100)));
    }

    #[test]
    fn window_end_is_exclusive() {
        assert!(!is_active_at(t(100), t(200), t(200)));
    }

    #[test]
    fn expired_window_is_inactive() {
        assert!(!is_active_at(t(100), t(200), t(300)));
    }

    #[test]
    fn future_window_is_inactive() {
        assert!(!is_active_at(t(100), t(200), t(50)));
    }

    // -----------------------------------------------------------------------
    // pick_active
    // -----------------------------------------------------------------------

    #[test]
    fn empty_history_has_no_active_entry() {
        assert_eq!(pick_active(&[], t(100)), None);
    }

    #[test]
    fn single_covering_window_is_active() {
        let windows = [window(100, 200, 100)];
        assert_eq!(pick_active(&windows, t(150)), Some(0));
    }

    #[test]
    fn latest_start_wins_among_overlapping_windows() {
        // An automatic entry running 0..1000 superseded by a manual
        // override appended at t=500.
        let windows = [window(0, 1000, 0), window(500, 800, 500)];
        assert_eq!(pick_active(&windows, t(600)), Some(1));
    }

    #[test]
    fn superseded_entry_becomes_active_again_after_override_expires() {
        let windows = [window(0, 1000, 0), window(500, 800, 500)];
        assert_eq!(pick_active(&windows, t(900)), Some(0));
    }

    #[test]
    fn equal_starts_tie_break_on_created_at_desc() {
        let windows = [window(100, 300, 100), window(100, 300, 120)];
        assert_eq!(pick_active(&windows, t(200)), Some(1));
    }

    #[test]
    fn no_entry_active_between_windows() {
        let windows = [window(0, 100, 0), window(200, 300, 200)];
        assert_eq!(pick_active(&windows, t(150)), None);
    }

    #[test]
    fn at_most_one_entry_flagged_active() {
        let windows = [
            window(0, 1000, 0),
            window(500, 800, 500),
            window(100, 900, 100),
        ];
        let now = t(600);
        let active = pick_active(&windows, now);
        // Flagging each entry independently must agree with the pick.
        let flagged: Vec<usize> = windows
            .iter()
            .enumerate()
            .filter(|(i, w)| {
                is_active_at(w.start_date, w.end_date, now) && Some(*i) == active
            })
            .map(|(i, _)| i)
            .collect();
        assert_eq!(flagged, vec![1]);
    }

    // -----------------------------------------------------------------------
    // validate_override_window
    // -----------------------------------------------------------------------

    #[test]
    fn override_ending_in_future_is_valid() {
        let now = Utc::now();
        assert!(validate_override_window(now, now + Duration::days(7)).is_ok());
    }

    #[test]
    fn override_ending_now_is_rejected() {
        let now = Utc::now();
        assert!(validate_override_window(now, now).is_err());
    }

    #[test]
    fn override_ending_in_past_is_rejected() {
        let now = Utc::now();
        assert!(validate_override_window(now, now - Duration::hours(1)).is_err());
    }
}
