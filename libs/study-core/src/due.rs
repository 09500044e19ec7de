//! Due card selection.
//!
//! A card is due when its next review falls on or before the current study day.
//! Study days start at `daily_reset_hour` (UTC): before that hour it is still
//! "yesterday", so late-night reviews count towards the previous day.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CardId, CardSchedule};

/// Due set selection parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DueSelector {
    /// Hour of day (0-23) when a new study day begins.
    pub daily_reset_hour: u32,
    /// Maximum number of cards returned.
    pub limit: Option<usize>,
}

impl DueSelector {
    pub fn new(daily_reset_hour: u32, limit: Option<usize>) -> Self {
        Self {
            daily_reset_hour: daily_reset_hour.min(23),
            limit,
        }
    }

    /// Study day an instant belongs to.
    pub fn study_day(&self, instant: DateTime<Utc>) -> NaiveDate {
        (instant - Duration::hours(i64::from(self.daily_reset_hour.min(23)))).date_naive()
    }

    pub fn is_due(&self, schedule: &CardSchedule, now: DateTime<Utc>) -> bool {
        match schedule.next_review_date {
            Some(next) => self.study_day(next) <= self.study_day(now),
            None => true,
        }
    }

    /// Ids of the due cards, most overdue first, ties broken by ascending id.
    /// Never-scheduled cards sort ahead of everything else.
    pub fn select(&self, schedules: &[CardSchedule], now: DateTime<Utc>) -> Vec<CardId> {
        let mut due: Vec<&CardSchedule> = schedules
            .iter()
            .filter(|s| self.is_due(s, now))
            .collect();
        due.sort_by(|a, b| {
            a.next_review_date
                .cmp(&b.next_review_date)
                .then(a.card_id.cmp(&b.card_id))
        });

        let limit = self.limit.unwrap_or(usize::MAX);
        due.into_iter().take(limit).map(|s| s.card_id).collect()
    }
}

/// Due card ids with day resolution in UTC and no limit.
pub fn select_due(schedules: &[CardSchedule], now: DateTime<Utc>) -> Vec<CardId> {
    DueSelector::default().select(schedules, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, day, hour, 0, 0).unwrap()
    }

    fn due_on(card_id: CardId, next: DateTime<Utc>) -> CardSchedule {
        CardSchedule {
            interval_days: Some(1.0),
            repetitions: 1,
            next_review_date: Some(next),
            ..CardSchedule::new(card_id)
        }
    }

    #[test]
    fn later_today_counts_as_due() {
        let schedules = vec![due_on(1, at(10, 23))];
        assert_eq!(select_due(&schedules, at(10, 6)), vec![1]);
    }

    #[test]
    fn tomorrow_is_not_due() {
        let schedules = vec![due_on(1, at(11, 0))];
        assert!(select_due(&schedules, at(10, 23)).is_empty());
    }

    #[test]
    fn most_overdue_first_then_by_id() {
        let schedules = vec![
            due_on(5, at(9, 8)),
            due_on(3, at(7, 8)),
            due_on(4, at(9, 8)),
            due_on(1, at(12, 8)),
            due_on(2, at(8, 8)),
        ];
        assert_eq!(select_due(&schedules, at(10, 12)), vec![3, 2, 4, 5]);
    }

    #[test]
    fn unscheduled_cards_are_due_first() {
        let schedules = vec![due_on(1, at(9, 8)), CardSchedule::new(8), CardSchedule::new(2)];
        assert_eq!(select_due(&schedules, at(10, 12)), vec![2, 8, 1]);
    }

    #[test]
    fn selection_is_independent_of_input_order() {
        let mut schedules = vec![
            due_on(3, at(9, 8)),
            due_on(1, at(9, 8)),
            due_on(2, at(8, 8)),
        ];
        let first = select_due(&schedules, at(10, 12));
        schedules.reverse();
        assert_eq!(select_due(&schedules, at(10, 12)), first);
    }

    #[test]
    fn reset_hour_keeps_late_night_on_previous_day() {
        let selector = DueSelector::new(4, None);
        let schedules = vec![due_on(1, at(11, 10))];
        // 02:00 on the 11th still belongs to the 10th.
        assert!(selector.select(&schedules, at(11, 2)).is_empty());
        assert_eq!(selector.select(&schedules, at(11, 5)), vec![1]);
    }

    #[test]
    fn limit_truncates_after_ordering() {
        let selector = DueSelector::new(0, Some(2));
        let schedules = vec![
            due_on(1, at(9, 8)),
            due_on(2, at(7, 8)),
            due_on(3, at(8, 8)),
        ];
        assert_eq!(selector.select(&schedules, at(10, 12)), vec![2, 3]);
    }

    #[test]
    fn study_day_shifts_with_reset_hour() {
        let selector = DueSelector::new(6, None);
        assert_eq!(selector.study_day(at(10, 5)), at(9, 0).date_naive());
        assert_eq!(selector.study_day(at(10, 6)), at(10, 0).date_naive());
    }
}
