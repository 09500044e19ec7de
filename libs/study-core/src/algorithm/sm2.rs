//! SM-2 spaced repetition algorithm.
//!
//! Based on SuperMemo 2 with configurable parameters. Only Again and Hard move
//! the ease factor; Good and Easy keep it.

use super::ReviewScheduler;
use crate::error::ScheduleError;
use crate::types::{CardId, CardSchedule, Quality};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Ease floor that holds whatever `minimum_ease` is configured to.
const MIN_EASE: f64 = 1.3;

/// SM-2 algorithm with configurable parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sm2 {
    pub initial_ease: f64,
    pub minimum_ease: f64,
    pub hard_multiplier: f64,
    pub easy_bonus: f64,
    /// Interval after the first successful repetition.
    pub first_interval: f64,
    /// Interval after the second successful repetition.
    pub second_interval: f64,
    pub again_interval: f64,
    pub maximum_interval: f64,
}

impl Default for Sm2 {
    fn default() -> Self {
        Self {
            initial_ease: 2.5,
            minimum_ease: 1.3,
            hard_multiplier: 1.2,
            easy_bonus: 1.3,
            first_interval: 1.0,
            second_interval: 6.0,
            again_interval: 1.0,
            maximum_interval: 36500.0,
        }
    }
}

impl ReviewScheduler for Sm2 {
    fn name(&self) -> &'static str {
        "sm2"
    }

    fn initial_schedule(&self, card_id: CardId) -> CardSchedule {
        CardSchedule {
            ease_factor: self.initial_ease,
            ..CardSchedule::new(card_id)
        }
    }

    fn calculate_next_review(
        &self,
        schedule: &CardSchedule,
        quality: Quality,
        now: DateTime<Utc>,
    ) -> Result<CardSchedule, ScheduleError> {
        ensure_finite(schedule)?;
        let ease = schedule.ease_factor.max(self.ease_floor());
        let repetitions = schedule.repetitions.saturating_add(1);

        let (ease_factor, interval, repetitions) = match quality {
            Quality::Again => (
                self.adjust_ease(ease, quality),
                self.whole_days(self.again_interval),
                0,
            ),
            Quality::Hard => {
                let prior = prior_interval(schedule)?;
                (
                    self.adjust_ease(ease, quality),
                    self.whole_days(prior * self.hard_multiplier),
                    repetitions,
                )
            }
            Quality::Good => {
                let interval = match schedule.repetitions {
                    0 => self.first_interval,
                    1 => self.second_interval,
                    _ => prior_interval(schedule)? * ease,
                };
                (ease, self.whole_days(interval), repetitions)
            }
            Quality::Easy => {
                let prior = prior_interval(schedule)?;
                (
                    ease,
                    self.whole_days(prior * ease * self.easy_bonus),
                    repetitions,
                )
            }
        };

        let next_review_date = Duration::try_days(interval as i64)
            .and_then(|delta| now.checked_add_signed(delta))
            .ok_or(ScheduleError::DateOverflow {
                card_id: schedule.card_id,
                interval_days: interval,
            })?;

        Ok(CardSchedule {
            card_id: schedule.card_id,
            ease_factor,
            interval_days: Some(interval),
            repetitions,
            next_review_date: Some(next_review_date),
            last_review_date: Some(now),
            created_at: schedule.created_at,
            updated_at: schedule.updated_at,
        })
    }
}

impl Sm2 {
    fn ease_floor(&self) -> f64 {
        self.minimum_ease.max(MIN_EASE)
    }

    /// SuperMemo-2 ease recurrence, floored at `ease_floor`.
    /// EF' = EF + (0.1 - (5 - q) * (0.08 + (5 - q) * 0.02))
    fn adjust_ease(&self, ease: f64, quality: Quality) -> f64 {
        let distance = 5.0 - f64::from(quality.ordinal());
        let adjusted = ease + (0.1 - distance * (0.08 + distance * 0.02));
        adjusted.max(self.ease_floor())
    }

    /// Round half away from zero, then clamp to `[1, maximum_interval]`.
    fn whole_days(&self, days: f64) -> f64 {
        days.round().max(1.0).min(self.maximum_interval.max(1.0))
    }
}

/// Interval the card was last scheduled with. A brand new card counts as 0.
fn prior_interval(schedule: &CardSchedule) -> Result<f64, ScheduleError> {
    match schedule.interval_days {
        Some(days) => Ok(days),
        None if schedule.repetitions == 0 => Ok(0.0),
        None => Err(ScheduleError::MissingInterval {
            card_id: schedule.card_id,
            repetitions: schedule.repetitions,
        }),
    }
}

fn ensure_finite(schedule: &CardSchedule) -> Result<(), ScheduleError> {
    let fields = [
        ("ease_factor", Some(schedule.ease_factor)),
        ("interval_days", schedule.interval_days),
    ];
    for (field, value) in fields {
        if let Some(value) = value.filter(|v| !v.is_finite()) {
            return Err(ScheduleError::NonFinite {
                card_id: schedule.card_id,
                field,
                value,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 9, 30, 0).unwrap()
    }

    fn schedule(ease_factor: f64, interval: f64, repetitions: u32) -> CardSchedule {
        CardSchedule {
            ease_factor,
            interval_days: Some(interval),
            repetitions,
            ..CardSchedule::new(1)
        }
    }

    fn review(state: &CardSchedule, quality: Quality) -> CardSchedule {
        Sm2::default()
            .calculate_next_review(state, quality, now())
            .unwrap()
    }

    #[test]
    fn hard_grows_interval_by_hard_multiplier() {
        let result = review(&schedule(2.5, 5.0, 2), Quality::Hard);
        assert_eq!(result.interval_days, Some(6.0));
        assert!(result.ease_factor < 2.5);
        assert!((result.ease_factor - 2.18).abs() < 1e-9);
        assert_eq!(result.repetitions, 3);
    }

    #[test]
    fn good_multiplies_by_ease() {
        let result = review(&schedule(2.5, 4.0, 2), Quality::Good);
        assert_eq!(result.interval_days, Some(10.0));
        assert_eq!(result.ease_factor, 2.5);
        assert_eq!(result.repetitions, 3);
    }

    #[test]
    fn easy_applies_bonus() {
        let result = review(&schedule(2.5, 4.0, 2), Quality::Easy);
        assert_eq!(result.interval_days, Some(13.0));
        assert_eq!(result.ease_factor, 2.5);
        assert_eq!(result.repetitions, 3);
    }

    #[test]
    fn half_day_rounds_away_from_zero() {
        // 5 * 2.5 = 12.5
        let result = review(&schedule(2.5, 5.0, 2), Quality::Good);
        assert_eq!(result.interval_days, Some(13.0));
    }

    #[test]
    fn tiny_interval_rounds_then_clamps_to_one_day() {
        let result = review(&schedule(1.3, 0.4, 1), Quality::Hard);
        assert_eq!(result.interval_days, Some(1.0));
        assert_eq!(result.ease_factor, 1.3);
    }

    #[test]
    fn again_resets_repetitions() {
        for state in [
            schedule(2.5, 30.0, 7),
            schedule(1.3, 1.0, 1),
            CardSchedule::new(9),
        ] {
            let result = review(&state, Quality::Again);
            assert_eq!(result.repetitions, 0);
            assert_eq!(result.interval_days, Some(1.0));
        }
    }

    #[test]
    fn again_lowers_ease_more_than_hard() {
        let again = review(&schedule(2.5, 10.0, 3), Quality::Again);
        let hard = review(&schedule(2.5, 10.0, 3), Quality::Hard);
        assert!((again.ease_factor - 1.96).abs() < 1e-9);
        assert!(again.ease_factor < hard.ease_factor);
    }

    #[test]
    fn good_follows_first_and_second_interval_table() {
        let first = review(&CardSchedule::new(1), Quality::Good);
        assert_eq!(first.interval_days, Some(1.0));
        assert_eq!(first.repetitions, 1);

        let second = review(&first, Quality::Good);
        assert_eq!(second.interval_days, Some(6.0));
        assert_eq!(second.repetitions, 2);

        let third = review(&second, Quality::Good);
        assert_eq!(third.interval_days, Some(15.0));
        assert_eq!(third.repetitions, 3);
    }

    #[test]
    fn new_card_hard_and_easy_get_one_day() {
        let hard = review(&CardSchedule::new(1), Quality::Hard);
        assert_eq!(hard.interval_days, Some(1.0));
        let easy = review(&CardSchedule::new(1), Quality::Easy);
        assert_eq!(easy.interval_days, Some(1.0));
    }

    #[test]
    fn dates_follow_interval() {
        let result = review(&schedule(2.5, 4.0, 2), Quality::Good);
        assert_eq!(result.last_review_date, Some(now()));
        assert_eq!(result.next_review_date, Some(now() + Duration::days(10)));
    }

    #[test]
    fn input_is_not_mutated() {
        let state = schedule(2.5, 4.0, 2);
        let before = state.clone();
        let _ = review(&state, Quality::Again);
        assert_eq!(state, before);
    }

    #[test]
    fn provenance_is_carried_through() {
        let state = CardSchedule {
            created_at: Some(now() - Duration::days(3)),
            updated_at: Some(now() - Duration::days(1)),
            ..schedule(2.5, 4.0, 2)
        };
        let result = review(&state, Quality::Good);
        assert_eq!(result.created_at, state.created_at);
        assert_eq!(result.updated_at, state.updated_at);
    }

    #[test]
    fn missing_interval_after_first_repetition_is_rejected() {
        let state = CardSchedule {
            repetitions: 2,
            ..CardSchedule::new(5)
        };
        let error = Sm2::default()
            .calculate_next_review(&state, Quality::Good, now())
            .unwrap_err();
        assert_eq!(
            error,
            ScheduleError::MissingInterval {
                card_id: 5,
                repetitions: 2
            }
        );
    }

    #[test]
    fn missing_interval_is_fine_for_again() {
        let state = CardSchedule {
            repetitions: 2,
            ..CardSchedule::new(5)
        };
        let result = review(&state, Quality::Again);
        assert_eq!(result.interval_days, Some(1.0));
    }

    #[test]
    fn non_finite_input_is_rejected() {
        let state = schedule(f64::NAN, 4.0, 2);
        let error = Sm2::default()
            .calculate_next_review(&state, Quality::Good, now())
            .unwrap_err();
        assert!(matches!(
            error,
            ScheduleError::NonFinite {
                field: "ease_factor",
                ..
            }
        ));
    }

    #[test]
    fn ease_below_floor_is_clamped() {
        for quality in [Quality::Again, Quality::Hard, Quality::Good, Quality::Easy] {
            let result = review(&schedule(0.5, 3.0, 2), quality);
            assert!(result.ease_factor >= 1.3, "{quality:?}");
        }
    }

    #[test]
    fn floors_hold_across_inputs() {
        let eases = [1.0, 1.3, 1.31, 2.0, 2.5, 3.2];
        let intervals = [0.0, 0.2, 0.4, 0.5, 1.0, 2.5, 17.0, 400.0];
        let qualities = [Quality::Again, Quality::Hard, Quality::Good, Quality::Easy];
        for &ease in &eases {
            for &interval in &intervals {
                for repetitions in 0..4 {
                    for &quality in &qualities {
                        let result = review(&schedule(ease, interval, repetitions), quality);
                        assert!(result.ease_factor >= 1.3);
                        let days = result.interval_days.unwrap();
                        assert!(days >= 1.0);
                        assert_eq!(days, days.round());
                    }
                }
            }
        }
    }

    #[test]
    fn interval_is_capped() {
        let sm2 = Sm2 {
            maximum_interval: 100.0,
            ..Sm2::default()
        };
        let result = sm2
            .calculate_next_review(&schedule(2.5, 90.0, 5), Quality::Easy, now())
            .unwrap();
        assert_eq!(result.interval_days, Some(100.0));
    }

    #[test]
    fn configured_minimum_ease_cannot_go_below_floor() {
        let sm2: Sm2 = serde_json::from_str(r#"{"minimum_ease": 1.0}"#).unwrap();
        for quality in [Quality::Again, Quality::Hard] {
            let result = sm2
                .calculate_next_review(&schedule(1.3, 3.0, 2), quality, now())
                .unwrap();
            assert_eq!(result.ease_factor, MIN_EASE, "{quality:?}");
        }
    }

    #[test]
    fn higher_minimum_ease_is_respected() {
        let sm2 = Sm2 {
            minimum_ease: 1.7,
            ..Sm2::default()
        };
        let result = sm2
            .calculate_next_review(&schedule(1.8, 3.0, 2), Quality::Again, now())
            .unwrap();
        assert_eq!(result.ease_factor, 1.7);
    }

    #[test]
    fn unrepresentable_review_date_is_an_error() {
        let sm2: Sm2 = serde_json::from_str(r#"{"maximum_interval": 1e300}"#).unwrap();
        let error = sm2
            .calculate_next_review(&schedule(2.5, 1e200, 5), Quality::Good, now())
            .unwrap_err();
        assert!(matches!(
            error,
            ScheduleError::DateOverflow { card_id: 1, .. }
        ));
    }

    #[test]
    fn initial_schedule_uses_configured_ease() {
        let sm2 = Sm2 {
            initial_ease: 2.3,
            ..Sm2::default()
        };
        let state = sm2.initial_schedule(11);
        assert_eq!(state.card_id, 11);
        assert_eq!(state.ease_factor, 2.3);
        assert_eq!(state.repetitions, 0);
    }

    #[test]
    fn config_fills_missing_fields_with_defaults() {
        let sm2: Sm2 = serde_json::from_str(r#"{"easy_bonus": 1.5}"#).unwrap();
        assert_eq!(sm2.easy_bonus, 1.5);
        assert_eq!(sm2.minimum_ease, 1.3);
        assert_eq!(sm2.second_interval, 6.0);
    }
}
