//! Day scheduling
//!
//! Turns one cluster of attractions into a time-ordered list of activities
//! with a single greedy pass over a minute clock. Attractions are taken in
//! priority order (must-visit first, then by rating); the first attraction
//! that would end after day-end stops the pass and everything after it is
//! dropped for that day rather than reordered or deferred.

use crate::config::ScheduleConfig;
use crate::distance::DistanceEstimator;
use crate::Result;
use crate::models::{Activity, AttractionRecord, Coordinates};
use chrono::{NaiveDate, NaiveTime, TimeDelta};
use std::ops::Range;
use tracing::{debug, instrument};

/// Lunch is inserted once when the clock is in [12:00, 14:00)
const LUNCH_WINDOW: Range<u32> = 12 * 60..14 * 60;
/// Dinner is inserted once when the clock is in [18:00, 20:00)
const DINNER_WINDOW: Range<u32> = 18 * 60..20 * 60;

/// Clock time for a minute offset after midnight
fn at(minute: u32) -> NaiveTime {
    NaiveTime::default() + TimeDelta::minutes(i64::from(minute))
}

/// Builds the activity list of a single day
#[derive(Debug, Clone)]
pub struct DayScheduler {
    config: ScheduleConfig,
    estimator: DistanceEstimator,
}

impl Default for DayScheduler {
    fn default() -> Self {
        // the default schedule always passes validation
        Self::with_checked_config(ScheduleConfig::default())
    }
}

impl DayScheduler {
    /// Scheduler for `config`; rejects day windows and durations that would
    /// wrap the clock past midnight
    pub fn new(config: ScheduleConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_checked_config(config))
    }

    fn with_checked_config(config: ScheduleConfig) -> Self {
        let estimator = DistanceEstimator::from_config(&config);
        Self { config, estimator }
    }

    #[must_use]
    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    /// Order attractions must-visit first, then by descending rating.
    /// The sort is stable, so ties keep their input order.
    #[must_use]
    pub fn prioritize(attractions: &[AttractionRecord]) -> Vec<&AttractionRecord> {
        let mut ordered: Vec<&AttractionRecord> = attractions.iter().collect();
        ordered.sort_by(|a, b| {
            b.is_must_visit
                .cmp(&a.is_must_visit)
                .then_with(|| b.rating.total_cmp(&a.rating))
        });
        ordered
    }

    /// Schedule `attractions_for_day` on `day_date`.
    ///
    /// Activities come out in start-time order without overlaps. Breakfast
    /// is always first and a free-time block fills whatever is left before
    /// day-end.
    #[instrument(level = "debug", skip(self, attractions_for_day), fields(attractions = attractions_for_day.len()))]
    pub fn build_day(&self, attractions_for_day: &[AttractionRecord], day_date: NaiveDate) -> Vec<Activity> {
        let day_end = self.config.day_end_minute();
        let mut activities = Vec::with_capacity(attractions_for_day.len() * 2 + 4);

        let mut clock = self.config.day_start_minute();
        let breakfast_end = clock.saturating_add(self.config.breakfast_minutes);
        activities.push(Activity::meal(
            at(clock),
            at(breakfast_end),
            "Breakfast at hotel",
            "Start your day with breakfast at your hotel",
        ));
        clock = breakfast_end;

        // None means the traveller is still at the hotel
        let mut location: Option<Coordinates> = None;
        let mut lunch_served = false;
        let mut dinner_served = false;

        for attraction in Self::prioritize(attractions_for_day) {
            if !lunch_served && LUNCH_WINDOW.contains(&clock) && clock < day_end {
                clock = self.push_meal(
                    &mut activities,
                    clock,
                    self.config.lunch_minutes,
                    "Lunch break",
                    "Take a break for lunch",
                );
                lunch_served = true;
            }

            let destination = attraction.coordinates();
            let travel = location.map(|from| (from, self.estimator.travel_minutes(from, destination)));
            let visit_start = clock.saturating_add(travel.map_or(0, |(_, minutes)| minutes));
            let visit_end = visit_start.saturating_add(attraction.visit_duration_minutes);

            if visit_end > day_end {
                debug!(
                    attraction = attraction.id,
                    name = %attraction.name,
                    visit_end = %at(visit_end.min(24 * 60 - 1)),
                    "Attraction does not fit before day end, dropping it and the rest of the day's list"
                );
                break;
            }

            if let Some((from, minutes)) = travel {
                activities.push(Activity::transfer(
                    at(clock),
                    at(visit_start),
                    from,
                    destination,
                    &attraction.name,
                    minutes,
                ));
            }
            activities.push(Activity::visit(
                at(visit_start),
                at(visit_end),
                attraction.id,
                &attraction.name,
                attraction.description.clone(),
                destination,
            ));
            clock = visit_end;
            location = Some(destination);

            if !dinner_served && DINNER_WINDOW.contains(&clock) && clock < day_end {
                clock = self.push_meal(
                    &mut activities,
                    clock,
                    self.config.dinner_minutes,
                    "Dinner",
                    "Enjoy dinner at a local restaurant",
                );
                dinner_served = true;
            }
        }

        if clock < day_end {
            activities.push(Activity::free_time(at(clock), at(day_end)));
        }

        debug!(%day_date, activities = activities.len(), "Built day schedule");
        activities
    }

    /// Append a meal starting at `clock`, shortened to end at day-end if
    /// needed, and return the new clock
    fn push_meal(
        &self,
        activities: &mut Vec<Activity>,
        clock: u32,
        minutes: u32,
        title: &str,
        description: &str,
    ) -> u32 {
        let end = clock.saturating_add(minutes).min(self.config.day_end_minute());
        activities.push(Activity::meal(at(clock), at(end), title, description));
        end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActivityKind;
    use rand::rngs::StdRng;
    use rand::{RngExt, SeedableRng};
    use rstest::rstest;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 14).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    /// Compact view of a schedule: (kind, start, end)
    fn timeline(activities: &[Activity]) -> Vec<(ActivityKind, NaiveTime, NaiveTime)> {
        activities
            .iter()
            .map(|a| (a.activity_type, a.start_time, a.end_time))
            .collect()
    }

    fn scheduler_with_hours(start: u32, end: u32) -> DayScheduler {
        DayScheduler::new(ScheduleConfig {
            day_start_hour: start,
            day_end_hour: end,
            ..ScheduleConfig::default()
        })
        .unwrap()
    }

    fn assert_well_formed(activities: &[Activity], config: &ScheduleConfig) {
        let day_end = at(config.day_end_minute());
        for pair in activities.windows(2) {
            assert!(pair[0].start_time <= pair[1].start_time, "not sorted: {pair:?}");
            assert!(pair[1].start_time >= pair[0].end_time, "overlap: {pair:?}");
        }
        for activity in activities {
            assert!(activity.end_time >= activity.start_time, "negative: {activity:?}");
            assert!(activity.end_time <= day_end, "past day end: {activity:?}");
        }
        let lunches = activities.iter().filter(|a| a.title == "Lunch break").count();
        let dinners = activities.iter().filter(|a| a.title == "Dinner").count();
        assert!(lunches <= 1 && dinners <= 1);
    }

    // Three attractions a few hundred meters apart in central Rome
    fn three_nearby() -> Vec<AttractionRecord> {
        vec![
            AttractionRecord::new(1, "Pantheon", 41.8986, 12.4769)
                .with_rating(4.9)
                .with_visit_duration(120),
            AttractionRecord::new(2, "Piazza Navona", 41.8992, 12.4731)
                .with_rating(4.7)
                .with_visit_duration(90),
            AttractionRecord::new(3, "Trevi Fountain", 41.9009, 12.4833)
                .with_rating(4.5)
                .with_visit_duration(240),
        ]
    }

    #[test]
    fn test_full_day_interleaves_meals_and_transfers() {
        let scheduler = DayScheduler::default();
        let activities = scheduler.build_day(&three_nearby(), day());

        assert_eq!(
            timeline(&activities),
            vec![
                (ActivityKind::Meal, time(9, 0), time(10, 0)),
                (ActivityKind::Attraction, time(10, 0), time(12, 0)),
                (ActivityKind::Meal, time(12, 0), time(13, 0)),
                (ActivityKind::Transfer, time(13, 0), time(13, 5)),
                (ActivityKind::Attraction, time(13, 5), time(14, 35)),
                (ActivityKind::Transfer, time(14, 35), time(14, 40)),
                (ActivityKind::Attraction, time(14, 40), time(18, 40)),
                (ActivityKind::Meal, time(18, 40), time(20, 10)),
                (ActivityKind::FreeTime, time(20, 10), time(21, 0)),
            ]
        );
        assert_eq!(activities[0].title, "Breakfast at hotel");
        assert_eq!(activities[2].title, "Lunch break");
        assert_eq!(activities[7].title, "Dinner");
        assert_eq!(activities[3].title, "Travel to Piazza Navona");
        assert_eq!(activities[6].attraction_id, Some(3));
        assert_well_formed(&activities, scheduler.config());
    }

    #[test]
    fn test_attraction_past_day_end_is_dropped_with_its_transfer() {
        let mut attractions = three_nearby();
        // ~200 km away: a 4 hour transfer would push the visit past 21:00
        attractions[2].latitude += 1.8;

        let scheduler = DayScheduler::default();
        let activities = scheduler.build_day(&attractions, day());

        assert_eq!(
            timeline(&activities),
            vec![
                (ActivityKind::Meal, time(9, 0), time(10, 0)),
                (ActivityKind::Attraction, time(10, 0), time(12, 0)),
                (ActivityKind::Meal, time(12, 0), time(13, 0)),
                (ActivityKind::Transfer, time(13, 0), time(13, 5)),
                (ActivityKind::Attraction, time(13, 5), time(14, 35)),
                (ActivityKind::FreeTime, time(14, 35), time(21, 0)),
            ]
        );
        assert_well_formed(&activities, scheduler.config());
    }

    #[test]
    fn test_drop_stops_the_pass_instead_of_fitting_shorter_attractions() {
        let attractions = vec![
            AttractionRecord::new(1, "Long Museum", 0.0, 0.0)
                .with_rating(5.0)
                .with_visit_duration(700),
            AttractionRecord::new(2, "Short Garden", 0.0, 0.0)
                .with_rating(4.0)
                .with_visit_duration(30),
        ];
        let activities = DayScheduler::default().build_day(&attractions, day());

        assert_eq!(
            timeline(&activities),
            vec![
                (ActivityKind::Meal, time(9, 0), time(10, 0)),
                (ActivityKind::FreeTime, time(10, 0), time(21, 0)),
            ]
        );
    }

    #[test]
    fn test_empty_day_is_breakfast_and_free_time() {
        let activities = DayScheduler::default().build_day(&[], day());
        assert_eq!(
            timeline(&activities),
            vec![
                (ActivityKind::Meal, time(9, 0), time(10, 0)),
                (ActivityKind::FreeTime, time(10, 0), time(21, 0)),
            ]
        );
    }

    #[test]
    fn test_long_visit_skips_lunch_and_triggers_dinner() {
        let attractions = vec![AttractionRecord::new(1, "Theme Park", 0.0, 0.0).with_visit_duration(480)];
        let activities = DayScheduler::default().build_day(&attractions, day());

        assert_eq!(
            timeline(&activities),
            vec![
                (ActivityKind::Meal, time(9, 0), time(10, 0)),
                (ActivityKind::Attraction, time(10, 0), time(18, 0)),
                (ActivityKind::Meal, time(18, 0), time(19, 30)),
                (ActivityKind::FreeTime, time(19, 30), time(21, 0)),
            ]
        );
        assert!(activities.iter().all(|a| a.title != "Lunch break"));
    }

    #[test]
    fn test_dinner_is_shortened_at_day_end() {
        let scheduler = scheduler_with_hours(9, 20);
        let attractions = vec![AttractionRecord::new(1, "Hike", 0.0, 0.0).with_visit_duration(570)];
        let activities = scheduler.build_day(&attractions, day());

        assert_eq!(
            timeline(&activities),
            vec![
                (ActivityKind::Meal, time(9, 0), time(10, 0)),
                (ActivityKind::Attraction, time(10, 0), time(19, 30)),
                (ActivityKind::Meal, time(19, 30), time(20, 0)),
            ]
        );
        assert_well_formed(&activities, scheduler.config());
    }

    #[rstest]
    // breakfast ends 12:00, inside the window
    #[case(11, true)]
    // breakfast ends exactly at 14:00, the window is half-open
    #[case(13, false)]
    #[case(14, false)]
    fn test_lunch_window_boundaries(#[case] start_hour: u32, #[case] expect_lunch: bool) {
        let scheduler = scheduler_with_hours(start_hour, 22);
        let attractions = vec![AttractionRecord::new(1, "Gallery", 0.0, 0.0).with_visit_duration(60)];
        let activities = scheduler.build_day(&attractions, day());

        let lunch = activities.iter().find(|a| a.title == "Lunch break");
        assert_eq!(lunch.is_some(), expect_lunch);
        if let Some(lunch) = lunch {
            assert_eq!(lunch.start_time, time(12, 0));
            assert_eq!(lunch.end_time, time(13, 0));
        }
    }

    #[test]
    fn test_meals_are_inserted_at_most_once() {
        // Many short visits keep the clock inside both meal windows repeatedly
        let attractions: Vec<AttractionRecord> = (0..30)
            .map(|i| AttractionRecord::new(i, format!("Stop {i}"), 0.0, 0.0).with_visit_duration(20))
            .collect();
        let scheduler = DayScheduler::default();
        let activities = scheduler.build_day(&attractions, day());

        assert_eq!(activities.iter().filter(|a| a.title == "Lunch break").count(), 1);
        assert_eq!(activities.iter().filter(|a| a.title == "Dinner").count(), 1);
        assert_well_formed(&activities, scheduler.config());
    }

    #[test]
    fn test_close_attractions_still_get_minimum_transfer() {
        let attractions = vec![
            AttractionRecord::new(1, "North Gate", 0.0, 0.0).with_visit_duration(30),
            AttractionRecord::new(2, "South Gate", 0.0, 0.0).with_visit_duration(30),
        ];
        let activities = DayScheduler::default().build_day(&attractions, day());
        let transfer = activities
            .iter()
            .find(|a| a.activity_type == ActivityKind::Transfer)
            .unwrap();
        assert_eq!(transfer.travel_duration_minutes, 5);
        assert_eq!(transfer.duration_minutes(), 5);
    }

    #[test]
    fn test_priority_is_must_visit_then_rating_then_input_order() {
        let attractions = vec![
            AttractionRecord::new(1, "A", 0.0, 0.0).with_rating(4.0),
            AttractionRecord::new(2, "B", 0.0, 0.0).with_rating(5.0),
            AttractionRecord::new(3, "C", 0.0, 0.0).with_rating(3.0).must_visit(),
            AttractionRecord::new(4, "D", 0.0, 0.0).with_rating(4.0),
        ];
        let order: Vec<i64> = DayScheduler::prioritize(&attractions)
            .iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(order, vec![3, 2, 1, 4]);
    }

    #[test]
    fn test_first_visit_has_no_transfer() {
        let activities = DayScheduler::default().build_day(&three_nearby(), day());
        assert_eq!(activities[1].activity_type, ActivityKind::Attraction);
        assert!(activities[1].travel_mode.is_none());
    }

    #[rstest]
    #[case(1)]
    #[case(7)]
    #[case(42)]
    #[case(1234)]
    fn test_random_days_are_well_formed(#[case] seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        for start_hour in [6, 9, 12, 15] {
            let config = ScheduleConfig {
                day_start_hour: start_hour,
                day_end_hour: 22,
                ..ScheduleConfig::default()
            };
            let scheduler = DayScheduler::new(config).unwrap();
            let attractions: Vec<AttractionRecord> = (0..rng.random_range(0..12))
                .map(|i| {
                    AttractionRecord::new(
                        i,
                        format!("Place {i}"),
                        48.85 + rng.random_range(-0.2..0.2),
                        2.35 + rng.random_range(-0.2..0.2),
                    )
                    .with_rating(rng.random_range(0.0..5.0))
                    .with_visit_duration(rng.random_range(0..300))
                })
                .collect();

            let activities = scheduler.build_day(&attractions, day());
            assert_eq!(activities[0].title, "Breakfast at hotel");
            assert_well_formed(&activities, scheduler.config());
        }
    }

    #[test]
    fn test_day_window_past_midnight_is_rejected() {
        let config = ScheduleConfig {
            day_start_hour: 22,
            day_end_hour: 26,
            ..ScheduleConfig::default()
        };
        let err = DayScheduler::new(config).unwrap_err();
        assert!(matches!(err, crate::TripPlanError::Config { .. }));
    }

    #[test]
    fn test_default_scheduler_matches_validated_defaults() {
        let validated = DayScheduler::new(ScheduleConfig::default()).unwrap();
        assert_eq!(validated.config(), DayScheduler::default().config());
    }
}
