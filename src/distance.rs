//! Great-circle distances and travel time estimates

use crate::config::ScheduleConfig;
use crate::models::Coordinates;

/// Transfers never take less than this many minutes
pub const MIN_TRAVEL_MINUTES: u32 = 5;

/// Great-circle distance in kilometers (Earth radius 6371 km)
#[must_use]
pub fn haversine(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    haversine::distance(
        haversine::Location {
            latitude: lat1,
            longitude: lon1,
        },
        haversine::Location {
            latitude: lat2,
            longitude: lon2,
        },
        haversine::Units::Kilometers,
    )
}

/// Estimated travel time in whole minutes at `speed_kmh`, never below
/// [`MIN_TRAVEL_MINUTES`]
#[must_use]
pub fn estimate_travel_minutes(lat1: f64, lon1: f64, lat2: f64, lon2: f64, speed_kmh: f64) -> u32 {
    minutes_at_speed(haversine(lat1, lon1, lat2, lon2), speed_kmh, MIN_TRAVEL_MINUTES)
}

fn minutes_at_speed(distance_km: f64, speed_kmh: f64, floor: u32) -> u32 {
    let minutes = ((distance_km / speed_kmh) * 60.0).floor();
    // saturating cast; NaN becomes 0 and is lifted to the floor
    (minutes as u32).max(floor)
}

/// Distance-to-time conversion bound to one schedule configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceEstimator {
    speed_kmh: f64,
    min_travel_minutes: u32,
}

impl DistanceEstimator {
    #[must_use]
    pub fn new(speed_kmh: f64, min_travel_minutes: u32) -> Self {
        Self {
            speed_kmh,
            min_travel_minutes,
        }
    }

    #[must_use]
    pub fn from_config(config: &ScheduleConfig) -> Self {
        Self::new(config.travel_speed_kmh, config.min_travel_minutes)
    }

    /// Distance between two coordinates in kilometers
    #[must_use]
    pub fn distance_km(&self, from: Coordinates, to: Coordinates) -> f64 {
        haversine(from.latitude, from.longitude, to.latitude, to.longitude)
    }

    /// Travel minutes between two coordinates
    #[must_use]
    pub fn travel_minutes(&self, from: Coordinates, to: Coordinates) -> u32 {
        minutes_at_speed(self.distance_km(from, to), self.speed_kmh, self.min_travel_minutes)
    }
}

impl Default for DistanceEstimator {
    fn default() -> Self {
        Self::from_config(&ScheduleConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const PARIS: (f64, f64) = (48.8566, 2.3522);
    const LONDON: (f64, f64) = (51.5074, -0.1278);

    #[test]
    fn test_haversine_known_distance() {
        let d = haversine(PARIS.0, PARIS.1, LONDON.0, LONDON.1);
        assert!((d - 343.5).abs() < 1.0, "Paris-London was {d}");
    }

    #[test]
    fn test_haversine_is_symmetric_and_zero_on_identity() {
        let there = haversine(PARIS.0, PARIS.1, LONDON.0, LONDON.1);
        let back = haversine(LONDON.0, LONDON.1, PARIS.0, PARIS.1);
        assert!((there - back).abs() < 1e-9);
        assert_eq!(haversine(PARIS.0, PARIS.1, PARIS.0, PARIS.1), 0.0);
    }

    #[rstest]
    #[case(35.0, 139.0, 35.0, 139.0)]
    #[case(35.6586, 139.7454, 35.6590, 139.7460)]
    #[case(-33.8568, 151.2153, -33.8523, 151.2108)]
    fn test_travel_floor(#[case] lat1: f64, #[case] lon1: f64, #[case] lat2: f64, #[case] lon2: f64) {
        assert_eq!(estimate_travel_minutes(lat1, lon1, lat2, lon2, 50.0), 5);
    }

    #[test]
    fn test_travel_minutes_are_floored() {
        // 0.1 degree of latitude is ~11.12 km, 13.34 minutes at 50 km/h
        assert_eq!(estimate_travel_minutes(0.0, 0.0, 0.1, 0.0, 50.0), 13);
        // Paris-London at 50 km/h is ~412 minutes
        let minutes = estimate_travel_minutes(PARIS.0, PARIS.1, LONDON.0, LONDON.1, 50.0);
        assert!((410..=414).contains(&minutes), "got {minutes}");
    }

    #[test]
    fn test_estimator_uses_configured_speed_and_floor() {
        let from = Coordinates::new(0.0, 0.0);
        let to = Coordinates::new(0.1, 0.0);
        assert_eq!(DistanceEstimator::new(25.0, 5).travel_minutes(from, to), 26);
        assert_eq!(DistanceEstimator::new(50.0, 30).travel_minutes(from, to), 30);
        assert_eq!(DistanceEstimator::default().travel_minutes(from, from), 5);
    }
}
