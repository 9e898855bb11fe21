//! Itinerary assembly across all trip days

use crate::clustering::ClusterMap;
use crate::models::{AttractionRecord, DaySchedule, Itinerary};
use crate::scheduler::DayScheduler;
use crate::{Result, TripPlanError};
use chrono::{Days, NaiveDate};
use tracing::{debug, info};

/// Attractions for the day at 0-based `index`.
///
/// Days beyond the produced clusters reuse them cyclically
/// (`index mod cluster_count`); without any clusters the day is empty.
fn cluster_for_day(clusters: &ClusterMap, index: usize) -> &[AttractionRecord] {
    if let Some(attractions) = clusters.get(&index) {
        return attractions;
    }
    if index >= clusters.len() && !clusters.is_empty() {
        if let Some(attractions) = clusters.get(&(index % clusters.len())) {
            return attractions;
        }
    }
    &[]
}

fn offset_date(start: NaiveDate, offset_days: u32) -> Result<NaiveDate> {
    start
        .checked_add_days(Days::new(u64::from(offset_days)))
        .ok_or_else(|| TripPlanError::invalid_input(format!("{start} plus {offset_days} days is out of range")))
}

/// Builds the full itinerary from per-day clusters
#[derive(Debug, Clone, Default)]
pub struct ItineraryAssembler {
    scheduler: DayScheduler,
}

impl ItineraryAssembler {
    #[must_use]
    pub fn new(scheduler: DayScheduler) -> Self {
        Self { scheduler }
    }

    /// Schedule every day of the trip and wrap the result in an itinerary.
    ///
    /// `num_days` must be at least 1; there is no upper bound here.
    pub fn create_itinerary(
        &self,
        destination_id: i64,
        start_date: NaiveDate,
        num_days: u32,
        clustered_attractions: &ClusterMap,
        hotel_id: Option<i64>,
        user_id: Option<i64>,
    ) -> Result<Itinerary> {
        if num_days == 0 {
            return Err(TripPlanError::invalid_input("An itinerary needs at least one day"));
        }

        if clustered_attractions.len() < num_days as usize {
            debug!(
                clusters = clustered_attractions.len(),
                num_days, "Fewer clusters than days, reusing clusters cyclically"
            );
        }

        let end_date = offset_date(start_date, num_days - 1)?;
        let mut days = Vec::with_capacity(num_days as usize);
        for day_number in 1..=num_days {
            let date = offset_date(start_date, day_number - 1)?;
            let attractions = cluster_for_day(clustered_attractions, (day_number - 1) as usize);
            days.push(DaySchedule {
                day_number,
                date,
                hotel_id,
                activities: self.scheduler.build_day(attractions, date),
            });
        }

        info!(destination_id, %start_date, %end_date, num_days, "Assembled itinerary");

        Ok(Itinerary {
            title: format!("{num_days}-Day Itinerary"),
            description: format!("A {num_days}-day itinerary created for your trip"),
            user_id,
            destination_id,
            start_date,
            end_date,
            hotel_id,
            is_recommended: false,
            days,
        })
    }
}
