//! `TripPlan` - Multi-day travel itinerary planning
//!
//! This library groups a destination's attractions into one geographic
//! cluster per day, schedules each day around fixed meal windows and
//! estimated transfers, and assembles the days into a persisted itinerary.

pub mod assembler;
pub mod catalog;
pub mod clustering;
pub mod config;
pub mod distance;
pub mod error;
pub mod logging;
pub mod models;
pub mod planner;
pub mod scheduler;
pub mod store;

// Re-export core types for public API
pub use assembler::ItineraryAssembler;
pub use catalog::{AttractionFilter, Catalog, Destination, HotelFilter};
pub use clustering::{ClusterMap, GeoClusterer};
pub use config::TripPlanConfig;
pub use distance::{DistanceEstimator, estimate_travel_minutes, haversine};
pub use error::TripPlanError;
pub use models::{
    Activity, ActivityKind, AttractionRecord, DaySchedule, Itinerary, ItineraryDetails, SavedItinerary,
};
pub use planner::{AttractionSource, HotelLocator, ItineraryStore, PlanningRequest, TripPlanner};
pub use scheduler::DayScheduler;
pub use store::{FjallItineraryStore, MemoryItineraryStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TripPlanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
