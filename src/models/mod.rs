//! Data models for `TripPlan`
//!
//! This module contains the plain records exchanged with the planning core:
//! - Attraction: points of interest and their coordinates
//! - Hotel: accommodation records returned by proximity lookups
//! - Itinerary: activities, day schedules and the itinerary envelope

pub mod attraction;
pub mod hotel;
pub mod itinerary;

// Re-export all public types for convenient access
pub use attraction::{AttractionRecord, Coordinates};
pub use hotel::{HotelRecord, NearbyHotel};
pub use itinerary::{
    Activity, ActivityKind, DaySchedule, DestinationSummary, HotelSummary, Itinerary,
    ItineraryDetails, SavedItinerary, TravelMode, parse_date, parse_time,
};
