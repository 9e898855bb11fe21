//! Trip planning service
//!
//! Wires the synchronous planning core to the collaborators that own I/O:
//! an attraction source, a hotel proximity lookup and an itinerary store.
//! All collaborator reads complete before the core runs; the core itself
//! never awaits.

use crate::assembler::ItineraryAssembler;
use crate::clustering::GeoClusterer;
use crate::config::{HotelSearchConfig, PlanningConfig, TripPlanConfig};
use crate::models::{AttractionRecord, Coordinates, Itinerary, NearbyHotel, SavedItinerary};
use crate::scheduler::DayScheduler;
use crate::{Result, TripPlanError};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Ranked attractions for a destination
#[async_trait]
pub trait AttractionSource: Send + Sync {
    /// Up to `limit` attractions, must-visit first, then by descending rating
    async fn top_attractions(&self, destination_id: i64, limit: usize) -> Result<Vec<AttractionRecord>>;
}

/// Hotel proximity lookup
#[async_trait]
pub trait HotelLocator: Send + Sync {
    /// Hotels within `max_distance_km` of `point`, nearest first
    async fn hotels_near(
        &self,
        destination_id: i64,
        point: Coordinates,
        max_distance_km: f64,
        limit: usize,
    ) -> Result<Vec<NearbyHotel>>;
}

/// Persistence sink for finished itineraries
#[async_trait]
pub trait ItineraryStore: Send + Sync {
    /// Persist and return the assigned identifier
    async fn save(&self, itinerary: &Itinerary) -> Result<u64>;

    async fn get(&self, id: u64) -> Result<Option<Itinerary>>;
}

/// A request to plan a trip
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningRequest {
    pub destination_id: i64,
    pub num_days: u32,
    pub start_date: NaiveDate,
    /// Attractions to plan with; the source's top attractions when absent
    #[serde(default)]
    pub attractions: Option<Vec<AttractionRecord>>,
    #[serde(default)]
    pub hotel_id: Option<i64>,
    #[serde(default)]
    pub user_id: Option<i64>,
}

impl PlanningRequest {
    #[must_use]
    pub fn new(destination_id: i64, num_days: u32, start_date: NaiveDate) -> Self {
        Self {
            destination_id,
            num_days,
            start_date,
            attractions: None,
            hotel_id: None,
            user_id: None,
        }
    }
}

fn check_coordinates(attractions: &[AttractionRecord]) -> Result<()> {
    match attractions.iter().find(|a| !a.coordinates().is_valid()) {
        Some(attraction) => Err(TripPlanError::invalid_input(format!(
            "Attraction {} ({}) has invalid coordinates {}",
            attraction.id,
            attraction.name,
            attraction.coordinates().format_coordinates()
        ))),
        None => Ok(()),
    }
}

/// Plans, persists and retrieves itineraries
pub struct TripPlanner {
    clusterer: GeoClusterer,
    assembler: ItineraryAssembler,
    hotel_search: HotelSearchConfig,
    planning: PlanningConfig,
    attractions: Arc<dyn AttractionSource>,
    hotels: Arc<dyn HotelLocator>,
    store: Arc<dyn ItineraryStore>,
}

impl TripPlanner {
    pub fn new(
        config: &TripPlanConfig,
        attractions: Arc<dyn AttractionSource>,
        hotels: Arc<dyn HotelLocator>,
        store: Arc<dyn ItineraryStore>,
    ) -> Result<Self> {
        Ok(Self {
            clusterer: GeoClusterer::from_config(&config.clustering),
            assembler: ItineraryAssembler::new(DayScheduler::new(config.schedule.clone())?),
            hotel_search: config.hotels.clone(),
            planning: config.planning.clone(),
            attractions,
            hotels,
            store,
        })
    }

    /// Plan a trip end to end and persist the result
    #[instrument(skip(self, request), fields(destination_id = request.destination_id, num_days = request.num_days))]
    pub async fn plan(&self, request: PlanningRequest) -> Result<SavedItinerary> {
        if request.num_days == 0 || request.num_days > self.planning.max_days {
            return Err(TripPlanError::invalid_input(format!(
                "num_days must be between 1 and {}, got {}",
                self.planning.max_days, request.num_days
            )));
        }

        let attractions = match request.attractions {
            Some(attractions) if !attractions.is_empty() => {
                check_coordinates(&attractions)?;
                attractions
            }
            _ => {
                let limit = request.num_days as usize * self.planning.attractions_per_day;
                debug!(limit, "No attractions supplied, fetching top attractions");
                self.attractions
                    .top_attractions(request.destination_id, limit)
                    .await?
            }
        };

        if attractions.is_empty() {
            warn!("No attractions available, every day will be free time");
        }

        let clusters = self
            .clusterer
            .cluster_attractions(&attractions, request.num_days as usize);

        let hotel_id = match request.hotel_id {
            Some(id) => Some(id),
            None => self.select_hotel(request.destination_id, &attractions).await?,
        };

        let itinerary = self.assembler.create_itinerary(
            request.destination_id,
            request.start_date,
            request.num_days,
            &clusters,
            hotel_id,
            request.user_id,
        )?;

        let id = self.store.save(&itinerary).await?;
        info!(id, attractions = attractions.len(), clusters = clusters.len(), ?hotel_id, "Planned itinerary");

        Ok(SavedItinerary { id, itinerary })
    }

    /// Best-ranked hotel near the centre of `attractions`, if any is in range
    pub async fn select_hotel(
        &self,
        destination_id: i64,
        attractions: &[AttractionRecord],
    ) -> Result<Option<i64>> {
        if attractions.is_empty() {
            return Ok(None);
        }

        let center = GeoClusterer::find_central_point(attractions)?;
        let hotels = self
            .hotels
            .hotels_near(
                destination_id,
                center,
                self.hotel_search.max_distance_km,
                self.hotel_search.limit,
            )
            .await?;

        match hotels.first() {
            Some(nearby) => {
                debug!(hotel = nearby.hotel.id, distance_km = nearby.distance_km, "Selected hotel");
                Ok(Some(nearby.hotel.id))
            }
            None => {
                debug!(center = %center.format_coordinates(), "No hotel within range");
                Ok(None)
            }
        }
    }

    /// Fetch a previously planned itinerary
    pub async fn get(&self, id: u64) -> Result<Itinerary> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| TripPlanError::invalid_input(format!("Itinerary with ID {id} not found")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HotelRecord;
    use crate::store::MemoryItineraryStore;
    use std::sync::Mutex;

    struct FixedAttractions {
        attractions: Vec<AttractionRecord>,
        requested_limits: Mutex<Vec<usize>>,
    }

    #[async_trait]
    impl AttractionSource for FixedAttractions {
        async fn top_attractions(&self, _destination_id: i64, limit: usize) -> Result<Vec<AttractionRecord>> {
            self.requested_limits.lock().unwrap().push(limit);
            Ok(self.attractions.iter().take(limit).cloned().collect())
        }
    }

    struct FixedHotels {
        hotels: Vec<NearbyHotel>,
        queried_points: Mutex<Vec<Coordinates>>,
    }

    #[async_trait]
    impl HotelLocator for FixedHotels {
        async fn hotels_near(
            &self,
            _destination_id: i64,
            point: Coordinates,
            _max_distance_km: f64,
            _limit: usize,
        ) -> Result<Vec<NearbyHotel>> {
            self.queried_points.lock().unwrap().push(point);
            Ok(self.hotels.clone())
        }
    }

    fn hotel(id: i64) -> NearbyHotel {
        NearbyHotel {
            hotel: HotelRecord {
                id,
                name: format!("Hotel {id}"),
                description: None,
                address: String::new(),
                latitude: 0.0,
                longitude: 0.0,
                rating: 4.0,
                price_per_night: None,
                amenities: Vec::new(),
                has_restaurant: false,
                has_pool: false,
                has_spa: false,
                has_gym: false,
                has_free_wifi: true,
            },
            distance_km: id as f64 / 10.0,
        }
    }

    fn attractions() -> Vec<AttractionRecord> {
        vec![
            AttractionRecord::new(1, "Louvre", 48.8606, 2.3376).with_rating(4.8),
            AttractionRecord::new(2, "Musee d'Orsay", 48.8600, 2.3266).with_rating(4.7),
            AttractionRecord::new(3, "Sacre-Coeur", 48.8867, 2.3431).with_rating(4.6),
            AttractionRecord::new(4, "Montmartre", 48.8860, 2.3400).with_rating(4.4),
        ]
    }

    struct Fixture {
        planner: TripPlanner,
        source: Arc<FixedAttractions>,
        hotels: Arc<FixedHotels>,
    }

    fn fixture(hotels: Vec<NearbyHotel>) -> Fixture {
        let source = Arc::new(FixedAttractions {
            attractions: attractions(),
            requested_limits: Mutex::new(Vec::new()),
        });
        let locator = Arc::new(FixedHotels {
            hotels,
            queried_points: Mutex::new(Vec::new()),
        });
        let planner = TripPlanner::new(
            &TripPlanConfig::default(),
            source.clone(),
            locator.clone(),
            Arc::new(MemoryItineraryStore::new()),
        )
        .unwrap();
        Fixture {
            planner,
            source,
            hotels: locator,
        }
    }

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 10).unwrap()
    }

    #[tokio::test]
    async fn test_plan_fetches_top_attractions_when_none_supplied() {
        let fixture = fixture(vec![hotel(7), hotel(8)]);
        let saved = fixture.planner.plan(PlanningRequest::new(1, 2, start())).await.unwrap();

        assert_eq!(*fixture.source.requested_limits.lock().unwrap(), vec![6]);
        assert_eq!(saved.id, 1);
        assert_eq!(saved.itinerary.days.len(), 2);
        assert_eq!(saved.itinerary.hotel_id, Some(7));
    }

    #[tokio::test]
    async fn test_plan_searches_hotels_around_the_centroid() {
        let fixture = fixture(vec![hotel(3)]);
        fixture.planner.plan(PlanningRequest::new(1, 2, start())).await.unwrap();

        let points = fixture.hotels.queried_points.lock().unwrap().clone();
        assert_eq!(points.len(), 1);
        let expected = GeoClusterer::find_central_point(&attractions()).unwrap();
        assert!((points[0].latitude - expected.latitude).abs() < 1e-12);
        assert!((points[0].longitude - expected.longitude).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_explicit_hotel_skips_lookup() {
        let fixture = fixture(vec![hotel(3)]);
        let mut request = PlanningRequest::new(1, 1, start());
        request.hotel_id = Some(42);
        let saved = fixture.planner.plan(request).await.unwrap();

        assert_eq!(saved.itinerary.hotel_id, Some(42));
        assert!(fixture.hotels.queried_points.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_hotel_in_range_leaves_hotel_unset() {
        let fixture = fixture(Vec::new());
        let saved = fixture.planner.plan(PlanningRequest::new(1, 1, start())).await.unwrap();
        assert_eq!(saved.itinerary.hotel_id, None);
    }

    #[tokio::test]
    async fn test_supplied_attractions_are_used() {
        let fixture = fixture(Vec::new());
        let mut request = PlanningRequest::new(1, 1, start());
        request.attractions = Some(vec![AttractionRecord::new(50, "Custom", 48.85, 2.35)]);
        let saved = fixture.planner.plan(request).await.unwrap();

        assert!(fixture.source.requested_limits.lock().unwrap().is_empty());
        assert_eq!(saved.itinerary.days[0].visited_attraction_ids(), vec![50]);
    }

    #[tokio::test]
    async fn test_num_days_is_bounded() {
        let fixture = fixture(Vec::new());
        for days in [0, 15] {
            let err = fixture
                .planner
                .plan(PlanningRequest::new(1, days, start()))
                .await
                .unwrap_err();
            assert!(matches!(err, TripPlanError::InvalidInput { .. }));
        }
    }

    #[tokio::test]
    async fn test_planned_itinerary_can_be_read_back() {
        let fixture = fixture(vec![hotel(1)]);
        let saved = fixture.planner.plan(PlanningRequest::new(1, 3, start())).await.unwrap();
        let loaded = fixture.planner.get(saved.id).await.unwrap();
        assert_eq!(loaded, saved.itinerary);

        let missing = fixture.planner.get(999).await.unwrap_err();
        assert!(matches!(missing, TripPlanError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn test_supplied_attractions_with_bad_coordinates_are_rejected() {
        let fixture = fixture(Vec::new());
        let mut request = PlanningRequest::new(1, 2, start());
        request.attractions = Some(vec![
            AttractionRecord::new(1, "Harbour", 0.0, 0.0),
            AttractionRecord::new(2, "Nowhere", 1e200, 0.0),
        ]);

        let err = fixture.planner.plan(request).await.unwrap_err();
        assert!(matches!(err, TripPlanError::InvalidInput { .. }));
        assert!(err.to_string().contains("Nowhere"));
    }

    #[test]
    fn test_invalid_schedule_is_rejected_at_construction() {
        let mut config = TripPlanConfig::default();
        config.schedule.day_start_hour = 22;
        config.schedule.day_end_hour = 26;
        let store = Arc::new(MemoryItineraryStore::new());
        let source = Arc::new(FixedAttractions {
            attractions: Vec::new(),
            requested_limits: Mutex::new(Vec::new()),
        });
        let hotels = Arc::new(FixedHotels {
            hotels: Vec::new(),
            queried_points: Mutex::new(Vec::new()),
        });

        let result = TripPlanner::new(&config, source, hotels, store);
        assert!(matches!(result, Err(TripPlanError::Config { .. })));
    }
}
