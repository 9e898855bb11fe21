//! Configuration management for `TripPlan`
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings. The scheduling
//! and clustering sections are passed explicitly into the planning core;
//! nothing here is process-wide state.

use crate::TripPlanError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for `TripPlan`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TripPlanConfig {
    /// Day schedule parameters
    pub schedule: ScheduleConfig,
    /// Geographic clustering parameters
    pub clustering: ClusteringConfig,
    /// Hotel proximity search
    pub hotels: HotelSearchConfig,
    /// Planning request handling
    pub planning: PlanningConfig,
    /// Itinerary persistence
    pub storage: StorageConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Clock bounds, meal lengths and travel assumptions for one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Hour the day starts (breakfast is anchored here)
    pub day_start_hour: u32,
    /// No activity may end after this hour
    pub day_end_hour: u32,
    /// Breakfast length in minutes
    pub breakfast_minutes: u32,
    /// Lunch length in minutes
    pub lunch_minutes: u32,
    /// Dinner length in minutes
    pub dinner_minutes: u32,
    /// Average urban travel speed used for transfer estimates
    pub travel_speed_kmh: f64,
    /// Lower bound for any transfer leg in minutes
    pub min_travel_minutes: u32,
}

/// K-means parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    /// Seed for centroid initialisation
    pub seed: u64,
    /// Upper bound on Lloyd iterations
    pub max_iterations: u32,
}

/// Hotel proximity search settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotelSearchConfig {
    /// Search radius around the attraction centroid in kilometers
    pub max_distance_km: f64,
    /// Maximum number of hotels to consider
    pub limit: usize,
}

/// Planning request settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningConfig {
    /// Attractions fetched per trip day when the caller supplies none
    pub attractions_per_day: usize,
    /// Longest trip accepted by the planner
    pub max_days: u32,
}

/// Itinerary storage settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory of the itinerary database
    pub location: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

// Default value functions
fn default_day_start_hour() -> u32 {
    9
}

fn default_day_end_hour() -> u32 {
    21
}

fn default_breakfast_minutes() -> u32 {
    60
}

fn default_lunch_minutes() -> u32 {
    60
}

fn default_dinner_minutes() -> u32 {
    90
}

fn default_travel_speed_kmh() -> f64 {
    50.0
}

fn default_min_travel_minutes() -> u32 {
    5
}

fn default_seed() -> u64 {
    42
}

fn default_max_iterations() -> u32 {
    300
}

fn default_hotel_distance_km() -> f64 {
    5.0
}

fn default_hotel_limit() -> usize {
    5
}

fn default_attractions_per_day() -> usize {
    3
}

fn default_max_days() -> u32 {
    14
}

fn default_storage_location() -> String {
    "~/.cache/tripplan/itineraries".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            day_start_hour: default_day_start_hour(),
            day_end_hour: default_day_end_hour(),
            breakfast_minutes: default_breakfast_minutes(),
            lunch_minutes: default_lunch_minutes(),
            dinner_minutes: default_dinner_minutes(),
            travel_speed_kmh: default_travel_speed_kmh(),
            min_travel_minutes: default_min_travel_minutes(),
        }
    }
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            max_iterations: default_max_iterations(),
        }
    }
}

impl Default for HotelSearchConfig {
    fn default() -> Self {
        Self {
            max_distance_km: default_hotel_distance_km(),
            limit: default_hotel_limit(),
        }
    }
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            attractions_per_day: default_attractions_per_day(),
            max_days: default_max_days(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            location: default_storage_location(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl ScheduleConfig {
    /// Day start as minutes after midnight
    #[must_use]
    pub fn day_start_minute(&self) -> u32 {
        self.day_start_hour * 60
    }

    /// Day end as minutes after midnight
    #[must_use]
    pub fn day_end_minute(&self) -> u32 {
        self.day_end_hour * 60
    }

    /// Check that the day window, meal durations and travel parameters are usable
    pub fn validate(&self) -> crate::Result<()> {
        if self.day_end_hour > 23 {
            return Err(TripPlanError::config("Day end hour cannot exceed 23"));
        }

        if self.day_start_hour >= self.day_end_hour {
            return Err(TripPlanError::config(format!(
                "Day start hour ({}) must be before day end hour ({})",
                self.day_start_hour, self.day_end_hour
            )));
        }

        if self.breakfast_minutes > self.day_end_minute() - self.day_start_minute() {
            return Err(TripPlanError::config(
                "Breakfast does not fit between day start and day end",
            ));
        }

        for (name, minutes) in [("Lunch", self.lunch_minutes), ("Dinner", self.dinner_minutes)] {
            if minutes > 240 {
                return Err(TripPlanError::config(format!(
                    "{name} duration cannot exceed 240 minutes"
                )));
            }
        }

        if !self.travel_speed_kmh.is_finite()
            || self.travel_speed_kmh <= 0.0
            || self.travel_speed_kmh > 300.0
        {
            return Err(TripPlanError::config(
                "Travel speed must be a positive number of at most 300 km/h",
            ));
        }

        if self.min_travel_minutes > 120 {
            return Err(TripPlanError::config(
                "Minimum travel time cannot exceed 120 minutes",
            ));
        }

        Ok(())
    }
}

impl StorageConfig {
    /// Storage directory with a leading `~/` expanded to the home directory
    #[must_use]
    pub fn resolved_location(&self) -> PathBuf {
        match self.location.strip_prefix("~/") {
            Some(rest) => dirs::home_dir()
                .map(|home| home.join(rest))
                .unwrap_or_else(|| PathBuf::from(rest)),
            None => PathBuf::from(&self.location),
        }
    }
}

impl TripPlanConfig {
    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // TRIPPLAN_SCHEDULE__DAY_END_HOUR=20
        builder = builder.add_source(
            Environment::with_prefix("TRIPPLAN")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: TripPlanConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tripplan").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.schedule.breakfast_minutes == 0 {
            self.schedule.breakfast_minutes = default_breakfast_minutes();
        }
        if self.schedule.lunch_minutes == 0 {
            self.schedule.lunch_minutes = default_lunch_minutes();
        }
        if self.schedule.dinner_minutes == 0 {
            self.schedule.dinner_minutes = default_dinner_minutes();
        }
        if self.schedule.travel_speed_kmh == 0.0 {
            self.schedule.travel_speed_kmh = default_travel_speed_kmh();
        }
        if self.schedule.min_travel_minutes == 0 {
            self.schedule.min_travel_minutes = default_min_travel_minutes();
        }
        if self.clustering.max_iterations == 0 {
            self.clustering.max_iterations = default_max_iterations();
        }
        if self.hotels.max_distance_km == 0.0 {
            self.hotels.max_distance_km = default_hotel_distance_km();
        }
        if self.hotels.limit == 0 {
            self.hotels.limit = default_hotel_limit();
        }
        if self.planning.attractions_per_day == 0 {
            self.planning.attractions_per_day = default_attractions_per_day();
        }
        if self.planning.max_days == 0 {
            self.planning.max_days = default_max_days();
        }
        if self.storage.location.is_empty() {
            self.storage.location = default_storage_location();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.schedule.validate()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.clustering.max_iterations > 10_000 {
            return Err(TripPlanError::config("Clustering iterations cannot exceed 10000").into());
        }

        if !self.hotels.max_distance_km.is_finite() || self.hotels.max_distance_km < 0.0 {
            return Err(TripPlanError::config("Hotel search radius must be a non-negative number").into());
        }

        if self.hotels.max_distance_km > 500.0 {
            return Err(TripPlanError::config("Hotel search radius cannot exceed 500 km").into());
        }

        if self.planning.attractions_per_day > 50 {
            return Err(TripPlanError::config("Attractions per day cannot exceed 50").into());
        }

        if self.planning.max_days > 365 {
            return Err(TripPlanError::config("Maximum trip length cannot exceed 365 days").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TripPlanError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TripPlanError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        Ok(())
    }
}
