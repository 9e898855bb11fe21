//! Geographic clustering of attractions into day-sized groups
//!
//! Runs Lloyd's k-means directly on raw (latitude, longitude) degrees.
//! Euclidean distance in degree space ignores Earth curvature; that is an
//! accepted approximation at city scale and changing it would change cluster
//! shapes. Centroids are seeded with k-means++ from a fixed seed so identical
//! input always yields identical groups.

use crate::config::ClusteringConfig;
use crate::models::{AttractionRecord, Coordinates};
use crate::{Result, TripPlanError};
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Cluster id (0-based, contiguous) to the attractions assigned to it, in
/// input order
pub type ClusterMap = BTreeMap<usize, Vec<AttractionRecord>>;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Point {
    lat: f64,
    lon: f64,
}

impl Point {
    fn squared_distance(&self, other: &Point) -> f64 {
        let d_lat = self.lat - other.lat;
        let d_lon = self.lon - other.lon;
        d_lat * d_lat + d_lon * d_lon
    }
}

/// Partitions attractions into geographic groups, one per trip day
#[derive(Debug, Clone)]
pub struct GeoClusterer {
    seed: u64,
    max_iterations: u32,
}

impl Default for GeoClusterer {
    fn default() -> Self {
        Self::from_config(&ClusteringConfig::default())
    }
}

impl GeoClusterer {
    #[must_use]
    pub fn new(seed: u64, max_iterations: u32) -> Self {
        Self {
            seed,
            max_iterations: max_iterations.max(1),
        }
    }

    #[must_use]
    pub fn from_config(config: &ClusteringConfig) -> Self {
        Self::new(config.seed, config.max_iterations)
    }

    /// Group `attractions` into at most `num_clusters` clusters.
    ///
    /// An empty list gives an empty map. `num_clusters` is clamped into
    /// `1..=attractions.len()`; this never fails.
    #[instrument(level = "debug", skip(self, attractions), fields(attractions = attractions.len()))]
    pub fn cluster_attractions(&self, attractions: &[AttractionRecord], num_clusters: usize) -> ClusterMap {
        if attractions.is_empty() {
            return ClusterMap::new();
        }

        let k = num_clusters.clamp(1, attractions.len());
        let points: Vec<Point> = attractions
            .iter()
            .map(|a| Point {
                lat: a.latitude,
                lon: a.longitude,
            })
            .collect();

        let labels = self.lloyd(&points, k);

        // Compact labels so empty clusters leave no gaps in the ids
        let mut remap: BTreeMap<usize, usize> = BTreeMap::new();
        for &label in &labels {
            remap.entry(label).or_insert(0);
        }
        for (new_id, slot) in remap.values_mut().enumerate() {
            *slot = new_id;
        }

        let mut clusters = ClusterMap::new();
        for (attraction, label) in attractions.iter().zip(&labels) {
            clusters
                .entry(remap[label])
                .or_insert_with(Vec::new)
                .push(attraction.clone());
        }

        debug!(requested = num_clusters, k, produced = clusters.len(), "Clustered attractions");
        clusters
    }

    /// Arithmetic mean of all latitudes and longitudes
    pub fn find_central_point(attractions: &[AttractionRecord]) -> Result<Coordinates> {
        if attractions.is_empty() {
            return Err(TripPlanError::invalid_input(
                "Cannot find central point for empty attraction list",
            ));
        }

        let count = attractions.len() as f64;
        let (lat_sum, lon_sum) = attractions
            .iter()
            .fold((0.0, 0.0), |(lat, lon), a| (lat + a.latitude, lon + a.longitude));

        Ok(Coordinates::new(lat_sum / count, lon_sum / count))
    }

    fn lloyd(&self, points: &[Point], k: usize) -> Vec<usize> {
        let mut centroids = self.initial_centroids(points, k);
        let mut labels = vec![usize::MAX; points.len()];

        for iteration in 0..self.max_iterations {
            let mut changed = false;
            for (label, point) in labels.iter_mut().zip(points) {
                let nearest = nearest_centroid(point, &centroids);
                if *label != nearest {
                    *label = nearest;
                    changed = true;
                }
            }

            if !changed {
                debug!(iteration, "k-means converged");
                break;
            }

            let mut sums = vec![(0.0, 0.0, 0usize); k];
            for (label, point) in labels.iter().zip(points) {
                let entry = &mut sums[*label];
                entry.0 += point.lat;
                entry.1 += point.lon;
                entry.2 += 1;
            }
            for (centroid, (lat, lon, count)) in centroids.iter_mut().zip(sums) {
                // empty clusters keep their previous centroid
                if count > 0 {
                    *centroid = Point {
                        lat: lat / count as f64,
                        lon: lon / count as f64,
                    };
                }
            }
        }

        labels
    }

    /// k-means++ seeding from the fixed seed
    fn initial_centroids(&self, points: &[Point], k: usize) -> Vec<Point> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut chosen = vec![rng.random_range(0..points.len())];

        while chosen.len() < k {
            let weights: Vec<f64> = points
                .iter()
                .map(|p| {
                    chosen
                        .iter()
                        .map(|&c| p.squared_distance(&points[c]))
                        .fold(f64::INFINITY, f64::min)
                })
                .collect();
            let total: f64 = weights.iter().sum();

            let next = if total.is_finite() && total > 0.0 {
                let target = rng.random_range(0.0..total);
                let mut cumulative = 0.0;
                weights
                    .iter()
                    .position(|w| {
                        cumulative += w;
                        cumulative > target
                    })
                    .or_else(|| weights.iter().rposition(|w| *w > 0.0))
                    .unwrap_or(0)
            } else {
                // every point coincides with a centroid already, or the
                // coordinates are too large to weigh
                (0..points.len())
                    .find(|i| !chosen.contains(i))
                    .unwrap_or(0)
            };
            chosen.push(next);
        }

        chosen.into_iter().map(|i| points[i]).collect()
    }
}

fn nearest_centroid(point: &Point, centroids: &[Point]) -> usize {
    let mut best = 0;
    let mut best_distance = f64::INFINITY;
    for (index, centroid) in centroids.iter().enumerate() {
        let distance = point.squared_distance(centroid);
        if distance < best_distance {
            best = index;
            best_distance = distance;
        }
    }
    best
}
