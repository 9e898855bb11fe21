//! Itinerary persistence
//!
//! Two [`ItineraryStore`] implementations: an in-process map for tests and
//! one-off runs, and a fjall keyspace that survives restarts. Identifiers are
//! assigned sequentially starting at 1.

use crate::models::Itinerary;
use crate::planner::ItineraryStore;
use crate::{Result, TripPlanError};
use async_trait::async_trait;
use fjall::Keyspace;
use std::collections::BTreeMap;
use std::path::Path;
use tokio::sync::{Mutex, RwLock};
use tokio::task;

const SEQUENCE_KEY: &[u8] = b"meta:next_id";

fn item_key(id: u64) -> Vec<u8> {
    // zero padded so keys sort numerically
    format!("itinerary:{id:020}").into_bytes()
}

fn storage_error(context: &str, err: impl std::fmt::Display) -> TripPlanError {
    TripPlanError::storage(format!("{context}: {err}"))
}

/// Keeps itineraries in memory for the lifetime of the process
#[derive(Debug, Default)]
pub struct MemoryItineraryStore {
    items: RwLock<BTreeMap<u64, Itinerary>>,
}

impl MemoryItineraryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ItineraryStore for MemoryItineraryStore {
    async fn save(&self, itinerary: &Itinerary) -> Result<u64> {
        let mut items = self.items.write().await;
        let id = items.keys().next_back().map_or(1, |last| last + 1);
        items.insert(id, itinerary.clone());
        Ok(id)
    }

    async fn get(&self, id: u64) -> Result<Option<Itinerary>> {
        Ok(self.items.read().await.get(&id).cloned())
    }
}

fn get_from_store(store: &Keyspace, key: &[u8]) -> Result<Option<Vec<u8>>> {
    Ok(store
        .get(key)
        .map_err(|e| storage_error("Read failed", e))?
        .map(|v| v.to_vec()))
}

/// Persists itineraries in a fjall keyspace, encoded with postcard
pub struct FjallItineraryStore {
    store: Keyspace,
    // serializes id allocation
    write_lock: Mutex<()>,
}

impl FjallItineraryStore {
    /// Open or create the store, creating `path` if needed
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        std::fs::create_dir_all(path.as_ref())?;
        let db = fjall::Database::builder(&path)
            .open()
            .map_err(|e| storage_error("Failed to open itinerary store", e))?;
        let items = db
            .keyspace("itineraries", fjall::KeyspaceCreateOptions::default)
            .map_err(|e| storage_error("Failed to open itinerary keyspace", e))?;
        tracing::info!(path = %path.as_ref().display(), "Opened itinerary store");
        Ok(Self {
            store: items,
            write_lock: Mutex::new(()),
        })
    }
}

#[async_trait]
impl ItineraryStore for FjallItineraryStore {
    #[tracing::instrument(name = "save_itinerary", level = "debug", skip_all)]
    async fn save(&self, itinerary: &Itinerary) -> Result<u64> {
        let bytes = postcard::to_stdvec(itinerary).map_err(|e| storage_error("Encoding failed", e))?;
        let _guard = self.write_lock.lock().await;
        let store = self.store.clone();

        let id = task::spawn_blocking(move || -> Result<u64> {
            let id = match get_from_store(&store, SEQUENCE_KEY)? {
                Some(raw) => {
                    let raw: [u8; 8] = raw
                        .as_slice()
                        .try_into()
                        .map_err(|_| TripPlanError::storage("Corrupt id sequence"))?;
                    u64::from_be_bytes(raw)
                }
                None => 1,
            };
            store
                .insert(item_key(id), bytes)
                .map_err(|e| storage_error("Write failed", e))?;
            store
                .insert(SEQUENCE_KEY.to_vec(), (id + 1).to_be_bytes().to_vec())
                .map_err(|e| storage_error("Write failed", e))?;
            Ok(id)
        })
        .await
        .map_err(|e| storage_error("Storage task failed", e))??;

        tracing::debug!(id, "Stored itinerary");
        Ok(id)
    }

    #[tracing::instrument(name = "load_itinerary", level = "debug", skip(self))]
    async fn get(&self, id: u64) -> Result<Option<Itinerary>> {
        let store = self.store.clone();
        let maybe_bytes = task::spawn_blocking(move || get_from_store(&store, &item_key(id)))
            .await
            .map_err(|e| storage_error("Storage task failed", e))??;

        match maybe_bytes {
            Some(bytes) => {
                let itinerary = postcard::from_bytes(&bytes).map_err(|e| storage_error("Decoding failed", e))?;
                Ok(Some(itinerary))
            }
            None => {
                tracing::debug!("Itinerary not found");
                Ok(None)
            }
        }
    }
}
