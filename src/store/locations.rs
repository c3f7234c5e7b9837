use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use std::sync::{Arc, Mutex};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::smaawa::models::coerce_f64;
use crate::store::KeyValueStore;

/// Storage key holding the JSON-encoded device-to-location mapping.
pub const LOCATIONS_KEY: &str = "smaawa_device_locations";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DeviceLocation {
    #[serde(default)]
    pub name: String,
    pub lat: f64,
    pub lng: f64,
}

/// Location form as submitted by the operator. Coordinates may be numbers
/// or numeric strings.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct LocationInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub lat: Option<serde_json::Value>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub lng: Option<serde_json::Value>,
}

impl LocationInput {
    /// Reject input before anything is persisted.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` if no device is selected or either
    /// coordinate is not a valid number.
    pub fn validate(self, device_id: &str) -> AppResult<DeviceLocation> {
        if device_id.trim().is_empty() {
            return Err(AppError::BadRequest("Please select a device".to_string()));
        }

        let lat = self.lat.as_ref().and_then(coerce_f64);
        let lng = self.lng.as_ref().and_then(coerce_f64);
        match (lat, lng) {
            (Some(lat), Some(lng))
                if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng) =>
            {
                Ok(DeviceLocation {
                    name: self.name.trim().to_string(),
                    lat,
                    lng,
                })
            }
            _ => Err(AppError::BadRequest(
                "Please enter valid latitude and longitude".to_string(),
            )),
        }
    }
}

/// Device pins, kept in memory and written through to a [`KeyValueStore`]
/// on every save. Backend writes run on the blocking thread pool.
pub struct LocationStore {
    backend: Arc<Mutex<Box<dyn KeyValueStore>>>,
    locations: BTreeMap<String, DeviceLocation>,
}

impl LocationStore {
    /// Read the saved mapping. A missing or unreadable blob starts an empty
    /// mapping; the next save overwrites it.
    #[must_use]
    pub fn load(backend: Box<dyn KeyValueStore>) -> Self {
        let locations = match backend.get(LOCATIONS_KEY) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(locations) => locations,
                Err(e) => {
                    tracing::error!(error = %e, "Error loading saved locations");
                    BTreeMap::new()
                }
            },
            Ok(None) => BTreeMap::new(),
            Err(e) => {
                tracing::error!(error = %e, "Error reading location store");
                BTreeMap::new()
            }
        };

        tracing::info!(count = locations.len(), "Loaded saved locations");
        Self {
            backend: Arc::new(Mutex::new(backend)),
            locations,
        }
    }

    #[must_use]
    pub fn get(&self, device_id: &str) -> Option<&DeviceLocation> {
        self.locations.get(device_id)
    }

    #[must_use]
    pub fn all(&self) -> &BTreeMap<String, DeviceLocation> {
        &self.locations
    }

    /// Validate and persist a pin for `device_id`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for invalid input and
    /// `AppError::Storage` if the mapping cannot be written. In both cases
    /// the in-memory mapping is unchanged.
    pub async fn save(
        &mut self,
        device_id: &str,
        input: LocationInput,
    ) -> AppResult<DeviceLocation> {
        let location = input.validate(device_id)?;

        let mut updated = self.locations.clone();
        updated.insert(device_id.to_string(), location.clone());

        let json = serde_json::to_string(&updated)
            .map_err(|e| AppError::Internal(e.to_string()))?;
        let backend = Arc::clone(&self.backend);
        tokio::task::spawn_blocking(move || {
            let mut backend = backend
                .lock()
                .map_err(|_| io::Error::other("location store lock poisoned"))?;
            backend.set(LOCATIONS_KEY, json)
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(|e| AppError::Storage(e.to_string()))?;

        self.locations = updated;
        tracing::info!(
            device_id,
            lat = location.lat,
            lng = location.lng,
            "Saved device location"
        );
        Ok(location)
    }
}
