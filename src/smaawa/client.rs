use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::smaawa::models::{DevicesResponse, HistoryResponse, LatestResponse, SampleRecord};

/// Read-only client for the SMAAWA data API.
///
/// Every call hits the same endpoint, selecting the operation through the
/// `action` query parameter.
pub struct SmaawaClient {
    http_client: Client,
    base_url: String,
}

impl SmaawaClient {
    /// # Errors
    ///
    /// Returns `AppError::Internal` if the HTTP client cannot be built.
    pub fn new(config: &Config) -> AppResult<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.upstream_timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http_client = builder
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url: config.api_base_url.clone(),
        })
    }

    /// List all devices known to the API.
    ///
    /// # Errors
    ///
    /// Returns `AppError::UpstreamApi` if the request fails or returns an error status.
    pub async fn get_devices(&self) -> AppResult<DevicesResponse> {
        self.fetch(&[("action", "devices".to_string())]).await
    }

    /// Latest single reading for a device.
    ///
    /// # Errors
    ///
    /// Returns `AppError::UpstreamApi` if the request fails or returns an error status.
    pub async fn get_latest(&self, device_id: &str) -> AppResult<SampleRecord> {
        let response: LatestResponse = self
            .fetch(&[
                ("action", "latest".to_string()),
                ("deviceID", device_id.to_string()),
            ])
            .await?;
        Ok(response.into_record())
    }

    /// Raw readings from the last `hours`, at most `limit` records.
    ///
    /// # Errors
    ///
    /// Returns `AppError::UpstreamApi` if the request fails or returns an error status.
    pub async fn get_history(
        &self,
        device_id: &str,
        hours: u32,
        limit: u32,
    ) -> AppResult<Vec<SampleRecord>> {
        let response: HistoryResponse = self
            .fetch(&[
                ("action", "history".to_string()),
                ("deviceID", device_id.to_string()),
                ("hours", hours.to_string()),
                ("limit", limit.to_string()),
            ])
            .await?;
        Ok(response.into_records())
    }

    /// Hourly aggregates covering the last `days`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::UpstreamApi` if the request fails or returns an error status.
    pub async fn get_hourly_history(
        &self,
        device_id: &str,
        days: u32,
    ) -> AppResult<Vec<SampleRecord>> {
        let response: HistoryResponse = self
            .fetch(&[
                ("action", "hourly_history".to_string()),
                ("deviceID", device_id.to_string()),
                ("days", days.to_string()),
            ])
            .await?;
        Ok(response.into_records())
    }

    async fn fetch<T: DeserializeOwned>(&self, params: &[(&str, String)]) -> AppResult<T> {
        let response = self
            .http_client
            .get(&self.base_url)
            .query(params)
            .send()
            .await
            .map_err(|e| AppError::UpstreamApi(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::UpstreamApi(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| AppError::UpstreamApi(format!("Failed to get response text: {e}")))?;

        serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                body_preview = %text.chars().take(500).collect::<String>(),
                "Failed to parse SMAAWA response"
            );
            AppError::UpstreamApi(format!("Failed to parse response: {e}"))
        })
    }
}
