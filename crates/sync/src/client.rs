use std::time::Duration;

use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::models::{ExternalHall, ExternalRoom, TimeSlotOccupancy};

#[derive(Debug, Clone)]
pub struct HallSourceConfig {
    pub base_url: String,
    pub token: String,
    pub timeout_secs: u64,
}

impl HallSourceConfig {
    /// Load remote-source config from environment.
    ///
    /// Returns `None` if the source is not configured (base URL or token
    /// missing); callers decide whether that is fatal.
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var("HALL_SOURCE_BASE_URL").ok()?;
        let token = std::env::var("HALL_SOURCE_TOKEN").ok()?;
        let timeout_secs = std::env::var("HALL_SOURCE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        Some(Self {
            base_url,
            token,
            timeout_secs,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HallSourceError {
    #[error("HTTP {status}: {body}")]
    HttpError { status: StatusCode, body: String },

    #[error("request failed: {0}")]
    RequestError(#[from] reqwest::Error),
}

/// Read-only client for the remote facility system. Stateless; one request
/// per call, no retries: a failed call is reported to the orchestrator as-is.
#[derive(Clone)]
pub struct HallSourceClient {
    client: Client,
    config: HallSourceConfig,
}

impl HallSourceClient {
    pub fn new(config: HallSourceConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    /// For testing: point the client at a specific base URL (e.g., wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.config.base_url = base_url.to_string();
        self
    }

    /// Fetch the full exam-hall list, rooms nested.
    pub async fn fetch_exam_halls(&self) -> Result<Vec<ExternalHall>, HallSourceError> {
        let url = format!("{}/exam-halls", self.config.base_url);
        self.get_json(&url).await
    }

    /// Fetch the room list for one hall.
    pub async fn fetch_hall_rooms(&self, hall_id: i64) -> Result<Vec<ExternalRoom>, HallSourceError> {
        let url = format!("{}/hall-rooms/{}", self.config.base_url, hall_id);
        self.get_json(&url).await
    }

    /// Fetch per-slot room occupancies for one exam date.
    pub async fn fetch_room_participants(
        &self,
        exam_date: NaiveDate,
    ) -> Result<Vec<TimeSlotOccupancy>, HallSourceError> {
        let url = format!(
            "{}/room-participants/{}",
            self.config.base_url,
            exam_date.format("%Y-%m-%d")
        );
        self.get_json(&url).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, HallSourceError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.config.token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HallSourceError::HttpError { status, body });
        }

        response.json::<T>().await.map_err(HallSourceError::from)
    }
}
