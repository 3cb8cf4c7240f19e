//! Estate SDK client for the REST API.

use anyhow::Result;
use estate_core::{CreateEstateRequest, DronePlan, EstateStats, PlantTreeRequest};
use serde::Deserialize;
use uuid::Uuid;

/// Client for talking to the estate server.
#[derive(Clone)]
pub struct EstateClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct IdResponse {
    id: Uuid,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    error: String,
}

/// Non-success response from the server.
#[derive(Debug, thiserror::Error)]
#[error("server returned {status}: {message}")]
pub struct ServerError {
    pub status: u16,
    pub code: Option<String>,
    pub message: String,
}

impl ServerError {
    fn from_body(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) => Self {
                status,
                code: parsed.code,
                message: parsed.error,
            },
            Err(_) => Self {
                status,
                code: None,
                message: body.trim().to_string(),
            },
        }
    }
}

impl EstateClient {
    /// Create a new estate client.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create an estate and return its id.
    pub async fn create_estate(&self, width: i64, length: i64) -> Result<Uuid> {
        let url = format!("{}/estate", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&CreateEstateRequest { width, length })
            .send()
            .await?;
        let created: IdResponse = Self::parse(response).await?;
        tracing::debug!("Created estate {}", created.id);
        Ok(created.id)
    }

    /// Plant a tree and return the plot id.
    pub async fn plant_tree(&self, estate_id: Uuid, x: i64, y: i64, height: i64) -> Result<Uuid> {
        let url = format!("{}/estate/{}/tree", self.base_url, estate_id);
        let response = self
            .client
            .post(&url)
            .json(&PlantTreeRequest { x, y, height })
            .send()
            .await?;
        let planted: IdResponse = Self::parse(response).await?;
        Ok(planted.id)
    }

    pub async fn stats(&self, estate_id: Uuid) -> Result<EstateStats> {
        let url = format!("{}/estate/{}/stats", self.base_url, estate_id);
        let response = self.client.get(&url).send().await?;
        Self::parse(response).await
    }

    /// Fetch the drone plan, with a rest point when `max_distance` is given.
    pub async fn drone_plan(&self, estate_id: Uuid, max_distance: Option<i64>) -> Result<DronePlan> {
        let url = format!("{}/estate/{}/drone-plan", self.base_url, estate_id);
        let mut request = self.client.get(&url);
        if let Some(max_distance) = max_distance {
            request = request.query(&[("max_distance", max_distance)]);
        }
        let response = request.send().await?;
        Self::parse(response).await
    }

    async fn parse<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServerError::from_body(status.as_u16(), &body).into());
        }
        Ok(response.json().await?)
    }
}
