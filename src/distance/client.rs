use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::error::LookupError;
use super::types::Distance;
use crate::config::MapsConfig;
use crate::credentials::ApiKey;

pub const DISTANCE_MATRIX_URL: &str = "https://maps.googleapis.com/maps/api/distancematrix/json";

/// A service that can tell how far apart two addresses are.
///
/// Implementations report every failure as a [`LookupError`]; retrying and
/// caching are the caller's concern.
#[async_trait]
pub trait DistanceProvider: Send + Sync {
    async fn fetch(
        &self,
        origin: &str,
        destination: &str,
        key: &ApiKey,
    ) -> Result<Distance, LookupError>;
}

/// Thin HTTP client for a Google Distance Matrix compatible endpoint.
#[derive(Debug, Clone)]
pub struct DistanceMatrixClient {
    client: reqwest::Client,
    endpoint: String,
    language: String,
    units: String,
}

impl DistanceMatrixClient {
    pub fn new(endpoint: &str, language: &str, units: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create distance matrix HTTP client")?;
        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            language: language.to_string(),
            units: units.to_string(),
        })
    }

    pub fn from_config(config: &MapsConfig) -> Result<Self> {
        Self::new(
            &config.endpoint,
            &config.language,
            &config.units,
            config.timeout,
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl DistanceProvider for DistanceMatrixClient {
    async fn fetch(
        &self,
        origin: &str,
        destination: &str,
        key: &ApiKey,
    ) -> Result<Distance, LookupError> {
        debug!(origin, destination, "Requesting distance matrix");

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("origins", origin),
                ("destinations", destination),
                ("key", key.expose()),
                ("language", self.language.as_str()),
                ("units", self.units.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::HttpStatus(status.as_u16()));
        }

        let parsed: MatrixResponse = response.json().await?;
        parse_matrix_response(parsed)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct MatrixResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    rows: Vec<MatrixRow>,
}

#[derive(Debug, Deserialize)]
struct MatrixRow {
    #[serde(default)]
    elements: Vec<MatrixElement>,
}

#[derive(Debug, Deserialize)]
struct MatrixElement {
    status: String,
    distance: Option<MatrixValue>,
    duration: Option<MatrixValue>,
}

#[derive(Debug, Deserialize)]
struct MatrixValue {
    value: u64,
}

/// Extract the single origin/destination element from a matrix response.
pub(crate) fn parse_matrix_response(response: MatrixResponse) -> Result<Distance, LookupError> {
    if response.status != "OK" {
        return Err(LookupError::ApiStatus {
            status: response.status,
            message: response.error_message,
        });
    }

    let element = response
        .rows
        .into_iter()
        .next()
        .and_then(|row| row.elements.into_iter().next())
        .ok_or_else(|| LookupError::Malformed("response has no matrix element".to_string()))?;

    if element.status != "OK" {
        return Err(LookupError::RouteStatus(element.status));
    }

    match (element.distance, element.duration) {
        (Some(distance), Some(duration)) => Ok(Distance::new(distance.value, duration.value)),
        _ => Err(LookupError::Malformed(
            "element is missing distance or duration".to_string(),
        )),
    }
}
