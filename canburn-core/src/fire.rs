//! Coordinates → burn status, backed by a burn-category feature service.

use std::{fmt::Debug, time::Duration};

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{error, info};

use crate::{
    config::FireServiceConfig,
    error::FireWatchError,
    model::{BurnCategoryRecord, Coordinates, FireStatus, FireWatchResult, Location, PublicCategory},
    provider::truncate_body,
};

const UNKNOWN: &str = "Unknown";

/// Validity window of every answer: a fixed 24 hours.
pub fn validity() -> chrono::Duration {
    chrono::Duration::days(1)
}

/// Total mapping from the upstream category code; unknown codes are open.
pub fn status_for_code(code: i64) -> FireStatus {
    match PublicCategory::from_code(code) {
        Some(PublicCategory::OutOfControl | PublicCategory::Contained) => FireStatus::NoBurn,
        Some(PublicCategory::UnderControl | PublicCategory::Patrolled) => {
            FireStatus::RestrictedBurn
        }
        Some(PublicCategory::Out) | None => FireStatus::OpenBurn,
    }
}

pub fn restrictions_for_code(code: i64) -> &'static [&'static str] {
    match PublicCategory::from_code(code) {
        Some(PublicCategory::OutOfControl) => &[
            "No burning permitted - active uncontrolled fires in area",
            "High fire danger conditions",
            "Contact local authorities before any outdoor activities",
        ],
        Some(PublicCategory::Contained) => &[
            "No burning permitted - active contained fires in area",
            "Fire crews actively working in area",
            "Elevated fire danger conditions",
        ],
        Some(PublicCategory::UnderControl) => &[
            "Restricted burning only",
            "Fires under control but still active",
            "Check local fire weather conditions",
            "Have suppression equipment ready",
        ],
        Some(PublicCategory::Patrolled) => &[
            "Restricted burning - area under fire patrol",
            "Monitor weather conditions closely",
            "Have suppression equipment ready",
            "Notify local fire department of burning activities",
        ],
        Some(PublicCategory::Out) | None => &[
            "Follow standard fire safety practices",
            "Check current fire weather conditions",
            "Obtain required permits",
            "Have suppression equipment available",
        ],
    }
}

/// The region served by the upstream and the authority answering for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Jurisdiction {
    pub region: String,
    pub authority: String,
    pub country: String,
}

impl From<&FireServiceConfig> for Jurisdiction {
    fn from(cfg: &FireServiceConfig) -> Self {
        Self {
            region: cfg.region.clone(),
            authority: cfg.authority.clone(),
            country: cfg.country.clone(),
        }
    }
}

impl Default for Jurisdiction {
    fn default() -> Self {
        Jurisdiction::from(&FireServiceConfig::default())
    }
}

#[async_trait]
pub trait BurnCategorySource: Send + Sync + Debug {
    /// The record covering `coords`, or `None` when no zone intersects it.
    async fn query(&self, coords: Coordinates) -> Result<Option<BurnCategoryRecord>>;
}

#[derive(Debug)]
pub struct FireStatusResolver {
    source: Box<dyn BurnCategorySource>,
    jurisdiction: Jurisdiction,
}

impl FireStatusResolver {
    pub fn new(source: Box<dyn BurnCategorySource>, jurisdiction: Jurisdiction) -> Self {
        Self { source, jurisdiction }
    }

    pub fn from_config(cfg: &FireServiceConfig) -> Result<Self> {
        let source = ArcGisFeatureService::new(
            cfg.base_url.clone(),
            &cfg.user_agent,
            Duration::from_secs(cfg.timeout_secs),
        )?;
        Ok(Self::new(Box::new(source), Jurisdiction::from(cfg)))
    }

    /// `coords` must already be range-validated.
    pub async fn resolve(&self, coords: Coordinates) -> Result<FireWatchResult, FireWatchError> {
        let record = self.source.query(coords).await.map_err(|e| {
            let detail = format!("{e:#}");
            error!(
                latitude = coords.latitude,
                longitude = coords.longitude,
                error = %detail,
                "burn category lookup failed"
            );
            FireWatchError::UpstreamUnavailable { detail }
        })?;

        Ok(match record {
            Some(record) => self.matched_response(record, coords),
            None => {
                info!(
                    latitude = coords.latitude,
                    longitude = coords.longitude,
                    "no burn category zone at point"
                );
                self.default_response(coords, Utc::now())
            }
        })
    }

    fn matched_response(&self, record: BurnCategoryRecord, coords: Coordinates) -> FireWatchResult {
        let j = &self.jurisdiction;

        FireWatchResult {
            status: status_for_code(record.public_category),
            valid_from: record.valid_date,
            valid_to: record.valid_date + validity(),
            location: Location {
                province: j.region.clone(),
                state: j.region.clone(),
                county: record.name,
                country: j.country.clone(),
            },
            coordinates: coords,
            jurisdiction: j.authority.clone(),
            restrictions: to_strings(restrictions_for_code(record.public_category)),
        }
    }

    /// Answer for points no zone covers: open, with advisory restrictions.
    pub fn default_response(&self, coords: Coordinates, now: DateTime<Utc>) -> FireWatchResult {
        let j = &self.jurisdiction;

        FireWatchResult {
            status: FireStatus::OpenBurn,
            valid_from: now,
            valid_to: now + validity(),
            location: Location {
                province: UNKNOWN.to_string(),
                state: UNKNOWN.to_string(),
                county: UNKNOWN.to_string(),
                country: j.country.clone(),
            },
            coordinates: coords,
            jurisdiction: format!("Outside {} jurisdiction", j.region),
            restrictions: vec![
                format!("Location outside {}", j.region),
                "Contact local fire authorities for burning restrictions".to_string(),
                "Follow provincial and municipal fire regulations".to_string(),
            ],
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// ArcGIS REST feature layer queried by point intersection.
#[derive(Debug, Clone)]
pub struct ArcGisFeatureService {
    layer_url: String,
    http: Client,
}

impl ArcGisFeatureService {
    pub fn new(layer_url: String, user_agent: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .context("Failed to build feature service HTTP client")?;

        Ok(Self { layer_url: layer_url.trim_end_matches('/').to_string(), http })
    }
}

#[async_trait]
impl BurnCategorySource for ArcGisFeatureService {
    async fn query(&self, coords: Coordinates) -> Result<Option<BurnCategoryRecord>> {
        let url = format!("{}/query", self.layer_url);
        // Esri point geometry is x,y: longitude first.
        let geometry = format!("{},{}", coords.longitude, coords.latitude);

        let res = self
            .http
            .get(&url)
            .query(&[
                ("geometry", geometry.as_str()),
                ("geometryType", "esriGeometryPoint"),
                ("spatialRel", "esriSpatialRelIntersects"),
                ("inSR", "4326"),
                ("outFields", "NAME,PUBLICCATEGORY,VALIDDATE"),
                ("f", "json"),
            ])
            .send()
            .await
            .context("Failed to send request to burn category service")?;

        let status = res.status();
        let body = res.text().await.context("Failed to read burn category response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "Burn category service responded with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: QueryResponse =
            serde_json::from_str(&body).context("Failed to parse burn category JSON")?;

        if let Some(err) = parsed.error {
            return Err(anyhow!("Burn category service error {}: {}", err.code, err.message));
        }

        parsed.features.into_iter().next().map(|f| f.attributes.into_record()).transpose()
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    features: Vec<Feature>,
    error: Option<ServiceError>,
}

#[derive(Debug, Deserialize)]
struct ServiceError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct Feature {
    attributes: Attributes,
}

#[derive(Debug, Deserialize)]
struct Attributes {
    #[serde(rename = "NAME")]
    name: Option<String>,
    #[serde(rename = "PUBLICCATEGORY")]
    public_category: Option<i64>,
    #[serde(rename = "VALIDDATE", default)]
    valid_date: serde_json::Value,
}

impl Attributes {
    fn into_record(self) -> Result<BurnCategoryRecord> {
        Ok(BurnCategoryRecord {
            name: self.name.unwrap_or_else(|| UNKNOWN.to_string()),
            public_category: self.public_category.unwrap_or(PublicCategory::Out as i64),
            valid_date: epoch_millis(&self.valid_date)?,
        })
    }
}

/// ArcGIS JSON encodes dates as milliseconds since the Unix epoch (UTC).
fn epoch_millis(value: &serde_json::Value) -> Result<DateTime<Utc>> {
    let millis = match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        serde_json::Value::String(s) => {
            s.trim().parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64)
        }
        _ => None,
    }
    .ok_or_else(|| anyhow!("VALIDDATE is not an epoch timestamp: {value}"))?;

    DateTime::<Utc>::from_timestamp_millis(millis)
        .ok_or_else(|| anyhow!("VALIDDATE out of range: {millis}"))
}
