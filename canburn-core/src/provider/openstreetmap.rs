use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;

use crate::{
    model::GeocodeCandidate,
    provider::{ProviderId, parse_places, truncate_body},
};

use super::GeocodeProvider;

/// OpenStreetMap Nominatim search. Keyless, but the usage policy requires
/// an identifying User-Agent.
#[derive(Debug, Clone)]
pub struct OpenStreetMapProvider {
    base_url: String,
    http: Client,
}

impl OpenStreetMapProvider {
    pub fn new(base_url: String, user_agent: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .context("Failed to build Nominatim HTTP client")?;

        Ok(Self { base_url: base_url.trim_end_matches('/').to_string(), http })
    }
}

#[async_trait]
impl GeocodeProvider for OpenStreetMapProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenStreetMap
    }

    async fn geocode(&self, query: &str) -> Result<Vec<GeocodeCandidate>> {
        let url = format!("{}/search", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[("q", query), ("format", "json"), ("addressdetails", "1"), ("limit", "5")])
            .send()
            .await
            .context("Failed to send request to Nominatim")?;

        let status = res.status();
        let body = res.text().await.context("Failed to read Nominatim response body")?;

        if !status.is_success() {
            return Err(anyhow::anyhow!(
                "Nominatim request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        parse_places(&body).context("Failed to parse Nominatim JSON")
    }
}
