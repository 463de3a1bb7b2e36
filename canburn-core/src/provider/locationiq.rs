use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::{
    model::GeocodeCandidate,
    provider::{ProviderId, parse_places, truncate_body},
};

use super::GeocodeProvider;

/// LocationIQ forward geocoding (`/v1/search`).
#[derive(Debug, Clone)]
pub struct LocationIqProvider {
    base_url: String,
    api_key: String,
    http: Client,
}

impl LocationIqProvider {
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build LocationIQ HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            http,
        })
    }
}

#[async_trait]
impl GeocodeProvider for LocationIqProvider {
    fn id(&self) -> ProviderId {
        ProviderId::LocationIq
    }

    async fn geocode(&self, query: &str) -> Result<Vec<GeocodeCandidate>> {
        let url = format!("{}/v1/search", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", query),
                ("format", "json"),
                ("addressdetails", "1"),
                ("limit", "5"),
            ])
            .send()
            .await
            .context("Failed to send request to LocationIQ")?;

        let status = res.status();
        let body = res.text().await.context("Failed to read LocationIQ response body")?;

        // LocationIQ answers "Unable to geocode" with a 404.
        if status == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }

        if !status.is_success() {
            return Err(anyhow!(
                "LocationIQ request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        parse_places(&body).context("Failed to parse LocationIQ JSON")
    }
}
