use crate::{
    Config, GeocodeCandidate,
    provider::{locationiq::LocationIqProvider, openstreetmap::OpenStreetMapProvider},
};
use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use std::{fmt::Debug, time::Duration};
use tracing::warn;

pub mod locationiq;
pub mod openstreetmap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    LocationIq,
    OpenStreetMap,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::LocationIq => "locationiq",
            ProviderId::OpenStreetMap => "openstreetmap",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::LocationIq, ProviderId::OpenStreetMap]
    }

    pub fn requires_api_key(&self) -> bool {
        matches!(self, ProviderId::LocationIq)
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "locationiq" => Ok(ProviderId::LocationIq),
            "openstreetmap" | "nominatim" => Ok(ProviderId::OpenStreetMap),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: locationiq, openstreetmap."
            )),
        }
    }
}

#[async_trait]
pub trait GeocodeProvider: Send + Sync + Debug {
    fn id(&self) -> ProviderId;

    /// Candidate matches, most relevant first. An empty list means "no match".
    async fn geocode(&self, query: &str) -> anyhow::Result<Vec<GeocodeCandidate>>;
}

/// Construct a provider from config and explicit ProviderId.
pub fn provider_from_config(
    id: ProviderId,
    config: &Config,
) -> anyhow::Result<Box<dyn GeocodeProvider>> {
    let geo = &config.geocoding;
    let timeout = Duration::from_secs(geo.timeout_secs);

    let boxed: Box<dyn GeocodeProvider> = match id {
        ProviderId::LocationIq => {
            let api_key = config.provider_api_key(id).ok_or_else(|| {
                anyhow::anyhow!(
                    "No API key configured for provider '{id}'.\n\
                     Hint: run `canburn configure {id}` or set LOCATIONIQ_API_KEY."
                )
            })?;
            Box::new(LocationIqProvider::new(
                geo.locationiq_base_url.clone(),
                api_key.to_owned(),
                timeout,
            )?)
        }
        ProviderId::OpenStreetMap => Box::new(OpenStreetMapProvider::new(
            geo.openstreetmap_base_url.clone(),
            &geo.user_agent,
            timeout,
        )?),
    };

    Ok(boxed)
}

/// Build every configured provider in order, skipping the ones that can't be built.
pub fn providers_from_config(config: &Config) -> anyhow::Result<Vec<Box<dyn GeocodeProvider>>> {
    let mut providers = Vec::new();

    for id in config.geocoder_order()? {
        match provider_from_config(id, config) {
            Ok(provider) => providers.push(provider),
            Err(e) => warn!(provider = %id, error = %e, "geocoding provider disabled"),
        }
    }

    Ok(providers)
}

/// Search result shape shared by LocationIQ and Nominatim.
#[derive(Debug, Deserialize)]
pub(crate) struct NominatimPlace {
    #[serde(default, deserialize_with = "lenient_f64")]
    lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    lon: Option<f64>,
    display_name: Option<String>,
    #[serde(default)]
    address: NominatimAddress,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    hamlet: Option<String>,
    state: Option<String>,
    country: Option<String>,
}

impl From<NominatimPlace> for GeocodeCandidate {
    fn from(place: NominatimPlace) -> Self {
        let NominatimAddress { city, town, village, hamlet, state, country } = place.address;

        GeocodeCandidate {
            latitude: place.lat,
            longitude: place.lon,
            formatted_address: place.display_name,
            country,
            city: city.or(town).or(village).or(hamlet),
            state,
        }
    }
}

pub(crate) fn parse_places(body: &str) -> anyhow::Result<Vec<GeocodeCandidate>> {
    let places: Vec<NominatimPlace> = serde_json::from_str(body)?;
    Ok(places.into_iter().map(GeocodeCandidate::from).collect())
}

/// Both providers send coordinates as decimal strings; accept numbers too.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    #[allow(dead_code)]
    enum Raw {
        Num(f64),
        Text(String),
        Other(serde::de::IgnoredAny),
    }

    let raw = Option::<Raw>::deserialize(deserializer)?;
    let value = match raw {
        Some(Raw::Num(n)) => Some(n),
        Some(Raw::Text(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(value.filter(|n| n.is_finite()))
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn provider_id_as_str_roundtrip() {
        for id in ProviderId::all() {
            let s = id.as_str();
            let parsed = ProviderId::try_from(s).expect("roundtrip should succeed");
            assert_eq!(*id, parsed);
        }
    }

    #[test]
    fn unknown_provider_error() {
        let err = ProviderId::try_from("doesnotexist").unwrap_err();
        assert!(err.to_string().contains("Unknown provider"));
    }

    #[test]
    fn provider_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = provider_from_config(ProviderId::LocationIq, &cfg).unwrap_err();
        assert!(err.to_string().contains("No API key configured for provider"));
    }

    #[test]
    fn providers_from_config_skips_unconfigured() {
        let cfg = Config::default();
        let providers = providers_from_config(&cfg).unwrap();
        let ids: Vec<_> = providers.iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec![ProviderId::OpenStreetMap]);
    }

    #[test]
    fn providers_from_config_keeps_order() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::LocationIq, "KEY".to_string());

        let providers = providers_from_config(&cfg).unwrap();
        let ids: Vec<_> = providers.iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec![ProviderId::LocationIq, ProviderId::OpenStreetMap]);
    }

    #[test]
    fn parses_string_and_numeric_coordinates() {
        let body = r#"[
            {"lat": "45.5017", "lon": "-73.5673", "display_name": "Montreal, QC, Canada",
             "address": {"city": "Montreal", "state": "Quebec", "country": "Canada"}},
            {"lat": 46.1, "lon": -64.8, "display_name": "Moncton"},
            {"lat": "n/a", "display_name": "Somewhere"}
        ]"#;

        let candidates = parse_places(body).unwrap();
        assert_eq!(candidates.len(), 3);

        assert_eq!(candidates[0].latitude, Some(45.5017));
        assert_eq!(candidates[0].longitude, Some(-73.5673));
        assert_eq!(candidates[0].city.as_deref(), Some("Montreal"));
        assert_eq!(candidates[0].state.as_deref(), Some("Quebec"));

        assert_eq!(candidates[1].latitude, Some(46.1));
        assert_eq!(candidates[1].country, None);

        assert_eq!(candidates[2].latitude, None);
        assert_eq!(candidates[2].longitude, None);
    }

    #[test]
    fn town_is_used_when_city_is_missing() {
        let body = r#"[{"lat":"45.0","lon":"-66.0","address":{"town":"Sussex"}}]"#;
        let candidates = parse_places(body).unwrap();
        assert_eq!(candidates[0].city.as_deref(), Some("Sussex"));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let body = "é".repeat(150);
        let t = truncate_body(&body);
        assert!(t.ends_with("..."));
    }
}
