//! Location text → coordinates, trying each configured provider in turn.
//!
//! Geocoding never fails outward: every failure mode becomes a
//! [`GeocodeResult`] carrying a human-readable `message`.

use tracing::{debug, warn};

use crate::{
    model::{AddressDetails, Coordinates, GeocodeCandidate, GeocodeResult},
    provider::GeocodeProvider,
};

pub const MSG_NOT_RESOLVED: &str = "Location could not be resolved";
pub const MSG_FAILED: &str = "Failed to resolve location";
pub const MSG_NO_COORDINATES: &str = "Location found but coordinates unavailable";

const SOURCE: &str = "geocoding";

#[derive(Debug, Default)]
pub struct GeocodeResolver {
    providers: Vec<Box<dyn GeocodeProvider>>,
}

impl GeocodeResolver {
    pub fn new(providers: Vec<Box<dyn GeocodeProvider>>) -> Self {
        Self { providers }
    }

    pub fn providers(&self) -> &[Box<dyn GeocodeProvider>] {
        &self.providers
    }

    pub async fn resolve(&self, location: &str) -> GeocodeResult {
        let location = location.trim().to_string();

        match self.lookup(&location).await {
            Some(candidates) => shape(location, candidates.into_iter().next()),
            None => GeocodeResult::unresolved(location, MSG_FAILED),
        }
    }

    /// First provider to answer wins, even with zero matches.
    /// `None` when every provider errored.
    async fn lookup(&self, location: &str) -> Option<Vec<GeocodeCandidate>> {
        for provider in &self.providers {
            match provider.geocode(location).await {
                Ok(candidates) => {
                    debug!(provider = %provider.id(), matches = candidates.len(), "geocode answered");
                    return Some(candidates);
                }
                Err(e) => {
                    warn!(provider = %provider.id(), error = %format!("{e:#}"), "geocode provider failed");
                }
            }
        }

        None
    }
}

fn shape(location: String, first: Option<GeocodeCandidate>) -> GeocodeResult {
    let Some(candidate) = first else {
        return GeocodeResult::unresolved(location, MSG_NOT_RESOLVED);
    };

    let (Some(latitude), Some(longitude)) = (candidate.latitude, candidate.longitude) else {
        return GeocodeResult::unresolved(location, MSG_NO_COORDINATES);
    };

    GeocodeResult::resolved(location, Coordinates { latitude, longitude }, AddressDetails {
        formatted_address: candidate.formatted_address,
        country: candidate.country,
        city: candidate.city,
        state: candidate.state,
        source: SOURCE.to_string(),
    })
}
