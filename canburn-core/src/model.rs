use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A validated WGS84 point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Burn status, ordered from strictest to most permissive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FireStatus {
    NoBurn,
    RestrictedBurn,
    OpenBurn,
}

/// Upstream fire control classification for a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicCategory {
    OutOfControl = 0,
    Contained = 1,
    UnderControl = 2,
    Patrolled = 3,
    Out = 4,
}

impl PublicCategory {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(PublicCategory::OutOfControl),
            1 => Some(PublicCategory::Contained),
            2 => Some(PublicCategory::UnderControl),
            3 => Some(PublicCategory::Patrolled),
            4 => Some(PublicCategory::Out),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub province: String,
    pub state: String,
    pub county: String,
    pub country: String,
}

/// Raw burn category record as returned by the feature service.
#[derive(Debug, Clone, PartialEq)]
pub struct BurnCategoryRecord {
    pub name: String,
    pub public_category: i64,
    pub valid_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireWatchResult {
    pub status: FireStatus,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    pub location: Location,
    pub coordinates: Coordinates,
    pub jurisdiction: String,
    pub restrictions: Vec<String>,
}

/// A provider-neutral geocoding match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeocodeCandidate {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub formatted_address: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

/// Address fields reported alongside resolved coordinates.
///
/// Each field serializes as `null` when absent rather than being omitted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressDetails {
    pub formatted_address: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeocodeResult {
    pub location: String,
    pub coordinates: Option<Coordinates>,
    #[serde(flatten)]
    pub details: Option<AddressDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl GeocodeResult {
    pub fn resolved(location: String, coordinates: Coordinates, details: AddressDetails) -> Self {
        Self {
            location,
            coordinates: Some(coordinates),
            details: Some(details),
            message: None,
        }
    }

    pub fn unresolved(location: String, message: &str) -> Self {
        Self {
            location,
            coordinates: None,
            details: None,
            message: Some(message.to_string()),
        }
    }
}
