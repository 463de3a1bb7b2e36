//! Core library for the Can I Burn API.
//!
//! This crate defines:
//! - Coordinate and location validation
//! - Fire-watch status resolution against a burn category feature service
//! - Geocoding over an ordered list of providers with fallback
//! - Configuration & credentials handling
//!
//! It is used by `canburn-api`, but holds no HTTP server code itself.

pub mod config;
pub mod error;
pub mod fire;
pub mod geocode;
pub mod model;
pub mod provider;
pub mod validate;

pub use config::{Config, FireServiceConfig, GeocodingConfig, ProviderConfig, ServerConfig};
pub use error::{FireWatchError, ValidationError};
pub use fire::{ArcGisFeatureService, BurnCategorySource, FireStatusResolver, Jurisdiction};
pub use geocode::GeocodeResolver;
pub use model::{
    AddressDetails, BurnCategoryRecord, Coordinates, FireStatus, FireWatchResult,
    GeocodeCandidate, GeocodeResult, Location, PublicCategory,
};
pub use provider::{GeocodeProvider, ProviderId};
