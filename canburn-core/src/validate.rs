//! Request parameter validation. Runs before any outbound call.

use crate::{error::ValidationError, model::Coordinates};

/// Check that a numeric point is finite and within WGS84 bounds (inclusive).
pub fn validate(latitude: f64, longitude: f64) -> Result<Coordinates, ValidationError> {
    if !latitude.is_finite() || !longitude.is_finite() {
        return Err(ValidationError::NotANumber);
    }

    if !(-90.0..=90.0).contains(&latitude) {
        return Err(ValidationError::LatitudeOutOfRange);
    }

    if !(-180.0..=180.0).contains(&longitude) {
        return Err(ValidationError::LongitudeOutOfRange);
    }

    Ok(Coordinates { latitude, longitude })
}

/// Parse raw `lat`/`lng` query values into validated coordinates.
pub fn parse_coordinates(
    lat: Option<&str>,
    lng: Option<&str>,
) -> Result<Coordinates, ValidationError> {
    let (lat, lng) = match (non_empty(lat), non_empty(lng)) {
        (Some(lat), Some(lng)) => (lat, lng),
        _ => return Err(ValidationError::MissingCoordinates),
    };

    let latitude: f64 = lat.parse().map_err(|_| ValidationError::NotANumber)?;
    let longitude: f64 = lng.parse().map_err(|_| ValidationError::NotANumber)?;

    validate(latitude, longitude)
}

/// Returns the trimmed location text.
pub fn validate_location(location: Option<&str>) -> Result<String, ValidationError> {
    let location = location.ok_or(ValidationError::MissingParameter("location"))?;
    let trimmed = location.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyLocation);
    }

    Ok(trimmed.to_string())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
