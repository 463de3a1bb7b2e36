use thiserror::Error;

/// Caller-caused input problems, reported as 400s.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Both lat and lng query parameters are required")]
    MissingCoordinates,

    #[error("{0} query parameter is required")]
    MissingParameter(&'static str),

    #[error("lat and lng must be valid numbers")]
    NotANumber,

    #[error("Latitude must be between -90 and 90")]
    LatitudeOutOfRange,

    #[error("Longitude must be between -180 and 180")]
    LongitudeOutOfRange,

    #[error("location must be a non-empty string")]
    EmptyLocation,
}

impl ValidationError {
    /// Short label used as the `error` field of the response body.
    pub fn title(&self) -> &'static str {
        match self {
            ValidationError::MissingCoordinates => "Missing required parameters",
            ValidationError::MissingParameter(_) => "Missing required parameter",
            ValidationError::NotANumber => "Invalid coordinates",
            ValidationError::LatitudeOutOfRange => "Invalid latitude",
            ValidationError::LongitudeOutOfRange => "Invalid longitude",
            ValidationError::EmptyLocation => "Invalid location",
        }
    }
}

#[derive(Debug, Error)]
pub enum FireWatchError {
    /// `detail` is for server-side logs only.
    #[error("Failed to fetch fire watch data from the burn category service")]
    UpstreamUnavailable { detail: String },
}
