use std::path::PathBuf;

use thiserror::Error;

use crate::model::TransportMode;

/// Convenient result alias for the tripcarbon library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// An external routing or lookup service answered with a failure, an
    /// empty result, or not at all within the configured timeout.
    #[error("{service} routing failed: {reason}")]
    RoutingFailed {
        service: &'static str,
        reason: String,
    },

    /// A route was returned but one of its ends is implausibly far from the
    /// requested coordinate.
    #[error(
        "route {endpoint} is {distance_km:.1} km from the requested point (tolerance {tolerance_km} km)"
    )]
    GeometryRejected {
        endpoint: &'static str,
        distance_km: f64,
        tolerance_km: f64,
    },

    /// No rail infrastructure could be found around a coordinate.
    #[error("no rail infrastructure found near ({lon}, {lat})")]
    RailNodeNotFound { lon: f64, lat: f64 },

    /// A leg of a custom trip could not be computed; the whole trip fails.
    #[error(
        "leg {leg} could not be computed by {mode}; try another mode of transport or move the location"
    )]
    LegFailed { leg: usize, mode: TransportMode },

    /// The trip definition itself is unusable.
    #[error("invalid trip: {reason}")]
    InvalidTrip { reason: String },

    /// A textual step or coordinate could not be parsed.
    #[error("invalid step '{input}': {reason}")]
    InvalidStep { input: String, reason: String },

    /// A reference layer could not be read or lacks the expected properties.
    #[error("invalid reference data in {path}: {message}")]
    ReferenceData { path: PathBuf, message: String },

    /// A settings override file could not be parsed.
    #[error("invalid settings file {path}: {message}")]
    InvalidSettings { path: PathBuf, message: String },

    /// Region splitting produced no segment at all.
    #[error("path does not cross any known region")]
    EmptyRegionSplit,

    /// The sea-lane graph did not connect the two endpoints.
    #[error("no navigable sea path between the requested points")]
    SeaPathNotFound,

    /// No platform data directory could be resolved for the reference layers.
    #[error("failed to resolve a data directory for reference layers")]
    DataDirUnavailable,

    /// Wrapper for HTTP client errors.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for JSON errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Wrapper for GeoJSON parsing errors.
    #[error(transparent)]
    GeoJson(#[from] geojson::Error),
}

impl Error {
    pub(crate) fn routing(service: &'static str, reason: impl Into<String>) -> Self {
        Error::RoutingFailed {
            service,
            reason: reason.into(),
        }
    }

    /// Whether the error came from routing or validation and may be retried
    /// by a fallback strategy.
    pub fn is_routing_failure(&self) -> bool {
        matches!(
            self,
            Error::RoutingFailed { .. } | Error::GeometryRejected { .. } | Error::Http(_)
        )
    }
}
