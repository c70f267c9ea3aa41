//! Request types and validation for HTTP endpoints.

use serde::{Deserialize, Serialize};

use voyage_core::Mode;

use crate::ProblemDetails;

/// Validation trait for request types.
///
/// Implementations should validate all fields and return a `ProblemDetails`
/// error for invalid input.
pub trait Validate {
    /// Validate the request, returning an error if invalid.
    ///
    /// The `request_id` is used to populate the `instance` field of any
    /// returned `ProblemDetails`.
    ///
    /// Returns a boxed `ProblemDetails` to avoid large `Result::Err` variants.
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>>;
}

/// One endpoint of a route request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EndpointDto {
    pub lat: f64,
    pub lon: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Routing mode accepted over the wire. Mirrors [`Mode`] plus the
/// documented aliases handled by [`Mode::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeDto {
    Fuel,
    Optimal,
    Safe,
    Ulcv,
}

impl From<ModeDto> for Mode {
    fn from(value: ModeDto) -> Self {
        match value {
            ModeDto::Fuel => Mode::Fuel,
            ModeDto::Optimal => Mode::Optimal,
            ModeDto::Safe => Mode::Safe,
            ModeDto::Ulcv => Mode::Ulcv,
        }
    }
}

/// Request for computing a route between two geographic points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRequestDto {
    pub start: EndpointDto,
    pub end: EndpointDto,
    pub mode: ModeDto,
}

impl Validate for RouteRequestDto {
    fn validate(&self, request_id: &str) -> Result<(), Box<ProblemDetails>> {
        for (label, point) in [("start", &self.start), ("end", &self.end)] {
            if !(-90.0..=90.0).contains(&point.lat) {
                return Err(Box::new(ProblemDetails::bad_request(
                    format!("'{label}.lat' must be in [-90, 90], got {}", point.lat),
                    request_id,
                )));
            }
            if !(-180.0..=180.0).contains(&point.lon) {
                return Err(Box::new(ProblemDetails::bad_request(
                    format!("'{label}.lon' must be in [-180, 180], got {}", point.lon),
                    request_id,
                )));
            }
        }
        Ok(())
    }
}
