//! Flight edge type.
//!
//! A `FlightEdge` is one direct flight between two airports. The network
//! hands edges out as `Arc<FlightEdge>` so itineraries can hold on to the
//! exact flight chosen for each leg without copying.

use chrono::Duration;

use super::{AirportCode, DataError};

/// A direct flight from `origin` to `destination`.
///
/// # Invariants
///
/// - `origin != destination`
/// - `distance` is finite and non-negative
/// - `duration` is non-negative
///
/// Edges are directed: an edge A→B says nothing about B→A.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightEdge {
    origin: AirportCode,
    destination: AirportCode,
    /// Flight identifier (e.g. "AS1234").
    pub flight: String,
    /// Aircraft type designator (e.g. "B738").
    pub aircraft_type: String,
    /// Aircraft registration (e.g. "N123AS").
    pub registration: String,
    distance: f64,
    duration: Duration,
}

impl FlightEdge {
    /// Construct an edge, validating its invariants.
    ///
    /// # Errors
    ///
    /// Returns `Err` if origin and destination are the same airport, or if
    /// the distance or duration is negative (or the distance is not finite).
    pub fn new(
        origin: AirportCode,
        destination: AirportCode,
        distance: f64,
        duration: Duration,
    ) -> Result<Self, DataError> {
        if origin == destination {
            return Err(DataError::SelfLoop(origin));
        }
        if !distance.is_finite() || distance < 0.0 {
            return Err(DataError::InvalidEdge {
                origin,
                destination,
                reason: "distance must be finite and non-negative",
            });
        }
        if duration < Duration::zero() {
            return Err(DataError::InvalidEdge {
                origin,
                destination,
                reason: "duration must be non-negative",
            });
        }

        Ok(Self {
            origin,
            destination,
            flight: String::new(),
            aircraft_type: String::new(),
            registration: String::new(),
            distance,
            duration,
        })
    }

    /// Attach flight and equipment metadata.
    pub fn with_details(
        mut self,
        flight: impl Into<String>,
        aircraft_type: impl Into<String>,
        registration: impl Into<String>,
    ) -> Self {
        self.flight = flight.into();
        self.aircraft_type = aircraft_type.into();
        self.registration = registration.into();
        self
    }

    pub fn origin(&self) -> AirportCode {
        self.origin
    }

    pub fn destination(&self) -> AirportCode {
        self.destination
    }

    /// Great-circle distance of the flight.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Flight duration in (fractional) minutes.
    pub fn duration_minutes(&self) -> f64 {
        self.duration.num_seconds() as f64 / 60.0
    }
}
