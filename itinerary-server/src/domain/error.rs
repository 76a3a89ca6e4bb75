//! Reference data errors.
//!
//! These errors describe malformed or inconsistent airport and flight
//! data. They are fatal at load time and never retried.

use super::AirportCode;

/// Errors raised while building or loading the flight network.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// Failed to read a data file
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A data file is not valid JSON for the expected shape
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// A record is missing a required field or has an unusable value
    #[error("invalid record {index} in {path}: {reason}")]
    InvalidRecord {
        path: String,
        index: usize,
        reason: String,
    },

    /// An edge references an airport that was never declared
    #[error("flight {origin} -> {destination} references unknown airport {missing}")]
    UnknownAirport {
        origin: AirportCode,
        destination: AirportCode,
        missing: AirportCode,
    },

    /// An airport code is declared more than once
    #[error("airport {0} is declared more than once")]
    DuplicateAirport(AirportCode),

    /// An edge starts and ends at the same airport
    #[error("flight from {0} to itself")]
    SelfLoop(AirportCode),

    /// An edge has an invalid attribute
    #[error("invalid flight {origin} -> {destination}: {reason}")]
    InvalidEdge {
        origin: AirportCode,
        destination: AirportCode,
        reason: &'static str,
    },

    /// The network has no airports or no flights
    #[error("flight network is empty: {0}")]
    EmptyNetwork(&'static str),
}
