//! Domain types for the itinerary planner.
//!
//! This module contains the reference data types the planner works on.
//! All types enforce their invariants at construction time, so code that
//! receives these types can trust their validity.

mod airport;
mod error;
mod flight;

pub use airport::{Airport, AirportCode, Coordinates, InvalidAirportCode};
pub use error::DataError;
pub use flight::FlightEdge;
