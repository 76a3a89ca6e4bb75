//! Itinerary assembly.
//!
//! Turns a winning target order back into concrete flights: for each
//! consecutive pair, the same cheapest edge the cost model priced.

use std::sync::Arc;

use chrono::Duration;

use crate::domain::{AirportCode, FlightEdge};
use crate::network::FlightNetwork;

use super::cost::{Objective, cheapest_edge, edge_cost};

/// Relative tolerance when re-checking the search's cost.
const COST_TOLERANCE: f64 = 1e-6;

/// Error from itinerary assembly.
///
/// Any of these means the search result and the network disagree, which
/// is a defect rather than a user error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssemblyError {
    /// The order has no targets
    #[error("cannot assemble an itinerary with no targets")]
    EmptyOrder,

    /// A leg the search considered feasible has no flight
    #[error("no flight from {from} to {to} for a leg the search accepted")]
    MissingEdge { from: AirportCode, to: AirportCode },

    /// Summing the chosen flights does not give the search's cost
    #[error("assembled cost {assembled} does not match searched cost {searched}")]
    CostMismatch { searched: f64, assembled: f64 },
}

/// One flight of an itinerary.
///
/// Holds the shared network edge, so flight details come straight from
/// the reference data.
#[derive(Debug, Clone)]
pub struct ItineraryLeg {
    edge: Arc<FlightEdge>,
}

impl ItineraryLeg {
    pub fn origin(&self) -> AirportCode {
        self.edge.origin()
    }

    pub fn destination(&self) -> AirportCode {
        self.edge.destination()
    }

    /// The flight chosen for this leg.
    pub fn edge(&self) -> &FlightEdge {
        &self.edge
    }
}

/// A complete itinerary: the start, every target in order, and the flights
/// between them.
#[derive(Debug, Clone)]
pub struct Itinerary {
    path: Vec<AirportCode>,
    objective: Objective,
    cost: f64,
    total_flight_time: Duration,
    legs: Vec<ItineraryLeg>,
}

impl Itinerary {
    /// Airports in visiting order, beginning with the start.
    pub fn path(&self) -> &[AirportCode] {
        &self.path
    }

    pub fn objective(&self) -> Objective {
        self.objective
    }

    /// Total cost under the objective.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// Sum of leg durations, whatever the objective.
    pub fn total_flight_time(&self) -> Duration {
        self.total_flight_time
    }

    pub fn legs(&self) -> &[ItineraryLeg] {
        &self.legs
    }
}

/// Build the itinerary for visiting `order` from `start`.
///
/// `searched_cost` is the cost the search reported for this order; the
/// assembled flights must add up to it.
pub fn assemble(
    network: &FlightNetwork,
    start: AirportCode,
    order: &[AirportCode],
    objective: Objective,
    searched_cost: f64,
) -> Result<Itinerary, AssemblyError> {
    if order.is_empty() {
        return Err(AssemblyError::EmptyOrder);
    }

    let path: Vec<AirportCode> = std::iter::once(start).chain(order.iter().copied()).collect();

    let mut legs = Vec::with_capacity(order.len());
    let mut assembled = 0.0;
    let mut total_flight_time = Duration::zero();
    for pair in path.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        let edge = cheapest_edge(network, &from, &to, objective)
            .ok_or(AssemblyError::MissingEdge { from, to })?;
        assembled += edge_cost(edge, objective);
        total_flight_time += edge.duration();
        legs.push(ItineraryLeg { edge: edge.clone() });
    }

    let scale = searched_cost.abs().max(1.0);
    if (assembled - searched_cost).abs() > COST_TOLERANCE * scale {
        return Err(AssemblyError::CostMismatch {
            searched: searched_cost,
            assembled,
        });
    }

    Ok(Itinerary {
        path,
        objective,
        cost: searched_cost,
        total_flight_time,
        legs,
    })
}
