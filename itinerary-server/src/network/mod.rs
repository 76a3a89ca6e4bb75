//! The flight network.
//!
//! An immutable directed multigraph of airports and the direct flights
//! between them. Built once at startup and shared read-only between
//! concurrent requests.

pub mod loader;

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::{Airport, AirportCode, DataError, FlightEdge};

pub use loader::{NetworkLoader, NetworkParser, load_network};

/// Airports plus outgoing flights indexed by origin.
///
/// Lookup of the edges leaving an airport is O(1) on average. Edges are
/// stored in load order, which is also the tie-break order when two edges
/// between the same pair cost the same.
#[derive(Debug, Default)]
pub struct FlightNetwork {
    airports: HashMap<AirportCode, Airport>,
    outgoing: HashMap<AirportCode, Vec<Arc<FlightEdge>>>,
    edge_count: usize,
}

impl FlightNetwork {
    /// Start building a network.
    pub fn builder() -> FlightNetworkBuilder {
        FlightNetworkBuilder::default()
    }

    /// All flights leaving `origin`.
    ///
    /// Returns an empty slice for unknown airports and airports with no
    /// departures.
    pub fn edges_from(&self, origin: &AirportCode) -> &[Arc<FlightEdge>] {
        self.outgoing.get(origin).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All flights from `origin` to `destination`, in load order.
    pub fn edges_between(
        &self,
        origin: &AirportCode,
        destination: &AirportCode,
    ) -> impl Iterator<Item = &Arc<FlightEdge>> {
        let destination = *destination;
        self.edges_from(origin)
            .iter()
            .filter(move |e| e.destination() == destination)
    }

    /// Check whether at least one direct flight goes from `a` to `b`.
    pub fn has_direct_connection(&self, a: &AirportCode, b: &AirportCode) -> bool {
        self.edges_between(a, b).next().is_some()
    }

    /// Look up an airport by code.
    pub fn airport(&self, code: &AirportCode) -> Option<&Airport> {
        self.airports.get(code)
    }

    /// Check whether the network knows an airport.
    pub fn contains(&self, code: &AirportCode) -> bool {
        self.airports.contains_key(code)
    }

    /// All airports, in no particular order.
    pub fn airports(&self) -> impl Iterator<Item = &Airport> {
        self.airports.values()
    }

    pub fn airport_count(&self) -> usize {
        self.airports.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }
}

/// Builder for a [`FlightNetwork`].
///
/// Collects airports and flights, then checks referential integrity in
/// [`build`](Self::build).
#[derive(Debug, Default)]
pub struct FlightNetworkBuilder {
    airports: Vec<Airport>,
    edges: Vec<FlightEdge>,
}

impl FlightNetworkBuilder {
    /// Add an airport.
    pub fn airport(mut self, airport: Airport) -> Self {
        self.airports.push(airport);
        self
    }

    /// Add a flight.
    pub fn edge(mut self, edge: FlightEdge) -> Self {
        self.edges.push(edge);
        self
    }

    /// Add an airport in place.
    pub fn push_airport(&mut self, airport: Airport) {
        self.airports.push(airport);
    }

    /// Add a flight in place.
    pub fn push_edge(&mut self, edge: FlightEdge) {
        self.edges.push(edge);
    }

    /// Build the network.
    ///
    /// # Errors
    ///
    /// Returns `Err` if there are no airports or no flights, an airport is
    /// declared twice, or a flight references an undeclared airport.
    pub fn build(self) -> Result<FlightNetwork, DataError> {
        if self.airports.is_empty() {
            return Err(DataError::EmptyNetwork("no airports"));
        }
        if self.edges.is_empty() {
            return Err(DataError::EmptyNetwork("no flights"));
        }

        let mut airports = HashMap::with_capacity(self.airports.len());
        for airport in self.airports {
            let code = airport.code;
            if airports.insert(code, airport).is_some() {
                return Err(DataError::DuplicateAirport(code));
            }
        }

        let edge_count = self.edges.len();
        let mut outgoing: HashMap<AirportCode, Vec<Arc<FlightEdge>>> = HashMap::new();
        for edge in self.edges {
            for endpoint in [edge.origin(), edge.destination()] {
                if !airports.contains_key(&endpoint) {
                    return Err(DataError::UnknownAirport {
                        origin: edge.origin(),
                        destination: edge.destination(),
                        missing: endpoint,
                    });
                }
            }
            outgoing
                .entry(edge.origin())
                .or_default()
                .push(Arc::new(edge));
        }

        Ok(FlightNetwork {
            airports,
            outgoing,
            edge_count,
        })
    }
}
