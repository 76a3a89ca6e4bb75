//! Cost model: what a leg or a path costs under an objective.
//!
//! Costs are plain non-negative numbers, but a path with a missing leg has
//! no cost at all. That case is [`PathCost::Infeasible`], a separate variant
//! rather than an infinity, so it can never be compared against a real cost
//! by accident.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::{AirportCode, FlightEdge};
use crate::network::FlightNetwork;

/// The metric a route is optimized for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    /// Total great-circle distance.
    #[default]
    Distance,
    /// Number of flights taken.
    HopCount,
    /// Total time in the air, in minutes.
    Duration,
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Objective::Distance => "distance",
            Objective::HopCount => "hop_count",
            Objective::Duration => "duration",
        })
    }
}

/// Cost of a whole path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCost {
    /// Every consecutive pair is connected; the total cost.
    Feasible(f64),
    /// Some consecutive pair has no direct flight.
    Infeasible,
}

impl PathCost {
    /// The numeric cost, if the path is feasible.
    pub fn value(&self) -> Option<f64> {
        match self {
            PathCost::Feasible(cost) => Some(*cost),
            PathCost::Infeasible => None,
        }
    }

    pub fn is_feasible(&self) -> bool {
        matches!(self, PathCost::Feasible(_))
    }
}

/// Cost of a single flight under `objective`.
pub fn edge_cost(edge: &FlightEdge, objective: Objective) -> f64 {
    match objective {
        Objective::Distance => edge.distance(),
        Objective::HopCount => 1.0,
        Objective::Duration => edge.duration_minutes(),
    }
}

/// The cheapest flight from `from` to `to` under `objective`.
///
/// When several flights cost the same, the first one loaded wins.
pub fn cheapest_edge<'a>(
    network: &'a FlightNetwork,
    from: &AirportCode,
    to: &AirportCode,
    objective: Objective,
) -> Option<&'a Arc<FlightEdge>> {
    network
        .edges_between(from, to)
        .fold(None, |best: Option<&'a Arc<FlightEdge>>, edge| match best {
            Some(b) if edge_cost(b, objective) <= edge_cost(edge, objective) => Some(b),
            _ => Some(edge),
        })
}

/// Cost of flying `airports` in order, taking the cheapest flight per leg.
///
/// A path of zero or one airports costs nothing.
pub fn path_cost(network: &FlightNetwork, airports: &[AirportCode], objective: Objective) -> PathCost {
    let mut total = 0.0;
    for pair in airports.windows(2) {
        match cheapest_edge(network, &pair[0], &pair[1], objective) {
            Some(edge) => total += edge_cost(edge, objective),
            None => return PathCost::Infeasible,
        }
    }
    PathCost::Feasible(total)
}

/// Cheapest leg costs between a fixed set of airports.
///
/// Built once per search so candidate orders can be priced without touching
/// the network. Index 0 is the start airport; indices `1..=n` are the
/// targets in the order given.
#[derive(Debug, Clone)]
pub struct CostMatrix {
    size: usize,
    costs: Vec<Option<f64>>,
}

impl CostMatrix {
    /// Price every ordered pair among `start` and `targets`.
    pub fn build(
        network: &FlightNetwork,
        start: &AirportCode,
        targets: &[AirportCode],
        objective: Objective,
    ) -> Self {
        let nodes: Vec<&AirportCode> = std::iter::once(start).chain(targets).collect();
        let size = nodes.len();
        let mut costs = vec![None; size * size];
        for (i, from) in nodes.iter().enumerate() {
            for (j, to) in nodes.iter().enumerate() {
                if i != j {
                    costs[i * size + j] =
                        cheapest_edge(network, from, to, objective).map(|e| edge_cost(e, objective));
                }
            }
        }
        Self { size, costs }
    }

    /// Number of airports, including the start.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Cheapest cost from node `from` to node `to`, if they are connected.
    pub fn leg(&self, from: usize, to: usize) -> Option<f64> {
        self.costs[from * self.size + to]
    }

    /// Cost of starting at node 0 and visiting target nodes in `order`.
    pub fn order_cost(&self, order: &[usize]) -> PathCost {
        let mut total = 0.0;
        let mut prev = 0;
        for &next in order {
            match self.leg(prev, next) {
                Some(cost) => total += cost,
                None => return PathCost::Infeasible,
            }
            prev = next;
        }
        PathCost::Feasible(total)
    }
}
