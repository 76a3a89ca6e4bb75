//! Itinerary planner.
//!
//! This module answers: "starting here, in what order should I fly to all
//! of these airports?"
//!
//! A request is validated, the visiting order is searched for under the
//! chosen objective, and the winning order is assembled into concrete
//! flights.

mod assemble;
mod config;
pub mod cost;
mod search;
mod validate;

use tracing::{info, warn};

use crate::network::FlightNetwork;

pub use assemble::{AssemblyError, Itinerary, ItineraryLeg, assemble};
pub use config::SearchConfig;
pub use cost::{CostMatrix, Objective, PathCost, cheapest_edge, edge_cost, path_cost};
pub use search::{
    Candidate, Move, RouteSearch, SearchError, SearchMode, SearchReport, SearchRequest,
    Termination,
};
pub use validate::{ItineraryRequest, RequestField, RequestValidator, ValidationError};

/// Why a request produced no itinerary.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanError {
    /// The request was rejected before search
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No order of the targets can be flown
    #[error(transparent)]
    NoFeasibleRoute(#[from] SearchError),

    /// The search result could not be turned into flights
    #[error(transparent)]
    Assembly(#[from] AssemblyError),
}

/// A planned itinerary plus how the search went.
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    pub itinerary: Itinerary,
    pub report: SearchReport,
}

/// Runs validation, search and assembly for one request.
pub struct Planner<'a> {
    network: &'a FlightNetwork,
    validator: &'a RequestValidator,
    config: &'a SearchConfig,
}

impl<'a> Planner<'a> {
    /// Create a new planner.
    pub fn new(
        network: &'a FlightNetwork,
        validator: &'a RequestValidator,
        config: &'a SearchConfig,
    ) -> Self {
        Self {
            network,
            validator,
            config,
        }
    }

    /// Validate a raw request.
    pub fn validate(&self, request: &ItineraryRequest) -> Result<SearchRequest, ValidationError> {
        self.validator.validate(request, self.network, self.config)
    }

    /// Plan an itinerary for a raw request.
    pub fn plan(&self, request: &ItineraryRequest) -> Result<PlanOutcome, PlanError> {
        let request = self.validate(request)?;
        self.plan_validated(&request)
    }

    /// Plan an itinerary for an already validated request.
    pub fn plan_validated(&self, request: &SearchRequest) -> Result<PlanOutcome, PlanError> {
        let report = match RouteSearch::new(self.network, self.config).run(request) {
            Ok(report) => report,
            Err(e) => {
                info!(start = %request.start, targets = request.targets.len(), "{e}");
                return Err(e.into());
            }
        };

        let itinerary = assemble(
            self.network,
            request.start,
            &report.best.order,
            request.objective,
            report.best.cost,
        )
        .inspect_err(|e| warn!("search result could not be assembled: {e}"))?;

        info!(
            start = %request.start,
            targets = request.targets.len(),
            cost = itinerary.cost(),
            iterations = report.iterations,
            termination = ?report.termination,
            "planned itinerary"
        );

        Ok(PlanOutcome { itinerary, report })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Airport, AirportCode, FlightEdge};
    use chrono::Duration;

    fn code(s: &str) -> AirportCode {
        AirportCode::parse(s).unwrap()
    }

    fn network(edges: &[(&str, &str, f64)]) -> FlightNetwork {
        let mut builder = FlightNetwork::builder();
        for c in ["LAX", "SAN", "SNA", "AAA", "BBB", "CCC"] {
            builder.push_airport(Airport::new(code(c), c));
        }
        for (i, (from, to, km)) in edges.iter().enumerate() {
            builder.push_edge(
                FlightEdge::new(code(from), code(to), *km, Duration::minutes(30 + i as i64))
                    .unwrap()
                    .with_details(format!("FL{i}"), "A320", format!("N{i}")),
            );
        }
        builder.build().unwrap()
    }

    fn validator() -> RequestValidator {
        RequestValidator::new([code("LAX"), code("SAN"), code("SNA")])
    }

    #[test]
    fn lax_to_sna() {
        let net = network(&[("LAX", "SNA", 60.0)]);
        let validator = validator();
        let config = SearchConfig::default();
        let planner = Planner::new(&net, &validator, &config);

        let outcome = planner.plan(&ItineraryRequest::new("LAX", &["SNA"])).unwrap();

        assert_eq!(outcome.itinerary.path(), &[code("LAX"), code("SNA")]);
        assert_eq!(outcome.itinerary.cost(), 60.0);
        assert_eq!(outcome.itinerary.legs()[0].edge().flight, "FL0");
        assert_eq!(outcome.report.termination, Termination::Exhausted);
    }

    #[test]
    fn unknown_target_is_validation_error() {
        let net = network(&[("LAX", "SNA", 60.0)]);
        let validator = validator();
        let config = SearchConfig::default();
        let planner = Planner::new(&net, &validator, &config);

        let err = planner
            .plan(&ItineraryRequest::new("LAX", &["XXX"]))
            .unwrap_err();
        assert!(matches!(
            err,
            PlanError::Validation(ValidationError {
                field: RequestField::Targets,
                ..
            })
        ));
    }

    #[test]
    fn disconnected_targets_are_no_route() {
        let net = network(&[("LAX", "AAA", 10.0), ("LAX", "BBB", 12.0)]);
        let validator = validator();
        let config = SearchConfig::default();
        let planner = Planner::new(&net, &validator, &config);

        let err = planner
            .plan(&ItineraryRequest::new("LAX", &["AAA", "BBB"]))
            .unwrap_err();
        assert!(matches!(err, PlanError::NoFeasibleRoute(_)));
    }

    #[test]
    fn details_sum_to_cost() {
        let net = network(&[
            ("SAN", "AAA", 120.0),
            ("SAN", "BBB", 80.0),
            ("AAA", "BBB", 40.0),
            ("BBB", "AAA", 45.0),
            ("AAA", "CCC", 70.0),
            ("BBB", "CCC", 200.0),
            ("CCC", "AAA", 75.0),
            ("CCC", "BBB", 190.0),
        ]);
        let validator = validator();
        let config = SearchConfig::default();
        let planner = Planner::new(&net, &validator, &config);

        let outcome = planner
            .plan(&ItineraryRequest::new("SAN", &["AAA", "BBB", "CCC"]))
            .unwrap();

        let summed: f64 = outcome
            .itinerary
            .legs()
            .iter()
            .map(|leg| leg.edge().distance())
            .sum();
        assert_eq!(summed, outcome.itinerary.cost());
        // SAN -> BBB -> AAA -> CCC
        assert_eq!(outcome.itinerary.cost(), 195.0);
        let legs: Vec<_> = outcome
            .itinerary
            .legs()
            .iter()
            .map(|l| (l.origin(), l.destination()))
            .collect();
        assert_eq!(
            legs,
            vec![
                (code("SAN"), code("BBB")),
                (code("BBB"), code("AAA")),
                (code("AAA"), code("CCC")),
            ]
        );
    }

    #[test]
    fn planning_is_repeatable() {
        let net = network(&[
            ("SNA", "AAA", 10.0),
            ("SNA", "BBB", 11.0),
            ("AAA", "BBB", 3.0),
            ("BBB", "AAA", 3.0),
            ("BBB", "CCC", 4.0),
            ("AAA", "CCC", 9.0),
        ]);
        let validator = validator();
        let config = SearchConfig::default();
        let planner = Planner::new(&net, &validator, &config);
        let mut request = ItineraryRequest::new("SNA", &["CCC", "AAA", "BBB"]);
        request.seed = Some(1234);

        let a = planner.plan(&request).unwrap();
        let b = planner.plan(&request).unwrap();
        assert_eq!(a.itinerary.path(), b.itinerary.path());
        assert_eq!(a.itinerary.cost(), b.itinerary.cost());
        assert_eq!(a.report.best, b.report.best);
    }
}
