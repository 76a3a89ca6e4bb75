//! Data transfer objects for web requests and responses.

use serde::Serialize;

use crate::domain::Airport;
use crate::planner::{
    Itinerary, ItineraryLeg, Objective, PlanOutcome, RequestField, SearchMode, Termination,
};

/// Response from the root endpoint.
#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
}

/// An airport in the airport list.
#[derive(Debug, Serialize)]
pub struct AirportResult {
    /// IATA code (or ICAO when the airport has none)
    pub code: String,

    pub name: String,

    pub city: String,

    /// State or region
    pub state: String,

    pub country: String,

    pub latitude: f64,

    pub longitude: f64,

    /// Whether itineraries may start here
    pub allowed_origin: bool,
}

impl AirportResult {
    /// Convert a domain airport to a DTO.
    pub fn from_airport(airport: &Airport, allowed_origin: bool) -> Self {
        Self {
            code: airport.code.to_string(),
            name: airport.name.clone(),
            city: airport.city.clone(),
            state: airport.region.clone(),
            country: airport.country.clone(),
            latitude: airport.coordinates.latitude,
            longitude: airport.coordinates.longitude,
            allowed_origin,
        }
    }
}

/// One flight of a planned itinerary.
#[derive(Debug, Serialize)]
pub struct LegDetail {
    pub from: String,

    pub to: String,

    /// Flight number
    pub flight: String,

    /// Aircraft type
    #[serde(rename = "type")]
    pub aircraft_type: String,

    /// Aircraft registration
    #[serde(rename = "reg")]
    pub registration: String,

    /// Great-circle distance in km
    pub circle_distance: f64,

    /// Flight time in minutes
    pub flight_time: f64,
}

impl LegDetail {
    /// Convert an itinerary leg to a DTO.
    pub fn from_leg(leg: &ItineraryLeg) -> Self {
        let edge = leg.edge();
        Self {
            from: leg.origin().to_string(),
            to: leg.destination().to_string(),
            flight: edge.flight.clone(),
            aircraft_type: edge.aircraft_type.clone(),
            registration: edge.registration.clone(),
            circle_distance: edge.distance(),
            flight_time: edge.duration_minutes(),
        }
    }
}

/// How the search behind an itinerary went.
#[derive(Debug, Serialize)]
pub struct SearchInfo {
    pub iterations: u64,

    pub elapsed_ms: u64,

    pub termination: Termination,

    pub mode: SearchMode,
}

/// Response to an itinerary request.
#[derive(Debug, Serialize)]
pub struct ItineraryResponse {
    /// Airport codes in visiting order, beginning with the start
    pub path: Vec<String>,

    /// Total cost under the objective
    pub cost: f64,

    pub objective: Objective,

    /// Sum of leg flight times in minutes
    pub total_flight_time: f64,

    pub details: Vec<LegDetail>,

    pub search: SearchInfo,
}

impl ItineraryResponse {
    /// Convert a planning outcome to a DTO.
    pub fn from_outcome(outcome: &PlanOutcome) -> Self {
        let itinerary: &Itinerary = &outcome.itinerary;
        let report = &outcome.report;

        Self {
            path: itinerary.path().iter().map(|c| c.to_string()).collect(),
            cost: itinerary.cost(),
            objective: itinerary.objective(),
            total_flight_time: itinerary.total_flight_time().num_seconds() as f64 / 60.0,
            details: itinerary.legs().iter().map(LegDetail::from_leg).collect(),
            search: SearchInfo {
                iterations: report.iterations,
                elapsed_ms: u64::try_from(report.elapsed.as_millis()).unwrap_or(u64::MAX),
                termination: report.termination,
                mode: report.mode,
            },
        }
    }
}

/// Kind of failure in an error response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidRequest,
    NoRoute,
    Internal,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,

    pub kind: ErrorKind,

    /// Request field at fault, for invalid requests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<RequestField>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AirportCode, Coordinates, FlightEdge};
    use crate::network::FlightNetwork;
    use crate::planner::{ItineraryRequest, Planner, RequestValidator, SearchConfig};
    use chrono::Duration;

    fn code(s: &str) -> AirportCode {
        AirportCode::parse(s).unwrap()
    }

    fn outcome() -> PlanOutcome {
        let net = FlightNetwork::builder()
            .airport(Airport::new(code("SAN"), "San Diego"))
            .airport(Airport::new(code("SFO"), "San Francisco"))
            .airport(Airport::new(code("SEA"), "Seattle"))
            .edge(
                FlightEdge::new(code("SAN"), code("SFO"), 719.0, Duration::minutes(90))
                    .unwrap()
                    .with_details("UA1234", "B738", "N12345"),
            )
            .edge(
                FlightEdge::new(code("SFO"), code("SEA"), 1093.0, Duration::seconds(6930))
                    .unwrap()
                    .with_details("AS321", "A320", "N654AS"),
            )
            .build()
            .unwrap();
        let validator = RequestValidator::new([code("SAN")]);
        let config = SearchConfig::default();
        Planner::new(&net, &validator, &config)
            .plan(&ItineraryRequest::new("SAN", &["SEA", "SFO"]))
            .unwrap()
    }

    #[test]
    fn itinerary_response_from_outcome() {
        let response = ItineraryResponse::from_outcome(&outcome());

        assert_eq!(response.path, vec!["SAN", "SFO", "SEA"]);
        assert_eq!(response.cost, 1812.0);
        assert_eq!(response.objective, Objective::Distance);
        assert_eq!(response.total_flight_time, 205.5);
        assert_eq!(response.details.len(), 2);
        assert_eq!(response.details[0].flight, "UA1234");
        assert_eq!(response.details[1].flight_time, 115.5);
        assert_eq!(response.search.termination, Termination::Exhausted);
        assert_eq!(response.search.mode, SearchMode::Exhaustive);
    }

    #[test]
    fn leg_detail_field_names() {
        let response = ItineraryResponse::from_outcome(&outcome());
        let json = serde_json::to_value(&response.details[0]).unwrap();

        assert_eq!(json["from"], "SAN");
        assert_eq!(json["to"], "SFO");
        assert_eq!(json["type"], "B738");
        assert_eq!(json["reg"], "N12345");
        assert_eq!(json["circle_distance"], 719.0);
        assert_eq!(json["flight_time"], 90.0);
    }

    #[test]
    fn search_info_serializes_snake_case() {
        let response = ItineraryResponse::from_outcome(&outcome());
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["objective"], "distance");
        assert_eq!(json["search"]["termination"], "exhausted");
        assert_eq!(json["search"]["mode"], "exhaustive");
    }

    #[test]
    fn airport_result_from_airport() {
        let airport = Airport::new(code("SNA"), "John Wayne Airport").located(
            "Santa Ana",
            "CA",
            "US",
            Coordinates::new(33.6757, -117.8682),
        );
        let result = AirportResult::from_airport(&airport, true);

        assert_eq!(result.code, "SNA");
        assert_eq!(result.state, "CA");
        assert_eq!(result.latitude, 33.6757);
        assert!(result.allowed_origin);
    }

    #[test]
    fn error_response_omits_missing_field() {
        let json = serde_json::to_value(ErrorResponse {
            error: "no route".into(),
            kind: ErrorKind::NoRoute,
            field: None,
        })
        .unwrap();
        assert_eq!(json["kind"], "no_route");
        assert!(json.get("field").is_none());

        let json = serde_json::to_value(ErrorResponse {
            error: "bad".into(),
            kind: ErrorKind::InvalidRequest,
            field: Some(RequestField::MaxIterations),
        })
        .unwrap();
        assert_eq!(json["kind"], "invalid_request");
        assert_eq!(json["field"], "max_iterations");
    }
}
