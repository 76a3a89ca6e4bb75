//! Request validation.
//!
//! Every check happens before any search starts, and each rejection names
//! the request field at fault.

use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::AirportCode;
use crate::network::FlightNetwork;

use super::config::SearchConfig;
use super::cost::Objective;
use super::search::SearchRequest;

/// An itinerary request as submitted by a client.
///
/// Numbers are signed so that zero and negative budgets can be reported
/// as validation errors rather than parse failures.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItineraryRequest {
    pub start: String,
    pub targets: Vec<String>,
    #[serde(default)]
    pub objective: Option<Objective>,
    #[serde(default)]
    pub max_iterations: Option<i64>,
    /// Seconds.
    #[serde(default)]
    pub time_limit: Option<f64>,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl ItineraryRequest {
    /// Create a request with default objective and budgets.
    pub fn new(start: impl Into<String>, targets: &[&str]) -> Self {
        Self {
            start: start.into(),
            targets: targets.iter().map(|t| t.to_string()).collect(),
            ..Self::default()
        }
    }
}

/// The request field a validation error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestField {
    Start,
    Targets,
    MaxIterations,
    TimeLimit,
}

impl fmt::Display for RequestField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RequestField::Start => "start",
            RequestField::Targets => "targets",
            RequestField::MaxIterations => "max_iterations",
            RequestField::TimeLimit => "time_limit",
        })
    }
}

/// A request rejected before search.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    pub field: RequestField,
    pub reason: String,
}

impl ValidationError {
    fn new(field: RequestField, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Checks requests against the network and the origin policy.
#[derive(Debug, Clone)]
pub struct RequestValidator {
    allowed_origins: Vec<AirportCode>,
}

impl RequestValidator {
    /// Create a validator accepting the given start airports.
    pub fn new(allowed_origins: impl IntoIterator<Item = AirportCode>) -> Self {
        let mut allowed_origins: Vec<_> = allowed_origins.into_iter().collect();
        allowed_origins.sort();
        allowed_origins.dedup();
        Self { allowed_origins }
    }

    /// Allowed start airports, sorted.
    pub fn allowed_origins(&self) -> &[AirportCode] {
        &self.allowed_origins
    }

    pub fn is_allowed_origin(&self, code: &AirportCode) -> bool {
        self.allowed_origins.binary_search(code).is_ok()
    }

    /// Validate and normalize a request.
    ///
    /// Codes are trimmed and uppercased, targets are sorted, and missing
    /// options take their defaults from `config`.
    pub fn validate(
        &self,
        request: &ItineraryRequest,
        network: &FlightNetwork,
        config: &SearchConfig,
    ) -> Result<SearchRequest, ValidationError> {
        use RequestField::*;

        let start = AirportCode::parse_normalized(&request.start)
            .map_err(|e| ValidationError::new(Start, format!("{:?}: {e}", request.start)))?;
        if !self.is_allowed_origin(&start) {
            let allowed: Vec<&str> = self.allowed_origins.iter().map(|c| c.as_str()).collect();
            return Err(ValidationError::new(
                Start,
                format!("{start} is not an allowed origin (allowed: {})", allowed.join(", ")),
            ));
        }
        if !network.contains(&start) {
            return Err(ValidationError::new(
                Start,
                format!("{start} is not in the flight network"),
            ));
        }

        if request.targets.is_empty() {
            return Err(ValidationError::new(Targets, "at least one target is required"));
        }
        let mut targets = Vec::with_capacity(request.targets.len());
        let mut seen = HashSet::with_capacity(request.targets.len());
        for raw in &request.targets {
            let code = AirportCode::parse_normalized(raw)
                .map_err(|e| ValidationError::new(Targets, format!("{raw:?}: {e}")))?;
            if !network.contains(&code) {
                return Err(ValidationError::new(
                    Targets,
                    format!("{code} is not in the flight network"),
                ));
            }
            if code == start {
                return Err(ValidationError::new(
                    Targets,
                    format!("{code} is the start airport"),
                ));
            }
            if !seen.insert(code) {
                return Err(ValidationError::new(Targets, format!("{code} is listed twice")));
            }
            targets.push(code);
        }
        targets.sort();

        let max_iterations = match request.max_iterations {
            None => config.default_max_iterations,
            Some(n) if n > 0 => n as u64,
            Some(n) => {
                return Err(ValidationError::new(
                    MaxIterations,
                    format!("must be positive, got {n}"),
                ));
            }
        };

        let time_limit = match request.time_limit {
            None => config.default_time_limit(),
            Some(secs) if secs.is_finite() && secs > 0.0 => Duration::try_from_secs_f64(secs)
                .map_err(|_| ValidationError::new(TimeLimit, format!("{secs} seconds is too long")))?,
            Some(secs) => {
                return Err(ValidationError::new(
                    TimeLimit,
                    format!("must be a positive number of seconds, got {secs}"),
                ));
            }
        };

        Ok(SearchRequest {
            start,
            targets,
            objective: request.objective.unwrap_or_default(),
            max_iterations,
            time_limit,
            seed: request.seed.unwrap_or(config.default_seed),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Airport, FlightEdge};

    fn code(s: &str) -> AirportCode {
        AirportCode::parse(s).unwrap()
    }

    fn network() -> FlightNetwork {
        let mut builder = FlightNetwork::builder();
        for c in ["LAX", "SAN", "SNA", "SFO", "SEA", "PDX"] {
            builder.push_airport(Airport::new(code(c), c));
        }
        builder.push_edge(
            FlightEdge::new(code("LAX"), code("SFO"), 543.0, chrono::Duration::minutes(80))
                .unwrap(),
        );
        builder.build().unwrap()
    }

    fn validator() -> RequestValidator {
        RequestValidator::new([code("LAX"), code("SAN"), code("SNA")])
    }

    fn field_of(request: &ItineraryRequest) -> RequestField {
        validator()
            .validate(request, &network(), &SearchConfig::default())
            .unwrap_err()
            .field
    }

    #[test]
    fn valid_request_normalized() {
        let mut request = ItineraryRequest::new(" lax", &["sea ", "SFO", "pdx"]);
        request.objective = Some(Objective::Duration);
        request.max_iterations = Some(500);
        request.time_limit = Some(2.5);
        request.seed = Some(99);

        let validated = validator()
            .validate(&request, &network(), &SearchConfig::default())
            .unwrap();

        assert_eq!(validated.start, code("LAX"));
        assert_eq!(validated.targets, vec![code("PDX"), code("SEA"), code("SFO")]);
        assert_eq!(validated.objective, Objective::Duration);
        assert_eq!(validated.max_iterations, 500);
        assert_eq!(validated.time_limit, Duration::from_millis(2500));
        assert_eq!(validated.seed, 99);
    }

    #[test]
    fn defaults_come_from_config() {
        let config = SearchConfig::default();
        let validated = validator()
            .validate(&ItineraryRequest::new("SNA", &["SFO"]), &network(), &config)
            .unwrap();

        assert_eq!(validated.objective, Objective::Distance);
        assert_eq!(validated.max_iterations, config.default_max_iterations);
        assert_eq!(validated.time_limit, config.default_time_limit());
        assert_eq!(validated.seed, config.default_seed);
    }

    #[test]
    fn start_must_be_allowed_origin() {
        assert_eq!(field_of(&ItineraryRequest::new("SFO", &["SEA"])), RequestField::Start);
        assert_eq!(field_of(&ItineraryRequest::new("L@X", &["SEA"])), RequestField::Start);
    }

    #[test]
    fn start_must_be_in_network() {
        let validator = RequestValidator::new([code("ONT")]);
        let err = validator
            .validate(
                &ItineraryRequest::new("ONT", &["SEA"]),
                &network(),
                &SearchConfig::default(),
            )
            .unwrap_err();
        assert_eq!(err.field, RequestField::Start);
        assert_eq!(err.to_string(), "invalid start: ONT is not in the flight network");
    }

    #[test]
    fn unknown_target_names_targets() {
        let err = validator()
            .validate(
                &ItineraryRequest::new("LAX", &["XXX"]),
                &network(),
                &SearchConfig::default(),
            )
            .unwrap_err();
        assert_eq!(err.field, RequestField::Targets);
        assert_eq!(err.to_string(), "invalid targets: XXX is not in the flight network");
    }

    #[test]
    fn target_set_rules() {
        assert_eq!(field_of(&ItineraryRequest::new("LAX", &[])), RequestField::Targets);
        assert_eq!(
            field_of(&ItineraryRequest::new("LAX", &["SEA", "sea"])),
            RequestField::Targets
        );
        assert_eq!(
            field_of(&ItineraryRequest::new("LAX", &["SEA", "LAX"])),
            RequestField::Targets
        );
        assert_eq!(
            field_of(&ItineraryRequest::new("LAX", &["not a code"])),
            RequestField::Targets
        );
    }

    #[test]
    fn budgets_must_be_positive() {
        for bad in [0, -5] {
            let mut request = ItineraryRequest::new("LAX", &["SEA"]);
            request.max_iterations = Some(bad);
            assert_eq!(field_of(&request), RequestField::MaxIterations);
        }

        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY, 1e300] {
            let mut request = ItineraryRequest::new("LAX", &["SEA"]);
            request.time_limit = Some(bad);
            assert_eq!(field_of(&request), RequestField::TimeLimit);
        }
    }

    #[test]
    fn allowed_origins_sorted_and_deduplicated() {
        let validator = RequestValidator::new([code("SNA"), code("LAX"), code("SNA")]);
        assert_eq!(validator.allowed_origins(), &[code("LAX"), code("SNA")]);
        assert!(validator.is_allowed_origin(&code("LAX")));
        assert!(!validator.is_allowed_origin(&code("SAN")));
    }

    #[test]
    fn request_deserializes_with_defaults() {
        let request: ItineraryRequest =
            serde_json::from_str(r#"{"start": "LAX", "targets": ["SFO", "SEA"]}"#).unwrap();
        assert_eq!(request.start, "LAX");
        assert_eq!(request.targets, vec!["SFO", "SEA"]);
        assert!(request.objective.is_none());
        assert!(request.max_iterations.is_none());

        let request: ItineraryRequest = serde_json::from_str(
            r#"{"start": "LAX", "targets": ["SFO"], "objective": "hop_count", "time_limit": 1.5}"#,
        )
        .unwrap();
        assert_eq!(request.objective, Some(Objective::HopCount));
        assert_eq!(request.time_limit, Some(1.5));
    }
}
