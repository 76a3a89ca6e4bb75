//! Loading the flight network from JSON reference data.
//!
//! Two kinds of file are read: one airport list, and any number of flight
//! lists. Flight records name their endpoints by IATA code where one is
//! known and fall back to ICAO, so the loader resolves both to the code the
//! airport was declared under.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::Deserialize;
use tracing::{debug, info};

use super::{FlightNetwork, FlightNetworkBuilder};
use crate::domain::{Airport, AirportCode, Coordinates, DataError, FlightEdge};

/// One airport in the airport list.
#[derive(Debug, Deserialize)]
struct AirportRecord {
    #[serde(default, alias = "iata")]
    code: Option<String>,
    #[serde(default)]
    icao: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    city: String,
    #[serde(default, alias = "region")]
    state: String,
    #[serde(default)]
    country: String,
    #[serde(alias = "lat")]
    latitude: f64,
    #[serde(alias = "lon", alias = "lng")]
    longitude: f64,
}

/// One flight in a flight list.
#[derive(Debug, Deserialize)]
struct FlightRecord {
    #[serde(default)]
    flight: String,
    #[serde(default, rename = "type")]
    aircraft_type: String,
    #[serde(default)]
    reg: String,
    #[serde(default)]
    orig_iata: Option<String>,
    #[serde(default)]
    orig_icao: Option<String>,
    #[serde(default)]
    dest_iata: Option<String>,
    #[serde(default)]
    dest_icao: Option<String>,
    #[serde(default)]
    circle_distance: Option<f64>,
    #[serde(default)]
    actual_distance: Option<f64>,
    #[serde(default)]
    flight_time: Option<FlightTime>,
}

/// Flight time as minutes or as a clock-style string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FlightTime {
    Minutes(f64),
    Clock(String),
}

impl FlightTime {
    fn to_duration(&self) -> Option<Duration> {
        match self {
            FlightTime::Minutes(mins) if mins.is_finite() && *mins >= 0.0 => {
                Some(Duration::seconds((mins * 60.0).round() as i64))
            }
            FlightTime::Minutes(_) => None,
            FlightTime::Clock(s) => parse_clock_duration(s),
        }
    }
}

/// Parse "H:MM" or "H:MM:SS" into a duration.
fn parse_clock_duration(s: &str) -> Option<Duration> {
    let parts: Vec<&str> = s.trim().split(':').collect();
    let (h, m, sec) = match parts.as_slice() {
        [h, m] => (*h, *m, "0"),
        [h, m, sec] => (*h, *m, *sec),
        _ => return None,
    };
    let h: i64 = h.parse().ok()?;
    let m: i64 = m.parse().ok()?;
    let sec: i64 = sec.parse().ok()?;
    if h < 0 || !(0..60).contains(&m) || !(0..60).contains(&sec) {
        return None;
    }
    Some(Duration::seconds(h * 3600 + m * 60 + sec))
}

/// First non-empty code among the candidates.
fn pick_code<'a>(candidates: &[&'a Option<String>]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|c| c.as_deref())
        .map(str::trim)
        .find(|c| !c.is_empty())
}

/// Reads airport and flight files into a [`FlightNetwork`].
#[derive(Debug, Clone)]
pub struct NetworkLoader {
    airports_path: PathBuf,
    flight_paths: Vec<PathBuf>,
}

impl NetworkLoader {
    /// Create a loader for the given airport list.
    pub fn new(airports_path: impl Into<PathBuf>) -> Self {
        Self {
            airports_path: airports_path.into(),
            flight_paths: Vec::new(),
        }
    }

    /// Add a flight list.
    pub fn with_flights(mut self, path: impl Into<PathBuf>) -> Self {
        self.flight_paths.push(path.into());
        self
    }

    /// Read every file and build the network.
    pub fn load(&self) -> Result<FlightNetwork, DataError> {
        let mut parser = NetworkParser::default();

        let contents = read_file(&self.airports_path)?;
        parser.airports(&contents, &self.airports_path.display().to_string())?;

        for path in &self.flight_paths {
            let contents = read_file(path)?;
            parser.flights(&contents, &path.display().to_string())?;
        }

        let network = parser.finish()?;
        info!(
            airports = network.airport_count(),
            flights = network.edge_count(),
            "loaded flight network"
        );
        Ok(network)
    }
}

/// Convenience wrapper around [`NetworkLoader`].
pub fn load_network<A: AsRef<Path>, F: AsRef<Path>>(
    airports_path: A,
    flight_paths: &[F],
) -> Result<FlightNetwork, DataError> {
    flight_paths
        .iter()
        .fold(
            NetworkLoader::new(airports_path.as_ref()),
            |loader, path| loader.with_flights(path.as_ref()),
        )
        .load()
}

fn read_file(path: &Path) -> Result<String, DataError> {
    std::fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Incremental parser from JSON text to a network.
///
/// Airports must be fed before the flights that reference them.
#[derive(Debug, Default)]
pub struct NetworkParser {
    builder: FlightNetworkBuilder,
    /// Every accepted spelling of a code, mapped to the declared code.
    aliases: HashMap<AirportCode, AirportCode>,
    coordinates: HashMap<AirportCode, Coordinates>,
}

impl NetworkParser {
    /// Parse an airport list.
    pub fn airports(&mut self, json: &str, source: &str) -> Result<usize, DataError> {
        let records: Vec<AirportRecord> =
            serde_json::from_str(json).map_err(|e| DataError::Parse {
                path: source.to_string(),
                source: e,
            })?;

        let invalid = |index: usize, reason: String| DataError::InvalidRecord {
            path: source.to_string(),
            index,
            reason,
        };

        let count = records.len();
        for (index, rec) in records.into_iter().enumerate() {
            let primary = pick_code(&[&rec.code, &rec.icao])
                .ok_or_else(|| invalid(index, "missing airport code".to_string()))?;
            let code = AirportCode::parse_normalized(primary)
                .map_err(|e| invalid(index, e.to_string()))?;

            self.aliases.insert(code, code);
            if let Some(icao) = pick_code(&[&rec.icao])
                && let Ok(icao) = AirportCode::parse_normalized(icao)
            {
                self.aliases.entry(icao).or_insert(code);
            }

            let coordinates = Coordinates::new(rec.latitude, rec.longitude);
            self.coordinates.insert(code, coordinates);
            self.builder.push_airport(
                Airport::new(code, rec.name).located(rec.city, rec.state, rec.country, coordinates),
            );
        }

        debug!(source, count, "parsed airports");
        Ok(count)
    }

    /// Parse a flight list.
    pub fn flights(&mut self, json: &str, source: &str) -> Result<usize, DataError> {
        let records: Vec<FlightRecord> =
            serde_json::from_str(json).map_err(|e| DataError::Parse {
                path: source.to_string(),
                source: e,
            })?;

        let invalid = |index: usize, reason: String| DataError::InvalidRecord {
            path: source.to_string(),
            index,
            reason,
        };

        let count = records.len();
        for (index, rec) in records.into_iter().enumerate() {
            let origin = self.resolve(pick_code(&[&rec.orig_iata, &rec.orig_icao]), index, source, "origin")?;
            let destination =
                self.resolve(pick_code(&[&rec.dest_iata, &rec.dest_icao]), index, source, "destination")?;

            let distance = match rec.circle_distance.or(rec.actual_distance) {
                Some(d) => d,
                None => match (self.coordinates.get(&origin), self.coordinates.get(&destination)) {
                    (Some(a), Some(b)) => a.great_circle_km(b),
                    _ => {
                        return Err(invalid(
                            index,
                            "no distance and endpoints have no coordinates".to_string(),
                        ));
                    }
                },
            };

            let duration = rec
                .flight_time
                .as_ref()
                .ok_or_else(|| invalid(index, "missing flight_time".to_string()))?
                .to_duration()
                .ok_or_else(|| invalid(index, "unreadable flight_time".to_string()))?;

            let edge = FlightEdge::new(origin, destination, distance, duration)?.with_details(
                rec.flight,
                rec.aircraft_type,
                rec.reg,
            );
            self.builder.push_edge(edge);
        }

        debug!(source, count, "parsed flights");
        Ok(count)
    }

    /// Build the network from everything parsed so far.
    pub fn finish(self) -> Result<FlightNetwork, DataError> {
        self.builder.build()
    }

    /// Parse a code from a flight record and map it to its declared code.
    ///
    /// Codes with no known airport pass through unchanged so that the
    /// network build reports them as unknown.
    fn resolve(
        &self,
        raw: Option<&str>,
        index: usize,
        source: &str,
        which: &str,
    ) -> Result<AirportCode, DataError> {
        let invalid = |reason: String| DataError::InvalidRecord {
            path: source.to_string(),
            index,
            reason,
        };
        let raw = raw.ok_or_else(|| invalid(format!("missing {which} code")))?;
        let code = AirportCode::parse_normalized(raw).map_err(|e| invalid(format!("{which}: {e}")))?;
        Ok(self.aliases.get(&code).copied().unwrap_or(code))
    }
}
