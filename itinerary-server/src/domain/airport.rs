//! Airport codes and airport reference data.

use std::fmt;

use serde::{Serialize, Serializer};

/// Error returned when parsing an invalid airport code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid airport code: {reason}")]
pub struct InvalidAirportCode {
    reason: &'static str,
}

/// A valid airport code: a 3-character IATA code or a 4-character ICAO code.
///
/// Codes are uppercase ASCII letters or digits. This type guarantees
/// that any `AirportCode` value is valid by construction, and is `Copy`
/// so it can be used freely as a map key during search.
///
/// # Examples
///
/// ```
/// use itinerary_server::domain::AirportCode;
///
/// let lax = AirportCode::parse("LAX").unwrap();
/// assert_eq!(lax.as_str(), "LAX");
///
/// // ICAO codes are accepted too
/// assert!(AirportCode::parse("KLAX").is_ok());
///
/// // Lowercase is rejected by the strict parser
/// assert!(AirportCode::parse("lax").is_err());
///
/// // ...but accepted by the normalizing one
/// assert_eq!(AirportCode::parse_normalized(" lax ").unwrap(), lax);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AirportCode {
    bytes: [u8; 4],
    len: u8,
}

impl AirportCode {
    /// Parse an airport code from a string.
    ///
    /// The input must be 3 or 4 uppercase ASCII letters or digits.
    pub fn parse(s: &str) -> Result<Self, InvalidAirportCode> {
        let raw = s.as_bytes();

        if raw.len() != 3 && raw.len() != 4 {
            return Err(InvalidAirportCode {
                reason: "must be 3 (IATA) or 4 (ICAO) characters",
            });
        }

        let mut bytes = [0u8; 4];
        for (slot, &b) in bytes.iter_mut().zip(raw) {
            if !(b.is_ascii_uppercase() || b.is_ascii_digit()) {
                return Err(InvalidAirportCode {
                    reason: "must be uppercase ASCII letters or digits",
                });
            }
            *slot = b;
        }

        Ok(AirportCode {
            bytes,
            len: raw.len() as u8,
        })
    }

    /// Parse user input, trimming whitespace and uppercasing first.
    pub fn parse_normalized(s: &str) -> Result<Self, InvalidAirportCode> {
        Self::parse(&s.trim().to_ascii_uppercase())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        // SAFETY: We only store ASCII uppercase letters and digits
        std::str::from_utf8(&self.bytes[..self.len as usize]).unwrap()
    }
}

impl fmt::Debug for AirportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AirportCode({})", self.as_str())
    }
}

impl fmt::Display for AirportCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AirportCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Mean Earth radius used for great-circle distances.
    pub const EARTH_RADIUS_KM: f64 = 6371.0;

    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance in kilometers (haversine formula).
    ///
    /// Altitude is not taken into account.
    pub fn great_circle_km(&self, other: &Coordinates) -> f64 {
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lon = (other.longitude - self.longitude).to_radians();
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + (d_lon / 2.0).sin().powi(2) * lat1.cos() * lat2.cos();
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        Self::EARTH_RADIUS_KM * c
    }
}

/// An airport in the reference dataset.
///
/// Created when the network is loaded and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Airport {
    pub code: AirportCode,
    pub name: String,
    pub city: String,
    /// State or region.
    pub region: String,
    pub country: String,
    pub coordinates: Coordinates,
}

impl Airport {
    /// Create an airport with only a code and name (other fields empty).
    pub fn new(code: AirportCode, name: impl Into<String>) -> Self {
        Self {
            code,
            name: name.into(),
            city: String::new(),
            region: String::new(),
            country: String::new(),
            coordinates: Coordinates::new(0.0, 0.0),
        }
    }

    /// Set the location fields.
    pub fn located(
        mut self,
        city: impl Into<String>,
        region: impl Into<String>,
        country: impl Into<String>,
        coordinates: Coordinates,
    ) -> Self {
        self.city = city.into();
        self.region = region.into();
        self.country = country.into();
        self.coordinates = coordinates;
        self
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Roundtrip: parse then as_str returns the original
        #[test]
        fn roundtrip(s in "[A-Z0-9]{3,4}") {
            let code = AirportCode::parse(&s).unwrap();
            prop_assert_eq!(code.as_str(), s.as_str());
        }

        /// Normalized parse accepts lowercase input
        #[test]
        fn normalized_accepts_lowercase(s in "[a-z]{3}") {
            let code = AirportCode::parse_normalized(&s).unwrap();
            prop_assert_eq!(code.as_str(), s.to_ascii_uppercase());
        }

        /// Wrong-length strings are always rejected
        #[test]
        fn wrong_length_rejected(s in "[A-Z]{0,2}|[A-Z]{5,10}") {
            prop_assert!(AirportCode::parse(&s).is_err());
        }

        /// Distance is symmetric and non-negative
        #[test]
        fn great_circle_symmetric(
            lat1 in -89.0f64..89.0, lon1 in -179.0f64..179.0,
            lat2 in -89.0f64..89.0, lon2 in -179.0f64..179.0,
        ) {
            let a = Coordinates::new(lat1, lon1);
            let b = Coordinates::new(lat2, lon2);
            let ab = a.great_circle_km(&b);
            let ba = b.great_circle_km(&a);
            prop_assert!(ab >= 0.0);
            prop_assert!((ab - ba).abs() < 1e-6);
        }
    }
}
