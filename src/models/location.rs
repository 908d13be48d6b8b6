//! Location model for geocoding candidates

use serde::{Deserialize, Serialize};

/// A place returned by the geocoding API
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    /// Geocoding identifier (GeoNames id)
    pub id: u64,
    /// Place name
    pub name: String,
    /// Country name
    #[serde(default)]
    pub country: String,
    /// First-level administrative region (state, county, ...)
    #[serde(default)]
    pub admin1: Option<String>,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// ISO 3166-1 alpha-2 country code
    #[serde(default)]
    pub country_code: Option<String>,
    /// IANA timezone of the place
    #[serde(default)]
    pub timezone: Option<String>,
    /// Elevation in meters
    #[serde(default)]
    pub elevation: Option<f64>,
}

impl Location {
    /// Create a new location
    #[must_use]
    pub fn new(id: u64, name: &str, country: &str, latitude: f64, longitude: f64) -> Self {
        Self {
            id,
            name: name.to_string(),
            country: country.to_string(),
            admin1: None,
            latitude,
            longitude,
            country_code: None,
            timezone: None,
            elevation: None,
        }
    }

    /// Set the administrative region
    #[must_use]
    pub fn with_admin1(mut self, admin1: &str) -> Self {
        self.admin1 = Some(admin1.to_string());
        self
    }

    /// "Name, Country (Admin)" as shown in candidate lists
    #[must_use]
    pub fn display_name(&self) -> String {
        match &self.admin1 {
            Some(admin) => format!("{}, {} ({})", self.name, self.country, admin),
            None => format!("{}, {}", self.name, self.country),
        }
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_with_and_without_admin() {
        let london = Location::new(2643743, "London", "United Kingdom", 51.5074, -0.1278);
        assert_eq!(london.display_name(), "London, United Kingdom");

        let london = london.with_admin1("England");
        assert_eq!(london.display_name(), "London, United Kingdom (England)");
    }

    #[test]
    fn test_deserialize_geocoding_candidate() {
        let json = r#"{
            "id": 2643743,
            "name": "London",
            "latitude": 51.50853,
            "longitude": -0.12574,
            "elevation": 25.0,
            "feature_code": "PPLC",
            "country_code": "GB",
            "timezone": "Europe/London",
            "country": "United Kingdom",
            "admin1": "England"
        }"#;
        let location: Location = serde_json::from_str(json).unwrap();
        assert_eq!(location.id, 2643743);
        assert_eq!(location.admin1.as_deref(), Some("England"));
        assert_eq!(location.country_code.as_deref(), Some("GB"));
        assert_eq!(location.format_coordinates(), "51.5085, -0.1257");
    }

    #[test]
    fn test_deserialize_candidate_without_country() {
        let json = r#"{"id": 1, "name": "Nowhere", "latitude": 0.0, "longitude": 0.0}"#;
        let location: Location = serde_json::from_str(json).unwrap();
        assert_eq!(location.country, "");
        assert!(location.admin1.is_none());
    }
}
