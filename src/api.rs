//! Weather API client for Open-Meteo
//!
//! Wraps the forecast and geocoding endpoints behind typed request builders.
//! Every call issues exactly one GET; failures (network, non-2xx, undecodable
//! bodies, misaligned series) are returned to the caller without retrying.

use crate::config::ApiConfig;
use crate::models::{CurrentWeather, Location, Series};
use crate::{ExplorerError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Variables requested for current conditions
pub const CURRENT_FIELDS: &[&str] = &[
    "temperature_2m",
    "relative_humidity_2m",
    "apparent_temperature",
    "precipitation",
    "rain",
    "showers",
    "snowfall",
    "weather_code",
    "cloud_cover",
    "pressure_msl",
    "surface_pressure",
    "wind_speed_10m",
    "wind_direction_10m",
    "wind_gusts_10m",
];

/// Variables requested for the hourly forecast
pub const HOURLY_FIELDS: &[&str] = &[
    "temperature_2m",
    "relative_humidity_2m",
    "apparent_temperature",
    "precipitation_probability",
    "precipitation",
    "rain",
    "showers",
    "snowfall",
    "weather_code",
    "cloud_cover",
    "pressure_msl",
    "surface_pressure",
    "wind_speed_10m",
    "wind_direction_10m",
    "wind_gusts_10m",
];

/// Variables requested for the daily forecast
pub const DAILY_FIELDS: &[&str] = &[
    "weather_code",
    "temperature_2m_max",
    "temperature_2m_min",
    "apparent_temperature_max",
    "apparent_temperature_min",
    "sunrise",
    "sunset",
    "precipitation_sum",
    "rain_sum",
    "showers_sum",
    "snowfall_sum",
    "precipitation_hours",
    "precipitation_probability_max",
    "wind_speed_10m_max",
    "wind_gusts_10m_max",
    "wind_direction_10m_dominant",
];

/// Default number of days for the hourly preset
pub const DEFAULT_HOURLY_DAYS: u32 = 3;
/// Default number of days for the daily preset
pub const DEFAULT_DAILY_DAYS: u32 = 7;

/// Parameters of one forecast request
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: Option<String>,
    pub current: Vec<String>,
    pub hourly: Vec<String>,
    pub daily: Vec<String>,
    pub forecast_days: Option<u32>,
    pub past_days: Option<u32>,
}

impl ForecastRequest {
    /// Request for a coordinate with no variables selected yet
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            timezone: None,
            current: Vec::new(),
            hourly: Vec::new(),
            daily: Vec::new(),
            forecast_days: None,
            past_days: None,
        }
    }

    /// Current-conditions preset
    #[must_use]
    pub fn current_conditions(latitude: f64, longitude: f64) -> Self {
        Self::new(latitude, longitude).with_current(CURRENT_FIELDS)
    }

    /// Hourly preset covering `days` forecast days
    #[must_use]
    pub fn hourly_outlook(latitude: f64, longitude: f64, days: u32) -> Self {
        Self::new(latitude, longitude)
            .with_hourly(HOURLY_FIELDS)
            .with_forecast_days(days)
    }

    /// Daily preset covering `days` forecast days
    #[must_use]
    pub fn daily_outlook(latitude: f64, longitude: f64, days: u32) -> Self {
        Self::new(latitude, longitude)
            .with_daily(DAILY_FIELDS)
            .with_forecast_days(days)
    }

    #[must_use]
    pub fn with_timezone(mut self, timezone: Option<&str>) -> Self {
        self.timezone = timezone.map(str::to_string);
        self
    }

    #[must_use]
    pub fn with_current(mut self, fields: &[&str]) -> Self {
        self.current = fields.iter().map(|f| (*f).to_string()).collect();
        self
    }

    #[must_use]
    pub fn with_hourly(mut self, fields: &[&str]) -> Self {
        self.hourly = fields.iter().map(|f| (*f).to_string()).collect();
        self
    }

    #[must_use]
    pub fn with_daily(mut self, fields: &[&str]) -> Self {
        self.daily = fields.iter().map(|f| (*f).to_string()).collect();
        self
    }

    #[must_use]
    pub fn with_forecast_days(mut self, days: u32) -> Self {
        self.forecast_days = Some(days);
        self
    }

    #[must_use]
    pub fn with_past_days(mut self, days: u32) -> Self {
        self.past_days = Some(days);
        self
    }

    /// Query parameters in request order; empty field lists are omitted
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("latitude", self.latitude.to_string()),
            ("longitude", self.longitude.to_string()),
        ];
        if let Some(timezone) = &self.timezone {
            pairs.push(("timezone", timezone.clone()));
        }
        for (key, fields) in [
            ("current", &self.current),
            ("hourly", &self.hourly),
            ("daily", &self.daily),
        ] {
            if !fields.is_empty() {
                pairs.push((key, fields.join(",")));
            }
        }
        if let Some(days) = self.forecast_days {
            pairs.push(("forecast_days", days.to_string()));
        }
        if let Some(days) = self.past_days {
            pairs.push(("past_days", days.to_string()));
        }
        pairs
    }

    /// Full request URL against `base_url` (e.g. `https://api.open-meteo.com/v1`)
    #[must_use]
    pub fn url(&self, base_url: &str) -> String {
        format!(
            "{}/forecast?{}",
            base_url.trim_end_matches('/'),
            encode_query(&self.query_pairs())
        )
    }
}

/// Geocoding response format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeocodingFormat {
    Json,
    GeoJson,
}

impl GeocodingFormat {
    fn as_str(self) -> &'static str {
        match self {
            GeocodingFormat::Json => "json",
            GeocodingFormat::GeoJson => "geojson",
        }
    }
}

/// Parameters of one geocoding search
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodingRequest {
    pub name: String,
    pub count: Option<u32>,
    pub language: Option<String>,
    pub format: Option<GeocodingFormat>,
}

impl GeocodingRequest {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            count: None,
            language: None,
            format: None,
        }
    }

    #[must_use]
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    #[must_use]
    pub fn with_language(mut self, language: Option<&str>) -> Self {
        self.language = language.map(str::to_string);
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: GeocodingFormat) -> Self {
        self.format = Some(format);
        self
    }

    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("name", self.name.clone())];
        if let Some(count) = self.count {
            pairs.push(("count", count.to_string()));
        }
        if let Some(language) = &self.language {
            pairs.push(("language", language.clone()));
        }
        if let Some(format) = self.format {
            pairs.push(("format", format.as_str().to_string()));
        }
        pairs
    }

    #[must_use]
    pub fn url(&self, base_url: &str) -> String {
        format!(
            "{}/search?{}",
            base_url.trim_end_matches('/'),
            encode_query(&self.query_pairs())
        )
    }
}

fn encode_query(pairs: &[(&'static str, String)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Decoded forecast response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(default)]
    pub timezone: Option<String>,
    /// Offset of the series' local timestamps from UTC
    #[serde(default)]
    pub utc_offset_seconds: i32,
    #[serde(default)]
    pub current: Option<CurrentWeather>,
    #[serde(default)]
    pub hourly: Option<Series>,
    #[serde(default)]
    pub daily: Option<Series>,
}

impl ForecastResponse {
    /// Reject series whose columns disagree with their time axis
    pub fn validate(&self) -> Result<()> {
        if let Some(hourly) = &self.hourly {
            hourly.validate("hourly")?;
        }
        if let Some(daily) = &self.daily {
            daily.validate("daily")?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Option<Vec<Location>>,
}

/// Asynchronous access to the forecast and geocoding endpoints
#[async_trait]
pub trait WeatherApi: Send + Sync {
    /// Search for places matching a free-text name
    async fn geocode(&self, request: &GeocodingRequest) -> Result<Vec<Location>>;

    /// Issue one forecast request
    async fn forecast(&self, request: &ForecastRequest) -> Result<ForecastResponse>;

    /// Current conditions for a coordinate
    async fn current_weather(&self, latitude: f64, longitude: f64) -> Result<ForecastResponse> {
        self.forecast(&ForecastRequest::current_conditions(latitude, longitude))
            .await
    }

    /// Hourly forecast for a coordinate
    async fn hourly_forecast(
        &self,
        latitude: f64,
        longitude: f64,
        days: u32,
    ) -> Result<ForecastResponse> {
        self.forecast(&ForecastRequest::hourly_outlook(latitude, longitude, days))
            .await
    }

    /// Daily forecast for a coordinate
    async fn daily_forecast(
        &self,
        latitude: f64,
        longitude: f64,
        days: u32,
    ) -> Result<ForecastResponse> {
        self.forecast(&ForecastRequest::daily_outlook(latitude, longitude, days))
            .await
    }
}

/// HTTP client for the Open-Meteo APIs
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: Client,
    forecast_base_url: String,
    geocoding_base_url: String,
}

impl OpenMeteoClient {
    /// Create a new client from the API configuration
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ExplorerError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            forecast_base_url: config.forecast_base_url.clone(),
            geocoding_base_url: config.geocoding_base_url.clone(),
        })
    }

    /// Forecast response body as JSON, unchanged
    #[instrument(skip(self, request), fields(lat = request.latitude, lon = request.longitude))]
    pub async fn forecast_json(&self, request: &ForecastRequest) -> Result<serde_json::Value> {
        let url = request.url(&self.forecast_base_url);
        self.get_json(&url, "forecast").await
    }

    /// Geocoding response body as JSON, unchanged
    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn geocode_json(&self, request: &GeocodingRequest) -> Result<serde_json::Value> {
        let url = request.url(&self.geocoding_base_url);
        self.get_json(&url, "geocoding").await
    }

    async fn get_json(&self, url: &str, endpoint: &str) -> Result<serde_json::Value> {
        debug!("Open-Meteo {} request URL: {}", endpoint, url);
        let start_time = Instant::now();

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!("Network error calling {} endpoint: {}", endpoint, e);
            ExplorerError::api(format!("{endpoint} request failed: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("{} endpoint returned HTTP {}", endpoint, status);
            return Err(ExplorerError::api(format!(
                "{endpoint} request failed with status {status}: {body}"
            )));
        }

        let body: serde_json::Value = response.json().await.map_err(|e| {
            ExplorerError::api(format!("Invalid {endpoint} data received from Open-Meteo: {e}"))
        })?;

        let total_duration = start_time.elapsed();
        debug!(
            "{} response received in {:.3}s",
            endpoint,
            total_duration.as_secs_f64()
        );
        if total_duration.as_secs() > 5 {
            warn!(
                "Slow {} response: {:.3}s",
                endpoint,
                total_duration.as_secs_f64()
            );
        }

        Ok(body)
    }
}

#[async_trait]
impl WeatherApi for OpenMeteoClient {
    async fn geocode(&self, request: &GeocodingRequest) -> Result<Vec<Location>> {
        info!("Geocoding location: '{}'", request.name);
        let body = self.geocode_json(request).await?;
        let response: GeocodingResponse = serde_json::from_value(body)?;
        let results = response.results.unwrap_or_default();

        if results.is_empty() {
            info!("No results found for location '{}'", request.name);
        } else {
            info!(
                "Found {} geocoding results for '{}'",
                results.len(),
                request.name
            );
            debug!(
                "Geocoding results: {:?}",
                results
                    .iter()
                    .map(|r| format!("{} ({:.4}, {:.4})", r.name, r.latitude, r.longitude))
                    .collect::<Vec<_>>()
            );
        }
        Ok(results)
    }

    async fn forecast(&self, request: &ForecastRequest) -> Result<ForecastResponse> {
        let body = self.forecast_json(request).await?;
        let response: ForecastResponse = serde_json::from_value(body)?;
        response.validate()?;

        info!(
            "Retrieved forecast for {:.4}, {:.4} (hourly steps: {}, daily steps: {})",
            request.latitude,
            request.longitude,
            response.hourly.as_ref().map_or(0, Series::len),
            response.daily.as_ref().map_or(0, Series::len),
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forecast_presets() {
        let current = ForecastRequest::current_conditions(51.5, -0.12);
        assert_eq!(current.current.len(), CURRENT_FIELDS.len());
        assert!(current.hourly.is_empty());
        assert!(current.forecast_days.is_none());

        let hourly = ForecastRequest::hourly_outlook(51.5, -0.12, DEFAULT_HOURLY_DAYS);
        assert_eq!(hourly.forecast_days, Some(3));
        assert!(hourly.hourly.contains(&"precipitation_probability".to_string()));

        let daily = ForecastRequest::daily_outlook(51.5, -0.12, DEFAULT_DAILY_DAYS);
        assert_eq!(daily.forecast_days, Some(7));
        assert_eq!(daily.daily.first().map(String::as_str), Some("weather_code"));
    }

    #[test]
    fn test_forecast_query_joins_field_lists() {
        let request = ForecastRequest::new(51.5074, -0.1278)
            .with_hourly(&["temperature_2m", "precipitation"])
            .with_timezone(Some("Europe/London"))
            .with_forecast_days(3)
            .with_past_days(1);
        let pairs = request.query_pairs();
        assert_eq!(
            pairs,
            vec![
                ("latitude", "51.5074".to_string()),
                ("longitude", "-0.1278".to_string()),
                ("timezone", "Europe/London".to_string()),
                ("hourly", "temperature_2m,precipitation".to_string()),
                ("forecast_days", "3".to_string()),
                ("past_days", "1".to_string()),
            ]
        );

        let url = request.url("https://api.open-meteo.com/v1/");
        assert!(url.starts_with("https://api.open-meteo.com/v1/forecast?latitude=51.5074"));
        assert!(url.contains("timezone=Europe%2FLondon"));
        assert!(url.contains("hourly=temperature_2m%2Cprecipitation"));
    }

    #[test]
    fn test_geocoding_url_encodes_name() {
        let request = GeocodingRequest::new("São Paulo")
            .with_count(5)
            .with_language(Some("en"))
            .with_format(GeocodingFormat::Json);
        let url = request.url("https://geocoding-api.open-meteo.com/v1");
        assert_eq!(
            url,
            "https://geocoding-api.open-meteo.com/v1/search?name=S%C3%A3o%20Paulo&count=5&language=en&format=json"
        );
    }

    #[test]
    fn test_forecast_response_validation() {
        let json = r#"{
            "latitude": 51.5,
            "longitude": -0.12,
            "utc_offset_seconds": 3600,
            "hourly": {"time": ["2024-05-01T00:00", "2024-05-01T01:00"], "temperature_2m": [9.1]}
        }"#;
        let response: ForecastResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.utc_offset_seconds, 3600);
        assert!(matches!(
            response.validate(),
            Err(ExplorerError::MalformedSeries { .. })
        ));
    }
}
