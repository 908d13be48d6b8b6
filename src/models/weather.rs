//! Current conditions and the combined per-selection weather record

use super::{Location, Series};
use crate::wmo;
use serde::{Deserialize, Deserializer, Serialize};

/// Instantaneous measurements from the forecast API's `current` block.
///
/// Absent or `null` measurements read as 0. `weather_description` and
/// `weather_icon` are derived from `weather_code` by [`CurrentWeather::enrich`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    /// Observation time (`2024-05-01T13:15`)
    #[serde(default)]
    pub time: String,
    /// Temperature in °C
    #[serde(default, deserialize_with = "zero_if_null")]
    pub temperature_2m: f64,
    /// Relative humidity in %
    #[serde(default, deserialize_with = "zero_if_null")]
    pub relative_humidity_2m: f64,
    /// Apparent ("feels like") temperature in °C
    #[serde(default, deserialize_with = "zero_if_null")]
    pub apparent_temperature: f64,
    /// Precipitation in mm
    #[serde(default, deserialize_with = "zero_if_null")]
    pub precipitation: f64,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub rain: f64,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub showers: f64,
    /// Snowfall in cm
    #[serde(default, deserialize_with = "zero_if_null")]
    pub snowfall: f64,
    /// WMO weather code
    #[serde(default, deserialize_with = "code_zero_if_null")]
    pub weather_code: i32,
    /// Cloud cover in %
    #[serde(default, deserialize_with = "zero_if_null")]
    pub cloud_cover: f64,
    /// Sea-level pressure in hPa
    #[serde(default, deserialize_with = "zero_if_null")]
    pub pressure_msl: f64,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub surface_pressure: f64,
    /// Wind speed in km/h
    #[serde(default, deserialize_with = "zero_if_null")]
    pub wind_speed_10m: f64,
    /// Wind direction in degrees
    #[serde(default, deserialize_with = "zero_if_null")]
    pub wind_direction_10m: f64,
    #[serde(default, deserialize_with = "zero_if_null")]
    pub wind_gusts_10m: f64,
    /// 1 during daylight, 0 at night; only present when requested
    #[serde(default)]
    pub is_day: Option<u8>,
    #[serde(default)]
    pub weather_description: String,
    #[serde(default)]
    pub weather_icon: String,
}

impl CurrentWeather {
    /// Daytime unless the API explicitly reported night
    #[must_use]
    pub fn is_daytime(&self) -> bool {
        self.is_day.is_none_or(|flag| flag != 0)
    }

    /// Fill the derived description and icon from the weather code
    pub fn enrich(&mut self) {
        self.weather_description = wmo::describe(self.weather_code).to_string();
        self.weather_icon = wmo::icon_for(self.weather_code, self.is_daytime()).to_string();
    }

    /// Consuming variant of [`CurrentWeather::enrich`]
    #[must_use]
    pub fn enriched(mut self) -> Self {
        self.enrich();
        self
    }
}

/// Everything loaded for one selected location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedWeatherData {
    pub location: Location,
    pub current: CurrentWeather,
    pub hourly: Series,
    pub daily: Series,
    /// Offset of the series' local timestamps from UTC
    #[serde(default)]
    pub utc_offset_seconds: i32,
}

fn zero_if_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

fn code_zero_if_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    Ok(Option::<i32>::deserialize(deserializer)?.unwrap_or(0))
}
