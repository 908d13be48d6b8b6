//! Forecast data shaping
//!
//! Turns parallel-array series into per-step records for the chart renderers.
//! Missing columns and `null` values read as 0; an empty time axis yields no
//! records.

use crate::models::Series;
use crate::models::series::{parse_date, parse_timestamp};
use crate::wmo;
use chrono::{Datelike, Timelike};
use serde::Serialize;

/// The hourly chart shows at most one day
pub const HOURLY_LIMIT: usize = 24;

/// One hour of the hourly chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyPoint {
    /// 12-hour clock label, e.g. "3 PM"
    pub label: String,
    pub full_time: String,
    pub temperature: f64,
    pub apparent_temperature: f64,
    pub precipitation: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub cloud_cover: f64,
}

/// One day of the daily chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPoint {
    /// Short weekday plus day of month, e.g. "Wed 1"
    pub label: String,
    pub full_date: String,
    pub temp_max: f64,
    pub temp_min: f64,
    pub precipitation: f64,
    pub weather_code: i32,
    /// Empty when the series carries no weather codes
    pub weather_description: String,
    pub precipitation_probability: f64,
    pub wind_speed: f64,
}

/// Shape the first 24 steps of an hourly series
#[must_use]
pub fn shape_hourly(series: &Series) -> Vec<HourlyPoint> {
    series
        .time
        .iter()
        .take(HOURLY_LIMIT)
        .enumerate()
        .map(|(i, time)| HourlyPoint {
            label: hour_label(time),
            full_time: time.clone(),
            temperature: series.number_or_zero("temperature_2m", i),
            apparent_temperature: series.number_or_zero("apparent_temperature", i),
            precipitation: series.number_or_zero("precipitation", i),
            humidity: series.number_or_zero("relative_humidity_2m", i),
            wind_speed: series.number_or_zero("wind_speed_10m", i),
            cloud_cover: series.number_or_zero("cloud_cover", i),
        })
        .collect()
}

/// Shape every step of a daily series
#[must_use]
pub fn shape_daily(series: &Series) -> Vec<DailyPoint> {
    let has_codes = series.has("weather_code");

    series
        .time
        .iter()
        .enumerate()
        .map(|(i, date)| {
            let weather_code = series.number_or_zero("weather_code", i).round() as i32;
            let weather_description = if has_codes {
                wmo::describe(weather_code).to_string()
            } else {
                String::new()
            };

            DailyPoint {
                label: day_label(date),
                full_date: date.clone(),
                temp_max: series.number_or_zero("temperature_2m_max", i),
                temp_min: series.number_or_zero("temperature_2m_min", i),
                precipitation: series.number_or_zero("precipitation_sum", i),
                weather_code,
                weather_description,
                precipitation_probability: series
                    .number_or_zero("precipitation_probability_max", i),
                wind_speed: series.number_or_zero("wind_speed_10m_max", i),
            }
        })
        .collect()
}

/// Round half up for display, never yielding negative zero (-0.3 → 0, -2.5 → -2)
#[must_use]
pub fn display_round(value: f64) -> f64 {
    (value + 0.5).floor() + 0.0
}

/// "12 AM", "1 AM" ... "12 PM", "1 PM" ...; the raw text when unparseable
#[must_use]
pub fn hour_label(raw: &str) -> String {
    let Some(timestamp) = parse_timestamp(raw) else {
        return raw.to_string();
    };
    match timestamp.hour() {
        0 => "12 AM".to_string(),
        12 => "12 PM".to_string(),
        h if h > 12 => format!("{} PM", h - 12),
        h => format!("{h} AM"),
    }
}

/// "Wed 1"; the raw text when unparseable
#[must_use]
pub fn day_label(raw: &str) -> String {
    match parse_date(raw) {
        Some(date) => format!("{} {}", date.weekday(), date.day()),
        None => raw.to_string(),
    }
}
