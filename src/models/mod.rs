//! Data models for the weather explorer
//!
//! This module contains the core domain models organized by concern:
//! - Location: geocoding candidates and the selected place
//! - Weather: current conditions and the combined per-selection record
//! - Series: time-indexed parallel arrays returned by the forecast API

pub mod location;
pub mod series;
pub mod weather;

// Re-export all public types for convenient access
pub use location::Location;
pub use series::{Column, Series};
pub use weather::{CombinedWeatherData, CurrentWeather};
