//! Weather Explorer - location search, forecasts and weather map overlays
//!
//! This library searches places through the Open-Meteo geocoding API, loads
//! current, hourly and daily forecasts for the selected place, shapes them for
//! charting and spreads them over a synthetic map overlay.

pub mod api;
pub mod charts;
pub mod config;
pub mod error;
pub mod logging;
pub mod map;
pub mod models;
pub mod service;
pub mod shaper;
pub mod wmo;

// Re-export core types for public API
pub use api::{ForecastRequest, GeocodingRequest, OpenMeteoClient, WeatherApi};
pub use charts::{ChartView, CurrentPanel, DailyCard, daily_cards, daily_chart, hourly_chart};
pub use config::ExplorerConfig;
pub use error::ExplorerError;
pub use map::{MapView, OverlayCategory};
pub use models::{CombinedWeatherData, CurrentWeather, Location, Series};
pub use service::{LoadOutcome, SearchOutcome, ServiceEvent, ServiceState, WeatherService};
pub use shaper::{DailyPoint, HourlyPoint, shape_daily, shape_hourly};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, ExplorerError>;
