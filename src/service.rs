//! Search and load orchestration
//!
//! [`WeatherService`] owns the search state (query, candidates, selection,
//! loading flag, user-facing error) and drives the API: geocoding on search,
//! then three concurrent forecast fetches per selected location. Every load is
//! tagged with a generation; a load that finishes after a newer selection
//! started is dropped without touching the state.

use crate::api::{ForecastRequest, GeocodingRequest, WeatherApi};
use crate::config::ExplorerConfig;
use crate::models::{CombinedWeatherData, Location};
use crate::{ExplorerError, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, error, info, instrument, warn};

pub const NO_LOCATIONS_FOUND: &str = "No locations found. Try a different search term.";
pub const SEARCH_FAILED: &str = "Error searching for locations. Please try again.";
pub const LOAD_FAILED: &str = "Error loading weather data. Please try again.";

/// Notifications for views that follow the selection
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceEvent {
    LocationChanged(Location),
    WeatherLoaded(Arc<CombinedWeatherData>),
}

/// Observable state of the search panel
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceState {
    pub query: String,
    pub candidates: Vec<Location>,
    pub selected: Option<Location>,
    pub weather: Option<Arc<CombinedWeatherData>>,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Blank query, nothing was requested
    Rejected,
    Found(usize),
    Empty,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Published,
    /// A newer selection started while this load was in flight
    Superseded,
    Failed,
}

/// Settings the service reads from [`ExplorerConfig`]
#[derive(Debug, Clone)]
struct ServiceSettings {
    initial_location: String,
    result_count: u32,
    language: Option<String>,
    hourly_days: u32,
    daily_days: u32,
    timezone: Option<String>,
}

impl From<&ExplorerConfig> for ServiceSettings {
    fn from(config: &ExplorerConfig) -> Self {
        Self {
            initial_location: config.search.initial_location.clone(),
            result_count: config.search.result_count,
            language: config.search.language.clone(),
            hourly_days: config.forecast.hourly_days,
            daily_days: config.forecast.daily_days,
            timezone: config.forecast.timezone.clone(),
        }
    }
}

pub struct WeatherService<A: WeatherApi> {
    api: Arc<A>,
    settings: Arc<ServiceSettings>,
    state: Arc<Mutex<ServiceState>>,
    generation: Arc<AtomicU64>,
    events: mpsc::UnboundedSender<ServiceEvent>,
}

impl<A: WeatherApi> Clone for WeatherService<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            settings: Arc::clone(&self.settings),
            state: Arc::clone(&self.state),
            generation: Arc::clone(&self.generation),
            events: self.events.clone(),
        }
    }
}

impl<A: WeatherApi> WeatherService<A> {
    /// Create a service and the receiving end of its event stream
    pub fn new(
        api: Arc<A>,
        config: &ExplorerConfig,
    ) -> (Self, mpsc::UnboundedReceiver<ServiceEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let service = Self {
            api,
            settings: Arc::new(ServiceSettings::from(config)),
            state: Arc::new(Mutex::new(ServiceState::default())),
            generation: Arc::new(AtomicU64::new(0)),
            events,
        };
        (service, receiver)
    }

    /// Search for the configured initial location
    pub async fn start(&self) -> SearchOutcome {
        let initial = self.settings.initial_location.clone();
        self.search(&initial).await
    }

    /// Copy of the current state
    pub async fn snapshot(&self) -> ServiceState {
        self.state.lock().await.clone()
    }

    /// Geocode `query` and replace the candidate list.
    ///
    /// When candidates arrive and nothing is selected yet, the first one is
    /// selected and loaded before this returns.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> SearchOutcome {
        let query = query.trim();
        if query.is_empty() {
            debug!("Ignoring blank search query");
            return SearchOutcome::Rejected;
        }

        {
            let mut state = self.state.lock().await;
            state.query = query.to_string();
            state.loading = true;
            state.error = None;
        }

        let request = GeocodingRequest::new(query)
            .with_count(self.settings.result_count)
            .with_language(self.settings.language.as_deref());
        let result = self.api.geocode(&request).await;

        let auto_select = {
            let mut state = self.state.lock().await;
            state.loading = false;
            match result {
                Ok(locations) if locations.is_empty() => {
                    info!("No locations found for '{}'", query);
                    state.candidates.clear();
                    state.error = Some(NO_LOCATIONS_FOUND.to_string());
                    return SearchOutcome::Empty;
                }
                Ok(locations) => {
                    let count = locations.len();
                    state.candidates = locations;
                    state.error = None;
                    let first = state.candidates.first().cloned();
                    (state.selected.is_none(), first, count)
                }
                Err(e) => {
                    error!("Location search for '{}' failed: {}", query, e);
                    state.error = Some(SEARCH_FAILED.to_string());
                    return SearchOutcome::Failed;
                }
            }
        };

        let (nothing_selected, first, count) = auto_select;
        if nothing_selected && let Some(first) = first {
            info!("Auto-selecting first result: {}", first.display_name());
            self.select_location(first).await;
        }
        SearchOutcome::Found(count)
    }

    /// Select a location and load its weather
    #[instrument(skip(self, location), fields(location = %location.name))]
    pub async fn select_location(&self, location: Location) -> LoadOutcome {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.state.lock().await;
            state.selected = Some(location.clone());
            state.loading = true;
            state.error = None;
        }
        self.publish(ServiceEvent::LocationChanged(location.clone()));

        let result = self.load(location).await;

        let mut state = self.state.lock().await;
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("Discarding stale load (generation {})", generation);
            return LoadOutcome::Superseded;
        }
        state.loading = false;

        match result {
            Ok(data) => {
                let data = Arc::new(data);
                state.weather = Some(Arc::clone(&data));
                drop(state);
                self.publish(ServiceEvent::WeatherLoaded(data));
                LoadOutcome::Published
            }
            Err(e) => {
                error!("Failed to load weather data: {}", e);
                state.error = Some(LOAD_FAILED.to_string());
                LoadOutcome::Failed
            }
        }
    }

    /// Fetch current, hourly and daily data; all three must succeed
    async fn load(&self, location: Location) -> Result<CombinedWeatherData> {
        let (lat, lon) = (location.latitude, location.longitude);
        let timezone = self.settings.timezone.as_deref();

        let current_request = ForecastRequest::current_conditions(lat, lon).with_timezone(timezone);
        let hourly_request = ForecastRequest::hourly_outlook(lat, lon, self.settings.hourly_days)
            .with_timezone(timezone);
        let daily_request = ForecastRequest::daily_outlook(lat, lon, self.settings.daily_days)
            .with_timezone(timezone);

        let (current, hourly, daily) = futures::try_join!(
            self.api.forecast(&current_request),
            self.api.forecast(&hourly_request),
            self.api.forecast(&daily_request),
        )?;

        let current = current
            .current
            .ok_or_else(|| ExplorerError::api("Forecast response has no current conditions"))?
            .enriched();
        if hourly.hourly.is_none() {
            warn!("Forecast response has no hourly series");
        }

        Ok(CombinedWeatherData {
            location,
            current,
            hourly: hourly.hourly.unwrap_or_default(),
            daily: daily.daily.unwrap_or_default(),
            utc_offset_seconds: hourly.utc_offset_seconds,
        })
    }

    fn publish(&self, event: ServiceEvent) {
        if self.events.send(event).is_err() {
            debug!("No listener for service events");
        }
    }
}
