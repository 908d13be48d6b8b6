//! Map model with a location marker and a synthetic weather overlay
//!
//! [`MapView`] owns one map canvas for as long as it is mounted. Changing the
//! overlay category, the location or the weather data rebuilds the overlay
//! layer from scratch; the legend is re-rendered on every category change.

pub mod overlay;
pub mod palette;

pub use overlay::{MarkShape, OverlayMark};
pub use palette::{Legend, LegendEntry};

use crate::ExplorerError;
use crate::models::{CombinedWeatherData, Location};
use crate::shaper::display_round;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

pub const INITIAL_CENTER: (f64, f64) = (51.505, -0.09);
pub const INITIAL_ZOOM: u8 = 5;
pub const LOCATION_ZOOM: u8 = 8;
pub const TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const TILE_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";

static NEXT_MAP_ID: AtomicU64 = AtomicU64::new(1);

/// Quantity shown by the synthetic overlay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayCategory {
    #[default]
    Temperature,
    Precipitation,
    Wind,
    Clouds,
}

impl OverlayCategory {
    pub const ALL: [OverlayCategory; 4] = [
        OverlayCategory::Temperature,
        OverlayCategory::Precipitation,
        OverlayCategory::Wind,
        OverlayCategory::Clouds,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OverlayCategory::Temperature => "temperature",
            OverlayCategory::Precipitation => "precipitation",
            OverlayCategory::Wind => "wind",
            OverlayCategory::Clouds => "clouds",
        }
    }

    /// Label in the category selector
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            OverlayCategory::Temperature => "Temperature",
            OverlayCategory::Precipitation => "Precipitation",
            OverlayCategory::Wind => "Wind",
            OverlayCategory::Clouds => "Cloud Cover",
        }
    }

    #[must_use]
    pub fn legend_title(self) -> &'static str {
        match self {
            OverlayCategory::Temperature => "Temperature (°C)",
            OverlayCategory::Precipitation => "Precipitation (mm)",
            OverlayCategory::Wind => "Wind Speed (km/h)",
            OverlayCategory::Clouds => "Cloud Cover (%)",
        }
    }
}

impl fmt::Display for OverlayCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OverlayCategory {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == wanted)
            .ok_or_else(|| {
                ExplorerError::validation(format!(
                    "Unknown overlay category '{s}'. Must be one of: temperature, precipitation, wind, clouds"
                ))
            })
    }
}

/// Raster base layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileLayer {
    pub url_template: &'static str,
    pub attribution: &'static str,
}

/// Controls docked on the canvas
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "control", rename_all = "snake_case")]
pub enum Control {
    Scale,
    CategorySelector {
        options: Vec<OverlayCategory>,
        selected: OverlayCategory,
    },
    Legend(Legend),
}

/// Pin at the selected location
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub latitude: f64,
    pub longitude: f64,
    /// Rounded current temperature, e.g. "15°"
    pub label: String,
    pub popup: String,
}

/// Everything drawn on one mounted map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapCanvas {
    pub id: u64,
    pub center: (f64, f64),
    pub zoom: u8,
    pub base_layer: TileLayer,
    pub controls: Vec<Control>,
    pub markers: Vec<Marker>,
    pub overlay: Vec<OverlayMark>,
}

/// A mounted map and the state that drives its overlay
pub struct MapView {
    canvas: MapCanvas,
    category: OverlayCategory,
    data: Option<CombinedWeatherData>,
    rng: StdRng,
    clock: fn() -> DateTime<Utc>,
}

impl MapView {
    /// Create a new map instance.
    ///
    /// A `seed` makes overlays reproducible; without one the noise is seeded
    /// from the thread-local generator.
    #[must_use]
    pub fn mount(category: OverlayCategory, seed: Option<u64>) -> Self {
        let id = NEXT_MAP_ID.fetch_add(1, Ordering::Relaxed);
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::rng().random()),
        };
        debug!("Mounting map {} with {} overlay", id, category);

        let canvas = MapCanvas {
            id,
            center: INITIAL_CENTER,
            zoom: INITIAL_ZOOM,
            base_layer: TileLayer {
                url_template: TILE_URL,
                attribution: TILE_ATTRIBUTION,
            },
            controls: vec![
                Control::Scale,
                Control::CategorySelector {
                    options: OverlayCategory::ALL.to_vec(),
                    selected: category,
                },
                Control::Legend(Legend::for_category(category)),
            ],
            markers: Vec::new(),
            overlay: Vec::new(),
        };

        Self {
            canvas,
            category,
            data: None,
            rng,
            clock: Utc::now,
        }
    }

    /// Replace the wall clock used to pick the overlay hour
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.canvas.id
    }

    #[must_use]
    pub fn canvas(&self) -> &MapCanvas {
        &self.canvas
    }

    #[must_use]
    pub fn category(&self) -> OverlayCategory {
        self.category
    }

    #[must_use]
    pub fn legend(&self) -> Option<&Legend> {
        self.canvas.controls.iter().find_map(|control| match control {
            Control::Legend(legend) => Some(legend),
            _ => None,
        })
    }

    /// Switch the overlay category, re-rendering the legend and the overlay
    pub fn select_category(&mut self, category: OverlayCategory) {
        self.category = category;
        for control in &mut self.canvas.controls {
            match control {
                Control::CategorySelector { selected, .. } => *selected = category,
                Control::Legend(legend) => *legend = Legend::for_category(category),
                Control::Scale => {}
            }
        }
        self.regenerate_overlay();
    }

    /// Show a newly loaded location: one marker, recentered view, fresh overlay
    pub fn update(&mut self, data: &CombinedWeatherData) {
        let location = &data.location;
        self.canvas.markers.clear();
        self.canvas.markers.push(Marker {
            latitude: location.latitude,
            longitude: location.longitude,
            label: format!("{:.0}°", display_round(data.current.temperature_2m)),
            popup: marker_popup(location, data),
        });
        self.canvas.center = (location.latitude, location.longitude);
        self.canvas.zoom = LOCATION_ZOOM;
        self.data = Some(data.clone());
        self.regenerate_overlay();
    }

    fn regenerate_overlay(&mut self) {
        self.canvas.overlay.clear();
        let Some(data) = &self.data else {
            return;
        };
        self.canvas.overlay = overlay::generate(
            self.category,
            &data.location,
            &data.hourly,
            data.utc_offset_seconds,
            (self.clock)(),
            &mut self.rng,
        );
        debug!(
            "Map {} overlay regenerated: {} {} marks",
            self.canvas.id,
            self.canvas.overlay.len(),
            self.category
        );
    }

    /// Export markers and overlay marks as a GeoJSON `FeatureCollection`
    #[must_use]
    pub fn to_geojson(&self) -> Value {
        let markers = self.canvas.markers.iter().map(|marker| {
            json!({
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [marker.longitude, marker.latitude] },
                "properties": { "kind": "marker", "label": marker.label, "popup": marker.popup },
            })
        });
        let marks = self.canvas.overlay.iter().map(|mark| {
            let mut properties = json!({
                "kind": "overlay",
                "category": self.category,
                "value": mark.value,
                "color": mark.color,
                "popup": mark.popup,
            });
            if let (Value::Object(map), Ok(Value::Object(shape))) =
                (&mut properties, serde_json::to_value(&mark.shape))
            {
                map.extend(shape);
            }
            json!({
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [mark.longitude, mark.latitude] },
                "properties": properties,
            })
        });

        json!({
            "type": "FeatureCollection",
            "features": markers.chain(marks).collect::<Vec<_>>(),
        })
    }

    /// Release the canvas and everything on it
    pub fn unmount(self) {
        debug!("Unmounting map {}", self.canvas.id);
    }
}

impl fmt::Display for MapView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (lat, lon) = self.canvas.center;
        writeln!(
            f,
            "Map #{} centered at {lat:.4}, {lon:.4} (zoom {})",
            self.canvas.id, self.canvas.zoom
        )?;
        for marker in &self.canvas.markers {
            writeln!(f, "  Marker {}: {}", marker.label, marker.popup.replace('\n', " | "))?;
        }
        writeln!(
            f,
            "  Overlay: {} ({} marks)",
            self.category.label(),
            self.canvas.overlay.len()
        )?;
        if let Some(legend) = self.legend() {
            write!(f, "{legend}")?;
        }
        Ok(())
    }
}

fn marker_popup(location: &Location, data: &CombinedWeatherData) -> String {
    let current = &data.current;
    format!(
        "{}, {}\n{:.0}°C\n{}\nHumidity: {:.0}%\nWind: {:.0} km/h",
        location.name,
        location.country,
        display_round(current.temperature_2m),
        current.weather_description,
        display_round(current.relative_humidity_2m),
        display_round(current.wind_speed_10m),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CurrentWeather, Series};
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 13, 30, 0).unwrap()
    }

    fn london_data() -> CombinedWeatherData {
        let times: Vec<String> = (0..24).map(|h| format!("2024-05-01T{h:02}:00")).collect();
        CombinedWeatherData {
            location: Location::new(2643743, "London", "United Kingdom", 51.5074, -0.1278),
            current: CurrentWeather {
                temperature_2m: 14.6,
                relative_humidity_2m: 62.0,
                wind_speed_10m: 11.6,
                weather_code: 3,
                ..Default::default()
            }
            .enriched(),
            hourly: Series::new(times)
                .with_numbers("temperature_2m", vec![15.0; 24])
                .with_numbers("wind_speed_10m", vec![10.0; 24])
                .with_numbers("wind_direction_10m", vec![180.0; 24]),
            daily: Series::default(),
            utc_offset_seconds: 0,
        }
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!("Wind".parse::<OverlayCategory>().unwrap(), OverlayCategory::Wind);
        assert_eq!(" clouds ".parse::<OverlayCategory>().unwrap(), OverlayCategory::Clouds);
        assert!("humidity".parse::<OverlayCategory>().is_err());
        assert_eq!(OverlayCategory::default(), OverlayCategory::Temperature);
        assert_eq!(OverlayCategory::Precipitation.to_string(), "precipitation");
    }

    #[test]
    fn test_mount_sets_up_canvas() {
        let view = MapView::mount(OverlayCategory::Temperature, Some(1));
        let canvas = view.canvas();
        assert_eq!(canvas.center, INITIAL_CENTER);
        assert_eq!(canvas.zoom, INITIAL_ZOOM);
        assert_eq!(canvas.base_layer.url_template, TILE_URL);
        assert_eq!(canvas.controls[0], Control::Scale);
        assert!(canvas.markers.is_empty());
        assert!(canvas.overlay.is_empty());
        assert_eq!(view.legend().unwrap().title, "Temperature (°C)");
    }

    #[test]
    fn test_each_mount_is_a_new_instance() {
        let first = MapView::mount(OverlayCategory::Temperature, None);
        let first_id = first.id();
        first.unmount();
        let second = MapView::mount(OverlayCategory::Temperature, None);
        assert_ne!(first_id, second.id());
    }

    #[test]
    fn test_update_places_single_marker_and_overlay() {
        let mut view = MapView::mount(OverlayCategory::Temperature, Some(5)).with_clock(fixed_now);
        let data = london_data();
        view.update(&data);
        view.update(&data);

        let canvas = view.canvas();
        assert_eq!(canvas.markers.len(), 1);
        assert_eq!(canvas.markers[0].label, "15°");
        assert_eq!(
            canvas.markers[0].popup,
            "London, United Kingdom\n15°C\nOvercast\nHumidity: 62%\nWind: 12 km/h"
        );
        assert_eq!(canvas.center, (51.5074, -0.1278));
        assert_eq!(canvas.zoom, LOCATION_ZOOM);
        assert_eq!(canvas.overlay.len(), 81);
    }

    #[test]
    fn test_marker_and_overlay_show_zero_for_small_frosts() {
        let mut data = london_data();
        data.current.temperature_2m = -0.3;
        data.hourly = data.hourly.with_numbers("temperature_2m", vec![-0.4; 24]);

        let mut view = MapView::mount(OverlayCategory::Temperature, Some(5)).with_clock(fixed_now);
        view.update(&data);

        let canvas = view.canvas();
        assert_eq!(canvas.markers[0].label, "0°");
        assert!(canvas.markers[0].popup.contains("\n0°C\n"));
        assert_eq!(canvas.overlay[40].popup, "Temperature: 0°C");
    }

    #[test]
    fn test_select_category_rerenders_legend_and_overlay() {
        let mut view = MapView::mount(OverlayCategory::Temperature, Some(5)).with_clock(fixed_now);
        view.update(&london_data());
        view.select_category(OverlayCategory::Wind);

        assert_eq!(view.category(), OverlayCategory::Wind);
        assert_eq!(view.legend().unwrap().title, "Wind Speed (km/h)");
        assert!(view.canvas().controls.contains(&Control::CategorySelector {
            options: OverlayCategory::ALL.to_vec(),
            selected: OverlayCategory::Wind,
        }));
        assert_eq!(view.canvas().overlay.len(), 81);
        assert!(
            view.canvas()
                .overlay
                .iter()
                .all(|mark| matches!(mark.shape, MarkShape::Arrow { .. }))
        );
    }

    #[test]
    fn test_seeded_views_match() {
        let render = || {
            let mut view =
                MapView::mount(OverlayCategory::Clouds, Some(99)).with_clock(fixed_now);
            view.update(&london_data());
            view.canvas().overlay.clone()
        };
        assert_eq!(render(), render());
    }

    #[test]
    fn test_geojson_export() {
        let mut view = MapView::mount(OverlayCategory::Wind, Some(2)).with_clock(fixed_now);
        view.update(&london_data());
        let geojson = view.to_geojson();

        assert_eq!(geojson["type"], "FeatureCollection");
        let features = geojson["features"].as_array().unwrap();
        assert_eq!(features.len(), 82);
        assert_eq!(features[0]["properties"]["kind"], "marker");
        assert_eq!(features[0]["geometry"]["coordinates"][0], -0.1278);
        assert_eq!(features[1]["properties"]["kind"], "overlay");
        assert_eq!(features[1]["properties"]["category"], "wind");
        assert_eq!(features[1]["properties"]["shape"], "arrow");
    }
}
