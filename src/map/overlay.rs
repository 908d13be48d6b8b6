//! Synthetic weather overlay
//!
//! Spreads the current hour's values over a 9×9 grid around the selected
//! location. Each grid point perturbs the base value by a uniform factor
//! scaled with its distance from the centre, so the field looks plausible
//! without fetching more data.

use super::OverlayCategory;
use super::palette::color_for;
use crate::models::series::parse_timestamp;
use crate::models::{Location, Series};
use crate::shaper::display_round;
use chrono::{DateTime, Duration, Utc};
use rand::RngExt;
use serde::Serialize;

/// Half-width of the grid in degrees
pub const GRID_EXTENT: f64 = 2.0;
/// Grid spacing in degrees
pub const GRID_STEP: f64 = 0.5;
/// Circle radius in metres
pub const CIRCLE_RADIUS_M: f64 = 15_000.0;

const TEMPERATURE_SCALE: f64 = 3.0;
const PRECIPITATION_SCALE: f64 = 2.0;
const WIND_SPEED_SCALE: f64 = 5.0;
const WIND_DIRECTION_SCALE: f64 = 20.0;
const CLOUD_SCALE: f64 = 15.0;

/// How a mark is drawn
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum MarkShape {
    Circle { radius_m: f64 },
    /// Arrow pointing along `rotation_deg`, `size_px` wide
    Arrow { rotation_deg: f64, size_px: f64 },
}

/// One drawn overlay point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayMark {
    pub latitude: f64,
    pub longitude: f64,
    pub value: f64,
    pub color: &'static str,
    pub shape: MarkShape,
    pub popup: String,
}

/// Hourly values the overlay perturbs
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct BaseValues {
    temperature: f64,
    precipitation: f64,
    wind_speed: f64,
    wind_direction: f64,
    cloud_cover: f64,
}

impl BaseValues {
    fn at(hourly: &Series, index: usize) -> Self {
        Self {
            temperature: hourly.number_or_zero("temperature_2m", index),
            precipitation: hourly.number_or_zero("precipitation", index),
            wind_speed: hourly.number_or_zero("wind_speed_10m", index),
            wind_direction: hourly.number_or_zero("wind_direction_10m", index),
            cloud_cover: hourly.number_or_zero("cloud_cover", index),
        }
    }
}

/// Index of the hour the overlay shows: the entry just before the first one
/// strictly after `now`.
///
/// Timestamps are local to the forecast location; `utc_offset_seconds` maps
/// them back to UTC. Unparseable entries never count as "after now". Returns
/// `None` when no entry lies after `now` or the very first one already does.
#[must_use]
pub fn time_index(times: &[String], utc_offset_seconds: i32, now: DateTime<Utc>) -> Option<usize> {
    let now = now.naive_utc();
    let offset = Duration::seconds(i64::from(utc_offset_seconds));

    let first_future = times
        .iter()
        .position(|raw| parse_timestamp(raw).is_some_and(|local| local - offset > now))?;
    first_future.checked_sub(1)
}

/// Grid points as (latitude, longitude), row by row from the south-west corner
#[must_use]
pub fn grid(center_latitude: f64, center_longitude: f64) -> Vec<(f64, f64)> {
    let steps = (GRID_EXTENT / GRID_STEP).round() as i32;
    (-steps..=steps)
        .flat_map(|lat_step| {
            (-steps..=steps).map(move |lon_step| {
                (
                    center_latitude + f64::from(lat_step) * GRID_STEP,
                    center_longitude + f64::from(lon_step) * GRID_STEP,
                )
            })
        })
        .collect()
}

/// Generate overlay marks for `category` around `location`.
///
/// Returns an empty list when the hourly series has no usable current hour.
pub fn generate<R: RngExt>(
    category: OverlayCategory,
    location: &Location,
    hourly: &Series,
    utc_offset_seconds: i32,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<OverlayMark> {
    let Some(index) = time_index(&hourly.time, utc_offset_seconds, now) else {
        return Vec::new();
    };
    let base = BaseValues::at(hourly, index);

    grid(location.latitude, location.longitude)
        .into_iter()
        .map(|(latitude, longitude)| {
            let distance = (latitude - location.latitude).hypot(longitude - location.longitude);
            let mut jitter = |scale: f64| rng.random_range(-1.0..1.0) * distance * scale;

            match category {
                OverlayCategory::Temperature => {
                    let value = base.temperature + jitter(TEMPERATURE_SCALE);
                    let popup = format!("Temperature: {:.0}°C", display_round(value));
                    circle(category, latitude, longitude, value, popup)
                }
                OverlayCategory::Precipitation => {
                    let value = (base.precipitation + jitter(PRECIPITATION_SCALE)).max(0.0);
                    let popup = format!("Precipitation: {value:.1} mm");
                    circle(category, latitude, longitude, value, popup)
                }
                OverlayCategory::Clouds => {
                    let value = (base.cloud_cover + jitter(CLOUD_SCALE)).clamp(0.0, 100.0);
                    let popup = format!("Cloud Cover: {:.0}%", display_round(value));
                    circle(category, latitude, longitude, value, popup)
                }
                OverlayCategory::Wind => {
                    let speed = (base.wind_speed + jitter(WIND_SPEED_SCALE)).max(0.0);
                    let direction =
                        (base.wind_direction + jitter(WIND_DIRECTION_SCALE)).rem_euclid(360.0);
                    OverlayMark {
                        latitude,
                        longitude,
                        value: speed,
                        color: color_for(category, speed),
                        shape: MarkShape::Arrow {
                            rotation_deg: direction,
                            size_px: arrow_size(speed),
                        },
                        popup: format!(
                            "Wind: {:.0} km/h, Direction: {:.0}°",
                            display_round(speed),
                            display_round(direction)
                        ),
                    }
                }
            }
        })
        .collect()
}

fn circle(
    category: OverlayCategory,
    latitude: f64,
    longitude: f64,
    value: f64,
    popup: String,
) -> OverlayMark {
    OverlayMark {
        latitude,
        longitude,
        value,
        color: color_for(category, value),
        shape: MarkShape::Circle {
            radius_m: CIRCLE_RADIUS_M,
        },
        popup,
    }
}

/// Arrow size in pixels, growing with wind speed
#[must_use]
pub fn arrow_size(speed: f64) -> f64 {
    (16.0 + speed / 2.0).clamp(16.0, 40.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rstest::rstest;

    fn london() -> Location {
        Location::new(2643743, "London", "United Kingdom", 51.5074, -0.1278)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 13, 30, 0).unwrap()
    }

    fn hours(start_hour: u32, n: u32) -> Vec<String> {
        (start_hour..start_hour + n)
            .map(|h| format!("2024-05-{:02}T{:02}:00", 1 + h / 24, h % 24))
            .collect()
    }

    fn hourly(times: Vec<String>) -> Series {
        let n = times.len();
        Series::new(times)
            .with_numbers("temperature_2m", vec![15.0; n])
            .with_numbers("precipitation", vec![0.5; n])
            .with_numbers("wind_speed_10m", vec![12.0; n])
            .with_numbers("wind_direction_10m", vec![350.0; n])
            .with_numbers("cloud_cover", vec![95.0; n])
    }

    #[rstest]
    #[case(hours(0, 24), 0, Some(13))]
    #[case(hours(0, 10), 0, None)]
    #[case(hours(14, 5), 0, None)]
    #[case(Vec::new(), 0, None)]
    // local 14:00 at UTC+2 is 12:00 UTC, so the first future entry is local 16:00
    #[case(hours(0, 24), 7200, Some(15))]
    fn test_time_index(
        #[case] times: Vec<String>,
        #[case] offset: i32,
        #[case] expected: Option<usize>,
    ) {
        assert_eq!(time_index(&times, offset, now()), expected);
    }

    #[test]
    fn test_unparseable_times_are_not_in_the_future() {
        let times = vec!["garbage".to_string(), "2024-05-01T14:00".to_string()];
        assert_eq!(time_index(&times, 0, now()), Some(0));
    }

    #[test]
    fn test_grid_is_nine_by_nine() {
        let points = grid(51.5, -0.1);
        assert_eq!(points.len(), 81);
        assert_eq!(points[0], (49.5, -2.1));
        assert_eq!(points[40], (51.5, -0.1));
        assert!((points[80].0 - 53.5).abs() < 1e-9);
    }

    #[test]
    fn test_past_only_series_produces_no_marks() {
        let mut rng = StdRng::seed_from_u64(7);
        let marks = generate(
            OverlayCategory::Temperature,
            &london(),
            &hourly(hours(0, 10)),
            0,
            now(),
            &mut rng,
        );
        assert!(marks.is_empty());
    }

    #[test]
    fn test_seeded_overlays_are_reproducible() {
        let series = hourly(hours(0, 48));
        let run = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            generate(OverlayCategory::Temperature, &london(), &series, 0, now(), &mut rng)
        };
        let first = run(42);
        assert_eq!(first.len(), 81);
        assert_eq!(first, run(42));
        assert_ne!(first, run(43));
    }

    #[test]
    fn test_centre_point_keeps_base_value() {
        let mut rng = StdRng::seed_from_u64(1);
        let marks = generate(
            OverlayCategory::Temperature,
            &london(),
            &hourly(hours(0, 24)),
            0,
            now(),
            &mut rng,
        );
        let centre = &marks[40];
        assert_eq!(centre.value, 15.0);
        assert_eq!(centre.popup, "Temperature: 15°C");
        assert_eq!(centre.color, "#4fd1c5");
        assert_eq!(centre.shape, MarkShape::Circle { radius_m: CIRCLE_RADIUS_M });
    }

    #[rstest]
    #[case(OverlayCategory::Precipitation)]
    #[case(OverlayCategory::Clouds)]
    #[case(OverlayCategory::Wind)]
    fn test_values_stay_in_range(#[case] category: OverlayCategory) {
        let series = hourly(hours(0, 24));
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            for mark in generate(category, &london(), &series, 0, now(), &mut rng) {
                assert!(mark.value >= 0.0);
                if category == OverlayCategory::Clouds {
                    assert!(mark.value <= 100.0);
                }
                if let MarkShape::Arrow { rotation_deg, size_px } = mark.shape {
                    assert!((0.0..360.0).contains(&rotation_deg));
                    assert!((16.0..=40.0).contains(&size_px));
                    assert!(mark.popup.starts_with("Wind: "));
                }
            }
        }
    }

    #[test]
    fn test_missing_columns_read_as_zero() {
        let mut rng = StdRng::seed_from_u64(3);
        let marks = generate(
            OverlayCategory::Precipitation,
            &london(),
            &Series::new(hours(0, 24)),
            0,
            now(),
            &mut rng,
        );
        assert_eq!(marks[40].popup, "Precipitation: 0.0 mm");
        assert_eq!(marks[40].color, "#f7fafc");
    }
}
