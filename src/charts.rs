//! Chart renderers
//!
//! Presentational mapping from shaped records to chart models: a primary
//! temperature axis, a secondary precipitation axis, series marks and
//! per-point tooltips. Both charts fall back to an empty-state message when
//! there is nothing to draw. [`ChartView`] renders as plain text for the CLI.

use crate::models::CurrentWeather;
use crate::models::series::{parse_date, parse_timestamp};
use crate::shaper::{DailyPoint, HourlyPoint, display_round};
use serde::Serialize;
use std::fmt;

pub const NO_HOURLY_DATA: &str = "No hourly forecast data available";
pub const NO_DAILY_DATA: &str = "No daily forecast data available";

/// Which side of the plot an axis sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisSide {
    Left,
    Right,
}

/// Lower or upper bound of an axis domain
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Bound {
    Auto,
    Fixed(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub id: &'static str,
    pub side: AxisSide,
    /// Suffix for tick labels, e.g. "°" or " mm"
    pub tick_suffix: &'static str,
    pub domain: (Bound, Bound),
}

impl Axis {
    fn temperature() -> Self {
        Self {
            id: "temp",
            side: AxisSide::Left,
            tick_suffix: "°",
            domain: (Bound::Auto, Bound::Auto),
        }
    }

    fn precipitation() -> Self {
        Self {
            id: "precip",
            side: AxisSide::Right,
            tick_suffix: " mm",
            domain: (Bound::Fixed(0.0), Bound::Auto),
        }
    }

    /// Tick label for a value on this axis
    #[must_use]
    pub fn tick(&self, value: f64) -> String {
        format!("{value}{}", self.tick_suffix)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkKind {
    Line,
    DashedLine,
    Area,
    Bar,
}

/// One plotted quantity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub name: &'static str,
    pub axis: &'static str,
    pub kind: MarkKind,
    pub color: &'static str,
    pub values: Vec<f64>,
}

/// A chart ready to draw
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub title: &'static str,
    pub x_labels: Vec<String>,
    /// Draw every n-th x label
    pub label_interval: usize,
    pub primary_axis: Axis,
    pub secondary_axis: Axis,
    pub series: Vec<ChartSeries>,
    /// One tooltip per x position
    pub tooltips: Vec<String>,
}

/// Either a chart or the reason there is none
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartView {
    Empty { message: &'static str },
    Ready(Chart),
}

impl ChartView {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, ChartView::Empty { .. })
    }

    #[must_use]
    pub fn chart(&self) -> Option<&Chart> {
        match self {
            ChartView::Ready(chart) => Some(chart),
            ChartView::Empty { .. } => None,
        }
    }
}

/// Format a series value the way tooltips display it
#[must_use]
pub fn format_tooltip_value(series_name: &str, value: f64) -> String {
    match series_name {
        "Temperature" | "Feels Like" | "High" | "Low" => format!("{value}°C"),
        "Precipitation" => format!("{value} mm"),
        _ => value.to_string(),
    }
}

/// Hourly chart: temperature and "feels like" lines, precipitation area
#[must_use]
pub fn hourly_chart(points: &[HourlyPoint]) -> ChartView {
    if points.is_empty() {
        return ChartView::Empty {
            message: NO_HOURLY_DATA,
        };
    }

    let series = vec![
        ChartSeries {
            name: "Temperature",
            axis: "temp",
            kind: MarkKind::Line,
            color: "#2563eb",
            values: points.iter().map(|p| p.temperature).collect(),
        },
        ChartSeries {
            name: "Feels Like",
            axis: "temp",
            kind: MarkKind::DashedLine,
            color: "#7c3aed",
            values: points.iter().map(|p| p.apparent_temperature).collect(),
        },
        ChartSeries {
            name: "Precipitation",
            axis: "precip",
            kind: MarkKind::Area,
            color: "#3b82f6",
            values: points.iter().map(|p| p.precipitation).collect(),
        },
    ];

    let tooltips = points
        .iter()
        .map(|point| {
            let heading = parse_timestamp(&point.full_time).map_or_else(
                || point.label.clone(),
                |ts| ts.format("%Y-%m-%d %H:%M").to_string(),
            );
            format!(
                "{heading}\nTemperature: {}\nFeels Like: {}\nPrecipitation: {}",
                format_tooltip_value("Temperature", point.temperature),
                format_tooltip_value("Feels Like", point.apparent_temperature),
                format_tooltip_value("Precipitation", point.precipitation),
            )
        })
        .collect();

    ChartView::Ready(Chart {
        title: "Hourly Forecast",
        x_labels: points.iter().map(|p| p.label.clone()).collect(),
        label_interval: 3,
        primary_axis: Axis::temperature(),
        secondary_axis: Axis::precipitation(),
        series,
        tooltips,
    })
}

/// Daily chart: high/low bars plus precipitation bars on the secondary axis
#[must_use]
pub fn daily_chart(points: &[DailyPoint]) -> ChartView {
    if points.is_empty() {
        return ChartView::Empty {
            message: NO_DAILY_DATA,
        };
    }

    let series = vec![
        ChartSeries {
            name: "High",
            axis: "temp",
            kind: MarkKind::Bar,
            color: "#f97316",
            values: points.iter().map(|p| p.temp_max).collect(),
        },
        ChartSeries {
            name: "Low",
            axis: "temp",
            kind: MarkKind::Bar,
            color: "#3b82f6",
            values: points.iter().map(|p| p.temp_min).collect(),
        },
        ChartSeries {
            name: "Precipitation",
            axis: "precip",
            kind: MarkKind::Bar,
            color: "#60a5fa",
            values: points.iter().map(|p| p.precipitation).collect(),
        },
    ];

    ChartView::Ready(Chart {
        title: "Daily Forecast",
        x_labels: points.iter().map(|p| p.label.clone()).collect(),
        label_interval: 1,
        primary_axis: Axis::temperature(),
        secondary_axis: Axis::precipitation(),
        series,
        tooltips: points.iter().map(daily_tooltip).collect(),
    })
}

fn daily_tooltip(point: &DailyPoint) -> String {
    let heading = parse_date(&point.full_date).map_or_else(
        || point.label.clone(),
        |date| date.format("%A, %b %-d").to_string(),
    );
    format!(
        "{heading}\n{}\nHigh: {:.0}°C  Low: {:.0}°C  Precip: {} mm\nChance of Rain: {}%\nWind: {:.0} km/h",
        point.weather_description,
        display_round(point.temp_max),
        display_round(point.temp_min),
        point.precipitation,
        point.precipitation_probability,
        display_round(point.wind_speed),
    )
}

/// Summary card for one forecast day, shown beneath the daily chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCard {
    pub label: String,
    pub description: String,
    pub high: String,
    pub low: String,
    /// "-" on dry days
    pub precipitation: String,
}

impl DailyCard {
    #[must_use]
    pub fn new(point: &DailyPoint) -> Self {
        let precipitation = if point.precipitation > 0.0 {
            format!("{} mm", point.precipitation)
        } else {
            "-".to_string()
        };
        Self {
            label: point.label.clone(),
            description: point.weather_description.clone(),
            high: format!("{:.0}°", display_round(point.temp_max)),
            low: format!("{:.0}°", display_round(point.temp_min)),
            precipitation,
        }
    }
}

impl fmt::Display for DailyCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "  {:<8} {:<24} {:>4} / {:<4}  {}",
            self.label, self.description, self.high, self.low, self.precipitation
        )
    }
}

#[must_use]
pub fn daily_cards(points: &[DailyPoint]) -> Vec<DailyCard> {
    points.iter().map(DailyCard::new).collect()
}

impl fmt::Display for ChartView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartView::Empty { message } => writeln!(f, "{message}"),
            ChartView::Ready(chart) => {
                writeln!(f, "{}", chart.title)?;
                let label_width = chart.x_labels.iter().map(String::len).max().unwrap_or(0);
                for (i, label) in chart.x_labels.iter().enumerate() {
                    write!(f, "  {label:<label_width$}")?;
                    for series in &chart.series {
                        let axis = if series.axis == chart.primary_axis.id {
                            &chart.primary_axis
                        } else {
                            &chart.secondary_axis
                        };
                        let value = series.values.get(i).copied().unwrap_or(0.0);
                        write!(f, "  {}: {}", series.name, axis.tick(round1(value)))?;
                    }
                    writeln!(f)?;
                }
                Ok(())
            }
        }
    }
}

fn round1(value: f64) -> f64 {
    display_round(value * 10.0) / 10.0
}

/// Headline conditions for the selected location
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentPanel {
    pub title: String,
    pub temperature: String,
    pub description: String,
    pub feels_like: String,
    pub humidity: String,
    pub wind: String,
    pub pressure: String,
    pub cloud_cover: String,
}

impl CurrentPanel {
    #[must_use]
    pub fn new(title: &str, current: &CurrentWeather) -> Self {
        Self {
            title: title.to_string(),
            temperature: format!("{:.0}°", display_round(current.temperature_2m)),
            description: current.weather_description.clone(),
            feels_like: format!("Feels like {:.0}°", display_round(current.apparent_temperature)),
            humidity: format!("{:.0}%", display_round(current.relative_humidity_2m)),
            wind: format!("{:.0} km/h", display_round(current.wind_speed_10m)),
            pressure: format!("{:.0} hPa", display_round(current.pressure_msl)),
            cloud_cover: format!("{:.0}%", display_round(current.cloud_cover)),
        }
    }
}

impl fmt::Display for CurrentPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "  {}  {}  ({})", self.temperature, self.description, self.feels_like)?;
        writeln!(f, "  Humidity:    {}", self.humidity)?;
        writeln!(f, "  Wind:        {}", self.wind)?;
        writeln!(f, "  Pressure:    {}", self.pressure)?;
        writeln!(f, "  Cloud Cover: {}", self.cloud_cover)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Series;
    use crate::shaper::{shape_daily, shape_hourly};

    #[test]
    fn test_empty_inputs_render_no_data_messages() {
        let hourly = hourly_chart(&shape_hourly(&Series::default()));
        assert!(hourly.is_empty());
        assert_eq!(hourly.to_string().trim(), NO_HOURLY_DATA);

        let daily = daily_chart(&shape_daily(&Series::default()));
        assert!(daily.is_empty());
        assert_eq!(daily.to_string().trim(), NO_DAILY_DATA);
    }

    #[test]
    fn test_hourly_chart_axes_and_series() {
        let series = Series::new(["2024-05-01T13:00", "2024-05-01T14:00"])
            .with_numbers("temperature_2m", [16.0, 17.5])
            .with_numbers("apparent_temperature", [15.0, 16.0])
            .with_numbers("precipitation", [0.4, 0.0]);
        let view = hourly_chart(&shape_hourly(&series));
        let chart = view.chart().unwrap();

        assert_eq!(chart.x_labels, vec!["1 PM", "2 PM"]);
        assert_eq!(chart.label_interval, 3);
        assert_eq!(chart.primary_axis.side, AxisSide::Left);
        assert_eq!(chart.secondary_axis.side, AxisSide::Right);
        assert_eq!(chart.secondary_axis.domain.0, Bound::Fixed(0.0));
        assert_eq!(chart.series.len(), 3);
        assert_eq!(chart.series[2].axis, "precip");
        assert_eq!(chart.series[0].values, vec![16.0, 17.5]);

        assert!(chart.tooltips[0].starts_with("2024-05-01 13:00"));
        assert!(chart.tooltips[0].contains("Temperature: 16°C"));
        assert!(chart.tooltips[0].contains("Precipitation: 0.4 mm"));
    }

    #[test]
    fn test_daily_chart_tooltip() {
        let series = Series::new(["2024-05-01"])
            .with_numbers("temperature_2m_max", [18.4])
            .with_numbers("temperature_2m_min", [8.6])
            .with_numbers("weather_code", [61.0])
            .with_numbers("precipitation_sum", [2.5])
            .with_numbers("precipitation_probability_max", [70.0])
            .with_numbers("wind_speed_10m_max", [21.3]);
        let view = daily_chart(&shape_daily(&series));
        let chart = view.chart().unwrap();
        let tooltip = &chart.tooltips[0];

        assert!(tooltip.starts_with("Wednesday, May 1"));
        assert!(tooltip.contains("Slight rain"));
        assert!(tooltip.contains("High: 18°C"));
        assert!(tooltip.contains("Low: 9°C"));
        assert!(tooltip.contains("Chance of Rain: 70%"));
        assert!(tooltip.contains("Wind: 21 km/h"));
    }

    #[test]
    fn test_daily_cards() {
        let series = Series::new(["2024-05-01", "2024-05-02"])
            .with_numbers("temperature_2m_max", [18.4, 0.4])
            .with_numbers("temperature_2m_min", [8.6, -0.3])
            .with_numbers("weather_code", [61.0, 0.0])
            .with_numbers("precipitation_sum", [2.5, 0.0]);
        let cards = daily_cards(&shape_daily(&series));

        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].label, "Wed 1");
        assert_eq!(cards[0].description, "Slight rain");
        assert_eq!(cards[0].high, "18°");
        assert_eq!(cards[0].low, "9°");
        assert_eq!(cards[0].precipitation, "2.5 mm");
        assert_eq!(cards[1].description, "Clear sky");
        assert_eq!(cards[1].high, "0°");
        assert_eq!(cards[1].low, "0°");
        assert_eq!(cards[1].precipitation, "-");
        assert!(cards[1].to_string().contains("Thu 2"));
    }

    #[test]
    fn test_tooltip_value_formatting() {
        assert_eq!(format_tooltip_value("Temperature", 12.5), "12.5°C");
        assert_eq!(format_tooltip_value("Precipitation", 3.0), "3 mm");
        assert_eq!(format_tooltip_value("Humidity", 40.0), "40");
    }

    #[test]
    fn test_current_panel_rounds_without_negative_zero() {
        let current = CurrentWeather {
            temperature_2m: -0.3,
            apparent_temperature: -2.5,
            ..Default::default()
        }
        .enriched();
        let panel = CurrentPanel::new("Oslo, Norway", &current);
        assert_eq!(panel.temperature, "0°");
        assert_eq!(panel.feels_like, "Feels like -2°");
    }

    #[test]
    fn test_current_panel() {
        let current = CurrentWeather {
            temperature_2m: 14.6,
            apparent_temperature: 12.2,
            relative_humidity_2m: 62.0,
            wind_speed_10m: 11.6,
            pressure_msl: 1013.4,
            cloud_cover: 75.0,
            weather_code: 3,
            ..Default::default()
        }
        .enriched();
        let panel = CurrentPanel::new("London, United Kingdom", &current);
        assert_eq!(panel.temperature, "15°");
        assert_eq!(panel.description, "Overcast");
        assert_eq!(panel.feels_like, "Feels like 12°");
        assert_eq!(panel.humidity, "62%");
        assert_eq!(panel.wind, "12 km/h");
        assert_eq!(panel.pressure, "1013 hPa");
        assert_eq!(panel.cloud_cover, "75%");
    }
}
