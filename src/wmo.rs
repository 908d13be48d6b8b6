//! WMO weather code lookups
//!
//! See <https://open-meteo.com/en/docs#weathervariables> for the code table.

/// Icon returned for codes no range matches
pub const FALLBACK_ICON: &str = "help-circle";

/// Human-readable description of a WMO weather code, `"Unknown"` when unmapped
#[must_use]
pub fn describe(code: i32) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 => "Light freezing drizzle",
        57 => "Dense freezing drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 => "Light freezing rain",
        67 => "Heavy freezing rain",
        71 => "Slight snow fall",
        73 => "Moderate snow fall",
        75 => "Heavy snow fall",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown",
    }
}

/// Icon identifier for a WMO weather code.
///
/// Arms are checked top to bottom; the ranges deliberately include codes the
/// description table does not know (e.g. 52 still draws drizzle).
#[must_use]
pub fn icon_for(code: i32, is_day: bool) -> &'static str {
    match code {
        0 => {
            if is_day {
                "sun"
            } else {
                "moon"
            }
        }
        1 => {
            if is_day {
                "sun-dim"
            } else {
                "moon"
            }
        }
        2 => {
            if is_day {
                "cloud-sun"
            } else {
                "cloud-moon"
            }
        }
        3 => "cloud",
        45 | 48 => "cloud-fog",
        51..=57 => "cloud-drizzle",
        61..=67 => "cloud-rain",
        71..=77 => "cloud-snow",
        80..=82 => "cloud-rain",
        85..=86 => "cloud-snow",
        95.. => "cloud-lightning",
        _ => FALLBACK_ICON,
    }
}
