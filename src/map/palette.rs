//! Overlay colour scales and legends

use super::OverlayCategory;
use serde::Serialize;

/// Upper edge of a colour bucket
#[derive(Debug, Clone, Copy, PartialEq)]
enum Edge {
    Equal(f64),
    AtMost(f64),
    Below(f64),
    Above,
}

impl Edge {
    fn contains(self, value: f64) -> bool {
        match self {
            Edge::Equal(limit) => value == limit,
            Edge::AtMost(limit) => value <= limit,
            Edge::Below(limit) => value < limit,
            Edge::Above => true,
        }
    }

    fn limit(self) -> Option<f64> {
        match self {
            Edge::Equal(limit) | Edge::AtMost(limit) | Edge::Below(limit) => Some(limit),
            Edge::Above => None,
        }
    }
}

type Scale = &'static [(Edge, &'static str)];

const TEMPERATURE: Scale = &[
    (Edge::AtMost(-10.0), "#9f7aea"),
    (Edge::AtMost(0.0), "#7f9cf5"),
    (Edge::AtMost(10.0), "#63b3ed"),
    (Edge::AtMost(20.0), "#4fd1c5"),
    (Edge::AtMost(25.0), "#68d391"),
    (Edge::AtMost(30.0), "#f6e05e"),
    (Edge::AtMost(35.0), "#f6ad55"),
    (Edge::Above, "#f56565"),
];

const PRECIPITATION: Scale = &[
    (Edge::Equal(0.0), "#f7fafc"),
    (Edge::Below(0.5), "#e6fffa"),
    (Edge::Below(1.0), "#b2f5ea"),
    (Edge::Below(2.0), "#81e6d9"),
    (Edge::Below(4.0), "#4fd1c5"),
    (Edge::Below(8.0), "#38b2ac"),
    (Edge::Below(12.0), "#319795"),
    (Edge::Below(20.0), "#2c7a7b"),
    (Edge::Above, "#285e61"),
];

const WIND: Scale = &[
    (Edge::Below(5.0), "#a0aec0"),
    (Edge::Below(10.0), "#718096"),
    (Edge::Below(20.0), "#4a5568"),
    (Edge::Below(30.0), "#2d3748"),
    (Edge::Below(40.0), "#1a202c"),
    (Edge::Above, "#000000"),
];

const CLOUDS: Scale = &[
    (Edge::Below(10.0), "#f7fafc"),
    (Edge::Below(25.0), "#edf2f7"),
    (Edge::Below(50.0), "#e2e8f0"),
    (Edge::Below(75.0), "#cbd5e0"),
    (Edge::Below(90.0), "#a0aec0"),
    (Edge::Above, "#718096"),
];

fn scale(category: OverlayCategory) -> Scale {
    match category {
        OverlayCategory::Temperature => TEMPERATURE,
        OverlayCategory::Precipitation => PRECIPITATION,
        OverlayCategory::Wind => WIND,
        OverlayCategory::Clouds => CLOUDS,
    }
}

/// Colour of the first bucket containing `value`
#[must_use]
pub fn color_for(category: OverlayCategory, value: f64) -> &'static str {
    scale(category)
        .iter()
        .find(|(edge, _)| edge.contains(value))
        .map_or("#000000", |(_, color)| *color)
}

/// One row of the legend control
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: &'static str,
}

/// Legend title plus one entry per bucket, in bucket order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Legend {
    pub title: &'static str,
    pub entries: Vec<LegendEntry>,
}

impl Legend {
    #[must_use]
    pub fn for_category(category: OverlayCategory) -> Self {
        let buckets = scale(category);
        let entries = buckets
            .iter()
            .enumerate()
            .map(|(i, (edge, color))| {
                // Each row spans from the previous bucket's limit to its own
                let previous = i
                    .checked_sub(1)
                    .and_then(|prev| buckets[prev].0.limit());
                let label = match (previous, *edge) {
                    (None, Edge::Equal(limit)) => format!("{limit}"),
                    (None, Edge::AtMost(limit)) => format!("≤ {limit}"),
                    (None, Edge::Below(limit)) => format!("< {limit}"),
                    (Some(from), Edge::Equal(limit) | Edge::AtMost(limit) | Edge::Below(limit)) => {
                        format!("{from} to {limit}")
                    }
                    (Some(from), Edge::Above) => format!("> {from}"),
                    (None, Edge::Above) => "all".to_string(),
                };
                LegendEntry {
                    label,
                    color: *color,
                }
            })
            .collect();

        Self {
            title: category.legend_title(),
            entries,
        }
    }
}

impl std::fmt::Display for Legend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.title)?;
        for entry in &self.entries {
            writeln!(f, "  {} {}", entry.color, entry.label)?;
        }
        Ok(())
    }
}
