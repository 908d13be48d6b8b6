//! Time-indexed series as returned by the forecast API
//!
//! A series is a `time` axis plus any number of parallel columns keyed by the
//! requested variable name. Index `i` across all columns describes one step.

use crate::{ExplorerError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One parallel column of a series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Column {
    /// Numeric measurements; `None` where the API reported `null`
    Numbers(Vec<Option<f64>>),
    /// Text values such as daily `sunrise`/`sunset` timestamps
    Text(Vec<Option<String>>),
}

impl Column {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Column::Numbers(values) => values.len(),
            Column::Text(values) => values.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Parallel arrays sharing a common time axis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    /// Timestamps (`2024-05-01T13:00`) or dates (`2024-05-01`)
    #[serde(default)]
    pub time: Vec<String>,
    /// Measurement columns keyed by API variable name
    #[serde(flatten)]
    pub columns: BTreeMap<String, Column>,
}

impl Series {
    /// Create a series with the given time axis and no columns
    #[must_use]
    pub fn new<S: Into<String>>(time: impl IntoIterator<Item = S>) -> Self {
        Self {
            time: time.into_iter().map(Into::into).collect(),
            columns: BTreeMap::new(),
        }
    }

    /// Add a numeric column
    #[must_use]
    pub fn with_numbers(mut self, name: &str, values: impl IntoIterator<Item = f64>) -> Self {
        let values = values.into_iter().map(Some).collect();
        self.columns.insert(name.to_string(), Column::Numbers(values));
        self
    }

    /// Add a text column
    #[must_use]
    pub fn with_text<S: Into<String>>(
        mut self,
        name: &str,
        values: impl IntoIterator<Item = S>,
    ) -> Self {
        let values = values.into_iter().map(|v| Some(v.into())).collect();
        self.columns.insert(name.to_string(), Column::Text(values));
        self
    }

    /// Number of time steps
    #[must_use]
    pub fn len(&self) -> usize {
        self.time.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Whether the series carries a column with this name
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Numeric value at `index`, if the column exists and holds a number there
    #[must_use]
    pub fn number(&self, name: &str, index: usize) -> Option<f64> {
        match self.columns.get(name)? {
            Column::Numbers(values) => values.get(index).copied().flatten(),
            Column::Text(_) => None,
        }
    }

    /// Numeric value at `index`, or 0 when absent
    #[must_use]
    pub fn number_or_zero(&self, name: &str, index: usize) -> f64 {
        self.number(name, index).unwrap_or(0.0)
    }

    /// Text value at `index`
    #[must_use]
    pub fn text(&self, name: &str, index: usize) -> Option<&str> {
        match self.columns.get(name)? {
            Column::Text(values) => values.get(index)?.as_deref(),
            Column::Numbers(_) => None,
        }
    }

    /// Check that every column has exactly one value per time step
    pub fn validate(&self, series_name: &str) -> Result<()> {
        let expected = self.time.len();
        for (name, column) in &self.columns {
            if column.len() != expected {
                return Err(ExplorerError::malformed_series(
                    series_name,
                    name,
                    expected,
                    column.len(),
                ));
            }
        }
        Ok(())
    }
}

/// Parse an API timestamp (`2024-05-01T13:00`, seconds optional)
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

/// Parse an API date (`2024-05-01`), also accepting a full timestamp
#[must_use]
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_timestamp(raw).map(|dt| dt.date()))
}
