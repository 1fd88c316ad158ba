// Live series domain models
use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};

/// Agronomic sample: weather-derived crop stress indicators at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub timestamp: i64,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_c: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precip: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vpd: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rh: Option<f64>,
    /// Set only on backfilled padding points. Forward-simulated points stay unmarked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ghost: Option<bool>,
}

impl TimeSeriesPoint {
    pub fn new(timestamp: i64) -> Self {
        Self {
            timestamp,
            label: format_time_label(timestamp),
            temp_c: None,
            precip: None,
            vpd: None,
            rh: None,
            ghost: None,
        }
    }

    pub fn is_ghost(&self) -> bool {
        self.ghost.unwrap_or(false)
    }
}

/// Forecast-sourced sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSeriesPoint {
    pub timestamp: i64,
    pub label: String,
    pub temp: f64,
    pub wind: f64,
    pub precip: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ghost: Option<bool>,
}

impl WeatherSeriesPoint {
    pub fn new(timestamp: i64, temp: f64, wind: f64, precip: f64) -> Self {
        Self {
            timestamp,
            label: format_time_label(timestamp),
            temp,
            wind,
            precip,
            ghost: None,
        }
    }

    pub fn is_ghost(&self) -> bool {
        self.ghost.unwrap_or(false)
    }
}

/// Summary statistics of one field over a historical window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl MetricStats {
    pub fn new(mean: f64, min: f64, max: f64) -> Self {
        Self { mean, min, max }
    }

    /// Padding applied on both sides of `[min, max]` when clamping. At least 0.1.
    pub fn buffer(&self) -> f64 {
        ((self.max - self.min) * 0.15).max(0.1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesBaseline {
    pub temp: MetricStats,
    pub precip: MetricStats,
    pub vpd: MetricStats,
    pub rh: MetricStats,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherBaseline {
    pub temp: MetricStats,
    pub wind: MetricStats,
    pub precip: MetricStats,
}

/// Format an epoch-millisecond instant as a local `HH:MM:SS` label
pub fn format_time_label(timestamp_ms: i64) -> String {
    match Local.timestamp_millis_opt(timestamp_ms).single() {
        Some(time) => time.format("%H:%M:%S").to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_floor() {
        let stats = MetricStats::new(5.0, 5.0, 5.0);
        assert_eq!(stats.buffer(), 0.1);

        let stats = MetricStats::new(25.0, 20.0, 30.0);
        assert!((stats.buffer() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_time_label_shape() {
        let label = format_time_label(1_720_000_000_000);
        assert_eq!(label.len(), 8);
        assert_eq!(label.matches(':').count(), 2);
    }

    #[test]
    fn test_ghost_flag_skipped_when_unset() {
        let point = TimeSeriesPoint::new(0);
        let json = serde_json::to_value(&point).unwrap();
        assert!(json.get("ghost").is_none());
        assert!(json.get("temp_c").is_none());
        assert!(!point.is_ghost());
    }
}
