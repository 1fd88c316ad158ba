// Seed data returned by the prediction backend (or loaded from fixtures)
use super::series::{TimeSeriesPoint, WeatherSeriesPoint};
use serde::{Deserialize, Serialize};

/// Spacing between consecutive seed points when the source carries no instants
pub const SEED_SPACING_MS: i64 = 5000;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureContextRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hrrr_ref_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_window: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_temp_c: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precip_kg_m2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vpd_kpa: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_humidity_pct: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usda_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yield_bu_per_acre: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production_bu: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureContext {
    pub region_id: String,
    pub region_name: String,
    pub crop: String,
    pub score: f64,
    #[serde(default)]
    pub records: Vec<FeatureContextRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub region_id: String,
    pub region_name: String,
    pub crop: String,
    pub baseline_year: i32,
    pub predicted_yield_bu_per_acre: f64,
    pub predicted_production_bu: f64,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub risk_flags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub adjustments: Vec<String>,
}

/// Subset of the backend `/answer` response this service consumes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub answer: String,
    #[serde(default)]
    pub predictions: Vec<PredictionResult>,
    #[serde(default)]
    pub feature_context: Vec<FeatureContext>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub time: String,
    pub temp: f64,
    pub precip: f64,
    pub wind: f64,
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub risk_detail: String,
    #[serde(default)]
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub region: String,
    pub crop: String,
    #[serde(default)]
    pub growth_stage: String,
    #[serde(default)]
    pub forecast_data: Vec<ForecastEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Everything needed to seed one simulator session for a county
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountySeed {
    pub answer: AnswerResponse,
    pub forecast: ForecastResponse,
}

/// Flatten feature-context records into agronomic points.
///
/// Records are dated, not timestamped, so they are laid out on a 5 s grid
/// ending just before `now_ms`.
pub fn extract_time_series(answer: &AnswerResponse, now_ms: i64) -> Vec<TimeSeriesPoint> {
    let records: Vec<&FeatureContextRecord> = answer
        .feature_context
        .iter()
        .flat_map(|feature| feature.records.iter())
        .collect();
    let total = records.len() as i64;

    records
        .into_iter()
        .enumerate()
        .map(|(idx, record)| {
            let mut point = TimeSeriesPoint::new(now_ms - (total - idx as i64) * SEED_SPACING_MS);
            point.temp_c = record.avg_temp_c;
            point.precip = record.precip_kg_m2;
            point.vpd = record.vpd_kpa;
            point.rh = record.relative_humidity_pct;
            point
        })
        .collect()
}

pub fn build_weather_series(forecast: &ForecastResponse, now_ms: i64) -> Vec<WeatherSeriesPoint> {
    let total = forecast.forecast_data.len() as i64;
    forecast
        .forecast_data
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            WeatherSeriesPoint::new(
                now_ms - (total - idx as i64) * SEED_SPACING_MS,
                entry.temp,
                entry.wind,
                entry.precip,
            )
        })
        .collect()
}
