// Baselines bounding and centering every synthetic point of a run
use crate::application::stats::compute_metric_stats;
use crate::domain::series::{
    MetricStats, SeriesBaseline, TimeSeriesPoint, WeatherBaseline, WeatherSeriesPoint,
};

const DEFAULT_TEMP_C: f64 = 28.0;
const DEFAULT_PRECIP: f64 = 2.0;
const DEFAULT_VPD: f64 = 1.0;
const DEFAULT_RH: f64 = 65.0;
const DEFAULT_WIND: f64 = 8.0;

fn finite_or(value: Option<f64>, default: f64) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(default)
}

/// Fixed range widened just enough to contain `mean`
fn fixed_range(mean: f64, min: f64, max: f64) -> MetricStats {
    MetricStats::new(mean, min.min(mean), max.max(mean))
}

/// Heuristic baseline around a single reference point (or constants when absent)
pub fn default_series_baseline(seed: Option<&TimeSeriesPoint>) -> SeriesBaseline {
    let temp = finite_or(seed.and_then(|p| p.temp_c), DEFAULT_TEMP_C);
    let precip = finite_or(seed.and_then(|p| p.precip), DEFAULT_PRECIP);
    let vpd = finite_or(seed.and_then(|p| p.vpd), DEFAULT_VPD);
    let rh = finite_or(seed.and_then(|p| p.rh), DEFAULT_RH);

    SeriesBaseline {
        temp: MetricStats::new(temp, temp - 3.0, temp + 3.0),
        precip: fixed_range(precip, 0.0, (precip + 3.0).max(5.0)),
        vpd: fixed_range(vpd, (vpd - 0.5).max(0.0), vpd + 0.5),
        rh: fixed_range(rh, 40.0, 95.0),
    }
}

pub fn default_weather_baseline(seed: Option<&WeatherSeriesPoint>) -> WeatherBaseline {
    let temp = finite_or(seed.map(|p| p.temp), DEFAULT_TEMP_C);
    let wind = finite_or(seed.map(|p| p.wind), DEFAULT_WIND);
    let precip = finite_or(seed.map(|p| p.precip), DEFAULT_PRECIP);

    WeatherBaseline {
        temp: fixed_range(temp, 10.0, 45.0),
        wind: fixed_range(wind, 0.0, 20.0),
        precip: fixed_range(precip, 0.0, (precip + 5.0).max(5.0)),
    }
}

pub fn compute_series_baseline(series: &[TimeSeriesPoint]) -> SeriesBaseline {
    let fallback = default_series_baseline(series.first());
    if series.is_empty() {
        return fallback;
    }

    SeriesBaseline {
        temp: compute_metric_stats(series, |p| p.temp_c, fallback.temp),
        precip: compute_metric_stats(series, |p| p.precip, fallback.precip),
        vpd: compute_metric_stats(series, |p| p.vpd, fallback.vpd),
        rh: compute_metric_stats(series, |p| p.rh, fallback.rh),
    }
}

pub fn compute_weather_baseline(series: &[WeatherSeriesPoint]) -> WeatherBaseline {
    let fallback = default_weather_baseline(series.first());
    if series.is_empty() {
        return fallback;
    }

    WeatherBaseline {
        temp: compute_metric_stats(series, |p| Some(p.temp), fallback.temp),
        wind: compute_metric_stats(series, |p| Some(p.wind), fallback.wind),
        precip: compute_metric_stats(series, |p| Some(p.precip), fallback.precip),
    }
}
