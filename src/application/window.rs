// Fixed-length live windows and the per-family point generators
use crate::application::baseline::{
    compute_series_baseline, compute_weather_baseline, default_series_baseline,
    default_weather_baseline,
};
use crate::application::step::{mean_reverting_step, NoiseSource};
use crate::domain::evidence::SEED_SPACING_MS;
use crate::domain::series::{
    SeriesBaseline, TimeSeriesPoint, WeatherBaseline, WeatherSeriesPoint,
};

pub const SERIES_WINDOW: usize = 30;
pub const WEATHER_WINDOW: usize = 20;
/// Spacing between consecutive window points, also the ticker period.
/// Ticks continue the seed grid without a gap.
pub const TICK_INTERVAL_MS: i64 = SEED_SPACING_MS;

/// One kind of simulated series: its point type, baseline and stepping rules
pub trait SeriesFamily: Send + Sync + 'static {
    type Point: Clone + Send + Sync + 'static;
    type Baseline: Clone + Send + Sync + 'static;

    const NAME: &'static str;
    const WINDOW: usize;

    fn compute_baseline(series: &[Self::Point]) -> Self::Baseline;

    /// Forward-simulated successor of `last`, one tick later
    fn next_point(last: &Self::Point, baseline: &Self::Baseline, noise: &mut dyn NoiseSource) -> Self::Point;

    /// `missing` ghost points preceding `first`, oldest first
    fn backfill(
        first: &Self::Point,
        missing: usize,
        baseline: &Self::Baseline,
        noise: &mut dyn NoiseSource,
    ) -> Vec<Self::Point>;
}

/// Trim or pad `seed` to exactly `F::WINDOW` points (empty stays empty).
pub fn normalize_window<F: SeriesFamily>(
    seed: &[F::Point],
    baseline: &F::Baseline,
    noise: &mut dyn NoiseSource,
) -> Vec<F::Point> {
    let Some(first) = seed.first() else {
        return Vec::new();
    };
    if seed.len() >= F::WINDOW {
        return seed[seed.len() - F::WINDOW..].to_vec();
    }

    let missing = F::WINDOW - seed.len();
    let mut window = F::backfill(first, missing, baseline, noise);
    window.extend_from_slice(seed);
    window
}

pub struct AgronomicFamily;

impl SeriesFamily for AgronomicFamily {
    type Point = TimeSeriesPoint;
    type Baseline = SeriesBaseline;

    const NAME: &'static str = "series";
    const WINDOW: usize = SERIES_WINDOW;

    fn compute_baseline(series: &[TimeSeriesPoint]) -> SeriesBaseline {
        compute_series_baseline(series)
    }

    fn next_point(last: &TimeSeriesPoint, baseline: &SeriesBaseline, noise: &mut dyn NoiseSource) -> TimeSeriesPoint {
        generate_next_point(last, Some(baseline), noise)
    }

    fn backfill(
        first: &TimeSeriesPoint,
        missing: usize,
        baseline: &SeriesBaseline,
        noise: &mut dyn NoiseSource,
    ) -> Vec<TimeSeriesPoint> {
        let mut temp = first.temp_c;
        let mut precip = first.precip;
        let mut vpd = first.vpd;
        let mut rh = first.rh;

        (1..=missing)
            .rev()
            .map(|i| {
                let raw_temp = mean_reverting_step(temp, &baseline.temp, 0.12, noise);
                let raw_precip = mean_reverting_step(precip, &baseline.precip, 0.2, noise);
                let raw_vpd = mean_reverting_step(vpd, &baseline.vpd, 0.03, noise);
                let raw_rh = mean_reverting_step(rh, &baseline.rh, 0.5, noise);
                // the walk continues from the unguarded values
                temp = Some(raw_temp);
                precip = Some(raw_precip);
                vpd = Some(raw_vpd);
                rh = Some(raw_rh);

                let mut ghost = TimeSeriesPoint::new(first.timestamp - i as i64 * TICK_INTERVAL_MS);
                ghost.temp_c = Some(raw_temp);
                ghost.precip = Some(raw_precip.max(0.0));
                ghost.vpd = Some(raw_vpd.max(0.0));
                ghost.rh = Some(raw_rh.clamp(30.0, 100.0));
                ghost.ghost = Some(true);
                ghost
            })
            .collect()
    }
}

pub struct WeatherFamily;

impl SeriesFamily for WeatherFamily {
    type Point = WeatherSeriesPoint;
    type Baseline = WeatherBaseline;

    const NAME: &'static str = "weather";
    const WINDOW: usize = WEATHER_WINDOW;

    fn compute_baseline(series: &[WeatherSeriesPoint]) -> WeatherBaseline {
        compute_weather_baseline(series)
    }

    fn next_point(last: &WeatherSeriesPoint, baseline: &WeatherBaseline, noise: &mut dyn NoiseSource) -> WeatherSeriesPoint {
        generate_weather_point(last, Some(baseline), noise)
    }

    fn backfill(
        first: &WeatherSeriesPoint,
        missing: usize,
        baseline: &WeatherBaseline,
        noise: &mut dyn NoiseSource,
    ) -> Vec<WeatherSeriesPoint> {
        let mut temp = first.temp;
        let mut wind = first.wind;
        let mut precip = first.precip;

        (1..=missing)
            .rev()
            .map(|i| {
                temp = mean_reverting_step(Some(temp), &baseline.temp, 0.1, noise);
                wind = mean_reverting_step(Some(wind), &baseline.wind, 0.15, noise);
                precip = mean_reverting_step(Some(precip), &baseline.precip, 0.2, noise);

                let mut ghost = WeatherSeriesPoint::new(
                    first.timestamp - i as i64 * TICK_INTERVAL_MS,
                    temp,
                    wind,
                    precip.max(0.0),
                );
                ghost.ghost = Some(true);
                ghost
            })
            .collect()
    }
}

/// Agronomic point one tick after `last`. Not marked ghost.
pub fn generate_next_point(
    last: &TimeSeriesPoint,
    baseline: Option<&SeriesBaseline>,
    noise: &mut dyn NoiseSource,
) -> TimeSeriesPoint {
    let baseline = baseline.copied().unwrap_or_else(|| default_series_baseline(Some(last)));

    let mut next = TimeSeriesPoint::new(last.timestamp + TICK_INTERVAL_MS);
    next.temp_c = Some(mean_reverting_step(last.temp_c, &baseline.temp, 0.15, noise));
    next.precip = Some(mean_reverting_step(last.precip, &baseline.precip, 0.25, noise).max(0.0));
    next.vpd = Some(mean_reverting_step(last.vpd, &baseline.vpd, 0.04, noise).max(0.0));
    next.rh = Some(mean_reverting_step(last.rh, &baseline.rh, 0.6, noise).clamp(30.0, 100.0));
    next
}

pub fn generate_weather_point(
    last: &WeatherSeriesPoint,
    baseline: Option<&WeatherBaseline>,
    noise: &mut dyn NoiseSource,
) -> WeatherSeriesPoint {
    let baseline = baseline.copied().unwrap_or_else(|| default_weather_baseline(Some(last)));

    WeatherSeriesPoint::new(
        last.timestamp + TICK_INTERVAL_MS,
        mean_reverting_step(Some(last.temp), &baseline.temp, 0.12, noise),
        mean_reverting_step(Some(last.wind), &baseline.wind, 0.2, noise),
        mean_reverting_step(Some(last.precip), &baseline.precip, 0.25, noise).max(0.0),
    )
}

pub fn normalize_series_window(
    seed: &[TimeSeriesPoint],
    baseline: &SeriesBaseline,
    noise: &mut dyn NoiseSource,
) -> Vec<TimeSeriesPoint> {
    normalize_window::<AgronomicFamily>(seed, baseline, noise)
}

pub fn normalize_weather_window(
    seed: &[WeatherSeriesPoint],
    baseline: &WeatherBaseline,
    noise: &mut dyn NoiseSource,
) -> Vec<WeatherSeriesPoint> {
    normalize_window::<WeatherFamily>(seed, baseline, noise)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::step::{ConstantNoise, RngNoise};

    const T: i64 = 1_720_000_000_000;

    fn seed_point(timestamp: i64) -> TimeSeriesPoint {
        let mut p = TimeSeriesPoint::new(timestamp);
        p.temp_c = Some(28.0);
        p.precip = Some(2.0);
        p.vpd = Some(1.0);
        p.rh = Some(65.0);
        p
    }

    #[test]
    fn test_single_point_padded_to_full_window() {
        let seed = vec![seed_point(T)];
        let baseline = compute_series_baseline(&seed);
        let window = normalize_series_window(&seed, &baseline, &mut RngNoise::seeded(1));

        assert_eq!(window.len(), SERIES_WINDOW);
        assert_eq!(window.last(), Some(&seed[0]));

        let ghosts = &window[..SERIES_WINDOW - 1];
        assert!(ghosts.iter().all(|p| p.is_ghost()));
        assert!(ghosts.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        assert_eq!(ghosts[0].timestamp, T - 29 * TICK_INTERVAL_MS);
        assert_eq!(ghosts.last().map(|p| p.timestamp), Some(T - TICK_INTERVAL_MS));
    }

    #[test]
    fn test_empty_seed_gives_empty_window() {
        let baseline = default_series_baseline(None);
        assert!(normalize_series_window(&[], &baseline, &mut ConstantNoise(0.5)).is_empty());

        let baseline = default_weather_baseline(None);
        assert!(normalize_weather_window(&[], &baseline, &mut ConstantNoise(0.5)).is_empty());
    }

    #[test]
    fn test_long_seed_keeps_most_recent() {
        let seed: Vec<TimeSeriesPoint> = (0..45).map(|i| seed_point(T + i * TICK_INTERVAL_MS)).collect();
        let baseline = compute_series_baseline(&seed);
        let window = normalize_series_window(&seed, &baseline, &mut ConstantNoise(0.5));

        assert_eq!(window.len(), SERIES_WINDOW);
        assert_eq!(window[0], seed[15]);
        assert_eq!(window.last(), seed.last());
        assert!(window.iter().all(|p| !p.is_ghost()));
    }

    #[test]
    fn test_window_length_for_every_seed_size() {
        let mut noise = RngNoise::seeded(3);
        for len in 1..=40 {
            let seed: Vec<WeatherSeriesPoint> = (0..len)
                .map(|i| WeatherSeriesPoint::new(T + i as i64 * TICK_INTERVAL_MS, 30.0, 10.0, 5.0))
                .collect();
            let baseline = compute_weather_baseline(&seed);
            let window = normalize_weather_window(&seed, &baseline, &mut noise);

            assert_eq!(window.len(), WEATHER_WINDOW);
            let ghost_count = window.iter().filter(|p| p.is_ghost()).count();
            assert_eq!(ghost_count, WEATHER_WINDOW.saturating_sub(len));
            // seed points keep their unset flag
            assert!(window[ghost_count..].iter().all(|p| p.ghost.is_none()));
        }
    }

    #[test]
    fn test_ghost_guards_applied() {
        let mut seed = seed_point(T);
        seed.precip = Some(0.0);
        seed.vpd = Some(0.0);
        seed.rh = Some(30.0);
        let baseline = compute_series_baseline(std::slice::from_ref(&seed));
        // push every step downward as far as the noise allows
        let window = normalize_series_window(&[seed], &baseline, &mut ConstantNoise(0.0));

        for ghost in &window[..SERIES_WINDOW - 1] {
            assert!(ghost.precip.unwrap() >= 0.0);
            assert!(ghost.vpd.unwrap() >= 0.0);
            assert!(ghost.rh.unwrap() >= 30.0);
        }
    }

    #[test]
    fn test_forward_points_are_not_ghosts() {
        let last = seed_point(T);
        let baseline = compute_series_baseline(std::slice::from_ref(&last));
        let next = generate_next_point(&last, Some(&baseline), &mut RngNoise::seeded(5));

        assert_eq!(next.timestamp, T + TICK_INTERVAL_MS);
        assert!(!next.is_ghost());
        assert!(next.temp_c.is_some() && next.rh.is_some());

        let last = WeatherSeriesPoint::new(T, 30.0, 10.0, 0.0);
        let next = generate_weather_point(&last, None, &mut ConstantNoise(0.0));
        assert_eq!(next.timestamp, T + TICK_INTERVAL_MS);
        assert_eq!(next.precip, 0.0);
        assert!(next.ghost.is_none());
    }

    #[test]
    fn test_missing_fields_heal_to_baseline_mean() {
        let last = TimeSeriesPoint::new(T);
        let baseline = default_series_baseline(None);
        let next = generate_next_point(&last, Some(&baseline), &mut ConstantNoise(0.5));

        assert_eq!(next.temp_c, Some(28.0));
        assert_eq!(next.precip, Some(2.0));
        assert_eq!(next.vpd, Some(1.0));
        assert_eq!(next.rh, Some(65.0));
    }
}
