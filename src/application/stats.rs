// Summary statistics over one field of a historical series
use crate::domain::series::MetricStats;

/// Mean/min/max of `accessor` over `points`, ignoring missing and non-finite values.
///
/// Returns `fallback` unchanged when no usable value remains.
pub fn compute_metric_stats<T, F>(points: &[T], accessor: F, fallback: MetricStats) -> MetricStats
where
    F: Fn(&T) -> Option<f64>,
{
    let values: Vec<f64> = points
        .iter()
        .filter_map(&accessor)
        .filter(|v| v.is_finite())
        .collect();

    if values.is_empty() {
        return fallback;
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    // Summation rounding can push the mean of identical values past max.
    let mean = (values.iter().sum::<f64>() / values.len() as f64).clamp(min, max);

    MetricStats { mean, min, max }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FALLBACK: MetricStats = MetricStats {
        mean: 1.0,
        min: 0.0,
        max: 2.0,
    };

    #[test]
    fn test_empty_returns_fallback() {
        let points: Vec<Option<f64>> = vec![];
        assert_eq!(compute_metric_stats(&points, |p| *p, FALLBACK), FALLBACK);
    }

    #[test]
    fn test_all_invalid_returns_fallback() {
        let points = vec![None, Some(f64::NAN), Some(f64::INFINITY)];
        assert_eq!(compute_metric_stats(&points, |p| *p, FALLBACK), FALLBACK);
    }

    #[test]
    fn test_stats_over_valid_subset() {
        let points = vec![Some(4.0), None, Some(f64::NAN), Some(1.0), Some(7.0)];
        let stats = compute_metric_stats(&points, |p| *p, FALLBACK);
        assert_eq!(stats, MetricStats::new(4.0, 1.0, 7.0));
    }

    #[test]
    fn test_mean_between_min_and_max() {
        let samples: [&[f64]; 4] = [
            &[3.5],
            &[-2.0, 10.0, 0.25],
            &[0.1, 0.1, 0.1],
            &[1e9, -1e9, 42.0],
        ];
        for sample in samples {
            let points: Vec<f64> = sample.to_vec();
            let stats = compute_metric_stats(&points, |p| Some(*p), FALLBACK);
            assert!(stats.min <= stats.mean && stats.mean <= stats.max, "{:?}", stats);
        }
    }
}
