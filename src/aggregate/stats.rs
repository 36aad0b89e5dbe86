use serde::Serialize;

/// Number of standard deviations above the mean for the alert band.
pub const UPPER_BAND_SIGMAS: f64 = 3.0;

/// Reference lines drawn over a trend chart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SummaryStats {
    pub median: f64,
    pub mean: f64,
    /// Population standard deviation. Zero for fewer than two values.
    pub std_dev: f64,
    /// `mean + 3σ`.
    pub upper_band: f64,
}

impl SummaryStats {
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let std_dev = if values.len() < 2 {
            0.0
        } else {
            let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            variance.sqrt()
        };

        Self {
            median: median(values),
            mean,
            std_dev,
            upper_band: mean + UPPER_BAND_SIGMAS * std_dev,
        }
    }

    pub fn from_counts<I>(counts: I) -> Self
    where
        I: IntoIterator<Item = i64>,
    {
        let values: Vec<f64> = counts.into_iter().map(|c| c as f64).collect();
        Self::from_values(&values)
    }
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn empty_input_is_all_zero() {
        assert_eq!(SummaryStats::from_values(&[]), SummaryStats::default());
    }

    #[test]
    fn single_value_has_no_spread() {
        let stats = SummaryStats::from_counts([7]);
        assert_eq!(stats.median, 7.0);
        assert_eq!(stats.mean, 7.0);
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.upper_band, 7.0);
    }

    #[test]
    fn population_deviation() {
        // mean 5, variance 4 (population), σ 2
        let stats = SummaryStats::from_counts([2, 4, 4, 4, 5, 5, 7, 9]);
        assert!(close(stats.mean, 5.0));
        assert!(close(stats.std_dev, 2.0));
        assert!(close(stats.upper_band, 11.0));
        assert!(close(stats.median, 4.5));
    }

    #[test]
    fn odd_length_median_is_middle_value() {
        let stats = SummaryStats::from_values(&[10.0, 1.0, 3.0]);
        assert_eq!(stats.median, 3.0);
    }
}
