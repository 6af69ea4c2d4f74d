use serde::{Deserialize, Serialize};

use crate::config::ProgressParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceTrend {
    Improving,
    Stable,
    Declining,
    InsufficientData,
}

impl PerformanceTrend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Improving => "improving",
            Self::Stable => "stable",
            Self::Declining => "declining",
            Self::InsufficientData => "insufficient_data",
        }
    }
}

pub struct TrendClassifier {
    window: usize,
    up_threshold: f64,
    down_threshold: f64,
}

impl TrendClassifier {
    pub fn new(params: &ProgressParams) -> Self {
        Self {
            window: params.trend_window,
            up_threshold: params.up_threshold,
            down_threshold: params.down_threshold,
        }
    }

    /// Classifies the trailing window of `values` (oldest first).
    pub fn classify(&self, values: &[f64]) -> PerformanceTrend {
        if values.len() < self.window {
            return PerformanceTrend::InsufficientData;
        }

        let slope = least_squares_slope(&values[values.len() - self.window..]);

        if slope > self.up_threshold {
            PerformanceTrend::Improving
        } else if slope < self.down_threshold {
            PerformanceTrend::Declining
        } else {
            PerformanceTrend::Stable
        }
    }
}

impl Default for TrendClassifier {
    fn default() -> Self {
        Self::new(&ProgressParams::default())
    }
}

pub fn least_squares_slope(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    let n = values.len() as f64;
    let sum_x: f64 = (0..values.len()).map(|i| i as f64).sum();
    let sum_y: f64 = values.iter().sum();
    let sum_xy: f64 = values.iter().enumerate().map(|(i, y)| i as f64 * y).sum();
    let sum_xx: f64 = (0..values.len()).map(|i| (i as f64).powi(2)).sum();

    let denominator = n * sum_xx - sum_x.powi(2);
    if denominator.abs() < 1e-10 {
        return 0.0;
    }

    (n * sum_xy - sum_x * sum_y) / denominator
}

/// Population standard deviation.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    let mean = values.iter().sum::<f64>() / values.len() as f64;
    (values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / values.len() as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slope_of_line() {
        assert!((least_squares_slope(&[0.2, 0.4, 0.6]) - 0.2).abs() < 1e-12);
        assert!((least_squares_slope(&[0.9, 0.6, 0.3]) + 0.3).abs() < 1e-12);
        assert_eq!(least_squares_slope(&[0.5]), 0.0);
    }

    #[test]
    fn test_classify_uses_trailing_window() {
        let classifier = TrendClassifier::default();
        assert_eq!(classifier.classify(&[0.5, 0.6]), PerformanceTrend::InsufficientData);
        assert_eq!(classifier.classify(&[0.5, 0.6, 0.7]), PerformanceTrend::Improving);
        assert_eq!(classifier.classify(&[0.9, 0.7, 0.5]), PerformanceTrend::Declining);
        // Only the last three points count.
        assert_eq!(
            classifier.classify(&[0.1, 0.9, 0.7, 0.7, 0.71]),
            PerformanceTrend::Stable
        );
    }

    #[test]
    fn test_small_slope_is_stable() {
        let classifier = TrendClassifier::default();
        assert_eq!(classifier.classify(&[0.5, 0.52, 0.54]), PerformanceTrend::Stable);
        assert_eq!(classifier.classify(&[0.54, 0.52, 0.5]), PerformanceTrend::Stable);
    }

    #[test]
    fn test_std_dev() {
        assert_eq!(std_dev(&[]), 0.0);
        assert_eq!(std_dev(&[0.7, 0.7, 0.7]), 0.0);
        assert!((std_dev(&[0.0, 1.0]) - 0.5).abs() < 1e-12);
    }
}
