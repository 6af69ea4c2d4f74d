pub mod style;
pub mod trend;

pub use style::{normalized_entropy, StyleAnalyzer, StyleSignature};
pub use trend::{least_squares_slope, std_dev, PerformanceTrend, TrendClassifier};
