//! Shared test utilities for the comfort-stats workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Approximate float assertions
//! - Region, window and descriptor fixtures
//! - Synthetic raster generators
//! - GeoTIFF catalog scene writers
//! - In-memory fetcher and job queue fakes
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{assert_approx_eq, fixtures, StaticFetcher};
//! ```

pub mod fakes;
pub mod fixtures;
pub mod generators;
pub mod scenes;

// Re-export commonly used items at the crate root
pub use fakes::*;
pub use fixtures::*;
pub use generators::*;
pub use scenes::*;

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Assert a statistic is available and approximately equal to `expected`.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_stat_approx;
///
/// assert_stat_approx!(result, StatKind::Mean, 26.85, 1e-9);
/// ```
#[macro_export]
macro_rules! assert_stat_approx {
    ($result:expr, $kind:expr, $expected:expr, $epsilon:expr) => {{
        match $result.get($kind) {
            Some(value) => $crate::assert_approx_eq!(value, $expected, $epsilon),
            None => panic!("statistic {:?} is unavailable, expected {:?}", $kind, $expected),
        }
    }};
}

#[cfg(test)]
mod tests {
    use geo_common::{StatKind, StatisticsResult};

    #[test]
    fn test_assert_approx_eq_passes() {
        assert_approx_eq!(1.0001, 1.0, 0.001);
        assert_approx_eq!(0.0, 0.0, 0.0001);
        assert_approx_eq!(-5.5, -5.500001, 0.0001);
    }

    #[test]
    #[should_panic(expected = "assertion failed")]
    fn test_assert_approx_eq_fails() {
        assert_approx_eq!(1.1, 1.0, 0.001);
    }

    #[test]
    fn test_assert_stat_approx() {
        let mut result = StatisticsResult::unavailable(&[StatKind::Mean]);
        result.set(StatKind::Mean, Some(0.5));
        assert_stat_approx!(result, StatKind::Mean, 0.5, 1e-12);
    }

    #[test]
    #[should_panic(expected = "unavailable")]
    fn test_assert_stat_approx_unavailable() {
        let result = StatisticsResult::unavailable(&[StatKind::Mean]);
        assert_stat_approx!(result, StatKind::Mean, 0.5, 1e-12);
    }
}
