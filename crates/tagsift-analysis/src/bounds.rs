//! Threshold derivation for the target tag
//!
//! The optimal region of the target is delimited by a [`Bounds`] pair. The
//! pair is either supplied by the caller or derived from the empirical
//! distribution of the target:
//!
//! - **Auto**: Tukey fences. `Q1 - 1.5 * IQR` and/or `Q3 + 1.5 * IQR`, with
//!   the opposite bound at the observed extreme.
//! - **Quantile**: a single caller-chosen quantile replaces the fence.
//! - **Manual**: the caller's pair, verbatim.
//!
//! Minimizing and band problems never yield a negative lower bound.
//!
//! # Examples
//!
//! ```
//! use tagsift_analysis::{
//!     bounds::{BoundsSource, resolve},
//!     problem_type::ProblemType,
//! };
//!
//! let series = [1.0, 2.0, 3.0, 4.0, 100.0];
//! let bounds = resolve(&series, ProblemType::Max, &BoundsSource::Auto).unwrap();
//!
//! // Q1 = 2, Q3 = 4, IQR = 2
//! assert_eq!(bounds.lower, -1.0);
//! assert_eq!(bounds.upper, 100.0);
//! ```

use serde::Serialize;
use tagsift_stats::{
    descriptive::DescriptiveStats,
    percentiles::{compute_percentile, sorted_non_missing},
};

use crate::{
    error::EngineError,
    problem_type::{Direction, ProblemType},
};

/// Multiplier of the interquartile range used for the automatic fences.
pub const IQR_FENCE: f64 = 1.5;

/// Lower/upper thresholds of the optimal region. Always `lower <= upper`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Bounds {
    /// Checked constructor; fails unless `lower <= upper` (`NaN` fails).
    pub fn new(lower: f64, upper: f64) -> Result<Self, EngineError> {
        if lower <= upper {
            Ok(Self { lower, upper })
        } else {
            Err(EngineError::InvalidBounds { lower, upper })
        }
    }
}

/// Where the bounds of a run come from.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum BoundsSource {
    /// Caller-supplied pair, used verbatim.
    Manual { lower: f64, upper: f64 },
    /// Quantile in `(0, 1)` of the target used as the free bound.
    Quantile(f64),
    /// Interquartile fences.
    #[default]
    Auto,
}

impl BoundsSource {
    #[must_use]
    pub fn mode(&self) -> &'static str {
        match self {
            Self::Manual { .. } => "manual",
            Self::Quantile(_) => "quantile",
            Self::Auto => "auto",
        }
    }

    #[must_use]
    pub fn quantile(&self) -> Option<f64> {
        match self {
            Self::Quantile(q) => Some(*q),
            _ => None,
        }
    }
}

/// Resolves the bounds for a target series.
///
/// Missing values (`NaN`) are ignored. Pure: the series is only read.
///
/// # Errors
///
/// * [`EngineError::InvalidBounds`] - manual bounds with `lower > upper`
/// * [`EngineError::InvalidQuantile`] - quantile outside `(0, 1)`
/// * [`EngineError::EmptyTarget`] - no non-missing value to derive bounds from
pub fn resolve(
    series: &[f64],
    problem_type: ProblemType,
    source: &BoundsSource,
) -> Result<Bounds, EngineError> {
    match *source {
        BoundsSource::Manual { lower, upper } => return Bounds::new(lower, upper),
        BoundsSource::Quantile(q) if !(q > 0.0 && q < 1.0) => {
            return Err(EngineError::InvalidQuantile { quantile: q });
        }
        _ => {}
    }

    let sorted = sorted_non_missing(series.iter().copied());
    let stats = DescriptiveStats::from_sorted(&sorted).ok_or(EngineError::EmptyTarget)?;
    let at = |fraction: f64| compute_percentile(&sorted, fraction * 100.0).unwrap_or(f64::NAN);

    let (lower, upper) = match *source {
        BoundsSource::Quantile(q) => match problem_type.direction() {
            Direction::Maximize => (at(q), stats.max),
            Direction::Minimize => (stats.min, at(q)),
            Direction::Band => (at(q.min(1.0 - q)), at(q.max(1.0 - q))),
        },
        _ => {
            let (q1, q3) = (at(0.25), at(0.75));
            let iqr = q3 - q1;
            match problem_type.direction() {
                Direction::Maximize => (q1 - IQR_FENCE * iqr, stats.max),
                Direction::Minimize => (stats.min, q3 + IQR_FENCE * iqr),
                Direction::Band => (q1 - IQR_FENCE * iqr, q3 + IQR_FENCE * iqr),
            }
        }
    };

    let bounds = match problem_type.direction() {
        Direction::Maximize => Bounds { lower, upper },
        Direction::Minimize | Direction::Band => {
            // a wholly negative target would otherwise invert the pair
            let lower = lower.max(0.0);
            Bounds {
                lower,
                upper: upper.max(lower),
            }
        }
    };
    log::debug!(
        "resolved {problem_type} bounds over {} values: [{}, {}]",
        stats.count,
        bounds.lower,
        bounds.upper
    );
    Ok(bounds)
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg64Mcg;

    use super::*;

    #[test]
    fn test_auto_max() {
        let series = [1.0, 2.0, 3.0, 4.0, 100.0];
        let bounds = resolve(&series, ProblemType::Max, &BoundsSource::Auto).unwrap();
        assert_eq!(bounds, Bounds { lower: -1.0, upper: 100.0 });
        let bounds = resolve(&series, ProblemType::MaxEqual, &BoundsSource::Auto).unwrap();
        assert_eq!(bounds, Bounds { lower: -1.0, upper: 100.0 });
    }

    #[test]
    fn test_auto_min_clamps_lower() {
        let series = [-5.0, 2.0, 3.0, 4.0, 6.0];
        let bounds = resolve(&series, ProblemType::Min, &BoundsSource::Auto).unwrap();
        // Q1 = 2, Q3 = 4 -> upper = 4 + 3 = 7
        assert_eq!(bounds, Bounds { lower: 0.0, upper: 7.0 });

        let series = [1.0, 2.0, 3.0, 4.0, 5.0];
        let bounds = resolve(&series, ProblemType::MinEqual, &BoundsSource::Auto).unwrap();
        assert_eq!(bounds, Bounds { lower: 1.0, upper: 7.0 });
    }

    #[test]
    fn test_auto_range() {
        let series = [10.0, 11.0, 12.0, 13.0, 14.0];
        let bounds = resolve(&series, ProblemType::Range, &BoundsSource::Auto).unwrap();
        assert_eq!(bounds, Bounds { lower: 8.0, upper: 16.0 });

        let series = [1.0, 2.0, 3.0, 4.0, 100.0];
        let bounds = resolve(&series, ProblemType::Range, &BoundsSource::Auto).unwrap();
        assert_eq!(bounds, Bounds { lower: 0.0, upper: 7.0 });
    }

    #[test]
    fn test_ignores_missing_values() {
        let series = [f64::NAN, 1.0, 2.0, f64::NAN, 3.0, 4.0, 100.0];
        let bounds = resolve(&series, ProblemType::Max, &BoundsSource::Auto).unwrap();
        assert_eq!(bounds, Bounds { lower: -1.0, upper: 100.0 });
    }

    #[test]
    fn test_quantile_source() {
        let series = [0.0, 10.0, 20.0, 30.0, 40.0];
        let max = resolve(&series, ProblemType::Max, &BoundsSource::Quantile(0.25)).unwrap();
        assert_eq!(max, Bounds { lower: 10.0, upper: 40.0 });

        let min = resolve(&series, ProblemType::MinEqual, &BoundsSource::Quantile(0.75)).unwrap();
        assert_eq!(min, Bounds { lower: 0.0, upper: 30.0 });

        let band = resolve(&series, ProblemType::Range, &BoundsSource::Quantile(0.75)).unwrap();
        assert_eq!(band, Bounds { lower: 10.0, upper: 30.0 });
        let mirrored = resolve(&series, ProblemType::Range, &BoundsSource::Quantile(0.25)).unwrap();
        assert_eq!(band, mirrored);
    }

    #[test]
    fn test_invalid_quantile() {
        for q in [0.0, 1.0, -0.2, 1.5, f64::NAN] {
            assert!(matches!(
                resolve(&[1.0, 2.0], ProblemType::Max, &BoundsSource::Quantile(q)),
                Err(EngineError::InvalidQuantile { .. })
            ));
        }
    }

    #[test]
    fn test_manual_bounds_are_verbatim() {
        let source = BoundsSource::Manual { lower: -3.0, upper: 10.0 };
        // No clamping for manual bounds, even for minimizing problems
        let bounds = resolve(&[5.0, 10.0, 11.0], ProblemType::MinEqual, &source).unwrap();
        assert_eq!(bounds, Bounds { lower: -3.0, upper: 10.0 });
        // Manual bounds need no data at all
        assert!(resolve(&[], ProblemType::Max, &source).is_ok());
    }

    #[test]
    fn test_manual_bounds_must_be_ordered() {
        let source = BoundsSource::Manual { lower: 5.0, upper: 1.0 };
        assert!(matches!(
            resolve(&[1.0], ProblemType::Range, &source),
            Err(EngineError::InvalidBounds { .. })
        ));
    }

    #[test]
    fn test_empty_target() {
        assert!(matches!(
            resolve(&[f64::NAN, f64::NAN], ProblemType::Min, &BoundsSource::Auto),
            Err(EngineError::EmptyTarget)
        ));
    }

    #[test]
    fn test_wholly_negative_target_keeps_order() {
        let series = [-10.0, -9.0, -8.0, -7.0];
        for problem_type in [ProblemType::Min, ProblemType::Range] {
            let bounds = resolve(&series, problem_type, &BoundsSource::Auto).unwrap();
            assert_eq!(bounds, Bounds { lower: 0.0, upper: 0.0 });
        }
    }

    #[test]
    fn test_random_series_bounds_are_ordered() {
        let mut rng = Pcg64Mcg::seed_from_u64(0x5eed);
        for _ in 0..500 {
            let len = rng.random_range(1..60);
            let offset = rng.random_range(-100.0..100.0);
            let scale = rng.random_range(0.0..50.0);
            let series = (0..len)
                .map(|_| {
                    if rng.random_bool(0.1) {
                        f64::NAN
                    } else {
                        offset + scale * rng.random_range(-1.0..1.0)
                    }
                })
                .collect::<Vec<f64>>();
            let sources = [
                BoundsSource::Auto,
                BoundsSource::Quantile(rng.random_range(0.01..0.99)),
            ];
            for problem_type in ProblemType::ALL {
                for source in &sources {
                    let Ok(bounds) = resolve(&series, problem_type, source) else {
                        assert!(series.iter().all(|v| v.is_nan()));
                        continue;
                    };
                    assert!(bounds.lower <= bounds.upper, "{problem_type}: {bounds:?}");
                    if problem_type.direction() != Direction::Maximize {
                        assert!(bounds.lower >= 0.0, "{problem_type}: {bounds:?}");
                    }
                }
            }
        }
    }
}
