//! Statistical primitives for the tagsift project.
//!
//! This crate provides the numeric building blocks used by the analysis engine:
//!
//! - **Descriptive statistics**: min, max, mean, median, variance of a series
//! - **Percentiles**: Linearly interpolated percentiles that skip missing values
//! - **Correlation**: Pearson and Spearman correlation and full correlation matrices
//!
//! Missing values are represented as `f64::NAN` throughout and are ignored
//! rather than propagated.
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`percentiles`]: Percentile computation and storage
//! - [`correlation`]: Pairwise-complete Pearson and Spearman correlation
//!
//! # Examples
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use tagsift_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! ```
//!
//! ## Computing percentiles
//!
//! ```
//! use tagsift_stats::percentiles::Percentiles;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 100.0];
//! let percentiles = Percentiles::new(&values, &[25.0, 50.0, 75.0]);
//! assert_eq!(percentiles.get(25.0), Some(2.0));
//! assert_eq!(percentiles.get(75.0), Some(4.0));
//! ```
//!
//! ## Correlating two series
//!
//! ```
//! use tagsift_stats::correlation::pearson;
//!
//! let flow = [10.0, 12.0, 14.0, f64::NAN, 18.0];
//! let yield_ = [0.50, 0.61, 0.70, 0.75, 0.91];
//! let r = pearson(&flow, &yield_).unwrap();
//! assert!(r > 0.99);
//! ```

pub mod correlation;
pub mod descriptive;
pub mod percentiles;
