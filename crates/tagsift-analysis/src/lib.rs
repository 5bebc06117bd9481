//! Optimal / sub-optimal operating-period analysis of industrial process data
//!
//! This crate classifies the rows of a time-indexed table of process tags as
//! optimal or sub-optimal with respect to a KPI (target) tag, and surfaces the
//! tags most associated with that KPI.
//!
//! # Overview
//!
//! A report run is a strict pipeline; data flows downward only:
//!
//! 1. **Resolve Bounds** ([`bounds::resolve`]): derive the thresholds of the
//!    optimal region from the target distribution, or take them from the caller
//! 2. **Classify** ([`classify::classify`]): split every row into the optimal or
//!    the sub-optimal [`classify::Partition`] side under the
//!    [`problem_type::ProblemType`] policy
//! 3. **Select Features** ([`selection::FeatureSelector`]): keep the tags whose
//!    correlation with the target exceeds a threshold
//! 4. **Compare Populations** ([`compare::compare`]): paired distribution
//!    summaries of the selected tags on both sides
//! 5. **Correlation Report** ([`correlation_report::report`]): top/bottom tags
//!    around the target and per-feature rankings
//!
//! [`assembler::ReportAssembler`] drives these stages as a state machine and
//! collects the results into a [`assembler::ReportBundle`], which
//! [`export::write_bundle`] lays out on disk inside a reserved
//! [`namespace::OutputNamespace`]. Figures are delegated to a
//! [`render::Renderer`].
//!
//! # Examples
//!
//! ```
//! use tagsift_analysis::{
//!     assembler::{ReportAssembler, ReportConfig, TargetSpec},
//!     bounds::BoundsSource,
//!     dataset::{Column, Dataset, RowIndex},
//!     problem_type::ProblemType,
//! };
//!
//! let dataset = Dataset::new(
//!     RowIndex::ordinal(6),
//!     vec![
//!         Column::numeric("yield", vec![80.0, 82.0, 95.0, 96.0, 70.0, 97.0]),
//!         Column::numeric("steam", vec![4.0, 4.2, 5.9, 6.1, 3.1, 6.3]),
//!         Column::numeric("ambient", vec![20.0, 20.0, 21.0, 20.0, 21.0, 21.0]),
//!     ],
//! )
//! .unwrap();
//!
//! let spec = TargetSpec::new(
//!     "yield",
//!     ProblemType::MaxEqual,
//!     BoundsSource::Manual { lower: 90.0, upper: 100.0 },
//! );
//! let bundle = ReportAssembler::new(&dataset, spec, ReportConfig::default())
//!     .run()
//!     .unwrap();
//!
//! assert_eq!(bundle.partition().optimal_rows(), &[2, 3, 5]);
//! assert_eq!(bundle.selected().names().collect::<Vec<_>>(), ["steam"]);
//! println!("{}", bundle.summary());
//! ```

pub mod assembler;
pub mod bounds;
pub mod classify;
pub mod compare;
pub mod correlation_report;
pub mod dataset;
pub mod error;
pub mod export;
pub mod namespace;
pub mod problem_type;
pub mod render;
pub mod selection;
pub mod summary;
