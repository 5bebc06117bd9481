use std::{io, path::PathBuf};

use crate::{classify::Side, dataset::ColumnKind};

/// Errors raised by the analysis engine.
///
/// Components raise these immediately on invalid input; nothing falls back to
/// silent defaults.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum EngineError {
    #[display(
        "invalid problem type '{value}' (expected one of max, max_equal, min, min_equal, range)"
    )]
    InvalidProblemType { value: String },
    #[display("invalid bounds: lower bound {lower} is greater than upper bound {upper}")]
    InvalidBounds { lower: f64, upper: f64 },
    #[display("quantile {quantile} must lie strictly between 0 and 1")]
    InvalidQuantile { quantile: f64 },
    #[display("correlation threshold {threshold} must lie strictly between 0 and 1")]
    InvalidThreshold { threshold: f64 },
    #[display("target series has no non-missing values")]
    EmptyTarget,
    #[display("{side} partition has no rows")]
    EmptyPartition { side: Side },
    #[display("column '{column}' is {kind}, but a numeric column is required")]
    IncompatibleFeatureType { column: String, kind: ColumnKind },
    #[display("column '{column}' not found in dataset")]
    MissingColumn { column: String },
    #[display("invalid dataset: {reason}")]
    InvalidDataset { reason: String },
    #[display("report namespace {} is already in use", path.display())]
    NamespaceCollision { path: PathBuf },
    #[display("I/O error on {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[display("failed to write CSV {}: {source}", path.display())]
    Csv { path: PathBuf, source: csv::Error },
    #[display("failed to write JSON {}: {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl EngineError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>) -> impl FnOnce(csv::Error) -> Self {
        let path = path.into();
        move |source| Self::Csv { path, source }
    }
}

/// The step of a report run in which an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum Stage {
    #[display("reserving the output namespace")]
    ReservingNamespace,
    #[display("resolving bounds")]
    ResolvingBounds,
    #[display("classifying observations")]
    Classifying,
    #[display("selecting features")]
    SelectingFeatures,
    #[display("comparing populations")]
    Comparing,
    #[display("finalizing the report")]
    Finalizing,
    #[display("writing the report")]
    Writing,
}

/// A failed report run: which target, which stage, and why.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("report for '{target}' failed while {stage}: {source}")]
pub struct ReportError {
    pub target: String,
    pub stage: Stage,
    pub source: EngineError,
}

impl ReportError {
    #[must_use]
    pub fn new(target: impl Into<String>, stage: Stage, source: EngineError) -> Self {
        Self {
            target: target.into(),
            stage,
            source,
        }
    }
}
