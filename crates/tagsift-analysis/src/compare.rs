//! Paired distribution summaries of the optimal vs sub-optimal populations
//!
//! Selected features are walked two at a time, in selection order. Each pair
//! carries a [`FeatureSummary`] per feature, which in turn summarizes the
//! feature's values on both sides of the partition. An odd trailing feature
//! forms a half pair.

use serde::Serialize;
use tagsift_stats::{
    descriptive::nan_mean,
    percentiles::{Percentiles, sorted_non_missing},
};

use crate::{dataset::Dataset, error::EngineError, selection::SelectedFeatures};

/// Summary of one feature on one side of the partition.
///
/// Statistics are `None` when the side has no non-missing value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SideSummary {
    pub count: usize,
    pub p25: Option<f64>,
    pub median: Option<f64>,
    pub p75: Option<f64>,
    pub mean: Option<f64>,
}

impl SideSummary {
    #[must_use]
    pub fn new(values: &[f64]) -> Self {
        let sorted = sorted_non_missing(values.iter().copied());
        let percentiles = Percentiles::from_sorted(&sorted, &[25.0, 50.0, 75.0]);
        Self {
            count: sorted.len(),
            p25: percentiles.get(25.0),
            median: percentiles.get(50.0),
            p75: percentiles.get(75.0),
            mean: nan_mean(sorted.iter().copied()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureSummary {
    pub feature: String,
    pub optimal: SideSummary,
    pub suboptimal: SideSummary,
}

/// One or two feature summaries, in selection order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairedFeatureSummary {
    pub first: FeatureSummary,
    pub second: Option<FeatureSummary>,
}

impl PairedFeatureSummary {
    pub fn summaries(&self) -> impl Iterator<Item = &FeatureSummary> + '_ {
        std::iter::once(&self.first).chain(&self.second)
    }
}

/// Lazy sequence of paired summaries.
///
/// Nothing is computed up front; [`PairedSummaries::iter`] can be called any
/// number of times and summarizes each pair as it is reached.
#[derive(Debug, Clone)]
pub struct PairedSummaries<'a> {
    optimal: &'a Dataset,
    suboptimal: &'a Dataset,
    features: Vec<String>,
}

impl PairedSummaries<'_> {
    /// Number of pairs, counting a trailing half pair.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len().div_ceil(2)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = PairedFeatureSummary> + '_ {
        self.features.chunks(2).map(|pair| PairedFeatureSummary {
            first: self.summarize(&pair[0]),
            second: pair.get(1).map(|name| self.summarize(name)),
        })
    }

    fn summarize(&self, feature: &str) -> FeatureSummary {
        FeatureSummary {
            feature: feature.to_owned(),
            optimal: SideSummary::new(numeric(self.optimal, feature)),
            suboptimal: SideSummary::new(numeric(self.suboptimal, feature)),
        }
    }
}

// columns were validated by `compare`
fn numeric<'d>(dataset: &'d Dataset, feature: &str) -> &'d [f64] {
    dataset.numeric_column(feature).unwrap_or(&[])
}

/// Prepares paired summaries of the selected features.
///
/// Every selected feature must be a numeric column of both datasets.
///
/// # Examples
///
/// ```
/// use tagsift_analysis::{
///     compare::compare,
///     dataset::{Column, Dataset, RowIndex},
///     selection::{SelectedFeature, SelectedFeatures},
/// };
///
/// let side = |values: Vec<f64>| {
///     Dataset::new(RowIndex::ordinal(values.len()), vec![Column::numeric("flow", values)]).unwrap()
/// };
/// let optimal = side(vec![1.0, 2.0, 3.0]);
/// let suboptimal = side(vec![f64::NAN]);
/// let selected = SelectedFeatures::new(vec![SelectedFeature { name: "flow".into(), score: 0.8 }]);
///
/// let summaries = compare(&optimal, &suboptimal, &selected).unwrap();
/// let pair = summaries.iter().next().unwrap();
/// assert_eq!(pair.first.optimal.median, Some(2.0));
/// assert_eq!(pair.first.suboptimal.median, None);
/// assert!(pair.second.is_none());
/// ```
pub fn compare<'a>(
    optimal: &'a Dataset,
    suboptimal: &'a Dataset,
    selected: &SelectedFeatures,
) -> Result<PairedSummaries<'a>, EngineError> {
    for name in selected.names() {
        optimal.numeric_column(name)?;
        suboptimal.numeric_column(name)?;
    }
    Ok(PairedSummaries {
        optimal,
        suboptimal,
        features: selected.names().map(str::to_owned).collect(),
    })
}
