//! Selection of tags associated with the target
//!
//! [`CorrelationSelector`] keeps every numeric tag whose Pearson correlation
//! with the target exceeds a threshold in magnitude. Other ranking sources
//! plug in through the [`FeatureSelector`] trait; [`RankedListSelector`]
//! wraps an externally computed importance list.

use serde::Serialize;
use tagsift_stats::correlation::pearson;

use crate::{dataset::Dataset, error::EngineError};

/// Default magnitude a correlation must exceed to be selected.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedFeature {
    pub name: String,
    /// Signed correlation, or an importance for external selectors.
    pub score: f64,
}

/// Selected tags in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SelectedFeatures(Vec<SelectedFeature>);

impl SelectedFeatures {
    #[must_use]
    pub fn new(features: Vec<SelectedFeature>) -> Self {
        Self(features)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectedFeature> + '_ {
        self.0.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map(|f| f.name.as_str())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|f| f.name == name)
    }
}

/// A source of selected features for a target.
pub trait FeatureSelector {
    /// Selects features of `dataset` associated with `target`.
    ///
    /// The target itself must never be part of the result.
    fn select(&self, dataset: &Dataset, target: &str) -> Result<SelectedFeatures, EngineError>;
}

/// Selects numeric tags by absolute Pearson correlation with the target.
#[derive(Debug, Clone, Copy)]
pub struct CorrelationSelector {
    threshold: f64,
}

impl CorrelationSelector {
    /// Creates a selector; `threshold` must lie strictly between 0 and 1.
    pub fn new(threshold: f64) -> Result<Self, EngineError> {
        if threshold > 0.0 && threshold < 1.0 {
            Ok(Self { threshold })
        } else {
            Err(EngineError::InvalidThreshold { threshold })
        }
    }

    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl FeatureSelector for CorrelationSelector {
    fn select(&self, dataset: &Dataset, target: &str) -> Result<SelectedFeatures, EngineError> {
        let target_values = dataset.numeric_column(target)?;
        let features = dataset
            .columns()
            .iter()
            .filter(|column| column.name != target)
            .filter_map(|column| {
                let values = column.as_numeric()?;
                // undefined correlations (constant or too few pairs) never pass
                let r = pearson(target_values, values)?;
                (r > self.threshold || r < -self.threshold).then(|| SelectedFeature {
                    name: column.name.clone(),
                    score: r,
                })
            })
            .collect::<Vec<_>>();
        log::debug!(
            "selected {} of {} columns for '{target}' (|r| > {})",
            features.len(),
            dataset.columns().len(),
            self.threshold
        );
        Ok(SelectedFeatures(features))
    }
}

/// Selects features from an externally supplied `(name, importance)` list.
///
/// The list order is kept. The target and repeated names are dropped, the
/// first occurrence of a name wins.
#[derive(Debug, Clone, Default)]
pub struct RankedListSelector {
    ranking: Vec<(String, f64)>,
}

impl RankedListSelector {
    #[must_use]
    pub fn new(ranking: Vec<(String, f64)>) -> Self {
        Self { ranking }
    }
}

impl FeatureSelector for RankedListSelector {
    fn select(&self, dataset: &Dataset, target: &str) -> Result<SelectedFeatures, EngineError> {
        let mut features: Vec<SelectedFeature> = Vec::with_capacity(self.ranking.len());
        for (name, importance) in &self.ranking {
            if name == target {
                log::warn!("ranked feature list contains the target '{target}'; skipping it");
                continue;
            }
            if features.iter().any(|f| f.name == *name) {
                log::warn!("ranked feature list repeats '{name}'; keeping its first entry");
                continue;
            }
            dataset.numeric_column(name)?;
            features.push(SelectedFeature {
                name: name.clone(),
                score: *importance,
            });
        }
        Ok(SelectedFeatures(features))
    }
}

/// Selects features with a [`CorrelationSelector`].
///
/// # Examples
///
/// ```
/// use tagsift_analysis::{
///     dataset::{Column, Dataset, RowIndex},
///     selection::select,
/// };
///
/// let dataset = Dataset::new(
///     RowIndex::ordinal(4),
///     vec![
///         Column::numeric("kpi", vec![1.0, 2.0, 3.0, 4.0]),
///         Column::numeric("inverse", vec![8.0, 6.0, 4.0, 2.0]),
///         Column::numeric("noise", vec![1.0, -1.0, -1.0, 1.0]),
///     ],
/// )
/// .unwrap();
///
/// let selected = select(&dataset, "kpi", 0.5).unwrap();
/// assert_eq!(selected.names().collect::<Vec<_>>(), ["inverse"]);
/// ```
pub fn select(
    dataset: &Dataset,
    target: &str,
    threshold: f64,
) -> Result<SelectedFeatures, EngineError> {
    CorrelationSelector::new(threshold)?.select(dataset, target)
}
