//! Correlation views of a report
//!
//! From the full correlation matrix of the numeric tags, the reporter keeps
//! the `top_n` most positively and most negatively correlated tags around the
//! target and ranks the correlations of every selected feature. A Spearman
//! rank matrix over the same tags can be attached to expose monotone
//! non-linear relations.

use serde::Serialize;
use tagsift_stats::correlation::{CorrelationMatrix, Method};

use crate::{dataset::Dataset, error::EngineError, selection::SelectedFeatures};

/// Tags kept at each end of the target's ranking.
pub const DEFAULT_TOP_N: usize = 5;

/// Correlations of one tag with every other tag, descending.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranking {
    pub tag: String,
    pub correlations: Vec<(String, f64)>,
}

impl Ranking {
    fn of(matrix: &CorrelationMatrix, tag: &str) -> Result<Self, EngineError> {
        let mut correlations = matrix
            .correlations_with(tag)
            .ok_or_else(|| EngineError::MissingColumn {
                column: tag.to_owned(),
            })?
            .into_iter()
            .map(|(name, r)| (name.to_owned(), r))
            .collect::<Vec<_>>();
        correlations.sort_by(|a, b| b.1.total_cmp(&a.1));
        Ok(Self {
            tag: tag.to_owned(),
            correlations,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CorrelationReport {
    /// Square matrix over the top/bottom tags, in ranking order.
    pub matrix: CorrelationMatrix,
    /// Ranking of the target itself.
    pub target_ranking: Ranking,
    /// One ranking per selected feature, in selection order.
    pub feature_rankings: Vec<Ranking>,
    /// Spearman matrix over the same tags as `matrix`, if attached.
    pub rank_matrix: Option<CorrelationMatrix>,
}

impl CorrelationReport {
    /// Attaches the rank correlations of the reported tags, taken from the
    /// full Spearman matrix `full`.
    #[must_use]
    pub fn with_rank_matrix(mut self, full: &CorrelationMatrix) -> Self {
        self.rank_matrix = Some(full.subset(self.matrix.names()));
        self
    }
}

fn matrix_of(dataset: &Dataset, method: Method) -> CorrelationMatrix {
    CorrelationMatrix::with_method(
        method,
        dataset
            .columns()
            .iter()
            .filter_map(|c| Some((c.name.as_str(), c.as_numeric()?))),
    )
}

/// Full pairwise correlation matrix of the numeric columns of a dataset.
#[must_use]
pub fn correlation_matrix(dataset: &Dataset) -> CorrelationMatrix {
    matrix_of(dataset, Method::Pearson)
}

/// Full pairwise Spearman rank correlation matrix of the numeric columns of
/// a dataset.
#[must_use]
pub fn rank_correlation_matrix(dataset: &Dataset) -> CorrelationMatrix {
    matrix_of(dataset, Method::Spearman)
}

/// Builds the correlation views for a target.
///
/// Fewer tags than `top_n` are not an error; every defined tag is kept.
///
/// # Examples
///
/// ```
/// use tagsift_analysis::{
///     correlation_report::{correlation_matrix, report},
///     dataset::{Column, Dataset, RowIndex},
///     selection::SelectedFeatures,
/// };
///
/// let dataset = Dataset::new(
///     RowIndex::ordinal(3),
///     vec![
///         Column::numeric("kpi", vec![1.0, 2.0, 3.0]),
///         Column::numeric("down", vec![3.0, 2.0, 1.0]),
///     ],
/// )
/// .unwrap();
/// let matrix = correlation_matrix(&dataset);
/// let report = report(&matrix, &SelectedFeatures::default(), "kpi", 5).unwrap();
///
/// assert_eq!(report.matrix.names(), ["kpi", "down"]);
/// ```
pub fn report(
    matrix: &CorrelationMatrix,
    selected: &SelectedFeatures,
    target: &str,
    top_n: usize,
) -> Result<CorrelationReport, EngineError> {
    let target_ranking = Ranking::of(matrix, target)?;

    let ranked = &target_ranking.correlations;
    let bottom_start = ranked.len().saturating_sub(top_n);
    let mut tags = Vec::with_capacity(2 * top_n + 1);
    if !ranked.iter().any(|(name, _)| name == target) {
        tags.push(target);
    }
    for (i, (name, _)) in ranked.iter().enumerate() {
        if i < top_n || i >= bottom_start {
            tags.push(name.as_str());
        }
    }

    let feature_rankings = selected
        .names()
        .map(|feature| Ranking::of(matrix, feature))
        .collect::<Result<Vec<_>, _>>()?;
    log::debug!(
        "correlation report for '{target}': {} tags, {} feature rankings",
        tags.len(),
        feature_rankings.len()
    );

    Ok(CorrelationReport {
        matrix: matrix.subset(&tags),
        target_ranking,
        feature_rankings,
        rank_matrix: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dataset::{Column, RowIndex},
        selection::SelectedFeature,
    };

    fn dataset() -> Dataset {
        let kpi = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        Dataset::new(
            RowIndex::ordinal(5),
            vec![
                Column::numeric("kpi", kpi),
                Column::numeric("p1", vec![1.0, 2.0, 3.0, 4.0, 6.0]),
                Column::numeric("p2", vec![2.0, 1.0, 4.0, 3.0, 5.0]),
                Column::numeric("n1", vec![5.0, 4.0, 3.0, 2.0, 0.0]),
                Column::numeric("n2", vec![4.0, 5.0, 2.0, 3.0, 1.0]),
                Column::numeric("flat", vec![7.0; 5]),
                Column::categorical("mode", vec![None; 5]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_matrix_covers_numeric_columns() {
        let matrix = correlation_matrix(&dataset());
        assert_eq!(matrix.names(), ["kpi", "p1", "p2", "n1", "n2", "flat"]);
        assert_eq!(matrix.get("flat", "flat"), None);
        assert_eq!(matrix.get("kpi", "kpi"), Some(1.0));
    }

    #[test]
    fn test_top_and_bottom_tags_around_target() {
        let matrix = correlation_matrix(&dataset());
        let report = report(&matrix, &SelectedFeatures::default(), "kpi", 2).unwrap();
        // descending: kpi, p1, p2, n2, n1; flat undefined
        assert_eq!(report.matrix.names(), ["kpi", "p1", "n2", "n1"]);
        assert_eq!(report.target_ranking.correlations.len(), 5);
        assert!(report.feature_rankings.is_empty());
    }

    #[test]
    fn test_small_matrix_keeps_every_tag_once() {
        let matrix = correlation_matrix(&dataset());
        let report = report(&matrix, &SelectedFeatures::default(), "kpi", 10).unwrap();
        assert_eq!(report.matrix.names(), ["kpi", "p1", "p2", "n2", "n1"]);
    }

    #[test]
    fn test_feature_rankings_are_descending() {
        let matrix = correlation_matrix(&dataset());
        let selected = SelectedFeatures::new(vec![
            SelectedFeature { name: "n1".into(), score: -0.98 },
            SelectedFeature { name: "p1".into(), score: 0.98 },
        ]);
        let report = report(&matrix, &selected, "kpi", DEFAULT_TOP_N).unwrap();
        let tags = report
            .feature_rankings
            .iter()
            .map(|r| r.tag.as_str())
            .collect::<Vec<_>>();
        assert_eq!(tags, ["n1", "p1"]);
        for ranking in &report.feature_rankings {
            assert!(ranking.correlations.is_sorted_by(|a, b| a.1 >= b.1));
            assert!(ranking.correlations.iter().all(|(name, _)| name != "flat"));
        }
    }

    #[test]
    fn test_rank_matrix_follows_reported_tags() {
        let dataset = dataset();
        let report = report(
            &correlation_matrix(&dataset),
            &SelectedFeatures::default(),
            "kpi",
            2,
        )
        .unwrap();
        assert!(report.rank_matrix.is_none());

        let ranks = rank_correlation_matrix(&dataset);
        assert_eq!(ranks.names(), ["kpi", "p1", "p2", "n1", "n2", "flat"]);
        // p1 is a monotone but non-linear function of kpi
        assert!(ranks.get("kpi", "p1").is_some_and(|r| (r - 1.0).abs() < 1e-12));
        assert!(ranks.get("kpi", "flat").is_none());

        let report = report.with_rank_matrix(&ranks);
        let rank_matrix = report.rank_matrix.unwrap();
        assert_eq!(rank_matrix.names(), report.matrix.names());
        assert!(rank_matrix.get("kpi", "n1").is_some_and(|r| (r + 1.0).abs() < 1e-12));
    }

    #[test]
    fn test_target_without_defined_correlations_is_kept() {
        let matrix = correlation_matrix(&dataset());
        let report = report(&matrix, &SelectedFeatures::default(), "flat", 5).unwrap();
        assert_eq!(report.matrix.names(), ["flat"]);
    }

    #[test]
    fn test_unknown_target() {
        let matrix = correlation_matrix(&dataset());
        assert!(matches!(
            report(&matrix, &SelectedFeatures::default(), "mode", 5),
            Err(EngineError::MissingColumn { .. })
        ));
    }
}
