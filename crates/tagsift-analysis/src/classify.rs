//! Optimal / sub-optimal partitioning of observations
//!
//! Every row is assigned to exactly one [`Side`] by comparing its target
//! value with the resolved [`Bounds`] under the [`ProblemType`] policy.
//! The split is binary and total: rows that do not satisfy the optimal
//! predicate, including rows with a missing target, are sub-optimal.

use serde::Serialize;

use crate::{bounds::Bounds, dataset::Dataset, error::EngineError, problem_type::ProblemType};

/// Which population an observation belongs to; optimal means non-anomalous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[display("optimal")]
    Optimal,
    #[display("sub-optimal")]
    Suboptimal,
}

/// Classifies a series of target values.
#[must_use]
pub fn classify_values(values: &[f64], bounds: &Bounds, problem_type: ProblemType) -> Vec<Side> {
    values
        .iter()
        .map(|&v| {
            if problem_type.is_optimal(v, bounds) {
                Side::Optimal
            } else {
                Side::Suboptimal
            }
        })
        .collect()
}

/// A dataset split into its optimal and sub-optimal rows.
///
/// Both sides keep every column of the source, and the row positions of each
/// side refer back to the source dataset.
#[derive(Debug, Clone)]
pub struct Partition {
    pub optimal: Dataset,
    pub suboptimal: Dataset,
    optimal_rows: Vec<usize>,
    suboptimal_rows: Vec<usize>,
}

impl Partition {
    /// Rows of the source dataset classified as optimal, ascending.
    #[must_use]
    pub fn optimal_rows(&self) -> &[usize] {
        &self.optimal_rows
    }

    /// Rows of the source dataset classified as sub-optimal, ascending.
    #[must_use]
    pub fn suboptimal_rows(&self) -> &[usize] {
        &self.suboptimal_rows
    }

    /// Total number of rows on both sides.
    #[must_use]
    pub fn len(&self) -> usize {
        self.optimal_rows.len() + self.suboptimal_rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fails with [`EngineError::EmptyPartition`] if either side has no rows.
    pub fn ensure_both_sides(&self) -> Result<(), EngineError> {
        if self.optimal_rows.is_empty() {
            return Err(EngineError::EmptyPartition {
                side: Side::Optimal,
            });
        }
        if self.suboptimal_rows.is_empty() {
            return Err(EngineError::EmptyPartition {
                side: Side::Suboptimal,
            });
        }
        Ok(())
    }
}

/// Splits a dataset into optimal and sub-optimal rows.
///
/// # Errors
///
/// * [`EngineError::MissingColumn`] - the target column does not exist
/// * [`EngineError::IncompatibleFeatureType`] - the target column is not numeric
///
/// # Examples
///
/// ```
/// use tagsift_analysis::{
///     bounds::Bounds,
///     classify::classify,
///     dataset::{Column, Dataset, RowIndex},
///     problem_type::ProblemType,
/// };
///
/// let dataset = Dataset::new(
///     RowIndex::ordinal(3),
///     vec![Column::numeric("kpi", vec![5.0, 10.0, 11.0])],
/// )
/// .unwrap();
/// let bounds = Bounds::new(0.0, 10.0).unwrap();
/// let partition = classify(&dataset, "kpi", &bounds, ProblemType::MinEqual).unwrap();
///
/// assert_eq!(partition.optimal_rows(), &[0, 1]);
/// assert_eq!(partition.suboptimal_rows(), &[2]);
/// ```
pub fn classify(
    dataset: &Dataset,
    target_column: &str,
    bounds: &Bounds,
    problem_type: ProblemType,
) -> Result<Partition, EngineError> {
    let values = dataset.numeric_column(target_column)?;
    let sides = classify_values(values, bounds, problem_type);

    let (mut optimal_rows, mut suboptimal_rows) = (vec![], vec![]);
    for (row, side) in sides.into_iter().enumerate() {
        match side {
            Side::Optimal => optimal_rows.push(row),
            Side::Suboptimal => suboptimal_rows.push(row),
        }
    }
    log::debug!(
        "classified '{target_column}': {} optimal, {} sub-optimal",
        optimal_rows.len(),
        suboptimal_rows.len()
    );

    Ok(Partition {
        optimal: dataset.take_rows(&optimal_rows),
        suboptimal: dataset.take_rows(&suboptimal_rows),
        optimal_rows,
        suboptimal_rows,
    })
}

#[cfg(test)]
mod tests {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg64Mcg;

    use super::*;
    use crate::{
        bounds::{BoundsSource, resolve},
        dataset::{Column, RowIndex},
    };

    fn dataset(values: Vec<f64>) -> Dataset {
        let other = values.iter().map(|v| v * 2.0).collect();
        Dataset::new(
            RowIndex::ordinal(values.len()),
            vec![Column::numeric("kpi", values), Column::numeric("other", other)],
        )
        .unwrap()
    }

    #[test]
    fn test_iqr_max_scenario() {
        let dataset = dataset(vec![1.0, 2.0, 3.0, 4.0, 100.0]);
        let series = dataset.numeric_column("kpi").unwrap();
        let bounds = resolve(series, ProblemType::Max, &BoundsSource::Auto).unwrap();
        let partition = classify(&dataset, "kpi", &bounds, ProblemType::Max).unwrap();

        assert_eq!(partition.optimal_rows(), &[0, 1, 2, 3, 4]);
        assert!(partition.suboptimal_rows().is_empty());
        assert!(matches!(
            partition.ensure_both_sides(),
            Err(EngineError::EmptyPartition {
                side: Side::Suboptimal
            })
        ));
    }

    #[test]
    fn test_boundary_inclusion() {
        let dataset = dataset(vec![-1.0, 0.0, 5.0]);
        let bounds = Bounds::new(-1.0, 5.0).unwrap();

        let strict = classify(&dataset, "kpi", &bounds, ProblemType::Max).unwrap();
        assert_eq!(strict.suboptimal_rows(), &[0]);
        let inclusive = classify(&dataset, "kpi", &bounds, ProblemType::MaxEqual).unwrap();
        assert!(inclusive.suboptimal_rows().is_empty());
        let strict = classify(&dataset, "kpi", &bounds, ProblemType::Min).unwrap();
        assert_eq!(strict.suboptimal_rows(), &[2]);
        let band = classify(&dataset, "kpi", &bounds, ProblemType::Range).unwrap();
        assert_eq!(band.optimal_rows(), &[0, 1, 2]);
    }

    #[test]
    fn test_manual_min_equal_scenario() {
        let dataset = dataset(vec![5.0, 10.0, 11.0]);
        let source = BoundsSource::Manual {
            lower: 0.0,
            upper: 10.0,
        };
        let series = dataset.numeric_column("kpi").unwrap();
        let bounds = resolve(series, ProblemType::MinEqual, &source).unwrap();
        let partition = classify(&dataset, "kpi", &bounds, ProblemType::MinEqual).unwrap();

        assert_eq!(partition.optimal.numeric_column("kpi").unwrap(), &[5.0, 10.0]);
        assert_eq!(partition.suboptimal.numeric_column("kpi").unwrap(), &[11.0]);
        assert_eq!(partition.suboptimal.numeric_column("other").unwrap(), &[22.0]);
        assert!(partition.ensure_both_sides().is_ok());
    }

    #[test]
    fn test_missing_target_is_suboptimal() {
        let dataset = dataset(vec![f64::NAN, 3.0]);
        let bounds = Bounds::new(0.0, 10.0).unwrap();
        let partition = classify(&dataset, "kpi", &bounds, ProblemType::Range).unwrap();
        assert_eq!(partition.suboptimal_rows(), &[0]);
    }

    #[test]
    fn test_rejects_non_numeric_target() {
        let dataset = Dataset::new(
            RowIndex::ordinal(1),
            vec![Column::categorical("state", vec![Some("run".into())])],
        )
        .unwrap();
        let bounds = Bounds::new(0.0, 1.0).unwrap();
        assert!(matches!(
            classify(&dataset, "state", &bounds, ProblemType::Max),
            Err(EngineError::IncompatibleFeatureType { .. })
        ));
        assert!(matches!(
            classify(&dataset, "nope", &bounds, ProblemType::Max),
            Err(EngineError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_random_partitions_are_total_and_stable() {
        let mut rng = Pcg64Mcg::seed_from_u64(42);
        for _ in 0..200 {
            let len = rng.random_range(0..80);
            let values = (0..len)
                .map(|_| {
                    if rng.random_bool(0.05) {
                        f64::NAN
                    } else {
                        rng.random_range(-20.0..20.0)
                    }
                })
                .collect::<Vec<f64>>();
            let dataset = dataset(values);
            let lower = rng.random_range(-20.0..20.0);
            let bounds = Bounds::new(lower, lower + rng.random_range(0.0..10.0)).unwrap();

            for problem_type in ProblemType::ALL {
                let partition = classify(&dataset, "kpi", &bounds, problem_type).unwrap();
                assert_eq!(partition.len(), dataset.len());
                assert_eq!(
                    partition.optimal.len() + partition.suboptimal.len(),
                    dataset.len()
                );

                let mut rows = partition
                    .optimal_rows()
                    .iter()
                    .chain(partition.suboptimal_rows())
                    .copied()
                    .collect::<Vec<_>>();
                rows.sort_unstable();
                rows.dedup();
                assert_eq!(rows, (0..dataset.len()).collect::<Vec<_>>());

                // reclassifying the union reproduces the split
                let union = dataset.take_rows(&rows);
                let again = classify(&union, "kpi", &bounds, problem_type).unwrap();
                assert_eq!(again.optimal_rows(), partition.optimal_rows());
                assert_eq!(again.suboptimal_rows(), partition.suboptimal_rows());
            }
        }
    }
}
