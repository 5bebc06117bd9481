//! Plain-text and JSON summaries of a report run

use std::fmt;

use serde::Serialize;
use tagsift_stats::descriptive::DescriptiveStats;

use crate::{
    bounds::Bounds,
    classify::Partition,
    dataset::{Dataset, IndexRange},
    problem_type::ProblemType,
    selection::SelectedFeatures,
};

/// Headline counts of a run, rendered as the `stats.txt` report.
///
/// ```text
/// Date Range: 2024-01-01 00:00:00 - 2024-01-31 23:50:00
/// Total number of instances observed: 4464
/// Total number of operational tags: 57
/// Total number of selected tags: 6
/// Total number of sub-optimal (FIC:101.PV not greater than 12.3) instances: 510
/// Total number of optimal (FIC:101.PV greater than 12.3) instances: 3954
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryStats {
    pub target: String,
    pub condition: String,
    pub index_range: Option<IndexRange>,
    pub instances: usize,
    pub tags: usize,
    pub selected_tags: usize,
    pub optimal: usize,
    pub suboptimal: usize,
}

impl SummaryStats {
    #[must_use]
    pub fn new(
        dataset: &Dataset,
        target: &str,
        problem_type: ProblemType,
        bounds: &Bounds,
        partition: &Partition,
        selected: &SelectedFeatures,
    ) -> Self {
        Self {
            target: target.to_owned(),
            condition: problem_type.describe(bounds),
            index_range: dataset.index().range(),
            instances: dataset.len(),
            tags: dataset.columns().len(),
            selected_tags: selected.len(),
            optimal: partition.optimal_rows().len(),
            suboptimal: partition.suboptimal_rows().len(),
        }
    }
}

impl fmt::Display for SummaryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            target,
            condition,
            index_range,
            instances,
            tags,
            selected_tags,
            optimal,
            suboptimal,
        } = self;
        match index_range {
            Some(range) => writeln!(f, "{} Range: {range}", range.kind)?,
            None => writeln!(f, "Row Range: empty")?,
        }
        writeln!(f, "Total number of instances observed: {instances}")?;
        writeln!(f, "Total number of operational tags: {tags}")?;
        writeln!(f, "Total number of selected tags: {selected_tags}")?;
        writeln!(
            f,
            "Total number of sub-optimal ({target} not {condition}) instances: {suboptimal}"
        )?;
        writeln!(
            f,
            "Total number of optimal ({target} {condition}) instances: {optimal}"
        )
    }
}

/// Distribution of the target over all rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetProfile {
    pub count: usize,
    pub missing: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub std_dev: Option<f64>,
}

impl TargetProfile {
    #[must_use]
    pub fn new(values: &[f64]) -> Self {
        let stats = DescriptiveStats::new(values.iter().copied());
        let count = stats.as_ref().map_or(0, |s| s.count);
        Self {
            count,
            missing: values.len() - count,
            min: stats.as_ref().map(|s| s.min),
            max: stats.as_ref().map(|s| s.max),
            mean: stats.as_ref().map(|s| s.mean),
            median: stats.as_ref().map(|s| s.median),
            std_dev: stats.as_ref().map(|s| s.std_dev),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{
        classify::classify,
        dataset::{Column, RowIndex},
    };

    #[test]
    fn test_text_report() {
        let day = |d| {
            NaiveDate::from_ymd_opt(2024, 1, d)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        };
        let dataset = Dataset::new(
            RowIndex::Timestamps(vec![day(2), day(1), day(3)]),
            vec![
                Column::numeric("FIC:101.PV", vec![15.0, 10.0, 20.0]),
                Column::numeric("TI-7", vec![1.0, 2.0, 3.0]),
            ],
        )
        .unwrap();
        let bounds = Bounds::new(12.3, 20.0).unwrap();
        let partition = classify(&dataset, "FIC:101.PV", &bounds, ProblemType::Max).unwrap();
        let summary = SummaryStats::new(
            &dataset,
            "FIC:101.PV",
            ProblemType::Max,
            &bounds,
            &partition,
            &SelectedFeatures::default(),
        );

        let expected = "\
Date Range: 2024-01-01 00:00:00 - 2024-01-03 00:00:00
Total number of instances observed: 3
Total number of operational tags: 2
Total number of selected tags: 0
Total number of sub-optimal (FIC:101.PV not greater than 12.3) instances: 1
Total number of optimal (FIC:101.PV greater than 12.3) instances: 2
";
        assert_eq!(summary.to_string(), expected);
    }

    #[test]
    fn test_row_range_for_ordinal_index() {
        let dataset =
            Dataset::new(RowIndex::ordinal(4), vec![Column::numeric("kpi", vec![1.0; 4])]).unwrap();
        let bounds = Bounds::new(0.0, 9.0).unwrap();
        let partition = classify(&dataset, "kpi", &bounds, ProblemType::Range).unwrap();
        let summary = SummaryStats::new(
            &dataset,
            "kpi",
            ProblemType::Range,
            &bounds,
            &partition,
            &SelectedFeatures::default(),
        );
        let text = summary.to_string();
        assert!(text.starts_with("Row Range: 0 - 3\n"));
        assert!(text.contains("(kpi between 0 and 9) instances: 4"));
    }

    #[test]
    fn test_target_profile_counts_missing() {
        let profile = TargetProfile::new(&[1.0, f64::NAN, 3.0]);
        assert_eq!(profile.count, 2);
        assert_eq!(profile.missing, 1);
        assert_eq!(profile.median, Some(2.0));

        let empty = TargetProfile::new(&[f64::NAN]);
        assert_eq!(empty.count, 0);
        assert_eq!(empty.mean, None);
    }
}
