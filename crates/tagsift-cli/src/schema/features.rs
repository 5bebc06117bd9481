use serde::{Deserialize, Serialize};
use tagsift_analysis::selection::RankedListSelector;

/// Externally computed feature ranking, e.g. a model's feature importances
///
/// ```json
/// [
///   { "name": "FIC:101.PV", "importance": 0.41 },
///   { "name": "TI-7", "importance": 0.18 }
/// ]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureRankingFile {
    pub features: Vec<RankedFeature>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedFeature {
    pub name: String,
    pub importance: f64,
}

impl FeatureRankingFile {
    pub fn into_selector(self) -> RankedListSelector {
        RankedListSelector::new(
            self.features
                .into_iter()
                .map(|f| (f.name, f.importance))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use tagsift_analysis::{
        dataset::{Column, Dataset, RowIndex},
        selection::FeatureSelector as _,
    };

    use super::*;

    #[test]
    fn test_ranking_keeps_file_order() {
        let file: FeatureRankingFile = serde_json::from_str(
            r#"[{ "name": "b", "importance": 0.1 }, { "name": "a", "importance": 0.9 }]"#,
        )
        .unwrap();
        let dataset = Dataset::new(
            RowIndex::ordinal(2),
            vec![
                Column::numeric("kpi", vec![1.0, 2.0]),
                Column::numeric("a", vec![1.0, 2.0]),
                Column::numeric("b", vec![2.0, 1.0]),
            ],
        )
        .unwrap();
        let selected = file.into_selector().select(&dataset, "kpi").unwrap();
        assert_eq!(selected.names().collect::<Vec<_>>(), ["b", "a"]);
    }
}
