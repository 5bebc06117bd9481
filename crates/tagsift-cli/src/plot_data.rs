use std::{
    fs::File,
    io::{BufWriter, Write as _},
    path::Path,
};

use serde::Serialize;
use tagsift_analysis::{dataset::Dataset, namespace::ReportId, render::Renderer};
use tagsift_stats::correlation::CorrelationMatrix;

/// Renderer that writes the data behind each figure as JSON, for plotting
/// with external tools.
///
/// Existing files are never replaced: a figure whose file name is already
/// taken (two tags sanitising to the same name) is skipped with a warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlotDataRenderer;

#[derive(Debug, Serialize)]
struct Distribution<'a> {
    feature: &'a str,
    optimal: Vec<Option<f64>>,
    suboptimal: Vec<Option<f64>>,
}

#[derive(Debug, Serialize)]
struct Heatmap<'a> {
    names: &'a [String],
    values: Vec<Vec<Option<f64>>>,
}

impl<'a> Heatmap<'a> {
    fn of(matrix: &'a CorrelationMatrix) -> Self {
        Self {
            names: matrix.names(),
            values: matrix.rows().map(|(_, row)| row).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct RankedBars<'a> {
    title: &'a str,
    bars: &'a [(String, f64)],
}

impl PlotDataRenderer {
    fn write<T>(path: &Path, value: &T)
    where
        T: Serialize,
    {
        let result = File::create_new(path)
            .map_err(serde_json::Error::io)
            .and_then(|file| {
                let mut writer = BufWriter::new(file);
                serde_json::to_writer(&mut writer, value)?;
                writer.flush().map_err(serde_json::Error::io)
            });
        if let Err(e) = result {
            log::warn!("Failed to write plot data {}: {e}", path.display());
        }
    }
}

fn values(dataset: &Dataset, feature: &str) -> Vec<Option<f64>> {
    dataset
        .numeric_column(feature)
        .unwrap_or(&[])
        .iter()
        .map(|v| (!v.is_nan()).then_some(*v))
        .collect()
}

impl Renderer for PlotDataRenderer {
    fn render_paired_distribution(
        &self,
        dir: &Path,
        optimal: &Dataset,
        suboptimal: &Dataset,
        feature_a: &str,
        feature_b: Option<&str>,
    ) {
        let distributions = std::iter::once(feature_a)
            .chain(feature_b)
            .map(|feature| Distribution {
                feature,
                optimal: values(optimal, feature),
                suboptimal: values(suboptimal, feature),
            })
            .collect::<Vec<_>>();
        let name = match feature_b {
            Some(b) => format!(
                "{}__{}_distribution.json",
                ReportId::from_target(feature_a),
                ReportId::from_target(b)
            ),
            None => format!("{}_distribution.json", ReportId::from_target(feature_a)),
        };
        Self::write(&dir.join(name), &distributions);
    }

    fn render_heatmap(&self, dir: &Path, matrix: &CorrelationMatrix) {
        Self::write(&dir.join("heatmap.json"), &Heatmap::of(matrix));
    }

    fn render_rank_heatmap(&self, dir: &Path, matrix: &CorrelationMatrix) {
        Self::write(&dir.join("spearman_heatmap.json"), &Heatmap::of(matrix));
    }

    fn render_ranked_bars(&self, dir: &Path, title: &str, values: &[(String, f64)]) {
        let bars = RankedBars {
            title,
            bars: values,
        };
        let name = format!("{}_ranking.json", ReportId::from_target(title));
        Self::write(&dir.join(name), &bars);
    }
}
