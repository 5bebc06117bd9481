//! Graphics hook of the report export
//!
//! A [`Renderer`] receives the data behind each figure of a report along with
//! the directory it should draw into. Rendering is fire-and-forget: a
//! renderer reports its own failures and never aborts the export.

use std::path::Path;

use tagsift_stats::correlation::CorrelationMatrix;

use crate::dataset::Dataset;

pub trait Renderer {
    /// Distributions of one feature pair (or a single feature) on both sides
    /// of the partition.
    fn render_paired_distribution(
        &self,
        dir: &Path,
        optimal: &Dataset,
        suboptimal: &Dataset,
        feature_a: &str,
        feature_b: Option<&str>,
    );

    /// Heatmap of a square correlation matrix.
    fn render_heatmap(&self, dir: &Path, matrix: &CorrelationMatrix);

    /// Heatmap of the Spearman rank correlations over the same tags as
    /// [`Renderer::render_heatmap`]. Draws nothing unless overridden.
    fn render_rank_heatmap(&self, dir: &Path, matrix: &CorrelationMatrix) {
        let _ = (dir, matrix);
    }

    /// Ranked bar chart of named values.
    fn render_ranked_bars(&self, dir: &Path, title: &str, values: &[(String, f64)]);
}

/// Renderer that draws nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render_paired_distribution(
        &self,
        _dir: &Path,
        _optimal: &Dataset,
        _suboptimal: &Dataset,
        _feature_a: &str,
        _feature_b: Option<&str>,
    ) {
    }

    fn render_heatmap(&self, _dir: &Path, _matrix: &CorrelationMatrix) {}

    fn render_ranked_bars(&self, _dir: &Path, _title: &str, _values: &[(String, f64)]) {}
}
