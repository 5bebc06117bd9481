//! On-disk layout of a report
//!
//! ```text
//! <report id>/
//! ├─ stats.txt
//! ├─ summary.json
//! ├─ correlations/
//! │   ├─ <report id>_matrix.csv
//! │   ├─ <report id>_spearman_matrix.csv
//! │   └─ <feature id>_corr.csv        (one per selected feature)
//! ├─ tables/
//! │   ├─ <report id>_toptags_optimal.csv
//! │   ├─ <report id>_toptags_suboptimal.csv
//! │   └─ <report id>_population_summary.csv
//! └─ graphics/                        (renderer output)
//! ```
//!
//! Missing values are written as empty CSV cells. Selected features whose
//! ids collide fail the export instead of sharing a file.

use std::{
    collections::HashSet,
    fs,
    io::{BufWriter, Write as _},
    path::Path,
};

use serde::Serialize;
use tagsift_stats::correlation::CorrelationMatrix;

use crate::{
    assembler::ReportBundle,
    bounds::Bounds,
    compare::{PairedFeatureSummary, SideSummary},
    dataset::{Dataset, RowIndex},
    error::EngineError,
    namespace::ReportId,
    problem_type::ProblemType,
    render::Renderer,
    selection::SelectedFeatures,
    summary::TargetProfile,
};

#[derive(Debug, Serialize)]
struct SummaryDocument<'a> {
    target: &'a str,
    report_id: &'a str,
    problem_type: ProblemType,
    condition: &'a str,
    bounds_mode: &'static str,
    quantile: Option<f64>,
    bounds: Bounds,
    instances: usize,
    tags: usize,
    optimal: usize,
    suboptimal: usize,
    target_profile: &'a TargetProfile,
    selected_features: &'a SelectedFeatures,
}

/// Writes every artifact of `bundle` into `dir`, then hands the figures to
/// `renderer`.
pub fn write_bundle(
    bundle: &ReportBundle,
    dir: &Path,
    renderer: &dyn Renderer,
) -> Result<(), EngineError> {
    let id = bundle.id();
    let correlations_dir = dir.join("correlations");
    let feature_ids = unique_feature_ids(bundle, &correlations_dir)?;
    let tables_dir = dir.join("tables");
    let graphics_dir = dir.join("graphics");
    for sub in [&correlations_dir, &tables_dir, &graphics_dir] {
        fs::create_dir_all(sub).map_err(EngineError::io(sub))?;
    }

    let stats_path = dir.join("stats.txt");
    fs::write(&stats_path, bundle.summary().to_string()).map_err(EngineError::io(&stats_path))?;
    write_summary_json(bundle, &dir.join("summary.json"))?;

    let correlations = bundle.correlations();
    write_matrix(
        &correlations.matrix,
        &correlations_dir.join(format!("{id}_matrix.csv")),
    )?;
    if let Some(rank_matrix) = &correlations.rank_matrix {
        write_matrix(
            rank_matrix,
            &correlations_dir.join(format!("{id}_spearman_matrix.csv")),
        )?;
    }
    for (ranking, feature_id) in correlations.feature_rankings.iter().zip(&feature_ids) {
        write_ranking(
            &ranking.correlations,
            &correlations_dir.join(format!("{feature_id}_corr.csv")),
        )?;
    }

    let partition = bundle.partition();
    let selected = bundle.selected().names().collect::<Vec<_>>();
    write_rows(
        &partition.optimal.select_columns(&selected)?,
        &tables_dir.join(format!("{id}_toptags_optimal.csv")),
    )?;
    write_rows(
        &partition.suboptimal.select_columns(&selected)?,
        &tables_dir.join(format!("{id}_toptags_suboptimal.csv")),
    )?;
    write_population_summary(
        bundle.pairs(),
        &tables_dir.join(format!("{id}_population_summary.csv")),
    )?;
    log::debug!("wrote report tables to {}", dir.display());

    for pair in bundle.pairs() {
        renderer.render_paired_distribution(
            &graphics_dir,
            &partition.optimal,
            &partition.suboptimal,
            &pair.first.feature,
            pair.second.as_ref().map(|s| s.feature.as_str()),
        );
    }
    renderer.render_heatmap(&graphics_dir, &correlations.matrix);
    if let Some(rank_matrix) = &correlations.rank_matrix {
        renderer.render_rank_heatmap(&graphics_dir, rank_matrix);
    }
    renderer.render_ranked_bars(
        &graphics_dir,
        bundle.target(),
        &correlations.target_ranking.correlations,
    );
    for ranking in &correlations.feature_rankings {
        renderer.render_ranked_bars(&graphics_dir, &ranking.tag, &ranking.correlations);
    }
    Ok(())
}

/// Ids of the ranked features, in ranking order.
///
/// Fails with [`EngineError::NamespaceCollision`] on the first feature whose
/// id is already taken, before anything is written.
fn unique_feature_ids(
    bundle: &ReportBundle,
    correlations_dir: &Path,
) -> Result<Vec<ReportId>, EngineError> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for ranking in &bundle.correlations().feature_rankings {
        let id = ReportId::from_target(&ranking.tag);
        if !seen.insert(id.clone()) {
            return Err(EngineError::NamespaceCollision {
                path: correlations_dir.join(format!("{id}_corr.csv")),
            });
        }
        ids.push(id);
    }
    Ok(ids)
}

fn write_summary_json(bundle: &ReportBundle, path: &Path) -> Result<(), EngineError> {
    let summary = bundle.summary();
    let spec = bundle.spec();
    let document = SummaryDocument {
        target: bundle.target(),
        report_id: bundle.id().as_str(),
        problem_type: spec.problem_type,
        condition: &summary.condition,
        bounds_mode: spec.bounds_source.mode(),
        quantile: spec.bounds_source.quantile(),
        bounds: *bundle.bounds(),
        instances: summary.instances,
        tags: summary.tags,
        optimal: summary.optimal,
        suboptimal: summary.suboptimal,
        target_profile: bundle.target_profile(),
        selected_features: bundle.selected(),
    };
    let file = fs::File::create(path).map_err(EngineError::io(path))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &document).map_err(|source| EngineError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(EngineError::io(path))
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn write_matrix(matrix: &CorrelationMatrix, path: &Path) -> Result<(), EngineError> {
    let mut writer = csv::Writer::from_path(path).map_err(EngineError::csv(path))?;
    let header = std::iter::once("").chain(matrix.names().iter().map(String::as_str));
    writer.write_record(header).map_err(EngineError::csv(path))?;
    for (name, row) in matrix.rows() {
        let record = std::iter::once(name.to_owned()).chain(row.into_iter().map(cell));
        writer.write_record(record).map_err(EngineError::csv(path))?;
    }
    writer.flush().map_err(EngineError::io(path))
}

fn write_ranking(correlations: &[(String, f64)], path: &Path) -> Result<(), EngineError> {
    let mut writer = csv::Writer::from_path(path).map_err(EngineError::csv(path))?;
    writer
        .write_record(["tag", "correlation"])
        .map_err(EngineError::csv(path))?;
    for (tag, r) in correlations {
        writer
            .write_record([tag.clone(), r.to_string()])
            .map_err(EngineError::csv(path))?;
    }
    writer.flush().map_err(EngineError::io(path))
}

fn write_rows(dataset: &Dataset, path: &Path) -> Result<(), EngineError> {
    let index_header = match dataset.index() {
        RowIndex::Timestamps(_) => "Date",
        RowIndex::Ordinal(_) => "Row",
    };
    let mut writer = csv::Writer::from_path(path).map_err(EngineError::csv(path))?;
    let header = std::iter::once(index_header).chain(dataset.column_names());
    writer.write_record(header).map_err(EngineError::csv(path))?;
    for row in 0..dataset.len() {
        let record = std::iter::once(dataset.index().label(row))
            .chain(dataset.columns().iter().map(|c| c.data.cell_text(row)));
        writer.write_record(record).map_err(EngineError::csv(path))?;
    }
    writer.flush().map_err(EngineError::io(path))
}

fn write_population_summary(
    pairs: &[PairedFeatureSummary],
    path: &Path,
) -> Result<(), EngineError> {
    let mut writer = csv::Writer::from_path(path).map_err(EngineError::csv(path))?;
    writer
        .write_record([
            "pair", "feature", "side", "count", "p25", "median", "p75", "mean",
        ])
        .map_err(EngineError::csv(path))?;
    for (i, pair) in pairs.iter().enumerate() {
        for summary in pair.summaries() {
            let sides: [(&str, &SideSummary); 2] = [
                ("optimal", &summary.optimal),
                ("sub-optimal", &summary.suboptimal),
            ];
            for (side, stats) in sides {
                writer
                    .write_record([
                        (i + 1).to_string(),
                        summary.feature.clone(),
                        side.to_owned(),
                        stats.count.to_string(),
                        cell(stats.p25),
                        cell(stats.median),
                        cell(stats.p75),
                        cell(stats.mean),
                    ])
                    .map_err(EngineError::csv(path))?;
            }
        }
    }
    writer.flush().map_err(EngineError::io(path))
}
