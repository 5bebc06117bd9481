use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tagsift_analysis::{
    bounds::{self, Bounds},
    classify,
    problem_type::ProblemType,
};

use crate::{command::TargetArg, loader, util::Output};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct BoundsArg {
    /// Process data CSV; the first column is the row index
    data: PathBuf,
    #[command(flatten)]
    pub(super) target: TargetArg,
    /// Output file path (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct BoundsReport {
    generated_at: DateTime<Utc>,
    target: String,
    problem_type: ProblemType,
    bounds_mode: &'static str,
    bounds: Bounds,
    condition: String,
    optimal: usize,
    suboptimal: usize,
}

pub(crate) fn run(arg: &BoundsArg) -> anyhow::Result<()> {
    let BoundsArg {
        data,
        target,
        output,
    } = arg;
    let spec = target.target_spec();
    let dataset = loader::load_csv(data)?;

    let series = dataset.numeric_column(&spec.target_column)?;
    let bounds = bounds::resolve(series, spec.problem_type, &spec.bounds_source)
        .with_context(|| format!("Failed to resolve bounds of '{}'", spec.target_column))?;
    let partition = classify::classify(&dataset, &spec.target_column, &bounds, spec.problem_type)?;

    let report = BoundsReport {
        generated_at: Utc::now(),
        target: spec.target_column.clone(),
        problem_type: spec.problem_type,
        bounds_mode: spec.bounds_source.mode(),
        bounds,
        condition: spec.problem_type.describe(&bounds),
        optimal: partition.optimal_rows().len(),
        suboptimal: partition.suboptimal_rows().len(),
    };
    log::info!(
        "{}: optimal when {} ({} optimal, {} sub-optimal)",
        report.target,
        report.condition,
        report.optimal,
        report.suboptimal
    );
    Output::save_json(&report, output.clone())
}
