use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tagsift_analysis::{
    assembler::{ReportConfig, TargetSpec},
    bounds::BoundsSource,
    correlation_report::DEFAULT_TOP_N,
    problem_type::ProblemType,
    selection::DEFAULT_THRESHOLD,
};

use self::{batch::BatchArg, bounds::BoundsArg, report::ReportArg};

mod batch;
mod bounds;
mod report;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Write an optimal / sub-optimal report for one target tag
    Report(#[clap(flatten)] ReportArg),
    /// Write reports for several target tags concurrently
    Batch(#[clap(flatten)] BatchArg),
    /// Print the resolved bounds and partition sizes of a target tag
    Bounds(#[clap(flatten)] BoundsArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode {
        Mode::Report(arg) => report::run(&arg)?,
        Mode::Batch(arg) => batch::run(&arg)?,
        Mode::Bounds(arg) => bounds::run(&arg)?,
    }
    Ok(())
}

/// Target tag and the definition of its optimal region
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TargetArg {
    /// Target (KPI) column
    #[arg(long)]
    target: String,
    /// How the target is compared against its bounds
    /// (max, max_equal, min, min_equal, range)
    #[arg(long)]
    problem_type: ProblemType,
    /// Manual lower bound
    #[arg(long, requires = "upper", allow_negative_numbers = true)]
    lower: Option<f64>,
    /// Manual upper bound
    #[arg(long, requires = "lower", allow_negative_numbers = true)]
    upper: Option<f64>,
    /// Quantile in (0, 1) used instead of the interquartile fences
    #[arg(long, conflicts_with_all = ["lower", "upper"])]
    quantile: Option<f64>,
}

impl TargetArg {
    pub(crate) fn target_spec(&self) -> TargetSpec {
        let bounds_source = match (self.lower, self.upper, self.quantile) {
            (Some(lower), Some(upper), _) => BoundsSource::Manual { lower, upper },
            (_, _, Some(q)) => BoundsSource::Quantile(q),
            _ => BoundsSource::Auto,
        };
        TargetSpec::new(self.target.clone(), self.problem_type, bounds_source)
    }
}

/// Feature selection and correlation report tuning
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TuningArg {
    /// Absolute correlation a tag must exceed to be selected
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: f64,
    /// Tags kept at each end of the correlation ranking
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    top_n: usize,
}

impl TuningArg {
    pub(crate) fn report_config(&self) -> ReportConfig {
        ReportConfig {
            threshold: self.threshold,
            top_n: self.top_n,
        }
    }
}

/// Where and how reports are written
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct OutputArg {
    /// Root directory of the reports
    #[arg(long, default_value = "reports")]
    output_dir: PathBuf,
    /// Write the data behind each figure as JSON into `graphics/`
    #[arg(long)]
    plot_data: bool,
}
