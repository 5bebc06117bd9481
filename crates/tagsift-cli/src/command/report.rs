use std::path::PathBuf;

use tagsift_analysis::{
    assembler::ReportAssembler,
    render::{NullRenderer, Renderer},
};

use crate::{
    command::{OutputArg, TargetArg, TuningArg},
    loader,
    plot_data::PlotDataRenderer,
    util,
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ReportArg {
    /// Process data CSV; the first column is the row index
    data: PathBuf,
    #[command(flatten)]
    target: TargetArg,
    #[command(flatten)]
    tuning: TuningArg,
    #[command(flatten)]
    output: OutputArg,
    /// Externally ranked features (JSON) used instead of correlation selection
    #[arg(long)]
    features_file: Option<PathBuf>,
}

pub(crate) fn run(arg: &ReportArg) -> anyhow::Result<()> {
    let ReportArg {
        data,
        target,
        tuning,
        output,
        features_file,
    } = arg;
    let dataset = loader::load_csv(data)?;
    let selector = features_file
        .as_ref()
        .map(util::read_features_file)
        .transpose()?
        .map(|file| file.into_selector());

    let renderer: &dyn Renderer = if output.plot_data {
        &PlotDataRenderer
    } else {
        &NullRenderer
    };
    let mut assembler = ReportAssembler::new(&dataset, target.target_spec(), tuning.report_config());
    if let Some(selector) = &selector {
        assembler = assembler.with_selector(selector);
    }
    let dir = assembler.run_to(&output.output_dir, renderer)?;
    println!("{}", dir.display());
    Ok(())
}
