use std::{path::PathBuf, thread};

use tagsift_analysis::{
    assembler::ReportAssembler,
    render::{NullRenderer, Renderer},
};

use crate::{command::OutputArg, loader, plot_data::PlotDataRenderer, util};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct BatchArg {
    /// Process data CSV; the first column is the row index
    data: PathBuf,
    /// Job configuration (JSON)
    #[arg(long)]
    config: PathBuf,
    #[command(flatten)]
    output: OutputArg,
}

pub(crate) fn run(arg: &BatchArg) -> anyhow::Result<()> {
    let BatchArg {
        data,
        config,
        output,
    } = arg;
    let jobs_file = util::read_jobs_file(config)?;
    let report_config = jobs_file.report_config();
    let specs = jobs_file
        .jobs
        .iter()
        .map(|job| job.target_spec())
        .collect::<anyhow::Result<Vec<_>>>()?;
    anyhow::ensure!(!specs.is_empty(), "No jobs in {}", config.display());

    let dataset = loader::load_csv(data)?;
    let renderer: &(dyn Renderer + Sync) = if output.plot_data {
        &PlotDataRenderer
    } else {
        &NullRenderer
    };

    log::info!("Running {} report jobs...", specs.len());
    let results = thread::scope(|s| {
        let handles = specs
            .into_iter()
            .map(|spec| {
                let dataset = &dataset;
                let root = &output.output_dir;
                s.spawn(move || {
                    ReportAssembler::new(dataset, spec, report_config).run_to(root, renderer)
                })
            })
            .collect::<Vec<_>>();
        handles
            .into_iter()
            .map(|handle| handle.join())
            .collect::<Vec<_>>()
    });

    let mut failed = 0;
    for result in results {
        match result {
            Ok(Ok(dir)) => println!("{}", dir.display()),
            Ok(Err(err)) => {
                log::error!("{err}");
                failed += 1;
            }
            Err(_) => {
                log::error!("A report worker panicked");
                failed += 1;
            }
        }
    }
    anyhow::ensure!(failed == 0, "{failed} report job(s) failed");
    Ok(())
}
