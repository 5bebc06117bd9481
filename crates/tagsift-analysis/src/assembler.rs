//! Report assembly state machine
//!
//! A [`ReportAssembler`] drives one target through the analysis pipeline.
//! Every call to [`ReportAssembler::step`] performs exactly one transition;
//! stages are never skipped and a failed stage is never retried.
//!
//! ```text
//! Init
//!   ↓ resolve bounds
//! BoundsResolved
//!   ↓ classify rows, reject an empty side
//! Classified
//!   ↓ select features, compute the correlation matrices
//! FeaturesSelected
//!   ↓ summarize paired features
//! Compared
//!   ↓ correlation report and summary statistics
//! Finalized(ReportBundle)
//!
//! any stage ──error──→ Failed(ReportError)
//! ```
//!
//! [`ReportAssembler::run_to`] additionally reserves the output namespace
//! before any computation and exports the finished bundle into it.

use std::path::{Path, PathBuf};

use tagsift_stats::correlation::CorrelationMatrix;

use crate::{
    bounds::{self, Bounds, BoundsSource},
    classify::{self, Partition},
    compare::{self, PairedFeatureSummary},
    correlation_report::{self, CorrelationReport, DEFAULT_TOP_N},
    dataset::Dataset,
    error::{EngineError, ReportError, Stage},
    export,
    namespace::{OutputNamespace, ReportId},
    problem_type::ProblemType,
    render::Renderer,
    selection::{CorrelationSelector, DEFAULT_THRESHOLD, FeatureSelector, SelectedFeatures},
    summary::{SummaryStats, TargetProfile},
};

/// What to analyze: the target tag and how its optimal region is defined.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetSpec {
    pub target_column: String,
    pub problem_type: ProblemType,
    pub bounds_source: BoundsSource,
}

impl TargetSpec {
    #[must_use]
    pub fn new(
        target_column: impl Into<String>,
        problem_type: ProblemType,
        bounds_source: BoundsSource,
    ) -> Self {
        Self {
            target_column: target_column.into(),
            problem_type,
            bounds_source,
        }
    }
}

/// Tuning shared by every target of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportConfig {
    /// Correlation magnitude a feature must exceed to be selected.
    pub threshold: f64,
    /// Tags kept at each end of the correlation ranking.
    pub top_n: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            top_n: DEFAULT_TOP_N,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Classified {
    pub bounds: Bounds,
    pub partition: Partition,
}

#[derive(Debug, Clone)]
pub struct FeaturesSelected {
    pub bounds: Bounds,
    pub partition: Partition,
    pub selected: SelectedFeatures,
    pub matrix: CorrelationMatrix,
    pub rank_matrix: CorrelationMatrix,
}

#[derive(Debug, Clone)]
pub struct Compared {
    pub bounds: Bounds,
    pub partition: Partition,
    pub selected: SelectedFeatures,
    pub matrix: CorrelationMatrix,
    pub rank_matrix: CorrelationMatrix,
    pub pairs: Vec<PairedFeatureSummary>,
}

#[derive(Debug)]
pub enum AssemblyState {
    Init,
    BoundsResolved(Bounds),
    Classified(Box<Classified>),
    FeaturesSelected(Box<FeaturesSelected>),
    Compared(Box<Compared>),
    Finalized(Box<ReportBundle>),
    Failed(ReportError),
}

impl AssemblyState {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finalized(_) | Self::Failed(_))
    }

    /// Stage performed by the next transition, `None` once terminal.
    #[must_use]
    pub fn next_stage(&self) -> Option<Stage> {
        match self {
            Self::Init => Some(Stage::ResolvingBounds),
            Self::BoundsResolved(_) => Some(Stage::Classifying),
            Self::Classified(_) => Some(Stage::SelectingFeatures),
            Self::FeaturesSelected(_) => Some(Stage::Comparing),
            Self::Compared(_) => Some(Stage::Finalizing),
            Self::Finalized(_) | Self::Failed(_) => None,
        }
    }
}

/// Every artifact of a finished report.
#[derive(Debug, Clone)]
pub struct ReportBundle {
    pub(crate) id: ReportId,
    pub(crate) spec: TargetSpec,
    pub(crate) bounds: Bounds,
    pub(crate) summary: SummaryStats,
    pub(crate) target_profile: TargetProfile,
    pub(crate) partition: Partition,
    pub(crate) selected: SelectedFeatures,
    pub(crate) pairs: Vec<PairedFeatureSummary>,
    pub(crate) correlations: CorrelationReport,
}

impl ReportBundle {
    #[must_use]
    pub fn id(&self) -> &ReportId {
        &self.id
    }

    #[must_use]
    pub fn spec(&self) -> &TargetSpec {
        &self.spec
    }

    #[must_use]
    pub fn target(&self) -> &str {
        &self.spec.target_column
    }

    #[must_use]
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    #[must_use]
    pub fn summary(&self) -> &SummaryStats {
        &self.summary
    }

    #[must_use]
    pub fn target_profile(&self) -> &TargetProfile {
        &self.target_profile
    }

    #[must_use]
    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    #[must_use]
    pub fn selected(&self) -> &SelectedFeatures {
        &self.selected
    }

    #[must_use]
    pub fn pairs(&self) -> &[PairedFeatureSummary] {
        &self.pairs
    }

    #[must_use]
    pub fn correlations(&self) -> &CorrelationReport {
        &self.correlations
    }
}

pub struct ReportAssembler<'a> {
    dataset: &'a Dataset,
    spec: TargetSpec,
    config: ReportConfig,
    selector: Option<&'a dyn FeatureSelector>,
    state: AssemblyState,
}

impl<'a> ReportAssembler<'a> {
    #[must_use]
    pub fn new(dataset: &'a Dataset, spec: TargetSpec, config: ReportConfig) -> Self {
        Self {
            dataset,
            spec,
            config,
            selector: None,
            state: AssemblyState::Init,
        }
    }

    /// Uses `selector` instead of a [`CorrelationSelector`] built from the
    /// configured threshold.
    #[must_use]
    pub fn with_selector(mut self, selector: &'a dyn FeatureSelector) -> Self {
        self.selector = Some(selector);
        self
    }

    #[must_use]
    pub fn state(&self) -> &AssemblyState {
        &self.state
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Performs one transition. Does nothing in a terminal state.
    pub fn step(&mut self) {
        let Some(stage) = self.state.next_stage() else {
            return;
        };
        let target = self.spec.target_column.as_str();
        log::info!("[{target}] {stage}");

        let state = std::mem::replace(&mut self.state, AssemblyState::Init);
        self.state = match self.transition(state) {
            Ok(next) => next,
            Err(source) => {
                log::debug!("[{target}] failed while {stage}: {source}");
                AssemblyState::Failed(ReportError::new(target, stage, source))
            }
        };
    }

    fn transition(&self, state: AssemblyState) -> Result<AssemblyState, EngineError> {
        let target = self.spec.target_column.as_str();
        let next = match state {
            AssemblyState::Init => {
                let series = self.dataset.numeric_column(target)?;
                let bounds =
                    bounds::resolve(series, self.spec.problem_type, &self.spec.bounds_source)?;
                AssemblyState::BoundsResolved(bounds)
            }
            AssemblyState::BoundsResolved(bounds) => {
                let partition =
                    classify::classify(self.dataset, target, &bounds, self.spec.problem_type)?;
                log::debug!(
                    "[{target}] {} optimal / {} sub-optimal rows",
                    partition.optimal_rows().len(),
                    partition.suboptimal_rows().len()
                );
                partition.ensure_both_sides()?;
                AssemblyState::Classified(Box::new(Classified { bounds, partition }))
            }
            AssemblyState::Classified(classified) => {
                let Classified { bounds, partition } = *classified;
                let numeric = self.dataset.numeric_subset();
                let selected = match self.selector {
                    // external rankings see every column so a non-numeric name reports its kind
                    Some(selector) => selector.select(self.dataset, target)?,
                    None => CorrelationSelector::new(self.config.threshold)?
                        .select(&numeric, target)?,
                };
                let matrix = correlation_report::correlation_matrix(&numeric);
                let rank_matrix = correlation_report::rank_correlation_matrix(&numeric);
                log::debug!(
                    "[{target}] {} selected features, {}x{} correlation matrices",
                    selected.len(),
                    matrix.len(),
                    matrix.len()
                );
                AssemblyState::FeaturesSelected(Box::new(FeaturesSelected {
                    bounds,
                    partition,
                    selected,
                    matrix,
                    rank_matrix,
                }))
            }
            AssemblyState::FeaturesSelected(selected) => {
                let FeaturesSelected {
                    bounds,
                    partition,
                    selected,
                    matrix,
                    rank_matrix,
                } = *selected;
                let pairs = compare::compare(&partition.optimal, &partition.suboptimal, &selected)?
                    .iter()
                    .collect();
                AssemblyState::Compared(Box::new(Compared {
                    bounds,
                    partition,
                    selected,
                    matrix,
                    rank_matrix,
                    pairs,
                }))
            }
            AssemblyState::Compared(compared) => {
                let Compared {
                    bounds,
                    partition,
                    selected,
                    matrix,
                    rank_matrix,
                    pairs,
                } = *compared;
                let correlations =
                    correlation_report::report(&matrix, &selected, target, self.config.top_n)?
                        .with_rank_matrix(&rank_matrix);
                let summary = SummaryStats::new(
                    self.dataset,
                    target,
                    self.spec.problem_type,
                    &bounds,
                    &partition,
                    &selected,
                );
                let target_profile = TargetProfile::new(self.dataset.numeric_column(target)?);
                AssemblyState::Finalized(Box::new(ReportBundle {
                    id: ReportId::from_target(target),
                    spec: self.spec.clone(),
                    bounds,
                    summary,
                    target_profile,
                    partition,
                    selected,
                    pairs,
                    correlations,
                }))
            }
            terminal @ (AssemblyState::Finalized(_) | AssemblyState::Failed(_)) => terminal,
        };
        Ok(next)
    }

    /// Drives the assembler to a terminal state.
    ///
    /// # Examples
    ///
    /// ```
    /// use tagsift_analysis::{
    ///     assembler::{ReportAssembler, ReportConfig, TargetSpec},
    ///     bounds::BoundsSource,
    ///     dataset::{Column, Dataset, RowIndex},
    ///     problem_type::ProblemType,
    /// };
    ///
    /// let dataset = Dataset::new(
    ///     RowIndex::ordinal(4),
    ///     vec![
    ///         Column::numeric("kpi", vec![1.0, 2.0, 8.0, 9.0]),
    ///         Column::numeric("feed", vec![0.1, 0.2, 0.8, 0.9]),
    ///     ],
    /// )
    /// .unwrap();
    /// let spec = TargetSpec::new(
    ///     "kpi",
    ///     ProblemType::Max,
    ///     BoundsSource::Manual { lower: 5.0, upper: 9.0 },
    /// );
    ///
    /// let bundle = ReportAssembler::new(&dataset, spec, ReportConfig::default())
    ///     .run()
    ///     .unwrap();
    /// assert_eq!(bundle.partition().optimal_rows(), &[2, 3]);
    /// assert_eq!(bundle.selected().names().collect::<Vec<_>>(), ["feed"]);
    /// ```
    pub fn run(mut self) -> Result<ReportBundle, ReportError> {
        while !self.is_terminal() {
            self.step();
        }
        match self.state {
            AssemblyState::Finalized(bundle) => Ok(*bundle),
            AssemblyState::Failed(err) => Err(err),
            _ => unreachable!("assembler stopped in a non-terminal state"),
        }
    }

    /// Reserves `<root>/<report id>`, runs the pipeline and exports the bundle.
    ///
    /// Nothing is left under `root` if any stage fails.
    pub fn run_to(self, root: &Path, renderer: &dyn Renderer) -> Result<PathBuf, ReportError> {
        let target = self.spec.target_column.clone();
        let fail = |stage| {
            let target = target.clone();
            move |source| ReportError::new(target, stage, source)
        };

        log::info!("[{target}] {}", Stage::ReservingNamespace);
        let namespace = OutputNamespace::reserve(root, ReportId::from_target(&target))
            .map_err(fail(Stage::ReservingNamespace))?;
        let bundle = self.run()?;

        log::info!("[{target}] {}", Stage::Writing);
        export::write_bundle(&bundle, namespace.staging_dir(), renderer)
            .map_err(fail(Stage::Writing))?;
        let dir = namespace.commit().map_err(fail(Stage::Writing))?;
        log::info!("[{target}] report written to {}", dir.display());
        Ok(dir)
    }
}
