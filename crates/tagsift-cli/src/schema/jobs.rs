use serde::{Deserialize, Serialize};
use tagsift_analysis::{
    assembler::{ReportConfig, TargetSpec},
    bounds::BoundsSource,
    problem_type::ProblemType,
};

/// Batch of report jobs sharing one dataset
///
/// ```json
/// {
///   "threshold": 0.6,
///   "top_n": 5,
///   "jobs": [
///     { "target": "FIC:101.PV", "problem_type": "max" },
///     { "target": "TI-7", "problem_type": "range", "quantile": 0.9 },
///     { "target": "PI-3", "problem_type": "min_equal", "bounds": { "lower": 0, "upper": 4.5 } }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobsFile {
    /// Correlation threshold for feature selection
    #[serde(default)]
    pub threshold: Option<f64>,
    /// Tags kept at each end of the correlation ranking
    #[serde(default)]
    pub top_n: Option<usize>,
    pub jobs: Vec<Job>,
}

impl JobsFile {
    pub fn report_config(&self) -> ReportConfig {
        let defaults = ReportConfig::default();
        ReportConfig {
            threshold: self.threshold.unwrap_or(defaults.threshold),
            top_n: self.top_n.unwrap_or(defaults.top_n),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Job {
    pub target: String,
    pub problem_type: ProblemType,
    /// Manual bounds; take precedence over everything else
    #[serde(default)]
    pub bounds: Option<ManualBounds>,
    #[serde(default)]
    pub quantile: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManualBounds {
    pub lower: f64,
    pub upper: f64,
}

impl Job {
    pub fn target_spec(&self) -> anyhow::Result<TargetSpec> {
        let bounds_source = match (self.bounds, self.quantile) {
            (Some(_), Some(_)) => anyhow::bail!(
                "job '{}' sets both manual bounds and a quantile",
                self.target
            ),
            (Some(ManualBounds { lower, upper }), None) => BoundsSource::Manual { lower, upper },
            (None, Some(q)) => BoundsSource::Quantile(q),
            (None, None) => BoundsSource::Auto,
        };
        Ok(TargetSpec::new(
            self.target.clone(),
            self.problem_type,
            bounds_source,
        ))
    }
}
