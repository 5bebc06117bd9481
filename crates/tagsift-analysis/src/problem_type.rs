//! Comparison policies for the target (KPI) tag
//!
//! Every problem type is one row of a single policy table: it decides which
//! bound is free during bound derivation and how an observation is compared
//! against the resolved bounds.
//!
//! | problem type | optimal iff            | description              |
//! |--------------|------------------------|--------------------------|
//! | `max`        | `v > lower`            | greater than             |
//! | `max_equal`  | `v >= lower`           | greater than or equal to |
//! | `min`        | `v < upper`            | less than                |
//! | `min_equal`  | `v <= upper`           | less than or equal to    |
//! | `range`      | `lower <= v <= upper`  | between (inclusive)      |

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{bounds::Bounds, error::EngineError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum ProblemType {
    Max,
    MaxEqual,
    Min,
    MinEqual,
    Range,
}

/// Which side of the target distribution is desirable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Higher is better; the lower bound is derived.
    Maximize,
    /// Lower is better; the upper bound is derived.
    Minimize,
    /// A band is optimal; both bounds are derived.
    Band,
}

impl ProblemType {
    pub const ALL: [Self; 5] = [
        Self::Max,
        Self::MaxEqual,
        Self::Min,
        Self::MinEqual,
        Self::Range,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Max => "max",
            Self::MaxEqual => "max_equal",
            Self::Min => "min",
            Self::MinEqual => "min_equal",
            Self::Range => "range",
        }
    }

    #[must_use]
    pub fn direction(self) -> Direction {
        match self {
            Self::Max | Self::MaxEqual => Direction::Maximize,
            Self::Min | Self::MinEqual => Direction::Minimize,
            Self::Range => Direction::Band,
        }
    }

    /// Whether a target value is optimal under the given bounds.
    ///
    /// `NaN` never satisfies a comparison and is therefore sub-optimal.
    ///
    /// ```
    /// use tagsift_analysis::{bounds::Bounds, problem_type::ProblemType};
    ///
    /// let bounds = Bounds::new(0.0, 10.0).unwrap();
    /// assert!(ProblemType::MinEqual.is_optimal(10.0, &bounds));
    /// assert!(!ProblemType::Min.is_optimal(10.0, &bounds));
    /// ```
    #[must_use]
    pub fn is_optimal(self, value: f64, bounds: &Bounds) -> bool {
        match self {
            Self::Max => value > bounds.lower,
            Self::MaxEqual => value >= bounds.lower,
            Self::Min => value < bounds.upper,
            Self::MinEqual => value <= bounds.upper,
            Self::Range => bounds.lower <= value && value <= bounds.upper,
        }
    }

    /// Natural-language form of the optimal condition, e.g. `greater than 12.3`.
    ///
    /// ```
    /// use tagsift_analysis::{bounds::Bounds, problem_type::ProblemType};
    ///
    /// let bounds = Bounds::new(12.3, 40.0).unwrap();
    /// assert_eq!(ProblemType::Max.describe(&bounds), "greater than 12.3");
    /// assert_eq!(ProblemType::Range.describe(&bounds), "between 12.3 and 40");
    /// ```
    #[must_use]
    pub fn describe(self, bounds: &Bounds) -> String {
        let Bounds { lower, upper } = bounds;
        match self {
            Self::Max => format!("greater than {lower}"),
            Self::MaxEqual => format!("greater than or equal to {lower}"),
            Self::Min => format!("less than {upper}"),
            Self::MinEqual => format!("less than or equal to {upper}"),
            Self::Range => format!("between {lower} and {upper}"),
        }
    }
}

impl FromStr for ProblemType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "max" => Ok(Self::Max),
            "max_equal" => Ok(Self::MaxEqual),
            "min" => Ok(Self::Min),
            "min_equal" => Ok(Self::MinEqual),
            // `both` is the legacy name of the inclusive band
            "range" | "both" => Ok(Self::Range),
            _ => Err(EngineError::InvalidProblemType {
                value: s.to_owned(),
            }),
        }
    }
}

impl TryFrom<String> for ProblemType {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl std::fmt::Display for ProblemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_table_boundaries() {
        let bounds = Bounds::new(2.0, 8.0).unwrap();
        let cases = [
            (ProblemType::Max, [false, false, true, true, true]),
            (ProblemType::MaxEqual, [false, true, true, true, true]),
            (ProblemType::Min, [true, true, true, false, false]),
            (ProblemType::MinEqual, [true, true, true, true, false]),
            (ProblemType::Range, [false, true, true, true, false]),
        ];
        let values = [1.0, 2.0, 5.0, 8.0, 9.0];
        for (problem_type, expected) in cases {
            for (value, expected) in values.iter().zip(expected) {
                assert_eq!(
                    problem_type.is_optimal(*value, &bounds),
                    expected,
                    "{problem_type} with value {value}"
                );
            }
        }
    }

    #[test]
    fn test_nan_is_never_optimal() {
        let bounds = Bounds::new(0.0, 1.0).unwrap();
        for problem_type in ProblemType::ALL {
            assert!(!problem_type.is_optimal(f64::NAN, &bounds));
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!("max".parse::<ProblemType>().unwrap(), ProblemType::Max);
        assert_eq!(" MIN_EQUAL ".parse::<ProblemType>().unwrap(), ProblemType::MinEqual);
        assert_eq!("both".parse::<ProblemType>().unwrap(), ProblemType::Range);
        assert!(matches!(
            "greater".parse::<ProblemType>(),
            Err(EngineError::InvalidProblemType { value }) if value == "greater"
        ));
        for problem_type in ProblemType::ALL {
            assert_eq!(problem_type.as_str().parse::<ProblemType>().unwrap(), problem_type);
        }
    }

    #[test]
    fn test_serde_round_trip_names() {
        let json = serde_json::to_string(&ProblemType::MaxEqual).unwrap();
        assert_eq!(json, "\"max_equal\"");
        let parsed: ProblemType = serde_json::from_str("\"both\"").unwrap();
        assert_eq!(parsed, ProblemType::Range);
        assert!(serde_json::from_str::<ProblemType>("\"sideways\"").is_err());
    }

    #[test]
    fn test_describe() {
        let bounds = Bounds::new(-1.0, 100.0).unwrap();
        assert_eq!(ProblemType::Max.describe(&bounds), "greater than -1");
        assert_eq!(
            ProblemType::MaxEqual.describe(&bounds),
            "greater than or equal to -1"
        );
        assert_eq!(ProblemType::Min.describe(&bounds), "less than 100");
        assert_eq!(
            ProblemType::MinEqual.describe(&bounds),
            "less than or equal to 100"
        );
    }
}
