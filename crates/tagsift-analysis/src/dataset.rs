//! Time-indexed tabular process data
//!
//! A [`Dataset`] is an ordered table of named, typed columns sharing one row
//! index. The engine treats a dataset as read-only input: every operation
//! that narrows rows or columns returns a new dataset and leaves the source
//! untouched.
//!
//! ```text
//!  index               FIC:101.PV   TI-7   MODE
//!  2024-01-01 00:00    12.1         81.0   auto
//!  2024-01-01 00:10    NaN          80.2   auto
//!  2024-01-01 00:20    13.4         79.9   manual
//! ```
//!
//! Missing numeric cells are `f64::NAN`; missing datetime and categorical
//! cells are `None`.

use std::{collections::HashSet, fmt};

use chrono::NaiveDateTime;

use crate::error::EngineError;

/// The row labels of a dataset.
///
/// Ordinal indices keep the original row positions, so rows taken from a
/// dataset still report where they came from.
#[derive(Debug, Clone, PartialEq)]
pub enum RowIndex {
    Timestamps(Vec<NaiveDateTime>),
    Ordinal(Vec<usize>),
}

impl RowIndex {
    /// Ordinal index `0..len`.
    #[must_use]
    pub fn ordinal(len: usize) -> Self {
        Self::Ordinal((0..len).collect())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Timestamps(ts) => ts.len(),
            Self::Ordinal(pos) => pos.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Human-readable label of one row.
    #[must_use]
    pub fn label(&self, row: usize) -> String {
        match self {
            Self::Timestamps(ts) => ts[row].to_string(),
            Self::Ordinal(pos) => pos[row].to_string(),
        }
    }

    /// Smallest and largest label, `None` for an empty index.
    #[must_use]
    pub fn range(&self) -> Option<IndexRange> {
        match self {
            Self::Timestamps(ts) => {
                let (min, max) = (ts.iter().min()?, ts.iter().max()?);
                Some(IndexRange {
                    kind: IndexKind::Date,
                    first: min.to_string(),
                    last: max.to_string(),
                })
            }
            Self::Ordinal(pos) => {
                let (min, max) = (pos.iter().min()?, pos.iter().max()?);
                Some(IndexRange {
                    kind: IndexKind::Row,
                    first: min.to_string(),
                    last: max.to_string(),
                })
            }
        }
    }

    fn take(&self, rows: &[usize]) -> Self {
        match self {
            Self::Timestamps(ts) => Self::Timestamps(rows.iter().map(|&r| ts[r]).collect()),
            Self::Ordinal(pos) => Self::Ordinal(rows.iter().map(|&r| pos[r]).collect()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum IndexKind {
    #[display("Date")]
    Date,
    #[display("Row")]
    Row,
}

/// The observed extent of a row index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRange {
    pub kind: IndexKind,
    pub first: String,
    pub last: String,
}

impl fmt::Display for IndexRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.first, self.last)
    }
}

/// Broad type of a column, used in error messages and for numeric selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum ColumnKind {
    #[display("numeric")]
    Numeric,
    #[display("datetime")]
    DateTime,
    #[display("categorical")]
    Categorical,
}

/// Cell values of one column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<f64>),
    DateTime(Vec<Option<NaiveDateTime>>),
    Categorical(Vec<Option<String>>),
}

impl ColumnData {
    #[must_use]
    pub fn kind(&self) -> ColumnKind {
        match self {
            Self::Numeric(_) => ColumnKind::Numeric,
            Self::DateTime(_) => ColumnKind::DateTime,
            Self::Categorical(_) => ColumnKind::Categorical,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Numeric(v) => v.len(),
            Self::DateTime(v) => v.len(),
            Self::Categorical(v) => v.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Text form of one cell; missing cells are empty.
    #[must_use]
    pub fn cell_text(&self, row: usize) -> String {
        match self {
            Self::Numeric(v) if v[row].is_nan() => String::new(),
            Self::Numeric(v) => v[row].to_string(),
            Self::DateTime(v) => v[row].map(|d| d.to_string()).unwrap_or_default(),
            Self::Categorical(v) => v[row].clone().unwrap_or_default(),
        }
    }

    fn take(&self, rows: &[usize]) -> Self {
        match self {
            Self::Numeric(v) => Self::Numeric(rows.iter().map(|&r| v[r]).collect()),
            Self::DateTime(v) => Self::DateTime(rows.iter().map(|&r| v[r]).collect()),
            Self::Categorical(v) => Self::Categorical(rows.iter().map(|&r| v[r].clone()).collect()),
        }
    }
}

/// A named column (a tag).
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    #[must_use]
    pub fn numeric(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Numeric(values),
        }
    }

    #[must_use]
    pub fn datetime(name: impl Into<String>, values: Vec<Option<NaiveDateTime>>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::DateTime(values),
        }
    }

    #[must_use]
    pub fn categorical(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Categorical(values),
        }
    }

    /// Numeric values, or `None` for non-numeric columns.
    #[must_use]
    pub fn as_numeric(&self) -> Option<&[f64]> {
        match &self.data {
            ColumnData::Numeric(v) => Some(v),
            _ => None,
        }
    }
}

/// An ordered table of typed columns sharing one row index.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    index: RowIndex,
    columns: Vec<Column>,
}

impl Dataset {
    /// Builds a dataset, checking that every column matches the index length
    /// and that column names are unique.
    pub fn new(index: RowIndex, columns: Vec<Column>) -> Result<Self, EngineError> {
        let mut seen = HashSet::new();
        for column in &columns {
            if column.data.len() != index.len() {
                return Err(EngineError::InvalidDataset {
                    reason: format!(
                        "column '{}' has {} rows but the index has {}",
                        column.name,
                        column.data.len(),
                        index.len()
                    ),
                });
            }
            if !seen.insert(column.name.as_str()) {
                return Err(EngineError::InvalidDataset {
                    reason: format!("duplicate column name '{}'", column.name),
                });
            }
        }
        Ok(Self { index, columns })
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    #[must_use]
    pub fn index(&self) -> &RowIndex {
        &self.index
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().map(|c| c.name.as_str())
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Values of a numeric column.
    ///
    /// Fails with [`EngineError::MissingColumn`] if there is no such column
    /// and [`EngineError::IncompatibleFeatureType`] if it is not numeric.
    pub fn numeric_column(&self, name: &str) -> Result<&[f64], EngineError> {
        let column = self.column(name).ok_or_else(|| EngineError::MissingColumn {
            column: name.to_owned(),
        })?;
        column
            .as_numeric()
            .ok_or_else(|| EngineError::IncompatibleFeatureType {
                column: name.to_owned(),
                kind: column.data.kind(),
            })
    }

    /// Copy holding only the numeric columns, in their original order.
    #[must_use]
    pub fn numeric_subset(&self) -> Self {
        Self {
            index: self.index.clone(),
            columns: self
                .columns
                .iter()
                .filter(|c| c.data.kind() == ColumnKind::Numeric)
                .cloned()
                .collect(),
        }
    }

    /// Copy holding the given rows, in the given order.
    ///
    /// # Panics
    ///
    /// Panics if a row is out of bounds.
    #[must_use]
    pub fn take_rows(&self, rows: &[usize]) -> Self {
        Self {
            index: self.index.take(rows),
            columns: self
                .columns
                .iter()
                .map(|c| Column {
                    name: c.name.clone(),
                    data: c.data.take(rows),
                })
                .collect(),
        }
    }

    /// Copy holding the named columns, in the given order.
    pub fn select_columns<S>(&self, names: &[S]) -> Result<Self, EngineError>
    where
        S: AsRef<str>,
    {
        let columns = names
            .iter()
            .map(|name| {
                self.column(name.as_ref())
                    .cloned()
                    .ok_or_else(|| EngineError::MissingColumn {
                        column: name.as_ref().to_owned(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            index: self.index.clone(),
            columns,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn ts(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(6, 0, 0)
            .unwrap()
    }

    fn sample() -> Dataset {
        Dataset::new(
            RowIndex::Timestamps(vec![ts(3), ts(1), ts(2)]),
            vec![
                Column::numeric("flow", vec![1.0, f64::NAN, 3.0]),
                Column::categorical("mode", vec![Some("auto".into()), None, Some("manual".into())]),
                Column::datetime("changed", vec![None, Some(ts(1)), None]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_ragged_columns() {
        let err = Dataset::new(
            RowIndex::ordinal(2),
            vec![Column::numeric("a", vec![1.0, 2.0, 3.0])],
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidDataset { .. }));
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let err = Dataset::new(
            RowIndex::ordinal(1),
            vec![Column::numeric("a", vec![1.0]), Column::numeric("a", vec![2.0])],
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidDataset { .. }));
    }

    #[test]
    fn test_numeric_column_errors() {
        let dataset = sample();
        assert_eq!(dataset.numeric_column("flow").unwrap().len(), 3);
        assert!(matches!(
            dataset.numeric_column("mode"),
            Err(EngineError::IncompatibleFeatureType {
                kind: ColumnKind::Categorical,
                ..
            })
        ));
        assert!(matches!(
            dataset.numeric_column("nope"),
            Err(EngineError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_numeric_subset_keeps_rows() {
        let subset = sample().numeric_subset();
        assert_eq!(subset.column_names().collect::<Vec<_>>(), vec!["flow"]);
        assert_eq!(subset.len(), 3);
    }

    #[test]
    fn test_take_rows_keeps_labels_and_source() {
        let dataset = sample();
        let taken = dataset.take_rows(&[2, 0]);
        assert_eq!(taken.index().label(0), ts(2).to_string());
        assert_eq!(taken.numeric_column("flow").unwrap(), &[3.0, 1.0]);
        assert_eq!(dataset.len(), 3);

        let ordinal = Dataset::new(RowIndex::ordinal(4), vec![]).unwrap();
        assert_eq!(ordinal.take_rows(&[3, 1]).index(), &RowIndex::Ordinal(vec![3, 1]));
    }

    #[test]
    fn test_index_range_uses_min_and_max() {
        let range = sample().index().range().unwrap();
        assert_eq!(range.kind, IndexKind::Date);
        assert_eq!(range.to_string(), format!("{} - {}", ts(1), ts(3)));
        assert_eq!(RowIndex::ordinal(0).range(), None);
    }

    #[test]
    fn test_select_columns_and_cell_text() {
        let dataset = sample();
        let selected = dataset.select_columns(&["mode", "flow"]).unwrap();
        assert_eq!(
            selected.column_names().collect::<Vec<_>>(),
            vec!["mode", "flow"]
        );
        assert_eq!(selected.columns()[1].data.cell_text(1), "");
        assert_eq!(selected.columns()[0].data.cell_text(2), "manual");
        assert!(dataset.select_columns(&["missing"]).is_err());
    }
}
