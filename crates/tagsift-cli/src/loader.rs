//! CSV loading of process data
//!
//! The first column is the row index. It becomes a timestamp index when every
//! value parses as a timestamp and an ordinal index otherwise. Every other
//! column is a tag whose type is inferred from its non-empty cells: numeric if
//! all parse as numbers, datetime if all parse as timestamps, categorical
//! otherwise. Empty cells are missing values.

use std::{io, path::Path};

use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime};
use tagsift_analysis::dataset::{Column, Dataset, RowIndex};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M",
];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

pub fn load_csv(path: &Path) -> anyhow::Result<Dataset> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open data file: {}", path.display()))?;
    let dataset = read_dataset(reader)
        .with_context(|| format!("Failed to load data file: {}", path.display()))?;
    log::info!(
        "Loaded {} rows x {} columns from {}",
        dataset.len(),
        dataset.columns().len(),
        path.display()
    );
    Ok(dataset)
}

fn read_dataset<R>(mut reader: csv::Reader<R>) -> anyhow::Result<Dataset>
where
    R: io::Read,
{
    let headers = reader
        .headers()
        .context("Failed to read CSV headers")?
        .iter()
        .map(str::to_owned)
        .collect::<Vec<_>>();
    anyhow::ensure!(!headers.is_empty(), "CSV has no columns");

    let records = reader
        .records()
        .enumerate()
        .map(|(i, record)| record.with_context(|| format!("Failed to read CSV row {}", i + 1)))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let cells = |col: usize| records.iter().map(move |r| r.get(col).unwrap_or(""));

    let index = match cells(0).map(parse_timestamp).collect::<Option<Vec<_>>>() {
        Some(timestamps) if !timestamps.is_empty() => RowIndex::Timestamps(timestamps),
        _ => {
            log::debug!("index column '{}' is not a timestamp; using row numbers", headers[0]);
            RowIndex::ordinal(records.len())
        }
    };

    let columns = headers
        .iter()
        .enumerate()
        .skip(1)
        .map(|(col, name)| infer_column(name, cells(col)))
        .collect();

    Ok(Dataset::new(index, columns)?)
}

fn infer_column<'a, I>(name: &str, cells: I) -> Column
where
    I: Iterator<Item = &'a str> + Clone,
{
    let mut non_empty = cells.clone().filter(|c| !c.is_empty());
    if non_empty.clone().all(|c| c.parse::<f64>().is_ok()) {
        let values = cells.map(|c| c.parse().unwrap_or(f64::NAN)).collect();
        return Column::numeric(name, values);
    }
    if non_empty.all(|c| parse_timestamp(c).is_some()) {
        return Column::datetime(name, cells.map(parse_timestamp).collect());
    }
    let values = cells
        .map(|c| (!c.is_empty()).then(|| c.to_owned()))
        .collect();
    Column::categorical(name, values)
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tagsift_analysis::dataset::ColumnData;

    use super::*;

    fn read(text: &str) -> anyhow::Result<Dataset> {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());
        read_dataset(reader)
    }

    #[test]
    fn test_timestamp_index_and_type_inference() {
        let dataset = read(
            "time,FIC:101.PV,mode,changed\n\
             2024-01-01 00:00:00,1.5,auto,2024-01-01\n\
             2024-01-01 00:10:00,,manual,\n\
             2024-01-01 00:20:00,NaN,,01/02/2024 10:30\n",
        )
        .unwrap();

        assert!(matches!(dataset.index(), RowIndex::Timestamps(ts) if ts.len() == 3));
        let flow = dataset.numeric_column("FIC:101.PV").unwrap();
        assert_eq!(flow[0], 1.5);
        assert!(flow[1].is_nan() && flow[2].is_nan());

        let mode = &dataset.column("mode").unwrap().data;
        assert_eq!(
            mode,
            &ColumnData::Categorical(vec![Some("auto".into()), Some("manual".into()), None])
        );
        let changed = &dataset.column("changed").unwrap().data;
        assert!(matches!(changed, ColumnData::DateTime(v) if v[1].is_none() && v[2].is_some()));
    }

    #[test]
    fn test_ordinal_index_fallback() {
        let dataset = read("sample,kpi\na,1\nb,2\n").unwrap();
        assert_eq!(dataset.index(), &RowIndex::ordinal(2));
        assert_eq!(dataset.column_names().collect::<Vec<_>>(), ["kpi"]);
    }

    #[test]
    fn test_date_only_and_iso_formats() {
        assert_eq!(
            parse_timestamp("2024-03-05"),
            NaiveDate::from_ymd_opt(2024, 3, 5).and_then(|d| d.and_hms_opt(0, 0, 0))
        );
        assert!(parse_timestamp("2024-03-05T06:07:08").is_some());
        assert!(parse_timestamp("03/05/2024").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_ragged_rows_are_rejected() {
        assert!(read("t,a,b\n1,2,3\n4,5\n").is_err());
    }

    #[test]
    fn test_load_csv_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        fs::write(&path, "t, kpi , feed\n0, 1 , 2\n1, 2 , 4\n").unwrap();
        let dataset = load_csv(&path).unwrap();
        assert_eq!(dataset.numeric_column("feed").unwrap(), &[2.0, 4.0]);
        assert!(load_csv(&dir.path().join("missing.csv")).is_err());
    }
}
