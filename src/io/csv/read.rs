//! CSV reading operations.

use std::{fs::File, io::Cursor, path::Path};

use anyhow::{Context, Result, ensure};
use polars::{frame::DataFrame, io::SerReader, prelude::{CsvReader, DataType}};

use crate::map::UnitId;

/// Name of the column holding base unit ids in characteristic tables.
pub const UNIT_ID_COLUMN: &str = "unit_id";

/// Reads a CSV file from `path` into a Polars DataFrame.
pub(crate) fn read_csv(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)
        .with_context(|| format!("[io::csv::read] Failed to open CSV file: {}", path.display()))?;
    CsvReader::new(file)
        .finish()
        .with_context(|| format!("[io::csv::read] Failed to read CSV from {:?}", path))
}

/// Reads a CSV from a string.
pub(crate) fn read_csv_string(csv: &str) -> Result<DataFrame> {
    CsvReader::new(Cursor::new(csv.as_bytes()))
        .finish()
        .with_context(|| "[io::csv::read] Failed to read CSV from string")
}

/// Read a characteristics table: one `unit_id` column plus one numeric column
/// per subject, named by subject name. Returns `(unit, subject name, value)`
/// records; empty cells are skipped.
pub fn read_characteristics_csv(path: &Path) -> Result<Vec<(UnitId, String, f64)>> {
    characteristics_from_frame(read_csv(path)?)
}

/// Same as `read_characteristics_csv`, from an in-memory string.
pub fn read_characteristics_csv_str(csv: &str) -> Result<Vec<(UnitId, String, f64)>> {
    characteristics_from_frame(read_csv_string(csv)?)
}

fn characteristics_from_frame(df: DataFrame) -> Result<Vec<(UnitId, String, f64)>> {
    let names = df.get_column_names().into_iter().map(|name| name.to_string()).collect::<Vec<_>>();
    ensure!(
        names.iter().any(|name| name == UNIT_ID_COLUMN),
        "[io::csv::read] Characteristics CSV must have a '{UNIT_ID_COLUMN}' column"
    );

    let ids = df.column(UNIT_ID_COLUMN)?.cast(&DataType::UInt32)
        .context("[io::csv::read] Unit ids must be non-negative integers")?;
    let ids = ids.u32()?.into_iter()
        .enumerate()
        .map(|(row, id)| id
            .map(UnitId)
            .with_context(|| format!("[io::csv::read] Missing unit id on row {}", row + 1)))
        .collect::<Result<Vec<_>>>()?;

    let mut records = Vec::with_capacity(ids.len() * names.len().saturating_sub(1));
    for name in names.iter().filter(|name| name.as_str() != UNIT_ID_COLUMN) {
        let values = df.column(name.as_str())?.cast(&DataType::Float64)
            .with_context(|| format!("[io::csv::read] Column '{name}' is not numeric"))?;
        for (&id, value) in ids.iter().zip(values.f64()?.into_iter()) {
            if let Some(value) = value {
                records.push((id, name.clone(), value));
            }
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_one_record_per_filled_cell() {
        let csv = "unit_id,POPTOT,VAP\n1,100,80\n2,150,\n3,200.5,170\n";
        let records = read_characteristics_csv_str(csv).unwrap();

        assert_eq!(records.len(), 5);
        assert!(records.contains(&(UnitId(3), "POPTOT".to_string(), 200.5)));
        assert!(records.contains(&(UnitId(1), "VAP".to_string(), 80.0)));
        assert!(!records.iter().any(|(id, name, _)| *id == UnitId(2) && name == "VAP"));
    }

    #[test]
    fn requires_unit_id_column() {
        let err = read_characteristics_csv_str("geoid,POPTOT\n1,100\n").unwrap_err();
        assert!(err.to_string().contains("unit_id"));
    }

    #[test]
    fn reads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stats.csv");
        std::fs::write(&path, "unit_id,POPTOT\n7,42\n").unwrap();

        let records = read_characteristics_csv(&path).unwrap();
        assert_eq!(records, vec![(UnitId(7), "POPTOT".to_string(), 42.0)]);
    }
}
