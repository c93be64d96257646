//! Format module - CSV matrix to table artifact.
//!
//! The expected CSV layout matches exported measurement matrices: the
//! first row holds column labels (its first cell optionally naming the
//! row index), the first column row labels, and every remaining cell a
//! numeric value.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use log::info;
use obstable::{AxisIndex, Level, Scalar, Table};

/// Parse one CSV cell as the most specific scalar kind it fits.
fn parse_label(cell: &str) -> Scalar {
    if let Ok(v) = cell.parse::<i64>() {
        return Scalar::Int(v);
    }
    if let Ok(v) = cell.parse::<f64>() {
        return Scalar::Float(v);
    }
    Scalar::Str(cell.to_string())
}

/// Read a CSV matrix into a labeled table.
pub fn read_csv_table(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Failed to open CSV: {}", path.display()))?;

    let mut records = reader.records();
    let header = records
        .next()
        .context("CSV is empty")?
        .context("Failed to read CSV header")?;
    if header.len() < 2 {
        bail!("CSV needs at least one label column and one value column");
    }

    let index_name = match header.get(0).unwrap_or("").trim() {
        "" => None,
        name => Some(name.to_string()),
    };
    let col_labels: Vec<Scalar> = header.iter().skip(1).map(parse_label).collect();
    let ncols = col_labels.len();

    let mut row_labels: Vec<Scalar> = Vec::new();
    let mut values: Vec<f64> = Vec::new();
    for (line, record) in records.enumerate() {
        let record = record.with_context(|| format!("Failed to read CSV row {}", line + 2))?;
        if record.len() != ncols + 1 {
            bail!(
                "CSV row {} has {} cells, expected {}",
                line + 2,
                record.len(),
                ncols + 1
            );
        }
        row_labels.push(parse_label(record.get(0).unwrap_or("")));
        for cell in record.iter().skip(1) {
            let v: f64 = cell.trim().parse().with_context(|| {
                format!("Non-numeric value {:?} at CSV row {}", cell, line + 2)
            })?;
            values.push(v);
        }
    }
    let nrows = row_labels.len();
    if nrows == 0 {
        bail!("CSV has no data rows");
    }

    let index = AxisIndex::flat(Level::new(index_name, row_labels));
    let columns = AxisIndex::flat(Level::new(None, col_labels));
    Table::new(values, (nrows, ncols), index, columns).context("CSV matrix is malformed")
}

/// Derive `<stem>.otab` next to the input when no output is given.
fn default_output(csv_path: &Path) -> PathBuf {
    csv_path.with_extension("otab")
}

/// Import a CSV matrix and persist it as a table artifact.
pub fn run(csv_path: &str, output: Option<&str>, transpose: bool) -> Result<()> {
    let csv_path = Path::new(csv_path);
    let mut table = read_csv_table(csv_path)?;
    if transpose {
        table = table.transposed();
    }
    let (rows, cols) = table.shape();
    info!("imported {}: {} rows x {} columns", csv_path.display(), rows, cols);

    let out_path = output
        .map(PathBuf::from)
        .unwrap_or_else(|| default_output(csv_path));
    table
        .save(&out_path)
        .with_context(|| format!("Failed to write {}", out_path.display()))?;

    println!("Formatted {} rows x {} columns", rows, cols);
    println!("Wrote {}", out_path.display());
    Ok(())
}
