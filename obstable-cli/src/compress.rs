//! Compress module - table artifact to chunked sparse artifacts.
//!
//! Produces three files per dataset, named after the input stem:
//! `<stem>_values_sparse.ocsc` (the CSC matrix), `<stem>_index.oidx`
//! (row labels), and `<stem>_columns.oidx` (column labels).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;
use obstable::{SparseDType, SparseFrame, Table};

/// The three artifact paths for one dataset stem.
pub struct SparseArtifacts {
    pub matrix: PathBuf,
    pub index: PathBuf,
    pub columns: PathBuf,
}

impl SparseArtifacts {
    pub fn for_table(table_path: &Path, output_dir: Option<&Path>) -> Self {
        let dir = output_dir
            .map(Path::to_path_buf)
            .or_else(|| table_path.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));
        let stem = table_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "table".to_string());
        Self {
            matrix: dir.join(format!("{stem}_values_sparse.ocsc")),
            index: dir.join(format!("{stem}_index.oidx")),
            columns: dir.join(format!("{stem}_columns.oidx")),
        }
    }
}

/// Convert a table artifact to sparse form and write the artifact triple.
pub fn run(
    table_path: &str,
    chunk_size: usize,
    dtype: SparseDType,
    output_dir: Option<&str>,
) -> Result<()> {
    let table_path = Path::new(table_path);
    let table = Table::load(table_path)
        .with_context(|| format!("Failed to load table {}", table_path.display()))?;
    let (rows, cols) = table.shape();
    info!(
        "compressing {} rows x {} columns to {} in chunks of {}",
        rows, cols, dtype, chunk_size
    );

    let frame = SparseFrame::from_table(table, chunk_size, dtype)
        .context("Sparse conversion failed")?;
    let nnz = frame.matrix().nnz();
    let density = frame.matrix().density();

    let artifacts = SparseArtifacts::for_table(table_path, output_dir.map(Path::new));
    if let Some(dir) = output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {dir}"))?;
    }
    let (matrix, row_index, col_index) = frame.into_parts();
    matrix
        .save(&artifacts.matrix)
        .with_context(|| format!("Failed to write {}", artifacts.matrix.display()))?;
    row_index
        .save(&artifacts.index)
        .with_context(|| format!("Failed to write {}", artifacts.index.display()))?;
    col_index
        .save(&artifacts.columns)
        .with_context(|| format!("Failed to write {}", artifacts.columns.display()))?;

    println!(
        "Compressed {} rows x {} columns: {} nonzero (density {:.4})",
        rows, cols, nnz, density
    );
    println!("Wrote {}", artifacts.matrix.display());
    println!("Wrote {}", artifacts.index.display());
    println!("Wrote {}", artifacts.columns.display());
    Ok(())
}
