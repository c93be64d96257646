//! Split module - one table artifact per value of an index level.
//!
//! Slices the table with a cross-section per distinct value of the
//! chosen row-index level and writes each slice as its own artifact,
//! named `<stem>_<level>_<value>.otab`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;
use obstable::{Axis, AxisIndex, Level, Scalar, Table};

/// Make a label value safe to embed in a filename.
fn sanitize(value: &Scalar) -> String {
    value
        .to_string()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
            c
        } else {
            '_'
        })
        .collect()
}

/// Split a table artifact by the distinct values of one row-index level.
pub fn run(table_path: &str, level: Option<&str>, output_dir: Option<&str>) -> Result<()> {
    let table_path = Path::new(table_path);
    let table = Table::load(table_path)
        .with_context(|| format!("Failed to load table {}", table_path.display()))?;

    // Resolve the level up front so the error surfaces before any file
    // is written. On a flat index the supplied name is ignored.
    let level_pos = match level {
        _ if !table.index().is_hierarchical() => 0,
        Some(name) => table
            .index()
            .level_index(name)
            .with_context(|| format!("Level {name:?} does not exist on the row index"))?,
        None => anyhow::bail!("--level is required for a hierarchical row index"),
    };
    let level_label = table.index().level(level_pos).name.clone();
    let values = table.index().level(level_pos).distinct();
    info!(
        "splitting {} by level {:?}: {} slices",
        table_path.display(),
        level_label,
        values.len()
    );

    let dir = output_dir
        .map(PathBuf::from)
        .or_else(|| table_path.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    let stem = table_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "table".to_string());
    let level_part = level_label.as_deref().unwrap_or("index");

    for value in &values {
        let slice = table
            .xs(Axis::Rows, level_label.as_deref(), value)
            .with_context(|| format!("Failed to slice value {value}"))?;
        let out_path = dir.join(format!("{stem}_{level_part}_{}.otab", sanitize(value)));
        slice
            .save(&out_path)
            .with_context(|| format!("Failed to write {}", out_path.display()))?;
        println!(
            "Wrote {} ({} rows)",
            out_path.display(),
            slice.nrows()
        );
    }

    // The distinct values themselves, for consumers that only need to
    // know which slices exist.
    let values_path = dir.join(format!("{stem}_{level_part}_values.oidx"));
    AxisIndex::flat(Level::new(level_label, values.clone()))
        .save(&values_path)
        .with_context(|| format!("Failed to write {}", values_path.display()))?;
    println!("Wrote {}", values_path.display());

    println!("Split into {} tables", values.len());
    Ok(())
}
