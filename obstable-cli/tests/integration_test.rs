//! Integration tests for obstable-cli on a small synthetic count matrix.

use std::fs;
use std::path::Path;
use std::process::Command;

use obstable::{ArtifactKind, AxisIndex, CscMatrix, OtabHeader, Table};

fn obstable_cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_obstable"))
}

/// A 4x3 count matrix with string row labels and a named index column.
fn write_fixture_csv(dir: &Path) -> std::path::PathBuf {
    let csv_path = dir.join("counts.csv");
    fs::write(
        &csv_path,
        "gene,cell_a,cell_b,cell_c\n\
         ACTB,0,3,0\n\
         GAPDH,2,0,0\n\
         MYC,0,0,5\n\
         TP53,1,0,0\n",
    )
    .unwrap();
    csv_path
}

#[test]
fn test_format_writes_table_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = write_fixture_csv(dir.path());

    let output = obstable_cli()
        .args(["format", "--csv", csv_path.to_str().unwrap()])
        .output()
        .expect("Failed to run obstable");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "format failed: {}", stdout);
    assert!(stdout.contains("Formatted 4 rows x 3 columns"));

    let table_path = dir.path().join("counts.otab");
    assert!(table_path.exists(), "counts.otab not created");

    let table = Table::load(&table_path).unwrap();
    assert_eq!(table.shape(), (4, 3));
    assert_eq!(table.index().names(), vec![Some("gene")]);
    assert_eq!(table.get(2, 2), 5.0);
}

#[test]
fn test_format_transpose() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = write_fixture_csv(dir.path());
    let out_path = dir.path().join("cells.otab");

    let output = obstable_cli()
        .args([
            "format",
            "--csv",
            csv_path.to_str().unwrap(),
            "--output",
            out_path.to_str().unwrap(),
            "--transpose",
        ])
        .output()
        .expect("Failed to run obstable");
    assert!(output.status.success());

    let table = Table::load(&out_path).unwrap();
    assert_eq!(table.shape(), (3, 4));
    assert_eq!(table.columns().names(), vec![Some("gene")]);
}

#[test]
fn test_compress_writes_artifact_triple() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = write_fixture_csv(dir.path());
    obstable_cli()
        .args(["format", "--csv", csv_path.to_str().unwrap()])
        .output()
        .expect("Failed to run obstable format");

    let table_path = dir.path().join("counts.otab");
    let output = obstable_cli()
        .args([
            "compress",
            "--table",
            table_path.to_str().unwrap(),
            "--chunk-size",
            "2",
        ])
        .output()
        .expect("Failed to run obstable compress");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        output.status.success(),
        "compress failed:\nstdout: {}\nstderr: {}",
        stdout,
        stderr
    );
    assert!(stdout.contains("4 nonzero"));

    let matrix_path = dir.path().join("counts_values_sparse.ocsc");
    let index_path = dir.path().join("counts_index.oidx");
    let columns_path = dir.path().join("counts_columns.oidx");
    assert!(matrix_path.exists(), "sparse matrix artifact not created");
    assert!(index_path.exists(), "row index artifact not created");
    assert!(columns_path.exists(), "column index artifact not created");

    // The sparse values agree with the CSV
    let matrix = CscMatrix::load(&matrix_path).unwrap();
    assert_eq!(matrix.shape(), (4, 3));
    assert_eq!(matrix.nnz(), 4);
    assert_eq!(matrix.get(0, 1), 3.0);
    assert_eq!(matrix.get(3, 0), 1.0);

    // The labels survive alongside it
    let row_index = AxisIndex::load(&index_path).unwrap();
    assert_eq!(row_index.len(), 4);
    assert_eq!(row_index.names(), vec![Some("gene")]);
}

#[test]
fn test_compress_rejects_overflowing_dtype() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("big.csv");
    fs::write(&csv_path, "gene,a\nACTB,70000\n").unwrap();
    obstable_cli()
        .args(["format", "--csv", csv_path.to_str().unwrap()])
        .output()
        .expect("Failed to run obstable format");

    let table_path = dir.path().join("big.otab");
    let output = obstable_cli()
        .args(["compress", "--table", table_path.to_str().unwrap()])
        .output()
        .expect("Failed to run obstable compress");
    assert!(!output.status.success(), "i16 compression of 70000 must fail");

    // Nothing half-written
    assert!(!dir.path().join("big_values_sparse.ocsc").exists());
}

#[test]
fn test_split_by_row_label() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = write_fixture_csv(dir.path());
    obstable_cli()
        .args(["format", "--csv", csv_path.to_str().unwrap()])
        .output()
        .expect("Failed to run obstable format");

    let table_path = dir.path().join("counts.otab");
    let out_dir = dir.path().join("split");
    let output = obstable_cli()
        .args([
            "split",
            "--table",
            table_path.to_str().unwrap(),
            "--output-dir",
            out_dir.to_str().unwrap(),
        ])
        .output()
        .expect("Failed to run obstable split");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "split failed: {}", stdout);
    assert!(stdout.contains("Split into 4 tables"));

    let myc = Table::load(&out_dir.join("counts_gene_MYC.otab")).unwrap();
    assert_eq!(myc.shape(), (1, 3));
    assert_eq!(myc.get(0, 2), 5.0);

    let values = AxisIndex::load(&out_dir.join("counts_gene_values.oidx")).unwrap();
    assert_eq!(values.len(), 4);
    assert_eq!(values.level(0).values[0], "ACTB".into());
}

#[test]
fn test_artifact_headers_distinguish_kinds() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = write_fixture_csv(dir.path());
    obstable_cli()
        .args(["format", "--csv", csv_path.to_str().unwrap()])
        .output()
        .expect("Failed to run obstable format");
    let table_path = dir.path().join("counts.otab");
    obstable_cli()
        .args(["compress", "--table", table_path.to_str().unwrap()])
        .output()
        .expect("Failed to run obstable compress");

    let mut table_file = fs::File::open(&table_path).unwrap();
    let header = OtabHeader::read_from(&mut table_file).unwrap();
    assert_eq!(header.kind, ArtifactKind::Table);
    assert_eq!(header.shape(), (4, 3));

    let mut sparse_file = fs::File::open(dir.path().join("counts_values_sparse.ocsc")).unwrap();
    let header = OtabHeader::read_from(&mut sparse_file).unwrap();
    assert_eq!(header.kind, ArtifactKind::Sparse);
}
