//! Obstable CLI - Shape measurement CSVs into labeled tables and sparse artifacts.

use clap::{Parser, Subcommand, ValueEnum};
use obstable::SparseDType;

mod compress;
mod import;
mod split;

#[derive(Parser)]
#[command(name = "obstable")]
#[command(about = "CLI tool for shaping measurement data into labeled table artifacts")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DTypeArg {
    I16,
    I32,
    F32,
    F64,
}

impl From<DTypeArg> for SparseDType {
    fn from(arg: DTypeArg) -> Self {
        match arg {
            DTypeArg::I16 => SparseDType::I16,
            DTypeArg::I32 => SparseDType::I32,
            DTypeArg::F32 => SparseDType::F32,
            DTypeArg::F64 => SparseDType::F64,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Import a CSV matrix as a labeled table artifact
    Format {
        /// Path to the CSV file (first row column labels, first column row labels)
        #[arg(short, long)]
        csv: String,

        /// Output path for the table artifact
        #[arg(short, long)]
        output: Option<String>,

        /// Transpose the matrix before writing (observables as columns)
        #[arg(long)]
        transpose: bool,
    },

    /// Split a table artifact into one table per value of an index level
    Split {
        /// Path to the table artifact
        #[arg(short, long)]
        table: String,

        /// Index level to split on (required for hierarchical indexes)
        #[arg(short, long)]
        level: Option<String>,

        /// Directory for the split artifacts
        #[arg(short, long)]
        output_dir: Option<String>,
    },

    /// Convert a table artifact to chunked sparse form
    Compress {
        /// Path to the table artifact
        #[arg(short, long)]
        table: String,

        /// Columns converted per chunk
        #[arg(long, default_value_t = 500)]
        chunk_size: usize,

        /// Storage dtype for the sparse values
        #[arg(long, value_enum, default_value = "i16")]
        dtype: DTypeArg,

        /// Output directory for the sparse artifacts
        #[arg(short, long)]
        output_dir: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Format {
            csv,
            output,
            transpose,
        } => {
            import::run(&csv, output.as_deref(), transpose)?;
        }
        Commands::Split {
            table,
            level,
            output_dir,
        } => {
            split::run(&table, level.as_deref(), output_dir.as_deref())?;
        }
        Commands::Compress {
            table,
            chunk_size,
            dtype,
            output_dir,
        } => {
            compress::run(&table, chunk_size, dtype.into(), output_dir.as_deref())?;
        }
    }

    Ok(())
}
