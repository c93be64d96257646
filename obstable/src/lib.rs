//! Obstable - Labeled-table shaping for dense measurement arrays.
//!
//! Takes n-dimensional measurement data (one axis of observables, the
//! rest experimental conditions) and reshapes it into 2D tables with
//! hierarchical row/column labels, then optionally into compressed
//! sparse column form for storage.
//!
//! # Conversions
//! - Tensor flattening: n-d labeled array to a 2D table, condition axes
//!   folded into a hierarchical row index
//! - Block stacking: pre-split 2D condition blocks stacked into one table
//! - Level regrouping: fold values of an index level under coarser labels
//! - Chunked sparse: memory-bounded dense-to-CSC conversion
//!
//! # Usage
//! ```ignore
//! use obstable::{AxisLabel, SparseDType, SparseFrame, Table};
//!
//! // 3 observables over 4 temperatures and 5 pressures
//! let labels = [(1, AxisLabel::new("Temperature", temps))].into_iter().collect();
//! let table = Table::from_labeled(&data, &[3, 4, 5], &labels, 0, None)?;
//!
//! // Compress 500 columns at a time
//! let frame = SparseFrame::from_table(table, 500, SparseDType::I16)?;
//! ```

pub mod conversions;
pub mod error;
pub mod formats;
pub mod index;
pub mod io;
pub mod scalar;
pub mod table;


// Re-exports
pub use conversions::{Block, BlockLabel, CscData, CscMatrix, RegroupSpec, SparseDType, SparseFrame};
pub use error::FormatError;
pub use formats::{ArtifactKind, OtabHeader, OTAB_MAGIC, OTAB_VERSION};
pub use index::{AxisIndex, Level};
pub use scalar::{AxisLabel, Scalar};
pub use table::{Axis, Table};
