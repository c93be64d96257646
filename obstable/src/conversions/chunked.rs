//! Memory-bounded dense to sparse conversion.
//!
//! Converting a large dense table to CSC in one shot briefly holds both
//! representations in memory. The chunked converter takes the table by
//! value, encodes `chunksize` columns at a time, and drains the encoded
//! columns from the dense buffer before moving on, so the dense side
//! shrinks as the sparse side grows. Peak overhead beyond the dense
//! buffer is one chunk's worth of sparse data plus the accumulated
//! blocks.

use log::debug;

use crate::conversions::sparse::{CscMatrix, SparseDType};
use crate::error::FormatError;
use crate::index::AxisIndex;
use crate::table::Table;

/// A CSC matrix together with the row and column indexes of the table it
/// was converted from. The labels cannot live inside the sparse format,
/// so they travel alongside it.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseFrame {
    matrix: CscMatrix,
    row_index: AxisIndex,
    col_index: AxisIndex,
}

impl SparseFrame {
    /// Convert a dense table to CSC, `chunksize` columns at a time.
    ///
    /// The table is consumed: its dense buffer is progressively truncated
    /// as columns are encoded. The result is identical to a whole-table
    /// conversion for any positive `chunksize`.
    pub fn from_table(
        table: Table,
        chunksize: usize,
        dtype: SparseDType,
    ) -> Result<Self, FormatError> {
        if chunksize == 0 {
            return Err(FormatError::ShapeMismatch(
                "chunksize must be at least 1".to_string(),
            ));
        }

        let (mut values, (rows, cols), row_index, col_index) = table.into_parts();
        debug!(
            "converting {}x{} table to {} sparse in chunks of {} columns",
            rows, cols, dtype, chunksize
        );

        if cols == 0 {
            let matrix = CscMatrix::from_dense(&[], (rows, 0), dtype)?;
            return Ok(Self {
                matrix,
                row_index,
                col_index,
            });
        }

        let mut blocks = Vec::with_capacity(cols.div_ceil(chunksize));
        let mut remaining = cols;
        while remaining > 0 {
            let take = chunksize.min(remaining);
            blocks.push(CscMatrix::from_dense_strided(
                &values, rows, remaining, take, dtype,
            )?);

            // Drop the encoded columns: shift each row's tail left, then
            // shrink the buffer so the memory is actually released.
            let stride = remaining;
            let new_stride = remaining - take;
            for r in 0..rows {
                let src = r * stride + take;
                let dst = r * new_stride;
                values.copy_within(src..src + new_stride, dst);
            }
            values.truncate(rows * new_stride);
            values.shrink_to_fit();
            remaining = new_stride;
        }

        let matrix = CscMatrix::hstack(blocks)?;
        debug!(
            "sparse conversion done: {} nonzero of {} cells (density {:.4})",
            matrix.nnz(),
            rows * cols,
            matrix.density()
        );
        Ok(Self {
            matrix,
            row_index,
            col_index,
        })
    }

    pub fn matrix(&self) -> &CscMatrix {
        &self.matrix
    }

    pub fn row_index(&self) -> &AxisIndex {
        &self.row_index
    }

    pub fn col_index(&self) -> &AxisIndex {
        &self.col_index
    }

    pub fn into_parts(self) -> (CscMatrix, AxisIndex, AxisIndex) {
        (self.matrix, self.row_index, self.col_index)
    }
}
