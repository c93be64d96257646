//! The 2D labeled table.
//!
//! A `Table` is row-major f64 storage plus one `AxisIndex` per axis.
//! Tables come out of the converters in `conversions` and are immutable;
//! every operation returns a new table. The one deliberately destructive
//! path is the chunked sparse conversion, which takes the table by value.

use crate::error::FormatError;
use crate::index::AxisIndex;
use crate::scalar::Scalar;

/// Which axis of a table an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Rows,
    Columns,
}

/// Dense 2D values with hierarchical row and column labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Row-major values, length rows * cols
    values: Vec<f64>,
    /// (rows, cols)
    shape: (usize, usize),
    /// Row labels, one position per row
    index: AxisIndex,
    /// Column labels, one position per column
    columns: AxisIndex,
}

impl Table {
    /// Assemble a table, validating the label/shape invariants.
    pub fn new(
        values: Vec<f64>,
        shape: (usize, usize),
        index: AxisIndex,
        columns: AxisIndex,
    ) -> Result<Self, FormatError> {
        let (rows, cols) = shape;
        if values.len() != rows * cols {
            return Err(FormatError::ShapeMismatch(format!(
                "value count {} does not match shape {}x{}",
                values.len(),
                rows,
                cols
            )));
        }
        if index.len() != rows {
            return Err(FormatError::ShapeMismatch(format!(
                "row label length {} does not match row count {}",
                index.len(),
                rows
            )));
        }
        if columns.len() != cols {
            return Err(FormatError::ShapeMismatch(format!(
                "column label length {} does not match column count {}",
                columns.len(),
                cols
            )));
        }
        Ok(Self {
            values,
            shape,
            index,
            columns,
        })
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.shape.0
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.shape.1
    }

    /// Cell value at (row, col).
    ///
    /// # Panics
    /// Panics if out of bounds.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        assert!(row < self.shape.0, "row {} out of bounds", row);
        assert!(col < self.shape.1, "column {} out of bounds", col);
        self.values[row * self.shape.1 + col]
    }

    /// One row as a contiguous slice.
    pub fn row(&self, row: usize) -> &[f64] {
        assert!(row < self.shape.0, "row {} out of bounds", row);
        let start = row * self.shape.1;
        &self.values[start..start + self.shape.1]
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn index(&self) -> &AxisIndex {
        &self.index
    }

    pub fn columns(&self) -> &AxisIndex {
        &self.columns
    }

    /// Decompose into raw storage and the two indexes.
    ///
    /// This is the entry point for memory-bounded consumers: once the
    /// parts are taken, the table no longer exists and its pieces can be
    /// released independently.
    pub fn into_parts(self) -> (Vec<f64>, (usize, usize), AxisIndex, AxisIndex) {
        (self.values, self.shape, self.index, self.columns)
    }

    /// New table keeping the given rows, in the given order.
    pub fn select_rows(&self, positions: &[usize]) -> Self {
        let cols = self.shape.1;
        let mut values = Vec::with_capacity(positions.len() * cols);
        for &p in positions {
            values.extend_from_slice(self.row(p));
        }
        Self {
            values,
            shape: (positions.len(), cols),
            index: self.index.select(positions),
            columns: self.columns.clone(),
        }
    }

    /// New table keeping the given columns, in the given order.
    pub fn select_cols(&self, positions: &[usize]) -> Self {
        let (rows, cols) = self.shape;
        let mut values = Vec::with_capacity(rows * positions.len());
        for r in 0..rows {
            for &p in positions {
                values.push(self.values[r * cols + p]);
            }
        }
        Self {
            values,
            shape: (rows, positions.len()),
            index: self.index.clone(),
            columns: self.columns.select(positions),
        }
    }

    /// Transposed copy: rows become columns, indexes swap.
    pub fn transposed(&self) -> Self {
        let (rows, cols) = self.shape;
        let mut values = vec![0.0; rows * cols];
        for r in 0..rows {
            for c in 0..cols {
                values[c * rows + r] = self.values[r * cols + c];
            }
        }
        Self {
            values,
            shape: (cols, rows),
            index: self.columns.clone(),
            columns: self.index.clone(),
        }
    }

    /// Cross-section: the sub-table where `level` on the given axis holds
    /// `value`, with that level dropped from the result.
    ///
    /// On a flat axis the level name is ignored (there is only one level
    /// to match against) and the result gets a positional index.
    pub fn xs(
        &self,
        axis: Axis,
        level: Option<&str>,
        value: &Scalar,
    ) -> Result<Self, FormatError> {
        let idx = match axis {
            Axis::Rows => &self.index,
            Axis::Columns => &self.columns,
        };
        let level_pos = resolve_level(idx, level)?;
        let positions = idx.positions_of(level_pos, value);
        if positions.is_empty() {
            return Err(FormatError::MissingLabel {
                value: value.clone(),
                level: idx.level(level_pos).name.clone(),
            });
        }
        let mut out = match axis {
            Axis::Rows => self.select_rows(&positions),
            Axis::Columns => self.select_cols(&positions),
        };
        match axis {
            Axis::Rows => out.index = out.index.drop_level(level_pos),
            Axis::Columns => out.columns = out.columns.drop_level(level_pos),
        }
        Ok(out)
    }

    pub(crate) fn replace_index(&mut self, axis: Axis, index: AxisIndex) {
        match axis {
            Axis::Rows => {
                assert_eq!(index.len(), self.shape.0);
                self.index = index;
            }
            Axis::Columns => {
                assert_eq!(index.len(), self.shape.1);
                self.columns = index;
            }
        }
    }
}

/// Resolve which level an operation targets on an axis.
///
/// Flat axis: the single level, any supplied name ignored. Hierarchical
/// axis: the name is required (AmbiguousAxis) and must exist (MissingLevel).
pub(crate) fn resolve_level(
    idx: &AxisIndex,
    level: Option<&str>,
) -> Result<usize, FormatError> {
    if !idx.is_hierarchical() {
        return Ok(0);
    }
    let name = level.ok_or(FormatError::AmbiguousAxis)?;
    idx.level_index(name)
        .ok_or_else(|| FormatError::MissingLevel(name.to_string()))
}
