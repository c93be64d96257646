//! Column-compressed sparse matrices.
//!
//! The terminal form for large mostly-zero tables. Only nonzero cells are
//! stored, compressed by column; labels cannot travel with the sparse
//! form and are persisted separately (see `SparseFrame`).
//!
//! # Example Structure
//! For a 3x4 matrix:
//! ```text
//! [1.0  0.0  2.0  0.0]
//! [0.0  0.0  0.0  3.0]
//! [4.0  5.0  0.0  0.0]
//! ```
//!
//! CSC representation:
//! - values: [1.0, 4.0, 5.0, 2.0, 3.0]
//! - row_indices: [0, 2, 2, 0, 1]
//! - col_ptr: [0, 2, 3, 4, 5]
//! - shape: (3, 4)

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::FormatError;

/// Target storage dtype for sparse values.
///
/// Narrowing to an integer dtype is checked: a value the target cannot
/// represent exactly fails the conversion instead of truncating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SparseDType {
    /// 16-bit signed integer (counts data)
    I16,
    /// 32-bit signed integer
    I32,
    /// 32-bit float
    F32,
    /// 64-bit float (lossless)
    F64,
}

impl SparseDType {
    /// Bytes per stored value.
    pub fn width(&self) -> usize {
        match self {
            Self::I16 => 2,
            Self::I32 | Self::F32 => 4,
            Self::F64 => 8,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Self::I16 | Self::I32)
    }

    /// Stable byte tag used in the persisted artifact.
    pub fn tag(&self) -> u8 {
        match self {
            Self::I16 => 0,
            Self::I32 => 1,
            Self::F32 => 2,
            Self::F64 => 3,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::I16),
            1 => Some(Self::I32),
            2 => Some(Self::F32),
            3 => Some(Self::F64),
            _ => None,
        }
    }
}

impl fmt::Display for SparseDType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::F32 => "f32",
            Self::F64 => "f64",
        };
        f.write_str(name)
    }
}

/// Typed nonzero-value storage, one variant per dtype.
#[derive(Debug, Clone, PartialEq)]
pub enum CscData {
    I16(Vec<i16>),
    I32(Vec<i32>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl CscData {
    pub fn with_capacity(dtype: SparseDType, capacity: usize) -> Self {
        match dtype {
            SparseDType::I16 => Self::I16(Vec::with_capacity(capacity)),
            SparseDType::I32 => Self::I32(Vec::with_capacity(capacity)),
            SparseDType::F32 => Self::F32(Vec::with_capacity(capacity)),
            SparseDType::F64 => Self::F64(Vec::with_capacity(capacity)),
        }
    }

    pub fn dtype(&self) -> SparseDType {
        match self {
            Self::I16(_) => SparseDType::I16,
            Self::I32(_) => SparseDType::I32,
            Self::F32(_) => SparseDType::F32,
            Self::F64(_) => SparseDType::F64,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::I16(v) => v.len(),
            Self::I32(v) => v.len(),
            Self::F32(v) => v.len(),
            Self::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a value, failing fast if the dtype cannot represent it
    /// exactly (integer targets reject fractional, out-of-range, and
    /// non-finite values).
    pub fn push(&mut self, value: f64) -> Result<(), FormatError> {
        let overflow = |dtype| FormatError::DtypeOverflow { value, dtype };
        match self {
            Self::I16(v) => {
                if value.fract() != 0.0 || value < i16::MIN as f64 || value > i16::MAX as f64 {
                    return Err(overflow(SparseDType::I16));
                }
                v.push(value as i16);
            }
            Self::I32(v) => {
                if value.fract() != 0.0 || value < i32::MIN as f64 || value > i32::MAX as f64 {
                    return Err(overflow(SparseDType::I32));
                }
                v.push(value as i32);
            }
            Self::F32(v) => v.push(value as f32),
            Self::F64(v) => v.push(value),
        }
        Ok(())
    }

    /// Stored value at `i`, widened back to f64.
    pub fn get(&self, i: usize) -> f64 {
        match self {
            Self::I16(v) => v[i] as f64,
            Self::I32(v) => v[i] as f64,
            Self::F32(v) => v[i] as f64,
            Self::F64(v) => v[i],
        }
    }

    fn append(&mut self, other: Self) -> Result<(), FormatError> {
        match (self, other) {
            (Self::I16(a), Self::I16(mut b)) => a.append(&mut b),
            (Self::I32(a), Self::I32(mut b)) => a.append(&mut b),
            (Self::F32(a), Self::F32(mut b)) => a.append(&mut b),
            (Self::F64(a), Self::F64(mut b)) => a.append(&mut b),
            (a, b) => {
                return Err(FormatError::DtypeMismatch {
                    left: a.dtype(),
                    right: b.dtype(),
                })
            }
        }
        Ok(())
    }
}

/// Compressed Sparse Column (CSC) matrix.
///
/// values and row_indices are parallel arrays in column-major order;
/// col_ptr provides offsets into them for each column.
#[derive(Debug, Clone, PartialEq)]
pub struct CscMatrix {
    /// Nonzero values in column-major order
    values: CscData,
    /// Row index for each value
    row_indices: Vec<usize>,
    /// Pointers to start of each column (length = num_cols + 1)
    col_ptr: Vec<usize>,
    /// Matrix dimensions (rows, cols)
    shape: (usize, usize),
}

impl CscMatrix {
    /// Create a CSC matrix from pre-built arrays.
    ///
    /// # Panics
    /// Panics if invariants are violated:
    /// - values.len() != row_indices.len()
    /// - col_ptr.len() != num_cols + 1
    /// - col_ptr does not start at 0 or end at values.len()
    pub fn new(
        values: CscData,
        row_indices: Vec<usize>,
        col_ptr: Vec<usize>,
        shape: (usize, usize),
    ) -> Self {
        assert_eq!(
            values.len(),
            row_indices.len(),
            "values and row_indices must have same length"
        );
        assert_eq!(
            col_ptr.len(),
            shape.1 + 1,
            "col_ptr must have length num_cols + 1"
        );
        assert_eq!(*col_ptr.first().unwrap(), 0, "col_ptr must start at 0");
        assert_eq!(
            *col_ptr.last().unwrap(),
            values.len(),
            "col_ptr must end at values.len()"
        );

        Self {
            values,
            row_indices,
            col_ptr,
            shape,
        }
    }

    /// Convert a dense row-major slice to CSC at the target dtype.
    pub fn from_dense(
        data: &[f64],
        shape: (usize, usize),
        dtype: SparseDType,
    ) -> Result<Self, FormatError> {
        let (rows, cols) = shape;
        if data.len() != rows * cols {
            return Err(FormatError::ShapeMismatch(format!(
                "data length {} does not match shape {}x{}",
                data.len(),
                rows,
                cols
            )));
        }
        Self::from_dense_strided(data, rows, cols, cols, dtype)
    }

    /// Convert the first `take` columns of a row-major buffer whose rows
    /// are `stride` wide. This is the per-chunk entry point: the caller
    /// hands the live working buffer and the chunk width.
    pub(crate) fn from_dense_strided(
        data: &[f64],
        rows: usize,
        stride: usize,
        take: usize,
        dtype: SparseDType,
    ) -> Result<Self, FormatError> {
        debug_assert!(take <= stride);
        debug_assert!(data.len() >= rows * stride);

        let mut values = CscData::with_capacity(dtype, 0);
        let mut row_indices = Vec::new();
        let mut col_ptr = Vec::with_capacity(take + 1);
        col_ptr.push(0);

        for c in 0..take {
            for r in 0..rows {
                let v = data[r * stride + c];
                if v != 0.0 {
                    values.push(v)?;
                    row_indices.push(r);
                }
            }
            col_ptr.push(values.len());
        }

        Ok(Self {
            values,
            row_indices,
            col_ptr,
            shape: (rows, take),
        })
    }

    /// Horizontally concatenate sparse blocks, preserving column order.
    ///
    /// All blocks must share the row count and dtype.
    pub fn hstack(blocks: Vec<CscMatrix>) -> Result<Self, FormatError> {
        let mut iter = blocks.into_iter();
        let mut out = iter.next().ok_or_else(|| {
            FormatError::ShapeMismatch("at least one sparse block is required".to_string())
        })?;

        for block in iter {
            if block.shape.0 != out.shape.0 {
                return Err(FormatError::ShapeMismatch(format!(
                    "cannot hstack blocks of {} and {} rows",
                    out.shape.0, block.shape.0
                )));
            }
            let offset = out.values.len();
            out.values.append(block.values)?;
            out.row_indices.extend_from_slice(&block.row_indices);
            out.col_ptr
                .extend(block.col_ptr[1..].iter().map(|p| p + offset));
            out.shape.1 += block.shape.1;
        }
        Ok(out)
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    pub fn dtype(&self) -> SparseDType {
        self.values.dtype()
    }

    /// Number of stored (nonzero) elements.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Ratio of stored to total elements.
    pub fn density(&self) -> f64 {
        let total = self.shape.0 * self.shape.1;
        if total == 0 {
            return 0.0;
        }
        self.nnz() as f64 / total as f64
    }

    pub fn col_ptr(&self) -> &[usize] {
        &self.col_ptr
    }

    pub fn row_indices(&self) -> &[usize] {
        &self.row_indices
    }

    pub fn data(&self) -> &CscData {
        &self.values
    }

    /// Cell value at (row, col), zero if not stored.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        assert!(row < self.shape.0, "row {} out of bounds", row);
        assert!(col < self.shape.1, "column {} out of bounds", col);
        let start = self.col_ptr[col];
        let end = self.col_ptr[col + 1];
        for i in start..end {
            if self.row_indices[i] == row {
                return self.values.get(i);
            }
        }
        0.0
    }

    /// Iterate over stored elements of one column as (row, value) pairs.
    pub fn col_iter(&self, col: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        assert!(col < self.shape.1, "column {} out of bounds", col);
        (self.col_ptr[col]..self.col_ptr[col + 1])
            .map(move |i| (self.row_indices[i], self.values.get(i)))
    }

    /// Expand back to a dense row-major buffer.
    pub fn to_dense(&self) -> Vec<f64> {
        let (rows, cols) = self.shape;
        let mut out = vec![0.0; rows * cols];
        for c in 0..cols {
            for (r, v) in self.col_iter(c) {
                out[r * cols + c] = v;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_dense_basic() {
        let dense = vec![
            1.0, 0.0, 2.0, 0.0, //
            0.0, 0.0, 0.0, 3.0, //
            4.0, 5.0, 0.0, 0.0,
        ];
        let csc = CscMatrix::from_dense(&dense, (3, 4), SparseDType::F64).unwrap();

        assert_eq!(csc.nnz(), 5);
        assert_eq!(csc.col_ptr(), &[0, 2, 3, 4, 5]);
        assert_eq!(csc.row_indices(), &[0, 2, 2, 0, 1]);
        assert_eq!(csc.get(0, 0), 1.0);
        assert_eq!(csc.get(1, 3), 3.0);
        assert_eq!(csc.get(1, 1), 0.0);
    }

    #[test]
    fn test_from_dense_all_zeros() {
        let csc = CscMatrix::from_dense(&[0.0; 12], (3, 4), SparseDType::I16).unwrap();
        assert_eq!(csc.nnz(), 0);
        assert_eq!(csc.col_ptr(), &[0, 0, 0, 0, 0]);
        assert_eq!(csc.density(), 0.0);
    }

    #[test]
    fn test_from_dense_roundtrip() {
        let dense = vec![0.0, 7.0, 0.0, -2.0, 0.0, 9.0];
        let csc = CscMatrix::from_dense(&dense, (2, 3), SparseDType::I32).unwrap();
        assert_eq!(csc.to_dense(), dense);
    }

    #[test]
    fn test_integer_narrowing_overflow() {
        let dense = vec![1.0, 40000.0];
        let err = CscMatrix::from_dense(&dense, (1, 2), SparseDType::I16).unwrap_err();
        assert!(matches!(
            err,
            FormatError::DtypeOverflow {
                dtype: SparseDType::I16,
                ..
            }
        ));
    }

    #[test]
    fn test_integer_narrowing_rejects_fractions() {
        let dense = vec![1.5];
        let err = CscMatrix::from_dense(&dense, (1, 1), SparseDType::I32).unwrap_err();
        assert!(matches!(err, FormatError::DtypeOverflow { .. }));
    }

    #[test]
    fn test_integer_narrowing_rejects_nan() {
        let dense = vec![f64::NAN];
        let err = CscMatrix::from_dense(&dense, (1, 1), SparseDType::I16).unwrap_err();
        assert!(matches!(err, FormatError::DtypeOverflow { .. }));
    }

    #[test]
    fn test_hstack_preserves_column_order() {
        let left = CscMatrix::from_dense(&[1.0, 0.0, 0.0, 2.0], (2, 2), SparseDType::F64).unwrap();
        let right = CscMatrix::from_dense(&[0.0, 3.0], (2, 1), SparseDType::F64).unwrap();
        let stacked = CscMatrix::hstack(vec![left, right]).unwrap();

        assert_eq!(stacked.shape(), (2, 3));
        assert_eq!(stacked.to_dense(), vec![1.0, 0.0, 0.0, 0.0, 2.0, 3.0]);
    }

    #[test]
    fn test_hstack_row_mismatch() {
        let a = CscMatrix::from_dense(&[1.0], (1, 1), SparseDType::F64).unwrap();
        let b = CscMatrix::from_dense(&[1.0, 2.0], (2, 1), SparseDType::F64).unwrap();
        let err = CscMatrix::hstack(vec![a, b]).unwrap_err();
        assert!(matches!(err, FormatError::ShapeMismatch(_)));
    }

    #[test]
    fn test_hstack_dtype_mismatch() {
        let a = CscMatrix::from_dense(&[1.0], (1, 1), SparseDType::F64).unwrap();
        let b = CscMatrix::from_dense(&[1.0], (1, 1), SparseDType::I16).unwrap();
        let err = CscMatrix::hstack(vec![a, b]).unwrap_err();
        assert!(matches!(err, FormatError::DtypeMismatch { .. }));
    }

    #[test]
    fn test_strided_takes_leading_columns() {
        // 2x3 buffer, take the first 2 columns
        let dense = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let csc = CscMatrix::from_dense_strided(&dense, 2, 3, 2, SparseDType::F64).unwrap();
        assert_eq!(csc.shape(), (2, 2));
        assert_eq!(csc.to_dense(), vec![1.0, 2.0, 4.0, 5.0]);
    }

    #[test]
    fn test_nan_survives_float_dtypes() {
        // NaN marks untested condition combinations; it is a stored value
        let csc = CscMatrix::from_dense(&[f64::NAN], (1, 1), SparseDType::F64).unwrap();
        assert_eq!(csc.nnz(), 1);
        assert!(csc.get(0, 0).is_nan());
    }
}
