//! Error taxonomy for the converters.
//!
//! Every variant corresponds to a caller input error detected eagerly,
//! before any transformation work begins. None of these are transient;
//! there is no retry path.

use crate::conversions::SparseDType;
use crate::scalar::Scalar;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    /// Array/axis/label length disagreement.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Observable axis out of range, or colliding with a mapped axis.
    #[error("invalid axis: {0}")]
    InvalidAxis(String),

    /// Names count disagreeing with observable or tuple-level count.
    #[error("name count mismatch: {0}")]
    NameCountMismatch(String),

    /// Regroup level name not found on a hierarchical axis.
    #[error("level {0:?} does not exist on this axis")]
    MissingLevel(String),

    /// Regroup on a hierarchical axis without naming the level to group.
    #[error("axis has multiple levels; a level name is required")]
    AmbiguousAxis,

    /// Blocks with differing column counts handed to the stacker.
    #[error("column count mismatch: {0}")]
    ColumnCountMismatch(String),

    /// A label value listed in a regroup spec or cross-section is absent
    /// from the targeted level.
    #[error("label {value} not found at level {level:?}")]
    MissingLabel {
        value: Scalar,
        level: Option<String>,
    },

    /// A value the target sparse dtype cannot represent exactly.
    #[error("value {value} cannot be represented as {dtype}")]
    DtypeOverflow { value: f64, dtype: SparseDType },

    /// Sparse blocks with differing dtypes handed to hstack.
    #[error("dtype mismatch: {left} vs {right}")]
    DtypeMismatch {
        left: SparseDType,
        right: SparseDType,
    },

    /// Tensor extraction failed (non-2D handling, dtype conversion).
    #[error("tensor extraction failed: {0}")]
    Tensor(#[from] candle_core::Error),
}
