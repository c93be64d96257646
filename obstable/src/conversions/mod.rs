//! The four shaping conversions: tensor flattening, block stacking,
//! level regrouping, and chunked sparse compression.
//!
//! Each conversion produces or transforms a [`Table`](crate::table::Table);
//! the sparse converter is the terminal step and consumes its input.

pub mod blocks;
pub mod chunked;
pub mod regroup;
pub mod sparse;
pub mod tensor;

pub use blocks::{Block, BlockLabel};
pub use chunked::SparseFrame;
pub use regroup::RegroupSpec;
pub use sparse::{CscData, CscMatrix, SparseDType};
