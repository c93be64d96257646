//! Level regrouping.
//!
//! Adds a coarser categorical level to a table's row or column index by
//! folding selected values of an existing level under new group labels.
//! Implemented as pure index-level algebra (`AxisIndex::regrouped`): the
//! new index and a position gather list are computed first, then the
//! values are gathered once. No intermediate slices are materialized.

use crate::error::FormatError;
use crate::scalar::Scalar;
use crate::table::{resolve_level, Axis, Table};

/// Ordered mapping from new group label to the existing level values
/// folded under it. Iteration order determines the order of groups in
/// the result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegroupSpec {
    groups: Vec<(Scalar, Vec<Scalar>)>,
}

impl RegroupSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a group. Builder-style, so specs read as a table of groups.
    pub fn group(mut self, label: impl Into<Scalar>, members: Vec<Scalar>) -> Self {
        self.groups.push((label.into(), members));
        self
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Scalar, Vec<Scalar>)> {
        self.groups.iter()
    }

    pub(crate) fn as_slice(&self) -> &[(Scalar, Vec<Scalar>)] {
        &self.groups
    }
}

impl From<Vec<(Scalar, Vec<Scalar>)>> for RegroupSpec {
    fn from(groups: Vec<(Scalar, Vec<Scalar>)>) -> Self {
        Self { groups }
    }
}

impl Table {
    /// Regroup one level of the row or column index under new coarser
    /// labels, returning a new table.
    ///
    /// The new group level is inserted outermost, the grouped level kept
    /// directly beneath it, and all other levels follow in their original
    /// order. Rows (or columns) are reordered to (group, member, original
    /// position) order; positions selected by more than one group appear
    /// once per group.
    ///
    /// On a hierarchical axis `level` is required ([`FormatError::AmbiguousAxis`]
    /// if absent, [`FormatError::MissingLevel`] if unknown); on a flat
    /// axis it is ignored and the single level is the one grouped.
    pub fn regroup(
        &self,
        axis: Axis,
        level: Option<&str>,
        spec: &RegroupSpec,
        name: Option<&str>,
    ) -> Result<Self, FormatError> {
        let idx = match axis {
            Axis::Rows => self.index(),
            Axis::Columns => self.columns(),
        };
        let level_pos = resolve_level(idx, level)?;
        let (new_index, positions) = idx.regrouped(level_pos, spec.as_slice(), name)?;

        let mut out = match axis {
            Axis::Rows => self.select_rows(&positions),
            Axis::Columns => self.select_cols(&positions),
        };
        out.replace_index(axis, new_index);
        Ok(out)
    }
}
