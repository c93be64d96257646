//! Hierarchical axis indexes.
//!
//! An `AxisIndex` is an ordered list of named levels, each level a sequence
//! of label values aligned one-per-row (or one-per-column). The full label
//! of a position is the tuple of per-level values at that position. All
//! index operations here are pure: they take levels and produce new levels,
//! never mutating a table.

use crate::error::FormatError;
use crate::scalar::{AxisLabel, Scalar};
use serde::{Deserialize, Serialize};

/// One level of a hierarchical index: a name and one value per position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub name: Option<String>,
    pub values: Vec<Scalar>,
}

impl Level {
    pub fn new(name: Option<String>, values: Vec<Scalar>) -> Self {
        Self { name, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Distinct values in first-occurrence order.
    pub fn distinct(&self) -> Vec<Scalar> {
        let mut seen: Vec<Scalar> = Vec::new();
        for v in &self.values {
            if !seen.contains(v) {
                seen.push(v.clone());
            }
        }
        seen
    }
}

/// A row or column index: one or more aligned levels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisIndex {
    levels: Vec<Level>,
}

impl AxisIndex {
    /// Build from pre-aligned levels.
    ///
    /// # Panics
    /// Panics if no level is given or if level lengths disagree; levels
    /// are assembled internally, so a mismatch is a programmer error.
    pub fn new(levels: Vec<Level>) -> Self {
        assert!(!levels.is_empty(), "an index needs at least one level");
        let len = levels[0].len();
        for level in &levels[1..] {
            assert_eq!(
                level.len(),
                len,
                "index levels must have equal lengths ({} vs {})",
                level.len(),
                len
            );
        }
        Self { levels }
    }

    /// Single flat level.
    pub fn flat(level: Level) -> Self {
        Self::new(vec![level])
    }

    /// Plain positional index `0..len`, unnamed.
    pub fn positional(len: usize) -> Self {
        Self::flat(Level::new(None, (0..len).map(Scalar::from).collect()))
    }

    /// Cartesian product of per-axis label sequences, one level per axis,
    /// the last axis varying fastest (row-major flattening order).
    ///
    /// An empty slice degenerates to a single-position positional index,
    /// matching the single row produced by flattening a rank-1 array.
    pub fn from_product(labels: &[AxisLabel]) -> Self {
        if labels.is_empty() {
            return Self::positional(1);
        }
        let total: usize = labels.iter().map(|l| l.len()).product();

        let mut levels = Vec::with_capacity(labels.len());
        // Number of consecutive repeats of each value at level j is the
        // product of the extents of all inner levels.
        let mut inner: usize = total;
        for label in labels {
            let extent = label.len();
            inner /= extent.max(1);
            let outer = if extent == 0 { 0 } else { total / (extent * inner) };
            let mut values = Vec::with_capacity(total);
            for _ in 0..outer {
                for v in &label.values {
                    for _ in 0..inner {
                        values.push(v.clone());
                    }
                }
            }
            levels.push(Level::new(label.name.clone(), values));
        }
        Self::new(levels)
    }

    /// Number of positions covered by this index.
    pub fn len(&self) -> usize {
        self.levels[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn nlevels(&self) -> usize {
        self.levels.len()
    }

    /// True if this index has more than one level.
    pub fn is_hierarchical(&self) -> bool {
        self.nlevels() > 1
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn level(&self, i: usize) -> &Level {
        &self.levels[i]
    }

    /// Level names in order.
    pub fn names(&self) -> Vec<Option<&str>> {
        self.levels.iter().map(|l| l.name.as_deref()).collect()
    }

    /// Position of the level with the given name.
    pub fn level_index(&self, name: &str) -> Option<usize> {
        self.levels
            .iter()
            .position(|l| l.name.as_deref() == Some(name))
    }

    /// Full label of one position: the tuple of per-level values.
    pub fn key_at(&self, pos: usize) -> Vec<&Scalar> {
        self.levels.iter().map(|l| &l.values[pos]).collect()
    }

    /// Positions where the given level holds `value`, in original order.
    pub fn positions_of(&self, level: usize, value: &Scalar) -> Vec<usize> {
        self.levels[level]
            .values
            .iter()
            .enumerate()
            .filter(|(_, v)| *v == value)
            .map(|(i, _)| i)
            .collect()
    }

    /// New index keeping only the given positions, in the given order.
    pub fn select(&self, positions: &[usize]) -> Self {
        let levels = self
            .levels
            .iter()
            .map(|l| {
                Level::new(
                    l.name.clone(),
                    positions.iter().map(|&p| l.values[p].clone()).collect(),
                )
            })
            .collect();
        Self::new(levels)
    }

    /// New index without level `i`. If it was the only level, the result
    /// degenerates to a positional index of the same length.
    pub fn drop_level(&self, i: usize) -> Self {
        if self.nlevels() == 1 {
            return Self::positional(self.len());
        }
        let levels = self
            .levels
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, l)| l.clone())
            .collect();
        Self::new(levels)
    }

    /// Insert a grouped level: fold the values of level `level` under new
    /// coarser group labels, placing the group level outermost and the
    /// grouped level directly beneath it. Remaining levels keep their
    /// original order.
    ///
    /// Returns the new index together with the source-position gather list
    /// (group order, then member order within each group, then original
    /// position order), which the caller applies to the table values. A
    /// value listed under two groups is selected into both.
    pub fn regrouped(
        &self,
        level: usize,
        groups: &[(Scalar, Vec<Scalar>)],
        name: Option<&str>,
    ) -> Result<(Self, Vec<usize>), FormatError> {
        let grouped = &self.levels[level];

        let mut positions: Vec<usize> = Vec::new();
        let mut group_values: Vec<Scalar> = Vec::new();
        for (group_label, members) in groups {
            for member in members {
                let found = self.positions_of(level, member);
                if found.is_empty() {
                    return Err(FormatError::MissingLabel {
                        value: member.clone(),
                        level: grouped.name.clone(),
                    });
                }
                group_values.extend(found.iter().map(|_| group_label.clone()));
                positions.extend(found);
            }
        }

        let gather = |l: &Level| -> Level {
            Level::new(
                l.name.clone(),
                positions.iter().map(|&p| l.values[p].clone()).collect(),
            )
        };

        let mut levels = Vec::with_capacity(self.nlevels() + 1);
        levels.push(Level::new(name.map(str::to_string), group_values));
        levels.push(gather(grouped));
        for (j, l) in self.levels.iter().enumerate() {
            if j != level {
                levels.push(gather(l));
            }
        }
        Ok((Self::new(levels), positions))
    }
}
