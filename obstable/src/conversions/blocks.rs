//! Block stacking.
//!
//! Builds one table out of pre-split 2D blocks, each block tagged by the
//! condition label (scalar or tuple) it was measured under. Within each
//! block, rows get an implicit "Sample" index assigned at stacking time.

use crate::error::FormatError;
use crate::index::{AxisIndex, Level};
use crate::scalar::Scalar;
use crate::table::Table;

/// A pre-split 2D chunk of samples sharing one condition label.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    values: Vec<f64>,
    shape: (usize, usize),
}

impl Block {
    /// Row-major 2D block.
    pub fn new(values: Vec<f64>, shape: (usize, usize)) -> Result<Self, FormatError> {
        if values.len() != shape.0 * shape.1 {
            return Err(FormatError::ShapeMismatch(format!(
                "block value count {} does not match shape {}x{}",
                values.len(),
                shape.0,
                shape.1
            )));
        }
        Ok(Self { values, shape })
    }

    pub fn nrows(&self) -> usize {
        self.shape.0
    }

    pub fn ncols(&self) -> usize {
        self.shape.1
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// The condition label identifying one block.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockLabel {
    /// One identifying property (e.g. a temperature)
    Scalar(Scalar),
    /// Several identifying properties (e.g. temperature and pressure)
    Tuple(Vec<Scalar>),
}

impl BlockLabel {
    /// Number of index levels this label contributes.
    pub fn nlevels(&self) -> usize {
        match self {
            BlockLabel::Scalar(_) => 1,
            BlockLabel::Tuple(values) => values.len(),
        }
    }

    /// Value at label level `k`.
    pub fn value(&self, k: usize) -> &Scalar {
        match self {
            BlockLabel::Scalar(v) => {
                assert_eq!(k, 0, "scalar label has a single level");
                v
            }
            BlockLabel::Tuple(values) => &values[k],
        }
    }
}

impl From<Scalar> for BlockLabel {
    fn from(v: Scalar) -> Self {
        BlockLabel::Scalar(v)
    }
}

impl From<Vec<Scalar>> for BlockLabel {
    fn from(values: Vec<Scalar>) -> Self {
        BlockLabel::Tuple(values)
    }
}

impl Table {
    /// Stack 2D blocks vertically into one table.
    ///
    /// Each block's rows are tagged with its label levels plus an
    /// innermost "Sample" level counting `0..rows` within the block. When
    /// every block holds exactly one row the Sample level is redundant
    /// and dropped. `names` names the label levels; `observables` names
    /// the columns (shared by all blocks).
    pub fn from_blocks(
        blocks: &[Block],
        labels: &[BlockLabel],
        observables: Option<Vec<Scalar>>,
        names: Option<&[&str]>,
    ) -> Result<Self, FormatError> {
        if blocks.is_empty() {
            return Err(FormatError::ShapeMismatch(
                "at least one block is required".to_string(),
            ));
        }
        let ncols = blocks[0].ncols();
        for (i, block) in blocks.iter().enumerate() {
            if block.ncols() != ncols {
                return Err(FormatError::ColumnCountMismatch(format!(
                    "block 0 has {} columns but block {} has {}",
                    ncols,
                    i,
                    block.ncols()
                )));
            }
        }
        if let Some(ref obs) = observables {
            if obs.len() != ncols {
                return Err(FormatError::NameCountMismatch(format!(
                    "{} observable names for blocks of {} columns",
                    obs.len(),
                    ncols
                )));
            }
        }
        if labels.len() != blocks.len() {
            return Err(FormatError::ShapeMismatch(format!(
                "{} labels for {} blocks",
                labels.len(),
                blocks.len()
            )));
        }
        let nlevels = labels[0].nlevels();
        for (i, label) in labels.iter().enumerate() {
            if label.nlevels() != nlevels {
                return Err(FormatError::ShapeMismatch(format!(
                    "label 0 has {} levels but label {} has {}",
                    nlevels,
                    i,
                    label.nlevels()
                )));
            }
        }
        if let Some(names) = names {
            if names.len() != nlevels {
                return Err(FormatError::NameCountMismatch(format!(
                    "{} level names for labels of {} levels",
                    names.len(),
                    nlevels
                )));
            }
        }

        let total_rows: usize = blocks.iter().map(Block::nrows).sum();
        let mut values = Vec::with_capacity(total_rows * ncols);
        let mut label_levels: Vec<Vec<Scalar>> = vec![Vec::with_capacity(total_rows); nlevels];
        let mut samples: Vec<Scalar> = Vec::with_capacity(total_rows);

        for (block, label) in blocks.iter().zip(labels) {
            values.extend_from_slice(block.values());
            for (k, level_values) in label_levels.iter_mut().enumerate() {
                level_values.extend(std::iter::repeat(label.value(k).clone()).take(block.nrows()));
            }
            samples.extend((0..block.nrows()).map(Scalar::from));
        }

        let mut levels: Vec<Level> = label_levels
            .into_iter()
            .enumerate()
            .map(|(k, level_values)| {
                Level::new(names.map(|n| n[k].to_string()), level_values)
            })
            .collect();
        let sample_level = Level::new(Some("Sample".to_string()), samples);

        // A Sample level with a single distinct value means every block
        // had exactly one row; it carries no information then.
        if sample_level.distinct().len() > 1 {
            levels.push(sample_level);
        }

        let index = AxisIndex::new(levels);
        let columns = AxisIndex::flat(Level::new(
            None,
            observables.unwrap_or_else(|| (0..ncols).map(Scalar::from).collect()),
        ));
        Table::new(values, (total_rows, ncols), index, columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(rows: usize, cols: usize, fill: f64) -> Block {
        Block::new(vec![fill; rows * cols], (rows, cols)).unwrap()
    }

    fn scalar_labels() -> Vec<BlockLabel> {
        vec![
            Scalar::Int(2).into(),
            Scalar::Int(4).into(),
            Scalar::Int(6).into(),
        ]
    }

    #[test]
    fn test_scalar_labels_two_level_index() {
        let blocks = vec![block(5, 5, 1.0), block(5, 5, 2.0), block(5, 5, 3.0)];
        let table = Table::from_blocks(&blocks, &scalar_labels(), None, None).unwrap();

        assert_eq!(table.shape(), (15, 5));
        assert_eq!(table.index().names(), vec![None, Some("Sample")]);
        assert_eq!(table.index().level(0).values[7], Scalar::Int(4));
        assert_eq!(table.index().level(1).values[7], Scalar::Int(2));
        assert_eq!(table.get(7, 0), 2.0);
    }

    #[test]
    fn test_tuple_labels_with_names() {
        let blocks = vec![block(2, 3, 1.0), block(2, 3, 2.0)];
        let labels: Vec<BlockLabel> = vec![
            vec![Scalar::Int(2), Scalar::Int(101)].into(),
            vec![Scalar::Int(4), Scalar::Int(201)].into(),
        ];
        let table = Table::from_blocks(
            &blocks,
            &labels,
            Some(vec!["A".into(), "B".into(), "C".into()]),
            Some(&["Temperature", "Pressure"]),
        )
        .unwrap();

        assert_eq!(table.shape(), (4, 3));
        assert_eq!(
            table.index().names(),
            vec![Some("Temperature"), Some("Pressure"), Some("Sample")]
        );
        assert_eq!(table.index().level(1).values[3], Scalar::Int(201));
        assert_eq!(table.columns().level(0).values[1], "B".into());
        assert_eq!(table.columns().names(), vec![None]);
    }

    #[test]
    fn test_single_row_blocks_drop_sample_level() {
        let blocks = vec![block(1, 5, 1.0), block(1, 5, 2.0), block(1, 5, 3.0)];
        let table = Table::from_blocks(&blocks, &scalar_labels(), None, None).unwrap();

        assert_eq!(table.shape(), (3, 5));
        assert_eq!(table.index().nlevels(), 1);
        assert_eq!(table.index().names(), vec![None]);
        assert_eq!(table.index().level(0).values[2], Scalar::Int(6));
    }

    #[test]
    fn test_column_count_mismatch() {
        let blocks = vec![block(5, 5, 1.0), block(5, 4, 2.0), block(5, 5, 3.0)];
        let err = Table::from_blocks(&blocks, &scalar_labels(), None, None).unwrap_err();
        assert!(matches!(err, FormatError::ColumnCountMismatch(_)));
    }

    #[test]
    fn test_label_count_mismatch() {
        let blocks = vec![block(5, 5, 1.0), block(5, 5, 2.0)];
        let err = Table::from_blocks(&blocks, &scalar_labels(), None, None).unwrap_err();
        assert!(matches!(err, FormatError::ShapeMismatch(_)));
    }

    #[test]
    fn test_tuple_name_count_mismatch() {
        let blocks = vec![block(2, 3, 1.0), block(2, 3, 2.0)];
        let labels: Vec<BlockLabel> = vec![
            vec![Scalar::Int(2), Scalar::Int(101)].into(),
            vec![Scalar::Int(4), Scalar::Int(201)].into(),
        ];
        let err = Table::from_blocks(&blocks, &labels, None, Some(&["Temperature"])).unwrap_err();
        assert!(matches!(err, FormatError::NameCountMismatch(_)));
    }

    #[test]
    fn test_observable_name_count_mismatch() {
        let blocks = vec![block(2, 3, 1.0), block(2, 3, 2.0)];
        let labels: Vec<BlockLabel> = vec![Scalar::Int(2).into(), Scalar::Int(4).into()];
        let err = Table::from_blocks(
            &blocks,
            &labels,
            Some(vec!["A".into(), "B".into()]),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, FormatError::NameCountMismatch(_)));
    }

    #[test]
    fn test_ragged_tuple_labels() {
        let blocks = vec![block(2, 3, 1.0), block(2, 3, 2.0)];
        let labels: Vec<BlockLabel> = vec![
            vec![Scalar::Int(2), Scalar::Int(101)].into(),
            Scalar::Int(4).into(),
        ];
        let err = Table::from_blocks(&blocks, &labels, None, None).unwrap_err();
        assert!(matches!(err, FormatError::ShapeMismatch(_)));
    }
}
