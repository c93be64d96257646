//! Tensor-to-table conversion.
//!
//! Turns an n-dimensional dense array into a 2D table: every axis except
//! the observable axis becomes a level of the row index (the cartesian
//! product of the per-axis labels, last axis varying fastest), and the
//! observable axis becomes the columns.

use std::collections::BTreeMap;

use candle_core::{DType, Tensor};

use crate::error::FormatError;
use crate::index::{AxisIndex, Level};
use crate::scalar::{AxisLabel, Scalar};
use crate::table::Table;

impl Table {
    /// Convert a labeled n-dimensional array into a table.
    ///
    /// `labels` maps axis numbers to their label sequences; axes left out
    /// get default integer labels `0..extent` and a generated
    /// `"Axis {original_index}"` name. `observable_axis` may be negative,
    /// counting from the end. `observables` names the columns; when
    /// absent, columns are labeled `0..extent`.
    ///
    /// Rows enumerate every combination of the non-observable axes in
    /// axis order, the innermost remaining axis varying fastest.
    pub fn from_labeled(
        data: &[f64],
        shape: &[usize],
        labels: &BTreeMap<usize, AxisLabel>,
        observable_axis: isize,
        observables: Option<Vec<Scalar>>,
    ) -> Result<Self, FormatError> {
        let rank = shape.len();
        let ob = normalize_axis(observable_axis, rank)?;
        let n_obs = shape[ob];

        // Dimensionality checks, before any data movement.
        if rank - 1 < labels.len() {
            return Err(FormatError::ShapeMismatch(format!(
                "array of rank {} cannot carry {} labeled axes plus an observable axis",
                rank,
                labels.len()
            )));
        }
        if let Some(ref obs) = observables {
            if obs.len() != n_obs {
                return Err(FormatError::NameCountMismatch(format!(
                    "{} observable names for an observable axis of extent {}",
                    obs.len(),
                    n_obs
                )));
            }
        }
        for (&axis, label) in labels {
            if axis == ob {
                return Err(FormatError::InvalidAxis(format!(
                    "axis {axis} is the observable axis and cannot be labeled"
                )));
            }
            if axis >= rank {
                return Err(FormatError::InvalidAxis(format!(
                    "labeled axis {axis} does not exist in an array of rank {rank}"
                )));
            }
            if label.len() != shape[axis] {
                return Err(FormatError::ShapeMismatch(format!(
                    "axis {} has extent {} but {} label values were given",
                    axis,
                    shape[axis],
                    label.len()
                )));
            }
        }
        let total: usize = shape.iter().product();
        if data.len() != total {
            return Err(FormatError::ShapeMismatch(format!(
                "data length {} does not match shape {:?}",
                data.len(),
                shape
            )));
        }

        // Minimal cyclic right-rotation that moves the observable axis to
        // the last position. Axis i lands at (i + shift) % rank.
        let shift = (rank - 1 - ob) % rank;
        let mut new_shape = vec![0usize; rank];
        let mut perm = vec![0usize; rank]; // perm[new] = old axis
        for (new_pos, slot) in perm.iter_mut().enumerate() {
            *slot = (new_pos + rank - shift) % rank;
            new_shape[new_pos] = shape[*slot];
        }
        let rotated = permuted_copy(data, shape, &perm);

        // Re-key the labels under the same rotation, then backfill default
        // labels and names for any non-observable axis left unmapped.
        let mut rotated_labels: BTreeMap<usize, &AxisLabel> = BTreeMap::new();
        for (&axis, label) in labels {
            rotated_labels.insert((axis + shift) % rank, label);
        }
        let mut row_labels = Vec::with_capacity(rank - 1);
        for (new_pos, &extent) in new_shape.iter().enumerate().take(rank - 1) {
            let original = (new_pos + rank - shift) % rank;
            let label = match rotated_labels.get(&new_pos) {
                Some(l) => AxisLabel {
                    name: Some(
                        l.name
                            .clone()
                            .unwrap_or_else(|| format!("Axis {original}")),
                    ),
                    values: l.values.clone(),
                },
                None => AxisLabel::new(format!("Axis {original}"), AxisLabel::positional(extent).values),
            };
            row_labels.push(label);
        }

        let index = AxisIndex::from_product(&row_labels);
        let columns = AxisIndex::flat(Level::new(
            Some("Observables".to_string()),
            observables.unwrap_or_else(|| (0..n_obs).map(Scalar::from).collect()),
        ));

        let rows = if n_obs == 0 { 0 } else { total / n_obs };
        Table::new(rotated, (rows, n_obs), index, columns)
    }

    /// Convert a labeled candle tensor into a table.
    ///
    /// Extracts dims and values from the tensor and delegates to
    /// [`Table::from_labeled`].
    pub fn from_tensor(
        tensor: &Tensor,
        labels: &BTreeMap<usize, AxisLabel>,
        observable_axis: isize,
        observables: Option<Vec<Scalar>>,
    ) -> Result<Self, FormatError> {
        let shape = tensor.dims().to_vec();
        let data = tensor
            .to_dtype(DType::F64)?
            .flatten_all()?
            .to_vec1::<f64>()?;
        Self::from_labeled(&data, &shape, labels, observable_axis, observables)
    }
}

/// Resolve a possibly negative axis against the array's rank.
fn normalize_axis(axis: isize, rank: usize) -> Result<usize, FormatError> {
    if rank == 0 {
        return Err(FormatError::InvalidAxis(
            "a rank-0 array has no observable axis".to_string(),
        ));
    }
    let normalized = if axis < 0 { axis + rank as isize } else { axis };
    if normalized < 0 || normalized >= rank as isize {
        return Err(FormatError::InvalidAxis(format!(
            "observable axis {axis} is out of range for rank {rank}"
        )));
    }
    Ok(normalized as usize)
}

/// Row-major copy of `data` with axes reordered so that new axis `j`
/// is old axis `perm[j]`.
fn permuted_copy(data: &[f64], shape: &[usize], perm: &[usize]) -> Vec<f64> {
    let rank = shape.len();

    // Old row-major strides
    let mut old_strides = vec![1usize; rank];
    for i in (0..rank.saturating_sub(1)).rev() {
        old_strides[i] = old_strides[i + 1] * shape[i + 1];
    }

    let new_shape: Vec<usize> = perm.iter().map(|&p| shape[p]).collect();
    let total = data.len();
    let mut out = Vec::with_capacity(total);

    // Odometer over the new multi-index, tracking the old linear offset.
    let mut counters = vec![0usize; rank];
    let strides_in_new_order: Vec<usize> = perm.iter().map(|&p| old_strides[p]).collect();
    let mut offset = 0usize;
    for _ in 0..total {
        out.push(data[offset]);
        for d in (0..rank).rev() {
            counters[d] += 1;
            offset += strides_in_new_order[d];
            if counters[d] < new_shape[d] {
                break;
            }
            offset -= strides_in_new_order[d] * new_shape[d];
            counters[d] = 0;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels_for(names: &[(usize, &str, Vec<Scalar>)]) -> BTreeMap<usize, AxisLabel> {
        names
            .iter()
            .map(|(axis, name, values)| (*axis, AxisLabel::new(*name, values.clone())))
            .collect()
    }

    fn temperature_pressure() -> BTreeMap<usize, AxisLabel> {
        labels_for(&[
            (
                1,
                "Temperature",
                vec!["10 C".into(), "20 C".into(), "30 C".into(), "40 C".into()],
            ),
            (
                2,
                "Pressure",
                (0..5).map(|i| Scalar::from(format!("{i} atm"))).collect(),
            ),
        ])
    }

    #[test]
    fn test_permuted_copy_roundtrip_identity() {
        let data: Vec<f64> = (0..24).map(f64::from).collect();
        let same = permuted_copy(&data, &[2, 3, 4], &[0, 1, 2]);
        assert_eq!(same, data);
    }

    #[test]
    fn test_permuted_copy_moves_axis() {
        // shape (2, 3): transposing gives (3, 2)
        let data = vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let out = permuted_copy(&data, &[2, 3], &[1, 0]);
        assert_eq!(out, vec![0.0, 3.0, 1.0, 4.0, 2.0, 5.0]);
    }

    #[test]
    fn test_observables_first_axis() {
        // arr[o, t, p] = o*20 + t*5 + p; observables on axis 0
        let data: Vec<f64> = (0..60).map(f64::from).collect();
        let table = Table::from_labeled(
            &data,
            &[3, 4, 5],
            &temperature_pressure(),
            0,
            Some(vec!["vx".into(), "vy".into(), "vz".into()]),
        )
        .unwrap();

        assert_eq!(table.shape(), (20, 3));
        assert_eq!(
            table.index().names(),
            vec![Some("Temperature"), Some("Pressure")]
        );
        // Pressure (inner level) varies fastest
        assert_eq!(table.index().level(1).values[0], "0 atm".into());
        assert_eq!(table.index().level(1).values[1], "1 atm".into());
        assert_eq!(table.index().level(0).values[4], "10 C".into());
        assert_eq!(table.index().level(0).values[5], "20 C".into());
        // First observable column is contiguous 0..20
        for r in 0..20 {
            assert_eq!(table.get(r, 0), r as f64);
        }
        // Cell (t, p, o) holds o*20 + t*5 + p
        assert_eq!(table.get(3 * 5 + 2, 1), 20.0 + 3.0 * 5.0 + 2.0);
    }

    #[test]
    fn test_observable_axis_placement_is_consistent() {
        // Same logical values laid out with observables last: the result
        // must be identical to the observables-first layout.
        let data_first: Vec<f64> = (0..60).map(f64::from).collect();
        let first = Table::from_labeled(&data_first, &[3, 4, 5], &temperature_pressure(), 0, None)
            .unwrap();

        let mut data_last = vec![0.0; 60];
        for o in 0..3 {
            for t in 0..4 {
                for p in 0..5 {
                    data_last[(t * 5 + p) * 3 + o] = (o * 20 + t * 5 + p) as f64;
                }
            }
        }
        let labels = labels_for(&[
            (
                0,
                "Temperature",
                vec!["10 C".into(), "20 C".into(), "30 C".into(), "40 C".into()],
            ),
            (
                1,
                "Pressure",
                (0..5).map(|i| Scalar::from(format!("{i} atm"))).collect(),
            ),
        ]);
        let last = Table::from_labeled(&data_last, &[4, 5, 3], &labels, -1, None).unwrap();

        assert_eq!(first.values(), last.values());
        assert_eq!(first.index(), last.index());
        assert_eq!(first.columns(), last.columns());
    }

    #[test]
    fn test_empty_mapping_gets_default_labels() {
        let data: Vec<f64> = (0..24).map(f64::from).collect();
        let table = Table::from_labeled(&data, &[2, 3, 4], &BTreeMap::new(), -1, None).unwrap();

        assert_eq!(table.shape(), (6, 4));
        assert_eq!(table.index().names(), vec![Some("Axis 0"), Some("Axis 1")]);
        assert_eq!(table.index().level(0).values[0], Scalar::Int(0));
        assert_eq!(table.index().level(1).values[2], Scalar::Int(2));
        assert_eq!(table.columns().level(0).values[3], Scalar::Int(3));
        assert_eq!(table.columns().names(), vec![Some("Observables")]);
    }

    #[test]
    fn test_unmapped_axis_among_mapped_gets_axis_name() {
        let data: Vec<f64> = (0..24).map(f64::from).collect();
        let labels = labels_for(&[(0, "Temperature", vec!["10 C".into(), "20 C".into()])]);
        let table = Table::from_labeled(&data, &[2, 3, 4], &labels, -1, None).unwrap();
        assert_eq!(
            table.index().names(),
            vec![Some("Temperature"), Some("Axis 1")]
        );
    }

    #[test]
    fn test_too_many_labeled_axes() {
        let data: Vec<f64> = (0..20).map(f64::from).collect();
        let err = Table::from_labeled(&data, &[4, 5], &temperature_pressure(), 0, None)
            .unwrap_err();
        assert!(matches!(err, FormatError::ShapeMismatch(_)));
    }

    #[test]
    fn test_label_length_disagrees_with_extent() {
        // Shrinking the last axis invalidates the Pressure labels
        let data: Vec<f64> = (0..36).map(f64::from).collect();
        let err = Table::from_labeled(&data, &[3, 4, 3], &temperature_pressure(), 0, None)
            .unwrap_err();
        assert!(matches!(err, FormatError::ShapeMismatch(_)));
    }

    #[test]
    fn test_observable_axis_collides_with_mapped() {
        let data: Vec<f64> = (0..60).map(f64::from).collect();
        let err = Table::from_labeled(&data, &[3, 4, 5], &temperature_pressure(), 1, None)
            .unwrap_err();
        assert!(matches!(err, FormatError::InvalidAxis(_)));
    }

    #[test]
    fn test_observable_names_count() {
        let data: Vec<f64> = (0..60).map(f64::from).collect();
        let err = Table::from_labeled(
            &data,
            &[3, 4, 5],
            &temperature_pressure(),
            0,
            Some(vec!["vy".into(), "vz".into()]),
        )
        .unwrap_err();
        assert!(matches!(err, FormatError::NameCountMismatch(_)));
    }

    #[test]
    fn test_observable_axis_out_of_range() {
        let data: Vec<f64> = (0..60).map(f64::from).collect();
        let err =
            Table::from_labeled(&data, &[3, 4, 5], &BTreeMap::new(), 3, None).unwrap_err();
        assert!(matches!(err, FormatError::InvalidAxis(_)));
        let err = Table::from_labeled(&data, &[3, 4, 5], &BTreeMap::new(), -4, None).unwrap_err();
        assert!(matches!(err, FormatError::InvalidAxis(_)));
    }

    #[test]
    fn test_negative_observable_axis_normalization() {
        let data: Vec<f64> = (0..60).map(f64::from).collect();
        let via_negative =
            Table::from_labeled(&data, &[4, 5, 3], &BTreeMap::new(), -1, None).unwrap();
        let via_positive =
            Table::from_labeled(&data, &[4, 5, 3], &BTreeMap::new(), 2, None).unwrap();
        assert_eq!(via_negative, via_positive);
    }

    #[test]
    fn test_observable_axis_in_the_middle() {
        // shape (4, 3, 5), observables on axis 1: rotation puts old axis 2
        // at position 0 and old axis 0 at position 1.
        let data: Vec<f64> = (0..60).map(f64::from).collect();
        let labels = labels_for(&[
            (0, "Temperature", (0..4).map(Scalar::from).collect()),
            (2, "Pressure", (0..5).map(Scalar::from).collect()),
        ]);
        let table = Table::from_labeled(&data, &[4, 3, 5], &labels, 1, None).unwrap();
        assert_eq!(table.shape(), (20, 3));
        assert_eq!(
            table.index().names(),
            vec![Some("Pressure"), Some("Temperature")]
        );
        // arr[t, o, p] = t*15 + o*5 + p; row (p, t) col o
        assert_eq!(table.get(2 * 4 + 3, 1), 3.0 * 15.0 + 5.0 + 2.0);
    }
}
