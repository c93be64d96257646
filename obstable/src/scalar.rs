//! Label value types.
//!
//! Axis labels in the original data can be strings ("10 C"), numbers, or
//! categorical codes. `Scalar` is the closed set of label value kinds; an
//! `AxisLabel` ties an ordered sequence of them to an optional axis name.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single label value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    /// Signed integer label (default labels, counts, sample numbers)
    Int(i64),
    /// Floating-point label (measured parameter values)
    Float(f64),
    /// String label ("10 C", gene names, cell names)
    Str(String),
    /// Categorical code, resolved against an external category list
    Cat(u32),
}

impl Scalar {
    /// Categorical-code constructor, to keep call sites readable.
    pub fn cat(code: u32) -> Self {
        Scalar::Cat(code)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(v) => write!(f, "{v}"),
            Scalar::Float(v) => write!(f, "{v}"),
            Scalar::Str(v) => write!(f, "{v}"),
            Scalar::Cat(v) => write!(f, "#{v}"),
        }
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<i32> for Scalar {
    fn from(v: i32) -> Self {
        Scalar::Int(v as i64)
    }
}

impl From<usize> for Scalar {
    fn from(v: usize) -> Self {
        Scalar::Int(v as i64)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Float(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Str(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Str(v)
    }
}

/// Ordered label values for one axis, with an optional axis name.
///
/// Invariant (checked by the converters, not here): `values.len()` equals
/// the extent of the axis it labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisLabel {
    pub name: Option<String>,
    pub values: Vec<Scalar>,
}

impl AxisLabel {
    /// Named label sequence.
    pub fn new(name: impl Into<String>, values: Vec<Scalar>) -> Self {
        Self {
            name: Some(name.into()),
            values,
        }
    }

    /// Unnamed label sequence.
    pub fn unnamed(values: Vec<Scalar>) -> Self {
        Self { name: None, values }
    }

    /// Default integer labels `0..extent`, unnamed.
    pub fn positional(extent: usize) -> Self {
        Self {
            name: None,
            values: (0..extent).map(Scalar::from).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
