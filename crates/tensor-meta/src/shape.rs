// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Tensor shapes as declared by saved-model signatures.

use std::fmt;

use crate::DataType;

/// Size recorded for a dimension whose extent is not known until run time
/// (typically the batch axis).
pub const UNKNOWN_DIM: i64 = -1;

/// Describes the dimensionality of a declared tensor.
///
/// Unlike a concrete tensor shape, individual dimensions may be
/// [`UNKNOWN_DIM`] and the rank itself may be unknown (`dims == None`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TensorShape {
    dims: Option<Vec<i64>>,
}

impl TensorShape {
    /// Creates a shape of known rank from the given dimensions.
    ///
    /// # Examples
    /// ```
    /// use tensor_meta::TensorShape;
    /// let s = TensorShape::new(vec![-1, 224, 224, 3]);
    /// assert_eq!(s.rank(), Some(4));
    /// assert!(!s.is_fully_defined());
    /// ```
    pub fn new(dims: Vec<i64>) -> Self {
        Self { dims: Some(dims) }
    }

    /// Creates a shape whose rank is unknown.
    pub fn unknown_rank() -> Self {
        Self { dims: None }
    }

    /// Creates a scalar shape (rank 0).
    pub fn scalar() -> Self {
        Self::new(vec![])
    }

    /// Creates a 1-D shape.
    pub fn vector(len: i64) -> Self {
        Self::new(vec![len])
    }

    /// Creates a 2-D shape.
    pub fn matrix(rows: i64, cols: i64) -> Self {
        Self::new(vec![rows, cols])
    }

    /// Creates a shape with an unknown leading batch axis followed by
    /// `features`.
    pub fn batched(features: &[i64]) -> Self {
        let mut dims = Vec::with_capacity(features.len() + 1);
        dims.push(UNKNOWN_DIM);
        dims.extend_from_slice(features);
        Self::new(dims)
    }

    /// Returns the rank, or `None` when the rank is unknown.
    pub fn rank(&self) -> Option<usize> {
        self.dims.as_ref().map(Vec::len)
    }

    /// Returns the dimensions, or `None` when the rank is unknown.
    pub fn dims(&self) -> Option<&[i64]> {
        self.dims.as_deref()
    }

    /// Returns the size of dimension `index` (possibly [`UNKNOWN_DIM`]).
    pub fn dim(&self, index: usize) -> Option<i64> {
        self.dims.as_ref().and_then(|d| d.get(index).copied())
    }

    /// Returns the feature width: the dimension right after the batch axis.
    pub fn feature_dim(&self) -> Option<i64> {
        self.dim(1)
    }

    /// Returns `true` if the rank and every dimension are known.
    pub fn is_fully_defined(&self) -> bool {
        self.dims
            .as_ref()
            .is_some_and(|d| d.iter().all(|&x| x >= 0))
    }

    /// Returns the total element count, or `None` if not fully defined.
    ///
    /// For a scalar shape (rank 0), returns 1.
    pub fn num_elements(&self) -> Option<u64> {
        if !self.is_fully_defined() {
            return None;
        }
        self.dims
            .as_ref()
            .map(|d| d.iter().map(|&x| x as u64).product())
    }

    /// Computes the memory footprint in bytes, when both the shape and the
    /// element size are known.
    pub fn size_bytes(&self, dtype: DataType) -> Option<u64> {
        let elem = dtype.size_bytes()? as u64;
        self.num_elements().map(|n| n * elem)
    }

    /// Returns the dimension sizes rendered as text, the way signature
    /// descriptors record them. Unknown rank yields an empty list.
    pub fn to_text_dims(&self) -> Vec<String> {
        self.dims
            .as_ref()
            .map(|d| d.iter().map(i64::to_string).collect())
            .unwrap_or_default()
    }
}

impl fmt::Display for TensorShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(dims) = &self.dims else {
            return f.write_str("<unknown>");
        };
        write!(f, "[")?;
        for (i, d) in dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if *d == UNKNOWN_DIM {
                write!(f, "?")?;
            } else {
                write!(f, "{d}")?;
            }
        }
        write!(f, "]")
    }
}

/// Convenience: `TensorShape::from(vec![-1, 3])`.
impl From<Vec<i64>> for TensorShape {
    fn from(dims: Vec<i64>) -> Self {
        Self::new(dims)
    }
}

/// Convenience: `TensorShape::from(&[2, 3][..])`.
impl From<&[i64]> for TensorShape {
    fn from(dims: &[i64]) -> Self {
        Self::new(dims.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_shape() {
        let s = TensorShape::scalar();
        assert_eq!(s.rank(), Some(0));
        assert_eq!(s.num_elements(), Some(1));
    }

    #[test]
    fn test_batched_shape() {
        let s = TensorShape::batched(&[224, 224, 3]);
        assert_eq!(s.dims(), Some(&[-1, 224, 224, 3][..]));
        assert_eq!(s.feature_dim(), Some(224));
        assert!(!s.is_fully_defined());
        assert_eq!(s.num_elements(), None);
    }

    #[test]
    fn test_unknown_rank() {
        let s = TensorShape::unknown_rank();
        assert_eq!(s.rank(), None);
        assert_eq!(s.feature_dim(), None);
        assert!(s.to_text_dims().is_empty());
        assert_eq!(format!("{s}"), "<unknown>");
    }

    #[test]
    fn test_size_bytes() {
        let s = TensorShape::matrix(10, 20);
        assert_eq!(s.size_bytes(DataType::Float32), Some(800));
        assert_eq!(s.size_bytes(DataType::Float16), Some(400));
        assert_eq!(s.size_bytes(DataType::String), None);
    }

    #[test]
    fn test_text_dims() {
        let s = TensorShape::new(vec![-1, 2]);
        assert_eq!(s.to_text_dims(), vec!["-1".to_string(), "2".to_string()]);
    }

    #[test]
    fn test_display() {
        let s = TensorShape::new(vec![-1, 112, 112, 32]);
        assert_eq!(format!("{s}"), "[?, 112, 112, 32]");
    }

    #[test]
    fn test_from_conversions() {
        let s1: TensorShape = vec![2, 3].into();
        let s2: TensorShape = (&[2, 3][..]).into();
        assert_eq!(s1, s2);
    }
}
