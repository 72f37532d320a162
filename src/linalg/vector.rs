//! Vectors: matrices with one dimension of size 1

use super::matrix::{DenseMatrix, MatrixLike, MatrixLikeMut};
use crate::error::{Error, Result};
use crate::table::Dimension;

/// Whether a vector reports itself as 1 x n or n x 1
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    Row,
    Column,
}

/// 1-D addressing on top of the matrix contract
pub trait VectorLike: MatrixLike {
    /// `max(rows, cols)`
    fn size(&self) -> usize {
        let d = self.dim();
        d.rows.max(d.cols)
    }

    /// Element `i`, independent of orientation
    ///
    /// # Panics
    /// Panics if `i >= size()`.
    fn at(&self, i: usize) -> f64 {
        if self.dim().rows == 1 {
            self.get(0, i)
        } else {
            self.get(i, 0)
        }
    }

    /// Sum of pairwise products in index order
    ///
    /// Fails with `DimensionMismatch` when sizes differ. Orientation is ignored.
    fn dot<V: VectorLike>(&self, other: &V) -> Result<f64>
    where
        Self: Sized,
    {
        let n = self.size();
        if n != other.size() {
            return Err(Error::dimension_mismatch("dot", self.dim(), other.dim()));
        }
        if let (Some(a), Some(b)) = (self.as_slice(), other.as_slice()) {
            return Ok(a.iter().zip(b).fold(0.0, |s, (x, y)| s + x * y));
        }
        Ok((0..n).fold(0.0, |s, i| s + self.at(i) * other.at(i)))
    }

    fn to_vec(&self) -> Vec<f64> {
        (0..self.size()).map(|i| self.at(i)).collect()
    }
}

pub trait VectorLikeMut: VectorLike + MatrixLikeMut {
    /// # Panics
    /// Panics if `i >= size()`.
    fn set_at(&mut self, i: usize, value: f64) {
        if self.dim().rows == 1 {
            self.set(0, i, value)
        } else {
            self.set(i, 0, value)
        }
    }
}

impl<V: VectorLike> VectorLike for &V {}

impl<V: VectorLike> VectorLike for &mut V {}

impl<V: VectorLikeMut> VectorLikeMut for &mut V {}

/// Owned contiguous vector
#[derive(Clone, Debug, PartialEq)]
pub struct Vector {
    data: Vec<f64>,
    orientation: Orientation,
}

impl Vector {
    pub fn from_vec(data: Vec<f64>, orientation: Orientation) -> Self {
        Vector { data, orientation }
    }

    pub fn zeros(n: usize, orientation: Orientation) -> Self {
        Vector::from_vec(vec![0.0; n], orientation)
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Same data, reported with the other shape
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    #[inline]
    fn offset(&self, r: usize, c: usize) -> usize {
        let (i, other) = match self.orientation {
            Orientation::Row => (c, r),
            Orientation::Column => (r, c),
        };
        assert!(
            other == 0 && i < self.data.len(),
            "index ({r}, {c}) out of bounds for {} vector",
            self.dim()
        );
        i
    }
}

impl MatrixLike for Vector {
    fn dim(&self) -> Dimension {
        match self.orientation {
            Orientation::Row => Dimension::new(1, self.data.len()),
            Orientation::Column => Dimension::new(self.data.len(), 1),
        }
    }

    #[inline]
    fn get(&self, r: usize, c: usize) -> f64 {
        self.data[self.offset(r, c)]
    }

    fn as_slice(&self) -> Option<&[f64]> {
        Some(&self.data)
    }
}

impl MatrixLikeMut for Vector {
    #[inline]
    fn set(&mut self, r: usize, c: usize, value: f64) {
        let i = self.offset(r, c);
        self.data[i] = value;
    }

    fn as_mut_slice(&mut self) -> Option<&mut [f64]> {
        Some(&mut self.data)
    }
}

impl VectorLike for Vector {
    #[inline]
    fn at(&self, i: usize) -> f64 {
        self.data[i]
    }
}

impl VectorLikeMut for Vector {
    #[inline]
    fn set_at(&mut self, i: usize, value: f64) {
        self.data[i] = value;
    }
}

impl TryFrom<DenseMatrix> for Vector {
    type Error = Error;

    /// Reinterpret a 1 x n or n x 1 matrix as a vector without copying
    fn try_from(m: DenseMatrix) -> Result<Self> {
        let dim = m.dim();
        let orientation = if dim.cols == 1 {
            Orientation::Column
        } else if dim.rows == 1 {
            Orientation::Row
        } else {
            return Err(Error::dimension_mismatch("to_vector", dim, Dimension::new(dim.rows, 1)));
        };
        Ok(Vector::from_vec(m.into_vec(), orientation))
    }
}

impl From<Vector> for DenseMatrix {
    fn from(v: Vector) -> Self {
        let dim = v.dim();
        DenseMatrix::from_parts(dim.rows, dim.cols, v.data)
    }
}
