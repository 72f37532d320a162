//! Dense matrix contract and the owned row-major implementation
//!
//! Every matrix-shaped thing (owned matrix, vector, row/column/window/gather
//! view) implements `MatrixLike` through coordinate access. The provided
//! arithmetic works on any mix of them. When both operands expose contiguous
//! row-major storage via `as_slice`, a flat loop replaces the coordinate loop.

use super::vector::{Orientation, Vector};
use super::view::{MatrixView, VectorView};
use crate::error::{Error, Result};
use crate::table::Dimension;

/// Read side of the matrix contract
pub trait MatrixLike {
    fn dim(&self) -> Dimension;

    /// Element at (r, c)
    ///
    /// # Panics
    /// Panics if (r, c) is outside `dim()`.
    fn get(&self, r: usize, c: usize) -> f64;

    /// Contiguous row-major storage, when the implementation has one
    fn as_slice(&self) -> Option<&[f64]> {
        None
    }

    fn rows(&self) -> usize {
        self.dim().rows
    }

    fn cols(&self) -> usize {
        self.dim().cols
    }

    /// Owned copy of the logical contents
    fn to_dense(&self) -> DenseMatrix {
        let Dimension { rows, cols } = self.dim();
        match self.as_slice() {
            Some(data) => DenseMatrix::from_parts(rows, cols, data.to_vec()),
            None => DenseMatrix::from_fn(rows, cols, |r, c| self.get(r, c)),
        }
    }

    /// Elementwise sum
    fn plus<M: MatrixLike>(&self, other: &M) -> Result<DenseMatrix>
    where
        Self: Sized,
    {
        zip_with(self, other, "plus", |a, b| a + b)
    }

    /// Elementwise difference
    fn minus<M: MatrixLike>(&self, other: &M) -> Result<DenseMatrix>
    where
        Self: Sized,
    {
        zip_with(self, other, "minus", |a, b| a - b)
    }

    /// Elementwise (Hadamard) product
    fn mul<M: MatrixLike>(&self, other: &M) -> Result<DenseMatrix>
    where
        Self: Sized,
    {
        zip_with(self, other, "mul", |a, b| a * b)
    }

    fn times_scalar(&self, k: f64) -> DenseMatrix {
        let Dimension { rows, cols } = self.dim();
        match self.as_slice() {
            Some(data) => DenseMatrix::from_parts(rows, cols, data.iter().map(|x| x * k).collect()),
            None => DenseMatrix::from_fn(rows, cols, |r, c| self.get(r, c) * k),
        }
    }

    /// Matrix product
    ///
    /// Fails with `DimensionMismatch` unless `self.cols() == other.rows()`.
    /// The result is `rows() x other.cols()`.
    fn times<M: MatrixLike>(&self, other: &M) -> Result<DenseMatrix>
    where
        Self: Sized,
    {
        let (ld, rd) = (self.dim(), other.dim());
        if ld.cols != rd.rows {
            return Err(Error::dimension_mismatch("times", ld, rd));
        }
        let (m, n, p) = (ld.rows, ld.cols, rd.cols);
        let mut out = vec![0.0; m * p];

        if let (Some(a), Some(b)) = (self.as_slice(), other.as_slice()) {
            // i-k-j order keeps the inner loop contiguous; each out[i, j]
            // still accumulates in increasing k.
            for i in 0..m {
                let row = &mut out[i * p..(i + 1) * p];
                for k in 0..n {
                    let aik = a[i * n + k];
                    let brow = &b[k * p..(k + 1) * p];
                    for (o, &bkj) in row.iter_mut().zip(brow) {
                        *o += aik * bkj;
                    }
                }
            }
        } else {
            for i in 0..m {
                for j in 0..p {
                    let mut v = 0.0;
                    for k in 0..n {
                        v += self.get(i, k) * other.get(k, j);
                    }
                    out[i * p + j] = v;
                }
            }
        }
        Ok(DenseMatrix::from_parts(m, p, out))
    }

    /// Transposed copy
    fn t(&self) -> DenseMatrix {
        let Dimension { rows, cols } = self.dim();
        DenseMatrix::from_fn(cols, rows, |r, c| self.get(c, r))
    }

    fn sum(&self) -> f64 {
        match self.as_slice() {
            Some(data) => data.iter().sum(),
            None => {
                let Dimension { rows, cols } = self.dim();
                let mut s = 0.0;
                for r in 0..rows {
                    for c in 0..cols {
                        s += self.get(r, c);
                    }
                }
                s
            }
        }
    }

    /// Horizontal concatenation; row counts must match
    fn cbind<M: MatrixLike>(&self, other: &M) -> Result<DenseMatrix>
    where
        Self: Sized,
    {
        let (ld, rd) = (self.dim(), other.dim());
        if ld.rows != rd.rows {
            return Err(Error::dimension_mismatch("cbind", ld, rd));
        }
        let cols = ld.cols + rd.cols;
        Ok(DenseMatrix::from_fn(ld.rows, cols, |r, c| {
            if c < ld.cols {
                self.get(r, c)
            } else {
                other.get(r, c - ld.cols)
            }
        }))
    }

    /// True iff the shapes match and every `|a - b| < threshold`
    fn almost_the_same<M: MatrixLike>(&self, other: &M, threshold: f64) -> bool
    where
        Self: Sized,
    {
        let dim = self.dim();
        if dim != other.dim() {
            return false;
        }
        if let (Some(a), Some(b)) = (self.as_slice(), other.as_slice()) {
            return a.iter().zip(b).all(|(x, y)| (x - y).abs() < threshold);
        }
        (0..dim.rows).all(|r| (0..dim.cols).all(|c| (self.get(r, c) - other.get(r, c)).abs() < threshold))
    }

    /// Copy of column `index`
    ///
    /// A column vector when `preserve_orientation`, otherwise a row vector.
    fn col(&self, index: usize, preserve_orientation: bool) -> Result<Vector> {
        let Dimension { rows, cols } = self.dim();
        if index >= cols {
            return Err(Error::out_of_bounds(index, cols));
        }
        let data = match self.as_slice() {
            Some(a) => a.iter().skip(index).step_by(cols).copied().collect(),
            None => (0..rows).map(|r| self.get(r, index)).collect(),
        };
        let orientation = if preserve_orientation {
            Orientation::Column
        } else {
            Orientation::Row
        };
        Ok(Vector::from_vec(data, orientation))
    }

    /// Copy of row `index`
    ///
    /// A row vector when `preserve_orientation`, otherwise a column vector.
    fn row(&self, index: usize, preserve_orientation: bool) -> Result<Vector> {
        let Dimension { rows, cols } = self.dim();
        if index >= rows {
            return Err(Error::out_of_bounds(index, rows));
        }
        let data = match self.as_slice() {
            Some(a) => a[index * cols..(index + 1) * cols].to_vec(),
            None => (0..cols).map(|c| self.get(index, c)).collect(),
        };
        let orientation = if preserve_orientation {
            Orientation::Row
        } else {
            Orientation::Column
        };
        Ok(Vector::from_vec(data, orientation))
    }

    /// Read-only live view of row `index`
    fn row_view(&self, index: usize, preserve_orientation: bool) -> Result<VectorView<&Self>>
    where
        Self: Sized,
    {
        VectorView::row(self, index, preserve_orientation)
    }

    /// Read-only live view of column `index`
    fn col_view(&self, index: usize, preserve_orientation: bool) -> Result<VectorView<&Self>>
    where
        Self: Sized,
    {
        VectorView::col(self, index, preserve_orientation)
    }

    /// Read-only rectangular window starting at (top, left)
    fn window(&self, top: usize, left: usize, rows: usize, cols: usize) -> Result<MatrixView<&Self>>
    where
        Self: Sized,
    {
        MatrixView::window(self, top, left, rows, cols)
    }

    /// Read-only view of the cross product of the given rows and columns
    fn gather(&self, rows: Vec<usize>, cols: Vec<usize>) -> Result<MatrixView<&Self>>
    where
        Self: Sized,
    {
        MatrixView::gather(self, rows, cols)
    }

    /// Read-only transposed view
    fn t_view(&self) -> MatrixView<&Self>
    where
        Self: Sized,
    {
        MatrixView::transposed(self)
    }
}

/// Write side of the matrix contract
///
/// Writes through a non-copy view land in the parent's storage.
pub trait MatrixLikeMut: MatrixLike {
    /// # Panics
    /// Panics if (r, c) is outside `dim()`.
    fn set(&mut self, r: usize, c: usize, value: f64);

    fn as_mut_slice(&mut self) -> Option<&mut [f64]> {
        None
    }

    fn fill(&mut self, value: f64)
    where
        Self: Sized,
    {
        self.update(|_, _, _| value);
    }

    /// Overwrite every element with `f(r, c, current)`
    fn update<F: FnMut(usize, usize, f64) -> f64>(&mut self, mut f: F)
    where
        Self: Sized,
    {
        let Dimension { rows, cols } = self.dim();
        for r in 0..rows {
            for c in 0..cols {
                let v = f(r, c, self.get(r, c));
                self.set(r, c, v);
            }
        }
    }

    /// In-place elementwise sum
    fn plus_assign<M: MatrixLike>(&mut self, other: &M) -> Result<()>
    where
        Self: Sized,
    {
        zip_assign(self, other, "plus_assign", |a, b| a + b)
    }

    /// In-place elementwise difference
    fn minus_assign<M: MatrixLike>(&mut self, other: &M) -> Result<()>
    where
        Self: Sized,
    {
        zip_assign(self, other, "minus_assign", |a, b| a - b)
    }

    fn times_assign(&mut self, k: f64)
    where
        Self: Sized,
    {
        match self.as_mut_slice() {
            Some(data) => data.iter_mut().for_each(|x| *x *= k),
            None => self.update(|_, _, v| v * k),
        }
    }

    /// Copy `other` into `self`; shapes must match
    fn assign<M: MatrixLike>(&mut self, other: &M) -> Result<()>
    where
        Self: Sized,
    {
        zip_assign(self, other, "assign", |_, b| b)
    }

    fn row_view_mut(
        &mut self,
        index: usize,
        preserve_orientation: bool,
    ) -> Result<VectorView<&mut Self>>
    where
        Self: Sized,
    {
        VectorView::row(self, index, preserve_orientation)
    }

    fn col_view_mut(
        &mut self,
        index: usize,
        preserve_orientation: bool,
    ) -> Result<VectorView<&mut Self>>
    where
        Self: Sized,
    {
        VectorView::col(self, index, preserve_orientation)
    }

    fn window_mut(
        &mut self,
        top: usize,
        left: usize,
        rows: usize,
        cols: usize,
    ) -> Result<MatrixView<&mut Self>>
    where
        Self: Sized,
    {
        MatrixView::window(self, top, left, rows, cols)
    }

    fn gather_mut(&mut self, rows: Vec<usize>, cols: Vec<usize>) -> Result<MatrixView<&mut Self>>
    where
        Self: Sized,
    {
        MatrixView::gather(self, rows, cols)
    }

    fn t_view_mut(&mut self) -> MatrixView<&mut Self>
    where
        Self: Sized,
    {
        MatrixView::transposed(self)
    }
}

fn zip_with<A, B, F>(a: &A, b: &B, op: &'static str, f: F) -> Result<DenseMatrix>
where
    A: MatrixLike,
    B: MatrixLike,
    F: Fn(f64, f64) -> f64,
{
    let dim = a.dim();
    if dim != b.dim() {
        return Err(Error::dimension_mismatch(op, dim, b.dim()));
    }
    let data = match (a.as_slice(), b.as_slice()) {
        (Some(x), Some(y)) => x.iter().zip(y).map(|(&p, &q)| f(p, q)).collect(),
        _ => {
            let mut out = Vec::with_capacity(dim.rows * dim.cols);
            for r in 0..dim.rows {
                for c in 0..dim.cols {
                    out.push(f(a.get(r, c), b.get(r, c)));
                }
            }
            out
        }
    };
    Ok(DenseMatrix::from_parts(dim.rows, dim.cols, data))
}

fn zip_assign<A, B, F>(a: &mut A, b: &B, op: &'static str, f: F) -> Result<()>
where
    A: MatrixLikeMut,
    B: MatrixLike,
    F: Fn(f64, f64) -> f64,
{
    let dim = a.dim();
    if dim != b.dim() {
        return Err(Error::dimension_mismatch(op, dim, b.dim()));
    }
    if let Some(y) = b.as_slice() {
        if let Some(x) = a.as_mut_slice() {
            x.iter_mut().zip(y).for_each(|(p, &q)| *p = f(*p, q));
            return Ok(());
        }
    }
    a.update(|r, c, v| f(v, b.get(r, c)));
    Ok(())
}

impl<M: MatrixLike> MatrixLike for &M {
    fn dim(&self) -> Dimension {
        (**self).dim()
    }

    #[inline]
    fn get(&self, r: usize, c: usize) -> f64 {
        (**self).get(r, c)
    }

    fn as_slice(&self) -> Option<&[f64]> {
        (**self).as_slice()
    }
}

impl<M: MatrixLike> MatrixLike for &mut M {
    fn dim(&self) -> Dimension {
        (**self).dim()
    }

    #[inline]
    fn get(&self, r: usize, c: usize) -> f64 {
        (**self).get(r, c)
    }

    fn as_slice(&self) -> Option<&[f64]> {
        (**self).as_slice()
    }
}

impl<M: MatrixLikeMut> MatrixLikeMut for &mut M {
    #[inline]
    fn set(&mut self, r: usize, c: usize, value: f64) {
        (**self).set(r, c, value)
    }

    fn as_mut_slice(&mut self) -> Option<&mut [f64]> {
        (**self).as_mut_slice()
    }
}

/// Owned row-major matrix; `data.len() == rows * cols` always holds
#[derive(Clone, Debug, PartialEq)]
pub struct DenseMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl DenseMatrix {
    /// Matrix from row-major values
    ///
    /// Fails with `DimensionMismatch` when `data` does not hold exactly
    /// `rows * cols` values, including when that product overflows.
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        if Dimension::new(rows, cols).size() != Some(data.len()) {
            return Err(Error::dimension_mismatch(
                "matrix_of",
                Dimension::new(rows, cols),
                Dimension::new(1, data.len()),
            ));
        }
        Ok(Self { rows, cols, data })
    }

    pub(crate) fn from_parts(rows: usize, cols: usize, data: Vec<f64>) -> Self {
        debug_assert_eq!(Dimension::new(rows, cols).size(), Some(data.len()));
        Self { rows, cols, data }
    }

    /// # Panics
    /// Panics if `rows * cols` overflows `usize`.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::from_parts(rows, cols, vec![0.0; buffer_len(rows, cols)])
    }

    /// # Panics
    /// Panics if `rows * cols` overflows `usize`.
    pub fn from_fn<F: FnMut(usize, usize) -> f64>(rows: usize, cols: usize, mut f: F) -> Self {
        let mut data = Vec::with_capacity(buffer_len(rows, cols));
        for r in 0..rows {
            for c in 0..cols {
                data.push(f(r, c));
            }
        }
        Self::from_parts(rows, cols, data)
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    #[inline]
    fn offset(&self, r: usize, c: usize) -> usize {
        assert!(
            r < self.rows && c < self.cols,
            "index ({r}, {c}) out of bounds for {}x{} matrix",
            self.rows,
            self.cols
        );
        r * self.cols + c
    }
}

fn buffer_len(rows: usize, cols: usize) -> usize {
    match Dimension::new(rows, cols).size() {
        Some(len) => len,
        None => panic!("matrix shape {rows}x{cols} overflows usize"),
    }
}

impl MatrixLike for DenseMatrix {
    #[inline]
    fn dim(&self) -> Dimension {
        Dimension::new(self.rows, self.cols)
    }

    #[inline]
    fn get(&self, r: usize, c: usize) -> f64 {
        self.data[self.offset(r, c)]
    }

    fn as_slice(&self) -> Option<&[f64]> {
        Some(&self.data)
    }
}

impl MatrixLikeMut for DenseMatrix {
    #[inline]
    fn set(&mut self, r: usize, c: usize, value: f64) {
        let i = self.offset(r, c);
        self.data[i] = value;
    }

    fn as_mut_slice(&mut self) -> Option<&mut [f64]> {
        Some(&mut self.data)
    }
}

impl std::ops::Mul<f64> for &DenseMatrix {
    type Output = DenseMatrix;

    fn mul(self, k: f64) -> DenseMatrix {
        self.times_scalar(k)
    }
}

impl std::ops::Mul<&DenseMatrix> for f64 {
    type Output = DenseMatrix;

    fn mul(self, m: &DenseMatrix) -> DenseMatrix {
        m.times_scalar(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::VectorLike;
    use approx::assert_abs_diff_eq;

    fn m23() -> DenseMatrix {
        DenseMatrix::new(2, 3, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap()
    }

    #[test]
    fn test_new_checks_length() {
        assert!(matches!(
            DenseMatrix::new(2, 2, vec![1.0]),
            Err(Error::DimensionMismatch { .. })
        ));
        let m = m23();
        assert_eq!(m.dim(), Dimension::new(2, 3));
        assert_eq!(m.get(1, 2), 5.0);
    }

    #[test]
    fn test_new_rejects_overflowing_shape() {
        let err = DenseMatrix::new(1 << (usize::BITS - 1), 2, vec![]).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { .. }));
        assert!(DenseMatrix::new(usize::MAX, usize::MAX, vec![0.0]).is_err());
        assert!(DenseMatrix::new(0, usize::MAX, vec![]).is_ok());
    }

    #[test]
    #[should_panic(expected = "overflows usize")]
    fn test_zeros_overflowing_shape_panics() {
        DenseMatrix::zeros(usize::MAX, 2);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_get_panics_outside() {
        m23().get(0, 3);
    }

    #[test]
    fn test_plus_minus() {
        let a = m23();
        let b = DenseMatrix::new(2, 3, vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6]).unwrap();
        let c = a.plus(&b).unwrap();
        let d = a.minus(&b).unwrap();
        for i in 0..2 {
            for j in 0..3 {
                assert_abs_diff_eq!(c.get(i, j), a.get(i, j) + b.get(i, j), epsilon = 1e-12);
                assert_abs_diff_eq!(d.get(i, j), a.get(i, j) - b.get(i, j), epsilon = 1e-12);
            }
        }
        assert!(matches!(a.plus(&a.t()), Err(Error::DimensionMismatch { .. })));
    }

    #[test]
    fn test_transpose() {
        let at = m23().t();
        let expected = DenseMatrix::new(3, 2, vec![0.0, 3.0, 1.0, 4.0, 2.0, 5.0]).unwrap();
        assert_eq!(at, expected);
    }

    #[test]
    fn test_times() {
        let a = m23();
        let c = a.times(&a.t()).unwrap();
        assert_eq!(c.dim(), Dimension::new(2, 2));
        let r0 = a.row(0, true).unwrap();
        let r1 = a.row(1, true).unwrap();
        assert_abs_diff_eq!(c.get(0, 0), r0.dot(&r0).unwrap(), epsilon = 1e-12);
        assert_abs_diff_eq!(c.get(0, 1), r0.dot(&r1).unwrap(), epsilon = 1e-12);
        assert_abs_diff_eq!(c.get(1, 0), r1.dot(&r0).unwrap(), epsilon = 1e-12);
        assert_abs_diff_eq!(c.get(1, 1), r1.dot(&r1).unwrap(), epsilon = 1e-12);

        assert!(matches!(a.times(&a), Err(Error::DimensionMismatch { .. })));
    }

    #[test]
    fn test_times_view_matches_dense() {
        let a = m23();
        let via_view = a.times(&a.t_view()).unwrap();
        let via_dense = a.times(&a.t()).unwrap();
        assert_eq!(via_view, via_dense);
    }

    #[test]
    fn test_scalar_and_hadamard() {
        let a = m23();
        assert_eq!((&a * 2.0).get(1, 1), 8.0);
        assert_eq!((2.0 * &a).get(0, 2), 4.0);
        let h = a.mul(&a).unwrap();
        assert_eq!(h.get(1, 2), 25.0);
        assert_eq!(a.sum(), 15.0);
    }

    #[test]
    fn test_cbind() {
        let a = m23();
        let b = DenseMatrix::new(2, 1, vec![9.0, 8.0]).unwrap();
        let c = a.cbind(&b).unwrap();
        assert_eq!(c.dim(), Dimension::new(2, 4));
        assert_eq!(c.get(0, 3), 9.0);
        assert_eq!(c.get(1, 3), 8.0);
        assert_eq!(c.get(1, 0), 3.0);
        assert!(a.cbind(&a.t()).is_err());
    }

    #[test]
    fn test_almost_the_same() {
        let a = m23();
        let b = a.plus(&DenseMatrix::from_fn(2, 3, |_, _| 1e-6)).unwrap();
        assert!(a.almost_the_same(&b, 1e-4));
        assert!(!a.almost_the_same(&b, 1e-7));
        assert!(!a.almost_the_same(&a.t(), 1.0));
    }

    #[test]
    fn test_row_and_col_copies() {
        let a = m23();
        let mut r = a.row(0, true).unwrap();
        r.set(0, 0, 10.0);
        assert_eq!(r.get(0, 0), 10.0);
        assert_eq!(a.get(0, 0), 0.0);

        let c = a.col(0, true).unwrap();
        assert_eq!(c.dim(), Dimension::new(2, 1));
        assert_eq!(c.get(1, 0), 3.0);

        let flipped = a.row(1, false).unwrap();
        assert_eq!(flipped.dim(), Dimension::new(3, 1));
        assert!(a.col(3, true).is_err());
        assert!(a.row(2, true).is_err());
    }

    #[test]
    fn test_in_place() {
        let mut a = m23();
        a.plus_assign(&m23()).unwrap();
        assert_eq!(a.get(1, 2), 10.0);
        a.times_assign(0.5);
        assert_eq!(a, m23());
        a.minus_assign(&m23()).unwrap();
        assert_eq!(a.sum(), 0.0);
        assert!(a.assign(&a.t()).is_err());
    }
}
