//! Zero-copy matrix views
//!
//! A view holds its parent (`&M` for read-only, `&mut M` for writable) plus a
//! coordinate mapping. Reads and writes translate through the mapping into the
//! parent; nothing is copied. Views of views compose the same way.

use super::matrix::{MatrixLike, MatrixLikeMut};
use super::vector::{VectorLike, VectorLikeMut};
use crate::error::{Error, Result};
use crate::table::Dimension;

#[derive(Clone, Debug)]
enum Mapping {
    /// Contiguous rectangle starting at (top, left)
    Window { top: usize, left: usize },
    /// Cross product of explicit row and column index lists
    Gather { rows: Vec<usize>, cols: Vec<usize> },
}

/// Live view into a parent matrix
///
/// `shape` is the parent-side shape of the mapped region; when `transposed`
/// is set the view reports and addresses it with rows and columns swapped.
#[derive(Clone, Debug)]
pub struct MatrixView<P> {
    parent: P,
    mapping: Mapping,
    shape: Dimension,
    transposed: bool,
}

impl<P: MatrixLike> MatrixView<P> {
    pub(crate) fn window(parent: P, top: usize, left: usize, rows: usize, cols: usize) -> Result<Self> {
        let pd = parent.dim();
        let fits = |start: usize, len: usize, limit: usize| {
            start.checked_add(len).is_some_and(|end| end <= limit)
        };
        if !fits(top, rows, pd.rows) || !fits(left, cols, pd.cols) {
            return Err(Error::dimension_mismatch(
                "window",
                pd,
                Dimension::new(top.saturating_add(rows), left.saturating_add(cols)),
            ));
        }
        Ok(MatrixView {
            parent,
            mapping: Mapping::Window { top, left },
            shape: Dimension::new(rows, cols),
            transposed: false,
        })
    }

    pub(crate) fn gather(parent: P, rows: Vec<usize>, cols: Vec<usize>) -> Result<Self> {
        let pd = parent.dim();
        if let Some(&r) = rows.iter().find(|&&r| r >= pd.rows) {
            return Err(Error::out_of_bounds(r, pd.rows));
        }
        if let Some(&c) = cols.iter().find(|&&c| c >= pd.cols) {
            return Err(Error::out_of_bounds(c, pd.cols));
        }
        let shape = Dimension::new(rows.len(), cols.len());
        Ok(MatrixView {
            parent,
            mapping: Mapping::Gather { rows, cols },
            shape,
            transposed: false,
        })
    }

    pub(crate) fn transposed(parent: P) -> Self {
        let shape = parent.dim();
        MatrixView {
            parent,
            mapping: Mapping::Window { top: 0, left: 0 },
            shape,
            transposed: true,
        }
    }

    /// Same region, rows and columns swapped
    pub fn into_transposed(mut self) -> Self {
        self.transposed = !self.transposed;
        self
    }

    pub fn parent(&self) -> &P {
        &self.parent
    }

    /// Map view coordinates to parent coordinates
    #[inline]
    fn locate(&self, r: usize, c: usize) -> (usize, usize) {
        let dim = self.dim();
        assert!(
            r < dim.rows && c < dim.cols,
            "index ({r}, {c}) out of bounds for {dim} view"
        );
        let (r, c) = if self.transposed { (c, r) } else { (r, c) };
        match &self.mapping {
            Mapping::Window { top, left } => (top + r, left + c),
            Mapping::Gather { rows, cols } => (rows[r], cols[c]),
        }
    }
}

impl<P: MatrixLike> MatrixLike for MatrixView<P> {
    fn dim(&self) -> Dimension {
        if self.transposed {
            self.shape.transposed()
        } else {
            self.shape
        }
    }

    #[inline]
    fn get(&self, r: usize, c: usize) -> f64 {
        let (pr, pc) = self.locate(r, c);
        self.parent.get(pr, pc)
    }
}

impl<P: MatrixLikeMut> MatrixLikeMut for MatrixView<P> {
    #[inline]
    fn set(&mut self, r: usize, c: usize, value: f64) {
        let (pr, pc) = self.locate(r, c);
        self.parent.set(pr, pc, value)
    }
}

/// A one-row or one-column view, addressable as a vector
#[derive(Clone, Debug)]
pub struct VectorView<P>(MatrixView<P>);

impl<P: MatrixLike> VectorView<P> {
    /// Row `index` of `parent`; reports 1 x n, or n x 1 when orientation is not preserved
    pub(crate) fn row(parent: P, index: usize, preserve_orientation: bool) -> Result<Self> {
        let dim = parent.dim();
        if index >= dim.rows {
            return Err(Error::out_of_bounds(index, dim.rows));
        }
        let view = MatrixView::window(parent, index, 0, 1, dim.cols)?;
        Ok(VectorView(if preserve_orientation {
            view
        } else {
            view.into_transposed()
        }))
    }

    /// Column `index` of `parent`; reports n x 1, or 1 x n when orientation is not preserved
    pub(crate) fn col(parent: P, index: usize, preserve_orientation: bool) -> Result<Self> {
        let dim = parent.dim();
        if index >= dim.cols {
            return Err(Error::out_of_bounds(index, dim.cols));
        }
        let view = MatrixView::window(parent, 0, index, dim.rows, 1)?;
        Ok(VectorView(if preserve_orientation {
            view
        } else {
            view.into_transposed()
        }))
    }

    pub fn into_inner(self) -> MatrixView<P> {
        self.0
    }
}

impl<P: MatrixLike> MatrixLike for VectorView<P> {
    fn dim(&self) -> Dimension {
        self.0.dim()
    }

    #[inline]
    fn get(&self, r: usize, c: usize) -> f64 {
        self.0.get(r, c)
    }
}

impl<P: MatrixLikeMut> MatrixLikeMut for VectorView<P> {
    #[inline]
    fn set(&mut self, r: usize, c: usize, value: f64) {
        self.0.set(r, c, value)
    }
}

impl<P: MatrixLike> VectorLike for VectorView<P> {}

impl<P: MatrixLikeMut> VectorLikeMut for VectorView<P> {}
