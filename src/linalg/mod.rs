//! Dense matrix and vector algebra
//!
//! Physical storage is a flat row-major `Vec<f64>`. Views translate
//! coordinates into a parent and never copy; `row`/`col` copy, the `*_view`
//! variants alias.

pub mod backend;
pub mod matrix;
pub mod vector;
pub mod view;

pub use backend::{matrix_of, vector_of, zeros, DenseBackend, NumericBackend};
pub use matrix::{DenseMatrix, MatrixLike, MatrixLikeMut};
pub use vector::{Orientation, Vector, VectorLike, VectorLikeMut};
pub use view::{MatrixView, VectorView};
