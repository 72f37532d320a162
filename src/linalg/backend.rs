//! Numeric backend handle
//!
//! A backend is a stateless factory for vectors and matrices. Consumers take
//! one explicitly; the free functions below use the process-wide default,
//! which is installed at most once and otherwise falls back to `DenseBackend`.

use super::matrix::DenseMatrix;
use super::vector::{Orientation, Vector};
use crate::error::{Error, Result};
use std::fmt;
use std::sync::{Arc, OnceLock};

pub trait NumericBackend: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Column vector of `n` zeros
    fn zeros(&self, n: usize) -> Vector;

    /// Row vector holding a copy of `values`
    fn vector_of(&self, values: &[f64]) -> Vector;

    /// `rows x cols` matrix from row-major values
    fn matrix_of(&self, rows: usize, cols: usize, values: Vec<f64>) -> Result<DenseMatrix>;
}

/// Row-major `Vec<f64>` storage
#[derive(Clone, Copy, Debug, Default)]
pub struct DenseBackend;

impl NumericBackend for DenseBackend {
    fn name(&self) -> &'static str {
        "dense"
    }

    fn zeros(&self, n: usize) -> Vector {
        Vector::zeros(n, Orientation::Column)
    }

    fn vector_of(&self, values: &[f64]) -> Vector {
        Vector::from_vec(values.to_vec(), Orientation::Row)
    }

    fn matrix_of(&self, rows: usize, cols: usize, values: Vec<f64>) -> Result<DenseMatrix> {
        DenseMatrix::new(rows, cols, values)
    }
}

static DEFAULT_BACKEND: OnceLock<Arc<dyn NumericBackend>> = OnceLock::new();

/// Install the process-wide default backend
///
/// Only the first installation (or first use of the default) wins; later
/// calls fail with `UnsupportedOperation`.
pub fn install(backend: Arc<dyn NumericBackend>) -> Result<()> {
    let name = backend.name();
    DEFAULT_BACKEND.set(backend).map_err(|_| {
        log::warn!("numeric backend already initialized, ignoring '{name}'");
        Error::unsupported(format!(
            "numeric backend already initialized as '{}'",
            default_backend().name()
        ))
    })
}

pub fn default_backend() -> Arc<dyn NumericBackend> {
    Arc::clone(DEFAULT_BACKEND.get_or_init(|| Arc::new(DenseBackend)))
}

pub fn zeros(n: usize) -> Vector {
    default_backend().zeros(n)
}

pub fn vector_of(values: &[f64]) -> Vector {
    default_backend().vector_of(values)
}

pub fn matrix_of(rows: usize, cols: usize, values: Vec<f64>) -> Result<DenseMatrix> {
    default_backend().matrix_of(rows, cols, values)
}
