//! Models consuming frames through the matrix layer

pub mod linear;

pub use linear::{LinearRegression, LinearRegressionConfig};

use crate::error::Result;
use crate::table::{Column, DataFrame};

/// Supervised model over numeric feature frames
pub trait Model {
    /// Train on `features` (one row per sample) against `target`
    fn fit(&mut self, features: &DataFrame, target: &Column) -> Result<()>;

    /// One prediction per row of `features`
    fn predict(&self, features: &DataFrame) -> Result<Column>;
}
