//! Core table and column types

pub mod bitmap;
pub mod builder;
pub mod column;
pub mod dtype;
pub mod frame;
pub mod row;
pub mod value;

use std::fmt;

pub use bitmap::Bitmap;
pub use builder::{dataframe_of, infer_type, DataFrameBuilder, InferenceOptions};
pub use column::{Column, ColumnBuilder, ColumnData, ColumnType, NumericType, TypedColumn};
pub use dtype::{DataType, Kind};
pub use frame::DataFrame;
pub use row::Row;
pub use value::{Opaque, Value};

/// Shape of a table or matrix
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Dimension {
    pub rows: usize,
    pub cols: usize,
}

impl Dimension {
    pub const fn new(rows: usize, cols: usize) -> Self {
        Dimension { rows, cols }
    }

    pub const fn transposed(self) -> Self {
        Dimension {
            rows: self.cols,
            cols: self.rows,
        }
    }

    /// Number of cells, `None` if it overflows `usize`
    pub const fn size(self) -> Option<usize> {
        self.rows.checked_mul(self.cols)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}
