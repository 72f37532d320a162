//! tabkit: typed columnar frames with a dense matrix layer
//!
//! Frames are built from row-major untyped values with per-column schema
//! inference, filtered through zero-copy column views, and converted into
//! dense matrices for numeric work.

pub mod error;
pub mod linalg;
pub mod model;
pub mod table;

pub use error::{Error, Result};
pub use linalg::{
    matrix_of, vector_of, zeros, DenseBackend, DenseMatrix, MatrixLike, MatrixLikeMut, MatrixView,
    NumericBackend, Orientation, Vector, VectorLike, VectorLikeMut, VectorView,
};
pub use model::{LinearRegression, LinearRegressionConfig, Model};
pub use table::{
    dataframe_of, infer_type, Column, ColumnBuilder, ColumnType, DataFrame, DataFrameBuilder,
    DataType, Dimension, InferenceOptions, Kind, NumericType, Opaque, Row, TypedColumn, Value,
};
