//! Schema inference and the row-major frame builder
//!
//! Input is a declared header plus a flat row-major stream of untyped
//! values. Each column's tag is the fold of `promote` over the kinds seen in
//! that column, widened to nullable when any slot is absent. Materialization
//! then coerces every value into the inferred tag.

use super::column::ColumnBuilder;
use super::dtype::{DataType, Kind};
use super::frame::DataFrame;
use super::value::Value;
use crate::error::{Error, Result};

/// Knobs for schema inference
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InferenceOptions {
    /// Kind given to a column with no present values (always nullable)
    pub all_null_kind: Kind,
}

impl Default for InferenceOptions {
    fn default() -> Self {
        InferenceOptions {
            all_null_kind: Kind::Int32,
        }
    }
}

impl InferenceOptions {
    pub fn with_all_null_kind(mut self, kind: Kind) -> Self {
        self.all_null_kind = kind;
        self
    }
}

/// Infer the tag of one column's values
///
/// ```
/// use tabkit::{infer_type, DataType, InferenceOptions, Value};
///
/// let values = [Value::Int32(1), Value::Null, Value::Float64(2.5)];
/// let dtype = infer_type(values.iter(), &InferenceOptions::default());
/// assert_eq!(dtype, DataType::FLOAT64.nullable_of());
/// ```
pub fn infer_type<'a, I>(values: I, options: &InferenceOptions) -> DataType
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut kind: Option<Kind> = None;
    let mut nullable = false;
    for v in values {
        match v.kind() {
            Some(k) => kind = Some(kind.map_or(k, |acc| acc.promote(k))),
            None => nullable = true,
        }
    }
    match kind {
        Some(kind) => DataType::with_nullable(kind, nullable),
        None => DataType::new(options.all_null_kind).nullable_of(),
    }
}

/// Start a frame with the given header
pub fn dataframe_of<S: AsRef<str>>(header: &[S]) -> DataFrameBuilder {
    DataFrameBuilder::new(header.iter().map(|s| s.as_ref().to_string()).collect())
}

/// Declared header waiting for row-major values
#[derive(Clone, Debug)]
pub struct DataFrameBuilder {
    header: Vec<String>,
    options: InferenceOptions,
}

impl DataFrameBuilder {
    pub fn new(header: Vec<String>) -> Self {
        DataFrameBuilder {
            header,
            options: InferenceOptions::default(),
        }
    }

    pub fn with_options(mut self, options: InferenceOptions) -> Self {
        self.options = options;
        self
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    fn check_shape(&self, len: usize) -> Result<usize> {
        let width = self.header.len();
        match (width, len) {
            (0, 0) => Ok(0),
            (0, _) => Err(Error::RaggedInput { values: len, width }),
            _ if len % width != 0 => Err(Error::RaggedInput { values: len, width }),
            _ => Ok(len / width),
        }
    }

    /// Inferred tag per header entry, without materializing anything
    pub fn infer_schema(&self, values: &[Value]) -> Result<Vec<DataType>> {
        self.check_shape(values.len())?;
        let width = self.header.len();
        Ok((0..width)
            .map(|c| infer_type(values.iter().skip(c).step_by(width), &self.options))
            .collect())
    }

    /// Partition, infer and materialize
    ///
    /// Fails with `RaggedInput` when the value count is not a multiple of the
    /// header width, and with `TypeMismatch` when a value cannot be coerced
    /// into its column's inferred tag.
    pub fn build<I>(&self, values: I) -> Result<DataFrame>
    where
        I: IntoIterator<Item = Value>,
    {
        let values: Vec<Value> = values.into_iter().collect();
        let rows = self.check_shape(values.len())?;
        let schema = self.infer_schema(&values)?;

        log::debug!(
            "inferred schema for {} rows: [{}]",
            rows,
            self.header
                .iter()
                .zip(&schema)
                .map(|(name, dtype)| format!("{name}: {dtype}"))
                .collect::<Vec<_>>()
                .join(", ")
        );

        let mut builders: Vec<ColumnBuilder> = self
            .header
            .iter()
            .zip(&schema)
            .map(|(name, &dtype)| ColumnBuilder::new(name.as_str(), dtype, rows))
            .collect();
        let width = builders.len();
        for (i, v) in values.into_iter().enumerate() {
            builders[i % width].push(v)?;
        }
        DataFrame::new(builders.into_iter().map(ColumnBuilder::finish).collect())
    }
}
