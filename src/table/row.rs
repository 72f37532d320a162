//! Row accessor over a frame

use super::column::ColumnType;
use super::frame::DataFrame;
use super::value::Value;
use crate::error::{Error, Result};
use crate::linalg::{Orientation, Vector};

/// One row of a [`DataFrame`], borrowed
///
/// Getters are typed and checked: reading an Int64 column with `get_int`
/// fails with `TypeMismatch` rather than converting. Absent slots read as
/// `None`.
#[derive(Clone, Copy, Debug)]
pub struct Row<'a> {
    frame: &'a DataFrame,
    index: usize,
}

impl<'a> Row<'a> {
    pub(crate) fn new(frame: &'a DataFrame, index: usize) -> Self {
        Row { frame, index }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.frame.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.ncols() == 0
    }

    /// Column position for `name` (first match)
    pub fn resolve(&self, name: &str) -> Result<usize> {
        self.frame
            .position(name)
            .ok_or_else(|| Error::no_such_column(name))
    }

    /// Typed read of the column at `position`
    pub fn get_at<T: ColumnType>(&self, position: usize) -> Result<Option<T::Item<'a>>> {
        self.frame.column_at(position)?.cast::<T>()?.get(self.index)
    }

    /// Typed read of the column named `name`
    pub fn get<T: ColumnType>(&self, name: &str) -> Result<Option<T::Item<'a>>> {
        self.get_at::<T>(self.resolve(name)?)
    }

    pub fn get_int(&self, name: &str) -> Result<Option<i32>> {
        self.get::<i32>(name)
    }

    pub fn get_long(&self, name: &str) -> Result<Option<i64>> {
        self.get::<i64>(name)
    }

    pub fn get_double(&self, name: &str) -> Result<Option<f64>> {
        self.get::<f64>(name)
    }

    pub fn get_string(&self, name: &str) -> Result<Option<&'a str>> {
        self.get::<String>(name)
    }

    pub fn get_int_at(&self, position: usize) -> Result<Option<i32>> {
        self.get_at::<i32>(position)
    }

    pub fn get_long_at(&self, position: usize) -> Result<Option<i64>> {
        self.get_at::<i64>(position)
    }

    pub fn get_double_at(&self, position: usize) -> Result<Option<f64>> {
        self.get_at::<f64>(position)
    }

    pub fn get_string_at(&self, position: usize) -> Result<Option<&'a str>> {
        self.get_at::<String>(position)
    }

    /// Untyped read; absent slots are `Value::Null`
    pub fn value(&self, name: &str) -> Result<Value> {
        self.value_at(self.resolve(name)?)
    }

    pub fn value_at(&self, position: usize) -> Result<Value> {
        self.frame.column_at(position)?.get(self.index)
    }

    /// Every value in the row, in column order
    pub fn values(&self) -> Vec<Value> {
        // `index` was checked against the frame when the row was made
        self.frame
            .columns()
            .iter()
            .map(|c| c.value_unchecked(self.index))
            .collect()
    }

    /// Numeric row as a row vector; absent slots become NaN
    pub fn to_vector(&self) -> Result<Vector> {
        let values = self
            .frame
            .columns()
            .iter()
            .map(|c| Ok(c.get_f64(self.index)?.unwrap_or(f64::NAN)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Vector::from_vec(values, Orientation::Row))
    }
}

impl PartialEq for Row<'_> {
    /// Rows are equal when they hold equal values, wherever they come from
    fn eq(&self, other: &Self) -> bool {
        self.values() == other.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::MatrixLike;
    use crate::table::{dataframe_of, Dimension};
    use crate::values;

    fn frame() -> DataFrame {
        dataframe_of(&["c1", "c2", "c3"])
            .build(values![
                10, 1.0, 0i64,
                Value::Null, 2.0, 1i64,
                11, Value::Null, Value::Null
            ])
            .unwrap()
    }

    #[test]
    fn test_absent_reads_as_none() {
        let df = frame();
        assert_eq!(df.row(0).unwrap().get_int("c1").unwrap(), Some(10));
        assert_eq!(df.row(1).unwrap().get_int("c1").unwrap(), None);
        assert_eq!(df.row(2).unwrap().get_double("c2").unwrap(), None);
        assert_eq!(df.row(1).unwrap().get_long("c3").unwrap(), Some(1));
    }

    #[test]
    fn test_getters_are_checked() {
        let df = frame();
        let row = df.row(0).unwrap();
        assert!(matches!(row.get_int("c3"), Err(Error::TypeMismatch { .. })));
        assert!(matches!(row.get_string("c1"), Err(Error::TypeMismatch { .. })));
        assert!(matches!(row.get_int("zz"), Err(Error::NoSuchColumn { .. })));
        assert!(df.row(3).is_err());
    }

    #[test]
    fn test_positional_access() {
        let df = frame();
        let row = df.row(0).unwrap();
        assert_eq!(row.resolve("c2").unwrap(), 1);
        assert_eq!(row.get_double_at(1).unwrap(), Some(1.0));
        assert_eq!(row.value_at(2).unwrap(), Value::Int64(0));
        assert!(row.value_at(3).is_err());
    }

    #[test]
    fn test_strings() {
        let df = dataframe_of(&["name"]).build(values!["john", Value::Null]).unwrap();
        assert_eq!(df.row(0).unwrap().get_string("name").unwrap(), Some("john"));
        assert_eq!(df.row(1).unwrap().get_string_at(0).unwrap(), None);
    }

    #[test]
    fn test_to_vector() {
        let df = frame();
        let v = df.row(2).unwrap().to_vector().unwrap();
        assert_eq!(v.dim(), Dimension::new(1, 3));
        assert_eq!(v.get(0, 0), 11.0);
        assert!(v.get(0, 1).is_nan());
    }

    #[test]
    fn test_row_equality_by_value() {
        let df = frame();
        let filtered = df.filter::<i32>("c1", |v| v.is_some()).unwrap();
        assert_eq!(filtered.row(1).unwrap(), df.row(2).unwrap());
        assert_ne!(filtered.row(0).unwrap(), df.row(1).unwrap());
    }

    #[test]
    fn test_values_follow_view_rows() {
        let df = frame();
        let filtered = df.filter::<i32>("c1", |v| v.is_some()).unwrap();
        assert_eq!(
            filtered.row(1).unwrap().values(),
            vec![Value::Int32(11), Value::Null, Value::Null]
        );
        assert_eq!(
            df.row(1).unwrap().values(),
            vec![Value::Null, Value::Float64(2.0), Value::Int64(1)]
        );
    }
}
