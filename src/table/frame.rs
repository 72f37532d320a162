//! DataFrame: an ordered list of equal-length named columns
//!
//! Every operation returns a new frame over a new column list; the receiver is
//! never mutated. Filtering produces column views that share the original
//! storage, so only the surviving index list is allocated.

use super::column::{Column, ColumnType};
use super::row::Row;
use super::Dimension;
use crate::error::{Error, Result};
use crate::linalg::DenseMatrix;
use std::fmt;
use std::sync::Arc;

#[derive(Clone, Debug, Default)]
pub struct DataFrame {
    columns: Vec<Column>,
    rows: usize,
}

impl DataFrame {
    /// Fails with `DimensionMismatch` when column lengths differ
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let rows = columns.first().map_or(0, Column::len);
        if let Some(bad) = columns.iter().find(|c| c.len() != rows) {
            return Err(Error::dimension_mismatch(
                "dataframe",
                Dimension::new(rows, 1),
                Dimension::new(bad.len(), 1),
            ));
        }
        Ok(DataFrame { columns, rows })
    }

    pub fn dim(&self) -> Dimension {
        Dimension::new(self.rows, self.columns.len())
    }

    pub fn nrows(&self) -> usize {
        self.rows
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    /// Column names in order; duplicates are kept
    pub fn header(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Position of the first column named `name`
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    /// First column named `name`
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| Error::no_such_column(name))
    }

    pub fn column_at(&self, index: usize) -> Result<&Column> {
        self.columns
            .get(index)
            .ok_or_else(|| Error::out_of_bounds(index, self.columns.len()))
    }

    /// Project the named columns, in the order given
    pub fn select(&self, names: &[&str]) -> Result<DataFrame> {
        let columns = names
            .iter()
            .map(|name| self.column(name).cloned())
            .collect::<Result<Vec<_>>>()?;
        Ok(DataFrame {
            columns,
            rows: self.rows,
        })
    }

    /// Append one column; fails with `DimensionMismatch` on a row count mismatch
    ///
    /// An empty frame adopts the column's length.
    pub fn cbind(&self, column: Column) -> Result<DataFrame> {
        if !self.columns.is_empty() && column.len() != self.rows {
            return Err(Error::dimension_mismatch(
                "cbind",
                self.dim(),
                Dimension::new(column.len(), 1),
            ));
        }
        let rows = column.len();
        let mut columns = self.columns.clone();
        columns.push(column);
        Ok(DataFrame { columns, rows })
    }

    /// Append every column of `other`
    pub fn cbind_frame(&self, other: &DataFrame) -> Result<DataFrame> {
        if !self.columns.is_empty() && !other.columns.is_empty() && other.rows != self.rows {
            return Err(Error::dimension_mismatch("cbind", self.dim(), other.dim()));
        }
        let rows = if self.columns.is_empty() {
            other.rows
        } else {
            self.rows
        };
        let mut columns = self.columns.clone();
        columns.extend(other.columns.iter().cloned());
        Ok(DataFrame { columns, rows })
    }

    /// Remove every column named `name`; an unknown name leaves the frame as is
    pub fn drop(&self, name: &str) -> DataFrame {
        if self.position(name).is_none() {
            log::warn!("drop: no column named '{name}', frame unchanged");
        }
        DataFrame {
            columns: self
                .columns
                .iter()
                .filter(|c| c.name() != name)
                .cloned()
                .collect(),
            rows: self.rows,
        }
    }

    /// Rename the first column named `from`
    pub fn rename(&self, from: &str, to: &str) -> Result<DataFrame> {
        let pos = self.position(from).ok_or_else(|| Error::no_such_column(from))?;
        let mut columns = self.columns.clone();
        columns[pos] = columns[pos].alias(to);
        Ok(DataFrame {
            columns,
            rows: self.rows,
        })
    }

    /// Frame of views over the given rows, in the given order
    fn take_rows(&self, keep: Vec<usize>, what: &str) -> DataFrame {
        log::trace!("{what}: kept {} of {} rows", keep.len(), self.rows);
        let rows = keep.len();
        let keep: Arc<[usize]> = keep.into();
        DataFrame {
            columns: self
                .columns
                .iter()
                .map(|c| c.remap(Arc::clone(&keep)))
                .collect(),
            rows,
        }
    }

    /// Rows for which `pred` holds on column `name`
    ///
    /// `pred` runs exactly once per row, in row order. The result shares the
    /// receiver's storage.
    ///
    /// ```
    /// use tabkit::{dataframe_of, values};
    ///
    /// let df = dataframe_of(&["x"]).build(values![3, 10, 7]).unwrap();
    /// let big = df.filter::<i32>("x", |v| v.is_some_and(|x| x > 5)).unwrap();
    /// assert_eq!(big.nrows(), 2);
    /// ```
    pub fn filter<'a, T: ColumnType>(
        &'a self,
        name: &str,
        mut pred: impl FnMut(Option<T::Item<'a>>) -> bool,
    ) -> Result<DataFrame> {
        let a = self.column(name)?.cast::<T>()?;
        let keep = a
            .iter()
            .enumerate()
            .filter_map(|(i, x)| pred(x).then_some(i))
            .collect();
        Ok(self.take_rows(keep, "filter"))
    }

    /// Two-column filter; both columns advance in lock-step
    pub fn filter2<'a, A: ColumnType, B: ColumnType>(
        &'a self,
        first: &str,
        second: &str,
        mut pred: impl FnMut(Option<A::Item<'a>>, Option<B::Item<'a>>) -> bool,
    ) -> Result<DataFrame> {
        let a = self.column(first)?.cast::<A>()?;
        let b = self.column(second)?.cast::<B>()?;
        let keep = a
            .iter()
            .zip(b.iter())
            .enumerate()
            .filter_map(|(i, (x, y))| pred(x, y).then_some(i))
            .collect();
        Ok(self.take_rows(keep, "filter2"))
    }

    /// Three-column filter; all columns advance in lock-step
    pub fn filter3<'a, A: ColumnType, B: ColumnType, C: ColumnType>(
        &'a self,
        first: &str,
        second: &str,
        third: &str,
        mut pred: impl FnMut(Option<A::Item<'a>>, Option<B::Item<'a>>, Option<C::Item<'a>>) -> bool,
    ) -> Result<DataFrame> {
        let a = self.column(first)?.cast::<A>()?;
        let b = self.column(second)?.cast::<B>()?;
        let c = self.column(third)?.cast::<C>()?;
        let keep = a
            .iter()
            .zip(b.iter())
            .zip(c.iter())
            .enumerate()
            .filter_map(|(i, ((x, y), z))| pred(x, y, z).then_some(i))
            .collect();
        Ok(self.take_rows(keep, "filter3"))
    }

    /// Frame of views over the given rows
    pub fn take(&self, rows: &[usize]) -> Result<DataFrame> {
        if let Some(&bad) = rows.iter().find(|&&r| r >= self.rows) {
            return Err(Error::out_of_bounds(bad, self.rows));
        }
        Ok(self.take_rows(rows.to_vec(), "take"))
    }

    /// Same frame with every column compacted into owned storage
    pub fn materialize(&self) -> DataFrame {
        DataFrame {
            columns: self.columns.iter().map(Column::materialize).collect(),
            rows: self.rows,
        }
    }

    pub fn row(&self, index: usize) -> Result<Row<'_>> {
        if index >= self.rows {
            return Err(Error::out_of_bounds(index, self.rows));
        }
        Ok(Row::new(self, index))
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> + '_ {
        (0..self.rows).map(move |i| Row::new(self, i))
    }

    /// Copy every column into a `rows x cols` matrix
    ///
    /// All columns must be numeric; absent slots become NaN.
    pub fn to_matrix(&self) -> Result<DenseMatrix> {
        let vectors = self
            .columns
            .iter()
            .map(Column::to_vector)
            .collect::<Result<Vec<_>>>()?;
        let cols = vectors.len();
        let dim = Dimension::new(self.rows, cols);
        let len = dim
            .size()
            .ok_or_else(|| Error::dimension_mismatch("to_matrix", dim, Dimension::new(0, 0)))?;
        let mut data = vec![0.0; len];
        for (c, v) in vectors.into_iter().enumerate() {
            for (r, x) in v.into_vec().into_iter().enumerate() {
                data[r * cols + c] = x;
            }
        }
        DenseMatrix::new(self.rows, cols, data)
    }
}

impl From<Column> for DataFrame {
    fn from(column: Column) -> Self {
        let rows = column.len();
        DataFrame {
            columns: vec![column],
            rows,
        }
    }
}

/// Header line, then one tab-separated line per row
impl fmt::Display for DataFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.header().join("\t"))?;
        for i in 0..self.rows {
            let mut sep = "";
            for c in &self.columns {
                let v = c.get(i).map_err(|_| fmt::Error)?;
                write!(f, "{sep}{v}")?;
                sep = "\t";
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::MatrixLike;
    use crate::table::{dataframe_of, DataType, Value};
    use crate::values;

    fn people() -> DataFrame {
        dataframe_of(&["name", "birthYear"])
            .build(values!["john", 1979, "jane", 1992, "jim", 2001])
            .unwrap()
    }

    #[test]
    fn test_new_rejects_ragged_columns() {
        let err = DataFrame::new(vec![Column::new("a", vec![1, 2]), Column::new("b", vec![1])])
            .unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { .. }));
    }

    #[test]
    fn test_column_lookup() {
        let df = people();
        assert_eq!(df.header(), vec!["name", "birthYear"]);
        assert_eq!(df.column("name").unwrap().dtype(), DataType::UTF8);
        assert_eq!(
            df.column("nope").unwrap_err(),
            Error::no_such_column("nope")
        );
        assert!(df.column_at(2).is_err());
    }

    #[test]
    fn test_duplicate_names_resolve_to_first() {
        let df = people().cbind(Column::new("name", vec![1, 2, 3])).unwrap();
        assert_eq!(df.column("name").unwrap().dtype(), DataType::UTF8);
        assert_eq!(df.position("name"), Some(0));
    }

    #[test]
    fn test_select_keeps_given_order() {
        let df = people().select(&["birthYear", "name"]).unwrap();
        assert_eq!(df.header(), vec!["birthYear", "name"]);
        assert!(people().select(&["x"]).is_err());
    }

    #[test]
    fn test_cbind_and_drop() {
        let df = people();
        let years = df.column("birthYear").unwrap();
        let age = years
            .map(DataType::INT32, |v| v.as_i32().map(|y| 2018 - y))
            .unwrap()
            .alias("age");
        let wide = df.cbind(age).unwrap();
        assert_eq!(wide.dim(), Dimension::new(3, 3));
        assert_eq!(df.dim(), Dimension::new(3, 2));

        let back = wide.drop("age");
        assert_eq!(back.header(), df.header());

        let err = df.cbind(Column::new("short", vec![1])).unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { .. }));
        assert_eq!(df.drop("missing").header(), df.header());
    }

    #[test]
    fn test_cbind_frame() {
        let df = people();
        let other = DataFrame::from(Column::new("id", vec![1i64, 2, 3]));
        let wide = df.cbind_frame(&other).unwrap();
        assert_eq!(wide.header(), vec!["name", "birthYear", "id"]);

        let short = DataFrame::from(Column::new("id", vec![1i64]));
        assert!(df.cbind_frame(&short).is_err());
        assert_eq!(DataFrame::default().cbind_frame(&df).unwrap().nrows(), 3);
    }

    #[test]
    fn test_filter_shares_storage_and_keeps_order() {
        let df = people();
        let young = df
            .filter::<i32>("birthYear", |y| y.is_some_and(|y| y > 1985))
            .unwrap();
        assert_eq!(young.nrows(), 2);
        let names = young.column("name").unwrap();
        assert!(names.is_view());
        assert!(names.shares_storage_with(df.column("name").unwrap()));
        assert_eq!(names.get(0).unwrap(), Value::from("jane"));
        assert_eq!(names.get(1).unwrap(), Value::from("jim"));
    }

    #[test]
    fn test_filter_calls_predicate_once_per_row() {
        let df = people();
        let mut seen = Vec::new();
        df.filter::<String>("name", |n| {
            seen.push(n.map(str::to_owned));
            true
        })
        .unwrap();
        assert_eq!(
            seen,
            vec![Some("john".into()), Some("jane".into()), Some("jim".into())]
        );
    }

    #[test]
    fn test_filter_type_mismatch() {
        let err = people().filter::<f64>("birthYear", |_| true).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
    }

    #[test]
    fn test_filter2_and_filter3_lock_step() {
        let df = dataframe_of(&["a", "b", "c"])
            .build(values![1, 10, "x", 2, 20, "y", 3, 30, "z"])
            .unwrap();
        let f2 = df
            .filter2::<i32, i32>("a", "b", |a, b| a.unwrap_or(0) * 10 == b.unwrap_or(0) && a != Some(2))
            .unwrap();
        assert_eq!(f2.nrows(), 2);

        let f3 = df
            .filter3::<i32, i32, String>("a", "b", "c", |a, b, c| {
                a == Some(3) && b == Some(30) && c == Some("z")
            })
            .unwrap();
        assert_eq!(f3.nrows(), 1);
        assert_eq!(f3.row(0).unwrap().get_string("c").unwrap(), Some("z"));
    }

    #[test]
    fn test_filter_of_filter() {
        let df = people();
        let a = df.filter::<i32>("birthYear", |y| y != Some(1979)).unwrap();
        let b = a.filter::<String>("name", |n| n == Some("jim")).unwrap();
        assert_eq!(b.nrows(), 1);
        assert_eq!(b.row(0).unwrap().get_int("birthYear").unwrap(), Some(2001));
        assert!(!b.materialize().column("name").unwrap().is_view());
    }

    #[test]
    fn test_to_matrix() {
        let df = dataframe_of(&["x", "y"])
            .build(values![1, 2.5, 3, Value::Null])
            .unwrap();
        let m = df.to_matrix().unwrap();
        assert_eq!(m.dim(), Dimension::new(2, 2));
        assert_eq!(m.get(0, 1), 2.5);
        assert_eq!(m.get(1, 0), 3.0);
        assert!(m.get(1, 1).is_nan());

        assert!(people().to_matrix().is_err());
    }

    #[test]
    fn test_display() {
        let df = dataframe_of(&["a", "b"]).build(values![1, "x", Value::Null, "y"]).unwrap();
        assert_eq!(df.to_string(), "a\tb\n1\tx\nnull\ty\n");
    }
}
