//! Typed column with presence tracking
//!
//! One physical representation per kind:
//! - Int32 / Int64 / Float64: contiguous `Vec` + optional presence `Bitmap`
//! - Utf8: `Vec<Option<String>>`
//! - Generic: `Vec<Value>` with `Value::Null` for absent
//!
//! Columns are immutable value handles over `Arc`'d storage. Renaming, mapping
//! and filtering all return a new `Column`; only filtering and aliasing share
//! the parent's storage.

use super::bitmap::Bitmap;
use super::dtype::{DataType, Kind};
use super::value::Value;
use crate::error::{Error, Result};
use crate::linalg::{Orientation, Vector};
use std::marker::PhantomData;
use std::sync::Arc;

/// Physical storage of one column
#[derive(Clone, Debug, PartialEq)]
pub enum ColumnData {
    Int32 {
        values: Vec<i32>,
        validity: Option<Bitmap>,
    },
    Int64 {
        values: Vec<i64>,
        validity: Option<Bitmap>,
    },
    Float64 {
        values: Vec<f64>,
        validity: Option<Bitmap>,
    },
    Utf8(Vec<Option<String>>),
    Generic(Vec<Value>),
}

#[inline]
fn present(validity: &Option<Bitmap>, i: usize) -> bool {
    validity.as_ref().map_or(true, |bm| bm.get(i))
}

fn gather_validity(validity: &Option<Bitmap>, indices: &[usize]) -> Option<Bitmap> {
    let bm = validity.as_ref()?;
    let mut out = Bitmap::with_capacity(indices.len());
    for &i in indices {
        out.push(bm.get(i));
    }
    (out.null_count() > 0).then_some(out)
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Int32 { values, .. } => values.len(),
            ColumnData::Int64 { values, .. } => values.len(),
            ColumnData::Float64 { values, .. } => values.len(),
            ColumnData::Utf8(values) => values.len(),
            ColumnData::Generic(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> Kind {
        match self {
            ColumnData::Int32 { .. } => Kind::Int32,
            ColumnData::Int64 { .. } => Kind::Int64,
            ColumnData::Float64 { .. } => Kind::Float64,
            ColumnData::Utf8(_) => Kind::Utf8,
            ColumnData::Generic(_) => Kind::Generic,
        }
    }

    /// Presence at a physical index
    pub fn is_present(&self, i: usize) -> bool {
        match self {
            ColumnData::Int32 { validity, .. }
            | ColumnData::Int64 { validity, .. }
            | ColumnData::Float64 { validity, .. } => present(validity, i),
            ColumnData::Utf8(values) => values[i].is_some(),
            ColumnData::Generic(values) => !values[i].is_null(),
        }
    }

    pub fn null_count(&self) -> usize {
        match self {
            ColumnData::Int32 { validity, .. }
            | ColumnData::Int64 { validity, .. }
            | ColumnData::Float64 { validity, .. } => {
                validity.as_ref().map_or(0, Bitmap::null_count)
            }
            ColumnData::Utf8(values) => values.iter().filter(|v| v.is_none()).count(),
            ColumnData::Generic(values) => values.iter().filter(|v| v.is_null()).count(),
        }
    }

    /// Untyped read at a physical index
    pub fn value(&self, i: usize) -> Value {
        if !self.is_present(i) {
            return Value::Null;
        }
        match self {
            ColumnData::Int32 { values, .. } => Value::Int32(values[i]),
            ColumnData::Int64 { values, .. } => Value::Int64(values[i]),
            ColumnData::Float64 { values, .. } => Value::Float64(values[i]),
            ColumnData::Utf8(values) => values[i].clone().into(),
            ColumnData::Generic(values) => values[i].clone(),
        }
    }

    /// Numeric read widened to `f64`, `None` for absent or non-numeric slots
    pub fn f64_at(&self, i: usize) -> Option<f64> {
        match self {
            ColumnData::Int32 { values, validity } => {
                present(validity, i).then(|| f64::from(values[i]))
            }
            ColumnData::Int64 { values, validity } => {
                present(validity, i).then(|| values[i] as f64)
            }
            ColumnData::Float64 { values, validity } => present(validity, i).then(|| values[i]),
            ColumnData::Utf8(_) | ColumnData::Generic(_) => None,
        }
    }

    /// Copy the given physical rows into fresh storage
    pub fn gather(&self, indices: &[usize]) -> ColumnData {
        match self {
            ColumnData::Int32 { values, validity } => ColumnData::Int32 {
                values: indices.iter().map(|&i| values[i]).collect(),
                validity: gather_validity(validity, indices),
            },
            ColumnData::Int64 { values, validity } => ColumnData::Int64 {
                values: indices.iter().map(|&i| values[i]).collect(),
                validity: gather_validity(validity, indices),
            },
            ColumnData::Float64 { values, validity } => ColumnData::Float64 {
                values: indices.iter().map(|&i| values[i]).collect(),
                validity: gather_validity(validity, indices),
            },
            ColumnData::Utf8(values) => {
                ColumnData::Utf8(indices.iter().map(|&i| values[i].clone()).collect())
            }
            ColumnData::Generic(values) => {
                ColumnData::Generic(indices.iter().map(|&i| values[i].clone()).collect())
            }
        }
    }
}

/// Owned storage, or a view remapping rows into a parent's storage
#[derive(Clone, Debug)]
enum Storage {
    Owned(Arc<ColumnData>),
    View {
        parent: Arc<ColumnData>,
        indices: Arc<[usize]>,
    },
}

impl Storage {
    fn data(&self) -> &Arc<ColumnData> {
        match self {
            Storage::Owned(data) => data,
            Storage::View { parent, .. } => parent,
        }
    }
}

/// A named, typed column
#[derive(Clone, Debug)]
pub struct Column {
    name: String,
    dtype: DataType,
    storage: Storage,
}

impl Column {
    /// Wrap physical storage under a tag
    ///
    /// The tag is widened to nullable when the data holds absent slots.
    pub fn from_data(name: impl Into<String>, dtype: DataType, data: ColumnData) -> Result<Self> {
        if dtype.kind() != data.kind() {
            return Err(Error::type_mismatch(dtype, data.kind()));
        }
        let dtype = if data.null_count() > 0 {
            dtype.nullable_of()
        } else {
            dtype
        };
        Ok(Column {
            name: name.into(),
            dtype,
            storage: Storage::Owned(Arc::new(data)),
        })
    }

    /// Non-nullable column of native values
    pub fn new<T: ColumnType>(name: impl Into<String>, values: Vec<T>) -> Self {
        let data = T::into_data(values);
        let dtype = DataType::with_nullable(T::KIND, data.null_count() > 0);
        Column {
            name: name.into(),
            dtype,
            storage: Storage::Owned(Arc::new(data)),
        }
    }

    /// Nullable column; `None` entries are absent
    pub fn nullable<T: ColumnType>(name: impl Into<String>, values: Vec<Option<T>>) -> Self {
        Column {
            name: name.into(),
            dtype: DataType::new(T::KIND).nullable_of(),
            storage: Storage::Owned(Arc::new(T::from_options(values))),
        }
    }

    /// Build a column of the target tag from untyped values
    pub fn from_values<I, V>(name: impl Into<String>, dtype: DataType, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = values.into_iter();
        let mut builder = ColumnBuilder::new(name, dtype, values.size_hint().0);
        for v in values {
            builder.push(v.into())?;
        }
        Ok(builder.finish())
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn dtype(&self) -> DataType {
        self.dtype
    }

    #[inline]
    pub fn kind(&self) -> Kind {
        self.dtype.kind()
    }

    pub fn len(&self) -> usize {
        match &self.storage {
            Storage::Owned(data) => data.len(),
            Storage::View { indices, .. } => indices.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when this column remaps rows of another column's storage
    pub fn is_view(&self) -> bool {
        matches!(self.storage, Storage::View { .. })
    }

    /// Check if both columns read from the same backing storage
    pub fn shares_storage_with(&self, other: &Column) -> bool {
        Arc::ptr_eq(self.storage.data(), other.storage.data())
    }

    /// Backing storage (the parent's, for views)
    pub fn data(&self) -> &ColumnData {
        self.storage.data()
    }

    /// Translate a logical row to a physical row of the backing storage
    #[inline]
    fn physical(&self, index: usize) -> Result<usize> {
        match &self.storage {
            Storage::Owned(data) => {
                if index < data.len() {
                    Ok(index)
                } else {
                    Err(Error::out_of_bounds(index, data.len()))
                }
            }
            Storage::View { indices, .. } => indices
                .get(index)
                .copied()
                .ok_or_else(|| Error::out_of_bounds(index, indices.len())),
        }
    }

    /// Physical row for an index already known to be in range
    #[inline]
    fn physical_unchecked(&self, index: usize) -> usize {
        match &self.storage {
            Storage::Owned(_) => index,
            Storage::View { indices, .. } => indices[index],
        }
    }

    /// Untyped read of a row the caller has already bounds-checked
    pub(crate) fn value_unchecked(&self, index: usize) -> Value {
        self.data().value(self.physical_unchecked(index))
    }

    /// Untyped, bounds-checked read; absent slots read as `Value::Null`
    pub fn get(&self, index: usize) -> Result<Value> {
        let i = self.physical(index)?;
        Ok(self.data().value(i))
    }

    /// Numeric read widened to `f64`; `None` when absent
    ///
    /// Fails with `TypeMismatch` on Utf8 and Generic columns.
    pub fn get_f64(&self, index: usize) -> Result<Option<f64>> {
        if !self.kind().is_numeric() {
            return Err(Error::type_mismatch("numeric column", self.dtype));
        }
        let i = self.physical(index)?;
        Ok(self.data().f64_at(i))
    }

    pub fn is_null(&self, index: usize) -> Result<bool> {
        let i = self.physical(index)?;
        Ok(!self.data().is_present(i))
    }

    pub fn null_count(&self) -> usize {
        match &self.storage {
            Storage::Owned(data) => data.null_count(),
            Storage::View { parent, indices } => {
                indices.iter().filter(|&&i| !parent.is_present(i)).count()
            }
        }
    }

    /// Untyped values in row order
    pub fn iter(&self) -> impl Iterator<Item = Value> + '_ {
        (0..self.len()).map(move |i| self.value_unchecked(i))
    }

    /// Checked typed re-entry
    ///
    /// Fails with `TypeMismatch` when the column's kind is not `T`'s kind.
    pub fn cast<T: ColumnType>(&self) -> Result<TypedColumn<'_, T>> {
        if self.kind() != T::KIND {
            return Err(Error::type_mismatch(T::KIND, self.dtype));
        }
        Ok(TypedColumn {
            column: self,
            _marker: PhantomData,
        })
    }

    /// Apply `f` to every value, storing results under `target`
    ///
    /// Results that cannot be coerced to `target` become absent when `target`
    /// is nullable and fail with `TypeMismatch` otherwise.
    pub fn map<V, F>(&self, target: DataType, f: F) -> Result<Column>
    where
        V: Into<Value>,
        F: FnMut(Value) -> V,
    {
        map_into(&self.name, target, self.len(), self.iter().map(f))
    }

    /// Same storage under a new name
    pub fn alias(&self, name: impl Into<String>) -> Column {
        Column {
            name: name.into(),
            dtype: self.dtype,
            storage: self.storage.clone(),
        }
    }

    /// View of the given rows, sharing this column's storage
    ///
    /// Taking rows of a view composes the index lists, so every read stays a
    /// single indirection into the original storage.
    pub fn take(&self, rows: &[usize]) -> Result<Column> {
        let len = self.len();
        if let Some(&bad) = rows.iter().find(|&&r| r >= len) {
            return Err(Error::out_of_bounds(bad, len));
        }
        Ok(self.remap(rows.into()))
    }

    /// `take` without the bounds check; an owned column adopts `rows` as is
    pub(crate) fn remap(&self, rows: Arc<[usize]>) -> Column {
        let indices = match &self.storage {
            Storage::Owned(_) => rows,
            Storage::View { indices, .. } => rows.iter().map(|&r| indices[r]).collect(),
        };
        Column {
            name: self.name.clone(),
            dtype: self.dtype,
            storage: Storage::View {
                parent: Arc::clone(self.storage.data()),
                indices,
            },
        }
    }

    /// Owned copy; views are compacted into fresh storage
    pub fn materialize(&self) -> Column {
        let data = match &self.storage {
            Storage::Owned(data) => data.as_ref().clone(),
            Storage::View { parent, indices } => parent.gather(indices),
        };
        Column {
            name: self.name.clone(),
            dtype: self.dtype,
            storage: Storage::Owned(Arc::new(data)),
        }
    }

    /// Copy a numeric column into a column vector; absent slots become NaN
    pub fn to_vector(&self) -> Result<Vector> {
        if !self.kind().is_numeric() {
            return Err(Error::type_mismatch("numeric column", self.dtype));
        }
        let data = self.data();
        let values = (0..self.len())
            .map(|i| data.f64_at(self.physical_unchecked(i)).unwrap_or(f64::NAN))
            .collect();
        Ok(Vector::from_vec(values, Orientation::Column))
    }
}

/// Funnel for every mapping path: dispatch on the target tag's kind
pub(crate) fn map_into<I, V>(name: &str, target: DataType, len: usize, values: I) -> Result<Column>
where
    I: Iterator<Item = V>,
    V: Into<Value>,
{
    let mut builder = ColumnBuilder::new(name, target, len);
    for v in values {
        if let Err(err) = builder.push(v.into()) {
            if !target.is_nullable() {
                return Err(err);
            }
            builder.push_null()?;
        }
    }
    Ok(builder.finish())
}

enum Buffer {
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Float64(Vec<f64>),
    Utf8(Vec<Option<String>>),
    Generic(Vec<Value>),
}

/// Incremental builder for one column of a fixed tag
///
/// Numeric kinds widen on the way in (Int32 into Int64, any integer into
/// Float64). Utf8 accepts only strings and Generic accepts anything.
pub struct ColumnBuilder {
    name: String,
    dtype: DataType,
    buffer: Buffer,
    presence: Bitmap,
}

impl ColumnBuilder {
    pub fn new(name: impl Into<String>, dtype: DataType, capacity: usize) -> Self {
        let buffer = match dtype.kind() {
            Kind::Int32 => Buffer::Int32(Vec::with_capacity(capacity)),
            Kind::Int64 => Buffer::Int64(Vec::with_capacity(capacity)),
            Kind::Float64 => Buffer::Float64(Vec::with_capacity(capacity)),
            Kind::Utf8 => Buffer::Utf8(Vec::with_capacity(capacity)),
            Kind::Generic => Buffer::Generic(Vec::with_capacity(capacity)),
        };
        ColumnBuilder {
            name: name.into(),
            dtype,
            buffer,
            presence: Bitmap::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.presence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presence.is_empty()
    }

    /// Append an absent slot; fails for non-nullable tags
    pub fn push_null(&mut self) -> Result<()> {
        if !self.dtype.is_nullable() {
            return Err(Error::type_mismatch(self.dtype, "Null"));
        }
        match &mut self.buffer {
            Buffer::Int32(v) => v.push(0),
            Buffer::Int64(v) => v.push(0),
            Buffer::Float64(v) => v.push(0.0),
            Buffer::Utf8(v) => v.push(None),
            Buffer::Generic(v) => v.push(Value::Null),
        }
        self.presence.push(false);
        Ok(())
    }

    /// Append a value, coercing it into this builder's kind
    pub fn push(&mut self, value: Value) -> Result<()> {
        if value.is_null() {
            return self.push_null();
        }
        let found = value.kind_name();
        let pushed = match (&mut self.buffer, value) {
            (Buffer::Int32(v), value) => value.as_i32().map(|x| v.push(x)),
            (Buffer::Int64(v), value) => value.as_i64().map(|x| v.push(x)),
            (Buffer::Float64(v), value) => value.as_f64().map(|x| v.push(x)),
            (Buffer::Utf8(v), Value::Utf8(s)) => {
                v.push(Some(s));
                Some(())
            }
            (Buffer::Utf8(_), _) => None,
            (Buffer::Generic(v), value) => {
                v.push(value);
                Some(())
            }
        };
        if pushed.is_none() {
            return Err(Error::type_mismatch(self.dtype, found));
        }
        self.presence.push(true);
        Ok(())
    }

    pub fn finish(self) -> Column {
        let validity = (self.presence.null_count() > 0).then_some(self.presence);
        let data = match self.buffer {
            Buffer::Int32(values) => ColumnData::Int32 { values, validity },
            Buffer::Int64(values) => ColumnData::Int64 { values, validity },
            Buffer::Float64(values) => ColumnData::Float64 { values, validity },
            Buffer::Utf8(values) => ColumnData::Utf8(values),
            Buffer::Generic(values) => ColumnData::Generic(values),
        };
        Column {
            name: self.name,
            dtype: self.dtype,
            storage: Storage::Owned(Arc::new(data)),
        }
    }
}

/// Native element type of a column kind
pub trait ColumnType: Sized + 'static {
    const KIND: Kind;

    /// What a typed read yields: the value itself for numbers, a borrow otherwise
    type Item<'a>;

    /// Read a physical slot, `None` when absent
    fn item_at(data: &ColumnData, index: usize) -> Option<Self::Item<'_>>;

    fn into_data(values: Vec<Self>) -> ColumnData;

    fn from_options(values: Vec<Option<Self>>) -> ColumnData;
}

/// Numeric column element types
pub trait NumericType: ColumnType + Copy + PartialOrd {
    fn from_item(item: Self::Item<'_>) -> Self;

    fn to_f64(self) -> f64;
}

macro_rules! numeric_column_type {
    ($ty:ty, $kind:ident) => {
        impl ColumnType for $ty {
            const KIND: Kind = Kind::$kind;

            type Item<'a> = $ty;

            #[inline]
            fn item_at(data: &ColumnData, index: usize) -> Option<$ty> {
                match data {
                    ColumnData::$kind { values, validity } => {
                        present(validity, index).then(|| values[index])
                    }
                    _ => None,
                }
            }

            fn into_data(values: Vec<$ty>) -> ColumnData {
                ColumnData::$kind {
                    values,
                    validity: None,
                }
            }

            fn from_options(values: Vec<Option<$ty>>) -> ColumnData {
                let mut validity = Bitmap::with_capacity(values.len());
                let values = values
                    .into_iter()
                    .map(|v| {
                        validity.push(v.is_some());
                        v.unwrap_or_default()
                    })
                    .collect();
                let validity = (validity.null_count() > 0).then_some(validity);
                ColumnData::$kind { values, validity }
            }
        }

        impl NumericType for $ty {
            #[inline]
            fn from_item(item: $ty) -> $ty {
                item
            }

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }
        }
    };
}

numeric_column_type!(i32, Int32);
numeric_column_type!(i64, Int64);
numeric_column_type!(f64, Float64);

impl ColumnType for String {
    const KIND: Kind = Kind::Utf8;

    type Item<'a> = &'a str;

    fn item_at(data: &ColumnData, index: usize) -> Option<&str> {
        match data {
            ColumnData::Utf8(values) => values[index].as_deref(),
            _ => None,
        }
    }

    fn into_data(values: Vec<String>) -> ColumnData {
        ColumnData::Utf8(values.into_iter().map(Some).collect())
    }

    fn from_options(values: Vec<Option<String>>) -> ColumnData {
        ColumnData::Utf8(values)
    }
}

impl ColumnType for Value {
    const KIND: Kind = Kind::Generic;

    type Item<'a> = &'a Value;

    fn item_at(data: &ColumnData, index: usize) -> Option<&Value> {
        match data {
            ColumnData::Generic(values) => Some(&values[index]).filter(|v| !v.is_null()),
            _ => None,
        }
    }

    fn into_data(values: Vec<Value>) -> ColumnData {
        ColumnData::Generic(values)
    }

    fn from_options(values: Vec<Option<Value>>) -> ColumnData {
        ColumnData::Generic(values.into_iter().map(Option::unwrap_or_default).collect())
    }
}

/// Typed, borrowed access to a column whose kind has been checked
pub struct TypedColumn<'a, T: ColumnType> {
    column: &'a Column,
    _marker: PhantomData<T>,
}

impl<'a, T: ColumnType> Clone for TypedColumn<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T: ColumnType> Copy for TypedColumn<'a, T> {}

impl<'a, T: ColumnType> TypedColumn<'a, T> {
    pub fn column(&self) -> &'a Column {
        self.column
    }

    pub fn name(&self) -> &'a str {
        self.column.name()
    }

    pub fn len(&self) -> usize {
        self.column.len()
    }

    pub fn is_empty(&self) -> bool {
        self.column.is_empty()
    }

    /// Bounds-checked read, `None` when the slot is absent
    pub fn get(&self, index: usize) -> Result<Option<T::Item<'a>>> {
        let i = self.column.physical(index)?;
        Ok(T::item_at(self.column.data(), i))
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<T::Item<'a>>> + 'a {
        let column = self.column;
        let data = column.data();
        (0..column.len()).map(move |i| T::item_at(data, column.physical_unchecked(i)))
    }

    pub fn to_vec(&self) -> Vec<Option<T::Item<'a>>> {
        self.iter().collect()
    }

    /// Typed map; see [`Column::map`] for coercion rules
    pub fn map<V, F>(&self, target: DataType, f: F) -> Result<Column>
    where
        V: Into<Value>,
        F: FnMut(Option<T::Item<'a>>) -> V,
    {
        map_into(self.column.name(), target, self.len(), self.iter().map(f))
    }
}

impl<'a, T: NumericType> TypedColumn<'a, T> {
    fn present_values(&self) -> impl Iterator<Item = T> + 'a {
        self.iter().flatten().map(T::from_item)
    }

    /// Smallest present value; NaN does not take part in the comparison
    pub fn min(&self) -> Option<T> {
        self.present_values()
            .filter(|v| v.partial_cmp(v).is_some())
            .fold(None, |acc, v| match acc {
                Some(m) if m <= v => Some(m),
                _ => Some(v),
            })
    }

    pub fn max(&self) -> Option<T> {
        self.present_values()
            .filter(|v| v.partial_cmp(v).is_some())
            .fold(None, |acc, v| match acc {
                Some(m) if m >= v => Some(m),
                _ => Some(v),
            })
    }

    /// Mean over present values, `None` if there are none
    pub fn mean(&self) -> Option<f64> {
        let (sum, count) = self
            .present_values()
            .fold((0.0, 0usize), |(s, n), v| (s + v.to_f64(), n + 1));
        (count > 0).then(|| sum / count as f64)
    }

    pub fn to_vector(&self) -> Vector {
        let values = self
            .iter()
            .map(|v| v.map_or(f64::NAN, |x| T::from_item(x).to_f64()))
            .collect();
        Vector::from_vec(values, Orientation::Column)
    }
}
