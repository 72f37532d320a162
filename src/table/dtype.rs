//! Scalar type tags and type promotion
//!
//! A tag is a closed element kind plus a nullable flag. Inference widens
//! tags along a total order, so a single pass over the input always
//! settles on a type without backtracking.

use std::fmt;

/// Element kind, declared in promotion order
///
/// `Ord` is the promotion order: Int32 < Int64 < Float64 < Utf8 < Generic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Kind {
    Int32,
    Int64,
    Float64,
    Utf8,
    Generic,
}

impl Kind {
    pub const ALL: [Kind; 5] = [
        Kind::Int32,
        Kind::Int64,
        Kind::Float64,
        Kind::Utf8,
        Kind::Generic,
    ];

    /// Widen two kinds to their common supertype
    #[inline]
    pub fn promote(self, other: Kind) -> Kind {
        self.max(other)
    }

    /// Numeric kinds convert losslessly (or by widening) into `f64`
    #[inline]
    pub fn is_numeric(self) -> bool {
        matches!(self, Kind::Int32 | Kind::Int64 | Kind::Float64)
    }

    pub fn name(self) -> &'static str {
        match self {
            Kind::Int32 => "Int32",
            Kind::Int64 => "Int64",
            Kind::Float64 => "Float64",
            Kind::Utf8 => "Utf8",
            Kind::Generic => "Generic",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Scalar type tag: element kind + nullability
///
/// Two tags are equal iff kind and nullable flag both match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DataType {
    kind: Kind,
    nullable: bool,
}

impl DataType {
    pub const INT32: DataType = DataType::new(Kind::Int32);
    pub const INT64: DataType = DataType::new(Kind::Int64);
    pub const FLOAT64: DataType = DataType::new(Kind::Float64);
    pub const UTF8: DataType = DataType::new(Kind::Utf8);
    pub const GENERIC: DataType = DataType::new(Kind::Generic);

    /// Non-nullable tag of the given kind
    pub const fn new(kind: Kind) -> Self {
        DataType {
            kind,
            nullable: false,
        }
    }

    pub const fn with_nullable(kind: Kind, nullable: bool) -> Self {
        DataType { kind, nullable }
    }

    #[inline]
    pub fn kind(self) -> Kind {
        self.kind
    }

    /// Nullable variant of this tag (idempotent)
    #[inline]
    pub fn nullable_of(self) -> Self {
        DataType {
            kind: self.kind,
            nullable: true,
        }
    }

    #[inline]
    pub fn is_nullable(self) -> bool {
        self.nullable_of() == self
    }

    /// Common supertype of two tags: the wider kind, nullable if either side is
    pub fn promote(self, other: DataType) -> DataType {
        DataType {
            kind: self.kind.promote(other.kind),
            nullable: self.nullable || other.nullable,
        }
    }
}

impl From<Kind> for DataType {
    fn from(kind: Kind) -> Self {
        DataType::new(kind)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nullable {
            write!(f, "{}?", self.kind)
        } else {
            write!(f, "{}", self.kind)
        }
    }
}
