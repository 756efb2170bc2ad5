// Copyright 2025 Summit Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Data types and scalar values of the evaluation framework.

use paste::paste;

pub use crate::array::{ListRef, ListValue};
use crate::array::{ArrayBuilderImpl, ArrayError, ArrayResult};
use crate::estimate_size::EstimateSize;

pub type F32 = ordered_float::OrderedFloat<f32>;
pub type F64 = ordered_float::OrderedFloat<f64>;

/// The set of data types supported by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataType {
    Boolean,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Varchar,
    List { datatype: Box<DataType> },
}

impl DataType {
    pub fn create_array_builder(&self, capacity: usize) -> ArrayBuilderImpl {
        use crate::array::*;

        match self {
            DataType::Boolean => BoolArrayBuilder::new(capacity).into(),
            DataType::Int16 => I16ArrayBuilder::new(capacity).into(),
            DataType::Int32 => I32ArrayBuilder::new(capacity).into(),
            DataType::Int64 => I64ArrayBuilder::new(capacity).into(),
            DataType::Float32 => F32ArrayBuilder::new(capacity).into(),
            DataType::Float64 => F64ArrayBuilder::new(capacity).into(),
            DataType::Varchar => Utf8ArrayBuilder::new(capacity).into(),
            DataType::List { datatype } => ListArrayBuilder::with_meta(
                capacity,
                ArrayMeta::List {
                    datatype: datatype.clone(),
                },
            )
            .into(),
        }
    }

    /// Shorthand for a list of `self`.
    pub fn list(self) -> DataType {
        DataType::List {
            datatype: Box::new(self),
        }
    }
}

/// `Scalar` is a trait over all possible owned types in the evaluation framework.
///
/// `Scalar` is reciprocal to `ScalarRef`. Use `as_scalar_ref` to get a reference
/// which has the same lifetime as `self`.
pub trait Scalar: std::fmt::Debug + Clone + Send + Sync + 'static {
    /// Type for reference of `Scalar`.
    type ScalarRefType<'a>: ScalarRef<'a, ScalarType = Self>
    where
        Self: 'a;

    /// Get a reference to current scalar.
    fn as_scalar_ref(&self) -> Self::ScalarRefType<'_>;
}

/// `ScalarRef` is a trait over all possible references in the evaluation framework.
///
/// `ScalarRef` is reciprocal to `Scalar`. Use `to_owned_scalar` to get an
/// owned scalar.
pub trait ScalarRef<'a>: Copy + std::fmt::Debug + Send + Sync + 'a {
    /// `ScalarType` is the owned type of current `ScalarRef`.
    type ScalarType: Scalar<ScalarRefType<'a> = Self>;

    /// Convert `ScalarRef` to an owned scalar.
    fn to_owned_scalar(&self) -> Self::ScalarType;
}

/// `for_all_scalar_variants` includes all variants of our scalar types. If you
/// added a new scalar type inside the project, be sure to add a variant here.
///
/// To use it, you need to provide a macro whose input is `{ enum variant name,
/// function suffix name, scalar type, scalar ref type }` tuples.
#[macro_export]
macro_rules! for_all_scalar_variants {
    ($macro:ident) => {
        $macro! {
            { Int16, int16, i16, i16 },
            { Int32, int32, i32, i32 },
            { Int64, int64, i64, i64 },
            { Float32, float32, F32, F32 },
            { Float64, float64, F64, F64 },
            { Utf8, utf8, Box<str>, &'scalar str },
            { Bool, bool, bool, bool },
            { List, list, ListValue, ListRef<'scalar> }
        }
    };
}

/// Define `ScalarImpl` and `ScalarRefImpl` with macro.
macro_rules! scalar_impl_enum {
    ($( { $variant_name:ident, $suffix_name:ident, $scalar:ty, $scalar_ref:ty } ),*) => {
        /// `ScalarImpl` embeds all possible scalars in the evaluation framework.
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub enum ScalarImpl {
            $( $variant_name($scalar) ),*
        }

        /// `ScalarRefImpl` embeds all possible scalar references in the
        /// evaluation framework.
        #[derive(Debug, Copy, Clone, PartialEq, Eq)]
        pub enum ScalarRefImpl<'scalar> {
            $( $variant_name($scalar_ref) ),*
        }
    };
}

for_all_scalar_variants! { scalar_impl_enum }

/// Implement `PartialOrd` and `Ord` for `ScalarImpl` and `ScalarRefImpl`.
///
/// Scalars of different types are incomparable; the query layer guarantees
/// that only same-typed values meet.
macro_rules! scalar_impl_partial_ord {
    ($( { $variant_name:ident, $suffix_name:ident, $scalar:ty, $scalar_ref:ty } ),*) => {
        impl PartialOrd for ScalarImpl {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                match (self, other) {
                    $( (Self::$variant_name(lhs), Self::$variant_name(rhs)) => Some(lhs.cmp(rhs)), )*
                    _ => None,
                }
            }
        }
        impl Ord for ScalarImpl {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                self.partial_cmp(other)
                    .unwrap_or_else(|| panic!("cannot compare {self:?} with {other:?}"))
            }
        }

        impl PartialOrd for ScalarRefImpl<'_> {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                match (self, other) {
                    $( (Self::$variant_name(lhs), Self::$variant_name(rhs)) => Some(lhs.cmp(rhs)), )*
                    _ => None,
                }
            }
        }
        impl Ord for ScalarRefImpl<'_> {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                self.partial_cmp(other)
                    .unwrap_or_else(|| panic!("cannot compare {self:?} with {other:?}"))
            }
        }
    };
}

for_all_scalar_variants! { scalar_impl_partial_ord }

macro_rules! scalar_impl_display {
    ($( { $variant_name:ident, $suffix_name:ident, $scalar:ty, $scalar_ref:ty } ),*) => {
        impl std::fmt::Display for ScalarImpl {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $( Self::$variant_name(inner) => write!(f, "{}", inner) ),*
                }
            }
        }

        impl std::fmt::Display for ScalarRefImpl<'_> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $( Self::$variant_name(inner) => write!(f, "{}", inner) ),*
                }
            }
        }
    };
}

for_all_scalar_variants! { scalar_impl_display }

macro_rules! scalar_impl_get_ident {
    ($( { $variant_name:ident, $suffix_name:ident, $scalar:ty, $scalar_ref:ty } ),*) => {
        impl ScalarImpl {
            pub fn get_ident(&self) -> &'static str {
                match self {
                    $( Self::$variant_name(_) => stringify!($variant_name) ),*
                }
            }
        }

        impl ScalarRefImpl<'_> {
            pub fn get_ident(&self) -> &'static str {
                match self {
                    $( Self::$variant_name(_) => stringify!($variant_name) ),*
                }
            }
        }
    };
}

for_all_scalar_variants! { scalar_impl_get_ident }

pub type Datum = Option<ScalarImpl>;
pub type DatumRef<'a> = Option<ScalarRefImpl<'a>>;

/// Convert a [`Datum`] to a [`DatumRef`].
pub fn to_datum_ref(datum: &Datum) -> DatumRef<'_> {
    datum.as_ref().map(|d| d.as_scalar_ref_impl())
}

/// Converts into an owned [`Datum`].
pub trait ToOwnedDatum {
    fn to_owned_datum(self) -> Datum;
}

impl ToOwnedDatum for DatumRef<'_> {
    fn to_owned_datum(self) -> Datum {
        self.map(ScalarRefImpl::into_scalar_impl)
    }
}

/// Borrows as a [`DatumRef`].
pub trait ToDatumRef: PartialEq + Eq + std::fmt::Debug {
    fn to_datum_ref(&self) -> DatumRef<'_>;
}

impl ToDatumRef for Datum {
    fn to_datum_ref(&self) -> DatumRef<'_> {
        to_datum_ref(self)
    }
}

impl ToDatumRef for DatumRef<'_> {
    fn to_datum_ref(&self) -> DatumRef<'_> {
        *self
    }
}

/// `for_all_native_types` includes all native variants of our scalar types.
#[macro_export]
macro_rules! for_all_native_types {
    ($macro:ident) => {
        $macro! {
            { i16, Int16 },
            { i32, Int32 },
            { i64, Int64 },
            { $crate::types::F32, Float32 },
            { $crate::types::F64, Float64 }
        }
    };
}

macro_rules! impl_native_scalar {
    ($( { $scalar:ty, $variant_name:ident } ),*) => {
        $(
            impl Scalar for $scalar {
                type ScalarRefType<'a> = $scalar;

                fn as_scalar_ref(&self) -> $scalar {
                    *self
                }
            }

            impl<'a> ScalarRef<'a> for $scalar {
                type ScalarType = $scalar;

                fn to_owned_scalar(&self) -> $scalar {
                    *self
                }
            }
        )*
    };
}

for_all_native_types! { impl_native_scalar }

impl Scalar for bool {
    type ScalarRefType<'a> = bool;

    fn as_scalar_ref(&self) -> bool {
        *self
    }
}

impl<'a> ScalarRef<'a> for bool {
    type ScalarType = bool;

    fn to_owned_scalar(&self) -> bool {
        *self
    }
}

impl Scalar for Box<str> {
    type ScalarRefType<'a> = &'a str;

    fn as_scalar_ref(&self) -> &str {
        self
    }
}

impl<'a> ScalarRef<'a> for &'a str {
    type ScalarType = Box<str>;

    fn to_owned_scalar(&self) -> Box<str> {
        (*self).into()
    }
}

/// `impl_convert` implements several conversions for `Scalar`.
/// * `Scalar <-> ScalarImpl` with `From` and `TryFrom` trait.
/// * `ScalarRef <-> ScalarRefImpl` with `From` and `TryFrom` trait.
/// * `&ScalarImpl -> &Scalar` with `impl.as_int16()`.
/// * `ScalarImpl -> Scalar` with `impl.into_int16()`.
macro_rules! impl_convert {
    ($( { $variant_name:ident, $suffix_name:ident, $scalar:ty, $scalar_ref:ty } ),*) => {
        $(
            impl From<$scalar> for ScalarImpl {
                fn from(val: $scalar) -> Self {
                    ScalarImpl::$variant_name(val)
                }
            }

            impl TryFrom<ScalarImpl> for $scalar {
                type Error = ArrayError;

                fn try_from(val: ScalarImpl) -> ArrayResult<Self> {
                    match val {
                        ScalarImpl::$variant_name(scalar) => Ok(scalar),
                        other_scalar => Err(ArrayError::Internal(anyhow::anyhow!(
                            "cannot convert ScalarImpl::{} to concrete type {}",
                            other_scalar.get_ident(),
                            stringify!($variant_name)
                        ))),
                    }
                }
            }

            impl<'scalar> From<$scalar_ref> for ScalarRefImpl<'scalar> {
                fn from(val: $scalar_ref) -> Self {
                    ScalarRefImpl::$variant_name(val)
                }
            }

            paste! {
                impl ScalarImpl {
                    pub fn [<as_ $suffix_name>](&self) -> &$scalar {
                        match self {
                            Self::$variant_name(ref scalar) => scalar,
                            other_scalar => panic!(
                                "cannot convert ScalarImpl::{} to concrete type {}",
                                other_scalar.get_ident(),
                                stringify!($variant_name)
                            ),
                        }
                    }

                    pub fn [<into_ $suffix_name>](self) -> $scalar {
                        match self {
                            Self::$variant_name(scalar) => scalar,
                            other_scalar => panic!(
                                "cannot convert ScalarImpl::{} to concrete type {}",
                                other_scalar.get_ident(),
                                stringify!($variant_name)
                            ),
                        }
                    }
                }

                impl<'scalar> ScalarRefImpl<'scalar> {
                    // Note that this conversion consumes self.
                    pub fn [<into_ $suffix_name>](self) -> $scalar_ref {
                        match self {
                            Self::$variant_name(inner) => inner,
                            other_scalar => panic!(
                                "cannot convert ScalarRefImpl::{} to concrete type {}",
                                other_scalar.get_ident(),
                                stringify!($variant_name)
                            ),
                        }
                    }
                }
            }
        )*
    };
}

for_all_scalar_variants! { impl_convert }

// Implement `From<raw float>` and `From<&str>` for `ScalarImpl` manually.
impl From<f32> for ScalarImpl {
    fn from(f: f32) -> Self {
        Self::Float32(f.into())
    }
}

impl From<f64> for ScalarImpl {
    fn from(f: f64) -> Self {
        Self::Float64(f.into())
    }
}

impl From<&str> for ScalarImpl {
    fn from(s: &str) -> Self {
        Self::Utf8(s.into())
    }
}

impl From<String> for ScalarImpl {
    fn from(s: String) -> Self {
        Self::Utf8(s.into_boxed_str())
    }
}

macro_rules! impl_scalar_impl_ref_conversion {
    ($( { $variant_name:ident, $suffix_name:ident, $scalar:ty, $scalar_ref:ty } ),*) => {
        impl ScalarImpl {
            /// Converts [`ScalarImpl`] to [`ScalarRefImpl`].
            pub fn as_scalar_ref_impl(&self) -> ScalarRefImpl<'_> {
                match self {
                    $(
                        Self::$variant_name(inner) => ScalarRefImpl::<'_>::$variant_name(inner.as_scalar_ref())
                    ),*
                }
            }
        }

        impl<'a> ScalarRefImpl<'a> {
            /// Converts [`ScalarRefImpl`] to [`ScalarImpl`].
            pub fn into_scalar_impl(self) -> ScalarImpl {
                match self {
                    $(
                        Self::$variant_name(inner) => ScalarImpl::$variant_name(inner.to_owned_scalar())
                    ),*
                }
            }
        }
    };
}

for_all_scalar_variants! { impl_scalar_impl_ref_conversion }

impl ScalarImpl {
    /// Parses a scalar from text, following the chunk fixture format.
    pub fn from_text(s: &str, data_type: &DataType) -> ArrayResult<Self> {
        Ok(match data_type {
            DataType::Boolean => match s {
                "t" | "true" => true.into(),
                "f" | "false" => false.into(),
                _ => return Err(ArrayError::Parse("invalid bool")),
            },
            DataType::Int16 => s
                .parse::<i16>()
                .map_err(|_| ArrayError::Parse("invalid int2"))?
                .into(),
            DataType::Int32 => s
                .parse::<i32>()
                .map_err(|_| ArrayError::Parse("invalid int4"))?
                .into(),
            DataType::Int64 => s
                .parse::<i64>()
                .map_err(|_| ArrayError::Parse("invalid int8"))?
                .into(),
            DataType::Float32 => s
                .parse::<f32>()
                .map_err(|_| ArrayError::Parse("invalid float4"))?
                .into(),
            DataType::Float64 => s
                .parse::<f64>()
                .map_err(|_| ArrayError::Parse("invalid float8"))?
                .into(),
            DataType::Varchar => s.into(),
            DataType::List { .. } => return Err(ArrayError::Parse("list literal not supported")),
        })
    }
}

impl EstimateSize for ScalarImpl {
    fn estimated_heap_size(&self) -> usize {
        match self {
            Self::Utf8(s) => s.len(),
            Self::List(v) => v.estimated_heap_size(),
            _ => 0,
        }
    }
}
