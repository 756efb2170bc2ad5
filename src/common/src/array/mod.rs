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

//! `Array` defines all in-memory representations of the vectorized execution
//! framework.

mod bool_array;
mod data_chunk;
mod data_chunk_iter;
pub mod error;
mod list_array;
mod primitive_array;
mod utf8_array;

pub use bool_array::{BoolArray, BoolArrayBuilder};
pub use data_chunk::{ArrayRef, DataChunk, DataChunkTestExt, Vis};
pub use data_chunk_iter::{DataChunkRowIter, RowRef};
pub use error::ArrayError;
pub use list_array::{ListArray, ListArrayBuilder, ListRef, ListValue};
pub use primitive_array::{PrimitiveArray, PrimitiveArrayBuilder, PrimitiveArrayItemType};
pub use utf8_array::{Utf8Array, Utf8ArrayBuilder};

use crate::bitmap::Bitmap;
use crate::types::*;

pub type ArrayResult<T> = std::result::Result<T, ArrayError>;

pub type I64Array = PrimitiveArray<i64>;
pub type I32Array = PrimitiveArray<i32>;
pub type I16Array = PrimitiveArray<i16>;
pub type F64Array = PrimitiveArray<F64>;
pub type F32Array = PrimitiveArray<F32>;

pub type I64ArrayBuilder = PrimitiveArrayBuilder<i64>;
pub type I32ArrayBuilder = PrimitiveArrayBuilder<i32>;
pub type I16ArrayBuilder = PrimitiveArrayBuilder<i16>;
pub type F64ArrayBuilder = PrimitiveArrayBuilder<F64>;
pub type F32ArrayBuilder = PrimitiveArrayBuilder<F32>;

/// A trait over all array builders.
///
/// `ArrayBuilder` is a trait over all builders. You can build an array with
/// `append` with the help of the `ArrayBuilder` trait. The `append` function
/// always accepts a reference to an element: e.g. for `PrimitiveArray` you do
/// `builder.append(Some(1))`, for `Utf8Array` you do
/// `builder.append(Some("xxx"))` without constructing a `String`.
pub trait ArrayBuilder: Send + Sync + Sized + 'static {
    /// Corresponding `Array` of this builder, which is reciprocal to `ArrayBuilder`.
    type ArrayType: Array<Builder = Self>;

    /// Create a new builder with `capacity`.
    fn new(capacity: usize) -> Self {
        // No metadata by default.
        Self::with_meta(capacity, ArrayMeta::Simple)
    }

    /// # Panics
    /// Panics if `meta`'s type mismatches with the array type.
    fn with_meta(capacity: usize, meta: ArrayMeta) -> Self;

    /// Append a value to the builder.
    fn append(&mut self, value: Option<<<Self as ArrayBuilder>::ArrayType as Array>::RefItem<'_>>);

    fn append_null(&mut self) {
        self.append(None)
    }

    /// Finish the build and return a new array.
    fn finish(self) -> Self::ArrayType;
}

/// A trait over all arrays.
///
/// `Array` must be built with an `ArrayBuilder`. The array trait provides
/// several unified interfaces on an array, like `len`, `value_at` and `iter`.
///
/// The `Builder` associated type is the builder of this array.
/// The `RefItem` is the item you could retrieve from this array, and
/// `OwnedItem` is the owned counterpart, useful when aggregators need to
/// store the current extremum.
pub trait Array: std::fmt::Debug + Send + Sync + Sized + 'static + Into<ArrayImpl> {
    /// A reference to an item in the array, as well as the return type of
    /// `value_at`, which is reciprocal to `Self::OwnedItem`.
    type RefItem<'a>: ScalarRef<'a, ScalarType = Self::OwnedItem>
    where
        Self: 'a;

    /// Owned type of an item in the array, which is reciprocal to `Self::RefItem`.
    type OwnedItem: Clone + std::fmt::Debug + for<'a> Scalar<ScalarRefType<'a> = Self::RefItem<'a>>;

    /// Corresponding builder of this array, which is reciprocal to `Array`.
    type Builder: ArrayBuilder<ArrayType = Self>;

    /// Retrieve a reference to a value.
    fn value_at(&self, idx: usize) -> Option<Self::RefItem<'_>>;

    /// Number of items in the array.
    fn len(&self) -> usize;

    /// Get an iterator over the array.
    fn iter(&self) -> ArrayIterator<'_, Self> {
        ArrayIterator::new(self)
    }

    /// The data type of the items in the array.
    fn data_type(&self) -> DataType;

    /// Get the null `Bitmap` of the array.
    fn null_bitmap(&self) -> &Bitmap;

    /// Check if an element is `null` or not.
    fn is_null(&self, idx: usize) -> bool {
        !self.null_bitmap().is_set(idx)
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The creation of an [`Array`] typically does not rely on a [`DataType`].
/// The exception is list, which requires the element type as it decides the
/// layout of the array.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ArrayMeta {
    Simple, // Simple array without any extra metadata.
    List { datatype: Box<DataType> },
}

impl From<&DataType> for ArrayMeta {
    fn from(data_type: &DataType) -> Self {
        match data_type {
            DataType::List { datatype } => ArrayMeta::List {
                datatype: datatype.clone(),
            },
            _ => ArrayMeta::Simple,
        }
    }
}

/// An iterator over an [`Array`].
pub struct ArrayIterator<'a, A: Array> {
    data: &'a A,
    pos: usize,
}

impl<'a, A: Array> ArrayIterator<'a, A> {
    pub fn new(data: &'a A) -> Self {
        Self { data, pos: 0 }
    }
}

impl<'a, A: Array> Iterator for ArrayIterator<'a, A> {
    type Item = Option<A::RefItem<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.data.len() {
            None
        } else {
            let item = self.data.value_at(self.pos);
            self.pos += 1;
            Some(item)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.data.len() - self.pos;
        (remaining, Some(remaining))
    }
}

/// Implement `compact` on arrays, which filters elements by a visibility bitmap.
trait CompactableArray: Array {
    /// Select some elements from `Array` based on the `visibility` bitmap.
    /// `cardinality` is only used to decide the capacity of the new `Array`.
    fn compact(&self, visibility: &Bitmap, cardinality: usize) -> Self;
}

impl<A: Array> CompactableArray for A {
    fn compact(&self, visibility: &Bitmap, cardinality: usize) -> Self {
        use itertools::Itertools;
        let mut builder = A::Builder::with_meta(cardinality, ArrayMeta::from(&self.data_type()));
        for (elem, visible) in self.iter().zip_eq(visibility.iter()) {
            if visible {
                builder.append(elem);
            }
        }
        builder.finish()
    }
}

/// `for_all_variants` includes all variants of our array types. If you added
/// a new array type inside the project, be sure to add a variant here.
///
/// Every tuple has four elements:
/// `{ enum variant name, function suffix name, array type, builder type }`
#[macro_export]
macro_rules! for_all_variants {
    ($macro:ident $(, $x:tt)*) => {
        $macro! {
            [$($x),*],
            { Int16, int16, I16Array, I16ArrayBuilder },
            { Int32, int32, I32Array, I32ArrayBuilder },
            { Int64, int64, I64Array, I64ArrayBuilder },
            { Float32, float32, F32Array, F32ArrayBuilder },
            { Float64, float64, F64Array, F64ArrayBuilder },
            { Utf8, utf8, Utf8Array, Utf8ArrayBuilder },
            { Bool, bool, BoolArray, BoolArrayBuilder },
            { List, list, ListArray, ListArrayBuilder }
        }
    };
}

/// Define `ArrayImpl` with macro.
macro_rules! array_impl_enum {
    ([], $( { $variant_name:ident, $suffix_name:ident, $array:ty, $builder:ty } ),*) => {
        /// `ArrayImpl` embeds all possible arrays in the `array` module.
        #[derive(Debug, Clone)]
        pub enum ArrayImpl {
            $( $variant_name($array) ),*
        }
    };
}

for_all_variants! { array_impl_enum }

impl<T: PrimitiveArrayItemType> From<PrimitiveArray<T>> for ArrayImpl {
    fn from(arr: PrimitiveArray<T>) -> Self {
        T::erase_array_type(arr)
    }
}

impl From<BoolArray> for ArrayImpl {
    fn from(arr: BoolArray) -> Self {
        Self::Bool(arr)
    }
}

impl From<Utf8Array> for ArrayImpl {
    fn from(arr: Utf8Array) -> Self {
        Self::Utf8(arr)
    }
}

impl From<ListArray> for ArrayImpl {
    fn from(arr: ListArray) -> Self {
        Self::List(arr)
    }
}

/// Define `ArrayImpl` dispatch methods with macro.
macro_rules! impl_array_impl_dispatch {
    ([], $( { $variant_name:ident, $suffix_name:ident, $array:ty, $builder:ty } ),*) => {
        impl ArrayImpl {
            pub fn len(&self) -> usize {
                match self {
                    $( Self::$variant_name(inner) => inner.len() ),*
                }
            }

            pub fn is_empty(&self) -> bool {
                self.len() == 0
            }

            pub fn data_type(&self) -> DataType {
                match self {
                    $( Self::$variant_name(inner) => inner.data_type() ),*
                }
            }

            pub fn null_bitmap(&self) -> &Bitmap {
                match self {
                    $( Self::$variant_name(inner) => inner.null_bitmap() ),*
                }
            }

            pub fn is_null(&self, idx: usize) -> bool {
                !self.null_bitmap().is_set(idx)
            }

            /// Retrieve the value at `idx` as a [`DatumRef`].
            pub fn value_at(&self, idx: usize) -> DatumRef<'_> {
                match self {
                    $( Self::$variant_name(inner) => inner
                        .value_at(idx)
                        .map(ScalarRefImpl::$variant_name) ),*
                }
            }

            /// Filter the array with a visibility bitmap.
            pub fn compact(&self, visibility: &Bitmap, cardinality: usize) -> Self {
                match self {
                    $( Self::$variant_name(inner) => {
                        CompactableArray::compact(inner, visibility, cardinality).into()
                    } ),*
                }
            }

            pub fn create_builder(&self, capacity: usize) -> ArrayBuilderImpl {
                self.data_type().create_array_builder(capacity)
            }
        }
    };
}

for_all_variants! { impl_array_impl_dispatch }

impl ArrayImpl {
    /// Iterate over the datums of the array.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = DatumRef<'_>> {
        (0..self.len()).map(|idx| self.value_at(idx))
    }
}

/// Define `ArrayBuilderImpl` with macro.
macro_rules! array_builder_impl_enum {
    ([], $( { $variant_name:ident, $suffix_name:ident, $array:ty, $builder:ty } ),*) => {
        /// `ArrayBuilderImpl` embeds all possible array builders in the
        /// `array` module.
        #[derive(Debug)]
        pub enum ArrayBuilderImpl {
            $( $variant_name($builder) ),*
        }

        $(
            impl From<$builder> for ArrayBuilderImpl {
                fn from(builder: $builder) -> Self {
                    Self::$variant_name(builder)
                }
            }
        )*
    };
}

for_all_variants! { array_builder_impl_enum }

/// Define `ArrayBuilderImpl` dispatch methods with macro.
macro_rules! impl_array_builder_impl_dispatch {
    ([], $( { $variant_name:ident, $suffix_name:ident, $array:ty, $builder:ty } ),*) => {
        impl ArrayBuilderImpl {
            /// Append a [`DatumRef`] to the builder.
            ///
            /// # Panics
            /// Panics if the datum's type mismatches with the builder.
            pub fn append_datum(&mut self, datum: impl ToDatumRef) {
                match (self, datum.to_datum_ref()) {
                    $( (Self::$variant_name(inner), None) => inner.append(None), )*
                    $( (Self::$variant_name(inner), Some(ScalarRefImpl::$variant_name(v))) => {
                        inner.append(Some(v))
                    } )*
                    (this, datum) => panic!("cannot append {datum:?} to {}", this.get_ident()),
                }
            }

            pub fn append_null(&mut self) {
                match self {
                    $( Self::$variant_name(inner) => inner.append(None) ),*
                }
            }

            pub fn finish(self) -> ArrayImpl {
                match self {
                    $( Self::$variant_name(inner) => inner.finish().into() ),*
                }
            }

            pub fn get_ident(&self) -> &'static str {
                match self {
                    $( Self::$variant_name(_) => stringify!($variant_name) ),*
                }
            }
        }
    };
}

for_all_variants! { impl_array_builder_impl_dispatch }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_int32_array() {
        let mut builder = I32ArrayBuilder::new(4);
        for v in [Some(1), None, Some(3), None] {
            builder.append(v);
        }
        let array = builder.finish();
        assert_eq!(array.len(), 4);
        assert_eq!(array.value_at(0), Some(1));
        assert_eq!(array.value_at(1), None);
        assert_eq!(
            array.iter().collect::<Vec<_>>(),
            vec![Some(1), None, Some(3), None]
        );
        assert_eq!(array.data_type(), DataType::Int32);
    }

    #[test]
    fn test_compact() {
        let mut builder = I64ArrayBuilder::new(4);
        for v in [Some(1), Some(2), Some(3), Some(4)] {
            builder.append(v);
        }
        let array: ArrayImpl = builder.finish().into();
        let visibility = Bitmap::from_bool_slice(&[true, false, false, true]);
        let compacted = array.compact(&visibility, 2);
        assert_eq!(compacted.len(), 2);
        assert_eq!(compacted.value_at(0), Some(ScalarRefImpl::Int64(1)));
        assert_eq!(compacted.value_at(1), Some(ScalarRefImpl::Int64(4)));
    }

    #[test]
    fn test_builder_dispatch() {
        let mut builder = DataType::Varchar.create_array_builder(2);
        builder.append_datum(Some(ScalarRefImpl::Utf8("hello")));
        builder.append_datum(Datum::None);
        let array = builder.finish();
        assert_eq!(array.value_at(0), Some(ScalarRefImpl::Utf8("hello")));
        assert_eq!(array.value_at(1), None);
    }
}
