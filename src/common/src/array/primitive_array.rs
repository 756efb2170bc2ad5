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

use super::{Array, ArrayBuilder, ArrayImpl, ArrayMeta};
use crate::bitmap::{Bitmap, BitmapBuilder};
use crate::types::{DataType, Scalar, ScalarRef, F32, F64};

/// Trait over all scalar types stored directly in a [`PrimitiveArray`].
pub trait PrimitiveArrayItemType:
    for<'a> Scalar<ScalarRefType<'a> = Self>
    + for<'a> ScalarRef<'a, ScalarType = Self>
    + Copy
    + Default
    + PartialOrd
{
    fn data_type() -> DataType;

    /// Erase the concrete array type, wrapping it into an [`ArrayImpl`].
    fn erase_array_type(arr: PrimitiveArray<Self>) -> ArrayImpl;
}

macro_rules! impl_primitive_item {
    ($( { $scalar:ty, $variant_name:ident } ),*) => {
        $(
            impl PrimitiveArrayItemType for $scalar {
                fn data_type() -> DataType {
                    DataType::$variant_name
                }

                fn erase_array_type(arr: PrimitiveArray<Self>) -> ArrayImpl {
                    ArrayImpl::$variant_name(arr)
                }
            }
        )*
    };
}

impl_primitive_item! {
    { i16, Int16 },
    { i32, Int32 },
    { i64, Int64 },
    { F32, Float32 },
    { F64, Float64 }
}

/// An array of fixed-width values.
#[derive(Debug, Clone)]
pub struct PrimitiveArray<T: PrimitiveArrayItemType> {
    bitmap: Bitmap,
    data: Vec<T>,
}

impl<T: PrimitiveArrayItemType> PrimitiveArray<T> {
    pub fn from_slice(data: &[Option<T>]) -> Self {
        let mut builder = <Self as Array>::Builder::new(data.len());
        for i in data {
            builder.append(*i);
        }
        builder.finish()
    }
}

impl<T: PrimitiveArrayItemType> Array for PrimitiveArray<T> {
    type Builder = PrimitiveArrayBuilder<T>;
    type OwnedItem = T;
    type RefItem<'a> = T;

    fn value_at(&self, idx: usize) -> Option<T> {
        if !self.is_null(idx) {
            Some(self.data[idx])
        } else {
            None
        }
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    fn data_type(&self) -> DataType {
        T::data_type()
    }

    fn null_bitmap(&self) -> &Bitmap {
        &self.bitmap
    }
}

/// `PrimitiveArrayBuilder` constructs a [`PrimitiveArray`] from `Option<T>`.
#[derive(Debug)]
pub struct PrimitiveArrayBuilder<T: PrimitiveArrayItemType> {
    bitmap: BitmapBuilder,
    data: Vec<T>,
}

impl<T: PrimitiveArrayItemType> ArrayBuilder for PrimitiveArrayBuilder<T> {
    type ArrayType = PrimitiveArray<T>;

    fn with_meta(capacity: usize, _meta: ArrayMeta) -> Self {
        Self {
            bitmap: BitmapBuilder::with_capacity(capacity),
            data: Vec::with_capacity(capacity),
        }
    }

    fn append(&mut self, value: Option<T>) {
        match value {
            Some(v) => {
                self.bitmap.append(true);
                self.data.push(v);
            }
            None => {
                self.bitmap.append(false);
                self.data.push(T::default());
            }
        }
    }

    fn finish(self) -> PrimitiveArray<T> {
        PrimitiveArray {
            bitmap: self.bitmap.finish(),
            data: self.data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_slice() {
        let array = PrimitiveArray::<i64>::from_slice(&[Some(1), None, Some(-3)]);
        assert_eq!(array.len(), 3);
        assert_eq!(array.value_at(0), Some(1));
        assert_eq!(array.value_at(1), None);
        assert_eq!(array.value_at(2), Some(-3));
        assert_eq!(array.data_type(), DataType::Int64);
    }

    #[test]
    fn test_float_array() {
        let array = PrimitiveArray::<F64>::from_slice(&[Some(1.5.into()), None]);
        assert_eq!(array.value_at(0), Some(F64::from(1.5)));
        assert_eq!(array.data_type(), DataType::Float64);
    }
}
