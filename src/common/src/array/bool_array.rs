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

use super::{Array, ArrayBuilder, ArrayMeta};
use crate::bitmap::{Bitmap, BitmapBuilder};
use crate::types::DataType;

/// An array of booleans, backed by two bitmaps.
#[derive(Debug, Clone)]
pub struct BoolArray {
    bitmap: Bitmap,
    data: Bitmap,
}

impl BoolArray {
    pub fn from_slice(data: &[Option<bool>]) -> Self {
        let mut builder = <Self as Array>::Builder::new(data.len());
        for i in data {
            builder.append(*i);
        }
        builder.finish()
    }

    /// The values as a bitmap, with nulls counted as unset.
    pub fn to_bitmap(&self) -> Bitmap {
        &self.data & &self.bitmap
    }
}

impl Array for BoolArray {
    type Builder = BoolArrayBuilder;
    type OwnedItem = bool;
    type RefItem<'a> = bool;

    fn value_at(&self, idx: usize) -> Option<bool> {
        if !self.is_null(idx) {
            Some(self.data.is_set(idx))
        } else {
            None
        }
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    fn data_type(&self) -> DataType {
        DataType::Boolean
    }

    fn null_bitmap(&self) -> &Bitmap {
        &self.bitmap
    }
}

/// `BoolArrayBuilder` constructs a [`BoolArray`] from `Option<bool>`.
#[derive(Debug)]
pub struct BoolArrayBuilder {
    bitmap: BitmapBuilder,
    data: BitmapBuilder,
}

impl ArrayBuilder for BoolArrayBuilder {
    type ArrayType = BoolArray;

    fn with_meta(capacity: usize, _meta: ArrayMeta) -> Self {
        Self {
            bitmap: BitmapBuilder::with_capacity(capacity),
            data: BitmapBuilder::with_capacity(capacity),
        }
    }

    fn append(&mut self, value: Option<bool>) {
        match value {
            Some(v) => {
                self.bitmap.append(true);
                self.data.append(v);
            }
            None => {
                self.bitmap.append(false);
                self.data.append(false);
            }
        }
    }

    fn finish(self) -> BoolArray {
        BoolArray {
            bitmap: self.bitmap.finish(),
            data: self.data.finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_array() {
        let array = BoolArray::from_slice(&[Some(true), Some(false), None]);
        assert_eq!(array.len(), 3);
        assert_eq!(array.value_at(0), Some(true));
        assert_eq!(array.value_at(1), Some(false));
        assert_eq!(array.value_at(2), None);
        assert_eq!(array.to_bitmap().count_ones(), 1);
    }
}
