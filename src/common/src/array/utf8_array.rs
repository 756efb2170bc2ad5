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

/// An array of variable-length strings, stored as a flat byte buffer with
/// offsets.
#[derive(Debug, Clone)]
pub struct Utf8Array {
    offset: Vec<usize>,
    bitmap: Bitmap,
    data: Vec<u8>,
}

impl Utf8Array {
    pub fn from_slice(data: &[Option<&str>]) -> Self {
        let mut builder = <Self as Array>::Builder::new(data.len());
        for i in data {
            builder.append(*i);
        }
        builder.finish()
    }
}

impl Array for Utf8Array {
    type Builder = Utf8ArrayBuilder;
    type OwnedItem = Box<str>;
    type RefItem<'a> = &'a str;

    fn value_at(&self, idx: usize) -> Option<&str> {
        if !self.is_null(idx) {
            let slice = &self.data[self.offset[idx]..self.offset[idx + 1]];
            // Safety: the builder only appends valid UTF-8.
            Some(unsafe { std::str::from_utf8_unchecked(slice) })
        } else {
            None
        }
    }

    fn len(&self) -> usize {
        self.offset.len() - 1
    }

    fn data_type(&self) -> DataType {
        DataType::Varchar
    }

    fn null_bitmap(&self) -> &Bitmap {
        &self.bitmap
    }
}

/// `Utf8ArrayBuilder` constructs a [`Utf8Array`] from `Option<&str>`.
#[derive(Debug)]
pub struct Utf8ArrayBuilder {
    offset: Vec<usize>,
    bitmap: BitmapBuilder,
    data: Vec<u8>,
}

impl ArrayBuilder for Utf8ArrayBuilder {
    type ArrayType = Utf8Array;

    fn with_meta(capacity: usize, _meta: ArrayMeta) -> Self {
        let mut offset = Vec::with_capacity(capacity + 1);
        offset.push(0);
        Self {
            offset,
            bitmap: BitmapBuilder::with_capacity(capacity),
            data: Vec::with_capacity(capacity),
        }
    }

    fn append(&mut self, value: Option<&str>) {
        match value {
            Some(s) => {
                self.bitmap.append(true);
                self.data.extend_from_slice(s.as_bytes());
            }
            None => {
                self.bitmap.append(false);
            }
        }
        self.offset.push(self.data.len());
    }

    fn finish(self) -> Utf8Array {
        Utf8Array {
            offset: self.offset,
            bitmap: self.bitmap.finish(),
            data: self.data,
        }
    }
}
