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

use itertools::Itertools;

use super::{Array, ArrayBuilder, ArrayMeta};
use crate::bitmap::{Bitmap, BitmapBuilder};
use crate::estimate_size::EstimateSize;
use crate::types::{DataType, Datum, Scalar, ScalarRef};

/// An owned list value, e.g. the result of a collecting aggregate.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListValue {
    values: Vec<Datum>,
}

impl ListValue {
    pub fn new(values: Vec<Datum>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[Datum] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Datum> {
        self.values.iter()
    }
}

impl std::fmt::Display for ListValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{{}}}",
            self.values
                .iter()
                .map(|v| match v {
                    Some(s) => s.to_string(),
                    None => "NULL".to_string(),
                })
                .join(",")
        )
    }
}

impl EstimateSize for ListValue {
    fn estimated_heap_size(&self) -> usize {
        std::mem::size_of::<Datum>() * self.values.capacity()
            + self
                .values
                .iter()
                .map(|v| v.estimated_heap_size())
                .sum::<usize>()
    }
}

/// A reference to a list value. Lists are stored owned in [`ListArray`], so a
/// plain reference suffices.
pub type ListRef<'a> = &'a ListValue;

impl Scalar for ListValue {
    type ScalarRefType<'a> = ListRef<'a>;

    fn as_scalar_ref(&self) -> ListRef<'_> {
        self
    }
}

impl<'a> ScalarRef<'a> for ListRef<'a> {
    type ScalarType = ListValue;

    fn to_owned_scalar(&self) -> ListValue {
        (*self).clone()
    }
}

/// An array of lists.
#[derive(Debug, Clone)]
pub struct ListArray {
    bitmap: Bitmap,
    data: Vec<ListValue>,
    datatype: Box<DataType>,
}

impl Array for ListArray {
    type Builder = ListArrayBuilder;
    type OwnedItem = ListValue;
    type RefItem<'a> = ListRef<'a>;

    fn value_at(&self, idx: usize) -> Option<ListRef<'_>> {
        if !self.is_null(idx) {
            Some(&self.data[idx])
        } else {
            None
        }
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    fn data_type(&self) -> DataType {
        DataType::List {
            datatype: self.datatype.clone(),
        }
    }

    fn null_bitmap(&self) -> &Bitmap {
        &self.bitmap
    }
}

/// `ListArrayBuilder` constructs a [`ListArray`] from [`ListRef`]s.
///
/// Unlike the simple builders it must be created `with_meta`, since the
/// element type cannot be inferred from appended values alone.
#[derive(Debug)]
pub struct ListArrayBuilder {
    bitmap: BitmapBuilder,
    data: Vec<ListValue>,
    datatype: Box<DataType>,
}

impl ArrayBuilder for ListArrayBuilder {
    type ArrayType = ListArray;

    fn with_meta(capacity: usize, meta: ArrayMeta) -> Self {
        let ArrayMeta::List { datatype } = meta else {
            panic!("must use ArrayMeta::List to build a ListArrayBuilder");
        };
        Self {
            bitmap: BitmapBuilder::with_capacity(capacity),
            data: Vec::with_capacity(capacity),
            datatype,
        }
    }

    fn append(&mut self, value: Option<ListRef<'_>>) {
        match value {
            Some(v) => {
                self.bitmap.append(true);
                self.data.push(v.clone());
            }
            None => {
                self.bitmap.append(false);
                self.data.push(ListValue::default());
            }
        }
    }

    fn finish(self) -> ListArray {
        ListArray {
            bitmap: self.bitmap.finish(),
            data: self.data,
            datatype: self.datatype,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScalarImpl;

    #[test]
    fn test_list_array() {
        let meta = ArrayMeta::List {
            datatype: Box::new(DataType::Int64),
        };
        let mut builder = ListArrayBuilder::with_meta(2, meta);
        let list = ListValue::new(vec![Some(1i64.into()), None, Some(3i64.into())]);
        builder.append(Some(&list));
        builder.append(None);
        let array = builder.finish();

        assert_eq!(array.len(), 2);
        assert_eq!(array.value_at(0), Some(&list));
        assert_eq!(array.value_at(1), None);
        assert_eq!(array.data_type(), DataType::Int64.list());
    }

    #[test]
    fn test_display() {
        let list = ListValue::new(vec![Some(1i64.into()), None, Some(3i64.into())]);
        assert_eq!(list.to_string(), "{1,NULL,3}");
        assert_eq!(
            ScalarImpl::List(list).to_string(),
            "{1,NULL,3}"
        );
    }
}
