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

//! Estimation of the in-memory size of stateful values, used for memory
//! accounting of bounded aggregate states.

use std::collections::BTreeMap;

/// The trait for estimating the actual memory usage of a struct.
pub trait EstimateSize {
    /// The estimated heap size of the current struct in bytes.
    fn estimated_heap_size(&self) -> usize;

    /// The estimated total size of the current struct in bytes, including the
    /// `estimated_heap_size` and the size of `Self`.
    fn estimated_size(&self) -> usize
    where
        Self: Sized,
    {
        self.estimated_heap_size() + std::mem::size_of::<Self>()
    }
}

/// Marker trait for types with no heap allocation.
pub trait ZeroHeapSize {}

impl<T: ZeroHeapSize> EstimateSize for T {
    fn estimated_heap_size(&self) -> usize {
        0
    }
}

macro_rules! impl_zero_heap_size {
    ($($t:ty),* $(,)?) => {
        $(impl ZeroHeapSize for $t {})*
    };
}

impl_zero_heap_size! { bool, i8, i16, i32, i64, u8, u16, u32, u64, usize, f32, f64 }

impl<T: ordered_float::FloatCore> ZeroHeapSize for ordered_float::OrderedFloat<T> {}

impl EstimateSize for String {
    fn estimated_heap_size(&self) -> usize {
        self.capacity()
    }
}

impl EstimateSize for Box<str> {
    fn estimated_heap_size(&self) -> usize {
        self.len()
    }
}

impl<T: EstimateSize> EstimateSize for Option<T> {
    fn estimated_heap_size(&self) -> usize {
        self.as_ref().map_or(0, EstimateSize::estimated_heap_size)
    }
}

impl<T: ZeroHeapSize> EstimateSize for Vec<T> {
    fn estimated_heap_size(&self) -> usize {
        self.capacity() * std::mem::size_of::<T>()
    }
}

impl<T1: EstimateSize, T2: EstimateSize> EstimateSize for (T1, T2) {
    fn estimated_heap_size(&self) -> usize {
        self.0.estimated_heap_size() + self.1.estimated_heap_size()
    }
}

/// A [`BTreeMap`] that tracks the estimated heap size of its entries.
///
/// `insert` and removal keep a running total, so `estimated_heap_size` is
/// O(1) instead of walking the map.
#[derive(Clone, Debug, Default)]
pub struct EstimatedBTreeMap<K, V> {
    inner: BTreeMap<K, V>,
    heap_size: usize,
}

impl<K, V> EstimatedBTreeMap<K, V> {
    pub fn new() -> Self {
        Self {
            inner: BTreeMap::new(),
            heap_size: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.inner.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.inner.values()
    }
}

impl<K: Ord, V> EstimatedBTreeMap<K, V> {
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.inner.first_key_value()
    }

    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.inner.last_key_value()
    }
}

impl<K, V> EstimatedBTreeMap<K, V>
where
    K: EstimateSize + Ord,
    V: EstimateSize,
{
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.heap_size += key.estimated_size() + value.estimated_size();
        let old = self.inner.insert(key, value);
        if let Some(old_value) = &old {
            // the key slot is reused
            self.heap_size = self
                .heap_size
                .saturating_sub(std::mem::size_of::<K>() + old_value.estimated_size());
        }
        old
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        let value = self.inner.remove(key);
        if let Some(value) = &value {
            self.heap_size = self
                .heap_size
                .saturating_sub(key.estimated_size() + value.estimated_size());
        }
        value
    }

    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let (key, value) = self.inner.pop_first()?;
        self.heap_size = self
            .heap_size
            .saturating_sub(key.estimated_size() + value.estimated_size());
        Some((key, value))
    }

    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let (key, value) = self.inner.pop_last()?;
        self.heap_size = self
            .heap_size
            .saturating_sub(key.estimated_size() + value.estimated_size());
        Some((key, value))
    }

    pub fn clear(&mut self) {
        self.inner.clear();
        self.heap_size = 0;
    }
}

impl<K, V> EstimateSize for EstimatedBTreeMap<K, V> {
    fn estimated_heap_size(&self) -> usize {
        self.heap_size
    }
}
