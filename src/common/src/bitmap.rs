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

//! Null bitmap used by arrays and chunk visibility.

use std::ops::BitAnd;

use crate::estimate_size::EstimateSize;

const BITS: usize = u64::BITS as usize;

/// An immutable bitmap. Set bits mark non-null values (or visible rows).
#[derive(Clone, PartialEq, Eq)]
pub struct Bitmap {
    bits: Box<[u64]>,
    num_bits: usize,
    count_ones: usize,
}

impl std::fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for bit in self.iter() {
            write!(f, "{}", if bit { '1' } else { '0' })?;
        }
        Ok(())
    }
}

impl Bitmap {
    /// Creates a bitmap with all bits set.
    pub fn ones(num_bits: usize) -> Self {
        let mut builder = BitmapBuilder::with_capacity(num_bits);
        for _ in 0..num_bits {
            builder.append(true);
        }
        builder.finish()
    }

    pub fn from_bool_slice(bools: &[bool]) -> Self {
        bools.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.num_bits
    }

    pub fn is_empty(&self) -> bool {
        self.num_bits == 0
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.count_ones
    }

    /// # Panics
    /// Panics if `idx` is out of bounds.
    pub fn is_set(&self, idx: usize) -> bool {
        assert!(
            idx < self.num_bits,
            "index {idx} out of range {}",
            self.num_bits
        );
        // Safety: just checked the bounds.
        unsafe { self.is_set_unchecked(idx) }
    }

    /// # Safety
    /// The caller must ensure `idx < self.len()`.
    pub unsafe fn is_set_unchecked(&self, idx: usize) -> bool {
        self.bits.get_unchecked(idx / BITS) & (1 << (idx % BITS)) != 0
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = bool> + '_ {
        (0..self.num_bits).map(|idx| unsafe { self.is_set_unchecked(idx) })
    }
}

impl FromIterator<bool> for Bitmap {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let mut builder = BitmapBuilder::default();
        for bit in iter {
            builder.append(bit);
        }
        builder.finish()
    }
}

impl BitAnd for &Bitmap {
    type Output = Bitmap;

    fn bitand(self, rhs: &Bitmap) -> Bitmap {
        assert_eq!(self.num_bits, rhs.num_bits);
        self.iter().zip(rhs.iter()).map(|(a, b)| a & b).collect()
    }
}

impl EstimateSize for Bitmap {
    fn estimated_heap_size(&self) -> usize {
        std::mem::size_of_val(self.bits.as_ref())
    }
}

/// Builder for [`Bitmap`].
#[derive(Debug, Default)]
pub struct BitmapBuilder {
    bits: Vec<u64>,
    num_bits: usize,
    count_ones: usize,
}

impl BitmapBuilder {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bits: Vec::with_capacity(capacity.div_ceil(BITS)),
            num_bits: 0,
            count_ones: 0,
        }
    }

    pub fn append(&mut self, bit: bool) -> &mut Self {
        if self.num_bits % BITS == 0 {
            self.bits.push(0);
        }
        if bit {
            *self.bits.last_mut().unwrap() |= 1 << (self.num_bits % BITS);
            self.count_ones += 1;
        }
        self.num_bits += 1;
        self
    }

    pub fn len(&self) -> usize {
        self.num_bits
    }

    pub fn is_empty(&self) -> bool {
        self.num_bits == 0
    }

    pub fn finish(self) -> Bitmap {
        Bitmap {
            bits: self.bits.into_boxed_slice(),
            num_bits: self.num_bits,
            count_ones: self.count_ones,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_roundtrip() {
        let bools = [true, false, true, true, false, false, true];
        let bitmap = Bitmap::from_bool_slice(&bools);
        assert_eq!(bitmap.len(), 7);
        assert_eq!(bitmap.count_ones(), 4);
        for (idx, b) in bools.iter().enumerate() {
            assert_eq!(bitmap.is_set(idx), *b);
        }
        assert_eq!(bitmap.iter().collect::<Vec<_>>(), bools);
    }

    #[test]
    fn test_long_bitmap() {
        let bitmap: Bitmap = (0..1000).map(|i| i % 3 == 0).collect();
        assert_eq!(bitmap.len(), 1000);
        assert_eq!(bitmap.count_ones(), 334);
        assert!(bitmap.is_set(999));
        assert!(!bitmap.is_set(998));
    }

    #[test]
    fn test_bitand() {
        let a = Bitmap::from_bool_slice(&[true, true, false, false]);
        let b = Bitmap::from_bool_slice(&[true, false, true, false]);
        let c = &a & &b;
        assert_eq!(
            c.iter().collect::<Vec<_>>(),
            vec![true, false, false, false]
        );
    }

    #[test]
    #[should_panic]
    fn test_out_of_range() {
        let bitmap = Bitmap::ones(8);
        let _ = bitmap.is_set(8);
    }
}
