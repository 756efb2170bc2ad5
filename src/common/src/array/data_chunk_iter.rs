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

use super::DataChunk;
use crate::row::Row;
use crate::types::DatumRef;

/// Iterator over the visible rows of a [`DataChunk`].
pub struct DataChunkRowIter<'a> {
    chunk: &'a DataChunk,
    idx: usize,
}

impl<'a> DataChunkRowIter<'a> {
    pub(super) fn new(chunk: &'a DataChunk) -> Self {
        Self { chunk, idx: 0 }
    }
}

impl<'a> Iterator for DataChunkRowIter<'a> {
    type Item = RowRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.idx < self.chunk.capacity() {
            let idx = self.idx;
            self.idx += 1;
            if self.chunk.is_vis(idx) {
                return Some(RowRef::new(self.chunk, idx));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.chunk.capacity() - self.idx))
    }
}

/// A row in a [`DataChunk`], borrowing its columns.
#[derive(Clone, Copy)]
pub struct RowRef<'a> {
    chunk: &'a DataChunk,
    idx: usize,
}

impl std::fmt::Debug for RowRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a> RowRef<'a> {
    pub fn new(chunk: &'a DataChunk, idx: usize) -> Self {
        assert!(idx < chunk.capacity());
        Self { chunk, idx }
    }

    /// Index of this row inside the chunk, including invisible rows.
    pub fn index(&self) -> usize {
        self.idx
    }
}

impl Row for RowRef<'_> {
    fn datum_at(&self, index: usize) -> DatumRef<'_> {
        self.chunk.column_at(index).value_at(self.idx)
    }

    fn len(&self) -> usize {
        self.chunk.dimension()
    }

    fn iter(&self) -> impl ExactSizeIterator<Item = DatumRef<'_>> {
        (0..self.len()).map(|i| self.datum_at(i))
    }
}

impl PartialEq for RowRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl Eq for RowRef<'_> {}
