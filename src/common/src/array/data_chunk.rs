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

use std::sync::Arc;

use itertools::Itertools;

use super::{ArrayImpl, DataChunkRowIter, RowRef};
use crate::bitmap::Bitmap;
use crate::row::Row;
use crate::types::{DataType, ScalarImpl};

pub type ArrayRef = Arc<ArrayImpl>;

/// Visibility of the rows in a [`DataChunk`].
#[derive(Clone, Debug)]
pub enum Vis {
    /// Non-compacted chunk: the bitmap marks the visible rows.
    Bitmap(Bitmap),
    /// Compacted chunk: all rows are visible, with the given cardinality.
    Compact(usize),
}

impl Vis {
    pub fn len(&self) -> usize {
        match self {
            Vis::Bitmap(b) => b.len(),
            Vis::Compact(c) => *c,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_set(&self, idx: usize) -> bool {
        match self {
            Vis::Bitmap(b) => b.is_set(idx),
            Vis::Compact(c) => {
                assert!(idx < *c);
                true
            }
        }
    }
}

/// [`DataChunk`] is a collection of columns sharing a visibility mask, the
/// unit of data passed between executors.
#[derive(Clone, Debug)]
pub struct DataChunk {
    columns: Vec<ArrayRef>,
    vis: Vis,
}

impl DataChunk {
    /// Create a `DataChunk` with columns and visibility.
    ///
    /// # Panics
    /// Panics if the columns have different lengths.
    pub fn new(columns: Vec<ArrayRef>, vis: Vis) -> Self {
        let capacity = vis.len();
        for column in &columns {
            assert_eq!(column.len(), capacity);
        }
        Self { columns, vis }
    }

    pub fn from_arrays(arrays: Vec<ArrayImpl>) -> Self {
        let cardinality = arrays.first().map(|a| a.len()).unwrap_or(0);
        Self::new(
            arrays.into_iter().map(Arc::new).collect(),
            Vis::Compact(cardinality),
        )
    }

    /// Number of rows, including invisible ones.
    pub fn capacity(&self) -> usize {
        self.vis.len()
    }

    /// Number of visible rows.
    pub fn cardinality(&self) -> usize {
        match &self.vis {
            Vis::Bitmap(b) => b.count_ones(),
            Vis::Compact(c) => *c,
        }
    }

    pub fn dimension(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[ArrayRef] {
        &self.columns
    }

    pub fn column_at(&self, idx: usize) -> &ArrayRef {
        &self.columns[idx]
    }

    pub fn data_types(&self) -> Vec<DataType> {
        self.columns.iter().map(|col| col.data_type()).collect()
    }

    pub fn visibility(&self) -> &Vis {
        &self.vis
    }

    pub fn is_vis(&self, idx: usize) -> bool {
        self.vis.is_set(idx)
    }

    /// Remove invisible rows, so that the chunk is compacted.
    pub fn compact(self) -> Self {
        match &self.vis {
            Vis::Compact(_) => self,
            Vis::Bitmap(visibility) => {
                let cardinality = visibility.count_ones();
                let columns = self
                    .columns
                    .iter()
                    .map(|col| Arc::new(col.compact(visibility, cardinality)))
                    .collect();
                Self::new(columns, Vis::Compact(cardinality))
            }
        }
    }

    /// Get the row at `pos`, together with its visibility.
    pub fn row_at(&self, pos: usize) -> (RowRef<'_>, bool) {
        (RowRef::new(self, pos), self.vis.is_set(pos))
    }

    /// Iterate over the visible rows.
    pub fn rows(&self) -> DataChunkRowIter<'_> {
        DataChunkRowIter::new(self)
    }
}

/// Chunks are equal when their visible rows carry equal datums, regardless of
/// the physical layout.
impl PartialEq for DataChunk {
    fn eq(&self, other: &Self) -> bool {
        self.data_types() == other.data_types()
            && self.cardinality() == other.cardinality()
            && self
                .rows()
                .zip_eq(other.rows())
                .all(|(a, b)| a.iter().eq(b.iter()))
    }
}

impl std::fmt::Display for DataChunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "DataChunk {{ cardinality: {}, capacity: {} }}",
            self.cardinality(),
            self.capacity()
        )?;
        for row in self.rows() {
            writeln!(
                f,
                "{}",
                row.iter()
                    .map(|d| match d {
                        Some(s) => s.to_string(),
                        None => ".".to_string(),
                    })
                    .join(" ")
            )?;
        }
        Ok(())
    }
}

/// Test utilities for constructing chunks from text fixtures.
pub trait DataChunkTestExt {
    /// Parse a chunk from a pretty table, e.g.
    ///
    /// ```text
    /// I I I I      // type chars
    /// 2 5 . .      // '.' means NULL
    /// 2 5 2 6 D    // 'D' means deleted in visibility
    /// . . 4 8      // ^ comments are ignored
    /// ```
    ///
    /// type chars:
    ///     B: bool
    ///     I: i64
    ///     i: i32
    ///     F: f64
    ///     f: f32
    ///     T: str
    fn from_pretty(s: &str) -> Self;
}

impl DataChunkTestExt for DataChunk {
    fn from_pretty(s: &str) -> Self {
        fn parse_type(s: &str) -> DataType {
            match s {
                "B" => DataType::Boolean,
                "I" => DataType::Int64,
                "i" => DataType::Int32,
                "F" => DataType::Float64,
                "f" => DataType::Float32,
                "T" => DataType::Varchar,
                _ => todo!("unsupported type: {s:?}"),
            }
        }

        let mut lines = s.split('\n').filter(|l| !l.trim().is_empty());
        // initialize array builders from the first line
        let header = lines.next().unwrap().trim();
        let datatypes = header
            .split_ascii_whitespace()
            .take_while(|c| *c != "//")
            .map(parse_type)
            .collect::<Vec<_>>();
        let mut array_builders = datatypes
            .iter()
            .map(|ty| ty.create_array_builder(1))
            .collect::<Vec<_>>();
        let mut visibility = vec![];
        for line in lines {
            let mut token = line.trim().split_ascii_whitespace();
            // allow `zip` since `token` may be longer than `array_builders`
            for ((builder, ty), val_str) in
                array_builders.iter_mut().zip(&datatypes).zip(&mut token)
            {
                let datum = match val_str {
                    "." => None,
                    "t" => Some(true.into()),
                    "f" => Some(false.into()),
                    _ => Some(ScalarImpl::from_text(val_str, ty).unwrap()),
                };
                builder.append_datum(datum);
            }
            let visible = match token.next() {
                None | Some("//") => true,
                Some("D") => false,
                Some(t) => panic!("invalid token: {t:?}"),
            };
            visibility.push(visible);
        }
        let columns = array_builders
            .into_iter()
            .map(|builder| Arc::new(builder.finish()))
            .collect();
        let vis = if visibility.iter().all(|b| *b) {
            Vis::Compact(visibility.len())
        } else {
            Vis::Bitmap(Bitmap::from_bool_slice(&visibility))
        };
        DataChunk::new(columns, vis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScalarRefImpl;

    #[test]
    fn test_from_pretty() {
        let chunk = DataChunk::from_pretty(
            "i I T
             1 4 a
             2 5 . D
             3 6 c",
        );
        assert_eq!(chunk.capacity(), 3);
        assert_eq!(chunk.cardinality(), 2);
        assert_eq!(
            chunk.data_types(),
            vec![DataType::Int32, DataType::Int64, DataType::Varchar]
        );

        let rows = chunk.rows().collect::<Vec<_>>();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].datum_at(2), Some(ScalarRefImpl::Utf8("a")));
        assert_eq!(rows[1].datum_at(0), Some(ScalarRefImpl::Int32(3)));
    }

    #[test]
    fn test_compact() {
        let chunk = DataChunk::from_pretty(
            "i
             1
             2 D
             3",
        );
        let compacted = chunk.clone().compact();
        assert_eq!(compacted.capacity(), 2);
        assert_eq!(compacted.cardinality(), 2);
        // row-wise equality ignores the physical layout
        assert_eq!(chunk, compacted);
    }

    #[test]
    fn test_row_at() {
        let chunk = DataChunk::from_pretty(
            "i i
             5 1
             6 2 D",
        );
        let (row, vis) = chunk.row_at(1);
        assert!(!vis);
        assert_eq!(row.datum_at(0), Some(ScalarRefImpl::Int32(6)));
    }
}
