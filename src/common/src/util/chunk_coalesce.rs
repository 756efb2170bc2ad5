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

use crate::array::{ArrayBuilderImpl, DataChunk, Vis};
use crate::row::Row;
use crate::types::DataType;

/// A [`DataChunk`] builder that appends rows and emits a chunk whenever the
/// buffered row count reaches `batch_size`.
pub struct DataChunkBuilder {
    data_types: Vec<DataType>,
    batch_size: usize,

    array_builders: Vec<ArrayBuilderImpl>,
    buffered_count: usize,
}

impl DataChunkBuilder {
    pub fn new(data_types: Vec<DataType>, batch_size: usize) -> Self {
        assert!(batch_size > 0);
        Self {
            data_types,
            batch_size,
            array_builders: vec![],
            buffered_count: 0,
        }
    }

    fn ensure_builders(&mut self) {
        if self.array_builders.is_empty() {
            self.array_builders = self
                .data_types
                .iter()
                .map(|ty| ty.create_array_builder(self.batch_size))
                .collect();
        }
    }

    /// Append one row. Returns a chunk if the buffer becomes full.
    pub fn append_one_row(&mut self, row: impl Row) -> Option<DataChunk> {
        assert_eq!(row.len(), self.data_types.len());
        self.ensure_builders();
        for (builder, datum) in self.array_builders.iter_mut().zip(row.iter()) {
            builder.append_datum(datum);
        }
        self.buffered_count += 1;
        if self.buffered_count == self.batch_size {
            self.build_chunk()
        } else {
            None
        }
    }

    /// Drain the remaining buffered rows, if any.
    pub fn consume_all(&mut self) -> Option<DataChunk> {
        self.build_chunk()
    }

    fn build_chunk(&mut self) -> Option<DataChunk> {
        if self.buffered_count == 0 {
            return None;
        }
        let cardinality = self.buffered_count;
        self.buffered_count = 0;
        let columns = std::mem::take(&mut self.array_builders)
            .into_iter()
            .map(|builder| Arc::new(builder.finish()))
            .collect();
        Some(DataChunk::new(columns, Vis::Compact(cardinality)))
    }

    pub fn buffered_count(&self) -> usize {
        self.buffered_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::DataChunkTestExt;

    #[test]
    fn test_append_rows() {
        let mut builder =
            DataChunkBuilder::new(vec![DataType::Int32, DataType::Varchar], 2);
        let input = DataChunk::from_pretty(
            "i T
             1 a
             2 .
             3 c",
        );
        let mut output = vec![];
        for row in input.rows() {
            if let Some(chunk) = builder.append_one_row(row) {
                output.push(chunk);
            }
        }
        if let Some(chunk) = builder.consume_all() {
            output.push(chunk);
        }
        assert_eq!(output.len(), 2);
        assert_eq!(output[0].cardinality(), 2);
        assert_eq!(output[1].cardinality(), 1);
        assert!(builder.consume_all().is_none());
    }
}
