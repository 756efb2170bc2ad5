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

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use async_stream::try_stream;
use futures::StreamExt;
use summit_common::array::DataChunk;
use summit_common::catalog::Schema;
use summit_common::row::{OwnedRow, Row};
use summit_common::util::chunk_coalesce::DataChunkBuilder;
use summit_common::util::memcmp_encoding::{encode_chunk, MemcmpEncoded};
use summit_common::util::sort_util::ColumnOrder;

use super::{BoxedDataChunkStream, BoxedExecutor, Executor};

/// Top-N executor.
///
/// Keeps at most `limit + offset` rows in a max-heap keyed by the encoded
/// sort key, so the memory bound is independent of the input size.
pub struct TopNExecutor {
    child: BoxedExecutor,
    column_orders: Vec<ColumnOrder>,
    offset: usize,
    limit: usize,
    with_ties: bool,
    identity: String,
    schema: Schema,
    chunk_size: usize,
}

impl TopNExecutor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        child: BoxedExecutor,
        column_orders: Vec<ColumnOrder>,
        offset: usize,
        limit: usize,
        with_ties: bool,
        identity: String,
        chunk_size: usize,
    ) -> Self {
        let schema = child.schema().clone();
        Self {
            child,
            column_orders,
            offset,
            limit,
            with_ties,
            identity,
            schema,
            chunk_size,
        }
    }
}

impl Executor for TopNExecutor {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn identity(&self) -> &str {
        &self.identity
    }

    fn execute(self: Box<Self>) -> BoxedDataChunkStream {
        self.do_execute().boxed()
    }
}

impl TopNExecutor {
    fn do_execute(self: Box<Self>) -> impl futures::Stream<Item = crate::Result<DataChunk>> {
        try_stream! {
            if self.limit == 0 {
                return;
            }
            let mut heap = TopNHeap::new(self.limit, self.offset, self.with_ties);
            let mut child_stream = self.child.execute();
            while let Some(chunk) = child_stream.next().await {
                let chunk = chunk?.compact();
                for (row_id, encoded_row) in
                    encode_chunk(&chunk, &self.column_orders)?.into_iter().enumerate()
                {
                    heap.push(HeapElem::new(encoded_row, chunk.row_at(row_id).0));
                }
            }

            let mut chunk_builder =
                DataChunkBuilder::new(self.schema.data_types(), self.chunk_size);
            for elem in heap.dump() {
                if let Some(spilled) = chunk_builder.append_one_row(elem.row()) {
                    yield spilled;
                }
            }
            if let Some(spilled) = chunk_builder.consume_all() {
                yield spilled;
            }
        }
    }
}

/// An entry in a [`TopNHeap`], ordered by the memcomparable sort key.
#[derive(Clone, Debug)]
pub struct HeapElem {
    encoded_row: MemcmpEncoded,
    row: OwnedRow,
}

impl HeapElem {
    pub fn new(encoded_row: MemcmpEncoded, row: impl Row) -> Self {
        Self {
            encoded_row,
            row: row.to_owned_row(),
        }
    }

    pub fn row(&self) -> &OwnedRow {
        &self.row
    }
}

impl PartialEq for HeapElem {
    fn eq(&self, other: &Self) -> bool {
        self.encoded_row == other.encoded_row
    }
}

impl Eq for HeapElem {}

impl PartialOrd for HeapElem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapElem {
    fn cmp(&self, other: &Self) -> Ordering {
        self.encoded_row.cmp(&other.encoded_row)
    }
}

/// A max-heap bounded to `limit + offset` entries. The peek is the worst row
/// kept, so a better incoming row displaces it in O(log n).
///
/// With `with_ties`, rows tied with the boundary row are all kept, so the
/// heap may temporarily hold more than `limit + offset` entries.
pub struct TopNHeap {
    heap: BinaryHeap<HeapElem>,
    limit: usize,
    offset: usize,
    with_ties: bool,
}

impl TopNHeap {
    pub fn new(limit: usize, offset: usize, with_ties: bool) -> Self {
        assert!(limit > 0);
        Self {
            heap: BinaryHeap::with_capacity(limit + offset),
            limit,
            offset,
            with_ties,
        }
    }

    fn capacity(&self) -> usize {
        self.limit + self.offset
    }

    pub fn push(&mut self, elem: HeapElem) {
        if self.heap.len() < self.capacity() {
            self.heap.push(elem);
            return;
        }
        // the heap is full
        if !self.with_ties {
            let peek = self.heap.pop().expect("heap is full, thus not empty");
            if elem < peek {
                self.heap.push(elem);
            } else {
                self.heap.push(peek);
            }
        } else {
            let peek = self.heap.peek().expect("heap is full, thus not empty").clone();
            match elem.cmp(&peek) {
                Ordering::Less => {
                    // pop all the rows tied with the boundary
                    let mut ties_with_peek = vec![];
                    while self
                        .heap
                        .peek()
                        .is_some_and(|e| e.encoded_row == peek.encoded_row)
                    {
                        ties_with_peek.push(self.heap.pop().expect("peeked"));
                    }
                    self.heap.push(elem);
                    // if the heap is not full again, the popped rows are
                    // still the boundary ties and all of them are kept
                    if self.heap.len() < self.capacity() {
                        self.heap.extend(ties_with_peek);
                    }
                }
                // tie with the boundary row, keep it as well
                Ordering::Equal => self.heap.push(elem),
                Ordering::Greater => {}
            }
        }
    }

    /// Consume the heap and return the kept rows in ranking order, the first
    /// `offset` rows skipped.
    pub fn dump(self) -> impl Iterator<Item = HeapElem> {
        self.heap.into_sorted_vec().into_iter().skip(self.offset)
    }
}

#[cfg(test)]
mod tests {
    use summit_common::array::DataChunkTestExt;
    use summit_common::catalog::Field;
    use summit_common::types::DataType;
    use summit_common::util::sort_util::OrderType;

    use super::*;
    use crate::executor::test_utils::{collect_chunks, MockExecutor};

    const CHUNK_SIZE: usize = 1024;

    fn mock_input(chunk: DataChunk, data_types: Vec<DataType>) -> BoxedExecutor {
        let schema = Schema::new(data_types.into_iter().map(Field::unnamed).collect());
        Box::new(MockExecutor::with_chunk(chunk, schema))
    }

    fn top_n(
        chunk: DataChunk,
        data_types: Vec<DataType>,
        column_orders: Vec<ColumnOrder>,
        offset: usize,
        limit: usize,
        with_ties: bool,
    ) -> Box<TopNExecutor> {
        Box::new(TopNExecutor::new(
            mock_input(chunk, data_types),
            column_orders,
            offset,
            limit,
            with_ties,
            "TopNExecutor".to_string(),
            CHUNK_SIZE,
        ))
    }

    #[tokio::test]
    async fn test_simple_top_n_executor() {
        let executor = top_n(
            DataChunk::from_pretty(
                "i i
                 1 5
                 2 4
                 3 3
                 4 2
                 5 1",
            ),
            vec![DataType::Int32, DataType::Int32],
            vec![
                ColumnOrder::new(1, OrderType::ascending()),
                ColumnOrder::new(0, OrderType::ascending()),
            ],
            1,
            3,
            false,
        );
        let output = collect_chunks(executor).await.unwrap();
        assert_eq!(output.len(), 1);
        assert_eq!(
            output[0],
            DataChunk::from_pretty(
                "i i
                 4 2
                 3 3
                 2 4",
            )
        );
    }

    #[tokio::test]
    async fn test_top_n_with_ties() {
        let executor = top_n(
            DataChunk::from_pretty(
                "i
                 1
                 2
                 2
                 2
                 3",
            ),
            vec![DataType::Int32],
            vec![ColumnOrder::new(0, OrderType::ascending())],
            0,
            2,
            true,
        );
        let output = collect_chunks(executor).await.unwrap();
        assert_eq!(output.len(), 1);
        // all rows tied with the boundary are kept
        assert_eq!(
            output[0],
            DataChunk::from_pretty(
                "i
                 1
                 2
                 2
                 2",
            )
        );
    }

    #[tokio::test]
    async fn test_top_n_ties_evicted() {
        let executor = top_n(
            DataChunk::from_pretty(
                "i
                 2
                 3
                 3
                 1",
            ),
            vec![DataType::Int32],
            vec![ColumnOrder::new(0, OrderType::ascending())],
            0,
            2,
            true,
        );
        let output = collect_chunks(executor).await.unwrap();
        assert_eq!(output.len(), 1);
        // the late 1 pushes both 3s out
        assert_eq!(
            output[0],
            DataChunk::from_pretty(
                "i
                 1
                 2",
            )
        );
    }

    #[tokio::test]
    async fn test_limit_zero() {
        let executor = Box::new(TopNExecutor::new(
            mock_input(
                DataChunk::from_pretty(
                    "i
                     1
                     2",
                ),
                vec![DataType::Int32],
            ),
            vec![ColumnOrder::new(0, OrderType::ascending())],
            0,
            0,
            false,
            "TopNExecutor".to_string(),
            CHUNK_SIZE,
        ));
        let output = collect_chunks(executor).await.unwrap();
        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn test_offset_past_end() {
        let executor = top_n(
            DataChunk::from_pretty(
                "i
                 1
                 2",
            ),
            vec![DataType::Int32],
            vec![ColumnOrder::new(0, OrderType::ascending())],
            5,
            3,
            false,
        );
        let output = collect_chunks(executor).await.unwrap();
        assert!(output.is_empty());
    }
}
