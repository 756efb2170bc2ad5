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

use async_stream::try_stream;
use futures::StreamExt;
use hashbrown::HashMap;
use summit_common::array::DataChunk;
use summit_common::catalog::Schema;
use summit_common::row::{OwnedRow, Row};
use summit_common::util::chunk_coalesce::DataChunkBuilder;
use summit_common::util::memcmp_encoding::encode_chunk;
use summit_common::util::sort_util::ColumnOrder;

use super::top_n::{HeapElem, TopNHeap};
use super::{BoxedDataChunkStream, BoxedExecutor, Executor};

/// Group Top-N executor.
///
/// For each group of the group key, keeps at most `limit + offset` rows in a
/// [`TopNHeap`], so the memory bound is proportional to the number of groups
/// rather than the input size.
pub struct GroupTopNExecutor {
    child: BoxedExecutor,
    column_orders: Vec<ColumnOrder>,
    offset: usize,
    limit: usize,
    with_ties: bool,
    group_key: Vec<usize>,
    identity: String,
    schema: Schema,
    chunk_size: usize,
}

impl GroupTopNExecutor {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        child: BoxedExecutor,
        column_orders: Vec<ColumnOrder>,
        offset: usize,
        limit: usize,
        with_ties: bool,
        group_key: Vec<usize>,
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
            group_key,
            identity,
            schema,
            chunk_size,
        }
    }
}

impl Executor for GroupTopNExecutor {
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

impl GroupTopNExecutor {
    fn do_execute(self: Box<Self>) -> impl futures::Stream<Item = crate::Result<DataChunk>> {
        try_stream! {
            if self.limit == 0 {
                return;
            }
            let mut groups = HashMap::<OwnedRow, TopNHeap>::new();

            let mut child_stream = self.child.execute();
            while let Some(chunk) = child_stream.next().await {
                let chunk = chunk?.compact();
                for (row_id, encoded_row) in
                    encode_chunk(&chunk, &self.column_orders)?.into_iter().enumerate()
                {
                    let (row, _) = chunk.row_at(row_id);
                    let key = OwnedRow::new(
                        self.group_key
                            .iter()
                            .map(|&idx| row.datum_at(idx).map(|s| s.into_scalar_impl()))
                            .collect(),
                    );
                    let heap = groups.entry(key).or_insert_with(|| {
                        TopNHeap::new(self.limit, self.offset, self.with_ties)
                    });
                    heap.push(HeapElem::new(encoded_row, row));
                }
            }
            tracing::debug!(identity = %self.identity, groups = groups.len(), "dumping groups");

            let mut chunk_builder =
                DataChunkBuilder::new(self.schema.data_types(), self.chunk_size);
            for (_, heap) in groups {
                for elem in heap.dump() {
                    if let Some(spilled) = chunk_builder.append_one_row(elem.row()) {
                        yield spilled;
                    }
                }
            }
            if let Some(spilled) = chunk_builder.consume_all() {
                yield spilled;
            }
        }
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

    #[tokio::test]
    async fn test_group_top_n_executor() {
        let schema = Schema {
            fields: vec![
                Field::unnamed(DataType::Int32),
                Field::unnamed(DataType::Int32),
                Field::unnamed(DataType::Int32),
            ],
        };
        let mock_executor = MockExecutor::with_chunk(
            DataChunk::from_pretty(
                "i i i
                 1 5 1
                 2 4 1
                 3 3 1
                 4 2 1
                 5 1 1
                 1 6 2
                 2 5 2
                 3 4 2
                 4 3 2
                 5 2 2",
            ),
            schema,
        );
        let column_orders = vec![
            ColumnOrder::new(1, OrderType::ascending()),
            ColumnOrder::new(0, OrderType::ascending()),
        ];
        let executor = Box::new(GroupTopNExecutor::new(
            Box::new(mock_executor),
            column_orders,
            1,
            3,
            false,
            vec![2],
            "GroupTopNExecutor".to_string(),
            CHUNK_SIZE,
        ));
        let output = collect_chunks(executor).await.unwrap();
        assert_eq!(output.len(), 1);
        let res = &output[0];
        // group iteration order is not deterministic
        assert!(
            *res == DataChunk::from_pretty(
                "i i i
                 4 2 1
                 3 3 1
                 2 4 1
                 4 3 2
                 3 4 2
                 2 5 2",
            ) || *res
                == DataChunk::from_pretty(
                    "i i i
                     4 3 2
                     3 4 2
                     2 5 2
                     4 2 1
                     3 3 1
                     2 4 1",
                )
        );
    }

    #[tokio::test]
    async fn test_group_top_n_null_group_key() {
        let schema = Schema {
            fields: vec![
                Field::unnamed(DataType::Int32),
                Field::unnamed(DataType::Int32),
            ],
        };
        let mock_executor = MockExecutor::with_chunk(
            DataChunk::from_pretty(
                "i i
                 1 .
                 2 .
                 3 1",
            ),
            schema,
        );
        let executor = Box::new(GroupTopNExecutor::new(
            Box::new(mock_executor),
            vec![ColumnOrder::new(0, OrderType::descending())],
            0,
            1,
            false,
            vec![1],
            "GroupTopNExecutor".to_string(),
            CHUNK_SIZE,
        ));
        let output = collect_chunks(executor).await.unwrap();
        assert_eq!(output.len(), 1);
        let res = &output[0];
        // NULL keys form their own group
        assert_eq!(res.cardinality(), 2);
        assert!(
            *res == DataChunk::from_pretty(
                "i i
                 2 .
                 3 1",
            ) || *res
                == DataChunk::from_pretty(
                    "i i
                     3 1
                     2 .",
                )
        );
    }

    #[tokio::test]
    async fn test_group_top_n_limit_zero() {
        let schema = Schema {
            fields: vec![Field::unnamed(DataType::Int32)],
        };
        let mock_executor = MockExecutor::with_chunk(
            DataChunk::from_pretty(
                "i
                 1",
            ),
            schema,
        );
        let executor = Box::new(GroupTopNExecutor::new(
            Box::new(mock_executor),
            vec![ColumnOrder::new(0, OrderType::ascending())],
            0,
            0,
            false,
            vec![0],
            "GroupTopNExecutor".to_string(),
            CHUNK_SIZE,
        ));
        let output = collect_chunks(executor).await.unwrap();
        assert!(output.is_empty());
    }
}
