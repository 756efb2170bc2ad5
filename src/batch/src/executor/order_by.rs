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
use summit_common::array::DataChunk;
use summit_common::catalog::Schema;
use summit_common::util::chunk_coalesce::DataChunkBuilder;
use summit_common::util::memcmp_encoding::encode_chunk;
use summit_common::util::sort_util::ColumnOrder;

use super::{BoxedDataChunkStream, BoxedExecutor, Executor};

/// Sort executor.
///
/// Collects all input chunks, sorts the rows by the encoded sort keys and
/// re-chunks the output.
pub struct SortExecutor {
    child: BoxedExecutor,
    column_orders: Vec<ColumnOrder>,
    identity: String,
    schema: Schema,
    chunk_size: usize,
}

impl SortExecutor {
    pub fn new(
        child: BoxedExecutor,
        column_orders: Vec<ColumnOrder>,
        identity: String,
        chunk_size: usize,
    ) -> Self {
        let schema = child.schema().clone();
        Self {
            child,
            column_orders,
            identity,
            schema,
            chunk_size,
        }
    }
}

impl Executor for SortExecutor {
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

impl SortExecutor {
    fn do_execute(self: Box<Self>) -> impl futures::Stream<Item = crate::Result<DataChunk>> {
        try_stream! {
            let mut chunks = vec![];
            let mut child_stream = self.child.execute();
            while let Some(chunk) = child_stream.next().await {
                chunks.push(chunk?.compact());
            }
            tracing::debug!(identity = %self.identity, chunks = chunks.len(), "sorting input");

            let mut encoded_rows = vec![];
            for (chunk_id, chunk) in chunks.iter().enumerate() {
                let encoded = encode_chunk(chunk, &self.column_orders)?;
                encoded_rows
                    .extend(encoded.into_iter().enumerate().map(|(i, e)| ((chunk_id, i), e)));
            }
            encoded_rows.sort_unstable_by(|(_, a), (_, b)| a.cmp(b));

            let mut builder =
                DataChunkBuilder::new(self.schema.data_types(), self.chunk_size);
            for ((chunk_id, row_id), _) in &encoded_rows {
                let (row, _) = chunks[*chunk_id].row_at(*row_id);
                if let Some(output) = builder.append_one_row(row) {
                    yield output;
                }
            }
            if let Some(output) = builder.consume_all() {
                yield output;
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

    fn mock_input(chunks: Vec<DataChunk>, data_types: Vec<DataType>) -> BoxedExecutor {
        let schema = Schema::new(data_types.into_iter().map(Field::unnamed).collect());
        let mut mock = MockExecutor::new(schema);
        for chunk in chunks {
            mock.add(chunk);
        }
        Box::new(mock)
    }

    #[tokio::test]
    async fn test_sort_multi_column() {
        let input = mock_input(
            vec![DataChunk::from_pretty(
                "i T
                 1 b
                 2 a
                 1 a
                 . c",
            )],
            vec![DataType::Int32, DataType::Varchar],
        );
        let executor = Box::new(SortExecutor::new(
            input,
            vec![
                ColumnOrder::new(0, OrderType::Ascending),
                ColumnOrder::new(1, OrderType::Descending),
            ],
            "SortExecutor".to_string(),
            256,
        ));
        let output = collect_chunks(executor).await.unwrap();
        assert_eq!(output.len(), 1);
        // NULLs first in ascending order
        assert_eq!(
            output[0],
            DataChunk::from_pretty(
                "i T
                 . c
                 1 b
                 1 a
                 2 a",
            )
        );
    }

    #[tokio::test]
    async fn test_sort_rechunks() {
        let input = mock_input(
            vec![
                DataChunk::from_pretty(
                    "i
                     3
                     1",
                ),
                DataChunk::from_pretty(
                    "i
                     2
                     4 D",
                ),
            ],
            vec![DataType::Int32],
        );
        let executor = Box::new(SortExecutor::new(
            input,
            vec![ColumnOrder::new(0, OrderType::Ascending)],
            "SortExecutor".to_string(),
            2,
        ));
        let output = collect_chunks(executor).await.unwrap();
        assert_eq!(output.len(), 2);
        assert_eq!(
            output[0],
            DataChunk::from_pretty(
                "i
                 1
                 2",
            )
        );
        assert_eq!(
            output[1],
            DataChunk::from_pretty(
                "i
                 3",
            )
        );
    }
}
