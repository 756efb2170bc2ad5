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
use hashbrown::hash_map::Entry;
use hashbrown::HashMap;
use itertools::Itertools;
use summit_common::array::DataChunk;
use summit_common::catalog::{Field, Schema};
use summit_common::row::{OwnedRow, Row};
use summit_common::util::chunk_coalesce::DataChunkBuilder;
use summit_expr::aggregate::{build, AggCall, AggregateState, BoxedAggregateFunction};

use super::{BoxedDataChunkStream, BoxedExecutor, Executor};
use crate::error::Result;

/// Hash aggregation executor.
///
/// Accumulates one state per aggregate call per group, updated row by row in
/// a single pass over the input.
pub struct HashAggExecutor {
    aggs: Vec<BoxedAggregateFunction>,
    group_key: Vec<usize>,
    child: BoxedExecutor,
    schema: Schema,
    identity: String,
    chunk_size: usize,
}

impl HashAggExecutor {
    pub fn new(
        agg_calls: Vec<AggCall>,
        group_key: Vec<usize>,
        child: BoxedExecutor,
        identity: String,
        chunk_size: usize,
    ) -> Result<Self> {
        let aggs = agg_calls
            .iter()
            .map(build)
            .collect::<summit_expr::Result<Vec<_>>>()?;
        let mut fields = group_key
            .iter()
            .map(|&idx| child.schema()[idx].clone())
            .collect::<Vec<_>>();
        fields.extend(aggs.iter().map(|agg| Field::unnamed(agg.return_type())));
        Ok(Self {
            aggs,
            group_key,
            child,
            schema: Schema::new(fields),
            identity,
            chunk_size,
        })
    }
}

impl Executor for HashAggExecutor {
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

impl HashAggExecutor {
    fn do_execute(self: Box<Self>) -> impl futures::Stream<Item = Result<DataChunk>> {
        try_stream! {
            let mut groups: HashMap<OwnedRow, Vec<AggregateState>> = HashMap::new();

            let mut child_stream = self.child.execute();
            while let Some(chunk) = child_stream.next().await {
                let chunk = chunk?.compact();
                for row_id in 0..chunk.capacity() {
                    let (row, _) = chunk.row_at(row_id);
                    let key = OwnedRow::new(
                        self.group_key
                            .iter()
                            .map(|&idx| row.datum_at(idx).map(|s| s.into_scalar_impl()))
                            .collect(),
                    );
                    let states = match groups.entry(key) {
                        Entry::Occupied(entry) => entry.into_mut(),
                        Entry::Vacant(entry) => {
                            let states = self
                                .aggs
                                .iter()
                                .map(|agg| agg.create_state())
                                .collect::<summit_expr::Result<Vec<_>>>()?;
                            entry.insert(states)
                        }
                    };
                    for (agg, state) in self.aggs.iter().zip_eq(states.iter_mut()) {
                        agg.update_range(state, &chunk, row_id..row_id + 1).await?;
                    }
                }
            }
            tracing::debug!(identity = %self.identity, groups = groups.len(), "building output");

            let mut chunk_builder =
                DataChunkBuilder::new(self.schema.data_types(), self.chunk_size);
            for (key, states) in groups {
                let mut datums = key.into_inner();
                for (agg, state) in self.aggs.iter().zip_eq(states.iter()) {
                    datums.push(agg.get_result(state).await?);
                }
                if let Some(spilled) = chunk_builder.append_one_row(OwnedRow::new(datums)) {
                    yield spilled;
                }
            }
            if let Some(spilled) = chunk_builder.consume_all() {
                yield spilled;
            }
        }
    }
}
