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

//! Test and benchmark utilities. Also used by the criterion benches, hence
//! compiled unconditionally.

use std::collections::VecDeque;

use async_stream::try_stream;
use futures::StreamExt;
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use summit_common::array::{DataChunk, Vis};
use summit_common::catalog::{Field, Schema};
use summit_common::types::{DataType, Datum, ScalarImpl};

use super::{BoxedDataChunkStream, BoxedExecutor, Executor};

/// An executor that yields chunks from a fixed queue.
pub struct MockExecutor {
    chunks: VecDeque<DataChunk>,
    schema: Schema,
    identity: String,
}

impl MockExecutor {
    pub fn new(schema: Schema) -> Self {
        Self {
            chunks: VecDeque::new(),
            schema,
            identity: "MockExecutor".to_string(),
        }
    }

    pub fn with_chunk(chunk: DataChunk, schema: Schema) -> Self {
        let mut this = Self::new(schema);
        this.add(chunk);
        this
    }

    pub fn add(&mut self, chunk: DataChunk) {
        self.chunks.push_back(chunk);
    }
}

impl Executor for MockExecutor {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn identity(&self) -> &str {
        &self.identity
    }

    fn execute(self: Box<Self>) -> BoxedDataChunkStream {
        try_stream! {
            for chunk in self.chunks {
                yield chunk;
            }
        }
        .boxed()
    }
}

fn gen_datum(rng: &mut StdRng, data_type: &DataType) -> Datum {
    Some(match data_type {
        DataType::Boolean => ScalarImpl::Bool(rng.gen()),
        DataType::Int16 => ScalarImpl::Int16(rng.gen()),
        DataType::Int32 => ScalarImpl::Int32(rng.gen()),
        DataType::Int64 => ScalarImpl::Int64(rng.gen()),
        DataType::Float32 => ScalarImpl::Float32(rng.gen::<f32>().into()),
        DataType::Float64 => ScalarImpl::Float64(rng.gen::<f64>().into()),
        DataType::Varchar => {
            let len = rng.gen_range(1..=8);
            let s: String = (0..len).map(|_| rng.sample(Alphanumeric) as char).collect();
            ScalarImpl::Utf8(s.into())
        }
        DataType::List { .. } => panic!("cannot generate random list"),
    })
}

/// Generate a chunk of random data with a deterministic seed.
pub fn gen_chunk(data_types: &[DataType], size: usize, seed: u64) -> DataChunk {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut builders = data_types
        .iter()
        .map(|ty| ty.create_array_builder(size))
        .collect::<Vec<_>>();
    for _ in 0..size {
        for (builder, ty) in builders.iter_mut().zip(data_types) {
            builder.append_datum(gen_datum(&mut rng, ty));
        }
    }
    DataChunk::new(
        builders
            .into_iter()
            .map(|b| std::sync::Arc::new(b.finish()))
            .collect(),
        Vis::Compact(size),
    )
}

/// Build a mock input of `chunk_num` chunks of random data.
pub fn create_input(
    data_types: &[DataType],
    chunk_size: usize,
    chunk_num: usize,
) -> BoxedExecutor {
    let schema = Schema::new(
        data_types
            .iter()
            .map(|ty| Field::unnamed(ty.clone()))
            .collect(),
    );
    let mut input = MockExecutor::new(schema);
    for i in 0..chunk_num {
        input.add(gen_chunk(data_types, chunk_size, i as u64));
    }
    Box::new(input)
}

/// Drain an executor into a vector of chunks.
pub async fn collect_chunks(executor: BoxedExecutor) -> crate::error::Result<Vec<DataChunk>> {
    let mut stream = executor.execute();
    let mut chunks = vec![];
    while let Some(chunk) = stream.next().await {
        chunks.push(chunk?);
    }
    Ok(chunks)
}
