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

//! Top-N executors must return the same rows as sorting the whole input and
//! slicing it, whenever the ordering has no ties.

use futures::StreamExt;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use summit_batch::executor::test_utils::MockExecutor;
use summit_batch::executor::{
    BoxedExecutor, GroupTopNExecutor, HashAggExecutor, SortExecutor, TopNExecutor,
};
use summit_common::array::{DataChunk, ListValue};
use summit_common::catalog::{Field, Schema};
use summit_common::row::Row;
use summit_common::test_prelude::DataChunkTestExt;
use summit_common::types::{DataType, Datum, ScalarImpl, ToOwnedDatum};
use summit_common::util::sort_util::{ColumnOrder, OrderType};
use summit_expr::aggregate::{AggArgs, AggCall, AggKind};

const CHUNK_SIZE: usize = 256;

/// Random rows (group, key, payload) with globally distinct keys, split into
/// several chunks.
fn gen_input(seed: u64, rows: usize, groups: i32) -> (Vec<DataChunk>, Vec<(i32, i64, i64)>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut keys: Vec<i64> = (0..rows as i64).collect();
    keys.shuffle(&mut rng);
    let data: Vec<(i32, i64, i64)> = keys
        .into_iter()
        .map(|key| (rng.gen_range(0..groups), key, rng.gen_range(0..1000)))
        .collect();

    let mut chunks = vec![];
    for batch in data.chunks(100) {
        let mut text = String::from("i I I\n");
        for (group, key, payload) in batch {
            text.push_str(&format!("{group} {key} {payload}\n"));
        }
        chunks.push(DataChunk::from_pretty(&text));
    }
    (chunks, data)
}

fn input_schema() -> Schema {
    Schema::new(vec![
        Field::unnamed(DataType::Int32),
        Field::unnamed(DataType::Int64),
        Field::unnamed(DataType::Int64),
    ])
}

fn mock_input(chunks: Vec<DataChunk>) -> BoxedExecutor {
    let mut mock = MockExecutor::new(input_schema());
    for chunk in chunks {
        mock.add(chunk);
    }
    Box::new(mock)
}

async fn collect_rows(executor: BoxedExecutor) -> Vec<Vec<Datum>> {
    let mut stream = executor.execute();
    let mut rows = vec![];
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.unwrap();
        for row in chunk.rows() {
            rows.push(row.iter().map(|d| d.to_owned_datum()).collect());
        }
    }
    rows
}

#[tokio::test]
async fn test_top_n_equals_sort_and_slice() {
    for seed in 0..8 {
        let (chunks, _) = gen_input(seed, 500, 1);
        let (offset, limit) = (7, 20);
        let column_orders = vec![ColumnOrder::new(1, OrderType::Descending)];

        let top_n = Box::new(TopNExecutor::new(
            mock_input(chunks.clone()),
            column_orders.clone(),
            offset,
            limit,
            false,
            "TopNExecutor".to_string(),
            CHUNK_SIZE,
        ));
        let got = collect_rows(top_n).await;

        let sort = Box::new(SortExecutor::new(
            mock_input(chunks),
            column_orders,
            "SortExecutor".to_string(),
            CHUNK_SIZE,
        ));
        let expected: Vec<_> = collect_rows(sort)
            .await
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect();

        assert_eq!(got, expected, "seed {seed}");
    }
}

#[tokio::test]
async fn test_group_top_n_equals_per_group_sort() {
    for seed in 0..8 {
        let (chunks, data) = gen_input(seed, 400, 5);
        let limit = 3;

        let group_top_n = Box::new(GroupTopNExecutor::new(
            mock_input(chunks),
            vec![ColumnOrder::new(1, OrderType::Ascending)],
            0,
            limit,
            false,
            vec![0],
            "GroupTopNExecutor".to_string(),
            CHUNK_SIZE,
        ));
        let mut got = collect_rows(group_top_n).await;
        got.sort_by(|a, b| a.cmp(b));

        // reference: sort each group's rows and slice
        let mut expected = vec![];
        for group in 0..5 {
            let mut rows: Vec<_> = data.iter().filter(|(g, ..)| *g == group).collect();
            rows.sort_by_key(|(_, key, _)| *key);
            for &(g, key, payload) in rows.into_iter().take(limit) {
                expected.push(vec![
                    Some(ScalarImpl::Int32(g)),
                    Some(ScalarImpl::Int64(key)),
                    Some(ScalarImpl::Int64(payload)),
                ]);
            }
        }
        expected.sort_by(|a, b| a.cmp(b));

        assert_eq!(got, expected, "seed {seed}");
    }
}

#[tokio::test]
async fn test_top_n_aggregate_equals_per_group_sort() {
    for seed in 0..8 {
        let (chunks, data) = gen_input(seed, 400, 5);
        let n = 4;

        let hash_agg = Box::new(
            HashAggExecutor::new(
                vec![AggCall {
                    kind: AggKind::TopN,
                    args: AggArgs::Unary(DataType::Int64, 1),
                    return_type: DataType::list(DataType::Int64),
                    column_orders: vec![ColumnOrder::new(1, OrderType::Descending)],
                    direct_args: vec![Some(ScalarImpl::Int64(n as i64))],
                }],
                vec![0],
                mock_input(chunks),
                "HashAggExecutor".to_string(),
                CHUNK_SIZE,
            )
            .unwrap(),
        );
        let mut got = collect_rows(hash_agg).await;
        got.sort_by(|a, b| a[0].cmp(&b[0]));

        let mut expected = vec![];
        for group in 0..5 {
            let mut keys: Vec<i64> = data
                .iter()
                .filter(|(g, ..)| *g == group)
                .map(|(_, key, _)| *key)
                .collect();
            if keys.is_empty() {
                continue;
            }
            keys.sort_by(|a, b| b.cmp(a));
            let list = ListValue::new(
                keys.into_iter()
                    .take(n)
                    .map(|k| Some(ScalarImpl::Int64(k)))
                    .collect(),
            );
            expected.push(vec![Some(ScalarImpl::Int32(group)), Some(list.into())]);
        }

        assert_eq!(got, expected, "seed {seed}");
    }
}
