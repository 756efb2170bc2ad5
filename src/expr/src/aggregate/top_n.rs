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

//! `top_n` and `top_n_by`: bounded collection of the first `n` values under
//! an ordering, maintained in a single pass over the input.

use std::ops::Range;

use summit_common::array::{DataChunk, ListValue};
use summit_common::estimate_size::{EstimateSize, EstimatedBTreeMap};
use summit_common::types::{DataType, Datum, DatumRef, ScalarImpl, ToOwnedDatum};
use summit_common::util::memcmp_encoding::{encode_datum, MemcmpEncoded};
use summit_common::util::sort_util::OrderType;

use super::{
    AggArgs, AggCall, AggKind, AggStateDyn, AggregateFunction, AggregateState,
    BoxedAggregateFunction,
};
use crate::{ExprError, Result};

struct TopN {
    return_type: DataType,
    n: usize,
    order: OrderType,
    /// Column the entries are ranked by.
    key_index: usize,
    /// Column whose values are materialized into the result list.
    value_index: usize,
}

/// The ordered entries of a group, keyed by the memcomparable-encoded ranking
/// key plus an insertion sequence number. The sequence number makes keys
/// unique so duplicated ranking keys each occupy a slot, and makes the
/// earlier-seen entry win on ties at the boundary.
#[derive(Debug, Default)]
struct TopNState {
    entries: EstimatedBTreeMap<(MemcmpEncoded, u64), Datum>,
    next_seq: u64,
}

impl EstimateSize for TopNState {
    fn estimated_heap_size(&self) -> usize {
        self.entries.estimated_heap_size()
    }
}

impl AggStateDyn for TopNState {}

impl TopN {
    /// Offer one entry to the state. Keeps at most `n` entries alive.
    fn add_entry(
        &self,
        state: &mut TopNState,
        key: DatumRef<'_>,
        value: DatumRef<'_>,
    ) -> Result<()> {
        // entries with a NULL ranking key do not participate
        if key.is_none() {
            return Ok(());
        }
        let encoded = encode_datum(key, self.order)?;
        let seq = state.next_seq;
        state.next_seq += 1;
        if state.entries.len() < self.n {
            state.entries.insert((encoded, seq), value.to_owned_datum());
        } else if let Some((last, _)) = state.entries.last_key_value() {
            // strict comparison: a tie with the current worst loses, so the
            // first-seen entry is kept
            if encoded < last.0 {
                state.entries.insert((encoded, seq), value.to_owned_datum());
                state.entries.pop_last();
            }
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl AggregateFunction for TopN {
    fn return_type(&self) -> DataType {
        self.return_type.clone()
    }

    fn create_state(&self) -> Result<AggregateState> {
        Ok(AggregateState::Any(Box::<TopNState>::default()))
    }

    async fn update_range(
        &self,
        state: &mut AggregateState,
        input: &DataChunk,
        range: Range<usize>,
    ) -> Result<()> {
        let state = state.downcast_mut::<TopNState>();
        let keys = input.column_at(self.key_index);
        let values = input.column_at(self.value_index);
        for row_id in range {
            if !input.is_vis(row_id) {
                continue;
            }
            self.add_entry(state, keys.value_at(row_id), values.value_at(row_id))?;
        }
        Ok(())
    }

    /// Materialize the entries in ranking order. An empty state yields NULL.
    async fn get_result(&self, state: &AggregateState) -> Result<Datum> {
        let state = state.downcast_ref::<TopNState>();
        if state.entries.is_empty() {
            return Ok(None);
        }
        let values = state.entries.values().cloned().collect();
        Ok(Some(ListValue::new(values).into()))
    }
}

pub(super) fn build_top_n(agg_call: &AggCall) -> Result<BoxedAggregateFunction> {
    let (key_index, value_index) = match (agg_call.kind, &agg_call.args) {
        (AggKind::TopN, AggArgs::Unary(_, idx)) => (*idx, *idx),
        (AggKind::TopNBy, AggArgs::Binary(_, [value_idx, key_idx])) => (*key_idx, *value_idx),
        _ => return Err(super::unsupported(agg_call)),
    };

    let n = match agg_call.direct_args.first() {
        Some(Some(ScalarImpl::Int32(n))) => *n as i64,
        Some(Some(ScalarImpl::Int64(n))) => *n,
        _ => {
            return Err(ExprError::InvalidParam {
                name: "n",
                reason: "missing or non-integer".into(),
            })
        }
    };
    if n < 1 {
        return Err(ExprError::InvalidParam {
            name: "n",
            reason: format!("expect positive, got {n}").into(),
        });
    }

    let order = agg_call
        .column_orders
        .first()
        .map(|o| o.order_type)
        .unwrap_or(OrderType::Descending);

    Ok(Box::new(TopN {
        return_type: agg_call.return_type.clone(),
        n: n as usize,
        order,
        key_index,
        value_index,
    }))
}
