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

//! General-purpose aggregate functions with scalar states.

use std::ops::Range;

use summit_common::array::DataChunk;
use summit_common::types::{DataType, Datum, ScalarImpl, ScalarRefImpl, F64};

use super::{AggArgs, AggCall, AggregateFunction, AggregateState, BoxedAggregateFunction};
use crate::{ExprError, Result};

/// `count(*)` or `count(col)`. NULL arguments are not counted.
struct Count {
    /// The counted column, or `None` for `count(*)`.
    input_idx: Option<usize>,
}

#[async_trait::async_trait]
impl AggregateFunction for Count {
    fn return_type(&self) -> DataType {
        DataType::Int64
    }

    fn create_state(&self) -> Result<AggregateState> {
        Ok(AggregateState::Datum(Some(ScalarImpl::Int64(0))))
    }

    async fn update_range(
        &self,
        state: &mut AggregateState,
        input: &DataChunk,
        range: Range<usize>,
    ) -> Result<()> {
        let mut count = 0i64;
        match self.input_idx {
            None => {
                for row_id in range {
                    if input.is_vis(row_id) {
                        count += 1;
                    }
                }
            }
            Some(idx) => {
                let column = input.column_at(idx);
                for row_id in range {
                    if input.is_vis(row_id) && !column.is_null(row_id) {
                        count += 1;
                    }
                }
            }
        }
        let state = state.as_datum_mut();
        let old = state.as_ref().map_or(0, |s| *s.as_int64());
        *state = Some(ScalarImpl::Int64(old + count));
        Ok(())
    }

    async fn get_result(&self, state: &AggregateState) -> Result<Datum> {
        Ok(state.as_datum().clone())
    }
}

pub(super) fn build_count(agg_call: &AggCall) -> Result<BoxedAggregateFunction> {
    let input_idx = match &agg_call.args {
        AggArgs::None => None,
        AggArgs::Unary(_, idx) => Some(*idx),
        AggArgs::Binary(..) => return Err(super::unsupported(agg_call)),
    };
    Ok(Box::new(Count { input_idx }))
}

/// Integer sum, widened to `Int64`. Overflow is an error.
struct SumInt {
    input_idx: usize,
}

#[async_trait::async_trait]
impl AggregateFunction for SumInt {
    fn return_type(&self) -> DataType {
        DataType::Int64
    }

    async fn update_range(
        &self,
        state: &mut AggregateState,
        input: &DataChunk,
        range: Range<usize>,
    ) -> Result<()> {
        let column = input.column_at(self.input_idx);
        let state = state.as_datum_mut();
        let mut sum = state.as_ref().map(|s| *s.as_int64());
        for row_id in range {
            if !input.is_vis(row_id) {
                continue;
            }
            let Some(value) = column.value_at(row_id) else {
                continue;
            };
            let value = match value {
                ScalarRefImpl::Int16(v) => v as i64,
                ScalarRefImpl::Int32(v) => v as i64,
                ScalarRefImpl::Int64(v) => v,
                _ => {
                    return Err(ExprError::InvalidParam {
                        name: "sum",
                        reason: "expected integer input".into(),
                    })
                }
            };
            sum = Some(
                sum.unwrap_or(0)
                    .checked_add(value)
                    .ok_or(ExprError::NumericOutOfRange)?,
            );
        }
        *state = sum.map(ScalarImpl::Int64);
        Ok(())
    }

    async fn get_result(&self, state: &AggregateState) -> Result<Datum> {
        Ok(state.as_datum().clone())
    }
}

/// Floating-point sum, widened to `Float64`.
struct SumFloat {
    input_idx: usize,
}

#[async_trait::async_trait]
impl AggregateFunction for SumFloat {
    fn return_type(&self) -> DataType {
        DataType::Float64
    }

    async fn update_range(
        &self,
        state: &mut AggregateState,
        input: &DataChunk,
        range: Range<usize>,
    ) -> Result<()> {
        let column = input.column_at(self.input_idx);
        let state = state.as_datum_mut();
        let mut sum = state.as_ref().map(|s| *s.as_float64());
        for row_id in range {
            if !input.is_vis(row_id) {
                continue;
            }
            let Some(value) = column.value_at(row_id) else {
                continue;
            };
            let value: F64 = match value {
                ScalarRefImpl::Float32(v) => (v.into_inner() as f64).into(),
                ScalarRefImpl::Float64(v) => v,
                _ => {
                    return Err(ExprError::InvalidParam {
                        name: "sum",
                        reason: "expected float input".into(),
                    })
                }
            };
            sum = Some(sum.unwrap_or(0.0.into()) + value);
        }
        *state = sum.map(ScalarImpl::Float64);
        Ok(())
    }

    async fn get_result(&self, state: &AggregateState) -> Result<Datum> {
        Ok(state.as_datum().clone())
    }
}

pub(super) fn build_sum(agg_call: &AggCall) -> Result<BoxedAggregateFunction> {
    let AggArgs::Unary(input_type, input_idx) = &agg_call.args else {
        return Err(super::unsupported(agg_call));
    };
    match input_type {
        DataType::Int16 | DataType::Int32 | DataType::Int64 => Ok(Box::new(SumInt {
            input_idx: *input_idx,
        })),
        DataType::Float32 | DataType::Float64 => Ok(Box::new(SumFloat {
            input_idx: *input_idx,
        })),
        _ => Err(super::unsupported(agg_call)),
    }
}

/// `min` / `max` over any comparable type. NULLs are ignored.
struct Extreme {
    input_idx: usize,
    return_type: DataType,
    is_min: bool,
}

#[async_trait::async_trait]
impl AggregateFunction for Extreme {
    fn return_type(&self) -> DataType {
        self.return_type.clone()
    }

    async fn update_range(
        &self,
        state: &mut AggregateState,
        input: &DataChunk,
        range: Range<usize>,
    ) -> Result<()> {
        let column = input.column_at(self.input_idx);
        let state = state.as_datum_mut();
        for row_id in range {
            if !input.is_vis(row_id) {
                continue;
            }
            let Some(value) = column.value_at(row_id) else {
                continue;
            };
            let beats = match state.as_ref() {
                None => true,
                Some(best) => {
                    let current = best.as_scalar_ref_impl();
                    if self.is_min {
                        value < current
                    } else {
                        value > current
                    }
                }
            };
            if beats {
                *state = Some(value.into_scalar_impl());
            }
        }
        Ok(())
    }

    async fn get_result(&self, state: &AggregateState) -> Result<Datum> {
        Ok(state.as_datum().clone())
    }
}

pub(super) fn build_extreme(agg_call: &AggCall, is_min: bool) -> Result<BoxedAggregateFunction> {
    let AggArgs::Unary(input_type, input_idx) = &agg_call.args else {
        return Err(super::unsupported(agg_call));
    };
    Ok(Box::new(Extreme {
        input_idx: *input_idx,
        return_type: input_type.clone(),
        is_min,
    }))
}
