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

//! Aggregate functions and their states.

use std::any::Any;
use std::fmt::Debug;
use std::ops::Range;

use summit_common::array::DataChunk;
use summit_common::estimate_size::EstimateSize;
use summit_common::types::{DataType, Datum};
use summit_common::util::sort_util::ColumnOrder;

use crate::{ExprError, Result};

mod general;
mod top_n;

/// Kind of aggregate function.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, parse_display::Display, parse_display::FromStr,
)]
#[display(style = "snake_case")]
pub enum AggKind {
    Count,
    Sum,
    Min,
    Max,
    /// Bounded collection of the `n` first values under an ordering.
    TopN,
    /// Like `TopN`, but ranks by one column and materializes another.
    #[display("top_n_by")]
    TopNBy,
}

/// An aggregate function's input arguments: types and column indices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AggArgs {
    /// `count(*)` takes no argument.
    None,
    Unary(DataType, usize),
    Binary([DataType; 2], [usize; 2]),
}

impl AggArgs {
    pub fn arg_types(&self) -> &[DataType] {
        match self {
            AggArgs::None => &[],
            AggArgs::Unary(typ, _) => std::slice::from_ref(typ),
            AggArgs::Binary(types, _) => types,
        }
    }

    pub fn val_indices(&self) -> &[usize] {
        match self {
            AggArgs::None => &[],
            AggArgs::Unary(_, idx) => std::slice::from_ref(idx),
            AggArgs::Binary(_, indices) => indices,
        }
    }
}

/// Represents an aggregate function call, the logical description an
/// [`AggregateFunction`] is built from.
#[derive(Clone, Debug)]
pub struct AggCall {
    pub kind: AggKind,
    pub args: AggArgs,
    pub return_type: DataType,

    /// Order requirements specified by the `order by` clause of the call.
    pub column_orders: Vec<ColumnOrder>,

    /// Constant arguments, e.g. the `n` of `top_n`.
    pub direct_args: Vec<Datum>,
}

/// Any state stored in an [`AggregateState::Any`] must implement this trait.
pub trait AggStateDyn: Any + Debug + EstimateSize + Send + Sync + 'static {}

/// State of an aggregate function, updated incrementally by rows.
#[derive(Debug)]
pub enum AggregateState {
    /// A scalar state, e.g. the running sum.
    Datum(Datum),
    /// A dynamic state of any type, e.g. the ordered entries of `top_n`.
    Any(Box<dyn AggStateDyn>),
}

impl AggregateState {
    pub fn as_datum(&self) -> &Datum {
        match self {
            Self::Datum(d) => d,
            Self::Any(_) => panic!("not datum"),
        }
    }

    pub fn as_datum_mut(&mut self) -> &mut Datum {
        match self {
            Self::Datum(d) => d,
            Self::Any(_) => panic!("not datum"),
        }
    }

    pub fn downcast_ref<T: AggStateDyn>(&self) -> &T {
        match self {
            Self::Datum(_) => panic!("cannot downcast scalar state"),
            Self::Any(s) => (&**s as &dyn Any).downcast_ref::<T>().expect("wrong type"),
        }
    }

    pub fn downcast_mut<T: AggStateDyn>(&mut self) -> &mut T {
        match self {
            Self::Datum(_) => panic!("cannot downcast scalar state"),
            Self::Any(s) => (&mut **s as &mut dyn Any)
                .downcast_mut::<T>()
                .expect("wrong type"),
        }
    }
}

impl EstimateSize for AggregateState {
    fn estimated_heap_size(&self) -> usize {
        match self {
            Self::Datum(d) => d.as_ref().map_or(0, EstimateSize::estimated_heap_size),
            Self::Any(s) => s.estimated_heap_size(),
        }
    }
}

/// A streaming aggregate function evaluated over chunks of input.
#[async_trait::async_trait]
pub trait AggregateFunction: Send + Sync + 'static {
    /// Returns the return type of the aggregate function.
    fn return_type(&self) -> DataType;

    /// Creates an initial state of the aggregate function.
    fn create_state(&self) -> Result<AggregateState> {
        Ok(AggregateState::Datum(None))
    }

    /// Update the state with multiple rows.
    async fn update(&self, state: &mut AggregateState, input: &DataChunk) -> Result<()> {
        self.update_range(state, input, 0..input.capacity()).await
    }

    /// Update the state with a range of rows.
    async fn update_range(
        &self,
        state: &mut AggregateState,
        input: &DataChunk,
        range: Range<usize>,
    ) -> Result<()>;

    /// Get the result of the aggregate function.
    async fn get_result(&self, state: &AggregateState) -> Result<Datum>;
}

pub type BoxedAggregateFunction = Box<dyn AggregateFunction>;

/// Build an aggregate function from its logical description.
pub fn build(agg_call: &AggCall) -> Result<BoxedAggregateFunction> {
    match agg_call.kind {
        AggKind::Count => general::build_count(agg_call),
        AggKind::Sum => general::build_sum(agg_call),
        AggKind::Min => general::build_extreme(agg_call, true),
        AggKind::Max => general::build_extreme(agg_call, false),
        AggKind::TopN | AggKind::TopNBy => top_n::build_top_n(agg_call),
    }
}

fn unsupported(agg_call: &AggCall) -> ExprError {
    ExprError::UnsupportedFunction(format!(
        "{}({})",
        agg_call.kind,
        agg_call
            .args
            .arg_types()
            .iter()
            .map(|t| format!("{t:?}"))
            .collect::<Vec<_>>()
            .join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agg_kind_parse() {
        assert_eq!("count".parse::<AggKind>().unwrap(), AggKind::Count);
        assert_eq!("top_n".parse::<AggKind>().unwrap(), AggKind::TopN);
        assert_eq!("top_n_by".parse::<AggKind>().unwrap(), AggKind::TopNBy);
        assert_eq!(AggKind::TopNBy.to_string(), "top_n_by");
        assert!("frobnicate".parse::<AggKind>().is_err());
    }
}
