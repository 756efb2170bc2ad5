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

use crate::row::Row;
use crate::types::DatumRef;

/// Direction of an order-by column. NULLs sort first in ascending order and
/// last in descending order, consistent with the memcomparable encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OrderType {
    Ascending,
    Descending,
}

impl OrderType {
    pub fn ascending() -> Self {
        Self::Ascending
    }

    pub fn descending() -> Self {
        Self::Descending
    }

    pub fn is_ascending(&self) -> bool {
        matches!(self, Self::Ascending)
    }

    pub fn is_descending(&self) -> bool {
        matches!(self, Self::Descending)
    }
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ascending => write!(f, "ASC"),
            Self::Descending => write!(f, "DESC"),
        }
    }
}

/// A sort column: column index with order type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ColumnOrder {
    pub column_index: usize,
    pub order_type: OrderType,
}

impl ColumnOrder {
    pub fn new(column_index: usize, order_type: OrderType) -> Self {
        Self {
            column_index,
            order_type,
        }
    }
}

impl std::fmt::Display for ColumnOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${} {}", self.column_index, self.order_type)
    }
}

/// Compare two datums of the same type under the given order.
///
/// # Panics
/// Panics if the two datums have different types.
pub fn compare_datums(lhs: DatumRef<'_>, rhs: DatumRef<'_>, order_type: OrderType) -> Ordering {
    let ord = match (lhs, rhs) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(l), Some(r)) => l.partial_cmp(&r).unwrap_or_else(|| {
            panic!("cannot compare {l:?} with {r:?}")
        }),
    };
    match order_type {
        OrderType::Ascending => ord,
        OrderType::Descending => ord.reverse(),
    }
}

/// Compare two rows under the given sort columns.
pub fn compare_rows(lhs: impl Row, rhs: impl Row, column_orders: &[ColumnOrder]) -> Ordering {
    for column_order in column_orders {
        let l = lhs.datum_at(column_order.column_index);
        let r = rhs.datum_at(column_order.column_index);
        match compare_datums(l, r, column_order.order_type) {
            Ordering::Equal => continue,
            ord => return ord,
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::OwnedRow;
    use crate::types::{ScalarImpl, ScalarRefImpl};

    #[test]
    fn test_compare_datums() {
        let one = Some(ScalarRefImpl::Int32(1));
        let two = Some(ScalarRefImpl::Int32(2));
        assert_eq!(compare_datums(one, two, OrderType::Ascending), Ordering::Less);
        assert_eq!(
            compare_datums(one, two, OrderType::Descending),
            Ordering::Greater
        );
        // nulls first in ascending order
        assert_eq!(compare_datums(None, one, OrderType::Ascending), Ordering::Less);
        assert_eq!(
            compare_datums(None, one, OrderType::Descending),
            Ordering::Greater
        );
        assert_eq!(compare_datums(None, None, OrderType::Ascending), Ordering::Equal);
    }

    #[test]
    fn test_compare_rows() {
        let row = |a: i32, b: i64| {
            OwnedRow::new(vec![Some(ScalarImpl::Int32(a)), Some(ScalarImpl::Int64(b))])
        };
        let orders = vec![
            ColumnOrder::new(0, OrderType::Ascending),
            ColumnOrder::new(1, OrderType::Descending),
        ];
        assert_eq!(compare_rows(row(1, 2), row(1, 3), &orders), Ordering::Greater);
        assert_eq!(compare_rows(row(0, 2), row(1, 3), &orders), Ordering::Less);
        assert_eq!(compare_rows(row(1, 3), row(1, 3), &orders), Ordering::Equal);
    }
}
