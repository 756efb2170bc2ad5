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

//! Memcomparable encoding of sort keys.
//!
//! The encoded bytes of a row compare the same way the row compares under
//! [`compare_rows`](super::sort_util::compare_rows), so sorting and heap
//! ordering can work on plain byte comparison.

use serde::Serialize;

use super::sort_util::{ColumnOrder, OrderType};
use crate::array::{ArrayError, ArrayImpl, ArrayResult, DataChunk};
use crate::row::Row;
use crate::types::{DatumRef, ScalarRefImpl};

pub type MemcmpEncoded = Vec<u8>;

fn serialize_scalar(
    scalar: ScalarRefImpl<'_>,
    serializer: &mut memcomparable::Serializer<Vec<u8>>,
) -> ArrayResult<()> {
    match scalar {
        ScalarRefImpl::Int16(v) => v.serialize(serializer)?,
        ScalarRefImpl::Int32(v) => v.serialize(serializer)?,
        ScalarRefImpl::Int64(v) => v.serialize(serializer)?,
        ScalarRefImpl::Float32(v) => v.into_inner().serialize(serializer)?,
        ScalarRefImpl::Float64(v) => v.into_inner().serialize(serializer)?,
        ScalarRefImpl::Utf8(v) => v.serialize(serializer)?,
        ScalarRefImpl::Bool(v) => v.serialize(serializer)?,
        ScalarRefImpl::List(_) => return Err(ArrayError::UnsupportedOrderKey("list")),
    };
    Ok(())
}

/// Encode a nullable datum. A flag byte distinguishes NULL (0) from a value
/// (1), so NULLs sort first in ascending order. `set_reverse` flips both the
/// flag and the value bytes for descending columns.
fn serialize_datum(
    datum: DatumRef<'_>,
    serializer: &mut memcomparable::Serializer<Vec<u8>>,
) -> ArrayResult<()> {
    match datum {
        None => {
            0u8.serialize(&mut *serializer)?;
        }
        Some(scalar) => {
            1u8.serialize(&mut *serializer)?;
            serialize_scalar(scalar, serializer)?;
        }
    }
    Ok(())
}

pub fn encode_datum(datum: DatumRef<'_>, order: OrderType) -> ArrayResult<MemcmpEncoded> {
    let mut serializer = memcomparable::Serializer::new(vec![]);
    serializer.set_reverse(order.is_descending());
    serialize_datum(datum, &mut serializer)?;
    Ok(serializer.into_inner())
}

/// Encode the sort-key columns of a row into a single byte key.
pub fn encode_row(row: impl Row, column_orders: &[ColumnOrder]) -> ArrayResult<MemcmpEncoded> {
    let mut encoded = Vec::new();
    for column_order in column_orders {
        let mut serializer = memcomparable::Serializer::new(std::mem::take(&mut encoded));
        serializer.set_reverse(column_order.order_type.is_descending());
        serialize_datum(row.datum_at(column_order.column_index), &mut serializer)?;
        encoded = serializer.into_inner();
    }
    Ok(encoded)
}

fn encode_array(
    array: &ArrayImpl,
    order: OrderType,
    encoded: &mut [MemcmpEncoded],
) -> ArrayResult<()> {
    for (datum, buf) in array.iter().zip(encoded.iter_mut()) {
        let mut serializer = memcomparable::Serializer::new(std::mem::take(buf));
        serializer.set_reverse(order.is_descending());
        serialize_datum(datum, &mut serializer)?;
        *buf = serializer.into_inner();
    }
    Ok(())
}

/// Encode the sort keys of every row in the chunk, indexed by physical row
/// position (invisible rows included).
pub fn encode_chunk(
    chunk: &DataChunk,
    column_orders: &[ColumnOrder],
) -> ArrayResult<Vec<MemcmpEncoded>> {
    let mut encoded = vec![Vec::new(); chunk.capacity()];
    for column_order in column_orders {
        encode_array(
            chunk.column_at(column_order.column_index),
            column_order.order_type,
            &mut encoded,
        )?;
    }
    Ok(encoded)
}

#[cfg(test)]
mod tests {
    use std::cmp::Ordering;

    use itertools::Itertools;

    use super::*;
    use crate::array::DataChunkTestExt;
    use crate::row::OwnedRow;
    use crate::types::{Datum, ScalarImpl, ToDatumRef};
    use crate::util::sort_util::{compare_datums, compare_rows};

    fn assert_encoding_consistent(datums: &[Datum], order: OrderType) {
        for (a, b) in datums.iter().tuple_combinations() {
            let ea = encode_datum(a.to_datum_ref(), order).unwrap();
            let eb = encode_datum(b.to_datum_ref(), order).unwrap();
            assert_eq!(
                ea.cmp(&eb),
                compare_datums(a.to_datum_ref(), b.to_datum_ref(), order),
                "inconsistent encoding of {a:?} vs {b:?} ({order})"
            );
        }
    }

    #[test]
    fn test_encode_datum_int() {
        let datums = vec![
            None,
            Some(ScalarImpl::Int64(i64::MIN)),
            Some(ScalarImpl::Int64(-1)),
            Some(ScalarImpl::Int64(0)),
            Some(ScalarImpl::Int64(42)),
            Some(ScalarImpl::Int64(i64::MAX)),
        ];
        assert_encoding_consistent(&datums, OrderType::Ascending);
        assert_encoding_consistent(&datums, OrderType::Descending);
    }

    #[test]
    fn test_encode_datum_float() {
        let datums = vec![
            None,
            Some(ScalarImpl::Float64(f64::NEG_INFINITY.into())),
            Some(ScalarImpl::Float64((-1.5).into())),
            Some(ScalarImpl::Float64(0.0.into())),
            Some(ScalarImpl::Float64(2.25.into())),
            Some(ScalarImpl::Float64(f64::INFINITY.into())),
        ];
        assert_encoding_consistent(&datums, OrderType::Ascending);
        assert_encoding_consistent(&datums, OrderType::Descending);
    }

    #[test]
    fn test_encode_datum_utf8() {
        let datums = vec![
            None,
            Some(ScalarImpl::Utf8("".into())),
            Some(ScalarImpl::Utf8("ab".into())),
            Some(ScalarImpl::Utf8("abc".into())),
            Some(ScalarImpl::Utf8("b".into())),
        ];
        assert_encoding_consistent(&datums, OrderType::Ascending);
        assert_encoding_consistent(&datums, OrderType::Descending);
    }

    #[test]
    fn test_encode_row() {
        let row = |a: Datum, b: Datum| OwnedRow::new(vec![a, b]);
        let rows = vec![
            row(None, Some(ScalarImpl::Int32(3))),
            row(Some(ScalarImpl::Int64(1)), None),
            row(Some(ScalarImpl::Int64(1)), Some(ScalarImpl::Int32(2))),
            row(Some(ScalarImpl::Int64(2)), Some(ScalarImpl::Int32(1))),
        ];
        let orders = vec![
            ColumnOrder::new(0, OrderType::Ascending),
            ColumnOrder::new(1, OrderType::Descending),
        ];
        for (a, b) in rows.iter().tuple_combinations() {
            let ea = encode_row(a, &orders).unwrap();
            let eb = encode_row(b, &orders).unwrap();
            assert_eq!(ea.cmp(&eb), compare_rows(a, b, &orders));
        }
        // equal rows encode identically
        let e1 = encode_row(&rows[2], &orders).unwrap();
        let e2 = encode_row(&rows[2], &orders).unwrap();
        assert_eq!(e1.cmp(&e2), Ordering::Equal);
    }

    #[test]
    fn test_encode_chunk() {
        let chunk = DataChunk::from_pretty(
            "i T
             3 a
             1 .
             2 bb",
        );
        let orders = vec![
            ColumnOrder::new(0, OrderType::Descending),
            ColumnOrder::new(1, OrderType::Ascending),
        ];
        let encoded = encode_chunk(&chunk, &orders).unwrap();
        assert_eq!(encoded.len(), 3);
        for (row, enc) in chunk.rows().zip(encoded.iter()) {
            assert_eq!(&encode_row(row, &orders).unwrap(), enc);
        }
    }
}
