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

use crate::estimate_size::EstimateSize;
use crate::types::{Datum, DatumRef, ToOwnedDatum};

/// The trait for abstracting over a row-like type.
pub trait Row: Sized + std::fmt::Debug {
    /// Returns the [`DatumRef`] at the given `index`.
    fn datum_at(&self, index: usize) -> DatumRef<'_>;

    /// Returns the number of datums in the row.
    fn len(&self) -> usize;

    /// Returns whether the row is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns an iterator over the datums in the row, in order.
    fn iter(&self) -> impl ExactSizeIterator<Item = DatumRef<'_>>;

    /// Converts the row into an [`OwnedRow`].
    fn to_owned_row(&self) -> OwnedRow {
        OwnedRow::new(self.iter().map(|d| d.to_owned_datum()).collect())
    }

    /// Consumes the row and converts it into an [`OwnedRow`].
    fn into_owned_row(self) -> OwnedRow {
        self.to_owned_row()
    }
}

impl<R: Row> Row for &R {
    fn datum_at(&self, index: usize) -> DatumRef<'_> {
        R::datum_at(self, index)
    }

    fn len(&self) -> usize {
        R::len(self)
    }

    fn iter(&self) -> impl ExactSizeIterator<Item = DatumRef<'_>> {
        R::iter(self)
    }

    fn to_owned_row(&self) -> OwnedRow {
        R::to_owned_row(self)
    }
}

/// An owned row backed by a `Vec<Datum>`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct OwnedRow(Vec<Datum>);

impl OwnedRow {
    pub fn new(values: Vec<Datum>) -> Self {
        Self(values)
    }

    pub fn empty() -> Self {
        Self(vec![])
    }

    pub fn into_inner(self) -> Vec<Datum> {
        self.0
    }

    pub fn as_inner(&self) -> &[Datum] {
        &self.0
    }
}

impl Row for OwnedRow {
    fn datum_at(&self, index: usize) -> DatumRef<'_> {
        self.0[index].as_ref().map(|d| d.as_scalar_ref_impl())
    }

    fn len(&self) -> usize {
        self.0.len()
    }

    fn iter(&self) -> impl ExactSizeIterator<Item = DatumRef<'_>> {
        self.0.iter().map(|d| d.as_ref().map(|s| s.as_scalar_ref_impl()))
    }

    fn to_owned_row(&self) -> OwnedRow {
        self.clone()
    }

    fn into_owned_row(self) -> OwnedRow {
        self
    }
}

impl EstimateSize for OwnedRow {
    fn estimated_heap_size(&self) -> usize {
        self.0.capacity() * std::mem::size_of::<Datum>()
            + self
                .0
                .iter()
                .map(|d| d.as_ref().map_or(0, |s| s.estimated_heap_size()))
                .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScalarImpl;

    #[test]
    fn test_owned_row() {
        let row = OwnedRow::new(vec![
            Some(ScalarImpl::Int32(1)),
            None,
            Some(ScalarImpl::Utf8("ab".into())),
        ]);
        assert_eq!(row.len(), 3);
        assert!(row.datum_at(1).is_none());
        assert_eq!(row.to_owned_row(), row);
        let from_ref = (&row).to_owned_row();
        assert_eq!(from_ref, row);
    }
}
