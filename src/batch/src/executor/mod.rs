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

mod group_top_n;
mod hash_agg;
mod order_by;
pub mod test_utils;
mod top_n;

use futures::stream::BoxStream;
pub use group_top_n::GroupTopNExecutor;
pub use hash_agg::HashAggExecutor;
pub use order_by::SortExecutor;
use summit_common::array::DataChunk;
use summit_common::catalog::Schema;
pub use top_n::{TopNExecutor, TopNHeap};

use crate::error::Result;

pub type BoxedDataChunkStream = BoxStream<'static, Result<DataChunk>>;
pub type BoxedExecutor = Box<dyn Executor>;

/// Refers to a single unit of batch execution. Chunks are pulled from the
/// executor as an async stream.
pub trait Executor: Send + 'static {
    /// Returns the schema of the executor's output.
    fn schema(&self) -> &Schema;

    /// Identity string of the executor, for logging.
    fn identity(&self) -> &str;

    /// Executes and returns the data chunk stream.
    ///
    /// The implementation should guaranteed that each `DataChunk`'s cardinality
    /// is not zero.
    fn execute(self: Box<Self>) -> BoxedDataChunkStream;
}
