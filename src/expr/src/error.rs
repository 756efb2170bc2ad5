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

use summit_common::array::ArrayError;
use thiserror::Error;

/// A specialized Result type for expression operations.
pub type Result<T> = std::result::Result<T, ExprError>;

/// The error type for expression operations.
#[derive(Error, Debug)]
pub enum ExprError {
    #[error("Unsupported function: {0}")]
    UnsupportedFunction(String),

    #[error("Invalid parameter {name}: {reason}")]
    InvalidParam {
        name: &'static str,
        reason: Box<str>,
    },

    #[error("Numeric out of range")]
    NumericOutOfRange,

    #[error("Array error: {0}")]
    Array(
        #[from]
        #[source]
        ArrayError,
    ),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}
