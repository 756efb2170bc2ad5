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

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArrayError {
    #[error("Parse error: {0}")]
    Parse(&'static str),

    #[error("Unsupported order key type: {0}")]
    UnsupportedOrderKey(&'static str),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<memcomparable::Error> for ArrayError {
    fn from(err: memcomparable::Error) -> Self {
        Self::Internal(anyhow::anyhow!(err))
    }
}
