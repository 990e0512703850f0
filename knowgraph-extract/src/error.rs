// Copyright 2025 Sushanth (https://github.com/sushanthpy)
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

use knowgraph_core::GraphValidationError;
use thiserror::Error;

use crate::llm_client::LLMError;

/// Terminal failure of [`GraphExtractor::extract`](crate::GraphExtractor::extract)
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The model kept producing graphs that fail validation.
    #[error("Graph extraction failed after {attempts} attempt(s): {source}")]
    SchemaViolation {
        attempts: u32,
        #[source]
        source: GraphValidationError,
    },

    /// The provider call itself failed and was not recovered.
    #[error("LLM provider failed after {attempts} attempt(s): {source}")]
    Provider {
        attempts: u32,
        #[source]
        source: LLMError,
    },
}

impl ExtractionError {
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractionError::SchemaViolation { .. } => "schema_violation",
            ExtractionError::Provider { .. } => "provider_error",
        }
    }

    pub fn attempts(&self) -> u32 {
        match self {
            ExtractionError::SchemaViolation { attempts, .. }
            | ExtractionError::Provider { attempts, .. } => *attempts,
        }
    }

    /// Individual messages suitable for an error payload.
    pub fn details(&self) -> Vec<String> {
        match self {
            ExtractionError::SchemaViolation { source, .. } => source.messages().to_vec(),
            ExtractionError::Provider { source, .. } => vec![source.to_string()],
        }
    }
}
