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

//! Knowgraph Extract
//!
//! Knowledge graph extraction on top of an LLM function call, with the
//! retry-on-validation-error loop that lets the model correct itself.

pub mod error;
pub mod extractor;
pub mod llm_client;
pub mod mock;
pub mod prompt;
pub mod providers;

pub use error::ExtractionError;
pub use extractor::{ExtractorConfig, GraphExtractor, DEFAULT_MAX_ATTEMPTS};
pub use llm_client::{
    extract_json_from_text, ChatMessage, CompletionRequest, ExtractionClient, LLMError,
    OutputSchema,
};
pub use mock::MockExtractionClient;
pub use providers::{AnthropicClient, OllamaClient, OpenAIClient, ProviderSettings};
