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

//! Provider implementations of [`ExtractionClient`](crate::ExtractionClient)

mod anthropic;
mod ollama;
mod openai;

pub use anthropic::AnthropicClient;
pub use ollama::OllamaClient;
pub use openai::OpenAIClient;

use crate::llm_client::LLMError;
use std::time::Duration;

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4-turbo-preview";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-sonnet-20241022";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.1";

/// Settings shared by every provider
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
}

impl ProviderSettings {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            temperature: 0.5,
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn http_client(timeout: Duration) -> Result<reqwest::Client, LLMError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(LLMError::Http)
}

/// Send a prepared request and decode the JSON body, mapping failures.
async fn send_json(request: reqwest::RequestBuilder) -> Result<serde_json::Value, LLMError> {
    let response = request.send().await.map_err(LLMError::transport)?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(LLMError::from_status(status, body));
    }

    response.json().await.map_err(LLMError::transport)
}
