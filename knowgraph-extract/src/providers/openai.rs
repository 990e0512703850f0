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

//! OpenAI Chat Completions, forced function call
//!
//! Works against any OpenAI-compatible endpoint (DeepSeek, vLLM, LiteLLM)
//! through [`OpenAIClient::with_base_url`].

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::{http_client, send_json, ProviderSettings};
use crate::llm_client::{extract_json_from_text, CompletionRequest, ExtractionClient, LLMError};

pub struct OpenAIClient {
    api_key: String,
    base_url: String,
    settings: ProviderSettings,
    client: reqwest::Client,
}

impl OpenAIClient {
    pub fn new(api_key: String, settings: ProviderSettings) -> Result<Self, LLMError> {
        Ok(Self {
            api_key,
            base_url: "https://api.openai.com/v1".to_string(),
            client: http_client(settings.timeout)?,
            settings,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn build_body(&self, request: &CompletionRequest) -> Value {
        let messages: Vec<Value> = request
            .messages
            .iter()
            .map(|m| json!({"role": m.role, "content": m.content}))
            .collect();

        json!({
            "model": self.settings.model,
            "temperature": self.settings.temperature,
            "messages": messages,
            "tools": [{
                "type": "function",
                "function": {
                    "name": request.schema.name,
                    "description": request.schema.description,
                    "parameters": request.schema.parameters,
                }
            }],
            "tool_choice": {
                "type": "function",
                "function": { "name": request.schema.name }
            }
        })
    }
}

#[async_trait]
impl ExtractionClient for OpenAIClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Value, LLMError> {
        let body = self.build_body(request);

        let response_data = send_json(
            self.client
                .post(format!("{}/chat/completions", self.base_url))
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("Content-Type", "application/json")
                .json(&body),
        )
        .await?;

        let message = &response_data["choices"][0]["message"];
        debug!(
            model = %self.settings.model,
            finish_reason = ?response_data["choices"][0]["finish_reason"].as_str(),
            total_tokens = ?response_data["usage"]["total_tokens"].as_u64(),
            "OpenAI completion received"
        );

        if let Some(arguments) = message["tool_calls"][0]["function"]["arguments"].as_str() {
            return Ok(serde_json::from_str(arguments)?);
        }

        // Some compatible servers ignore tool_choice and answer in content
        match message["content"].as_str() {
            Some(content) => extract_json_from_text(content),
            None => Err(LLMError::InvalidResponse(
                "Missing tool call and content".to_string(),
            )),
        }
    }

    fn provider(&self) -> &str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.settings.model
    }
}
