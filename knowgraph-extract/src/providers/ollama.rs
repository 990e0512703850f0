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

//! Ollama (local) chat endpoint with a JSON-schema `format`

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use super::{http_client, send_json, ProviderSettings};
use crate::llm_client::{extract_json_from_text, CompletionRequest, ExtractionClient, LLMError};

pub struct OllamaClient {
    base_url: String,
    settings: ProviderSettings,
    client: reqwest::Client,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>, settings: ProviderSettings) -> Result<Self, LLMError> {
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: http_client(settings.timeout)?,
            settings,
        })
    }

    fn build_body(&self, request: &CompletionRequest) -> Value {
        // No tool calling here: the schema goes in `format` and its
        // description rides along in the system prompt.
        let mut messages: Vec<Value> = Vec::with_capacity(request.messages.len() + 1);
        messages.push(json!({
            "role": "system",
            "content": format!(
                "{}\nRespond only with JSON for `{}`.",
                request.schema.description, request.schema.name
            ),
        }));
        messages.extend(
            request
                .messages
                .iter()
                .map(|m| json!({"role": m.role, "content": m.content})),
        );

        json!({
            "model": self.settings.model,
            "messages": messages,
            "stream": false,
            "format": request.schema.parameters,
            "options": { "temperature": self.settings.temperature },
        })
    }
}

#[async_trait]
impl ExtractionClient for OllamaClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Value, LLMError> {
        let body = self.build_body(request);

        let response_data = send_json(
            self.client
                .post(format!("{}/api/chat", self.base_url))
                .json(&body),
        )
        .await?;

        debug!(
            model = %self.settings.model,
            done = ?response_data["done"].as_bool(),
            "Ollama completion received"
        );

        let content = response_data["message"]["content"]
            .as_str()
            .ok_or_else(|| LLMError::InvalidResponse("Missing message content".to_string()))?;
        extract_json_from_text(content)
    }

    fn provider(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.settings.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::{ChatMessage, OutputSchema};

    #[tokio::test]
    async fn test_parses_message_content() {
        let mut server = mockito::Server::new_async().await;
        let body = json!({
            "model": "llama3.1",
            "message": {"role": "assistant", "content": "{\"nodes\":[],\"edges\":[]}"},
            "done": true
        });
        server
            .mock("POST", "/api/chat")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;

        let client = OllamaClient::new(server.url(), ProviderSettings::new("llama3.1")).unwrap();
        let request = CompletionRequest {
            messages: vec![ChatMessage::user("")],
            schema: OutputSchema {
                name: "make_graph".to_string(),
                description: "Knowledge graph".to_string(),
                parameters: json!({"type": "object"}),
            },
        };

        let value = client.complete(&request).await.unwrap();
        assert_eq!(value, json!({"nodes": [], "edges": []}));
    }
}
